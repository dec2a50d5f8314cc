// Admin API wire shapes
//
// Only the envelope is modelled here. Entities stay `serde_json::Value`
// so every resource kind flows through the same code path.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use url::Url;

/// One page of a collection listing.
///
/// `{ "data": [...], "next": "/services?offset=..", "offset": "..", "total": N }`
#[derive(Debug, Clone, Deserialize)]
pub struct ListEnvelope {
    #[serde(default, deserialize_with = "lenient_list")]
    pub data: Vec<Value>,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub offset: Option<String>,
    #[serde(default)]
    pub total: Option<u64>,
}

impl ListEnvelope {
    /// The cursor for the next page, if any.
    ///
    /// Prefers the explicit `offset` field; falls back to the `offset`
    /// query parameter of the `next` link.
    pub fn cursor(&self) -> Option<String> {
        if let Some(ref offset) = self.offset {
            if !offset.is_empty() {
                return Some(offset.clone());
            }
        }
        let next = self.next.as_deref()?;
        let base = Url::parse("http://localhost/").ok()?;
        let url = base.join(next).ok()?;
        url.query_pairs()
            .find(|(k, _)| k == "offset")
            .map(|(_, v)| v.into_owned())
            .filter(|v| !v.is_empty())
    }
}

/// Empty collections are serialized as `{}` by older gateways (Lua tables
/// have no array/object distinction), so accept either shape.
fn lenient_list<'de, D>(deserializer: D) -> Result<Vec<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Array(items) => Ok(items),
        Value::Object(map) if map.is_empty() => Ok(Vec::new()),
        Value::Null => Ok(Vec::new()),
        other => Err(serde::de::Error::custom(format!(
            "expected a list of entities, got {other}"
        ))),
    }
}

/// `GET /plugins/enabled`
#[derive(Debug, Clone, Deserialize)]
pub struct EnabledPlugins {
    #[serde(default, deserialize_with = "lenient_list")]
    pub enabled_plugins: Vec<Value>,
}

impl EnabledPlugins {
    pub fn names(&self) -> Vec<String> {
        self.enabled_plugins
            .iter()
            .filter_map(|v| v.as_str().map(String::from))
            .collect()
    }
}

/// Parsed error body: a human message plus messages keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorBody {
    pub message: Option<String>,
    pub fields: BTreeMap<String, String>,
}

impl ErrorBody {
    /// Parse `{"message": "..."}` or `{"name": "already exists with value 'x'"}`.
    ///
    /// Returns `None` when the body is not a JSON object.
    pub fn parse(raw: &str) -> Option<Self> {
        let Value::Object(map) = serde_json::from_str::<Value>(raw).ok()? else {
            return None;
        };
        let mut body = Self::default();
        for (key, value) in map {
            let text = match value {
                Value::String(s) => s,
                Value::Null => continue,
                other => other.to_string(),
            };
            if key == "message" {
                body.message = Some(text);
            } else {
                body.fields.insert(key, text);
            }
        }
        Some(body)
    }

    /// Best human-readable summary of the body.
    pub fn summary(&self) -> Option<String> {
        if let Some(ref msg) = self.message {
            return Some(msg.clone());
        }
        if self.fields.is_empty() {
            return None;
        }
        Some(
            self.fields
                .iter()
                .map(|(k, v)| format!("{k}: {v}"))
                .collect::<Vec<_>>()
                .join(", "),
        )
    }
}
