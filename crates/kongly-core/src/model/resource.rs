// ── Generic resource envelope ──
//
// The only fields every kind shares are `id`, `created_at` and
// `updated_at`. Everything else is kept as an ordered attribute map so
// plugin configs and other kind-specific payloads pass through untouched.

use chrono::{DateTime, Utc};
use kongly_api::Attributes;
use serde::{Serialize, Serializer};
use serde_json::Value;

use super::identifier::Identifier;
use super::kind::ResourceKind;

/// Timestamps above this are milliseconds (year 5138 in seconds).
const MILLIS_THRESHOLD: i64 = 100_000_000_000;

/// A single gateway entity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resource {
    #[serde(skip)]
    pub kind: ResourceKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Identifier>,
    #[serde(flatten)]
    pub attributes: Attributes,
    #[serde(
        serialize_with = "serialize_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(
        serialize_with = "serialize_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Resource {
    /// Split a JSON entity into the shared envelope and its attributes.
    ///
    /// Returns `None` if `value` is not a JSON object.
    pub fn from_value(kind: ResourceKind, value: Value) -> Option<Self> {
        let Value::Object(mut attributes) = value else {
            return None;
        };
        let id = attributes.shift_remove("id").and_then(|v| match v {
            Value::String(s) if !s.is_empty() => Some(Identifier::from(s)),
            _ => None,
        });
        let created_at = attributes
            .shift_remove("created_at")
            .as_ref()
            .and_then(parse_timestamp);
        let updated_at = attributes
            .shift_remove("updated_at")
            .as_ref()
            .and_then(parse_timestamp);

        Some(Self {
            kind,
            id,
            attributes,
            created_at,
            updated_at,
        })
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// Value of the kind's natural key (`name`, `username`, ...), as text.
    pub fn natural_key(&self) -> Option<String> {
        let field = self.kind.natural_key();
        if field == "id" {
            return self.id.as_ref().map(ToString::to_string);
        }
        self.attributes.get(field).and_then(scalar_key)
    }

    /// Best identifier for addressing this resource: the id, else the natural key.
    pub fn identifier(&self) -> Option<Identifier> {
        self.id
            .clone()
            .or_else(|| self.natural_key().map(Identifier::Key))
    }

    /// Foreign reference held in attribute `name` (`{"id": ...}`), if any.
    pub fn reference(&self, name: &str) -> Option<Reference> {
        self.attributes.get(name).and_then(Reference::from_value)
    }
}

/// Text form of a scalar usable as a natural key.
pub(crate) fn scalar_key(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    let raw = value
        .as_i64()
        .or_else(|| value.as_f64().map(|f| f.trunc() as i64))?;
    if raw.abs() >= MILLIS_THRESHOLD {
        DateTime::from_timestamp_millis(raw)
    } else {
        DateTime::from_timestamp(raw, 0)
    }
}

/// Unix seconds, or milliseconds when there is a sub-second part.
#[allow(clippy::ref_option)]
fn serialize_timestamp<S: Serializer>(
    value: &Option<DateTime<Utc>>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match value {
        Some(t) if t.timestamp_subsec_millis() != 0 => {
            serializer.serialize_i64(t.timestamp_millis())
        }
        Some(t) => serializer.serialize_i64(t.timestamp()),
        None => serializer.serialize_none(),
    }
}

/// Foreign relationship to another resource, encoded as `{"id": ...}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub id: Identifier,
}

impl Reference {
    pub fn to(id: impl Into<Identifier>) -> Self {
        Self { id: id.into() }
    }

    pub fn from_value(value: &Value) -> Option<Self> {
        value
            .get("id")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(Self::to)
    }

    pub fn into_value(self) -> Value {
        serde_json::json!({ "id": self.id.to_string() })
    }
}

/// One page of a listing.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub resources: Vec<Resource>,
    /// Opaque cursor for the next page; `None` on the last page.
    pub cursor: Option<String>,
    pub total: Option<u64>,
}

impl Page {
    pub fn is_last(&self) -> bool {
        self.cursor.is_none()
    }
}
