// Admin API form encoding
//
// The Admin API accepts `application/x-www-form-urlencoded` bodies where
// nesting is spelled out in the key: `protocols[]=http` appends to a
// sequence, `config.second=2` sets a leaf inside a nested mapping, and
// `service.id=<uuid>` expresses a reference.

use serde_json::{Map, Value};
use thiserror::Error;

/// Attribute name -> value mapping, in insertion order.
pub type Attributes = Map<String, Value>;

const SEQUENCE_SUFFIX: &str = "[]";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParamError {
    /// The same plain key appeared twice in one request.
    #[error("duplicate key '{0}' in the same request")]
    DuplicateKey(String),

    /// A key is used both as a scalar and as a container (`a=1` and `a.b=2`).
    #[error("key '{0}' is used both as a value and as a nested mapping or sequence")]
    ShapeMismatch(String),

    /// Key is empty or has an empty path segment (`a..b`, `.a`).
    #[error("malformed key '{0}'")]
    MalformedKey(String),

    /// Input did not have the `key=value` shape.
    #[error("expected key=value, got '{0}'")]
    MissingSeparator(String),
}

/// Flatten an attribute map into form pairs.
///
/// Scalars encode as `name=v`, sequences as repeated `name[]=v` pairs and
/// mappings as `name.k=v`, recursing to any depth. Empty strings and `null`
/// are emitted with an empty value; an empty sequence becomes a single
/// `name=` pair so the instruction to clear it still reaches the gateway.
pub fn encode(attributes: &Attributes) -> Vec<(String, String)> {
    let mut pairs = Vec::with_capacity(attributes.len());
    for (name, value) in attributes {
        encode_value(name, value, &mut pairs);
    }
    pairs
}

fn encode_value(key: &str, value: &Value, out: &mut Vec<(String, String)>) {
    match value {
        Value::Array(items) if items.is_empty() => out.push((key.to_owned(), String::new())),
        Value::Array(items) => {
            let key = format!("{key}{SEQUENCE_SUFFIX}");
            for item in items {
                encode_value(&key, item, out);
            }
        }
        Value::Object(map) => {
            for (child, v) in map {
                encode_value(&format!("{key}.{child}"), v, out);
            }
        }
        scalar => out.push((key.to_owned(), scalar_text(scalar))),
    }
}

/// Wire text of a scalar JSON value.
pub fn scalar_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Rebuild an attribute map from pairs written in the wire key syntax.
///
/// This is the inverse used for user input (`--set config.second=2`).
/// Values stay strings; the gateway coerces them against its schema.
pub fn decode<I, K, V>(pairs: I) -> Result<Attributes, ParamError>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: Into<String>,
{
    let mut root = Attributes::new();
    for (key, value) in pairs {
        insert_pair(&mut root, key.as_ref(), value.into())?;
    }
    Ok(root)
}

/// Split `key=value` strings (the first `=` separates) and [`decode`] them.
pub fn decode_assignments<I, S>(assignments: I) -> Result<Attributes, ParamError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let pairs = assignments
        .into_iter()
        .map(|raw| {
            let raw = raw.as_ref();
            raw.split_once('=')
                .map(|(k, v)| (k.to_owned(), v.to_owned()))
                .ok_or_else(|| ParamError::MissingSeparator(raw.to_owned()))
        })
        .collect::<Result<Vec<_>, _>>()?;
    decode(pairs)
}

fn insert_pair(root: &mut Attributes, key: &str, value: String) -> Result<(), ParamError> {
    let (path, is_sequence) = match key.strip_suffix(SEQUENCE_SUFFIX) {
        Some(stripped) => (stripped, true),
        None => (key, false),
    };

    let segments: Vec<&str> = path.split('.').collect();
    if segments.iter().any(|s| s.is_empty()) {
        return Err(ParamError::MalformedKey(key.to_owned()));
    }
    let Some((leaf, parents)) = segments.split_last() else {
        return Err(ParamError::MalformedKey(key.to_owned()));
    };

    let mut node = root;
    for parent in parents {
        let entry = node
            .entry((*parent).to_owned())
            .or_insert_with(|| Value::Object(Map::new()));
        node = match entry {
            Value::Object(map) => map,
            _ => return Err(ParamError::ShapeMismatch(key.to_owned())),
        };
    }

    if is_sequence {
        let entry = node
            .entry((*leaf).to_owned())
            .or_insert_with(|| Value::Array(Vec::new()));
        match entry {
            Value::Array(items) => items.push(Value::String(value)),
            _ => return Err(ParamError::ShapeMismatch(key.to_owned())),
        }
    } else {
        match node.get(*leaf) {
            None => {
                node.insert((*leaf).to_owned(), Value::String(value));
            }
            Some(Value::Array(_) | Value::Object(_)) => {
                return Err(ParamError::ShapeMismatch(key.to_owned()));
            }
            Some(_) => return Err(ParamError::DuplicateKey(key.to_owned())),
        }
    }
    Ok(())
}
