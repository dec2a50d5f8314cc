#![allow(clippy::unwrap_used, dead_code)]
// In-memory stand-in for the gateway Admin API.
//
// Mounted as a catch-all wiremock responder. It keeps entities per
// collection, decodes form bodies with the same key syntax the client
// encodes, and mimics the gateway's status codes closely enough to drive
// the resource client end to end.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use percent_encoding::percent_decode_str;
use serde_json::{Map, Value, json};
use wiremock::matchers::any;
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

use kongly_core::Gateway;

pub const DEFAULT_PAGE_SIZE: usize = 100;

#[derive(Debug, Default)]
struct State {
    collections: BTreeMap<String, Vec<Map<String, Value>>>,
    requests: Vec<(String, String)>,
    clock: i64,
}

/// Handle to the fake's state; clones share it.
#[derive(Debug, Clone, Default)]
pub struct FakeAdmin {
    state: Arc<Mutex<State>>,
}

impl FakeAdmin {
    /// Start a mock server backed by an empty fake.
    pub async fn start() -> (MockServer, FakeAdmin, Gateway) {
        let server = MockServer::start().await;
        let fake = FakeAdmin::default();
        Mock::given(any())
            .respond_with(fake.clone())
            .mount(&server)
            .await;
        let admin = kongly_api::AdminClient::new(&server.uri(), &Default::default()).unwrap();
        (server, fake, Gateway::from_admin(admin))
    }

    /// `(method, path)` of every request seen so far.
    pub fn requests(&self) -> Vec<(String, String)> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn count(&self, method: &str) -> usize {
        self.requests().iter().filter(|(m, _)| m == method).count()
    }

    pub fn len(&self, collection: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .collections
            .get(collection)
            .map_or(0, Vec::len)
    }
}

fn natural_key(collection: &str) -> &'static str {
    match collection {
        "consumers" => "username",
        "targets" => "target",
        "plugins" | "certificates" => "id",
        _ => "name",
    }
}

/// `services` -> `service`, the attribute a child uses to reference it.
fn reference_field(collection: &str) -> &str {
    collection.strip_suffix('s').unwrap_or(collection)
}

fn not_found() -> ResponseTemplate {
    ResponseTemplate::new(404).set_body_json(json!({ "message": "Not found" }))
}

fn matches_key(entity: &Map<String, Value>, collection: &str, key: &str) -> bool {
    entity.get("id").and_then(Value::as_str) == Some(key)
        || entity
            .get(natural_key(collection))
            .is_some_and(|v| v.as_str().map_or_else(|| v.to_string() == key, |s| s == key))
}

/// Form values arrive as text; give numbers and booleans their JSON type.
fn coerce(value: Value) -> Value {
    match value {
        Value::String(s) => {
            if let Ok(n) = s.parse::<i64>() {
                json!(n)
            } else if s == "true" || s == "false" {
                Value::Bool(s == "true")
            } else {
                Value::String(s)
            }
        }
        Value::Array(items) => Value::Array(items.into_iter().map(coerce).collect()),
        Value::Object(map) => Value::Object(map.into_iter().map(|(k, v)| (k, coerce(v))).collect()),
        other => other,
    }
}

fn decode_body(request: &Request) -> Result<Map<String, Value>, ResponseTemplate> {
    let pairs = url::form_urlencoded::parse(&request.body).into_owned();
    let attrs = kongly_core::decode(pairs).map_err(|e| {
        ResponseTemplate::new(400).set_body_json(json!({ "message": e.to_string() }))
    })?;
    match coerce(Value::Object(attrs)) {
        Value::Object(map) => Ok(map),
        _ => unreachable!(),
    }
}

fn merge(target: &mut Map<String, Value>, patch: Map<String, Value>) {
    for (key, value) in patch {
        match (target.get_mut(&key), value) {
            (Some(Value::Object(existing)), Value::Object(inner)) => merge(existing, inner),
            (_, value) => {
                target.insert(key, value);
            }
        }
    }
}

impl State {
    fn tick(&mut self) -> i64 {
        self.clock += 1;
        1_700_000_000 + self.clock
    }

    fn find(&self, collection: &str, key: &str) -> Option<usize> {
        self.collections
            .get(collection)?
            .iter()
            .position(|e| matches_key(e, collection, key))
    }

    fn key_taken(&self, collection: &str, attrs: &Map<String, Value>, except: Option<&str>) -> Option<String> {
        let field = natural_key(collection);
        if field == "id" {
            return None;
        }
        let wanted = attrs.get(field)?;
        self.collections.get(collection)?.iter().find_map(|e| {
            let same = e.get(field) == Some(wanted);
            let other = e.get("id").and_then(Value::as_str) != except;
            (same && other).then(|| format!("already exists with value '{}'", wanted.as_str().unwrap_or_default()))
        })
    }

    fn insert(&mut self, collection: &str, mut attrs: Map<String, Value>) -> ResponseTemplate {
        if let Some(msg) = self.key_taken(collection, &attrs, None) {
            return ResponseTemplate::new(409).set_body_json(json!({ natural_key(collection): msg }));
        }
        if !attrs.contains_key("id") {
            attrs.insert("id".into(), json!(uuid::Uuid::new_v4().to_string()));
        }
        let now = self.tick();
        attrs.insert("created_at".into(), json!(now));
        attrs.insert("updated_at".into(), json!(now));
        self.collections
            .entry(collection.to_owned())
            .or_default()
            .push(attrs.clone());
        ResponseTemplate::new(201).set_body_json(Value::Object(attrs))
    }

    fn list(&self, collection: &str, parent: Option<(&str, String)>, request: &Request) -> ResponseTemplate {
        let query: BTreeMap<String, String> = request.url.query_pairs().into_owned().collect();
        let size = query
            .get("size")
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(DEFAULT_PAGE_SIZE);
        let start = match query.get("offset") {
            None => 0,
            Some(raw) => match raw.strip_prefix("pos-").and_then(|n| n.parse::<usize>().ok()) {
                Some(n) => n,
                None => {
                    return ResponseTemplate::new(400)
                        .set_body_json(json!({ "message": format!("invalid offset: {raw}") }));
                }
            },
        };

        let items: Vec<&Map<String, Value>> = self
            .collections
            .get(collection)
            .map(|all| {
                all.iter()
                    .filter(|e| match &parent {
                        Some((field, id)) => {
                            e.get(*field).and_then(|r| r.get("id")).and_then(Value::as_str)
                                == Some(id.as_str())
                        }
                        None => true,
                    })
                    .collect()
            })
            .unwrap_or_default();

        let page: Vec<Value> = items
            .iter()
            .skip(start)
            .take(size)
            .map(|e| Value::Object((*e).clone()))
            .collect();
        let end = start + page.len();

        // Old gateways send `{}` for an empty list.
        let data = if page.is_empty() { json!({}) } else { Value::Array(page) };
        let mut body = json!({ "data": data, "total": items.len() });
        if end < items.len() {
            body["offset"] = json!(format!("pos-{end}"));
            body["next"] = json!(format!("/{collection}?offset=pos-{end}&size={size}"));
        } else {
            body["next"] = Value::Null;
        }
        ResponseTemplate::new(200).set_body_json(body)
    }
}

impl Respond for FakeAdmin {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let mut state = self.state.lock().unwrap();
        let method = request.method.as_str().to_owned();
        state
            .requests
            .push((method.clone(), request.url.path().to_owned()));

        let segments: Vec<String> = request
            .url
            .path()
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|s| percent_decode_str(s).decode_utf8_lossy().into_owned())
            .collect();
        let segs: Vec<&str> = segments.iter().map(String::as_str).collect();

        match (method.as_str(), segs.as_slice()) {
            ("GET", [collection]) => state.list(collection, None, request),
            ("GET", [parent, pkey, collection]) => {
                let Some(idx) = state.find(parent, pkey) else {
                    return not_found();
                };
                let parent_id = state.collections[*parent][idx]["id"]
                    .as_str()
                    .unwrap_or_default()
                    .to_owned();
                state.list(collection, Some((reference_field(parent), parent_id)), request)
            }
            ("GET", [collection, key]) | ("GET", [_, _, collection, key]) => {
                match state.find(collection, key) {
                    Some(idx) => ResponseTemplate::new(200)
                        .set_body_json(Value::Object(state.collections[*collection][idx].clone())),
                    None => not_found(),
                }
            }
            ("POST", [collection]) => match decode_body(request) {
                Ok(attrs) => state.insert(collection, attrs),
                Err(resp) => resp,
            },
            ("POST", [parent, pkey, collection]) => {
                let Some(idx) = state.find(parent, pkey) else {
                    return not_found();
                };
                let parent_id = state.collections[*parent][idx]["id"].clone();
                match decode_body(request) {
                    Ok(mut attrs) => {
                        attrs.insert(reference_field(parent).to_owned(), json!({ "id": parent_id }));
                        state.insert(collection, attrs)
                    }
                    Err(resp) => resp,
                }
            }
            ("PUT", [collection]) => {
                let attrs = match decode_body(request) {
                    Ok(attrs) => attrs,
                    Err(resp) => return resp,
                };
                let existing = attrs
                    .get("id")
                    .and_then(Value::as_str)
                    .and_then(|id| state.find(collection, id));
                match existing {
                    Some(idx) => {
                        let id = attrs.get("id").and_then(Value::as_str).map(str::to_owned);
                        if let Some(msg) = state.key_taken(collection, &attrs, id.as_deref()) {
                            return ResponseTemplate::new(409)
                                .set_body_json(json!({ natural_key(collection): msg }));
                        }
                        let now = state.tick();
                        let slot = &mut state.collections.get_mut(*collection).unwrap()[idx];
                        let created_at = slot.get("created_at").cloned();
                        let mut replaced = attrs;
                        if let Some(created_at) = created_at {
                            replaced.insert("created_at".into(), created_at);
                        }
                        replaced.insert("updated_at".into(), json!(now));
                        *slot = replaced.clone();
                        ResponseTemplate::new(200).set_body_json(Value::Object(replaced))
                    }
                    None => state.insert(collection, attrs),
                }
            }
            ("PATCH", [collection, key]) | ("PATCH", [_, _, collection, key]) => {
                let Some(idx) = state.find(collection, key) else {
                    return not_found();
                };
                let patch = match decode_body(request) {
                    Ok(attrs) => attrs,
                    Err(resp) => return resp,
                };
                let id = state.collections[*collection][idx]["id"]
                    .as_str()
                    .map(str::to_owned);
                if let Some(msg) = state.key_taken(collection, &patch, id.as_deref()) {
                    return ResponseTemplate::new(409)
                        .set_body_json(json!({ natural_key(collection): msg }));
                }
                let now = state.tick();
                let slot = &mut state.collections.get_mut(*collection).unwrap()[idx];
                merge(slot, patch);
                slot.insert("updated_at".into(), json!(now));
                ResponseTemplate::new(200).set_body_json(Value::Object(slot.clone()))
            }
            ("DELETE", [collection, key]) | ("DELETE", [_, _, collection, key]) => {
                let Some(idx) = state.find(collection, key) else {
                    return not_found();
                };
                let id = state.collections[*collection][idx]["id"].clone();
                let field = reference_field(collection);
                let referenced = state.collections.values().flatten().any(|e| {
                    e.get(field).and_then(|r| r.get("id")) == Some(&id)
                });
                if referenced {
                    return ResponseTemplate::new(409).set_body_json(json!({
                        "message": format!("an existing '{field}' is still referenced")
                    }));
                }
                state.collections.get_mut(*collection).unwrap().remove(idx);
                ResponseTemplate::new(204)
            }
            _ => ResponseTemplate::new(405).set_body_json(json!({ "message": "Method not allowed" })),
        }
    }
}
