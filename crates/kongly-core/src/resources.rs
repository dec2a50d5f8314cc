// ── Generic resource client ──
//
// One client serves every kind. Per-kind knowledge (collection path,
// natural key, nesting rules) comes from `ResourceKind`; payloads stay
// opaque attribute maps and are flattened by the form encoder.

use kongly_api::{AdminClient, Attributes, ListEnvelope, params};
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::cursor::PageCursor;
use crate::error::{Context, CoreError, Operation};
use crate::model::{Identifier, Page, Resource, ResourceKind, scalar_key};

/// Largest page the Admin API will serve.
pub const MAX_PAGE_SIZE: u32 = 1000;

/// CRUD + upsert for one kind under one base path.
///
/// The base path is either the top-level collection (`/services/`) or a
/// collection nested under a parent entity (`/services/svc_a/routes/`).
/// Holds no mutable state, so clones can be used from any task.
#[derive(Debug, Clone)]
pub struct ResourceClient {
    admin: AdminClient,
    kind: ResourceKind,
    /// Parent collection and parent identifier, for nested clients.
    scope: Option<(ResourceKind, Identifier)>,
}

impl ResourceClient {
    /// Client for the top-level collection of `kind`.
    pub fn new(admin: AdminClient, kind: ResourceKind) -> Result<Self, CoreError> {
        if kind.requires_parent() {
            return Err(CoreError::Unsupported {
                message: format!(
                    "{kind} resources only exist inside a {}",
                    kind.parents().first().map_or("parent".into(), ToString::to_string)
                ),
            });
        }
        Ok(Self {
            admin,
            kind,
            scope: None,
        })
    }

    /// Client for `kind` nested under `parent` (`/upstreams/{id}/targets/`).
    pub fn nested(
        admin: AdminClient,
        parent: ResourceKind,
        parent_id: impl Into<Identifier>,
        kind: ResourceKind,
    ) -> Result<Self, CoreError> {
        if !kind.can_nest_under(parent) {
            return Err(CoreError::Unsupported {
                message: format!("{kind} resources cannot be nested under a {parent}"),
            });
        }
        Ok(Self {
            admin,
            kind,
            scope: Some((parent, parent_id.into())),
        })
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// Collection path relative to the admin base, e.g. `services/svc_a/routes/`.
    pub fn base_path(&self) -> String {
        let mut path = String::new();
        if let Some((parent, ref id)) = self.scope {
            path.push_str(parent.collection());
            path.push('/');
            path.push_str(&id.to_segment());
            path.push('/');
        }
        path.push_str(self.kind.collection());
        path.push('/');
        path
    }

    // ── URL helpers ──────────────────────────────────────────────────

    fn url_for(&self, entity: Option<&Identifier>, ctx: &Context) -> Result<Url, CoreError> {
        let parent_segment = self.scope.as_ref().map(|(_, id)| id.to_segment());
        let entity_segment = entity.map(Identifier::to_segment);

        let mut segments: Vec<&str> = Vec::with_capacity(4);
        if let (Some((parent, _)), Some(id)) = (&self.scope, &parent_segment) {
            segments.push(parent.collection());
            segments.push(id);
        }
        segments.push(self.kind.collection());
        if let Some(ref id) = entity_segment {
            segments.push(id);
        }

        self.admin
            .url(&segments, entity.is_none())
            .map_err(|e| ctx.translate(e))
    }

    fn to_resource(&self, value: Value) -> Result<Resource, CoreError> {
        Resource::from_value(self.kind, value).ok_or_else(|| CoreError::Deserialization {
            kind: self.kind,
            message: "expected a JSON object".into(),
        })
    }

    fn ctx(&self, operation: Operation) -> Context {
        Context::new(self.kind, operation)
    }

    // ── Operations ───────────────────────────────────────────────────

    /// POST the attributes to the collection; the gateway assigns id and
    /// timestamps.
    pub async fn create(&self, attributes: &Attributes) -> Result<Resource, CoreError> {
        let ctx = self.ctx(Operation::Create);
        let url = self.url_for(None, &ctx)?;
        debug!(kind = %self.kind, path = %self.base_path(), "creating resource");

        let value: Value = self
            .admin
            .post_form(url, &params::encode(attributes))
            .await
            .map_err(|e| ctx.translate(e))?;
        self.to_resource(value)
    }

    /// Fetch by id or natural key.
    pub async fn retrieve(&self, identifier: impl Into<Identifier>) -> Result<Resource, CoreError> {
        let identifier = identifier.into();
        self.fetch(&identifier, Operation::Retrieve).await
    }

    /// Like [`retrieve`](Self::retrieve), but a missing resource is `None`.
    pub async fn find(
        &self,
        identifier: impl Into<Identifier>,
    ) -> Result<Option<Resource>, CoreError> {
        let identifier = identifier.into();
        Self::absent_as_none(self.fetch(&identifier, Operation::Retrieve).await)
    }

    fn absent_as_none(result: Result<Resource, CoreError>) -> Result<Option<Resource>, CoreError> {
        match result {
            Ok(resource) => Ok(Some(resource)),
            Err(CoreError::NotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn fetch(
        &self,
        identifier: &Identifier,
        operation: Operation,
    ) -> Result<Resource, CoreError> {
        let ctx = self.ctx(operation).with_identifier(identifier);
        let url = self.url_for(Some(identifier), &ctx)?;
        let value: Value = self.admin.get(url).await.map_err(|e| ctx.translate(e))?;
        self.to_resource(value)
    }

    /// One page of the collection.
    ///
    /// `page_size` is clamped to `1..=1000`. `cursor` is the opaque value
    /// returned by the previous page; a stale cursor is a `BadRequest`.
    pub async fn list(&self, page_size: u32, cursor: Option<&str>) -> Result<Page, CoreError> {
        let ctx = self.ctx(Operation::List);
        let url = self.url_for(None, &ctx)?;
        let size = page_size.clamp(1, MAX_PAGE_SIZE);

        let mut query = vec![("size", size.to_string())];
        if let Some(cursor) = cursor {
            query.push(("offset", cursor.to_owned()));
        }

        let envelope: ListEnvelope = self
            .admin
            .get_with_params(url, &query)
            .await
            .map_err(|e| ctx.translate(e))?;

        let cursor = envelope.cursor();
        let total = envelope.total;
        let resources = envelope
            .data
            .into_iter()
            .map(|v| self.to_resource(v))
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            kind = %self.kind,
            count = resources.len(),
            more = cursor.is_some(),
            "listed page"
        );
        Ok(Page {
            resources,
            cursor,
            total,
        })
    }

    /// Lazy traversal of the whole collection.
    pub fn cursor(&self, page_size: u32) -> PageCursor {
        PageCursor::new(self.clone(), page_size)
    }

    /// PATCH: attributes present are replaced, the rest are left alone.
    pub async fn update(
        &self,
        identifier: impl Into<Identifier>,
        attributes: &Attributes,
    ) -> Result<Resource, CoreError> {
        let identifier = identifier.into();
        let ctx = self.ctx(Operation::Update).with_identifier(&identifier);
        let url = self.url_for(Some(&identifier), &ctx)?;
        debug!(kind = %self.kind, %identifier, "updating resource");

        let value: Value = self
            .admin
            .patch_form(url, &params::encode(attributes))
            .await
            .map_err(|e| ctx.translate(e))?;
        self.to_resource(value)
    }

    /// Create-or-replace keyed by the kind's natural key.
    ///
    /// Looks the key up first. When it resolves, the existing `id` is sent
    /// along so the gateway replaces that entity in full; otherwise the
    /// attributes are sent as-is and the gateway creates one. A 409 is
    /// always reported as a `Conflict`, never taken as success.
    pub async fn upsert(&self, attributes: &Attributes) -> Result<Resource, CoreError> {
        let field = self.kind.natural_key();
        let key = attributes
            .get(field)
            .and_then(scalar_key)
            .ok_or(CoreError::MissingNaturalKey {
                kind: self.kind,
                operation: Operation::Upsert,
                field,
            })?;
        let identifier = Identifier::from(key);

        let existing =
            Self::absent_as_none(self.fetch(&identifier, Operation::Upsert).await)?;

        let mut body = Attributes::new();
        if let Some(id) = existing.as_ref().and_then(|r| r.id.as_ref()) {
            debug!(kind = %self.kind, %identifier, %id, "upsert replaces existing resource");
            body.insert("id".into(), Value::String(id.to_string()));
        } else {
            debug!(kind = %self.kind, %identifier, "upsert creates resource");
        }
        for (name, value) in attributes {
            if name == "id" && body.contains_key("id") {
                continue;
            }
            body.insert(name.clone(), value.clone());
        }

        let ctx = self.ctx(Operation::Upsert).with_identifier(&identifier);
        let url = self.url_for(None, &ctx)?;
        let value: Value = self
            .admin
            .put_form(url, &params::encode(&body))
            .await
            .map_err(|e| ctx.translate(e))?;
        self.to_resource(value)
    }

    /// Remove a resource. Deleting something already gone succeeds; a
    /// resource still referenced by others yields `Conflict`.
    pub async fn delete(&self, identifier: impl Into<Identifier>) -> Result<(), CoreError> {
        let identifier = identifier.into();
        let ctx = self.ctx(Operation::Delete).with_identifier(&identifier);
        let url = self.url_for(Some(&identifier), &ctx)?;

        match self.admin.delete(url).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_not_found() => {
                debug!(kind = %self.kind, %identifier, "delete: already absent");
                Ok(())
            }
            Err(e) => Err(ctx.translate(e)),
        }
    }
}
