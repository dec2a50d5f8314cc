// ── Gateway facade ──
//
// Entry point for consumers: owns the admin HTTP client built from a
// `GatewayConfig` and hands out per-kind resource clients that share it.

use kongly_api::{AdminClient, EnabledPlugins};
use serde_json::Value;
use tracing::debug;

use crate::config::GatewayConfig;
use crate::error::{Context, CoreError, Operation};
use crate::model::{Identifier, Resource, ResourceKind};
use crate::resources::ResourceClient;

/// A connection to one gateway's Admin API.
///
/// Cheap to clone; every clone and every `ResourceClient` it hands out
/// share one connection pool.
#[derive(Debug, Clone)]
pub struct Gateway {
    admin: AdminClient,
}

impl Gateway {
    pub fn new(config: &GatewayConfig) -> Result<Self, CoreError> {
        let admin = AdminClient::new(config.admin_url.as_str(), &config.transport()).map_err(
            |e| CoreError::Config {
                message: format!("cannot set up admin client: {e}"),
            },
        )?;
        debug!(admin_url = %admin.base_url(), "gateway client ready");
        Ok(Self { admin })
    }

    /// Wrap an already-built admin client.
    pub fn from_admin(admin: AdminClient) -> Self {
        Self { admin }
    }

    pub fn admin(&self) -> &AdminClient {
        &self.admin
    }

    /// Client for the top-level collection of `kind`.
    pub fn resources(&self, kind: ResourceKind) -> Result<ResourceClient, CoreError> {
        ResourceClient::new(self.admin.clone(), kind)
    }

    /// Client for `kind` under one parent, e.g. the routes of a service.
    pub fn nested(
        &self,
        parent: ResourceKind,
        parent_id: impl Into<Identifier>,
        kind: ResourceKind,
    ) -> Result<ResourceClient, CoreError> {
        ResourceClient::nested(self.admin.clone(), parent, parent_id, kind)
    }

    /// Names of the plugins this gateway has loaded.
    pub async fn enabled_plugins(&self) -> Result<Vec<String>, CoreError> {
        let ctx = Context::new(ResourceKind::Plugin, Operation::List);
        let url = self
            .admin
            .url(&["plugins", "enabled"], false)
            .map_err(|e| ctx.translate(e))?;
        let enabled: EnabledPlugins = self.admin.get(url).await.map_err(|e| ctx.translate(e))?;
        Ok(enabled.names())
    }

    /// Configuration schema of one plugin, as returned by the gateway.
    pub async fn plugin_schema(&self, name: &str) -> Result<Value, CoreError> {
        let ctx = Context::new(ResourceKind::Plugin, Operation::Retrieve).with_identifier(name);
        let url = self
            .admin
            .url(&["plugins", "schema", name], false)
            .map_err(|e| ctx.translate(e))?;
        self.admin.get(url).await.map_err(|e| ctx.translate(e))
    }

    /// The service a route forwards to.
    pub async fn route_service(
        &self,
        route: impl Into<Identifier>,
    ) -> Result<Resource, CoreError> {
        let route = route.into();
        let ctx = Context::new(ResourceKind::Route, Operation::Retrieve).with_identifier(&route);
        let segment = route.to_segment();
        let url = self
            .admin
            .url(&["routes", segment.as_str(), "service"], false)
            .map_err(|e| ctx.translate(e))?;
        let value: Value = self.admin.get(url).await.map_err(|e| ctx.translate(e))?;
        Resource::from_value(ResourceKind::Service, value).ok_or_else(|| {
            CoreError::Deserialization {
                kind: ResourceKind::Service,
                message: "expected a JSON object".into(),
            }
        })
    }
}
