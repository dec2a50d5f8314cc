//! Resource command handlers, shared by every entity kind.

use kongly_core::{Gateway, Resource, ResourceClient, ResourceKind};
use serde_json::Value;
use tabled::Tabled;

use crate::cli::{
    GlobalOpts, ListArgs, OutputFormat, PluginsArgs, PluginsCommand, ResourceArgs,
    ResourceCommand, RoutesArgs, RoutesCommand, SnisArgs, TargetsArgs,
};
use crate::error::CliError;
use crate::output;

use super::util;

// ── Table rows ──────────────────────────────────────────────────────

#[derive(Tabled)]
struct ResourceRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Key")]
    key: String,
    #[tabled(rename = "Detail")]
    detail: String,
    #[tabled(rename = "Created")]
    created: String,
}

impl From<&Resource> for ResourceRow {
    fn from(r: &Resource) -> Self {
        Self {
            id: r.id.as_ref().map_or_else(|| "-".into(), ToString::to_string),
            key: r.natural_key().unwrap_or_else(|| "-".into()),
            detail: summary(r),
            created: r
                .created_at
                .map_or_else(|| "-".into(), |t| t.format("%Y-%m-%d %H:%M").to_string()),
        }
    }
}

#[derive(Tabled)]
struct PluginNameRow {
    #[tabled(rename = "Plugin")]
    name: String,
}

/// The one attribute that best describes a resource in a list.
fn summary(r: &Resource) -> String {
    match r.kind {
        ResourceKind::Service => {
            let host = util::cell(r.get("host"));
            match r.get("port") {
                Some(port) => format!("{host}:{}", util::cell(Some(port))),
                None => host,
            }
        }
        ResourceKind::Route => util::cell(r.get("paths").or_else(|| r.get("hosts"))),
        ResourceKind::Consumer => util::cell(r.get("custom_id")),
        ResourceKind::Plugin => {
            let name = util::cell(r.get("name"));
            match r.get("enabled") {
                Some(Value::Bool(false)) => format!("{name} (disabled)"),
                _ => name,
            }
        }
        ResourceKind::Upstream => util::cell(r.get("algorithm")),
        ResourceKind::Target => format!("weight {}", util::cell(r.get("weight"))),
        ResourceKind::Certificate => util::cell(r.get("snis")),
        ResourceKind::Sni => r
            .reference("certificate")
            .map_or_else(|| "-".into(), |c| c.id.to_string()),
    }
}

fn detail(r: &Resource) -> String {
    let width = r
        .attributes
        .keys()
        .map(String::len)
        .chain([7])
        .max()
        .unwrap_or(7)
        + 2;
    let mut lines = vec![
        format!("{:<width$}{}", "ID:", r.id.as_ref().map_or_else(|| "-".into(), ToString::to_string)),
    ];
    for (key, value) in &r.attributes {
        let rendered = match value {
            Value::Object(_) => value.to_string(),
            other => util::cell(Some(other)),
        };
        lines.push(format!("{:<width$}{rendered}", format!("{key}:")));
    }
    if let Some(t) = r.created_at {
        lines.push(format!("{:<width$}{}", "Created:", t.to_rfc3339()));
    }
    if let Some(t) = r.updated_at {
        lines.push(format!("{:<width$}{}", "Updated:", t.to_rfc3339()));
    }
    lines.join("\n")
}

fn plain_id(r: &Resource) -> String {
    r.natural_key()
        .or_else(|| r.id.as_ref().map(ToString::to_string))
        .unwrap_or_default()
}

fn print_resource(r: &Resource, global: &GlobalOpts) -> Result<(), CliError> {
    let out = output::render_single(global.output, r, detail, plain_id)?;
    output::print_output(&out, global.quiet);
    Ok(())
}

// ── Generic handler ─────────────────────────────────────────────────

/// Run one CRUD command against `client`'s collection.
pub async fn handle(
    client: &ResourceClient,
    cmd: ResourceCommand,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let kind = client.kind();
    match cmd {
        ResourceCommand::List(list) => list_resources(client, &list, global).await,

        ResourceCommand::Get { id } => {
            let resource = client.retrieve(id).await?;
            print_resource(&resource, global)
        }

        ResourceCommand::Create(write) => {
            let attributes = util::build_attributes(&write)?;
            let resource = client.create(&attributes).await?;
            if !global.quiet {
                eprintln!("{kind} created");
            }
            print_resource(&resource, global)
        }

        ResourceCommand::Update { id, write } => {
            let attributes = util::build_attributes(&write)?;
            let resource = client.update(id, &attributes).await?;
            if !global.quiet {
                eprintln!("{kind} updated");
            }
            print_resource(&resource, global)
        }

        ResourceCommand::Upsert(write) => {
            let attributes = util::build_attributes(&write)?;
            let resource = client.upsert(&attributes).await?;
            if !global.quiet {
                eprintln!("{kind} upserted");
            }
            print_resource(&resource, global)
        }

        ResourceCommand::Delete { id } => {
            if !util::confirm(&format!("Delete {kind} '{id}'?"), global.yes)? {
                return Ok(());
            }
            client.delete(id).await?;
            if !global.quiet {
                eprintln!("{kind} deleted");
            }
            Ok(())
        }
    }
}

async fn list_resources(
    client: &ResourceClient,
    list: &ListArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let (resources, next) = if list.all {
        (client.cursor(list.size).collect_all().await?, None)
    } else {
        let page = client.list(list.size, list.offset.as_deref()).await?;
        (page.resources, page.cursor)
    };

    let out = output::render_list(
        global.output,
        &resources,
        |r| ResourceRow::from(r),
        plain_id,
    )?;
    output::print_output(&out, global.quiet);

    if let Some(cursor) = next {
        if !global.quiet && global.output != OutputFormat::Plain {
            eprintln!("More results: --offset {cursor}");
        }
    }
    Ok(())
}

// ── Per-kind entry points ───────────────────────────────────────────

/// Top-level kinds with no parent scope.
pub async fn plain(
    gateway: &Gateway,
    kind: ResourceKind,
    args: ResourceArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let client = gateway.resources(kind)?;
    handle(&client, args.command, global).await
}

pub async fn routes(
    gateway: &Gateway,
    args: RoutesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        RoutesCommand::Resource(cmd) => {
            let client = match args.service {
                Some(service) => gateway.nested(ResourceKind::Service, service, ResourceKind::Route)?,
                None => gateway.resources(ResourceKind::Route)?,
            };
            handle(&client, cmd, global).await
        }
        RoutesCommand::Service { route } => {
            let service = gateway.route_service(route).await?;
            print_resource(&service, global)
        }
    }
}

pub async fn plugins(
    gateway: &Gateway,
    args: PluginsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        PluginsCommand::Resource(cmd) => {
            let scope = args
                .service
                .map(|id| (ResourceKind::Service, id))
                .or_else(|| args.route.map(|id| (ResourceKind::Route, id)))
                .or_else(|| args.consumer.map(|id| (ResourceKind::Consumer, id)));
            let client = match scope {
                Some((parent, id)) => gateway.nested(parent, id, ResourceKind::Plugin)?,
                None => gateway.resources(ResourceKind::Plugin)?,
            };
            handle(&client, cmd, global).await
        }

        PluginsCommand::Enabled => {
            let names = gateway.enabled_plugins().await?;
            let out = output::render_list(
                global.output,
                &names,
                |n| PluginNameRow { name: n.clone() },
                String::clone,
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        PluginsCommand::Schema { name } => {
            let schema = gateway.plugin_schema(&name).await?;
            let out = output::render_single(
                global.output,
                &schema,
                |s| serde_json::to_string_pretty(s).unwrap_or_else(|_| s.to_string()),
                |s| s.to_string(),
            )?;
            output::print_output(&out, global.quiet);
            Ok(())
        }
    }
}

pub async fn targets(
    gateway: &Gateway,
    args: TargetsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let upstream = args.upstream.ok_or_else(|| CliError::Validation {
        field: "upstream".into(),
        reason: "required for targets".into(),
    })?;
    let client = gateway.nested(ResourceKind::Upstream, upstream, ResourceKind::Target)?;
    handle(&client, args.command, global).await
}

pub async fn snis(gateway: &Gateway, args: SnisArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let client = match args.certificate {
        Some(cert) => gateway.nested(ResourceKind::Certificate, cert, ResourceKind::Sni)?,
        None => gateway.resources(ResourceKind::Sni)?,
    };
    handle(&client, args.command, global).await
}
