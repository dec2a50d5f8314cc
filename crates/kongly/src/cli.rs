//! Clap derive structures for the `kongly` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// kongly -- manage a Kong gateway through its Admin API
#[derive(Debug, Parser)]
#[command(
    name = "kongly",
    version,
    about = "Manage Kong gateway resources and signed download links",
    long_about = "Create, inspect, update and remove Kong gateway entities \
        (services, routes, consumers, plugins, upstreams, targets, certificates, SNIs) \
        through the Admin API, and sign or verify nginx secure_link download URLs.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Gateway profile to use
    #[arg(long, short = 'p', env = "KONGLY_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Admin API URL (overrides profile)
    #[arg(long, short = 'a', env = "KONGLY_ADMIN", global = true)]
    pub admin: Option<String>,

    /// Admin token sent as Kong-Admin-Token
    #[arg(long, env = "KONGLY_ADMIN_TOKEN", global = true, hide_env_values = true)]
    pub admin_token: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "KONGLY_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept self-signed TLS certificates on the Admin API
    #[arg(long, short = 'k', env = "KONGLY_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds (overrides profile)
    #[arg(long, env = "KONGLY_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output Enum ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage services (upstream APIs)
    #[command(alias = "svc")]
    Services(ResourceArgs),

    /// Manage routes
    #[command(alias = "rt")]
    Routes(RoutesArgs),

    /// Manage consumers
    Consumers(ResourceArgs),

    /// Manage plugins
    Plugins(PluginsArgs),

    /// Manage load-balancing upstreams
    Upstreams(ResourceArgs),

    /// Manage the targets of an upstream
    Targets(TargetsArgs),

    /// Manage TLS certificates
    #[command(alias = "certs")]
    Certificates(ResourceArgs),

    /// Manage SNIs
    Snis(SnisArgs),

    /// Sign and verify secure download links
    Link(LinkArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Shared Resource Arguments ────────────────────────────────────────

/// Pagination arguments shared by every list command.
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Results per page (1-1000)
    #[arg(long, short = 'n', default_value = "100")]
    pub size: u32,

    /// Cursor returned by a previous page
    #[arg(long)]
    pub offset: Option<String>,

    /// Follow the cursor through every page
    #[arg(long, conflicts_with = "offset")]
    pub all: bool,
}

/// Attribute input for create, update and upsert.
#[derive(Debug, Args)]
pub struct WriteArgs {
    /// Attribute in form-key syntax: name=svc, protocols[]=https, config.minute=20
    #[arg(long = "set", short = 's', value_name = "KEY=VALUE")]
    pub set: Vec<String>,

    /// JSON object of attributes; --set values are applied on top
    #[arg(long, short = 'F', value_name = "FILE")]
    pub from_file: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum ResourceCommand {
    /// List resources
    #[command(alias = "ls")]
    List(ListArgs),

    /// Show one resource
    Get {
        /// ID or natural key (name, username, host:port)
        id: String,
    },

    /// Create a resource
    Create(WriteArgs),

    /// Change some attributes of a resource
    Update {
        /// ID or natural key
        id: String,

        #[command(flatten)]
        write: WriteArgs,
    },

    /// Create, or replace the resource with the same natural key
    Upsert(WriteArgs),

    /// Delete a resource
    #[command(alias = "rm")]
    Delete {
        /// ID or natural key
        id: String,
    },
}

#[derive(Debug, Args)]
pub struct ResourceArgs {
    #[command(subcommand)]
    pub command: ResourceCommand,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  ROUTES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct RoutesArgs {
    /// Only the routes of this service
    #[arg(long, global = true)]
    pub service: Option<String>,

    #[command(subcommand)]
    pub command: RoutesCommand,
}

#[derive(Debug, Subcommand)]
pub enum RoutesCommand {
    #[command(flatten)]
    Resource(ResourceCommand),

    /// Show the service a route forwards to
    Service {
        /// Route ID or name
        route: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  PLUGINS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct PluginsArgs {
    /// Only the plugins applied to this service
    #[arg(long, global = true, conflicts_with_all = ["route", "consumer"])]
    pub service: Option<String>,

    /// Only the plugins applied to this route
    #[arg(long, global = true, conflicts_with = "consumer")]
    pub route: Option<String>,

    /// Only the plugins applied to this consumer
    #[arg(long, global = true)]
    pub consumer: Option<String>,

    #[command(subcommand)]
    pub command: PluginsCommand,
}

#[derive(Debug, Subcommand)]
pub enum PluginsCommand {
    #[command(flatten)]
    Resource(ResourceCommand),

    /// List plugins the gateway has loaded
    Enabled,

    /// Show a plugin's configuration schema
    Schema {
        /// Plugin name (e.g. rate-limiting)
        name: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  TARGETS / SNIS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct TargetsArgs {
    /// Upstream the targets belong to (required)
    #[arg(long, short = 'u', global = true)]
    pub upstream: Option<String>,

    #[command(subcommand)]
    pub command: ResourceCommand,
}

#[derive(Debug, Args)]
pub struct SnisArgs {
    /// Only the SNIs of this certificate
    #[arg(long, global = true)]
    pub certificate: Option<String>,

    #[command(subcommand)]
    pub command: ResourceCommand,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  LINK
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct LinkArgs {
    #[command(subcommand)]
    pub command: LinkCommand,
}

#[derive(Debug, Args)]
pub struct LinkSecretArgs {
    /// Signing secret (overrides profile)
    #[arg(long, env = "KONGLY_LINK_SECRET", hide_env_values = true)]
    pub secret: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum LinkCommand {
    /// Sign a download path
    Sign {
        /// Path to sign, e.g. /downloads/nginx.tar.gz
        path: String,

        /// Absolute expiry as a unix timestamp
        #[arg(long, short = 'e', conflicts_with = "ttl")]
        expires: Option<i64>,

        /// Lifetime in seconds from now
        #[arg(long, default_value = "3600")]
        ttl: u64,

        /// Host to prefix the link with (overrides profile link_base)
        #[arg(long)]
        base: Option<String>,

        #[command(flatten)]
        secret: LinkSecretArgs,
    },

    /// Check a signed link
    Verify {
        /// Signed URL or path with ?st=..&e=..
        url: String,

        /// Check as of this unix timestamp instead of now
        #[arg(long)]
        now: Option<i64>,

        #[command(flatten)]
        secret: LinkSecretArgs,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum SecretName {
    /// Admin API token
    AdminToken,
    /// Signed-link secret
    LinkSecret,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Print the config file location
    Path,

    /// Display the current configuration (secrets masked)
    Show,

    /// Create or extend the config file with guided setup
    Init,

    /// List configured profiles
    Profiles,

    /// Set the default profile
    Use {
        /// Profile name to set as default
        name: String,
    },

    /// Store a secret in the system keyring
    SetSecret {
        /// Which secret to store
        #[arg(value_enum)]
        name: SecretName,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
