//! Command dispatch: bridges CLI args -> core operations -> output formatting.

pub mod config_cmd;
pub mod link;
pub mod resources;
pub mod util;

use kongly_core::{Gateway, ResourceKind};

use crate::cli::{Command, GlobalOpts};
use crate::error::CliError;

/// Dispatch a gateway-bound command to the appropriate handler.
pub async fn dispatch(
    cmd: Command,
    gateway: &Gateway,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match cmd {
        Command::Services(args) => {
            resources::plain(gateway, ResourceKind::Service, args, global).await
        }
        Command::Routes(args) => resources::routes(gateway, args, global).await,
        Command::Consumers(args) => {
            resources::plain(gateway, ResourceKind::Consumer, args, global).await
        }
        Command::Plugins(args) => resources::plugins(gateway, args, global).await,
        Command::Upstreams(args) => {
            resources::plain(gateway, ResourceKind::Upstream, args, global).await
        }
        Command::Targets(args) => resources::targets(gateway, args, global).await,
        Command::Certificates(args) => {
            resources::plain(gateway, ResourceKind::Certificate, args, global).await
        }
        Command::Snis(args) => resources::snis(gateway, args, global).await,
        // Link, Config and Completions are handled before dispatch
        Command::Link(_) | Command::Config(_) | Command::Completions(_) => {
            Err(CliError::Internal("command does not use the Admin API".into()))
        }
    }
}
