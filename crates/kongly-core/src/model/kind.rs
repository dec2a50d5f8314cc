// ── Resource kinds ──
//
// Per-kind knowledge the generic client needs: collection path, natural
// key, and which collections a kind may be nested under. Kind-specific
// payload fields are deliberately absent.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Every entity kind managed through the Admin API.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(ascii_case_insensitive)]
pub enum ResourceKind {
    #[strum(to_string = "service", serialize = "services")]
    Service,
    #[strum(to_string = "route", serialize = "routes")]
    Route,
    #[strum(to_string = "consumer", serialize = "consumers")]
    Consumer,
    #[strum(to_string = "plugin", serialize = "plugins")]
    Plugin,
    #[strum(to_string = "upstream", serialize = "upstreams")]
    Upstream,
    #[strum(to_string = "target", serialize = "targets")]
    Target,
    #[strum(to_string = "certificate", serialize = "certificates")]
    Certificate,
    #[strum(to_string = "sni", serialize = "snis")]
    Sni,
}

impl ResourceKind {
    /// Collection path segment (`/services/`, `/snis/`, ...).
    pub fn collection(self) -> &'static str {
        match self {
            Self::Service => "services",
            Self::Route => "routes",
            Self::Consumer => "consumers",
            Self::Plugin => "plugins",
            Self::Upstream => "upstreams",
            Self::Target => "targets",
            Self::Certificate => "certificates",
            Self::Sni => "snis",
        }
    }

    /// Attribute that uniquely names an entity of this kind and can be
    /// used in place of its id on entity paths.
    ///
    /// Plugins and certificates have no human key, so their natural key
    /// is the `id` itself.
    pub fn natural_key(self) -> &'static str {
        match self {
            Self::Service | Self::Route | Self::Upstream | Self::Sni => "name",
            Self::Consumer => "username",
            Self::Target => "target",
            Self::Plugin | Self::Certificate => "id",
        }
    }

    /// Collections this kind may be listed or created under
    /// (`/services/{service}/routes`, `/upstreams/{upstream}/targets`).
    pub fn parents(self) -> &'static [ResourceKind] {
        match self {
            Self::Route => &[Self::Service],
            Self::Plugin => &[Self::Service, Self::Route, Self::Consumer],
            Self::Target => &[Self::Upstream],
            Self::Sni => &[Self::Certificate],
            Self::Service | Self::Consumer | Self::Upstream | Self::Certificate => &[],
        }
    }

    /// Targets only exist inside an upstream.
    pub fn requires_parent(self) -> bool {
        matches!(self, Self::Target)
    }

    pub fn can_nest_under(self, parent: ResourceKind) -> bool {
        self.parents().contains(&parent)
    }
}
