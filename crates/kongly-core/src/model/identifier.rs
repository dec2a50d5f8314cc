// ── Resource identity ──
//
// The Admin API addresses an entity either by its server-assigned UUID or,
// for kinds that have one, by a human-chosen unique key (service name,
// consumer username, target host:port). `Identifier` unifies both.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Canonical way to address a single resource.
///
/// A string that parses as a UUID becomes [`Identifier::Id`]; anything else
/// is treated as a natural key. The gateway resolves both on the same path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Identifier {
    Id(Uuid),
    Key(String),
}

impl Identifier {
    pub fn as_uuid(&self) -> Option<&Uuid> {
        match self {
            Self::Id(u) => Some(u),
            Self::Key(_) => None,
        }
    }

    pub fn as_key(&self) -> Option<&str> {
        match self {
            Self::Key(s) => Some(s),
            Self::Id(_) => None,
        }
    }

    /// Path segment form (hyphenated UUID or the key verbatim).
    pub fn to_segment(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(u) => write!(f, "{u}"),
            Self::Key(s) => write!(f, "{s}"),
        }
    }
}

impl FromStr for Identifier {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s.to_owned()))
    }
}

impl From<Uuid> for Identifier {
    fn from(u: Uuid) -> Self {
        Self::Id(u)
    }
}

impl From<String> for Identifier {
    fn from(s: String) -> Self {
        match Uuid::parse_str(&s) {
            Ok(u) => Self::Id(u),
            Err(_) => Self::Key(s),
        }
    }
}

impl From<&str> for Identifier {
    fn from(s: &str) -> Self {
        Self::from(s.to_owned())
    }
}

impl From<&String> for Identifier {
    fn from(s: &String) -> Self {
        Self::from(s.clone())
    }
}

impl From<&Identifier> for Identifier {
    fn from(id: &Identifier) -> Self {
        id.clone()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn identifier_from_uuid_string() {
        let id = Identifier::from("5cf0494f-ded9-470c-82ef-07059b1d5c8e");
        assert!(id.as_uuid().is_some());
    }

    #[test]
    fn identifier_from_name() {
        let id = Identifier::from("api_users");
        assert_eq!(id.as_key(), Some("api_users"));
    }

    #[test]
    fn target_host_port_is_a_key() {
        let id: Identifier = "10.0.0.1:8080".parse().unwrap();
        assert_eq!(id.as_key(), Some("10.0.0.1:8080"));
    }

    #[test]
    fn identifier_display_round_trips() {
        let uuid = Uuid::parse_str("fb344495-6aee-4909-8213-821d1dbd04bd").unwrap();
        let id = Identifier::Id(uuid);
        assert_eq!(id.to_segment(), "fb344495-6aee-4909-8213-821d1dbd04bd");
        assert_eq!(Identifier::from(id.to_string()), id);
    }
}
