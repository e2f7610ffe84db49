/// Core abstractions: server roles and the connection records selection runs over
pub mod registry;

pub use registry::ConnectionRegistry;

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::Level;

/// Role of a server in a replica set (or sharded cluster)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeRole {
    Standalone,
    Primary,
    Secondary,
    Arbiter,
    /// A mongos router in front of a sharded cluster
    #[serde(rename = "mongos")]
    RouterProxy,
}

bitflags::bitflags! {
    /// A set of node roles, used to describe which roles a read mode accepts.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct RoleSet: u8 {
        const STANDALONE = 1 << 0;
        const PRIMARY = 1 << 1;
        const SECONDARY = 1 << 2;
        const ARBITER = 1 << 3;
        const ROUTER_PROXY = 1 << 4;
    }
}

impl NodeRole {
    /// Returns the single-role set for this role.
    pub const fn as_set(self) -> RoleSet {
        match self {
            Self::Standalone => RoleSet::STANDALONE,
            Self::Primary => RoleSet::PRIMARY,
            Self::Secondary => RoleSet::SECONDARY,
            Self::Arbiter => RoleSet::ARBITER,
            Self::RouterProxy => RoleSet::ROUTER_PROXY,
        }
    }

    /// Upper-case label used in connection trace lines
    pub fn display_name(self) -> &'static str {
        match self {
            Self::Standalone => "STANDALONE",
            Self::Primary => "PRIMARY",
            Self::Secondary => "SECONDARY",
            Self::Arbiter => "ARBITER",
            Self::RouterProxy => "MONGOS",
        }
    }
}

impl RoleSet {
    /// Check whether a role is a member of this set
    pub fn admits(self, role: NodeRole) -> bool {
        self.contains(role.as_set())
    }
}

impl fmt::Display for NodeRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// A known server connection as seen by server selection.
///
/// Records are owned by the registry; selection only ever borrows them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    /// Opaque identifier, only used for tracing
    pub id: String,
    pub role: NodeRole,
    /// Last measured round-trip time
    pub latency_ms: u64,
    /// `name:value` labels, in the order the server reported them
    pub tags: Vec<String>,
}

impl Connection {
    pub fn new(id: impl Into<String>, role: NodeRole, latency_ms: u64) -> Self {
        Self {
            id: id.into(),
            role,
            latency_ms,
            tags: Vec::new(),
        }
    }

    /// Builder-style helper that appends a `name:value` tag
    pub fn with_tag(mut self, name: &str, value: &str) -> Self {
        self.tags.push(format!("{}:{}", name, value));
        self
    }

    /// Check whether the connection carries exactly this tag string
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Emit this connection's trace lines, one for the connection and one per tag
    pub(crate) fn trace(&self, level: Level) {
        macro_rules! emit {
            ($lvl:expr) => {{
                tracing::event!(
                    target: crate::LOG_TARGET,
                    $lvl,
                    "- connection: type: {}, ping: {}, hash: {}",
                    self.role,
                    self.latency_ms,
                    self.id
                );
                for tag in &self.tags {
                    tracing::event!(target: crate::LOG_TARGET, $lvl, "  - tag: {}", tag);
                }
            }};
        }

        // event! needs the level at compile time
        if level == Level::ERROR {
            emit!(Level::ERROR)
        } else if level == Level::WARN {
            emit!(Level::WARN)
        } else if level == Level::INFO {
            emit!(Level::INFO)
        } else if level == Level::DEBUG {
            emit!(Level::DEBUG)
        } else {
            emit!(Level::TRACE)
        }
    }
}
