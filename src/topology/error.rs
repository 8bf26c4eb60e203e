//! Construction errors and warnings.

use crate::utils::address::AddressError;
use std::fmt;

/// Errors raised while building a topology
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TopologyError {
    #[error("node '{name}' already exists")]
    DuplicateNode { name: String },

    #[error("unknown node: {node}")]
    UnknownNode { node: String },

    #[error("topology builder is closed; no further nodes or links can be added")]
    BuilderClosed,

    #[error("invalid address '{address}' for host '{host}': {source}")]
    InvalidAddress {
        host: String,
        address: String,
        #[source]
        source: AddressError,
    },

    #[error("invalid node name '{name}': {reason}")]
    InvalidName { name: String, reason: &'static str },

    #[error("unknown topology '{name}' (available: {available})")]
    UnknownTopology { name: String, available: String },
}

/// Non-fatal findings recorded while building.
///
/// The link is kept in both cases; intent (redundancy vs. mistake) cannot
/// be told apart at build time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TopologyWarning {
    /// A node was linked to itself
    SelfLink { node: String },
    /// A link joins a pair that was already linked; `count` is the
    /// number of links between the pair including this one
    ParallelLink { a: String, b: String, count: usize },
}

impl fmt::Display for TopologyWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SelfLink { node } => write!(f, "node '{}' is linked to itself", node),
            Self::ParallelLink { a, b, count } => write!(
                f,
                "link {}-{} duplicates an existing link ({} links between the pair)",
                a, b, count
            ),
        }
    }
}
