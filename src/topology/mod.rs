//! Network topology module.
//!
//! This module contains the topology graph model (hosts, switches and the
//! links between them), the builder used to construct it, structural
//! analysis helpers and the catalog of built-in topologies.

pub mod analysis;
pub mod builder;
pub mod catalog;
pub mod error;
pub mod types;

// Re-export key types for easier access
pub use analysis::{analyze, TopologyReport};
pub use builder::{BuilderState, LinkHandle, NodeHandle, TopologyBuilder};
pub use catalog::{build_named, CATALOG, DEFAULT_TOPOLOGY};
pub use error::{TopologyError, TopologyWarning};
pub use types::{Link, Node, NodeKind, SwitchVariant, Topology};
