//! Topology type definitions.
//!
//! Nodes, links and the frozen [`Topology`] graph handed to an emulation
//! runtime. The graph is a multigraph: parallel links and self-links are
//! stored exactly as they were added.

use crate::utils::address::HostAddress;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Switch implementation requested from the runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SwitchVariant {
    /// The runtime's standard software switch
    Standard,
    /// Open vSwitch backed switch attached to the controller
    Ovs,
    /// Open vSwitch in standalone bridge mode (no controller)
    OvsBridge,
    /// User-space switch
    User,
    /// Plain Linux bridge
    LinuxBridge,
}

impl SwitchVariant {
    pub const ALL: [SwitchVariant; 5] = [
        SwitchVariant::Standard,
        SwitchVariant::Ovs,
        SwitchVariant::OvsBridge,
        SwitchVariant::User,
        SwitchVariant::LinuxBridge,
    ];

    /// Canonical name used in dumps and configuration files
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Ovs => "ovs",
            Self::OvsBridge => "ovs-bridge",
            Self::User => "user",
            Self::LinuxBridge => "linux-bridge",
        }
    }

    /// Returns true if switches of this variant talk to a controller
    pub fn uses_controller(&self) -> bool {
        !matches!(self, Self::OvsBridge | Self::LinuxBridge)
    }
}

impl fmt::Display for SwitchVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SwitchVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect::<String>()
            .to_ascii_lowercase();

        match normalized.as_str() {
            "standard" | "default" | "switch" => Ok(Self::Standard),
            "ovs" | "ovsswitch" | "ovsk" | "ovskernelswitch" => Ok(Self::Ovs),
            "ovsbridge" | "ovsbr" => Ok(Self::OvsBridge),
            "user" | "userswitch" => Ok(Self::User),
            "linuxbridge" | "lxbr" => Ok(Self::LinuxBridge),
            _ => Err(format!(
                "unknown switch variant '{}' (expected one of: {})",
                s,
                Self::ALL.iter().map(|v| v.as_str()).collect::<Vec<_>>().join(", ")
            )),
        }
    }
}

impl Serialize for SwitchVariant {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for SwitchVariant {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// What a node is, together with its kind-specific attributes
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeKind {
    Host {
        #[serde(skip_serializing_if = "Option::is_none")]
        address: Option<HostAddress>,
    },
    Switch {
        #[serde(skip_serializing_if = "Option::is_none")]
        variant: Option<SwitchVariant>,
    },
}

/// A host or switch in the topology
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Node {
    pub name: String,
    #[serde(flatten)]
    pub kind: NodeKind,
}

impl Node {
    pub fn host(name: impl Into<String>, address: Option<HostAddress>) -> Self {
        Self {
            name: name.into(),
            kind: NodeKind::Host { address },
        }
    }

    pub fn switch(name: impl Into<String>, variant: Option<SwitchVariant>) -> Self {
        Self {
            name: name.into(),
            kind: NodeKind::Switch { variant },
        }
    }

    pub fn is_host(&self) -> bool {
        matches!(self.kind, NodeKind::Host { .. })
    }

    pub fn is_switch(&self) -> bool {
        matches!(self.kind, NodeKind::Switch { .. })
    }

    /// The host address, if this is a host with one
    pub fn address(&self) -> Option<&HostAddress> {
        match &self.kind {
            NodeKind::Host { address } => address.as_ref(),
            NodeKind::Switch { .. } => None,
        }
    }

    /// The requested switch variant, if this is a switch with one
    pub fn variant(&self) -> Option<SwitchVariant> {
        match &self.kind {
            NodeKind::Switch { variant } => *variant,
            NodeKind::Host { .. } => None,
        }
    }
}

/// A bidirectional point-to-point connection between two nodes.
///
/// Endpoints are kept in the order they were given; equality of the
/// unordered pair is available through [`Link::same_pair`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    pub a: String,
    pub b: String,
}

impl Link {
    pub fn new(a: impl Into<String>, b: impl Into<String>) -> Self {
        Self {
            a: a.into(),
            b: b.into(),
        }
    }

    pub fn endpoints(&self) -> (&str, &str) {
        (&self.a, &self.b)
    }

    pub fn is_self_link(&self) -> bool {
        self.a == self.b
    }

    /// Returns true if this link joins `x` and `y` in either direction
    pub fn connects(&self, x: &str, y: &str) -> bool {
        (self.a == x && self.b == y) || (self.a == y && self.b == x)
    }

    pub fn same_pair(&self, other: &Link) -> bool {
        self.connects(&other.a, &other.b)
    }

    /// The endpoint opposite `name`, if `name` is on this link
    pub fn other_end(&self, name: &str) -> Option<&str> {
        if self.a == name {
            Some(&self.b)
        } else if self.b == name {
            Some(&self.a)
        } else {
            None
        }
    }
}

impl fmt::Display for Link {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.a, self.b)
    }
}

/// The frozen graph of nodes and links handed to the runtime
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Topology {
    nodes: Vec<Node>,
    links: Vec<Link>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl Topology {
    /// Assemble a topology from parts already checked by the builder.
    pub(crate) fn from_parts(nodes: Vec<Node>, links: Vec<Link>) -> Self {
        let index = nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (node.name.clone(), i))
            .collect();
        Self { nodes, links, index }
    }

    pub fn node(&self, name: &str) -> Option<&Node> {
        self.index.get(name).map(|&i| &self.nodes[i])
    }

    /// All nodes in insertion order
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// All links in insertion order
    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn hosts(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(|n| n.is_host())
    }

    pub fn switches(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter().filter(|n| n.is_switch())
    }

    pub fn node_names(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(|n| n.name.as_str())
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Neighbors of `name` in link order, one entry per link.
    ///
    /// Parallel links yield the same neighbor more than once and a
    /// self-link yields the node itself.
    pub fn neighbors(&self, name: &str) -> Vec<&str> {
        self.links
            .iter()
            .filter_map(|link| link.other_end(name))
            .collect()
    }

    /// Number of link endpoints attached to `name` (a self-link counts twice)
    pub fn degree(&self, name: &str) -> usize {
        self.links
            .iter()
            .map(|link| (link.a == name) as usize + (link.b == name) as usize)
            .sum()
    }

    /// Number of links joining `a` and `b` in either direction
    pub fn links_between(&self, a: &str, b: &str) -> usize {
        self.links.iter().filter(|link| link.connects(a, b)).count()
    }
}
