//! Topology construction.
//!
//! A [`TopologyBuilder`] accepts an ordered sequence of node and link
//! insertions and freezes them into a [`Topology`]. Handles returned by
//! one builder are rejected by every other builder.

use super::error::{TopologyError, TopologyWarning};
use super::types::{Link, Node, SwitchVariant, Topology};
use crate::utils::address::HostAddress;
use log::{debug, info, warn};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_BUILDER_ID: AtomicU64 = AtomicU64::new(1);

/// Builder lifecycle: `Empty -> Building -> Frozen`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuilderState {
    Empty,
    Building,
    Frozen,
}

/// Reference to a node registered with a particular builder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeHandle {
    builder: u64,
    index: usize,
}

impl NodeHandle {
    pub fn index(&self) -> usize {
        self.index
    }
}

impl fmt::Display for NodeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node #{} of builder {}", self.index, self.builder)
    }
}

/// Position of a link in the topology's link sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LinkHandle {
    index: usize,
}

impl LinkHandle {
    pub fn index(&self) -> usize {
        self.index
    }
}

#[derive(Debug)]
pub struct TopologyBuilder {
    id: u64,
    state: BuilderState,
    nodes: Vec<Node>,
    index: HashMap<String, usize>,
    links: Vec<Link>,
    warnings: Vec<TopologyWarning>,
}

impl Default for TopologyBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TopologyBuilder {
    pub fn new() -> Self {
        Self {
            id: NEXT_BUILDER_ID.fetch_add(1, Ordering::Relaxed),
            state: BuilderState::Empty,
            nodes: Vec::new(),
            index: HashMap::new(),
            links: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn state(&self) -> BuilderState {
        self.state
    }

    /// Warnings raised so far, in the order they were raised
    pub fn warnings(&self) -> &[TopologyWarning] {
        &self.warnings
    }

    /// Look up the handle of an already registered node
    pub fn handle(&self, name: &str) -> Option<NodeHandle> {
        self.index.get(name).map(|&index| NodeHandle {
            builder: self.id,
            index,
        })
    }

    /// Register a host, optionally with an address such as `10.0.0.1` or `10.0.0.1/8`
    pub fn add_host(&mut self, name: &str, address: Option<&str>) -> Result<NodeHandle, TopologyError> {
        self.check_new_node(name)?;

        let address = match address {
            Some(raw) => Some(raw.parse::<HostAddress>().map_err(|source| {
                TopologyError::InvalidAddress {
                    host: name.to_string(),
                    address: raw.to_string(),
                    source,
                }
            })?),
            None => None,
        };

        debug!("Adding host {} (address: {:?})", name, address.map(|a| a.to_string()));
        Ok(self.insert(Node::host(name, address)))
    }

    /// Register a switch; `None` leaves the implementation to the runtime default
    pub fn add_switch(&mut self, name: &str, variant: Option<SwitchVariant>) -> Result<NodeHandle, TopologyError> {
        self.check_new_node(name)?;
        debug!("Adding switch {} (variant: {:?})", name, variant);
        Ok(self.insert(Node::switch(name, variant)))
    }

    /// Append a link between two nodes of this builder.
    ///
    /// Self-links and links duplicating an existing pair are accepted and
    /// recorded as warnings.
    pub fn add_link(&mut self, a: NodeHandle, b: NodeHandle) -> Result<LinkHandle, TopologyError> {
        self.ensure_open()?;
        let a_name = self.resolve(a)?.name.clone();
        let b_name = self.resolve(b)?.name.clone();

        let link = Link::new(a_name, b_name);

        if link.is_self_link() {
            self.warn(TopologyWarning::SelfLink {
                node: link.a.clone(),
            });
        }

        let existing = self.links.iter().filter(|l| l.same_pair(&link)).count();
        if existing > 0 {
            self.warn(TopologyWarning::ParallelLink {
                a: link.a.clone(),
                b: link.b.clone(),
                count: existing + 1,
            });
        }

        debug!("Adding link {}", link);
        let handle = LinkHandle {
            index: self.links.len(),
        };
        self.links.push(link);
        self.state = BuilderState::Building;
        Ok(handle)
    }

    /// Resolve both names and link them. Nothing is added if either name is unknown.
    pub fn add_link_by_name(&mut self, a: &str, b: &str) -> Result<LinkHandle, TopologyError> {
        self.ensure_open()?;
        let a = self.handle(a).ok_or_else(|| TopologyError::UnknownNode {
            node: format!("'{}'", a),
        })?;
        let b = self.handle(b).ok_or_else(|| TopologyError::UnknownNode {
            node: format!("'{}'", b),
        })?;
        self.add_link(a, b)
    }

    /// Freeze the builder and return the graph.
    ///
    /// Calling this again returns an equal topology.
    pub fn build(&mut self) -> Topology {
        if self.state != BuilderState::Frozen {
            info!(
                "Topology frozen with {} nodes and {} links ({} warnings)",
                self.nodes.len(),
                self.links.len(),
                self.warnings.len()
            );
        }
        self.state = BuilderState::Frozen;
        Topology::from_parts(self.nodes.clone(), self.links.clone())
    }

    fn ensure_open(&self) -> Result<(), TopologyError> {
        if self.state == BuilderState::Frozen {
            return Err(TopologyError::BuilderClosed);
        }
        Ok(())
    }

    fn check_new_node(&self, name: &str) -> Result<(), TopologyError> {
        self.ensure_open()?;

        if name.is_empty() {
            return Err(TopologyError::InvalidName {
                name: name.to_string(),
                reason: "name cannot be empty",
            });
        }
        if name.chars().any(char::is_whitespace) {
            return Err(TopologyError::InvalidName {
                name: name.to_string(),
                reason: "name cannot contain whitespace",
            });
        }
        if self.index.contains_key(name) {
            return Err(TopologyError::DuplicateNode {
                name: name.to_string(),
            });
        }
        Ok(())
    }

    fn insert(&mut self, node: Node) -> NodeHandle {
        let index = self.nodes.len();
        self.index.insert(node.name.clone(), index);
        self.nodes.push(node);
        self.state = BuilderState::Building;
        NodeHandle {
            builder: self.id,
            index,
        }
    }

    fn resolve(&self, handle: NodeHandle) -> Result<&Node, TopologyError> {
        if handle.builder != self.id {
            return Err(TopologyError::UnknownNode {
                node: handle.to_string(),
            });
        }
        self.nodes.get(handle.index).ok_or_else(|| TopologyError::UnknownNode {
            node: handle.to_string(),
        })
    }

    fn warn(&mut self, warning: TopologyWarning) {
        warn!("Topology warning: {}", warning);
        self.warnings.push(warning);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_transitions() {
        let mut builder = TopologyBuilder::new();
        assert_eq!(builder.state(), BuilderState::Empty);

        builder.add_switch("s1", None).unwrap();
        assert_eq!(builder.state(), BuilderState::Building);

        builder.build();
        assert_eq!(builder.state(), BuilderState::Frozen);
    }

    #[test]
    fn test_build_empty_builder() {
        let mut builder = TopologyBuilder::new();
        let topo = builder.build();
        assert!(topo.is_empty());
        assert_eq!(topo.link_count(), 0);
        assert_eq!(builder.state(), BuilderState::Frozen);
    }

    #[test]
    fn test_add_after_build_is_rejected() {
        let mut builder = TopologyBuilder::new();
        let s1 = builder.add_switch("s1", None).unwrap();
        let h1 = builder.add_host("h1", None).unwrap();
        builder.build();

        assert_eq!(builder.add_host("h2", None), Err(TopologyError::BuilderClosed));
        assert_eq!(builder.add_switch("s2", None), Err(TopologyError::BuilderClosed));
        assert_eq!(builder.add_link(h1, s1), Err(TopologyError::BuilderClosed));
        assert_eq!(builder.add_link_by_name("h1", "s1"), Err(TopologyError::BuilderClosed));
        assert_eq!(builder.build().link_count(), 0);
    }

    #[test]
    fn test_duplicate_name_across_kinds() {
        let mut builder = TopologyBuilder::new();
        builder.add_host("n1", None).unwrap();
        let err = builder.add_switch("n1", Some(SwitchVariant::Ovs)).unwrap_err();
        assert_eq!(err, TopologyError::DuplicateNode { name: "n1".to_string() });

        let topo = builder.build();
        assert_eq!(topo.node_count(), 1);
        assert!(topo.node("n1").unwrap().is_host());
    }

    #[test]
    fn test_invalid_address_is_rejected() {
        let mut builder = TopologyBuilder::new();
        let err = builder.add_host("h1", Some("10.0.0.256")).unwrap_err();
        assert!(matches!(err, TopologyError::InvalidAddress { ref host, .. } if host == "h1"));
        assert!(builder.handle("h1").is_none());
        assert_eq!(builder.state(), BuilderState::Empty);
    }

    #[test]
    fn test_invalid_names_are_rejected() {
        let mut builder = TopologyBuilder::new();
        assert!(matches!(builder.add_host("", None), Err(TopologyError::InvalidName { .. })));
        assert!(matches!(builder.add_switch("s 1", None), Err(TopologyError::InvalidName { .. })));
    }

    #[test]
    fn test_self_link_is_kept_with_warning() {
        let mut builder = TopologyBuilder::new();
        let s1 = builder.add_switch("s1", None).unwrap();
        let link = builder.add_link(s1, s1).unwrap();

        assert_eq!(link.index(), 0);
        assert_eq!(
            builder.warnings(),
            &[TopologyWarning::SelfLink { node: "s1".to_string() }]
        );
        assert_eq!(builder.build().link_count(), 1);
    }

    #[test]
    fn test_parallel_link_counts_accumulate() {
        let mut builder = TopologyBuilder::new();
        let s1 = builder.add_switch("s1", None).unwrap();
        let s2 = builder.add_switch("s2", None).unwrap();
        builder.add_link(s1, s2).unwrap();
        builder.add_link(s2, s1).unwrap();
        builder.add_link(s1, s2).unwrap();

        assert_eq!(
            builder.warnings(),
            &[
                TopologyWarning::ParallelLink { a: "s2".into(), b: "s1".into(), count: 2 },
                TopologyWarning::ParallelLink { a: "s1".into(), b: "s2".into(), count: 3 },
            ]
        );
    }

    #[test]
    fn test_handle_lookup() {
        let mut builder = TopologyBuilder::new();
        let h1 = builder.add_host("h1", Some("10.0.0.1")).unwrap();
        assert_eq!(builder.handle("h1"), Some(h1));
        assert_eq!(builder.handle("h2"), None);
        assert_eq!(h1.index(), 0);
    }
}
