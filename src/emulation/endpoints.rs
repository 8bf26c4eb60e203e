//! Per-node endpoint planning.
//!
//! Interfaces are numbered in link order, one per link end: hosts start at
//! `eth0` and switches at `eth1`, leaving port 0 to the switch itself.

use crate::topology::{Link, Node};
use crate::utils::address::HostAddress;
use std::collections::BTreeMap;

/// How a node is reached once the network is running
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub node: String,
    pub interfaces: Vec<String>,
    pub address: Option<HostAddress>,
}

impl Endpoint {
    /// First interface of the node, usually the one carrying its address
    pub fn primary_interface(&self) -> Option<&str> {
        self.interfaces.first().map(String::as_str)
    }
}

/// Assign interface names for every node given the link sequence
pub fn plan_endpoints(nodes: &[Node], links: &[Link]) -> BTreeMap<String, Endpoint> {
    let mut endpoints: BTreeMap<String, Endpoint> = nodes
        .iter()
        .map(|node| {
            (
                node.name.clone(),
                Endpoint {
                    node: node.name.clone(),
                    interfaces: Vec::new(),
                    address: node.address().copied(),
                },
            )
        })
        .collect();

    let first_port: BTreeMap<&str, usize> = nodes
        .iter()
        .map(|node| (node.name.as_str(), if node.is_switch() { 1 } else { 0 }))
        .collect();

    for link in links {
        let (a, b) = link.endpoints();
        for end in [a, b] {
            let base = first_port.get(end).copied().unwrap_or(0);
            if let Some(endpoint) = endpoints.get_mut(end) {
                let port = base + endpoint.interfaces.len();
                endpoint.interfaces.push(format!("{}-eth{}", end, port));
            }
        }
    }

    endpoints
}
