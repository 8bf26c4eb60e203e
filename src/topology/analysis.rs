//! Structural checks over a built topology.
//!
//! A single union-find pass over the link list answers connectivity and
//! cycle questions. The builder never calls into this module; it is used
//! for reporting and by callers that want to validate a topology before
//! launching it.

use super::types::Topology;
use std::collections::BTreeMap;

struct DisjointSet {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl DisjointSet {
    fn new(size: usize) -> Self {
        Self {
            parent: (0..size).collect(),
            rank: vec![0; size],
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    /// Merge the sets of `a` and `b`; false if they were already joined
    fn union(&mut self, a: usize, b: usize) -> bool {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra == rb {
            return false;
        }
        match self.rank[ra].cmp(&self.rank[rb]) {
            std::cmp::Ordering::Less => self.parent[ra] = rb,
            std::cmp::Ordering::Greater => self.parent[rb] = ra,
            std::cmp::Ordering::Equal => {
                self.parent[rb] = ra;
                self.rank[ra] += 1;
            }
        }
        true
    }
}

/// Result of a union-find pass over the link list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopologyReport {
    /// Node names grouped by connected component, in node insertion order
    pub components: Vec<Vec<String>>,
    /// True if any link closes a loop (self-links and parallel links included)
    pub has_cycle: bool,
    /// Unordered node pairs joined by more than one link, with their link count
    pub parallel_links: Vec<(String, String, usize)>,
}

impl TopologyReport {
    pub fn is_connected(&self) -> bool {
        self.components.len() <= 1
    }
}

/// Run the union-find pass over `topology`
pub fn analyze(topology: &Topology) -> TopologyReport {
    let position: BTreeMap<&str, usize> = topology
        .node_names()
        .enumerate()
        .map(|(i, name)| (name, i))
        .collect();

    let mut sets = DisjointSet::new(topology.node_count());
    let mut has_cycle = false;
    let mut pair_counts: BTreeMap<(usize, usize), usize> = BTreeMap::new();

    for link in topology.links() {
        let (Some(&a), Some(&b)) = (position.get(link.a.as_str()), position.get(link.b.as_str())) else {
            continue;
        };
        if !sets.union(a, b) {
            has_cycle = true;
        }
        *pair_counts.entry((a.min(b), a.max(b))).or_insert(0) += 1;
    }

    let mut grouped: BTreeMap<usize, Vec<String>> = BTreeMap::new();
    let mut order: Vec<usize> = Vec::new();
    for (i, name) in topology.node_names().enumerate() {
        let root = sets.find(i);
        let members = grouped.entry(root).or_insert_with(|| {
            order.push(root);
            Vec::new()
        });
        members.push(name.to_string());
    }
    let components = order
        .into_iter()
        .filter_map(|root| grouped.remove(&root))
        .collect();

    let nodes = topology.nodes();
    let parallel_links = pair_counts
        .into_iter()
        .filter(|&(_, count)| count > 1)
        .map(|((a, b), count)| (nodes[a].name.clone(), nodes[b].name.clone(), count))
        .collect();

    TopologyReport {
        components,
        has_cycle,
        parallel_links,
    }
}

pub fn is_connected(topology: &Topology) -> bool {
    analyze(topology).is_connected()
}

pub fn has_cycle(topology: &Topology) -> bool {
    analyze(topology).has_cycle
}
