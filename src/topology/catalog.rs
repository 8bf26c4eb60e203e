//! Built-in topologies.
//!
//! Each entry is a fixed description of a small switched network that can
//! be selected by name from the command line.

use super::builder::TopologyBuilder;
use super::error::TopologyError;
use super::types::{SwitchVariant, Topology};

/// Name of the topology used when none is selected
pub const DEFAULT_TOPOLOGY: &str = "simple";

/// A named, hard-coded topology description
pub struct CatalogEntry {
    pub name: &'static str,
    pub description: &'static str,
    populate: fn(&mut TopologyBuilder) -> Result<(), TopologyError>,
}

impl CatalogEntry {
    /// Build this entry with a fresh builder
    pub fn build(&self) -> Result<Topology, TopologyError> {
        let mut builder = TopologyBuilder::new();
        (self.populate)(&mut builder)?;
        Ok(builder.build())
    }
}

pub const CATALOG: &[CatalogEntry] = &[
    CatalogEntry {
        name: "simple",
        description: "Two switches, four hosts, runtime default switches",
        populate: standard_pair,
    },
    CatalogEntry {
        name: "simple-ovs",
        description: "Two Open vSwitch switches, four hosts",
        populate: ovs_pair,
    },
    CatalogEntry {
        name: "complex",
        description: "Three Open vSwitch switches in a triangle with redundant links, five hosts",
        populate: switch_triangle,
    },
];

/// Find a catalog entry by name
pub fn lookup(name: &str) -> Result<&'static CatalogEntry, TopologyError> {
    CATALOG
        .iter()
        .find(|entry| entry.name == name)
        .ok_or_else(|| TopologyError::UnknownTopology {
            name: name.to_string(),
            available: CATALOG.iter().map(|e| e.name).collect::<Vec<_>>().join(", "),
        })
}

/// Build a catalog topology by name
pub fn build_named(name: &str) -> Result<Topology, TopologyError> {
    lookup(name)?.build()
}

fn standard_pair(b: &mut TopologyBuilder) -> Result<(), TopologyError> {
    two_switch_pair(b, None)
}

fn ovs_pair(b: &mut TopologyBuilder) -> Result<(), TopologyError> {
    two_switch_pair(b, Some(SwitchVariant::Ovs))
}

// h1,h2 - s1 - s2 - h3,h4
fn two_switch_pair(b: &mut TopologyBuilder, variant: Option<SwitchVariant>) -> Result<(), TopologyError> {
    let s1 = b.add_switch("s1", variant)?;
    let s2 = b.add_switch("s2", variant)?;

    let h1 = b.add_host("h1", Some("10.0.0.1"))?;
    let h2 = b.add_host("h2", Some("10.0.0.2"))?;
    let h3 = b.add_host("h3", Some("10.0.0.3"))?;
    let h4 = b.add_host("h4", Some("10.0.0.4"))?;

    b.add_link(h1, s1)?;
    b.add_link(h2, s1)?;
    b.add_link(s1, s2)?;
    b.add_link(h3, s2)?;
    b.add_link(h4, s2)?;
    Ok(())
}

fn switch_triangle(b: &mut TopologyBuilder) -> Result<(), TopologyError> {
    let ovs = Some(SwitchVariant::Ovs);
    let s1 = b.add_switch("s1", ovs)?;
    let s2 = b.add_switch("s2", ovs)?;
    let s3 = b.add_switch("s3", ovs)?;

    let h1 = b.add_host("h1", Some("10.0.0.1"))?;
    let h2 = b.add_host("h2", Some("10.0.0.2"))?;
    let h3 = b.add_host("h3", Some("10.0.0.3"))?;
    let h4 = b.add_host("h4", Some("10.0.0.4"))?;
    let h5 = b.add_host("h5", Some("10.0.0.5"))?;

    b.add_link(h1, s1)?;
    b.add_link(h2, s1)?;
    b.add_link(h3, s2)?;
    b.add_link(h4, s2)?;
    b.add_link(h5, s3)?;

    b.add_link(s1, s2)?;
    b.add_link(s2, s3)?;
    b.add_link(s1, s3)?;

    // Redundant switch links, kept as parallel edges
    b.add_link(s2, s1)?;
    b.add_link(s3, s1)?;
    Ok(())
}
