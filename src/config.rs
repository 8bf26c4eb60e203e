//! Launch description files.
//!
//! A launch description names a topology, lists its switches, hosts and
//! links, and optionally picks the controller and runtime:
//!
//! ```yaml
//! name: two-switch
//! controller: "127.0.0.1:6653"   # or "local"
//! runtime: mininet               # or dry-run
//! switches:
//!   - name: s1
//!     variant: ovs
//!   - name: s2
//! hosts:
//!   - name: h1
//!     ip: 10.0.0.1
//! links:
//!   - [h1, s1]
//!   - [s1, s2]
//! ```
//!
//! Switches are registered before hosts, each list in file order, and
//! links in file order.

use crate::controller::ControllerRef;
use crate::topology::{SwitchVariant, Topology, TopologyBuilder, TopologyError, TopologyWarning};
use serde::{Deserialize, Serialize};

/// Emulation backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum RuntimeKind {
    /// Record calls in memory and open a built-in console
    DryRun,
    /// Drive the Mininet `mn` command
    #[default]
    Mininet,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LaunchConfig {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub controller: Option<ControllerRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime: Option<RuntimeKind>,
    #[serde(default)]
    pub switches: Vec<SwitchConfig>,
    #[serde(default)]
    pub hosts: Vec<HostConfig>,
    #[serde(default)]
    pub links: Vec<LinkConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SwitchConfig {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<SwitchVariant>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HostConfig {
    pub name: String,
    /// Kept as text so a bad address surfaces as a topology error naming the host
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip: Option<String>,
}

/// A link given as a two-element list `[a, b]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkConfig(pub String, pub String);

#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("topology name cannot be empty")]
    EmptyName,

    #[error("topology '{0}' declares no switches or hosts")]
    NoNodes(String),

    #[error("link {index} has an empty endpoint")]
    EmptyLinkEndpoint { index: usize },
}

impl LaunchConfig {
    /// Validate the file-level structure before building
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if self.switches.is_empty() && self.hosts.is_empty() {
            return Err(ValidationError::NoNodes(self.name.clone()));
        }
        for (index, LinkConfig(a, b)) in self.links.iter().enumerate() {
            if a.trim().is_empty() || b.trim().is_empty() {
                return Err(ValidationError::EmptyLinkEndpoint { index });
            }
        }
        Ok(())
    }

    /// Build the described topology, returning it with any construction warnings
    pub fn build_topology(&self) -> Result<(Topology, Vec<TopologyWarning>), TopologyError> {
        let mut builder = TopologyBuilder::new();
        for switch in &self.switches {
            builder.add_switch(&switch.name, switch.variant)?;
        }
        for host in &self.hosts {
            builder.add_host(&host.name, host.ip.as_deref())?;
        }
        for LinkConfig(a, b) in &self.links {
            builder.add_link_by_name(a, b)?;
        }
        let topology = builder.build();
        Ok((topology, builder.warnings().to_vec()))
    }
}
