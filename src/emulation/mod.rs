//! # Emulation Runtime Interface
//!
//! The emulation platform that turns a [`Topology`](crate::topology::Topology)
//! into a live network is an external system. This module defines the narrow
//! construction API the launcher relies on, so any backend can be plugged
//! in without touching the topology builder.
//!
//! ## Key Components
//!
//! - [`EmulationRuntime`]: node/link creation, controller binding, start, stop
//! - [`InteractiveSession`]: blocking operator session over a running network
//! - [`RunningNetwork`]: handle to a started network that always releases the
//!   runtime, either through an explicit stop or on drop
//! - [`dry_run`]: in-memory runtime that records calls and never touches the host
//! - [`mininet`]: adapter for the Mininet emulation platform
//!
//! ## Materialization Order
//!
//! The launcher binds the controller, creates every node in insertion order,
//! then every link in insertion order, and finally starts the runtime.
//! Link order matters to backends that number interfaces by link index.

pub mod dry_run;
pub mod endpoints;
pub mod mininet;
pub mod running;

pub use dry_run::{ConsoleSession, DryRunRuntime, FailPoint, Journal, RuntimeCall};
pub use endpoints::{plan_endpoints, Endpoint};
pub use mininet::{MininetCli, MininetRuntime};
pub use running::RunningNetwork;

use crate::controller::ControllerRef;
use crate::topology::{Link, Node};
use std::io;

/// Errors reported by an emulation runtime
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("cannot create node '{node}': {reason}")]
    NodeCreation { node: String, reason: String },

    #[error("cannot create link {link}: {reason}")]
    LinkCreation { link: String, reason: String },

    #[error("controller {controller} is unreachable: {reason}")]
    ControllerUnreachable { controller: String, reason: String },

    #[error("runtime resources exhausted: {0}")]
    ResourceExhausted(String),

    #[error("runtime command failed: {0}")]
    Command(String),

    #[error("runtime is not running")]
    NotRunning,

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Errors ending an interactive session abnormally
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("session aborted: {0}")]
    Aborted(String),

    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}

/// Capability set of an emulation backend
pub trait EmulationRuntime {
    /// Short backend name used in logs and errors
    fn name(&self) -> &str;

    /// Record or verify the controller the switches will attach to
    fn bind_controller(&mut self, controller: &ControllerRef) -> Result<(), RuntimeError>;

    fn create_node(&mut self, node: &Node) -> Result<(), RuntimeError>;

    fn create_link(&mut self, link: &Link) -> Result<(), RuntimeError>;

    /// Bring the materialized network up
    fn start(&mut self) -> Result<(), RuntimeError>;

    /// Release every resource the runtime holds.
    ///
    /// Also used to roll back a failed start, so it must cope with a
    /// partially materialized network.
    fn stop(&mut self) -> Result<(), RuntimeError>;

    /// Addressable endpoint of a node, if the runtime knows it
    fn endpoint(&self, node: &str) -> Option<Endpoint>;
}

/// An operator-driven session over a running network.
///
/// `interact` blocks until the operator leaves the session.
pub trait InteractiveSession<R: EmulationRuntime> {
    fn interact(&mut self, network: &mut RunningNetwork<R>) -> Result<(), SessionError>;
}
