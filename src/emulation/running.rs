//! Handle to a started network.

use super::{EmulationRuntime, Endpoint, RuntimeError};
use crate::controller::ControllerRef;
use crate::topology::Topology;
use log::{error, info, warn};
use std::fmt;

/// A network the runtime has materialized and started.
///
/// The runtime is stopped exactly once: either by [`RunningNetwork::stop`]
/// or, if that never happens (early return, session error, panic), when the
/// handle is dropped.
pub struct RunningNetwork<R: EmulationRuntime> {
    runtime: R,
    topology: Topology,
    controller: ControllerRef,
    stopped: bool,
}

impl<R: EmulationRuntime> RunningNetwork<R> {
    /// Wrap a runtime whose `start` has already succeeded
    pub(crate) fn new(runtime: R, topology: Topology, controller: ControllerRef) -> Self {
        Self {
            runtime,
            topology,
            controller,
            stopped: false,
        }
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn controller(&self) -> &ControllerRef {
        &self.controller
    }

    pub fn runtime(&self) -> &R {
        &self.runtime
    }

    pub fn runtime_mut(&mut self) -> &mut R {
        &mut self.runtime
    }

    pub fn endpoint(&self, node: &str) -> Option<Endpoint> {
        self.runtime.endpoint(node)
    }

    /// Stop the runtime and release the network
    pub fn stop(mut self) -> Result<(), RuntimeError> {
        self.release()
    }

    fn release(&mut self) -> Result<(), RuntimeError> {
        if self.stopped {
            return Ok(());
        }
        self.stopped = true;
        info!("Stopping emulated network on {}", self.runtime.name());
        self.runtime.stop()
    }
}

impl<R: EmulationRuntime + fmt::Debug> fmt::Debug for RunningNetwork<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunningNetwork")
            .field("runtime", &self.runtime)
            .field("controller", &self.controller)
            .field("nodes", &self.topology.node_count())
            .field("links", &self.topology.link_count())
            .field("stopped", &self.stopped)
            .finish()
    }
}

impl<R: EmulationRuntime> Drop for RunningNetwork<R> {
    fn drop(&mut self) {
        if self.stopped {
            return;
        }
        warn!("Network on {} dropped while running; stopping it", self.runtime.name());
        if let Err(e) = self.release() {
            error!("Failed to stop network on drop: {}", e);
        }
    }
}
