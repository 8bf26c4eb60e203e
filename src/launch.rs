//! Launch sequence.
//!
//! `start` materializes a topology on a runtime, `interact` hands it to an
//! operator session and `stop` releases it. [`run`] chains the three and
//! guarantees the stop. Nothing here retries: a failed start ends the launch.

use crate::controller::ControllerRef;
use crate::emulation::{EmulationRuntime, InteractiveSession, RunningNetwork, RuntimeError, SessionError};
use crate::topology::Topology;
use log::{error, info};

#[derive(Debug, thiserror::Error)]
pub enum LaunchError {
    #[error("failed to start network on {runtime}: {source}")]
    Startup {
        runtime: String,
        #[source]
        source: RuntimeError,
    },

    #[error("interactive session failed: {0}")]
    Session(#[from] SessionError),

    #[error("failed to stop network: {0}")]
    Teardown(#[source] RuntimeError),
}

/// Materialize `topology` on `runtime` and bind it to `controller`.
///
/// The controller is bound first, then nodes and links are created in
/// insertion order and the runtime is started. On any failure the runtime
/// is stopped again before the error is returned.
pub fn start<R: EmulationRuntime>(
    topology: Topology,
    controller: ControllerRef,
    mut runtime: R,
) -> Result<RunningNetwork<R>, LaunchError> {
    info!(
        "Starting {} nodes and {} links on {} (controller: {})",
        topology.node_count(),
        topology.link_count(),
        runtime.name(),
        controller
    );

    if let Err(source) = materialize(&topology, &controller, &mut runtime) {
        error!("Startup failed: {}", source);
        if let Err(e) = runtime.stop() {
            error!("Rollback after failed startup also failed: {}", e);
        }
        return Err(LaunchError::Startup {
            runtime: runtime.name().to_string(),
            source,
        });
    }

    info!("Network running on {}", runtime.name());
    Ok(RunningNetwork::new(runtime, topology, controller))
}

fn materialize<R: EmulationRuntime>(
    topology: &Topology,
    controller: &ControllerRef,
    runtime: &mut R,
) -> Result<(), RuntimeError> {
    runtime.bind_controller(controller)?;
    for node in topology.nodes() {
        runtime.create_node(node)?;
    }
    for link in topology.links() {
        runtime.create_link(link)?;
    }
    runtime.start()
}

/// Run an operator session; blocks until the session ends
pub fn interact<R, S>(network: &mut RunningNetwork<R>, session: &mut S) -> Result<(), LaunchError>
where
    R: EmulationRuntime,
    S: InteractiveSession<R>,
{
    session.interact(network)?;
    Ok(())
}

/// Stop the network and release every runtime resource
pub fn stop<R: EmulationRuntime>(network: RunningNetwork<R>) -> Result<(), LaunchError> {
    network.stop().map_err(LaunchError::Teardown)?;
    info!("Network stopped");
    Ok(())
}

/// Start, interact, stop.
///
/// The network is stopped whatever way the session ends. If both the
/// session and the stop fail, the session error is returned and the stop
/// error is logged.
pub fn run<R, S>(
    topology: Topology,
    controller: ControllerRef,
    runtime: R,
    session: &mut S,
) -> Result<(), LaunchError>
where
    R: EmulationRuntime,
    S: InteractiveSession<R>,
{
    let mut network = start(topology, controller, runtime)?;
    let outcome = interact(&mut network, session);
    let stopped = stop(network);

    match (outcome, stopped) {
        (Err(session_err), Err(stop_err)) => {
            error!("{}", stop_err);
            Err(session_err)
        }
        (Err(session_err), Ok(())) => Err(session_err),
        (Ok(()), stopped) => stopped,
    }
}
