//! Mininet adapter.
//!
//! Nodes and links are collected as they are created and rendered into a
//! Mininet custom-topology script on `start`. The `mn` process is then
//! launched with that script and the requested controller; its own CLI is
//! what the operator interacts with. `stop` terminates `mn` if it is still
//! running and runs `mn -c` to clear any leftover interfaces and processes.
//!
//! Ctrl-C at the Mininet prompt is meant for Mininet. [`MininetCli`] holds an
//! [`InterruptGuard`] while it waits so the launcher survives the interrupt
//! and still tears the network down.

use super::endpoints::plan_endpoints;
use super::{EmulationRuntime, Endpoint, InteractiveSession, RunningNetwork, RuntimeError, SessionError};
use crate::controller::ControllerRef;
use crate::topology::{Link, Node, NodeKind, SwitchVariant};
use crate::utils::InterruptGuard;
use log::{debug, info, warn};
use std::fs;
use std::net::{TcpStream, ToSocketAddrs};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

/// Name the rendered topology is registered under in the script
const TOPO_NAME: &str = "netlaunch";

const SCRIPT_FILE: &str = "netlaunch_topo.py";

/// `--switch` for switches without an explicit class
const DEFAULT_SWITCH: &str = "ovsk";

const CONTROLLER_PROBE_TIMEOUT: Duration = Duration::from_secs(3);

/// How long `mn` must survive after spawning to count as started
const STARTUP_GRACE: Duration = Duration::from_millis(300);

/// Mininet class implementing a switch variant; `None` means Mininet's default
fn switch_class(variant: Option<SwitchVariant>) -> Option<&'static str> {
    match variant? {
        SwitchVariant::Standard => None,
        SwitchVariant::Ovs => Some("OVSSwitch"),
        SwitchVariant::OvsBridge => Some("OVSBridge"),
        SwitchVariant::User => Some("UserSwitch"),
        SwitchVariant::LinuxBridge => Some("LinuxBridge"),
    }
}

/// `--controller` argument for `mn`
pub fn controller_arg(controller: &ControllerRef) -> String {
    match controller {
        ControllerRef::Local => "default".to_string(),
        ControllerRef::Remote { host, port } => format!("remote,ip={},port={}", host, port),
    }
}

/// Quote a string as a Python single-quoted literal
fn py_str(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('\'', "\\'");
    format!("'{}'", escaped)
}

/// Render nodes and links as a Mininet custom-topology script.
///
/// Nodes and links appear in the order given, which is the order Mininet
/// adds them and numbers their interfaces.
pub fn render_script(nodes: &[Node], links: &[Link]) -> String {
    let mut classes: Vec<&str> = nodes
        .iter()
        .filter_map(|n| switch_class(n.variant()))
        .collect();
    classes.sort_unstable();
    classes.dedup();

    let mut script = String::new();
    script.push_str("# Generated by netlaunch; do not edit.\n");
    script.push_str("from mininet.topo import Topo\n");
    if !classes.is_empty() {
        script.push_str(&format!("from mininet.node import {}\n", classes.join(", ")));
    }
    script.push_str("\n\nclass NetlaunchTopo(Topo):\n");
    script.push_str("    def build(self):\n");

    if nodes.is_empty() && links.is_empty() {
        script.push_str("        pass\n");
    }

    for node in nodes {
        let line = match &node.kind {
            NodeKind::Host { address: Some(address) } => {
                format!("self.addHost({}, ip={})", py_str(&node.name), py_str(&address.to_string()))
            }
            NodeKind::Host { address: None } => format!("self.addHost({})", py_str(&node.name)),
            NodeKind::Switch { variant } => match switch_class(*variant) {
                Some(class) => format!("self.addSwitch({}, cls={})", py_str(&node.name), class),
                None => format!("self.addSwitch({})", py_str(&node.name)),
            },
        };
        script.push_str(&format!("        {}\n", line));
    }

    for link in links {
        let (a, b) = link.endpoints();
        script.push_str(&format!("        self.addLink({}, {})\n", py_str(a), py_str(b)));
    }

    script.push_str(&format!(
        "\n\ntopos = {{{}: (lambda: NetlaunchTopo())}}\n",
        py_str(TOPO_NAME)
    ));
    script
}

/// Emulation runtime driving the external `mn` command
#[derive(Debug)]
pub struct MininetRuntime {
    mn_binary: PathBuf,
    work_dir: PathBuf,
    probe_controller: bool,
    nodes: Vec<Node>,
    links: Vec<Link>,
    controller: Option<ControllerRef>,
    child: Option<Child>,
    script_path: Option<PathBuf>,
}

impl MininetRuntime {
    pub fn new(mn_binary: impl Into<PathBuf>, work_dir: impl Into<PathBuf>) -> Self {
        Self {
            mn_binary: mn_binary.into(),
            work_dir: work_dir.into(),
            probe_controller: true,
            nodes: Vec::new(),
            links: Vec::new(),
            controller: None,
            child: None,
            script_path: None,
        }
    }

    /// Skip the TCP reachability check on remote controllers
    pub fn without_controller_probe(mut self) -> Self {
        self.probe_controller = false;
        self
    }

    /// Returns true if there are switches and none of them talks to a controller
    fn bridges_only(&self) -> bool {
        let mut switches = self.nodes.iter().filter(|n| n.is_switch()).peekable();
        switches.peek().is_some()
            && switches.all(|n| !n.variant().map_or(true, |v| v.uses_controller()))
    }

    /// Command line `start` runs, without the binary itself
    pub fn mn_args(&self, script: &Path) -> Vec<String> {
        let controller = if self.bridges_only() {
            "none".to_string()
        } else {
            controller_arg(&self.controller.clone().unwrap_or_default())
        };
        vec![
            "--custom".to_string(),
            script.display().to_string(),
            "--topo".to_string(),
            TOPO_NAME.to_string(),
            "--controller".to_string(),
            controller,
            "--switch".to_string(),
            DEFAULT_SWITCH.to_string(),
        ]
    }

    /// Block until the `mn` process exits
    pub fn wait(&mut self) -> Result<ExitStatus, RuntimeError> {
        let child = self.child.as_mut().ok_or(RuntimeError::NotRunning)?;
        let status = child.wait()?;
        self.child = None;
        Ok(status)
    }

    fn probe(&self, controller: &ControllerRef) -> Result<(), RuntimeError> {
        let ControllerRef::Remote { host, port } = controller else {
            return Ok(());
        };
        let unreachable_err = |reason: String| RuntimeError::ControllerUnreachable {
            controller: controller.to_string(),
            reason,
        };

        let addrs: Vec<_> = (host.as_str(), *port)
            .to_socket_addrs()
            .map_err(|e| unreachable_err(e.to_string()))?
            .collect();

        let mut last_error = String::from("no addresses resolved");
        for addr in addrs {
            match TcpStream::connect_timeout(&addr, CONTROLLER_PROBE_TIMEOUT) {
                Ok(_) => {
                    debug!("Controller {} reachable at {}", controller, addr);
                    return Ok(());
                }
                Err(e) => last_error = e.to_string(),
            }
        }
        Err(unreachable_err(last_error))
    }

    fn cleanup(&self) -> Result<(), RuntimeError> {
        let output = Command::new(&self.mn_binary)
            .arg("-c")
            .stdin(Stdio::null())
            .output()?;
        if !output.status.success() {
            return Err(RuntimeError::Command(format!(
                "{} -c failed: {}",
                self.mn_binary.display(),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(())
    }
}

impl EmulationRuntime for MininetRuntime {
    fn name(&self) -> &str {
        "mininet"
    }

    fn bind_controller(&mut self, controller: &ControllerRef) -> Result<(), RuntimeError> {
        if self.probe_controller && !controller.is_local() {
            self.probe(controller)?;
        }
        self.controller = Some(controller.clone());
        Ok(())
    }

    fn create_node(&mut self, node: &Node) -> Result<(), RuntimeError> {
        self.nodes.push(node.clone());
        Ok(())
    }

    fn create_link(&mut self, link: &Link) -> Result<(), RuntimeError> {
        self.links.push(link.clone());
        Ok(())
    }

    fn start(&mut self) -> Result<(), RuntimeError> {
        fs::create_dir_all(&self.work_dir)?;
        let script_path = self.work_dir.join(SCRIPT_FILE);
        fs::write(&script_path, render_script(&self.nodes, &self.links))?;
        info!("Wrote Mininet topology script to {}", script_path.display());

        let args = self.mn_args(&script_path);
        self.script_path = Some(script_path);

        info!("Launching {} {}", self.mn_binary.display(), args.join(" "));
        let mut child = Command::new(&self.mn_binary)
            .args(&args)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .spawn()?;

        let deadline = Instant::now() + STARTUP_GRACE;
        loop {
            if let Some(status) = child.try_wait()? {
                return Err(RuntimeError::Command(format!(
                    "{} exited immediately with {}",
                    self.mn_binary.display(),
                    status
                )));
            }
            if Instant::now() >= deadline {
                break;
            }
            thread::sleep(Duration::from_millis(50));
        }
        self.child = Some(child);
        Ok(())
    }

    fn stop(&mut self) -> Result<(), RuntimeError> {
        let reaped = match self.child.take() {
            Some(child) => terminate(child),
            None => Ok(()),
        };
        if let Err(e) = &reaped {
            warn!("Could not reap Mininet: {}", e);
        }

        let cleaned = self.cleanup();

        if let Some(path) = self.script_path.take() {
            if let Err(e) = fs::remove_file(&path) {
                debug!("Could not remove {}: {}", path.display(), e);
            }
        }
        self.nodes.clear();
        self.links.clear();
        reaped.and(cleaned)
    }

    fn endpoint(&self, node: &str) -> Option<Endpoint> {
        plan_endpoints(&self.nodes, &self.links).remove(node)
    }
}

/// Kill `child` if it is still running, then reap it
fn terminate(mut child: Child) -> Result<(), RuntimeError> {
    if child.try_wait()?.is_none() {
        warn!("Mininet still running; terminating it");
        child.kill()?;
    }
    child.wait()?;
    Ok(())
}

/// Hands the terminal to Mininet's own CLI until the operator exits it
#[derive(Debug, Default)]
pub struct MininetCli;

impl InteractiveSession<MininetRuntime> for MininetCli {
    fn interact(&mut self, network: &mut RunningNetwork<MininetRuntime>) -> Result<(), SessionError> {
        let guard = InterruptGuard::install()?;
        info!("Handing control to the Mininet CLI");
        let status = network.runtime_mut().wait()?;
        if guard.interrupted() {
            debug!("Interrupt passed through to the Mininet CLI");
        }
        if !status.success() {
            return Err(SessionError::Aborted(format!("mininet exited with {}", status)));
        }
        Ok(())
    }
}
