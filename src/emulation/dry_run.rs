//! In-memory runtime and line-oriented console session.
//!
//! [`DryRunRuntime`] records every call it receives in a shared [`Journal`]
//! and never touches the host. It backs `--runtime dry-run` and the launch
//! tests; [`FailPoint`] lets a caller make one step fail.

use super::endpoints::plan_endpoints;
use super::{EmulationRuntime, Endpoint, InteractiveSession, RunningNetwork, RuntimeError, SessionError};
use crate::controller::ControllerRef;
use crate::topology::{Link, Node};
use log::{debug, info};
use std::cell::RefCell;
use std::io::{BufRead, Write};
use std::rc::Rc;

/// A call received by the dry-run runtime
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeCall {
    BindController(String),
    CreateNode(String),
    CreateLink(String, String),
    Start,
    Stop,
}

/// Shared, cloneable record of runtime calls
#[derive(Debug, Clone, Default)]
pub struct Journal(Rc<RefCell<Vec<RuntimeCall>>>);

impl Journal {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&self, call: RuntimeCall) {
        self.0.borrow_mut().push(call);
    }

    pub fn calls(&self) -> Vec<RuntimeCall> {
        self.0.borrow().clone()
    }

    /// Number of recorded calls equal to `call`
    pub fn count(&self, call: &RuntimeCall) -> usize {
        self.0.borrow().iter().filter(|c| *c == call).count()
    }
}

/// Step at which the dry-run runtime reports a failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailPoint {
    BindController,
    CreateNode(String),
    /// Fails the link with this position in the link sequence
    CreateLink(usize),
    Start,
    Stop,
}

#[derive(Debug, Default)]
pub struct DryRunRuntime {
    journal: Journal,
    fail_at: Option<FailPoint>,
    nodes: Vec<Node>,
    links: Vec<Link>,
    controller: Option<ControllerRef>,
    running: bool,
}

impl DryRunRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record calls into an existing journal
    pub fn with_journal(mut self, journal: Journal) -> Self {
        self.journal = journal;
        self
    }

    pub fn fail_at(mut self, point: FailPoint) -> Self {
        self.fail_at = Some(point);
        self
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn controller(&self) -> Option<&ControllerRef> {
        self.controller.as_ref()
    }

    fn should_fail(&self, point: &FailPoint) -> bool {
        self.fail_at.as_ref() == Some(point)
    }
}

impl EmulationRuntime for DryRunRuntime {
    fn name(&self) -> &str {
        "dry-run"
    }

    fn bind_controller(&mut self, controller: &ControllerRef) -> Result<(), RuntimeError> {
        self.journal.record(RuntimeCall::BindController(controller.to_string()));
        if self.should_fail(&FailPoint::BindController) {
            return Err(RuntimeError::ControllerUnreachable {
                controller: controller.to_string(),
                reason: "injected failure".to_string(),
            });
        }
        debug!("dry-run: bound controller {}", controller);
        self.controller = Some(controller.clone());
        Ok(())
    }

    fn create_node(&mut self, node: &Node) -> Result<(), RuntimeError> {
        self.journal.record(RuntimeCall::CreateNode(node.name.clone()));
        if self.should_fail(&FailPoint::CreateNode(node.name.clone())) {
            return Err(RuntimeError::NodeCreation {
                node: node.name.clone(),
                reason: "injected failure".to_string(),
            });
        }
        debug!("dry-run: created node {}", node.name);
        self.nodes.push(node.clone());
        Ok(())
    }

    fn create_link(&mut self, link: &Link) -> Result<(), RuntimeError> {
        self.journal
            .record(RuntimeCall::CreateLink(link.a.clone(), link.b.clone()));
        if self.should_fail(&FailPoint::CreateLink(self.links.len())) {
            return Err(RuntimeError::ResourceExhausted(format!(
                "no free port for link {}",
                link
            )));
        }
        debug!("dry-run: created link {}", link);
        self.links.push(link.clone());
        Ok(())
    }

    fn start(&mut self) -> Result<(), RuntimeError> {
        self.journal.record(RuntimeCall::Start);
        if self.should_fail(&FailPoint::Start) {
            return Err(RuntimeError::Command("injected start failure".to_string()));
        }
        info!(
            "dry-run: network up with {} nodes and {} links",
            self.nodes.len(),
            self.links.len()
        );
        self.running = true;
        Ok(())
    }

    fn stop(&mut self) -> Result<(), RuntimeError> {
        self.journal.record(RuntimeCall::Stop);
        self.running = false;
        self.nodes.clear();
        self.links.clear();
        if self.should_fail(&FailPoint::Stop) {
            return Err(RuntimeError::Command("injected stop failure".to_string()));
        }
        debug!("dry-run: network released");
        Ok(())
    }

    fn endpoint(&self, node: &str) -> Option<Endpoint> {
        plan_endpoints(&self.nodes, &self.links).remove(node)
    }
}

const CONSOLE_PROMPT: &str = "netlaunch> ";

const CONSOLE_HELP: &str = "\
Commands:
  nodes   list nodes
  links   list links in creation order
  net     show each node's neighbors
  dump    show node endpoints
  help    show this message
  exit    leave the session (also: quit, EOF)";

/// Minimal command loop over any runtime.
///
/// Reads commands line by line until `exit`, `quit` or end of input.
pub struct ConsoleSession<I, O> {
    input: I,
    output: O,
}

impl<I: BufRead, O: Write> ConsoleSession<I, O> {
    pub fn new(input: I, output: O) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> O {
        self.output
    }

    fn execute<R: EmulationRuntime>(&mut self, command: &str, network: &RunningNetwork<R>) -> std::io::Result<()> {
        let topology = network.topology();
        match command {
            "nodes" => {
                let names: Vec<&str> = topology.node_names().collect();
                writeln!(self.output, "available nodes are:\n{}", names.join(" "))
            }
            "links" => {
                for (i, link) in topology.links().iter().enumerate() {
                    writeln!(self.output, "{}: {}", i, link)?;
                }
                Ok(())
            }
            "net" => {
                for node in topology.nodes() {
                    writeln!(self.output, "{}: {}", node.name, topology.neighbors(&node.name).join(" "))?;
                }
                Ok(())
            }
            "dump" => {
                for node in topology.nodes() {
                    let kind = if node.is_host() { "Host" } else { "Switch" };
                    match network.endpoint(&node.name) {
                        Some(endpoint) => writeln!(
                            self.output,
                            "<{} {}: {} addr={}>",
                            kind,
                            node.name,
                            endpoint.interfaces.join(","),
                            endpoint.address.map(|a| a.to_string()).unwrap_or_else(|| "None".to_string())
                        )?,
                        None => writeln!(self.output, "<{} {}: not materialized>", kind, node.name)?,
                    }
                }
                Ok(())
            }
            "help" => writeln!(self.output, "{}", CONSOLE_HELP),
            other => writeln!(self.output, "*** Unknown command: {}", other),
        }
    }
}

impl<R: EmulationRuntime, I: BufRead, O: Write> InteractiveSession<R> for ConsoleSession<I, O> {
    fn interact(&mut self, network: &mut RunningNetwork<R>) -> Result<(), SessionError> {
        info!("Starting console session (type 'help' for commands)");
        let mut line = String::new();
        loop {
            write!(self.output, "{}", CONSOLE_PROMPT)?;
            self.output.flush()?;

            line.clear();
            if self.input.read_line(&mut line)? == 0 {
                writeln!(self.output)?;
                break;
            }

            match line.trim() {
                "" => continue,
                "exit" | "quit" => break,
                command => self.execute(command, network)?,
            }
        }
        info!("Console session ended");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::launch;
    use crate::topology::build_named;
    use std::io::Cursor;

    fn running_simple() -> RunningNetwork<DryRunRuntime> {
        let topo = build_named("simple").unwrap();
        launch::start(topo, ControllerRef::Local, DryRunRuntime::new()).unwrap()
    }

    #[test]
    fn test_journal_records_materialization_order() {
        let journal = Journal::new();
        let topo = build_named("simple").unwrap();
        let net = launch::start(topo, ControllerRef::Local, DryRunRuntime::new().with_journal(journal.clone())).unwrap();

        let calls = journal.calls();
        assert_eq!(calls[0], RuntimeCall::BindController("local".to_string()));
        assert_eq!(calls[1], RuntimeCall::CreateNode("s1".to_string()));
        assert_eq!(calls[6], RuntimeCall::CreateNode("h4".to_string()));
        assert_eq!(calls[7], RuntimeCall::CreateLink("h1".to_string(), "s1".to_string()));
        assert_eq!(calls[11], RuntimeCall::CreateLink("h4".to_string(), "s2".to_string()));
        assert_eq!(calls.last(), Some(&RuntimeCall::Start));
        assert!(net.runtime().is_running());
        assert_eq!(net.runtime().controller(), Some(&ControllerRef::Local));

        net.stop().unwrap();
        assert_eq!(journal.count(&RuntimeCall::Stop), 1);
    }

    #[test]
    fn test_endpoints_after_start() {
        let net = running_simple();
        let h2 = net.endpoint("h2").unwrap();
        assert_eq!(h2.interfaces, vec!["h2-eth0"]);
        assert_eq!(h2.address.unwrap().to_string(), "10.0.0.2");
        assert!(net.endpoint("h9").is_none());
    }

    #[test]
    fn test_console_commands() {
        let mut net = running_simple();
        let input = Cursor::new("nodes\n\nnet\nbogus\ndump\nexit\nlinks\n");
        let mut session = ConsoleSession::new(input, Vec::new());

        session.interact(&mut net).unwrap();

        let output = String::from_utf8(session.into_output()).unwrap();
        assert!(output.contains("s1 s2 h1 h2 h3 h4"));
        assert!(output.contains("s1: h1 h2 s2"));
        assert!(output.contains("*** Unknown command: bogus"));
        assert!(output.contains("<Host h1: h1-eth0 addr=10.0.0.1>"));
        // commands after exit are not run
        assert!(!output.contains("0: h1-s1"));
    }

    #[test]
    fn test_console_ends_on_eof() {
        let mut net = running_simple();
        let mut session = ConsoleSession::new(Cursor::new("links\n"), Vec::new());
        session.interact(&mut net).unwrap();

        let output = String::from_utf8(session.into_output()).unwrap();
        assert!(output.contains("0: h1-s1"));
        assert!(output.contains("4: h4-s2"));
    }
}
