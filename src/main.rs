use clap::{Parser, ValueEnum};
use color_eyre::eyre::WrapErr;
use color_eyre::Result;
use env_logger::Env;
use log::{info, warn};
use std::io;
use std::path::PathBuf;

use netlaunch::config::RuntimeKind;
use netlaunch::config_loader;
use netlaunch::controller::ControllerRef;
use netlaunch::emulation::{ConsoleSession, DryRunRuntime, MininetCli, MininetRuntime};
use netlaunch::launch;
use netlaunch::topology::{self, analyze, Topology, CATALOG, DEFAULT_TOPOLOGY};
use netlaunch::utils::validate_binary_spec;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum DumpFormat {
    Yaml,
    Json,
}

/// Build an emulated switched network and attach it to a controller
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Built-in topology to launch
    #[arg(short, long, default_value = DEFAULT_TOPOLOGY)]
    topology: String,

    /// YAML launch description (takes precedence over --topology)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Controller to attach switches to: "local" or host[:port]
    #[arg(long)]
    controller: Option<ControllerRef>,

    /// Emulation backend
    #[arg(long, value_enum)]
    runtime: Option<RuntimeKind>,

    /// Print the built topology in this format and exit without launching
    #[arg(long, value_enum)]
    dump: Option<DumpFormat>,

    /// List built-in topologies and exit
    #[arg(long)]
    list: bool,

    /// Mininet executable, by name or path
    #[arg(long, default_value = "mn")]
    mn_binary: String,

    /// Directory for generated runtime files
    #[arg(long, default_value = "/tmp/netlaunch")]
    work_dir: PathBuf,
}

/// Topology selected by the command line, with any settings from a launch description
struct Selection {
    name: String,
    topology: Topology,
    controller: Option<ControllerRef>,
    runtime: Option<RuntimeKind>,
}

fn select_topology(args: &Args) -> Result<Selection> {
    if let Some(path) = &args.config {
        let config = config_loader::load_config(path)?;
        let (topology, warnings) = config
            .build_topology()
            .wrap_err_with(|| format!("Failed to build topology '{}'", config.name))?;
        if !warnings.is_empty() {
            warn!("Topology '{}' built with {} warnings", config.name, warnings.len());
        }
        return Ok(Selection {
            name: config.name,
            topology,
            controller: config.controller,
            runtime: config.runtime,
        });
    }

    let topology = topology::build_named(&args.topology)?;
    Ok(Selection {
        name: args.topology.clone(),
        topology,
        controller: None,
        runtime: None,
    })
}

fn log_summary(name: &str, topology: &Topology) {
    let report = analyze(topology);
    info!(
        "Topology '{}': {} switches, {} hosts, {} links",
        name,
        topology.switches().count(),
        topology.hosts().count(),
        topology.link_count()
    );
    if !report.is_connected() {
        warn!("Topology '{}' has {} disconnected components", name, report.components.len());
    }
    for (a, b, count) in &report.parallel_links {
        info!("{} parallel links between {} and {}", count, a, b);
    }
}

fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    let args = Args::parse();

    // Initialize logging with default filter level of "info"
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    if args.list {
        for entry in CATALOG {
            println!("{:<12} {}", entry.name, entry.description);
        }
        return Ok(());
    }

    let selection = select_topology(&args)?;
    log_summary(&selection.name, &selection.topology);

    if let Some(format) = args.dump {
        let rendered = match format {
            DumpFormat::Yaml => serde_yaml::to_string(&selection.topology)?,
            DumpFormat::Json => serde_json::to_string_pretty(&selection.topology)?,
        };
        println!("{}", rendered);
        return Ok(());
    }

    let controller = args
        .controller
        .clone()
        .or(selection.controller)
        .unwrap_or_default();
    let runtime = args.runtime.or(selection.runtime).unwrap_or_default();

    match runtime {
        RuntimeKind::DryRun => {
            let mut session = ConsoleSession::new(io::stdin().lock(), io::stdout());
            launch::run(selection.topology, controller, DryRunRuntime::new(), &mut session)?;
        }
        RuntimeKind::Mininet => {
            let mn_binary = validate_binary_spec(&args.mn_binary)
                .wrap_err("Mininet is required for --runtime mininet")?;
            let runtime = MininetRuntime::new(mn_binary, args.work_dir.clone());
            launch::run(selection.topology, controller, runtime, &mut MininetCli)?;
        }
    }

    info!("Launch finished");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsStr;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_cli_defaults() {
        let args = Args::parse_from(["netlaunch"]);

        assert_eq!(args.topology, DEFAULT_TOPOLOGY);
        assert_eq!(args.config, None);
        assert_eq!(args.controller, None);
        assert_eq!(args.runtime, None);
        assert_eq!(args.mn_binary, "mn");
        assert!(!args.list);
    }

    #[test]
    fn test_cli_parsing() {
        let args = Args::parse_from([
            "netlaunch",
            "--topology", "complex",
            "--controller", "10.0.0.100:6633",
            "--runtime", "dry-run",
            "--dump", "json",
        ]);

        assert_eq!(args.topology, "complex");
        assert_eq!(args.controller, Some(ControllerRef::remote("10.0.0.100", 6633)));
        assert_eq!(args.runtime, Some(RuntimeKind::DryRun));
        assert_eq!(args.dump, Some(DumpFormat::Json));
    }

    #[test]
    fn test_cli_rejects_bad_controller() {
        assert!(Args::try_parse_from(["netlaunch", "--controller", "host:notaport"]).is_err());
    }

    #[test]
    fn test_select_builtin_and_unknown() {
        let args = Args::parse_from(["netlaunch", "-t", "simple-ovs"]);
        let selection = select_topology(&args).unwrap();
        assert_eq!(selection.topology.node_count(), 6);
        assert!(selection.controller.is_none());

        let args = Args::parse_from(["netlaunch", "-t", "nonexistent"]);
        assert!(select_topology(&args).is_err());
    }

    #[test]
    fn test_select_from_config_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        write!(
            temp_file,
            "name: lab\ncontroller: local\nruntime: dry-run\nswitches: [{{name: s1}}]\nhosts: [{{name: h1}}]\nlinks: [[h1, s1]]\n"
        )
        .unwrap();

        let args = Args::parse_from([
            OsStr::new("netlaunch"),
            OsStr::new("--config"),
            temp_file.path().as_os_str(),
        ]);
        let selection = select_topology(&args).unwrap();
        assert_eq!(selection.name, "lab");
        assert_eq!(selection.controller, Some(ControllerRef::Local));
        assert_eq!(selection.runtime, Some(RuntimeKind::DryRun));
        assert_eq!(selection.topology.link_count(), 1);
    }
}
