//! # Netlaunch - Topology builder and launcher for emulated SDN networks
//!
//! This library builds small data-center-like network topologies (hosts,
//! switches and the links between them), materializes them on an external
//! network emulation platform, attaches the emulated switches to a local or
//! remote controller, and hands the running network to an interactive
//! session.
//!
//! ## Overview
//!
//! The topology is an in-memory multigraph constructed once, up front, by a
//! [`TopologyBuilder`](topology::TopologyBuilder). It is then frozen and
//! passed to an [`EmulationRuntime`](emulation::EmulationRuntime). The
//! emulation engine and the controller are external systems; this crate
//! only drives them through a narrow construction API.
//!
//! ## Architecture
//!
//! - `topology`: graph model, builder, structural analysis, built-in catalog
//! - `controller`: controller references (`local` or `host:port`)
//! - `emulation`: runtime and session traits, dry-run and Mininet backends
//! - `launch`: start / interact / stop sequence with guaranteed teardown
//! - `config`: YAML launch descriptions
//! - `config_loader`: loading and validating launch descriptions
//! - `utils`: address parsing and binary resolution
//!
//! ## Example Usage
//!
//! ```rust
//! use netlaunch::controller::ControllerRef;
//! use netlaunch::emulation::{ConsoleSession, DryRunRuntime};
//! use netlaunch::launch;
//! use netlaunch::topology::TopologyBuilder;
//!
//! let mut builder = TopologyBuilder::new();
//! let s1 = builder.add_switch("s1", None)?;
//! let h1 = builder.add_host("h1", Some("10.0.0.1"))?;
//! builder.add_link(h1, s1)?;
//! let topology = builder.build();
//!
//! let mut session = ConsoleSession::new(&b"nodes\nexit\n"[..], Vec::new());
//! launch::run(topology, ControllerRef::Local, DryRunRuntime::new(), &mut session)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Error Handling
//!
//! Library modules return typed errors built with `thiserror`
//! ([`TopologyError`](topology::TopologyError),
//! [`LaunchError`](launch::LaunchError), ...). The binary and the config
//! loader use `color_eyre` for reporting with context. Nothing is retried:
//! a failed start ends the launch.

pub mod config;
pub mod config_loader;
pub mod controller;
pub mod emulation;
pub mod launch;
pub mod topology;
pub mod utils;
