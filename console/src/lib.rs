//! # console
//!
//! Operator console core for the LAS/LAZ tunnel point-cloud backend.
//!
//! This crate contains the panel state (upload staging, unwrap / batch /
//! analysis workflows, navigation shell, settings), the status channels that
//! link the console to the backend, and the runner that drives simulated
//! stage pipelines as cancellable tokio tasks. It carries no rendering code:
//! any front end subscribes to the state snapshots and dispatches intents.

pub mod app;
pub mod net;
pub mod runner;
pub mod state;
pub mod util;

pub use app::{ConsoleState, Intent};
pub use frames::{EventKind, ModuleTag, StatusEvent};
