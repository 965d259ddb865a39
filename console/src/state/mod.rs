//! Console state modules.
//!
//! DESIGN
//! ======
//! State is split by panel (`staging`, `workflow`, `batch`) and by chrome
//! (`shell`, `settings`). Every model is a plain value advanced by a pure
//! `reduce(self, action) -> Self`, so front ends and tests drive the same
//! transitions without timers or I/O.

pub mod batch;
pub mod params;
pub mod settings;
pub mod shell;
pub mod staging;
pub mod workflow;
