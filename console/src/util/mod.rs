//! Display helpers shared by front ends and the CLI.

pub mod format;
