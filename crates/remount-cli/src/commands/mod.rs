//! Command implementations for the remount CLI.
//!
//! remount has a single command, [`dev`], which resolves the target, loads
//! configuration and runs the dev loop until Ctrl-C.

pub mod dev;

pub use dev::execute as dev_execute;
