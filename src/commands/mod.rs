//! # CLI Command Implementations
//!
//! Each command module contains:
//! - An `Args` struct that defines the command-specific options, derived
//!   using `clap`.
//! - An `execute` function that takes the parsed `Args` and calls into the
//!   `workflow_sync` library to do the work.

pub mod run;
