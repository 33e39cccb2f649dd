//! Execution engine UI for awsmod
//!
//! Reconciliation itself lives in the `declarative` crate. This module
//! shows plans and reports progress on the terminal.

pub mod differ;
pub mod progress;

pub use progress::CliProgress;
