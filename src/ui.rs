//! Terminal output helpers
//!
//! Module commands reserve stdout for their single JSON record, so status
//! messages go to stderr.

use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use serde_json::json;

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Print a dim/muted message
pub fn dim(msg: &str) {
    println!("  {}", msg.dimmed());
}

/// Print a header/title
pub fn header(title: &str) {
    println!();
    println!("{}", title.bold());
    println!("{}", "─".repeat(title.chars().count()).dimmed());
}

/// Print a key-value pair
pub fn kv(key: &str, value: &str) {
    println!("  {}: {}", key.dimmed(), value);
}

// ============================================================================
// Result Records
// ============================================================================

/// Write a result record to stdout
pub fn emit<T: Serialize>(record: &T) -> Result<()> {
    println!("{}", serde_json::to_string(record)?);
    Ok(())
}

/// The record written when a command fails
pub fn failure_record(err: &anyhow::Error) -> serde_json::Value {
    json!({ "failed": true, "msg": format!("{err:#}") })
}
