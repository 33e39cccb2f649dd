// Module commands (one JSON record on stdout)
pub mod task_definitions;
pub mod user;

// Core commands
pub mod config;
