// Command model and FIFO queue
pub mod command;

// Singleton agent-status record
pub mod status;

// Append-only fertilizer drop log
pub mod droplog;

// Coordinator HTTP API
pub mod api;

// Agent polling loop and transports
pub mod agent;

// TOML configuration
pub mod config;
