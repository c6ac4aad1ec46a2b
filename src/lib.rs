// dsax - Dark Souls III Audio Extracting Tool
//
// This is the library crate containing the pipeline logic and data models.
// The binary crate (main.rs) provides the console entry point.

pub mod cli;
pub mod config;
pub mod logging;
pub mod models;
pub mod progress;
pub mod services;
pub mod ui;

// Re-export commonly used types for convenience
pub use config::ConfigManager;
pub use models::{OutputLayout, PipelineConfig, StageFlags, UserSettings};
pub use services::{ExtractionService, ToolKit};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
