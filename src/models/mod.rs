//! Data models: pipeline configuration and persisted user settings.
//!
//! - [`PipelineConfig`] / [`OutputLayout`] / [`StageFlags`]: the resolved,
//!   in-memory configuration for one run. Built once at startup and passed to
//!   every stage; nothing in here is persisted.
//! - [`UserSettings`]: the optional YAML settings file managed by
//!   [`crate::config::ConfigManager`].

pub mod config;
pub mod pipeline;

pub use config::{DsaxSettings, UserSettings};
pub use pipeline::{
    game_dir_is_valid, is_wanted_archive, OutputLayout, PipelineConfig, StageFlags,
    DEFAULT_GAME_DIR, FSB_DECRYPTION_KEY, GAME_EXECUTABLE, WANTED_ARCHIVES,
};
