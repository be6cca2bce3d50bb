//! Configuration and environment resolution.

mod config;
mod context;

pub use config::{ConfigError, GlobalConfig};
pub use context::{find_project_root, Context, InitError, DEFAULT_ALLOY_BASE, PROJECT_MARKER};
