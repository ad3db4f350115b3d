//! Shared error model and configuration for DocAnalyzer.
//!
//! This crate is the foundation depended on by all other DocAnalyzer crates.
//! It provides:
//! - [`AnalyzerError`]: the unified error type
//! - Configuration ([`AppConfig`], [`ProviderSettings`], config loading)

pub mod config;
pub mod error;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, CacheConfig, CacheScope, DocumentConfig, ProviderConfig, ProviderSettings,
    RenderConfig, SamplingConfig, ServerConfig, apply_env_overrides, config_dir,
    config_file_path, init_config, load_config, load_config_from, validate_api_key,
};
pub use error::{AnalyzerError, Result};
