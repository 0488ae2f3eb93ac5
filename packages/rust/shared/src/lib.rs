//! Shared types, error model, and configuration for DeckBuilder.
//!
//! This crate is the foundation depended on by all other DeckBuilder crates.
//! It provides:
//! - [`DeckBuilderError`] — the unified error type
//! - Domain types ([`NotebookDoc`], [`ConflictPolicy`])
//! - Configuration ([`AppConfig`], [`BatchConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, BatchConfig, ConverterConfig, DefaultsConfig, config_dir, config_file_path,
    init_config, load_config, load_config_from,
};
pub use error::{DeckBuilderError, Result};
pub use types::{ConflictPolicy, NotebookDoc, SLIDES_SUBDIR};
