//! Common types and utilities shared across Lookout crates.
//!
//! This crate holds the pieces every other crate in the workspace reaches
//! for: the shared error type, the output format enum used by the CLI, and
//! the tracing initialisation in [`observability`]. It stays small so the
//! DOM model and the engines can depend on it without pulling in drivers.
//!
//! # Overview
//!
//! - [`observability`]: Centralised tracing/logging initialisation
//! - [`LookoutError`] and [`Result`]: Shared error handling
//! - [`OutputFormat`]: How results are rendered for a caller
//!
//! # Examples
//!
//! ```rust
//! use lookout_common::OutputFormat;
//!
//! let format: OutputFormat = "yaml".parse().unwrap();
//! assert_eq!(format, OutputFormat::Yaml);
//! assert!("xml".parse::<OutputFormat>().is_err());
//! ```
use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub mod observability;

/// Preferred output format for scan results and content records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Yaml,
    /// Human/LLM-oriented plain-text summary.
    Text,
}

impl FromStr for OutputFormat {
    type Err = LookoutError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            "text" | "txt" => Ok(Self::Text),
            other => Err(LookoutError::Config(format!("unknown output format `{other}`"))),
        }
    }
}

/// Error types used across the Lookout workspace.
#[derive(thiserror::Error, Debug)]
pub enum LookoutError {
    /// Configuration was incomplete or invalid.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A page snapshot could not be decoded into a document.
    #[error("Snapshot error: {0}")]
    Snapshot(#[from] serde_json::Error),
}

/// Convenient alias for results that use [`LookoutError`].
pub type Result<T> = std::result::Result<T, LookoutError>;
