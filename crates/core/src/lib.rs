//! Core library: configuration, video indexing and the tagging workflow.

pub mod config;
pub mod error;
pub mod indexer;
pub mod models;
pub mod scanner;
pub mod tagging;

pub use error::{ConfigError, IndexError, TaggingError};
