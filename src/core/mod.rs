//! Core module - harness building, resolution and the processing pipeline

pub mod builder;
pub mod colors;
pub mod config;
pub mod designator;
pub mod error;
pub mod pipeline;
pub mod resolver;

pub use builder::{build_harness, merge_documents, HarnessDocument};
pub use config::{Config, ConfigError, OutputFormat};
pub use error::{HarnessError, Result};
pub use pipeline::{process_batch, process_harness, BatchReport, HarnessInput, HarnessOutput};
