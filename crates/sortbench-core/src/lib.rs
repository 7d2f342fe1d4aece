//! SortBench core - benchmarking LLM list sorting
//!
//! Provides the full benchmark pipeline:
//! - Generates synthetic unsorted lists (integers, floats, strings, words)
//! - Collects raw sort responses from model providers and caches them on disk
//! - Leniently parses loosely-structured responses with provenance flags
//! - Computes disorder and fidelity metrics and aggregates them into scores
//! - Exports one CSV row per (config, model, list)

pub mod datagen;
pub mod error;
pub mod eval;
pub mod export;
pub mod inference;
pub mod metrics;
pub mod parser;
pub mod score;
pub mod store;
pub mod value;

// Re-export key types
pub use error::{Result, SortBenchError};
pub use eval::{evaluate_all, evaluate_config, ConfigKey, ScoreRow};
pub use inference::{InferenceClient, InferenceConfig, ProviderConfig, ProviderKind};
pub use parser::{parse_response, Literal, ParseOutcome};
pub use store::{ConfigResults, ModelRun};
pub use value::Scalar;

/// SortBench core version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
