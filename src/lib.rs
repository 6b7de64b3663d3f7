//! cyclecheck - orchestration shim for an external battery-cycler record checker.
//!
//! The external analysis program reads a JSON test record from a path and
//! prints a JSON verdict. This crate stages inputs for it (file path,
//! in-memory data, or raw text), runs it, parses what it prints, and
//! aggregates batches with per-item failure isolation.
//!
//! ```rust,ignore
//! use cyclecheck::{Analyzer, Config};
//!
//! let analyzer = Analyzer::from_config(&Config::default());
//! let verdict = analyzer.analyze_file("record.json").await?;
//! let report = analyzer.analyze_batch(&paths).await;
//! ```

pub mod analyzer;
pub mod batch;
pub mod cli;
pub mod config;
pub mod error;
pub mod invoker;
pub mod models;
pub mod report;
pub mod runner;
pub mod scanner;
pub mod stager;

pub use analyzer::Analyzer;
pub use config::Config;
pub use error::{AnalysisError, Result};
pub use models::{AnalysisRequest, BatchItem, BatchReport, BatchSummary, Outcome};
pub use runner::{CommandRunner, ProcessOutput, ProcessRunner};
