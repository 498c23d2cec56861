//! Evaluation session, rendering and report generation.
//!
//! This module provides the core evaluation infrastructure:
//!
//! - [`session::EvalSession`]: Runs the pipeline over a dataset
//! - [`session::EvalConfig`]: Configuration for evaluation
//! - [`render::Reporter`]: Human-readable progress and summary lines
//! - [`report`]: Report types for evaluation results

pub mod render;
pub mod report;
pub mod session;

pub use render::{confusion_table, Reporter, RunHeader};
pub use report::{ClassReport, EvalReport, SampleFailure, SkippedDirectory};
pub use session::{EvalConfig, EvalConfigBuilder, EvalSession, SampleOutcome};
