//! # classify-eval
//!
//! Batch accuracy evaluation of image classification models.
//!
//! The library walks a labeled image dataset, preprocesses every image into
//! the model's input tensor, hands it to an external inference engine, turns
//! the returned logits into a prediction and accumulates a confusion matrix
//! plus per-class and overall accuracy.
//!
//! The engine itself is not part of this crate. Anything implementing
//! [`InferenceEngine`] (including a plain closure) can be evaluated.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use classify_eval::{EvalConfig, EvalSession, TeeSink, WriterSink};
//!
//! let config = EvalConfig::builder()
//!     .dataset_root("./FER2013/test")
//!     .input_name("emotion/input_layer1")
//!     .output_name("emotion/fc1")
//!     .build();
//!
//! let mut session = EvalSession::new(config, my_engine)?;
//! let sink = TeeSink::new()
//!     .with(WriterSink::stdout())
//!     .with(WriterSink::create("test_emotion.log")?);
//! let report = session.run(sink)?;
//! ```
//!
//! ## Modules
//!
//! - [`error`]: Error types for the library
//! - [`labels`]: Label sets, directory maps and engine output mapping
//! - [`dataset`]: Label-directory dataset traversal
//! - [`preprocess`]: Image decoding and tensor conversion
//! - [`inference`]: The engine boundary
//! - [`scores`]: Softmax, argmax and prediction results
//! - [`metrics`]: Confusion matrix and accuracy counters
//! - [`eval`]: Evaluation session, rendering and reports
//! - [`sink`]: Output destinations for report lines
//! - [`replay`]: Engine serving previously recorded logits

pub mod dataset;
pub mod error;
pub mod eval;
pub mod inference;
pub mod labels;
pub mod metrics;
pub mod preprocess;
pub mod replay;
pub mod scores;
pub mod sink;

// Re-export commonly used types
pub use dataset::{Dataset, DatasetSummary, ImageSample, LabelDir, LabelStatus};
pub use error::{Error, FailureKind, Result};
pub use eval::{
    report::{ClassReport, EvalReport, SampleFailure, SkippedDirectory},
    session::{EvalConfig, EvalSession, SampleOutcome},
};
pub use inference::{EngineOutputs, InferenceAdapter, InferenceEngine, InferenceRequest, RawScores};
pub use labels::{LabelMap, LabelSet, OutputMapping};
pub use metrics::{ClassStats, ConfusionMatrix, MetricsAggregator};
pub use preprocess::{InputSpec, Preprocessor, Tensor, TensorData, TensorDtype};
pub use replay::ReplayEngine;
pub use scores::{PredictionResult, ScoreInterpreter};
pub use sink::{MemorySink, ReportSink, TeeSink, WriterSink};
