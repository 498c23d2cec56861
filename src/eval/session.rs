//! Evaluation session driving the pipeline sample by sample.
//!
//! This module provides [`EvalSession`], the main entry point for an
//! evaluation run. The caller supplies an [`InferenceEngine`]; the session
//! handles dataset traversal, preprocessing, score interpretation, metrics
//! and report generation.

use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::dataset::{Dataset, ImageSample};
use crate::error::{Error, FailureKind, Result};
use crate::eval::render::{Reporter, RunHeader};
use crate::eval::report::{EvalReport, SampleFailure, SkippedDirectory};
use crate::inference::{InferenceAdapter, InferenceEngine};
use crate::labels::{LabelMap, LabelSet, OutputMapping};
use crate::metrics::MetricsAggregator;
use crate::preprocess::{InputSpec, Preprocessor};
use crate::scores::{PredictionResult, ScoreInterpreter};
use crate::sink::ReportSink;

/// Configuration for an evaluation session.
///
/// JSON input is read through [`EvalConfigBuilder`], so missing fields take
/// the same defaults as the builder.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(from = "EvalConfigBuilder")]
pub struct EvalConfig {
    /// Root directory holding one subdirectory per label.
    pub dataset_root: PathBuf,

    /// Model output vocabulary, in confusion-matrix order.
    pub labels: LabelSet,

    /// Dataset directory name to canonical label.
    pub label_map: LabelMap,

    /// Engine output order, if it differs from `labels`.
    pub output_labels: Option<Vec<String>>,

    /// Model input contract.
    pub input: InputSpec,

    /// Name of the engine input stream.
    pub input_name: String,

    /// Name of the engine output stream.
    pub output_name: String,

    /// Print a progress line every this many samples within a label.
    pub progress_interval: usize,

    /// Directory for JSON/CSV reports.
    pub report_dir: Option<PathBuf>,

    /// Base name of report files.
    pub report_name: String,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            dataset_root: PathBuf::from("FER2013/test"),
            labels: LabelSet::fer2013(),
            label_map: LabelMap::fer2013(),
            output_labels: None,
            input: InputSpec::default(),
            input_name: "input".to_string(),
            output_name: "output".to_string(),
            progress_interval: 100,
            report_dir: None,
            report_name: "evaluation".to_string(),
        }
    }
}

impl EvalConfig {
    /// Create a new configuration builder.
    #[must_use]
    pub fn builder() -> EvalConfigBuilder {
        EvalConfigBuilder::default()
    }

    /// Load a configuration from a JSON file. Missing fields take defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save the configuration as JSON.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), content)?;
        Ok(())
    }

    /// Build the engine-to-label mapping declared by this configuration.
    pub fn output_mapping(&self) -> Result<OutputMapping> {
        match &self.output_labels {
            Some(engine_labels) => OutputMapping::from_engine_labels(engine_labels, &self.labels),
            None => Ok(OutputMapping::identity(&self.labels)),
        }
    }
}

/// Builder for [`EvalConfig`].
///
/// Labels given without a label map get the identity map.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct EvalConfigBuilder {
    dataset_root: Option<PathBuf>,
    labels: Option<LabelSet>,
    label_map: Option<LabelMap>,
    output_labels: Option<Vec<String>>,
    input: Option<InputSpec>,
    input_name: Option<String>,
    output_name: Option<String>,
    progress_interval: Option<usize>,
    report_dir: Option<PathBuf>,
    report_name: Option<String>,
}

impl EvalConfigBuilder {
    /// Set the dataset root.
    #[must_use]
    pub fn dataset_root(mut self, path: impl Into<PathBuf>) -> Self {
        self.dataset_root = Some(path.into());
        self
    }

    /// Set the label set.
    #[must_use]
    pub fn labels(mut self, labels: LabelSet) -> Self {
        self.labels = Some(labels);
        self
    }

    /// Set the directory-to-label map.
    #[must_use]
    pub fn label_map(mut self, map: LabelMap) -> Self {
        self.label_map = Some(map);
        self
    }

    /// Declare the engine's output order.
    #[must_use]
    pub fn output_labels(mut self, labels: Vec<String>) -> Self {
        self.output_labels = Some(labels);
        self
    }

    /// Set the model input contract.
    #[must_use]
    pub fn input(mut self, input: InputSpec) -> Self {
        self.input = Some(input);
        self
    }

    /// Set the engine input name.
    #[must_use]
    pub fn input_name(mut self, name: impl Into<String>) -> Self {
        self.input_name = Some(name.into());
        self
    }

    /// Set the engine output name.
    #[must_use]
    pub fn output_name(mut self, name: impl Into<String>) -> Self {
        self.output_name = Some(name.into());
        self
    }

    /// Set the progress interval.
    #[must_use]
    pub fn progress_interval(mut self, every: usize) -> Self {
        self.progress_interval = Some(every);
        self
    }

    /// Set the report output directory.
    #[must_use]
    pub fn report_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.report_dir = Some(path.into());
        self
    }

    /// Set the report base name.
    #[must_use]
    pub fn report_name(mut self, name: impl Into<String>) -> Self {
        self.report_name = Some(name.into());
        self
    }

    /// Build the configuration.
    ///
    /// When only `labels` is given, the label map defaults to mapping each
    /// label to a directory of the same name.
    #[must_use]
    pub fn build(self) -> EvalConfig {
        let defaults = EvalConfig::default();
        let label_map = match (self.label_map, &self.labels) {
            (Some(map), _) => map,
            (None, Some(labels)) => LabelMap::identity(labels),
            (None, None) => defaults.label_map,
        };

        EvalConfig {
            dataset_root: self.dataset_root.unwrap_or(defaults.dataset_root),
            labels: self.labels.unwrap_or(defaults.labels),
            label_map,
            output_labels: self.output_labels,
            input: self.input.unwrap_or(defaults.input),
            input_name: self.input_name.unwrap_or(defaults.input_name),
            output_name: self.output_name.unwrap_or(defaults.output_name),
            progress_interval: self.progress_interval.unwrap_or(defaults.progress_interval),
            report_dir: self.report_dir,
            report_name: self.report_name.unwrap_or(defaults.report_name),
        }
    }
}

impl From<EvalConfigBuilder> for EvalConfig {
    fn from(builder: EvalConfigBuilder) -> Self {
        builder.build()
    }
}

/// Result of evaluating one sample.
#[derive(Debug, Clone, PartialEq)]
pub enum SampleOutcome {
    /// The sample produced a prediction.
    Success(PredictionResult),
    /// The sample is excluded from the metrics.
    Failure {
        /// Failure category.
        kind: FailureKind,
        /// Error message.
        detail: String,
    },
}

impl From<Result<PredictionResult>> for SampleOutcome {
    fn from(result: Result<PredictionResult>) -> Self {
        match result {
            Ok(prediction) => Self::Success(prediction),
            Err(e) => Self::Failure { kind: e.failure_kind(), detail: e.to_string() },
        }
    }
}

/// Evaluation session over one dataset and one engine.
///
/// # Example
///
/// ```rust,ignore
/// use classify_eval::{EvalConfig, EvalSession, MemorySink};
///
/// let config = EvalConfig::builder()
///     .dataset_root("./FER2013/test")
///     .input_name("emotion/input_layer1")
///     .output_name("emotion/fc1")
///     .build();
///
/// let mut session = EvalSession::new(config, my_engine)?;
/// let report = session.run(&mut MemorySink::new())?;
/// println!("{:.1}%", report.overall_accuracy * 100.0);
/// ```
pub struct EvalSession<E> {
    config: EvalConfig,
    dataset: Dataset,
    preprocessor: Preprocessor,
    adapter: InferenceAdapter<E>,
    interpreter: ScoreInterpreter,
}

impl<E: InferenceEngine> EvalSession<E> {
    /// Create a session, validating labels and the engine output mapping.
    ///
    /// This is the only place an evaluation can fail fatally.
    pub fn new(config: EvalConfig, engine: E) -> Result<Self> {
        let mapping = config.output_mapping()?;
        let interpreter = ScoreInterpreter::with_mapping(config.labels.clone(), mapping)?;
        let dataset = Dataset::new(&config.dataset_root, &config.label_map, &config.labels)?;
        let preprocessor = Preprocessor::new(config.input)?;
        let adapter =
            InferenceAdapter::new(engine, config.input_name.clone(), config.output_name.clone());

        info!(
            dataset = %config.dataset_root.display(),
            labels = config.labels.len(),
            input = %config.input_name,
            output = %config.output_name,
            "evaluation session ready"
        );

        Ok(Self { config, dataset, preprocessor, adapter, interpreter })
    }

    /// The session configuration.
    #[must_use]
    pub fn config(&self) -> &EvalConfig {
        &self.config
    }

    /// The dataset being evaluated.
    #[must_use]
    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    /// Preprocess, infer and interpret one sample.
    ///
    /// Never fails; errors come back as [`SampleOutcome::Failure`].
    pub fn evaluate_sample(&mut self, sample: &ImageSample) -> SampleOutcome {
        self.try_evaluate(sample).into()
    }

    fn try_evaluate(&mut self, sample: &ImageSample) -> Result<PredictionResult> {
        let start = Instant::now();
        let tensor = self.preprocessor.load(&sample.path)?;
        let raw = self.adapter.run(&tensor, &sample.path)?;
        let prediction = self.interpreter.interpret(&raw)?;
        debug!(
            file = %sample.path.display(),
            shape = ?tensor.shape,
            predicted = %prediction.label,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "sample evaluated"
        );
        Ok(prediction)
    }

    /// Evaluate the whole dataset, writing progress lines to `sink`.
    ///
    /// Per-sample and per-directory problems are reported and skipped. Only a
    /// failing sink ends the run early.
    pub fn run<S: ReportSink>(&mut self, sink: S) -> Result<EvalReport> {
        let start = Instant::now();
        let mut reporter = Reporter::new(sink, self.config.progress_interval);
        let mut metrics = MetricsAggregator::new(self.config.labels.clone());
        let mut skipped = Vec::new();
        let mut failures = Vec::new();
        let mut index = 0usize;

        let input_shape = self.config.input.shape();
        reporter.header(&RunHeader {
            dataset_root: self.dataset.root(),
            labels: &self.config.labels,
            input_name: self.adapter.input_name(),
            output_name: self.adapter.output_name(),
            input_shape: &input_shape,
        })?;

        let dataset = self.dataset.clone();
        for dir in dataset.label_dirs() {
            let dir = match dir {
                Ok(dir) => dir,
                Err(e) => {
                    warn!(error = %e, "label directory skipped");
                    reporter.skipped_directory(&e.to_string())?;
                    skipped.push(SkippedDirectory {
                        directory: skipped_name(&e),
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            let count = dir.files.len();
            reporter.label_start(&dir.label, count)?;

            for (done, sample) in dir.samples().enumerate() {
                index += 1;
                metrics.note_discovered();

                match self.evaluate_sample(&sample) {
                    SampleOutcome::Success(prediction) => {
                        metrics.record(sample.label_index, prediction.label_index);
                        reporter.sample(index, sample.file_name(), &prediction, &sample.label)?;
                    }
                    SampleOutcome::Failure { kind, detail } => {
                        debug!(file = %sample.path.display(), %kind, %detail, "sample failed");
                        metrics.record_failure(sample.label_index, kind);
                        reporter.sample_failed(index, sample.file_name(), kind, &detail)?;
                        failures.push(SampleFailure {
                            path: sample.path.clone(),
                            label: sample.label.clone(),
                            kind,
                            detail,
                        });
                    }
                }

                reporter.progress(done + 1, count)?;
            }

            reporter.label_summary(
                &dir.label,
                metrics.class_stats(dir.label_index),
                metrics.failures_for(dir.label_index),
            )?;
        }

        let mut report =
            EvalReport::from_aggregator(&self.config.report_name, self.dataset.root(), &metrics);
        report.skipped_directories = skipped;
        report.failures = failures;
        report.elapsed = start.elapsed();

        reporter.final_report(&report)?;

        info!(
            evaluated = report.evaluated,
            failed = report.failed,
            accuracy = report.overall_accuracy,
            "evaluation finished"
        );

        Ok(report)
    }

    /// Write `report` to the configured report directory, if any.
    ///
    /// Returns the directory written to.
    pub fn write_report(&self, report: &EvalReport) -> Result<Option<PathBuf>> {
        match &self.config.report_dir {
            Some(dir) => {
                report.write_to_dir(dir)?;
                Ok(Some(dir.clone()))
            }
            None => Ok(None),
        }
    }
}

fn skipped_name(error: &Error) -> String {
    match error {
        Error::DatasetDirectoryMissing { label, .. } | Error::EmptyLabelDirectory { label, .. } => {
            label.clone()
        }
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    use image::{Rgb, RgbImage};

    use crate::inference::{EngineOutputs, InferenceRequest, RawScores};
    use crate::replay::ReplayEngine;
    use crate::sink::MemorySink;

    fn write_png(path: &Path) {
        RgbImage::from_pixel(4, 4, Rgb([120, 60, 30])).save(path).unwrap();
    }

    fn small_input() -> InputSpec {
        InputSpec { width: 8, height: 8, ..InputSpec::default() }
    }

    fn constant_engine(
        scores: Vec<f32>,
    ) -> impl FnMut(InferenceRequest<'_>) -> Result<EngineOutputs> {
        move |_| {
            let raw = RawScores::with_shape(vec![1, scores.len()], scores.clone());
            Ok(EngineOutputs::single("output", raw))
        }
    }

    fn ab_config(root: &Path) -> EvalConfig {
        EvalConfig::builder()
            .dataset_root(root)
            .labels(LabelSet::new(["A", "B"]).unwrap())
            .input(small_input())
            .build()
    }

    #[test]
    fn test_eval_config_builder() {
        let config = EvalConfig::builder()
            .dataset_root("/data/test")
            .input_name("in0")
            .output_name("out0")
            .progress_interval(10)
            .report_dir("/tmp/reports")
            .build();

        assert_eq!(config.dataset_root, PathBuf::from("/data/test"));
        assert_eq!(config.labels, LabelSet::fer2013());
        assert_eq!(config.label_map, LabelMap::fer2013());
        assert_eq!(config.input_name, "in0");
        assert_eq!(config.progress_interval, 10);
        assert_eq!(config.input.shape(), vec![1, 224, 224, 3]);
    }

    #[test]
    fn test_config_json_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("eval.json");
        fs::write(&path, r#"{ "dataset_root": "/x", "input": { "width": 48, "height": 48 } }"#)
            .unwrap();

        let config = EvalConfig::load(&path).unwrap();
        assert_eq!(config.dataset_root, PathBuf::from("/x"));
        assert_eq!(config.input.width, 48);
        assert!(config.input.batched);
        assert_eq!(config.labels.len(), 7);
        assert_eq!(config.progress_interval, 100);
    }

    #[test]
    fn test_labels_only_config_gets_identity_map() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("eval.json");
        fs::write(&path, r#"{ "labels": ["A", "B"] }"#).unwrap();

        let config = EvalConfig::load(&path).unwrap();
        assert_eq!(config.label_map, LabelMap::identity(&config.labels));
        assert_eq!(config.label_map, ab_config(dir.path()).label_map);
        assert!(EvalSession::new(config, constant_engine(vec![0.0, 1.0])).is_ok());
    }

    #[test]
    fn test_saved_config_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("eval.json");
        let config = EvalConfig::builder()
            .labels(LabelSet::new(["A", "B"]).unwrap())
            .output_labels(vec!["B".to_string(), "A".to_string()])
            .report_name("ab")
            .build();
        config.save(&path).unwrap();

        let loaded = EvalConfig::load(&path).unwrap();
        assert_eq!(loaded.labels, config.labels);
        assert_eq!(loaded.label_map, config.label_map);
        assert_eq!(loaded.output_labels, config.output_labels);
        assert_eq!(loaded.report_name, "ab");
    }

    #[test]
    fn test_replayed_scores_with_header() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("A")).unwrap();
        fs::create_dir(dir.path().join("B")).unwrap();
        write_png(&dir.path().join("A/a1.png"));
        write_png(&dir.path().join("B/b1.png"));

        let engine = ReplayEngine::new(
            "output",
            vec!["B".to_string(), "A".to_string()],
            vec![
                ("A/a1.png".to_string(), vec![0.0, 3.0]),
                ("B/b1.png".to_string(), vec![3.0, 0.0]),
            ],
        )
        .unwrap();
        let mut config = ab_config(dir.path());
        config.output_labels = Some(engine.output_labels().to_vec());

        let mut session = EvalSession::new(config, engine).unwrap();
        let mut sink = MemorySink::new();
        let report = session.run(&mut sink).unwrap();

        assert_eq!(sink.lines[2], "  CLASSIFICATION MODEL EVALUATION");
        assert_eq!(sink.lines[4], format!("Dataset: {}", dir.path().display()));
        assert_eq!(sink.lines[5], "Labels: A, B");
        assert_eq!(sink.lines[6], "Input: input [1, 8, 8, 3], Output: output");
        assert!(sink.contains("   [1] a1.png: A ("));
        assert!(sink.contains("   [2] b1.png: B ("));

        assert_eq!(report.cell("A", "A"), Some(1));
        assert_eq!(report.cell("B", "B"), Some(1));
        assert_eq!(report.overall_accuracy, 1.0);
    }

    #[test]
    fn test_two_label_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("A")).unwrap();
        fs::create_dir(dir.path().join("B")).unwrap();
        write_png(&dir.path().join("A/a1.png"));
        write_png(&dir.path().join("B/b1.png"));

        let mut session =
            EvalSession::new(ab_config(dir.path()), constant_engine(vec![2.0, 0.0])).unwrap();
        let mut sink = MemorySink::new();
        let report = session.run(&mut sink).unwrap();

        assert_eq!(report.cell("A", "A"), Some(1));
        assert_eq!(report.cell("B", "A"), Some(1));
        assert_eq!(report.cell("B", "B"), Some(0));
        assert_eq!(report.overall_accuracy, 0.5);
        assert_eq!(report.class("A").unwrap().accuracy, 1.0);
        assert_eq!(report.class("B").unwrap().accuracy, 0.0);
        assert_eq!(report.discovered, 2);
        assert_eq!(report.evaluated, 2);

        assert!(sink.contains("[1] a1.png: A (88.1%)"));
        assert!(sink.contains("[2] b1.png: A (88.1%) | True: B"));
        assert!(sink.contains("Overall Accuracy: 1/2 (50.0%)"));
    }

    #[test]
    fn test_engine_failure_excludes_sample() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("A")).unwrap();
        for name in ["ok1.png", "bad.png", "ok2.png"] {
            write_png(&dir.path().join("A").join(name));
        }

        let engine = |req: InferenceRequest<'_>| -> Result<EngineOutputs> {
            if req.source.ends_with("bad.png") {
                return Err(Error::Inference { message: "device timeout".to_string() });
            }
            Ok(EngineOutputs::single("output", RawScores::flat(vec![1.0, 0.0])))
        };

        let mut session = EvalSession::new(ab_config(dir.path()), engine).unwrap();
        let mut sink = MemorySink::new();
        let report = session.run(&mut sink).unwrap();

        let a = report.class("A").unwrap();
        assert_eq!(a.total, 2);
        assert_eq!(a.correct, 2);
        assert_eq!(a.failed, 1);
        assert_eq!(a.accuracy, 1.0);
        assert_eq!(report.discovered, 3);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].kind, FailureKind::Inference);
        assert!(sink.contains("bad.png: WARNING InferenceEngineFailure"));
        assert!(sink.contains("A Accuracy: 2/2 (100.0%), 1 failed"));
    }

    #[test]
    fn test_undecodable_image_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("B")).unwrap();
        write_png(&dir.path().join("B/good.png"));
        fs::write(dir.path().join("B/corrupt.jpg"), b"garbage").unwrap();

        let mut session =
            EvalSession::new(ab_config(dir.path()), constant_engine(vec![0.0, 1.0])).unwrap();
        let report = session.run(MemorySink::new()).unwrap();

        assert_eq!(report.class("B").unwrap().total, 1);
        assert_eq!(report.failures[0].kind, FailureKind::Decode);
        // "A" was never created on disk.
        assert_eq!(report.skipped_directories.len(), 1);
        assert_eq!(report.skipped_directories[0].directory, "A");
        assert_eq!(report.class("A").unwrap().total, 0);
    }

    #[test]
    fn test_wrong_output_length_is_shape_failure() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("A")).unwrap();
        write_png(&dir.path().join("A/x.png"));

        let mut session =
            EvalSession::new(ab_config(dir.path()), constant_engine(vec![1.0, 2.0, 3.0])).unwrap();
        let report = session.run(MemorySink::new()).unwrap();

        assert_eq!(report.evaluated, 0);
        assert_eq!(report.failures[0].kind, FailureKind::Shape);
    }

    #[test]
    fn test_empty_root_reports_zero() {
        let dir = tempfile::tempdir().unwrap();
        let config = EvalConfig::builder()
            .dataset_root(dir.path())
            .input(small_input())
            .build();

        let mut session = EvalSession::new(config, constant_engine(vec![0.0; 7])).unwrap();
        let mut sink = MemorySink::new();
        let report = session.run(&mut sink).unwrap();

        assert_eq!(report.overall_accuracy, 0.0);
        assert_eq!(report.evaluated, 0);
        assert_eq!(report.skipped_directories.len(), 7);
        assert!(sink.contains("RESULTS SUMMARY"));
        assert!(sink.contains("Overall Accuracy: 0/0 (0.0%)"));
    }

    #[test]
    fn test_divergent_engine_vocabulary_is_fatal() {
        let config = EvalConfig::builder()
            .labels(LabelSet::new(["A", "B"]).unwrap())
            .output_labels(vec!["A".to_string(), "C".to_string()])
            .build();

        let result = EvalSession::new(config, constant_engine(vec![0.0, 0.0]));
        assert!(matches!(result, Err(Error::LabelMismatch(_))));
    }

    #[test]
    fn test_permuted_engine_vocabulary_is_remapped() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("B")).unwrap();
        write_png(&dir.path().join("B/x.png"));

        let config = EvalConfig::builder()
            .dataset_root(dir.path())
            .labels(LabelSet::new(["A", "B"]).unwrap())
            .output_labels(vec!["B".to_string(), "A".to_string()])
            .input(small_input())
            .build();

        // Engine index 0 is "B".
        let mut session = EvalSession::new(config, constant_engine(vec![3.0, 0.0])).unwrap();
        let report = session.run(MemorySink::new()).unwrap();
        assert_eq!(report.cell("B", "B"), Some(1));
    }

    #[test]
    fn test_write_report_to_configured_dir() {
        let data = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let config = EvalConfig::builder()
            .dataset_root(data.path())
            .report_dir(out.path())
            .report_name("fer")
            .input(small_input())
            .build();

        let mut session = EvalSession::new(config, constant_engine(vec![0.0; 7])).unwrap();
        let report = session.run(MemorySink::new()).unwrap();
        let written = session.write_report(&report).unwrap();

        assert_eq!(written.as_deref(), Some(out.path()));
        assert!(out.path().join("fer.json").exists());
        assert!(out.path().join("fer.csv").exists());
    }
}
