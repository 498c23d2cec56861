//! Report types for evaluation results.
//!
//! An [`EvalReport`] is a read-only snapshot of a finished run. It can be
//! rendered as text (see [`crate::eval::render`]) or serialized to JSON and
//! CSV for downstream tooling.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, FailureKind, Result};
use crate::labels::LabelSet;
use crate::metrics::{ConfusionMatrix, MetricsAggregator};

/// Accuracy figures for one label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassReport {
    /// Canonical label.
    pub label: String,
    /// Correct predictions.
    pub correct: usize,
    /// Evaluated samples.
    pub total: usize,
    /// Samples excluded by failures.
    pub failed: usize,
    /// `correct / total`, 0 when `total` is 0.
    pub accuracy: f64,
}

/// A label directory that contributed no samples.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedDirectory {
    /// Directory name (or label) involved.
    pub directory: String,
    /// Why it was skipped.
    pub reason: String,
}

/// A sample excluded from the metrics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleFailure {
    /// Image path.
    pub path: PathBuf,
    /// Ground-truth label.
    pub label: String,
    /// Failure category.
    pub kind: FailureKind,
    /// Error message.
    pub detail: String,
}

/// Snapshot of a complete evaluation run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalReport {
    /// Report name, used for output file names.
    pub name: String,

    /// Dataset root that was evaluated.
    pub dataset_root: PathBuf,

    /// Label set; axis order of the confusion matrix.
    pub labels: LabelSet,

    /// Rows are true labels, columns are predictions.
    pub confusion_matrix: ConfusionMatrix,

    /// Per-label accuracy, in label set order.
    pub classes: Vec<ClassReport>,

    /// Image files found on disk.
    pub discovered: usize,

    /// Samples that made it into the metrics.
    pub evaluated: usize,

    /// Correct predictions.
    pub correct: usize,

    /// Samples excluded by failures.
    pub failed: usize,

    /// `correct / evaluated`, 0 when nothing was evaluated.
    pub overall_accuracy: f64,

    /// Label directories skipped entirely.
    #[serde(default)]
    pub skipped_directories: Vec<SkippedDirectory>,

    /// Every excluded sample.
    #[serde(default)]
    pub failures: Vec<SampleFailure>,

    /// Wall-clock duration of the run.
    #[serde(with = "duration_millis")]
    pub elapsed: Duration,

    /// When this report was generated.
    #[serde(with = "chrono_serde")]
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl EvalReport {
    /// Snapshot an aggregator.
    #[must_use]
    pub fn from_aggregator(
        name: impl Into<String>,
        dataset_root: impl Into<PathBuf>,
        metrics: &MetricsAggregator,
    ) -> Self {
        let classes = metrics
            .labels()
            .iter()
            .enumerate()
            .map(|(i, label)| {
                let stats = metrics.class_stats(i);
                ClassReport {
                    label: label.to_string(),
                    correct: stats.correct,
                    total: stats.total,
                    failed: metrics.failures_for(i),
                    accuracy: stats.accuracy(),
                }
            })
            .collect();

        Self {
            name: name.into(),
            dataset_root: dataset_root.into(),
            labels: metrics.labels().clone(),
            confusion_matrix: metrics.confusion_matrix().clone(),
            classes,
            discovered: metrics.total_discovered(),
            evaluated: metrics.total_evaluated(),
            correct: metrics.total_correct(),
            failed: metrics.total_failed(),
            overall_accuracy: metrics.overall_accuracy(),
            skipped_directories: Vec::new(),
            failures: Vec::new(),
            elapsed: Duration::ZERO,
            timestamp: chrono::Utc::now(),
        }
    }

    /// Report for one label.
    #[must_use]
    pub fn class(&self, label: &str) -> Option<&ClassReport> {
        self.classes.iter().find(|c| c.label == label)
    }

    /// Confusion matrix cell looked up by label names.
    #[must_use]
    pub fn cell(&self, actual: &str, predicted: &str) -> Option<usize> {
        let a = self.labels.index_of(actual)?;
        let p = self.labels.index_of(predicted)?;
        Some(self.confusion_matrix.get(a, p))
    }

    /// Write `<name>.json` and `<name>.csv` into `dir`.
    pub fn write_to_dir(&self, dir: &Path) -> Result<()> {
        std::fs::create_dir_all(dir)?;
        self.write_json(&dir.join(format!("{}.json", self.name)))?;
        self.write_matrix_csv(&dir.join(format!("{}.csv", self.name)))?;
        Ok(())
    }

    /// Write the full report as pretty-printed JSON.
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load a report written by [`Self::write_json`].
    ///
    /// The confusion matrix must be `labels x labels` and there must be one
    /// class entry per label.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let report: Self = serde_json::from_str(&content)?;
        report.check_shape().map_err(|reason| {
            Error::Report(format!("{}: {reason}", path.display()))
        })?;
        Ok(report)
    }

    fn check_shape(&self) -> std::result::Result<(), String> {
        let n = self.labels.len();
        if self.confusion_matrix.size() != n {
            return Err(format!(
                "confusion matrix has {} rows for {n} labels",
                self.confusion_matrix.size()
            ));
        }
        if let Some((i, row)) = self.confusion_matrix.rows().enumerate().find(|(_, r)| r.len() != n)
        {
            return Err(format!("confusion matrix row {i} has {} columns for {n} labels", row.len()));
        }
        if self.classes.len() != n {
            return Err(format!("{} class entries for {n} labels", self.classes.len()));
        }
        Ok(())
    }

    /// Write the confusion matrix plus per-class counts as CSV.
    pub fn write_matrix_csv(&self, path: &Path) -> Result<()> {
        let mut wtr = csv::Writer::from_path(path)?;

        let mut header = vec!["true_label".to_string()];
        header.extend(self.labels.iter().map(|l| format!("pred_{l}")));
        header.extend(["correct", "total", "failed", "accuracy"].map(String::from));
        wtr.write_record(&header)?;

        for (i, class) in self.classes.iter().enumerate() {
            let mut record = vec![class.label.clone()];
            record.extend(self.confusion_matrix.row(i).iter().map(|c| c.to_string()));
            record.push(class.correct.to_string());
            record.push(class.total.to_string());
            record.push(class.failed.to_string());
            record.push(format!("{:.4}", class.accuracy));
            wtr.write_record(&record)?;
        }

        wtr.flush()?;
        Ok(())
    }
}

// Custom serialization for Duration as milliseconds
mod duration_millis {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_millis().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

mod chrono_serde {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        dt.to_rfc3339().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
