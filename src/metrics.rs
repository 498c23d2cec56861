//! Accuracy bookkeeping: confusion matrix and per-class counters.
//!
//! [`MetricsAggregator::record`] is the only way samples enter the matrix and
//! the per-class stats, so every row of the matrix always sums to that
//! label's `total`. Failed samples are counted separately and never touch
//! either.

use serde::{Deserialize, Serialize};

use crate::error::{Error, FailureKind, Result};
use crate::labels::LabelSet;

/// Square table of `(true, predicted)` counts, indexed by [`LabelSet`]
/// position. Rows are true labels, columns are predictions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionMatrix(Vec<Vec<usize>>);

impl ConfusionMatrix {
    /// All-zero matrix for `n` classes.
    #[must_use]
    pub fn new(n: usize) -> Self {
        Self(vec![vec![0; n]; n])
    }

    /// Number of classes.
    #[must_use]
    pub fn size(&self) -> usize {
        self.0.len()
    }

    /// Count for one cell.
    #[must_use]
    pub fn get(&self, actual: usize, predicted: usize) -> usize {
        self.0[actual][predicted]
    }

    /// One row (true label).
    #[must_use]
    pub fn row(&self, actual: usize) -> &[usize] {
        &self.0[actual]
    }

    /// Rows in order.
    pub fn rows(&self) -> impl Iterator<Item = &[usize]> {
        self.0.iter().map(Vec::as_slice)
    }

    /// Sum of the diagonal.
    #[must_use]
    pub fn correct(&self) -> usize {
        self.0.iter().enumerate().map(|(i, row)| row[i]).sum()
    }

    /// Sum of all cells.
    #[must_use]
    pub fn total(&self) -> usize {
        self.0.iter().flatten().sum()
    }

    fn increment(&mut self, actual: usize, predicted: usize) {
        self.0[actual][predicted] += 1;
    }
}

/// Per-class correctness counter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassStats {
    /// Samples predicted as their true label.
    pub correct: usize,
    /// Samples evaluated for this label.
    pub total: usize,
}

impl ClassStats {
    /// `correct / total`, or 0 when nothing was evaluated.
    #[must_use]
    pub fn accuracy(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.correct as f64 / self.total as f64
        }
    }
}

/// Accumulates metrics over a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsAggregator {
    labels: LabelSet,
    matrix: ConfusionMatrix,
    stats: Vec<ClassStats>,
    failures: Vec<usize>,
    failures_by_kind: Vec<(FailureKind, usize)>,
    discovered: usize,
}

impl MetricsAggregator {
    /// Empty aggregator over `labels`.
    #[must_use]
    pub fn new(labels: LabelSet) -> Self {
        let n = labels.len();
        Self {
            labels,
            matrix: ConfusionMatrix::new(n),
            stats: vec![ClassStats::default(); n],
            failures: vec![0; n],
            failures_by_kind: Vec::new(),
            discovered: 0,
        }
    }

    /// Label set the axes follow.
    #[must_use]
    pub fn labels(&self) -> &LabelSet {
        &self.labels
    }

    /// Record one evaluated sample.
    ///
    /// # Panics
    ///
    /// Panics if either index is outside the label set.
    pub fn record(&mut self, actual: usize, predicted: usize) {
        self.matrix.increment(actual, predicted);
        let stats = &mut self.stats[actual];
        stats.total += 1;
        if actual == predicted {
            stats.correct += 1;
        }
    }

    /// Count a sample found on disk, whether or not it evaluates.
    pub fn note_discovered(&mut self) {
        self.discovered += 1;
    }

    /// Count a sample that was excluded from the metrics.
    pub fn record_failure(&mut self, actual: usize, kind: FailureKind) {
        self.failures[actual] += 1;
        match self.failures_by_kind.iter_mut().find(|(k, _)| *k == kind) {
            Some((_, count)) => *count += 1,
            None => self.failures_by_kind.push((kind, 1)),
        }
    }

    /// The confusion matrix.
    #[must_use]
    pub fn confusion_matrix(&self) -> &ConfusionMatrix {
        &self.matrix
    }

    /// Stats for one label index.
    #[must_use]
    pub fn class_stats(&self, label: usize) -> ClassStats {
        self.stats[label]
    }

    /// Stats for every label, in [`LabelSet`] order.
    #[must_use]
    pub fn all_class_stats(&self) -> &[ClassStats] {
        &self.stats
    }

    /// Stats looked up by label name.
    #[must_use]
    pub fn stats_for(&self, label: &str) -> Option<ClassStats> {
        self.labels.index_of(label).map(|i| self.stats[i])
    }

    /// Per-class accuracy, 0 when the label has no evaluated samples.
    #[must_use]
    pub fn per_class_accuracy(&self, label: usize) -> f64 {
        self.stats[label].accuracy()
    }

    /// Correct predictions across all labels.
    #[must_use]
    pub fn total_correct(&self) -> usize {
        self.stats.iter().map(|s| s.correct).sum()
    }

    /// Evaluated samples across all labels.
    #[must_use]
    pub fn total_evaluated(&self) -> usize {
        self.stats.iter().map(|s| s.total).sum()
    }

    /// Samples found on disk.
    #[must_use]
    pub fn total_discovered(&self) -> usize {
        self.discovered
    }

    /// Samples excluded by per-sample failures.
    #[must_use]
    pub fn total_failed(&self) -> usize {
        self.failures.iter().sum()
    }

    /// Failed samples for one label index.
    #[must_use]
    pub fn failures_for(&self, label: usize) -> usize {
        self.failures[label]
    }

    /// Failure counts grouped by kind, in first-seen order.
    #[must_use]
    pub fn failures_by_kind(&self) -> &[(FailureKind, usize)] {
        &self.failures_by_kind
    }

    /// Overall accuracy, 0 when nothing was evaluated.
    #[must_use]
    pub fn overall_accuracy(&self) -> f64 {
        let total = self.total_evaluated();
        if total == 0 {
            0.0
        } else {
            self.total_correct() as f64 / total as f64
        }
    }

    /// Fold another aggregator over the same label set into this one.
    pub fn merge(&mut self, other: &Self) -> Result<()> {
        if self.labels != other.labels {
            return Err(Error::LabelMismatch(
                "cannot merge aggregates over different label sets".to_string(),
            ));
        }

        for (actual, row) in other.matrix.rows().enumerate() {
            for (predicted, &count) in row.iter().enumerate() {
                self.matrix.0[actual][predicted] += count;
            }
        }
        for (mine, theirs) in self.stats.iter_mut().zip(&other.stats) {
            mine.correct += theirs.correct;
            mine.total += theirs.total;
        }
        for (mine, theirs) in self.failures.iter_mut().zip(&other.failures) {
            *mine += theirs;
        }
        for &(kind, count) in &other.failures_by_kind {
            match self.failures_by_kind.iter_mut().find(|(k, _)| *k == kind) {
                Some((_, c)) => *c += count,
                None => self.failures_by_kind.push((kind, count)),
            }
        }
        self.discovered += other.discovered;

        Ok(())
    }
}
