//! Text rendering of progress and results.
//!
//! [`Reporter`] only formats what it is given; all counting happens in
//! [`crate::metrics::MetricsAggregator`].

use std::io;
use std::path::Path;

use crate::error::FailureKind;
use crate::eval::report::EvalReport;
use crate::labels::LabelSet;
use crate::metrics::{ClassStats, ConfusionMatrix};
use crate::scores::PredictionResult;
use crate::sink::ReportSink;

const RULE_WIDTH: usize = 70;

/// Static facts about a run, printed before the first sample.
#[derive(Debug, Clone, Copy)]
pub struct RunHeader<'a> {
    /// Dataset root.
    pub dataset_root: &'a Path,
    /// Model labels.
    pub labels: &'a LabelSet,
    /// Engine input name.
    pub input_name: &'a str,
    /// Engine output name.
    pub output_name: &'a str,
    /// Input tensor shape.
    pub input_shape: &'a [usize],
}

/// Writes human-readable report lines to a sink.
pub struct Reporter<S> {
    sink: S,
    progress_interval: usize,
}

impl<S: ReportSink> Reporter<S> {
    /// Reporter printing a progress line every `progress_interval` samples
    /// within a label (0 disables progress lines).
    pub fn new(sink: S, progress_interval: usize) -> Self {
        Self { sink, progress_interval }
    }

    /// Recover the sink.
    pub fn into_inner(self) -> S {
        self.sink
    }

    fn line(&mut self, line: impl AsRef<str>) -> io::Result<()> {
        self.sink.write_line(line.as_ref())
    }

    fn rule(&mut self, ch: char) -> io::Result<()> {
        let rule: String = std::iter::repeat_n(ch, RULE_WIDTH).collect();
        self.line(rule)
    }

    /// Run banner.
    pub fn header(&mut self, header: &RunHeader<'_>) -> io::Result<()> {
        self.line("")?;
        self.rule('=')?;
        self.line("  CLASSIFICATION MODEL EVALUATION")?;
        self.rule('=')?;
        self.line(format!("Dataset: {}", header.dataset_root.display()))?;
        self.line(format!("Labels: {}", header.labels.as_slice().join(", ")))?;
        self.line(format!(
            "Input: {} {:?}, Output: {}",
            header.input_name, header.input_shape, header.output_name
        ))?;
        self.rule('=')?;
        self.line("")
    }

    /// A label directory contributed nothing.
    pub fn skipped_directory(&mut self, reason: &str) -> io::Result<()> {
        self.line(format!("  WARNING: {reason}"))
    }

    /// Start of a label's samples.
    pub fn label_start(&mut self, label: &str, count: usize) -> io::Result<()> {
        self.line("")?;
        self.line(format!("Testing {label} ({count} images)..."))
    }

    /// One evaluated sample.
    pub fn sample(
        &mut self,
        index: usize,
        file_name: &str,
        prediction: &PredictionResult,
        true_label: &str,
    ) -> io::Result<()> {
        let mut line = format!(
            "   [{index}] {file_name}: {} ({:.1}%)",
            prediction.label,
            prediction.confidence_percent()
        );
        if prediction.label != true_label {
            line.push_str(&format!(" | True: {true_label}"));
        }
        self.line(line)
    }

    /// One sample that was excluded.
    pub fn sample_failed(
        &mut self,
        index: usize,
        file_name: &str,
        kind: FailureKind,
        detail: &str,
    ) -> io::Result<()> {
        self.line(format!("   [{index}] {file_name}: WARNING {kind}: {detail}"))
    }

    /// Progress within a label; prints only on interval boundaries.
    pub fn progress(&mut self, done: usize, total: usize) -> io::Result<()> {
        if self.progress_interval == 0 || done == 0 || done % self.progress_interval != 0 {
            return Ok(());
        }
        self.line(format!(
            "    Progress: {done}/{total} ({:.1}%)",
            percent(done, total)
        ))
    }

    /// Summary after a label's samples are exhausted.
    pub fn label_summary(&mut self, label: &str, stats: ClassStats, failed: usize) -> io::Result<()> {
        let mut line = format!(
            "  {label} Accuracy: {}/{} ({:.1}%)",
            stats.correct,
            stats.total,
            stats.accuracy() * 100.0
        );
        if failed > 0 {
            line.push_str(&format!(", {failed} failed"));
        }
        self.line(line)
    }

    /// Final summary: totals, per-class accuracy and the confusion matrix.
    pub fn final_report(&mut self, report: &EvalReport) -> io::Result<()> {
        self.line("")?;
        self.rule('=')?;
        self.line("RESULTS SUMMARY")?;
        self.rule('=')?;
        self.line("")?;

        self.line(format!(
            "Overall Accuracy: {}/{} ({:.1}%)",
            report.correct,
            report.evaluated,
            report.overall_accuracy * 100.0
        ))?;
        self.line(format!(
            "Images: {} discovered, {} evaluated, {} failed; {} label directories skipped",
            report.discovered,
            report.evaluated,
            report.failed,
            report.skipped_directories.len()
        ))?;
        self.line("")?;

        self.line("Per-Class Accuracy:")?;
        for class in &report.classes {
            self.line(format!(
                "  {:<12} {}/{} ({:.1}%)",
                class.label,
                class.correct,
                class.total,
                class.accuracy * 100.0
            ))?;
        }
        self.line("")?;

        self.line("Confusion Matrix (True -> Predicted):")?;
        self.rule('-')?;
        for line in confusion_table(&report.labels, &report.confusion_matrix) {
            self.line(line)?;
        }
        self.rule('=')?;
        self.sink.flush()
    }
}

/// Render the confusion matrix as aligned text rows.
///
/// The first line is the header (column labels abbreviated to four
/// characters), followed by a separator and one row per true label.
#[must_use]
pub fn confusion_table(labels: &LabelSet, matrix: &ConfusionMatrix) -> Vec<String> {
    let mut lines = Vec::with_capacity(labels.len() + 2);

    let mut header = format!("{:<14}", "True \\ Pred");
    for label in labels.iter() {
        let short: String = label.chars().take(4).collect();
        header.push_str(&format!("{short:>7}"));
    }
    lines.push(header);
    lines.push("-".repeat(RULE_WIDTH));

    for (i, label) in labels.iter().enumerate() {
        let mut row = format!("{label:<14}");
        for count in matrix.row(i) {
            row.push_str(&format!("{count:>7}"));
        }
        lines.push(row);
    }

    lines
}

fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::MetricsAggregator;
    use crate::sink::MemorySink;

    fn prediction(label: &str, confidence: f64) -> PredictionResult {
        PredictionResult {
            label_index: 0,
            label: label.to_string(),
            confidence,
            probabilities: vec![confidence, 1.0 - confidence],
        }
    }

    #[test]
    fn test_sample_lines() {
        let mut reporter = Reporter::new(MemorySink::new(), 100);
        reporter.sample(1, "a.png", &prediction("Happy", 0.875), "Happy").unwrap();
        reporter.sample(2, "b.png", &prediction("Sad", 0.5), "Fear").unwrap();

        let sink = reporter.into_inner();
        assert_eq!(sink.lines[0], "   [1] a.png: Happy (87.5%)");
        assert_eq!(sink.lines[1], "   [2] b.png: Sad (50.0%) | True: Fear");
    }

    #[test]
    fn test_progress_only_on_interval() {
        let mut reporter = Reporter::new(MemorySink::new(), 2);
        for done in 1..=5 {
            reporter.progress(done, 5).unwrap();
        }
        let sink = reporter.into_inner();
        assert_eq!(sink.lines, vec!["    Progress: 2/5 (40.0%)", "    Progress: 4/5 (80.0%)"]);
    }

    #[test]
    fn test_label_summary_mentions_failures() {
        let mut reporter = Reporter::new(MemorySink::new(), 100);
        reporter.label_summary("Angry", ClassStats { correct: 3, total: 4 }, 1).unwrap();
        assert_eq!(reporter.into_inner().lines[0], "  Angry Accuracy: 3/4 (75.0%), 1 failed");
    }

    #[test]
    fn test_confusion_table_rows_follow_label_order() {
        let labels = LabelSet::new(["Angry", "Happy"]).unwrap();
        let mut agg = MetricsAggregator::new(labels.clone());
        agg.record(1, 0);
        agg.record(1, 1);

        let lines = confusion_table(&labels, agg.confusion_matrix());
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("True \\ Pred"));
        assert!(lines[0].contains("Angr"));
        assert!(lines[2].starts_with("Angry"));
        assert!(lines[3].starts_with("Happy"));
        assert!(lines[3].ends_with("      1      1"));
    }

    #[test]
    fn test_final_report_on_empty_run() {
        let agg = MetricsAggregator::new(LabelSet::new(["A", "B"]).unwrap());
        let report = EvalReport::from_aggregator("empty", "/nowhere", &agg);

        let mut reporter = Reporter::new(MemorySink::new(), 100);
        reporter.final_report(&report).unwrap();
        let sink = reporter.into_inner();
        assert!(sink.contains("Overall Accuracy: 0/0 (0.0%)"));
        assert!(sink.contains("0 discovered, 0 evaluated, 0 failed"));
    }
}
