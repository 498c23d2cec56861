//! Evaluation command.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use classify_eval::{EvalSession, ReplayEngine, TeeSink, WriterSink};
use tracing::info;

use crate::DatasetArgs;

pub fn run(
    dataset: &DatasetArgs,
    scores: &Path,
    log_file: &Path,
    report_dir: Option<PathBuf>,
    progress_interval: Option<usize>,
) -> Result<()> {
    let mut config = super::load_config(dataset)?;
    if let Some(dir) = report_dir {
        config.report_dir = Some(dir);
    }
    if let Some(every) = progress_interval {
        config.progress_interval = every;
    }

    let engine = ReplayEngine::load(scores, config.output_name.clone())
        .with_context(|| format!("Failed to load scores from {}", scores.display()))?;
    info!(rows = engine.len(), "loaded recorded scores");

    if config.output_labels.is_none() {
        config.output_labels = Some(engine.output_labels().to_vec());
    }

    let mut session =
        EvalSession::new(config, engine).context("Failed to set up evaluation session")?;

    let log = WriterSink::create(log_file)
        .with_context(|| format!("Failed to create log file {}", log_file.display()))?;
    let sink = TeeSink::new().with(WriterSink::stdout()).with(log);

    let report = session.run(sink).context("Evaluation aborted")?;

    if let Some(dir) = session.write_report(&report).context("Failed to write report")? {
        println!("Reports written to: {}", dir.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn test_run_replays_scores_into_log_and_reports() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("test");
        std::fs::create_dir_all(root.join("happy")).unwrap();
        RgbImage::from_pixel(48, 48, Rgb([90, 90, 90]))
            .save(root.join("happy/face.png"))
            .unwrap();

        let scores = dir.path().join("scores.csv");
        std::fs::write(
            &scores,
            "file,Angry,Disgust,Fear,Happy,Neutral,Sad,Surprise\nhappy/face.png,0,0,0,5,0,0,0\n",
        )
        .unwrap();

        let log = dir.path().join("run.log");
        let reports = dir.path().join("reports");
        let args = DatasetArgs { dataset: Some(root), config: None };
        run(&args, &scores, &log, Some(reports.clone()), Some(0)).unwrap();

        let text = std::fs::read_to_string(&log).unwrap();
        assert!(text.contains("Labels: Angry, Disgust, Fear, Happy, Neutral, Sad, Surprise"));
        assert!(text.contains("   [1] face.png: Happy ("));
        assert!(text.contains("  Happy Accuracy: 1/1 (100.0%)"));
        assert!(text.contains("Overall Accuracy: 1/1 (100.0%)"));
        assert!(!text.contains("Progress:"));
        assert!(reports.join("evaluation.json").exists());
        assert!(reports.join("evaluation.csv").exists());
    }
}
