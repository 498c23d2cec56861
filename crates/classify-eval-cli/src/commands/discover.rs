//! Dataset discovery command.

use anyhow::{Context, Result};
use classify_eval::{Dataset, LabelStatus};

use crate::DatasetArgs;

pub fn run(dataset: &DatasetArgs, json: bool) -> Result<()> {
    let config = super::load_config(dataset)?;
    let summary = Dataset::new(&config.dataset_root, &config.label_map, &config.labels)
        .context("Invalid label map")?
        .discover();

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("Dataset: {}", summary.root.display());
    for label in &summary.labels {
        let status = match &label.status {
            LabelStatus::Ready { images } => format!("{images} images"),
            LabelStatus::Missing => "directory not found".to_string(),
            LabelStatus::Empty => "no images".to_string(),
            LabelStatus::Unreadable { reason } => format!("unreadable: {reason}"),
        };
        println!("  {:<12} {:<12} {}", label.label, label.directory, status);
    }
    println!(
        "Total: {} images, {} of {} label directories skipped",
        summary.image_count(),
        summary.skipped_count(),
        summary.labels.len()
    );

    Ok(())
}
