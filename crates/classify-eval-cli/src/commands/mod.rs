pub mod discover;
pub mod run;

use anyhow::{Context, Result};
use classify_eval::EvalConfig;

use crate::DatasetArgs;

/// Resolve the configuration: file (if any), then the dataset argument.
pub fn load_config(args: &DatasetArgs) -> Result<EvalConfig> {
    let mut config = match &args.config {
        Some(path) => EvalConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => EvalConfig::default(),
    };

    if let Some(dataset) = &args.dataset {
        config.dataset_root.clone_from(dataset);
    }

    Ok(config)
}
