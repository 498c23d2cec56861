//! Replay of logits captured from an earlier device run.
//!
//! Score files are CSV with one row per image:
//!
//! ```text
//! file,Angry,Disgust,Fear,Happy,Neutral,Sad,Surprise
//! angry/PrivateTest_1054527.jpg,2.1,-0.3,0.4,-1.2,0.0,0.8,-2.0
//! PublicTest_97.png,...
//! ```
//!
//! The header after the first column is the engine's output vocabulary, in
//! engine order. Rows are looked up by `<label dir>/<file name>` first, then
//! by bare file name.

use std::collections::HashMap;
use std::path::Path;

use crate::error::{Error, Result};
use crate::inference::{EngineOutputs, InferenceEngine, InferenceRequest, RawScores};

/// An [`InferenceEngine`] answering from a table of recorded logits.
#[derive(Debug, Clone)]
pub struct ReplayEngine {
    output_name: String,
    labels: Vec<String>,
    scores: HashMap<String, Vec<f32>>,
}

impl ReplayEngine {
    /// Build from in-memory rows.
    pub fn new(
        output_name: impl Into<String>,
        labels: Vec<String>,
        rows: impl IntoIterator<Item = (String, Vec<f32>)>,
    ) -> Result<Self> {
        let scores: HashMap<String, Vec<f32>> = rows.into_iter().collect();
        if let Some((key, values)) = scores.iter().find(|(_, v)| v.len() != labels.len()) {
            return Err(Error::Config(format!(
                "replay row '{key}' has {} scores, header declares {}",
                values.len(),
                labels.len()
            )));
        }
        Ok(Self { output_name: output_name.into(), labels, scores })
    }

    /// Load a score CSV.
    pub fn load(path: impl AsRef<Path>, output_name: impl Into<String>) -> Result<Self> {
        let path = path.as_ref();
        let mut rdr = csv::Reader::from_path(path)?;

        let headers = rdr.headers()?.clone();
        if headers.len() < 2 {
            return Err(Error::Config(format!(
                "{}: expected a file column followed by one column per label",
                path.display()
            )));
        }
        let labels: Vec<String> = headers.iter().skip(1).map(|h| h.trim().to_string()).collect();

        let mut rows = Vec::new();
        for (i, record) in rdr.records().enumerate() {
            let record = record?;
            let key = record.get(0).unwrap_or("").trim().replace('\\', "/");
            let values = record
                .iter()
                .skip(1)
                .map(|v| {
                    v.trim().parse::<f32>().map_err(|e| {
                        Error::Config(format!(
                            "{}: line {}: invalid score '{v}': {e}",
                            path.display(),
                            i + 2
                        ))
                    })
                })
                .collect::<Result<Vec<f32>>>()?;
            rows.push((key, values));
        }

        Self::new(output_name, labels, rows)
    }

    /// Output vocabulary in engine order.
    #[must_use]
    pub fn output_labels(&self) -> &[String] {
        &self.labels
    }

    /// Number of recorded rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    /// True when no rows were recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    fn lookup(&self, source: &Path) -> Option<&Vec<f32>> {
        let file = source.file_name()?.to_str()?;
        let qualified = source
            .parent()
            .and_then(|p| p.file_name())
            .and_then(|d| d.to_str())
            .map(|dir| format!("{dir}/{file}"));

        qualified
            .and_then(|key| self.scores.get(&key))
            .or_else(|| self.scores.get(file))
    }
}

impl InferenceEngine for ReplayEngine {
    fn infer(&mut self, request: InferenceRequest<'_>) -> Result<EngineOutputs> {
        let values = self.lookup(request.source).ok_or_else(|| Error::Inference {
            message: format!("no recorded scores for {}", request.source.display()),
        })?;

        Ok(EngineOutputs::single(
            self.output_name.clone(),
            RawScores::with_shape(vec![1, values.len()], values.clone()),
        ))
    }
}
