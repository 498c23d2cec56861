//! Label vocabularies.
//!
//! - [`LabelSet`]: the canonical, ordered class labels. Its order is the axis
//!   order of the confusion matrix and the tie-break order for predictions.
//! - [`LabelMap`]: dataset directory name to canonical label.
//! - [`OutputMapping`]: engine output index to [`LabelSet`] index.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Ordered set of distinct class labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct LabelSet {
    labels: Vec<String>,
}

impl LabelSet {
    /// Create a label set, rejecting empty lists and duplicates.
    pub fn new<I, S>(labels: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let labels: Vec<String> = labels.into_iter().map(Into::into).collect();
        if labels.is_empty() {
            return Err(Error::Config("label set is empty".to_string()));
        }

        let mut seen = HashSet::new();
        for label in &labels {
            if !seen.insert(label.as_str()) {
                return Err(Error::Config(format!("duplicate label: {label}")));
            }
        }

        Ok(Self { labels })
    }

    /// The output vocabulary of the FER2013 emotion model.
    #[must_use]
    pub fn fer2013() -> Self {
        Self {
            labels: ["Angry", "Disgust", "Fear", "Happy", "Neutral", "Sad", "Surprise"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }

    /// Number of labels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Always false; a label set holds at least one label.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Position of a label.
    #[must_use]
    pub fn index_of(&self, label: &str) -> Option<usize> {
        self.labels.iter().position(|l| l == label)
    }

    /// Label at a position.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    /// Labels in order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }

    /// Labels as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.labels
    }
}

impl std::ops::Index<usize> for LabelSet {
    type Output = str;

    fn index(&self, index: usize) -> &str {
        &self.labels[index]
    }
}

impl TryFrom<Vec<String>> for LabelSet {
    type Error = Error;

    fn try_from(labels: Vec<String>) -> Result<Self> {
        Self::new(labels)
    }
}

impl From<LabelSet> for Vec<String> {
    fn from(set: LabelSet) -> Self {
        set.labels
    }
}

/// One row of a [`LabelMap`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelEntry {
    /// Directory name under the dataset root.
    pub directory: String,
    /// Canonical label the directory maps to.
    pub label: String,
}

/// Mapping from dataset directory names to canonical labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelMap {
    entries: Vec<LabelEntry>,
}

impl LabelMap {
    /// Create a map from `(directory, label)` pairs.
    pub fn new<I, D, L>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (D, L)>,
        D: Into<String>,
        L: Into<String>,
    {
        Self {
            entries: pairs
                .into_iter()
                .map(|(d, l)| LabelEntry { directory: d.into(), label: l.into() })
                .collect(),
        }
    }

    /// Map every label to a directory of the same name.
    #[must_use]
    pub fn identity(labels: &LabelSet) -> Self {
        Self::new(labels.iter().map(|l| (l, l)))
    }

    /// The FER2013 directory layout.
    #[must_use]
    pub fn fer2013() -> Self {
        Self::new([
            ("angry", "Angry"),
            ("disgust", "Disgust"),
            ("fear", "Fear"),
            ("happy", "Happy"),
            ("sad", "Sad"),
            ("surprise", "Surprise"),
            ("neutral", "Neutral"),
        ])
    }

    /// Entries in declaration order.
    #[must_use]
    pub fn entries(&self) -> &[LabelEntry] {
        &self.entries
    }

    /// Entries sorted by canonical label, then directory name.
    #[must_use]
    pub fn sorted_by_label(&self) -> Vec<LabelEntry> {
        let mut entries = self.entries.clone();
        entries.sort_by(|a, b| a.label.cmp(&b.label).then_with(|| a.directory.cmp(&b.directory)));
        entries
    }

    /// Check that every canonical label is part of `labels` and that no
    /// directory is listed twice.
    pub fn validate(&self, labels: &LabelSet) -> Result<()> {
        let mut seen = HashSet::new();
        for entry in &self.entries {
            if labels.index_of(&entry.label).is_none() {
                return Err(Error::LabelMismatch(format!(
                    "directory '{}' maps to '{}', which is not a model label",
                    entry.directory, entry.label
                )));
            }
            if !seen.insert(entry.directory.as_str()) {
                return Err(Error::Config(format!(
                    "directory '{}' is mapped twice",
                    entry.directory
                )));
            }
        }
        Ok(())
    }
}

/// Validated mapping from engine output index to [`LabelSet`] index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputMapping {
    to_label: Vec<usize>,
}

impl OutputMapping {
    /// Engine outputs already in [`LabelSet`] order.
    #[must_use]
    pub fn identity(labels: &LabelSet) -> Self {
        Self { to_label: (0..labels.len()).collect() }
    }

    /// Build the mapping from the engine's declared output vocabulary.
    ///
    /// The vocabulary must be a permutation of `labels`.
    pub fn from_engine_labels(engine_labels: &[String], labels: &LabelSet) -> Result<Self> {
        if engine_labels.len() != labels.len() {
            return Err(Error::LabelMismatch(format!(
                "engine declares {} outputs, label set has {}",
                engine_labels.len(),
                labels.len()
            )));
        }

        let mut used = vec![false; labels.len()];
        let mut to_label = Vec::with_capacity(engine_labels.len());
        for name in engine_labels {
            let idx = labels.index_of(name).ok_or_else(|| {
                Error::LabelMismatch(format!("engine output '{name}' is not in the label set"))
            })?;
            if used[idx] {
                return Err(Error::LabelMismatch(format!(
                    "engine output '{name}' is declared twice"
                )));
            }
            used[idx] = true;
            to_label.push(idx);
        }

        Ok(Self { to_label })
    }

    /// Number of engine outputs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.to_label.len()
    }

    /// True when there are no outputs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.to_label.is_empty()
    }

    /// True if engine order equals [`LabelSet`] order.
    #[must_use]
    pub fn is_identity(&self) -> bool {
        self.to_label.iter().enumerate().all(|(i, &l)| i == l)
    }

    /// Reorder engine-ordered values into [`LabelSet`] order.
    ///
    /// `values` must have exactly [`Self::len`] entries.
    #[must_use]
    pub fn reorder(&self, values: &[f32]) -> Vec<f32> {
        debug_assert_eq!(values.len(), self.to_label.len());
        let mut out = vec![0.0; self.to_label.len()];
        for (engine_idx, &label_idx) in self.to_label.iter().enumerate() {
            out[label_idx] = values[engine_idx];
        }
        out
    }
}
