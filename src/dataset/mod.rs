//! Labeled image datasets laid out as one directory per label.
//!
//! ```text
//! test/
//!   angry/    0001.jpg 0002.png ...
//!   happy/    ...
//! ```
//!
//! Directory names are translated to canonical labels through a
//! [`LabelMap`]. Traversal is lazy: a label directory is listed only when the
//! iterator reaches it, and every call to [`Dataset::label_dirs`] or
//! [`Dataset::samples`] starts over from the first label.
//!
//! ## Example
//!
//! ```rust,ignore
//! use classify_eval::{Dataset, LabelMap, LabelSet};
//!
//! let dataset = Dataset::new("./FER2013/test", &LabelMap::fer2013(), &LabelSet::fer2013())?;
//! for dir in dataset.label_dirs() {
//!     match dir {
//!         Ok(dir) => println!("{}: {} images", dir.label, dir.files.len()),
//!         Err(e) => eprintln!("{e}"),
//!     }
//! }
//! ```

mod discovery;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub use discovery::{is_supported_image, SUPPORTED_EXTENSIONS};

use crate::error::Result;
use crate::labels::{LabelEntry, LabelMap, LabelSet};

/// One image and its ground-truth label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSample {
    /// Path to the image file.
    pub path: PathBuf,
    /// Canonical label.
    pub label: String,
    /// Position of `label` in the [`LabelSet`].
    pub label_index: usize,
}

impl ImageSample {
    /// File name without directories.
    #[must_use]
    pub fn file_name(&self) -> &str {
        self.path.file_name().and_then(|s| s.to_str()).unwrap_or("")
    }
}

/// A label directory that exists and holds at least one image.
#[derive(Debug, Clone)]
pub struct LabelDir {
    /// Directory name under the dataset root.
    pub directory: String,
    /// Canonical label.
    pub label: String,
    /// Position of `label` in the [`LabelSet`].
    pub label_index: usize,
    /// Directory path.
    pub path: PathBuf,
    /// Image files in filesystem enumeration order.
    pub files: Vec<PathBuf>,
}

impl LabelDir {
    /// Samples in this directory.
    pub fn samples(&self) -> impl Iterator<Item = ImageSample> + '_ {
        self.files.iter().map(|path| ImageSample {
            path: path.clone(),
            label: self.label.clone(),
            label_index: self.label_index,
        })
    }

    /// Consume the directory listing, yielding its samples.
    pub fn into_samples(self) -> impl Iterator<Item = ImageSample> {
        let Self { label, label_index, files, .. } = self;
        files.into_iter().map(move |path| ImageSample {
            path,
            label: label.clone(),
            label_index,
        })
    }
}

/// A dataset root plus the label directories to visit.
#[derive(Debug, Clone)]
pub struct Dataset {
    root: PathBuf,
    entries: Vec<(LabelEntry, usize)>,
}

impl Dataset {
    /// Create a dataset over `root`.
    ///
    /// Fails only if `map` refers to labels outside `labels`; missing
    /// directories are reported later, during traversal.
    pub fn new(root: impl Into<PathBuf>, map: &LabelMap, labels: &LabelSet) -> Result<Self> {
        map.validate(labels)?;

        let entries = map
            .sorted_by_label()
            .into_iter()
            .filter_map(|entry| {
                let idx = labels.index_of(&entry.label)?;
                Some((entry, idx))
            })
            .collect();

        Ok(Self { root: root.into(), entries })
    }

    /// Dataset root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Number of label directories that will be visited.
    #[must_use]
    pub fn label_count(&self) -> usize {
        self.entries.len()
    }

    /// Iterate over label directories in canonical label order.
    ///
    /// Missing, empty or unreadable directories come through as `Err` items;
    /// none of them ends the iteration.
    pub fn label_dirs(&self) -> LabelDirs<'_> {
        LabelDirs { root: &self.root, entries: self.entries.iter() }
    }

    /// Iterate over every sample, silently passing over skipped directories.
    pub fn samples(&self) -> impl Iterator<Item = ImageSample> + '_ {
        self.label_dirs()
            .filter_map(std::result::Result::ok)
            .flat_map(LabelDir::into_samples)
    }

    /// Summarize every label directory without decoding any image.
    #[must_use]
    pub fn discover(&self) -> DatasetSummary {
        let labels = self
            .entries
            .iter()
            .map(|(entry, _)| {
                let path = self.root.join(&entry.directory);
                let status = match discovery::list_label_dir(&entry.directory, &path) {
                    Ok(files) => LabelStatus::Ready { images: files.len() },
                    Err(crate::Error::DatasetDirectoryMissing { .. }) => LabelStatus::Missing,
                    Err(crate::Error::EmptyLabelDirectory { .. }) => LabelStatus::Empty,
                    Err(e) => LabelStatus::Unreadable { reason: e.to_string() },
                };
                LabelSummary {
                    directory: entry.directory.clone(),
                    label: entry.label.clone(),
                    path,
                    status,
                }
            })
            .collect();

        DatasetSummary { root: self.root.clone(), labels }
    }
}

/// Iterator returned by [`Dataset::label_dirs`].
pub struct LabelDirs<'a> {
    root: &'a Path,
    entries: std::slice::Iter<'a, (LabelEntry, usize)>,
}

impl Iterator for LabelDirs<'_> {
    type Item = Result<LabelDir>;

    fn next(&mut self) -> Option<Self::Item> {
        let (entry, label_index) = self.entries.next()?;
        let path = self.root.join(&entry.directory);

        Some(discovery::list_label_dir(&entry.directory, &path).map(|files| LabelDir {
            directory: entry.directory.clone(),
            label: entry.label.clone(),
            label_index: *label_index,
            path,
            files,
        }))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.entries.size_hint()
    }
}

/// Result of [`Dataset::discover`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetSummary {
    /// Dataset root.
    pub root: PathBuf,
    /// One entry per mapped directory, in canonical label order.
    pub labels: Vec<LabelSummary>,
}

impl DatasetSummary {
    /// Total number of images across ready directories.
    #[must_use]
    pub fn image_count(&self) -> usize {
        self.labels
            .iter()
            .map(|l| match l.status {
                LabelStatus::Ready { images } => images,
                _ => 0,
            })
            .sum()
    }

    /// Number of directories that will be skipped.
    #[must_use]
    pub fn skipped_count(&self) -> usize {
        self.labels
            .iter()
            .filter(|l| !matches!(l.status, LabelStatus::Ready { .. }))
            .count()
    }
}

/// Per-directory discovery result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelSummary {
    /// Directory name.
    pub directory: String,
    /// Canonical label.
    pub label: String,
    /// Directory path.
    pub path: PathBuf,
    /// What was found.
    pub status: LabelStatus,
}

/// State of a label directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LabelStatus {
    /// Directory holds images.
    Ready {
        /// Number of recognized image files.
        images: usize,
    },
    /// Directory does not exist.
    Missing,
    /// Directory holds no recognized images.
    Empty,
    /// Directory could not be listed.
    Unreadable {
        /// Error message.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    use crate::Error;

    fn touch(path: &Path) {
        fs::write(path, b"not really an image").unwrap();
    }

    fn two_label_fixture() -> (tempfile::TempDir, LabelMap, LabelSet) {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("b_dir")).unwrap();
        fs::create_dir(dir.path().join("a_dir")).unwrap();
        touch(&dir.path().join("b_dir/one.PNG"));
        touch(&dir.path().join("a_dir/x.jpg"));
        touch(&dir.path().join("a_dir/notes.txt"));

        let labels = LabelSet::new(["A", "B"]).unwrap();
        let map = LabelMap::new([("b_dir", "B"), ("a_dir", "A")]);
        (dir, map, labels)
    }

    #[test]
    fn test_samples_ordered_by_canonical_label() {
        let (dir, map, labels) = two_label_fixture();
        let dataset = Dataset::new(dir.path(), &map, &labels).unwrap();

        let samples: Vec<ImageSample> = dataset.samples().collect();
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].label, "A");
        assert_eq!(samples[0].label_index, 0);
        assert_eq!(samples[0].file_name(), "x.jpg");
        assert_eq!(samples[1].label, "B");
        assert_eq!(samples[1].file_name(), "one.PNG");
    }

    #[test]
    fn test_traversal_is_restartable() {
        let (dir, map, labels) = two_label_fixture();
        let dataset = Dataset::new(dir.path(), &map, &labels).unwrap();

        let first: Vec<_> = dataset.samples().collect();
        let second: Vec<_> = dataset.samples().collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_missing_directory_is_skipped() {
        let (dir, _, labels) = two_label_fixture();
        let map = LabelMap::new([("a_dir", "A"), ("gone", "B")]);
        let dataset = Dataset::new(dir.path(), &map, &labels).unwrap();

        let dirs: Vec<_> = dataset.label_dirs().collect();
        assert_eq!(dirs.len(), 2);
        assert!(dirs[0].is_ok());
        assert!(matches!(dirs[1], Err(Error::DatasetDirectoryMissing { .. })));
        assert_eq!(dataset.samples().count(), 1);
    }

    #[test]
    fn test_directory_without_images_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("a")).unwrap();
        touch(&dir.path().join("a/readme.md"));

        let labels = LabelSet::new(["A"]).unwrap();
        let dataset = Dataset::new(dir.path(), &LabelMap::new([("a", "A")]), &labels).unwrap();

        let dirs: Vec<_> = dataset.label_dirs().collect();
        assert!(matches!(dirs[0], Err(Error::EmptyLabelDirectory { .. })));
    }

    #[test]
    fn test_empty_root_yields_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let dataset =
            Dataset::new(dir.path(), &LabelMap::fer2013(), &LabelSet::fer2013()).unwrap();

        assert_eq!(dataset.samples().count(), 0);
        assert!(dataset.label_dirs().all(|d| d.is_err()));
    }

    #[test]
    fn test_discover_summary() {
        let (dir, _, labels) = two_label_fixture();
        let map = LabelMap::new([("a_dir", "A"), ("b_dir", "B")]);
        let summary = Dataset::new(dir.path(), &map, &labels).unwrap().discover();

        assert_eq!(summary.image_count(), 2);
        assert_eq!(summary.skipped_count(), 0);
        assert_eq!(summary.labels[0].status, LabelStatus::Ready { images: 1 });
    }

    #[test]
    fn test_unknown_label_rejected_up_front() {
        let labels = LabelSet::new(["A"]).unwrap();
        let map = LabelMap::new([("z", "Z")]);
        assert!(Dataset::new("/nonexistent", &map, &labels).is_err());
    }
}
