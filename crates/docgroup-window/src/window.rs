//! Comparison windows
//!
//! Slices an ordered file list into windows that overlap by exactly one file,
//! so every boundary between adjacent windows is seen from both sides.

use docgroup_artifact::Artifact;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One file inside a window
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowFile {
    /// External file identifier
    #[serde(alias = "file_id")]
    pub file_id: String,

    /// Sequence position (page number) of the file
    #[serde(alias = "page_number", alias = "pageNumber")]
    pub position: u32,
}

impl WindowFile {
    /// Create window file
    #[inline]
    #[must_use]
    pub fn new(file_id: impl Into<String>, position: u32) -> Self {
        Self {
            file_id: file_id.into(),
            position,
        }
    }
}

/// Contiguous slice of the file sequence
///
/// Also the window metadata embedded in window results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Window {
    /// Ordinal of the window
    #[serde(default)]
    pub index: usize,

    /// Index of the first file in the ordered list
    #[serde(alias = "start_index", alias = "start")]
    pub start_index: usize,

    /// Index of the last file in the ordered list (inclusive)
    #[serde(alias = "end_index", alias = "end")]
    pub end_index: usize,

    /// Files in order
    #[serde(default)]
    pub files: Vec<WindowFile>,
}

impl Window {
    /// Number of files
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check if window has no files
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// First file of the window
    #[inline]
    #[must_use]
    pub fn first(&self) -> Option<&WindowFile> {
        self.files.first()
    }

    /// Last file of the window
    #[inline]
    #[must_use]
    pub fn last(&self) -> Option<&WindowFile> {
        self.files.last()
    }
}

/// Builds overlapping comparison windows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowBuilder {
    window_size: usize,
}

impl WindowBuilder {
    /// Smallest usable window
    pub const MIN_WINDOW_SIZE: usize = 2;

    /// Create builder for windows of `window_size` files
    #[inline]
    #[must_use]
    pub fn new(window_size: usize) -> Self {
        Self { window_size }
    }

    /// Configured window size
    #[inline]
    #[must_use]
    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Slice `files` into windows
    ///
    /// # Behavior
    /// - Window size below 2 or no files → no windows
    /// - Windows advance by `window_size - 1`, repeating the previous
    ///   window's last file as their first
    /// - A trailing window holding only that repeated file is never emitted,
    ///   so every window after the first has at least 2 files
    /// - Ascending start order
    #[must_use]
    pub fn build(&self, files: &[WindowFile]) -> Vec<Window> {
        if self.window_size < Self::MIN_WINDOW_SIZE {
            tracing::warn!(
                window_size = self.window_size,
                "window size below minimum, no windows built"
            );
            return Vec::new();
        }
        if files.is_empty() {
            return Vec::new();
        }

        let step = self.window_size - 1;
        let mut windows = Vec::with_capacity(files.len() / step + 1);
        let mut start = 0;

        loop {
            let end = (start + self.window_size).min(files.len());
            windows.push(Window {
                index: windows.len(),
                start_index: start,
                end_index: end - 1,
                files: files[start..end].to_vec(),
            });
            if end >= files.len() {
                break;
            }
            start += step;
        }

        tracing::debug!(
            files = files.len(),
            window_size = self.window_size,
            windows = windows.len(),
            "built comparison windows"
        );
        windows
    }
}

/// Slice `files` into overlapping windows of `window_size`
#[inline]
#[must_use]
pub fn build_windows(files: &[WindowFile], window_size: usize) -> Vec<Window> {
    WindowBuilder::new(window_size).build(files)
}

/// Flatten artifact pages into the ordered file sequence
///
/// Artifacts are taken in position order and their pages in page order; a
/// file attached to several artifacts appears once, at its first occurrence.
#[must_use]
pub fn ordered_files(artifacts: &[Artifact]) -> Vec<WindowFile> {
    let mut sorted: Vec<&Artifact> = artifacts.iter().collect();
    sorted.sort_by_key(|a| a.position());

    let mut seen = HashSet::new();
    let mut files: Vec<WindowFile> = sorted
        .into_iter()
        .flat_map(Artifact::pages)
        .filter(|p| seen.insert(p.file_id.clone()))
        .map(|p| WindowFile::new(p.file_id.clone(), p.page_number))
        .collect();
    files.sort_by_key(|f| f.position);
    files
}
