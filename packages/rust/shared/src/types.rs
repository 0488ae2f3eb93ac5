//! Core domain types for DeckBuilder batches.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{DeckBuilderError, Result};

/// Fixed name of the per-topic output subdirectory.
pub const SLIDES_SUBDIR: &str = "slides";

/// Infix the external converter inserts into artifact filenames
/// (`<stem>.slides.html` for the "slides" output format).
pub const ARTIFACT_INFIX: &str = "slides";

// ---------------------------------------------------------------------------
// NotebookDoc
// ---------------------------------------------------------------------------

/// A discovered input notebook: `<root>/<topic>/<stem>.<ext>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotebookDoc {
    /// Full path to the notebook file.
    pub path: PathBuf,
    /// Name of the topic subdirectory containing the notebook.
    pub topic: String,
    /// File name without extension; used to derive all output names.
    pub stem: String,
}

impl NotebookDoc {
    /// Construct from a notebook path. Returns `None` if the path has no
    /// file stem or no parent directory name.
    pub fn from_path(path: PathBuf) -> Option<Self> {
        let stem = path.file_stem()?.to_str()?.to_string();
        let topic = path.parent()?.file_name()?.to_str()?.to_string();
        Some(Self { path, topic, stem })
    }

    /// The per-topic output directory: `<topic>/slides/`.
    pub fn slides_dir(&self) -> PathBuf {
        // from_path guarantees a parent exists
        self.path.parent().unwrap_or(Path::new("")).join(SLIDES_SUBDIR)
    }

    /// Artifact filename the converter produces: `<stem>.slides.<ext>`.
    pub fn artifact_name(&self, slides_ext: &str) -> String {
        format!("{}.{ARTIFACT_INFIX}.{slides_ext}", self.stem)
    }

    /// Expected artifact path inside the per-topic output directory.
    pub fn artifact_path(&self, slides_ext: &str) -> PathBuf {
        self.slides_dir().join(self.artifact_name(slides_ext))
    }

    /// Filename used for the shared-collection copy: `<stem>.<ext>`.
    pub fn collection_name(&self, slides_ext: &str) -> String {
        format!("{}.{slides_ext}", self.stem)
    }
}

// ---------------------------------------------------------------------------
// ConflictPolicy
// ---------------------------------------------------------------------------

/// What to do when two topics contain notebooks with the same stem, which
/// would map to the same filename in the shared collection directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConflictPolicy {
    /// Later-processed notebook wins (order is filesystem-dependent).
    /// This reproduces the historical behavior and is a known hazard.
    #[default]
    Overwrite,
    /// Refuse the batch before converting anything.
    Error,
}

impl std::fmt::Display for ConflictPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Overwrite => write!(f, "overwrite"),
            Self::Error => write!(f, "error"),
        }
    }
}

impl std::str::FromStr for ConflictPolicy {
    type Err = DeckBuilderError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "overwrite" => Ok(Self::Overwrite),
            "error" => Ok(Self::Error),
            other => Err(DeckBuilderError::config(format!(
                "invalid conflict policy '{other}': expected 'overwrite' or 'error'"
            ))),
        }
    }
}
