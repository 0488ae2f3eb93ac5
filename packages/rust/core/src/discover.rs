//! Input discovery: enumerate notebooks under a root's topic subdirectories.

use std::path::Path;

use tracing::{debug, warn};

use deckbuilder_shared::{DeckBuilderError, NotebookDoc, Result};

/// Find every `<root>/<topic>/<name>.<ext>` notebook.
///
/// Only files directly inside immediate subdirectories of `root` match;
/// nothing at the root level and nothing nested deeper. Order is whatever
/// the filesystem yields. A missing root behaves as zero inputs.
pub fn find_notebooks(root: &Path, ext: &str) -> Result<Vec<NotebookDoc>> {
    if !root.is_dir() {
        warn!(root = %root.display(), "notebooks root does not exist, nothing to do");
        return Ok(Vec::new());
    }

    let mut notebooks = Vec::new();

    for entry in std::fs::read_dir(root).map_err(|e| DeckBuilderError::io(root, e))? {
        let entry = entry.map_err(|e| DeckBuilderError::io(root, e))?;
        let topic_dir = entry.path();
        if !topic_dir.is_dir() {
            continue;
        }

        for entry in
            std::fs::read_dir(&topic_dir).map_err(|e| DeckBuilderError::io(&topic_dir, e))?
        {
            let entry = entry.map_err(|e| DeckBuilderError::io(&topic_dir, e))?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let matches = path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e == ext);
            if !matches {
                continue;
            }
            match NotebookDoc::from_path(path) {
                Some(doc) => {
                    debug!(topic = %doc.topic, stem = %doc.stem, "discovered notebook");
                    notebooks.push(doc);
                }
                None => warn!(path = %entry.path().display(), "skipping unnameable file"),
            }
        }
    }

    Ok(notebooks)
}
