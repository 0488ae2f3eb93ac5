//! External converter integration.
//!
//! The only thing DeckBuilder knows about slide rendering is how to invoke
//! `jupyter nbconvert` and read its exit status. [`SlideConverter`] is the
//! narrow seam: input path, output directory, output base name, success or
//! failure. Tests substitute a mock so no real process is spawned.

use std::path::Path;
use std::process::Command;

use tracing::{debug, info};

use deckbuilder_shared::{DeckBuilderError, Result};

/// A converter that turns one notebook into a slide-deck artifact.
///
/// Implementations block until the conversion finishes. Success means the
/// artifact was written to `output_dir` under `output_name` (plus whatever
/// extension the converter appends); any failure is fatal for the batch.
pub trait SlideConverter: Send + Sync {
    /// Convert `notebook` into slides named `output_name` inside `output_dir`.
    fn convert(&self, notebook: &Path, output_dir: &Path, output_name: &str) -> Result<()>;
}

// ---------------------------------------------------------------------------
// NbConvert
// ---------------------------------------------------------------------------

/// [`SlideConverter`] backed by `<command> nbconvert` as a subprocess.
#[derive(Debug, Clone)]
pub struct NbConvert {
    command: String,
    format: String,
}

impl NbConvert {
    /// Create an invoker for the given executable and output format
    /// (typically `"jupyter"` and `"slides"`).
    pub fn new(command: impl Into<String>, format: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            format: format.into(),
        }
    }

    /// Argument vector for one conversion, without the leading executable.
    ///
    /// `--output` takes the bare base name; `--output-dir` carries the path,
    /// matching nbconvert's CLI contract.
    fn build_args(&self, notebook: &Path, output_dir: &Path, output_name: &str) -> Vec<String> {
        vec![
            "nbconvert".into(),
            "--to".into(),
            self.format.clone(),
            "--output".into(),
            output_name.into(),
            "--output-dir".into(),
            output_dir.to_string_lossy().into_owned(),
            notebook.to_string_lossy().into_owned(),
        ]
    }
}

impl SlideConverter for NbConvert {
    fn convert(&self, notebook: &Path, output_dir: &Path, output_name: &str) -> Result<()> {
        let args = self.build_args(notebook, output_dir, output_name);
        debug!(command = %self.command, ?args, "invoking converter");

        // Stdio inherited so nbconvert's own diagnostics reach the console.
        let status = Command::new(&self.command)
            .args(&args)
            .status()
            .map_err(|e| {
                DeckBuilderError::converter(format!(
                    "failed to run '{}' for {}: {e}",
                    self.command,
                    notebook.display()
                ))
            })?;

        if !status.success() {
            return Err(DeckBuilderError::converter(format!(
                "'{} nbconvert' exited with status {} for {}",
                self.command,
                status.code().unwrap_or(-1),
                notebook.display()
            )));
        }

        info!(notebook = %notebook.display(), output_name, "conversion complete");
        Ok(())
    }
}
