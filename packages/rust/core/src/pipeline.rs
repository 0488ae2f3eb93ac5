//! End-to-end `build` pipeline: discover notebooks → convert → collect.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use tracing::{info, instrument, warn};

use deckbuilder_convert::SlideConverter;
use deckbuilder_shared::{
    BatchConfig, ConflictPolicy, DeckBuilderError, NotebookDoc, Result,
};

use crate::discover;

/// Result of the `build_slides` pipeline.
#[derive(Debug)]
pub struct BatchResult {
    /// Number of notebooks converted and collected.
    pub converted: usize,
    /// The shared collection directory.
    pub collection_dir: std::path::PathBuf,
    /// Total elapsed time.
    pub elapsed: std::time::Duration,
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called after a notebook's deck lands in the collection directory.
    fn deck_built(&self, notebook: &str, dest: &str, current: usize, total: usize);
    /// Called when the pipeline completes.
    fn done(&self, result: &BatchResult);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn deck_built(&self, _notebook: &str, _dest: &str, _current: usize, _total: usize) {}
    fn done(&self, _result: &BatchResult) {}
}

/// Ensure `path` exists as a directory, creating parents as needed.
/// Idempotent; fails if the path exists as a non-directory.
pub fn ensure_dir(path: &Path) -> Result<()> {
    std::fs::create_dir_all(path).map_err(|e| DeckBuilderError::io(path, e))
}

/// Run the full `build` pipeline.
///
/// 1. Discover notebooks under the root's topic subdirectories
/// 2. Apply the collection-name conflict policy
/// 3. Ensure the collection directory exists
/// 4. Per notebook: ensure `<topic>/slides/`, convert, copy the artifact
///    into the collection directory (renamed without the `.slides` infix)
///
/// Fail-fast: the first error aborts the batch. Already-produced outputs
/// stay on disk; remaining notebooks are not touched. With `jobs > 1`,
/// conversions run `jobs` at a time but collection-directory copies stay
/// on this task, so the collection directory never has two writers.
#[instrument(skip_all, fields(root = %config.root.display(), jobs = config.jobs))]
pub async fn build_slides(
    config: &BatchConfig,
    converter: Arc<dyn SlideConverter>,
    progress: &dyn ProgressReporter,
) -> Result<BatchResult> {
    let start = Instant::now();

    progress.phase("Discovering notebooks");
    let notebooks = discover::find_notebooks(&config.root, &config.notebook_ext)?;
    info!(count = notebooks.len(), "discovered notebooks");

    check_collisions(&notebooks, config.on_conflict)?;

    ensure_dir(&config.collection_dir)?;

    progress.phase("Converting notebooks");
    let total = notebooks.len();
    let mut converted = 0usize;
    let mut queue = notebooks.into_iter();

    loop {
        let batch: Vec<NotebookDoc> = queue.by_ref().take(config.jobs as usize).collect();
        if batch.is_empty() {
            break;
        }

        let mut handles = Vec::with_capacity(batch.len());
        for doc in &batch {
            ensure_dir(&doc.slides_dir())?;
            let converter = Arc::clone(&converter);
            let doc = doc.clone();
            handles.push(tokio::task::spawn_blocking(move || {
                converter.convert(&doc.path, &doc.slides_dir(), &doc.stem)
            }));
        }

        for (doc, handle) in batch.iter().zip(handles) {
            handle
                .await
                .map_err(|e| DeckBuilderError::converter(format!("conversion task failed: {e}")))??;

            let artifact = doc.artifact_path(&config.slides_ext);
            if !artifact.is_file() {
                return Err(DeckBuilderError::validation(format!(
                    "converter reported success but no artifact exists at {}",
                    artifact.display()
                )));
            }

            let dest = config
                .collection_dir
                .join(doc.collection_name(&config.slides_ext));
            std::fs::copy(&artifact, &dest).map_err(|e| DeckBuilderError::io(&dest, e))?;

            converted += 1;
            info!(
                notebook = %doc.path.display(),
                dest = %dest.display(),
                "deck collected"
            );
            progress.deck_built(
                &doc.path.display().to_string(),
                &dest.display().to_string(),
                converted,
                total,
            );
        }
    }

    let result = BatchResult {
        converted,
        collection_dir: config.collection_dir.clone(),
        elapsed: start.elapsed(),
    };

    progress.done(&result);

    info!(
        converted = result.converted,
        elapsed_ms = result.elapsed.as_millis(),
        "build pipeline complete"
    );

    Ok(result)
}

/// Two topics can hold notebooks with the same stem, which map to one
/// collection filename. Policy `error` refuses the batch up front; the
/// default `overwrite` keeps the historical last-writer-wins behavior
/// (enumeration order is filesystem-dependent) and warns.
fn check_collisions(notebooks: &[NotebookDoc], policy: ConflictPolicy) -> Result<()> {
    let mut by_stem: HashMap<&str, Vec<&str>> = HashMap::new();
    for doc in notebooks {
        by_stem.entry(&doc.stem).or_default().push(&doc.topic);
    }

    let mut duplicates: Vec<String> = by_stem
        .iter()
        .filter(|(_, topics)| topics.len() > 1)
        .map(|(stem, topics)| format!("'{stem}' (topics: {})", topics.join(", ")))
        .collect();

    if duplicates.is_empty() {
        return Ok(());
    }
    duplicates.sort();

    match policy {
        ConflictPolicy::Error => Err(DeckBuilderError::validation(format!(
            "duplicate notebook names would collide in the collection directory: {}",
            duplicates.join("; ")
        ))),
        ConflictPolicy::Overwrite => {
            for dup in &duplicates {
                warn!(%dup, "collection filename collision, later conversion wins");
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn temp_root() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("db-pipeline-test-{}", uuid::Uuid::now_v7()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write_notebook(root: &Path, topic: &str, stem: &str, body: &str) {
        let dir = root.join(topic);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(format!("{stem}.ipynb")), body).unwrap();
    }

    fn make_config(root: &Path) -> BatchConfig {
        BatchConfig {
            root: root.to_path_buf(),
            collection_dir: root.join("slides"),
            notebook_ext: "ipynb".into(),
            slides_ext: "html".into(),
            jobs: 1,
            on_conflict: ConflictPolicy::Overwrite,
        }
    }

    /// Writes `<stem>.slides.html` derived from the notebook body, so
    /// artifacts from different notebooks have distinct contents.
    struct FakeConverter {
        calls: AtomicUsize,
    }

    impl FakeConverter {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl SlideConverter for FakeConverter {
        fn convert(&self, notebook: &Path, output_dir: &Path, output_name: &str) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let body = std::fs::read_to_string(notebook)
                .map_err(|e| DeckBuilderError::io(notebook, e))?;
            let artifact = output_dir.join(format!("{output_name}.slides.html"));
            std::fs::write(&artifact, format!("<html>{body}</html>"))
                .map_err(|e| DeckBuilderError::io(&artifact, e))?;
            Ok(())
        }
    }

    /// Fails every conversion.
    struct FailingConverter;

    impl SlideConverter for FailingConverter {
        fn convert(&self, notebook: &Path, _output_dir: &Path, _output_name: &str) -> Result<()> {
            Err(DeckBuilderError::converter(format!(
                "simulated nbconvert failure for {}",
                notebook.display()
            )))
        }
    }

    /// Succeeds without writing anything.
    struct SilentlyBrokenConverter;

    impl SlideConverter for SilentlyBrokenConverter {
        fn convert(&self, _: &Path, _: &Path, _: &str) -> Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn batch_produces_artifact_and_collection_copy() {
        let root = temp_root();
        write_notebook(&root, "calculus", "limits", "lim x->0");
        write_notebook(&root, "algebra", "vectors", "v + w");

        let config = make_config(&root);
        let result = build_slides(&config, Arc::new(FakeConverter::new()), &SilentProgress)
            .await
            .unwrap();

        assert_eq!(result.converted, 2);

        let artifact = root.join("calculus/slides/limits.slides.html");
        let copy = root.join("slides/limits.html");
        assert!(artifact.is_file());
        assert!(copy.is_file());
        assert_eq!(
            std::fs::read(&artifact).unwrap(),
            std::fs::read(&copy).unwrap()
        );
        assert!(root.join("algebra/slides/vectors.slides.html").is_file());
        assert!(root.join("slides/vectors.html").is_file());

        std::fs::remove_dir_all(&root).ok();
    }

    #[tokio::test]
    async fn zero_inputs_still_creates_collection_dir() {
        let root = temp_root();
        let config = make_config(&root);

        let result = build_slides(&config, Arc::new(FakeConverter::new()), &SilentProgress)
            .await
            .unwrap();

        assert_eq!(result.converted, 0);
        assert!(config.collection_dir.is_dir());

        std::fs::remove_dir_all(&root).ok();
    }

    #[tokio::test]
    async fn converter_failure_aborts_without_collection_copy() {
        let root = temp_root();
        write_notebook(&root, "calculus", "limits", "lim x->0");

        let config = make_config(&root);
        let err = build_slides(&config, Arc::new(FailingConverter), &SilentProgress)
            .await
            .unwrap_err();

        assert!(matches!(err, DeckBuilderError::Converter(_)));
        assert!(!root.join("slides/limits.html").exists());

        std::fs::remove_dir_all(&root).ok();
    }

    #[tokio::test]
    async fn missing_artifact_is_validation_error() {
        let root = temp_root();
        write_notebook(&root, "calculus", "limits", "lim x->0");

        let config = make_config(&root);
        let err = build_slides(&config, Arc::new(SilentlyBrokenConverter), &SilentProgress)
            .await
            .unwrap_err();

        assert!(matches!(err, DeckBuilderError::Validation { .. }));
        assert!(err.to_string().contains("no artifact exists"));

        std::fs::remove_dir_all(&root).ok();
    }

    #[tokio::test]
    async fn conflict_policy_error_refuses_batch_before_converting() {
        let root = temp_root();
        write_notebook(&root, "calculus", "intro", "a");
        write_notebook(&root, "algebra", "intro", "b");

        let mut config = make_config(&root);
        config.on_conflict = ConflictPolicy::Error;

        let converter = Arc::new(FakeConverter::new());
        let err = build_slides(&config, converter.clone(), &SilentProgress)
            .await
            .unwrap_err();

        assert!(matches!(err, DeckBuilderError::Validation { .. }));
        assert!(err.to_string().contains("'intro'"));
        assert_eq!(converter.calls.load(Ordering::SeqCst), 0);

        std::fs::remove_dir_all(&root).ok();
    }

    #[tokio::test]
    async fn conflict_policy_overwrite_keeps_one_collection_entry() {
        let root = temp_root();
        write_notebook(&root, "calculus", "intro", "a");
        write_notebook(&root, "algebra", "intro", "b");

        let config = make_config(&root);
        let result = build_slides(&config, Arc::new(FakeConverter::new()), &SilentProgress)
            .await
            .unwrap();

        assert_eq!(result.converted, 2);
        assert!(root.join("calculus/slides/intro.slides.html").is_file());
        assert!(root.join("algebra/slides/intro.slides.html").is_file());

        let entries: Vec<_> = std::fs::read_dir(root.join("slides"))
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec![std::ffi::OsString::from("intro.html")]);

        std::fs::remove_dir_all(&root).ok();
    }

    #[tokio::test]
    async fn rerun_is_idempotent() {
        let root = temp_root();
        write_notebook(&root, "calculus", "limits", "lim x->0");

        let config = make_config(&root);
        build_slides(&config, Arc::new(FakeConverter::new()), &SilentProgress)
            .await
            .unwrap();
        let first = std::fs::read(root.join("slides/limits.html")).unwrap();

        build_slides(&config, Arc::new(FakeConverter::new()), &SilentProgress)
            .await
            .unwrap();
        let second = std::fs::read(root.join("slides/limits.html")).unwrap();

        assert_eq!(first, second);
        let entries = std::fs::read_dir(root.join("slides")).unwrap().count();
        assert_eq!(entries, 1);

        std::fs::remove_dir_all(&root).ok();
    }

    #[tokio::test]
    async fn new_topic_is_additive() {
        let root = temp_root();
        write_notebook(&root, "calculus", "limits", "lim x->0");

        let config = make_config(&root);
        build_slides(&config, Arc::new(FakeConverter::new()), &SilentProgress)
            .await
            .unwrap();
        let before = std::fs::read(root.join("slides/limits.html")).unwrap();

        write_notebook(&root, "stats", "bayes", "p(a|b)");
        let result = build_slides(&config, Arc::new(FakeConverter::new()), &SilentProgress)
            .await
            .unwrap();

        assert_eq!(result.converted, 2);
        assert!(root.join("slides/bayes.html").is_file());
        let after = std::fs::read(root.join("slides/limits.html")).unwrap();
        assert_eq!(before, after);

        std::fs::remove_dir_all(&root).ok();
    }

    #[tokio::test]
    async fn parallel_jobs_convert_everything() {
        let root = temp_root();
        for (topic, stem) in [
            ("calculus", "limits"),
            ("calculus", "series"),
            ("algebra", "vectors"),
            ("algebra", "matrices"),
            ("stats", "bayes"),
        ] {
            write_notebook(&root, topic, stem, stem);
        }

        let mut config = make_config(&root);
        config.jobs = 4;

        let result = build_slides(&config, Arc::new(FakeConverter::new()), &SilentProgress)
            .await
            .unwrap();

        assert_eq!(result.converted, 5);
        let entries = std::fs::read_dir(root.join("slides")).unwrap().count();
        assert_eq!(entries, 5);

        std::fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn ensure_dir_is_idempotent() {
        let root = temp_root();
        let dir = root.join("a/b/c");
        ensure_dir(&dir).unwrap();
        ensure_dir(&dir).unwrap();
        assert!(dir.is_dir());
        std::fs::remove_dir_all(&root).ok();
    }

    #[test]
    fn ensure_dir_fails_on_file_collision() {
        let root = temp_root();
        let file = root.join("occupied");
        std::fs::write(&file, b"x").unwrap();
        let err = ensure_dir(&file).unwrap_err();
        assert!(matches!(err, DeckBuilderError::Io { .. }));
        std::fs::remove_dir_all(&root).ok();
    }
}
