//! Session-scoped artifact store with optional persistence.
//!
//! Stages hand results to each other through this store rather than through
//! ad-hoc file reads scattered across the pipeline: the in-memory map is the
//! source of truth, and the working-directory files (`article.txt`,
//! `trigger_phrases.txt`, `explanation.txt`) are a serialisation of it kept
//! for the viewer and for later sessions. That keeps pipeline correctness
//! independent of filesystem timing while preserving the on-disk layout
//! downstream tools expect.
//!
//! `article.txt` and `trigger_phrases.txt` are written atomically (temp file
//! + rename). `explanation.txt` is overwritten in place: it is rewritten on
//! every highlight run and a torn write loses at most the summary of one
//! category pass.

use crate::error::BiasScopeError;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// The named intermediate results later stages (and the viewer) consume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    /// Full plain text extracted from the source PDF.
    ArticleText,
    /// HTML block naming three trigger phrases with paragraph numbers.
    TriggerPhrases,
    /// HTML explanation fragment from the most recent highlight run
    /// (last-writer-wins across categories).
    Explanation,
}

impl ArtifactKind {
    /// Well-known file name inside the working directory.
    pub fn file_name(&self) -> &'static str {
        match self {
            ArtifactKind::ArticleText => "article.txt",
            ArtifactKind::TriggerPhrases => "trigger_phrases.txt",
            ArtifactKind::Explanation => "explanation.txt",
        }
    }

    fn atomic_write(&self) -> bool {
        !matches!(self, ArtifactKind::Explanation)
    }
}

/// In-memory artifact map, mirrored to a working directory when one is set.
#[derive(Debug, Default)]
pub struct ArtifactStore {
    entries: HashMap<ArtifactKind, String>,
    root: Option<PathBuf>,
}

impl ArtifactStore {
    /// A store that lives purely in memory (used by tests and embedders that
    /// do not want files written).
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// A store mirrored to `root`; every [`put`](Self::put) also writes the
    /// artifact's well-known file there.
    pub fn persistent(root: impl Into<PathBuf>) -> Self {
        Self {
            entries: HashMap::new(),
            root: Some(root.into()),
        }
    }

    /// Look up an artifact, falling back to the persisted file if this
    /// session has not produced it yet. A trigger list written by an earlier
    /// session stays usable for the annotated-highlight stage.
    pub fn get(&mut self, kind: ArtifactKind) -> Option<&str> {
        if !self.entries.contains_key(&kind) {
            if let Some(content) = self.read_persisted(kind) {
                self.entries.insert(kind, content);
            }
        }
        self.entries.get(&kind).map(String::as_str)
    }

    /// Store an artifact and mirror it to disk when a root is configured.
    pub fn put(&mut self, kind: ArtifactKind, content: String) -> Result<(), BiasScopeError> {
        if let Some(root) = self.root.clone() {
            self.write_file(&root, kind, &content)?;
        }
        self.entries.insert(kind, content);
        Ok(())
    }

    /// Whether the store holds (in memory or on disk) the given artifact.
    pub fn contains(&mut self, kind: ArtifactKind) -> bool {
        self.get(kind).is_some()
    }

    /// The directory artifacts are mirrored to, if any.
    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    fn read_persisted(&self, kind: ArtifactKind) -> Option<String> {
        let root = self.root.as_deref()?;
        let path = root.join(kind.file_name());
        match std::fs::read_to_string(&path) {
            Ok(content) => {
                debug!("Loaded persisted artifact {}", path.display());
                Some(content)
            }
            Err(_) => None,
        }
    }

    fn write_file(
        &self,
        root: &Path,
        kind: ArtifactKind,
        content: &str,
    ) -> Result<(), BiasScopeError> {
        std::fs::create_dir_all(root).map_err(|e| BiasScopeError::ArtifactWriteFailed {
            path: root.to_path_buf(),
            source: e,
        })?;

        let path = root.join(kind.file_name());
        if kind.atomic_write() {
            let tmp = path.with_extension("txt.tmp");
            std::fs::write(&tmp, content).map_err(|e| BiasScopeError::ArtifactWriteFailed {
                path: path.clone(),
                source: e,
            })?;
            std::fs::rename(&tmp, &path).map_err(|e| BiasScopeError::ArtifactWriteFailed {
                path: path.clone(),
                source: e,
            })?;
        } else {
            std::fs::write(&path, content).map_err(|e| BiasScopeError::ArtifactWriteFailed {
                path: path.clone(),
                source: e,
            })?;
        }
        debug!("Persisted artifact {} ({} bytes)", path.display(), content.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_memory_put_get() {
        let mut store = ArtifactStore::in_memory();
        assert!(store.get(ArtifactKind::ArticleText).is_none());
        store
            .put(ArtifactKind::ArticleText, "the article".into())
            .unwrap();
        assert_eq!(store.get(ArtifactKind::ArticleText), Some("the article"));
    }

    #[test]
    fn persistent_store_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut store = ArtifactStore::persistent(dir.path());
            store
                .put(ArtifactKind::TriggerPhrases, "<p>phrase</p>".into())
                .unwrap();
        }
        // A fresh store picks the artifact up from the file.
        let mut store = ArtifactStore::persistent(dir.path());
        assert_eq!(
            store.get(ArtifactKind::TriggerPhrases),
            Some("<p>phrase</p>")
        );
        assert!(dir.path().join("trigger_phrases.txt").exists());
    }

    #[test]
    fn explanation_overwrite_is_last_writer_wins() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = ArtifactStore::persistent(dir.path());
        store
            .put(ArtifactKind::Explanation, "narrative pass".into())
            .unwrap();
        store
            .put(ArtifactKind::Explanation, "slant pass".into())
            .unwrap();
        let on_disk = std::fs::read_to_string(dir.path().join("explanation.txt")).unwrap();
        assert_eq!(on_disk, "slant pass");
    }

    #[test]
    fn atomic_write_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = ArtifactStore::persistent(dir.path());
        store
            .put(ArtifactKind::ArticleText, "text".into())
            .unwrap();
        let leftovers: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .collect();
        assert!(leftovers.is_empty());
    }
}
