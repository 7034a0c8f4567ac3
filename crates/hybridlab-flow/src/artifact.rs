//! File artifact.

use std::path::{Path, PathBuf};

/// Represents an artifact state.
#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub enum ArtifactState {
    /// Not ready, the task producing the artifact is not completed.
    Pending,
    /// The artifact is on disk and ready to be consumed by the dependent tasks.
    Ready,
}

/// Represents a file produced or consumed by tasks.
///
/// Artifacts are produced by tasks or defined as graph sources that are
/// expected to exist on disk before the run.
#[derive(Debug)]
pub struct Artifact {
    pub(crate) path: PathBuf,
    pub(crate) producer: Option<usize>,
    pub(crate) consumers: Vec<usize>,
    pub(crate) state: ArtifactState,
    pub(crate) keep_on_clean: bool,
}

impl Artifact {
    /// Creates new source artifact.
    pub(crate) fn source(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            producer: None,
            consumers: Vec::new(),
            state: ArtifactState::Ready,
            keep_on_clean: false,
        }
    }

    /// Adds a [task](crate::task::Task) that consumes the artifact.
    pub(crate) fn add_consumer(&mut self, consumer: usize) {
        self.consumers.push(consumer);
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the artifact is a graph source rather than a task output.
    pub fn is_source(&self) -> bool {
        self.producer.is_none()
    }

    /// Whether `clean` is allowed to delete the artifact.
    pub fn is_cleanable(&self) -> bool {
        self.producer.is_some() && !self.keep_on_clean
    }
}
