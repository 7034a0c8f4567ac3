//! Errors produced while building or running a task graph.

use std::fmt::{Display, Formatter};
use std::io;
use std::path::{Path, PathBuf};

/// Error raised by a task action or by the executor.
#[derive(Debug)]
pub enum FlowError {
    /// Filesystem operation failed.
    Io { path: PathBuf, source: io::Error },
    /// A source file required by a task does not exist on disk.
    MissingInput { task: String, path: PathBuf },
    /// A task finished successfully but did not create a declared output.
    MissingOutput { task: String, path: PathBuf },
    /// An external command could not be spawned or exited with failure.
    Command {
        task: String,
        command: String,
        status: Option<i32>,
        detail: String,
    },
    /// A result aggregation step found inconsistent input tables.
    Aggregate { task: String, message: String },
    /// The remaining tasks wait on each other and none can start.
    Cycle { remaining: Vec<String> },
}

impl FlowError {
    /// Wraps an io::Error together with the path it occurred on.
    pub fn io(path: &Path, source: io::Error) -> Self {
        FlowError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

impl Display for FlowError {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        match self {
            FlowError::Io { path, source } => write!(f, "io error on {}: {}", path.display(), source),
            FlowError::MissingInput { task, path } => {
                write!(f, "task {}: missing input file {}", task, path.display())
            }
            FlowError::MissingOutput { task, path } => {
                write!(f, "task {}: declared output {} was not created", task, path.display())
            }
            FlowError::Command {
                task,
                command,
                status,
                detail,
            } => {
                write!(f, "task {}: command `{}` failed", task, command)?;
                match status {
                    Some(code) => write!(f, " with exit code {}", code)?,
                    None => write!(f, " without exit code")?,
                }
                if !detail.is_empty() {
                    write!(f, ": {}", detail)?;
                }
                Ok(())
            }
            FlowError::Aggregate { task, message } => write!(f, "task {}: {}", task, message),
            FlowError::Cycle { remaining } => {
                write!(f, "dependency cycle among tasks: {}", remaining.join(", "))
            }
        }
    }
}

impl std::error::Error for FlowError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FlowError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}
