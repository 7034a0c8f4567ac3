//! Task actions.

use std::path::PathBuf;

use crate::error::FlowError;

/// Task name and declared input/output paths passed to the action.
pub struct TaskContext {
    pub name: String,
    pub inputs: Vec<PathBuf>,
    pub outputs: Vec<PathBuf>,
}

/// A unit of work attached to a task.
///
/// Actions are moved into worker threads and executed at most once per run.
pub trait Action: Send {
    fn run(&self, ctx: &TaskContext) -> Result<(), FlowError>;
}
