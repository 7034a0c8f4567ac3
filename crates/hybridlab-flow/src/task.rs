//! Graph task.

use crate::action::Action;

/// Represents a task state.
#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub enum TaskState {
    /// Waiting for its inputs.
    Pending,
    /// All inputs are ready, the task can be dispatched.
    Ready,
    /// The action is being executed.
    Running,
    /// All outputs are fresh, the action was skipped.
    UpToDate,
    /// The action completed successfully.
    Done,
    /// The action failed.
    Failed,
    /// An upstream task failed, the action will never run.
    Pruned,
}

impl TaskState {
    /// Whether the task will not change state anymore.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TaskState::UpToDate | TaskState::Done | TaskState::Failed | TaskState::Pruned
        )
    }
}

/// Represents a task of the build graph.
///
/// Described by an action and the input and output artifacts connecting it to
/// other tasks. The action is taken out of the task when it is dispatched to
/// a worker.
pub struct Task {
    pub name: String,
    pub(crate) action: Option<Box<dyn Action>>,
    pub state: TaskState,
    pub inputs: Vec<usize>,
    pub outputs: Vec<usize>,
    pub(crate) ready_inputs: usize,
}

impl Task {
    /// Creates new task.
    pub(crate) fn new(name: &str, action: Box<dyn Action>) -> Self {
        Self {
            name: name.to_string(),
            action: Some(action),
            state: TaskState::Ready,
            inputs: Vec::new(),
            outputs: Vec::new(),
            ready_inputs: 0,
        }
    }

    /// Adds task input.
    pub(crate) fn add_input(&mut self, artifact_id: usize) {
        self.inputs.push(artifact_id);
    }

    /// Adds task output.
    pub(crate) fn add_output(&mut self, artifact_id: usize) {
        self.outputs.push(artifact_id);
    }
}
