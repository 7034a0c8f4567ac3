//! Build graph connecting tasks through file artifacts.

use std::collections::{BTreeSet, HashMap};
use std::path::{Component, Path, PathBuf};

use crate::action::{Action, TaskContext};
use crate::artifact::{Artifact, ArtifactState};
use crate::task::{Task, TaskState};

/// Declarative build graph.
///
/// Tasks declare the file paths they read and write, and the graph derives
/// the dependency edges: an edge goes from the producer of a path to every
/// task that consumes it. A path never declared as an output is a source and
/// must exist on disk before the run.
pub struct FlowGraph {
    tasks: Vec<Task>,
    artifacts: Vec<Artifact>,
    artifact_ids: HashMap<PathBuf, usize>,
    ready_tasks: BTreeSet<usize>,
    completed_task_count: usize,
}

impl FlowGraph {
    pub fn new() -> Self {
        Self {
            tasks: Vec::new(),
            artifacts: Vec::new(),
            artifact_ids: HashMap::new(),
            ready_tasks: BTreeSet::new(),
            completed_task_count: 0,
        }
    }

    pub fn add_task(&mut self, name: &str, action: Box<dyn Action>) -> usize {
        let task = Task::new(name, action);
        let task_id = self.tasks.len();
        self.tasks.push(task);
        self.ready_tasks.insert(task_id);
        task_id
    }

    pub fn get_task(&self, task_id: usize) -> &Task {
        self.tasks.get(task_id).unwrap()
    }

    pub fn get_tasks(&self) -> &Vec<Task> {
        &self.tasks
    }

    pub fn get_artifact(&self, artifact_id: usize) -> &Artifact {
        self.artifacts.get(artifact_id).unwrap()
    }

    pub fn get_artifacts(&self) -> &Vec<Artifact> {
        &self.artifacts
    }

    pub fn get_ready_tasks(&self) -> &BTreeSet<usize> {
        &self.ready_tasks
    }

    pub fn find_task(&self, name: &str) -> Option<usize> {
        self.tasks.iter().position(|task| task.name == name)
    }

    /// Returns the artifact registered for the path, interning it as a source
    /// if it was not seen before.
    fn artifact_id(&mut self, path: &Path) -> usize {
        let path = normalize(path);
        if let Some(&artifact_id) = self.artifact_ids.get(&path) {
            return artifact_id;
        }
        let artifact_id = self.artifacts.len();
        self.artifacts.push(Artifact::source(&path));
        self.artifact_ids.insert(path, artifact_id);
        artifact_id
    }

    pub fn add_task_input(&mut self, task_id: usize, path: impl AsRef<Path>) {
        let artifact_id = self.artifact_id(path.as_ref());
        let artifact = self.artifacts.get_mut(artifact_id).unwrap();
        artifact.add_consumer(task_id);
        let consumer = self.tasks.get_mut(task_id).unwrap();
        consumer.add_input(artifact_id);
        if artifact.state == ArtifactState::Pending && consumer.state == TaskState::Ready {
            consumer.state = TaskState::Pending;
            self.ready_tasks.remove(&task_id);
        } else if artifact.state == ArtifactState::Ready {
            consumer.ready_inputs += 1;
        }
    }

    pub fn add_task_output(&mut self, task_id: usize, path: impl AsRef<Path>) {
        let path = path.as_ref();
        let artifact_id = self.artifact_id(path);
        let artifact = self.artifacts.get_mut(artifact_id).unwrap();
        if let Some(producer) = artifact.producer {
            panic!(
                "Error: artifact {} is declared as output of both {} and {}",
                path.display(),
                self.tasks[producer].name,
                self.tasks[task_id].name
            );
        }
        artifact.producer = Some(task_id);
        artifact.state = ArtifactState::Pending;
        // consumers added before this declaration saw the path as a ready source
        for consumer_id in artifact.consumers.clone() {
            let consumer = self.tasks.get_mut(consumer_id).unwrap();
            consumer.ready_inputs -= 1;
            if consumer.state == TaskState::Ready {
                consumer.state = TaskState::Pending;
                self.ready_tasks.remove(&consumer_id);
            }
        }
        self.tasks.get_mut(task_id).unwrap().add_output(artifact_id);
    }

    /// Marks all outputs of the task as survivors of `clean`.
    pub fn keep_on_clean(&mut self, task_id: usize) {
        for artifact_id in self.tasks[task_id].outputs.clone() {
            self.artifacts.get_mut(artifact_id).unwrap().keep_on_clean = true;
        }
    }

    /// Moves a task into a terminal state and propagates the effects:
    /// successful completion marks the outputs ready, failure prunes the
    /// transitive dependents. Returns the ids of the pruned tasks.
    pub fn complete_task(&mut self, task_id: usize, state: TaskState) -> Vec<usize> {
        if !matches!(state, TaskState::Done | TaskState::UpToDate | TaskState::Failed) {
            panic!(
                "Error: task {} cannot be completed with state {:?}",
                self.tasks[task_id].name, state
            );
        }
        let task = self.tasks.get_mut(task_id).unwrap();
        task.state = state;
        self.ready_tasks.remove(&task_id);
        self.completed_task_count += 1;
        match state {
            TaskState::Failed => self.prune_dependents(task_id),
            _ => {
                for artifact_id in self.tasks[task_id].outputs.clone() {
                    self.mark_artifact_ready(artifact_id);
                }
                Vec::new()
            }
        }
    }

    fn mark_artifact_ready(&mut self, artifact_id: usize) {
        let artifact = self.artifacts.get_mut(artifact_id).unwrap();
        artifact.state = ArtifactState::Ready;
        for t in artifact.consumers.iter() {
            let consumer = self.tasks.get_mut(*t).unwrap();
            consumer.ready_inputs += 1;
            if consumer.ready_inputs == consumer.inputs.len() && consumer.state == TaskState::Pending {
                consumer.state = TaskState::Ready;
                self.ready_tasks.insert(*t);
            }
        }
    }

    fn prune_dependents(&mut self, task_id: usize) -> Vec<usize> {
        let mut pruned = Vec::new();
        let mut queue = vec![task_id];
        while let Some(id) = queue.pop() {
            for artifact_id in self.tasks[id].outputs.clone() {
                for consumer_id in self.artifacts[artifact_id].consumers.clone() {
                    let consumer = self.tasks.get_mut(consumer_id).unwrap();
                    if consumer.state.is_terminal() {
                        continue;
                    }
                    consumer.state = TaskState::Pruned;
                    self.ready_tasks.remove(&consumer_id);
                    self.completed_task_count += 1;
                    pruned.push(consumer_id);
                    queue.push(consumer_id);
                }
            }
        }
        pruned
    }

    pub(crate) fn mark_running(&mut self, task_id: usize) {
        let task = self.tasks.get_mut(task_id).unwrap();
        if task.state != TaskState::Ready {
            panic!("Error: task {} is dispatched in state {:?}", task.name, task.state);
        }
        task.state = TaskState::Running;
        self.ready_tasks.remove(&task_id);
    }

    pub(crate) fn take_action(&mut self, task_id: usize) -> Box<dyn Action> {
        let task = self.tasks.get_mut(task_id).unwrap();
        match task.action.take() {
            Some(action) => action,
            None => panic!("Error: action of task {} is already taken", task.name),
        }
    }

    pub(crate) fn task_context(&self, task_id: usize) -> TaskContext {
        let task = &self.tasks[task_id];
        TaskContext {
            name: task.name.clone(),
            inputs: task.inputs.iter().map(|&id| self.artifacts[id].path.clone()).collect(),
            outputs: task.outputs.iter().map(|&id| self.artifacts[id].path.clone()).collect(),
        }
    }

    /// Returns the path of the first source input that is absent from disk.
    pub(crate) fn missing_source(&self, task_id: usize) -> Option<PathBuf> {
        self.tasks[task_id]
            .inputs
            .iter()
            .map(|&id| &self.artifacts[id])
            .find(|artifact| artifact.is_source() && !artifact.path.exists())
            .map(|artifact| artifact.path.clone())
    }

    pub fn is_finished(&self) -> bool {
        self.tasks.len() == self.completed_task_count
    }

    /// Names of tasks that have not reached a terminal state.
    pub fn unfinished_tasks(&self) -> Vec<String> {
        self.tasks
            .iter()
            .filter(|task| !task.state.is_terminal())
            .map(|task| task.name.clone())
            .collect()
    }
}

impl Default for FlowGraph {
    fn default() -> Self {
        Self::new()
    }
}

/// Interning key of a path. `.` components are dropped, so `./x` and `x`
/// name the same artifact.
fn normalize(path: &Path) -> PathBuf {
    path.components()
        .filter(|component| !matches!(component, Component::CurDir))
        .collect()
}
