//! Parallel task graph execution.

use std::fs;
use std::sync::mpsc::{channel, Sender};
use std::time::{Instant, SystemTime};

use log::{debug, error, info};
use threadpool::ThreadPool;

use crate::action::{Action, TaskContext};
use crate::error::FlowError;
use crate::graph::FlowGraph;
use crate::task::TaskState;

/// Outcome of a single task.
#[derive(Debug)]
pub struct TaskResult {
    pub name: String,
    pub state: TaskState,
    pub error: Option<FlowError>,
}

/// Aggregate counters of a run.
#[derive(Debug, Default)]
pub struct RunStats {
    pub executed: usize,
    pub up_to_date: usize,
    pub failed: usize,
    pub pruned: usize,
    pub results: Vec<TaskResult>,
}

impl RunStats {
    pub fn total(&self) -> usize {
        self.executed + self.up_to_date + self.failed + self.pruned
    }

    pub fn success(&self) -> bool {
        self.failed == 0
    }
}

/// Runs a [`FlowGraph`] on a pool of worker threads.
///
/// Ready tasks are dispatched to the pool; a task whose outputs are all
/// newer than its inputs is completed as up-to-date without running its
/// action. A failed task does not stop the run: its transitive dependents
/// are pruned and the remaining tasks keep executing.
pub struct Executor {
    jobs: usize,
}

impl Executor {
    /// Creates an executor using the specified number of worker threads.
    pub fn new(jobs: usize) -> Self {
        Self { jobs: jobs.max(1) }
    }

    pub fn run(&self, graph: &mut FlowGraph) -> Result<RunStats, FlowError> {
        let start = Instant::now();
        let pool = ThreadPool::new(self.jobs);
        let (tx, rx) = channel();
        let mut stats = RunStats::default();
        let mut running: usize = 0;

        self.dispatch_ready(graph, &pool, &tx, &mut running, &mut stats);
        while !graph.is_finished() {
            if running == 0 {
                return Err(FlowError::Cycle {
                    remaining: graph.unfinished_tasks(),
                });
            }
            let (task_id, result) = rx.recv().unwrap();
            running -= 1;
            self.finish_task(graph, task_id, result, &mut stats);
            self.dispatch_ready(graph, &pool, &tx, &mut running, &mut stats);
        }
        pool.join();

        info!(
            "finished {} tasks in {:.2?}: {} executed, {} up-to-date, {} failed, {} pruned",
            stats.total(),
            start.elapsed(),
            stats.executed,
            stats.up_to_date,
            stats.failed,
            stats.pruned
        );
        Ok(stats)
    }

    fn dispatch_ready(
        &self,
        graph: &mut FlowGraph,
        pool: &ThreadPool,
        tx: &Sender<(usize, Result<(), FlowError>)>,
        running: &mut usize,
        stats: &mut RunStats,
    ) {
        loop {
            let task_id = match graph.get_ready_tasks().iter().next() {
                Some(&task_id) => task_id,
                None => break,
            };
            let ctx = graph.task_context(task_id);
            if let Some(path) = graph.missing_source(task_id) {
                let error = FlowError::MissingInput {
                    task: ctx.name.clone(),
                    path,
                };
                self.fail_task(graph, task_id, error, stats);
                continue;
            }
            if up_to_date(&ctx) {
                debug!("{}: up to date", ctx.name);
                graph.complete_task(task_id, TaskState::UpToDate);
                stats.up_to_date += 1;
                stats.results.push(TaskResult {
                    name: ctx.name,
                    state: TaskState::UpToDate,
                    error: None,
                });
                continue;
            }
            let action = graph.take_action(task_id);
            graph.mark_running(task_id);
            *running += 1;
            let tx = tx.clone();
            pool.execute(move || {
                let result = execute_action(action.as_ref(), &ctx);
                tx.send((task_id, result)).unwrap();
            });
        }
    }

    fn finish_task(
        &self,
        graph: &mut FlowGraph,
        task_id: usize,
        result: Result<(), FlowError>,
        stats: &mut RunStats,
    ) {
        match result {
            Ok(()) => {
                let name = graph.get_task(task_id).name.clone();
                info!("{}: done", name);
                graph.complete_task(task_id, TaskState::Done);
                stats.executed += 1;
                stats.results.push(TaskResult {
                    name,
                    state: TaskState::Done,
                    error: None,
                });
            }
            Err(error) => {
                remove_failed_outputs(&graph.task_context(task_id));
                self.fail_task(graph, task_id, error, stats);
            }
        }
    }

    fn fail_task(&self, graph: &mut FlowGraph, task_id: usize, error: FlowError, stats: &mut RunStats) {
        let name = graph.get_task(task_id).name.clone();
        error!("{}: {}", name, error);
        let pruned = graph.complete_task(task_id, TaskState::Failed);
        stats.failed += 1;
        stats.results.push(TaskResult {
            name,
            state: TaskState::Failed,
            error: Some(error),
        });
        for id in pruned {
            let pruned_name = graph.get_task(id).name.clone();
            debug!("{}: pruned", pruned_name);
            stats.pruned += 1;
            stats.results.push(TaskResult {
                name: pruned_name,
                state: TaskState::Pruned,
                error: None,
            });
        }
    }
}

/// Removes the declared outputs of a failed task. A partially written
/// output would otherwise satisfy the staleness check of the next run.
fn remove_failed_outputs(ctx: &TaskContext) {
    for path in ctx.outputs.iter() {
        if fs::remove_file(path).is_ok() {
            debug!("{}: removed partial output {}", ctx.name, path.display());
        }
    }
}

fn execute_action(action: &dyn Action, ctx: &TaskContext) -> Result<(), FlowError> {
    for path in ctx.outputs.iter() {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(|e| FlowError::io(parent, e))?;
            }
        }
    }
    action.run(ctx)?;
    for path in ctx.outputs.iter() {
        if !path.exists() {
            return Err(FlowError::MissingOutput {
                task: ctx.name.clone(),
                path: path.clone(),
            });
        }
    }
    Ok(())
}

/// A task is up to date when all its outputs exist and none of its inputs is
/// newer than the oldest output. Equal timestamps count as fresh.
fn up_to_date(ctx: &TaskContext) -> bool {
    if ctx.outputs.is_empty() {
        return false;
    }
    let mut oldest_output: Option<SystemTime> = None;
    for path in ctx.outputs.iter() {
        match fs::metadata(path).and_then(|meta| meta.modified()) {
            Ok(modified) => {
                oldest_output = Some(match oldest_output {
                    Some(time) => time.min(modified),
                    None => modified,
                });
            }
            Err(_) => return false,
        }
    }
    let mut newest_input: Option<SystemTime> = None;
    for path in ctx.inputs.iter() {
        match fs::metadata(path).and_then(|meta| meta.modified()) {
            Ok(modified) => {
                newest_input = Some(match newest_input {
                    Some(time) => time.max(modified),
                    None => modified,
                });
            }
            Err(_) => return false,
        }
    }
    match (newest_input, oldest_output) {
        (Some(input), Some(output)) => input <= output,
        (None, Some(_)) => true,
        _ => false,
    }
}

/// Deletes produced artifacts from disk, keeping sources and artifacts
/// marked with [`FlowGraph::keep_on_clean`]. Returns the number of removed
/// files.
pub fn clean(graph: &FlowGraph) -> Result<usize, FlowError> {
    let mut removed = 0;
    for artifact in graph.get_artifacts().iter() {
        if !artifact.is_cleanable() || !artifact.path().exists() {
            continue;
        }
        fs::remove_file(artifact.path()).map_err(|e| FlowError::io(artifact.path(), e))?;
        info!("removed {}", artifact.path().display());
        removed += 1;
    }
    Ok(removed)
}
