//! External command action.

use std::fs::File;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use log::info;

use crate::action::{Action, TaskContext};
use crate::error::FlowError;

/// Runs an external program with fixed arguments.
///
/// When a log path is set, stdout and stderr are redirected into that file,
/// so the pipeline can declare the log as a task output. Otherwise both
/// streams are captured in memory and the stderr tail is attached to the
/// error on failure.
pub struct CommandAction {
    program: String,
    args: Vec<String>,
    current_dir: Option<PathBuf>,
    log: Option<PathBuf>,
}

impl CommandAction {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            current_dir: None,
            log: None,
        }
    }

    /// Builds an action from a full argument vector, e.g. `["python3", "hybrid.py"]`.
    pub fn from_argv(argv: &[String]) -> Self {
        if argv.is_empty() {
            panic!("Error: empty command line");
        }
        let mut action = CommandAction::new(&argv[0]);
        action.args.extend(argv[1..].iter().cloned());
        action
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.args.extend(args.into_iter().map(|arg| arg.into()));
        self
    }

    /// Sets the working directory of the command.
    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    /// Redirects stdout and stderr of the command into the given file.
    pub fn log_to(mut self, path: impl Into<PathBuf>) -> Self {
        self.log = Some(path.into());
        self
    }

    /// The command line as a single string, as it appears in logs and errors.
    pub fn rendered(&self) -> String {
        let mut rendered = self.program.clone();
        for arg in self.args.iter() {
            rendered.push(' ');
            rendered.push_str(arg);
        }
        rendered
    }

    fn command_error(&self, ctx: &TaskContext, status: Option<i32>, detail: String) -> FlowError {
        FlowError::Command {
            task: ctx.name.clone(),
            command: self.rendered(),
            status,
            detail,
        }
    }
}

impl Action for CommandAction {
    fn run(&self, ctx: &TaskContext) -> Result<(), FlowError> {
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        if let Some(dir) = &self.current_dir {
            command.current_dir(dir);
        }
        info!("{}: running `{}`", ctx.name, self.rendered());
        match &self.log {
            Some(log_path) => {
                let log_file = File::create(log_path).map_err(|e| FlowError::io(log_path, e))?;
                let stderr_file = log_file.try_clone().map_err(|e| FlowError::io(log_path, e))?;
                command.stdout(Stdio::from(log_file)).stderr(Stdio::from(stderr_file));
                let status = command
                    .status()
                    .map_err(|e| self.command_error(ctx, None, e.to_string()))?;
                if !status.success() {
                    return Err(self.command_error(
                        ctx,
                        status.code(),
                        format!("see {}", log_path.display()),
                    ));
                }
            }
            None => {
                let output = command
                    .output()
                    .map_err(|e| self.command_error(ctx, None, e.to_string()))?;
                if !output.status.success() {
                    let stderr = String::from_utf8_lossy(&output.stderr);
                    return Err(self.command_error(ctx, output.status.code(), stderr.trim_end().to_string()));
                }
            }
        }
        Ok(())
    }
}
