//! The `pipeline` module holds the steps of a preview run (build, bind,
//! optimize, serve) and the orchestrator that runs them one after another,
//! stopping at the first step whose command exits unsuccessfully.

pub mod bindgen;
pub mod cargo_build;
pub mod static_server;
pub mod wasm_opt;

use serde::Serialize;
use std::fmt;

use crate::app_config::Settings;
use crate::utils::command_runner;
use crate::Error;
use bindgen::BindgenStep;
use cargo_build::CargoBuildStep;
use static_server::StaticServerStep;
use wasm_opt::WasmOptStep;

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StepKind {
    Build,
    Bind,
    Optimize,
    Serve,
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StepKind::Build => "build",
            StepKind::Bind => "bind",
            StepKind::Optimize => "optimize",
            StepKind::Serve => "serve",
        };
        f.write_str(name)
    }
}

/// A single external command.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub step: StepKind,
    pub program: String,
    pub args: Vec<String>,
}

impl Invocation {
    pub fn new(step: StepKind, program: impl Into<String>) -> Self {
        Invocation {
            step,
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Shell-like rendering for log output.
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// How a finished command exited. `code` is `None` when it was killed by a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitOutcome {
    pub code: Option<i32>,
}

impl ExitOutcome {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// "status 3", or "a signal" when the process had no exit code.
pub fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {}", code),
        None => "a signal".to_string(),
    }
}

/// Executes invocations. The real implementation spawns processes; tests record them.
pub trait CommandRunner {
    fn run(&mut self, invocation: &Invocation) -> Result<ExitOutcome, Error>;
}

/// Spawns each invocation as a child process with inherited stdio.
#[derive(Debug, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn run(&mut self, invocation: &Invocation) -> Result<ExitOutcome, Error> {
        let status = command_runner::run_inherited(&invocation.program, invocation.args.as_slice())?;
        Ok(ExitOutcome { code: status.code() })
    }
}

/// One stage of the pipeline.
///
/// `prepare` runs right before the step's command and `finish` right after it
/// succeeds. Neither runs for a step that is never reached.
pub trait Step {
    fn kind(&self) -> StepKind;

    fn invocation(&self, settings: &Settings) -> Invocation;

    fn prepare(&self, _settings: &Settings) -> Result<(), Error> {
        Ok(())
    }

    fn finish(&self, _settings: &Settings) -> Result<(), Error> {
        Ok(())
    }
}

/// The enabled steps, in execution order.
pub fn steps_for(settings: &Settings) -> Vec<Box<dyn Step>> {
    let mut steps: Vec<Box<dyn Step>> = vec![Box::new(CargoBuildStep::new()), Box::new(BindgenStep::new())];
    if settings.optimize {
        steps.push(Box::new(WasmOptStep::new()));
    }
    if settings.serve {
        steps.push(Box::new(StaticServerStep::new()));
    }
    steps
}

/// The commands a run would execute, without running anything.
pub fn plan(settings: &Settings) -> Vec<Invocation> {
    steps_for(settings).iter().map(|step| step.invocation(settings)).collect()
}

/// Fails with `Error::ToolNotFound` for the first enabled step whose program is missing.
pub fn check_tools(settings: &Settings) -> Result<(), Error> {
    for invocation in plan(settings) {
        if !command_runner::is_command_in_path(&invocation.program) {
            return Err(Error::ToolNotFound(invocation.program));
        }
    }
    Ok(())
}

/// Runs every enabled step in order, stopping at the first failure.
pub fn execute(settings: &Settings, runner: &mut dyn CommandRunner) -> Result<(), Error> {
    for step in steps_for(settings) {
        step.prepare(settings)?;

        let invocation = step.invocation(settings);
        log::info!("[{}] {}", invocation.step, invocation.command_line());

        let outcome = runner.run(&invocation)?;
        if !outcome.success() {
            // The tool has already printed its own diagnostics.
            log::debug!(
                "{} step failed: '{}' exited with {}",
                invocation.step,
                invocation.program,
                describe_exit(&outcome.code)
            );
            return Err(Error::StepFailed {
                step: invocation.step,
                program: invocation.program,
                code: outcome.code,
            });
        }

        step.finish(settings)?;
    }
    Ok(())
}
