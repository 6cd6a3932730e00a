//! `wasm_example_runner` builds a cargo example for WebAssembly, generates its
//! JavaScript bindings with `wasm-bindgen` and serves the result with a static
//! HTTP server for a quick look in the browser.
//!
//! ## Features
//! - Builds `--example <name>` for `wasm32-unknown-unknown` with any cargo profile.
//! - Runs `wasm-bindgen` on the exact artifact cargo produced.
//! - Optionally shrinks the output with `wasm-opt`.
//! - Writes a minimal `index.html` when the served directory has none.
//! - Stops at the first failing step and exits with that tool's status.
//!
//! ## Usage (CLI)
//! ```bash
//! wasm_example_runner hello
//! wasm_example_runner hello --profile dev --addr 127.0.0.1:4000 -- --locked
//! wasm_example_runner hello --dry-run
//! ```
//!
//! Defaults can be kept in a `wasm-example.toml` next to the workspace root.

pub mod app_config;
pub mod pipeline;
pub mod utils;
pub mod webpage;

use app_config::{AppConfig, FileConfig, Settings};
use pipeline::{StepKind, SystemRunner};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("'{0}' was not found. Is it installed and in your PATH?")]
    ToolNotFound(String),
    #[error("{step} step failed: '{program}' exited with {}", pipeline::describe_exit(.code))]
    StepFailed {
        step: StepKind,
        program: String,
        code: Option<i32>,
    },
    #[error("File system operation failed: {0}")]
    FileSystem(String),
    #[error("Could not serialize plan: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::StepFailed { code: Some(code), .. } => *code,
            Error::StepFailed { code: None, .. } => 1,
            Error::ToolNotFound(_) => 127,
            Error::Config(_) => 2,
            Error::Io(_) | Error::FileSystem(_) | Error::Json(_) => 1,
        }
    }
}

pub fn run() -> Result<(), Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).try_init().ok();

    let cli = AppConfig::new();
    let dry_run = cli.dry_run;
    let check_tools = cli.check_tools;

    let file_config = FileConfig::load(cli.config.as_deref())?;
    let env_target_dir = app_config::env_target_dir(|name| std::env::var_os(name));
    let settings = Settings::resolve(cli, file_config, env_target_dir)?;
    log::debug!("Using settings: {:?}", settings);

    if dry_run {
        println!("{}", serde_json::to_string_pretty(&pipeline::plan(&settings))?);
        return Ok(());
    }

    if check_tools {
        pipeline::check_tools(&settings)?;
    }

    log::info!("Previewing example '{}' ({})", settings.example, settings.target_triple);
    pipeline::execute(&settings, &mut SystemRunner)
}
