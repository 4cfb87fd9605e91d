pub mod config;
pub mod layers;

pub use layers::console::ConsoleOutput;

use crate::cli::{Args, Command};
use crate::core::config::loader::CONFIG_FILE_NAME;
use crate::logging::config::LoggingConfig;
use crate::logging::layers::{console, file};
use crate::Result;
use anyhow::{anyhow, Context};
use std::env;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::registry::Registry;

static LOGGER_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Guards that keep logging sinks active for the duration of the command.
pub struct LoggingGuard {
    _file_guard: Option<tracing_appender::non_blocking::WorkerGuard>,
    console_output: ConsoleOutput,
    log_file_path: Option<PathBuf>,
}

impl LoggingGuard {
    /// Returns the console output used during initialization.
    pub fn console_output(&self) -> ConsoleOutput {
        self.console_output
    }

    /// Returns the log file path when the file sink is enabled.
    pub fn log_file_path(&self) -> Option<&Path> {
        self.log_file_path.as_deref()
    }
}

/// Initialize the logging framework for the parsed command line.
///
/// Filter precedence: `ITEMDEF_LOG`, `RUST_LOG`, then the configured default level
/// (`debug` with `--verbose`). Errors when invoked more than once per process.
pub fn init(args: &Args) -> Result<LoggingGuard> {
    if LOGGER_INITIALIZED
        .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
        .is_err()
    {
        return Err(anyhow!("logging already initialized"));
    }

    let workspace_root = resolve_workspace_path(&args.command);
    let config_file = args
        .config
        .clone()
        .unwrap_or_else(|| workspace_root.join(CONFIG_FILE_NAME));
    let config = LoggingConfig::load(Some(&config_file))?;

    let default_level = if args.verbose {
        "debug"
    } else {
        config.default_level.as_str()
    };
    let env_filter = EnvFilter::try_from_env("ITEMDEF_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .or_else(|_| EnvFilter::try_new(default_level))
        .context("failed to configure tracing level")?;

    type BaseRegistry = Registry;
    type FileSubscriber = file::FileLayerStack<BaseRegistry>;

    let log_file_path = file::log_file_path(&config, &workspace_root);
    let (file_layer, file_guard) =
        file::file_layer::<BaseRegistry>(&log_file_path, config.enable_file)?;

    let console_output = console::select_console_output(
        config.console_output,
        reserves_stdout(&args.command),
    );
    let console_layer = console::console_layer::<FileSubscriber>(console_output);

    tracing_subscriber::registry()
        .with(file_layer)
        .with(console_layer)
        .with(env_filter)
        .try_init()
        .context("failed to install tracing subscriber")?;

    Ok(LoggingGuard {
        log_file_path: file_guard.as_ref().map(|_| log_file_path),
        _file_guard: file_guard,
        console_output,
    })
}

/// The manifest directory is the workspace; `formats` runs in the current directory.
fn resolve_workspace_path(command: &Command) -> PathBuf {
    let manifest = match command {
        Command::Render(args) => Some(&args.manifest),
        Command::Validate(args) => Some(&args.manifest),
        Command::Formats(_) => None,
    };
    manifest
        .and_then(|path| path.parent())
        .filter(|parent| !parent.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .or_else(|| env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."))
}

fn reserves_stdout(command: &Command) -> bool {
    matches!(command, Command::Render(args) if args.payload)
}

#[cfg(test)]
/// Reset the initialization guard so tests can reconfigure logging multiple times.
pub fn reset_for_tests() {
    LOGGER_INITIALIZED.store(false, Ordering::SeqCst);
}
