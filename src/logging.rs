use std::{env, fs::OpenOptions, path::PathBuf};

use anyhow::{Context, Result};
use env_logger::{Builder, Env, Target};

/// Overrides where the log file is written.
pub const LOG_PATH_VAR: &str = "GRIDSNAKE_LOG";

/// The terminal is busy drawing the board, so logs go to a file instead.
pub fn init() -> Result<PathBuf> {
    let path = env::var_os(LOG_PATH_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|| env::temp_dir().join("gridsnake.log"));

    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("opening log file {}", path.display()))?;

    Builder::from_env(Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .target(Target::Pipe(Box::new(file)))
        .init();

    Ok(path)
}
