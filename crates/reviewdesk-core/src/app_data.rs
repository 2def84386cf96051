//! Where ReviewDesk keeps its own state (config, logs).
//!
//! The review CSV and the vector index live wherever the config points; only
//! app-level files go here.

use std::path::PathBuf;

/// Returns the directory where ReviewDesk stores config and logs.
/// On Linux: `~/.local/share/reviewdesk/`.
/// Creates the directory if it doesn't exist; returns `None` if we can't determine the path.
pub fn app_data_dir() -> Option<PathBuf> {
    let dir = directories::ProjectDirs::from("app", "ReviewDesk", "ReviewDesk")?
        .data_local_dir()
        .to_path_buf();
    std::fs::create_dir_all(&dir).ok()?;
    Some(dir)
}

/// Directory for rolling log files, under the app data dir.
pub fn log_dir() -> Option<PathBuf> {
    let dir = app_data_dir()?.join("logs");
    std::fs::create_dir_all(&dir).ok()?;
    Some(dir)
}
