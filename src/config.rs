use std::path::{Path, PathBuf};

/// Name of the per-user data directory.
pub const APP_DIR: &str = "daytask";
pub const DATA_FILE: &str = "data.json";
pub const LOG_FILE: &str = "daytask.log";
pub const DB_ENV: &str = "DAYTASK_DB";

/// Resolved runtime paths and logging level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub data_file: PathBuf,
    pub log_file: PathBuf,
    pub log_level: String,
}

impl AppConfig {
    /// Builds the configuration from command-line values.
    ///
    /// `data_file` already reflects the `DAYTASK_DB` variable when clap read
    /// it; otherwise the platform data directory is used. The log file sits
    /// next to the data file unless given explicitly.
    pub fn resolve(data_file: Option<PathBuf>, log_file: Option<PathBuf>, log_level: &str) -> Self {
        let data_file = data_file.unwrap_or_else(default_data_file);
        let log_file = log_file.unwrap_or_else(|| sibling(&data_file, LOG_FILE));
        AppConfig {
            data_file,
            log_file,
            log_level: log_level.to_string(),
        }
    }
}

/// `~/.local/share/daytask/data.json` on Linux, `./data.json` if the platform
/// has no data directory.
pub fn default_data_file() -> PathBuf {
    match dirs::data_local_dir() {
        Some(mut p) => {
            p.push(APP_DIR);
            p.push(DATA_FILE);
            p
        }
        None => PathBuf::from(DATA_FILE),
    }
}

fn sibling(path: &Path, name: &str) -> PathBuf {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.join(name),
        _ => PathBuf::from(name),
    }
}
