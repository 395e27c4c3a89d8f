// src/config.rs

use crate::constants::{AUTOSAVE_DELAY, CONTENT_DB_NAME, DATA_DIR_ENV, SAVE_FILE_NAME};
use crate::error::AppError;
use directories::ProjectDirs;
use log::debug;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Where content comes from and where user data goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Bundled, read-only content database.
    pub content_source: PathBuf,
    /// Writable directory holding the installed content copy and the save file.
    pub data_dir: PathBuf,
    pub autosave_delay: Duration,
}

impl AppConfig {
    /// Config rooted at an explicit data directory, which is created if needed.
    pub fn new(content_source: PathBuf, data_dir: PathBuf) -> Result<Self, AppError> {
        std::fs::create_dir_all(&data_dir)?;
        Ok(Self {
            content_source,
            data_dir,
            autosave_delay: AUTOSAVE_DELAY,
        })
    }

    /// Resolve paths from overrides, then `SKATESPIN_DATA_DIR`, then the
    /// platform data directory. Content defaults to `Database.db` beside the
    /// executable.
    pub fn resolve(data_dir: Option<PathBuf>, content_source: Option<PathBuf>) -> Result<Self, AppError> {
        let data_dir = match data_dir.or_else(|| std::env::var_os(DATA_DIR_ENV).map(PathBuf::from)) {
            Some(dir) => dir,
            None => default_data_dir()?,
        };
        let content_source = match content_source {
            Some(path) => path,
            None => default_content_source(),
        };
        debug!(
            "Resolved config: content {} data {}",
            content_source.display(),
            data_dir.display()
        );
        Self::new(content_source, data_dir)
    }

    /// Installed, writable copy of the content database.
    pub fn content_db_path(&self) -> PathBuf {
        self.data_dir.join(CONTENT_DB_NAME)
    }

    pub fn save_path(&self) -> PathBuf {
        self.data_dir.join(SAVE_FILE_NAME)
    }
}

fn default_data_dir() -> Result<PathBuf, AppError> {
    let proj_dirs = ProjectDirs::from("com", "skatespin", "SkateSpin").ok_or(AppError::NoProjectDirs)?;
    Ok(proj_dirs.data_dir().to_path_buf())
}

fn default_content_source() -> PathBuf {
    std::env::current_exe()
        .ok()
        .as_deref()
        .and_then(Path::parent)
        .map_or_else(|| PathBuf::from(CONTENT_DB_NAME), |dir| dir.join(CONTENT_DB_NAME))
}
