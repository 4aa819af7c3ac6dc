use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use directories::BaseDirs;

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".biblioteca";
/// SQLite file name stored inside the application data directory.
const DB_FILE_NAME: &str = "biblioteca.db";
/// Log file written next to the store; stdout belongs to the terminal UI.
const LOG_FILE_NAME: &str = "biblioteca.log";

/// Where the application keeps its files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub data_dir: PathBuf,
    pub db_path: PathBuf,
    pub log_path: PathBuf,
}

impl Config {
    /// Resolve the default layout inside the user's home directory.
    pub fn resolve() -> Result<Self> {
        let base_dirs =
            BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
        Ok(Self::in_dir(base_dirs.home_dir().join(DATA_DIR_NAME)))
    }

    /// Lay the store and log file out under `data_dir`.
    pub fn in_dir(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        Self {
            db_path: data_dir.join(DB_FILE_NAME),
            log_path: data_dir.join(LOG_FILE_NAME),
            data_dir,
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn files_live_inside_the_data_dir() {
        let config = Config::in_dir("/tmp/biblioteca-test");

        assert_eq!(config.data_dir(), Path::new("/tmp/biblioteca-test"));
        assert_eq!(
            config.db_path,
            PathBuf::from("/tmp/biblioteca-test/biblioteca.db")
        );
        assert_eq!(
            config.log_path,
            PathBuf::from("/tmp/biblioteca-test/biblioteca.log")
        );
    }

    #[test]
    fn default_layout_uses_hidden_home_folder() {
        if let Ok(config) = Config::resolve() {
            assert!(config.data_dir.ends_with(DATA_DIR_NAME));
            assert_eq!(config.db_path.parent(), Some(config.data_dir()));
        }
    }
}
