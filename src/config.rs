use crate::error::Error;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "freelance-board";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub backend_url: String,
    pub backend_key: String,
    pub access_token: Option<String>,
    pub log_dir: PathBuf,
    pub log_level: String,
}

// config.toml, every key optional
#[derive(Debug, Default, Deserialize, PartialEq)]
pub struct FileConfig {
    pub backend_url: Option<String>,
    pub backend_key: Option<String>,
    pub access_token: Option<String>,
    pub log_dir: Option<PathBuf>,
    pub log_level: Option<String>,
}

impl Config {
    /// `.env`, then the config file, then environment variables.
    pub fn load() -> Result<Config, Error> {
        dotenv::dotenv().ok();

        let file = match config_file_path() {
            Some(path) if path.exists() => read_file_config(&path)?,
            _ => FileConfig::default(),
        };

        Config::from_sources(file, |key| env::var(key).ok())
    }

    pub fn from_sources<F>(file: FileConfig, lookup: F) -> Result<Config, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let pick = |key: &str, fallback: Option<String>| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .or(fallback)
        };

        let backend_url = pick("BOARD_BACKEND_URL", file.backend_url)
            .ok_or_else(|| Error::Config("BOARD_BACKEND_URL not set".to_string()))?;
        let backend_key = pick("BOARD_BACKEND_KEY", file.backend_key)
            .ok_or_else(|| Error::Config("BOARD_BACKEND_KEY not set".to_string()))?;

        let log_dir = pick("BOARD_LOG_DIR", None)
            .map(PathBuf::from)
            .or(file.log_dir)
            .unwrap_or_else(default_log_dir);

        Ok(Config {
            backend_url: backend_url.trim_end_matches('/').to_string(),
            backend_key,
            access_token: pick("BOARD_ACCESS_TOKEN", file.access_token),
            log_dir,
            log_level: pick("BOARD_LOG", file.log_level).unwrap_or_else(|| "info".to_string()),
        })
    }
}

pub fn config_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join("config.toml"))
}

pub fn default_log_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(env::temp_dir)
        .join(APP_DIR)
        .join("logs")
}

fn read_file_config(path: &Path) -> Result<FileConfig, Error> {
    let raw = fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("cannot read {}: {}", path.display(), e)))?;
    toml::from_str(&raw)
        .map_err(|e| Error::Config(format!("cannot parse {}: {}", path.display(), e)))
}
