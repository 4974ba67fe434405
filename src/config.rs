use std::env;
use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::db::connection;
use crate::error::ClimblyError;

pub const USER_ENV: &str = "CLIMBLY_USER";
const DEFAULT_USER: &str = "local";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub user: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            user: DEFAULT_USER.to_string(),
        }
    }
}

/// Get the config file path.
pub fn config_path() -> Result<PathBuf, ClimblyError> {
    Ok(connection::find_root()?.join(connection::DATA_DIR).join("config.json"))
}

impl Config {
    /// Read the config file. A missing or unreadable file yields the default.
    pub fn load() -> Config {
        let Ok(path) = config_path() else {
            return Config::default();
        };
        fs::read_to_string(path)
            .ok()
            .and_then(|content| serde_json::from_str(&content).ok())
            .unwrap_or_default()
    }

    pub fn save(&self) -> Result<PathBuf, ClimblyError> {
        let path = config_path()?;
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| ClimblyError::validation(e.to_string()))?;
        fs::write(&path, content).map_err(|e| ClimblyError::database(e.to_string()))?;
        Ok(path)
    }
}

/// The acting user: `--user` flag, then `CLIMBLY_USER`, then the config file.
pub fn resolve_user(flag: Option<&str>) -> String {
    if let Some(user) = flag.filter(|u| !u.is_empty()) {
        return user.to_string();
    }
    if let Ok(user) = env::var(USER_ENV) {
        if !user.is_empty() {
            return user;
        }
    }
    Config::load().user
}
