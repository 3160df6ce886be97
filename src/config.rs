//! Transfer configuration loaded from a JSON file.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::auth::Credentials;
use crate::error::Result;
use crate::poll::{PollPolicy, PollSettings};

/// Default location of the transfer record database.
pub const DEFAULT_DB_PATH: &str = "quark.db";

/// Settings for transferring shares into the drive.
///
/// ```json
/// {
///     "cookie": "__pus=...; __puus=...",
///     "save_dir": "17bd2d4dfbeb4ed9a7c2bde5bba73a15",
///     "ad_keywords": ["公众号", "加群"]
/// }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Session cookie of a logged-in drive account.
    #[serde(default)]
    pub cookie: String,

    /// Destination folder id. Empty or missing means the drive root.
    #[serde(default)]
    pub save_dir: Option<String>,

    /// File names containing any of these are deleted after a folder transfer.
    #[serde(default)]
    pub ad_keywords: Vec<String>,

    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    #[serde(default)]
    pub poll: PollSettings,
}

fn default_db_path() -> PathBuf {
    PathBuf::from(DEFAULT_DB_PATH)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cookie: String::new(),
            save_dir: None,
            ad_keywords: Vec::new(),
            db_path: default_db_path(),
            poll: PollSettings::default(),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Destination folder id, if one is configured.
    pub fn save_dir(&self) -> Option<&str> {
        self.save_dir
            .as_deref()
            .map(str::trim)
            .filter(|dir| !dir.is_empty())
    }

    pub fn credentials(&self) -> Result<Credentials> {
        Credentials::new(self.cookie.as_str())
    }

    pub fn poll_policy(&self) -> PollPolicy {
        PollPolicy::from(&self.poll)
    }
}
