//! Configuration management module.
//!
//! This module handles loading the bot's configuration file: upstream
//! credentials, link-matching domains, output limits, and time formatting.

mod error;

pub use error::ConfigError;

use crate::error::AppError;
use crate::render::{StrftimeFormatter, DEFAULT_TIME_FORMAT};
use log::*;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

const FILE_NAME: &str = "config.yml";
const DEFAULT_DIRECTORY_PATH: &str = ".config/twitter-preview";
const SESSION_SUFFIX: &str = "twitter-preview";

/// Upstream credentials. The variant also selects which API contract the
/// gateway speaks.
///
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "api", rename_all = "snake_case")]
pub enum Credentials {
    Legacy {
        consumer_key: String,
        consumer_secret: String,
    },
    V2 {
        bearer_token: String,
    },
    Session {
        username: String,
        password: String,
    },
}

/// Oversees management of configuration file.
///
#[derive(Clone, Debug)]
pub struct Config {
    pub credentials: Option<Credentials>,
    pub show_quoted_posts: bool,
    pub alternate_domains: Vec<String>,
    pub basename: String,
    pub session_dir: Option<PathBuf>, // Falls back to the config directory
    pub api_base_url: String,
    pub timeout_secs: u64,
    pub max_line_length: usize,
    pub time_format: String,
    pub utc_offset_minutes: i32,
}

/// Define specification for configuration file.
///
#[derive(Serialize, Deserialize)]
struct FileSpec {
    pub credentials: Option<Credentials>,
    #[serde(default = "default_true")]
    pub show_quoted_posts: bool,
    #[serde(default = "default_alternate_domains")]
    pub alternate_domains: Vec<String>,
    #[serde(default = "default_basename")]
    pub basename: String,
    #[serde(default)]
    pub session_dir: Option<PathBuf>,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_max_line_length")]
    pub max_line_length: usize,
    #[serde(default = "default_time_format")]
    pub time_format: String,
    #[serde(default)]
    pub utc_offset_minutes: i32,
}

fn default_true() -> bool {
    true
}

fn default_alternate_domains() -> Vec<String> {
    vec![
        "vxtwitter.com".to_string(),
        "fixvx.com".to_string(),
        "nitter.net".to_string(),
    ]
}

fn default_basename() -> String {
    "default".to_string()
}

fn default_api_base_url() -> String {
    "https://api.twitter.com".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_max_line_length() -> usize {
    400
}

fn default_time_format() -> String {
    DEFAULT_TIME_FORMAT.to_string()
}

impl Config {
    /// Return a new instance holding the defaults and no credentials.
    ///
    pub fn new() -> Config {
        Config {
            credentials: None,
            show_quoted_posts: default_true(),
            alternate_domains: default_alternate_domains(),
            basename: default_basename(),
            session_dir: None,
            api_base_url: default_api_base_url(),
            timeout_secs: default_timeout_secs(),
            max_line_length: default_max_line_length(),
            time_format: default_time_format(),
            utc_offset_minutes: 0,
        }
    }

    /// Load the configuration file from the custom directory if provided,
    /// otherwise from the default directory under the home directory.
    ///
    pub fn load(&mut self, custom_path: Option<&str>) -> Result<(), AppError> {
        // Use default path unless custom path provided
        let dir_path = match custom_path {
            Some(path) => Path::new(&path).to_path_buf(),
            None => Config::default_path()?,
        };

        let file_path = dir_path.join(Path::new(FILE_NAME));
        if !file_path.exists() {
            return Err(ConfigError::FileNotFound(file_path.clone()).into());
        }

        debug!("Loading configuration from {}...", file_path.display());
        let contents = fs::read_to_string(&file_path).map_err(|e| ConfigError::LoadFailed {
            path: file_path.clone(),
            message: format!("IO error: {}", e),
        })?;
        self.apply_yaml(&contents)?;

        if self.session_dir.is_none() {
            self.session_dir = Some(dir_path);
        }
        Ok(())
    }

    /// Overwrite settings with those parsed from YAML text.
    ///
    fn apply_yaml(&mut self, contents: &str) -> Result<(), ConfigError> {
        let data: FileSpec = serde_yaml::from_str(contents)
            .map_err(|e| ConfigError::DeserializationFailed(e.to_string()))?;
        self.credentials = data.credentials;
        self.show_quoted_posts = data.show_quoted_posts;
        self.alternate_domains = data.alternate_domains;
        self.basename = data.basename;
        self.session_dir = data.session_dir;
        self.api_base_url = data.api_base_url;
        self.timeout_secs = data.timeout_secs;
        self.max_line_length = data.max_line_length;
        self.time_format = data.time_format;
        self.utc_offset_minutes = data.utc_offset_minutes;
        Ok(())
    }

    /// Returns the configured credentials or an error when none were given.
    ///
    pub fn credentials(&self) -> Result<&Credentials, ConfigError> {
        self.credentials.as_ref().ok_or(ConfigError::CredentialsNotSet)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Returns the session file path without its extension, keyed by the
    /// bot instance name.
    ///
    pub fn session_base(&self) -> PathBuf {
        let dir = self.session_dir.clone().unwrap_or_default();
        dir.join(format!("{}.{}", self.basename, SESSION_SUFFIX))
    }

    pub fn time_formatter(&self) -> StrftimeFormatter {
        StrftimeFormatter::new(&self.time_format, self.utc_offset_minutes)
    }

    /// Returns the path buffer for the default configuration directory or an
    /// error if the home directory could not be found.
    ///
    fn default_path() -> Result<PathBuf, AppError> {
        match dirs::home_dir() {
            Some(home) => {
                let home_path = Path::new(&home);
                let default_config_path = Path::new(DEFAULT_DIRECTORY_PATH);
                Ok(home_path.join(default_config_path))
            }
            None => Err(ConfigError::HomeDirectoryNotFound.into()),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(dir: &Path, contents: &str) {
        let mut file = fs::File::create(dir.join(FILE_NAME)).unwrap();
        write!(file, "{}", contents).unwrap();
    }

    #[test]
    fn test_load_applies_defaults() {
        let dir = tempfile::tempdir().unwrap();
        write_config(
            dir.path(),
            "credentials:\n  api: v2\n  bearer_token: abc\n",
        );

        let mut config = Config::new();
        config.load(dir.path().to_str()).unwrap();
        assert_eq!(
            config.credentials().unwrap(),
            &Credentials::V2 {
                bearer_token: "abc".to_string()
            }
        );
        assert!(config.show_quoted_posts);
        assert_eq!(config.alternate_domains, default_alternate_domains());
        assert_eq!(config.max_line_length, 400);
        assert_eq!(config.timeout(), Duration::from_secs(10));
        assert_eq!(
            config.session_base(),
            dir.path().join("default.twitter-preview")
        );
    }

    #[test]
    fn test_load_overrides() {
        let dir = tempfile::tempdir().unwrap();
        write_config(
            dir.path(),
            "credentials:\n  api: session\n  username: bot\n  password: hunter2\n\
             show_quoted_posts: false\n\
             alternate_domains: [fxtwitter.com]\n\
             basename: ircbot\n\
             session_dir: /var/lib/bot\n\
             timeout_secs: 3\n\
             utc_offset_minutes: 60\n",
        );

        let mut config = Config::new();
        config.load(dir.path().to_str()).unwrap();
        assert!(!config.show_quoted_posts);
        assert_eq!(config.alternate_domains, vec!["fxtwitter.com".to_string()]);
        assert_eq!(
            config.session_base(),
            PathBuf::from("/var/lib/bot/ircbot.twitter-preview")
        );
        assert_eq!(config.timeout(), Duration::from_secs(3));
        assert!(matches!(
            config.credentials(),
            Ok(Credentials::Session { .. })
        ));
    }

    #[test]
    fn test_missing_credentials() {
        let dir = tempfile::tempdir().unwrap();
        write_config(dir.path(), "show_quoted_posts: true\n");

        let mut config = Config::new();
        config.load(dir.path().to_str()).unwrap();
        assert!(matches!(
            config.credentials(),
            Err(ConfigError::CredentialsNotSet)
        ));
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::new();
        let result = config.load(dir.path().to_str());
        assert!(matches!(
            result,
            Err(AppError::Config(ConfigError::FileNotFound(_)))
        ));
    }

    #[test]
    fn test_unknown_api_rejected() {
        let mut config = Config::new();
        let result = config.apply_yaml("credentials:\n  api: oauth9\n  token: x\n");
        assert!(matches!(result, Err(ConfigError::DeserializationFailed(_))));
    }
}
