use std::collections::HashMap;
use std::env;
use std::fs;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use chrono_tz::Tz;

use crate::error::ConfigError;

const DEFAULT_ADDR: &str = "127.0.0.1:5000";
const DEFAULT_DB_PATH: &str = "./data/notes.db";
const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
const DEFAULT_TIMEZONE: &str = "Asia/Kolkata";
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const DEFAULT_CREDENTIALS_FILE: &str = "./credentials.json";
const DEFAULT_TOKEN_FILE: &str = "./token.json";
const DEFAULT_CALENDAR_ID: &str = "primary";

#[derive(Debug, Default, Clone)]
pub struct AppConfig {
    values: HashMap<String, String>,
}

impl AppConfig {
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)
            .map_err(|e| ConfigError::File(format!("{}: {}", path, e)))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let mut values = HashMap::new();
        for (idx, line) in content.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let trimmed = trimmed.strip_prefix("export ").unwrap_or(trimmed);
            let Some((key, value)) = trimmed.split_once('=') else {
                return Err(ConfigError::File(format!(
                    "Invalid config line {}: {}",
                    idx + 1,
                    line
                )));
            };
            let key = key.trim();
            let mut value = value.trim().to_string();
            if value.len() >= 2
                && ((value.starts_with('"') && value.ends_with('"'))
                    || (value.starts_with('\'') && value.ends_with('\'')))
            {
                value = value[1..value.len() - 1].to_string();
            }
            values.insert(key.to_string(), value);
        }
        Ok(Self { values })
    }

    /// Loads the file named by `CONFIG_FILE`, or an empty config when unset.
    pub fn load() -> Result<Self, ConfigError> {
        match env::var("CONFIG_FILE") {
            Ok(path) => Self::from_file(&path),
            Err(_) => Ok(Self::default()),
        }
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    /// File value first, then the process environment.
    pub fn prop(&self, key: &str) -> Option<String> {
        self.get(key)
            .or_else(|| env::var(key).ok())
            .filter(|value| !value.trim().is_empty())
    }
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub addr: SocketAddr,
    pub db_path: PathBuf,
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub openai_model: String,
    pub timezone: Tz,
    pub http_timeout: Duration,
    pub google_credentials_file: PathBuf,
    pub google_token_file: PathBuf,
    pub calendar_id: String,
}

impl Settings {
    pub fn from_config(config: &AppConfig) -> Result<Self, ConfigError> {
        let get_or = |key: &str, default: &str| config.prop(key).unwrap_or(default.to_string());

        let addr_raw = get_or("ASSISTANT_ADDR", DEFAULT_ADDR);
        let addr = addr_raw.parse::<SocketAddr>().map_err(|_| ConfigError::Invalid {
            key: "ASSISTANT_ADDR".to_string(),
            value: addr_raw.clone(),
        })?;

        let tz_raw = get_or("ASSISTANT_TIMEZONE", DEFAULT_TIMEZONE);
        let timezone = tz_raw.parse::<Tz>().map_err(|_| ConfigError::Invalid {
            key: "ASSISTANT_TIMEZONE".to_string(),
            value: tz_raw.clone(),
        })?;

        let timeout_secs = match config.prop("HTTP_TIMEOUT_SECS") {
            Some(raw) => raw.parse::<u64>().map_err(|_| ConfigError::Invalid {
                key: "HTTP_TIMEOUT_SECS".to_string(),
                value: raw.clone(),
            })?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            addr,
            db_path: PathBuf::from(get_or("NOTES_DB_PATH", DEFAULT_DB_PATH)),
            openai_api_key: config.prop("OPENAI_API_KEY"),
            openai_base_url: get_or("OPENAI_BASE_URL", DEFAULT_OPENAI_BASE_URL),
            openai_model: get_or("OPENAI_MODEL", DEFAULT_OPENAI_MODEL),
            timezone,
            http_timeout: Duration::from_secs(timeout_secs),
            google_credentials_file: PathBuf::from(get_or(
                "GOOGLE_CREDENTIALS_FILE",
                DEFAULT_CREDENTIALS_FILE,
            )),
            google_token_file: PathBuf::from(get_or("GOOGLE_TOKEN_FILE", DEFAULT_TOKEN_FILE)),
            calendar_id: get_or("GOOGLE_CALENDAR_ID", DEFAULT_CALENDAR_ID),
        })
    }

    pub fn require_openai_key(&self) -> Result<String, ConfigError> {
        self.openai_api_key
            .clone()
            .ok_or_else(|| ConfigError::Missing("OPENAI_API_KEY".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_comments_exports_and_quotes() {
        let config = AppConfig::parse(
            "# local settings\n\
             export OPENAI_MODEL=\"gpt-4o\"\n\
             \n\
             ASSISTANT_TIMEZONE='America/New_York'\n\
             NOTES_DB_PATH = /tmp/notes.db\n",
        )
        .unwrap();

        assert_eq!(config.get("OPENAI_MODEL").as_deref(), Some("gpt-4o"));
        assert_eq!(config.get("ASSISTANT_TIMEZONE").as_deref(), Some("America/New_York"));
        assert_eq!(config.get("NOTES_DB_PATH").as_deref(), Some("/tmp/notes.db"));
    }

    #[test]
    fn rejects_lines_without_equals() {
        let err = AppConfig::parse("OPENAI_MODEL gpt-4o").unwrap_err();
        assert!(err.to_string().contains("line 1"));
    }

    #[test]
    fn settings_read_file_values() {
        let config = AppConfig::parse(
            "ASSISTANT_ADDR=0.0.0.0:8080\nASSISTANT_TIMEZONE=Europe/Berlin\nHTTP_TIMEOUT_SECS=5\n",
        )
        .unwrap();
        let settings = Settings::from_config(&config).unwrap();

        assert_eq!(settings.addr.port(), 8080);
        assert_eq!(settings.timezone, chrono_tz::Europe::Berlin);
        assert_eq!(settings.http_timeout, Duration::from_secs(5));
    }

    #[test]
    fn settings_reject_unknown_timezone() {
        let config = AppConfig::parse("ASSISTANT_TIMEZONE=Mars/Olympus").unwrap();
        let err = Settings::from_config(&config).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { ref key, .. } if key == "ASSISTANT_TIMEZONE"));
    }
}
