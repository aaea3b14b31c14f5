#[cfg(feature = "cli")]
pub mod cli;

use crate::domain::model::Boards;
use crate::utils::error::{DashboardError, Result};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

const DEFAULT_TTL_SECONDS: u64 = 300;
const DEFAULT_FETCH_TIMEOUT_SECONDS: u64 = 10;
const DEFAULT_SEND_TIMEOUT_SECONDS: u64 = 10;
const DEFAULT_MESSAGES_PATH: &str = "messages.json";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub cache: CacheConfig,
    pub sources: SourceConfig,
    pub mail: MailConfig,
    pub messages: Option<MessagesConfig>,
    /// Board name → club names; message targeting only, never aggregation.
    pub boards: HashMap<String, Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub ttl_seconds: Option<u64>,
    pub fetch_timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub responses_url: String,
    pub roster_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    pub relay_url: String,
    pub from: String,
    pub send_timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagesConfig {
    pub path: Option<String>,
}

impl AppConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(DashboardError::IoError)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed = Self::substitute_env_vars(content);
        toml::from_str(&processed).map_err(|e| DashboardError::ConfigError {
            field: "toml_parsing".to_string(),
            reason: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR_NAME}` placeholders with environment values; unset
    /// variables are left as-is so validation can report them.
    fn substitute_env_vars(content: &str) -> String {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").unwrap();

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .to_string()
    }

    pub fn ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.cache.ttl_seconds.unwrap_or(DEFAULT_TTL_SECONDS) as i64)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(
            self.cache
                .fetch_timeout_seconds
                .unwrap_or(DEFAULT_FETCH_TIMEOUT_SECONDS),
        )
    }

    pub fn send_timeout(&self) -> Duration {
        Duration::from_secs(
            self.mail
                .send_timeout_seconds
                .unwrap_or(DEFAULT_SEND_TIMEOUT_SECONDS),
        )
    }

    pub fn messages_path(&self) -> &str {
        self.messages
            .as_ref()
            .and_then(|m| m.path.as_deref())
            .unwrap_or(DEFAULT_MESSAGES_PATH)
    }

    pub fn board_table(&self) -> Boards {
        Boards::new(self.boards.clone())
    }

    pub fn validate_config(&self) -> Result<()> {
        validation::validate_url("sources.responses_url", &self.sources.responses_url)?;
        validation::validate_url("sources.roster_url", &self.sources.roster_url)?;
        validation::validate_url("mail.relay_url", &self.mail.relay_url)?;
        validation::validate_non_empty_string("mail.from", &self.mail.from)?;

        if let Some(ttl) = self.cache.ttl_seconds {
            validation::validate_positive_number("cache.ttl_seconds", ttl, 1)?;
        }
        if let Some(timeout) = self.cache.fetch_timeout_seconds {
            validation::validate_positive_number("cache.fetch_timeout_seconds", timeout, 1)?;
        }

        for (board, clubs) in &self.boards {
            if clubs.iter().all(|club| club.trim().is_empty()) {
                return Err(DashboardError::ConfigError {
                    field: format!("boards.{}", board),
                    reason: "Board has no club names".to_string(),
                });
            }
        }

        Ok(())
    }
}

impl Validate for AppConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const BASIC_TOML: &str = r#"
[cache]
ttl_seconds = 120

[sources]
responses_url = "https://sheets.example.com/responses.csv"
roster_url = "https://sheets.example.com/roster.csv"

[mail]
relay_url = "https://relay.example.com/send"
from = "club-admin@example.edu"

[boards]
Technical = ["Coding Club ( Codessey)", "Esports Arena"]
Cultural = ["Music Club", "Chroma Club"]
"#;

    #[test]
    fn test_parse_basic_config() {
        let config = AppConfig::from_toml_str(BASIC_TOML).unwrap();

        assert_eq!(config.ttl(), chrono::Duration::seconds(120));
        assert_eq!(config.fetch_timeout(), Duration::from_secs(10));
        assert_eq!(config.messages_path(), "messages.json");
        assert!(config.validate().is_ok());

        let boards = config.board_table();
        assert!(boards.contains("Technical"));
        assert!(boards.clubs_of("Cultural").unwrap().contains("Music Club"));
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("CLUBDESK_TEST_ROSTER", "https://roster.example.com/export.csv");

        let toml_content = BASIC_TOML.replace(
            "https://sheets.example.com/roster.csv",
            "${CLUBDESK_TEST_ROSTER}",
        );
        let config = AppConfig::from_toml_str(&toml_content).unwrap();
        assert_eq!(config.sources.roster_url, "https://roster.example.com/export.csv");

        std::env::remove_var("CLUBDESK_TEST_ROSTER");
    }

    #[test]
    fn test_invalid_source_url_fails_validation() {
        let toml_content =
            BASIC_TOML.replace("https://sheets.example.com/responses.csv", "not-a-url");
        let config = AppConfig::from_toml_str(&toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_ttl_fails_validation() {
        let toml_content = BASIC_TOML.replace("ttl_seconds = 120", "ttl_seconds = 0");
        let config = AppConfig::from_toml_str(&toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_board_fails_validation() {
        let toml_content = BASIC_TOML.replace(
            r#"Technical = ["Coding Club ( Codessey)", "Esports Arena"]"#,
            r#"Technical = [""]"#,
        );
        let config = AppConfig::from_toml_str(&toml_content).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(BASIC_TOML.as_bytes()).unwrap();

        let config = AppConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.mail.from, "club-admin@example.edu");
    }
}
