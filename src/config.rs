use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub listen: ListenConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub metadata: MetadataConfig,
    #[serde(default)]
    pub trivia: TriviaConfig,
    #[serde(default)]
    pub password_scheme: PasswordScheme,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ListenConfig {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default = "default_port")]
    pub port: String,
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            address: None,
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub sqlite: Option<SqliteConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SqliteConfig {
    pub filename: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MetadataConfig {
    #[serde(default = "default_metadata_baseurl")]
    pub baseurl: String,
    #[serde(default = "default_metadata_timeout")]
    pub timeout_secs: u64,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            baseurl: default_metadata_baseurl(),
            timeout_secs: default_metadata_timeout(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TriviaConfig {
    #[serde(default = "default_trivia_questions")]
    pub questions: usize,
}

impl Default for TriviaConfig {
    fn default() -> Self {
        Self {
            questions: default_trivia_questions(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PasswordScheme {
    /// Unsalted digest, compatible with databases from older deployments.
    #[default]
    Sha256,
    Bcrypt,
}

fn default_port() -> String {
    "5000".to_string()
}

fn default_metadata_baseurl() -> String {
    "https://v2.sg.media-imdb.com".to_string()
}

fn default_metadata_timeout() -> u64 {
    10
}

fn default_trivia_questions() -> usize {
    5
}

impl Config {
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadError(path.to_string(), e))?;

        let config: Config = serde_yaml::from_str(&content)
            .map_err(|e| ConfigError::ParseError(path.to_string(), e))?;

        Ok(config)
    }

    pub fn database_path(&self) -> String {
        match self.database.sqlite {
            Some(ref sqlite) => sqlite.filename.clone(),
            None => "cinelog.db".to_string(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {0}: {1}")]
    ReadError(String, std::io::Error),
    #[error("Failed to parse config file {0}: {1}")]
    ParseError(String, serde_yaml::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config: Config = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config.listen.port, "5000");
        assert_eq!(config.database_path(), "cinelog.db");
        assert_eq!(config.trivia.questions, 5);
        assert!(matches!(config.password_scheme, PasswordScheme::Sha256));
    }

    #[test]
    fn explicit_values_override_defaults() {
        let config: Config = serde_yaml::from_str(
            "listen:\n  port: \"8080\"\ndatabase:\n  sqlite:\n    filename: /tmp/test.db\npassword_scheme: bcrypt\n",
        )
        .unwrap();
        assert_eq!(config.listen.port, "8080");
        assert_eq!(config.database_path(), "/tmp/test.db");
        assert!(matches!(config.password_scheme, PasswordScheme::Bcrypt));
    }
}
