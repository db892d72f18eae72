use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::logging::LogFormat;
use crate::models::Language;
use crate::sentences::LlmConfig;
use crate::services::DEFAULT_SENTENCES_COUNT;

pub const ENV_PREFIX: &str = "VOCABFORGE_";

const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_COMMAND_TIMEOUT_MS: u64 = 15_000;
const DEFAULT_LOG_LEVEL: &str = "debug";
const DATABASE_FILE: &str = "vocabforge.db";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: `{value}`")]
    Invalid { key: String, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogConfig {
    pub level: String,
    pub format: LogFormat,
    /// Daily rolling log files are written here when set.
    pub dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub database_path: PathBuf,
    pub connect_timeout: Duration,
    pub command_timeout: Duration,
    pub log: LogConfig,
    pub language: Language,
    pub sentences_count: usize,
    pub llm: LlmConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            connect_timeout: Duration::from_millis(DEFAULT_CONNECT_TIMEOUT_MS),
            command_timeout: Duration::from_millis(DEFAULT_COMMAND_TIMEOUT_MS),
            log: LogConfig {
                level: DEFAULT_LOG_LEVEL.to_string(),
                format: LogFormat::Text,
                dir: None,
            },
            language: Language::default(),
            sentences_count: DEFAULT_SENTENCES_COUNT,
            llm: LlmConfig::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from defaults overridden by `VOCABFORGE_*` values
    /// returned by `lookup`. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = EnvReader { lookup };
        let defaults = Self::default();

        Ok(Self {
            database_path: env
                .string("DATABASE_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.database_path),
            connect_timeout: env
                .millis("CONNECT_TIMEOUT_MS")?
                .unwrap_or(defaults.connect_timeout),
            command_timeout: env
                .millis("COMMAND_TIMEOUT_MS")?
                .unwrap_or(defaults.command_timeout),
            log: LogConfig {
                level: env.string("LOG_LEVEL").unwrap_or(defaults.log.level),
                format: env.parse("LOG_FORMAT", LogFormat::parse)?.unwrap_or(defaults.log.format),
                dir: env.string("LOG_DIR").map(PathBuf::from),
            },
            language: env
                .parse("LANGUAGE", |v| Language::parse(v).ok())?
                .unwrap_or(defaults.language),
            sentences_count: env
                .parse("SENTENCES_COUNT", |v| v.parse::<usize>().ok().filter(|n| *n > 0))?
                .unwrap_or(defaults.sentences_count),
            llm: LlmConfig {
                api_key: env.string("LLM_API_KEY"),
                model: env.string("LLM_MODEL").unwrap_or(defaults.llm.model),
                api_endpoint: env
                    .string("LLM_API_ENDPOINT")
                    .unwrap_or(defaults.llm.api_endpoint),
                timeout: env.millis("LLM_TIMEOUT_MS")?.unwrap_or(defaults.llm.timeout),
            },
        })
    }
}

struct EnvReader<F> {
    lookup: F,
}

impl<F> EnvReader<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn string(&self, key: &str) -> Option<String> {
        (self.lookup)(&format!("{ENV_PREFIX}{key}"))
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn parse<T>(&self, key: &str, parse: impl Fn(&str) -> Option<T>) -> Result<Option<T>, ConfigError> {
        match self.string(key) {
            None => Ok(None),
            Some(value) => parse(&value).map(Some).ok_or_else(|| ConfigError::Invalid {
                key: format!("{ENV_PREFIX}{key}"),
                value,
            }),
        }
    }

    fn millis(&self, key: &str) -> Result<Option<Duration>, ConfigError> {
        self.parse(key, |v| v.parse::<u64>().ok().map(Duration::from_millis))
    }
}

fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("vocabforge")
        .join(DATABASE_FILE)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_without_env() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.connect_timeout, Duration::from_secs(5));
        assert_eq!(config.command_timeout, Duration::from_secs(15));
        assert_eq!(config.log.level, "debug");
        assert_eq!(config.language.as_str(), "en_US");
        assert_eq!(config.sentences_count, 16);
        assert!(config.database_path.ends_with("vocabforge/vocabforge.db"));
    }

    #[test]
    fn test_env_overrides_defaults() {
        let config = Config::from_lookup(lookup(&[
            ("VOCABFORGE_DATABASE_PATH", "/tmp/words.db"),
            ("VOCABFORGE_COMMAND_TIMEOUT_MS", "2500"),
            ("VOCABFORGE_LOG_FORMAT", "json"),
            ("VOCABFORGE_LANGUAGE", "en_GB"),
            ("VOCABFORGE_SENTENCES_COUNT", "4"),
            ("VOCABFORGE_LLM_API_KEY", "sk-test"),
            ("VOCABFORGE_LLM_MODEL", " "),
        ]))
        .unwrap();

        assert_eq!(config.database_path, PathBuf::from("/tmp/words.db"));
        assert_eq!(config.command_timeout, Duration::from_millis(2500));
        assert_eq!(config.log.format, LogFormat::Json);
        assert_eq!(config.language.as_str(), "en_GB");
        assert_eq!(config.sentences_count, 4);
        assert_eq!(config.llm.api_key.as_deref(), Some("sk-test"));
        assert_eq!(config.llm.model, "gpt-4o-mini");
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = Config::from_lookup(lookup(&[("VOCABFORGE_SENTENCES_COUNT", "0")])).unwrap_err();
        assert_eq!(
            err,
            ConfigError::Invalid {
                key: "VOCABFORGE_SENTENCES_COUNT".to_string(),
                value: "0".to_string()
            }
        );

        assert!(Config::from_lookup(lookup(&[("VOCABFORGE_LOG_FORMAT", "xml")])).is_err());
        assert!(Config::from_lookup(lookup(&[("VOCABFORGE_CONNECT_TIMEOUT_MS", "soon")])).is_err());
    }
}
