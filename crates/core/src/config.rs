use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::ask::{Ask, TokenAmount};
use crate::domain::request::ClientId;
use crate::pricing::overrides::OverrideTable;

pub const CONFIG_PATH_ENV: &str = "RETRIEVAL_ASK_CONFIG";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub overrides: OverridesConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct OverridesConfig {
    /// Seed the table with the asks compiled into the binary.
    pub include_builtin: bool,
    /// Operator asks keyed by client peer id. These replace builtin entries.
    pub asks: BTreeMap<ClientId, Ask>,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
    pub include_builtin: Option<bool>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            overrides: OverridesConfig { include_builtin: true, asks: BTreeMap::new() },
            logging: LoggingConfig { level: "warn".to_string(), format: LogFormat::Compact },
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        let env_path = env_setting(CONFIG_PATH_ENV).map(PathBuf::from);
        let require_file = options.require_file || env_path.is_some();
        let explicit_path = options.config_path.or(env_path);

        if let Some(path) = resolve_config_path(explicit_path.as_deref()) {
            let patch = read_patch(&path)?;
            config.apply_patch(patch)?;
        } else if require_file {
            let expected =
                explicit_path.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATHS[0]));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    /// Materializes the table the pricing policy consults.
    pub fn override_table(&self) -> OverrideTable {
        let base = if self.overrides.include_builtin {
            OverrideTable::builtin()
        } else {
            OverrideTable::empty()
        };
        let configured: OverrideTable = self
            .overrides
            .asks
            .iter()
            .map(|(client, ask)| (client.clone(), ask.clone()))
            .collect();
        base.merge(configured)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) -> Result<(), ConfigError> {
        if let Some(overrides) = patch.overrides {
            if let Some(include_builtin) = overrides.include_builtin {
                self.overrides.include_builtin = include_builtin;
            }
        }

        if let Some(asks) = patch.asks {
            for (client, ask) in asks {
                let ask = ask.into_ask(&client)?;
                self.overrides.asks.insert(ClientId::new(client), ask);
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = env_setting("RETRIEVAL_ASK_OVERRIDES_INCLUDE_BUILTIN") {
            self.overrides.include_builtin =
                parse_flag("RETRIEVAL_ASK_OVERRIDES_INCLUDE_BUILTIN", &value)?;
        }

        let log_level = env_setting("RETRIEVAL_ASK_LOGGING_LEVEL")
            .or_else(|| env_setting("RETRIEVAL_ASK_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format = env_setting("RETRIEVAL_ASK_LOGGING_FORMAT")
            .or_else(|| env_setting("RETRIEVAL_ASK_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(log_format) = overrides.log_format {
            self.logging.format = log_format;
        }
        if let Some(include_builtin) = overrides.include_builtin {
            self.overrides.include_builtin = include_builtin;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_logging(&self.logging)
    }
}

/// Locations searched, in order, when no path is given.
const DEFAULT_CONFIG_PATHS: [&str; 2] = ["retrieval-ask.toml", "config/retrieval-ask.toml"];

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    match explicit_path {
        Some(path) => path.is_file().then(|| path.to_path_buf()),
        None => DEFAULT_CONFIG_PATHS.iter().map(PathBuf::from).find(|path| path.is_file()),
    }
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

/// Replaces each `${NAME}` with the value of the environment variable `NAME`.
fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(start) = rest.find("${") {
        output.push_str(&rest[..start]);
        let expression = &rest[start + 2..];
        let end = expression.find('}').ok_or(ConfigError::UnterminatedInterpolation)?;
        let var = &expression[..end];
        let value = env::var(var)
            .map_err(|_| ConfigError::MissingEnvInterpolation { var: var.to_string() })?;
        output.push_str(&value);
        rest = &expression[end + 1..];
    }

    output.push_str(rest);
    Ok(output)
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

/// Trimmed value of an environment setting. Blank values count as unset.
fn env_setting(key: &str) -> Option<String> {
    let value = env::var(key).ok()?;
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn parse_flag(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::InvalidEnvOverride {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    overrides: Option<OverridesPatch>,
    asks: Option<BTreeMap<String, AskPatch>>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct OverridesPatch {
    include_builtin: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct AskPatch {
    price_per_byte: Option<AmountPatch>,
    unseal_price: Option<AmountPatch>,
    payment_interval: Option<u64>,
    payment_interval_increase: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AmountPatch {
    Integer(u64),
    Text(String),
}

impl AmountPatch {
    fn into_amount(self, client: &str, field: &str) -> Result<TokenAmount, ConfigError> {
        match self {
            Self::Integer(value) => Ok(TokenAmount::from(value)),
            Self::Text(value) => value.trim().parse().map_err(|error| {
                ConfigError::Validation(format!("asks.\"{client}\".{field}: {error}"))
            }),
        }
    }
}

impl AskPatch {
    fn into_ask(self, client: &str) -> Result<Ask, ConfigError> {
        let price_per_byte = match self.price_per_byte {
            Some(amount) => amount.into_amount(client, "price_per_byte")?,
            None => TokenAmount::zero(),
        };
        let unseal_price = match self.unseal_price {
            Some(amount) => amount.into_amount(client, "unseal_price")?,
            None => TokenAmount::zero(),
        };

        Ok(Ask {
            price_per_byte,
            unseal_price,
            payment_interval: self.payment_interval.unwrap_or_default(),
            payment_interval_increase: self.payment_interval_increase.unwrap_or_default(),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}
