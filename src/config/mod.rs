pub mod env;
pub mod log_level;
pub mod yaml;

use std::path::Path;

use serde::{Deserialize, Deserializer};
use serde_aux::field_attributes::deserialize_bool_from_anything;
use serde_json::Value;
use tracing::error;

use crate::attributes::{AttributeFilterConfig, DestinationAttributesConfig};
use crate::config::{env::EnvConfigSource, log_level::LogLevel, yaml::YamlConfigSource};

#[derive(Debug, PartialEq, thiserror::Error)]
#[allow(clippy::module_name_repetitions)]
pub enum ConfigError {
    #[error("{0}")]
    ParseError(String),
}

/// A place configuration can be read from. Sources only override the fields
/// they actually define.
#[allow(clippy::module_name_repetitions)]
pub trait ConfigSource {
    fn load(&self, config: &mut Config) -> Result<(), ConfigError>;
}

#[derive(Debug, PartialEq, Clone, Default)]
#[allow(clippy::struct_excessive_bools)]
pub struct Config {
    pub log_level: LogLevel,

    // Attributes
    pub attributes_enabled: bool,
    pub attributes_include: Vec<String>,
    pub attributes_exclude: Vec<String>,

    // Per destination
    pub transaction_events_attributes_enabled: bool,
    pub transaction_events_attributes_include: Vec<String>,
    pub transaction_events_attributes_exclude: Vec<String>,
    pub transaction_tracer_attributes_enabled: bool,
    pub transaction_tracer_attributes_include: Vec<String>,
    pub transaction_tracer_attributes_exclude: Vec<String>,
    pub error_collector_attributes_enabled: bool,
    pub error_collector_attributes_include: Vec<String>,
    pub error_collector_attributes_exclude: Vec<String>,
    pub browser_monitoring_attributes_enabled: bool,
    pub browser_monitoring_attributes_include: Vec<String>,
    pub browser_monitoring_attributes_exclude: Vec<String>,

    // Parameter capture
    pub capture_params: bool,
    pub sidekiq_capture_params: bool,
    pub resque_capture_params: bool,
}

impl From<&Config> for AttributeFilterConfig {
    fn from(config: &Config) -> Self {
        AttributeFilterConfig {
            attributes_enabled: config.attributes_enabled,
            attributes_include: config.attributes_include.clone(),
            attributes_exclude: config.attributes_exclude.clone(),
            transaction_events: DestinationAttributesConfig {
                enabled: config.transaction_events_attributes_enabled,
                include: config.transaction_events_attributes_include.clone(),
                exclude: config.transaction_events_attributes_exclude.clone(),
            },
            transaction_tracer: DestinationAttributesConfig {
                enabled: config.transaction_tracer_attributes_enabled,
                include: config.transaction_tracer_attributes_include.clone(),
                exclude: config.transaction_tracer_attributes_exclude.clone(),
            },
            error_collector: DestinationAttributesConfig {
                enabled: config.error_collector_attributes_enabled,
                include: config.error_collector_attributes_include.clone(),
                exclude: config.error_collector_attributes_exclude.clone(),
            },
            browser_monitoring: DestinationAttributesConfig {
                enabled: config.browser_monitoring_attributes_enabled,
                include: config.browser_monitoring_attributes_include.clone(),
                exclude: config.browser_monitoring_attributes_exclude.clone(),
            },
            capture_params: config.capture_params,
            sidekiq_capture_params: config.sidekiq_capture_params,
            resque_capture_params: config.resque_capture_params,
        }
    }
}

/// Overrides a `Config` field when the source defines a value for it.
#[macro_export]
macro_rules! merge_option_to_value {
    ($config:expr, $source:expr, $field:ident) => {
        if let Some(value) = &$source.$field {
            $config.$field.clone_from(value);
        }
    };
    ($config:expr, $config_field:ident, $source:expr, $source_field:ident) => {
        if let Some(value) = &$source.$source_field {
            $config.$config_field.clone_from(value);
        }
    };
}

/// Loads configuration from `datadog.yaml` in `config_directory`, then from
/// `DATADOG_` and `DD_` prefixed environment variables. Environment wins.
#[allow(clippy::module_name_repetitions)]
pub fn get_config(config_directory: &Path) -> Result<Config, ConfigError> {
    let path = config_directory.join("datadog.yaml");
    let sources: Vec<Box<dyn ConfigSource>> = vec![
        Box::new(YamlConfigSource { path }),
        Box::new(EnvConfigSource),
    ];

    let mut config = Config::default();
    for source in sources {
        source.load(&mut config)?;
    }

    Ok(config)
}

/// Lenient boolean parsing: accepts booleans, numbers and strings such as
/// `"true"` or `"1"`. Anything else is logged and treated as unset.
pub fn deserialize_optional_bool_from_anything<'de, D>(
    deserializer: D,
) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }

    match deserialize_bool_from_anything(value) {
        Ok(b) => Ok(Some(b)),
        Err(e) => {
            error!("Failed to parse boolean: {}, ignoring", e);
            Ok(None)
        }
    }
}

/// Pattern lists come either as a sequence or as a comma separated string.
///
/// Environment values are typed before they reach us, so a numeric or
/// boolean pattern such as `12345` is kept as its string form.
pub fn deserialize_optional_patterns<'de, D>(
    deserializer: D,
) -> Result<Option<Vec<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;

    match value {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(
            s.split(',')
                .map(str::trim)
                .filter(|pattern| !pattern.is_empty())
                .map(String::from)
                .collect(),
        )),
        Value::Array(values) => {
            let mut patterns = Vec::with_capacity(values.len());
            for v in values {
                match pattern_from_value(v) {
                    Ok(Some(pattern)) => patterns.push(pattern),
                    Ok(None) => {}
                    Err(other) => {
                        error!("Failed to parse attribute pattern: {:?}, ignoring", other);
                    }
                }
            }
            Ok(Some(patterns))
        }
        scalar @ (Value::Number(_) | Value::Bool(_)) => match pattern_from_value(scalar) {
            Ok(pattern) => Ok(Some(pattern.into_iter().collect())),
            Err(other) => {
                error!("Failed to parse attribute pattern: {:?}, ignoring", other);
                Ok(None)
            }
        },
        other @ Value::Object(_) => {
            error!("Expected a list of attribute patterns, got {:?}, ignoring", other);
            Ok(None)
        }
    }
}

/// A single scalar pattern. Blank strings yield `None`; non scalars are
/// handed back as the error.
fn pattern_from_value(value: Value) -> Result<Option<String>, Value> {
    let pattern = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => return Err(other),
    };

    if pattern.is_empty() {
        Ok(None)
    } else {
        Ok(Some(pattern))
    }
}
