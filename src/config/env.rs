use figment::{Figment, providers::Env};
use serde::Deserialize;

use crate::{
    config::{
        Config, ConfigError, ConfigSource, deserialize_optional_bool_from_anything,
        deserialize_optional_patterns, log_level::LogLevel,
    },
    merge_option_to_value,
};

/// Flat view of the `DD_` prefixed environment. The long `DATADOG_` prefix
/// is read too; `DD_` wins when both are set.
#[derive(Debug, PartialEq, Deserialize, Clone, Default)]
#[serde(default)]
#[allow(clippy::module_name_repetitions)]
pub struct EnvConfig {
    pub log_level: Option<LogLevel>,

    // Attributes
    #[serde(deserialize_with = "deserialize_optional_bool_from_anything")]
    pub attributes_enabled: Option<bool>,
    #[serde(deserialize_with = "deserialize_optional_patterns")]
    pub attributes_include: Option<Vec<String>>,
    #[serde(deserialize_with = "deserialize_optional_patterns")]
    pub attributes_exclude: Option<Vec<String>>,

    // Transaction events
    #[serde(deserialize_with = "deserialize_optional_bool_from_anything")]
    pub transaction_events_attributes_enabled: Option<bool>,
    #[serde(deserialize_with = "deserialize_optional_patterns")]
    pub transaction_events_attributes_include: Option<Vec<String>>,
    #[serde(deserialize_with = "deserialize_optional_patterns")]
    pub transaction_events_attributes_exclude: Option<Vec<String>>,

    // Transaction tracer
    #[serde(deserialize_with = "deserialize_optional_bool_from_anything")]
    pub transaction_tracer_attributes_enabled: Option<bool>,
    #[serde(deserialize_with = "deserialize_optional_patterns")]
    pub transaction_tracer_attributes_include: Option<Vec<String>>,
    #[serde(deserialize_with = "deserialize_optional_patterns")]
    pub transaction_tracer_attributes_exclude: Option<Vec<String>>,

    // Error collector
    #[serde(deserialize_with = "deserialize_optional_bool_from_anything")]
    pub error_collector_attributes_enabled: Option<bool>,
    #[serde(deserialize_with = "deserialize_optional_patterns")]
    pub error_collector_attributes_include: Option<Vec<String>>,
    #[serde(deserialize_with = "deserialize_optional_patterns")]
    pub error_collector_attributes_exclude: Option<Vec<String>>,

    // Browser monitoring
    #[serde(deserialize_with = "deserialize_optional_bool_from_anything")]
    pub browser_monitoring_attributes_enabled: Option<bool>,
    #[serde(deserialize_with = "deserialize_optional_patterns")]
    pub browser_monitoring_attributes_include: Option<Vec<String>>,
    #[serde(deserialize_with = "deserialize_optional_patterns")]
    pub browser_monitoring_attributes_exclude: Option<Vec<String>>,

    // Parameter capture
    #[serde(deserialize_with = "deserialize_optional_bool_from_anything")]
    pub capture_params: Option<bool>,
    #[serde(deserialize_with = "deserialize_optional_bool_from_anything")]
    pub sidekiq_capture_params: Option<bool>,
    #[serde(deserialize_with = "deserialize_optional_bool_from_anything")]
    pub resque_capture_params: Option<bool>,
}

fn merge_config(config: &mut Config, env_config: &EnvConfig) {
    merge_option_to_value!(config, env_config, log_level);

    // Attributes
    merge_option_to_value!(config, env_config, attributes_enabled);
    merge_option_to_value!(config, env_config, attributes_include);
    merge_option_to_value!(config, env_config, attributes_exclude);

    // Per destination
    merge_option_to_value!(config, env_config, transaction_events_attributes_enabled);
    merge_option_to_value!(config, env_config, transaction_events_attributes_include);
    merge_option_to_value!(config, env_config, transaction_events_attributes_exclude);
    merge_option_to_value!(config, env_config, transaction_tracer_attributes_enabled);
    merge_option_to_value!(config, env_config, transaction_tracer_attributes_include);
    merge_option_to_value!(config, env_config, transaction_tracer_attributes_exclude);
    merge_option_to_value!(config, env_config, error_collector_attributes_enabled);
    merge_option_to_value!(config, env_config, error_collector_attributes_include);
    merge_option_to_value!(config, env_config, error_collector_attributes_exclude);
    merge_option_to_value!(config, env_config, browser_monitoring_attributes_enabled);
    merge_option_to_value!(config, env_config, browser_monitoring_attributes_include);
    merge_option_to_value!(config, env_config, browser_monitoring_attributes_exclude);

    // Parameter capture
    merge_option_to_value!(config, env_config, capture_params);
    merge_option_to_value!(config, env_config, sidekiq_capture_params);
    merge_option_to_value!(config, env_config, resque_capture_params);
}

#[derive(Debug, PartialEq, Clone, Copy)]
#[allow(clippy::module_name_repetitions)]
pub struct EnvConfigSource;

impl ConfigSource for EnvConfigSource {
    fn load(&self, config: &mut Config) -> Result<(), ConfigError> {
        let figment = Figment::new()
            .merge(Env::prefixed("DATADOG_"))
            .merge(Env::prefixed("DD_"));

        match figment.extract::<EnvConfig>() {
            Ok(env_config) => merge_config(config, &env_config),
            Err(e) => {
                return Err(ConfigError::ParseError(format!(
                    "Failed to parse config from environment variables: {e}"
                )));
            }
        }

        Ok(())
    }
}
