use std::path::PathBuf;

use figment::{
    Figment,
    providers::{Format, Yaml},
};
use serde::Deserialize;

use crate::{
    config::{
        Config, ConfigError, ConfigSource, deserialize_optional_bool_from_anything,
        deserialize_optional_patterns, log_level::LogLevel,
    },
    merge_option_to_value,
};

/// `YamlConfig` is a struct that represents the attribute related fields in the
/// `datadog.yaml` file.
///
/// It is used to deserialize the `datadog.yaml` file into a struct that can be merged
/// with the `Config` struct.
#[derive(Debug, PartialEq, Deserialize, Clone, Default)]
#[serde(default)]
#[allow(clippy::module_name_repetitions)]
pub struct YamlConfig {
    pub log_level: Option<LogLevel>,

    pub attributes: AttributesConfig,
    pub transaction_events: DestinationConfig,
    pub transaction_tracer: DestinationConfig,
    pub error_collector: DestinationConfig,
    pub browser_monitoring: DestinationConfig,

    #[serde(deserialize_with = "deserialize_optional_bool_from_anything")]
    pub capture_params: Option<bool>,
    pub sidekiq: CaptureConfig,
    pub resque: CaptureConfig,
}

/// Attributes Config
///
/// Shared by the top level `attributes` section and each destination.
#[derive(Debug, PartialEq, Deserialize, Clone, Default)]
#[serde(default)]
#[allow(clippy::module_name_repetitions)]
pub struct AttributesConfig {
    #[serde(deserialize_with = "deserialize_optional_bool_from_anything")]
    pub enabled: Option<bool>,
    #[serde(deserialize_with = "deserialize_optional_patterns")]
    pub include: Option<Vec<String>>,
    #[serde(deserialize_with = "deserialize_optional_patterns")]
    pub exclude: Option<Vec<String>>,
}

#[derive(Debug, PartialEq, Deserialize, Clone, Default)]
#[serde(default)]
#[allow(clippy::module_name_repetitions)]
pub struct DestinationConfig {
    pub attributes: AttributesConfig,
}

#[derive(Debug, PartialEq, Deserialize, Clone, Copy, Default)]
#[serde(default)]
#[allow(clippy::module_name_repetitions)]
pub struct CaptureConfig {
    #[serde(deserialize_with = "deserialize_optional_bool_from_anything")]
    pub capture_params: Option<bool>,
}

fn merge_config(config: &mut Config, yaml_config: &YamlConfig) {
    merge_option_to_value!(config, yaml_config, log_level);

    // Attributes
    merge_option_to_value!(config, attributes_enabled, yaml_config.attributes, enabled);
    merge_option_to_value!(config, attributes_include, yaml_config.attributes, include);
    merge_option_to_value!(config, attributes_exclude, yaml_config.attributes, exclude);

    // Transaction events
    let events = &yaml_config.transaction_events.attributes;
    merge_option_to_value!(config, transaction_events_attributes_enabled, events, enabled);
    merge_option_to_value!(config, transaction_events_attributes_include, events, include);
    merge_option_to_value!(config, transaction_events_attributes_exclude, events, exclude);

    // Transaction tracer
    let tracer = &yaml_config.transaction_tracer.attributes;
    merge_option_to_value!(config, transaction_tracer_attributes_enabled, tracer, enabled);
    merge_option_to_value!(config, transaction_tracer_attributes_include, tracer, include);
    merge_option_to_value!(config, transaction_tracer_attributes_exclude, tracer, exclude);

    // Error collector
    let errors = &yaml_config.error_collector.attributes;
    merge_option_to_value!(config, error_collector_attributes_enabled, errors, enabled);
    merge_option_to_value!(config, error_collector_attributes_include, errors, include);
    merge_option_to_value!(config, error_collector_attributes_exclude, errors, exclude);

    // Browser monitoring
    let browser = &yaml_config.browser_monitoring.attributes;
    merge_option_to_value!(config, browser_monitoring_attributes_enabled, browser, enabled);
    merge_option_to_value!(config, browser_monitoring_attributes_include, browser, include);
    merge_option_to_value!(config, browser_monitoring_attributes_exclude, browser, exclude);

    // Parameter capture
    merge_option_to_value!(config, yaml_config, capture_params);
    merge_option_to_value!(config, sidekiq_capture_params, yaml_config.sidekiq, capture_params);
    merge_option_to_value!(config, resque_capture_params, yaml_config.resque, capture_params);
}

#[derive(Debug, PartialEq, Clone)]
#[allow(clippy::module_name_repetitions)]
pub struct YamlConfigSource {
    pub path: PathBuf,
}

impl ConfigSource for YamlConfigSource {
    fn load(&self, config: &mut Config) -> Result<(), ConfigError> {
        let figment = Figment::new().merge(Yaml::file(self.path.clone()));

        match figment.extract::<YamlConfig>() {
            Ok(yaml_config) => merge_config(config, &yaml_config),
            Err(e) => {
                return Err(ConfigError::ParseError(format!(
                    "Failed to parse config from yaml file: {e}"
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::result_large_err)]
mod tests {
    use std::path::Path;

    use figment::{
        Figment,
        providers::{Format, Yaml},
    };

    use super::{CaptureConfig, YamlConfig};
    use crate::config::{Config, get_config};
    use crate::config::log_level::LogLevel;

    #[test]
    fn test_all_yaml_fields() {
        figment::Jail::expect_with(|jail| {
            jail.clear_env();
            jail.create_file(
                "datadog.yaml",
                r"
log_level: info
attributes:
  enabled: true
  include:
    - request.headers.*
  exclude:
    - request.headers.cookie
transaction_events:
  attributes:
    enabled: true
    exclude:
      - user.*
transaction_tracer:
  attributes:
    enabled: true
    include:
      - user.id
error_collector:
  attributes:
    enabled: true
    exclude: http.url, http.referer
browser_monitoring:
  attributes:
    enabled: false
    include:
      - page.*
capture_params: true
sidekiq:
  capture_params: true
resque:
  capture_params: false
",
            )?;

            let config = get_config(Path::new("")).expect("should parse config");

            let expected = Config {
                log_level: LogLevel::Info,
                attributes_enabled: true,
                attributes_include: vec!["request.headers.*".to_string()],
                attributes_exclude: vec!["request.headers.cookie".to_string()],
                transaction_events_attributes_enabled: true,
                transaction_events_attributes_exclude: vec!["user.*".to_string()],
                transaction_tracer_attributes_enabled: true,
                transaction_tracer_attributes_include: vec!["user.id".to_string()],
                error_collector_attributes_enabled: true,
                error_collector_attributes_exclude: vec![
                    "http.url".to_string(),
                    "http.referer".to_string(),
                ],
                browser_monitoring_attributes_enabled: false,
                browser_monitoring_attributes_include: vec!["page.*".to_string()],
                capture_params: true,
                sidekiq_capture_params: true,
                resque_capture_params: false,
                ..Config::default()
            };
            assert_eq!(config, expected);
            Ok(())
        });
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        figment::Jail::expect_with(|jail| {
            jail.clear_env();
            jail.create_file(
                "datadog.yaml",
                r"
transaction_tracer:
  attributes:
    include: []
sidekiq:
  capture_params: sometimes
",
            )?;

            let config = get_config(Path::new("")).expect("should parse config");

            assert!(!config.attributes_enabled);
            assert!(!config.transaction_tracer_attributes_enabled);
            assert!(config.transaction_tracer_attributes_include.is_empty());
            assert!(!config.sidekiq_capture_params);
            Ok(())
        });
    }

    #[test]
    fn test_capture_sections_are_plain_values() {
        figment::Jail::expect_with(|jail| {
            jail.clear_env();
            jail.create_file(
                "datadog.yaml",
                r"
sidekiq:
  capture_params: 1
resque:
  capture_params: 'false'
",
            )?;

            let yaml_config: YamlConfig = Figment::new()
                .merge(Yaml::file("datadog.yaml"))
                .extract()?;

            let sidekiq = yaml_config.sidekiq;
            let resque = yaml_config.resque;
            assert_eq!(sidekiq, yaml_config.sidekiq);
            assert_eq!(sidekiq.capture_params, Some(true));
            assert_eq!(resque.capture_params, Some(false));
            assert_eq!(CaptureConfig::default().capture_params, None);
            Ok(())
        });
    }
}
