#![allow(clippy::result_large_err)]

use std::path::Path;

use attribute_filter::attributes::{
    AttributeFilter, AttributeFilterConfig, Destinations, SharedAttributeFilter,
};
use attribute_filter::config::get_config;

fn filter_from_config_dir(dir: &Path) -> AttributeFilter {
    let config = get_config(dir).expect("should parse config");
    AttributeFilter::new(&AttributeFilterConfig::from(&config))
}

#[test]
fn test_yaml_and_env_drive_the_filter() {
    figment::Jail::expect_with(|jail| {
        jail.clear_env();
        jail.create_file(
            "datadog.yaml",
            r"
attributes:
  enabled: true
  exclude:
    - secret.*
transaction_tracer:
  attributes:
    enabled: true
    include:
      - secret.token
",
        )?;

        let filter = filter_from_config_dir(Path::new(""));

        let result = filter.apply("secret.token", Destinations::ALL);
        assert_eq!(result, Destinations::TRANSACTION_TRACER);
        assert!(filter.allows(result, Destinations::TRANSACTION_TRACER));
        assert!(!filter.allows(result, Destinations::TRANSACTION_EVENTS));
        assert_eq!(
            filter.apply("secret.other", Destinations::ALL),
            Destinations::NONE
        );
        assert_eq!(
            filter.apply("public", Destinations::ALL),
            Destinations::TRANSACTION_TRACER
        );
        Ok(())
    });
}

#[test]
fn test_env_master_switch_turns_everything_off() {
    figment::Jail::expect_with(|jail| {
        jail.clear_env();
        jail.create_file(
            "datadog.yaml",
            r"
attributes:
  enabled: true
  include:
    - '*'
transaction_events:
  attributes:
    enabled: true
",
        )?;
        jail.set_env("DD_ATTRIBUTES_ENABLED", "false");

        let filter = filter_from_config_dir(Path::new(""));

        assert_eq!(filter.apply("x", Destinations::ALL), Destinations::NONE);
        assert_eq!(filter.enabled_destinations(), Destinations::NONE);
        Ok(())
    });
}

#[test]
fn test_capture_flags_from_env() {
    figment::Jail::expect_with(|jail| {
        jail.clear_env();
        jail.set_env("DD_ATTRIBUTES_ENABLED", "true");
        jail.set_env("DD_TRANSACTION_TRACER_ATTRIBUTES_ENABLED", "true");
        jail.set_env("DD_SIDEKIQ_CAPTURE_PARAMS", "true");

        let filter = filter_from_config_dir(Path::new(""));

        assert!(!filter.might_allow_request_parameters());
        assert!(filter.might_allow_sidekiq_args());
        assert!(!filter.might_allow_resque_args());
        assert_eq!(
            filter.apply("job.sidekiq.args.0", Destinations::NONE),
            Destinations::TRANSACTION_TRACER
        );
        Ok(())
    });
}

#[test]
fn test_reload_swaps_in_a_new_filter() {
    figment::Jail::expect_with(|jail| {
        jail.clear_env();
        jail.set_env("DD_ATTRIBUTES_ENABLED", "true");
        jail.set_env("DD_TRANSACTION_EVENTS_ATTRIBUTES_ENABLED", "true");

        let config = get_config(Path::new("")).expect("should parse config");
        let shared = SharedAttributeFilter::new(&AttributeFilterConfig::from(&config));
        let before = shared.current();
        assert_eq!(
            before.apply("user.email", Destinations::ALL),
            Destinations::TRANSACTION_EVENTS
        );

        jail.set_env("DD_ATTRIBUTES_EXCLUDE", "user.*");
        let config = get_config(Path::new("")).expect("should parse config");
        shared.replace(&AttributeFilterConfig::from(&config));

        assert_eq!(
            shared.current().apply("user.email", Destinations::ALL),
            Destinations::NONE
        );
        assert_eq!(
            before.apply("user.email", Destinations::ALL),
            Destinations::TRANSACTION_EVENTS
        );
        Ok(())
    });
}
