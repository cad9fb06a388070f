use tracing::debug;

use crate::attributes::destinations::Destinations;
use crate::attributes::rule::AttributeFilterRule;

pub const REQUEST_PARAMETERS_PREFIX: &str = "request.parameters";
pub const SIDEKIQ_ARGS_PREFIX: &str = "job.sidekiq.args";
pub const RESQUE_ARGS_PREFIX: &str = "job.resque.args";

/// Attribute settings for a single destination.
#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct DestinationAttributesConfig {
    pub enabled: bool,
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

/// Everything needed to build an [`AttributeFilter`].
///
/// Missing settings are `false` or empty.
#[derive(Debug, PartialEq, Eq, Clone, Default)]
#[allow(clippy::module_name_repetitions)]
#[allow(clippy::struct_excessive_bools)]
pub struct AttributeFilterConfig {
    pub attributes_enabled: bool,
    pub attributes_include: Vec<String>,
    pub attributes_exclude: Vec<String>,
    pub transaction_events: DestinationAttributesConfig,
    pub transaction_tracer: DestinationAttributesConfig,
    pub error_collector: DestinationAttributesConfig,
    pub browser_monitoring: DestinationAttributesConfig,
    pub capture_params: bool,
    pub sidekiq_capture_params: bool,
    pub resque_capture_params: bool,
}

impl AttributeFilterConfig {
    fn per_destination(&self) -> [(&DestinationAttributesConfig, Destinations); 4] {
        [
            (&self.transaction_events, Destinations::TRANSACTION_EVENTS),
            (&self.transaction_tracer, Destinations::TRANSACTION_TRACER),
            (&self.error_collector, Destinations::ERROR_COLLECTOR),
            (&self.browser_monitoring, Destinations::BROWSER_MONITORING),
        ]
    }
}

/// Destinations granted to a captured attribute group when capture is on.
#[must_use]
pub fn destinations_for_capture_params(capturing: bool) -> Destinations {
    if capturing {
        Destinations::TRANSACTION_TRACER | Destinations::ERROR_COLLECTOR
    } else {
        Destinations::NONE
    }
}

/// Decides which destinations may receive each attribute.
///
/// Built once per configuration snapshot and never mutated afterwards; a new
/// configuration means a new filter.
#[derive(Debug, Clone)]
#[allow(clippy::module_name_repetitions)]
pub struct AttributeFilter {
    enabled_destinations: Destinations,
    rules: Box<[AttributeFilterRule]>,
    could_allow_request_parameters: bool,
    could_allow_sidekiq_args: bool,
    could_allow_resque_args: bool,
}

impl AttributeFilter {
    #[must_use]
    pub fn new(config: &AttributeFilterConfig) -> Self {
        let mut builder = RuleBuilder::default();

        builder.add_all(&config.attributes_exclude, Destinations::ALL, false);
        for (dest_config, destination) in config.per_destination() {
            builder.add_all(&dest_config.exclude, destination, false);
        }

        builder.add(
            &format!("{REQUEST_PARAMETERS_PREFIX}.*"),
            destinations_for_capture_params(config.capture_params),
            true,
        );
        builder.add(
            &format!("{SIDEKIQ_ARGS_PREFIX}.*"),
            destinations_for_capture_params(config.sidekiq_capture_params),
            true,
        );
        builder.add(
            &format!("{RESQUE_ARGS_PREFIX}.*"),
            destinations_for_capture_params(config.resque_capture_params),
            true,
        );

        builder.add_all(&config.attributes_include, Destinations::ALL, true);
        for (dest_config, destination) in config.per_destination() {
            builder.add_all(&dest_config.include, destination, true);
        }

        let rules = builder.build();
        let enabled_destinations = enabled_destinations(config);

        let filter = Self {
            could_allow_request_parameters: might_allow_prefix(&rules, REQUEST_PARAMETERS_PREFIX),
            could_allow_sidekiq_args: might_allow_prefix(&rules, SIDEKIQ_ARGS_PREFIX),
            could_allow_resque_args: might_allow_prefix(&rules, RESQUE_ARGS_PREFIX),
            enabled_destinations,
            rules,
        };

        debug!(
            "ATTRIBUTES | Compiled {} filter rules, enabled destinations: {}",
            filter.rules.len(),
            filter.enabled_destinations
        );

        filter
    }

    /// Returns the destinations `name` should be sent to, starting from
    /// `default_destinations`.
    #[must_use]
    pub fn apply(&self, name: &str, default_destinations: Destinations) -> Destinations {
        if self.enabled_destinations.is_empty() {
            return Destinations::NONE;
        }

        let destinations = self
            .rules
            .iter()
            .filter(|rule| rule.matches(name))
            .fold(default_destinations, |acc, rule| rule.apply(acc));

        destinations & self.enabled_destinations
    }

    /// Returns `true` if every destination in `requested` is in `allowed`.
    #[must_use]
    pub fn allows(&self, allowed: Destinations, requested: Destinations) -> bool {
        allowed.contains(requested)
    }

    /// Conservative check for whether any include rule could let an attribute
    /// named under `prefix` through.
    #[must_use]
    pub fn might_allow_prefix(&self, prefix: &str) -> bool {
        might_allow_prefix(&self.rules, prefix)
    }

    #[must_use]
    pub fn might_allow_request_parameters(&self) -> bool {
        self.could_allow_request_parameters
    }

    #[must_use]
    pub fn might_allow_sidekiq_args(&self) -> bool {
        self.could_allow_sidekiq_args
    }

    #[must_use]
    pub fn might_allow_resque_args(&self) -> bool {
        self.could_allow_resque_args
    }

    /// Compiled rules, least specific first.
    #[must_use]
    pub fn rules(&self) -> &[AttributeFilterRule] {
        &self.rules
    }

    #[must_use]
    pub fn enabled_destinations(&self) -> Destinations {
        self.enabled_destinations
    }
}

impl Default for AttributeFilter {
    fn default() -> Self {
        Self::new(&AttributeFilterConfig::default())
    }
}

fn enabled_destinations(config: &AttributeFilterConfig) -> Destinations {
    if !config.attributes_enabled {
        return Destinations::NONE;
    }

    config
        .per_destination()
        .into_iter()
        .filter(|(dest_config, _)| dest_config.enabled)
        .fold(Destinations::NONE, |acc, (_, destination)| acc | destination)
}

fn might_allow_prefix(rules: &[AttributeFilterRule], prefix: &str) -> bool {
    rules.iter().filter(|rule| rule.is_include()).any(|rule| {
        let pattern = rule.pattern();
        if rule.is_wildcard() {
            if pattern.len() > prefix.len() {
                pattern.starts_with(prefix)
            } else {
                prefix.starts_with(pattern)
            }
        } else {
            pattern.starts_with(prefix)
        }
    })
}

#[derive(Default)]
struct RuleBuilder {
    rules: Vec<AttributeFilterRule>,
}

impl RuleBuilder {
    fn add(&mut self, pattern: &str, destinations: Destinations, is_include: bool) {
        let rule = AttributeFilterRule::new(pattern, destinations, is_include);
        if !rule.is_empty() {
            self.rules.push(rule);
        }
    }

    fn add_all(&mut self, patterns: &[String], destinations: Destinations, is_include: bool) {
        for pattern in patterns {
            self.add(pattern, destinations, is_include);
        }
    }

    fn build(mut self) -> Box<[AttributeFilterRule]> {
        self.rules.sort();
        self.rules.into_boxed_slice()
    }
}
