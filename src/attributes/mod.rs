//! Attribute destination filtering.
//!
//! Include and exclude patterns from configuration are compiled once into a
//! sorted rule list. Each attribute is then run through the rules to decide
//! which destinations (transaction events, transaction traces, errors,
//! browser payload) may receive it.

pub mod destinations;
pub mod filter;
pub mod rule;
pub mod shared;

pub use destinations::Destinations;
pub use filter::{AttributeFilter, AttributeFilterConfig, DestinationAttributesConfig};
pub use rule::AttributeFilterRule;
pub use shared::SharedAttributeFilter;
