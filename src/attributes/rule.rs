use std::cmp::Ordering;

use crate::attributes::destinations::Destinations;

const WILDCARD: char = '*';

/// A single normalized include or exclude entry.
///
/// Exclude rules store the complement of the destinations they remove, so
/// applying any rule is either `|=` (include) or `&=` (exclude).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct AttributeFilterRule {
    pattern: String,
    wildcard: bool,
    destinations: Destinations,
    is_include: bool,
}

impl AttributeFilterRule {
    #[must_use]
    pub fn new(pattern: &str, destinations: Destinations, is_include: bool) -> Self {
        let (pattern, wildcard) = match pattern.strip_suffix(WILDCARD) {
            Some(prefix) => (prefix, true),
            None => (pattern, false),
        };

        Self {
            pattern: pattern.to_string(),
            wildcard,
            destinations: if is_include {
                destinations
            } else {
                !destinations
            },
            is_include,
        }
    }

    /// The pattern with any trailing wildcard removed.
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    #[must_use]
    pub fn is_wildcard(&self) -> bool {
        self.wildcard
    }

    /// Destinations added by an include rule, or kept by an exclude rule.
    #[must_use]
    pub fn destinations(&self) -> Destinations {
        self.destinations
    }

    #[must_use]
    pub fn is_include(&self) -> bool {
        self.is_include
    }

    /// Returns `true` if applying this rule could never change a result.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        if self.is_include {
            self.destinations == Destinations::NONE
        } else {
            self.destinations == Destinations::ALL
        }
    }

    #[must_use]
    pub fn matches(&self, name: &str) -> bool {
        if self.wildcard {
            name.starts_with(self.pattern.as_str())
        } else {
            self.pattern == name
        }
    }

    #[inline]
    pub(crate) fn apply(&self, destinations: Destinations) -> Destinations {
        if self.is_include {
            destinations | self.destinations
        } else {
            destinations & self.destinations
        }
    }
}

impl Ord for AttributeFilterRule {
    // Least specific first. Wildcards sort before exact matches of the same
    // pattern, and includes before excludes, so later rules win.
    fn cmp(&self, other: &Self) -> Ordering {
        self.pattern
            .cmp(&other.pattern)
            .then_with(|| other.wildcard.cmp(&self.wildcard))
            .then_with(|| other.is_include.cmp(&self.is_include))
            .then_with(|| self.destinations.bits().cmp(&other.destinations.bits()))
    }
}

impl PartialOrd for AttributeFilterRule {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
