use std::sync::{Arc, RwLock};

use tracing::debug;

use crate::attributes::filter::{AttributeFilter, AttributeFilterConfig};

/// Process-wide handle to the current [`AttributeFilter`].
///
/// Readers take a cheap `Arc` clone and evaluate without holding the lock.
/// A configuration change builds a new filter and swaps it in; filters
/// already handed out keep working on the snapshot they were built from.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct SharedAttributeFilter {
    current: RwLock<Arc<AttributeFilter>>,
}

impl SharedAttributeFilter {
    #[must_use]
    pub fn new(config: &AttributeFilterConfig) -> Self {
        Self {
            current: RwLock::new(Arc::new(AttributeFilter::new(config))),
        }
    }

    #[must_use]
    pub fn current(&self) -> Arc<AttributeFilter> {
        match self.current.read() {
            Ok(guard) => Arc::clone(&guard),
            Err(poisoned) => Arc::clone(&poisoned.into_inner()),
        }
    }

    /// Builds a filter from `config` and publishes it to future readers.
    pub fn replace(&self, config: &AttributeFilterConfig) {
        let filter = Arc::new(AttributeFilter::new(config));
        let mut guard = match self.current.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *guard = filter;
        debug!("ATTRIBUTES | Replaced attribute filter");
    }
}

impl Default for SharedAttributeFilter {
    fn default() -> Self {
        Self::new(&AttributeFilterConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;
    use crate::attributes::destinations::Destinations;

    fn enabled_config() -> AttributeFilterConfig {
        let mut config = AttributeFilterConfig {
            attributes_enabled: true,
            ..Default::default()
        };
        config.transaction_events.enabled = true;
        config
    }

    #[test]
    fn test_replace_publishes_new_filter() {
        let shared = SharedAttributeFilter::default();
        let before = shared.current();
        assert_eq!(
            before.apply("foo", Destinations::ALL),
            Destinations::NONE
        );

        shared.replace(&enabled_config());

        let after = shared.current();
        assert_eq!(
            after.apply("foo", Destinations::ALL),
            Destinations::TRANSACTION_EVENTS
        );
        // Snapshots taken earlier are untouched.
        assert_eq!(
            before.apply("foo", Destinations::ALL),
            Destinations::NONE
        );
    }

    #[test]
    fn test_concurrent_readers() {
        let shared = Arc::new(SharedAttributeFilter::new(&enabled_config()));

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let shared = Arc::clone(&shared);
                thread::spawn(move || {
                    let filter = shared.current();
                    (0..100).all(|i| {
                        filter.apply(&format!("attr.{i}"), Destinations::ALL)
                            == Destinations::TRANSACTION_EVENTS
                    })
                })
            })
            .collect();

        for handle in handles {
            assert!(handle.join().expect("reader thread panicked"));
        }
    }
}
