use std::fmt;
use std::ops::{BitAnd, BitAndAssign, BitOr, BitOrAssign, Not};

/// Set of reporting destinations an attribute may be sent to.
///
/// Stored as a bitmask so rule application is plain `|` and `&` arithmetic.
#[derive(Clone, Default, PartialEq, Eq, Copy, Hash)]
pub struct Destinations(u8);

impl Destinations {
    pub const NONE: Destinations = Destinations(0x00);
    pub const TRANSACTION_EVENTS: Destinations = Destinations(1 << 0);
    pub const TRANSACTION_TRACER: Destinations = Destinations(1 << 1);
    pub const ERROR_COLLECTOR: Destinations = Destinations(1 << 2);
    pub const BROWSER_MONITORING: Destinations = Destinations(1 << 3);
    pub const ALL: Destinations = Destinations(
        Self::TRANSACTION_EVENTS.0
            | Self::TRANSACTION_TRACER.0
            | Self::ERROR_COLLECTOR.0
            | Self::BROWSER_MONITORING.0,
    );

    const NAMES: [(Destinations, &'static str); 4] = [
        (Self::TRANSACTION_EVENTS, "transaction_events"),
        (Self::TRANSACTION_TRACER, "transaction_tracer"),
        (Self::ERROR_COLLECTOR, "error_collector"),
        (Self::BROWSER_MONITORING, "browser_monitoring"),
    ];

    /// Builds a set from raw bits, discarding anything outside `ALL`.
    #[must_use]
    pub const fn from_bits_truncate(bits: u8) -> Self {
        Destinations(bits & Self::ALL.0)
    }

    #[must_use]
    pub const fn bits(self) -> u8 {
        self.0
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == Self::NONE.0
    }

    /// Returns `true` if every destination in `other` is also in `self`.
    #[must_use]
    pub const fn contains(self, other: Destinations) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitAnd for Destinations {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        Self(self.0 & rhs.0)
    }
}

impl BitAndAssign for Destinations {
    fn bitand_assign(&mut self, rhs: Self) {
        self.0 &= rhs.0;
    }
}

impl BitOr for Destinations {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for Destinations {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl Not for Destinations {
    type Output = Self;

    fn not(self) -> Self::Output {
        Self(!self.0 & Self::ALL.0)
    }
}

impl fmt::Display for Destinations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "none");
        }
        let mut first = true;
        for (flag, name) in Self::NAMES {
            if self.contains(flag) {
                if !first {
                    write!(f, "|")?;
                }
                write!(f, "{name}")?;
                first = false;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Destinations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Destinations({self})")
    }
}
