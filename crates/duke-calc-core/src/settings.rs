//! Engine configuration

use crate::math::DEFAULT_DECIMAL_NUMBERS;
use chrono::{FixedOffset, Offset, Utc};

/// Engine-level settings
///
/// Settings are fixed for the duration of an evaluation; formulas read them
/// but never change them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EngineSettings {
    /// Decimal digits honoured by comparisons (`==`, `<`, `between`, ...)
    pub decimal_numbers: u32,
    /// Offset from UTC, in seconds, used for calendar functions
    pub utc_offset_seconds: i32,
}

impl EngineSettings {
    /// Settings bound to the given time zone
    pub fn with_time_zone(zone: FixedOffset) -> Self {
        Self {
            utc_offset_seconds: zone.local_minus_utc(),
            ..Self::default()
        }
    }

    /// Replace the comparison precision
    pub fn decimal_numbers(mut self, decimal_numbers: u32) -> Self {
        self.decimal_numbers = decimal_numbers;
        self
    }

    /// Time zone for calendar functions
    ///
    /// Offsets outside +/- 24h fall back to UTC.
    pub fn time_zone(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_seconds).unwrap_or_else(|| Utc.fix())
    }
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            decimal_numbers: DEFAULT_DECIMAL_NUMBERS,
            utc_offset_seconds: 0,
        }
    }
}
