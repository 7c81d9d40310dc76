//! Channel parameter validation and rate conversions.
//!
//! Pure functions.  The conversions between pulses-per-second and interval
//! both use integer division, i.e. they round **down**, so they are not
//! inverses of each other:
//!
//! | pps | `pps_to_interval` | `interval_to_pps` of that |
//! |-----|-------------------|---------------------------|
//! | 10  | 100 ms            | 10                        |
//! | 3   | 333 ms            | 3                         |
//! | 300 | 3 ms              | 333                       |
//! | 600 | 1 ms              | 1000                      |

use crate::channel::{ChannelSpec, Label, LineId, PulseMode};
use crate::config::{DURATION_MAX_MS, DURATION_MIN_MS, INTERVAL_MAX_MS, INTERVAL_MIN_MS, PPS_MAX};
use crate::error::ConfigError;

/// Check an interval against `[INTERVAL_MIN_MS, INTERVAL_MAX_MS]`.
pub fn validate_interval(interval_ms: u32) -> Result<u32, ConfigError> {
    if (INTERVAL_MIN_MS..=INTERVAL_MAX_MS).contains(&interval_ms) {
        Ok(interval_ms)
    } else {
        Err(ConfigError::IntervalOutOfRange(interval_ms))
    }
}

/// Check a pulse duration against its bounds and against the interval.
pub fn validate_duration(duration_ms: u32, interval_ms: u32) -> Result<u32, ConfigError> {
    if !(DURATION_MIN_MS..=DURATION_MAX_MS).contains(&duration_ms) {
        return Err(ConfigError::DurationOutOfRange(duration_ms));
    }
    if duration_ms >= interval_ms {
        return Err(ConfigError::DurationNotLessThanInterval {
            duration_ms,
            interval_ms,
        });
    }
    Ok(duration_ms)
}

/// `floor(1000 / pps)`.  Accepts `pps` in `[1, PPS_MAX]`.
pub fn pps_to_interval(pps: u32) -> Result<u32, ConfigError> {
    if pps == 0 || pps > PPS_MAX {
        return Err(ConfigError::PpsOutOfRange(pps));
    }
    Ok(1000 / pps)
}

/// `floor(1000 / interval_ms)`; `0` for intervals longer than a second.
pub fn interval_to_pps(interval_ms: u32) -> u32 {
    1000u32.checked_div(interval_ms).unwrap_or(0)
}

/// Build a channel spec.  This is the only way to obtain a [`ChannelSpec`].
pub fn validate_channel(
    line: LineId,
    label: &str,
    interval_ms: u32,
    pulse_duration_ms: u32,
    mode: PulseMode,
    max_pulses: u32,
) -> Result<ChannelSpec, ConfigError> {
    let interval_ms = validate_interval(interval_ms)?;
    let pulse_duration_ms = validate_duration(pulse_duration_ms, interval_ms)?;
    let label = Label::try_from(label).map_err(|_| ConfigError::LabelTooLong)?;

    Ok(ChannelSpec {
        line,
        label,
        interval_ms,
        pulse_duration_ms,
        mode,
        max_pulses,
        derived_pps: interval_to_pps(interval_ms),
    })
}
