//! Display formatting for time deltas.
//!
//! Turns a [`TimeDelta`] into zero-padded display strings. Padding operates
//! on the first digit run of the rendered value, so sign prefixes and
//! fractional suffixes survive: `-1` padded to 3 becomes `-001`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::delta::TimeDelta;

/// Options for [`format_time_delta`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatOptions {
    /// Fold days into the hours field and suppress the days string.
    pub days_in_hours: bool,
    /// Pad width for hours, minutes and seconds. Minutes and seconds are
    /// capped at width 2. 0 disables padding.
    pub zero_pad_time: usize,
    /// Pad width for the days field; falls back to `zero_pad_time`.
    pub zero_pad_days: Option<usize>,
}

impl Default for FormatOptions {
    fn default() -> Self {
        Self {
            days_in_hours: false,
            zero_pad_time: 2,
            zero_pad_days: None,
        }
    }
}

/// Zero-padded display form of a time delta.
///
/// `days` is empty when the delta was formatted with `days_in_hours`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormattedTimeDelta {
    pub days: String,
    pub hours: String,
    pub minutes: String,
    pub seconds: String,
}

impl fmt::Display for FormattedTimeDelta {
    /// The default renderer output: `[days:]hours:minutes:seconds`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.days.is_empty() {
            write!(f, "{}:", self.days)?;
        }
        write!(f, "{}:{}:{}", self.hours, self.minutes, self.seconds)
    }
}

/// Left-pad the first digit run of a value with zeros.
///
/// Any non-digit prefix (a sign, for instance) and suffix around the digit
/// run are preserved. A value without digits is padded as a whole. Width 0
/// returns the rendered value unchanged.
pub fn zero_pad(value: impl fmt::Display, length: usize) -> String {
    let raw = value.to_string();
    if length == 0 {
        return raw;
    }

    let bytes = raw.as_bytes();
    let Some(start) = bytes.iter().position(|b| b.is_ascii_digit()) else {
        return pad_run(&raw, length);
    };
    let end = bytes[start..]
        .iter()
        .position(|b| !b.is_ascii_digit())
        .map_or(bytes.len(), |i| start + i);

    let (prefix, rest) = raw.split_at(start);
    let (digits, suffix) = rest.split_at(end - start);
    format!("{prefix}{}{suffix}", pad_run(digits, length))
}

fn pad_run(run: &str, length: usize) -> String {
    let width = run.chars().count();
    if width >= length {
        run.to_string()
    } else {
        let mut padded = "0".repeat(length - width);
        padded.push_str(run);
        padded
    }
}

/// Format a time delta into zero-padded display strings.
pub fn format_time_delta(delta: &TimeDelta, options: &FormatOptions) -> FormattedTimeDelta {
    let zero_pad_days = options.zero_pad_days.unwrap_or(options.zero_pad_time);
    let time_length = options.zero_pad_time.min(2);

    let hours = if options.days_in_hours {
        zero_pad(delta.hours + delta.days * 24, options.zero_pad_time)
    } else {
        zero_pad(delta.hours, time_length)
    };

    FormattedTimeDelta {
        days: if options.days_in_hours {
            String::new()
        } else {
            zero_pad(delta.days, zero_pad_days)
        },
        hours,
        minutes: zero_pad(delta.minutes, time_length),
        seconds: zero_pad(delta.seconds, time_length),
    }
}
