//! Countdown configuration.
//!
//! The configuration is an explicit struct with defaulted fields, validated
//! and clamped once when it enters the engine rather than at every use site.
//! It is the unit of comparison for the `update` short-circuit, so callbacks
//! and the clock live outside of it.

use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::delta::clamp_precision;
use crate::error::{CoreError, Result};
use crate::format::FormatOptions;

/// Countdown target input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateInput {
    /// Absolute instant in epoch milliseconds. In controlled mode this is
    /// read as the remaining duration instead.
    Timestamp(i64),
    /// Absolute instant.
    DateTime(DateTime<Utc>),
    /// Date string, parsed as RFC 3339 first and RFC 2822 second.
    Text(String),
}

impl DateInput {
    /// Resolve the input to epoch milliseconds.
    pub fn resolve_ms(&self) -> Result<i64> {
        match self {
            Self::Timestamp(ms) => Ok(*ms),
            Self::DateTime(instant) => Ok(instant.timestamp_millis()),
            Self::Text(text) => DateTime::parse_from_rfc3339(text)
                .or_else(|_| DateTime::parse_from_rfc2822(text))
                .map(|instant| instant.timestamp_millis())
                .map_err(|err| CoreError::InvalidDate {
                    input: text.clone(),
                    message: err.to_string(),
                }),
        }
    }
}

impl From<i64> for DateInput {
    fn from(ms: i64) -> Self {
        Self::Timestamp(ms)
    }
}

impl From<DateTime<Utc>> for DateInput {
    fn from(instant: DateTime<Utc>) -> Self {
        Self::DateTime(instant)
    }
}

impl From<&str> for DateInput {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for DateInput {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

/// Countdown engine configuration.
///
/// Equality over this struct is what decides whether a reconfiguration is a
/// no-op, so every recognized option is a comparable value.
#[derive(Debug, Clone, PartialEq)]
pub struct CountdownConfig {
    /// The countdown target: an absolute instant, or a remaining duration
    /// when `controlled` is set.
    pub date: DateInput,
    /// The host supplies the remaining duration directly via `update`; the
    /// engine runs no timer of its own.
    pub controlled: bool,
    /// Tick cadence while running.
    pub interval: Duration,
    /// Fractional-second digits kept by the delta calculation, clamped to
    /// `[0, 20]`.
    pub precision: u32,
    /// Start counting immediately on mount.
    pub auto_start: bool,
    /// Continue past zero into negative totals instead of completing.
    pub overtime: bool,
    /// Skip reconfigurations that compare equal to the current config.
    pub pure: bool,
    /// Display formatting for render props.
    pub format: FormatOptions,
}

impl CountdownConfig {
    pub fn new(date: impl Into<DateInput>) -> Self {
        Self {
            date: date.into(),
            controlled: false,
            interval: Duration::from_secs(1),
            precision: 0,
            auto_start: true,
            overtime: false,
            pure: true,
            format: FormatOptions::default(),
        }
    }

    /// Clamp out-of-range fields into their supported ranges.
    pub(crate) fn normalized(mut self) -> Self {
        self.precision = clamp_precision(self.precision);
        self
    }

    /// Validate the config, resolving the target to epoch milliseconds.
    pub(crate) fn validate(&self) -> Result<i64> {
        if self.interval.is_zero() {
            return Err(CoreError::InvalidConfig {
                field: "interval".to_string(),
                message: "tick interval must be non-zero".to_string(),
            });
        }
        self.date.resolve_ms()
    }
}
