//! Time-delta calculation.
//!
//! Pure functions that turn a target instant (or an already-computed
//! remaining duration) plus the current time into a structured breakdown of
//! days, hours, minutes, seconds and milliseconds. The current time is read
//! through the [`Clock`] trait so every result is deterministic under test.

use std::cell::Cell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

const MS_PER_SECOND: u64 = 1_000;
const MS_PER_MINUTE: u64 = 60 * MS_PER_SECOND;
const MS_PER_HOUR: u64 = 60 * MS_PER_MINUTE;
const MS_PER_DAY: u64 = 24 * MS_PER_HOUR;

/// Largest number of fractional-second digits the precision option keeps.
pub const MAX_PRECISION: u32 = 20;

/// Source of the current time in epoch milliseconds.
///
/// Injectable so that countdown math can be pinned in tests and driven by
/// simulated time in hosts that have their own notion of "now".
pub trait Clock {
    fn now_ms(&self) -> i64;
}

/// Wall clock. The default time source.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// A hand-advanced clock for tests and simulations.
///
/// Clones share the same underlying instant, so a host can hold one half and
/// hand the other to the engine.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<i64>>,
}

impl ManualClock {
    pub fn new(start_ms: i64) -> Self {
        Self {
            now: Rc::new(Cell::new(start_ms)),
        }
    }

    pub fn set(&self, ms: i64) {
        self.now.set(ms);
    }

    pub fn advance(&self, ms: i64) {
        self.now.set(self.now.get() + ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> i64 {
        self.now.get()
    }
}

/// Non-negative decomposition of a duration magnitude.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeUnits {
    pub days: u64,
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
    pub milliseconds: u64,
}

/// Structured time delta between a target and the current instant.
///
/// `total` carries the sign; the unit fields always describe `abs(total)` and
/// reconstruct it exactly at millisecond resolution:
/// `days*86_400_000 + hours*3_600_000 + minutes*60_000 + seconds*1_000 +
/// milliseconds == abs(total)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeDelta {
    /// Signed milliseconds remaining. Negative only in overtime mode.
    pub total: i64,
    pub days: u64,
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
    pub milliseconds: u64,
    /// True iff `total <= 0`.
    pub completed: bool,
}

impl TimeDelta {
    /// Build a delta from a signed millisecond total.
    pub fn from_total(total: i64) -> Self {
        let units = calc_time_units(total.unsigned_abs());
        Self {
            total,
            days: units.days,
            hours: units.hours,
            minutes: units.minutes,
            seconds: units.seconds,
            milliseconds: units.milliseconds,
            completed: total <= 0,
        }
    }

    pub fn units(&self) -> TimeUnits {
        TimeUnits {
            days: self.days,
            hours: self.hours,
            minutes: self.minutes,
            seconds: self.seconds,
            milliseconds: self.milliseconds,
        }
    }
}

/// Options for [`calc_time_delta`].
#[derive(Clone, Copy)]
pub struct TimeDeltaOptions<'a> {
    /// Time source; defaults to the wall clock.
    pub now: &'a dyn Clock,
    /// Fractional-second digits kept when rounding, clamped to `[0, 20]`.
    /// 0 keeps whole seconds; 3 and above keep full millisecond fidelity.
    pub precision: u32,
    /// When true the target is read as an already-computed remaining
    /// duration and the clock is not consulted.
    pub controlled: bool,
    /// Milliseconds added to the target instant to compensate for time the
    /// countdown spent paused. Ignored in controlled mode.
    pub offset_time: i64,
    /// When true the delta continues past zero into negative totals instead
    /// of clamping at zero.
    pub overtime: bool,
}

impl Default for TimeDeltaOptions<'_> {
    fn default() -> Self {
        Self {
            now: &SystemClock,
            precision: 0,
            controlled: false,
            offset_time: 0,
            overtime: false,
        }
    }
}

/// Clamp a precision option into the supported range.
pub fn clamp_precision(precision: u32) -> u32 {
    precision.min(MAX_PRECISION)
}

/// Decompose a duration magnitude into calendar-free units.
pub fn calc_time_units(ms: u64) -> TimeUnits {
    TimeUnits {
        days: ms / MS_PER_DAY,
        hours: ms / MS_PER_HOUR % 24,
        minutes: ms / MS_PER_MINUTE % 60,
        seconds: ms / MS_PER_SECOND % 60,
        milliseconds: ms % MS_PER_SECOND,
    }
}

/// Compute the time delta between `target_ms` and now.
///
/// `target_ms` is an absolute epoch-millisecond instant, or the remaining
/// duration itself when `options.controlled` is set. Pure in its inputs plus
/// the injected clock.
pub fn calc_time_delta(target_ms: i64, options: &TimeDeltaOptions) -> TimeDelta {
    let time_left = if options.controlled {
        target_ms
    } else {
        target_ms + options.offset_time - options.now.now_ms()
    };

    let clamped = if options.overtime {
        time_left
    } else {
        time_left.max(0)
    };

    TimeDelta::from_total(round_to_precision(
        clamped,
        clamp_precision(options.precision),
    ))
}

/// Round a millisecond total to the configured number of fractional-second
/// digits.
///
/// The rounding rule is applied once, on the final millisecond value: round
/// to the nearest multiple of the precision quantum (`10^(3 - p)` ms), ties
/// away from zero. Precision 3 and above is already at millisecond
/// resolution and passes through unchanged.
fn round_to_precision(ms: i64, precision: u32) -> i64 {
    if precision >= 3 {
        return ms;
    }
    let quantum = 10_i64.pow(3 - precision);
    let half = quantum / 2;
    if ms >= 0 {
        (ms + half) / quantum * quantum
    } else {
        -((-ms + half) / quantum * quantum)
    }
}
