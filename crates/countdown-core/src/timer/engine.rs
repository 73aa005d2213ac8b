//! Countdown engine state machine.
//!
//! A wall-clock-based state machine in the shape of a plain struct. It owns
//! the status, the pause/stop offset bookkeeping and the armed/disarmed
//! timer flag, but runs no thread of its own: the controller invokes it
//! synchronously and the host drives `tick` at the configured interval.
//!
//! ## State transitions
//!
//! ```text
//! Stopped -> Started <-> Paused -> Stopped
//! any     -> Completed   (total <= 0 and overtime off)
//! ```
//!
//! Pause/resume exactness comes from two fields: `offset_start` marks the
//! instant the countdown went inactive, and `offset_time` accumulates every
//! inactive stretch. The effective target is pushed forward by
//! `offset_time`, so wall-clock time spent paused never counts against the
//! remaining duration.

use std::rc::Rc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::delta::{calc_time_delta, Clock, TimeDelta, TimeDeltaOptions};
use crate::error::Result;
use crate::events::CountdownEvent;
use crate::timer::config::CountdownConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CountdownStatus {
    Started,
    Paused,
    Stopped,
    Completed,
}

/// Committed engine state, pushed to the host on every change.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CountdownState {
    pub status: CountdownStatus,
    pub time_delta: TimeDelta,
}

/// Result of one committed state change: the new state plus the lifecycle
/// events to dispatch, in firing order.
pub(crate) struct CommitOutcome {
    pub state: CountdownState,
    pub events: Vec<CountdownEvent>,
}

/// Which lifecycle callback a commit carries, on top of any completion.
#[derive(Clone, Copy)]
enum Lifecycle {
    Start,
    Pause,
    Stop,
    Tick,
}

pub(crate) struct EngineCore {
    config: CountdownConfig,
    /// Resolved `config.date` in epoch milliseconds.
    target_ms: i64,
    clock: Rc<dyn Clock>,
    status: CountdownStatus,
    time_delta: TimeDelta,
    /// Instant captured at construction or target change; the baseline for
    /// the elapsed-time reset that `stop` performs.
    initial_timestamp: i64,
    /// Instant the countdown last went inactive. `None` while actively
    /// counting.
    offset_start: Option<i64>,
    /// Accumulated inactive milliseconds, added back to the target.
    offset_time: i64,
    timer_armed: bool,
    mounted: bool,
}

impl EngineCore {
    pub(crate) fn new(config: CountdownConfig, clock: Rc<dyn Clock>) -> Result<Self> {
        let config = config.normalized();
        let target_ms = config.validate()?;
        let now = clock.now_ms();

        let mut core = Self {
            target_ms,
            initial_timestamp: now,
            offset_start: (!config.auto_start).then_some(now),
            offset_time: 0,
            status: CountdownStatus::Stopped,
            time_delta: TimeDelta::from_total(0),
            timer_armed: false,
            mounted: false,
            config,
            clock,
        };
        core.time_delta = core.calc_delta();
        if core.time_delta.completed && !core.config.overtime {
            core.status = CountdownStatus::Completed;
        }
        Ok(core)
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub(crate) fn status(&self) -> CountdownStatus {
        self.status
    }

    pub(crate) fn state(&self) -> CountdownState {
        CountdownState {
            status: self.status,
            time_delta: self.time_delta,
        }
    }

    pub(crate) fn config(&self) -> &CountdownConfig {
        &self.config
    }

    pub(crate) fn is_started(&self) -> bool {
        self.status == CountdownStatus::Started
    }

    pub(crate) fn is_paused(&self) -> bool {
        self.status == CountdownStatus::Paused
    }

    pub(crate) fn is_stopped(&self) -> bool {
        self.status == CountdownStatus::Stopped
    }

    pub(crate) fn is_completed(&self) -> bool {
        self.status == CountdownStatus::Completed
    }

    pub(crate) fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// The interval the host should drive `tick` at, while the timer is
    /// armed.
    pub(crate) fn tick_interval(&self) -> Option<Duration> {
        self.timer_armed.then_some(self.config.interval)
    }

    /// Recompute the delta from the current offsets without committing it.
    pub(crate) fn calc_delta(&self) -> TimeDelta {
        calc_time_delta(
            self.target_ms,
            &TimeDeltaOptions {
                now: &*self.clock,
                precision: self.config.precision,
                controlled: self.config.controlled,
                offset_time: if self.config.controlled {
                    0
                } else {
                    self.offset_time
                },
                overtime: self.config.overtime,
            },
        )
    }

    pub(crate) fn snapshot(&self) -> CountdownEvent {
        CountdownEvent::Snapshot {
            status: self.status,
            time_delta: self.time_delta,
            at: self.stamp(),
        }
    }

    pub(crate) fn stamp(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(self.clock.now_ms()).unwrap_or_else(Utc::now)
    }

    // ── Lifecycle ────────────────────────────────────────────────────

    pub(crate) fn set_mounted(&mut self, mounted: bool) {
        self.mounted = mounted;
        if !mounted {
            self.timer_armed = false;
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Resume (or begin) counting. No-op when already started.
    pub(crate) fn start(&mut self) -> Option<CommitOutcome> {
        if !self.mounted || self.is_started() {
            return None;
        }
        let now = self.clock.now_ms();
        if let Some(offset_start) = self.offset_start.take() {
            self.offset_time += now - offset_start;
        }

        let delta = self.calc_delta();
        let outcome = self.commit(delta, Some(CountdownStatus::Started), Some(Lifecycle::Start));

        // The timer only runs for a live countdown: never in controlled
        // mode, and not for an already-expired target unless overtime keeps
        // it ticking.
        if !self.config.controlled && (!delta.completed || self.config.overtime) {
            self.timer_armed = true;
        }
        debug!(total = delta.total, "countdown started");
        outcome
    }

    /// Suspend counting, holding the delta at its last computed value.
    /// No-op when already paused.
    pub(crate) fn pause(&mut self) -> Option<CommitOutcome> {
        if !self.mounted || self.is_paused() {
            return None;
        }
        self.timer_armed = false;
        self.offset_start = Some(self.clock.now_ms());

        let delta = self.time_delta;
        debug!(total = delta.total, "countdown paused");
        self.commit(delta, Some(CountdownStatus::Paused), Some(Lifecycle::Pause))
    }

    /// Reset elapsed-time accounting, rearming the full original duration
    /// from this instant. No-op when already stopped.
    pub(crate) fn stop(&mut self) -> Option<CommitOutcome> {
        if !self.mounted || self.is_stopped() {
            return None;
        }
        self.timer_armed = false;
        let now = self.clock.now_ms();
        self.offset_start = Some(now);
        self.offset_time = now - self.initial_timestamp;

        let delta = self.calc_delta();
        debug!(total = delta.total, "countdown stopped");
        self.commit(delta, Some(CountdownStatus::Stopped), Some(Lifecycle::Stop))
    }

    /// One periodic re-evaluation. Discarded when the timer has been
    /// cancelled in the meantime; the tick that causes completion takes the
    /// completion path instead of the tick path.
    pub(crate) fn tick(&mut self) -> Option<CommitOutcome> {
        if !self.mounted || !self.timer_armed {
            return None;
        }
        let delta = self.calc_delta();
        let lifecycle = if delta.completed && !self.config.overtime {
            None
        } else {
            Some(Lifecycle::Tick)
        };
        self.commit(delta, None, lifecycle)
    }

    /// Apply a reconfiguration. Returns `None` when the new config compares
    /// equal to the current one (and `pure` is set), so unrelated host
    /// re-renders never restart the timer.
    pub(crate) fn update(&mut self, config: CountdownConfig) -> Result<Option<CommitOutcome>> {
        let next = config.normalized();
        if next.pure && next == self.config {
            return Ok(None);
        }
        let target_ms = next.validate()?;

        let date_changed = next.date != self.config.date;
        self.config = next;
        self.target_ms = target_ms;

        if date_changed {
            // Fresh baseline: the countdown's notion of elapsed time
            // restarts against the new target.
            let now = self.clock.now_ms();
            self.initial_timestamp = now;
            self.offset_time = 0;
            self.offset_start = (!self.is_started()).then_some(now);
        }

        let delta = self.calc_delta();
        Ok(self.commit(delta, None, None))
    }

    // ── Internal ─────────────────────────────────────────────────────

    /// Commit a freshly computed delta, deriving the next status and the
    /// events to dispatch. All state changes funnel through here.
    fn commit(
        &mut self,
        delta: TimeDelta,
        status: Option<CountdownStatus>,
        lifecycle: Option<Lifecycle>,
    ) -> Option<CommitOutcome> {
        if !self.mounted {
            return None;
        }

        let completing = delta.completed && !self.time_delta.completed;
        let completed_on_start = delta.completed && status == Some(CountdownStatus::Started);

        if completing && !self.config.overtime {
            self.timer_armed = false;
        }

        self.time_delta = delta;
        let mut next_status = status.unwrap_or(self.status);
        if delta.completed && !self.config.overtime {
            next_status = CountdownStatus::Completed;
        } else if status.is_none() && self.status == CountdownStatus::Completed {
            // The target moved forward again; fall back to inactive.
            next_status = CountdownStatus::Stopped;
        }
        self.status = next_status;

        let at = self.stamp();
        let mut events = Vec::with_capacity(2);
        if let Some(lifecycle) = lifecycle {
            events.push(match lifecycle {
                Lifecycle::Start => CountdownEvent::Started {
                    time_delta: delta,
                    at,
                },
                Lifecycle::Pause => CountdownEvent::Paused {
                    time_delta: delta,
                    at,
                },
                Lifecycle::Stop => CountdownEvent::Stopped {
                    time_delta: delta,
                    at,
                },
                Lifecycle::Tick => CountdownEvent::Tick {
                    time_delta: delta,
                    at,
                },
            });
        }
        if completing || completed_on_start {
            debug!(total = delta.total, on_start = completed_on_start, "countdown completed");
            events.push(CountdownEvent::Completed {
                time_delta: delta,
                on_start: completed_on_start,
                at,
            });
        }

        Some(CommitOutcome {
            state: self.state(),
            events,
        })
    }
}
