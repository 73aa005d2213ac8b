//! Lifecycle events.
//!
//! Every engine state change produces a [`CountdownEvent`]. The controller
//! maps events onto the host's callbacks; hosts can also subscribe to the
//! raw stream and log or serialize it directly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::delta::TimeDelta;
use crate::timer::CountdownStatus;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CountdownEvent {
    Mounted {
        time_delta: TimeDelta,
        at: DateTime<Utc>,
    },
    Started {
        time_delta: TimeDelta,
        at: DateTime<Utc>,
    },
    Paused {
        time_delta: TimeDelta,
        at: DateTime<Utc>,
    },
    Stopped {
        time_delta: TimeDelta,
        at: DateTime<Utc>,
    },
    Tick {
        time_delta: TimeDelta,
        at: DateTime<Utc>,
    },
    /// The delta crossed from not-completed to completed. `on_start` is set
    /// when the target was already in the past at the moment the countdown
    /// was started, as opposed to completing during a normal run.
    Completed {
        time_delta: TimeDelta,
        on_start: bool,
        at: DateTime<Utc>,
    },
    /// Full state snapshot, produced on demand rather than by a transition.
    Snapshot {
        status: CountdownStatus,
        time_delta: TimeDelta,
        at: DateTime<Utc>,
    },
}

impl CountdownEvent {
    /// The delta carried by this event.
    pub fn time_delta(&self) -> &TimeDelta {
        match self {
            Self::Mounted { time_delta, .. }
            | Self::Started { time_delta, .. }
            | Self::Paused { time_delta, .. }
            | Self::Stopped { time_delta, .. }
            | Self::Tick { time_delta, .. }
            | Self::Completed { time_delta, .. }
            | Self::Snapshot { time_delta, .. } => time_delta,
        }
    }
}
