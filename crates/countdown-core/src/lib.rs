//! # Countdown Core Library
//!
//! A live countdown (or count-up "overtime") engine: the time-delta
//! calculation from a target instant to now, and the stateful
//! start/pause/stop/tick machine around it, packaged for an external host
//! that drives the lifecycle and renders the result.
//!
//! ## Architecture
//!
//! - **Time-delta calculator**: pure functions turning a target plus options
//!   into a structured [`TimeDelta`], deterministic under an injected
//!   [`Clock`]
//! - **Countdown engine**: a wall-clock-based state machine that requires
//!   the host to periodically invoke `tick()` while a timer interval is
//!   advertised; pause/resume stays exact through offset bookkeeping
//! - **Host contract**: `mount`/`update`/`unmount` lifecycle, a push-style
//!   state updater, lifecycle hooks and a stable [`CountdownApi`] handle
//!
//! ## Key components
//!
//! - [`calc_time_delta`]: the calculator
//! - [`Countdown`]: the engine controller a host owns
//! - [`CountdownConfig`]: the recognized options, validated at construction
//! - [`format_time_delta`]: zero-padded display strings

pub mod delta;
pub mod error;
pub mod events;
pub mod format;
pub mod timer;

pub use delta::{
    calc_time_delta, calc_time_units, clamp_precision, Clock, ManualClock, SystemClock, TimeDelta,
    TimeDeltaOptions, TimeUnits,
};
pub use error::CoreError;
pub use events::CountdownEvent;
pub use format::{format_time_delta, zero_pad, FormatOptions, FormattedTimeDelta};
pub use timer::{
    Countdown, CountdownApi, CountdownConfig, CountdownHooks, CountdownState, CountdownStatus,
    DateInput, RenderProps,
};
