mod config;
mod controller;
mod engine;

pub use config::{CountdownConfig, DateInput};
pub use controller::{Countdown, CountdownApi, CountdownHooks, RenderProps, StateUpdater};
pub use engine::{CountdownState, CountdownStatus};
