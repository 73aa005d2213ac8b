//! Countdown controller: the engine's host contract.
//!
//! The controller wraps the state machine for an external host (a UI
//! binding, a CLI loop, an SSE handler) that owns the instance and calls
//! `mount`, `update` and `unmount` at the appropriate points of its own
//! lifecycle. State changes are pushed to the host through the state
//! updater before any lifecycle hook fires, so hooks always observe an
//! applied state.
//!
//! Hooks are invoked with no internal borrow held. A hook may therefore
//! reenter the engine through a [`CountdownApi`] handle; the one restriction
//! is that a hook cannot re-trigger itself recursively (the slot is vacant
//! while it runs).

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use std::time::Duration;

use tracing::debug;

use crate::delta::{Clock, SystemClock, TimeDelta};
use crate::error::Result;
use crate::events::CountdownEvent;
use crate::format::{format_time_delta, FormattedTimeDelta};
use crate::timer::config::CountdownConfig;
use crate::timer::engine::{CommitOutcome, CountdownState, CountdownStatus, EngineCore};

pub type StateUpdater = Box<dyn FnMut(&CountdownState)>;
type DeltaHook = Box<dyn FnMut(&TimeDelta)>;
type CompleteHook = Box<dyn FnMut(&TimeDelta, bool)>;
type EventHook = Box<dyn FnMut(&CountdownEvent)>;

/// Lifecycle callbacks, all optional.
///
/// `on_complete` receives a second flag distinguishing "the target was
/// already in the past when started" from "completed during a normal run".
/// `on_event` observes the raw event stream, including events that also
/// fire a specific hook.
#[derive(Default)]
pub struct CountdownHooks {
    pub on_event: Option<EventHook>,
    pub on_mount: Option<DeltaHook>,
    pub on_start: Option<DeltaHook>,
    pub on_pause: Option<DeltaHook>,
    pub on_stop: Option<DeltaHook>,
    pub on_tick: Option<DeltaHook>,
    pub on_complete: Option<CompleteHook>,
}

impl CountdownHooks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_event(mut self, hook: impl FnMut(&CountdownEvent) + 'static) -> Self {
        self.on_event = Some(Box::new(hook));
        self
    }

    pub fn on_mount(mut self, hook: impl FnMut(&TimeDelta) + 'static) -> Self {
        self.on_mount = Some(Box::new(hook));
        self
    }

    pub fn on_start(mut self, hook: impl FnMut(&TimeDelta) + 'static) -> Self {
        self.on_start = Some(Box::new(hook));
        self
    }

    pub fn on_pause(mut self, hook: impl FnMut(&TimeDelta) + 'static) -> Self {
        self.on_pause = Some(Box::new(hook));
        self
    }

    pub fn on_stop(mut self, hook: impl FnMut(&TimeDelta) + 'static) -> Self {
        self.on_stop = Some(Box::new(hook));
        self
    }

    pub fn on_tick(mut self, hook: impl FnMut(&TimeDelta) + 'static) -> Self {
        self.on_tick = Some(Box::new(hook));
        self
    }

    pub fn on_complete(mut self, hook: impl FnMut(&TimeDelta, bool) + 'static) -> Self {
        self.on_complete = Some(Box::new(hook));
        self
    }
}

struct Shared {
    core: EngineCore,
    hooks: CountdownHooks,
    state_updater: Option<StateUpdater>,
}

/// A countdown engine instance, exclusively owned by its host.
///
/// The host decides when to construct and destroy it; on a target-identity
/// change it should be replaced, not mutated. Reconfiguration within one
/// identity goes through [`Countdown::update`].
pub struct Countdown {
    shared: Rc<RefCell<Shared>>,
    api: RefCell<Option<CountdownApi>>,
}

/// Everything a host needs to render one frame of the countdown.
pub struct RenderProps {
    pub time_delta: TimeDelta,
    pub formatted: FormattedTimeDelta,
    pub api: CountdownApi,
    pub config: CountdownConfig,
}

impl Countdown {
    /// Build a countdown on the wall clock.
    pub fn new(config: CountdownConfig) -> Result<Self> {
        Self::with_clock(config, Rc::new(SystemClock))
    }

    /// Build a countdown on an injected time source.
    pub fn with_clock(config: CountdownConfig, clock: Rc<dyn Clock>) -> Result<Self> {
        let core = EngineCore::new(config, clock)?;
        Ok(Self {
            shared: Rc::new(RefCell::new(Shared {
                core,
                hooks: CountdownHooks::default(),
                state_updater: None,
            })),
            api: RefCell::new(None),
        })
    }

    /// Install lifecycle hooks. Replaces any previously installed set.
    pub fn set_hooks(&self, hooks: CountdownHooks) {
        self.shared.borrow_mut().hooks = hooks;
    }

    /// Install the host's state updater, invoked on every committed state
    /// change before hooks fire.
    pub fn set_state_updater(&self, updater: impl FnMut(&CountdownState) + 'static) {
        self.shared.borrow_mut().state_updater = Some(Box::new(updater));
    }

    // ── Host lifecycle ───────────────────────────────────────────────

    /// Mount the engine: auto-start when configured, then fire `on_mount`
    /// with a freshly computed delta.
    pub fn mount(&self) {
        {
            let mut shared = self.shared.borrow_mut();
            if shared.core.is_mounted() {
                return;
            }
            shared.core.set_mounted(true);
        }
        debug!("countdown mounted");

        if self.shared.borrow().core.config().auto_start {
            run_start(&self.shared);
        }

        let (time_delta, at) = {
            let shared = self.shared.borrow();
            (shared.core.calc_delta(), shared.core.stamp())
        };
        fire_event(&self.shared, &CountdownEvent::Mounted { time_delta, at });
    }

    /// Apply a reconfiguration. Returns `Ok(false)` when the new config is
    /// equal to the current one and nothing was recomputed.
    pub fn update(&self, config: CountdownConfig) -> Result<bool> {
        let outcome = self.shared.borrow_mut().core.update(config)?;
        match outcome {
            Some(outcome) => {
                dispatch(&self.shared, outcome);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Unmount the engine: cancels the timer and discards any state commit
    /// still in flight.
    pub fn unmount(&self) {
        self.shared.borrow_mut().core.set_mounted(false);
        debug!("countdown unmounted");
    }

    // ── Controls ─────────────────────────────────────────────────────

    pub fn start(&self) {
        run_start(&self.shared);
    }

    pub fn pause(&self) {
        run_pause(&self.shared);
    }

    pub fn stop(&self) {
        run_stop(&self.shared);
    }

    /// One periodic re-evaluation, called by the host's scheduler while
    /// [`Countdown::tick_interval`] is `Some`. Ticks delivered after the
    /// timer was cancelled are discarded.
    pub fn tick(&self) {
        let outcome = self.shared.borrow_mut().core.tick();
        if let Some(outcome) = outcome {
            dispatch(&self.shared, outcome);
        }
    }

    /// The cadence the host should drive [`Countdown::tick`] at, while the
    /// timer is armed. `None` means no ticking: not started, paused,
    /// completed, controlled mode, or unmounted.
    pub fn tick_interval(&self) -> Option<Duration> {
        self.shared.borrow().core.tick_interval()
    }

    // ── Read accessors ───────────────────────────────────────────────

    pub fn state(&self) -> CountdownState {
        self.shared.borrow().core.state()
    }

    pub fn status(&self) -> CountdownStatus {
        self.shared.borrow().core.status()
    }

    pub fn config(&self) -> CountdownConfig {
        self.shared.borrow().core.config().clone()
    }

    pub fn is_started(&self) -> bool {
        self.shared.borrow().core.is_started()
    }

    pub fn is_paused(&self) -> bool {
        self.shared.borrow().core.is_paused()
    }

    pub fn is_stopped(&self) -> bool {
        self.shared.borrow().core.is_stopped()
    }

    pub fn is_completed(&self) -> bool {
        self.shared.borrow().core.is_completed()
    }

    /// The stable control handle. Repeated calls return the same cached
    /// handle, so hosts can rely on its identity for dependency tracking.
    pub fn api(&self) -> CountdownApi {
        self.api
            .borrow_mut()
            .get_or_insert_with(|| CountdownApi {
                shared: Rc::downgrade(&self.shared),
            })
            .clone()
    }

    /// The single source of truth for rendering.
    pub fn render_props(&self) -> RenderProps {
        let (state, config) = {
            let shared = self.shared.borrow();
            (shared.core.state(), shared.core.config().clone())
        };
        RenderProps {
            time_delta: state.time_delta,
            formatted: format_time_delta(&state.time_delta, &config.format),
            api: self.api(),
            config,
        }
    }

    /// A snapshot event of the current state, for logging or serialization.
    pub fn snapshot(&self) -> CountdownEvent {
        self.shared.borrow().core.snapshot()
    }
}

/// Cloneable control handle over a countdown.
///
/// Handles compare equal iff they control the same engine instance, and
/// become inert no-ops once the owning [`Countdown`] is dropped.
#[derive(Clone)]
pub struct CountdownApi {
    shared: Weak<RefCell<Shared>>,
}

impl CountdownApi {
    pub fn start(&self) {
        if let Some(shared) = self.shared.upgrade() {
            run_start(&shared);
        }
    }

    pub fn pause(&self) {
        if let Some(shared) = self.shared.upgrade() {
            run_pause(&shared);
        }
    }

    pub fn stop(&self) {
        if let Some(shared) = self.shared.upgrade() {
            run_stop(&shared);
        }
    }

    pub fn is_started(&self) -> bool {
        self.query(EngineCore::is_started)
    }

    pub fn is_paused(&self) -> bool {
        self.query(EngineCore::is_paused)
    }

    pub fn is_stopped(&self) -> bool {
        self.query(EngineCore::is_stopped)
    }

    pub fn is_completed(&self) -> bool {
        self.query(EngineCore::is_completed)
    }

    fn query(&self, read: fn(&EngineCore) -> bool) -> bool {
        self.shared
            .upgrade()
            .is_some_and(|shared| read(&shared.borrow().core))
    }
}

impl PartialEq for CountdownApi {
    fn eq(&self, other: &Self) -> bool {
        Weak::ptr_eq(&self.shared, &other.shared)
    }
}

impl fmt::Debug for CountdownApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CountdownApi")
            .field("alive", &(self.shared.strong_count() > 0))
            .finish()
    }
}

// ── Dispatch ─────────────────────────────────────────────────────────

fn run_start(shared: &Rc<RefCell<Shared>>) {
    let outcome = shared.borrow_mut().core.start();
    if let Some(outcome) = outcome {
        dispatch(shared, outcome);
    }
}

fn run_pause(shared: &Rc<RefCell<Shared>>) {
    let outcome = shared.borrow_mut().core.pause();
    if let Some(outcome) = outcome {
        dispatch(shared, outcome);
    }
}

fn run_stop(shared: &Rc<RefCell<Shared>>) {
    let outcome = shared.borrow_mut().core.stop();
    if let Some(outcome) = outcome {
        dispatch(shared, outcome);
    }
}

/// Push the committed state to the host, then fire the lifecycle events in
/// order. No borrow is held while host code runs.
fn dispatch(shared: &Rc<RefCell<Shared>>, outcome: CommitOutcome) {
    let updater = shared.borrow_mut().state_updater.take();
    if let Some(mut updater) = updater {
        updater(&outcome.state);
        let mut guard = shared.borrow_mut();
        if guard.state_updater.is_none() {
            guard.state_updater = Some(updater);
        }
    }

    for event in &outcome.events {
        fire_event(shared, event);
    }
}

fn fire_event(shared: &Rc<RefCell<Shared>>, event: &CountdownEvent) {
    let taken = shared.borrow_mut().hooks.on_event.take();
    if let Some(mut hook) = taken {
        hook(event);
        let mut guard = shared.borrow_mut();
        if guard.hooks.on_event.is_none() {
            guard.hooks.on_event = Some(hook);
        }
    }

    match event {
        CountdownEvent::Mounted { time_delta, .. } => {
            fire_delta_hook(shared, |hooks| &mut hooks.on_mount, time_delta);
        }
        CountdownEvent::Started { time_delta, .. } => {
            fire_delta_hook(shared, |hooks| &mut hooks.on_start, time_delta);
        }
        CountdownEvent::Paused { time_delta, .. } => {
            fire_delta_hook(shared, |hooks| &mut hooks.on_pause, time_delta);
        }
        CountdownEvent::Stopped { time_delta, .. } => {
            fire_delta_hook(shared, |hooks| &mut hooks.on_stop, time_delta);
        }
        CountdownEvent::Tick { time_delta, .. } => {
            fire_delta_hook(shared, |hooks| &mut hooks.on_tick, time_delta);
        }
        CountdownEvent::Completed {
            time_delta,
            on_start,
            ..
        } => {
            let taken = shared.borrow_mut().hooks.on_complete.take();
            if let Some(mut hook) = taken {
                hook(time_delta, *on_start);
                let mut guard = shared.borrow_mut();
                if guard.hooks.on_complete.is_none() {
                    guard.hooks.on_complete = Some(hook);
                }
            }
        }
        CountdownEvent::Snapshot { .. } => {}
    }
}

fn fire_delta_hook(
    shared: &Rc<RefCell<Shared>>,
    slot: fn(&mut CountdownHooks) -> &mut Option<DeltaHook>,
    time_delta: &TimeDelta,
) {
    let taken = slot(&mut shared.borrow_mut().hooks).take();
    if let Some(mut hook) = taken {
        hook(time_delta);
        let mut guard = shared.borrow_mut();
        let empty = slot(&mut guard.hooks);
        if empty.is_none() {
            *empty = Some(hook);
        }
    }
}
