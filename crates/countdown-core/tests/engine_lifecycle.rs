//! Integration tests for the countdown host contract.
//!
//! Exercise the controller the way a host would: construct with a manual
//! clock, mount, drive ticks, reconfigure, unmount. Hooks record into
//! shared vectors so firing order and counts can be asserted.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use countdown_core::{
    Clock, Countdown, CountdownConfig, CountdownHooks, CountdownStatus, DateInput, ManualClock,
};

const NOW: i64 = 1_482_363_367_000;

fn countdown_at(target_offset_ms: i64, clock: &ManualClock) -> Countdown {
    Countdown::with_clock(
        CountdownConfig::new(NOW + target_offset_ms),
        Rc::new(clock.clone()),
    )
    .unwrap()
}

#[test]
fn ten_second_countdown_ticks_down_and_completes_once() {
    let clock = ManualClock::new(NOW);
    let countdown = countdown_at(10_000, &clock);

    let ticks: Rc<RefCell<Vec<i64>>> = Rc::new(RefCell::new(Vec::new()));
    let completions: Rc<RefCell<Vec<(i64, bool)>>> = Rc::new(RefCell::new(Vec::new()));
    countdown.set_hooks(
        CountdownHooks::new()
            .on_tick({
                let ticks = ticks.clone();
                move |delta| ticks.borrow_mut().push(delta.total)
            })
            .on_complete({
                let completions = completions.clone();
                move |delta, on_start| completions.borrow_mut().push((delta.total, on_start))
            }),
    );

    countdown.mount();
    assert!(countdown.is_started());
    assert_eq!(countdown.tick_interval(), Some(Duration::from_secs(1)));

    for _ in 0..10 {
        clock.advance(1_000);
        countdown.tick();
    }

    let expected: Vec<i64> = (1..=9).rev().map(|s| s * 1_000).collect();
    assert_eq!(*ticks.borrow(), expected);
    assert_eq!(*completions.borrow(), vec![(0, false)]);
    assert!(countdown.is_completed());
    assert_eq!(countdown.tick_interval(), None);

    // Ticks after completion neither tick nor re-complete.
    clock.advance(1_000);
    countdown.tick();
    assert_eq!(ticks.borrow().len(), 9);
    assert_eq!(completions.borrow().len(), 1);
}

#[test]
fn mounting_an_expired_target_completes_on_start() {
    let clock = ManualClock::new(NOW);
    let countdown = countdown_at(-1_000, &clock);

    let log: Rc<RefCell<Vec<String>>> = Rc::new(RefCell::new(Vec::new()));
    countdown.set_hooks(
        CountdownHooks::new()
            .on_start({
                let log = log.clone();
                move |_| log.borrow_mut().push("start".into())
            })
            .on_mount({
                let log = log.clone();
                move |_| log.borrow_mut().push("mount".into())
            })
            .on_complete({
                let log = log.clone();
                move |_, on_start| log.borrow_mut().push(format!("complete:{on_start}"))
            }),
    );

    countdown.mount();
    assert!(countdown.is_completed());
    assert_eq!(countdown.tick_interval(), None);
    // Auto-start runs before the mount hook; completion displaces nothing
    // here since no tick was involved.
    assert_eq!(*log.borrow(), vec!["start", "complete:true", "mount"]);
}

#[test]
fn pause_and_resume_report_the_same_remaining_time() {
    let clock = ManualClock::new(NOW);
    let countdown = countdown_at(10_000, &clock);

    let pauses: Rc<RefCell<Vec<i64>>> = Rc::new(RefCell::new(Vec::new()));
    countdown.set_hooks(CountdownHooks::new().on_pause({
        let pauses = pauses.clone();
        move |delta| pauses.borrow_mut().push(delta.total)
    }));

    countdown.mount();
    clock.advance(2_000);
    countdown.tick();
    assert_eq!(countdown.state().time_delta.total, 8_000);

    countdown.pause();
    assert!(countdown.is_paused());
    // Idempotent: the second call is a no-op and fires nothing.
    countdown.pause();
    assert_eq!(*pauses.borrow(), vec![8_000]);

    // Wall-clock time during the pause does not drain the countdown, and a
    // tick left over from a cancelled schedule is discarded.
    clock.advance(2_000);
    countdown.tick();
    assert_eq!(countdown.state().time_delta.total, 8_000);

    countdown.start();
    assert_eq!(countdown.state().time_delta.total, 8_000);
    clock.advance(1_000);
    countdown.tick();
    assert_eq!(countdown.state().time_delta.total, 7_000);
}

#[test]
fn stop_rearms_the_original_duration() {
    let clock = ManualClock::new(NOW);
    let countdown = countdown_at(10_000, &clock);

    let stops: Rc<RefCell<Vec<i64>>> = Rc::new(RefCell::new(Vec::new()));
    countdown.set_hooks(CountdownHooks::new().on_stop({
        let stops = stops.clone();
        move |delta| stops.borrow_mut().push(delta.total)
    }));

    countdown.mount();
    clock.advance(6_000);
    countdown.tick();
    assert_eq!(countdown.state().time_delta.total, 4_000);

    countdown.stop();
    assert!(countdown.is_stopped());
    assert_eq!(*stops.borrow(), vec![10_000]);
    assert_eq!(countdown.tick_interval(), None);

    countdown.start();
    clock.advance(1_000);
    countdown.tick();
    assert_eq!(countdown.state().time_delta.total, 9_000);
}

#[test]
fn overtime_continues_ticking_past_zero() {
    let clock = ManualClock::new(NOW);
    let mut config = CountdownConfig::new(NOW + 5_000);
    config.overtime = true;
    let countdown = Countdown::with_clock(config, Rc::new(clock.clone())).unwrap();

    let ticks: Rc<RefCell<Vec<i64>>> = Rc::new(RefCell::new(Vec::new()));
    let completions: Rc<RefCell<Vec<i64>>> = Rc::new(RefCell::new(Vec::new()));
    countdown.set_hooks(
        CountdownHooks::new()
            .on_tick({
                let ticks = ticks.clone();
                move |delta| ticks.borrow_mut().push(delta.total)
            })
            .on_complete({
                let completions = completions.clone();
                move |delta, _| completions.borrow_mut().push(delta.total)
            }),
    );

    countdown.mount();
    clock.advance(6_000);
    countdown.tick();

    let state = countdown.state();
    assert_eq!(state.time_delta.total, -1_000);
    assert!(state.time_delta.completed);
    assert_eq!(state.time_delta.seconds, 1);
    assert_eq!(state.status, CountdownStatus::Started);
    assert!(countdown.tick_interval().is_some());

    clock.advance(1_000);
    countdown.tick();
    assert_eq!(*ticks.borrow(), vec![-1_000, -2_000]);
    assert_eq!(*completions.borrow(), vec![-1_000]);
}

#[test]
fn state_updater_runs_before_hooks() {
    let clock = ManualClock::new(NOW);
    let countdown = countdown_at(10_000, &clock);

    let log: Rc<RefCell<Vec<String>>> = Rc::new(RefCell::new(Vec::new()));
    countdown.set_state_updater({
        let log = log.clone();
        move |state| {
            log.borrow_mut()
                .push(format!("state:{}", state.time_delta.total))
        }
    });
    countdown.set_hooks(CountdownHooks::new().on_tick({
        let log = log.clone();
        move |delta| log.borrow_mut().push(format!("tick:{}", delta.total))
    }));

    countdown.mount();
    clock.advance(1_000);
    countdown.tick();

    let log = log.borrow();
    let state_pos = log.iter().position(|entry| entry == "state:9000").unwrap();
    let tick_pos = log.iter().position(|entry| entry == "tick:9000").unwrap();
    assert!(state_pos < tick_pos);
}

#[test]
fn equal_config_update_is_a_no_op() {
    let clock = ManualClock::new(NOW);
    let countdown = countdown_at(10_000, &clock);

    let commits: Rc<RefCell<usize>> = Rc::new(RefCell::new(0));
    countdown.set_state_updater({
        let commits = commits.clone();
        move |_| *commits.borrow_mut() += 1
    });

    countdown.mount();
    let committed_after_mount = *commits.borrow();

    let same = countdown.config();
    assert!(!countdown.update(same).unwrap());
    assert_eq!(*commits.borrow(), committed_after_mount);

    let mut changed = countdown.config();
    changed.precision = 3;
    assert!(countdown.update(changed).unwrap());
    assert_eq!(*commits.borrow(), committed_after_mount + 1);
}

#[test]
fn changing_the_date_restarts_elapsed_accounting() {
    let clock = ManualClock::new(NOW);
    let countdown = countdown_at(10_000, &clock);
    countdown.mount();
    clock.advance(4_000);
    countdown.tick();
    assert_eq!(countdown.state().time_delta.total, 6_000);

    let mut config = countdown.config();
    config.date = DateInput::Timestamp(clock.now_ms() + 30_000);
    countdown.update(config).unwrap();
    assert_eq!(countdown.state().time_delta.total, 30_000);
    assert!(countdown.is_started());

    clock.advance(1_000);
    countdown.tick();
    assert_eq!(countdown.state().time_delta.total, 29_000);
}

#[test]
fn invalid_date_text_surfaces_as_an_error() {
    let clock = ManualClock::new(NOW);
    let countdown = countdown_at(10_000, &clock);
    countdown.mount();

    let mut config = countdown.config();
    config.date = DateInput::Text("the day after tomorrow".into());
    assert!(countdown.update(config).is_err());
    // The engine keeps its previous target.
    assert_eq!(countdown.state().time_delta.total, 10_000);
}

#[test]
fn unmount_discards_in_flight_ticks_and_state_commits() {
    let clock = ManualClock::new(NOW);
    let countdown = countdown_at(10_000, &clock);

    let commits: Rc<RefCell<usize>> = Rc::new(RefCell::new(0));
    countdown.set_state_updater({
        let commits = commits.clone();
        move |_| *commits.borrow_mut() += 1
    });

    countdown.mount();
    let before = *commits.borrow();
    countdown.unmount();

    clock.advance(1_000);
    countdown.tick();
    countdown.start();
    assert_eq!(*commits.borrow(), before);
    assert_eq!(countdown.state().time_delta.total, 10_000);
}

#[test]
fn api_handle_is_stable_and_goes_inert_after_drop() {
    let clock = ManualClock::new(NOW);
    let countdown = countdown_at(10_000, &clock);
    countdown.mount();

    let api = countdown.api();
    assert_eq!(api, countdown.api());

    api.pause();
    assert!(api.is_paused());
    assert!(countdown.is_paused());
    api.start();
    assert!(api.is_started());

    drop(countdown);
    // A dangling handle is a defined no-op, not an error.
    api.pause();
    assert!(!api.is_paused());
    assert!(!api.is_started());
}

#[test]
fn hooks_may_reenter_through_the_api_handle() {
    let clock = ManualClock::new(NOW);
    let countdown = countdown_at(3_000, &clock);
    let api = countdown.api();

    // Pause as soon as fewer than two seconds remain.
    countdown.set_hooks(CountdownHooks::new().on_tick({
        let api = api.clone();
        move |delta| {
            if delta.total < 2_000 {
                api.pause();
            }
        }
    }));

    countdown.mount();
    clock.advance(1_000);
    countdown.tick();
    assert!(countdown.is_started());
    clock.advance(1_000);
    countdown.tick();
    assert!(countdown.is_paused());
    assert_eq!(countdown.state().time_delta.total, 1_000);
}

#[test]
fn manual_start_without_auto_start_keeps_the_full_duration() {
    let clock = ManualClock::new(NOW);
    let mut config = CountdownConfig::new(NOW + 10_000);
    config.auto_start = false;
    let countdown = Countdown::with_clock(config, Rc::new(clock.clone())).unwrap();

    countdown.mount();
    assert!(countdown.is_stopped());
    assert_eq!(countdown.tick_interval(), None);

    // Time before the explicit start is compensated like a pause.
    clock.advance(5_000);
    countdown.start();
    assert_eq!(countdown.state().time_delta.total, 10_000);
    clock.advance(1_000);
    countdown.tick();
    assert_eq!(countdown.state().time_delta.total, 9_000);
}

#[test]
fn controlled_mode_takes_durations_from_the_host() {
    let clock = ManualClock::new(NOW);
    let mut config = CountdownConfig::new(4_000);
    config.controlled = true;
    let countdown = Countdown::with_clock(config, Rc::new(clock.clone())).unwrap();

    let completions: Rc<RefCell<Vec<(i64, bool)>>> = Rc::new(RefCell::new(Vec::new()));
    countdown.set_hooks(CountdownHooks::new().on_complete({
        let completions = completions.clone();
        move |delta, on_start| completions.borrow_mut().push((delta.total, on_start))
    }));

    countdown.mount();
    assert!(countdown.is_started());
    assert_eq!(countdown.tick_interval(), None);
    assert_eq!(countdown.state().time_delta.total, 4_000);

    for remaining in [3_000, 2_000, 1_000, 0] {
        let mut config = countdown.config();
        config.date = DateInput::Timestamp(remaining);
        countdown.update(config).unwrap();
        assert_eq!(countdown.state().time_delta.total, remaining);
    }

    assert!(countdown.is_completed());
    assert_eq!(*completions.borrow(), vec![(0, false)]);
}

#[test]
fn render_props_carry_formatted_output_and_the_api() {
    let clock = ManualClock::new(NOW);
    let mut config = CountdownConfig::new(NOW + 90_110_000);
    config.auto_start = false;
    let countdown = Countdown::with_clock(config, Rc::new(clock.clone())).unwrap();
    countdown.mount();

    let props = countdown.render_props();
    assert_eq!(props.time_delta.total, 90_110_000);
    assert_eq!(props.formatted.to_string(), "01:01:01:50");
    assert_eq!(props.api, countdown.api());
    assert!(!props.config.auto_start);
}
