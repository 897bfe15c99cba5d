//! Tests for the pattern timer module.

use super::*;
use crate::error::TimerError;
use crate::types::time::{seconds, time};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

type Log = Rc<RefCell<Vec<Step>>>;

fn recording(config: TimerConfig) -> (PatternTimer<ManualTickSource, impl FnMut(&mut Step)>, Log) {
    let log: Log = Rc::default();
    let sink = log.clone();
    let timer = PatternTimer::new(config, ManualTickSource::new(), move |step: &mut Step| {
        sink.borrow_mut().push(step.clone());
    })
    .unwrap();
    (timer, log)
}

fn elapsed(log: &Log) -> Vec<f64> {
    log.borrow().iter().map(|s| s.elapsed).collect()
}

fn indices(log: &Log) -> Vec<usize> {
    log.borrow().iter().map(|s| s.index).collect()
}

#[test]
fn test_new_timer_is_stopped() {
    let (timer, log) = recording(TimerConfig::new(vec![1, 2, 3]));
    assert!(!timer.is_running());
    assert_eq!(timer.poll_interval(), Some(seconds(1)));
    assert_eq!(timer.time(), 0.0);
    assert!(log.borrow().is_empty());
}

#[test]
fn test_new_rejects_zero_time_scale() {
    let result = PatternTimer::new(
        TimerConfig::new(vec![1]).with_time_scale(0),
        ManualTickSource::new(),
        |_: &mut Step| {},
    );
    assert_eq!(result.err(), Some(TimerError::ZeroTimeScale));
}

#[test]
fn test_step_reports_value_and_duration() {
    let (mut timer, log) = recording(TimerConfig::new(vec![3, 6]).with_time_scale(3));
    timer.start();
    timer.advance(seconds(1));

    let steps = log.borrow();
    assert_eq!(steps.len(), 1);
    assert_eq!(steps[0].index, 0);
    assert_eq!(steps[0].value, 3);
    assert_eq!(steps[0].duration, 1.0);
    assert_eq!(steps[0].elapsed_time(), seconds(1));
}

#[test]
fn test_restart_keeps_progress() {
    let (mut timer, log) = recording(TimerConfig::new(vec![1, 2, 3]));
    timer.start();
    timer.advance(seconds(1));
    let first = timer.active_handle();

    timer.start();
    assert_ne!(timer.active_handle(), first);
    assert_eq!(timer.source().active_count(), 1);

    timer.advance(seconds(2));
    assert_eq!(elapsed(&log), vec![1.0, 3.0]);
    assert_eq!(indices(&log), vec![0, 1]);
}

#[test]
fn test_stale_tick_is_ignored() {
    let (mut timer, log) = recording(TimerConfig::new(vec![1]).with_rule(PatternRule::RepeatAll));
    timer.start();
    let old = timer.active_handle().unwrap();
    timer.start();

    timer.tick(old);
    assert_eq!(timer.elapsed(), seconds(0));
    assert!(log.borrow().is_empty());

    timer.tick(timer.active_handle().unwrap());
    assert_eq!(elapsed(&log), vec![1.0]);
}

#[test]
fn test_tick_after_stop_is_ignored() {
    let (mut timer, log) = recording(TimerConfig::new(vec![1]).with_rule(PatternRule::RepeatAll));
    timer.start();
    let handle = timer.active_handle().unwrap();
    timer.stop();

    timer.tick(handle);
    assert!(log.borrow().is_empty());
    assert_eq!(timer.time(), 0.0);
}

#[test]
fn test_stop_is_idempotent() {
    let (mut timer, _log) = recording(TimerConfig::new(vec![1, 2]));
    timer.start();
    timer.stop();
    timer.stop();
    assert!(!timer.is_running());
    assert_eq!(timer.source().active_count(), 0);
}

#[test]
fn test_handler_can_stop_timer() {
    let count = Rc::new(Cell::new(0));
    let seen = count.clone();
    let mut timer = PatternTimer::new(
        TimerConfig::new(vec![1]).with_rule(PatternRule::RepeatAll),
        ManualTickSource::new(),
        move |step: &mut Step| {
            seen.set(seen.get() + 1);
            if seen.get() == 3 {
                step.stop();
            }
        },
    )
    .unwrap();

    timer.start();
    timer.advance(seconds(10));

    assert_eq!(count.get(), 3);
    assert!(!timer.is_running());
    assert_eq!(timer.time(), 0.0);
    assert_eq!(timer.pattern_index(), 0);
}

#[test]
fn test_handler_can_rewind_timer() {
    let log: Log = Rc::default();
    let sink = log.clone();
    let mut timer = PatternTimer::new(
        TimerConfig::new(vec![1, 1]).with_rule(PatternRule::RepeatAll),
        ManualTickSource::new(),
        move |step: &mut Step| {
            sink.borrow_mut().push(step.clone());
            if step.index == 1 {
                step.rewind();
            }
        },
    )
    .unwrap();

    timer.start();
    timer.advance(seconds(4));

    assert_eq!(elapsed(&log), vec![1.0, 2.0, 1.0, 2.0]);
    assert!(timer.is_running());
}

#[test]
fn test_stop_wins_over_rewind() {
    let mut step = Step::new(seconds(1), 0, 1, seconds(1));
    step.stop();
    step.rewind();
    assert_eq!(step.control, StepControl::Stop);
}

#[test]
fn test_setup_stops_running_timer() {
    let (mut timer, _log) = recording(TimerConfig::new(vec![1, 2]).with_rule(PatternRule::RepeatAll));
    timer.start();
    timer.advance(seconds(2));
    assert!(timer.time() > 0.0);

    timer
        .setup(TimerConfig::new(vec![3, 9]).with_time_scale(6))
        .unwrap();
    assert!(!timer.is_running());
    assert_eq!(timer.time(), 0.0);
    assert_eq!(timer.poll_interval(), Some(time(1, 2)));
    assert_eq!(timer.pattern(), &[3, 9]);
    assert_eq!(timer.time_scale(), 6);
    assert_eq!(timer.rule(), PatternRule::Once);
    assert_eq!(timer.source().active_count(), 0);
}

#[test]
fn test_rejected_setup_leaves_timer_untouched() {
    let (mut timer, _log) = recording(TimerConfig::new(vec![1, 2]).with_rule(PatternRule::RepeatAll));
    timer.start();
    timer.advance(seconds(1));

    let result = timer.setup(TimerConfig::new(vec![4]).with_time_scale(0));
    assert_eq!(result, Err(TimerError::ZeroTimeScale));
    assert!(timer.is_running());
    assert_eq!(timer.pattern(), &[1, 2]);
    assert_eq!(timer.time(), 1.0);
}

#[test]
fn test_setup_resets_ping_pong_direction() {
    let (mut timer, _log) = recording(TimerConfig::new(vec![1, 2]).with_rule(PatternRule::PingPong));
    timer.start();
    timer.advance(seconds(3));
    assert!(timer.is_reversed());

    timer
        .setup(TimerConfig::new(vec![1, 2]).with_rule(PatternRule::PingPong))
        .unwrap();
    assert!(!timer.is_reversed());
    assert_eq!(timer.playback_pattern(), vec![1, 2]);
}

#[test]
fn test_stop_keeps_ping_pong_direction() {
    let (mut timer, log) = recording(TimerConfig::new(vec![1, 2]).with_rule(PatternRule::PingPong));
    timer.start();
    timer.advance(seconds(3));
    timer.stop();

    assert!(timer.is_reversed());
    timer.start();
    timer.advance(seconds(2));
    // Resumes on the reversed pattern: index 1 (two seconds) first
    assert_eq!(indices(&log), vec![0, 1, 1]);
}

#[test]
fn test_zero_length_steps_fire_one_per_tick() {
    let (mut timer, log) = recording(TimerConfig::new(vec![0, 0, 1]));
    timer.start();
    timer.advance(seconds(5));

    // All three steps are satisfiable on the first tick, but only one fires per tick
    assert_eq!(elapsed(&log), vec![1.0, 2.0, 3.0]);
    assert_eq!(indices(&log), vec![0, 1, 2]);
    assert!(!timer.is_running());
}

#[test]
fn test_all_zero_pattern_is_inert() {
    let (mut timer, log) = recording(TimerConfig::new(vec![0, 0]));
    assert_eq!(timer.poll_interval(), None);
    timer.start();
    assert!(!timer.is_running());
    assert_eq!(timer.advance(seconds(10)), 0);
    assert!(log.borrow().is_empty());
}

#[test]
fn test_repeat_last_zero_behaves_like_once() {
    let (mut timer, log) = recording(TimerConfig::new(vec![1, 1]).with_rule(PatternRule::RepeatLast(0)));
    timer.start();
    timer.advance(seconds(10));

    assert_eq!(indices(&log), vec![0, 1]);
    assert!(!timer.is_running());
}

#[test]
fn test_repeat_last_longer_than_pattern_repeats_all() {
    let (mut timer, log) = recording(TimerConfig::new(vec![1, 1]).with_rule(PatternRule::RepeatLast(5)));
    timer.start();
    timer.advance(seconds(5));

    assert_eq!(indices(&log), vec![0, 1, 0, 1, 0]);
}

#[test]
fn test_fractional_poll_interval_stays_exact() {
    let (mut timer, log) = recording(TimerConfig::new(vec![1, 2]).with_time_scale(10).with_rule(PatternRule::RepeatAll));
    timer.start();
    // 1000 ticks of 1/10s: 3/10s per cycle, two steps per cycle
    timer.advance(seconds(100));

    assert_eq!(timer.elapsed(), seconds(100));
    let steps = log.borrow();
    // 100s / 0.3s = 333 full cycles (666 steps) plus the first step of the next at 99.9+0.1
    assert_eq!(steps.len(), 667);
    assert_eq!(steps.last().unwrap().elapsed_time(), seconds(100));
    assert_eq!(steps.last().unwrap().index, 0);
}
