use std::{thread, time::Duration};

use matcap_scene::flow::FrameClock;

#[test]
fn restart_drops_the_time_spent_before_the_first_frame() {
    let mut clock = FrameClock::new();
    thread::sleep(Duration::from_millis(50));
    clock.restart();
    assert!(clock.advance() < Duration::from_millis(50));
}

#[test]
fn advance_measures_the_time_between_frames() {
    let mut clock = FrameClock::new();
    clock.advance();
    thread::sleep(Duration::from_millis(20));
    assert!(clock.advance() >= Duration::from_millis(20));
}

#[test]
fn ticks_fire_once_per_period() {
    let mut clock = FrameClock::new();
    let period = Duration::from_millis(20);
    assert!(!clock.take_tick(period));
    thread::sleep(period);
    clock.advance();
    assert!(clock.take_tick(period));
    // the tick timer starts over
    assert!(!clock.take_tick(period));
}
