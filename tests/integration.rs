//! Integration tests for Rig TestKit
//!
//! These tests drive the App the way the terminal front end does: raw input
//! goes through the event bus to the mounted tool, timers advance through
//! explicit ticks, and views are switched with host commands.

use rig_testkit::config::Config;
use rig_testkit::input::{KeyCode, KeyDisposition, MouseButton, RawInput};
use rig_testkit::tools::{
    ActivityState, ClickState, PrecisionState, ReactionState, TargetArea, TypingState,
    TARGET_COUNT,
};
use rig_testkit::ui::{App, AppView, Command};
use std::time::{Duration, Instant};
use tempfile::tempdir;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

fn key_down(code: u16) -> RawInput {
    RawInput::KeyDown {
        code: KeyCode(code),
        repeat: false,
    }
}

fn key_up(code: u16) -> RawInput {
    RawInput::KeyUp { code: KeyCode(code) }
}

fn click(x: i32) -> RawInput {
    RawInput::PointerDown {
        x,
        y: 0,
        button: MouseButton::Left,
    }
}

fn release(x: i32) -> RawInput {
    RawInput::PointerUp {
        x,
        y: 0,
        button: MouseButton::Left,
    }
}

fn app_at(base: Instant) -> App {
    App::new(Config::default(), base)
}

// ---------------------------------------------------------------------------
// Polling
// ---------------------------------------------------------------------------

#[test]
fn pointer_moves_drive_polling_rate() {
    let base = Instant::now();
    let mut app = app_at(base);
    assert_eq!(app.view, AppView::Polling);

    for i in 0..1000u64 {
        app.handle_input(RawInput::PointerMove { x: i as i32, y: 0 }, base + ms(i));
    }
    app.tick(base + ms(1000));

    let stats = app.polling_test.snapshot();
    assert_eq!(stats.current, 1000);
    assert_eq!(stats.max, 1000);
    assert_eq!(app.total_events, 1000);
    assert!(app.chart().is_some_and(|c| c.points.len() == 5));
}

#[test]
fn polling_goes_inactive_after_quiet_period() {
    let base = Instant::now();
    let mut app = app_at(base);
    app.handle_input(RawInput::PointerMove { x: 0, y: 0 }, base);
    app.tick(base + ms(4000));

    assert_eq!(app.polling_test.state(), ActivityState::Inactive);
    assert!(!app.polling_test.snapshot().is_active);
}

#[test]
fn keys_do_not_reach_pointer_only_tools() {
    let base = Instant::now();
    let mut app = app_at(base);

    let disposition = app.handle_input(key_down(30), base);
    assert_eq!(disposition, KeyDisposition::PassThrough);
    assert_eq!(app.total_events, 0);
}

#[test]
fn pause_command_stops_measurement() {
    let base = Instant::now();
    let mut app = app_at(base);
    app.handle_input(RawInput::PointerMove { x: 0, y: 0 }, base);
    app.execute(Command::TogglePause, base + ms(10));
    assert_eq!(app.polling_test.state(), ActivityState::Paused);

    app.execute(Command::TogglePause, base + ms(20));
    assert_eq!(app.polling_test.state(), ActivityState::Active);
}

#[test]
fn start_command_on_idle_polling_view_measures() {
    let base = Instant::now();
    let mut app = app_at(base);
    app.execute(Command::Start, base);
    assert_eq!(app.polling_test.state(), ActivityState::Active);

    for i in 1..=500u64 {
        app.handle_input(RawInput::PointerMove { x: i as i32, y: 0 }, base + ms(i * 2));
    }
    app.tick(base + ms(1000));

    assert_eq!(app.polling_test.state(), ActivityState::Active);
    assert_eq!(app.polling_test.snapshot().current, 500);
}

#[test]
fn start_command_pauses_an_active_run() {
    let base = Instant::now();
    let mut app = app_at(base);
    app.handle_input(RawInput::PointerMove { x: 0, y: 0 }, base);
    app.execute(Command::Start, base + ms(10));
    assert_eq!(app.polling_test.state(), ActivityState::Paused);
}

// ---------------------------------------------------------------------------
// View lifecycle
// ---------------------------------------------------------------------------

#[test]
fn exactly_one_subscription_while_cycling_views() {
    let base = Instant::now();
    let mut app = app_at(base);

    for step in 0..20u64 {
        app.execute(Command::NextView, base + ms(step));
        let expected = usize::from(app.view != AppView::Help);
        assert_eq!(app.subscriber_count(), expected);
    }
    for step in 0..7u64 {
        app.execute(Command::PrevView, base + ms(100 + step));
        assert!(app.subscriber_count() <= 1);
    }
}

#[test]
fn leaving_polling_view_resets_it() {
    let base = Instant::now();
    let mut app = app_at(base);
    for i in 0..100u64 {
        app.handle_input(RawInput::PointerMove { x: 0, y: 0 }, base + ms(i * 5));
    }
    app.tick(base + ms(600));
    assert!(app.polling_test.snapshot().max > 0);

    app.next_view(base + ms(700));
    assert_eq!(app.polling_test.state(), ActivityState::Idle);
    assert_eq!(app.polling_test.snapshot().max, 0);
}

// ---------------------------------------------------------------------------
// Click speed
// ---------------------------------------------------------------------------

#[test]
fn click_test_runs_through_app() {
    let base = Instant::now();
    let mut app = app_at(base);
    app.set_view(AppView::Clicks, base);

    for i in 0..50u64 {
        app.handle_input(click(0), base + ms(i * 200));
    }
    app.tick(base + ms(10_000));

    assert_eq!(app.click_test.state(), ClickState::Finished);
    assert_eq!(app.click_test.session().final_cps, Some(5.0));
    assert!(app.get_status().is_some_and(|s| s.starts_with("New Personal Best")));
}

#[test]
fn best_cps_survives_view_switch() {
    let base = Instant::now();
    let mut app = app_at(base);
    app.set_view(AppView::Clicks, base);
    for i in 0..30u64 {
        app.handle_input(click(0), base + ms(i * 300));
    }
    app.tick(base + ms(10_000));

    app.execute(Command::NextView, base + ms(11_000));
    app.execute(Command::PrevView, base + ms(12_000));

    assert_eq!(app.view, AppView::Clicks);
    assert_eq!(app.click_test.state(), ClickState::Idle);
    assert_eq!(app.click_test.session().click_count, 0);
    assert_eq!(app.click_test.best_cps(), 3.0);
}

// ---------------------------------------------------------------------------
// Reaction
// ---------------------------------------------------------------------------

#[test]
fn reaction_trial_through_app() {
    let base = Instant::now();
    let mut app = app_at(base);
    app.set_view(AppView::Reaction, base);
    app.execute(Command::Start, base);

    let shown = app
        .reaction_test
        .timer()
        .stimulus_deadline()
        .expect("stimulus scheduled");
    app.tick(shown);
    assert_eq!(
        app.reaction_test.timer().state(),
        ReactionState::Ready { stimulus_at: shown }
    );

    app.handle_input(click(0), shown + ms(215));
    let stats = app.reaction_test.timer().stats().expect("one trial");
    assert_eq!(stats.average_ms, 215.0);
    assert_eq!(app.reaction_test.series().len(), 1);
}

#[test]
fn early_click_is_rejected_with_notice() {
    let base = Instant::now();
    let mut app = app_at(base);
    app.set_view(AppView::Reaction, base);
    app.execute(Command::Start, base);

    app.handle_input(click(0), base + ms(5));
    assert!(app.reaction_test.timer().results().is_empty());
    assert!(!app.reaction_test.timer().is_active());
    assert!(app.get_status().is_some_and(|s| s.starts_with("Too early")));
}

#[test]
fn switching_views_cancels_pending_stimulus() {
    let base = Instant::now();
    let mut app = app_at(base);
    app.set_view(AppView::Reaction, base);
    app.execute(Command::Start, base);
    assert!(app.reaction_test.timer().is_active());

    app.set_view(AppView::Polling, base + ms(100));
    app.set_view(AppView::Reaction, base + ms(200));
    app.tick(base + ms(10_000));

    assert_eq!(app.reaction_test.timer().state(), ReactionState::Idle);
    assert!(app.reaction_test.timer().stimulus_deadline().is_none());
}

#[test]
fn space_in_reaction_view_is_suppressed() {
    let base = Instant::now();
    let mut app = app_at(base);
    app.set_view(AppView::Reaction, base);

    let disposition = app.handle_input(key_down(KeyCode::SPACE.as_u16()), base);
    assert_eq!(disposition, KeyDisposition::Suppress);
}

// ---------------------------------------------------------------------------
// Rollover
// ---------------------------------------------------------------------------

#[test]
fn rollover_scenario_through_app() {
    let base = Instant::now();
    let mut app = app_at(base);
    app.set_view(AppView::Rollover, base);

    // A, S, D held
    for (i, code) in [30, 31, 32].into_iter().enumerate() {
        app.handle_input(key_down(code), base + ms(i as u64));
    }
    assert_eq!(app.rollover_test.max_observed(), 3);

    // release S, press F
    app.handle_input(key_up(31), base + ms(10));
    app.handle_input(key_down(33), base + ms(11));
    assert_eq!(app.rollover_test.current_count(), 3);
    assert_eq!(app.rollover_test.max_observed(), 3);

    // press G
    app.handle_input(key_down(34), base + ms(12));
    assert_eq!(app.rollover_test.current_count(), 4);
    assert_eq!(app.rollover_test.max_observed(), 4);
}

#[test]
fn tab_is_captured_by_rollover_view() {
    let base = Instant::now();
    let mut app = app_at(base);
    app.set_view(AppView::Rollover, base);

    let disposition = app.handle_input(key_down(KeyCode::TAB.as_u16()), base);
    assert_eq!(disposition, KeyDisposition::Suppress);
    assert_eq!(app.rollover_test.current_pressed(), vec![KeyCode::TAB]);
}

#[test]
fn clear_keys_recovers_from_lost_release() {
    let base = Instant::now();
    let mut app = app_at(base);
    app.set_view(AppView::Rollover, base);
    app.handle_input(key_down(30), base);
    app.handle_input(key_down(31), base + ms(1));

    app.execute(Command::ClearKeys, base + ms(2));
    assert_eq!(app.rollover_test.current_count(), 0);
    assert_eq!(app.rollover_test.max_observed(), 2);
}

// ---------------------------------------------------------------------------
// Precision
// ---------------------------------------------------------------------------

#[test]
fn precision_run_through_app() {
    let base = Instant::now();
    let mut app = app_at(base);
    app.set_target_area(TargetArea::new(40, 2, 30, 12));
    app.set_view(AppView::Precision, base);
    app.execute(Command::Start, base);

    // Clicks on the tab bar are outside the field
    app.handle_input(click(0), base + ms(1));
    assert!(app.precision_test.hits().is_empty());

    for i in 0..TARGET_COUNT as u64 {
        let target = app.precision_test.current_target().expect("target shown");
        app.handle_input(
            RawInput::PointerDown {
                x: target.x,
                y: target.y,
                button: MouseButton::Left,
            },
            base + ms(300 * (i + 1)),
        );
    }

    assert_eq!(app.precision_test.state(), PrecisionState::Finished);
    let stats = app.precision_test.stats().expect("finished run");
    assert_eq!(stats.average_deviation, 0.0);
    assert_eq!(stats.duration_secs, 3.0);
    assert!(app.chart().is_some_and(|c| c.points.len() == TARGET_COUNT));
    assert!(app.get_status().is_some_and(|s| s.starts_with("Test Complete")));
}

// ---------------------------------------------------------------------------
// Typing
// ---------------------------------------------------------------------------

#[test]
fn typing_run_through_app() {
    let base = Instant::now();
    let mut app = app_at(base);
    app.set_view(AppView::Typing, base);
    assert!(app.target_editable());

    // Space reaches the prompt instead of being swallowed
    let space = app.handle_input(key_down(KeyCode::SPACE.as_u16()), base);
    assert_eq!(space, KeyDisposition::PassThrough);

    let prompt = app.typing_test.prompt();
    for (i, ch) in prompt.chars().enumerate() {
        app.handle_input(RawInput::Text { ch }, base + ms(i as u64 * 80));
    }

    assert_eq!(app.typing_test.state(), TypingState::Finished);
    assert_eq!(app.typing_test.stats().errors, 0);
    let report = app.generate_report(base + ms(10_000));
    assert_eq!(report.summary.typing_wpm, Some(app.typing_test.stats().wpm));
    assert!(!report.tests.typing.is_empty());
}

#[test]
fn text_input_does_not_reach_other_tools() {
    let base = Instant::now();
    let mut app = app_at(base);
    app.set_view(AppView::Rollover, base);
    app.handle_input(RawInput::Text { ch: 'a' }, base);
    assert_eq!(app.total_events, 0);
    assert_eq!(app.typing_test.state(), TypingState::Idle);
}

// ---------------------------------------------------------------------------
// DPI
// ---------------------------------------------------------------------------

#[test]
fn dpi_field_is_editable_and_measures() {
    let base = Instant::now();
    let mut app = app_at(base);
    app.set_view(AppView::Dpi, base);
    assert_eq!(app.dpi_test.distance_input(), "10");

    // Backspace twice, then type "5"
    let bksp = KeyCode::BACKSPACE.as_u16();
    assert_eq!(app.handle_input(key_down(bksp), base), KeyDisposition::PassThrough);
    app.handle_input(key_down(bksp), base + ms(1));
    app.handle_input(key_down(6), base + ms(2));
    assert_eq!(app.dpi_test.distance_input(), "5");

    app.handle_input(click(0), base + ms(10));
    app.handle_input(RawInput::PointerMove { x: 900, y: 0 }, base + ms(20));
    app.handle_input(release(1575), base + ms(30));
    assert_eq!(app.dpi_test.result(), Some(800));
}

#[test]
fn dpi_default_distance_comes_from_config() {
    let mut config = Config::default();
    config.dpi.default_distance_cm = 2.54;
    let app = App::new(config, Instant::now());
    assert_eq!(app.dpi_test.distance_input(), "2.54");
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

#[test]
fn export_report_writes_summary() {
    let base = Instant::now();
    let mut app = app_at(base);
    app.set_view(AppView::Clicks, base);
    for i in 0..40u64 {
        app.handle_input(click(0), base + ms(i * 100));
    }
    app.tick(base + ms(10_000));

    let dir = tempdir().unwrap();
    let path = dir.path().join("report.json");
    let msg = app
        .export_report(path.to_str().unwrap(), base + ms(10_500))
        .unwrap();
    assert!(msg.starts_with("Exported to"));

    let text = std::fs::read_to_string(&path).unwrap();
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(value["summary"]["best_cps"], 4.0);
    assert_eq!(value["summary"]["total_events"], 40);
    assert_eq!(value["metadata"]["duration_secs"], 10.5);
    assert!(value["tests"]["clicks"].as_array().is_some_and(|rows| !rows.is_empty()));
}

#[test]
fn quit_command_sets_quitting() {
    let base = Instant::now();
    let mut app = app_at(base);
    app.execute(Command::Quit, base);
    assert_eq!(app.state, rig_testkit::ui::AppState::Quitting);
}
