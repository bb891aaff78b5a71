//! 콘솔 명령 → 컨트롤러 통합 테스트.
//!
//! 명령 파싱부터 엔진 조작, 출력 텍스트까지 확인한다.

mod common;

use clearcount_app::command::Command;
use clearcount_app::controller::Controller;
use common::{test_config, wait_until, Harness, Scene};
use tempfile::TempDir;

fn run(controller: &mut Controller, line: &str) -> String {
    match line.parse::<Command>() {
        Ok(command) => controller.execute(command),
        Err(e) => e.to_string(),
    }
}

fn setup(handles: &[u32], slots: usize) -> (Harness, TempDir, Controller) {
    let h = Harness::new(handles);
    let dir = TempDir::new().unwrap();
    let controller = Controller::new(test_config(dir.path(), slots), h.ports());
    (h, dir, controller)
}

#[test]
fn start_status_stop() {
    let (_h, _dir, mut controller) = setup(&[1, 2], 2);

    assert_eq!(run(&mut controller, "start"), "Counter started.");
    assert!(controller.is_running());
    assert_eq!(run(&mut controller, "start"), "Counter already running.");

    let status = run(&mut controller, "status");
    assert!(status.contains("Counter running."));
    assert!(status.contains("Player 0 window: VLC #1 (clears 0, skips 0)"));
    assert!(status.contains("Player 1 window: VLC #2"));

    assert_eq!(run(&mut controller, "stop"), "Counter stopped.");
    assert_eq!(run(&mut controller, "stop"), "Counter not running.");
    assert!(run(&mut controller, "status").contains("Counter stopped."));
}

#[test]
fn start_without_windows_fails_cleanly() {
    let (h, _dir, mut controller) = setup(&[1], 2);

    assert_eq!(run(&mut controller, "start"), "Unable to start counter.");
    assert!(!controller.is_running());
    assert_eq!(controller.current_generation(), None);
    assert!(wait_until(|| !h.listener.faults().is_empty()));
}

#[test]
fn mutations_require_running_counter() {
    let (h, _dir, mut controller) = setup(&[1, 2], 2);

    assert_eq!(
        run(&mut controller, "set 0 3"),
        "Counter must be started before setting clears."
    );
    assert_eq!(
        run(&mut controller, "skip 0 3"),
        "Counter must be started before setting skips."
    );
    assert_eq!(
        run(&mut controller, "swap 0 1"),
        "Counter must be started before swapping windows."
    );
    assert_eq!(
        run(&mut controller, "refresh"),
        "Counter must be started before refreshing windows."
    );
    assert_eq!(h.store.value("player_0"), None);
}

#[test]
fn set_skip_swap_while_running() {
    let (h, _dir, mut controller) = setup(&[1, 2], 2);
    run(&mut controller, "start");

    assert_eq!(run(&mut controller, "set 1 10"), "Player 1 clears set to 10.");
    assert_eq!(run(&mut controller, "skip 0 2"), "Player 0 skips set to 2.");
    assert_eq!(run(&mut controller, "swap 0 1"), "Players 0 and 1 swapped.");

    assert_eq!(h.store.value("player_1"), Some(10));
    assert_eq!(h.store.value("skip_0"), Some(2));

    let status = run(&mut controller, "status");
    assert!(status.contains("Player 0 window: VLC #2 (clears 0, skips 2)"));
    assert!(status.contains("Player 1 window: VLC #1 (clears 10, skips 0)"));
}

#[test]
fn invalid_player_is_reported() {
    let (_h, _dir, mut controller) = setup(&[1, 2], 2);
    run(&mut controller, "start");

    assert_eq!(
        run(&mut controller, "set 5 10"),
        "Invalid player 5: expected 0..2."
    );
    assert_eq!(
        run(&mut controller, "swap 0 9"),
        "Invalid player 9: expected 0..2."
    );
    assert!(controller.is_running());
}

#[test]
fn parse_errors_do_not_touch_counter() {
    let (_h, _dir, mut controller) = setup(&[1, 2], 2);
    run(&mut controller, "start");

    assert_eq!(
        run(&mut controller, "set 0"),
        "Invalid arguments. Usage: set <player> <score>"
    );
    assert!(run(&mut controller, "jump").starts_with("Invalid input 'jump'"));
    assert!(controller.is_running());
}

#[test]
fn reset_starts_fresh_engine() {
    let (h, _dir, mut controller) = setup(&[1, 2], 2);
    run(&mut controller, "start");
    h.frames.show(1, Scene::Clear);
    assert!(wait_until(|| h.store.value("player_0") == Some(1)));
    let first = controller.current_generation();

    assert_eq!(run(&mut controller, "reset"), "Counter reset.");
    assert_ne!(controller.current_generation(), first);
    // 새 엔진은 0에서 다시 시작 (배너가 보이면 곧바로 다시 센다)
    let engine = controller.engine().unwrap();
    assert!(engine.score(0).unwrap() <= 1);
    assert_eq!(engine.skip_count(0).unwrap(), 0);
}

#[test]
fn reset_picks_up_config_changes() {
    let (_h, dir, mut controller) = setup(&[1, 2], 2);
    run(&mut controller, "start");
    assert_eq!(controller.engine().unwrap().slot_count(), 2);

    test_config(dir.path(), 1);
    assert_eq!(run(&mut controller, "reset"), "Counter reset.");
    assert_eq!(controller.engine().unwrap().slot_count(), 1);
}

#[test]
fn reset_without_windows_reports_failure() {
    let (h, _dir, mut controller) = setup(&[1, 2], 2);
    run(&mut controller, "start");

    h.discovery.set_handles(&[]);
    assert_eq!(run(&mut controller, "reset"), "Unable to reset counter.");
    assert!(!controller.is_running());
}

#[test]
fn refresh_rebinds_windows() {
    let (h, _dir, mut controller) = setup(&[1, 2], 2);
    run(&mut controller, "start");

    h.discovery.set_handles(&[1, 5]);
    assert_eq!(run(&mut controller, "refresh"), "Handles refreshed.");
    assert!(run(&mut controller, "status").contains("Player 1 window: VLC #5"));

    h.discovery.set_failing(true);
    assert_eq!(run(&mut controller, "refresh"), "Unable to refresh handles.");
}

#[test]
fn quit_stops_counter() {
    let (_h, _dir, mut controller) = setup(&[1, 2], 2);
    run(&mut controller, "start");

    assert!(!controller.should_quit());
    run(&mut controller, "quit");
    assert!(controller.should_quit());
    assert!(!controller.is_running());
    assert_eq!(controller.current_generation(), None);
}

#[test]
fn help_lists_commands() {
    let (_h, _dir, mut controller) = setup(&[1, 2], 2);
    let help = run(&mut controller, "help");
    for usage in ["start", "reset", "set <player> <score>", "swap <player> <player>"] {
        assert!(help.contains(usage), "{usage}");
    }
}
