//! Window Locator behavior against a synthetic desktop.

use spread_driver::errors::DriverError;
use spread_driver::geometry::Rect;
use spread_driver::locator::{find_anonymous_dialog, find_main_window, fingerprint_dialog};
use spread_driver::system::sim::SimSystem;
use spread_driver::WindowSystem;

fn desktop() -> SimSystem {
    let sim = SimSystem::new();
    sim.add_window("메모장", "Notepad", Rect::from_bounds(0, 0, 640, 480));
    sim.add_window(
        "연말정산 프로그램 v7.2",
        "MainFrame",
        Rect::from_bounds(100, 100, 1124, 868),
    );
    sim
}

#[test]
fn find_main_window_is_idempotent() {
    let sim = desktop();
    let first = find_main_window(&sim, "연말정산", None).unwrap();
    let second = find_main_window(&sim, "연말정산", None).unwrap();
    assert_eq!(first, second);
    assert_eq!(sim.class_name(first), "MainFrame");
}

#[test]
fn missing_window_is_not_found() {
    let sim = desktop();
    let err = find_main_window(&sim, "급여대장", None).unwrap_err();
    match err {
        DriverError::NotFound { what, .. } => assert!(what.contains("급여대장")),
        other => panic!("expected NotFound, got {:?}", other),
    }
}

#[test]
fn invisible_windows_are_ignored() {
    let sim = SimSystem::new();
    let hidden = sim.add_window("연말정산 (백그라운드)", "MainFrame", Rect::from_bounds(0, 0, 10, 10));
    sim.set_visible(hidden, false);
    assert!(find_main_window(&sim, "연말정산", None).is_err());
}

#[test]
fn multiple_matches_without_hint_are_ambiguous() {
    let sim = desktop();
    sim.add_window(
        "연말정산 결과 보고서",
        "ReportFrame",
        Rect::from_bounds(0, 0, 800, 600),
    );
    let err = find_main_window(&sim, "연말정산", None).unwrap_err();
    match err {
        DriverError::AmbiguousMatch { candidates, .. } => {
            assert_eq!(candidates.len(), 2);
        }
        other => panic!("expected AmbiguousMatch, got {:?}", other),
    }
}

#[test]
fn class_hint_disambiguates() {
    let sim = desktop();
    sim.add_window(
        "연말정산 결과 보고서",
        "ReportFrame",
        Rect::from_bounds(0, 0, 800, 600),
    );
    let handle = find_main_window(&sim, "연말정산", Some("ReportFrame")).unwrap();
    assert_eq!(sim.class_name(handle), "ReportFrame");
}

#[test]
fn anonymous_dialog_found_by_child_marker() {
    let sim = SimSystem::new();
    let main = sim.add_window_for_process(
        "연말정산 프로그램",
        "MainFrame",
        Rect::from_bounds(0, 0, 1024, 768),
        500,
    );
    // two caption-less dialogs in the same process, told apart only by
    // what their children say
    let lookup = sim.add_window_for_process("", "#32770", Rect::from_bounds(200, 200, 600, 500), 500);
    sim.add_child(lookup, "Static", "사원 검색", Rect::from_bounds(10, 10, 200, 30));
    let dependents =
        sim.add_window_for_process("", "#32770", Rect::from_bounds(220, 220, 620, 520), 500);
    sim.add_child(dependents, "Static", "부양가족 명단", Rect::from_bounds(10, 10, 200, 30));
    // a dialog with the marker in a *foreign* process must not match
    let foreign = sim.add_window_for_process("", "#32770", Rect::from_bounds(0, 0, 300, 200), 777);
    sim.add_child(foreign, "Static", "부양가족", Rect::from_bounds(5, 5, 100, 25));

    let found = find_anonymous_dialog(&sim, main, "#32770", "부양가족").unwrap();
    assert_eq!(found, dependents);
}

#[test]
fn marker_in_grandchildren_does_not_count() {
    let sim = SimSystem::new();
    let main =
        sim.add_window_for_process("연말정산", "MainFrame", Rect::from_bounds(0, 0, 800, 600), 500);
    let dialog = sim.add_window_for_process("", "#32770", Rect::from_bounds(0, 0, 400, 300), 500);
    let panel = sim.add_child(dialog, "Panel", "", Rect::from_bounds(0, 0, 400, 300));
    sim.add_child(panel, "Static", "부양가족 명단", Rect::from_bounds(10, 10, 100, 30));

    let err = find_anonymous_dialog(&sim, main, "#32770", "부양가족").unwrap_err();
    assert!(matches!(err, DriverError::NotFound { .. }));
}

#[test]
fn fingerprint_is_pure_over_candidate_list() {
    let sim = SimSystem::new();
    let a = sim.add_window("", "#32770", Rect::from_bounds(0, 0, 100, 100));
    sim.add_child(a, "Static", "기타", Rect::from_bounds(0, 0, 50, 20));
    let b = sim.add_window("", "#32770", Rect::from_bounds(0, 0, 100, 100));
    sim.add_child(b, "Static", "소득공제 입력", Rect::from_bounds(0, 0, 50, 20));

    assert_eq!(fingerprint_dialog(&sim, &[a, b], "소득공제"), Some(b));
    assert_eq!(fingerprint_dialog(&sim, &[a], "소득공제"), None);
    assert_eq!(fingerprint_dialog(&sim, &[], "소득공제"), None);
}
