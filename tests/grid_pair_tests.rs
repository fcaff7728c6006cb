//! Grid-Pair Locator properties: ordering, the >=2 precondition, and
//! re-verification after the underlying controls go away.

use spread_driver::errors::DriverError;
use spread_driver::geometry::Rect;
use spread_driver::grid_pair::{locate_grid_pair, verify};
use spread_driver::system::sim::SimSystem;
use spread_driver::{ClassPattern, HandleId};

fn grid_class() -> ClassPattern {
    ClassPattern::Prefix("fpSpread".to_string())
}

fn dialog() -> (SimSystem, HandleId) {
    let sim = SimSystem::new();
    let window = sim.add_window(
        "연말정산 - 소득자료",
        "MainFrame",
        Rect::from_bounds(0, 0, 1024, 768),
    );
    (sim, window)
}

#[test]
fn pair_is_ordered_by_left_edge_not_discovery_order() {
    let (sim, window) = dialog();
    // detail grid discovered first
    let detail = sim.add_child(window, "fpSpread70", "", Rect::from_bounds(400, 40, 1000, 700));
    let source = sim.add_child(window, "fpSpread70", "", Rect::from_bounds(100, 40, 390, 700));

    let pair = locate_grid_pair(&sim, window, &grid_class()).unwrap();
    assert_eq!(pair.source.handle, source);
    assert_eq!(pair.detail.handle, detail);
    assert_eq!(pair.source.rect.left, 100);
    assert_eq!(pair.detail.rect.left, 400);
}

#[test]
fn zero_grids_is_insufficient() {
    let (sim, window) = dialog();
    let err = locate_grid_pair(&sim, window, &grid_class()).unwrap_err();
    match err {
        DriverError::InsufficientGrids { found, need } => {
            assert_eq!(found, 0);
            assert_eq!(need, 2);
        }
        other => panic!("expected InsufficientGrids, got {:?}", other),
    }
}

#[test]
fn single_grid_is_insufficient_and_message_names_precondition() {
    let (sim, window) = dialog();
    sim.add_child(window, "fpSpread70", "", Rect::from_bounds(100, 40, 900, 700));
    let err = locate_grid_pair(&sim, window, &grid_class()).unwrap_err();
    assert!(matches!(
        err,
        DriverError::InsufficientGrids { found: 1, need: 2 }
    ));
    assert!(err.to_string().contains("select the tab"));
}

#[test]
fn extra_grids_take_the_horizontal_extremes() {
    let (sim, window) = dialog();
    sim.add_child(window, "fpSpread70", "", Rect::from_bounds(250, 40, 380, 700));
    sim.add_child(window, "fpSpread70", "", Rect::from_bounds(400, 40, 1000, 700));
    sim.add_child(window, "fpSpread70", "", Rect::from_bounds(100, 40, 240, 700));

    let pair = locate_grid_pair(&sim, window, &grid_class()).unwrap();
    assert_eq!(pair.source.rect.left, 100);
    assert_eq!(pair.detail.rect.left, 400);
}

#[test]
fn unreadable_grid_is_skipped_not_fatal() {
    let (sim, window) = dialog();
    sim.add_child(window, "fpSpread70", "", Rect::from_bounds(100, 40, 390, 700));
    let dying = sim.add_child(window, "fpSpread70", "", Rect::from_bounds(400, 40, 1000, 700));
    sim.make_unreadable(dying);

    let err = locate_grid_pair(&sim, window, &grid_class()).unwrap_err();
    assert!(matches!(
        err,
        DriverError::InsufficientGrids { found: 1, need: 2 }
    ));
}

#[test]
fn nested_grids_are_not_siblings_and_do_not_count() {
    let (sim, window) = dialog();
    sim.add_child(window, "fpSpread70", "", Rect::from_bounds(100, 40, 390, 700));
    let panel = sim.add_child(window, "Panel", "", Rect::from_bounds(400, 40, 1000, 700));
    sim.add_child(panel, "fpSpread70", "", Rect::from_bounds(410, 50, 990, 690));

    assert!(matches!(
        locate_grid_pair(&sim, window, &grid_class()),
        Err(DriverError::InsufficientGrids { found: 1, .. })
    ));
}

#[test]
fn verify_passes_while_pair_is_live() {
    let (sim, window) = dialog();
    sim.add_child(window, "fpSpread70", "", Rect::from_bounds(100, 40, 390, 700));
    sim.add_child(window, "fpSpread70", "", Rect::from_bounds(400, 40, 1000, 700));

    let pair = locate_grid_pair(&sim, window, &grid_class()).unwrap();
    verify(&sim, window, &grid_class(), &pair).unwrap();
}

#[test]
fn verify_fails_after_controls_are_destroyed() {
    let (sim, window) = dialog();
    let a = sim.add_child(window, "fpSpread70", "", Rect::from_bounds(100, 40, 390, 700));
    let b = sim.add_child(window, "fpSpread70", "", Rect::from_bounds(400, 40, 1000, 700));

    let pair = locate_grid_pair(&sim, window, &grid_class()).unwrap();
    // tab switched away: the grids are gone, the pair is stale
    sim.remove_window(a);
    sim.remove_window(b);

    let err = verify(&sim, window, &grid_class(), &pair).unwrap_err();
    assert!(matches!(
        err,
        DriverError::InsufficientGrids { found: 0, need: 2 }
    ));
}
