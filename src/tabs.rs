// Tab Navigator: maps a logical tab name to a click point inside the tab
// strip, injects the click, and confirms the switch by looking for the
// controls the tab is supposed to own. One keyboard-chord retry before
// giving up.

use std::time::Duration;

use log::{info, warn};

use crate::config::DriverConfig;
use crate::errors::{DriverError, DriverResult};
use crate::geometry::Rect;
use crate::input::{self, vk};
use crate::resolver;
use crate::system::{ClassPattern, WindowSystem};
use crate::HandleId;

/// Navigator state after the most recent selection attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TabState {
    Unknown,
    Selecting(String),
    Selected(String),
    Failed(String),
}

/// Maps a tab index to a client-relative click point within the strip.
///
/// A strategy object so the geometry heuristic can be swapped (e.g. for an
/// accessibility-metrics variant) without touching the state machine.
pub trait ClickStrategy {
    fn click_point(&self, strip_rect: &Rect, index: usize, tab_count: usize) -> (i32, i32);
}

/// Divides the strip evenly and aims for the center of the index'th slice.
///
/// Known approximation: real tab widths vary with label length, which this
/// strategy does not model. It has held up against the target application
/// but is not guaranteed-correct geometry.
pub struct UniformStrategy {
    pub row_height_px: i32,
}

impl ClickStrategy for UniformStrategy {
    fn click_point(&self, strip_rect: &Rect, index: usize, tab_count: usize) -> (i32, i32) {
        let count = tab_count.max(1) as f64;
        let tab_width = strip_rect.width() as f64 / count;
        let x = (tab_width * (index as f64 + 0.5)) as i32;
        let y = self.row_height_px / 2;
        (x.clamp(0, (strip_rect.width() - 1).max(0)), y.max(0))
    }
}

pub struct TabNavigator {
    tab_names: Vec<String>,
    assumed_count: usize,
    tab_strip_class: ClassPattern,
    grid_class: ClassPattern,
    settle: Duration,
    strategy: Box<dyn ClickStrategy>,
    state: TabState,
}

impl TabNavigator {
    pub fn from_config(config: &DriverConfig) -> Self {
        Self {
            tab_names: config.tabs.names.clone(),
            assumed_count: config.tabs.assumed_count,
            tab_strip_class: config.controls.tab_strip_class.clone(),
            grid_class: config.controls.grid_class.clone(),
            settle: config.settle_wait(),
            strategy: Box::new(UniformStrategy {
                row_height_px: config.tabs.row_height_px,
            }),
            state: TabState::Unknown,
        }
    }

    pub fn with_strategy(mut self, strategy: Box<dyn ClickStrategy>) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn state(&self) -> &TabState {
        &self.state
    }

    /// Select the named tab and verify the switch took effect.
    ///
    /// Selection is independent of history: every call re-resolves the strip
    /// and recomputes the click point from its current rectangle, so window
    /// moves and control recreation between calls do not matter.
    pub fn select_tab<S: WindowSystem>(
        &mut self,
        system: &S,
        window: HandleId,
        logical_name: &str,
    ) -> DriverResult<()> {
        self.state = TabState::Selecting(logical_name.to_string());
        match self.try_select(system, window, logical_name) {
            Ok(()) => {
                info!("tab '{}' selected", logical_name);
                self.state = TabState::Selected(logical_name.to_string());
                Ok(())
            }
            Err(err) => {
                self.state = TabState::Failed(logical_name.to_string());
                Err(err)
            }
        }
    }

    fn try_select<S: WindowSystem>(
        &self,
        system: &S,
        window: HandleId,
        logical_name: &str,
    ) -> DriverResult<()> {
        let index = self
            .tab_names
            .iter()
            .position(|name| name == logical_name)
            .ok_or_else(|| {
                DriverError::Config(format!(
                    "tab '{}' is not in the configured tab list ({})",
                    logical_name,
                    self.tab_names.join(", ")
                ))
            })?;

        let strip = resolver::resolve_tab_strip(system, window, &self.tab_strip_class)?;
        let (x, y) = self
            .strategy
            .click_point(&strip.rect, index, self.assumed_count);

        input::click_at(system, strip.handle, x, y)?;
        system.settle(self.settle);
        if self.tab_children_present(system, window) {
            return Ok(());
        }

        // Some builds of the target swallow synthetic clicks on the strip
        // but still honor keyboard navigation.
        warn!(
            "tab '{}' unconfirmed after click at ({}, {}), retrying with Ctrl+Tab",
            logical_name, x, y
        );
        input::send_key(system, strip.handle, vk::TAB, Some(vk::CONTROL))?;
        system.settle(self.settle);
        if self.tab_children_present(system, window) {
            return Ok(());
        }

        Err(DriverError::VerificationFailed {
            action: format!("select tab '{}'", logical_name),
            detail: "no tab-specific controls appeared after click and keyboard fallback"
                .to_string(),
        })
    }

    /// A switched-in tab announces itself through the controls it owns; at
    /// least one grid must be resolvable. The full pair-count precondition
    /// stays with the grid-pair locator - single-grid tabs are legitimate.
    fn tab_children_present<S: WindowSystem>(&self, system: &S, window: HandleId) -> bool {
        !resolver::resolve_grid_controls(system, window, &self.grid_class).is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uniform_offsets_stay_inside_strip() {
        let strategy = UniformStrategy { row_height_px: 28 };
        for &(width, count) in &[(400, 4usize), (397, 5), (1, 1), (120, 12), (800, 3)] {
            let strip = Rect::from_bounds(0, 0, width, 28);
            for index in 0..count {
                let (x, y) = strategy.click_point(&strip, index, count);
                assert!(x >= 0 && x < width, "x={} outside strip width {}", x, width);
                assert_eq!(y, 14);
            }
        }
    }

    #[test]
    fn uniform_targets_slice_centers() {
        let strategy = UniformStrategy { row_height_px: 28 };
        let strip = Rect::from_bounds(0, 0, 400, 28);
        assert_eq!(strategy.click_point(&strip, 0, 4), (50, 14));
        assert_eq!(strategy.click_point(&strip, 1, 4), (150, 14));
        assert_eq!(strategy.click_point(&strip, 3, 4), (350, 14));
    }

    #[test]
    fn offsets_use_strip_relative_coordinates() {
        // the strip's screen position must not leak into the client offset
        let strategy = UniformStrategy { row_height_px: 28 };
        let moved = Rect::from_bounds(500, 300, 900, 328);
        assert_eq!(strategy.click_point(&moved, 0, 4), (50, 14));
    }
}
