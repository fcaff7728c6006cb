// Session context: one window system + one configuration + the lazily
// resolved main-window handle. Replaces ambient globals; every operation
// takes its context from here and re-acquires on failure.

use log::warn;

use crate::capture::{capture_quiet, CaptureSink, NullCapture};
use crate::config::DriverConfig;
use crate::errors::{retry_with_backoff, DriverError, DriverResult};
use crate::grid_pair::{self, GridPair};
use crate::locator;
use crate::resolver;
use crate::system::WindowSystem;
use crate::tabs::{TabNavigator, TabState};
use crate::HandleId;

/// Stateful facade over the five components.
///
/// The only thing cached across calls is the main-window handle, and even
/// that is distrusted: it is validity-checked on every use and dropped the
/// moment any operation reports it stale, so the next call re-resolves from
/// scratch. Child-control identity is never cached at all.
pub struct DriverSession<S: WindowSystem> {
    system: S,
    config: DriverConfig,
    navigator: TabNavigator,
    capture: Box<dyn CaptureSink>,
    main_window: Option<HandleId>,
}

impl<S: WindowSystem> DriverSession<S> {
    pub fn new(system: S, config: DriverConfig) -> DriverResult<Self> {
        config.validate()?;
        let navigator = TabNavigator::from_config(&config);
        Ok(Self {
            system,
            config,
            navigator,
            capture: Box::new(NullCapture),
            main_window: None,
        })
    }

    /// Install a diagnostics sink; evidence is captured at failure points.
    pub fn with_capture_sink(mut self, sink: Box<dyn CaptureSink>) -> Self {
        self.capture = sink;
        self
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    pub fn system(&self) -> &S {
        &self.system
    }

    pub fn tab_state(&self) -> &TabState {
        self.navigator.state()
    }

    /// The target's main window, resolved on first use and after staleness.
    pub fn main_window(&mut self) -> DriverResult<HandleId> {
        if let Some(handle) = self.main_window {
            if self.system.is_window(handle) {
                return Ok(handle);
            }
            warn!("main window 0x{:X} went away, re-resolving", handle);
            self.main_window = None;
        }
        let retry = self.config.lookup_retry();
        let handle = retry_with_backoff(
            || {
                locator::find_main_window(
                    &self.system,
                    &self.config.window.title_substring,
                    self.config.window.class_hint.as_deref(),
                )
            },
            &retry,
        )?;
        self.main_window = Some(handle);
        Ok(handle)
    }

    pub fn select_tab(&mut self, logical_name: &str) -> DriverResult<()> {
        let window = self.main_window()?;
        let result = self.navigator.select_tab(&self.system, window, logical_name);
        if result.is_err() {
            capture_quiet(
                self.capture.as_ref(),
                &format!("tab_{}_failed.png", logical_name),
            );
        }
        self.drop_cache_if_stale(&result);
        result
    }

    pub fn grid_pair(&mut self) -> DriverResult<GridPair> {
        let window = self.main_window()?;
        let result =
            grid_pair::locate_grid_pair(&self.system, window, &self.config.controls.grid_class);
        if result.is_err() {
            capture_quiet(self.capture.as_ref(), "grid_pair_missing.png");
        }
        self.drop_cache_if_stale(&result);
        result
    }

    /// Must be called immediately before any read/write against `pair`.
    pub fn verify_pair(&mut self, pair: &GridPair) -> DriverResult<()> {
        let window = self.main_window()?;
        grid_pair::verify(&self.system, window, &self.config.controls.grid_class, pair)
    }

    /// Caption-less dialog of the target process, identified by marker text
    /// among its direct children.
    pub fn anonymous_dialog(&mut self, marker_text: &str) -> DriverResult<HandleId> {
        let window = self.main_window()?;
        let result = locator::find_anonymous_dialog(
            &self.system,
            window,
            &self.config.controls.dialog_class,
            marker_text,
        );
        self.drop_cache_if_stale(&result);
        result
    }

    /// Indented dump of the main window's control tree.
    pub fn dump_tree(&mut self) -> DriverResult<Vec<String>> {
        let window = self.main_window()?;
        Ok(resolver::dump_tree(&self.system, window))
    }

    fn drop_cache_if_stale<T>(&mut self, result: &DriverResult<T>) {
        if let Err(DriverError::InvalidHandle { .. }) = result {
            warn!("stale handle reported, next call re-resolves the main window");
            self.main_window = None;
        }
    }
}
