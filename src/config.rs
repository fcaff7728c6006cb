use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::errors::{DriverError, DriverResult, RetryConfig};
use crate::system::ClassPattern;

/// Comprehensive configuration for a driver session
///
/// Everything the resolution heuristics depend on lives here; the
/// algorithms themselves hard-code nothing about the target application.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverConfig {
    pub window: WindowConfig,
    pub controls: ControlConfig,
    pub tabs: TabConfig,
    pub timing: TimingConfig,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            controls: ControlConfig::default(),
            tabs: TabConfig::default(),
            timing: TimingConfig::default(),
        }
    }
}

/// Main-window matching
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WindowConfig {
    /// Substring of the target's title bar text
    pub title_substring: String,
    /// Optional window class to disambiguate multiple matches
    pub class_hint: Option<String>,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title_substring: "연말정산".to_string(),
            class_hint: None,
        }
    }
}

/// Control classification patterns
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ControlConfig {
    /// Tab strip class; the suffix changes per process launch
    pub tab_strip_class: ClassPattern,
    /// Spread grid class
    pub grid_class: ClassPattern,
    /// Window class of the application's (often caption-less) dialogs
    pub dialog_class: String,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            tab_strip_class: ClassPattern::Prefix("Afx:TabWnd:".to_string()),
            grid_class: ClassPattern::Prefix("fpSpread".to_string()),
            dialog_class: "#32770".to_string(),
        }
    }
}

/// Logical tab layout of the main editing dialog
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TabConfig {
    /// Ordered logical tab names, left to right
    pub names: Vec<String>,
    /// Fixed assumed tab count; the strip exposes no count of its own
    pub assumed_count: usize,
    /// Estimated height of the tab row in pixels
    pub row_height_px: i32,
}

impl Default for TabConfig {
    fn default() -> Self {
        Self {
            names: vec![
                "사원정보".to_string(),
                "부양가족정보".to_string(),
                "소득자료".to_string(),
                "정산결과".to_string(),
            ],
            assumed_count: 4,
            row_height_px: 28,
        }
    }
}

/// Waits and retries
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Settle wait after injected input (ms); bounded at one second
    pub settle_ms: u64,
    /// Window lookup retry attempts
    pub lookup_attempts: u32,
    /// Base delay between lookup attempts (ms)
    pub lookup_base_delay_ms: u64,
    /// Backoff multiplier between lookup attempts
    pub lookup_backoff_multiplier: f32,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            settle_ms: 400,
            lookup_attempts: 3,
            lookup_base_delay_ms: 200,
            lookup_backoff_multiplier: 2.0,
        }
    }
}

impl DriverConfig {
    /// Load configuration from file
    pub fn load_from_file(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = std::fs::read_to_string(path)?;
        let config: DriverConfig = serde_json::from_str(&contents)?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save_to_file(&self, path: &str) -> Result<(), Box<dyn std::error::Error>> {
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Load configuration from environment variables with fallback to defaults
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(title) = std::env::var("SPREAD_TITLE") {
            config.window.title_substring = title;
        }
        if let Ok(class) = std::env::var("SPREAD_CLASS_HINT") {
            config.window.class_hint = Some(class);
        }

        if let Ok(prefix) = std::env::var("SPREAD_TAB_STRIP_PREFIX") {
            config.controls.tab_strip_class = ClassPattern::Prefix(prefix);
        }
        if let Ok(prefix) = std::env::var("SPREAD_GRID_PREFIX") {
            config.controls.grid_class = ClassPattern::Prefix(prefix);
        }

        if let Ok(names) = std::env::var("SPREAD_TAB_NAMES") {
            let names: Vec<String> = names
                .split(',')
                .map(|name| name.trim().to_string())
                .filter(|name| !name.is_empty())
                .collect();
            if !names.is_empty() {
                config.tabs.names = names;
            }
        }
        if let Ok(count) = std::env::var("SPREAD_TAB_COUNT") {
            if let Ok(count) = count.parse::<usize>() {
                config.tabs.assumed_count = count;
            }
        }

        if let Ok(settle) = std::env::var("SPREAD_SETTLE_MS") {
            if let Ok(settle) = settle.parse::<u64>() {
                config.timing.settle_ms = settle;
            }
        }

        config
    }

    /// Get the settle wait as Duration
    pub fn settle_wait(&self) -> Duration {
        Duration::from_millis(self.timing.settle_ms)
    }

    /// Lookup retry policy as a RetryConfig
    pub fn lookup_retry(&self) -> RetryConfig {
        RetryConfig {
            max_attempts: self.timing.lookup_attempts,
            base_delay_ms: self.timing.lookup_base_delay_ms,
            backoff_multiplier: self.timing.lookup_backoff_multiplier,
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> DriverResult<()> {
        if self.window.title_substring.is_empty() {
            return Err(DriverError::Config(
                "window title substring must not be empty".to_string(),
            ));
        }
        self.controls
            .tab_strip_class
            .validate()
            .map_err(|msg| DriverError::Config(format!("tab strip class: {}", msg)))?;
        self.controls
            .grid_class
            .validate()
            .map_err(|msg| DriverError::Config(format!("grid class: {}", msg)))?;
        if self.controls.dialog_class.is_empty() {
            return Err(DriverError::Config(
                "dialog class must not be empty".to_string(),
            ));
        }
        if self.tabs.names.is_empty() {
            return Err(DriverError::Config("tab name list is empty".to_string()));
        }
        for (i, name) in self.tabs.names.iter().enumerate() {
            if self.tabs.names[..i].contains(name) {
                return Err(DriverError::Config(format!("duplicate tab name '{}'", name)));
            }
        }
        if self.tabs.assumed_count < self.tabs.names.len() {
            return Err(DriverError::Config(format!(
                "assumed tab count {} is less than the {} configured names",
                self.tabs.assumed_count,
                self.tabs.names.len()
            )));
        }
        if self.tabs.row_height_px <= 0 {
            return Err(DriverError::Config(
                "tab row height must be positive".to_string(),
            ));
        }
        if self.timing.settle_ms == 0 || self.timing.settle_ms > 1000 {
            return Err(DriverError::Config(format!(
                "settle wait {}ms outside 1..=1000",
                self.timing.settle_ms
            )));
        }
        if self.timing.lookup_attempts == 0 {
            return Err(DriverError::Config(
                "lookup attempts must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
