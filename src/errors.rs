use log::warn;
use std::fmt;

use crate::HandleId;

/// Error types for driver operations
///
/// Every message names the UI precondition the caller has to fix, not just
/// the OS-level symptom.
#[derive(Debug, Clone)]
pub enum DriverError {
    /// A window or control could not be resolved
    NotFound { what: String, hint: String },
    /// Multiple top-level windows matched and no class hint was supplied
    AmbiguousMatch {
        title_substring: String,
        candidates: Vec<String>,
    },
    /// The OS rejected an operation on a stale handle
    InvalidHandle {
        handle: HandleId,
        operation: &'static str,
    },
    /// The master/detail grid pair precondition is violated
    InsufficientGrids { found: usize, need: usize },
    /// An action was delivered but its outcome could not be confirmed
    VerificationFailed { action: String, detail: String },
    /// Rejected configuration values
    Config(String),
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriverError::NotFound { what, hint } => {
                write!(f, "{} not found - {}", what, hint)
            }
            DriverError::AmbiguousMatch {
                title_substring,
                candidates,
            } => {
                write!(
                    f,
                    "{} visible windows match title '{}' - supply a class hint or a longer substring (candidates: {})",
                    candidates.len(),
                    title_substring,
                    candidates.join(", ")
                )
            }
            DriverError::InvalidHandle { handle, operation } => {
                write!(
                    f,
                    "handle 0x{:X} was rejected by the OS during {} - the control no longer exists, re-resolve from the main window",
                    handle, operation
                )
            }
            DriverError::InsufficientGrids { found, need } => {
                write!(
                    f,
                    "grid count {}, need >={} - select the tab that shows the master/detail spread pair first",
                    found, need
                )
            }
            DriverError::VerificationFailed { action, detail } => {
                write!(f, "{} was sent but could not be confirmed: {}", action, detail)
            }
            DriverError::Config(msg) => write!(f, "configuration error: {}", msg),
        }
    }
}

impl std::error::Error for DriverError {}

/// Result type alias for driver operations
pub type DriverResult<T> = Result<T, DriverError>;

/// Retry configuration for window lookup
#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub backoff_multiplier: f32,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 200,
            backoff_multiplier: 2.0,
        }
    }
}

/// Retry an operation with exponential backoff
pub fn retry_with_backoff<T, E, F>(mut operation: F, config: &RetryConfig) -> Result<T, E>
where
    F: FnMut() -> Result<T, E>,
    E: fmt::Debug,
{
    let mut last_error = None;

    for attempt in 1..=config.max_attempts.max(1) {
        match operation() {
            Ok(result) => return Ok(result),
            Err(error) => {
                warn!(
                    "operation failed on attempt {}/{}: {:?}",
                    attempt, config.max_attempts, error
                );
                last_error = Some(error);

                if attempt < config.max_attempts {
                    let delay_ms = (config.base_delay_ms as f32
                        * config.backoff_multiplier.powi((attempt - 1) as i32))
                        as u64;
                    std::thread::sleep(std::time::Duration::from_millis(delay_ms));
                }
            }
        }
    }

    Err(last_error.unwrap())
}
