// The seam between the resolution logic and the OS. Everything above this
// trait is portable; `win32` talks to a live process and `sim` serves a
// synthetic tree for tests and offline development.

pub mod sim;
#[cfg(windows)]
pub mod win32;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;
use std::time::Duration;

use crate::errors::DriverResult;
use crate::geometry::Rect;
use crate::HandleId;

/// Snapshot of one control taken during a tree walk. Transient by design:
/// the handle inside it is only trusted until the next top-level operation.
#[derive(Debug, Clone)]
pub struct ControlDescriptor {
    pub handle: HandleId,
    pub class_name: String,
    pub text: String,
    pub rect: Rect,
    /// 1 for direct children of the walked window
    pub depth: u32,
}

impl fmt::Display for ControlDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "0x{:X} '{}' \"{}\" {:?}",
            self.handle, self.class_name, self.text, self.rect
        )
    }
}

/// How a declared class name is matched during resolution.
///
/// The target application registers classes with a per-launch numeric suffix,
/// so `Prefix` is the workhorse here; `Exact` never matches those.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum ClassPattern {
    Exact(String),
    Prefix(String),
    Regex(String),
}

static COMPILED_PATTERNS: Lazy<Mutex<HashMap<String, Regex>>> =
    Lazy::new(|| Mutex::new(HashMap::new()));

fn compiled(source: &str) -> Option<Regex> {
    let mut cache = COMPILED_PATTERNS.lock().ok()?;
    if let Some(re) = cache.get(source) {
        return Some(re.clone());
    }
    match Regex::new(source) {
        Ok(re) => {
            cache.insert(source.to_string(), re.clone());
            Some(re)
        }
        Err(err) => {
            log::warn!("invalid class-name regex '{}': {}", source, err);
            None
        }
    }
}

impl ClassPattern {
    pub fn matches(&self, class_name: &str) -> bool {
        match self {
            ClassPattern::Exact(want) => class_name == want,
            ClassPattern::Prefix(prefix) => class_name.starts_with(prefix.as_str()),
            ClassPattern::Regex(source) => match compiled(source) {
                Some(re) => re.is_match(class_name),
                None => false,
            },
        }
    }

    /// Reject patterns that can never match anything.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            ClassPattern::Exact(value) | ClassPattern::Prefix(value) => {
                if value.is_empty() {
                    Err("empty class pattern".to_string())
                } else {
                    Ok(())
                }
            }
            ClassPattern::Regex(source) => Regex::new(source)
                .map(|_| ())
                .map_err(|err| format!("bad regex '{}': {}", source, err)),
        }
    }
}

/// Read-only queries and input injection against one window hierarchy.
///
/// All methods take `&self`: the OS side is inherently shared mutable state
/// owned by another process, and the sim backend uses interior mutability.
pub trait WindowSystem {
    /// Every top-level window currently known to the OS, visible or not.
    fn top_level_windows(&self) -> Vec<HandleId>;

    /// Direct children of `parent` in z-order. Empty for unknown handles.
    fn child_windows(&self, parent: HandleId) -> Vec<HandleId>;

    fn window_text(&self, handle: HandleId) -> String;

    fn class_name(&self, handle: HandleId) -> String;

    /// `None` when the geometry cannot be read, e.g. the control is mid-destruction.
    fn window_rect(&self, handle: HandleId) -> Option<Rect>;

    fn process_id(&self, handle: HandleId) -> u32;

    fn is_visible(&self, handle: HandleId) -> bool;

    fn is_enabled(&self, handle: HandleId) -> bool;

    fn is_window(&self, handle: HandleId) -> bool;

    /// Synthesize a button-down/button-up pair at client coordinates,
    /// delivered to the control's message queue. The real cursor never moves.
    fn post_click(&self, handle: HandleId, client_x: i32, client_y: i32) -> DriverResult<()>;

    /// Synthesize a key-down/key-up pair, optionally wrapped in a modifier.
    fn post_key(
        &self,
        handle: HandleId,
        virtual_key: u16,
        modifier: Option<u16>,
    ) -> DriverResult<()>;

    /// Bounded pause after injection so the target can finish its own update.
    fn settle(&self, wait: Duration);
}
