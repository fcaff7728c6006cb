// Window Locator: finds the target application's top-level window among
// everything on the desktop, and the title-less dialogs it spawns.

use log::{debug, info};

use crate::errors::{DriverError, DriverResult};
use crate::system::WindowSystem;
use crate::HandleId;

/// Locate the application's main window by title substring.
///
/// With multiple visible matches a `class_hint` picks among them; without
/// one the ambiguity is surfaced so the operator can narrow the substring.
pub fn find_main_window<S: WindowSystem>(
    system: &S,
    title_substring: &str,
    class_hint: Option<&str>,
) -> DriverResult<HandleId> {
    let mut matches: Vec<(HandleId, String)> = Vec::new();
    for handle in system.top_level_windows() {
        if !system.is_visible(handle) {
            continue;
        }
        let title = system.window_text(handle);
        if !title.contains(title_substring) {
            continue;
        }
        if let Some(class) = class_hint {
            if system.class_name(handle) != class {
                continue;
            }
        }
        matches.push((handle, title));
    }

    match matches.len() {
        0 => Err(DriverError::NotFound {
            what: format!("window titled '*{}*'", title_substring),
            hint: "is the target application running?".to_string(),
        }),
        1 => {
            let (handle, title) = matches.remove(0);
            info!("main window 0x{:X} '{}'", handle, title);
            Ok(handle)
        }
        _ => {
            if class_hint.is_some() {
                // the hint was the disambiguator; first match wins
                let (handle, title) = matches.remove(0);
                info!("main window 0x{:X} '{}' (first of {})", handle, title, matches.len() + 1);
                Ok(handle)
            } else {
                Err(DriverError::AmbiguousMatch {
                    title_substring: title_substring.to_string(),
                    candidates: matches.into_iter().map(|(_, title)| title).collect(),
                })
            }
        }
    }
}

/// Structural fingerprint: the first candidate whose direct children carry
/// `marker_text` somewhere in their text. Pure over the candidate list, so
/// it runs against synthetic trees as well as a live session.
pub fn fingerprint_dialog<S: WindowSystem>(
    system: &S,
    candidates: &[HandleId],
    marker_text: &str,
) -> Option<HandleId> {
    candidates.iter().copied().find(|candidate| {
        system
            .child_windows(*candidate)
            .iter()
            .any(|child| system.window_text(*child).contains(marker_text))
    })
}

/// Locate a title-less dialog belonging to the same process as `parent`.
///
/// Legacy dialogs here carry no caption at all, so identity comes from the
/// marker text of their children, not from the (empty) title.
pub fn find_anonymous_dialog<S: WindowSystem>(
    system: &S,
    parent: HandleId,
    dialog_class: &str,
    marker_text: &str,
) -> DriverResult<HandleId> {
    let pid = system.process_id(parent);
    let candidates: Vec<HandleId> = system
        .top_level_windows()
        .into_iter()
        .filter(|handle| system.process_id(*handle) == pid)
        .filter(|handle| system.class_name(*handle) == dialog_class)
        .collect();
    debug!(
        "{} '{}' candidates in process {}",
        candidates.len(),
        dialog_class,
        pid
    );

    fingerprint_dialog(system, &candidates, marker_text).ok_or_else(|| DriverError::NotFound {
        what: format!("dialog with child text '*{}*'", marker_text),
        hint: "the dialog may not be open yet".to_string(),
    })
}
