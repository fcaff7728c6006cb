// Control Resolver: walks a live window's control tree and classifies what
// it finds. Nothing resolved here is cached anywhere - the tree is walked
// again for every top-level operation because the target recreates child
// windows on tab switches.

use log::debug;

use crate::errors::{DriverError, DriverResult};
use crate::system::{ClassPattern, ControlDescriptor, WindowSystem};
use crate::HandleId;

fn describe<S: WindowSystem>(
    system: &S,
    handle: HandleId,
    depth: u32,
) -> Option<ControlDescriptor> {
    // a control mid-destruction has no readable geometry; skip it rather
    // than fail the whole walk
    let rect = system.window_rect(handle)?;
    Some(ControlDescriptor {
        handle,
        class_name: system.class_name(handle),
        text: system.window_text(handle),
        rect,
        depth,
    })
}

fn walk_into<S: WindowSystem>(
    system: &S,
    parent: HandleId,
    depth: u32,
    out: &mut Vec<ControlDescriptor>,
) {
    for child in system.child_windows(parent) {
        match describe(system, child, depth) {
            Some(descriptor) => {
                out.push(descriptor);
                walk_into(system, child, depth + 1, out);
            }
            None => {
                debug!("skipping 0x{:X}: geometry unreadable", child);
            }
        }
    }
}

/// All descendants of `window` in tree-walk order, depth-annotated.
pub fn walk_descendants<S: WindowSystem>(system: &S, window: HandleId) -> Vec<ControlDescriptor> {
    let mut out = Vec::new();
    walk_into(system, window, 1, &mut out);
    out
}

/// The tab-strip control, matched by class pattern over all descendants.
///
/// The strip's class name embeds a per-launch numeric suffix, so the
/// configured pattern must be a prefix or regex match; an exact pattern
/// will stop matching on the next process restart.
pub fn resolve_tab_strip<S: WindowSystem>(
    system: &S,
    window: HandleId,
    pattern: &ClassPattern,
) -> DriverResult<ControlDescriptor> {
    walk_descendants(system, window)
        .into_iter()
        .find(|control| pattern.matches(&control.class_name))
        .ok_or_else(|| DriverError::NotFound {
            what: format!("tab strip matching {:?}", pattern),
            hint: "the main editing dialog must be open".to_string(),
        })
}

/// All grid controls among the *direct* children of `window`, in discovery
/// order. Grids are siblings of each other, never nested, so descending
/// further only risks matching embedded helper windows.
///
/// An empty result is a valid state: the active tab simply has no grids.
pub fn resolve_grid_controls<S: WindowSystem>(
    system: &S,
    window: HandleId,
    pattern: &ClassPattern,
) -> Vec<ControlDescriptor> {
    let grids: Vec<ControlDescriptor> = system
        .child_windows(window)
        .into_iter()
        .filter_map(|child| describe(system, child, 1))
        .filter(|control| pattern.matches(&control.class_name))
        .collect();
    debug!("{} grid controls under 0x{:X}", grids.len(), window);
    grids
}

/// Indented one-line-per-control rendering of the full tree, for the
/// inspection binary and failure evidence.
pub fn dump_tree<S: WindowSystem>(system: &S, window: HandleId) -> Vec<String> {
    walk_descendants(system, window)
        .iter()
        .map(|control| {
            format!(
                "{}{}",
                "  ".repeat(control.depth as usize - 1),
                control
            )
        })
        .collect()
}
