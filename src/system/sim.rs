// In-memory window tree implementing `WindowSystem`. Tests script it with
// the same structure the live application exhibits: a main window, a tab
// strip whose pages own spread controls, and dialogs grouped by process id.
//
// Tab pages model the destroy-and-recreate behavior of the real UI: leaving
// a page tears its controls down, returning to it spawns fresh handles.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

use log::warn;

use crate::errors::{DriverError, DriverResult};
use crate::geometry::Rect;
use crate::input::vk;
use crate::system::WindowSystem;
use crate::HandleId;

/// One injected event, recorded in delivery order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputEvent {
    Click {
        handle: HandleId,
        x: i32,
        y: i32,
    },
    Key {
        handle: HandleId,
        virtual_key: u16,
        modifier: Option<u16>,
    },
}

/// Blueprint for a control a tab page creates when it becomes active.
#[derive(Debug, Clone)]
pub struct SimControlSpec {
    pub class_name: String,
    pub text: String,
    pub rect: Rect,
}

impl SimControlSpec {
    pub fn new(class_name: &str, text: &str, rect: Rect) -> Self {
        Self {
            class_name: class_name.to_string(),
            text: text.to_string(),
            rect,
        }
    }
}

#[derive(Debug, Clone)]
struct SimNode {
    parent: Option<HandleId>,
    class_name: String,
    text: String,
    rect: Option<Rect>, // None simulates unreadable geometry
    visible: bool,
    enabled: bool,
    process_id: u32,
    children: Vec<HandleId>,
}

#[derive(Debug, Clone)]
struct TabBinding {
    strip: HandleId,
    x_min: i32,
    x_max: i32,
    page: String,
}

#[derive(Debug, Clone)]
struct TabPage {
    name: String,
    owner: HandleId,
    controls: Vec<SimControlSpec>,
}

#[derive(Default)]
struct SimState {
    nodes: HashMap<HandleId, SimNode>,
    top_level: Vec<HandleId>,
    handle_counter: u64,
    events: Vec<InputEvent>,
    bindings: Vec<TabBinding>,
    pages: Vec<TabPage>,
    spawned: HashMap<String, Vec<HandleId>>,
    active_page: Option<String>,
}

fn alloc_handle(state: &mut SimState) -> HandleId {
    state.handle_counter += 1;
    0x1000 + state.handle_counter * 4
}

fn remove_subtree(state: &mut SimState, handle: HandleId) {
    let Some(node) = state.nodes.remove(&handle) else {
        return;
    };
    for child in node.children {
        remove_subtree(state, child);
    }
    match node.parent {
        Some(parent) => {
            if let Some(parent_node) = state.nodes.get_mut(&parent) {
                parent_node.children.retain(|c| *c != handle);
            }
        }
        None => state.top_level.retain(|h| *h != handle),
    }
}

fn activate_page(state: &mut SimState, name: &str) {
    // tear down whatever the previous page spawned; handles are never reused
    let stale: Vec<HandleId> = state.spawned.drain().flat_map(|(_, v)| v).collect();
    for handle in stale {
        remove_subtree(state, handle);
    }

    let Some(page) = state.pages.iter().find(|p| p.name == name).cloned() else {
        warn!("sim: no page named '{}'", name);
        state.active_page = None;
        return;
    };
    let owner_pid = state
        .nodes
        .get(&page.owner)
        .map(|n| n.process_id)
        .unwrap_or(0);

    let mut created = Vec::new();
    for spec in &page.controls {
        let handle = alloc_handle(state);
        state.nodes.insert(
            handle,
            SimNode {
                parent: Some(page.owner),
                class_name: spec.class_name.clone(),
                text: spec.text.clone(),
                rect: Some(spec.rect),
                visible: true,
                enabled: true,
                process_id: owner_pid,
                children: Vec::new(),
            },
        );
        if let Some(owner) = state.nodes.get_mut(&page.owner) {
            owner.children.push(handle);
        }
        created.push(handle);
    }
    state.spawned.insert(page.name.clone(), created);
    state.active_page = Some(page.name);
}

/// Shared-state simulated window system. Clones share the same tree, so a
/// test keeps one clone for mutation while the session under test holds
/// another.
#[derive(Clone, Default)]
pub struct SimSystem {
    state: Rc<RefCell<SimState>>,
}

impl SimSystem {
    pub fn new() -> Self {
        Self::default()
    }

    fn insert_top_level(
        &self,
        title: &str,
        class_name: &str,
        rect: Rect,
        process_id: Option<u32>,
    ) -> HandleId {
        let mut state = self.state.borrow_mut();
        let handle = alloc_handle(&mut state);
        // distinct process per top-level window unless stated otherwise
        let process_id = process_id.unwrap_or(0x4000 + handle as u32);
        state.nodes.insert(
            handle,
            SimNode {
                parent: None,
                class_name: class_name.to_string(),
                text: title.to_string(),
                rect: Some(rect),
                visible: true,
                enabled: true,
                process_id,
                children: Vec::new(),
            },
        );
        state.top_level.push(handle);
        handle
    }

    pub fn add_window(&self, title: &str, class_name: &str, rect: Rect) -> HandleId {
        self.insert_top_level(title, class_name, rect, None)
    }

    pub fn add_window_for_process(
        &self,
        title: &str,
        class_name: &str,
        rect: Rect,
        process_id: u32,
    ) -> HandleId {
        self.insert_top_level(title, class_name, rect, Some(process_id))
    }

    pub fn add_child(
        &self,
        parent: HandleId,
        class_name: &str,
        text: &str,
        rect: Rect,
    ) -> HandleId {
        let mut state = self.state.borrow_mut();
        let handle = alloc_handle(&mut state);
        let process_id = state
            .nodes
            .get(&parent)
            .map(|n| n.process_id)
            .unwrap_or(0);
        state.nodes.insert(
            handle,
            SimNode {
                parent: Some(parent),
                class_name: class_name.to_string(),
                text: text.to_string(),
                rect: Some(rect),
                visible: true,
                enabled: true,
                process_id,
                children: Vec::new(),
            },
        );
        if let Some(parent_node) = state.nodes.get_mut(&parent) {
            parent_node.children.push(handle);
        }
        handle
    }

    pub fn remove_window(&self, handle: HandleId) {
        remove_subtree(&mut self.state.borrow_mut(), handle);
    }

    pub fn set_text(&self, handle: HandleId, text: &str) {
        if let Some(node) = self.state.borrow_mut().nodes.get_mut(&handle) {
            node.text = text.to_string();
        }
    }

    pub fn set_rect(&self, handle: HandleId, rect: Rect) {
        if let Some(node) = self.state.borrow_mut().nodes.get_mut(&handle) {
            node.rect = Some(rect);
        }
    }

    pub fn set_visible(&self, handle: HandleId, visible: bool) {
        if let Some(node) = self.state.borrow_mut().nodes.get_mut(&handle) {
            node.visible = visible;
        }
    }

    pub fn set_enabled(&self, handle: HandleId, enabled: bool) {
        if let Some(node) = self.state.borrow_mut().nodes.get_mut(&handle) {
            node.enabled = enabled;
        }
    }

    /// Make geometry queries on `handle` fail, as for a control mid-destruction.
    pub fn make_unreadable(&self, handle: HandleId) {
        if let Some(node) = self.state.borrow_mut().nodes.get_mut(&handle) {
            node.rect = None;
        }
    }

    /// Register the controls a logical tab page owns while it is active.
    pub fn define_page(&self, name: &str, owner: HandleId, controls: Vec<SimControlSpec>) {
        self.state.borrow_mut().pages.push(TabPage {
            name: name.to_string(),
            owner,
            controls,
        });
    }

    /// A click on `strip` with x in `[x_min, x_max)` activates `page`.
    pub fn bind_tab(&self, strip: HandleId, x_min: i32, x_max: i32, page: &str) {
        self.state.borrow_mut().bindings.push(TabBinding {
            strip,
            x_min,
            x_max,
            page: page.to_string(),
        });
    }

    /// Force a page active without input, for arranging test preconditions.
    pub fn show_page(&self, name: &str) {
        activate_page(&mut self.state.borrow_mut(), name);
    }

    pub fn active_page(&self) -> Option<String> {
        self.state.borrow().active_page.clone()
    }

    pub fn events(&self) -> Vec<InputEvent> {
        self.state.borrow().events.clone()
    }

    pub fn clear_events(&self) {
        self.state.borrow_mut().events.clear();
    }
}

impl WindowSystem for SimSystem {
    fn top_level_windows(&self) -> Vec<HandleId> {
        self.state.borrow().top_level.clone()
    }

    fn child_windows(&self, parent: HandleId) -> Vec<HandleId> {
        self.state
            .borrow()
            .nodes
            .get(&parent)
            .map(|n| n.children.clone())
            .unwrap_or_default()
    }

    fn window_text(&self, handle: HandleId) -> String {
        self.state
            .borrow()
            .nodes
            .get(&handle)
            .map(|n| n.text.clone())
            .unwrap_or_default()
    }

    fn class_name(&self, handle: HandleId) -> String {
        self.state
            .borrow()
            .nodes
            .get(&handle)
            .map(|n| n.class_name.clone())
            .unwrap_or_default()
    }

    fn window_rect(&self, handle: HandleId) -> Option<Rect> {
        self.state.borrow().nodes.get(&handle).and_then(|n| n.rect)
    }

    fn process_id(&self, handle: HandleId) -> u32 {
        self.state
            .borrow()
            .nodes
            .get(&handle)
            .map(|n| n.process_id)
            .unwrap_or(0)
    }

    fn is_visible(&self, handle: HandleId) -> bool {
        self.state
            .borrow()
            .nodes
            .get(&handle)
            .map(|n| n.visible)
            .unwrap_or(false)
    }

    fn is_enabled(&self, handle: HandleId) -> bool {
        self.state
            .borrow()
            .nodes
            .get(&handle)
            .map(|n| n.enabled)
            .unwrap_or(false)
    }

    fn is_window(&self, handle: HandleId) -> bool {
        self.state.borrow().nodes.contains_key(&handle)
    }

    fn post_click(&self, handle: HandleId, client_x: i32, client_y: i32) -> DriverResult<()> {
        let mut state = self.state.borrow_mut();
        if !state.nodes.contains_key(&handle) {
            return Err(DriverError::InvalidHandle {
                handle,
                operation: "click",
            });
        }
        state.events.push(InputEvent::Click {
            handle,
            x: client_x,
            y: client_y,
        });
        let page = state
            .bindings
            .iter()
            .find(|b| b.strip == handle && client_x >= b.x_min && client_x < b.x_max)
            .map(|b| b.page.clone());
        if let Some(page) = page {
            activate_page(&mut state, &page);
        }
        Ok(())
    }

    fn post_key(
        &self,
        handle: HandleId,
        virtual_key: u16,
        modifier: Option<u16>,
    ) -> DriverResult<()> {
        let mut state = self.state.borrow_mut();
        if !state.nodes.contains_key(&handle) {
            return Err(DriverError::InvalidHandle {
                handle,
                operation: "key",
            });
        }
        state.events.push(InputEvent::Key {
            handle,
            virtual_key,
            modifier,
        });
        // Ctrl+Tab cycles pages the way the real tab control does
        if virtual_key == vk::TAB && modifier == Some(vk::CONTROL) && !state.pages.is_empty() {
            let next = match &state.active_page {
                Some(active) => {
                    let idx = state
                        .pages
                        .iter()
                        .position(|p| &p.name == active)
                        .unwrap_or(0);
                    state.pages[(idx + 1) % state.pages.len()].name.clone()
                }
                None => state.pages[0].name.clone(),
            };
            activate_page(&mut state, &next);
        }
        Ok(())
    }

    fn settle(&self, _wait: Duration) {
        // the sim applies effects synchronously, nothing to wait for
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tree_construction_and_removal() {
        let sim = SimSystem::new();
        let main = sim.add_window("정산", "MainFrame", Rect::from_bounds(0, 0, 800, 600));
        let child = sim.add_child(main, "Edit", "", Rect::from_bounds(10, 10, 100, 30));
        assert_eq!(sim.child_windows(main), vec![child]);
        assert_eq!(sim.process_id(child), sim.process_id(main));

        sim.remove_window(main);
        assert!(!sim.is_window(main));
        assert!(!sim.is_window(child));
        assert!(sim.top_level_windows().is_empty());
    }

    #[test]
    fn page_activation_recreates_handles() {
        let sim = SimSystem::new();
        let main = sim.add_window("정산", "MainFrame", Rect::from_bounds(0, 0, 800, 600));
        sim.define_page(
            "a",
            main,
            vec![SimControlSpec::new(
                "fpSpread70",
                "",
                Rect::from_bounds(0, 40, 300, 500),
            )],
        );
        sim.show_page("a");
        let first = sim.child_windows(main);
        sim.show_page("a");
        let second = sim.child_windows(main);
        assert_eq!(first.len(), 1);
        assert_eq!(second.len(), 1);
        assert_ne!(first[0], second[0]);
    }

    #[test]
    fn click_outside_bindings_changes_nothing() {
        let sim = SimSystem::new();
        let main = sim.add_window("정산", "MainFrame", Rect::from_bounds(0, 0, 800, 600));
        let strip = sim.add_child(main, "TabStrip", "", Rect::from_bounds(0, 0, 400, 28));
        sim.define_page("a", main, vec![]);
        sim.bind_tab(strip, 0, 100, "a");

        sim.post_click(strip, 250, 14).unwrap();
        assert_eq!(sim.active_page(), None);
        assert_eq!(sim.events().len(), 1);
    }

    #[test]
    fn click_on_dead_handle_is_invalid() {
        let sim = SimSystem::new();
        let main = sim.add_window("정산", "MainFrame", Rect::from_bounds(0, 0, 800, 600));
        sim.remove_window(main);
        let err = sim.post_click(main, 1, 1).unwrap_err();
        assert!(matches!(err, DriverError::InvalidHandle { .. }));
    }
}
