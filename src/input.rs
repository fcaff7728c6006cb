// Input Injector: synthetic pointer and keyboard events addressed to a
// control handle. There is no synchronous acknowledgement from the target;
// callers verify outcomes separately (see the tab navigator).

use log::debug;

use crate::errors::{DriverError, DriverResult};
use crate::system::WindowSystem;
use crate::HandleId;

/// Virtual-key codes used by the driver.
pub mod vk {
    pub const TAB: u16 = 0x09;
    pub const RETURN: u16 = 0x0D;
    pub const CONTROL: u16 = 0x11;
    pub const ESCAPE: u16 = 0x1B;
    pub const NEXT: u16 = 0x22; // page down
    pub const DOWN: u16 = 0x28;
}

/// Click at client-relative coordinates of `handle`. The real cursor does
/// not move; the event goes straight to the control's message queue.
pub fn click_at<S: WindowSystem>(
    system: &S,
    handle: HandleId,
    client_x: i32,
    client_y: i32,
) -> DriverResult<()> {
    if !system.is_window(handle) {
        return Err(DriverError::InvalidHandle {
            handle,
            operation: "click",
        });
    }
    debug!("click ({}, {}) -> 0x{:X}", client_x, client_y, handle);
    system.post_click(handle, client_x, client_y)
}

/// Send a key, optionally wrapped in a modifier chord (e.g. Ctrl+Tab).
///
/// The keyboard path exists as a fallback: some controls ignore synthetic
/// pointer events but still honor synthetic focus-navigation keys.
pub fn send_key<S: WindowSystem>(
    system: &S,
    handle: HandleId,
    virtual_key: u16,
    modifier: Option<u16>,
) -> DriverResult<()> {
    if !system.is_window(handle) {
        return Err(DriverError::InvalidHandle {
            handle,
            operation: "key",
        });
    }
    debug!(
        "key 0x{:02X} modifier {:?} -> 0x{:X}",
        virtual_key, modifier, handle
    );
    system.post_key(handle, virtual_key, modifier)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;
    use crate::system::sim::{InputEvent, SimSystem};

    #[test]
    fn click_reaches_target_control() {
        let sim = SimSystem::new();
        let window = sim.add_window("대상", "MainFrame", Rect::from_bounds(0, 0, 800, 600));
        click_at(&sim, window, 30, 12).unwrap();
        assert_eq!(
            sim.events(),
            vec![InputEvent::Click {
                handle: window,
                x: 30,
                y: 12
            }]
        );
    }

    #[test]
    fn stale_handle_is_rejected_before_delivery() {
        let sim = SimSystem::new();
        let window = sim.add_window("대상", "MainFrame", Rect::from_bounds(0, 0, 800, 600));
        sim.remove_window(window);
        let err = click_at(&sim, window, 1, 1).unwrap_err();
        assert!(matches!(err, DriverError::InvalidHandle { .. }));
        assert!(sim.events().is_empty());
    }

    #[test]
    fn chord_records_modifier() {
        let sim = SimSystem::new();
        let window = sim.add_window("대상", "MainFrame", Rect::from_bounds(0, 0, 800, 600));
        send_key(&sim, window, vk::TAB, Some(vk::CONTROL)).unwrap();
        assert_eq!(
            sim.events(),
            vec![InputEvent::Key {
                handle: window,
                virtual_key: vk::TAB,
                modifier: Some(vk::CONTROL)
            }]
        );
    }
}
