// Live backend: read-only property queries plus PostMessage-based input
// synthesis against another process's window tree. Nothing here moves the
// real cursor or changes foreground focus.

use std::time::Duration;

use log::{debug, warn};
use winapi::shared::minwindef::{DWORD, LPARAM, WPARAM};
use winapi::shared::windef::{HWND, RECT};
use winapi::um::errhandlingapi::GetLastError;
use winapi::um::winuser::{
    EnumWindows, GetClassNameW, GetWindow, GetWindowRect, GetWindowTextW,
    GetWindowThreadProcessId, IsWindow, IsWindowEnabled, IsWindowVisible, PostMessageW,
    SendMessageW, GW_CHILD, GW_HWNDNEXT, MK_LBUTTON, WM_GETTEXT, WM_KEYDOWN, WM_KEYUP,
    WM_LBUTTONDOWN, WM_LBUTTONUP,
};

use crate::errors::{DriverError, DriverResult};
use crate::geometry::Rect;
use crate::system::WindowSystem;
use crate::HandleId;

// Child walks are bounded the same way enumeration callbacks are: a live
// tree can mutate under us, so never loop unbounded.
const MAX_CHILD_WALK: usize = 4096;

// Standard key-message lparams: repeat count 1, and for key-up the
// previous-state/transition bits.
const KEY_DOWN_LPARAM: LPARAM = 0x0000_0001;
const KEY_UP_LPARAM: LPARAM = 0xC000_0001u32 as i32 as LPARAM;

fn client_lparam(x: i32, y: i32) -> LPARAM {
    let packed = ((y as u32 & 0xFFFF) << 16) | (x as u32 & 0xFFFF);
    packed as i32 as LPARAM
}

unsafe extern "system" fn collect_top_level(hwnd: HWND, lparam: LPARAM) -> i32 {
    let out = &mut *(lparam as *mut Vec<HandleId>);
    out.push(hwnd as u64);
    1 // continue enumeration
}

/// `WindowSystem` over the running desktop.
#[derive(Debug, Clone, Copy, Default)]
pub struct Win32System;

impl Win32System {
    pub fn new() -> Self {
        Win32System
    }

    fn post(
        &self,
        handle: HandleId,
        msg: u32,
        wparam: WPARAM,
        lparam: LPARAM,
        operation: &'static str,
    ) -> DriverResult<()> {
        unsafe {
            if PostMessageW(handle as HWND, msg, wparam, lparam) == 0 {
                warn!(
                    "message 0x{:X} to 0x{:X} failed: os error {}",
                    msg,
                    handle,
                    GetLastError()
                );
                return Err(DriverError::InvalidHandle { handle, operation });
            }
        }
        Ok(())
    }
}

impl WindowSystem for Win32System {
    fn top_level_windows(&self) -> Vec<HandleId> {
        let mut handles: Vec<HandleId> = Vec::new();
        unsafe {
            EnumWindows(Some(collect_top_level), &mut handles as *mut _ as LPARAM);
        }
        handles
    }

    fn child_windows(&self, parent: HandleId) -> Vec<HandleId> {
        let mut children = Vec::new();
        unsafe {
            let mut child = GetWindow(parent as HWND, GW_CHILD);
            while !child.is_null() && children.len() < MAX_CHILD_WALK {
                children.push(child as u64);
                child = GetWindow(child, GW_HWNDNEXT);
            }
        }
        children
    }

    fn window_text(&self, handle: HandleId) -> String {
        unsafe {
            let mut buffer = [0u16; 512];
            let mut len =
                GetWindowTextW(handle as HWND, buffer.as_mut_ptr(), buffer.len() as i32);
            if len <= 0 {
                // GetWindowText cannot read controls owned by another
                // process; WM_GETTEXT can.
                len = SendMessageW(
                    handle as HWND,
                    WM_GETTEXT,
                    buffer.len() as WPARAM,
                    buffer.as_mut_ptr() as LPARAM,
                ) as i32;
            }
            if len > 0 {
                String::from_utf16_lossy(&buffer[..len as usize])
            } else {
                String::new()
            }
        }
    }

    fn class_name(&self, handle: HandleId) -> String {
        unsafe {
            let mut buffer = [0u16; 256];
            let len = GetClassNameW(handle as HWND, buffer.as_mut_ptr(), buffer.len() as i32);
            if len > 0 {
                String::from_utf16_lossy(&buffer[..len as usize])
            } else {
                String::new()
            }
        }
    }

    fn window_rect(&self, handle: HandleId) -> Option<Rect> {
        unsafe {
            let mut rect = RECT {
                left: 0,
                top: 0,
                right: 0,
                bottom: 0,
            };
            if GetWindowRect(handle as HWND, &mut rect) != 0 {
                Some(Rect::from_bounds(rect.left, rect.top, rect.right, rect.bottom))
            } else {
                None
            }
        }
    }

    fn process_id(&self, handle: HandleId) -> u32 {
        unsafe {
            let mut pid: DWORD = 0;
            GetWindowThreadProcessId(handle as HWND, &mut pid);
            pid
        }
    }

    fn is_visible(&self, handle: HandleId) -> bool {
        unsafe { IsWindowVisible(handle as HWND) != 0 }
    }

    fn is_enabled(&self, handle: HandleId) -> bool {
        unsafe { IsWindowEnabled(handle as HWND) != 0 }
    }

    fn is_window(&self, handle: HandleId) -> bool {
        unsafe { IsWindow(handle as HWND) != 0 }
    }

    fn post_click(&self, handle: HandleId, client_x: i32, client_y: i32) -> DriverResult<()> {
        unsafe {
            if IsWindow(handle as HWND) == 0 {
                return Err(DriverError::InvalidHandle {
                    handle,
                    operation: "click",
                });
            }
        }
        let lparam = client_lparam(client_x, client_y);
        debug!(
            "posting WM_LBUTTONDOWN/UP at ({}, {}) to 0x{:X}",
            client_x, client_y, handle
        );
        self.post(handle, WM_LBUTTONDOWN, MK_LBUTTON as WPARAM, lparam, "click")?;
        self.post(handle, WM_LBUTTONUP, 0, lparam, "click")
    }

    fn post_key(
        &self,
        handle: HandleId,
        virtual_key: u16,
        modifier: Option<u16>,
    ) -> DriverResult<()> {
        unsafe {
            if IsWindow(handle as HWND) == 0 {
                return Err(DriverError::InvalidHandle {
                    handle,
                    operation: "key",
                });
            }
        }
        debug!(
            "posting key 0x{:02X} (modifier {:?}) to 0x{:X}",
            virtual_key, modifier, handle
        );
        if let Some(vk_mod) = modifier {
            self.post(handle, WM_KEYDOWN, vk_mod as WPARAM, KEY_DOWN_LPARAM, "key")?;
        }
        self.post(handle, WM_KEYDOWN, virtual_key as WPARAM, KEY_DOWN_LPARAM, "key")?;
        self.post(handle, WM_KEYUP, virtual_key as WPARAM, KEY_UP_LPARAM, "key")?;
        if let Some(vk_mod) = modifier {
            self.post(handle, WM_KEYUP, vk_mod as WPARAM, KEY_UP_LPARAM, "key")?;
        }
        Ok(())
    }

    fn settle(&self, wait: Duration) {
        std::thread::sleep(wait);
    }
}
