// Borderless topmost click-through window hosting the overlay swap chain
use anyhow::{Context, Result};
use crate::{log_info, log_warn};

use windows::{
    core::*,
    Win32::{
        Foundation::*,
        System::LibraryLoader::GetModuleHandleW,
        UI::{Input::KeyboardAndMouse::VK_ESCAPE, WindowsAndMessaging::*},
    },
};

fn class_name() -> PCWSTR {
    w!("RectOverlayWindow")
}

pub struct OverlayWindow {
    hwnd: HWND,
    hinstance: HINSTANCE,
    width: u32,
    height: u32,
}

impl OverlayWindow {
    pub fn new(title: &str, width: u32, height: u32) -> Result<Self> {
        unsafe {
            let hinstance: HINSTANCE = GetModuleHandleW(None)
                .context("Failed to get module handle")?
                .into();

            let wc = WNDCLASSW {
                lpfnWndProc: Some(Self::window_proc),
                hInstance: hinstance,
                lpszClassName: class_name(),
                style: CS_HREDRAW | CS_VREDRAW,
                ..Default::default()
            };

            if RegisterClassW(&wc) == 0 {
                anyhow::bail!("Failed to register window class ({:?})", GetLastError());
            }

            let title = HSTRING::from(title);
            let created = CreateWindowExW(
                WS_EX_LAYERED | WS_EX_TRANSPARENT | WS_EX_TOPMOST | WS_EX_NOACTIVATE,
                class_name(),
                &title,
                WS_POPUP,
                CW_USEDEFAULT,
                CW_USEDEFAULT,
                width as i32,
                height as i32,
                None,
                None,
                Some(hinstance),
                None,
            );

            let hwnd = match created {
                Ok(hwnd) => hwnd,
                Err(e) => {
                    let _ = UnregisterClassW(class_name(), Some(hinstance));
                    return Err(e).context("Failed to create overlay window");
                }
            };

            // From here on Drop cleans up the window and class.
            let window = Self {
                hwnd,
                hinstance,
                width,
                height,
            };

            SetLayeredWindowAttributes(hwnd, COLORREF(0), 255, LWA_ALPHA)
                .context("Failed to set layered window attributes")?;

            let _ = ShowWindow(hwnd, SW_SHOW);
            log_info!("Overlay window created ({}x{})", width, height);

            Ok(window)
        }
    }

    pub fn hwnd(&self) -> HWND {
        self.hwnd
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Drains the message queue without blocking. Returns false once WM_QUIT arrives.
    pub fn process_messages(&self) -> bool {
        unsafe {
            let mut msg = MSG::default();
            while PeekMessageW(&mut msg, None, 0, 0, PM_REMOVE).as_bool() {
                if msg.message == WM_QUIT {
                    log_info!("WM_QUIT received");
                    return false;
                }
                let _ = TranslateMessage(&msg);
                DispatchMessageW(&msg);
            }
        }
        true
    }

    unsafe extern "system" fn window_proc(
        hwnd: HWND,
        msg: u32,
        wparam: WPARAM,
        lparam: LPARAM,
    ) -> LRESULT {
        match msg {
            WM_DESTROY => {
                PostQuitMessage(0);
                LRESULT(0)
            }
            WM_KEYDOWN if wparam.0 == VK_ESCAPE.0 as usize => {
                PostQuitMessage(0);
                LRESULT(0)
            }
            _ => DefWindowProcW(hwnd, msg, wparam, lparam),
        }
    }
}

impl Drop for OverlayWindow {
    fn drop(&mut self) {
        unsafe {
            // WM_DESTROY may already have taken the window down
            if IsWindow(Some(self.hwnd)).as_bool() {
                if let Err(e) = DestroyWindow(self.hwnd) {
                    log_warn!("Failed to destroy overlay window: {:?}", e);
                }
            }
            let _ = UnregisterClassW(class_name(), Some(self.hinstance));
        }
    }
}
