//! OS notifications: display changes, taskbar re-creation, peek, shutdown.
//!
//! WinEvent callbacks and the window procedure carry no user pointer, so the
//! engine they forward to is parked in [`EVENT_TARGET`] for the process
//! lifetime.

use std::sync::{
    atomic::{AtomicU32, Ordering},
    Arc, OnceLock,
};

use windows::{
    core::{w, PCWSTR},
    Win32::{
        Foundation::{HINSTANCE, HWND, LPARAM, LRESULT, WPARAM},
        System::LibraryLoader::GetModuleHandleW,
        UI::{
            Accessibility::{SetWinEventHook, UnhookWinEvent, HWINEVENTHOOK},
            WindowsAndMessaging::{
                CreateWindowExW, DefWindowProcW, DestroyWindow, DispatchMessageW, GetClassNameW,
                GetMessageW, PostQuitMessage, RegisterClassW, RegisterWindowMessageW, TranslateMessage,
                CHILDID_SELF, EVENT_OBJECT_CREATE, EVENT_OBJECT_DESTROY, MSG, OBJID_WINDOW,
                WINDOW_EX_STYLE, WINEVENT_OUTOFCONTEXT, WM_CLOSE, WM_DISPLAYCHANGE, WM_ENDSESSION,
                WM_QUERYENDSESSION, WNDCLASSW, WS_OVERLAPPED,
            },
        },
    },
};

use super::{native::NativeShell, start_menu::StartMenuSubscription};
use crate::{
    engine::Engine,
    error, info,
    shell::{PRIMARY_TASKBAR_CLASS, SECONDARY_TASKBAR_CLASS},
    utility::from_wide,
    warn,
};

const EVENT_WINDOW_CLASS: PCWSTR = w!("TaskbarTintEventWindow");
const EVENT_WINDOW_TITLE: PCWSTR = w!("TaskbarTint");

/// Undocumented WinEvents raised when peek preview starts and stops.
const EVENT_PEEK_START: u32 = 0x21;
const EVENT_PEEK_END: u32 = 0x22;

static EVENT_TARGET: OnceLock<Arc<Engine<NativeShell>>> = OnceLock::new();
static TASKBAR_CREATED: AtomicU32 = AtomicU32::new(0);

struct WinEventHook(HWINEVENTHOOK);

impl WinEventHook {
    fn install(
        min: u32,
        max: u32,
        callback: unsafe extern "system" fn(HWINEVENTHOOK, u32, HWND, i32, i32, u32, u32),
    ) -> Option<Self> {
        let hook = unsafe { SetWinEventHook(min, max, None, Some(callback), 0, 0, WINEVENT_OUTOFCONTEXT) };
        if hook.is_invalid() {
            warn!("[EVENTS] SetWinEventHook(0x{:X}..0x{:X}) failed", min, max);
            None
        } else {
            Some(Self(hook))
        }
    }
}

impl Drop for WinEventHook {
    fn drop(&mut self) {
        unsafe {
            let _ = UnhookWinEvent(self.0);
        }
    }
}

/// Every OS event source feeding the engine. Dropping it unregisters all of them.
pub struct EventBridge {
    window: HWND,
    _hooks: Vec<WinEventHook>,
    _start_menu: Option<StartMenuSubscription>,
}

impl EventBridge {
    pub fn install(engine: Arc<Engine<NativeShell>>) -> Result<Self, String> {
        if EVENT_TARGET.set(Arc::clone(&engine)).is_err() {
            return Err("event bridge already installed".to_string());
        }

        let taskbar_created = unsafe { RegisterWindowMessageW(w!("TaskbarCreated")) };
        TASKBAR_CREATED.store(taskbar_created, Ordering::Relaxed);

        let window = create_event_window()?;

        let hooks = [
            WinEventHook::install(EVENT_PEEK_START, EVENT_PEEK_END, peek_proc),
            WinEventHook::install(EVENT_OBJECT_CREATE, EVENT_OBJECT_DESTROY, taskbar_lifecycle_proc),
        ]
        .into_iter()
        .flatten()
        .collect();

        Ok(Self {
            window,
            _hooks: hooks,
            _start_menu: StartMenuSubscription::register(engine),
        })
    }
}

impl Drop for EventBridge {
    fn drop(&mut self) {
        unsafe {
            let _ = DestroyWindow(self.window);
        }
    }
}

fn create_event_window() -> Result<HWND, String> {
    let hinstance = unsafe {
        GetModuleHandleW(None)
            .map(|h| HINSTANCE(h.0))
            .map_err(|e| format!("GetModuleHandleW failed: {e:?}"))?
    };

    let wc = WNDCLASSW {
        lpfnWndProc: Some(event_window_proc),
        hInstance: hinstance,
        lpszClassName: EVENT_WINDOW_CLASS,
        ..Default::default()
    };

    unsafe {
        if RegisterClassW(&wc) == 0 {
            return Err("RegisterClassW failed for event window".to_string());
        }

        // Top-level but never shown: broadcasts skip message-only windows.
        CreateWindowExW(
            WINDOW_EX_STYLE(0),
            EVENT_WINDOW_CLASS,
            EVENT_WINDOW_TITLE,
            WS_OVERLAPPED,
            0,
            0,
            0,
            0,
            None,
            None,
            Some(hinstance),
            None,
        )
    }
    .map_err(|e| format!("CreateWindowExW failed: {e:?}"))
}

fn rebuild(reason: &str) {
    if let Some(engine) = EVENT_TARGET.get() {
        info!("[EVENTS] {} -> rebuilding taskbar registry", reason);
        engine.rebuild_registry();
    }
}

unsafe extern "system" fn event_window_proc(hwnd: HWND, msg: u32, wparam: WPARAM, lparam: LPARAM) -> LRESULT {
    match msg {
        WM_DISPLAYCHANGE => {
            rebuild("WM_DISPLAYCHANGE");
            LRESULT(0)
        }
        WM_CLOSE => {
            info!("[EVENTS] WM_CLOSE received");
            PostQuitMessage(0);
            LRESULT(0)
        }
        WM_QUERYENDSESSION => LRESULT(1),
        WM_ENDSESSION => {
            if wparam.0 != 0 {
                warn!("[EVENTS] Session ending");
                PostQuitMessage(0);
            }
            LRESULT(0)
        }
        _ if msg != 0 && msg == TASKBAR_CREATED.load(Ordering::Relaxed) => {
            rebuild("TaskbarCreated");
            LRESULT(0)
        }
        _ => DefWindowProcW(hwnd, msg, wparam, lparam),
    }
}

unsafe extern "system" fn peek_proc(
    _hook: HWINEVENTHOOK,
    event: u32,
    _hwnd: HWND,
    _id_object: i32,
    _id_child: i32,
    _thread: u32,
    _time: u32,
) {
    if let Some(engine) = EVENT_TARGET.get() {
        engine.set_peek_active(event == EVENT_PEEK_START);
    }
}

unsafe extern "system" fn taskbar_lifecycle_proc(
    _hook: HWINEVENTHOOK,
    _event: u32,
    hwnd: HWND,
    id_object: i32,
    id_child: i32,
    _thread: u32,
    _time: u32,
) {
    if hwnd.is_invalid() || id_object != OBJID_WINDOW.0 || id_child != CHILDID_SELF as i32 {
        return;
    }

    let mut class_buf = [0u16; 64];
    let len = GetClassNameW(hwnd, &mut class_buf);
    if len <= 0 {
        return;
    }

    let class_name = from_wide(&class_buf, len as usize);
    if class_name == PRIMARY_TASKBAR_CLASS || class_name == SECONDARY_TASKBAR_CLASS {
        rebuild(&format!("{} created/destroyed", class_name));
    }
}

/// Pumps messages until `WM_QUIT`.
pub fn run_message_loop() {
    let mut msg = MSG::default();
    loop {
        let ret = unsafe { GetMessageW(&mut msg, None, 0, 0) };
        match ret.0 {
            0 => break,
            -1 => {
                error!("[EVENTS] GetMessageW failed");
                break;
            }
            _ => unsafe {
                let _ = TranslateMessage(&msg);
                DispatchMessageW(&msg);
            },
        }
    }
}
