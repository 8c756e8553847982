use std::{cell::RefCell, ffi::c_void, mem};

use windows::{
    core::{s, w, BOOL, PWSTR},
    Win32::{
        Foundation::{CloseHandle, HWND, LPARAM, WPARAM},
        Graphics::{
            Dwm::{DwmGetWindowAttribute, DWMWA_CLOAKED},
            Gdi::{MonitorFromWindow, MONITOR_DEFAULTTONEAREST},
        },
        System::{
            Com::{CoCreateInstance, CLSCTX_ALL},
            LibraryLoader::{GetModuleHandleW, GetProcAddress},
            SystemInformation::OSVERSIONINFOW,
            Threading::{
                OpenProcess, QueryFullProcessImageNameW, PROCESS_NAME_WIN32,
                PROCESS_QUERY_LIMITED_INFORMATION,
            },
        },
        UI::{
            Shell::{IVirtualDesktopManager, VirtualDesktopManager},
            WindowsAndMessaging::{
                EnumWindows, FindWindowExW, FindWindowW, GetClassNameW, GetForegroundWindow,
                GetWindowTextW, GetWindowThreadProcessId, IsWindow, IsWindowVisible, IsZoomed,
                SendMessageTimeoutW, SMTO_ABORTIFHUNG, WM_THEMECHANGED,
            },
        },
    },
};

use super::init_com_apartment;
use crate::{
    error::{ShellError, ShellResult},
    info,
    shell::{AccentPolicy, MonitorId, Shell, WindowHandle, WindowIdentity, WindowState},
    utility::{file_name_of, from_wide},
    warn,
};

/// `WCA_ACCENT_POLICY` in the undocumented window composition attribute enum.
const WCA_ACCENT_POLICY: u32 = 19;
const THEME_REFRESH_TIMEOUT_MS: u32 = 200;

#[repr(C)]
struct AccentPolicyData {
    accent_state: u32,
    flags: u32,
    gradient_color: u32,
    animation_id: u32,
}

#[repr(C)]
struct WindowCompositionAttribData {
    attribute: u32,
    data: *mut c_void,
    size_of_data: usize,
}

type SetWindowCompositionAttributeFn =
    unsafe extern "system" fn(HWND, *mut WindowCompositionAttribData) -> BOOL;
type RtlGetVersionFn = unsafe extern "system" fn(*mut OSVERSIONINFOW) -> i32;

thread_local! {
    static DESKTOP_MANAGER: RefCell<Option<IVirtualDesktopManager>> = const { RefCell::new(None) };
}

pub struct NativeShell {
    set_composition: Option<SetWindowCompositionAttributeFn>,
    os_build: u32,
}

impl NativeShell {
    pub fn new() -> Self {
        let set_composition = resolve_set_composition();
        let os_build = query_os_build().unwrap_or_else(|| {
            warn!("[NATIVE] RtlGetVersion unavailable; assuming an old build");
            0
        });

        Self {
            set_composition,
            os_build,
        }
    }
}

impl Default for NativeShell {
    fn default() -> Self {
        Self::new()
    }
}

fn hwnd(window: WindowHandle) -> HWND {
    HWND(window.0 as *mut c_void)
}

fn handle(hwnd: HWND) -> WindowHandle {
    WindowHandle(hwnd.0 as isize)
}

fn resolve_set_composition() -> Option<SetWindowCompositionAttributeFn> {
    unsafe {
        let user32 = GetModuleHandleW(w!("user32.dll")).ok()?;
        let proc = GetProcAddress(user32, s!("SetWindowCompositionAttribute"))?;
        Some(mem::transmute::<unsafe extern "system" fn() -> isize, SetWindowCompositionAttributeFn>(proc))
    }
}

fn query_os_build() -> Option<u32> {
    unsafe {
        let ntdll = GetModuleHandleW(w!("ntdll.dll")).ok()?;
        let proc = GetProcAddress(ntdll, s!("RtlGetVersion"))?;
        let rtl_get_version = mem::transmute::<unsafe extern "system" fn() -> isize, RtlGetVersionFn>(proc);

        let mut info = OSVERSIONINFOW {
            dwOSVersionInfoSize: mem::size_of::<OSVERSIONINFOW>() as u32,
            ..Default::default()
        };
        (rtl_get_version(&mut info) == 0).then_some(info.dwBuildNumber)
    }
}

fn process_file_name(window: HWND) -> Option<String> {
    unsafe {
        let mut pid = 0u32;
        GetWindowThreadProcessId(window, Some(&mut pid));
        if pid == 0 {
            return None;
        }

        let process = OpenProcess(PROCESS_QUERY_LIMITED_INFORMATION, false, pid).ok()?;
        let mut buf = [0u16; 1024];
        let mut len = buf.len() as u32;
        let queried = QueryFullProcessImageNameW(process, PROCESS_NAME_WIN32, PWSTR(buf.as_mut_ptr()), &mut len);
        let _ = CloseHandle(process);
        queried.ok()?;

        Some(file_name_of(&from_wide(&buf, len as usize)).to_string())
    }
}

impl Shell for NativeShell {
    fn top_level_windows(&self) -> Vec<WindowHandle> {
        unsafe extern "system" fn enum_proc(hwnd: HWND, lparam: LPARAM) -> BOOL {
            let out = &mut *(lparam.0 as *mut Vec<WindowHandle>);
            out.push(handle(hwnd));
            BOOL(1)
        }

        let mut windows = Vec::<WindowHandle>::new();
        unsafe {
            if let Err(e) = EnumWindows(Some(enum_proc), LPARAM((&mut windows as *mut Vec<WindowHandle>) as isize)) {
                info!("[NATIVE] EnumWindows stopped early: {e:?}");
            }
        }
        windows
    }

    fn window_state(&self, window: WindowHandle) -> ShellResult<WindowState> {
        let h = hwnd(window);
        unsafe {
            if !IsWindow(Some(h)).as_bool() {
                return Err(ShellError::query(window, "handle", "not a window"));
            }

            let mut cloaked = 0u32;
            DwmGetWindowAttribute(
                h,
                DWMWA_CLOAKED,
                &mut cloaked as *mut u32 as *mut c_void,
                mem::size_of::<u32>() as u32,
            )
            .map_err(|e| ShellError::query(window, "DWMWA_CLOAKED", format!("{e:?}")))?;

            let monitor = MonitorFromWindow(h, MONITOR_DEFAULTTONEAREST);
            if monitor.is_invalid() {
                return Err(ShellError::query(window, "monitor", "no monitor"));
            }

            Ok(WindowState {
                visible: IsWindowVisible(h).as_bool(),
                maximised: IsZoomed(h).as_bool(),
                cloaked: cloaked != 0,
                monitor: MonitorId(monitor.0 as isize),
            })
        }
    }

    fn window_identity(&self, window: WindowHandle) -> ShellResult<WindowIdentity> {
        let h = hwnd(window);
        let mut class_buf = [0u16; 256];
        let class_len = unsafe { GetClassNameW(h, &mut class_buf) };
        if class_len <= 0 {
            return Err(ShellError::query(window, "class name", "GetClassNameW returned 0"));
        }

        let mut title_buf = [0u16; 512];
        let title_len = unsafe { GetWindowTextW(h, &mut title_buf) }.max(0);

        Ok(WindowIdentity {
            class_name: from_wide(&class_buf, class_len as usize),
            title: from_wide(&title_buf, title_len as usize),
            // Elevated processes refuse the query; treat them as anonymous.
            file_name: process_file_name(h).unwrap_or_default(),
        })
    }

    fn on_current_desktop(&self, window: WindowHandle) -> ShellResult<bool> {
        DESKTOP_MANAGER.with(|cell| {
            let mut slot = cell.borrow_mut();
            let manager = match slot.as_ref() {
                Some(manager) => manager.clone(),
                None => {
                    let manager: IVirtualDesktopManager =
                        unsafe { CoCreateInstance(&VirtualDesktopManager, None, CLSCTX_ALL) }.map_err(|e| {
                            ShellError::Com {
                                call: "CoCreateInstance(VirtualDesktopManager)",
                                reason: format!("{e:?}"),
                            }
                        })?;
                    *slot = Some(manager.clone());
                    manager
                }
            };

            unsafe { manager.IsWindowOnCurrentVirtualDesktop(hwnd(window)) }
                .map(|on_desktop| on_desktop.as_bool())
                .map_err(|e| ShellError::query(window, "virtual desktop", format!("{e:?}")))
        })
    }

    fn foreground_window(&self) -> Option<WindowHandle> {
        let foreground = unsafe { GetForegroundWindow() };
        (!foreground.is_invalid()).then(|| handle(foreground))
    }

    fn primary_taskbar(&self) -> Option<WindowHandle> {
        unsafe { FindWindowW(w!("Shell_TrayWnd"), None) }.ok().map(handle)
    }

    fn secondary_taskbars(&self) -> Vec<WindowHandle> {
        let mut taskbars = Vec::new();
        let mut previous: Option<HWND> = None;
        while let Ok(next) = unsafe { FindWindowExW(None, previous, w!("Shell_SecondaryTrayWnd"), None) } {
            taskbars.push(handle(next));
            previous = Some(next);
        }
        taskbars
    }

    fn monitor_of(&self, window: WindowHandle) -> Option<MonitorId> {
        let monitor = unsafe { MonitorFromWindow(hwnd(window), MONITOR_DEFAULTTONEAREST) };
        (!monitor.is_invalid()).then(|| MonitorId(monitor.0 as isize))
    }

    fn supports_composition(&self) -> bool {
        self.set_composition.is_some()
    }

    fn set_composition_attribute(&self, window: WindowHandle, policy: &AccentPolicy) -> ShellResult<()> {
        let Some(set_composition) = self.set_composition else {
            return Err(ShellError::Unsupported("SetWindowCompositionAttribute"));
        };

        let mut accent = AccentPolicyData {
            accent_state: policy.accent_state,
            flags: policy.flags,
            gradient_color: policy.gradient_color,
            animation_id: policy.animation_id,
        };
        let mut data = WindowCompositionAttribData {
            attribute: WCA_ACCENT_POLICY,
            data: &mut accent as *mut AccentPolicyData as *mut c_void,
            size_of_data: mem::size_of::<AccentPolicyData>(),
        };

        if unsafe { set_composition(hwnd(window), &mut data) }.as_bool() {
            Ok(())
        } else {
            Err(ShellError::CompositionAttribute { window })
        }
    }

    fn refresh_theme(&self, window: WindowHandle) {
        unsafe {
            let _ = SendMessageTimeoutW(
                hwnd(window),
                WM_THEMECHANGED,
                WPARAM(0),
                LPARAM(0),
                SMTO_ABORTIFHUNG,
                THEME_REFRESH_TIMEOUT_MS,
                None,
            );
        }
    }

    fn os_build(&self) -> u32 {
        self.os_build
    }

    fn prepare_thread(&self) {
        init_com_apartment();
    }
}
