//! Boundary to the native windowing system.
//!
//! Everything the core needs from the OS goes through [`Shell`]. The Windows
//! implementation lives in `win32::native`; tests use an in-memory fake.

use crate::error::ShellResult;

/// Raw window handle value. Never dereferenced by the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowHandle(pub isize);

/// Raw monitor handle value. Stable until the next topology change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MonitorId(pub isize);

/// Cheap per-window state, queried before anything that costs a string copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowState {
    pub visible: bool,
    pub maximised: bool,
    pub cloaked: bool,
    pub monitor: MonitorId,
}

/// Strings the blacklist and the shell-window detection match against.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WindowIdentity {
    pub class_name: String,
    pub title: String,
    /// Process image file name, e.g. `explorer.exe`.
    pub file_name: String,
}

/// Payload of the composition attribute call, color already in the
/// compositor's ABGR layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccentPolicy {
    pub accent_state: u32,
    pub flags: u32,
    pub gradient_color: u32,
    pub animation_id: u32,
}

pub const PRIMARY_TASKBAR_CLASS: &str = "Shell_TrayWnd";
pub const SECONDARY_TASKBAR_CLASS: &str = "Shell_SecondaryTrayWnd";

pub trait Shell: Send + Sync {
    /// All top-level windows in enumeration order.
    fn top_level_windows(&self) -> Vec<WindowHandle>;

    fn window_state(&self, window: WindowHandle) -> ShellResult<WindowState>;

    fn window_identity(&self, window: WindowHandle) -> ShellResult<WindowIdentity>;

    /// Virtual desktop membership. The slowest query; callers ask it last.
    fn on_current_desktop(&self, window: WindowHandle) -> ShellResult<bool>;

    fn foreground_window(&self) -> Option<WindowHandle>;

    fn primary_taskbar(&self) -> Option<WindowHandle>;

    fn secondary_taskbars(&self) -> Vec<WindowHandle>;

    fn monitor_of(&self, window: WindowHandle) -> Option<MonitorId>;

    /// Whether `set_composition_attribute` exists on this OS build.
    fn supports_composition(&self) -> bool;

    fn set_composition_attribute(&self, window: WindowHandle, policy: &AccentPolicy) -> ShellResult<()>;

    /// Asks a surface to reload its theme, which restores stock rendering.
    fn refresh_theme(&self, window: WindowHandle);

    fn os_build(&self) -> u32;

    /// Per-thread setup (COM apartment and the like) for a thread that is
    /// about to call into the shell.
    fn prepare_thread(&self) {}
}
