use std::{
    collections::HashSet,
    sync::{Arc, Barrier, Mutex, MutexGuard},
};

use crate::{
    error::{ShellError, ShellResult},
    shell::{AccentPolicy, MonitorId, Shell, WindowHandle, WindowIdentity, WindowState},
};

#[derive(Debug, Clone)]
pub struct FakeWindow {
    pub handle: WindowHandle,
    pub state: WindowState,
    pub identity: WindowIdentity,
    pub on_current_desktop: bool,
    pub broken: bool,
}

impl FakeWindow {
    pub fn maximised(handle: isize, monitor: isize) -> Self {
        Self {
            handle: WindowHandle(handle),
            state: WindowState {
                visible: true,
                maximised: true,
                cloaked: false,
                monitor: MonitorId(monitor),
            },
            identity: WindowIdentity {
                class_name: "Notepad".to_string(),
                title: "notes.txt - Notepad".to_string(),
                file_name: "notepad.exe".to_string(),
            },
            on_current_desktop: true,
            broken: false,
        }
    }

    pub fn restored(handle: isize, monitor: isize) -> Self {
        let mut window = Self::maximised(handle, monitor);
        window.state.maximised = false;
        window
    }

    pub fn with_identity(mut self, class_name: &str, file_name: &str) -> Self {
        self.identity.class_name = class_name.to_string();
        self.identity.file_name = file_name.to_string();
        self
    }
}

#[derive(Debug, Default)]
pub struct FakeState {
    pub windows: Vec<FakeWindow>,
    pub foreground: Option<WindowHandle>,
    pub primary: Option<(WindowHandle, MonitorId)>,
    pub secondaries: Vec<(WindowHandle, MonitorId)>,
    pub supports_composition: bool,
    pub failing_surfaces: HashSet<WindowHandle>,
    pub composition_calls: Vec<(WindowHandle, AccentPolicy)>,
    pub theme_refreshes: Vec<WindowHandle>,
    pub os_build: u32,
    /// Number of upcoming window enumerations that panic.
    pub panicking_scans: u32,
    /// The next theme refresh waits on this twice before returning.
    pub refresh_gate: Option<Arc<Barrier>>,
}

/// In-memory shell that records every side effect.
#[derive(Debug)]
pub struct FakeShell {
    state: Mutex<FakeState>,
}

impl FakeShell {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(FakeState {
                supports_composition: true,
                os_build: 19045,
                ..FakeState::default()
            }),
        }
    }

    /// The taskbar of monitor n is handle 100 + n; monitor 1 holds the primary.
    pub fn with_monitors(count: isize) -> Self {
        let shell = Self::new();
        shell.set_monitors(count);
        shell
    }

    pub fn set_monitors(&self, count: isize) {
        let mut state = self.state();
        state.primary = (count > 0).then(|| (WindowHandle(101), MonitorId(1)));
        state.secondaries = (2..=count).map(|n| (WindowHandle(100 + n), MonitorId(n))).collect();
    }

    pub fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    pub fn add_window(&self, window: FakeWindow) {
        self.state().windows.push(window);
    }

    pub fn set_foreground(&self, window: Option<isize>) {
        self.state().foreground = window.map(WindowHandle);
    }

    pub fn composition_calls(&self) -> Vec<(WindowHandle, AccentPolicy)> {
        self.state().composition_calls.clone()
    }

    pub fn theme_refreshes(&self) -> Vec<WindowHandle> {
        self.state().theme_refreshes.clone()
    }

    pub fn clear_log(&self) {
        let mut state = self.state();
        state.composition_calls.clear();
        state.theme_refreshes.clear();
    }

    fn find(&self, window: WindowHandle) -> Option<FakeWindow> {
        self.state().windows.iter().find(|w| w.handle == window).cloned()
    }
}

impl Shell for FakeShell {
    fn top_level_windows(&self) -> Vec<WindowHandle> {
        let mut state = self.state();
        if state.panicking_scans > 0 {
            state.panicking_scans -= 1;
            drop(state);
            panic!("window enumeration blew up");
        }
        state.windows.iter().map(|w| w.handle).collect()
    }

    fn window_state(&self, window: WindowHandle) -> ShellResult<WindowState> {
        match self.find(window) {
            Some(w) if !w.broken => Ok(w.state),
            _ => Err(ShellError::query(window, "state", "window is gone")),
        }
    }

    fn window_identity(&self, window: WindowHandle) -> ShellResult<WindowIdentity> {
        match self.find(window) {
            Some(w) if !w.broken => Ok(w.identity),
            _ => Err(ShellError::query(window, "identity", "window is gone")),
        }
    }

    fn on_current_desktop(&self, window: WindowHandle) -> ShellResult<bool> {
        match self.find(window) {
            Some(w) if !w.broken => Ok(w.on_current_desktop),
            _ => Err(ShellError::query(window, "desktop", "window is gone")),
        }
    }

    fn foreground_window(&self) -> Option<WindowHandle> {
        self.state().foreground
    }

    fn primary_taskbar(&self) -> Option<WindowHandle> {
        self.state().primary.map(|(w, _)| w)
    }

    fn secondary_taskbars(&self) -> Vec<WindowHandle> {
        self.state().secondaries.iter().map(|(w, _)| *w).collect()
    }

    fn monitor_of(&self, window: WindowHandle) -> Option<MonitorId> {
        let state = self.state();
        state
            .primary
            .iter()
            .chain(state.secondaries.iter())
            .find(|(w, _)| *w == window)
            .map(|(_, m)| *m)
            .or_else(|| {
                state
                    .windows
                    .iter()
                    .find(|w| w.handle == window)
                    .map(|w| w.state.monitor)
            })
    }

    fn supports_composition(&self) -> bool {
        self.state().supports_composition
    }

    fn set_composition_attribute(&self, window: WindowHandle, policy: &AccentPolicy) -> ShellResult<()> {
        let mut state = self.state();
        state.composition_calls.push((window, *policy));
        if state.failing_surfaces.contains(&window) {
            return Err(ShellError::CompositionAttribute { window });
        }
        Ok(())
    }

    fn refresh_theme(&self, window: WindowHandle) {
        let gate = {
            let mut state = self.state();
            state.theme_refreshes.push(window);
            state.refresh_gate.take()
        };
        if let Some(gate) = gate {
            gate.wait();
            gate.wait();
        }
    }

    fn os_build(&self) -> u32 {
        self.state().os_build
    }
}
