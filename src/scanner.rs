//! One sweep over the top-level windows.

use std::collections::BTreeSet;

use crate::{
    data_loaders::blacklist::Blacklist,
    error::ShellResult,
    info,
    shell::{MonitorId, Shell, WindowHandle, WindowIdentity, WindowState},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForegroundWindow {
    pub handle: WindowHandle,
    pub monitor: MonitorId,
    pub cloaked: bool,
    /// Passes the same test as a window counted in [`ScanResult::maximised`].
    pub qualifies: bool,
    pub identity: WindowIdentity,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanResult {
    /// Registry monitors holding at least one qualifying maximised window.
    pub maximised: BTreeSet<MonitorId>,
    pub foreground: Option<ForegroundWindow>,
}

impl ScanResult {
    pub fn has_maximised(&self, monitor: MonitorId) -> bool {
        self.maximised.contains(&monitor)
    }
}

pub struct Scanner<'a, S: Shell + ?Sized> {
    shell: &'a S,
    blacklist: &'a Blacklist,
    known_monitors: &'a BTreeSet<MonitorId>,
}

impl<'a, S: Shell + ?Sized> Scanner<'a, S> {
    pub fn new(shell: &'a S, blacklist: &'a Blacklist, known_monitors: &'a BTreeSet<MonitorId>) -> Self {
        Self {
            shell,
            blacklist,
            known_monitors,
        }
    }

    /// `walk_windows == false` skips the enumeration and only looks at the
    /// foreground window.
    pub fn scan(&self, walk_windows: bool) -> ScanResult {
        let mut result = ScanResult::default();

        if walk_windows {
            for window in self.shell.top_level_windows() {
                match self.maximised_monitor(window, &result.maximised) {
                    Ok(Some(monitor)) => {
                        result.maximised.insert(monitor);
                    }
                    Ok(None) => {}
                    Err(e) => info!("[SCAN] Skipping window {:?}: {}", window, e),
                }
            }
        }

        result.foreground = self.foreground();
        result
    }

    fn maximised_monitor(
        &self,
        window: WindowHandle,
        already_found: &BTreeSet<MonitorId>,
    ) -> ShellResult<Option<MonitorId>> {
        let state = self.shell.window_state(window)?;
        if !self.is_candidate(&state) || already_found.contains(&state.monitor) {
            return Ok(None);
        }

        let identity = self.shell.window_identity(window)?;
        if self.blacklist.is_blacklisted(&identity) {
            return Ok(None);
        }

        // Cloak state usually covers other desktops already; ask anyway, last.
        if !self.shell.on_current_desktop(window)? {
            return Ok(None);
        }

        Ok(Some(state.monitor))
    }

    fn is_candidate(&self, state: &WindowState) -> bool {
        state.visible && state.maximised && !state.cloaked && self.known_monitors.contains(&state.monitor)
    }

    fn foreground(&self) -> Option<ForegroundWindow> {
        let handle = self.shell.foreground_window()?;

        let state = match self.shell.window_state(handle) {
            Ok(state) => state,
            Err(e) => {
                info!("[SCAN] Foreground window unreadable: {}", e);
                return None;
            }
        };

        let identity = match self.shell.window_identity(handle) {
            Ok(identity) => identity,
            Err(e) => {
                info!("[SCAN] Foreground window identity unreadable: {}", e);
                return None;
            }
        };

        let qualifies = self.is_candidate(&state)
            && !self.blacklist.is_blacklisted(&identity)
            && self.shell.on_current_desktop(handle).unwrap_or(false);

        Some(ForegroundWindow {
            handle,
            monitor: state.monitor,
            cloaked: state.cloaked,
            qualifies,
            identity,
        })
    }
}
