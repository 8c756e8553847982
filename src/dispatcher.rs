use std::collections::{HashMap, HashSet};

use crate::{
    appearance::Appearance,
    error::ShellResult,
    info,
    shell::{AccentPolicy, Shell, WindowHandle},
    warn,
};

/// Accent flag asking the compositor to paint the tint across the whole surface.
const ACCENT_FLAG_DRAW_ALL: u32 = 2;

/// One native call decided by [`Dispatcher::plan`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    RefreshTheme(WindowHandle),
    SetAccent(WindowHandle, AccentPolicy),
}

impl Dispatch {
    pub fn surface(&self) -> WindowHandle {
        match *self {
            Dispatch::RefreshTheme(surface) | Dispatch::SetAccent(surface, _) => surface,
        }
    }

    /// Issues the native call. May block on explorer, so never call it with
    /// the registry lock held.
    pub fn perform<S: Shell + ?Sized>(&self, shell: &S) -> ShellResult<()> {
        match self {
            Dispatch::RefreshTheme(surface) => {
                shell.refresh_theme(*surface);
                Ok(())
            }
            Dispatch::SetAccent(surface, policy) => shell.set_composition_attribute(*surface, policy),
        }
    }
}

/// Pushes appearances onto taskbar surfaces.
///
/// Tracks which surfaces were last put back to stock rendering: restoring is
/// done through a theme refresh, and sending one every tick makes explorer's
/// CPU usage climb, so it is only sent on the transition.
#[derive(Debug)]
pub struct Dispatcher {
    capable: bool,
    is_normal: HashMap<WindowHandle, bool>,
    failing: HashSet<WindowHandle>,
}

impl Dispatcher {
    /// Checks the composition primitive once; without it every apply is a no-op.
    pub fn new<S: Shell + ?Sized>(shell: &S) -> Self {
        let capable = shell.supports_composition();
        if !capable {
            warn!("[DISPATCH] SetWindowCompositionAttribute unavailable; taskbar appearance will not change");
        }

        Self {
            capable,
            is_normal: HashMap::new(),
            failing: HashSet::new(),
        }
    }

    #[cfg(test)]
    pub fn is_capable(&self) -> bool {
        self.capable
    }

    /// Updates the memo for `surface` and returns the call still needed, if any.
    pub fn plan(&mut self, surface: WindowHandle, appearance: &Appearance) -> Option<Dispatch> {
        if !self.capable {
            return None;
        }

        if appearance.mode.is_normal() {
            let was_normal = self.is_normal.insert(surface, true) == Some(true);
            return (!was_normal).then_some(Dispatch::RefreshTheme(surface));
        }

        self.is_normal.insert(surface, false);
        Some(Dispatch::SetAccent(surface, accent_policy(appearance)))
    }

    /// Logs a failing surface once, and again when it recovers.
    pub fn record(&mut self, surface: WindowHandle, outcome: &ShellResult<()>) {
        match outcome {
            Ok(()) => {
                if self.failing.remove(&surface) {
                    info!("[DISPATCH] Surface {:?} accepts composition attributes again", surface);
                }
            }
            Err(e) => {
                if self.failing.insert(surface) {
                    warn!("[DISPATCH] {}", e);
                }
            }
        }
    }

    /// Plans, performs and records in one go.
    pub fn apply<S: Shell + ?Sized>(&mut self, shell: &S, surface: WindowHandle, appearance: &Appearance) {
        if let Some(dispatch) = self.plan(surface, appearance) {
            let outcome = dispatch.perform(shell);
            self.record(surface, &outcome);
        }
    }

    /// Forgets surfaces that are no longer registered.
    pub fn retain_surfaces<I>(&mut self, live: I)
    where
        I: IntoIterator<Item = WindowHandle>,
    {
        let live: HashSet<WindowHandle> = live.into_iter().collect();
        self.is_normal.retain(|surface, _| live.contains(surface));
        self.failing.retain(|surface| live.contains(surface));
    }

    #[cfg(test)]
    pub fn tracked_surfaces(&self) -> usize {
        self.is_normal.len()
    }
}

/// Converts ARGB to the compositor's ABGR layout and lifts a zero alpha to
/// 0x01 for modes that would otherwise ignore the tint.
pub fn accent_policy(appearance: &Appearance) -> AccentPolicy {
    let argb = appearance.color;
    let mut abgr = (argb & 0xFF00_FF00) | ((argb & 0x00FF_0000) >> 16) | ((argb & 0x0000_00FF) << 16);

    if appearance.mode.rejects_zero_alpha() && abgr >> 24 == 0 {
        abgr |= 0x01 << 24;
    }

    AccentPolicy {
        accent_state: appearance.mode.accent_state(),
        flags: ACCENT_FLAG_DRAW_ALL,
        gradient_color: abgr,
        animation_id: 0,
    }
}
