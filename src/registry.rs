use std::collections::{hash_map, HashMap};

use crate::{
    appearance::Preset,
    info,
    shell::{MonitorId, Shell, WindowHandle, PRIMARY_TASKBAR_CLASS, SECONDARY_TASKBAR_CLASS},
    warn,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskbarEntry {
    pub surface: WindowHandle,
    pub preset: Preset,
}

/// Monitor -> taskbar binding. Only ever replaced wholesale by [`rebuild`].
///
/// [`rebuild`]: MonitorRegistry::rebuild
#[derive(Debug, Default)]
pub struct MonitorRegistry {
    main_monitor: Option<MonitorId>,
    taskbars: HashMap<MonitorId, TaskbarEntry>,
}

impl MonitorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops every binding and re-reads the taskbars from the shell. Each
    /// entry starts on `Regular`; the next recompute assigns the real preset.
    ///
    /// Without a primary taskbar the registry stays empty.
    pub fn rebuild<S: Shell + ?Sized>(&mut self, shell: &S) {
        info!("[REGISTRY] Refreshing taskbar handles");

        self.taskbars.clear();
        self.main_monitor = None;

        let Some(primary) = shell.primary_taskbar() else {
            warn!("[REGISTRY] No {} window found; registry left empty", PRIMARY_TASKBAR_CLASS);
            return;
        };

        let Some(primary_monitor) = shell.monitor_of(primary) else {
            warn!("[REGISTRY] Primary taskbar {:?} has no monitor; registry left empty", primary);
            return;
        };

        self.main_monitor = Some(primary_monitor);
        self.taskbars.insert(
            primary_monitor,
            TaskbarEntry {
                surface: primary,
                preset: Preset::Regular,
            },
        );

        for secondary in shell.secondary_taskbars() {
            match shell.monitor_of(secondary) {
                Some(monitor) => {
                    self.taskbars.insert(
                        monitor,
                        TaskbarEntry {
                            surface: secondary,
                            preset: Preset::Regular,
                        },
                    );
                }
                None => warn!(
                    "[REGISTRY] Skipping {} {:?}: monitor lookup failed",
                    SECONDARY_TASKBAR_CLASS, secondary
                ),
            }
        }

        info!("[REGISTRY] {} taskbar(s) registered", self.taskbars.len());
    }

    pub fn len(&self) -> usize {
        self.taskbars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.taskbars.is_empty()
    }

    pub fn contains(&self, monitor: MonitorId) -> bool {
        self.taskbars.contains_key(&monitor)
    }

    pub fn get(&self, monitor: MonitorId) -> Option<&TaskbarEntry> {
        self.taskbars.get(&monitor)
    }

    pub fn holds_surface(&self, surface: WindowHandle) -> bool {
        self.taskbars.values().any(|entry| entry.surface == surface)
    }

    pub fn main_monitor(&self) -> Option<MonitorId> {
        self.main_monitor
    }

    pub fn monitors(&self) -> impl Iterator<Item = MonitorId> + '_ {
        self.taskbars.keys().copied()
    }

    pub fn surfaces(&self) -> impl Iterator<Item = WindowHandle> + '_ {
        self.taskbars.values().map(|entry| entry.surface)
    }

    pub fn iter(&self) -> hash_map::Iter<'_, MonitorId, TaskbarEntry> {
        self.taskbars.iter()
    }

    /// Overwrites the preset of a known monitor. Unknown monitors are ignored.
    pub fn assign(&mut self, monitor: MonitorId, preset: Preset) -> bool {
        match self.taskbars.get_mut(&monitor) {
            Some(entry) => {
                entry.preset = preset;
                true
            }
            None => false,
        }
    }
}
