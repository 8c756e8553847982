//! State shared between the event-dispatch thread and the worker.

use std::{
    collections::{BTreeMap, BTreeSet},
    sync::{
        atomic::{AtomicBool, Ordering},
        Mutex, MutexGuard, PoisonError,
    },
};

use crate::{
    appearance::{Appearance, Preset},
    data_loaders::{blacklist::Blacklist, config::TintConfig},
    decision::{decide, DecisionContext, Signals, TimelineDetection},
    dispatcher::{Dispatch, Dispatcher},
    info,
    registry::MonitorRegistry,
    scanner::Scanner,
    shell::{MonitorId, Shell},
};

/// Everything guarded by the one lock: the registry and the dispatcher's
/// per-surface memo, which must never outlive a registry entry.
#[derive(Debug)]
pub struct Taskbars {
    pub registry: MonitorRegistry,
    pub dispatcher: Dispatcher,
}

pub struct Engine<S: Shell> {
    shell: S,
    config: TintConfig,
    blacklist: Blacklist,
    timeline: TimelineDetection,
    taskbars: Mutex<Taskbars>,
    peek_active: AtomicBool,
    start_opened: AtomicBool,
    should_show_peek: AtomicBool,
}

impl<S: Shell> Engine<S> {
    /// Reads the shell capabilities and performs the startup registry build.
    pub fn new(shell: S, config: TintConfig, blacklist: Blacklist) -> Self {
        let os_build = shell.os_build();
        let timeline = TimelineDetection::for_build(os_build, config.runtime.fluent_min_build);
        info!("[ENGINE] OS build {} -> timeline detection {:?}", os_build, timeline);

        let dispatcher = Dispatcher::new(&shell);
        let engine = Self {
            shell,
            config,
            blacklist,
            timeline,
            taskbars: Mutex::new(Taskbars {
                registry: MonitorRegistry::new(),
                dispatcher,
            }),
            peek_active: AtomicBool::new(false),
            start_opened: AtomicBool::new(false),
            should_show_peek: AtomicBool::new(true),
        };
        engine.rebuild_registry();
        engine
    }

    pub fn shell(&self) -> &S {
        &self.shell
    }

    pub fn config(&self) -> &TintConfig {
        &self.config
    }

    /// Rebinds every monitor to its current taskbar. Called on display
    /// changes and whenever the shell recreates a taskbar.
    pub fn rebuild_registry(&self) {
        let mut taskbars = self.lock();
        let Taskbars { registry, dispatcher } = &mut *taskbars;
        registry.rebuild(&self.shell);
        dispatcher.retain_surfaces(registry.surfaces());
    }

    pub fn set_peek_active(&self, active: bool) {
        self.peek_active.store(active, Ordering::Relaxed);
    }

    pub fn set_start_opened(&self, opened: bool) {
        self.start_opened.store(opened, Ordering::Relaxed);
    }

    pub fn signals(&self) -> Signals {
        Signals {
            peek_active: self.peek_active.load(Ordering::Relaxed),
            start_opened: self.start_opened.load(Ordering::Relaxed),
        }
    }

    /// Whether the peek button should be visible, as of the last recompute.
    pub fn should_show_peek(&self) -> bool {
        self.should_show_peek.load(Ordering::Relaxed)
    }

    /// Scans the windows and reassigns a preset to every monitor.
    ///
    /// The window sweep runs without the lock; a rebuild that lands in
    /// between only costs the new monitors one cycle on `Regular`.
    pub fn recompute(&self) {
        let known: BTreeSet<MonitorId> = self.lock().registry.monitors().collect();

        let scan = Scanner::new(&self.shell, &self.blacklist, &known).scan(self.config.needs_window_scan());
        let ctx = DecisionContext {
            scan: &scan,
            signals: self.signals(),
            config: &self.config,
            timeline: self.timeline,
        };

        let mut taskbars = self.lock();
        let decision = decide(&taskbars.registry, &ctx);
        for (monitor, preset) in &decision.assignments {
            let previous = taskbars.registry.get(*monitor).map(|entry| entry.preset);
            if previous != Some(*preset) {
                info!(
                    "[ENGINE] Monitor {:?}: {} -> {}",
                    monitor,
                    previous.map(Preset::name).unwrap_or("-"),
                    preset.name()
                );
            }
            taskbars.registry.assign(*monitor, *preset);
        }
        self.should_show_peek.store(decision.should_show_peek, Ordering::Relaxed);
    }

    /// Pushes the currently assigned presets to every taskbar.
    pub fn reapply(&self) {
        self.dispatch(|preset| *self.config.catalog.get(preset));
    }

    /// Puts every registered taskbar back to stock rendering. Only call once
    /// the worker has stopped.
    pub fn restore_all(&self) {
        info!("[ENGINE] Restoring {} taskbar(s)", self.lock().registry.len());
        self.dispatch(|_| Appearance::NORMAL);
    }

    /// Plans under the lock, calls into the shell without it, then records
    /// the outcomes for surfaces that are still registered.
    fn dispatch<F>(&self, appearance_for: F)
    where
        F: Fn(Preset) -> Appearance,
    {
        let planned: Vec<Dispatch> = {
            let mut taskbars = self.lock();
            let Taskbars { registry, dispatcher } = &mut *taskbars;
            registry
                .iter()
                .filter_map(|(_, entry)| dispatcher.plan(entry.surface, &appearance_for(entry.preset)))
                .collect()
        };
        if planned.is_empty() {
            return;
        }

        let outcomes: Vec<_> = planned
            .iter()
            .map(|dispatch| (dispatch.surface(), dispatch.perform(&self.shell)))
            .collect();

        let mut taskbars = self.lock();
        let Taskbars { registry, dispatcher } = &mut *taskbars;
        for (surface, outcome) in outcomes {
            if registry.holds_surface(surface) {
                dispatcher.record(surface, &outcome);
            }
        }
    }

    pub fn presets(&self) -> BTreeMap<MonitorId, Preset> {
        self.lock()
            .registry
            .iter()
            .map(|(monitor, entry)| (*monitor, entry.preset))
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, Taskbars> {
        self.taskbars.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
