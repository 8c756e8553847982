//! Per-monitor preset selection.
//!
//! Rules run in [`RULES`] order and every rule that fires overwrites the
//! result of the ones before it, so the last matching rule wins.

use std::collections::BTreeMap;

use crate::{
    appearance::Preset,
    data_loaders::config::{PeekMode, TintConfig},
    registry::MonitorRegistry,
    scanner::ScanResult,
    shell::{MonitorId, WindowIdentity},
    utility::ignore_case_equals,
};

pub const SEARCH_EXECUTABLES: [&str; 2] = ["SearchUI.exe", "SearchApp.exe"];
pub const CORE_WINDOW_CLASS: &str = "Windows.UI.Core.CoreWindow";
pub const MULTITASKING_VIEW_CLASS: &str = "MultitaskingViewFrame";
pub const EXPLORER_EXECUTABLE: &str = "Explorer.exe";

/// Shell state flags fed by asynchronous OS callbacks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Signals {
    pub peek_active: bool,
    pub start_opened: bool,
}

/// How task view / timeline is recognised; depends on the OS build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimelineDetection {
    /// Newer builds: a core window owned by explorer.
    ExplorerCoreWindow,
    /// Older builds: a dedicated window class.
    MultitaskingViewFrame,
}

impl TimelineDetection {
    pub fn for_build(os_build: u32, fluent_min_build: u32) -> Self {
        if os_build >= fluent_min_build {
            Self::ExplorerCoreWindow
        } else {
            Self::MultitaskingViewFrame
        }
    }

    pub fn matches(self, window: &WindowIdentity) -> bool {
        match self {
            Self::ExplorerCoreWindow => {
                window.class_name == CORE_WINDOW_CLASS && ignore_case_equals(&window.file_name, EXPLORER_EXECUTABLE)
            }
            Self::MultitaskingViewFrame => window.class_name == MULTITASKING_VIEW_CLASS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// Always `Regular`.
    Base,
    /// A qualifying maximised window sits on the monitor.
    Maximised,
    /// The foreground window on this monitor is a shell surface (search, start).
    ShellForeground,
    /// Peek preview forces the regular look back.
    RegularOnPeek,
    /// Task view / timeline is in the foreground; applies to every monitor.
    Timeline,
}

/// Evaluation order. Peek sits between the shell windows and timeline:
/// peek hides start and search visually, task view still draws over peek.
pub const RULES: [Rule; 5] = [
    Rule::Base,
    Rule::Maximised,
    Rule::ShellForeground,
    Rule::RegularOnPeek,
    Rule::Timeline,
];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Decision {
    pub assignments: BTreeMap<MonitorId, Preset>,
    pub should_show_peek: bool,
}

pub struct DecisionContext<'a> {
    pub scan: &'a ScanResult,
    pub signals: Signals,
    pub config: &'a TintConfig,
    pub timeline: TimelineDetection,
}

impl Rule {
    pub fn evaluate(self, monitor: MonitorId, ctx: &DecisionContext<'_>) -> Option<Preset> {
        let features = &ctx.config.features;
        match self {
            Rule::Base => Some(Preset::Regular),
            Rule::Maximised => (features.maximised.enabled && ctx.scan.has_maximised(monitor)).then_some(Preset::Maximised),
            Rule::ShellForeground => {
                let foreground = ctx.scan.foreground.as_ref()?;
                if foreground.monitor != monitor || !foreground.qualifies {
                    return None;
                }

                let is_search = SEARCH_EXECUTABLES
                    .iter()
                    .any(|exe| ignore_case_equals(&foreground.identity.file_name, exe));

                if is_search && features.cortana_enabled && !ctx.signals.start_opened && !foreground.cloaked {
                    Some(Preset::Cortana)
                } else if features.start_enabled && ctx.signals.start_opened {
                    Some(Preset::Maximised)
                } else {
                    Some(Preset::Start)
                }
            }
            Rule::RegularOnPeek => (features.maximised.enabled
                && features.maximised.regular_on_peek
                && ctx.signals.peek_active)
                .then(|| ctx.config.catalog.peek_preset()),
            Rule::Timeline => {
                let foreground = ctx.scan.foreground.as_ref()?;
                (features.timeline_enabled && ctx.timeline.matches(&foreground.identity)).then_some(Preset::Timeline)
            }
        }
    }
}

/// Pure: the same registry keys, scan, signals and config always give the
/// same decision.
pub fn decide(registry: &MonitorRegistry, ctx: &DecisionContext<'_>) -> Decision {
    let assignments = registry
        .monitors()
        .map(|monitor| {
            let preset = RULES
                .iter()
                .filter_map(|rule| rule.evaluate(monitor, ctx))
                .last()
                .unwrap_or(Preset::Regular);
            (monitor, preset)
        })
        .collect();

    Decision {
        assignments,
        should_show_peek: should_show_peek(registry, ctx),
    }
}

fn should_show_peek(registry: &MonitorRegistry, ctx: &DecisionContext<'_>) -> bool {
    let peek = &ctx.config.features.peek;
    match peek.mode {
        PeekMode::Disabled => false,
        PeekMode::Enabled => true,
        PeekMode::Dynamic => registry.monitors().any(|monitor| {
            ctx.scan.has_maximised(monitor) && (!peek.only_main || registry.main_monitor() == Some(monitor))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        data_loaders::blacklist::Blacklist,
        scanner::{ForegroundWindow, Scanner},
        shell::WindowHandle,
        testing::{FakeShell, FakeWindow},
    };

    fn registry(monitors: isize) -> MonitorRegistry {
        let shell = FakeShell::with_monitors(monitors);
        let mut registry = MonitorRegistry::new();
        registry.rebuild(&shell);
        registry
    }

    fn scan_with(maximised: &[isize], foreground: Option<ForegroundWindow>) -> ScanResult {
        ScanResult {
            maximised: maximised.iter().copied().map(MonitorId).collect(),
            foreground,
        }
    }

    fn foreground(monitor: isize, class_name: &str, file_name: &str, qualifies: bool) -> ForegroundWindow {
        ForegroundWindow {
            handle: WindowHandle(500),
            monitor: MonitorId(monitor),
            cloaked: false,
            qualifies,
            identity: WindowIdentity {
                class_name: class_name.to_string(),
                title: String::new(),
                file_name: file_name.to_string(),
            },
        }
    }

    fn run(registry: &MonitorRegistry, scan: &ScanResult, signals: Signals, config: &TintConfig) -> Decision {
        let ctx = DecisionContext {
            scan,
            signals,
            config,
            timeline: TimelineDetection::ExplorerCoreWindow,
        };
        decide(registry, &ctx)
    }

    fn preset(decision: &Decision, monitor: isize) -> Preset {
        decision.assignments[&MonitorId(monitor)]
    }

    #[test]
    fn idle_desktop_is_regular_everywhere() {
        let registry = registry(2);
        let decision = run(&registry, &scan_with(&[], None), Signals::default(), &TintConfig::default());

        assert_eq!(preset(&decision, 1), Preset::Regular);
        assert_eq!(preset(&decision, 2), Preset::Regular);
    }

    #[test]
    fn maximised_window_only_affects_its_monitor() {
        let registry = registry(2);
        let decision = run(&registry, &scan_with(&[2], None), Signals::default(), &TintConfig::default());

        assert_eq!(preset(&decision, 1), Preset::Regular);
        assert_eq!(preset(&decision, 2), Preset::Maximised);
    }

    #[test]
    fn maximised_rule_obeys_feature_toggle() {
        let registry = registry(1);
        let mut config = TintConfig::default();
        config.features.maximised.enabled = false;

        let decision = run(&registry, &scan_with(&[1], None), Signals::default(), &config);
        assert_eq!(preset(&decision, 1), Preset::Regular);
    }

    #[test]
    fn decision_is_deterministic() {
        let registry = registry(3);
        let scan = scan_with(&[1, 3], Some(foreground(3, "Notepad", "notepad.exe", true)));
        let signals = Signals {
            peek_active: false,
            start_opened: true,
        };
        let config = TintConfig::default();

        let first = run(&registry, &scan, signals, &config);
        for _ in 0..10 {
            assert_eq!(run(&registry, &scan, signals, &config), first);
        }
    }

    #[test]
    fn timeline_overrides_everything_on_every_monitor() {
        let registry = registry(2);
        let scan = scan_with(&[1, 2], Some(foreground(1, CORE_WINDOW_CLASS, "explorer.exe", true)));
        let signals = Signals {
            peek_active: true,
            start_opened: false,
        };

        let decision = run(&registry, &scan, signals, &TintConfig::default());
        assert_eq!(preset(&decision, 1), Preset::Timeline);
        assert_eq!(preset(&decision, 2), Preset::Timeline);
    }

    #[test]
    fn timeline_detection_follows_os_build() {
        let old = TimelineDetection::for_build(16299, 17063);
        let new = TimelineDetection::for_build(17063, 17063);
        assert_eq!(old, TimelineDetection::MultitaskingViewFrame);
        assert_eq!(new, TimelineDetection::ExplorerCoreWindow);

        let frame = foreground(1, MULTITASKING_VIEW_CLASS, "explorer.exe", false).identity;
        let core = foreground(1, CORE_WINDOW_CLASS, "EXPLORER.EXE", false).identity;
        let foreign_core = foreground(1, CORE_WINDOW_CLASS, "SearchApp.exe", false).identity;

        assert!(old.matches(&frame));
        assert!(!old.matches(&core));
        assert!(new.matches(&core));
        assert!(!new.matches(&foreign_core));
        assert!(!new.matches(&frame));
    }

    #[test]
    fn peek_forces_regular_over_maximised() {
        let registry = registry(1);
        let signals = Signals {
            peek_active: true,
            start_opened: false,
        };

        let decision = run(&registry, &scan_with(&[1], None), signals, &TintConfig::default());
        assert_eq!(preset(&decision, 1), Preset::Regular);
    }

    #[test]
    fn peek_uses_override_preset_when_configured() {
        let registry = registry(1);
        let mut config = TintConfig::default();
        config.catalog.peek = Some(crate::appearance::Appearance::NORMAL);
        let signals = Signals {
            peek_active: true,
            start_opened: false,
        };

        let decision = run(&registry, &scan_with(&[1], None), signals, &config);
        assert_eq!(preset(&decision, 1), Preset::Peek);
    }

    #[test]
    fn peek_without_regular_on_peek_keeps_maximised() {
        let registry = registry(1);
        let mut config = TintConfig::default();
        config.features.maximised.regular_on_peek = false;
        let signals = Signals {
            peek_active: true,
            start_opened: false,
        };

        let decision = run(&registry, &scan_with(&[1], None), signals, &config);
        assert_eq!(preset(&decision, 1), Preset::Maximised);
    }

    #[test]
    fn search_foreground_selects_cortana() {
        let registry = registry(2);
        let scan = scan_with(&[], Some(foreground(2, CORE_WINDOW_CLASS, "searchapp.EXE", true)));

        let decision = run(&registry, &scan, Signals::default(), &TintConfig::default());
        assert_eq!(preset(&decision, 1), Preset::Regular);
        assert_eq!(preset(&decision, 2), Preset::Cortana);
    }

    #[test]
    fn start_open_wins_over_search_window() {
        let registry = registry(1);
        let scan = scan_with(&[], Some(foreground(1, CORE_WINDOW_CLASS, "SearchUI.exe", true)));
        let signals = Signals {
            peek_active: false,
            start_opened: true,
        };

        let decision = run(&registry, &scan, signals, &TintConfig::default());
        assert_eq!(preset(&decision, 1), Preset::Maximised);
    }

    #[test]
    fn cloaked_search_window_is_not_a_shell_surface() {
        let shell = FakeShell::with_monitors(1);
        let mut window = FakeWindow::maximised(9, 1).with_identity(CORE_WINDOW_CLASS, "SearchUI.exe");
        window.state.cloaked = true;
        shell.add_window(window);
        shell.set_foreground(Some(9));

        let registry = registry(1);
        let known: std::collections::BTreeSet<_> = registry.monitors().collect();
        let scan = Scanner::new(&shell, &Blacklist::default(), &known).scan(true);

        // The scanner already rejects cloaked windows; the rule's own cloak check never sees one.
        assert!(!scan.foreground.as_ref().unwrap().qualifies);
        let decision = run(&registry, &scan, Signals::default(), &TintConfig::default());
        assert_eq!(preset(&decision, 1), Preset::Regular);
    }

    #[test]
    fn disabled_cortana_shows_start_for_search() {
        let registry = registry(1);
        let mut config = TintConfig::default();
        config.features.cortana_enabled = false;
        let scan = scan_with(&[], Some(foreground(1, CORE_WINDOW_CLASS, "SearchApp.exe", true)));

        let decision = run(&registry, &scan, Signals::default(), &config);
        assert_eq!(preset(&decision, 1), Preset::Start);
    }

    #[test]
    fn disabled_start_keeps_start_preset_while_open() {
        let registry = registry(1);
        let mut config = TintConfig::default();
        config.features.start_enabled = false;
        let scan = scan_with(&[1], Some(foreground(1, "Notepad", "notepad.exe", true)));
        let signals = Signals {
            peek_active: false,
            start_opened: true,
        };

        let decision = run(&registry, &scan, signals, &config);
        assert_eq!(preset(&decision, 1), Preset::Start);
    }

    #[test]
    fn disabled_timeline_never_fires() {
        let registry = registry(2);
        let mut config = TintConfig::default();
        config.features.timeline_enabled = false;
        let scan = scan_with(&[], Some(foreground(1, CORE_WINDOW_CLASS, "explorer.exe", true)));

        let decision = run(&registry, &scan, Signals::default(), &config);
        assert_eq!(preset(&decision, 1), Preset::Start);
        assert_eq!(preset(&decision, 2), Preset::Regular);
    }

    #[test]
    fn timeline_on_unknown_monitor_still_applies_everywhere() {
        let registry = registry(2);
        let scan = scan_with(&[2], Some(foreground(7, CORE_WINDOW_CLASS, "explorer.exe", false)));

        let decision = run(&registry, &scan, Signals::default(), &TintConfig::default());
        assert_eq!(preset(&decision, 1), Preset::Timeline);
        assert_eq!(preset(&decision, 2), Preset::Timeline);
    }

    #[test]
    fn non_qualifying_foreground_is_ignored() {
        let registry = registry(1);
        let scan = scan_with(&[], Some(foreground(1, CORE_WINDOW_CLASS, "SearchUI.exe", false)));

        let decision = run(&registry, &scan, Signals::default(), &TintConfig::default());
        assert_eq!(preset(&decision, 1), Preset::Regular);
    }

    #[test]
    fn dynamic_peek_only_counts_main_monitor_when_asked() {
        let registry = registry(2);
        let mut config = TintConfig::default();

        let secondary_only = scan_with(&[2], None);
        assert!(!run(&registry, &secondary_only, Signals::default(), &config).should_show_peek);

        let main = scan_with(&[1], None);
        assert!(run(&registry, &main, Signals::default(), &config).should_show_peek);

        config.features.peek.only_main = false;
        assert!(run(&registry, &secondary_only, Signals::default(), &config).should_show_peek);
    }

    #[test]
    fn static_peek_modes_ignore_the_scan() {
        let registry = registry(1);
        let mut config = TintConfig::default();

        config.features.peek.mode = PeekMode::Enabled;
        assert!(run(&registry, &scan_with(&[], None), Signals::default(), &config).should_show_peek);

        config.features.peek.mode = PeekMode::Disabled;
        assert!(!run(&registry, &scan_with(&[1], None), Signals::default(), &config).should_show_peek);
    }

    #[test]
    fn empty_registry_yields_empty_decision() {
        let registry = MonitorRegistry::new();
        let decision = run(&registry, &scan_with(&[1], None), Signals::default(), &TintConfig::default());
        assert!(decision.assignments.is_empty());
        assert!(!decision.should_show_peek);
    }
}
