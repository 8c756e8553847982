use std::path::Path;

use serde_yaml::{Mapping, Value};

use super::yaml::load_yaml;
use crate::appearance::{parse_color, Appearance, AppearanceCatalog, BlurMode};

/// Builds from this one on have the timeline window hosted by explorer.
pub const DEFAULT_FLUENT_MIN_BUILD: u32 = 17063;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TintConfig {
    pub verbose: bool,
    pub catalog: AppearanceCatalog,
    pub features: FeatureSettings,
    pub runtime: RuntimeSettings,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureSettings {
    pub maximised: MaximisedSettings,
    pub peek: PeekSettings,
    pub start_enabled: bool,
    pub cortana_enabled: bool,
    pub timeline_enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaximisedSettings {
    pub enabled: bool,
    pub regular_on_peek: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PeekSettings {
    pub mode: PeekMode,
    pub only_main: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeSettings {
    pub sleep_time_ms: u64,
    /// Ticks between two full recomputes.
    pub recompute_every: u32,
    pub fluent_min_build: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeekMode {
    Disabled,
    Enabled,
    Dynamic,
}

impl PeekMode {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "disabled" | "off" | "hide" | "false" => Some(Self::Disabled),
            "enabled" | "on" | "show" | "true" => Some(Self::Enabled),
            "dynamic" | "auto" => Some(Self::Dynamic),
            _ => None,
        }
    }
}

impl Default for TintConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            catalog: AppearanceCatalog::default(),
            features: FeatureSettings::default(),
            runtime: RuntimeSettings::default(),
        }
    }
}

impl Default for FeatureSettings {
    fn default() -> Self {
        Self {
            maximised: MaximisedSettings::default(),
            peek: PeekSettings::default(),
            start_enabled: true,
            cortana_enabled: true,
            timeline_enabled: true,
        }
    }
}

impl Default for MaximisedSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            regular_on_peek: true,
        }
    }
}

impl Default for PeekSettings {
    fn default() -> Self {
        Self {
            mode: PeekMode::Dynamic,
            only_main: true,
        }
    }
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            sleep_time_ms: 10,
            recompute_every: 10,
            fluent_min_build: DEFAULT_FLUENT_MIN_BUILD,
        }
    }
}

impl TintConfig {
    pub fn load(path: &Path) -> Option<Self> {
        let value = load_yaml(path)?;
        Self::from_yaml(&value)
    }

    pub fn from_yaml(root: &Value) -> Option<Self> {
        let map = root.as_mapping()?;
        let mut config = Self::default();

        config.verbose = bool_any(map, &["verbose", "debug"]).unwrap_or(config.verbose);

        if let Some(appearance) = mapping_any(map, &["appearance", "appearances", "presets"]) {
            parse_catalog(appearance, &mut config.catalog);
        }

        if let Some(features) = mapping_at(map, "features") {
            parse_features(features, &mut config.features);
        }

        if let Some(runtime) = mapping_at(map, "runtime") {
            parse_runtime(runtime, &mut config.runtime);
        }

        Some(config)
    }

    /// Whether the scanner has to walk the window list at all.
    pub fn needs_window_scan(&self) -> bool {
        self.features.maximised.enabled || self.features.peek.mode == PeekMode::Dynamic
    }
}

fn parse_catalog(map: &Mapping, catalog: &mut AppearanceCatalog) {
    let slots: [(&[&str], &mut Appearance); 5] = [
        (&["regular"], &mut catalog.regular),
        (&["maximised", "maximized"], &mut catalog.maximised),
        (&["start", "start_menu"], &mut catalog.start),
        (&["cortana", "search"], &mut catalog.cortana),
        (&["timeline", "task_view"], &mut catalog.timeline),
    ];

    for (keys, slot) in slots {
        if let Some(section) = mapping_any(map, keys) {
            *slot = parse_appearance(section, *slot);
        }
    }

    if let Some(section) = mapping_at(map, "peek") {
        catalog.peek = Some(parse_appearance(section, catalog.regular));
    }
}

fn parse_appearance(map: &Mapping, fallback: Appearance) -> Appearance {
    let mode = str_any(map, &["accent", "mode", "blur"])
        .and_then(BlurMode::parse)
        .unwrap_or(fallback.mode);

    let mut color = str_at(map, "color").and_then(parse_color).unwrap_or(fallback.color);

    if let Some(opacity) = u64_at(map, "opacity") {
        let alpha = opacity.min(0xFF) as u32;
        color = (alpha << 24) | (color & 0x00FF_FFFF);
    }

    Appearance::new(mode, color)
}

fn parse_features(map: &Mapping, features: &mut FeatureSettings) {
    if let Some(maximised) = mapping_any(map, &["maximised", "maximized"]) {
        features.maximised.enabled = bool_at(maximised, "enabled").unwrap_or(features.maximised.enabled);
        features.maximised.regular_on_peek = bool_any(maximised, &["regular_on_peek", "peek_regular"])
            .unwrap_or(features.maximised.regular_on_peek);
    }

    if let Some(peek) = mapping_at(map, "peek") {
        features.peek.mode = str_at(peek, "mode")
            .and_then(PeekMode::parse)
            .or_else(|| bool_at(peek, "mode").map(|b| if b { PeekMode::Enabled } else { PeekMode::Disabled }))
            .unwrap_or(features.peek.mode);
        features.peek.only_main =
            bool_any(peek, &["only_main", "only_main_monitor"]).unwrap_or(features.peek.only_main);
    }

    features.start_enabled = bool_any(map, &["start", "start_menu"]).unwrap_or(features.start_enabled);
    features.cortana_enabled = bool_any(map, &["cortana", "search"]).unwrap_or(features.cortana_enabled);
    features.timeline_enabled =
        bool_any(map, &["timeline", "task_view"]).unwrap_or(features.timeline_enabled);
}

fn parse_runtime(map: &Mapping, runtime: &mut RuntimeSettings) {
    runtime.sleep_time_ms = u64_any(map, &["sleep_time_ms", "tick_sleep_ms"])
        .unwrap_or(runtime.sleep_time_ms)
        .max(1);
    runtime.recompute_every = u64_any(map, &["recompute_every", "recompute_every_ticks"])
        .map(|v| v.min(u32::MAX as u64) as u32)
        .unwrap_or(runtime.recompute_every)
        .max(1);
    runtime.fluent_min_build = u64_at(map, "fluent_min_build")
        .map(|v| v.min(u32::MAX as u64) as u32)
        .unwrap_or(runtime.fluent_min_build);
}

fn bool_at(map: &Mapping, key: &str) -> Option<bool> {
    map.get(Value::String(key.to_string()))?.as_bool()
}

fn bool_any(map: &Mapping, keys: &[&str]) -> Option<bool> {
    keys.iter().find_map(|k| bool_at(map, k))
}

fn str_at<'a>(map: &'a Mapping, key: &str) -> Option<&'a str> {
    map.get(Value::String(key.to_string()))?.as_str()
}

fn str_any<'a>(map: &'a Mapping, keys: &[&str]) -> Option<&'a str> {
    keys.iter().find_map(|k| str_at(map, k))
}

fn mapping_at<'a>(map: &'a Mapping, key: &str) -> Option<&'a Mapping> {
    map.get(Value::String(key.to_string()))?.as_mapping()
}

fn mapping_any<'a>(map: &'a Mapping, keys: &[&str]) -> Option<&'a Mapping> {
    keys.iter().find_map(|k| mapping_at(map, k))
}

fn u64_at(map: &Mapping, key: &str) -> Option<u64> {
    map.get(Value::String(key.to_string()))?
        .as_i64()
        .and_then(|v| if v >= 0 { Some(v as u64) } else { None })
}

fn u64_any(map: &Mapping, keys: &[&str]) -> Option<u64> {
    keys.iter().find_map(|k| u64_at(map, k))
}
