//! Appearance catalog: the named presets a taskbar can be switched between.

/// Compositing mode requested for a taskbar surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlurMode {
    /// Stock shell rendering; nothing is forced on the surface.
    Disabled,
    /// Solid fill with the preset color.
    Opaque,
    /// Tinted, no blur.
    Clear,
    /// Classic blur-behind.
    Enabled,
    /// Acrylic blur. Rejects a fully transparent tint.
    Fluent,
    /// Acrylic driven by the system backdrop. Same alpha restriction as `Fluent`.
    AcrylicSystemBackdrop,
}

impl BlurMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "normal" | "disabled" | "default" | "off" => Some(Self::Disabled),
            "opaque" | "solid" => Some(Self::Opaque),
            "clear" | "transparent" | "tint" => Some(Self::Clear),
            "blur" | "enabled" | "on" => Some(Self::Enabled),
            "fluent" | "acrylic" => Some(Self::Fluent),
            "backdrop" | "acrylic-system-backdrop" | "acrylic_system_backdrop" | "system-backdrop" => {
                Some(Self::AcrylicSystemBackdrop)
            }
            _ => None,
        }
    }

    pub fn is_normal(self) -> bool {
        self == Self::Disabled
    }

    /// Modes whose compositor path ignores a tint whose alpha is exactly zero.
    pub fn rejects_zero_alpha(self) -> bool {
        matches!(self, Self::Fluent | Self::AcrylicSystemBackdrop)
    }

    /// Value of the `ACCENT_STATE` field passed to the composition attribute call.
    pub fn accent_state(self) -> u32 {
        match self {
            Self::Disabled => 0,
            Self::Opaque => 1,
            Self::Clear => 2,
            Self::Enabled => 3,
            Self::Fluent => 4,
            Self::AcrylicSystemBackdrop => 5,
        }
    }
}

/// Immutable (mode, ARGB color) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Appearance {
    pub mode: BlurMode,
    pub color: u32,
}

impl Appearance {
    pub const NORMAL: Appearance = Appearance {
        mode: BlurMode::Disabled,
        color: 0,
    };

    pub const fn new(mode: BlurMode, color: u32) -> Self {
        Self { mode, color }
    }
}

/// Name of a catalog entry. The registry stores this instead of a copy of
/// the appearance, so a configuration change is picked up on the next apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Preset {
    Regular,
    Maximised,
    Start,
    Cortana,
    Timeline,
    Peek,
}

impl Preset {
    pub fn name(self) -> &'static str {
        match self {
            Self::Regular => "regular",
            Self::Maximised => "maximised",
            Self::Start => "start",
            Self::Cortana => "cortana",
            Self::Timeline => "timeline",
            Self::Peek => "peek",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppearanceCatalog {
    pub regular: Appearance,
    pub maximised: Appearance,
    pub start: Appearance,
    pub cortana: Appearance,
    pub timeline: Appearance,
    /// Optional override used while peek forces the taskbar back to regular.
    pub peek: Option<Appearance>,
}

impl Default for AppearanceCatalog {
    fn default() -> Self {
        Self {
            regular: Appearance::new(BlurMode::Clear, 0x0000_0000),
            maximised: Appearance::new(BlurMode::Enabled, 0xAA00_0000),
            start: Appearance::NORMAL,
            cortana: Appearance::NORMAL,
            timeline: Appearance::NORMAL,
            peek: None,
        }
    }
}

impl AppearanceCatalog {
    /// Resolves a preset. `Peek` without an override falls back to `Regular`.
    pub fn get(&self, preset: Preset) -> &Appearance {
        match preset {
            Preset::Regular => &self.regular,
            Preset::Maximised => &self.maximised,
            Preset::Start => &self.start,
            Preset::Cortana => &self.cortana,
            Preset::Timeline => &self.timeline,
            Preset::Peek => self.peek.as_ref().unwrap_or(&self.regular),
        }
    }

    /// Preset the peek rule should assign: the override when configured,
    /// otherwise plain `Regular`.
    pub fn peek_preset(&self) -> Preset {
        if self.peek.is_some() {
            Preset::Peek
        } else {
            Preset::Regular
        }
    }
}

/// Parses `#RRGGBB` (opaque) or `#AARRGGBB`; the leading `#` or `0x` is optional.
pub fn parse_color(value: &str) -> Option<u32> {
    let trimmed = value.trim();
    let hex = trimmed
        .strip_prefix('#')
        .or_else(|| trimmed.strip_prefix("0x"))
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);

    let parsed = u32::from_str_radix(hex, 16).ok()?;
    match hex.len() {
        6 => Some(0xFF00_0000 | parsed),
        8 => Some(parsed),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_short_and_long_colors() {
        assert_eq!(parse_color("#112233"), Some(0xFF11_2233));
        assert_eq!(parse_color("#80112233"), Some(0x8011_2233));
        assert_eq!(parse_color("0x00000000"), Some(0));
        assert_eq!(parse_color("#12345"), None);
        assert_eq!(parse_color("#GG0000"), None);
    }

    #[test]
    fn parses_mode_aliases() {
        assert_eq!(BlurMode::parse("Normal"), Some(BlurMode::Disabled));
        assert_eq!(BlurMode::parse("acrylic"), Some(BlurMode::Fluent));
        assert_eq!(BlurMode::parse(" blur "), Some(BlurMode::Enabled));
        assert_eq!(BlurMode::parse("backdrop"), Some(BlurMode::AcrylicSystemBackdrop));
        assert_eq!(BlurMode::parse("sparkles"), None);
    }

    #[test]
    fn peek_without_override_resolves_to_regular() {
        let mut catalog = AppearanceCatalog::default();
        assert_eq!(catalog.peek_preset(), Preset::Regular);
        assert_eq!(catalog.get(Preset::Peek), &catalog.regular);

        catalog.peek = Some(Appearance::new(BlurMode::Opaque, 0xFF10_2030));
        assert_eq!(catalog.peek_preset(), Preset::Peek);
        assert_eq!(catalog.get(Preset::Peek).color, 0xFF10_2030);
    }
}
