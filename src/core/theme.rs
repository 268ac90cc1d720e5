// ImageQA - core/theme.rs
//
// Named theme presets. Purely cosmetic: each preset maps to a primary and a
// secondary accent colour. Conversion to egui colours lives in ui/theme.rs.

use crate::util::error::InvalidThemeError;
use std::fmt;

/// A selectable colour preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ThemePreset {
    #[default]
    PurpleGradient,
    OceanBlue,
    SunsetOrange,
    ForestGreen,
    RosePink,
    DarkMode,
}

/// An sRGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Hex notation, e.g. `#667eea`.
    pub fn hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

impl ThemePreset {
    /// All presets in the order the theme selector lists them.
    pub const ALL: [ThemePreset; 6] = [
        Self::PurpleGradient,
        Self::OceanBlue,
        Self::SunsetOrange,
        Self::ForestGreen,
        Self::RosePink,
        Self::DarkMode,
    ];

    /// Display name, also the key accepted by [`ThemePreset::from_name`].
    pub fn name(&self) -> &'static str {
        match self {
            Self::PurpleGradient => "Purple Gradient",
            Self::OceanBlue => "Ocean Blue",
            Self::SunsetOrange => "Sunset Orange",
            Self::ForestGreen => "Forest Green",
            Self::RosePink => "Rose Pink",
            Self::DarkMode => "Dark Mode",
        }
    }

    /// Look up a preset by its exact display name.
    pub fn from_name(name: &str) -> Result<Self, InvalidThemeError> {
        Self::ALL
            .into_iter()
            .find(|p| p.name() == name)
            .ok_or_else(|| InvalidThemeError {
                name: name.to_string(),
            })
    }

    pub fn primary(&self) -> Rgb {
        match self {
            Self::PurpleGradient => Rgb(0x66, 0x7e, 0xea),
            Self::OceanBlue => Rgb(0x2e, 0x31, 0x92),
            Self::SunsetOrange => Rgb(0xf1, 0x27, 0x11),
            Self::ForestGreen => Rgb(0x13, 0x4e, 0x5e),
            Self::RosePink => Rgb(0xec, 0x00, 0x8c),
            Self::DarkMode => Rgb(0xbb, 0x86, 0xfc),
        }
    }

    pub fn secondary(&self) -> Rgb {
        match self {
            Self::PurpleGradient => Rgb(0x76, 0x4b, 0xa2),
            Self::OceanBlue => Rgb(0x1b, 0xff, 0xff),
            Self::SunsetOrange => Rgb(0xf5, 0xaf, 0x19),
            Self::ForestGreen => Rgb(0x71, 0xb2, 0x80),
            Self::RosePink => Rgb(0xfc, 0x67, 0x67),
            Self::DarkMode => Rgb(0x03, 0xda, 0xc6),
        }
    }

    /// Whether the preset renders on dark base visuals.
    pub fn is_dark(&self) -> bool {
        matches!(self, Self::DarkMode)
    }
}

impl fmt::Display for ThemePreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_preset_round_trips_by_name() {
        for preset in ThemePreset::ALL {
            assert_eq!(ThemePreset::from_name(preset.name()), Ok(preset));
        }
    }

    #[test]
    fn test_unknown_name_rejected() {
        let err = ThemePreset::from_name("Nonexistent").unwrap_err();
        assert_eq!(err.name, "Nonexistent");
    }

    #[test]
    fn test_name_match_is_exact() {
        assert!(ThemePreset::from_name("ocean blue").is_err());
        assert!(ThemePreset::from_name(" Ocean Blue").is_err());
    }

    #[test]
    fn test_colours() {
        assert_eq!(ThemePreset::PurpleGradient.primary().hex(), "#667eea");
        assert_eq!(ThemePreset::DarkMode.secondary().hex(), "#03dac6");
        assert!(ThemePreset::DarkMode.is_dark());
        assert!(!ThemePreset::OceanBlue.is_dark());
    }
}
