//! Theme colors shared by the background and its host.

use crate::color::Srgb;
use crate::error::EngineError;
use serde::{Deserialize, Serialize};

/// Default accent: antique gold.
pub const DEFAULT_ACCENT: &str = "#d4af37";
/// Default secondary: deep navy.
pub const DEFAULT_SECONDARY: &str = "#112240";

/// The pair of colors a card hands to the background when it comes into view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThemeColors {
    pub accent: Srgb,
    pub secondary: Srgb,
}

impl ThemeColors {
    /// Builds a theme from two hex strings.
    pub fn from_hex(accent: &str, secondary: &str) -> Result<Self, EngineError> {
        Ok(Self {
            accent: Srgb::from_hex(accent)?,
            secondary: Srgb::from_hex(secondary)?,
        })
    }

    /// Blends both colors toward `other` by `t`.
    pub fn mix(self, other: ThemeColors, t: f64) -> ThemeColors {
        ThemeColors {
            accent: self.accent.mix(other.accent, t),
            secondary: self.secondary.mix(other.secondary, t),
        }
    }
}

impl Default for ThemeColors {
    fn default() -> Self {
        Self {
            accent: Srgb {
                r: 212.0 / 255.0,
                g: 175.0 / 255.0,
                b: 55.0 / 255.0,
            },
            secondary: Srgb {
                r: 17.0 / 255.0,
                g: 34.0 / 255.0,
                b: 64.0 / 255.0,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_hex_constants() {
        let theme = ThemeColors::default();
        assert_eq!(theme.accent.to_hex(), DEFAULT_ACCENT);
        assert_eq!(theme.secondary.to_hex(), DEFAULT_SECONDARY);
    }

    #[test]
    fn from_hex_propagates_color_errors() {
        assert!(ThemeColors::from_hex("#d4af37", "bogus").is_err());
        assert!(ThemeColors::from_hex("#d4af37", "#112240").is_ok());
    }

    #[test]
    fn mix_moves_both_channels() {
        let a = ThemeColors::default();
        let b = ThemeColors::from_hex("#64ffda", "#020c1b").unwrap();
        assert_eq!(a.mix(b, 1.0), b);
        assert_eq!(a.mix(b, 0.0), a);
        let half = a.mix(b, 0.5);
        assert_ne!(half.accent, a.accent);
        assert_ne!(half.secondary, a.secondary);
    }

    #[test]
    fn json_round_trip_uses_hex() {
        let theme = ThemeColors::default();
        let v = serde_json::to_value(theme).unwrap();
        assert_eq!(v["accent"], "#d4af37");
        assert_eq!(v["secondary"], "#112240");
        let back: ThemeColors = serde_json::from_value(v).unwrap();
        assert_eq!(back.accent.to_hex(), "#d4af37");
    }
}
