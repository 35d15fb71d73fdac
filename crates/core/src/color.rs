//! Color types and the perceptual blend used for theme cross-fades.
//!
//! Colors are stored as sRGB with `f64` components in [0, 1] and serialize as
//! `"#rrggbb"`. Blending goes through OKLab so a fade between two theme colors
//! does not dip through muddy intermediate shades.

use crate::error::EngineError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// sRGB color with components in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Srgb {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

/// Linear RGB color (gamma-decoded).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearRgb {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

/// OKLab perceptual color space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OkLab {
    pub l: f64,
    pub a: f64,
    pub b: f64,
}

impl Srgb {
    pub const WHITE: Srgb = Srgb {
        r: 1.0,
        g: 1.0,
        b: 1.0,
    };

    /// Parses `"#rrggbb"` or `"rrggbb"` (case insensitive).
    pub fn from_hex(hex: &str) -> Result<Srgb, EngineError> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 || !digits.is_ascii() {
            return Err(EngineError::InvalidColor(format!(
                "expected 6 hex digits in '{hex}'"
            )));
        }
        let channel = |range: std::ops::Range<usize>, name: &str| {
            u8::from_str_radix(&digits[range], 16)
                .map(|v| v as f64 / 255.0)
                .map_err(|e| EngineError::InvalidColor(format!("invalid {name} in '{hex}': {e}")))
        };
        Ok(Srgb {
            r: channel(0..2, "red")?,
            g: channel(2..4, "green")?,
            b: channel(4..6, "blue")?,
        })
    }

    /// Formats as `"#rrggbb"`, clamping and rounding each channel to 8 bits.
    pub fn to_hex(self) -> String {
        let [r, g, b] = self.to_rgb8();
        format!("#{r:02x}{g:02x}{b:02x}")
    }

    /// Quantizes to 8-bit channels.
    pub fn to_rgb8(self) -> [u8; 3] {
        let q = |c: f64| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b)]
    }

    /// Blends toward `other` by `t` in [0, 1], interpolating in OKLab.
    ///
    /// `t` is clamped; `t = 0` returns `self` and `t = 1` returns `other`
    /// without a round trip through OKLab.
    pub fn mix(self, other: Srgb, t: f64) -> Srgb {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        if t == 0.0 {
            return self;
        }
        if t == 1.0 {
            return other;
        }
        let a = srgb_to_oklab(self);
        let b = srgb_to_oklab(other);
        oklab_to_srgb(OkLab {
            l: a.l + (b.l - a.l) * t,
            a: a.a + (b.a - a.a) * t,
            b: a.b + (b.b - a.b) * t,
        })
    }
}

impl Serialize for Srgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Srgb {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Srgb::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

fn srgb_component_to_linear(c: f64) -> f64 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

fn linear_component_to_srgb(c: f64) -> f64 {
    if c <= 0.0031308 {
        c * 12.92
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    }
}

/// Converts sRGB to linear RGB.
pub fn srgb_to_linear(c: Srgb) -> LinearRgb {
    LinearRgb {
        r: srgb_component_to_linear(c.r),
        g: srgb_component_to_linear(c.g),
        b: srgb_component_to_linear(c.b),
    }
}

/// Converts linear RGB to sRGB.
pub fn linear_to_srgb(c: LinearRgb) -> Srgb {
    Srgb {
        r: linear_component_to_srgb(c.r),
        g: linear_component_to_srgb(c.g),
        b: linear_component_to_srgb(c.b),
    }
}

/// Converts linear RGB to OKLab.
pub fn linear_to_oklab(c: LinearRgb) -> OkLab {
    let l = (0.4122214708 * c.r + 0.5363325363 * c.g + 0.0514459929 * c.b).cbrt();
    let m = (0.2119034982 * c.r + 0.6806995451 * c.g + 0.1073969566 * c.b).cbrt();
    let s = (0.0883024619 * c.r + 0.2817188376 * c.g + 0.6299787005 * c.b).cbrt();

    OkLab {
        l: 0.2104542553 * l + 0.7936177850 * m - 0.0040720468 * s,
        a: 1.9779984951 * l - 2.4285922050 * m + 0.4505937099 * s,
        b: 0.0259040371 * l + 0.7827717662 * m - 0.8086757660 * s,
    }
}

/// Converts OKLab to linear RGB.
pub fn oklab_to_linear(c: OkLab) -> LinearRgb {
    let l = (c.l + 0.3963377774 * c.a + 0.2158037573 * c.b).powi(3);
    let m = (c.l - 0.1055613458 * c.a - 0.0638541728 * c.b).powi(3);
    let s = (c.l - 0.0894841775 * c.a - 1.2914855480 * c.b).powi(3);

    LinearRgb {
        r: 4.0767416621 * l - 3.3077115913 * m + 0.2309699292 * s,
        g: -1.2684380046 * l + 2.6097574011 * m - 0.3413193965 * s,
        b: -0.0041960863 * l - 0.7034186147 * m + 1.7076147010 * s,
    }
}

/// sRGB → OKLab.
pub fn srgb_to_oklab(c: Srgb) -> OkLab {
    linear_to_oklab(srgb_to_linear(c))
}

/// OKLab → sRGB, clamped to the displayable range.
pub fn oklab_to_srgb(c: OkLab) -> Srgb {
    let srgb = linear_to_srgb(oklab_to_linear(c));
    Srgb {
        r: srgb.r.clamp(0.0, 1.0),
        g: srgb.g.clamp(0.0, 1.0),
        b: srgb.b.clamp(0.0, 1.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-6;

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < EPSILON
    }

    #[test]
    fn from_hex_parses_gold() {
        let gold = Srgb::from_hex("#d4af37").unwrap();
        assert_eq!(gold.to_rgb8(), [0xd4, 0xaf, 0x37]);
    }

    #[test]
    fn from_hex_accepts_missing_hash_and_uppercase() {
        let c = Srgb::from_hex("112240").unwrap();
        let d = Srgb::from_hex("#112240").unwrap();
        assert_eq!(c, d);
        assert_eq!(Srgb::from_hex("#64FFDA").unwrap().to_hex(), "#64ffda");
    }

    #[test]
    fn from_hex_rejects_bad_input() {
        assert!(Srgb::from_hex("#fff").is_err());
        assert!(Srgb::from_hex("#gg0000").is_err());
        assert!(Srgb::from_hex("").is_err());
        assert!(Srgb::from_hex("#ééé").is_err());
    }

    #[test]
    fn to_hex_clamps_out_of_range_channels() {
        let c = Srgb {
            r: 1.5,
            g: -0.2,
            b: 0.5,
        };
        assert_eq!(c.to_hex(), "#ff0080");
    }

    #[test]
    fn white_has_unit_lightness_and_no_chroma() {
        let lab = srgb_to_oklab(Srgb::WHITE);
        assert!(approx_eq(lab.l, 1.0), "L = {}", lab.l);
        assert!(approx_eq(lab.a, 0.0), "a = {}", lab.a);
        assert!(approx_eq(lab.b, 0.0), "b = {}", lab.b);
    }

    #[test]
    fn oklab_round_trip_preserves_color() {
        let c = Srgb::from_hex("#d4af37").unwrap();
        let back = oklab_to_srgb(srgb_to_oklab(c));
        assert!(approx_eq(back.r, c.r), "r {} vs {}", back.r, c.r);
        assert!(approx_eq(back.g, c.g), "g {} vs {}", back.g, c.g);
        assert!(approx_eq(back.b, c.b), "b {} vs {}", back.b, c.b);
    }

    #[test]
    fn mix_endpoints_are_exact() {
        let a = Srgb::from_hex("#64ffda").unwrap();
        let b = Srgb::from_hex("#d4af37").unwrap();
        assert_eq!(a.mix(b, 0.0), a);
        assert_eq!(a.mix(b, 1.0), b);
        assert_eq!(a.mix(b, -3.0), a);
        assert_eq!(a.mix(b, 7.0), b);
        assert_eq!(a.mix(b, f64::NAN), a);
    }

    #[test]
    fn mix_midpoint_lightness_is_between_endpoints() {
        let navy = Srgb::from_hex("#112240").unwrap();
        let gold = Srgb::from_hex("#d4af37").unwrap();
        let mid = srgb_to_oklab(navy.mix(gold, 0.5));
        let l0 = srgb_to_oklab(navy).l;
        let l1 = srgb_to_oklab(gold).l;
        assert!(mid.l > l0 && mid.l < l1, "mid L {} not in ({l0}, {l1})", mid.l);
    }

    #[test]
    fn serde_uses_hex_strings() {
        let c = Srgb::from_hex("#112240").unwrap();
        let json = serde_json::to_string(&c).unwrap();
        assert_eq!(json, "\"#112240\"");
        let back: Srgb = serde_json::from_str(&json).unwrap();
        assert_eq!(back.to_hex(), "#112240");
        assert!(serde_json::from_str::<Srgb>("\"nope\"").is_err());
    }
}
