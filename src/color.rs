//! Color derivation for card backgrounds.
//!
//! Gradients are derived from one base color per record: the "darker" stop is
//! the base color unchanged (a symmetric light/dark pair looked muddy on the
//! preview designs) and the "lighter" stop lifts lightness by 20 points.

use std::collections::BTreeMap;

use crate::error::{TeamcardError, TeamcardResult};

/// Fallback background when neither the record nor the palette has a color.
pub const DEFAULT_TEAM_COLOR: &str = "#F1F9BB";

/// A (lighter, darker) stop pair for a diagonal linear gradient.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Gradient {
    pub lighter: String,
    pub darker: String,
}

/// Parse `#rrggbb` into HSL with h in [0,360), s and l in [0,100].
///
/// The achromatic case (max == min) yields h = s = 0.
pub fn hex_to_hsl(hex: &str) -> TeamcardResult<(f64, f64, f64)> {
    let (r, g, b) = parse_hex(hex)?;
    let r = f64::from(r) / 255.0;
    let g = f64::from(g) / 255.0;
    let b = f64::from(b) / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;

    if max == min {
        return Ok((0.0, 0.0, l * 100.0));
    }

    let d = max - min;
    let s = if l > 0.5 { d / (2.0 - max - min) } else { d / (max + min) };
    let mut h = if max == r {
        (g - b) / d + if g < b { 6.0 } else { 0.0 }
    } else if max == g {
        (b - r) / d + 2.0
    } else {
        (r - g) / d + 4.0
    };
    h /= 6.0;

    Ok((h * 360.0, s * 100.0, l * 100.0))
}

/// Inverse of [`hex_to_hsl`]; channels rounded to the nearest integer and
/// zero-padded to two lowercase hex digits.
pub fn hsl_to_hex(h: f64, s: f64, l: f64) -> String {
    let l = l / 100.0;
    let a = s * l.min(1.0 - l) / 100.0;
    let f = |n: f64| -> u8 {
        let k = (n + h / 30.0) % 12.0;
        let color = l - a * (k - 3.0).min(9.0 - k).min(1.0).max(-1.0);
        (255.0 * color).round() as u8
    };
    format!("#{:02x}{:02x}{:02x}", f(0.0), f(8.0), f(4.0))
}

/// Derive the gradient stop pair for a base color.
///
/// Invariant: `derive_gradient(c)?.darker == c`.
pub fn derive_gradient(base: &str) -> TeamcardResult<Gradient> {
    let (h, s, l) = hex_to_hsl(base)?;
    let lighter = hsl_to_hex(h, s, (l + 20.0).min(100.0));
    Ok(Gradient {
        lighter,
        darker: base.to_string(),
    })
}

fn parse_hex(hex: &str) -> TeamcardResult<(u8, u8, u8)> {
    let digits = hex
        .strip_prefix('#')
        .ok_or_else(|| TeamcardError::invalid_color(format!("missing '#' in '{hex}'")))?;
    if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(TeamcardError::invalid_color(format!(
            "expected '#' plus 6 hex digits, got '{hex}'"
        )));
    }
    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&digits[range], 16)
            .map_err(|e| TeamcardError::invalid_color(e.to_string()))
    };
    Ok((channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

/// Static team-name → background-color lookup, used when a record carries no
/// explicit color. Passed into the instantiator rather than read from a
/// global so alternate palettes stay testable.
#[derive(Clone, Debug)]
pub struct TeamColorPalette {
    colors: BTreeMap<String, String>,
    fallback: String,
}

impl TeamColorPalette {
    pub fn new(colors: BTreeMap<String, String>, fallback: impl Into<String>) -> Self {
        Self {
            colors,
            fallback: fallback.into(),
        }
    }

    pub fn color_for(&self, team_name: &str) -> &str {
        self.colors
            .get(team_name)
            .map(String::as_str)
            .unwrap_or(&self.fallback)
    }
}

impl Default for TeamColorPalette {
    fn default() -> Self {
        let colors = [
            ("용인팀", "#FFE4B5"),
            ("구덕팀", "#FFE4E1"),
            ("신촌팀", "#E0F6FF"),
            ("사직팀", "#FFE4E1"),
            ("하남팀", "#FFE4E1"),
            ("양산팀", "#F0FFF0"),
            ("수원팀", "#F0FFF0"),
            ("부천팀", "#F0FFF0"),
            ("서면팀", "#F0FFF0"),
            ("반포팀", "#FFF8DC"),
            ("목동팀", "#E6E6FA"),
            ("잠실팀", "#E6E6FA"),
            ("의정부팀", "#E6E6FA"),
            ("해운대팀", "#E6E6FA"),
            ("인천팀", "#F5F5DC"),
            ("파주팀", "#F5F5DC"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        Self::new(colors, DEFAULT_TEAM_COLOR)
    }
}
