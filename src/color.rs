use anyhow::{bail, Context, Result};
use palette::{LinSrgb, Mix, Srgb};

/// Core color type shared by the sampler, the carousel and the TUI.
/// Wraps sRGB u8 components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Color = Color::new(255, 255, 255);

    /// Light gray used whenever extraction cannot produce a color.
    pub const DEFAULT_FALLBACK: Color = Color::new(0xe5, 0xe7, 0xeb);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse a hex color string like `#ff8800` or `#FF8800`.
    pub fn from_hex(hex: &str) -> Result<Self> {
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if hex.len() != 6 {
            bail!(
                "invalid hex color: expected 6 hex digits, got {}",
                hex.len()
            );
        }
        let r = u8::from_str_radix(&hex[0..2], 16)?;
        let g = u8::from_str_radix(&hex[2..4], 16)?;
        let b = u8::from_str_radix(&hex[4..6], 16)?;
        Ok(Self { r, g, b })
    }

    /// Parse either a hex color or a CSS `rgb(r, g, b)` triple.
    pub fn parse(s: &str) -> Result<Self> {
        let s = s.trim();
        let Some(inner) = s
            .strip_prefix("rgb(")
            .and_then(|rest| rest.strip_suffix(')'))
        else {
            return Self::from_hex(s);
        };

        let channels = inner
            .split(',')
            .map(|part| {
                part.trim()
                    .parse::<u8>()
                    .with_context(|| format!("invalid rgb channel {:?} in {s}", part.trim()))
            })
            .collect::<Result<Vec<u8>>>()?;
        match channels.as_slice() {
            [r, g, b] => Ok(Self::new(*r, *g, *b)),
            _ => bail!("invalid rgb color: expected 3 channels, got {}", channels.len()),
        }
    }

    /// Serialize to lowercase hex `#rrggbb`.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Serialize to a CSS `rgb(r, g, b)` triple.
    pub fn to_css_rgb(self) -> String {
        format!("rgb({}, {}, {})", self.r, self.g, self.b)
    }

    /// Convert to `palette::Srgb<u8>`.
    pub fn to_srgb_u8(self) -> Srgb<u8> {
        Srgb::new(self.r, self.g, self.b)
    }

    /// Create from `palette::Srgb<u8>`.
    pub fn from_srgb_u8(srgb: Srgb<u8>) -> Self {
        Self {
            r: srgb.red,
            g: srgb.green,
            b: srgb.blue,
        }
    }

    /// Perceived brightness on a 0-255 scale (Rec. 601 luma weights).
    pub fn brightness(self) -> f32 {
        luma(self.r, self.g, self.b)
    }

    /// Add `amount` to every channel, saturating at 255.
    pub fn lighten(self, amount: u8) -> Color {
        Color::new(
            self.r.saturating_add(amount),
            self.g.saturating_add(amount),
            self.b.saturating_add(amount),
        )
    }

    /// Whether dark text reads better than light text on this color.
    pub fn is_light(self) -> bool {
        self.brightness() / 255.0 > 0.6
    }

    /// Blend towards `other` in linear light. `factor` 0 keeps `self`, 1 gives `other`.
    pub fn mix(self, other: Color, factor: f32) -> Color {
        let a: LinSrgb<f32> = self.to_srgb_u8().into_format::<f32>().into_linear();
        let b: LinSrgb<f32> = other.to_srgb_u8().into_format::<f32>().into_linear();
        let mixed = a.mix(b, factor.clamp(0.0, 1.0));
        let srgb: Srgb<f32> = Srgb::from_linear(mixed);
        Self::from_srgb_u8(srgb.into_format())
    }
}

/// Rec. 601 luma of an sRGB triple, 0-255.
pub fn luma(r: u8, g: u8, b: u8) -> f32 {
    0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl std::str::FromStr for Color {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        Color::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLACK: Color = Color { r: 0, g: 0, b: 0 };

    #[test]
    fn hex_round_trip() {
        let original = Color::from_hex("#ff8800").unwrap();
        assert_eq!(original.r, 255);
        assert_eq!(original.g, 136);
        assert_eq!(original.b, 0);
        assert_eq!(original.to_hex(), "#ff8800");
    }

    #[test]
    fn hex_uppercase_input() {
        let color = Color::from_hex("#FF8800").unwrap();
        assert_eq!(color.to_hex(), "#ff8800");
    }

    #[test]
    fn hex_without_hash() {
        let color = Color::from_hex("aabbcc").unwrap();
        assert_eq!(color.to_hex(), "#aabbcc");
    }

    #[test]
    fn hex_invalid_length() {
        assert!(Color::from_hex("#fff").is_err());
    }

    #[test]
    fn hex_invalid_chars() {
        assert!(Color::from_hex("#gggggg").is_err());
    }

    #[test]
    fn parse_css_rgb() {
        let color = Color::parse("rgb(255, 180, 10)").unwrap();
        assert_eq!(color, Color::new(255, 180, 10));
        assert_eq!(color.to_css_rgb(), "rgb(255, 180, 10)");
    }

    #[test]
    fn parse_css_rgb_rejects_bad_channels() {
        assert!(Color::parse("rgb(255, 180)").is_err());
        assert!(Color::parse("rgb(256, 0, 0)").is_err());
        assert!(Color::parse("rgb(a, b, c)").is_err());
    }

    #[test]
    fn parse_falls_back_to_hex() {
        assert_eq!("#e5e7eb".parse::<Color>().unwrap(), Color::DEFAULT_FALLBACK);
    }

    #[test]
    fn brightness_extremes() {
        assert!(BLACK.brightness() < 0.001);
        assert!((Color::WHITE.brightness() - 255.0).abs() < 0.01);
    }

    #[test]
    fn lighten_saturates_at_255() {
        let c = Color::new(10, 210, 250).lighten(50);
        assert_eq!(c, Color::new(60, 255, 255));
    }

    #[test]
    fn light_and_dark_classification() {
        assert!(Color::from_hex("#e7e0ac").unwrap().is_light());
        assert!(!Color::from_hex("#1a1a1a").unwrap().is_light());
        assert!(!Color::new(120, 120, 120).is_light());
        assert!(Color::new(170, 170, 170).is_light());
    }

    #[test]
    fn mix_endpoints() {
        let a = Color::new(200, 40, 40);
        let b = Color::new(20, 20, 220);
        for (mixed, expected) in [(a.mix(b, 0.0), a), (a.mix(b, 1.0), b)] {
            assert!((mixed.r as i16 - expected.r as i16).abs() <= 1, "{mixed} vs {expected}");
            assert!((mixed.g as i16 - expected.g as i16).abs() <= 1, "{mixed} vs {expected}");
            assert!((mixed.b as i16 - expected.b as i16).abs() <= 1, "{mixed} vs {expected}");
        }
    }

    #[test]
    fn mix_halfway_lies_between() {
        let mixed = BLACK.mix(Color::WHITE, 0.5);
        assert!(mixed.r > 0 && mixed.r < 255);
        assert_eq!(mixed.r, mixed.g);
        assert_eq!(mixed.g, mixed.b);
    }

    #[test]
    fn display_matches_to_hex() {
        let color = Color::new(171, 205, 239);
        assert_eq!(format!("{color}"), color.to_hex());
    }
}
