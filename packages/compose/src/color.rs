//! Continuous color scales over fixed palettes.

use serde::{Serialize, Serializer};

/// An sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Builds a color from a `0xRRGGBB` literal.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn from_hex(hex: u32) -> Self {
        Self((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn lerp(self, other: Self, t: f64) -> Self {
        let channel = |a: u8, b: u8| {
            let a = f64::from(a);
            (a + (f64::from(b) - a) * t).round().clamp(0.0, 255.0) as u8
        };
        Self(
            channel(self.0, other.0),
            channel(self.1, other.1),
            channel(self.2, other.2),
        )
    }
}

impl std::fmt::Display for Rgb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Fill used for records whose value is missing.
pub const NULL_COLOR: Rgb = Rgb::from_hex(0x00bd_bdbd);

const PAIRED_6: [Rgb; 6] = [
    Rgb::from_hex(0x00a6_cee3),
    Rgb::from_hex(0x001f_78b4),
    Rgb::from_hex(0x00b2_df8a),
    Rgb::from_hex(0x0033_a02c),
    Rgb::from_hex(0x00fb_9a99),
    Rgb::from_hex(0x00e3_1a1c),
];

const ACCENT_6: [Rgb; 6] = [
    Rgb::from_hex(0x007f_c97f),
    Rgb::from_hex(0x00be_aed4),
    Rgb::from_hex(0x00fd_c086),
    Rgb::from_hex(0x00ff_ff99),
    Rgb::from_hex(0x0038_6cb0),
    Rgb::from_hex(0x00f0_027f),
];

/// Six-class `ColorBrewer` palettes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Palette {
    /// `Paired`, first six classes.
    Paired6,
    /// `Accent`, first six classes.
    Accent6,
}

impl Palette {
    /// The palette's stops from low to high.
    #[must_use]
    pub const fn colors(self) -> &'static [Rgb; 6] {
        match self {
            Self::Paired6 => &PAIRED_6,
            Self::Accent6 => &ACCENT_6,
        }
    }
}

/// Linear color scale from `[min, max]` onto a palette.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorScale {
    palette: Palette,
    min: f64,
    max: f64,
}

impl ColorScale {
    /// Creates a scale spanning `[min, max]`.
    #[must_use]
    pub const fn new(palette: Palette, min: f64, max: f64) -> Self {
        Self { palette, min, max }
    }

    /// Lower end of the domain.
    #[must_use]
    pub const fn min(&self) -> f64 {
        self.min
    }

    /// Upper end of the domain.
    #[must_use]
    pub const fn max(&self) -> f64 {
        self.max
    }

    /// Palette stops.
    #[must_use]
    pub const fn colors(&self) -> &'static [Rgb; 6] {
        self.palette.colors()
    }

    /// Color for `value`.
    ///
    /// Stops are evenly spaced over the domain and colors between them are
    /// interpolated in RGB. Values outside the domain clamp to the end
    /// stops; a zero-width domain maps everything to the first stop.
    /// Missing values get [`NULL_COLOR`].
    #[must_use]
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    pub fn color_for(&self, value: Option<f64>) -> Rgb {
        let colors = self.colors();
        let Some(value) = value.filter(|v| !v.is_nan()) else {
            return NULL_COLOR;
        };

        let width = self.max - self.min;
        if !(width.is_finite() && width > 0.0) {
            return colors[0];
        }

        let last = colors.len() - 1;
        let position = ((value - self.min) / width).clamp(0.0, 1.0) * last as f64;
        let lower = (position.floor() as usize).min(last);
        let upper = (lower + 1).min(last);

        colors[lower].lerp(colors[upper], position - lower as f64)
    }
}
