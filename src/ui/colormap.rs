use ratatui::style::Color;

/// Anchor colours of the viridis scale, low to high.
const VIRIDIS: [(u8, u8, u8); 5] = [
    (68, 1, 84),
    (59, 82, 139),
    (33, 145, 140),
    (94, 201, 98),
    (253, 231, 37),
];

/// Colour at position `t` in [0, 1] of the viridis scale; out-of-range input
/// is clamped.
pub fn viridis(t: f64) -> Color {
    let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
    let scaled = t * (VIRIDIS.len() - 1) as f64;
    let idx = (scaled.floor() as usize).min(VIRIDIS.len() - 2);
    let frac = scaled - idx as f64;
    let (r0, g0, b0) = VIRIDIS[idx];
    let (r1, g1, b1) = VIRIDIS[idx + 1];
    let lerp = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * frac).round() as u8;
    Color::Rgb(lerp(r0, r1), lerp(g0, g1), lerp(b0, b1))
}

/// Continuous mapping from a value range onto the colour scale.
///
/// Terminal charts draw one style per series, so points are grouped into a
/// fixed number of colour bins.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorScale {
    pub min: f64,
    pub max: f64,
    pub bins: usize,
}

impl ColorScale {
    pub fn from_values(values: impl IntoIterator<Item = f64>, bins: usize) -> Self {
        let (min, max) = values
            .into_iter()
            .filter(|v| v.is_finite())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(v), hi.max(v))
            });
        if min > max {
            return Self {
                min: 0.0,
                max: 1.0,
                bins: bins.max(1),
            };
        }
        Self {
            min,
            max,
            bins: bins.max(1),
        }
    }

    pub fn normalize(&self, value: f64) -> f64 {
        if self.max > self.min {
            ((value - self.min) / (self.max - self.min)).clamp(0.0, 1.0)
        } else {
            0.5
        }
    }

    pub fn bin_of(&self, value: f64) -> usize {
        ((self.normalize(value) * self.bins as f64) as usize).min(self.bins - 1)
    }

    pub fn bin_color(&self, bin: usize) -> Color {
        viridis((bin as f64 + 0.5) / self.bins as f64)
    }

    pub fn color_of(&self, value: f64) -> Color {
        self.bin_color(self.bin_of(value))
    }
}
