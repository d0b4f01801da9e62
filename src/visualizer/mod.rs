//! Spectrum bar geometry.
//!
//! The web renderer feeds analyser bytes through [`layout_bars`] every frame and
//! paints the result; keeping the geometry here lets it be tested off the web.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BarStyle {
    /// Multiplier applied to `surface_width / bins`.
    pub width_scale: f64,
    pub gap: f64,
    /// Pixels per unit of analyser magnitude.
    pub height_scale: f64,
}

impl BarStyle {
    #[cfg(any(target_arch = "wasm32", test))]
    pub fn from_config(config: &crate::config::PlayerConfig) -> Self {
        Self {
            width_scale: config.bar_width_scale,
            gap: config.bar_gap,
            height_scale: config.bar_height_scale,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bar {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Fill opacity in `0.0..=1.0`.
    pub alpha: f64,
}

impl Bar {
    pub fn fill_style(&self) -> String {
        format!("rgba(255,255,255,{:.3})", self.alpha)
    }
}

/// One bar per frequency bin, left to right, anchored to the bottom edge.
/// Bars running past the right edge are left for the canvas to clip.
pub fn layout_bars(samples: &[u8], width: f64, height: f64, style: BarStyle) -> Vec<Bar> {
    if samples.is_empty() || width <= 0.0 || height <= 0.0 {
        return Vec::new();
    }

    let bar_width = width / samples.len() as f64 * style.width_scale;
    let mut bars = Vec::with_capacity(samples.len());
    let mut x = 0.0;
    for &magnitude in samples {
        let bar_height = (f64::from(magnitude) * style.height_scale).min(height);
        bars.push(Bar {
            x,
            y: height - bar_height,
            width: bar_width,
            height: bar_height,
            alpha: (bar_height / 255.0).clamp(0.0, 1.0),
        });
        x += bar_width + style.gap;
    }
    bars
}
