//! Colour and display configuration for particle rendering.
//!
//! A designer supplies a [`Gradient`] (or picks a [`Palette`]). At renderer
//! initialization the gradient is sampled once into a [`ColorRamp`] that is
//! uploaded as a 1D lookup texture; the shader maps a per-particle scalar,
//! chosen by [`ColorMapping`], into that ramp.
//!
//! ```ignore
//! let display = DisplaySettings {
//!     gradient: Palette::Ocean.gradient(),
//!     color_mapping: ColorMapping::Speed { max: 4.0 },
//!     ..Default::default()
//! };
//! ```

use std::ops::Index;

use glam::{Vec3, Vec4};
use serde::{Deserialize, Serialize};

use crate::error::{FluidError, Result};

/// A colour stop on a gradient.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColorKey {
    /// RGB, 0.0-1.0.
    pub color: Vec3,
    /// Position on the gradient, 0.0-1.0.
    pub time: f32,
}

/// An alpha stop on a gradient.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AlphaKey {
    pub alpha: f32,
    pub time: f32,
}

/// Piecewise-linear colour gradient with independent colour and alpha stops.
///
/// Outside the first and last stop the gradient holds the end value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gradient {
    color_keys: Vec<ColorKey>,
    alpha_keys: Vec<AlphaKey>,
}

impl Default for Gradient {
    /// Warm broth: burnt orange through amber to pale yellow, fully opaque.
    fn default() -> Self {
        Self::new(
            vec![
                ColorKey { color: Vec3::new(0.8, 0.4, 0.2), time: 0.0 },
                ColorKey { color: Vec3::new(0.9, 0.6, 0.3), time: 0.5 },
                ColorKey { color: Vec3::new(1.0, 0.8, 0.4), time: 1.0 },
            ],
            vec![AlphaKey { alpha: 1.0, time: 0.0 }, AlphaKey { alpha: 1.0, time: 1.0 }],
        )
    }
}

impl Gradient {
    /// Build a gradient. Keys are sorted by time; empty key lists mean white / opaque.
    pub fn new(mut color_keys: Vec<ColorKey>, mut alpha_keys: Vec<AlphaKey>) -> Self {
        color_keys.sort_by(|a, b| a.time.total_cmp(&b.time));
        alpha_keys.sort_by(|a, b| a.time.total_cmp(&b.time));
        Self { color_keys, alpha_keys }
    }

    /// Evenly spaced opaque colour stops.
    pub fn from_colors(colors: &[Vec3]) -> Self {
        let last = colors.len().saturating_sub(1).max(1) as f32;
        let keys = colors
            .iter()
            .enumerate()
            .map(|(i, &color)| ColorKey { color, time: i as f32 / last })
            .collect();
        Self::new(keys, Vec::new())
    }

    pub fn color_keys(&self) -> &[ColorKey] {
        &self.color_keys
    }

    pub fn alpha_keys(&self) -> &[AlphaKey] {
        &self.alpha_keys
    }

    /// RGBA at position `t`.
    pub fn evaluate(&self, t: f32) -> Vec4 {
        let rgb = sample_keys(&self.color_keys, t, |k| (k.time, k.color)).unwrap_or(Vec3::ONE);
        let alpha = sample_keys(&self.alpha_keys, t, |k| (k.time, k.alpha)).unwrap_or(1.0);
        rgb.extend(alpha)
    }
}

/// Linear interpolation across sorted keys; `None` when there are no keys.
fn sample_keys<K, V>(keys: &[K], t: f32, get: impl Fn(&K) -> (f32, V)) -> Option<V>
where
    V: Copy + std::ops::Mul<f32, Output = V> + std::ops::Add<Output = V>,
{
    let (first, last) = (keys.first()?, keys.last()?);
    let (t0, v0) = get(first);
    if t <= t0 {
        return Some(v0);
    }
    let (tn, vn) = get(last);
    if t >= tn {
        return Some(vn);
    }
    for pair in keys.windows(2) {
        let (ta, va) = get(&pair[0]);
        let (tb, vb) = get(&pair[1]);
        if t <= tb {
            let span = tb - ta;
            let f = if span > 0.0 { (t - ta) / span } else { 1.0 };
            return Some(va * (1.0 - f) + vb * f);
        }
    }
    Some(vn)
}

/// Pre-defined palettes, each five evenly spaced stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Palette {
    /// The default warm broth gradient.
    #[default]
    Broth,
    /// Viridis - perceptually uniform, colorblind-friendly (purple to yellow).
    Viridis,
    /// Magma - black to yellow through red.
    Magma,
    /// Ocean - cool blues and teals.
    Ocean,
    /// Fire - black through red, orange, yellow, white.
    Fire,
    /// Ice - white through light blue to deep blue.
    Ice,
    /// Grayscale - black to white.
    Grayscale,
}

impl Palette {
    /// Gradient for this palette.
    pub fn gradient(&self) -> Gradient {
        let stops: [Vec3; 5] = match self {
            Palette::Broth => return Gradient::default(),
            Palette::Viridis => [
                Vec3::new(0.267, 0.004, 0.329),
                Vec3::new(0.282, 0.140, 0.458),
                Vec3::new(0.127, 0.566, 0.551),
                Vec3::new(0.369, 0.789, 0.383),
                Vec3::new(0.993, 0.906, 0.144),
            ],
            Palette::Magma => [
                Vec3::new(0.001, 0.0, 0.014),
                Vec3::new(0.329, 0.071, 0.435),
                Vec3::new(0.716, 0.215, 0.475),
                Vec3::new(0.994, 0.541, 0.380),
                Vec3::new(0.987, 0.991, 0.749),
            ],
            Palette::Ocean => [
                Vec3::new(0.0, 0.05, 0.15),
                Vec3::new(0.0, 0.2, 0.4),
                Vec3::new(0.0, 0.4, 0.6),
                Vec3::new(0.2, 0.6, 0.8),
                Vec3::new(0.6, 0.9, 1.0),
            ],
            Palette::Fire => [
                Vec3::new(0.1, 0.0, 0.0),
                Vec3::new(0.5, 0.0, 0.0),
                Vec3::new(1.0, 0.3, 0.0),
                Vec3::new(1.0, 0.7, 0.0),
                Vec3::new(1.0, 1.0, 0.8),
            ],
            Palette::Ice => [
                Vec3::new(1.0, 1.0, 1.0),
                Vec3::new(0.8, 0.9, 1.0),
                Vec3::new(0.4, 0.7, 1.0),
                Vec3::new(0.1, 0.4, 0.8),
                Vec3::new(0.0, 0.1, 0.4),
            ],
            Palette::Grayscale => [
                Vec3::ZERO,
                Vec3::splat(0.25),
                Vec3::splat(0.5),
                Vec3::splat(0.75),
                Vec3::ONE,
            ],
        };
        Gradient::from_colors(&stops)
    }
}

/// A gradient sampled at `R` evenly spaced points, `t = i / (R - 1)`.
///
/// Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct ColorRamp {
    entries: Vec<Vec4>,
}

impl ColorRamp {
    /// Sample `gradient` at `resolution` points.
    ///
    /// # Errors
    ///
    /// [`FluidError::Configuration`] when `resolution < 2`.
    pub fn build(gradient: &Gradient, resolution: u32) -> Result<Self> {
        if resolution < 2 {
            return Err(FluidError::config(format!(
                "gradient resolution must be at least 2, got {}",
                resolution
            )));
        }
        let last = (resolution - 1) as f32;
        let entries = (0..resolution).map(|i| gradient.evaluate(i as f32 / last)).collect();
        Ok(Self { entries })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[Vec4] {
        &self.entries
    }

    /// Nearest entry for `t`, clamped to `[0, 1]`.
    pub fn sample(&self, t: f32) -> Vec4 {
        let last = self.entries.len() - 1;
        let i = (t.clamp(0.0, 1.0) * last as f32).round() as usize;
        self.entries[i.min(last)]
    }

    /// Texel data for an `R x 1` RGBA8 texture.
    pub fn to_rgba8(&self) -> Vec<u8> {
        self.entries
            .iter()
            .flat_map(|c| {
                let c = (c.clamp(Vec4::ZERO, Vec4::ONE) * 255.0).round();
                [c.x as u8, c.y as u8, c.z as u8, c.w as u8]
            })
            .collect()
    }
}

impl Index<usize> for ColorRamp {
    type Output = Vec4;

    fn index(&self, index: usize) -> &Vec4 {
        &self.entries[index]
    }
}

/// Which particle attribute selects the ramp colour.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ColorMapping {
    /// `|velocity| / max`.
    Speed { max: f32 },
    /// World Y between `min` and `max`.
    Height { min: f32, max: f32 },
}

impl Default for ColorMapping {
    fn default() -> Self {
        ColorMapping::Speed { max: 15.0 }
    }
}

impl ColorMapping {
    /// Normalized ramp coordinate in `[0, 1]` for one particle.
    pub fn scalar(&self, position: Vec3, velocity: Vec3) -> f32 {
        let (value, min, max) = match *self {
            ColorMapping::Speed { max } => (velocity.length(), 0.0, max),
            ColorMapping::Height { min, max } => (position.y, min, max),
        };
        let range = max - min;
        if range > 0.0 {
            ((value - min) / range).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

/// Primitive drawn for each particle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DisplayMode {
    /// Camera-facing quad.
    #[default]
    Billboard,
    /// Low-poly sphere mesh.
    Mesh3D,
}

/// Renderer settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    pub mode: DisplayMode,
    /// Particle diameter in world units.
    pub particle_size: f32,
    pub gradient: Gradient,
    /// Number of ramp samples.
    pub gradient_resolution: u32,
    pub color_mapping: ColorMapping,
    /// Sphere subdivision for [`DisplayMode::Mesh3D`].
    pub mesh_resolution: u32,
    /// Background clear color (RGB, 0.0-1.0).
    pub background_color: Vec3,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            mode: DisplayMode::Billboard,
            particle_size: 0.04,
            gradient: Gradient::default(),
            gradient_resolution: 64,
            color_mapping: ColorMapping::default(),
            mesh_resolution: 4,
            background_color: Vec3::new(0.02, 0.02, 0.05),
        }
    }
}
