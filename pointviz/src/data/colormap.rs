//! JET colormap
//!
//! Maps scalars to RGB in [0, 1]: dark blue → blue → cyan → yellow → red → dark red.

use glam::Vec3;

/// JET color for `t` in [0, 1] (clamped; non-finite maps to 0)
pub fn jet_color(t: f32) -> Vec3 {
    let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
    let channel = |k: f32| (1.5 - (4.0 * t - k).abs()).clamp(0.0, 1.0);
    Vec3::new(channel(3.0), channel(2.0), channel(1.0))
}

/// Min-max normalize `values` into [0, 1] and map each through JET
///
/// Non-finite values are ignored for the range and map to the low end.
/// A constant input maps to the middle of the colormap.
pub fn jet(values: &[f64]) -> Vec<Vec3> {
    let (min, max) = values.iter()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    let range = max - min;

    values.iter()
        .map(|&v| {
            let t = if !v.is_finite() {
                0.0
            } else if range > 0.0 {
                (v - min) / range
            } else {
                0.5
            };
            jet_color(t as f32)
        })
        .collect()
}

#[cfg(test)]
#[path = "colormap_tests.rs"]
mod tests;
