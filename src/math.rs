//! Math types and helpers for EchoLab

pub use glam::Vec2;

/// Unit direction vector for an angle in radians, measured from the +x axis.
pub fn direction_from_angle(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}

/// Converts a linear amplitude ratio to decibels.
pub fn db_from_linear(ratio: f32) -> f32 {
    20.0 * ratio.log10()
}

/// Linear interpolation of y at `x` on the segment (x0, y0)-(x1, y1).
/// A degenerate segment yields `y0`.
pub fn interpolate(x: f32, x0: f32, y0: f32, x1: f32, y1: f32) -> f32 {
    if x1 == x0 {
        return y0;
    }
    y0 + (y1 - y0) * ((x - x0) / (x1 - x0))
}

/// Normalizes an angle in degrees to [0, 360).
pub fn normalize_deg(angle: f32) -> f32 {
    let wrapped = angle % 360.0;
    if wrapped < 0.0 { wrapped + 360.0 } else { wrapped }
}

/// Folds the difference between two bearings into [0, 180].
pub fn off_axis_deg(bearing: f32, aim: f32) -> f32 {
    let off = (normalize_deg(bearing) - normalize_deg(aim)).abs();
    if off > 180.0 { 360.0 - off } else { off }
}
