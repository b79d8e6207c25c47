//! First-order microphone polar patterns.
//!
//! Each pattern is a didactic first-order model `a + b*cos(theta)`; the dB
//! view sharpens with frequency to mimic how real capsules tighten up high.

use crate::math::db_from_linear;

/// dB floor used when the raw polar gain collapses to zero or negative.
const ATTENUATION_FLOOR_DB: f32 = -40.0;
/// Reference frequency for the high-frequency sharpening factor.
const SHARPENING_REFERENCE_HZ: f32 = 8000.0;
/// Ceiling on reported SNR improvement: the hardware limit of the model.
const SNR_IMPROVEMENT_CAP_DB: f32 = 12.0;
/// Guard against log of zero in the SNR path.
const MIN_SNR_GAIN: f32 = 1e-4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PolarPattern {
    /// Uniform pickup over 360 degrees.
    Omnidirectional,
    /// Front-favoring, deepest rejection at the rear.
    Cardioid,
    /// Tighter than cardioid, with a small rear lobe.
    Supercardioid,
    /// Interference-tube pattern, extremely narrow.
    Shotgun,
}

impl PolarPattern {
    pub const ALL: [PolarPattern; 4] = [
        PolarPattern::Omnidirectional,
        PolarPattern::Cardioid,
        PolarPattern::Supercardioid,
        PolarPattern::Shotgun,
    ];

    /// Raw first-order gain at `theta` radians off axis. May go negative
    /// behind the null for the tighter patterns; dB conversions floor it.
    pub fn gain(self, theta: f32) -> f32 {
        match self {
            PolarPattern::Omnidirectional => 1.0,
            PolarPattern::Cardioid => 0.5 + 0.5 * theta.cos(),
            PolarPattern::Supercardioid => 0.37 + 0.63 * theta.cos(),
            PolarPattern::Shotgun => 0.1 + 0.9 * theta.cos(),
        }
    }

    /// Off-axis attenuation in dB (0 on axis, floored at -40). Negative
    /// values scale by the frequency sharpening factor before flooring.
    pub fn attenuation_db(self, theta: f32, frequency_hz: f32) -> f32 {
        let gain = self.gain(theta);
        if gain <= 0.0 {
            return ATTENUATION_FLOOR_DB;
        }
        let mut db = db_from_linear(gain);
        if db < 0.0 {
            db *= sharpening_factor(frequency_hz);
        }
        db.max(ATTENUATION_FLOOR_DB)
    }

    /// Expected SNR improvement for a target at 0 degrees against noise from
    /// `noise_angle_deg`, capped at the 12 dB hardware limit. Zero for an
    /// omnidirectional capsule.
    pub fn snr_improvement_db(self, frequency_hz: f32, noise_angle_deg: f32) -> f32 {
        if matches!(self, PolarPattern::Omnidirectional) {
            return 0.0;
        }
        let theta = noise_angle_deg.to_radians();
        let gain = self.gain(theta).max(MIN_SNR_GAIN);
        let attenuation = db_from_linear(gain);
        if attenuation < 0.0 {
            let sharpened = attenuation * sharpening_factor(frequency_hz);
            (-sharpened).min(SNR_IMPROVEMENT_CAP_DB)
        } else {
            0.0
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PolarPattern::Omnidirectional => "omnidirectional",
            PolarPattern::Cardioid => "cardioid",
            PolarPattern::Supercardioid => "supercardioid",
            PolarPattern::Shotgun => "shotgun",
        }
    }
}

impl std::fmt::Display for PolarPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

fn sharpening_factor(frequency_hz: f32) -> f32 {
    1.0 + frequency_hz / SHARPENING_REFERENCE_HZ * 0.5
}

/// Samples the pattern's attenuation around the full circle, inclusive of
/// 360 degrees, as (angle in degrees, attenuation in dB) pairs.
pub fn polar_sweep(pattern: PolarPattern, frequency_hz: f32, step_deg: u32) -> Vec<(f32, f32)> {
    let step = step_deg.max(1);
    let mut points = Vec::with_capacity((360 / step + 1) as usize);
    let mut angle = 0u32;
    while angle <= 360 {
        let theta = (angle as f32).to_radians();
        points.push((angle as f32, pattern.attenuation_db(theta, frequency_hz)));
        angle += step;
    }
    points
}
