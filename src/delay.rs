//! Speaker time-alignment analysis.
//!
//! Models the classic main/delay speaker setup: how long each speaker's
//! sound takes to reach a listening position, the delay the far speaker
//! needs so both arrivals line up, and the level difference the listener
//! perceives once distance and aim are taken into account.

use crate::math::{Vec2, db_from_linear, normalize_deg, off_axis_deg};

/// Real-world speed of sound at room temperature, m/s.
pub const DEFAULT_SPEED_OF_SOUND: f32 = 343.0;

/// Front-to-back ratio of the simplified cardioid coverage model:
/// `F = 0.5 + 0.5 * cos(theta_off)`.
const CARDIOID_COEFFICIENT: f32 = 0.5;
/// Gains at or below this are reported at the floor.
const CARDIOID_GAIN_FLOOR: f32 = 0.001;
const ATTENUATION_FLOOR_DB: f32 = -60.0;
/// Distances below this are treated as coincident with the listener.
const MIN_DISTANCE: f32 = 1e-3;

/// A speaker position (meters) with the direction it is aimed, in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Speaker {
    pub position: Vec2,
    pub aim_angle_deg: f32,
}

impl Speaker {
    pub fn new(position: Vec2, aim_angle_deg: f32) -> Self {
        Self {
            position,
            aim_angle_deg,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlignmentMode {
    /// The delay speaker is held back so both arrivals coincide.
    Compensated,
    /// No delay applied; the arrival error is reported as-is.
    Uncompensated,
}

/// A two-speaker scene with one listening position.
#[derive(Debug, Clone)]
pub struct DelayScene {
    pub main: Speaker,
    pub delay: Speaker,
    pub listener: Vec2,
    pub speed_of_sound: f32,
    pub mode: AlignmentMode,
}

impl Default for DelayScene {
    fn default() -> Self {
        // 100m-wide venue, everything on the center line
        Self {
            main: Speaker::new(Vec2::new(10.0, 33.3), 0.0),
            delay: Speaker::new(Vec2::new(60.0, 33.3), 0.0),
            listener: Vec2::new(80.0, 33.3),
            speed_of_sound: DEFAULT_SPEED_OF_SOUND,
            mode: AlignmentMode::Compensated,
        }
    }
}

/// Analysis results. Times in milliseconds, levels in dB.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DelayAnalysis {
    /// Direct arrival time from the main speaker.
    pub arrival_main_ms: f32,
    /// Direct arrival time from the delay speaker, before compensation.
    pub arrival_delay_ms: f32,
    /// Compensated: the delay to add to the far speaker (>= 0).
    /// Uncompensated: the signed arrival error `t_delay - t_main`.
    pub compensation_ms: f32,
    /// Main minus delay speaker level at the listener.
    pub spl_difference_db: f32,
}

/// Geometric bearing from `from` to `to`, degrees in [0, 360).
pub fn bearing_deg(from: Vec2, to: Vec2) -> f32 {
    let d = to - from;
    normalize_deg(d.y.atan2(d.x).to_degrees())
}

/// Off-axis attenuation of a cardioid-aimed speaker heard from `listener`,
/// in dB (0 on axis, floored at -60).
pub fn directivity_attenuation_db(speaker: &Speaker, listener: Vec2) -> f32 {
    let bearing = bearing_deg(speaker.position, listener);
    let off_axis = off_axis_deg(bearing, speaker.aim_angle_deg).to_radians();
    let gain = CARDIOID_COEFFICIENT + (1.0 - CARDIOID_COEFFICIENT) * off_axis.cos();
    if gain <= CARDIOID_GAIN_FLOOR {
        return ATTENUATION_FLOOR_DB;
    }
    db_from_linear(gain)
}

impl DelayScene {
    /// Travel time over `distance` meters, in milliseconds.
    pub fn travel_time_ms(&self, distance: f32) -> f32 {
        distance / self.speed_of_sound * 1000.0
    }

    /// Computes arrival times, the compensation delay, and the SPL
    /// difference (inverse-distance attenuation plus directivity).
    pub fn analyze(&self) -> DelayAnalysis {
        let d_main = (self.main.position - self.listener).length().max(MIN_DISTANCE);
        let d_delay = (self.delay.position - self.listener)
            .length()
            .max(MIN_DISTANCE);

        let arrival_main_ms = self.travel_time_ms(d_main);
        let arrival_delay_ms = self.travel_time_ms(d_delay);

        let compensation_ms = match self.mode {
            AlignmentMode::Compensated => (arrival_main_ms - arrival_delay_ms).max(0.0),
            AlignmentMode::Uncompensated => arrival_delay_ms - arrival_main_ms,
        };

        let level_main =
            -db_from_linear(d_main) + directivity_attenuation_db(&self.main, self.listener);
        let level_delay =
            -db_from_linear(d_delay) + directivity_attenuation_db(&self.delay, self.listener);

        DelayAnalysis {
            arrival_main_ms,
            arrival_delay_ms,
            compensation_ms,
            spl_difference_db: level_main - level_delay,
        }
    }
}
