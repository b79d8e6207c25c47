//! Configuration for the reverberation simulation

use crate::error::{EchoLabError, Result};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct ReverbConfig {
    /// Logical size of the square render surface, in canvas units.
    pub canvas_size: f32,
    /// Rays spawned per pulse.
    pub rays_per_pulse: usize,
    /// Didactic speed of sound in m/s, roughly 1/16 of the real value so
    /// wavefronts stay visible at the default time scale.
    pub speed_of_sound: f32,
    /// Simulated seconds between pulses in continuous mode.
    pub pulse_interval: f64,
    /// Intensity of a manually triggered pulse.
    pub single_pulse_intensity: f32,
    /// Intensity of each periodic pulse in continuous mode.
    pub continuous_pulse_intensity: f32,
    /// Rays whose intensity falls below this floor are retired.
    pub min_audible_intensity: f32,
    /// Initial wall-clock-to-simulated-time multiplier.
    pub time_scale: f64,
    /// Frame pacing used by the engine driver.
    pub frame_interval: Duration,
}

impl Default for ReverbConfig {
    fn default() -> Self {
        Self {
            canvas_size: 500.0,
            rays_per_pulse: 20,
            speed_of_sound: 21.4375,
            pulse_interval: 0.25,
            single_pulse_intensity: 1.0,
            continuous_pulse_intensity: 0.5,
            min_audible_intensity: 0.01,
            time_scale: 1.0,
            frame_interval: Duration::from_millis(16),
        }
    }
}

impl ReverbConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn canvas_size(mut self, size: f32) -> Self {
        self.canvas_size = size;
        self
    }

    pub fn rays_per_pulse(mut self, count: usize) -> Self {
        self.rays_per_pulse = count;
        self
    }

    pub fn speed_of_sound(mut self, speed: f32) -> Self {
        self.speed_of_sound = speed;
        self
    }

    pub fn pulse_interval(mut self, interval: f64) -> Self {
        self.pulse_interval = interval;
        self
    }

    pub fn time_scale(mut self, scale: f64) -> Self {
        self.time_scale = scale;
        self
    }

    pub fn frame_interval(mut self, interval: Duration) -> Self {
        self.frame_interval = interval;
        self
    }

    /// Checks the invariants the simulation relies on.
    pub fn validate(&self) -> Result<()> {
        if !(self.canvas_size > 0.0) {
            return Err(EchoLabError::Configuration(format!(
                "canvas size must be positive, got {}",
                self.canvas_size
            )));
        }
        if self.rays_per_pulse == 0 {
            return Err(EchoLabError::Configuration(
                "a pulse must spawn at least one ray".into(),
            ));
        }
        if !(self.speed_of_sound > 0.0) {
            return Err(EchoLabError::Configuration(format!(
                "speed of sound must be positive, got {}",
                self.speed_of_sound
            )));
        }
        if !(self.pulse_interval > 0.0) {
            return Err(EchoLabError::Configuration(format!(
                "pulse interval must be positive, got {}",
                self.pulse_interval
            )));
        }
        for (name, intensity) in [
            ("single pulse intensity", self.single_pulse_intensity),
            ("continuous pulse intensity", self.continuous_pulse_intensity),
        ] {
            if !(intensity > 0.0 && intensity <= 1.0) {
                return Err(EchoLabError::Configuration(format!(
                    "{} must be in (0, 1], got {}",
                    name, intensity
                )));
            }
        }
        if !(self.min_audible_intensity > 0.0 && self.min_audible_intensity < 1.0) {
            return Err(EchoLabError::Configuration(format!(
                "audibility floor must be in (0, 1), got {}",
                self.min_audible_intensity
            )));
        }
        if !(self.time_scale > 0.0) {
            return Err(EchoLabError::Configuration(format!(
                "time scale must be positive, got {}",
                self.time_scale
            )));
        }
        Ok(())
    }
}
