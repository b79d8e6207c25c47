//! Room geometry, wall materials and Sabine reverberation time.

use crate::error::{EchoLabError, Result};

/// Assumed ceiling height used for volume computation, in meters.
pub const ROOM_HEIGHT: f32 = 3.0;

/// Metric Sabine constant, seconds per meter.
const SABINE_CONSTANT: f32 = 0.161;

/// Wall finish of the simulated room. The coefficients are a didactic
/// simplification: one broadband absorption value per material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WallMaterial {
    /// Concrete, glass, tile. Very low absorption, long reverb tails.
    Hard,
    /// Wood, some carpet.
    Medium,
    /// Heavy carpet, curtains, upholstered furniture.
    Soft,
}

impl WallMaterial {
    pub const ALL: [WallMaterial; 3] =
        [WallMaterial::Hard, WallMaterial::Medium, WallMaterial::Soft];

    /// Fraction of sound energy a wall absorbs per reflection.
    pub fn absorption(self) -> f32 {
        match self {
            WallMaterial::Hard => 0.02,
            WallMaterial::Medium => 0.3,
            WallMaterial::Soft => 0.6,
        }
    }
}

impl std::fmt::Display for WallMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            WallMaterial::Hard => "hard",
            WallMaterial::Medium => "medium",
            WallMaterial::Soft => "soft",
        };
        write!(f, "{}", name)
    }
}

impl std::str::FromStr for WallMaterial {
    type Err = EchoLabError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "hard" => Ok(WallMaterial::Hard),
            "medium" => Ok(WallMaterial::Medium),
            "soft" => Ok(WallMaterial::Soft),
            other => Err(EchoLabError::Configuration(format!(
                "unknown wall material '{}'",
                other
            ))),
        }
    }
}

/// Immutable room description the simulation reads each tick.
///
/// Constructed fresh whenever the user changes dimensions or material;
/// construction validates the invariants the hot path depends on
/// (`length > 0` keeps the canvas scale factor finite).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoomModel {
    length: f32,
    width: f32,
    material: WallMaterial,
}

impl RoomModel {
    pub fn new(length: f32, width: f32, material: WallMaterial) -> Result<Self> {
        if !(length > 0.0) || !(width > 0.0) {
            return Err(EchoLabError::InvalidRoom(format!(
                "room dimensions must be positive, got {}m x {}m",
                length, width
            )));
        }
        Ok(Self {
            length,
            width,
            material,
        })
    }

    pub fn length(&self) -> f32 {
        self.length
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn material(&self) -> WallMaterial {
        self.material
    }

    pub fn volume(&self) -> f32 {
        self.length * self.width * ROOM_HEIGHT
    }

    /// Walls, ceiling and floor.
    pub fn surface_area(&self) -> f32 {
        2.0 * (self.length * self.width
            + self.length * ROOM_HEIGHT
            + self.width * ROOM_HEIGHT)
    }

    pub fn total_absorption(&self) -> f32 {
        self.surface_area() * self.material.absorption()
    }

    /// Reverberation time of this room via Sabine's formula.
    pub fn rt60(&self) -> Result<f32> {
        compute_rt60(self.length, self.width, self.material)
    }
}

/// Sabine's formula: `RT60 = 0.161 * V / A`, with `A = S * absorption`.
///
/// Pure in its inputs and cheap enough to recompute on every change.
/// Errors when the volume or total absorption is non-positive; callers
/// surface that as a display-only invalid state.
pub fn compute_rt60(length: f32, width: f32, material: WallMaterial) -> Result<f32> {
    let volume = length * width * ROOM_HEIGHT;
    let surface_area =
        2.0 * (length * width + length * ROOM_HEIGHT + width * ROOM_HEIGHT);
    let total_absorption = surface_area * material.absorption();
    if volume <= 0.0 || total_absorption <= 0.0 {
        return Err(EchoLabError::InvalidRoom(format!(
            "degenerate room: volume {} m^3, absorption {} m^2",
            volume, total_absorption
        )));
    }
    Ok(SABINE_CONSTANT * volume / total_absorption)
}
