//! Sound rays: the emitted energy particles of the reverberation model.

use crate::config::ReverbConfig;
use crate::math::{Vec2, direction_from_angle};
use crate::room::RoomModel;

/// Lightweight, type-safe handle for a ray within its owning simulation.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct RayId(pub(crate) u64);

impl std::fmt::Display for RayId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RayId({})", self.0)
    }
}

/// Outcome of advancing a ray by one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RayAdvance {
    /// Free travel, no wall contact.
    Moved,
    /// Hit a wall (or a corner); `decayed` is set when the reflection
    /// dropped the ray below the audibility floor.
    Bounced { decayed: bool },
}

/// A single emitted sound-energy particle.
///
/// Rays travel in canvas space, reflect specularly off the four axis-aligned
/// walls, and lose a material-dependent fraction of their intensity at every
/// contact. A ray that falls below the audibility floor goes inactive
/// permanently; the owning world prunes it on the next tick.
#[derive(Debug, Clone)]
pub struct SoundRay {
    pub(crate) id: RayId,
    pub(crate) position: Vec2,
    pub(crate) direction: Vec2,
    pub(crate) initial_intensity: f32,
    pub(crate) intensity: f32,
    pub(crate) path: Vec<Vec2>,
    pub(crate) bounces: u32,
    pub(crate) active: bool,
}

impl SoundRay {
    /// Creates a ray at `origin` heading along `angle` (radians).
    pub(crate) fn spawn(id: RayId, origin: Vec2, angle: f32, intensity: f32) -> Self {
        Self {
            id,
            position: origin,
            direction: direction_from_angle(angle),
            initial_intensity: intensity,
            intensity,
            // origin plus the segment head that advance() keeps updating
            path: vec![origin, origin],
            bounces: 0,
            active: true,
        }
    }

    pub fn id(&self) -> RayId {
        self.id
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn direction(&self) -> Vec2 {
        self.direction
    }

    pub fn intensity(&self) -> f32 {
        self.intensity
    }

    pub fn initial_intensity(&self) -> f32 {
        self.initial_intensity
    }

    /// Trail vertices for rendering: one vertex per straight segment, the
    /// last one tracking the current position.
    pub fn path(&self) -> &[Vec2] {
        &self.path
    }

    pub fn bounce_count(&self) -> u32 {
        self.bounces
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Advances the ray by `dt` simulated seconds.
    ///
    /// The room's length calibrates the canvas scale (square canvas, square
    /// room aspect assumed); [`RoomModel`] construction guarantees
    /// `room.length() > 0`, keeping the displacement finite. A non-positive
    /// delta advances nothing and cannot collide, which keeps zero-delta
    /// ticks idempotent even for rays parked on a wall.
    pub fn advance(&mut self, dt: f32, room: &RoomModel, tuning: &ReverbConfig) -> RayAdvance {
        if !self.active || dt <= 0.0 {
            return RayAdvance::Moved;
        }

        let scale = tuning.canvas_size / room.length();
        let distance = tuning.speed_of_sound * dt * scale;
        let candidate = self.position + self.direction * distance;

        let crossed_x = candidate.x <= 0.0 || candidate.x >= tuning.canvas_size;
        let crossed_y = candidate.y <= 0.0 || candidate.y >= tuning.canvas_size;

        if !crossed_x && !crossed_y {
            self.position = candidate;
            self.touch_head();
            return RayAdvance::Moved;
        }

        // Clamp to the crossed wall(s) and reflect the matching direction
        // component. Crossing both in one step counts as a corner hit:
        // both components invert, but it is still a single bounce with a
        // single decay.
        let mut hit = candidate;
        if crossed_x {
            hit.x = if candidate.x <= 0.0 { 0.0 } else { tuning.canvas_size };
            self.direction.x = -self.direction.x;
        }
        if crossed_y {
            hit.y = if candidate.y <= 0.0 { 0.0 } else { tuning.canvas_size };
            self.direction.y = -self.direction.y;
        }

        self.position = hit;
        self.touch_head();
        // the impact point starts the next trail segment
        self.path.push(hit);

        self.intensity *= 1.0 - room.material().absorption();
        self.bounces += 1;

        let decayed = self.intensity < tuning.min_audible_intensity;
        if decayed {
            self.active = false;
        }
        RayAdvance::Bounced { decayed }
    }

    fn touch_head(&mut self) {
        if let Some(head) = self.path.last_mut() {
            *head = self.position;
        }
    }
}
