//! Event types for EchoLab

use crate::math::Vec2;
use crate::ray::RayId;
use uuid::Uuid;

/// Notifications emitted by the reverberation world, drained per tick via
/// [`crate::world::ReverbWorld::poll_events`] or forwarded by the engine's
/// event channel.
#[derive(Debug, Clone, PartialEq)]
pub enum EchoLabEvent {
    PulseEmitted {
        pulse_id: Uuid,
        ray_count: usize,
        intensity: f32,
        continuous: bool,
    },
    RayDecayed {
        ray_id: RayId,
        bounces: u32,
    },
    SourceMoved {
        position: Vec2,
    },
    ListenerMoved {
        position: Vec2,
    },
    TimeScaleChanged {
        time_scale: f64,
    },
    ContinuousModeChanged {
        enabled: bool,
    },
    Quiesced {
        simulation_time: f64,
    },
}

impl EchoLabEvent {
    /// Id of the pulse this event announces, if any.
    pub fn pulse_id(&self) -> Option<Uuid> {
        match self {
            Self::PulseEmitted { pulse_id, .. } => Some(*pulse_id),
            _ => None,
        }
    }

    /// True for events caused directly by host input rather than by the
    /// simulation itself.
    pub fn is_control_event(&self) -> bool {
        matches!(
            self,
            Self::SourceMoved { .. }
                | Self::ListenerMoved { .. }
                | Self::TimeScaleChanged { .. }
                | Self::ContinuousModeChanged { .. }
        )
    }

    /// True once the simulation has run out of audible rays.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Quiesced { .. })
    }
}
