//! EchoLab: computational cores for interactive acoustics teaching demos.
//!
//! The centerpiece is a 2D reverberation ray simulation: pulses of sound
//! rays bounce around a rectangular room, losing energy at every wall
//! contact, while Sabine's formula reports the room's RT60. Companion
//! modules cover speaker time alignment, microphone polar patterns, and
//! equal-loudness / hearing-aid gain curves.
//!
//! Rendering and input wiring are host concerns. Hosts either drive
//! [`ReverbWorld::step`] from their own frame loop or hand the world to a
//! [`ReverbEngine`] thread and talk to it through a
//! [`ReverbController`].

pub mod config;
pub mod delay;
pub mod directivity;
pub mod engine;
pub mod error;
pub mod events;
pub mod loudness;
pub mod math;
pub mod ray;
pub mod room;
pub mod world;

pub use config::ReverbConfig;
pub use engine::ReverbEngine;
pub use error::EchoLabError;
pub use events::EchoLabEvent;
pub use ray::{RayId, SoundRay};
pub use room::{RoomModel, WallMaterial, compute_rt60};
pub use world::{ReverbController, ReverbWorld, SimCommand, StepOutcome};

#[cfg(test)]
mod tests {
    use crate::config::ReverbConfig;
    use crate::events::EchoLabEvent;
    use crate::room::{RoomModel, WallMaterial};
    use crate::world::{ReverbWorld, StepOutcome};
    use std::collections::HashMap;

    #[test]
    fn pulse_decays_to_silence_with_monotone_intensities() {
        let room = RoomModel::new(2.0, 2.0, WallMaterial::Medium).unwrap();
        let mut world = ReverbWorld::new(ReverbConfig::default(), room).unwrap();

        assert!(world.rt60().unwrap() > 0.0);

        world.emit_single_pulse();
        world.step(0.0); // synchronization tick

        let mut last_seen: HashMap<_, f32> = HashMap::new();
        let mut outcome = StepOutcome::Continue;
        for _ in 0..50_000 {
            outcome = world.step(1.0 / 60.0);
            for ray in world.rays() {
                if let Some(previous) = last_seen.get(&ray.id()) {
                    assert!(ray.intensity() <= *previous, "intensity rose on {}", ray.id());
                }
                last_seen.insert(ray.id(), ray.intensity());
            }
            if outcome == StepOutcome::Quiescent {
                break;
            }
        }

        assert_eq!(outcome, StepOutcome::Quiescent);
        assert!(world.rays().is_empty());
        assert_eq!(last_seen.len(), 20);

        let events = world.poll_events();
        assert!(events.iter().any(|e| e.pulse_id().is_some()));
        assert!(events.iter().any(|e| e.is_terminal()));
        assert_eq!(
            events
                .iter()
                .filter(|e| matches!(e, EchoLabEvent::RayDecayed { .. }))
                .count(),
            20
        );
    }
}
