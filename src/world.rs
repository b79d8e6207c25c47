//! Reverberation world: the ray simulation and its command surface.

use crate::config::ReverbConfig;
use crate::error::{EchoLabError, Result};
use crate::events::EchoLabEvent;
use crate::math::Vec2;
use crate::ray::{RayAdvance, RayId, SoundRay};
use crate::room::RoomModel;
use crossbeam_channel::{Receiver, Sender, unbounded};
use std::f32::consts::TAU;
use uuid::Uuid;

/// Signal returned by [`ReverbWorld::step`] telling the frame driver whether
/// further ticks are useful.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Rays are still audible, or continuous mode keeps emitting.
    Continue,
    /// Single-shot mode and every ray has decayed; the driver may stop
    /// ticking until the next command arrives.
    Quiescent,
}

/// Host inputs. Commands queue on a channel and are applied at the start of
/// the next tick, never mid-tick.
#[derive(Debug, Clone, PartialEq)]
pub enum SimCommand {
    EmitSinglePulse,
    ToggleContinuousMode,
    SetSourcePosition(Vec2),
    SetListenerPosition(Vec2),
    SetTimeScale(f64),
}

/// Cloneable handle for sending [`SimCommand`]s to a world owned by another
/// thread, typically a [`crate::engine::ReverbEngine`].
#[derive(Debug, Clone)]
pub struct ReverbController {
    sender: Sender<SimCommand>,
}

impl ReverbController {
    pub fn emit_single_pulse(&self) -> Result<()> {
        self.send(SimCommand::EmitSinglePulse)
    }

    pub fn toggle_continuous_mode(&self) -> Result<()> {
        self.send(SimCommand::ToggleContinuousMode)
    }

    pub fn set_source_position(&self, position: Vec2) -> Result<()> {
        self.send(SimCommand::SetSourcePosition(position))
    }

    pub fn set_listener_position(&self, position: Vec2) -> Result<()> {
        self.send(SimCommand::SetListenerPosition(position))
    }

    pub fn set_time_scale(&self, time_scale: f64) -> Result<()> {
        self.send(SimCommand::SetTimeScale(time_scale))
    }

    fn send(&self, command: SimCommand) -> Result<()> {
        self.sender
            .send(command)
            .map_err(|e| EchoLabError::Engine(format!("Failed to send command: {}", e)))
    }
}

/// The reverberation simulation.
///
/// `ReverbWorld` owns the active rays, the simulation clock, and the source
/// and listener positions. It is single-threaded and cooperative: a frame
/// driver calls [`step`](Self::step) once per frame with the elapsed
/// wall-clock delta, and everything else happens through discrete setter
/// calls or queued [`SimCommand`]s.
///
/// # Architecture
///
/// - **Host thread**: constructs the world, changes the room, reads ray
///   state for rendering.
/// - **Driver thread** (optional): a [`crate::engine::ReverbEngine`] owns the
///   world and ticks it; the host keeps a [`ReverbController`] whose
///   commands are drained at the start of the next tick.
pub struct ReverbWorld {
    config: ReverbConfig,
    room: RoomModel,
    rays: Vec<SoundRay>,
    next_ray_id: u64,
    simulation_time: f64,
    time_scale: f64,
    continuous: bool,
    source: Vec2,
    listener: Vec2,
    synchronized: bool,
    quiesced: bool,
    events: Vec<EchoLabEvent>,
    command_sender: Sender<SimCommand>,
    command_receiver: Receiver<SimCommand>,
}

impl ReverbWorld {
    pub fn new(config: ReverbConfig, room: RoomModel) -> Result<Self> {
        config.validate()?;
        let (command_sender, command_receiver) = unbounded();
        let time_scale = config.time_scale;
        let source = Vec2::new(config.canvas_size * 0.2, config.canvas_size * 0.5);
        let listener = Vec2::new(config.canvas_size * 0.8, config.canvas_size * 0.5);
        Ok(Self {
            config,
            room,
            rays: Vec::new(),
            next_ray_id: 0,
            simulation_time: 0.0,
            time_scale,
            continuous: false,
            source,
            listener,
            synchronized: false,
            quiesced: true,
            events: Vec::new(),
            command_sender,
            command_receiver,
        })
    }

    pub fn config(&self) -> &ReverbConfig {
        &self.config
    }

    pub fn room(&self) -> &RoomModel {
        &self.room
    }

    /// Swaps in a new room description. Takes effect from the next tick;
    /// rays in flight keep their positions.
    pub fn set_room(&mut self, room: RoomModel) {
        self.room = room;
    }

    /// Reverberation time of the current room, recomputed on demand.
    pub fn rt60(&self) -> Result<f32> {
        self.room.rt60()
    }

    /// A cloneable command handle for driving this world from another thread.
    pub fn controller(&self) -> ReverbController {
        ReverbController {
            sender: self.command_sender.clone(),
        }
    }

    /// All rays currently stored, including any that decayed this tick and
    /// await pruning. Renderers usually want [`active_rays`](Self::active_rays).
    pub fn rays(&self) -> &[SoundRay] {
        &self.rays
    }

    pub fn active_rays(&self) -> impl Iterator<Item = &SoundRay> {
        self.rays.iter().filter(|ray| ray.is_active())
    }

    pub fn simulation_time(&self) -> f64 {
        self.simulation_time
    }

    pub fn time_scale(&self) -> f64 {
        self.time_scale
    }

    pub fn is_continuous(&self) -> bool {
        self.continuous
    }

    pub fn source_position(&self) -> Vec2 {
        self.source
    }

    pub fn listener_position(&self) -> Vec2 {
        self.listener
    }

    /// True when stepping would do no work: single-shot mode with every ray
    /// gone. Drivers use this to pause their frame loop.
    pub fn is_idle(&self) -> bool {
        self.quiesced && !self.continuous && self.rays.is_empty()
    }

    /// Emits one pulse of evenly spaced rays from the source position.
    ///
    /// Accumulative: existing rays keep flying. Returns the pulse handle.
    ///
    /// # Errors
    ///
    /// Returns an error if `intensity` is outside (0, 1].
    pub fn emit_pulse(&mut self, intensity: f32) -> Result<Uuid> {
        if !(intensity > 0.0 && intensity <= 1.0) {
            return Err(EchoLabError::Configuration(format!(
                "pulse intensity must be in (0, 1], got {}",
                intensity
            )));
        }
        Ok(self.spawn_pulse(intensity))
    }

    /// Fires a fresh single-shot pulse: leaves continuous mode, clears every
    /// previous ray, resets the simulation clock.
    pub fn emit_single_pulse(&mut self) {
        if self.continuous {
            self.continuous = false;
            self.events
                .push(EchoLabEvent::ContinuousModeChanged { enabled: false });
        }
        self.simulation_time = 0.0;
        self.rays.clear();
        self.spawn_pulse(self.config.single_pulse_intensity);
        self.synchronized = false;
    }

    /// Toggles continuous emission. Turning it on resets the clock and fires
    /// an initial full-strength pulse without clearing rays already in
    /// flight; turning it off only stops future pulses.
    pub fn toggle_continuous_mode(&mut self) {
        self.continuous = !self.continuous;
        self.events.push(EchoLabEvent::ContinuousModeChanged {
            enabled: self.continuous,
        });
        if self.continuous {
            self.simulation_time = 0.0;
            self.spawn_pulse(self.config.single_pulse_intensity);
            self.synchronized = false;
        }
    }

    /// Moves the sound source. While a single-shot pulse is in flight the
    /// emission restarts from the new position.
    pub fn set_source_position(&mut self, position: Vec2) {
        self.source = position;
        self.events.push(EchoLabEvent::SourceMoved { position });
        if !self.continuous && !self.rays.is_empty() {
            self.simulation_time = 0.0;
            self.rays.clear();
            self.spawn_pulse(self.config.single_pulse_intensity);
            self.synchronized = false;
        }
    }

    pub fn set_listener_position(&mut self, position: Vec2) {
        self.listener = position;
        self.events.push(EchoLabEvent::ListenerMoved { position });
    }

    /// Sets the wall-clock-to-simulated-time multiplier.
    ///
    /// # Errors
    ///
    /// Returns an error if `time_scale` is not positive.
    pub fn set_time_scale(&mut self, time_scale: f64) -> Result<()> {
        if !(time_scale > 0.0) {
            return Err(EchoLabError::Configuration(format!(
                "time scale must be positive, got {}",
                time_scale
            )));
        }
        self.time_scale = time_scale;
        self.events
            .push(EchoLabEvent::TimeScaleChanged { time_scale });
        Ok(())
    }

    /// Applies every queued command. Called automatically at the start of
    /// [`step`](Self::step); drivers may also call it while the world idles.
    pub fn pump_commands(&mut self) {
        while let Ok(command) = self.command_receiver.try_recv() {
            self.apply(command);
        }
    }

    fn apply(&mut self, command: SimCommand) {
        match command {
            SimCommand::EmitSinglePulse => self.emit_single_pulse(),
            SimCommand::ToggleContinuousMode => self.toggle_continuous_mode(),
            SimCommand::SetSourcePosition(position) => self.set_source_position(position),
            SimCommand::SetListenerPosition(position) => self.set_listener_position(position),
            SimCommand::SetTimeScale(time_scale) => {
                if let Err(e) = self.set_time_scale(time_scale) {
                    log::warn!("Ignoring time scale command: {}", e);
                }
            }
        }
    }

    /// Advances the simulation by `dt` wall-clock seconds.
    ///
    /// The first call after construction or after a re-emission is a
    /// synchronization tick: it establishes the time baseline and returns
    /// without moving anything. Each later tick scales the delta by the
    /// time-scale multiplier, prunes rays that went inactive last tick,
    /// advances the rest, and in continuous mode emits the periodic pulse
    /// whenever the simulated clock crosses a pulse-interval boundary
    /// inside this tick's delta window.
    pub fn step(&mut self, dt: f64) -> StepOutcome {
        self.pump_commands();

        if !self.synchronized {
            self.synchronized = true;
            return StepOutcome::Continue;
        }

        let simulated_delta = dt.max(0.0) * self.time_scale;
        self.simulation_time += simulated_delta;

        self.rays.retain(|ray| ray.is_active());

        let mut any_active = false;
        for ray in &mut self.rays {
            let advance = ray.advance(simulated_delta as f32, &self.room, &self.config);
            if let RayAdvance::Bounced { decayed: true } = advance {
                self.events.push(EchoLabEvent::RayDecayed {
                    ray_id: ray.id(),
                    bounces: ray.bounce_count(),
                });
            }
            if ray.is_active() {
                any_active = true;
            }
        }

        if self.continuous && self.simulation_time % self.config.pulse_interval < simulated_delta {
            self.spawn_pulse(self.config.continuous_pulse_intensity);
            any_active = true;
        }

        if !self.continuous && self.rays.is_empty() && !any_active {
            if !self.quiesced {
                self.quiesced = true;
                self.synchronized = false;
                self.events.push(EchoLabEvent::Quiesced {
                    simulation_time: self.simulation_time,
                });
                log::debug!(
                    "reverb world quiesced at t={:.2}s after {} rays",
                    self.simulation_time,
                    self.next_ray_id
                );
            }
            return StepOutcome::Quiescent;
        }

        StepOutcome::Continue
    }

    /// Drains the events accumulated since the last call.
    pub fn poll_events(&mut self) -> Vec<EchoLabEvent> {
        std::mem::take(&mut self.events)
    }

    fn spawn_pulse(&mut self, intensity: f32) -> Uuid {
        let count = self.config.rays_per_pulse;
        for i in 0..count {
            let angle = TAU * i as f32 / count as f32;
            let id = RayId(self.next_ray_id);
            self.next_ray_id += 1;
            self.rays
                .push(SoundRay::spawn(id, self.source, angle, intensity));
        }
        self.quiesced = false;
        let pulse_id = Uuid::new_v4();
        self.events.push(EchoLabEvent::PulseEmitted {
            pulse_id,
            ray_count: count,
            intensity,
            continuous: self.continuous,
        });
        log::debug!(
            "pulse {} emitted: {} rays at intensity {}",
            pulse_id,
            count,
            intensity
        );
        pulse_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::room::WallMaterial;

    fn world_with(material: WallMaterial, length: f32, width: f32) -> ReverbWorld {
        let room = RoomModel::new(length, width, material).unwrap();
        ReverbWorld::new(ReverbConfig::default(), room).unwrap()
    }

    #[test]
    fn pulse_spawns_evenly_spaced_rays() {
        let mut world = world_with(WallMaterial::Hard, 5.0, 4.0);
        world.emit_pulse(0.8).unwrap();

        let rays = world.rays();
        assert_eq!(rays.len(), 20);
        let spacing = TAU / 20.0;
        for (i, ray) in rays.iter().enumerate() {
            let angle = spacing * i as f32;
            let expected = Vec2::new(angle.cos(), angle.sin());
            assert!((ray.direction() - expected).length() < 1e-5);
            assert_eq!(ray.intensity(), 0.8);
            assert_eq!(ray.bounce_count(), 0);
            assert_eq!(ray.position(), world.source_position());
        }
    }

    #[test]
    fn emit_pulse_rejects_out_of_range_intensity() {
        let mut world = world_with(WallMaterial::Hard, 5.0, 4.0);
        assert!(world.emit_pulse(0.0).is_err());
        assert!(world.emit_pulse(1.5).is_err());
        assert!(world.emit_pulse(1.0).is_ok());
    }

    #[test]
    fn pulses_accumulate_without_clearing() {
        let mut world = world_with(WallMaterial::Hard, 5.0, 4.0);
        world.emit_pulse(1.0).unwrap();
        world.emit_pulse(0.5).unwrap();
        assert_eq!(world.rays().len(), 40);
    }

    #[test]
    fn first_step_is_a_synchronization_tick() {
        let mut world = world_with(WallMaterial::Hard, 5.0, 4.0);
        world.emit_single_pulse();
        let before: Vec<Vec2> = world.rays().iter().map(|r| r.position()).collect();

        assert_eq!(world.step(0.5), StepOutcome::Continue);
        assert_eq!(world.simulation_time(), 0.0);
        let after: Vec<Vec2> = world.rays().iter().map(|r| r.position()).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn zero_delta_step_is_idempotent() {
        let mut world = world_with(WallMaterial::Hard, 5.0, 4.0);
        world.emit_single_pulse();
        world.step(0.016); // synchronize
        world.step(0.016);

        let time = world.simulation_time();
        let snapshot: Vec<(Vec2, f32)> = world
            .rays()
            .iter()
            .map(|r| (r.position(), r.intensity()))
            .collect();

        assert_eq!(world.step(0.0), StepOutcome::Continue);
        assert_eq!(world.simulation_time(), time);
        let replay: Vec<(Vec2, f32)> = world
            .rays()
            .iter()
            .map(|r| (r.position(), r.intensity()))
            .collect();
        assert_eq!(snapshot, replay);
    }

    #[test]
    fn continuous_mode_pulses_on_interval_boundaries() {
        let mut world = world_with(WallMaterial::Hard, 5.0, 4.0);
        world.toggle_continuous_mode();
        assert!(world.is_continuous());
        assert_eq!(world.rays().len(), 20);

        world.step(0.1); // synchronization tick
        // 0.3 % 0.25 = 0.05 < 0.3: boundary crossed inside this window
        world.step(0.3);
        assert_eq!(world.rays().len(), 40);

        let periodic = &world.rays()[20..];
        assert!(periodic.iter().all(|r| r.intensity() == 0.5));
    }

    #[test]
    fn single_shot_run_reaches_quiescence() {
        let mut world = world_with(WallMaterial::Soft, 1.0, 1.0);
        world.emit_single_pulse();
        world.step(0.0);

        let mut outcome = StepOutcome::Continue;
        for _ in 0..10_000 {
            outcome = world.step(0.05);
            if outcome == StepOutcome::Quiescent {
                break;
            }
        }
        assert_eq!(outcome, StepOutcome::Quiescent);
        assert!(world.rays().is_empty());
        assert!(world.is_idle());

        let events = world.poll_events();
        assert!(events.iter().any(|e| e.is_terminal()));
        assert!(
            events
                .iter()
                .filter(|e| matches!(e, EchoLabEvent::RayDecayed { .. }))
                .count()
                >= 20
        );
    }

    #[test]
    fn moving_the_source_restarts_a_single_shot_run() {
        let mut world = world_with(WallMaterial::Hard, 5.0, 4.0);
        world.emit_single_pulse();
        world.step(0.0);
        world.step(0.1);
        assert!(world.simulation_time() > 0.0);

        let target = Vec2::new(100.0, 100.0);
        world.set_source_position(target);
        assert_eq!(world.simulation_time(), 0.0);
        assert_eq!(world.rays().len(), 20);
        assert!(world.rays().iter().all(|r| r.position() == target));
        assert!(world.rays().iter().all(|r| r.intensity() == 1.0));
    }

    #[test]
    fn moving_the_source_while_idle_does_not_emit() {
        let mut world = world_with(WallMaterial::Hard, 5.0, 4.0);
        world.set_source_position(Vec2::new(10.0, 10.0));
        assert!(world.rays().is_empty());
        assert!(world.is_idle());
    }

    #[test]
    fn commands_apply_on_the_next_tick() {
        let mut world = world_with(WallMaterial::Hard, 5.0, 4.0);
        let controller = world.controller();

        controller.emit_single_pulse().unwrap();
        controller.set_time_scale(4.0).unwrap();
        controller
            .set_listener_position(Vec2::new(42.0, 24.0))
            .unwrap();
        assert!(world.rays().is_empty());

        world.step(0.016);
        assert_eq!(world.rays().len(), 20);
        assert_eq!(world.time_scale(), 4.0);
        assert_eq!(world.listener_position(), Vec2::new(42.0, 24.0));
    }

    #[test]
    fn invalid_time_scale_command_is_ignored() {
        let mut world = world_with(WallMaterial::Hard, 5.0, 4.0);
        let controller = world.controller();
        controller.set_time_scale(-2.0).unwrap();
        world.step(0.016);
        assert_eq!(world.time_scale(), 1.0);
    }

    #[test]
    fn time_scale_stretches_the_simulated_clock() {
        let mut world = world_with(WallMaterial::Hard, 5.0, 4.0);
        world.emit_single_pulse();
        world.set_time_scale(10.0).unwrap();
        world.step(0.0);
        world.step(0.1);
        assert!((world.simulation_time() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn turning_continuous_off_keeps_existing_rays() {
        let mut world = world_with(WallMaterial::Hard, 5.0, 4.0);
        world.toggle_continuous_mode();
        world.step(0.0);
        world.step(0.01);
        let count = world.rays().len();
        world.toggle_continuous_mode();
        assert!(!world.is_continuous());
        assert_eq!(world.rays().len(), count);
    }

    #[test]
    fn invalid_room_reports_but_does_not_halt() {
        let mut world = world_with(WallMaterial::Hard, 5.0, 4.0);
        world.emit_single_pulse();
        world.step(0.0);
        // the configuration boundary refuses degenerate rooms, so the world
        // keeps stepping against the last valid one
        assert!(RoomModel::new(0.0, 4.0, WallMaterial::Hard).is_err());
        assert_eq!(world.step(0.016), StepOutcome::Continue);
        assert!(world.rt60().is_ok());
    }
}
