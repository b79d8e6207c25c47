//! Frame driver for the reverberation world.
//!
//! Stands in for the browser's animation loop: owns a [`ReverbWorld`] on a
//! spawned thread, feeds it wall-clock deltas at a fixed frame interval, and
//! forwards its events over a channel. Hosts with their own frame loop can
//! skip this and call [`ReverbWorld::step`] directly.

use crate::error::{EchoLabError, Result};
use crate::events::EchoLabEvent;
use crate::world::{ReverbController, ReverbWorld};
use crossbeam_channel::{Receiver, Sender, unbounded};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

pub struct ReverbEngine {
    frame_interval: Duration,
    world: Option<ReverbWorld>,
    controller: ReverbController,
    is_running: Arc<AtomicBool>,
    frames_processed: Arc<AtomicUsize>,
    event_sender: Sender<EchoLabEvent>,
    event_receiver: Receiver<EchoLabEvent>,
    handle: Option<JoinHandle<ReverbWorld>>,
}

impl ReverbEngine {
    /// Wraps a world for threaded driving. Frame pacing comes from the
    /// world's [`crate::config::ReverbConfig::frame_interval`].
    pub fn new(world: ReverbWorld) -> Self {
        let (event_sender, event_receiver) = unbounded();
        let frame_interval = world.config().frame_interval;
        let controller = world.controller();
        Self {
            frame_interval,
            world: Some(world),
            controller,
            is_running: Arc::new(AtomicBool::new(false)),
            frames_processed: Arc::new(AtomicUsize::new(0)),
            event_sender,
            event_receiver,
            handle: None,
        }
    }

    /// Command handle usable from any thread, before or after `start`.
    pub fn controller(&self) -> ReverbController {
        self.controller.clone()
    }

    /// Simulation events, forwarded from the driver thread while running.
    pub fn events(&self) -> &Receiver<EchoLabEvent> {
        &self.event_receiver
    }

    /// Starts the driver thread. Calling `start` on a running engine is a
    /// no-op.
    pub fn start(&mut self) -> Result<()> {
        if self.is_running.load(Ordering::Relaxed) {
            return Ok(());
        }

        let mut world = self
            .world
            .take()
            .ok_or_else(|| EchoLabError::Engine("Engine has no world to run".into()))?;

        let is_running = self.is_running.clone();
        let frames_processed = self.frames_processed.clone();
        let event_sender = self.event_sender.clone();
        let frame_interval = self.frame_interval;

        is_running.store(true, Ordering::Relaxed);

        let handle = std::thread::Builder::new()
            .name("echolab-reverb".into())
            .spawn(move || {
                let mut last = Instant::now();
                while is_running.load(Ordering::Relaxed) {
                    let now = Instant::now();
                    let dt = now.duration_since(last).as_secs_f64();
                    last = now;

                    if world.is_idle() {
                        // quiescent: stop ticking, keep the command queue live
                        world.pump_commands();
                    } else {
                        world.step(dt);
                        frames_processed.fetch_add(1, Ordering::Relaxed);
                    }

                    for event in world.poll_events() {
                        if event_sender.send(event).is_err() {
                            log::warn!("Event receiver dropped; discarding simulation events");
                            break;
                        }
                    }

                    let elapsed = now.elapsed();
                    if elapsed < frame_interval {
                        std::thread::sleep(frame_interval - elapsed);
                    }
                }
                world
            })
            .map_err(|e| {
                self.is_running.store(false, Ordering::Relaxed);
                EchoLabError::Engine(format!("Failed to spawn simulation thread: {}", e))
            })?;

        self.handle = Some(handle);
        Ok(())
    }

    /// Stops the driver thread and takes the world back.
    pub fn stop(&mut self) -> Result<()> {
        if let Some(handle) = self.handle.take() {
            self.is_running.store(false, Ordering::Relaxed);
            let world = handle
                .join()
                .map_err(|_| EchoLabError::Engine("Simulation thread panicked".into()))?;
            self.world = Some(world);
        }
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.is_running.load(Ordering::Relaxed)
    }

    /// Number of simulation ticks executed since start.
    pub fn frames_processed(&self) -> usize {
        self.frames_processed.load(Ordering::Relaxed)
    }

    /// The world, available while the engine is stopped.
    pub fn world(&self) -> Option<&ReverbWorld> {
        self.world.as_ref()
    }

    pub fn world_mut(&mut self) -> Option<&mut ReverbWorld> {
        self.world.as_mut()
    }
}

impl Drop for ReverbEngine {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            log::error!("Failed to stop reverb engine: {}", e);
        }
    }
}
