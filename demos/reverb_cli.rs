//! Headless run of the reverberation simulation: fires a single pulse and
//! reports ray counts until the room goes quiet.

use anyhow::Result;
use echolab::{ReverbConfig, ReverbWorld, RoomModel, StepOutcome, WallMaterial};

fn main() -> Result<()> {
    env_logger::init();

    let room = RoomModel::new(5.0, 4.0, WallMaterial::Medium)?;
    let mut world = ReverbWorld::new(ReverbConfig::default(), room)?;
    println!(
        "room {}m x {}m ({} walls), RT60 {:.2} s",
        world.room().length(),
        world.room().width(),
        world.room().material(),
        world.rt60()?
    );

    world.emit_single_pulse();
    world.step(0.0); // synchronize

    let dt = 1.0 / 60.0;
    let mut frame = 0u64;
    loop {
        if world.step(dt) == StepOutcome::Quiescent {
            println!(
                "quiet after {} frames ({:.2} s simulated)",
                frame,
                world.simulation_time()
            );
            break;
        }
        if frame % 60 == 0 {
            let alive = world.active_rays().count();
            let loudest = world
                .active_rays()
                .map(|ray| ray.intensity())
                .fold(0.0f32, f32::max);
            println!(
                "t={:6.2}s  rays={:3}  loudest={:.3}",
                world.simulation_time(),
                alive,
                loudest
            );
        }
        frame += 1;
    }

    for event in world.poll_events() {
        log::debug!("event: {:?}", event);
    }
    Ok(())
}
