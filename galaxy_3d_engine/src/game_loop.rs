//! The cooperative single-threaded main loop: time advance, input poll,
//! platform pump, physics step, game update, audio update, scene render,
//! frame pacing. Generalizes the teacher's process-wide `Engine` singleton
//! with an explicit, ownable loop so a host application supplies the
//! platform/window/input layer through [`PlatformShim`] rather than the
//! loop assuming a concrete windowing stack.

use std::collections::HashSet;
use std::time::Duration;

use crate::audio::{AudioDevice, AudioMixer};
use crate::error::Result;
use crate::physics::{World, MAX_STEP};

/// Currently-down input buttons/keys, queried once per iteration. Button
/// codes are opaque `u32`s so a host can map its own keyboard/gamepad
/// constants onto them without this crate knowing about any concrete
/// windowing library.
#[derive(Debug, Clone, Default)]
pub struct InputSnapshot {
    pressed: HashSet<u32>,
}

impl InputSnapshot {
    pub fn new(pressed: HashSet<u32>) -> Self {
        Self { pressed }
    }

    pub fn is_down(&self, button: u32) -> bool {
        self.pressed.contains(&button)
    }

    pub fn pressed(&self) -> impl Iterator<Item = u32> + '_ {
        self.pressed.iter().copied()
    }
}

/// Platform/window/input boundary the loop calls through, consumed exactly
/// the way [`crate::graphics_device::GraphicsDevice`] decouples rendering
/// from a concrete GPU API.
pub trait PlatformShim {
    /// One-time setup (window creation, audio device open, etc).
    fn initialize(&mut self, app_name: &str) -> Result<()>;

    /// Reverse of `initialize`, run on loop exit.
    fn shutdown(&mut self);

    /// Pump the platform's message queue. Returns `false` on a close/quit
    /// request, which ends the loop after this iteration.
    fn update(&mut self) -> bool;

    /// Monotonic wall-clock time in seconds since an arbitrary epoch.
    fn absolute_time(&self) -> f64;

    fn window_size(&self) -> (u32, u32);
    fn window_offset(&self) -> (i32, i32);
    fn is_minimized(&self) -> bool;
    fn input_snapshot(&self) -> InputSnapshot;
}

/// Orchestrates one iteration's subsystem ordering; owns nothing about
/// rendering or game state beyond the physics world and audio mixer, which
/// every core loop needs regardless of the hosting game.
pub struct GameLoop<P: PlatformShim> {
    platform: P,
    audio_device: Box<dyn AudioDevice>,
    world: World,
    mixer: AudioMixer,
    target_frametime: f32,
    last_time: f64,
}

impl<P: PlatformShim> GameLoop<P> {
    pub fn new(platform: P, audio_device: Box<dyn AudioDevice>, world: World, mixer: AudioMixer, target_frametime: f32) -> Self {
        Self {
            platform,
            audio_device,
            world,
            mixer,
            target_frametime,
            last_time: 0.0,
        }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn mixer(&mut self) -> &mut AudioMixer {
        &mut self.mixer
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    /// Run the loop until `game_update` returns `false`, the platform
    /// requests quit, or `render`/`external` signal failure. Callbacks stay
    /// generic over the concrete game/render state this crate never sees.
    ///
    /// Failure semantics match spec §7: a `false` from `game_update` or
    /// `render` triggers orderly shutdown (this function returning, having
    /// already called `platform.shutdown()`).
    pub fn run(
        &mut self,
        app_name: &str,
        mut game_update: impl FnMut(f32, &InputSnapshot) -> bool,
        mut render: impl FnMut() -> bool,
        mut external: impl FnMut(f32),
    ) -> Result<()> {
        self.platform.initialize(app_name)?;
        self.last_time = self.platform.absolute_time();

        'main: loop {
            let now = self.platform.absolute_time();
            let dt = ((now - self.last_time).max(0.0)) as f32;
            self.last_time = now;

            let input = self.platform.input_snapshot();

            if !self.platform.update() {
                break 'main;
            }

            self.world.step(dt.min(MAX_STEP));

            if !game_update(dt, &input) {
                break 'main;
            }

            self.mixer.update(self.audio_device.as_mut(), dt, 0.0)?;

            if !self.platform.is_minimized() {
                if !render() {
                    break 'main;
                }
            }

            external(dt);

            self.sleep_to_target(dt);
        }

        self.platform.shutdown();
        Ok(())
    }

    fn sleep_to_target(&self, frame_dt: f32) {
        if frame_dt < self.target_frametime {
            let remaining = self.target_frametime - frame_dt;
            std::thread::sleep(Duration::from_secs_f32(remaining.max(0.0)));
        }
    }
}

#[cfg(test)]
#[path = "game_loop_tests.rs"]
mod tests;
