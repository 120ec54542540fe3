use log::info;

use crate::config::GameConfig;
use crate::error::GameError;
use crate::rendering::Renderer;
use crate::terminal_io::InputSource;
use crate::timing::FrameClock;
use crate::types::Rgb;
use crate::world::{FrameOutcome, World};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunOutcome {
    /// Close requested by the player.
    Quit,
    /// Player collided with an asteroid on the given frame.
    GameOver { frame: u64 },
    /// `max_frames` reached.
    FrameLimit,
}

pub struct Game<R, I, C> {
    pub world: World,
    renderer: R,
    input: I,
    clock: C,
    background: Rgb,
    foreground: Rgb,
    line_width: u16,
    target_fps: u32,
    max_frames: Option<u64>,
    frame_count: u64,
}

impl<R, I, C> Game<R, I, C>
where
    R: Renderer,
    I: InputSource,
    C: FrameClock,
{
    pub fn new(
        world: World,
        renderer: R,
        input: I,
        clock: C,
        config: &GameConfig,
        max_frames: Option<u64>,
    ) -> Self {
        Game {
            world,
            renderer,
            input,
            clock,
            background: config.background_color,
            foreground: config.foreground_color,
            line_width: config.line_width,
            target_fps: config.frame_rate,
            max_frames,
            frame_count: 0,
        }
    }

    #[cfg(test)]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    #[cfg(test)]
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Input, simulate, render, present, wait. The first frame runs with a
    /// zero delta.
    pub fn run(&mut self) -> Result<RunOutcome, GameError> {
        let mut dt = 0.0;

        loop {
            if self.max_frames.is_some_and(|max| self.frame_count >= max) {
                info!("Frame limit of {} reached.", self.frame_count);
                return Ok(RunOutcome::FrameLimit);
            }

            self.input.poll(self.frame_count)?;
            if self.input.close_requested() {
                info!("Close requested on frame {}.", self.frame_count);
                return Ok(RunOutcome::Quit);
            }

            let controls = self.input.controls();
            let outcome = self.world.step(dt, &controls);

            self.world.draw(&mut self.renderer, self.background, self.foreground, self.line_width);
            self.renderer.present()?;

            let frame = self.frame_count;
            self.frame_count += 1;

            if outcome == FrameOutcome::GameOver {
                return Ok(RunOutcome::GameOver { frame });
            }

            dt = self.clock.tick(self.target_fps);
        }
    }
}
