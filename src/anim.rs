//! Time-driven frame sequencing.
//!
//! Both [`Anim`] and [`crate::Timer`] are driven by absolute timestamps in
//! milliseconds rather than by a frame delta, so an irregular call cadence
//! never speeds them up or slows them down.

use crate::error::{Error, Result};

/// Reference point of a running animation or timer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Epoch {
    /// Not yet observed a timestamp; the next call arms it.
    Unarmed,
    /// Timestamp (ms) of the last step.
    Armed(f64),
}

/// Sequences an ordered list of frames at a fixed rate.
#[derive(Debug, Clone)]
pub struct Anim<F> {
    frames: Vec<F>,
    fps: f32,
    frame: usize,
    epoch: Epoch,
    loops: Option<u32>,
    loop_count: u32,
    done: bool,
}

impl<F> Anim<F> {
    /// Endless animation over `frames` at `fps` frames per second.
    pub fn new(frames: Vec<F>, fps: f32) -> Result<Self> {
        if frames.is_empty() {
            return Err(Error::InvalidTiming("animation needs at least one frame".into()));
        }
        if !(fps > 0.0) {
            return Err(Error::InvalidTiming(format!("animation fps must be positive, got {fps}")));
        }
        Ok(Self {
            frames,
            fps,
            frame: 0,
            epoch: Epoch::Unarmed,
            loops: None,
            loop_count: 0,
            done: false,
        })
    }

    /// Stop after `loops` complete passes, holding the last frame.
    pub fn with_loops(mut self, loops: u32) -> Self {
        self.loops = Some(loops);
        self
    }

    /// Advance if a frame's worth of time has passed since the last step and
    /// return the frame to display.
    pub fn advance(&mut self, now: f64) -> &F {
        let last = match self.epoch {
            Epoch::Unarmed => {
                self.epoch = Epoch::Armed(now);
                return &self.frames[self.frame];
            }
            Epoch::Armed(t) => t,
        };
        if !self.done && now - last >= 1000.0 / self.fps as f64 {
            self.frame = (self.frame + 1) % self.frames.len();
            if self.frame == 0 {
                self.loop_count += 1;
                if self.loops.is_some_and(|limit| self.loop_count >= limit) {
                    self.done = true;
                    self.frame = self.frames.len() - 1;
                }
            }
            self.epoch = Epoch::Armed(now);
        }
        &self.frames[self.frame]
    }

    /// Back to the first frame, unarmed, with loop state cleared.
    pub fn reset(&mut self) {
        self.frame = 0;
        self.epoch = Epoch::Unarmed;
        self.loop_count = 0;
        self.done = false;
    }

    /// Frame currently displayed.
    pub fn current(&self) -> &F {
        &self.frames[self.frame]
    }

    /// Index of the frame currently displayed.
    pub fn frame_index(&self) -> usize {
        self.frame
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn loop_count(&self) -> u32 {
        self.loop_count
    }

    /// True once a finite loop limit has been reached.
    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn epoch(&self) -> Epoch {
        self.epoch
    }
}
