use crate::anim::Epoch;
use crate::error::{Error, Result};

/// Periodic tick source for events not tied to an animation, e.g. a
/// blinking cursor.
#[derive(Debug, Clone)]
pub struct Timer {
    delay: f64,
    ticks: Option<u32>,
    tick_count: u32,
    epoch: Epoch,
    done: bool,
}

impl Timer {
    /// Ticks every `delay` milliseconds, forever.
    pub fn new(delay: f64) -> Result<Self> {
        if !(delay > 0.0) {
            return Err(Error::InvalidTiming(format!("timer delay must be positive, got {delay}")));
        }
        Ok(Self {
            delay,
            ticks: None,
            tick_count: 0,
            epoch: Epoch::Unarmed,
            done: false,
        })
    }

    /// Stop after `ticks` ticks following the arming call.
    pub fn with_ticks(mut self, ticks: u32) -> Self {
        self.ticks = Some(ticks);
        self
    }

    /// True when the timer arms or when `delay` has elapsed since the last
    /// tick.
    pub fn check_tick(&mut self, now: f64) -> bool {
        let last = match self.epoch {
            Epoch::Unarmed => {
                self.epoch = Epoch::Armed(now);
                return true;
            }
            Epoch::Armed(t) => t,
        };
        if self.done || now - last < self.delay {
            return false;
        }
        self.tick_count += 1;
        self.epoch = Epoch::Armed(now);
        if self.ticks.is_some_and(|limit| self.tick_count >= limit) {
            self.done = true;
        }
        true
    }

    pub fn tick_count(&self) -> u32 {
        self.tick_count
    }

    pub fn is_done(&self) -> bool {
        self.done
    }
}
