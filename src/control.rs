//! The game loop: events in, fixed-step updates, one draw per frame.

use macroquad::prelude::*;
use std::collections::VecDeque;

use crate::canvas::{Canvas, Screen};
use crate::config::{Settings, SIDEBAR};
use crate::error::{Error, Result};
use crate::input::{poll_events, Event, Keys};
use crate::state::StateMachine;

/// Most updates run in one frame before the backlog is dropped.
const MAX_STEPS_PER_FRAME: u32 = 5;
/// Frame intervals averaged for the fps readout.
const FPS_SAMPLES: usize = 10;

/// Fixed-timestep accumulator.
#[derive(Debug, Clone)]
pub struct FrameClock {
    step: f64,
    accumulator: f64,
    last: Option<f64>,
    samples: VecDeque<f64>,
}

impl FrameClock {
    pub fn new(fps: f32) -> Result<Self> {
        if !(fps > 0.0) {
            return Err(Error::InvalidTiming(format!("target fps must be positive, got {fps}")));
        }
        Ok(Self {
            step: 1.0 / fps as f64,
            accumulator: 0.0,
            last: None,
            samples: VecDeque::with_capacity(FPS_SAMPLES),
        })
    }

    /// Feed the current time in seconds; returns how many fixed steps to run.
    pub fn tick(&mut self, now: f64) -> u32 {
        let elapsed = match self.last.replace(now) {
            None => self.step,
            Some(last) => (now - last).max(0.0),
        };
        if self.samples.len() == FPS_SAMPLES {
            self.samples.pop_front();
        }
        self.samples.push_back(elapsed);

        self.accumulator += elapsed;
        let mut steps = (self.accumulator / self.step).floor() as u32;
        if steps > MAX_STEPS_PER_FRAME {
            steps = MAX_STEPS_PER_FRAME;
            self.accumulator = self.step * steps as f64;
        }
        self.accumulator -= self.step * steps as f64;
        steps
    }

    /// Length of one update in seconds.
    pub fn step(&self) -> f32 {
        self.step as f32
    }

    /// Fraction of a step left over after the last tick.
    pub fn interpolation(&self) -> f32 {
        (self.accumulator / self.step) as f32
    }

    /// Measured frames per second.
    pub fn fps(&self) -> f32 {
        let total: f64 = self.samples.iter().sum();
        if total <= 0.0 {
            0.0
        } else {
            (self.samples.len() as f64 / total) as f32
        }
    }
}

/// Owns the loop and the state machine it drives.
pub struct Control {
    caption: String,
    state_machine: StateMachine,
    clock: FrameClock,
    keys: Keys,
    fps_visible: bool,
    done: bool,
    now: f64,
}

impl Control {
    pub fn new(settings: &Settings, state_machine: StateMachine) -> Result<Self> {
        Ok(Self {
            caption: settings.caption.clone(),
            state_machine,
            clock: FrameClock::new(settings.fps)?,
            keys: Keys::new(),
            fps_visible: settings.show_fps,
            done: false,
            now: 0.0,
        })
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn state_machine(&self) -> &StateMachine {
        &self.state_machine
    }

    /// Caption with the measured fps appended while the readout is on.
    pub fn caption(&self) -> String {
        if self.fps_visible {
            format!("{} - {:.2} FPS", self.caption, self.clock.fps())
        } else {
            self.caption.clone()
        }
    }

    /// Hand events to the active state and refresh the key snapshot.
    pub fn event_loop(&mut self, events: &[Event], keys: Keys) {
        self.keys = keys;
        for event in events {
            match event {
                Event::Quit => self.done = true,
                Event::KeyDown(key) => self.toggle_show_fps(*key),
                _ => {}
            }
            self.state_machine.get_event(event);
        }
    }

    fn toggle_show_fps(&mut self, key: KeyCode) {
        if key == KeyCode::F5 {
            self.fps_visible = !self.fps_visible;
        }
    }

    /// Update the active state; `now` in milliseconds.
    pub fn update(&mut self, now: f64, dt: f32) -> Result<()> {
        self.now = now;
        self.state_machine.update(&self.keys, now, dt)?;
        if self.state_machine.is_done() {
            self.done = true;
        }
        Ok(())
    }

    /// One whole frame at time `now` (seconds).
    pub fn frame(&mut self, now: f64, events: &[Event], keys: Keys, canvas: &mut dyn Canvas) -> Result<()> {
        let steps = self.clock.tick(now);
        self.event_loop(events, keys);
        let dt = self.clock.step();
        for _ in 0..steps {
            if self.done {
                break;
            }
            self.update(now * 1000.0, dt)?;
        }
        self.state_machine.draw(canvas, self.clock.interpolation());
        if self.fps_visible {
            canvas.text(&self.caption(), vec2(SIDEBAR.x + 8.0, SIDEBAR.h - 24.0), 16.0, WHITE);
        }
        Ok(())
    }

    /// Run until a quit event or a quitting state.
    pub async fn main(&mut self, screen: &mut Screen) -> Result<()> {
        prevent_quit();
        while !self.done {
            let (events, keys) = poll_events();
            self.frame(get_time(), &events, keys, screen)?;
            next_frame().await;
        }
        log::info!("Leaving main loop");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_tick_runs_one_step() {
        let mut clock = FrameClock::new(60.0).unwrap();
        assert_eq!(clock.tick(10.0), 1);
    }

    #[test]
    fn accumulates_fractional_frames() {
        let mut clock = FrameClock::new(4.0).unwrap();
        clock.tick(0.0);
        assert_eq!(clock.tick(0.125), 0);
        assert!((clock.interpolation() - 0.5).abs() < 1e-4);
        assert_eq!(clock.tick(0.25), 1);
        assert_eq!(clock.tick(0.75), 2);
    }

    #[test]
    fn long_stall_is_capped() {
        let mut clock = FrameClock::new(60.0).unwrap();
        clock.tick(0.0);
        assert_eq!(clock.tick(10.0), MAX_STEPS_PER_FRAME);
        assert!(clock.interpolation() < 1.0);
    }

    #[test]
    fn measures_fps() {
        let mut clock = FrameClock::new(60.0).unwrap();
        for i in 0..20 {
            clock.tick(i as f64 * 0.02);
        }
        assert!((clock.fps() - 50.0).abs() < 0.5);
    }

    #[test]
    fn rejects_zero_fps() {
        assert!(FrameClock::new(0.0).is_err());
    }

    #[test]
    fn f5_toggles_fps_readout_and_quit_ends_loop() {
        let mut control = Control::new(&Settings::default(), StateMachine::new()).unwrap();
        assert!(control.caption().contains("FPS"));
        control.event_loop(&[Event::KeyDown(KeyCode::F5)], Keys::new());
        assert_eq!(control.caption(), "Tile Quest");
        control.event_loop(&[Event::Quit], Keys::new());
        assert!(control.is_done());
    }
}
