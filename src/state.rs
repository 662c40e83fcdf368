//! Finite-state controller for game screens.
//!
//! Each screen implements [`State`]. A state asks to leave by setting
//! `done` and `next` on its [`StateCore`]; the [`StateMachine`] performs the
//! switch at the start of the following update, before any state runs.

use std::collections::HashMap;

use crate::canvas::Canvas;
use crate::error::{Error, Result};
use crate::input::{Event, Keys};

/// Names of the registered screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StateId {
    Select,
    Register,
    Game,
    Edit,
}

/// Data carried from one state to the next.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Persist {
    /// Save slot chosen on the select screen.
    pub save_slot: usize,
    /// Map to open, when one was chosen.
    pub map: Option<String>,
}

/// Bookkeeping every state carries.
#[derive(Debug, Clone)]
pub struct StateCore {
    pub done: bool,
    pub quit: bool,
    pub next: StateId,
    pub previous: Option<StateId>,
    pub persist: Persist,
    pub start_time: f64,
}

impl StateCore {
    pub fn new(next: StateId) -> Self {
        Self {
            done: false,
            quit: false,
            next,
            previous: None,
            persist: Persist::default(),
            start_time: 0.0,
        }
    }

    /// Record the entry time and payload.
    pub fn start(&mut self, now: f64, persist: Persist) {
        self.persist = persist;
        self.start_time = now;
    }

    /// Clear `done` and hand the payload over.
    pub fn finish(&mut self) -> Persist {
        self.done = false;
        std::mem::take(&mut self.persist)
    }

    /// Leave for `next` at the next flip.
    pub fn finish_to(&mut self, next: StateId) {
        self.next = next;
        self.done = true;
    }
}

pub trait State {
    fn core(&self) -> &StateCore;
    fn core_mut(&mut self) -> &mut StateCore;

    /// Entered with the payload the previous state left behind.
    fn startup(&mut self, now: f64, persist: Persist) -> Result<()> {
        self.core_mut().start(now, persist);
        Ok(())
    }

    /// Leaving; hands the payload on.
    fn cleanup(&mut self) -> Persist {
        self.core_mut().finish()
    }

    fn update(&mut self, keys: &Keys, now: f64, dt: f32);

    fn draw(&self, canvas: &mut dyn Canvas, interpolate: f32);

    fn get_event(&mut self, _event: &Event) {}
}

#[derive(Default)]
pub struct StateMachine {
    states: HashMap<StateId, Box<dyn State>>,
    active: Option<StateId>,
    done: bool,
}

impl StateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every state and enter `start`.
    pub fn setup_states(
        &mut self,
        states: HashMap<StateId, Box<dyn State>>,
        start: StateId,
        now: f64,
    ) -> Result<()> {
        self.states = states;
        let state = self.states.get_mut(&start).ok_or(Error::UnknownState(start))?;
        state.startup(now, Persist::default())?;
        self.active = Some(start);
        log::info!("Starting in state {:?}", start);
        Ok(())
    }

    pub fn active(&self) -> Option<StateId> {
        self.active
    }

    /// True once the active state asked to quit.
    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn state(&self, id: StateId) -> Option<&dyn State> {
        self.states.get(&id).map(|s| s.as_ref())
    }

    /// Flip if the active state is done, then update whichever is active.
    pub fn update(&mut self, keys: &Keys, now: f64, dt: f32) -> Result<()> {
        let Some(id) = self.active else {
            return Ok(());
        };
        let (quit, done) = match self.states.get(&id) {
            Some(s) => (s.core().quit, s.core().done),
            None => return Err(Error::UnknownState(id)),
        };
        if quit {
            self.done = true;
            return Ok(());
        }
        if done {
            self.flip_state(now)?;
        }
        if let Some(state) = self.active.and_then(|id| self.states.get_mut(&id)) {
            state.update(keys, now, dt);
        }
        Ok(())
    }

    /// Exit the active state and enter its successor.
    pub fn flip_state(&mut self, now: f64) -> Result<()> {
        let Some(previous) = self.active else {
            return Ok(());
        };
        let next = self
            .states
            .get(&previous)
            .ok_or(Error::UnknownState(previous))?
            .core()
            .next;
        if !self.states.contains_key(&next) {
            return Err(Error::UnknownState(next));
        }

        let persist = match self.states.get_mut(&previous) {
            Some(old) => old.cleanup(),
            None => Persist::default(),
        };
        log::info!("State {:?} -> {:?}", previous, next);
        self.active = Some(next);
        if let Some(new) = self.states.get_mut(&next) {
            new.core_mut().previous = Some(previous);
            new.startup(now, persist)?;
        }
        Ok(())
    }

    pub fn draw(&self, canvas: &mut dyn Canvas, interpolate: f32) {
        if let Some(state) = self.active.and_then(|id| self.states.get(&id)) {
            state.draw(canvas, interpolate);
        }
    }

    pub fn get_event(&mut self, event: &Event) {
        if let Some(state) = self.active.and_then(|id| self.states.get_mut(&id)) {
            state.get_event(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Recorder;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<String>>>;

    struct Probe {
        core: StateCore,
        name: &'static str,
        log: Log,
    }

    impl Probe {
        fn boxed(name: &'static str, next: StateId, log: &Log) -> Box<dyn State> {
            Box::new(Self {
                core: StateCore::new(next),
                name,
                log: log.clone(),
            })
        }

        fn note(&self, what: &str) {
            self.log.borrow_mut().push(format!("{}.{}", self.name, what));
        }
    }

    impl State for Probe {
        fn core(&self) -> &StateCore {
            &self.core
        }
        fn core_mut(&mut self) -> &mut StateCore {
            &mut self.core
        }
        fn startup(&mut self, now: f64, persist: Persist) -> Result<()> {
            self.note(&format!("startup(slot={})", persist.save_slot));
            self.core.start(now, persist);
            Ok(())
        }
        fn cleanup(&mut self) -> Persist {
            self.note("cleanup");
            self.core.finish()
        }
        fn update(&mut self, _keys: &Keys, _now: f64, _dt: f32) {
            self.note("update");
        }
        fn draw(&self, _canvas: &mut dyn Canvas, _interpolate: f32) {
            self.note("draw");
        }
        fn get_event(&mut self, _event: &Event) {
            self.note("event");
        }
    }

    fn machine(log: &Log) -> StateMachine {
        let mut states: HashMap<StateId, Box<dyn State>> = HashMap::new();
        states.insert(StateId::Select, Probe::boxed("A", StateId::Game, log));
        states.insert(StateId::Game, Probe::boxed("B", StateId::Select, log));
        let mut sm = StateMachine::new();
        sm.setup_states(states, StateId::Select, 0.0).unwrap();
        sm
    }

    fn finish_active(sm: &mut StateMachine, slot: usize) {
        let id = sm.active().unwrap();
        let state = sm.states.get_mut(&id).unwrap();
        state.core_mut().persist.save_slot = slot;
        state.core_mut().done = true;
    }

    #[test]
    fn transition_runs_hooks_in_order() {
        let log: Log = Rc::default();
        let mut sm = machine(&log);
        let keys = Keys::new();
        sm.update(&keys, 1.0, 0.016).unwrap();
        finish_active(&mut sm, 2);
        log.borrow_mut().clear();

        sm.update(&keys, 2.0, 0.016).unwrap();
        sm.draw(&mut Recorder::new(), 0.0);
        sm.get_event(&Event::KeyDown(macroquad::prelude::KeyCode::Enter));

        assert_eq!(
            *log.borrow(),
            vec!["A.cleanup", "B.startup(slot=2)", "B.update", "B.draw", "B.event"]
        );
        assert_eq!(sm.active(), Some(StateId::Game));
        assert_eq!(sm.state(StateId::Game).unwrap().core().previous, Some(StateId::Select));
    }

    #[test]
    fn quitting_state_stops_the_machine_without_updating() {
        let log: Log = Rc::default();
        let mut sm = machine(&log);
        sm.states.get_mut(&StateId::Select).unwrap().core_mut().quit = true;
        log.borrow_mut().clear();
        sm.update(&Keys::new(), 1.0, 0.016).unwrap();
        assert!(sm.is_done());
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn unknown_successor_is_an_error() {
        let log: Log = Rc::default();
        let mut sm = machine(&log);
        let state = sm.states.get_mut(&StateId::Select).unwrap();
        state.core_mut().next = StateId::Edit;
        state.core_mut().done = true;
        let err = sm.update(&Keys::new(), 1.0, 0.016).unwrap_err();
        assert!(matches!(err, Error::UnknownState(StateId::Edit)));
    }

    #[test]
    fn unknown_start_state_is_an_error() {
        let mut sm = StateMachine::new();
        let err = sm.setup_states(HashMap::new(), StateId::Register, 0.0).unwrap_err();
        assert!(matches!(err, Error::UnknownState(StateId::Register)));
    }
}
