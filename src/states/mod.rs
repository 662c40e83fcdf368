//! The concrete screens.

mod edit;
mod game;
mod register;
mod select;

pub use edit::{Edit, BASIC_PANELS, DEFAULT_MAP_NAME};
pub use game::Game;
pub use register::{Register, ALPHAGRID, BACKSPACE_CELL, END_CELL, MAX_LETTERS};
pub use select::Select;

use std::collections::HashMap;
use std::rc::Rc;

use crate::config::Settings;
use crate::error::Result;
use crate::level::LevelConfig;
use crate::sheet::Sheets;
use crate::state::{State, StateId};

/// Every screen, keyed for [`crate::state::StateMachine::setup_states`].
pub fn build_states(settings: Rc<Settings>, sheets: Rc<Sheets>) -> Result<HashMap<StateId, Box<dyn State>>> {
    let mut states: HashMap<StateId, Box<dyn State>> = HashMap::new();
    states.insert(StateId::Select, Box::new(Select::new(settings.clone())));
    states.insert(StateId::Register, Box::new(Register::new(settings.clone())?));
    states.insert(
        StateId::Game,
        Box::new(Game::new(settings.clone(), sheets.clone(), LevelConfig::default())),
    );
    states.insert(StateId::Edit, Box::new(Edit::new(settings, sheets)));
    Ok(states)
}
