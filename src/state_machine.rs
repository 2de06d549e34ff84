//! Turn dispatcher state machine
//!
//! Implements the Elm Architecture pattern with pure state transitions:
//! the transition decides what a UI event means, the session runtime
//! carries out the resulting effects.

mod effect;
pub mod event;
pub mod state;
pub(crate) mod transition;


pub use effect::Effect;
pub use event::Event;
pub use state::{SessionContext, TurnState};
pub use transition::transition;
