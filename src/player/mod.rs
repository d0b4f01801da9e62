//! Playback core: state machine, effects and the session that executes them.

pub mod controller;
pub mod effects;
pub mod session;
pub mod state;

pub use effects::{ElementId, MediaEvent, PlayerCommand, PlayerInput, RemoteAction};
pub use session::{MediaDriver, Player};
pub use state::{Phase, PlaybackState};
