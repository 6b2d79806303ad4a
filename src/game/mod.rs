pub mod clock;
pub mod game_state;
pub mod rules;
pub mod utils;

pub use clock::{Clock, ClockOutcome};
pub use game_state::{GameState, MoveOutcome, Phase};
pub use rules::{ChessRules, RulesEngine};
