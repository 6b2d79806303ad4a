pub mod clock_watch;
pub mod game_handlers;
pub mod handler;
pub mod registry;

pub use clock_watch::ClockWatch;
pub use handler::{ws_index, PlayerSocket};
pub use registry::{Registration, Registry};
