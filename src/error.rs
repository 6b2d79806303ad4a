use thiserror::Error;

/// Reasons a client request is refused. Each one is reported privately to the
/// offending session as an `error` envelope; game state is left unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Not your turn or wrong color.")]
    WrongTurn,

    #[error("Illegal move: {0}")]
    IllegalMove(String),

    #[error("Waiting for an opponent to join.")]
    WaitingForPlayers,

    #[error("Game is over.")]
    GameOver,

    #[error("Game is full. Only {0} spectators allowed.")]
    SeatFull(usize),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Clock must start with a positive number of seconds, got {0}")]
    InvalidClock(f64),

    #[error("Flag sweep interval must be greater than zero")]
    InvalidSweepInterval,
}
