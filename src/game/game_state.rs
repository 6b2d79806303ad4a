use log::info;
use std::time::Instant;

use crate::error::GameError;
use crate::game::clock::{Clock, ClockOutcome};
use crate::game::rules::RulesEngine;
use crate::models::{BoardSnapshot, Color, Seat};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    WaitingForPlayers,
    InProgress,
    GameOver,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MoveOutcome {
    Applied(BoardSnapshot),
    /// The mover's clock ran out; the submitted move was not played.
    TimeoutEnd(BoardSnapshot),
}

impl MoveOutcome {
    pub fn snapshot(&self) -> &BoardSnapshot {
        match self {
            MoveOutcome::Applied(s) | MoveOutcome::TimeoutEnd(s) => s,
        }
    }
}

/// The single authoritative game. Callers hold it behind one mutex; every
/// method here runs inside that critical section.
pub struct GameState<R: RulesEngine> {
    rules: R,
    position: R::Position,
    side_to_move: Color,
    history: Vec<String>,
    phase: Phase,
    winner: Option<Color>,
    clock: Clock,
    initial_seconds: f64,
}

impl<R: RulesEngine> GameState<R> {
    pub fn new(rules: R, initial_seconds: f64) -> Self {
        let position = rules.initial_position();
        Self {
            rules,
            position,
            side_to_move: Color::White,
            history: Vec::new(),
            phase: Phase::WaitingForPlayers,
            winner: None,
            clock: Clock::new(initial_seconds),
            initial_seconds,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    pub fn history(&self) -> &[String] {
        &self.history
    }

    pub fn winner(&self) -> Option<Color> {
        self.winner
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    /// Both seats are taken. The first time this happens the game starts and
    /// white's clock begins to run; later refills only re-announce the board.
    pub fn seat_filled(&mut self, now: Instant) -> BoardSnapshot {
        if self.phase == Phase::WaitingForPlayers {
            self.clock.start(self.initial_seconds, now);
            self.phase = Phase::InProgress;
            info!("Both seats filled, white's clock started");
        }
        BoardSnapshot {
            both_connected: Some(true),
            ..self.snapshot(None)
        }
    }

    pub fn submit_move(&mut self, seat: Seat, mv: &str, now: Instant) -> Result<MoveOutcome, GameError> {
        match self.phase {
            Phase::WaitingForPlayers => return Err(GameError::WaitingForPlayers),
            Phase::GameOver => return Err(GameError::GameOver),
            Phase::InProgress => {}
        }

        let mover = match seat.color() {
            Some(color) if color == self.side_to_move => color,
            _ => return Err(GameError::WrongTurn),
        };

        // Clock changes are committed only once the move is known to count.
        let mut clock = self.clock.clone();
        if let ClockOutcome::TimedOut { loser } = clock.on_move_submitted(mover, now) {
            self.clock = clock;
            self.finish(Some(loser.opposite()));
            info!("{} ran out of time, {} wins", loser, loser.opposite());
            return Ok(MoveOutcome::TimeoutEnd(self.snapshot(None)));
        }

        if !self.rules.is_legal(&self.position, mv) {
            return Err(GameError::IllegalMove(mv.to_string()));
        }
        let position = self
            .rules
            .apply(&self.position, mv)
            .ok_or_else(|| GameError::IllegalMove(mv.to_string()))?;

        self.position = position;
        self.clock = clock;
        self.history.push(mv.to_string());
        self.side_to_move = mover.opposite();

        if self.rules.is_game_over(&self.position) {
            let winner = self.rules.winner(&self.position);
            self.finish(winner);
            match winner {
                Some(color) => info!("Game over, {} wins", color),
                None => info!("Game over, draw"),
            }
        }

        Ok(MoveOutcome::Applied(self.snapshot(Some(mv.to_string()))))
    }

    /// Ends the game if the running clock has reached zero without a move.
    pub fn check_flag(&mut self, now: Instant) -> Option<BoardSnapshot> {
        if self.phase != Phase::InProgress {
            return None;
        }
        let loser = self.clock.flagged(now)?;
        if let ClockOutcome::TimedOut { .. } = self.clock.on_move_submitted(loser, now) {
            self.finish(Some(loser.opposite()));
            info!("{} flagged, {} wins", loser, loser.opposite());
            return Some(self.snapshot(None));
        }
        None
    }

    pub fn snapshot(&self, last_move: Option<String>) -> BoardSnapshot {
        BoardSnapshot {
            fen: self.rules.export(&self.position),
            last_move,
            turn: self.side_to_move,
            history: self.history.clone(),
            game_over: self.phase == Phase::GameOver,
            winner: self.winner,
            player_times: self.clock.times(),
            both_connected: None,
        }
    }

    /// Snapshot with the live clock readout instead of the stored counters.
    pub fn live_snapshot(&self, now: Instant) -> BoardSnapshot {
        BoardSnapshot {
            player_times: self.clock.readout(now),
            ..self.snapshot(self.history.last().cloned())
        }
    }

    fn finish(&mut self, winner: Option<Color>) {
        self.phase = Phase::GameOver;
        self.winner = winner;
        self.clock.stop();
    }
}
