use std::time::Instant;

use crate::models::{Color, PlayerTimes};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockOutcome {
    Continue,
    TimedOut { loser: Color },
}

/// Per-player chess clock. Counters only change when a move is submitted;
/// `readout` gives the live view in between.
#[derive(Debug, Clone)]
pub struct Clock {
    white_secs: f64,
    black_secs: f64,
    active: Option<Color>,
    last_update: Option<Instant>,
}

impl Clock {
    pub fn new(initial_seconds: f64) -> Self {
        Self {
            white_secs: initial_seconds,
            black_secs: initial_seconds,
            active: None,
            last_update: None,
        }
    }

    pub fn start(&mut self, initial_seconds: f64, now: Instant) {
        self.white_secs = initial_seconds;
        self.black_secs = initial_seconds;
        self.active = Some(Color::White);
        self.last_update = Some(now);
    }

    pub fn on_move_submitted(&mut self, moving: Color, now: Instant) -> ClockOutcome {
        if self.active == Some(moving) {
            let elapsed = self.elapsed(now);
            let counter = self.counter_mut(moving);
            *counter -= elapsed;
            if *counter <= 0.0 {
                *counter = 0.0;
                self.stop();
                return ClockOutcome::TimedOut { loser: moving };
            }
        }
        self.active = Some(moving.opposite());
        self.last_update = Some(now);
        ClockOutcome::Continue
    }

    pub fn stop(&mut self) {
        self.active = None;
    }

    pub fn active(&self) -> Option<Color> {
        self.active
    }

    pub fn remaining(&self, color: Color) -> f64 {
        match color {
            Color::White => self.white_secs,
            Color::Black => self.black_secs,
        }
    }

    /// Authoritative counters as of the last move.
    pub fn times(&self) -> PlayerTimes {
        PlayerTimes {
            white: self.white_secs,
            black: self.black_secs,
        }
    }

    /// Live view: the running clock is reduced by the time since the last
    /// move, clamped at zero. Nothing is written back.
    pub fn readout(&self, now: Instant) -> PlayerTimes {
        let mut times = self.times();
        if let Some(color) = self.active {
            let live = (self.remaining(color) - self.elapsed(now)).max(0.0);
            match color {
                Color::White => times.white = live,
                Color::Black => times.black = live,
            }
        }
        times
    }

    /// The running clock's color if it has already hit zero.
    pub fn flagged(&self, now: Instant) -> Option<Color> {
        let color = self.active?;
        (self.remaining(color) - self.elapsed(now) <= 0.0).then_some(color)
    }

    fn elapsed(&self, now: Instant) -> f64 {
        self.last_update
            .map(|t| now.saturating_duration_since(t).as_secs_f64())
            .unwrap_or(0.0)
    }

    fn counter_mut(&mut self, color: Color) -> &mut f64 {
        match color {
            Color::White => &mut self.white_secs,
            Color::Black => &mut self.black_secs,
        }
    }
}
