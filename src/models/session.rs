use actix::Recipient;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::SocketAddr;

use crate::models::OutboundText;

/// Side of the board. Kept independent of any rules engine's own color type.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub fn opposite(self) -> Self {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Color::White => "white",
            Color::Black => "black",
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Seat held by a connected session.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Seat {
    White,
    Black,
    Spectator,
}

impl Seat {
    /// The color this seat plays, or `None` for spectators.
    pub fn color(self) -> Option<Color> {
        match self {
            Seat::White => Some(Color::White),
            Seat::Black => Some(Color::Black),
            Seat::Spectator => None,
        }
    }

    pub fn is_player(self) -> bool {
        self != Seat::Spectator
    }
}

impl fmt::Display for Seat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Seat::White => f.write_str("white"),
            Seat::Black => f.write_str("black"),
            Seat::Spectator => f.write_str("spectator"),
        }
    }
}

/// One connected client.
pub struct Session {
    pub id: String,
    pub addr: Recipient<OutboundText>,
    pub peer: Option<SocketAddr>,
    pub name: String,
    pub seat: Seat,
}
