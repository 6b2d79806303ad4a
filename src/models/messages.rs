use actix::Message;
use serde::{Deserialize, Serialize};

use crate::models::{Color, Seat};

/// Envelope types understood by the server.
pub const KNOWN_TYPES: [&str; 6] = ["join", "color", "chat", "move", "board", "error"];

/// A protocol envelope: `{"type": ..., "content": {...}}`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", content = "content", rename_all = "lowercase")]
pub enum Envelope {
    Join(JoinContent),
    Color(ColorContent),
    Chat(ChatContent),
    Move(MoveContent),
    Board(BoardSnapshot),
    Error(ErrorContent),
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct JoinContent {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ColorContent {
    pub color: Seat,
}

/// Chat text. `sender` is filled in by the server when relaying.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ChatContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender: Option<String>,
    #[serde(default)]
    pub text: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MoveContent {
    #[serde(rename = "move", default)]
    pub mv: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ErrorContent {
    pub text: String,
}

/// Remaining seconds on each clock.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct PlayerTimes {
    pub white: f64,
    pub black: f64,
}

/// Authoritative board state sent to every session.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct BoardSnapshot {
    pub fen: String,
    #[serde(rename = "move")]
    pub last_move: Option<String>,
    pub turn: Color,
    pub history: Vec<String>,
    pub game_over: bool,
    pub winner: Option<Color>,
    pub player_times: PlayerTimes,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub both_connected: Option<bool>,
}

impl Envelope {
    pub fn color(seat: Seat) -> Self {
        Envelope::Color(ColorContent { color: seat })
    }

    pub fn chat(sender: impl Into<String>, text: impl Into<String>) -> Self {
        Envelope::Chat(ChatContent {
            sender: Some(sender.into()),
            text: text.into(),
        })
    }

    pub fn error(text: impl Into<String>) -> Self {
        Envelope::Error(ErrorContent { text: text.into() })
    }

    pub fn board(snapshot: BoardSnapshot) -> Self {
        Envelope::Board(snapshot)
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Envelope::Join(_) => "join",
            Envelope::Color(_) => "color",
            Envelope::Chat(_) => "chat",
            Envelope::Move(_) => "move",
            Envelope::Board(_) => "board",
            Envelope::Error(_) => "error",
        }
    }
}

/// Result of decoding one inbound frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Inbound {
    Message(Envelope),
    /// Well-formed envelope with a `type` the server does not know. Kept
    /// verbatim so it can be relayed untouched.
    Unrecognized { kind: String, raw: String },
    Invalid(String),
}

#[derive(Deserialize)]
struct RawEnvelope {
    #[serde(rename = "type")]
    kind: String,
}

pub fn encode(envelope: &Envelope) -> serde_json::Result<String> {
    serde_json::to_string(envelope)
}

/// Decode a frame. Never fails: malformed input becomes `Inbound::Invalid`.
pub fn decode(text: &str) -> Inbound {
    let err = match serde_json::from_str::<Envelope>(text) {
        Ok(envelope) => return Inbound::Message(envelope),
        Err(e) => e,
    };
    match serde_json::from_str::<RawEnvelope>(text) {
        Ok(raw) if !KNOWN_TYPES.contains(&raw.kind.as_str()) => Inbound::Unrecognized {
            kind: raw.kind,
            raw: text.to_string(),
        },
        _ => Inbound::Invalid(err.to_string()),
    }
}

/// Text pushed to a connection's actor for delivery.
#[derive(Message)]
#[rtype(result = "()")]
pub struct OutboundText(pub String);
