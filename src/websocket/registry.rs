use actix::Recipient;
use log::{debug, info, warn};
use std::net::SocketAddr;

use crate::error::GameError;
use crate::models::{encode, Envelope, OutboundText, Seat, Session};

/// What a successful join produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Registration {
    pub seat: Seat,
    /// This join took the second player seat.
    pub seats_filled: bool,
}

/// Connected sessions and who holds which seat.
pub struct Registry {
    sessions: Vec<Session>,
    max_spectators: Option<usize>,
}

impl Registry {
    pub fn new(max_spectators: Option<usize>) -> Self {
        Self {
            sessions: Vec::new(),
            max_spectators,
        }
    }

    pub fn register(
        &mut self,
        id: String,
        addr: Recipient<OutboundText>,
        peer: Option<SocketAddr>,
        name: String,
    ) -> Result<Registration, GameError> {
        let seat = if self.holder(Seat::White).is_none() {
            Seat::White
        } else if self.holder(Seat::Black).is_none() {
            Seat::Black
        } else {
            Seat::Spectator
        };

        if seat == Seat::Spectator {
            if let Some(cap) = self.max_spectators {
                if self.spectator_count() >= cap {
                    warn!("Refusing {} ({}): spectator limit {} reached", name, id, cap);
                    return Err(GameError::SeatFull(cap));
                }
            }
        }

        info!("Assigned {} ({}) as {}", name, id, seat);
        self.sessions.push(Session {
            id,
            addr,
            peer,
            name,
            seat,
        });

        let seats_filled = seat.is_player()
            && self.holder(Seat::White).is_some()
            && self.holder(Seat::Black).is_some();
        Ok(Registration { seat, seats_filled })
    }

    /// Drops the session. Its seat becomes free; nothing else changes.
    pub fn unregister(&mut self, id: &str) -> Option<Session> {
        let index = self.sessions.iter().position(|s| s.id == id)?;
        let session = self.sessions.remove(index);
        info!(
            "Removed {} ({}) from seat {}, {} sessions remain",
            session.name,
            session.id,
            session.seat,
            self.sessions.len()
        );
        Some(session)
    }

    /// Sends to every session except `exclude`. Returns how many sends were
    /// queued; closed connections are logged and skipped.
    pub fn broadcast(&self, envelope: &Envelope, exclude: Option<&str>) -> usize {
        match encode(envelope) {
            Ok(text) => self.broadcast_raw(&text, exclude),
            Err(e) => {
                warn!("Error serializing {} message: {}", envelope.kind(), e);
                0
            }
        }
    }

    /// `do_send` ignores mailbox capacity, so a live session receives every
    /// message in order.
    pub fn broadcast_raw(&self, text: &str, exclude: Option<&str>) -> usize {
        let mut delivered = 0;
        for session in self.sessions.iter().filter(|s| Some(s.id.as_str()) != exclude) {
            if !session.addr.connected() {
                debug!("Skipping {} ({}): connection closed", session.name, session.id);
                continue;
            }
            session.addr.do_send(OutboundText(text.to_string()));
            delivered += 1;
        }
        delivered
    }

    pub fn holder(&self, seat: Seat) -> Option<&Session> {
        debug_assert!(seat.is_player());
        self.sessions.iter().find(|s| s.seat == seat)
    }

    pub fn spectator_count(&self) -> usize {
        self.sessions.iter().filter(|s| s.seat == Seat::Spectator).count()
    }

    /// Name given to clients that join without one.
    pub fn default_name(&self) -> String {
        format!("Player_{}", self.sessions.len() + 1)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
