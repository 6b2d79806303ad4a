use actix::{ActorContext, AsyncContext};
use actix_web_actors::ws;
use log::{debug, info, warn};
use std::time::Instant;

use crate::game::{Phase, RulesEngine};
use crate::models::{decode, Envelope, Inbound, Seat};
use crate::websocket::PlayerSocket;

impl<R: RulesEngine> PlayerSocket<R> {
    pub fn handle_text(&mut self, text: &str, ctx: &mut ws::WebsocketContext<Self>) {
        let inbound = decode(text);

        // The first frame always registers the session. Anything other than a
        // join is consumed by the registration.
        if self.seat.is_none() {
            match inbound {
                Inbound::Message(Envelope::Join(join)) => self.handle_join(join.name, ctx),
                other => {
                    debug!("First message from {} was not a join: {:?}", self.id, other);
                    self.handle_join(None, ctx);
                }
            }
            return;
        }

        match inbound {
            Inbound::Message(Envelope::Chat(chat)) => self.handle_chat(chat.text),
            Inbound::Message(Envelope::Move(mv)) => self.handle_move(&mv.mv, ctx),
            Inbound::Message(envelope) => {
                warn!(
                    "Ignoring {} message from {} ({})",
                    envelope.kind(),
                    self.name,
                    self.id
                );
            }
            Inbound::Unrecognized { kind, raw } => {
                debug!("Relaying unrecognized {} message from {}", kind, self.id);
                self.app_state.registry().broadcast_raw(&raw, Some(self.id.as_str()));
            }
            Inbound::Invalid(e) => {
                warn!("Error parsing message from {:?} ({}): {}", self.peer, self.id, e);
            }
        }
    }

    pub fn handle_join(&mut self, name: Option<String>, ctx: &mut ws::WebsocketContext<Self>) {
        let registration = {
            let mut registry = self.app_state.registry();
            let name = name
                .map(|n| n.trim().to_string())
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| registry.default_name());
            self.name = name.clone();
            registry.register(self.id.clone(), ctx.address().recipient(), self.peer, name)
        };

        let registration = match registration {
            Ok(registration) => registration,
            Err(e) => {
                self.reply(&Envelope::error(e.to_string()), ctx);
                ctx.close(None);
                ctx.stop();
                return;
            }
        };

        self.seat = Some(registration.seat);
        self.reply(&Envelope::color(registration.seat), ctx);

        if registration.seats_filled {
            let mut game = self.app_state.game();
            let snapshot = game.seat_filled(Instant::now());
            self.app_state.registry().broadcast(&Envelope::board(snapshot), None);
        } else if registration.seat == Seat::Spectator {
            // Late spectators get the current board right away.
            let snapshot = {
                let game = self.app_state.game();
                if game.phase() == Phase::WaitingForPlayers {
                    None
                } else {
                    Some(game.snapshot(game.history().last().cloned()))
                }
            };
            if let Some(snapshot) = snapshot {
                self.reply(&Envelope::board(snapshot), ctx);
            }
        }
    }

    pub fn handle_chat(&mut self, text: String) {
        info!("{}: {}", self.name, text);
        let chat = Envelope::chat(self.name.clone(), text);
        self.app_state.registry().broadcast(&chat, Some(self.id.as_str()));
    }

    pub fn handle_move(&mut self, mv: &str, ctx: &mut ws::WebsocketContext<Self>) {
        let Some(seat) = self.seat else {
            return;
        };

        // Turn check, clock, legality, apply and the board broadcast all
        // happen under the game lock, so snapshots are queued in move order.
        let result = {
            let mut game = self.app_state.game();
            let result = game.submit_move(seat, mv, Instant::now());
            if let Ok(outcome) = &result {
                let board = Envelope::board(outcome.snapshot().clone());
                self.app_state.registry().broadcast(&board, None);
            }
            result
        };

        match result {
            Ok(_) => info!("Move {} accepted from {} ({})", mv, self.name, seat),
            Err(e) => {
                info!("Rejected move {:?} from {} ({}): {}", mv, self.name, seat, e);
                self.reply(&Envelope::error(e.to_string()), ctx);
            }
        }
    }
}
