use actix::*;
use actix_web::{web, Error, HttpRequest, HttpResponse};
use actix_web_actors::ws;
use log::{info, warn};
use std::net::SocketAddr;
use std::time::{Duration, Instant};
use uuid::Uuid;

use crate::game::RulesEngine;
use crate::models::{encode, AppState, Envelope, OutboundText, Seat};

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(5);
const CLIENT_TIMEOUT: Duration = Duration::from_secs(30);

/// One actor per WebSocket connection.
pub struct PlayerSocket<R: RulesEngine> {
    pub id: String,
    pub peer: Option<SocketAddr>,
    pub app_state: web::Data<AppState<R>>,
    /// Set once the session has joined.
    pub seat: Option<Seat>,
    pub name: String,
    last_heartbeat: Instant,
}

impl<R: RulesEngine> PlayerSocket<R> {
    pub fn new(id: String, peer: Option<SocketAddr>, app_state: web::Data<AppState<R>>) -> Self {
        Self {
            id,
            peer,
            app_state,
            seat: None,
            name: String::new(),
            last_heartbeat: Instant::now(),
        }
    }

    /// Send directly on this connection, bypassing the registry.
    pub fn reply(&self, envelope: &Envelope, ctx: &mut ws::WebsocketContext<Self>) {
        match encode(envelope) {
            Ok(text) => ctx.text(text),
            Err(e) => warn!("Failed to serialize {} message: {}", envelope.kind(), e),
        }
    }

    fn heartbeat(&self, ctx: &mut ws::WebsocketContext<Self>) {
        ctx.run_interval(HEARTBEAT_INTERVAL, |act, ctx: &mut ws::WebsocketContext<Self>| {
            if Instant::now().duration_since(act.last_heartbeat) > CLIENT_TIMEOUT {
                warn!("Heartbeat timed out for {}, disconnecting", act.id);
                ctx.stop();
                return;
            }
            ctx.ping(b"");
        });
    }
}

impl<R: RulesEngine> Actor for PlayerSocket<R> {
    type Context = ws::WebsocketContext<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        self.heartbeat(ctx);
        info!("Client connected: {} from {:?}", self.id, self.peer);
    }

    fn stopping(&mut self, _: &mut Self::Context) -> Running {
        if self.seat.take().is_some() {
            self.app_state.registry().unregister(&self.id);
        }
        info!("Client disconnected: {} from {:?}", self.id, self.peer);
        Running::Stop
    }
}

impl<R: RulesEngine> Handler<OutboundText> for PlayerSocket<R> {
    type Result = ();

    fn handle(&mut self, msg: OutboundText, ctx: &mut Self::Context) {
        ctx.text(msg.0);
    }
}

impl<R: RulesEngine> StreamHandler<Result<ws::Message, ws::ProtocolError>> for PlayerSocket<R> {
    fn handle(&mut self, msg: Result<ws::Message, ws::ProtocolError>, ctx: &mut Self::Context) {
        match msg {
            Ok(ws::Message::Ping(msg)) => {
                self.last_heartbeat = Instant::now();
                ctx.pong(&msg);
            }
            Ok(ws::Message::Pong(_)) => {
                self.last_heartbeat = Instant::now();
            }
            Ok(ws::Message::Text(text)) => {
                self.last_heartbeat = Instant::now();
                self.handle_text(&text, ctx);
            }
            Ok(ws::Message::Binary(_)) => {
                warn!("Binary messages are not supported ({})", self.id);
                self.reply(&Envelope::error("Binary messages are not supported"), ctx);
            }
            Ok(ws::Message::Close(reason)) => {
                info!("Connection closed: {:?}", reason);
                ctx.close(reason);
                ctx.stop();
            }
            Ok(ws::Message::Continuation(_)) | Ok(ws::Message::Nop) => {}
            Err(e) => {
                warn!("WebSocket protocol error from {}: {}", self.id, e);
                ctx.stop();
            }
        }
    }
}

/// Upgrade `/ws` requests to a `PlayerSocket`.
pub async fn ws_index<R: RulesEngine>(
    req: HttpRequest,
    stream: web::Payload,
    app_state: web::Data<AppState<R>>,
) -> Result<HttpResponse, Error> {
    let id = Uuid::new_v4().to_string();
    let peer = req.peer_addr();
    info!("New WebSocket connection {} from {:?}", id, peer);

    ws::start(PlayerSocket::new(id, peer, app_state), &req, stream)
}
