use actix::{Actor, AsyncContext, Context};
use actix_web::web;
use std::time::{Duration, Instant};

use crate::game::RulesEngine;
use crate::models::{AppState, Envelope};

/// Periodically ends games whose running clock reached zero while the player
/// to move stayed silent. Only started when a sweep interval is configured;
/// otherwise a timeout is noticed on the next move submission.
pub struct ClockWatch<R: RulesEngine> {
    app_state: web::Data<AppState<R>>,
    interval: Duration,
}

impl<R: RulesEngine> ClockWatch<R> {
    pub fn new(app_state: web::Data<AppState<R>>, interval: Duration) -> Self {
        Self { app_state, interval }
    }

    fn sweep(&self) {
        let mut game = self.app_state.game();
        if let Some(snapshot) = game.check_flag(Instant::now()) {
            self.app_state.registry().broadcast(&Envelope::board(snapshot), None);
        }
    }
}

impl<R: RulesEngine> Actor for ClockWatch<R> {
    type Context = Context<Self>;

    fn started(&mut self, ctx: &mut Self::Context) {
        ctx.run_interval(self.interval, |act, _ctx: &mut Context<Self>| act.sweep());
    }
}
