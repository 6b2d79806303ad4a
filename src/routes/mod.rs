use actix_web::{web, HttpResponse, Responder};
use std::time::Instant;

use crate::game::RulesEngine;
use crate::models::AppState;
use crate::websocket::ws_index;

/// HTTP handler for the index page
pub async fn index() -> impl Responder {
    HttpResponse::Ok().body("Chess table server")
}

/// Current board with a live clock readout.
pub async fn board<R: RulesEngine>(app_state: web::Data<AppState<R>>) -> impl Responder {
    let snapshot = app_state.game().live_snapshot(Instant::now());
    HttpResponse::Ok().json(snapshot)
}

/// Configure the HTTP routes
pub fn configure_routes<R: RulesEngine>(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/ws").route(web::get().to(ws_index::<R>)))
        .service(web::resource("/board").route(web::get().to(board::<R>)))
        .service(web::resource("/").route(web::get().to(index)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use crate::game::ChessRules;
    use crate::models::BoardSnapshot;
    use actix_web::{test, App};

    #[actix_rt::test]
    async fn board_route_returns_snapshot() {
        let state = web::Data::new(AppState::new(ChessRules, ServerConfig::default()));
        let app = test::init_service(
            App::new()
                .app_data(state.clone())
                .configure(configure_routes::<ChessRules>),
        )
        .await;

        let req = test::TestRequest::get().uri("/board").to_request();
        let snapshot: BoardSnapshot = test::call_and_read_body_json(&app, req).await;
        assert!(snapshot.fen.starts_with("rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w"));
        assert!(snapshot.history.is_empty());
        assert!(!snapshot.game_over);
        assert_eq!(snapshot.player_times.white, 300.0);
    }

    #[actix_rt::test]
    async fn index_route() {
        let app = test::init_service(App::new().configure(configure_routes::<ChessRules>)).await;
        let req = test::TestRequest::get().uri("/").to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());
    }
}
