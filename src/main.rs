use actix::Actor;
use actix_web::{web, App, HttpServer};
use log::info;

use chess_table_server::config::ServerConfig;
use chess_table_server::game::ChessRules;
use chess_table_server::models::AppState;
use chess_table_server::routes::configure_routes;
use chess_table_server::websocket::ClockWatch;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Initialize logger
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = ServerConfig::load().map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
    let bind_address = config.bind_address();
    let flag_sweep = config.flag_sweep();

    info!(
        "Starting chess table server at {} ({}s per side)",
        bind_address, config.clock_seconds
    );

    // Create shared application state
    let app_state = web::Data::new(AppState::new(ChessRules, config));

    if let Some(interval) = flag_sweep {
        info!("Flag sweep every {:?}", interval);
        ClockWatch::new(app_state.clone(), interval).start();
    }

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .configure(configure_routes::<ChessRules>)
    })
    .bind(bind_address)?
    .run()
    .await
}
