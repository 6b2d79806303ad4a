use actix::Actor;
use actix_web::{web, App};
use actix_web_actors::ws;
use futures::{Sink, SinkExt, Stream, StreamExt};
use serde_json::{json, Value};
use std::fmt::Debug;
use std::time::Duration;

use chess_table_server::config::ServerConfig;
use chess_table_server::game::ChessRules;
use chess_table_server::models::{AppState, Color};
use chess_table_server::routes::configure_routes;
use chess_table_server::websocket::ClockWatch;

fn server(config: ServerConfig) -> (actix_test::TestServer, web::Data<AppState<ChessRules>>) {
    let state = web::Data::new(AppState::new(ChessRules, config));
    let app_state = state.clone();
    let srv = actix_test::start(move || {
        App::new()
            .app_data(app_state.clone())
            .configure(configure_routes::<ChessRules>)
    });
    (srv, state)
}

async fn send<S>(conn: &mut S, message: Value)
where
    S: Sink<ws::Message> + Unpin,
    S::Error: Debug,
{
    conn.send(ws::Message::Text(message.to_string().into()))
        .await
        .unwrap();
}

/// Next text frame as JSON, skipping heartbeat pings.
async fn recv<S>(conn: &mut S) -> Value
where
    S: Stream<Item = Result<ws::Frame, ws::ProtocolError>> + Unpin,
{
    loop {
        let frame = actix_rt::time::timeout(Duration::from_secs(5), conn.next())
            .await
            .expect("timed out waiting for a frame")
            .expect("connection closed")
            .unwrap();
        match frame {
            ws::Frame::Text(bytes) => return serde_json::from_slice(&bytes).unwrap(),
            ws::Frame::Ping(_) | ws::Frame::Pong(_) => continue,
            other => panic!("unexpected frame {:?}", other),
        }
    }
}

async fn recv_type<S>(conn: &mut S, kind: &str) -> Value
where
    S: Stream<Item = Result<ws::Frame, ws::ProtocolError>> + Unpin,
{
    let message = recv(conn).await;
    assert_eq!(message["type"], kind, "unexpected message {}", message);
    message["content"].clone()
}

fn join(name: &str) -> Value {
    json!({"type": "join", "content": {"name": name}})
}

fn mv(notation: &str) -> Value {
    json!({"type": "move", "content": {"move": notation}})
}

#[actix_rt::test]
async fn two_players_and_a_spectator() {
    let (mut srv, _state) = server(ServerConfig::default());

    let mut alice = srv.ws_at("/ws").await.unwrap();
    send(&mut alice, join("alice")).await;
    assert_eq!(recv_type(&mut alice, "color").await, json!({"color": "white"}));

    let mut bob = srv.ws_at("/ws").await.unwrap();
    send(&mut bob, join("bob")).await;
    assert_eq!(recv_type(&mut bob, "color").await, json!({"color": "black"}));

    for conn in [&mut alice, &mut bob] {
        let board = recv_type(conn, "board").await;
        assert_eq!(board["turn"], "white");
        assert_eq!(board["history"], json!([]));
        assert_eq!(board["game_over"], false);
        assert_eq!(board["both_connected"], true);
        assert_eq!(board["player_times"], json!({"white": 300.0, "black": 300.0}));
    }

    let mut carol = srv.ws_at("/ws").await.unwrap();
    send(&mut carol, join("carol")).await;
    assert_eq!(recv_type(&mut carol, "color").await, json!({"color": "spectator"}));
    assert_eq!(recv_type(&mut carol, "board").await["turn"], "white");

    // Black and the spectator cannot move for white.
    send(&mut bob, mv("e7e5")).await;
    assert_eq!(
        recv_type(&mut bob, "error").await["text"],
        "Not your turn or wrong color."
    );
    send(&mut carol, mv("e2e4")).await;
    assert_eq!(
        recv_type(&mut carol, "error").await["text"],
        "Not your turn or wrong color."
    );

    send(&mut alice, mv("e2e5")).await;
    assert_eq!(recv_type(&mut alice, "error").await["text"], "Illegal move: e2e5");

    send(&mut alice, mv("e2e4")).await;
    for conn in [&mut alice, &mut bob, &mut carol] {
        let board = recv_type(conn, "board").await;
        assert_eq!(board["move"], "e2e4");
        assert_eq!(board["turn"], "black");
        assert_eq!(board["history"], json!(["e2e4"]));
        assert_eq!(board["game_over"], false);
        assert_eq!(board["winner"], Value::Null);
    }

    send(&mut bob, mv("e7e5")).await;
    for conn in [&mut alice, &mut bob, &mut carol] {
        let board = recv_type(conn, "board").await;
        assert_eq!(board["turn"], "white");
        assert_eq!(board["history"], json!(["e2e4", "e7e5"]));
    }
}

#[actix_rt::test]
async fn chat_and_unknown_messages_are_relayed() {
    let (mut srv, _state) = server(ServerConfig::default());

    let mut alice = srv.ws_at("/ws").await.unwrap();
    send(&mut alice, join("alice")).await;
    recv_type(&mut alice, "color").await;

    let mut bob = srv.ws_at("/ws").await.unwrap();
    send(&mut bob, join("bob")).await;
    recv_type(&mut bob, "color").await;
    recv_type(&mut alice, "board").await;
    recv_type(&mut bob, "board").await;

    send(&mut alice, json!({"type": "chat", "content": {"text": "good luck"}})).await;
    assert_eq!(
        recv_type(&mut bob, "chat").await,
        json!({"sender": "alice", "text": "good luck"})
    );

    let emote = json!({"type": "emote", "content": {"kind": "wave"}});
    send(&mut bob, emote.clone()).await;
    assert_eq!(recv(&mut alice).await, emote);

    // Malformed input is dropped and the connection stays usable.
    bob.send(ws::Message::Text("not json".into())).await.unwrap();
    send(&mut bob, json!({"type": "chat", "content": {"text": "still here"}})).await;
    assert_eq!(recv_type(&mut alice, "chat").await["text"], "still here");
}

#[actix_rt::test]
async fn first_message_without_join_gets_default_name() {
    let (mut srv, _state) = server(ServerConfig::default());

    let mut first = srv.ws_at("/ws").await.unwrap();
    send(&mut first, json!({"type": "chat", "content": {"text": "hello?"}})).await;
    assert_eq!(recv_type(&mut first, "color").await, json!({"color": "white"}));

    let mut second = srv.ws_at("/ws").await.unwrap();
    send(&mut second, json!({"type": "join", "content": {}})).await;
    recv_type(&mut second, "color").await;
    recv_type(&mut first, "board").await;
    recv_type(&mut second, "board").await;

    send(&mut first, json!({"type": "chat", "content": {"text": "hi"}})).await;
    assert_eq!(recv_type(&mut second, "chat").await["sender"], "Player_1");
}

#[actix_rt::test]
async fn moves_rejected_until_opponent_joins() {
    let (mut srv, _state) = server(ServerConfig::default());

    let mut alice = srv.ws_at("/ws").await.unwrap();
    send(&mut alice, join("alice")).await;
    recv_type(&mut alice, "color").await;

    send(&mut alice, mv("e2e4")).await;
    assert_eq!(
        recv_type(&mut alice, "error").await["text"],
        "Waiting for an opponent to join."
    );
}

#[actix_rt::test]
async fn spectator_limit_refuses_extra_clients() {
    let config = ServerConfig {
        max_spectators: Some(0),
        ..ServerConfig::default()
    };
    let (mut srv, state) = server(config);

    let mut alice = srv.ws_at("/ws").await.unwrap();
    send(&mut alice, join("alice")).await;
    recv_type(&mut alice, "color").await;
    let mut bob = srv.ws_at("/ws").await.unwrap();
    send(&mut bob, join("bob")).await;
    recv_type(&mut bob, "color").await;

    let mut carol = srv.ws_at("/ws").await.unwrap();
    send(&mut carol, join("carol")).await;
    assert_eq!(
        recv_type(&mut carol, "error").await["text"],
        "Game is full. Only 0 spectators allowed."
    );
    assert_eq!(state.registry().len(), 2);
}

#[actix_rt::test]
async fn white_flags_on_late_move() {
    let config = ServerConfig {
        clock_seconds: 0.2,
        ..ServerConfig::default()
    };
    let (mut srv, state) = server(config);

    let mut alice = srv.ws_at("/ws").await.unwrap();
    send(&mut alice, join("alice")).await;
    recv_type(&mut alice, "color").await;
    let mut bob = srv.ws_at("/ws").await.unwrap();
    send(&mut bob, join("bob")).await;
    recv_type(&mut bob, "color").await;
    recv_type(&mut alice, "board").await;
    recv_type(&mut bob, "board").await;

    actix_rt::time::sleep(Duration::from_millis(400)).await;
    send(&mut alice, mv("e2e4")).await;

    for conn in [&mut alice, &mut bob] {
        let board = recv_type(conn, "board").await;
        assert_eq!(board["game_over"], true);
        assert_eq!(board["winner"], "black");
        assert_eq!(board["history"], json!([]));
    }
    assert_eq!(state.game().clock().active(), None);

    send(&mut bob, mv("e7e5")).await;
    assert_eq!(recv_type(&mut bob, "error").await["text"], "Game is over.");
}

#[actix_rt::test]
async fn flag_sweep_ends_idle_game() {
    let config = ServerConfig {
        clock_seconds: 0.2,
        ..ServerConfig::default()
    };
    let (mut srv, state) = server(config);
    ClockWatch::new(state.clone(), Duration::from_millis(50)).start();

    let mut alice = srv.ws_at("/ws").await.unwrap();
    send(&mut alice, join("alice")).await;
    recv_type(&mut alice, "color").await;
    let mut bob = srv.ws_at("/ws").await.unwrap();
    send(&mut bob, join("bob")).await;
    recv_type(&mut bob, "color").await;
    recv_type(&mut bob, "board").await;

    let board = recv_type(&mut bob, "board").await;
    assert_eq!(board["game_over"], true);
    assert_eq!(board["winner"], "black");
}

#[actix_rt::test]
async fn disconnect_frees_seat_without_restarting_clock() {
    let (mut srv, state) = server(ServerConfig::default());

    let mut alice = srv.ws_at("/ws").await.unwrap();
    send(&mut alice, join("alice")).await;
    recv_type(&mut alice, "color").await;
    let mut bob = srv.ws_at("/ws").await.unwrap();
    send(&mut bob, join("bob")).await;
    recv_type(&mut bob, "color").await;
    recv_type(&mut alice, "board").await;
    recv_type(&mut bob, "board").await;

    actix_rt::time::sleep(Duration::from_millis(20)).await;
    send(&mut alice, mv("e2e4")).await;
    recv_type(&mut alice, "board").await;
    recv_type(&mut bob, "board").await;

    bob.send(ws::Message::Close(None)).await.unwrap();
    drop(bob);

    let mut remaining = state.registry().len();
    for _ in 0..50 {
        if remaining == 1 {
            break;
        }
        actix_rt::time::sleep(Duration::from_millis(20)).await;
        remaining = state.registry().len();
    }
    assert_eq!(remaining, 1);

    let mut carol = srv.ws_at("/ws").await.unwrap();
    send(&mut carol, join("carol")).await;
    assert_eq!(recv_type(&mut carol, "color").await, json!({"color": "black"}));

    let board = recv_type(&mut carol, "board").await;
    assert_eq!(board["both_connected"], true);
    assert_eq!(board["history"], json!(["e2e4"]));
    assert_eq!(board["turn"], "black");
    assert!(board["player_times"]["white"].as_f64().unwrap() < 300.0);
    assert_eq!(board["player_times"]["black"], 300.0);
    assert_eq!(state.game().clock().active(), Some(Color::Black));
}

#[actix_rt::test]
async fn boards_arrive_in_move_order() {
    let (mut srv, state) = server(ServerConfig::default());

    let mut alice = srv.ws_at("/ws").await.unwrap();
    send(&mut alice, join("alice")).await;
    recv_type(&mut alice, "color").await;
    let mut bob = srv.ws_at("/ws").await.unwrap();
    send(&mut bob, join("bob")).await;
    recv_type(&mut bob, "color").await;
    recv_type(&mut alice, "board").await;
    recv_type(&mut bob, "board").await;

    // Black answers without waiting for white's board.
    send(&mut alice, mv("e2e4")).await;
    send(&mut bob, mv("e7e5")).await;

    let mut last_len = 0;
    let mut rejected = false;
    while last_len < 2 && !(last_len == 1 && rejected) {
        let message = recv(&mut bob).await;
        match message["type"].as_str() {
            Some("board") => {
                let len = message["content"]["history"].as_array().unwrap().len();
                assert!(len > last_len, "board went backwards: {}", message);
                last_len = len;
            }
            Some("error") => rejected = true,
            _ => panic!("unexpected message {}", message),
        }
    }

    let played = state.game().history().len();
    assert_eq!(recv_type(&mut alice, "board").await["history"], json!(["e2e4"]));
    if played == 2 {
        assert_eq!(
            recv_type(&mut alice, "board").await["history"],
            json!(["e2e4", "e7e5"])
        );
    }
}
