//! End-to-end tests for friend games: HTTP in, published events out.

mod common;

use serde_json::{json, Value};

const WHITE: i64 = 1;
const BLACK: i64 = 2;

fn mv(friend: i64, start: &str, end: &str) -> Value {
    json!({ "friendId": friend, "startPos": start, "newPos": end })
}

/// Index of a square in the snapshot's a1..h8 list.
fn idx(square: &str) -> usize {
    let bytes = square.as_bytes();
    (bytes[1] - b'1') as usize * 8 + (bytes[0] - b'a') as usize
}

#[tokio::test]
async fn relationship_42_scenario() {
    let app = common::spawn().await;
    app.relationships.befriend(42, WHITE, BLACK);
    let mut events = app.subscribe("game_42_channel");

    // ── Start ───────────────────────────────────────────────────────
    let resp = app.create_game(WHITE, BLACK).await;
    assert_eq!(resp.status(), 201);
    let game: Value = resp.json().await.unwrap();
    assert_eq!(game["white"], WHITE);
    assert_eq!(game["black"], BLACK);
    assert_eq!(game["status"], "active");
    assert_eq!(game["relationshipId"], 42);
    assert_eq!(game["playerData"]["turn"], "white");

    assert_eq!(common::next_event(&mut events).await, json!({ "newGame": true }));

    // ── White plays e2-e4 ───────────────────────────────────────────
    let resp = app.make_move(WHITE, mv(BLACK, "e2", "e4")).await;
    assert_eq!(resp.status(), 200);
    let report: Value = resp.json().await.unwrap();
    assert_eq!(report["applied"], true);

    let event = common::next_event(&mut events).await;
    assert_eq!(event["newGame"], false);
    assert_eq!(event["moveInfo"], json!(["e2", "e4", null]));
    let squares = &event["playerData"]["squares"];
    assert_eq!(squares[idx("e4")], json!({ "color": "white", "kind": "pawn" }));
    assert_eq!(squares[idx("e2")], Value::Null);
    assert_eq!(event["playerData"]["turn"], "black");
    assert_eq!(event["playerData"], report["playerData"]);

    // ── White tries again out of turn ──────────────────────────────
    let resp = app.make_move(WHITE, mv(BLACK, "e7", "e5")).await;
    assert_eq!(resp.status(), 200);
    let rejected: Value = resp.json().await.unwrap();
    assert_eq!(rejected["applied"], false);

    let event = common::next_event(&mut events).await;
    assert_eq!(event["moveInfo"], json!(["e7", "e5", null]));
    assert_eq!(event["playerData"], report["playerData"]);
}

#[tokio::test]
async fn both_players_see_the_same_game() {
    let app = common::spawn().await;
    app.relationships.befriend(7, WHITE, BLACK);
    app.create_game(WHITE, BLACK).await;
    app.make_move(WHITE, mv(BLACK, "g1", "f3")).await;
    app.make_move(BLACK, mv(WHITE, "d7", "d5")).await;

    let from_white: Value = app.show_game(WHITE, BLACK).await.json().await.unwrap();
    let from_black: Value = app.show_game(BLACK, WHITE).await.json().await.unwrap();
    assert_eq!(from_white, from_black);
    assert_eq!(
        from_white["playerData"]["placement"],
        "rnbqkbnr/ppp1pppp/8/3p4/8/5N2/PPPPPPPP/RNBQKB1R"
    );
    assert_eq!(from_white["playerData"]["turn"], "white");
}

#[tokio::test]
async fn reset_starts_over_with_the_requester_as_white() {
    let app = common::spawn().await;
    app.relationships.befriend(3, WHITE, BLACK);
    let mut invites = app.subscribe(&format!("status_{WHITE}_channel"));

    let first: Value = app.create_game(WHITE, BLACK).await.json().await.unwrap();
    app.make_move(WHITE, mv(BLACK, "e2", "e4")).await;

    let second: Value = app.create_game(BLACK, WHITE).await.json().await.unwrap();
    assert_ne!(first["id"], second["id"]);
    assert_eq!(second["white"], BLACK);
    assert_eq!(
        second["playerData"]["placement"],
        "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR"
    );
    assert_eq!(app.store.len(), 1);

    let invite = common::next_event(&mut invites).await;
    assert_eq!(invite, json!({ "gameId": second["id"], "from": BLACK, "relationshipId": 3 }));

    // Player 1 is black now and must wait.
    let report: Value = app
        .make_move(WHITE, mv(BLACK, "e7", "e5"))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(report["applied"], false);
}

#[tokio::test]
async fn promotion_is_applied_from_the_request() {
    let app = common::spawn().await;
    app.relationships.befriend(9, WHITE, BLACK);
    let game: Value = app.create_game(WHITE, BLACK).await.json().await.unwrap();

    let mut record = app.store_record(WHITE, BLACK).await;
    assert_eq!(json!(record.id), game["id"]);
    record.board = "4k3/P7/8/8/8/8/8/4K3".into();
    app.store.put(record);

    let mut body = mv(BLACK, "a7", "a8");
    body["promotion"] = json!("queen");
    let report: Value = app.make_move(WHITE, body).await.json().await.unwrap();
    assert_eq!(report["applied"], true);
    assert_eq!(
        report["playerData"]["squares"][idx("a8")],
        json!({ "color": "white", "kind": "queen" })
    );

    let reply = mv(WHITE, "e8", "e7");
    let report: Value = app.make_move(BLACK, reply).await.json().await.unwrap();
    assert_eq!(report["applied"], true);
}

#[tokio::test]
async fn unreadable_squares_are_echoed_but_not_applied() {
    let app = common::spawn().await;
    app.relationships.befriend(11, WHITE, BLACK);
    app.create_game(WHITE, BLACK).await;
    let mut events = app.subscribe("game_11_channel");

    let report: Value = app
        .make_move(WHITE, mv(BLACK, "e2", "i9"))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(report["applied"], false);
    assert!(report["rejection"].is_string());

    let event = common::next_event(&mut events).await;
    assert_eq!(event["moveInfo"], json!(["e2", "i9", null]));
    assert_eq!(event["playerData"]["turn"], "white");
}

#[tokio::test]
async fn strangers_and_missing_games_are_not_found() {
    let app = common::spawn().await;
    app.relationships.insert(5, WHITE, BLACK, false);

    assert_eq!(app.create_game(WHITE, BLACK).await.status(), 404);
    assert_eq!(app.create_game(WHITE, 99).await.status(), 404);

    app.relationships.befriend(6, WHITE, 3);
    assert_eq!(app.show_game(WHITE, 3).await.status(), 404);
    let resp = app.make_move(WHITE, mv(3, "e2", "e4")).await;
    assert_eq!(resp.status(), 404);
    let body: Value = resp.json().await.unwrap();
    assert!(body["detail"].is_string());
}

#[tokio::test]
async fn self_games_are_bad_requests() {
    let app = common::spawn().await;
    assert_eq!(app.create_game(WHITE, WHITE).await.status(), 400);
}

#[tokio::test]
async fn requests_without_a_token_are_unauthorized() {
    let app = common::spawn().await;
    let resp = app
        .client()
        .post(app.url("/api/chessgames"))
        .json(&json!({ "friendId": BLACK }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);

    let resp = app
        .client()
        .get(app.url("/api/chessgames/2"))
        .bearer_auth("not-a-token")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
}

#[tokio::test]
async fn health_is_public() {
    let app = common::spawn().await;
    let resp = app.client().get(app.url("/health")).send().await.unwrap();
    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn simultaneous_moves_apply_once() {
    let app = common::spawn().await;
    app.relationships.befriend(13, WHITE, BLACK);
    app.create_game(WHITE, BLACK).await;

    let (a, b, c) = tokio::join!(
        app.make_move(WHITE, mv(BLACK, "e2", "e4")),
        app.make_move(WHITE, mv(BLACK, "d2", "d4")),
        app.make_move(WHITE, mv(BLACK, "c2", "c4")),
    );

    let mut applied = 0;
    for resp in [a, b, c] {
        let report: Value = resp.json().await.unwrap();
        if report["applied"] == true {
            applied += 1;
        }
    }
    assert_eq!(applied, 1);

    let game: Value = app.show_game(BLACK, WHITE).await.json().await.unwrap();
    assert_eq!(game["playerData"]["turn"], "black");
}

#[tokio::test]
async fn check_safety_can_be_switched_on() {
    let config = server::config::Config {
        check_safety: true,
        ..Default::default()
    };
    let app = common::spawn_with(config).await;
    app.relationships.befriend(17, WHITE, BLACK);
    app.create_game(WHITE, BLACK).await;

    let mut record = app.store_record(WHITE, BLACK).await;
    record.board = "4r1k1/8/8/8/8/8/4B3/4K3".into();
    app.store.put(record);

    let report: Value = app
        .make_move(WHITE, mv(BLACK, "e2", "d3"))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(report["applied"], false);
}
