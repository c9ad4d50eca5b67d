mod common;

use axum::http::StatusCode;
use common::{TestApp, days_from_now, spawn_app};
use serde_json::{Value, json};

async fn create_tournament(app: &TestApp, cookie: &str, body: Value) -> i64 {
    let response = app.post("/api/tournaments", Some(cookie), body).await;
    assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
    response.data()["id"].as_i64().unwrap()
}

fn tournament_body(max_participants: i32) -> Value {
    json!({
        "title": "Spring Cup",
        "game": "Chess",
        "format": "swiss",
        "max_participants": max_participants,
        "start_date": days_from_now(7),
    })
}

async fn join(app: &TestApp, cookie: &str, id: i64) -> common::TestResponse {
    app.post(
        &format!("/api/tournaments/{id}"),
        Some(cookie),
        json!({"action": "join"}),
    )
    .await
}

#[tokio::test]
async fn test_create_requires_moderator() {
    let app = spawn_app().await;
    let (_, cookie) = app.register("player").await;

    let response = app
        .post("/api/tournaments", Some(&cookie), tournament_body(8))
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let anonymous = app.post("/api/tournaments", None, tournament_body(8)).await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_moderator_creates_upcoming_tournament() {
    let app = spawn_app().await;
    let admin = app.login_admin().await;
    let (mod_id, moderator) = app.register("organizer").await;
    app.set_role(&admin, mod_id, "moderator").await;

    let response = app
        .post("/api/tournaments", Some(&moderator), tournament_body(8))
        .await;
    assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);

    let data = response.data();
    assert_eq!(data["status"], "upcoming");
    assert_eq!(data["format"], "swiss");
    assert_eq!(data["organizer_id"], mod_id);
    assert_eq!(data["participant_count"], 0);
}

#[tokio::test]
async fn test_create_validation_messages() {
    let app = spawn_app().await;
    let admin = app.login_admin().await;

    let cases = [
        (
            json!({"title": "", "game": "Chess", "start_date": days_from_now(3)}),
            "Title and game are required",
        ),
        (
            json!({"title": "Cup", "game": "Chess", "start_date": days_from_now(-1)}),
            "Start date must be in the future",
        ),
        (
            json!({"title": "Cup", "game": "Chess", "start_date": "tomorrow"}),
            "Invalid start date",
        ),
        (
            json!({
                "title": "Cup",
                "game": "Chess",
                "start_date": days_from_now(3),
                "end_date": days_from_now(2),
            }),
            "End date must be after start date",
        ),
        (
            json!({
                "title": "Cup",
                "game": "Chess",
                "start_date": days_from_now(3),
                "registration_deadline": days_from_now(4),
            }),
            "Registration deadline must be before start date",
        ),
        (
            json!({"title": "Cup", "game": "Chess", "max_participants": 1, "start_date": days_from_now(3)}),
            "Max participants must be between 2 and 1024",
        ),
        (
            json!({"title": "Cup", "game": "Chess", "format": "ladder", "start_date": days_from_now(3)}),
            "Invalid format: ladder",
        ),
    ];

    for (body, expected) in cases {
        let response = app.post("/api/tournaments", Some(&admin), body).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{expected}");
        assert_eq!(response.error(), expected);
    }
}

#[tokio::test]
async fn test_join_and_leave() {
    let app = spawn_app().await;
    let admin = app.login_admin().await;
    let id = create_tournament(&app, &admin, tournament_body(4)).await;
    let (user_id, player) = app.register("player").await;

    let joined = join(&app, &player, id).await;
    assert_eq!(joined.status, StatusCode::OK, "{:?}", joined.body);
    assert_eq!(joined.data()["registered"], true);
    assert_eq!(joined.data()["participant_count"], 1);

    let detail = app
        .get(&format!("/api/tournaments/{id}"), Some(&player))
        .await;
    assert_eq!(detail.data()["is_registered"], true);
    assert_eq!(detail.data()["participants"][0]["user_id"], user_id);
    assert_eq!(detail.data()["participants"][0]["username"], "player");

    let again = join(&app, &player, id).await;
    assert_eq!(again.status, StatusCode::BAD_REQUEST);
    assert_eq!(again.error(), "Already registered for this tournament");

    let left = app
        .post(
            &format!("/api/tournaments/{id}"),
            Some(&player),
            json!({"action": "leave"}),
        )
        .await;
    assert_eq!(left.status, StatusCode::OK);
    assert_eq!(left.data()["registered"], false);
    assert_eq!(left.data()["participant_count"], 0);

    let left_again = app
        .post(
            &format!("/api/tournaments/{id}"),
            Some(&player),
            json!({"action": "leave"}),
        )
        .await;
    assert_eq!(left_again.status, StatusCode::BAD_REQUEST);
    assert_eq!(left_again.error(), "Not registered for this tournament");
}

#[tokio::test]
async fn test_invalid_action_and_unknown_tournament() {
    let app = spawn_app().await;
    let (_, player) = app.register("player").await;

    let missing = join(&app, &player, 9999).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);

    let admin = app.login_admin().await;
    let id = create_tournament(&app, &admin, tournament_body(4)).await;
    let invalid = app
        .post(
            &format!("/api/tournaments/{id}"),
            Some(&player),
            json!({"action": "withdraw"}),
        )
        .await;
    assert_eq!(invalid.status, StatusCode::BAD_REQUEST);
    assert_eq!(invalid.error(), "Invalid action");
}

#[tokio::test]
async fn test_full_tournament_rejects_join() {
    let app = spawn_app().await;
    let admin = app.login_admin().await;
    let id = create_tournament(&app, &admin, tournament_body(2)).await;

    for name in ["first", "second"] {
        let (_, cookie) = app.register(name).await;
        assert_eq!(join(&app, &cookie, id).await.status, StatusCode::OK);
    }

    let (_, late) = app.register("third").await;
    let response = join(&app, &late, id).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error(), "Tournament is full");
}

#[tokio::test]
async fn test_concurrent_joins_never_exceed_capacity() {
    let app = spawn_app().await;
    let admin = app.login_admin().await;
    let id = create_tournament(&app, &admin, tournament_body(3)).await;

    let mut cookies = Vec::new();
    for i in 0..8 {
        let (_, cookie) = app.register(&format!("racer{i}")).await;
        cookies.push(cookie);
    }

    let app = std::sync::Arc::new(app);
    let handles: Vec<_> = cookies
        .into_iter()
        .map(|cookie| {
            let app = app.clone();
            tokio::spawn(async move { join(&app, &cookie, id).await.status })
        })
        .collect();

    let mut accepted = 0;
    for handle in handles {
        let status = handle.await.unwrap();
        if status == StatusCode::OK {
            accepted += 1;
        } else {
            assert_eq!(status, StatusCode::BAD_REQUEST);
        }
    }
    assert_eq!(accepted, 3);

    let detail = app.get(&format!("/api/tournaments/{id}"), None).await;
    assert_eq!(detail.data()["participant_count"], 3);
    assert_eq!(detail.data()["participants"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_closed_registration() {
    let app = spawn_app().await;
    let admin = app.login_admin().await;
    let (_, player) = app.register("player").await;

    let past_deadline = create_tournament(
        &app,
        &admin,
        json!({
            "title": "Late Cup",
            "game": "Go",
            "start_date": days_from_now(5),
            "registration_deadline": days_from_now(-1),
        }),
    )
    .await;
    let response = join(&app, &player, past_deadline).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error(), "Registration deadline has passed");

    let running = create_tournament(&app, &admin, tournament_body(8)).await;
    let update = app
        .put(
            &format!("/api/tournaments/{running}"),
            Some(&admin),
            json!({"status": "active"}),
        )
        .await;
    assert_eq!(update.status, StatusCode::OK, "{:?}", update.body);
    assert_eq!(update.data()["status"], "active");

    let response = join(&app, &player, running).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error(), "Tournament is not open for registration");
}

#[tokio::test]
async fn test_update_rules() {
    let app = spawn_app().await;
    let admin = app.login_admin().await;
    let id = create_tournament(&app, &admin, tournament_body(4)).await;

    for name in ["a_player", "b_player", "c_player"] {
        let (_, cookie) = app.register(name).await;
        join(&app, &cookie, id).await;
    }

    let shrink = app
        .put(
            &format!("/api/tournaments/{id}"),
            Some(&admin),
            json!({"max_participants": 2}),
        )
        .await;
    assert_eq!(shrink.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        shrink.error(),
        "Max participants cannot be below the current participant count"
    );

    let (_, stranger) = app.register("stranger").await;
    let forbidden = app
        .put(
            &format!("/api/tournaments/{id}"),
            Some(&stranger),
            json!({"title": "Mine now"}),
        )
        .await;
    assert_eq!(forbidden.status, StatusCode::FORBIDDEN);

    let renamed = app
        .put(
            &format!("/api/tournaments/{id}"),
            Some(&admin),
            json!({"title": "Summer Cup", "end_date": days_from_now(9)}),
        )
        .await;
    assert_eq!(renamed.status, StatusCode::OK, "{:?}", renamed.body);
    assert_eq!(renamed.data()["title"], "Summer Cup");
    assert_eq!(renamed.data()["participant_count"], 3);
}

#[tokio::test]
async fn test_list_filters_and_delete() {
    let app = spawn_app().await;
    let admin = app.login_admin().await;
    let swiss = create_tournament(&app, &admin, tournament_body(4)).await;
    create_tournament(
        &app,
        &admin,
        json!({
            "title": "Robin Open",
            "game": "Go",
            "format": "round_robin",
            "start_date": days_from_now(10),
        }),
    )
    .await;

    let all = app.get("/api/tournaments", None).await;
    assert_eq!(all.data()["pagination"]["total"], 2);

    let filtered = app.get("/api/tournaments?format=round_robin", None).await;
    assert_eq!(filtered.data()["pagination"]["total"], 1);
    assert_eq!(filtered.data()["items"][0]["title"], "Robin Open");

    let searched = app.get("/api/tournaments?search=spring", None).await;
    assert_eq!(searched.data()["items"][0]["id"], swiss);

    let bad = app.get("/api/tournaments?status=paused", None).await;
    assert_eq!(bad.status, StatusCode::BAD_REQUEST);

    let deleted = app
        .delete(&format!("/api/tournaments/{swiss}"), Some(&admin))
        .await;
    assert_eq!(deleted.status, StatusCode::OK);

    let gone = app.get(&format!("/api/tournaments/{swiss}"), None).await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
}
