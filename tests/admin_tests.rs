mod common;

use axum::http::StatusCode;
use common::{days_from_now, spawn_app};
use serde_json::json;

#[tokio::test]
async fn test_admin_cannot_lock_themselves_out() {
    let app = spawn_app().await;
    let admin = app.login_admin().await;
    let me = app.get("/api/auth/me", Some(&admin)).await;
    let admin_id = me.data()["id"].as_i64().unwrap();

    let demote = app
        .patch(
            &format!("/api/users/{admin_id}/role"),
            Some(&admin),
            json!({"role": "user"}),
        )
        .await;
    assert_eq!(demote.status, StatusCode::BAD_REQUEST);
    assert_eq!(demote.error(), "You cannot remove your own admin role");

    let ban = app
        .patch(
            &format!("/api/users/{admin_id}/status"),
            Some(&admin),
            json!({"status": "suspended"}),
        )
        .await;
    assert_eq!(ban.error(), "You cannot ban or suspend yourself");

    let delete = app
        .delete(&format!("/api/users/{admin_id}"), Some(&admin))
        .await;
    assert_eq!(delete.error(), "You cannot delete your own account");
}

#[tokio::test]
async fn test_role_and_status_changes_require_admin() {
    let app = spawn_app().await;
    let admin = app.login_admin().await;
    let (user_id, user) = app.register("player").await;
    let (mod_id, moderator) = app.register("moderator").await;
    app.set_role(&admin, mod_id, "moderator").await;

    let self_promote = app
        .patch(
            &format!("/api/users/{user_id}/role"),
            Some(&user),
            json!({"role": "admin"}),
        )
        .await;
    assert_eq!(self_promote.status, StatusCode::FORBIDDEN);

    let moderator_bans = app
        .patch(
            &format!("/api/users/{user_id}/status"),
            Some(&moderator),
            json!({"status": "banned"}),
        )
        .await;
    assert_eq!(moderator_bans.status, StatusCode::FORBIDDEN);

    let invalid = app
        .patch(
            &format!("/api/users/{user_id}/role"),
            Some(&admin),
            json!({"role": "overlord"}),
        )
        .await;
    assert_eq!(invalid.status, StatusCode::BAD_REQUEST);
    assert_eq!(invalid.error(), "Invalid role: overlord");

    let suspended = app
        .patch(
            &format!("/api/users/{user_id}/status"),
            Some(&admin),
            json!({"status": "suspended"}),
        )
        .await;
    assert_eq!(suspended.status, StatusCode::OK);
    assert_eq!(suspended.data()["status"], "suspended");

    let me = app.get("/api/auth/me", Some(&user)).await;
    assert_eq!(me.status, StatusCode::FORBIDDEN);
    assert_eq!(me.error(), "Account is suspended");
}

#[tokio::test]
async fn test_email_visibility() {
    let app = spawn_app().await;
    let admin = app.login_admin().await;
    let (alice_id, alice) = app.register("alice").await;
    let (_, bob) = app.register("bob").await;

    let own = app.get(&format!("/api/users/{alice_id}"), Some(&alice)).await;
    assert_eq!(own.data()["email"], "alice@example.com");

    let other = app.get(&format!("/api/users/{alice_id}"), Some(&bob)).await;
    assert!(other.data().get("email").is_none_or(|v| v.is_null()));

    let anonymous = app.get(&format!("/api/users/{alice_id}"), None).await;
    assert!(anonymous.data().get("email").is_none_or(|v| v.is_null()));

    let by_admin = app.get("/api/users?search=alice", Some(&admin)).await;
    assert_eq!(by_admin.data()["items"][0]["email"], "alice@example.com");
}

#[tokio::test]
async fn test_profile_update() {
    let app = spawn_app().await;
    let (alice_id, alice) = app.register("alice").await;
    let (_, bob) = app.register("bob").await;

    let updated = app
        .put(
            &format!("/api/users/{alice_id}"),
            Some(&alice),
            json!({"display_name": "Alice A.", "bio": "Speedrunner"}),
        )
        .await;
    assert_eq!(updated.status, StatusCode::OK, "{:?}", updated.body);
    assert_eq!(updated.data()["display_name"], "Alice A.");
    assert_eq!(updated.data()["bio"], "Speedrunner");

    let too_long = app
        .put(
            &format!("/api/users/{alice_id}"),
            Some(&alice),
            json!({"display_name": "x".repeat(51)}),
        )
        .await;
    assert_eq!(too_long.status, StatusCode::BAD_REQUEST);

    let by_other = app
        .put(
            &format!("/api/users/{alice_id}"),
            Some(&bob),
            json!({"bio": "hacked"}),
        )
        .await;
    assert_eq!(by_other.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_delete_user_hands_over_tournaments() {
    let app = spawn_app().await;
    let admin = app.login_admin().await;
    let admin_id = app.get("/api/auth/me", Some(&admin)).await.data()["id"]
        .as_i64()
        .unwrap();

    let (organizer_id, organizer) = app.register("organizer").await;
    app.set_role(&admin, organizer_id, "moderator").await;

    let created = app
        .post(
            "/api/tournaments",
            Some(&organizer),
            json!({"title": "Cup", "game": "Chess", "start_date": days_from_now(3)}),
        )
        .await;
    let tournament_id = created.data()["id"].as_i64().unwrap();

    app.post(
        "/api/forum/posts",
        Some(&organizer),
        json!({"title": "Rules", "content": "Be nice"}),
    )
    .await;

    let deleted = app
        .delete(&format!("/api/users/{organizer_id}"), Some(&admin))
        .await;
    assert_eq!(deleted.status, StatusCode::OK, "{:?}", deleted.body);

    let gone = app.get(&format!("/api/users/{organizer_id}"), None).await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);

    let tournament = app
        .get(&format!("/api/tournaments/{tournament_id}"), None)
        .await;
    assert_eq!(tournament.data()["organizer_id"], admin_id);

    let posts = app
        .get(&format!("/api/forum/posts?author_id={organizer_id}"), None)
        .await;
    assert_eq!(posts.data()["pagination"]["total"], 0);

    let stale_session = app.get("/api/auth/me", Some(&organizer)).await;
    assert_eq!(stale_session.status, StatusCode::UNAUTHORIZED);

    let again = app
        .delete(&format!("/api/users/{organizer_id}"), Some(&admin))
        .await;
    assert_eq!(again.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_clan_owner_cannot_be_deleted() {
    let app = spawn_app().await;
    let admin = app.login_admin().await;
    let (owner_id, owner) = app.register("founder").await;

    app.post(
        "/api/clans",
        Some(&owner),
        json!({"name": "Night Owls", "tag": "OWL"}),
    )
    .await;

    let response = app
        .delete(&format!("/api/users/{owner_id}"), Some(&admin))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error(), "User owns a clan");
}

#[tokio::test]
async fn test_user_rankings() {
    let app = spawn_app().await;
    let admin = app.login_admin().await;
    let (alice_id, _) = app.register("alice").await;
    let (bob_id, _) = app.register("bob").await;
    let (eve_id, _) = app.register("eve").await;

    let stats = [
        (alice_id, json!({"points": 500, "wins": 3, "losses": 1, "xp": 2500})),
        (bob_id, json!({"points": 300, "wins": 1, "losses": 2, "xp": 4000})),
        (eve_id, json!({"points": 900})),
    ];
    for (id, body) in stats {
        let response = app
            .put(&format!("/api/rankings/users/{id}"), Some(&admin), body)
            .await;
        assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    }

    app.patch(
        &format!("/api/users/{eve_id}/status"),
        Some(&admin),
        json!({"status": "banned"}),
    )
    .await;

    let by_points = app.get("/api/rankings/users", None).await;
    let items = by_points.data()["items"].as_array().unwrap();
    assert_eq!(items[0]["id"], alice_id);
    assert_eq!(items[0]["rank"], 1);
    assert_eq!(items[0]["level"], 3);
    assert_eq!(items[0]["win_rate"], 75.0);
    assert_eq!(items[1]["id"], bob_id);
    assert_eq!(items[1]["rank"], 2);
    assert!(items.iter().all(|u| u["id"] != eve_id));

    let by_xp = app.get("/api/rankings/users?sort=xp", None).await;
    assert_eq!(by_xp.data()["items"][0]["id"], bob_id);
    assert_eq!(by_xp.data()["items"][0]["level"], 5);

    let second_page = app.get("/api/rankings/users?page=2&limit=1", None).await;
    assert_eq!(second_page.data()["items"][0]["rank"], 2);
    assert_eq!(second_page.data()["items"][0]["id"], bob_id);

    let invalid = app.get("/api/rankings/users?sort=karma", None).await;
    assert_eq!(invalid.status, StatusCode::BAD_REQUEST);
    assert_eq!(invalid.error(), "Invalid sort: karma");

    let negative = app
        .put(
            &format!("/api/rankings/users/{alice_id}"),
            Some(&admin),
            json!({"points": -1}),
        )
        .await;
    assert_eq!(negative.status, StatusCode::BAD_REQUEST);
    assert_eq!(negative.error(), "Points cannot be negative");
}

#[tokio::test]
async fn test_extreme_stats_keep_rankings_readable() {
    let app = spawn_app().await;
    let admin = app.login_admin().await;
    let (alice_id, alice) = app.register("alice").await;

    let updated = app
        .put(
            &format!("/api/rankings/users/{alice_id}"),
            Some(&admin),
            json!({"points": 10, "wins": i32::MAX, "losses": 1}),
        )
        .await;
    assert_eq!(updated.status, StatusCode::OK, "{:?}", updated.body);

    let rankings = app.get("/api/rankings/users", None).await;
    assert_eq!(rankings.status, StatusCode::OK);
    assert_eq!(rankings.data()["items"][0]["win_rate"], 100.0);

    let me = app.get("/api/auth/me", Some(&alice)).await;
    assert_eq!(me.status, StatusCode::OK);
}

#[tokio::test]
async fn test_clan_rankings() {
    let app = spawn_app().await;
    let admin = app.login_admin().await;
    let (_, first) = app.register("first").await;
    let (_, second) = app.register("second").await;

    let mut ids = Vec::new();
    for (cookie, name, tag) in [(&first, "Night Owls", "OWL"), (&second, "Red Hawks", "HAWK")] {
        let created = app
            .post("/api/clans", Some(cookie), json!({"name": name, "tag": tag}))
            .await;
        ids.push(created.data()["id"].as_i64().unwrap());
    }

    let (_, member) = app.register("member").await;
    let forbidden = app
        .put(
            &format!("/api/rankings/clans/{}", ids[0]),
            Some(&member),
            json!({"points": 10}),
        )
        .await;
    assert_eq!(forbidden.status, StatusCode::FORBIDDEN);

    let updated = app
        .put(
            &format!("/api/rankings/clans/{}", ids[1]),
            Some(&admin),
            json!({"points": 120, "wins": 4}),
        )
        .await;
    assert_eq!(updated.status, StatusCode::OK, "{:?}", updated.body);
    assert_eq!(updated.data()["points"], 120);
    assert_eq!(updated.data()["member_count"], 1);

    let rankings = app.get("/api/rankings/clans", None).await;
    assert_eq!(rankings.data()["items"][0]["id"], ids[1]);
    assert_eq!(rankings.data()["items"][0]["rank"], 1);
    assert_eq!(rankings.data()["items"][1]["id"], ids[0]);
}

#[tokio::test]
async fn test_metrics_endpoint_without_recorder() {
    let app = spawn_app().await;

    let response = app.get("/api/metrics", None).await;
    assert_eq!(response.status, StatusCode::OK);
}
