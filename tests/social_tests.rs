mod common;

use axum::http::StatusCode;
use common::{TestApp, spawn_app};
use serde_json::json;

async fn create_post(app: &TestApp, cookie: &str, title: &str) -> i64 {
    let response = app
        .post(
            "/api/forum/posts",
            Some(cookie),
            json!({
                "title": title,
                "content": "Looking for a doubles partner.",
                "category": "tournaments",
                "tags": ["LFG", "doubles", "lfg", " "],
            }),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
    response.data()["id"].as_i64().unwrap()
}

#[tokio::test]
async fn test_forum_post_lifecycle() {
    let app = spawn_app().await;
    let (author_id, author) = app.register("author").await;

    let id = create_post(&app, &author, "Partner wanted").await;

    let detail = app.get(&format!("/api/forum/posts/{id}"), None).await;
    assert_eq!(detail.status, StatusCode::OK);
    assert_eq!(detail.data()["author_id"], author_id);
    assert_eq!(detail.data()["author_username"], "author");
    assert_eq!(detail.data()["category"], "tournaments");
    assert_eq!(detail.data()["tags"], json!(["lfg", "doubles"]));
    assert_eq!(detail.data()["views"], 1);

    let again = app.get(&format!("/api/forum/posts/{id}"), None).await;
    assert_eq!(again.data()["views"], 2);

    let edited = app
        .put(
            &format!("/api/forum/posts/{id}"),
            Some(&author),
            json!({"title": "Partner found"}),
        )
        .await;
    assert_eq!(edited.status, StatusCode::OK);
    assert_eq!(edited.data()["title"], "Partner found");

    let (_, stranger) = app.register("stranger").await;
    let hijack = app
        .put(
            &format!("/api/forum/posts/{id}"),
            Some(&stranger),
            json!({"title": "Mine"}),
        )
        .await;
    assert_eq!(hijack.status, StatusCode::FORBIDDEN);

    let deleted = app
        .delete(&format!("/api/forum/posts/{id}"), Some(&author))
        .await;
    assert_eq!(deleted.status, StatusCode::OK);
    let gone = app.get(&format!("/api/forum/posts/{id}"), None).await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_forum_post_validation() {
    let app = spawn_app().await;
    let (_, author) = app.register("author").await;

    let empty = app
        .post(
            "/api/forum/posts",
            Some(&author),
            json!({"title": "  ", "content": "body"}),
        )
        .await;
    assert_eq!(empty.status, StatusCode::BAD_REQUEST);
    assert_eq!(empty.error(), "Title and content are required");

    let bad_category = app
        .post(
            "/api/forum/posts",
            Some(&author),
            json!({"title": "Hi", "content": "body", "category": "memes"}),
        )
        .await;
    assert_eq!(bad_category.status, StatusCode::BAD_REQUEST);
    assert_eq!(bad_category.error(), "Invalid category: memes");

    let too_many: Vec<String> = (0..11).map(|i| format!("tag{i}")).collect();
    let tags = app
        .post(
            "/api/forum/posts",
            Some(&author),
            json!({"title": "Hi", "content": "body", "tags": too_many}),
        )
        .await;
    assert_eq!(tags.status, StatusCode::BAD_REQUEST);

    let anonymous = app
        .post("/api/forum/posts", None, json!({"title": "Hi", "content": "body"}))
        .await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_forum_pins_likes_and_listing() {
    let app = spawn_app().await;
    let admin = app.login_admin().await;
    let (_, author) = app.register("author").await;
    let (_, fan) = app.register("fan").await;

    let older = create_post(&app, &author, "Older post").await;
    let newer = create_post(&app, &author, "Newer post").await;

    let pin_by_user = app
        .post(&format!("/api/forum/posts/{older}/pin"), Some(&author), json!({}))
        .await;
    assert_eq!(pin_by_user.status, StatusCode::FORBIDDEN);

    let pinned = app
        .post(&format!("/api/forum/posts/{older}/pin"), Some(&admin), json!({}))
        .await;
    assert_eq!(pinned.status, StatusCode::OK);
    assert_eq!(pinned.data()["is_pinned"], true);

    let listing = app.get("/api/forum/posts", None).await;
    assert_eq!(listing.data()["items"][0]["id"], older);
    assert_eq!(listing.data()["items"][1]["id"], newer);

    let liked = app
        .post(&format!("/api/forum/posts/{newer}/like"), Some(&fan), json!({}))
        .await;
    assert_eq!(liked.data()["liked"], true);
    assert_eq!(liked.data()["like_count"], 1);

    let detail = app
        .get(&format!("/api/forum/posts/{newer}"), Some(&fan))
        .await;
    assert_eq!(detail.data()["liked"], true);
    assert_eq!(detail.data()["like_count"], 1);

    let unliked = app
        .post(&format!("/api/forum/posts/{newer}/like"), Some(&fan), json!({}))
        .await;
    assert_eq!(unliked.data()["liked"], false);
    assert_eq!(unliked.data()["like_count"], 0);

    let by_tag = app.get("/api/forum/posts?tag=LFG&search=newer", None).await;
    assert_eq!(by_tag.data()["pagination"]["total"], 1);
    assert_eq!(by_tag.data()["items"][0]["id"], newer);
}

#[tokio::test]
async fn test_comment_notifies_post_author() {
    let app = spawn_app().await;
    let (_, author) = app.register("author").await;
    let (_, commenter) = app.register("commenter").await;
    let id = create_post(&app, &author, "Partner wanted").await;

    let own = app
        .post(
            &format!("/api/forum/posts/{id}/comments"),
            Some(&author),
            json!({"content": "Bumping my own post"}),
        )
        .await;
    assert_eq!(own.status, StatusCode::CREATED);

    let comment = app
        .post(
            &format!("/api/forum/posts/{id}/comments"),
            Some(&commenter),
            json!({"content": "I'm in!"}),
        )
        .await;
    assert_eq!(comment.status, StatusCode::CREATED);
    assert_eq!(comment.data()["author_username"], "commenter");
    let comment_id = comment.data()["id"].as_i64().unwrap();

    let notifications = app.get("/api/notifications", Some(&author)).await;
    let items = notifications.data()["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["type"], "forum");

    let empty = app
        .post(
            &format!("/api/forum/posts/{id}/comments"),
            Some(&commenter),
            json!({"content": ""}),
        )
        .await;
    assert_eq!(empty.error(), "Comment content is required");

    let detail = app.get(&format!("/api/forum/posts/{id}"), None).await;
    assert_eq!(detail.data()["comment_count"], 2);

    let (_, stranger) = app.register("stranger").await;
    let forbidden = app
        .delete(&format!("/api/forum/comments/{comment_id}"), Some(&stranger))
        .await;
    assert_eq!(forbidden.status, StatusCode::FORBIDDEN);

    let deleted = app
        .delete(&format!("/api/forum/comments/{comment_id}"), Some(&commenter))
        .await;
    assert_eq!(deleted.status, StatusCode::OK);
}

#[tokio::test]
async fn test_badge_award_and_revoke() {
    let app = spawn_app().await;
    let admin = app.login_admin().await;
    let (user_id, user) = app.register("champion").await;

    let forbidden = app
        .post("/api/badges", Some(&user), json!({"name": "Self Made"}))
        .await;
    assert_eq!(forbidden.status, StatusCode::FORBIDDEN);

    let created = app
        .post(
            "/api/badges",
            Some(&admin),
            json!({"name": "Champion", "description": "Won a cup", "rarity": "epic"}),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(created.data()["rarity"], "epic");
    let badge_id = created.data()["id"].as_i64().unwrap();

    let duplicate = app
        .post("/api/badges", Some(&admin), json!({"name": "Champion"}))
        .await;
    assert_eq!(duplicate.error(), "Badge name already exists");

    let award = app
        .post(
            &format!("/api/badges/{badge_id}/award"),
            Some(&admin),
            json!({"user_id": user_id}),
        )
        .await;
    assert_eq!(award.status, StatusCode::CREATED, "{:?}", award.body);
    assert_eq!(award.data()["badge"]["name"], "Champion");

    let again = app
        .post(
            &format!("/api/badges/{badge_id}/award"),
            Some(&admin),
            json!({"user_id": user_id}),
        )
        .await;
    assert_eq!(again.status, StatusCode::BAD_REQUEST);
    assert_eq!(again.error(), "User already has this badge");

    let missing_user = app
        .post(
            &format!("/api/badges/{badge_id}/award"),
            Some(&admin),
            json!({"user_id": 9999}),
        )
        .await;
    assert_eq!(missing_user.status, StatusCode::NOT_FOUND);

    let listed = app.get("/api/badges", None).await;
    assert_eq!(listed.data()[0]["award_count"], 1);

    let held = app.get(&format!("/api/users/{user_id}/badges"), None).await;
    assert_eq!(held.data().as_array().unwrap().len(), 1);

    let notified = app
        .get("/api/notifications?unread=true", Some(&user))
        .await;
    assert_eq!(notified.data()["items"][0]["type"], "badge");

    let revoked = app
        .delete(
            &format!("/api/badges/{badge_id}/award/{user_id}"),
            Some(&admin),
        )
        .await;
    assert_eq!(revoked.status, StatusCode::OK);

    let revoked_again = app
        .delete(
            &format!("/api/badges/{badge_id}/award/{user_id}"),
            Some(&admin),
        )
        .await;
    assert_eq!(revoked_again.status, StatusCode::NOT_FOUND);
    assert_eq!(revoked_again.error(), "Badge award not found");
}

#[tokio::test]
async fn test_direct_messages() {
    let app = spawn_app().await;
    let (alice_id, alice) = app.register("alice").await;
    let (bob_id, bob) = app.register("bob").await;
    let (_, eve) = app.register("eve").await;

    let to_self = app
        .post(
            "/api/messages",
            Some(&alice),
            json!({"recipient_id": alice_id, "content": "note to self"}),
        )
        .await;
    assert_eq!(to_self.status, StatusCode::BAD_REQUEST);
    assert_eq!(to_self.error(), "You cannot send a message to yourself");

    let empty = app
        .post(
            "/api/messages",
            Some(&alice),
            json!({"recipient_id": bob_id, "content": "   "}),
        )
        .await;
    assert_eq!(empty.error(), "Message content is required");

    let nobody = app
        .post(
            "/api/messages",
            Some(&alice),
            json!({"recipient_id": 9999, "content": "hello?"}),
        )
        .await;
    assert_eq!(nobody.status, StatusCode::NOT_FOUND);

    let sent = app
        .post(
            "/api/messages",
            Some(&alice),
            json!({"recipient_id": bob_id, "content": "GG last night"}),
        )
        .await;
    assert_eq!(sent.status, StatusCode::CREATED);
    let message_id = sent.data()["id"].as_i64().unwrap();

    let unread = app.get("/api/messages/unread-count", Some(&bob)).await;
    assert_eq!(unread.data()["count"], 1);

    let notification = app.get("/api/notifications", Some(&bob)).await;
    assert_eq!(notification.data()["items"][0]["type"], "message");
    assert_eq!(notification.data()["items"][0]["message"], "GG last night");

    let eve_reads = app
        .patch(&format!("/api/messages/{message_id}/read"), Some(&eve), json!({}))
        .await;
    assert_eq!(eve_reads.status, StatusCode::FORBIDDEN);

    let sender_reads = app
        .patch(&format!("/api/messages/{message_id}/read"), Some(&alice), json!({}))
        .await;
    assert_eq!(sender_reads.status, StatusCode::FORBIDDEN);

    let read = app
        .patch(&format!("/api/messages/{message_id}/read"), Some(&bob), json!({}))
        .await;
    assert_eq!(read.status, StatusCode::OK);
    assert_eq!(read.data()["is_read"], true);

    let reply = app
        .post(
            "/api/messages",
            Some(&bob),
            json!({"recipient_id": alice_id, "content": "Rematch?"}),
        )
        .await;
    assert_eq!(reply.status, StatusCode::CREATED);

    let conversation = app
        .get(&format!("/api/messages/conversation/{bob_id}"), Some(&alice))
        .await;
    let items = conversation.data()["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["content"], "GG last night");
    assert_eq!(items[1]["content"], "Rematch?");

    let outbox = app.get("/api/messages/sent", Some(&alice)).await;
    assert_eq!(outbox.data()["pagination"]["total"], 1);

    let eve_deletes = app
        .delete(&format!("/api/messages/{message_id}"), Some(&eve))
        .await;
    assert_eq!(eve_deletes.status, StatusCode::FORBIDDEN);

    let deleted = app
        .delete(&format!("/api/messages/{message_id}"), Some(&alice))
        .await;
    assert_eq!(deleted.status, StatusCode::OK);
}

#[tokio::test]
async fn test_notifications_inbox() {
    let app = spawn_app().await;
    let admin = app.login_admin().await;
    let (user_id, user) = app.register("player").await;
    let (_, other) = app.register("other").await;

    let by_user = app
        .post(
            "/api/notifications",
            Some(&user),
            json!({"user_id": user_id, "title": "Hi", "message": "Hello"}),
        )
        .await;
    assert_eq!(by_user.status, StatusCode::FORBIDDEN);

    let missing = app
        .post(
            "/api/notifications",
            Some(&admin),
            json!({"user_id": user_id, "title": "", "message": ""}),
        )
        .await;
    assert_eq!(missing.status, StatusCode::BAD_REQUEST);
    assert_eq!(missing.error(), "Title and message are required");

    let mut ids = Vec::new();
    for title in ["Maintenance", "Season start"] {
        let created = app
            .post(
                "/api/notifications",
                Some(&admin),
                json!({"user_id": user_id, "title": title, "message": "Heads up"}),
            )
            .await;
        assert_eq!(created.status, StatusCode::CREATED, "{:?}", created.body);
        assert_eq!(created.data()["type"], "system");
        ids.push(created.data()["id"].as_i64().unwrap());
    }

    let count = app.get("/api/notifications/unread-count", Some(&user)).await;
    assert_eq!(count.data()["count"], 2);

    let foreign = app
        .patch(&format!("/api/notifications/{}/read", ids[0]), Some(&other), json!({}))
        .await;
    assert_eq!(foreign.status, StatusCode::FORBIDDEN);

    let read = app
        .patch(&format!("/api/notifications/{}/read", ids[0]), Some(&user), json!({}))
        .await;
    assert_eq!(read.status, StatusCode::OK);

    let unread = app.get("/api/notifications?unread=true", Some(&user)).await;
    assert_eq!(unread.data()["pagination"]["total"], 1);

    let all = app
        .post("/api/notifications/read-all", Some(&user), json!({}))
        .await;
    assert_eq!(all.data()["count"], 1);

    let count = app.get("/api/notifications/unread-count", Some(&user)).await;
    assert_eq!(count.data()["count"], 0);

    let deleted = app
        .delete(&format!("/api/notifications/{}", ids[1]), Some(&user))
        .await;
    assert_eq!(deleted.status, StatusCode::OK);

    let remaining = app.get("/api/notifications", Some(&user)).await;
    assert_eq!(remaining.data()["pagination"]["total"], 1);
}
