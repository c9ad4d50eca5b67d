mod common;

use axum::http::StatusCode;
use common::spawn_app;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, Set};
use serde_json::json;

use guildhall::entities::cms_content;

#[tokio::test]
async fn test_default_home_page_is_served() {
    let app = spawn_app().await;

    let response = app.get("/api/cms/home", None).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["is_default"], true);
    assert_eq!(response.data()["content_type"], "HOME_PAGE");

    let sections = response.data()["sections"].as_array().unwrap();
    assert_eq!(sections[0]["type"], "hero");
    assert!(sections.len() > 1);
}

#[tokio::test]
async fn test_admin_only_editing() {
    let app = spawn_app().await;
    let (_, user) = app.register("player").await;

    let read = app.get("/api/admin/cms/home", Some(&user)).await;
    assert_eq!(read.status, StatusCode::FORBIDDEN);

    let write = app
        .put(
            "/api/admin/cms/home",
            Some(&user),
            json!({"sections": [{"id": "hero", "type": "hero"}]}),
        )
        .await;
    assert_eq!(write.status, StatusCode::FORBIDDEN);

    let anonymous = app.get("/api/admin/cms/home", None).await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_save_publishes_visible_sections_in_order() {
    let app = spawn_app().await;
    let admin = app.login_admin().await;

    let saved = app
        .put(
            "/api/admin/cms/home",
            Some(&admin),
            json!({"sections": [
                {"id": "cta", "type": "cta", "order": 2, "content": {"label": "Sign up"}},
                {"id": "hero", "type": "hero", "order": 0, "title": "Season 3"},
                {"id": "news", "type": "news", "order": 1, "enabled": false},
            ]}),
        )
        .await;
    assert_eq!(saved.status, StatusCode::OK, "{:?}", saved.body);
    assert_eq!(saved.data()["is_default"], false);
    assert_eq!(saved.data()["is_published"], true);
    assert!(saved.data()["published_at"].is_string());

    let editor = app.get("/api/admin/cms/home", Some(&admin)).await;
    assert_eq!(editor.data()["sections"].as_array().unwrap().len(), 3);

    let public = app.get("/api/cms/home", None).await;
    let sections = public.data()["sections"].as_array().unwrap();
    let ids: Vec<&str> = sections.iter().map(|s| s["id"].as_str().unwrap()).collect();
    assert_eq!(ids, ["hero", "cta"]);
    assert_eq!(sections[0]["title"], "Season 3");
}

#[tokio::test]
async fn test_invalid_sections_are_rejected() {
    let app = spawn_app().await;
    let admin = app.login_admin().await;

    let missing = app.put("/api/admin/cms/home", Some(&admin), json!({})).await;
    assert_eq!(missing.status, StatusCode::BAD_REQUEST);
    assert_eq!(missing.error(), "Sections are required");

    let unknown_type = app
        .put(
            "/api/admin/cms/home",
            Some(&admin),
            json!({"sections": [{"id": "x", "type": "carousel"}]}),
        )
        .await;
    assert_eq!(unknown_type.status, StatusCode::BAD_REQUEST);

    let duplicate = app
        .put(
            "/api/admin/cms/home",
            Some(&admin),
            json!({"sections": [
                {"id": "hero", "type": "hero"},
                {"id": "hero", "type": "cta"},
            ]}),
        )
        .await;
    assert_eq!(duplicate.status, StatusCode::BAD_REQUEST);
    assert_eq!(duplicate.error(), "Duplicate section id: hero");

    let public = app.get("/api/cms/home", None).await;
    assert_eq!(public.data()["is_default"], true);
}

#[tokio::test]
async fn test_publish_and_reset() {
    let app = spawn_app().await;
    let admin = app.login_admin().await;

    let nothing = app
        .post("/api/admin/cms/home/publish", Some(&admin), json!({}))
        .await;
    assert_eq!(nothing.status, StatusCode::NOT_FOUND);
    assert_eq!(nothing.error(), "No content to publish");

    app.put(
        "/api/admin/cms/home",
        Some(&admin),
        json!({"sections": [{"id": "hero", "type": "hero"}]}),
    )
    .await;

    let published = app
        .post("/api/admin/cms/home/publish", Some(&admin), json!({}))
        .await;
    assert_eq!(published.status, StatusCode::OK);
    assert_eq!(published.data()["is_published"], true);

    let reset = app
        .post("/api/admin/cms/home/reset", Some(&admin), json!({}))
        .await;
    assert_eq!(reset.status, StatusCode::OK);
    assert_eq!(reset.data()["is_default"], true);

    let public = app.get("/api/cms/home", None).await;
    assert_eq!(public.data()["is_default"], true);
}

#[tokio::test]
async fn test_legacy_content_is_wrapped() {
    let app = spawn_app().await;
    let now = chrono::Utc::now().to_rfc3339();

    cms_content::ActiveModel {
        content_type: Set("HOME_PAGE".to_string()),
        content: Set("<h1>Old welcome</h1>".to_string()),
        is_active: Set(true),
        is_published: Set(true),
        published_at: Set(Some(now.clone())),
        updated_by: Set(None),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&app.state.store().conn)
    .await
    .unwrap();

    let public = app.get("/api/cms/home", None).await;
    assert_eq!(public.status, StatusCode::OK);
    assert_eq!(public.data()["is_default"], false);

    let sections = public.data()["sections"].as_array().unwrap();
    assert_eq!(sections.len(), 1);
    assert_eq!(sections[0]["type"], "rich_text");
    assert_eq!(sections[0]["content"]["html"], "<h1>Old welcome</h1>");
}

async fn active_rows(app: &common::TestApp) -> u64 {
    cms_content::Entity::find()
        .filter(cms_content::Column::ContentType.eq("HOME_PAGE"))
        .filter(cms_content::Column::IsActive.eq(true))
        .count(&app.state.store().conn)
        .await
        .unwrap()
}

#[tokio::test]
async fn test_home_page_keeps_a_single_active_row() {
    let app = spawn_app().await;
    let admin = app.login_admin().await;

    for title in ["First", "Second"] {
        let saved = app
            .put(
                "/api/admin/cms/home",
                Some(&admin),
                json!({"sections": [{"id": "hero", "type": "hero", "title": title}]}),
            )
            .await;
        assert_eq!(saved.status, StatusCode::OK, "{:?}", saved.body);
    }
    let published = app.post("/api/admin/cms/home/publish", Some(&admin), json!({})).await;
    assert_eq!(published.status, StatusCode::OK);
    assert_eq!(active_rows(&app).await, 1);

    let public = app.get("/api/cms/home", None).await;
    assert_eq!(public.data()["sections"][0]["title"], "Second");

    let now = chrono::Utc::now().to_rfc3339();
    let second_active = cms_content::ActiveModel {
        content_type: Set("HOME_PAGE".to_string()),
        content: Set("[]".to_string()),
        is_active: Set(true),
        is_published: Set(false),
        published_at: Set(None),
        updated_by: Set(None),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(&app.state.store().conn)
    .await;
    assert!(second_active.is_err());
    assert_eq!(active_rows(&app).await, 1);
}

#[tokio::test]
async fn test_concurrent_first_saves_leave_one_active_row() {
    let app = std::sync::Arc::new(spawn_app().await);
    let admin = app.login_admin().await;

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let app = app.clone();
            let admin = admin.clone();
            tokio::spawn(async move {
                app.put(
                    "/api/admin/cms/home",
                    Some(&admin),
                    json!({"sections": [{"id": "hero", "type": "hero", "title": format!("Draft {i}")}]}),
                )
                .await
                .status
            })
        })
        .collect();

    for handle in handles {
        assert_eq!(handle.await.unwrap(), StatusCode::OK);
    }
    assert_eq!(active_rows(&app).await, 1);
}
