use axum::{
    Router,
    http::HeaderValue,
    middleware,
    routing::{delete, get, patch, post, put},
};
use metrics_exporter_prometheus::PrometheusHandle;
use rand::Rng;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tower_sessions::cookie::Key;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::config::{Config, SecurityConfig};
use crate::state::SharedState;

mod auth;
mod badges;
mod clans;
mod cms;
mod error;
mod extract;
mod forum;
mod messages;
mod notifications;
mod observability;
mod rankings;
mod system;
mod tournaments;
mod types;
mod users;
mod validation;

pub use error::ApiError;
pub use extract::{CurrentUser, MaybeUser, SESSION_USER_KEY};
pub use types::*;

#[derive(Clone)]
pub struct AppState {
    pub shared: Arc<SharedState>,

    /// Signs the session cookie.
    pub session_key: Key,

    pub start_time: std::time::Instant,

    pub prometheus_handle: Option<PrometheusHandle>,
}

impl AppState {
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.shared.config
    }

    #[must_use]
    pub fn store(&self) -> &crate::db::Store {
        &self.shared.store
    }

    #[must_use]
    pub fn auth_service(&self) -> &Arc<dyn crate::services::AuthService> {
        &self.shared.auth_service
    }

    #[must_use]
    pub fn tournament_service(&self) -> &Arc<dyn crate::services::TournamentService> {
        &self.shared.tournament_service
    }

    #[must_use]
    pub fn clan_service(&self) -> &Arc<dyn crate::services::ClanService> {
        &self.shared.clan_service
    }

    #[must_use]
    pub fn cms_service(&self) -> &Arc<dyn crate::services::CmsService> {
        &self.shared.cms_service
    }
}

/// A configured secret signs cookies across restarts; without one a random
/// key is drawn and sessions end with the process.
fn session_key(security: &SecurityConfig) -> anyhow::Result<Key> {
    if let Some(secret) = &security.session_secret {
        return Key::try_from(secret.as_bytes())
            .map_err(|e| anyhow::anyhow!("Invalid session secret: {e}"));
    }

    let mut bytes = [0u8; 64];
    rand::rng().fill(&mut bytes[..]);
    Key::try_from(&bytes[..]).map_err(|e| anyhow::anyhow!("Failed to generate session key: {e}"))
}

pub fn create_app_state(
    shared: Arc<SharedState>,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let session_key = session_key(&shared.config.security)?;

    Ok(Arc::new(AppState {
        shared,
        session_key,
        start_time: std::time::Instant::now(),
        prometheus_handle,
    }))
}

pub async fn create_app_state_from_config(
    config: Config,
    prometheus_handle: Option<PrometheusHandle>,
) -> anyhow::Result<Arc<AppState>> {
    let shared = Arc::new(SharedState::new(config).await?);
    create_app_state(shared, prometheus_handle)
}

pub fn router(state: Arc<AppState>) -> Router {
    let server = &state.config().server;

    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_secure(server.secure_cookies)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(time::Duration::minutes(
            server.session_inactivity_minutes,
        )))
        .with_signed(state.session_key.clone());

    let cors_origins = &server.cors_allowed_origins;
    let cors_layer = if cors_origins.iter().any(|origin| origin == "*") {
        CorsLayer::new().allow_origin(Any)
    } else {
        let origins: Vec<HeaderValue> =
            cors_origins.iter().filter_map(|s| s.parse().ok()).collect();
        CorsLayer::new().allow_origin(origins)
    };

    let api_router = Router::new()
        .merge(account_routes())
        .merge(community_routes())
        .merge(competition_routes())
        .merge(admin_routes())
        .route("/health", get(system::health))
        .route("/metrics", get(observability::get_metrics))
        .fallback(system::route_not_found)
        .layer(session_layer)
        .with_state(state);

    Router::new()
        .nest("/api", api_router)
        .layer(cors_layer.allow_methods(Any).allow_headers(Any))
        .layer(middleware::from_fn(observability::security_headers_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(observability::logging_middleware))
}

fn account_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::get_current_user))
        .route("/auth/password", put(auth::change_password))
        .route("/users", get(users::list_users))
        .route(
            "/users/{id}",
            get(users::get_user)
                .put(users::update_profile)
                .delete(users::delete_user),
        )
        .route("/users/{id}/role", patch(users::set_role))
        .route("/users/{id}/status", patch(users::set_status))
        .route("/users/{id}/badges", get(badges::list_user_badges))
        .route(
            "/messages",
            get(messages::list_inbox).post(messages::send_message),
        )
        .route("/messages/sent", get(messages::list_sent))
        .route("/messages/unread-count", get(messages::unread_count))
        .route(
            "/messages/conversation/{user_id}",
            get(messages::get_conversation),
        )
        .route("/messages/{id}/read", patch(messages::mark_read))
        .route(
            "/messages/{id}",
            delete(messages::delete_message),
        )
        .route(
            "/notifications",
            get(notifications::list_notifications).post(notifications::create_notification),
        )
        .route(
            "/notifications/unread-count",
            get(notifications::unread_count),
        )
        .route("/notifications/read-all", post(notifications::mark_all_read))
        .route("/notifications/{id}/read", patch(notifications::mark_read))
        .route(
            "/notifications/{id}",
            delete(notifications::delete_notification),
        )
}

fn community_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/clans", get(clans::list_clans).post(clans::create_clan))
        .route(
            "/clans/{id}",
            get(clans::get_clan)
                .put(clans::update_clan)
                .delete(clans::delete_clan),
        )
        .route("/clans/{id}/join", post(clans::join_clan))
        .route("/clans/{id}/leave", post(clans::leave_clan))
        .route(
            "/clans/{id}/members/{user_id}",
            patch(clans::set_member_role).delete(clans::kick_member),
        )
        .route(
            "/forum/posts",
            get(forum::list_posts).post(forum::create_post),
        )
        .route(
            "/forum/posts/{id}",
            get(forum::get_post)
                .put(forum::update_post)
                .delete(forum::delete_post),
        )
        .route("/forum/posts/{id}/pin", post(forum::toggle_pin))
        .route("/forum/posts/{id}/like", post(forum::toggle_like))
        .route("/forum/posts/{id}/comments", post(forum::add_comment))
        .route(
            "/forum/comments/{id}",
            delete(forum::delete_comment),
        )
        .route("/cms/home", get(cms::get_published_home))
}

fn competition_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/tournaments",
            get(tournaments::list_tournaments).post(tournaments::create_tournament),
        )
        .route(
            "/tournaments/{id}",
            get(tournaments::get_tournament)
                .post(tournaments::register)
                .put(tournaments::update_tournament)
                .delete(tournaments::delete_tournament),
        )
        .route("/badges", get(badges::list_badges).post(badges::create_badge))
        .route(
            "/badges/{id}",
            get(badges::get_badge)
                .put(badges::update_badge)
                .delete(badges::delete_badge),
        )
        .route("/badges/{id}/award", post(badges::award_badge))
        .route(
            "/badges/{id}/award/{user_id}",
            delete(badges::revoke_badge),
        )
        .route("/rankings/users", get(rankings::user_rankings))
        .route("/rankings/clans", get(rankings::clan_rankings))
        .route("/rankings/users/{id}", put(rankings::update_user_stats))
        .route("/rankings/clans/{id}", put(rankings::update_clan_stats))
}

fn admin_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/admin/cms/home",
            get(cms::get_editable_home).put(cms::save_home),
        )
        .route("/admin/cms/home/publish", post(cms::publish_home))
        .route("/admin/cms/home/reset", post(cms::reset_home))
}
