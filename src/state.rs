use std::sync::Arc;

use crate::config::Config;
use crate::db::Store;
use crate::services::{
    AuthService, ClanService, CmsService, SeaOrmAuthService, SeaOrmClanService, SeaOrmCmsService,
    SeaOrmTournamentService, TournamentService,
};

/// Everything a request handler needs besides the HTTP plumbing.
#[derive(Clone)]
pub struct SharedState {
    pub config: Arc<Config>,

    pub store: Store,

    pub auth_service: Arc<dyn AuthService>,

    pub tournament_service: Arc<dyn TournamentService>,

    pub clan_service: Arc<dyn ClanService>,

    pub cms_service: Arc<dyn CmsService>,
}

impl SharedState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store = Store::with_pool_options(
            &config.general.database_path,
            config.general.max_db_connections,
            config.general.min_db_connections,
        )
        .await?;

        Ok(Self::with_store(config, store))
    }

    #[must_use]
    pub fn with_store(config: Config, store: Store) -> Self {
        let auth_service = Arc::new(SeaOrmAuthService::new(
            store.clone(),
            config.security.clone(),
        )) as Arc<dyn AuthService>;

        let tournament_service = Arc::new(SeaOrmTournamentService::new(
            store.clone(),
            config.community.clone(),
        )) as Arc<dyn TournamentService>;

        let clan_service = Arc::new(SeaOrmClanService::new(store.clone())) as Arc<dyn ClanService>;

        let cms_service = Arc::new(SeaOrmCmsService::new(store.clone())) as Arc<dyn CmsService>;

        Self {
            config: Arc::new(config),
            store,
            auth_service,
            tournament_service,
            clan_service,
            cms_service,
        }
    }
}
