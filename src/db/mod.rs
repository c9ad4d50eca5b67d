use anyhow::Result;
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbErr, SqlErr, Statement,
};
use std::path::Path;
use std::time::Duration;
use tracing::info;

pub mod migrator;
pub mod repositories;

pub use repositories::badge::BadgeRepository;
pub use repositories::clan::ClanRepository;
pub use repositories::cms::CmsRepository;
pub use repositories::forum::ForumRepository;
pub use repositories::message::MessageRepository;
pub use repositories::notification::{NewNotification, NotificationRepository};
pub use repositories::ranking::RankingRepository;
pub use repositories::tournament::TournamentRepository;
pub use repositories::user::{User, UserRepository};

/// Outcome of a write guarded by a unique index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome<T> {
    Written(T),
    Duplicate,
}

/// Whether the database rejected a write because of a unique index.
#[must_use]
pub fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

/// Current time in the stored timestamp format.
#[must_use]
pub fn now_timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}

#[derive(Clone)]
pub struct Store {
    pub conn: DatabaseConnection,
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self> {
        Self::with_pool_options(db_url, 5, 1).await
    }

    pub async fn with_pool_options(
        db_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self> {
        use sea_orm_migration::MigratorTrait;

        if !db_url.contains(":memory:") {
            let path_str = db_url.trim_start_matches("sqlite://").trim_start_matches("sqlite:");
            let path_str = path_str.split('?').next().unwrap_or(path_str);
            if let Some(parent) = Path::new(path_str).parent() {
                tokio::fs::create_dir_all(parent).await.ok();
            }
            if !Path::new(path_str).exists() {
                std::fs::File::create(path_str)?;
            }
        }

        let mut opt = ConnectOptions::new(db_url.to_string());
        opt.max_connections(max_connections)
            .min_connections(min_connections)
            .connect_timeout(Duration::from_secs(10))
            .acquire_timeout(Duration::from_secs(10))
            .idle_timeout(Duration::from_secs(300))
            .max_lifetime(Duration::from_secs(600))
            .sqlx_logging(false);

        let conn = Database::connect(opt).await?;

        migrator::Migrator::up(&conn, None).await?;

        info!(
            "Database connected & migrations applied (pool: {}-{})",
            min_connections, max_connections
        );

        Ok(Self { conn })
    }

    pub async fn ping(&self) -> Result<()> {
        let backend = self.conn.get_database_backend();
        self.conn
            .query_one(Statement::from_string(backend, "SELECT 1".to_string()))
            .await?;
        Ok(())
    }

    #[must_use]
    pub fn users(&self) -> UserRepository {
        UserRepository::new(self.conn.clone())
    }

    #[must_use]
    pub fn clans(&self) -> ClanRepository {
        ClanRepository::new(self.conn.clone())
    }

    #[must_use]
    pub fn tournaments(&self) -> TournamentRepository {
        TournamentRepository::new(self.conn.clone())
    }

    #[must_use]
    pub fn forum(&self) -> ForumRepository {
        ForumRepository::new(self.conn.clone())
    }

    #[must_use]
    pub fn badges(&self) -> BadgeRepository {
        BadgeRepository::new(self.conn.clone())
    }

    #[must_use]
    pub fn messages(&self) -> MessageRepository {
        MessageRepository::new(self.conn.clone())
    }

    #[must_use]
    pub fn notifications(&self) -> NotificationRepository {
        NotificationRepository::new(self.conn.clone())
    }

    #[must_use]
    pub fn cms(&self) -> CmsRepository {
        CmsRepository::new(self.conn.clone())
    }

    #[must_use]
    pub fn rankings(&self) -> RankingRepository {
        RankingRepository::new(self.conn.clone())
    }
}
