use shared::{
    config::DatabaseConfig,
    error::{AppError, AppResult},
};
use sqlx::{postgres::PgConnectOptions, PgPool};

pub mod model;

fn make_pg_connect_options(cfg: &DatabaseConfig) -> PgConnectOptions {
    PgConnectOptions::new()
        .host(&cfg.host)
        .port(cfg.port)
        .username(&cfg.username)
        .password(&cfg.password)
        .database(&cfg.database)
}

#[derive(Clone)]
pub struct ConnectionPool(PgPool);

impl ConnectionPool {
    pub fn new(pool: PgPool) -> Self {
        Self(pool)
    }

    pub fn inner_ref(&self) -> &PgPool {
        &self.0
    }

    pub async fn begin(&self) -> AppResult<sqlx::Transaction<'_, sqlx::Postgres>> {
        self.0.begin().await.map_err(map_store_error)
    }

    // adapter/migrations 以下のマイグレーションを適用する
    pub async fn migrate(&self) -> AppResult<()> {
        sqlx::migrate!()
            .run(self.inner_ref())
            .await
            .map_err(|e| AppError::StoreUnavailable(format!("migration failed: {e}")))
    }
}

pub fn connect_database_with(cfg: &DatabaseConfig) -> ConnectionPool {
    ConnectionPool(PgPool::connect_lazy_with(make_pg_connect_options(cfg)))
}

/// Maps a driver error to the application error taxonomy.
///
/// Serialization failures, deadlocks and connection problems are transient
/// and reported as retryable `StoreUnavailable`.
pub fn map_store_error(e: sqlx::Error) -> AppError {
    // 40001: serialization_failure, 40P01: deadlock_detected
    let transient_code = e
        .as_database_error()
        .and_then(|d| d.code())
        .is_some_and(|code| code == "40001" || code == "40P01");

    match e {
        _ if transient_code => AppError::StoreUnavailable("concurrent update, try again".into()),
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            AppError::StoreUnavailable(e.to_string())
        }
        e => AppError::SpecificOperationError(e),
    }
}
