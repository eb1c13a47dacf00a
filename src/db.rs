use crate::config::AppConfig;
use crate::errors::ServiceError;
use metrics::{counter, gauge, histogram};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use std::time::Duration;
use tracing::{debug, error, info};

/// Type alias for a database connection pool
pub type DbPool = DatabaseConnection;

/// Configuration for database connection
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout: Duration,
    pub idle_timeout: Duration,
    pub acquire_timeout: Duration,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: 10,
            min_connections: 1,
            connect_timeout: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(600),
            acquire_timeout: Duration::from_secs(8),
        }
    }
}

impl From<&AppConfig> for DbConfig {
    fn from(cfg: &AppConfig) -> Self {
        Self {
            url: cfg.database_url.clone(),
            max_connections: cfg.db_max_connections,
            min_connections: cfg.db_min_connections,
            connect_timeout: Duration::from_secs(cfg.db_connect_timeout_secs),
            idle_timeout: Duration::from_secs(cfg.db_idle_timeout_secs),
            acquire_timeout: Duration::from_secs(cfg.db_acquire_timeout_secs),
        }
    }
}

/// Establishes a connection pool to the database with custom configuration
///
/// # Errors
/// Returns a `ServiceError` if the connection cannot be established
pub async fn establish_connection_with_config(config: &DbConfig) -> Result<DbPool, ServiceError> {
    debug!("Configuring database connection with: {:?}", config);

    let mut opt = ConnectOptions::new(config.url.clone());
    opt.max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .connect_timeout(config.connect_timeout)
        .acquire_timeout(config.acquire_timeout)
        .idle_timeout(config.idle_timeout)
        .sqlx_logging(true)
        .sqlx_logging_level(tracing::log::LevelFilter::Debug);

    gauge!("printhub_db.max_connections", config.max_connections as f64);

    info!(
        "Connecting to database with max_connections={}",
        config.max_connections
    );

    let db_pool = Database::connect(opt).await.map_err(|e| {
        error!("Database connection establishment failed: {}", e);
        counter!("printhub_db.connection_failures", 1);
        ServiceError::DatabaseError(e)
    })?;

    info!("Database connection pool established successfully");
    Ok(db_pool)
}

/// Establish DB pool using AppConfig tuning
pub async fn establish_connection_from_app_config(cfg: &AppConfig) -> Result<DbPool, ServiceError> {
    let db_cfg: DbConfig = cfg.into();
    establish_connection_with_config(&db_cfg).await
}

/// Runs the embedded migrations.
pub async fn run_migrations(pool: &DbPool) -> Result<(), ServiceError> {
    info!("Running database migrations");
    let start = std::time::Instant::now();

    let result = crate::migrator::Migrator::up(pool, None)
        .await
        .map_err(ServiceError::DatabaseError);

    let elapsed = start.elapsed();
    histogram!("printhub_db.migration_seconds", elapsed.as_secs_f64());
    match &result {
        Ok(_) => info!(
            "Database migrations completed successfully in {:?}",
            elapsed
        ),
        Err(e) => error!("Database migrations failed after {:?}: {}", elapsed, e),
    }

    result
}

/// Checks if the database connection is active
pub async fn check_connection(pool: &DbPool) -> Result<(), ServiceError> {
    debug!("Checking database connection");
    let start = std::time::Instant::now();

    let result = pool.ping().await.map_err(ServiceError::DatabaseError);

    let elapsed = start.elapsed();
    match &result {
        Ok(_) => {
            debug!("Database connection check successful in {:?}", elapsed);
            gauge!("printhub_db.connection_latency", elapsed.as_millis() as f64);
        }
        Err(e) => {
            error!(
                "Database connection check failed after {:?}: {}",
                elapsed, e
            );
            counter!("printhub_db.connection_failures", 1);
        }
    }

    result
}

/// Closes the database connection pool
pub async fn close_pool(pool: DbPool) -> Result<(), ServiceError> {
    info!("Closing database connection pool");
    pool.close().await.map_err(ServiceError::DatabaseError)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn db_config_follows_app_config() {
        let mut cfg = AppConfig::new(
            "sqlite::memory:".into(),
            "x".repeat(64),
            3600,
            "127.0.0.1".into(),
            8080,
            "development".into(),
        );
        cfg.db_max_connections = 3;
        cfg.db_acquire_timeout_secs = 2;

        let db_cfg = DbConfig::from(&cfg);
        assert_eq!(db_cfg.url, "sqlite::memory:");
        assert_eq!(db_cfg.max_connections, 3);
        assert_eq!(db_cfg.acquire_timeout, Duration::from_secs(2));
    }

    #[tokio::test]
    async fn in_memory_sqlite_migrates_and_pings() {
        let pool = establish_connection_with_config(&DbConfig {
            url: "sqlite::memory:".into(),
            max_connections: 1,
            ..Default::default()
        })
        .await
        .unwrap();

        run_migrations(&pool).await.unwrap();
        assert!(check_connection(&pool).await.is_ok());
        close_pool(pool).await.unwrap();
    }

    #[tokio::test]
    async fn migrated_schema_stores_money_and_reports_unique_conflicts() {
        use crate::entities::material;
        use rust_decimal_macros::dec;
        use sea_orm::{ActiveModelTrait, EntityTrait, Set};

        let pool = establish_connection_with_config(&DbConfig {
            url: "sqlite::memory:".into(),
            max_connections: 1,
            ..Default::default()
        })
        .await
        .unwrap();
        run_migrations(&pool).await.unwrap();

        let row = |price| {
            let now = chrono::Utc::now();
            material::ActiveModel {
                id: Set(uuid::Uuid::new_v4()),
                name: Set("PLA".into()),
                density_g_cm3: Set(dec!(1.24)),
                price_twd_g: Set(price),
                is_active: Set(true),
                created_at: Set(now),
                updated_at: Set(now),
            }
        };
        let saved = row(dec!(123456789.5)).insert(&pool).await.unwrap();
        let loaded = material::Entity::find_by_id(saved.id)
            .one(&pool)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(loaded.price_twd_g, dec!(123456789.5));

        let err = row(dec!(2.5)).insert(&pool).await.unwrap_err();
        let mapped = ServiceError::conflict_on_unique(err, "Material PLA already exists");
        assert!(matches!(mapped, ServiceError::Conflict(ref msg) if msg == "Material PLA already exists"));
    }
}
