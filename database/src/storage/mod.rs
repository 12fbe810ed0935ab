pub mod quality_cache_database;

use quality_cache_database::QualityCacheDatabase;
use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Shared handle to the relational store; cheap to clone.
#[derive(Clone)]
pub struct Context {
    connection: Arc<DatabaseConnection>,
}

impl Context {
    pub async fn new(db_url: &str) -> Result<Self, DbErr> {
        let mut opt = ConnectOptions::new(db_url.to_owned());
        opt.max_connections(8)
            .connect_timeout(Duration::from_secs(10))
            .sqlx_logging(false);
        let connection = Database::connect(opt).await?;
        info!("Connected to database");
        Ok(Self::from_connection(connection))
    }

    pub fn from_connection(connection: DatabaseConnection) -> Self {
        Context {
            connection: Arc::new(connection),
        }
    }

    pub fn quality_cache_stg(&self) -> QualityCacheDatabase {
        QualityCacheDatabase::new(self.connection.clone())
    }
}
