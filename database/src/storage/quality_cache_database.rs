use entity::quality_cache;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ConnectionTrait, DatabaseConnection, DbErr, EntityTrait, Schema};
use std::sync::Arc;
use tracing::debug;

#[derive(Clone)]
pub struct QualityCacheDatabase {
    pub connection: Arc<DatabaseConnection>,
}

impl QualityCacheDatabase {
    /// 获取底层连接
    pub fn get_connection(&self) -> &DatabaseConnection {
        &self.connection
    }

    pub fn new(connection: Arc<DatabaseConnection>) -> Self {
        QualityCacheDatabase { connection }
    }

    /// Creates the `quality_cache` table when it does not exist yet.
    pub async fn ensure_schema(&self) -> Result<(), DbErr> {
        let backend = self.get_connection().get_database_backend();
        let schema = Schema::new(backend);
        let mut stmt = schema.create_table_from_entity(quality_cache::Entity);
        stmt.if_not_exists();
        self.get_connection().execute(backend.build(&stmt)).await?;
        Ok(())
    }

    pub async fn get(&self, repo_full_name: &str) -> Result<Option<quality_cache::Model>, DbErr> {
        quality_cache::Entity::find_by_id(repo_full_name.to_owned())
            .one(self.get_connection())
            .await
    }

    /// Inserts the row or overwrites the report of an existing one.
    pub async fn upsert(&self, model: quality_cache::ActiveModel) -> Result<(), DbErr> {
        quality_cache::Entity::insert(model)
            .on_conflict(
                OnConflict::column(quality_cache::Column::RepoFullName)
                    .update_columns([
                        quality_cache::Column::ReportJson,
                        quality_cache::Column::QualityScore,
                        quality_cache::Column::CachedAt,
                    ])
                    .to_owned(),
            )
            .exec(self.get_connection())
            .await?;
        Ok(())
    }

    /// Returns whether a row was removed.
    pub async fn delete(&self, repo_full_name: &str) -> Result<bool, DbErr> {
        let result = quality_cache::Entity::delete_by_id(repo_full_name.to_owned())
            .exec(self.get_connection())
            .await?;
        debug!(
            "quality_cache delete {}: {} row(s)",
            repo_full_name, result.rows_affected
        );
        Ok(result.rows_affected > 0)
    }
}
