use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One cached quality report per repository, keyed by `owner/name`.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "quality_cache")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub repo_full_name: String,
    #[sea_orm(column_type = "Text")]
    pub report_json: String, // QualityReport serialized as json
    pub quality_score: i32,
    pub cached_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
