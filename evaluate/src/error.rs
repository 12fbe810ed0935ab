use github_handler::error::GitHubError;
use thiserror::Error;

/// Reasons a scoring run can fail. Callers of the scorer never see these:
/// they are collapsed into the fallback report at the boundary.
#[derive(Error, Debug)]
pub enum EvaluateError {
    #[error("tree fetch failed: {0}")]
    Tree(#[from] GitHubError),

    #[error("tree fetch timed out after {0}s")]
    TreeTimeout(u64),

    #[error("pass `{0}` received data of an unexpected type")]
    PassData(&'static str),
}

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("report serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
