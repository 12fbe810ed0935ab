use crate::config::EvaluationContext;
use crate::error::EvaluateError;
use crate::manager::EvaluationManager;
use crate::pass::RepoSignals;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use github_handler::error::GitHubError;
use github_handler::{GitHubClient, RepositorySignals};
use model::github::{CommitSummary, RepoMetadata, TreeEntry};
use model::quality::QualityReport;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Where the recursive file listing comes from.
#[async_trait]
pub trait TreeSource: Send + Sync {
    async fn fetch_tree(
        &self,
        owner: &str,
        repo: &str,
        token: Option<&str>,
    ) -> Result<Vec<TreeEntry>, GitHubError>;
}

#[async_trait]
impl TreeSource for GitHubClient {
    async fn fetch_tree(
        &self,
        owner: &str,
        repo: &str,
        token: Option<&str>,
    ) -> Result<Vec<TreeEntry>, GitHubError> {
        GitHubClient::fetch_tree(self, owner, repo, token).await
    }
}

/// GitHub tree lookups that fall back through the configured credentials
/// when the request's own token is rejected.
#[derive(Debug, Clone)]
pub struct CredentialedTreeSource {
    client: GitHubClient,
    credentials: Vec<String>,
}

impl CredentialedTreeSource {
    pub fn new(client: GitHubClient, credentials: Vec<String>) -> Self {
        Self {
            client,
            credentials,
        }
    }

    /// The request token first, then every other configured credential in order.
    fn ordered(&self, token: Option<&str>) -> Vec<String> {
        token
            .map(str::to_owned)
            .into_iter()
            .chain(
                self.credentials
                    .iter()
                    .filter(|credential| Some(credential.as_str()) != token)
                    .cloned(),
            )
            .collect()
    }
}

#[async_trait]
impl TreeSource for CredentialedTreeSource {
    async fn fetch_tree(
        &self,
        owner: &str,
        repo: &str,
        token: Option<&str>,
    ) -> Result<Vec<TreeEntry>, GitHubError> {
        self.client
            .fetch_tree_with_fallback(owner, repo, &self.ordered(token))
            .await
    }
}

/// Caller supplied inputs for one repository.
#[derive(Debug, Clone, Default)]
pub struct EvaluationRequest {
    pub owner: String,
    pub repo: String,
    pub readme: String,
    pub metadata: RepoMetadata,
    pub commits: Vec<CommitSummary>,
    pub auth_token: Option<String>,
}

impl EvaluationRequest {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            ..Default::default()
        }
    }

    pub fn from_signals(
        owner: impl Into<String>,
        repo: impl Into<String>,
        signals: RepositorySignals,
        auth_token: Option<String>,
    ) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            readme: signals.readme,
            metadata: signals.metadata,
            commits: signals.commits,
            auth_token,
        }
    }

    /// `owner/repo`, lowercased since GitHub names are case-insensitive.
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.repo).to_lowercase()
    }
}

pub struct QualityScorer<T> {
    source: T,
    manager: EvaluationManager,
    ctx: Arc<EvaluationContext>,
}

impl<T: TreeSource> QualityScorer<T> {
    pub fn new(source: T, ctx: Arc<EvaluationContext>) -> Self {
        Self::with_manager(source, EvaluationManager::default(), ctx)
    }

    pub fn with_manager(source: T, manager: EvaluationManager, ctx: Arc<EvaluationContext>) -> Self {
        Self {
            source,
            manager,
            ctx,
        }
    }

    pub fn context(&self) -> &EvaluationContext {
        &self.ctx
    }

    pub async fn evaluate(&self, request: &EvaluationRequest) -> QualityReport {
        self.evaluate_at(request, Utc::now()).await
    }

    /// Never fails: any error becomes [`QualityReport::fallback`].
    pub async fn evaluate_at(&self, request: &EvaluationRequest, now: DateTime<Utc>) -> QualityReport {
        match self.try_evaluate_at(request, now).await {
            Ok(report) => {
                info!(
                    "Repository {} evaluation completed - Scores: total= {}, readme= {}, organization= {}, tests= {}, docs= {}, commits= {}, community= {}, maintenance= {}",
                    request.full_name(),
                    report.quality_score,
                    report.metrics.readme_quality,
                    report.metrics.code_organization,
                    report.metrics.test_coverage,
                    report.metrics.documentation,
                    report.metrics.commit_activity,
                    report.metrics.community_engagement,
                    report.metrics.maintenance,
                );
                report
            }
            Err(err) => {
                warn!(
                    "Repository {} evaluation failed, using fallback report: {}",
                    request.full_name(),
                    err
                );
                QualityReport::fallback()
            }
        }
    }

    pub async fn try_evaluate_at(
        &self,
        request: &EvaluationRequest,
        now: DateTime<Utc>,
    ) -> Result<QualityReport, EvaluateError> {
        let deadline = self.ctx.github.tree_fetch_timeout_secs;
        let tree = tokio::time::timeout(
            Duration::from_secs(deadline),
            self.source
                .fetch_tree(&request.owner, &request.repo, request.auth_token.as_deref()),
        )
        .await
        .map_err(|_| EvaluateError::TreeTimeout(deadline))??;

        let signals = RepoSignals {
            tree: &tree,
            readme: &request.readme,
            metadata: &request.metadata,
            commits: &request.commits,
            now,
        };
        self.manager.score(&self.ctx, &signals)
    }
}
