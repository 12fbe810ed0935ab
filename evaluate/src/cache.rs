use crate::error::CacheError;
use crate::scorer::{EvaluationRequest, QualityScorer, TreeSource};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use database::storage::quality_cache_database::QualityCacheDatabase;
use futures::stream::{self, StreamExt};
use model::quality::{CachedReport, QualityReport};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Reports keyed by repository full name.
#[async_trait]
pub trait ReportCache: Send + Sync {
    async fn get(&self, repo_full_name: &str) -> Result<Option<CachedReport>, CacheError>;
    async fn put(&self, repo_full_name: &str, entry: CachedReport) -> Result<(), CacheError>;
    /// Returns whether an entry was removed.
    async fn invalidate(&self, repo_full_name: &str) -> Result<bool, CacheError>;
}

#[derive(Default)]
pub struct MemoryReportCache {
    entries: RwLock<HashMap<String, CachedReport>>,
}

impl MemoryReportCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReportCache for MemoryReportCache {
    async fn get(&self, repo_full_name: &str) -> Result<Option<CachedReport>, CacheError> {
        Ok(self.entries.read().await.get(repo_full_name).cloned())
    }

    async fn put(&self, repo_full_name: &str, entry: CachedReport) -> Result<(), CacheError> {
        self.entries
            .write()
            .await
            .insert(repo_full_name.to_owned(), entry);
        Ok(())
    }

    async fn invalidate(&self, repo_full_name: &str) -> Result<bool, CacheError> {
        Ok(self.entries.write().await.remove(repo_full_name).is_some())
    }
}

#[async_trait]
impl ReportCache for QualityCacheDatabase {
    async fn get(&self, repo_full_name: &str) -> Result<Option<CachedReport>, CacheError> {
        match QualityCacheDatabase::get(self, repo_full_name).await? {
            Some(model) => Ok(Some(CachedReport::try_from(model)?)),
            None => Ok(None),
        }
    }

    async fn put(&self, repo_full_name: &str, entry: CachedReport) -> Result<(), CacheError> {
        self.upsert(entry.to_active_model(repo_full_name)?).await?;
        Ok(())
    }

    async fn invalidate(&self, repo_full_name: &str) -> Result<bool, CacheError> {
        Ok(self.delete(repo_full_name).await?)
    }
}

/// Serves fresh cached reports and stores newly computed ones.
///
/// Fallback reports are never stored, so a transient outage does not pin a
/// degraded report for a whole TTL. Cache failures are logged and otherwise
/// ignored; concurrent misses for the same repository are not coalesced.
pub struct CachedScorer<C, T> {
    cache: C,
    scorer: QualityScorer<T>,
    ttl: Duration,
}

impl<C: ReportCache, T: TreeSource> CachedScorer<C, T> {
    pub fn new(cache: C, scorer: QualityScorer<T>, ttl: Duration) -> Self {
        Self { cache, scorer, ttl }
    }

    pub async fn evaluate(&self, request: &EvaluationRequest) -> QualityReport {
        self.evaluate_at(request, Utc::now()).await
    }

    pub async fn evaluate_at(&self, request: &EvaluationRequest, now: DateTime<Utc>) -> QualityReport {
        let key = request.full_name();
        match self.cache.get(&key).await {
            Ok(Some(entry)) if entry.is_fresh(now, self.ttl) => {
                debug!("Serving cached report for {} from {}", key, entry.cached_at);
                return entry.report;
            }
            Ok(_) => {}
            Err(err) => warn!("Report cache lookup for {} failed: {}", key, err),
        }

        let report = self.scorer.evaluate_at(request, now).await;
        if !report.is_fallback() {
            let entry = CachedReport {
                report: report.clone(),
                cached_at: now,
            };
            if let Err(err) = self.cache.put(&key, entry).await {
                warn!("Report cache store for {} failed: {}", key, err);
            }
        }
        report
    }

    pub async fn invalidate(&self, owner: &str, repo: &str) -> Result<bool, CacheError> {
        self.cache
            .invalidate(&EvaluationRequest::new(owner, repo).full_name())
            .await
    }

    /// Evaluates many repositories, at most `concurrency` at a time.
    /// Results come back in completion order, paired with the full name.
    pub async fn evaluate_many(
        &self,
        requests: Vec<EvaluationRequest>,
        concurrency: usize,
    ) -> Vec<(String, QualityReport)> {
        stream::iter(requests)
            .map(|request| async move {
                let report = self.evaluate(&request).await;
                (request.full_name(), report)
            })
            .buffer_unordered(concurrency.max(1))
            .collect()
            .await
    }
}
