use chrono::{DateTime, Duration, Utc};
use entity::quality_cache;
use sea_orm::ActiveValue::Set;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Directory names kept in `QualityDetails::directory_structure`.
pub const MAX_LISTED_DIRECTORIES: usize = 10;

/// Fallback value for every sub-score except test coverage.
pub const FALLBACK_SCORE: u8 = 50;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComplexityTier {
    Simple,
    Standard,
    Moderate,
    Complex,
    Unknown,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct QualityMetrics {
    pub readme_quality: u8,
    pub code_organization: u8,
    pub test_coverage: u8,
    pub documentation: u8,
    pub commit_activity: u8,
    pub community_engagement: u8,
    pub maintenance: u8,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct QualityDetails {
    pub has_tests: bool,
    #[serde(rename = "hasCI")]
    pub has_ci: bool,
    pub has_linting: bool,
    pub has_docs: bool,
    pub file_count: u64,
    pub directory_structure: Vec<String>,
    pub languages: BTreeMap<String, u64>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct QualityReport {
    pub quality_score: u8,
    pub complexity_tier: ComplexityTier,
    pub metrics: QualityMetrics,
    pub details: QualityDetails,
}

impl QualityReport {
    /// Report handed out whenever tree retrieval or scoring fails.
    pub fn fallback() -> Self {
        Self {
            quality_score: FALLBACK_SCORE,
            complexity_tier: ComplexityTier::Unknown,
            metrics: QualityMetrics {
                readme_quality: FALLBACK_SCORE,
                code_organization: FALLBACK_SCORE,
                test_coverage: 0,
                documentation: FALLBACK_SCORE,
                commit_activity: FALLBACK_SCORE,
                community_engagement: FALLBACK_SCORE,
                maintenance: FALLBACK_SCORE,
            },
            details: QualityDetails::default(),
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.complexity_tier == ComplexityTier::Unknown
    }
}

/// A report together with the time it was computed.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CachedReport {
    pub report: QualityReport,
    pub cached_at: DateTime<Utc>,
}

impl CachedReport {
    pub fn is_fresh(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.cached_at < ttl
    }

    // 转换为数据库模型
    pub fn to_active_model(
        &self,
        repo_full_name: &str,
    ) -> Result<quality_cache::ActiveModel, serde_json::Error> {
        Ok(quality_cache::ActiveModel {
            repo_full_name: Set(repo_full_name.to_owned()),
            report_json: Set(serde_json::to_string(&self.report)?),
            quality_score: Set(self.report.quality_score as i32),
            cached_at: Set(self.cached_at.naive_utc()),
        })
    }
}

impl TryFrom<quality_cache::Model> for CachedReport {
    type Error = serde_json::Error;

    fn try_from(value: quality_cache::Model) -> Result<Self, Self::Error> {
        Ok(Self {
            report: serde_json::from_str(&value.report_json)?,
            cached_at: DateTime::<Utc>::from_naive_utc_and_offset(value.cached_at, Utc),
        })
    }
}
