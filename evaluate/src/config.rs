use anyhow::Context;
use config::{Config, Environment, File, FileFormat};
use github_handler::GitHubClientConfig;
use serde::Deserialize;
use std::time::Duration;

/// 评价算法权重配置, weights of the seven sub-scores in the composite score
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct WeightConfig {
    pub readme_quality: f64,
    pub code_organization: f64,
    pub test_coverage: f64,
    pub documentation: f64,
    pub commit_activity: f64,
    pub community_engagement: f64,
    pub maintenance: f64,
}

impl Default for WeightConfig {
    fn default() -> Self {
        Self {
            readme_quality: 0.20,
            code_organization: 0.20,
            test_coverage: 0.15,
            documentation: 0.15,
            commit_activity: 0.10,
            community_engagement: 0.10,
            maintenance: 0.10,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ReadmeConfig {
    /// Each length strictly above a tier earns `length_points`.
    pub length_tiers: Vec<usize>,
    pub length_points: u32,
    pub header_points: u32,
    pub code_block_points: u32,
    pub image_points: u32,
    pub keyword_points: u32,
    pub min_links: usize,
    pub links_points: u32,
    pub badge_points: u32,
    pub reference_points: u32,
    pub example_points: u32,
}

impl Default for ReadmeConfig {
    fn default() -> Self {
        Self {
            length_tiers: vec![500, 1500],
            length_points: 10,
            header_points: 10,
            code_block_points: 10,
            image_points: 5,
            keyword_points: 5,
            min_links: 3,
            links_points: 10,
            badge_points: 10,
            reference_points: 10,
            example_points: 10,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct OrganizationConfig {
    pub source_dir_points: u32,
    pub component_points: u32,
    pub util_points: u32,
    pub config_points: u32,
    pub package_manifest_points: u32,
    pub project_config_points: u32,
    pub gitignore_points: u32,
    pub env_template_points: u32,
    pub file_count_tiers: Vec<usize>,
    pub file_count_points: u32,
    pub min_depth: usize,
    pub depth_points: u32,
}

impl Default for OrganizationConfig {
    fn default() -> Self {
        Self {
            source_dir_points: 15,
            component_points: 10,
            util_points: 10,
            config_points: 5,
            package_manifest_points: 10,
            project_config_points: 10,
            gitignore_points: 5,
            env_template_points: 5,
            file_count_tiers: vec![10, 50],
            file_count_points: 10,
            min_depth: 3,
            depth_points: 10,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct TestCoverageConfig {
    pub test_dir_points: u32,
    pub test_file_points: u32,
    pub many_test_files: usize,
    pub many_test_files_points: u32,
    pub runner_config_points: u32,
    pub coverage_config_points: u32,
}

impl Default for TestCoverageConfig {
    fn default() -> Self {
        Self {
            test_dir_points: 40,
            test_file_points: 20,
            many_test_files: 5,
            many_test_files_points: 20,
            runner_config_points: 10,
            coverage_config_points: 10,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DocumentationConfig {
    pub docs_dir_points: u32,
    pub readme_points: u32,
    pub contributing_points: u32,
    pub license_points: u32,
    pub changelog_points: u32,
    pub api_doc_points: u32,
    pub guide_points: u32,
    pub faq_points: u32,
    pub architecture_points: u32,
}

impl Default for DocumentationConfig {
    fn default() -> Self {
        Self {
            docs_dir_points: 30,
            readme_points: 15,
            contributing_points: 10,
            license_points: 10,
            changelog_points: 5,
            api_doc_points: 10,
            guide_points: 10,
            faq_points: 5,
            architecture_points: 5,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CommitActivityConfig {
    pub count_tiers: Vec<usize>,
    pub count_points: u32,
    pub recent_window_days: i64,
    pub recent_points: u32,
    pub many_recent: usize,
    pub many_recent_points: u32,
    /// Leading commits used for the cadence check.
    pub consistency_sample: usize,
    pub min_consistency_commits: usize,
    /// stddev below `steady_ratio * mean` counts as steady.
    pub steady_ratio: f64,
    pub steady_points: u32,
    pub regular_points: u32,
}

impl Default for CommitActivityConfig {
    fn default() -> Self {
        Self {
            count_tiers: vec![10, 50],
            count_points: 15,
            recent_window_days: 30,
            recent_points: 20,
            many_recent: 5,
            many_recent_points: 20,
            consistency_sample: 10,
            min_consistency_commits: 3,
            steady_ratio: 0.5,
            steady_points: 30,
            regular_points: 15,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CommunityConfig {
    pub star_tiers: Vec<u64>,
    pub fork_tiers: Vec<u64>,
    pub watcher_tiers: Vec<u64>,
    pub tier_points: u32,
    /// Open issues strictly between 0 and this value earn `open_issues_points`.
    pub open_issues_max: u64,
    pub open_issues_points: u32,
}

impl Default for CommunityConfig {
    fn default() -> Self {
        Self {
            star_tiers: vec![5, 20, 50, 100],
            fork_tiers: vec![2, 10, 25],
            watcher_tiers: vec![3, 10],
            tier_points: 10,
            open_issues_max: 50,
            open_issues_points: 10,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct RecencyTier {
    pub max_age_days: i64,
    pub points: u32,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MaintenanceConfig {
    /// Checked in order; the first tier the update age falls under wins.
    pub recency: Vec<RecencyTier>,
    pub ci_points: u32,
    pub eslint_points: u32,
    pub prettier_points: u32,
    pub editorconfig_points: u32,
}

impl Default for MaintenanceConfig {
    fn default() -> Self {
        let tier = |max_age_days, points| RecencyTier {
            max_age_days,
            points,
        };
        Self {
            recency: vec![tier(7, 50), tier(30, 40), tier(90, 25), tier(180, 10)],
            ci_points: 30,
            eslint_points: 10,
            prettier_points: 5,
            editorconfig_points: 5,
        }
    }
}

/// Blob-count boundaries, each exclusive.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ComplexityConfig {
    pub complex_above: usize,
    pub moderate_above: usize,
    pub standard_above: usize,
}

impl Default for ComplexityConfig {
    fn default() -> Self {
        Self {
            complex_above: 100,
            moderate_above: 50,
            standard_above: 20,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct GitHubConfig {
    pub api_url: String,
    pub user_agent: String,
    pub timeout_secs: u64,
    /// Upper bound for the whole tree lookup, both branch attempts included.
    pub tree_fetch_timeout_secs: u64,
    /// Tried in order; the first one accepted by the api is used.
    pub tokens: Vec<String>,
    pub commit_limit: u8,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        let client = GitHubClientConfig::default();
        Self {
            api_url: client.api_url,
            user_agent: client.user_agent,
            timeout_secs: client.timeout.as_secs(),
            tree_fetch_timeout_secs: 10,
            tokens: Vec::new(),
            commit_limit: 100,
        }
    }
}

impl GitHubConfig {
    pub fn client_config(&self) -> GitHubClientConfig {
        GitHubClientConfig {
            api_url: self.api_url.clone(),
            user_agent: self.user_agent.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CacheConfig {
    pub ttl_secs: i64,
    /// When unset reports are cached in memory only.
    pub database_url: Option<String>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_secs: 24 * 60 * 60,
            database_url: None,
        }
    }
}

impl CacheConfig {
    /// Saturates instead of panicking; a negative ttl makes every entry stale.
    pub fn ttl(&self) -> chrono::Duration {
        chrono::Duration::try_seconds(self.ttl_secs.max(0))
            .unwrap_or_else(|| chrono::Duration::milliseconds(i64::MAX))
    }
}

/// 评价上下文结构体
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct EvaluationContext {
    pub weights: WeightConfig,
    pub readme: ReadmeConfig,
    pub organization: OrganizationConfig,
    pub test_coverage: TestCoverageConfig,
    pub documentation: DocumentationConfig,
    pub commit_activity: CommitActivityConfig,
    pub community: CommunityConfig,
    pub maintenance: MaintenanceConfig,
    pub complexity: ComplexityConfig,
    pub github: GitHubConfig,
    pub cache: CacheConfig,
    pub concurrency: usize,
}

impl Default for EvaluationContext {
    fn default() -> Self {
        Self {
            weights: WeightConfig::default(),
            readme: ReadmeConfig::default(),
            organization: OrganizationConfig::default(),
            test_coverage: TestCoverageConfig::default(),
            documentation: DocumentationConfig::default(),
            commit_activity: CommitActivityConfig::default(),
            community: CommunityConfig::default(),
            maintenance: MaintenanceConfig::default(),
            complexity: ComplexityConfig::default(),
            github: GitHubConfig::default(),
            cache: CacheConfig::default(),
            concurrency: 8,
        }
    }
}

impl EvaluationContext {
    /// Loads `config_path` (toml, optional) overlaid with `EVALHUB_*` variables,
    /// e.g. `EVALHUB_GITHUB__TOKENS=primary,backup`.
    pub fn load_config(config_path: &str) -> anyhow::Result<Self> {
        Config::builder()
            .add_source(
                File::with_name(config_path)
                    .format(FileFormat::Toml)
                    .required(false),
            )
            .add_source(
                Environment::with_prefix("EVALHUB")
                    .prefix_separator("_")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("github.tokens")
                    .try_parsing(true),
            )
            .build()
            .with_context(|| anyhow::anyhow!("Failed to load config"))?
            .try_deserialize::<Self>()
            .with_context(|| anyhow::anyhow!("Failed to deserialize config"))?
            .validated()
    }

    /// Rejects durations chrono cannot represent and a zero concurrency.
    pub fn validated(self) -> anyhow::Result<Self> {
        anyhow::ensure!(
            chrono::Duration::try_days(self.commit_activity.recent_window_days).is_some(),
            "commit_activity.recent_window_days out of range: {}",
            self.commit_activity.recent_window_days
        );
        for tier in &self.maintenance.recency {
            anyhow::ensure!(
                chrono::Duration::try_days(tier.max_age_days).is_some(),
                "maintenance.recency max_age_days out of range: {}",
                tier.max_age_days
            );
        }
        anyhow::ensure!(
            chrono::Duration::try_seconds(self.cache.ttl_secs).is_some(),
            "cache.ttl_secs out of range: {}",
            self.cache.ttl_secs
        );
        anyhow::ensure!(self.concurrency > 0, "concurrency must be positive");
        Ok(self)
    }
}
