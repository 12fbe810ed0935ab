use crate::config::EvaluationContext;
use crate::error::EvaluateError;
use crate::pass::tree::{has_file, has_root_file};
use crate::pass::{award, clamp_score, downcast, AnyEvaluationPass, PassData, RepoSignals};
use chrono::Duration;

const CI_FILES: [&str; 3] = [".gitlab-ci.yml", ".travis.yml", "circle.yml"];

#[derive(Debug, Clone, PartialEq)]
pub struct MaintenanceData {
    /// Time since the last update; `None` when `updated_at` is missing or malformed.
    pub updated_age: Option<Duration>,
    pub has_ci: bool,
    pub has_eslint: bool,
    pub has_prettier: bool,
    pub has_editorconfig: bool,
}

impl MaintenanceData {
    pub fn has_linting(&self) -> bool {
        self.has_eslint || self.has_prettier || self.has_editorconfig
    }
}

impl From<&RepoSignals<'_>> for MaintenanceData {
    fn from(signals: &RepoSignals<'_>) -> Self {
        let tree = signals.tree;
        Self {
            updated_age: signals
                .metadata
                .updated_at()
                .map(|updated_at| signals.now - updated_at),
            has_ci: tree
                .iter()
                .any(|entry| entry.path.starts_with(".github/workflows/"))
                || has_root_file(tree, |name| CI_FILES.contains(&name)),
            has_eslint: has_file(tree, |name| name.starts_with(".eslintrc")),
            has_prettier: has_file(tree, |name| {
                name.starts_with(".prettierrc") || name == "prettier.config.js"
            }),
            has_editorconfig: has_file(tree, |name| name == ".editorconfig"),
        }
    }
}

pub struct Maintenance;

impl AnyEvaluationPass for Maintenance {
    fn apply(&self, ctx: &EvaluationContext, data: &dyn PassData) -> Result<u8, EvaluateError> {
        let maintenance = downcast::<MaintenanceData>(self.name(), data)?;
        let cfg = &ctx.maintenance;
        let recency = maintenance
            .updated_age
            .and_then(|age| {
                cfg.recency
                    .iter()
                    .find(|tier| {
                        Duration::try_days(tier.max_age_days)
                            .map_or(tier.max_age_days > 0, |max_age| age < max_age)
                    })
            })
            .map_or(0, |tier| tier.points);

        Ok(clamp_score(
            recency
                + award(maintenance.has_ci, cfg.ci_points)
                + award(maintenance.has_eslint, cfg.eslint_points)
                + award(maintenance.has_prettier, cfg.prettier_points)
                + award(maintenance.has_editorconfig, cfg.editorconfig_points),
        ))
    }

    fn required_data(&self, signals: &RepoSignals<'_>) -> Box<dyn PassData> {
        Box::new(MaintenanceData::from(signals))
    }

    fn name(&self) -> &'static str {
        "maintenance"
    }

    fn weight(&self, ctx: &EvaluationContext) -> f64 {
        ctx.weights.maintenance
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RecencyTier;
    use crate::pass::test_support::fixed_now;
    use model::github::{RepoMetadata, TreeEntry};

    fn score(updated_days_ago: Option<i64>, tree: &[TreeEntry]) -> u8 {
        let metadata = RepoMetadata {
            updated_at: updated_days_ago
                .map(|days| (fixed_now() - Duration::days(days)).to_rfc3339()),
            ..Default::default()
        };
        let signals = RepoSignals {
            tree,
            readme: "",
            metadata: &metadata,
            commits: &[],
            now: fixed_now(),
        };
        Maintenance
            .apply(&EvaluationContext::default(), &MaintenanceData::from(&signals))
            .unwrap()
    }

    #[test]
    fn test_recency_tiers() {
        assert_eq!(score(Some(3), &[]), 50);
        assert_eq!(score(Some(7), &[]), 40);
        assert_eq!(score(Some(45), &[]), 25);
        assert_eq!(score(Some(100), &[]), 10);
        assert_eq!(score(Some(400), &[]), 0);
        assert_eq!(score(None, &[]), 0);
    }

    #[test]
    fn test_ci_and_lint_configs() {
        let tree = vec![
            TreeEntry::blob(".github/workflows/ci.yml"),
            TreeEntry::blob(".eslintrc.json"),
            TreeEntry::blob(".prettierrc"),
            TreeEntry::blob(".editorconfig"),
        ];
        assert_eq!(score(Some(1), &tree), 100);
        assert_eq!(score(None, &tree), 50);
    }

    #[test]
    fn test_other_ci_providers() {
        assert_eq!(score(None, &[TreeEntry::blob(".travis.yml")]), 30);
        assert_eq!(score(None, &[TreeEntry::blob("circle.yml")]), 30);
        assert_eq!(score(None, &[TreeEntry::blob("prettier.config.js")]), 5);
    }

    #[test]
    fn test_malformed_timestamp_is_ignored() {
        let metadata = RepoMetadata {
            updated_at: Some("yesterday".to_owned()),
            ..Default::default()
        };
        let signals = RepoSignals {
            tree: &[],
            readme: "",
            metadata: &metadata,
            commits: &[],
            now: fixed_now(),
        };
        assert_eq!(MaintenanceData::from(&signals).updated_age, None);
    }

    #[test]
    fn test_out_of_range_tier_does_not_panic() {
        let mut ctx = EvaluationContext::default();
        ctx.maintenance.recency = vec![
            RecencyTier {
                max_age_days: i64::MIN,
                points: 50,
            },
            RecencyTier {
                max_age_days: i64::MAX,
                points: 10,
            },
        ];
        let data = MaintenanceData {
            updated_age: Some(Duration::days(20_000)),
            has_ci: false,
            has_eslint: false,
            has_prettier: false,
            has_editorconfig: false,
        };
        assert_eq!(Maintenance.apply(&ctx, &data).unwrap(), 10);
    }
}
