use crate::config::EvaluationContext;
use crate::error::EvaluateError;
use crate::pass::{award, clamp_score, downcast, tiered, AnyEvaluationPass, PassData, RepoSignals};

#[derive(Debug, Clone, PartialEq)]
pub struct CommunityData {
    pub stargazer_count: u64,
    pub fork_count: u64,
    pub watcher_count: u64,
    pub open_issue_count: u64,
}

impl From<&RepoSignals<'_>> for CommunityData {
    fn from(signals: &RepoSignals<'_>) -> Self {
        let metadata = signals.metadata;
        Self {
            stargazer_count: metadata.stargazers_count,
            fork_count: metadata.forks_count,
            watcher_count: metadata.watchers_count,
            open_issue_count: metadata.open_issues_count,
        }
    }
}

pub struct CommunityEngagement;

impl AnyEvaluationPass for CommunityEngagement {
    fn apply(&self, ctx: &EvaluationContext, data: &dyn PassData) -> Result<u8, EvaluateError> {
        let community = downcast::<CommunityData>(self.name(), data)?;
        let cfg = &ctx.community;
        // some issue traffic, but not an abandoned backlog
        let healthy_issues =
            community.open_issue_count > 0 && community.open_issue_count < cfg.open_issues_max;
        Ok(clamp_score(
            tiered(community.stargazer_count, &cfg.star_tiers, cfg.tier_points)
                + tiered(community.fork_count, &cfg.fork_tiers, cfg.tier_points)
                + tiered(community.watcher_count, &cfg.watcher_tiers, cfg.tier_points)
                + award(healthy_issues, cfg.open_issues_points),
        ))
    }

    fn required_data(&self, signals: &RepoSignals<'_>) -> Box<dyn PassData> {
        Box::new(CommunityData::from(signals))
    }

    fn name(&self) -> &'static str {
        "community_engagement"
    }

    fn weight(&self, ctx: &EvaluationContext) -> f64 {
        ctx.weights.community_engagement
    }
}
