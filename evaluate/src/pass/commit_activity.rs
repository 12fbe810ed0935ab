use crate::config::EvaluationContext;
use crate::error::EvaluateError;
use crate::pass::{award, clamp_score, downcast, tiered, AnyEvaluationPass, PassData, RepoSignals};
use chrono::{DateTime, Duration, Utc};

#[derive(Debug, Clone, PartialEq)]
pub struct CommitActivityData {
    pub commit_count: usize,
    /// Author dates in the order the commits were supplied; `None` when unparseable.
    pub timestamps: Vec<Option<DateTime<Utc>>>,
    pub now: DateTime<Utc>,
}

impl From<&RepoSignals<'_>> for CommitActivityData {
    fn from(signals: &RepoSignals<'_>) -> Self {
        Self {
            commit_count: signals.commits.len(),
            timestamps: signals
                .commits
                .iter()
                .map(|commit| commit.authored_at())
                .collect(),
            now: signals.now,
        }
    }
}

impl CommitActivityData {
    /// A window too large for chrono counts every dated commit as recent.
    fn recent_count(&self, window_days: i64) -> usize {
        let window = Duration::try_days(window_days);
        self.timestamps
            .iter()
            .flatten()
            .filter(|at| window.map_or(window_days > 0, |window| self.now - **at < window))
            .count()
    }

    /// Mean and population standard deviation, in seconds, of the gaps between
    /// successive dated commits among the first `sample` commits.
    fn cadence(&self, sample: usize, min_commits: usize) -> Option<(f64, f64)> {
        let dated: Vec<DateTime<Utc>> = self
            .timestamps
            .iter()
            .take(sample)
            .flatten()
            .copied()
            .collect();
        if dated.len() < min_commits.max(2) {
            return None;
        }

        let deltas: Vec<f64> = dated
            .windows(2)
            .map(|pair| (pair[0] - pair[1]).num_seconds().abs() as f64)
            .collect();
        let mean = deltas.iter().sum::<f64>() / deltas.len() as f64;
        let variance =
            deltas.iter().map(|delta| (delta - mean).powi(2)).sum::<f64>() / deltas.len() as f64;
        Some((mean, variance.sqrt()))
    }
}

pub struct CommitActivity;

impl AnyEvaluationPass for CommitActivity {
    fn apply(&self, ctx: &EvaluationContext, data: &dyn PassData) -> Result<u8, EvaluateError> {
        let activity = downcast::<CommitActivityData>(self.name(), data)?;
        if activity.commit_count == 0 {
            return Ok(0);
        }

        let cfg = &ctx.commit_activity;
        let recent = activity.recent_count(cfg.recent_window_days);
        let consistency = match activity.cadence(cfg.consistency_sample, cfg.min_consistency_commits)
        {
            Some((mean, stddev)) if stddev < cfg.steady_ratio * mean => cfg.steady_points,
            Some((mean, stddev)) if stddev < mean => cfg.regular_points,
            _ => 0,
        };

        Ok(clamp_score(
            tiered(activity.commit_count, &cfg.count_tiers, cfg.count_points)
                + award(recent > 0, cfg.recent_points)
                + award(recent > cfg.many_recent, cfg.many_recent_points)
                + consistency,
        ))
    }

    fn required_data(&self, signals: &RepoSignals<'_>) -> Box<dyn PassData> {
        Box::new(CommitActivityData::from(signals))
    }

    fn name(&self) -> &'static str {
        "commit_activity"
    }

    fn weight(&self, ctx: &EvaluationContext) -> f64 {
        ctx.weights.commit_activity
    }
}
