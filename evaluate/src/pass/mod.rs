pub mod commit_activity;
pub mod community;
pub mod documentation;
pub mod maintenance;
pub mod organization;
pub mod readme;
pub mod test_coverage;
pub(crate) mod tree;

use crate::config::EvaluationContext;
use crate::error::EvaluateError;
use chrono::{DateTime, Utc};
use model::github::{CommitSummary, RepoMetadata, TreeEntry};
use std::any::Any;

/// Everything a pass may look at for one repository, borrowed from the request.
#[derive(Debug, Clone, Copy)]
pub struct RepoSignals<'a> {
    pub tree: &'a [TreeEntry],
    pub readme: &'a str,
    pub metadata: &'a RepoMetadata,
    pub commits: &'a [CommitSummary],
    /// Reference time for every recency check.
    pub now: DateTime<Utc>,
}

pub trait PassData: Any + Send + Sync {
    fn as_any(&self) -> &dyn Any;
}

impl<T: Any + Send + Sync> PassData for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

pub trait AnyEvaluationPass: Send + Sync {
    /// Sub-score in [0, 100].
    fn apply(&self, ctx: &EvaluationContext, data: &dyn PassData) -> Result<u8, EvaluateError>;
    fn required_data(&self, signals: &RepoSignals<'_>) -> Box<dyn PassData>;
    fn name(&self) -> &'static str;
    fn weight(&self, ctx: &EvaluationContext) -> f64;
}

pub(crate) fn downcast<'a, T: Any>(
    pass: &'static str,
    data: &'a dyn PassData,
) -> Result<&'a T, EvaluateError> {
    data.as_any()
        .downcast_ref::<T>()
        .ok_or(EvaluateError::PassData(pass))
}

/// Sum of `points` for every tier `value` strictly exceeds.
pub(crate) fn tiered<T: PartialOrd>(value: T, tiers: &[T], points: u32) -> u32 {
    tiers.iter().filter(|tier| value > **tier).count() as u32 * points
}

pub(crate) fn award(condition: bool, points: u32) -> u32 {
    if condition {
        points
    } else {
        0
    }
}

pub fn clamp_score(points: u32) -> u8 {
    points.min(100) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tiered_is_strict() {
        assert_eq!(tiered(5u64, &[5, 20, 50, 100], 10), 0);
        assert_eq!(tiered(21u64, &[5, 20, 50, 100], 10), 20);
        assert_eq!(tiered(1000u64, &[5, 20, 50, 100], 10), 40);
    }

    #[test]
    fn test_clamp_score() {
        assert_eq!(clamp_score(0), 0);
        assert_eq!(clamp_score(100), 100);
        assert_eq!(clamp_score(135), 100);
    }

    #[test]
    fn test_downcast_mismatch_is_error() {
        let data: Box<dyn PassData> = Box::new(17u32);
        assert_eq!(*downcast::<u32>("x", data.as_ref()).unwrap(), 17);
        assert!(matches!(
            downcast::<String>("x", data.as_ref()),
            Err(EvaluateError::PassData("x"))
        ));
    }
}
