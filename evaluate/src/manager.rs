use crate::config::{ComplexityConfig, EvaluationContext};
use crate::error::EvaluateError;
use crate::pass::commit_activity::CommitActivity;
use crate::pass::community::CommunityEngagement;
use crate::pass::documentation::{Documentation, DocumentationData};
use crate::pass::maintenance::{Maintenance, MaintenanceData};
use crate::pass::organization::CodeOrganization;
use crate::pass::readme::ReadmeQuality;
use crate::pass::test_coverage::{TestCoverage, TestCoverageData};
use crate::pass::tree::blob_count;
use crate::pass::{AnyEvaluationPass, RepoSignals};
use model::quality::{
    ComplexityTier, QualityDetails, QualityMetrics, QualityReport, MAX_LISTED_DIRECTORIES,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

pub struct EvaluationManager {
    passes: Vec<Arc<dyn AnyEvaluationPass>>,
}

impl Default for EvaluationManager {
    fn default() -> Self {
        let mut manager = Self::new();
        manager.add_default_passes();
        manager
    }
}

impl EvaluationManager {
    pub fn new() -> Self {
        Self { passes: Vec::new() }
    }

    pub fn add_default_passes(&mut self) {
        self.add_pass(Arc::new(ReadmeQuality));
        self.add_pass(Arc::new(CodeOrganization));
        self.add_pass(Arc::new(TestCoverage));
        self.add_pass(Arc::new(Documentation));
        self.add_pass(Arc::new(CommitActivity));
        self.add_pass(Arc::new(CommunityEngagement));
        self.add_pass(Arc::new(Maintenance));
    }

    pub fn add_pass(&mut self, pass: Arc<dyn AnyEvaluationPass>) {
        self.passes.push(pass);
    }

    /// Runs every pass over `signals` and folds the results into a report.
    pub fn score(
        &self,
        ctx: &EvaluationContext,
        signals: &RepoSignals<'_>,
    ) -> Result<QualityReport, EvaluateError> {
        let mut score_map: HashMap<&str, u8> = HashMap::with_capacity(self.passes.len());
        let mut weighted = 0.0;
        for pass in &self.passes {
            let data = pass.required_data(signals);
            let score = pass.apply(ctx, data.as_ref())?;
            debug!("pass {} scored {}", pass.name(), score);
            weighted += pass.weight(ctx) * f64::from(score);
            score_map.insert(pass.name(), score);
        }

        let score_of = |name: &str| score_map.get(name).copied().unwrap_or(0);
        let metrics = QualityMetrics {
            readme_quality: score_of("readme_quality"),
            code_organization: score_of("code_organization"),
            test_coverage: score_of("test_coverage"),
            documentation: score_of("documentation"),
            commit_activity: score_of("commit_activity"),
            community_engagement: score_of("community_engagement"),
            maintenance: score_of("maintenance"),
        };

        let file_count = blob_count(signals.tree);
        Ok(QualityReport {
            quality_score: weighted.round().clamp(0.0, 100.0) as u8,
            complexity_tier: complexity_tier(&ctx.complexity, file_count),
            metrics,
            details: details(signals, file_count),
        })
    }
}

pub fn complexity_tier(cfg: &ComplexityConfig, blob_count: usize) -> ComplexityTier {
    match blob_count {
        n if n > cfg.complex_above => ComplexityTier::Complex,
        n if n > cfg.moderate_above => ComplexityTier::Moderate,
        n if n > cfg.standard_above => ComplexityTier::Standard,
        _ => ComplexityTier::Simple,
    }
}

fn details(signals: &RepoSignals<'_>, file_count: usize) -> QualityDetails {
    let maintenance = MaintenanceData::from(signals);
    QualityDetails {
        has_tests: TestCoverageData::from(signals).has_tests(),
        has_ci: maintenance.has_ci,
        has_linting: maintenance.has_linting(),
        has_docs: DocumentationData::from(signals).has_docs_dir,
        file_count: file_count as u64,
        directory_structure: signals
            .tree
            .iter()
            .filter(|entry| entry.is_tree() && !entry.path.contains('/'))
            .take(MAX_LISTED_DIRECTORIES)
            .map(|entry| entry.path.clone())
            .collect(),
        languages: signals.metadata.languages.clone(),
    }
}
