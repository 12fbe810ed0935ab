use crate::config::EvaluationContext;
use crate::error::EvaluateError;
use crate::pass::tree::{blobs, has_dir_segment, has_file};
use crate::pass::{award, clamp_score, downcast, AnyEvaluationPass, PassData, RepoSignals};

const TEST_DIRS: [&str; 3] = ["test", "tests", "__tests__"];
const TEST_FILE_MARKERS: [&str; 3] = [".test.", ".spec.", "_test."];
const RUNNER_CONFIGS: [&str; 2] = ["jest.config.", "vitest.config."];

/// Presence of test files only; nothing is executed or measured.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TestCoverageData {
    pub has_test_dir: bool,
    pub test_file_count: usize,
    pub has_runner_config: bool,
    pub has_coverage_config: bool,
}

impl TestCoverageData {
    pub fn has_tests(&self) -> bool {
        self.has_test_dir || self.test_file_count > 0
    }
}

impl From<&RepoSignals<'_>> for TestCoverageData {
    fn from(signals: &RepoSignals<'_>) -> Self {
        let tree = signals.tree;
        Self {
            has_test_dir: has_dir_segment(tree, &TEST_DIRS),
            test_file_count: blobs(tree)
                .filter(|entry| {
                    let name = entry.file_name().to_ascii_lowercase();
                    TEST_FILE_MARKERS.iter().any(|marker| name.contains(marker))
                })
                .count(),
            has_runner_config: has_file(tree, |name| {
                RUNNER_CONFIGS.iter().any(|prefix| name.starts_with(prefix))
            }),
            has_coverage_config: has_dir_segment(tree, &["coverage"])
                || has_file(tree, |name| {
                    name.starts_with(".nycrc") || name == "codecov.yml" || name == ".codecov.yml"
                }),
        }
    }
}

pub struct TestCoverage;

impl AnyEvaluationPass for TestCoverage {
    fn apply(&self, ctx: &EvaluationContext, data: &dyn PassData) -> Result<u8, EvaluateError> {
        let tests = downcast::<TestCoverageData>(self.name(), data)?;
        let cfg = &ctx.test_coverage;
        Ok(clamp_score(
            award(tests.has_test_dir, cfg.test_dir_points)
                + award(tests.test_file_count > 0, cfg.test_file_points)
                + award(
                    tests.test_file_count > cfg.many_test_files,
                    cfg.many_test_files_points,
                )
                + award(tests.has_runner_config, cfg.runner_config_points)
                + award(tests.has_coverage_config, cfg.coverage_config_points),
        ))
    }

    fn required_data(&self, signals: &RepoSignals<'_>) -> Box<dyn PassData> {
        Box::new(TestCoverageData::from(signals))
    }

    fn name(&self) -> &'static str {
        "test_coverage"
    }

    fn weight(&self, ctx: &EvaluationContext) -> f64 {
        ctx.weights.test_coverage
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pass::test_support::signals_with_tree;
    use model::github::TreeEntry;

    fn data(tree: &[TreeEntry]) -> TestCoverageData {
        TestCoverageData::from(&signals_with_tree(tree))
    }

    fn score(tree: &[TreeEntry]) -> u8 {
        TestCoverage
            .apply(&EvaluationContext::default(), &data(tree))
            .unwrap()
    }

    #[test]
    fn test_no_tests() {
        let tree = vec![TreeEntry::blob("src/main.rs"), TreeEntry::blob("latest/notes.txt")];
        assert!(!data(&tree).has_tests());
        assert_eq!(score(&tree), 0);
    }

    #[test]
    fn test_directory_and_few_files() {
        let tree = vec![
            TreeEntry::tree("tests"),
            TreeEntry::blob("tests/api.rs"),
            TreeEntry::blob("src/app.test.ts"),
            TreeEntry::blob("pkg/server_test.go"),
        ];
        let coverage = data(&tree);
        assert_eq!(coverage.test_file_count, 2);
        assert!(coverage.has_tests());
        assert_eq!(score(&tree), 60);
    }

    #[test]
    fn test_full_marks() {
        let mut tree = vec![
            TreeEntry::blob("src/__tests__/setup.js"),
            TreeEntry::blob("jest.config.js"),
            TreeEntry::blob(".nycrc.json"),
        ];
        for i in 0..6 {
            tree.push(TreeEntry::blob(format!("src/widget{}.spec.js", i)));
        }
        assert_eq!(score(&tree), 100);
    }

    #[test]
    fn test_five_files_is_not_many() {
        let tree: Vec<TreeEntry> = (0..5)
            .map(|i| TreeEntry::blob(format!("lib/m{}.test.js", i)))
            .collect();
        assert_eq!(score(&tree), 20);
    }
}
