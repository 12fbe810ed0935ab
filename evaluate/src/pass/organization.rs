use crate::config::EvaluationContext;
use crate::error::EvaluateError;
use crate::pass::tree::{any_path_contains, blob_count, has_root_file, has_top_level_dir};
use crate::pass::{award, clamp_score, downcast, tiered, AnyEvaluationPass, PassData, RepoSignals};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrganizationData {
    pub has_source_dir: bool,
    pub has_components: bool,
    pub has_utils: bool,
    pub has_config: bool,
    pub has_package_manifest: bool,
    pub has_project_config: bool,
    pub has_gitignore: bool,
    pub has_env_template: bool,
    pub blob_count: usize,
    pub max_depth: usize,
}

impl From<&RepoSignals<'_>> for OrganizationData {
    fn from(signals: &RepoSignals<'_>) -> Self {
        let tree = signals.tree;
        Self {
            has_source_dir: has_top_level_dir(tree, "src") || has_top_level_dir(tree, "lib"),
            has_components: any_path_contains(tree, "component"),
            has_utils: any_path_contains(tree, "util"),
            has_config: any_path_contains(tree, "config"),
            has_package_manifest: has_root_file(tree, |name| name == "package.json"),
            has_project_config: has_root_file(tree, |name| {
                name == "tsconfig.json" || name == "jsconfig.json"
            }),
            has_gitignore: has_root_file(tree, |name| name == ".gitignore"),
            has_env_template: has_root_file(tree, |name| {
                name == ".env.example" || name == ".env.template"
            }),
            blob_count: blob_count(tree),
            max_depth: tree.iter().map(|entry| entry.depth()).max().unwrap_or(0),
        }
    }
}

pub struct CodeOrganization;

impl AnyEvaluationPass for CodeOrganization {
    fn apply(&self, ctx: &EvaluationContext, data: &dyn PassData) -> Result<u8, EvaluateError> {
        let org = downcast::<OrganizationData>(self.name(), data)?;
        let cfg = &ctx.organization;
        Ok(clamp_score(
            award(org.has_source_dir, cfg.source_dir_points)
                + award(org.has_components, cfg.component_points)
                + award(org.has_utils, cfg.util_points)
                + award(org.has_config, cfg.config_points)
                + award(org.has_package_manifest, cfg.package_manifest_points)
                + award(org.has_project_config, cfg.project_config_points)
                + award(org.has_gitignore, cfg.gitignore_points)
                + award(org.has_env_template, cfg.env_template_points)
                + tiered(org.blob_count, &cfg.file_count_tiers, cfg.file_count_points)
                + award(org.max_depth >= cfg.min_depth, cfg.depth_points),
        ))
    }

    fn required_data(&self, signals: &RepoSignals<'_>) -> Box<dyn PassData> {
        Box::new(OrganizationData::from(signals))
    }

    fn name(&self) -> &'static str {
        "code_organization"
    }

    fn weight(&self, ctx: &EvaluationContext) -> f64 {
        ctx.weights.code_organization
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pass::test_support::signals_with_tree;
    use model::github::TreeEntry;

    fn score(tree: &[TreeEntry]) -> u8 {
        let data = OrganizationData::from(&signals_with_tree(tree));
        CodeOrganization
            .apply(&EvaluationContext::default(), &data)
            .unwrap()
    }

    #[test]
    fn test_empty_tree() {
        assert_eq!(score(&[]), 0);
    }

    #[test]
    fn test_typical_frontend_layout() {
        let mut tree = vec![
            TreeEntry::tree("src"),
            TreeEntry::tree("src/components"),
            TreeEntry::blob("src/components/Button.tsx"),
            TreeEntry::blob("src/utils/format.ts"),
            TreeEntry::blob("package.json"),
            TreeEntry::blob("tsconfig.json"),
            TreeEntry::blob(".gitignore"),
            TreeEntry::blob(".env.example"),
        ];
        // tsconfig.json also satisfies the "config" path check
        assert_eq!(score(&tree), 80);

        for i in 0..6 {
            tree.push(TreeEntry::blob(format!("src/page{}.tsx", i)));
        }
        // 12 blobs
        assert_eq!(score(&tree), 90);
    }

    #[test]
    fn test_nested_manifest_does_not_count() {
        let tree = vec![TreeEntry::blob("web/package.json")];
        assert_eq!(score(&tree), 0);
    }

    #[test]
    fn test_large_tree_is_capped() {
        let mut tree = vec![
            TreeEntry::blob("lib/a/config/util/component.js"),
            TreeEntry::blob("package.json"),
            TreeEntry::blob("jsconfig.json"),
            TreeEntry::blob(".gitignore"),
            TreeEntry::blob(".env.template"),
        ];
        for i in 0..60 {
            tree.push(TreeEntry::blob(format!("lib/mod{}.js", i)));
        }
        assert_eq!(score(&tree), 100);
    }
}
