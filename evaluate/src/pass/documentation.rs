use crate::config::EvaluationContext;
use crate::error::EvaluateError;
use crate::pass::tree::{has_file, has_markdown_named, has_root_file, has_top_level_dir};
use crate::pass::{award, clamp_score, downcast, AnyEvaluationPass, PassData, RepoSignals};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentationData {
    pub has_docs_dir: bool,
    pub has_readme: bool,
    pub has_contributing: bool,
    pub has_license: bool,
    pub has_changelog: bool,
    pub has_api_doc: bool,
    pub has_guide: bool,
    pub has_faq: bool,
    pub has_architecture_doc: bool,
}

impl From<&RepoSignals<'_>> for DocumentationData {
    fn from(signals: &RepoSignals<'_>) -> Self {
        let tree = signals.tree;
        Self {
            has_docs_dir: has_top_level_dir(tree, "docs"),
            has_readme: has_root_file(tree, |name| name == "readme.md"),
            has_contributing: has_root_file(tree, |name| name == "contributing.md"),
            has_license: has_root_file(tree, |name| name.starts_with("license")),
            has_changelog: has_root_file(tree, |name| name == "changelog.md"),
            has_api_doc: has_markdown_named(tree, &["api"]),
            has_guide: has_markdown_named(tree, &["guide"]),
            has_faq: has_file(tree, |name| name == "faq.md"),
            has_architecture_doc: has_markdown_named(tree, &["architecture", "design"]),
        }
    }
}

pub struct Documentation;

impl AnyEvaluationPass for Documentation {
    fn apply(&self, ctx: &EvaluationContext, data: &dyn PassData) -> Result<u8, EvaluateError> {
        let docs = downcast::<DocumentationData>(self.name(), data)?;
        let cfg = &ctx.documentation;
        Ok(clamp_score(
            award(docs.has_docs_dir, cfg.docs_dir_points)
                + award(docs.has_readme, cfg.readme_points)
                + award(docs.has_contributing, cfg.contributing_points)
                + award(docs.has_license, cfg.license_points)
                + award(docs.has_changelog, cfg.changelog_points)
                + award(docs.has_api_doc, cfg.api_doc_points)
                + award(docs.has_guide, cfg.guide_points)
                + award(docs.has_faq, cfg.faq_points)
                + award(docs.has_architecture_doc, cfg.architecture_points),
        ))
    }

    fn required_data(&self, signals: &RepoSignals<'_>) -> Box<dyn PassData> {
        Box::new(DocumentationData::from(signals))
    }

    fn name(&self) -> &'static str {
        "documentation"
    }

    fn weight(&self, ctx: &EvaluationContext) -> f64 {
        ctx.weights.documentation
    }
}
