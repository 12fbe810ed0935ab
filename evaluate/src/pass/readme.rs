use crate::config::EvaluationContext;
use crate::error::EvaluateError;
use crate::pass::{award, clamp_score, downcast, tiered, AnyEvaluationPass, PassData, RepoSignals};
use once_cell::sync::Lazy;
use regex::Regex;

// [text](target), images included
static MARKDOWN_LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[[^\]]*\]\([^)]*\)").expect("valid link pattern"));

const SECTION_KEYWORDS: [&str; 3] = ["installation", "usage", "license"];

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReadmeData {
    pub length: usize,
    pub has_header: bool,
    pub has_code_block: bool,
    pub has_image: bool,
    pub keyword_hits: usize,
    pub link_count: usize,
    pub has_badge: bool,
    pub mentions_reference: bool,
    pub mentions_example: bool,
}

impl ReadmeData {
    pub fn analyze(readme: &str) -> Self {
        let lower = readme.to_lowercase();
        Self {
            length: readme.chars().count(),
            has_header: readme.contains("# ") || readme.contains("## "),
            has_code_block: readme.contains("```"),
            has_image: readme.contains("![") || lower.contains("<img"),
            keyword_hits: SECTION_KEYWORDS
                .iter()
                .filter(|keyword| lower.contains(*keyword))
                .count(),
            link_count: MARKDOWN_LINK.find_iter(readme).count(),
            has_badge: lower.contains("badge") || lower.contains("shields.io"),
            mentions_reference: lower.contains("api") || lower.contains("documentation"),
            mentions_example: lower.contains("example") || lower.contains("demo"),
        }
    }
}

impl From<&RepoSignals<'_>> for ReadmeData {
    fn from(signals: &RepoSignals<'_>) -> Self {
        Self::analyze(signals.readme)
    }
}

pub struct ReadmeQuality;

impl ReadmeQuality {
    pub fn score(ctx: &EvaluationContext, data: &ReadmeData) -> u8 {
        let cfg = &ctx.readme;
        clamp_score(
            tiered(data.length, &cfg.length_tiers, cfg.length_points)
                + award(data.has_header, cfg.header_points)
                + award(data.has_code_block, cfg.code_block_points)
                + award(data.has_image, cfg.image_points)
                + data.keyword_hits as u32 * cfg.keyword_points
                + award(data.link_count > cfg.min_links, cfg.links_points)
                + award(data.has_badge, cfg.badge_points)
                + award(data.mentions_reference, cfg.reference_points)
                + award(data.mentions_example, cfg.example_points),
        )
    }
}

impl AnyEvaluationPass for ReadmeQuality {
    fn apply(&self, ctx: &EvaluationContext, data: &dyn PassData) -> Result<u8, EvaluateError> {
        let readme_data = downcast::<ReadmeData>(self.name(), data)?;
        Ok(Self::score(ctx, readme_data))
    }

    fn required_data(&self, signals: &RepoSignals<'_>) -> Box<dyn PassData> {
        Box::new(ReadmeData::from(signals))
    }

    fn name(&self) -> &'static str {
        "readme_quality"
    }

    fn weight(&self, ctx: &EvaluationContext) -> f64 {
        ctx.weights.readme_quality
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score(readme: &str) -> u8 {
        ReadmeQuality::score(&EvaluationContext::default(), &ReadmeData::analyze(readme))
    }

    #[test]
    fn test_usage_and_license_readme() {
        let mut readme = String::from("## Usage\n\n```\ncargo run\n```\n\nSee license.\n");
        readme.push_str(&"x".repeat(2000 - readme.len()));
        assert_eq!(readme.chars().count(), 2000);

        let data = ReadmeData::analyze(&readme);
        assert_eq!(data.keyword_hits, 2);
        assert_eq!(data.link_count, 0);
        assert_eq!(score(&readme), 50);
    }

    #[test]
    fn test_empty_readme() {
        assert_eq!(score(""), 0);
    }

    #[test]
    fn test_link_threshold_is_strict() {
        let three = "[a](1) [b](2) [c](3)";
        let four = "[a](1) [b](2) [c](3) [d](4)";
        assert_eq!(score(three), 0);
        assert_eq!(score(four), 10);
    }

    #[test]
    fn test_rich_readme_is_capped() {
        let readme = format!(
            "# Demo\n![badge](https://img.shields.io/x)\n## Installation\n```sh\nmake\n```\n\
             Usage, license, API docs, an example: [a](1) [b](2) [c](3) [d](4)\n{}",
            "y".repeat(1600)
        );
        assert_eq!(score(&readme), 100);
    }

    #[test]
    fn test_case_insensitive_keywords() {
        assert_eq!(score("INSTALLATION"), 5);
        assert_eq!(score("<IMG src=x>"), 5);
    }
}
