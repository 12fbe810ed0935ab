use serde::Serialize;
use std::collections::HashSet;

/// How much of a target stack a user already covers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompatibilityReport {
    pub score: u8,
    pub matched: Vec<String>,
    pub missing: Vec<String>,
}

/// `round(100 * |matched| / |target|)`, comparing skills case-insensitively.
///
/// Duplicate target skills count once; `matched` and `missing` keep the
/// target's spelling and order. An empty target scores 0.
pub fn match_stack<S: AsRef<str>, T: AsRef<str>>(user_stack: &[S], target_stack: &[T]) -> CompatibilityReport {
    let known: HashSet<String> = user_stack
        .iter()
        .map(|skill| skill.as_ref().trim().to_lowercase())
        .collect();

    let mut seen = HashSet::new();
    let (matched, missing): (Vec<String>, Vec<String>) = target_stack
        .iter()
        .map(|skill| skill.as_ref().trim())
        .filter(|skill| !skill.is_empty() && seen.insert(skill.to_lowercase()))
        .map(str::to_owned)
        .partition(|skill| known.contains(&skill.to_lowercase()));

    let total = matched.len() + missing.len();
    let score = if total == 0 {
        0
    } else {
        (100.0 * matched.len() as f64 / total as f64).round() as u8
    };

    CompatibilityReport {
        score,
        matched,
        missing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_match() {
        let report = match_stack(&["Rust", "react", "Docker"], &["rust", "Go", "React"]);
        assert_eq!(report.score, 67);
        assert_eq!(report.matched, vec!["rust", "React"]);
        assert_eq!(report.missing, vec!["Go"]);
    }

    #[test]
    fn test_empty_target() {
        let report = match_stack(&["Rust"], &[] as &[&str]);
        assert_eq!(report.score, 0);
        assert!(report.matched.is_empty() && report.missing.is_empty());
    }

    #[test]
    fn test_duplicates_count_once() {
        let report = match_stack(&["go"], &["Go", "go", "Kubernetes"]);
        assert_eq!(report.score, 50);
        assert_eq!(report.missing, vec!["Kubernetes"]);
    }

    #[test]
    fn test_full_match() {
        let user = vec!["TypeScript".to_owned(), "Node".to_owned()];
        let report = match_stack(&user, &["node", "typescript"]);
        assert_eq!(report.score, 100);
        assert!(report.missing.is_empty());
    }
}
