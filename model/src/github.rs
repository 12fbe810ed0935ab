use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// Entry kind as reported by the git trees endpoint
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Blob,
    Tree,
    Commit, // submodule
    #[serde(other)]
    Other,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    pub path: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
}

impl TreeEntry {
    pub fn blob(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: EntryKind::Blob,
        }
    }

    pub fn tree(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind: EntryKind::Tree,
        }
    }

    pub fn is_blob(&self) -> bool {
        self.kind == EntryKind::Blob
    }

    pub fn is_tree(&self) -> bool {
        self.kind == EntryKind::Tree
    }

    /// Last path segment.
    pub fn file_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    /// Number of slash separated segments.
    pub fn depth(&self) -> usize {
        self.path.split('/').count()
    }
}

// GET /repos/{owner}/{repo}/git/trees/{branch}?recursive=1
#[derive(Debug, Deserialize)]
pub struct TreeResponse {
    #[serde(default)]
    pub sha: String,
    #[serde(default)]
    pub tree: Vec<TreeEntry>,
    #[serde(default)]
    pub truncated: bool,
}

/// Repository level counters, deserialized straight from `GET /repos/{owner}/{repo}`.
/// `languages` comes from the separate languages endpoint and is merged in by the caller.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct RepoMetadata {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub stargazers_count: u64,
    #[serde(default)]
    pub forks_count: u64,
    #[serde(default)]
    pub watchers_count: u64,
    #[serde(default)]
    pub open_issues_count: u64,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub languages: BTreeMap<String, u64>,
}

impl RepoMetadata {
    /// `updated_at` parsed as RFC 3339, `None` when absent or malformed.
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(self.updated_at.as_deref())
    }
}

// Element of GET /repos/{owner}/{repo}/commits
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct CommitSummary {
    #[serde(default)]
    pub sha: String,
    #[serde(default)]
    pub commit: CommitDetail,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct CommitDetail {
    #[serde(default)]
    pub author: Option<CommitAuthor>,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct CommitAuthor {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
}

impl CommitSummary {
    pub fn new(sha: impl Into<String>, date: DateTime<Utc>, message: impl Into<String>) -> Self {
        Self {
            sha: sha.into(),
            commit: CommitDetail {
                author: Some(CommitAuthor {
                    name: None,
                    date: Some(date.to_rfc3339()),
                }),
                message: message.into(),
            },
        }
    }

    pub fn authored_at(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(
            self.commit
                .author
                .as_ref()
                .and_then(|author| author.date.as_deref()),
        )
    }
}

fn parse_timestamp(raw: Option<&str>) -> Option<DateTime<Utc>> {
    raw.and_then(|value| DateTime::parse_from_rfc3339(value).ok())
        .map(|dt| dt.with_timezone(&Utc))
}

#[derive(Debug, Deserialize)]
pub struct GitHubErrorResponse {
    #[serde(default)]
    pub message: String,
}
