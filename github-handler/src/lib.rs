pub mod credentials;
pub mod error;

use credentials::with_credential_fallback;
use error::GitHubError;
use model::github::{CommitSummary, GitHubErrorResponse, RepoMetadata, TreeEntry, TreeResponse};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::{debug, warn};

/// Branch refs tried, in order, when listing a repository tree.
pub const TREE_BRANCHES: [&str; 2] = ["main", "master"];

pub const DEFAULT_API_URL: &str = "https://api.github.com";

#[derive(Debug, Clone)]
pub struct GitHubClientConfig {
    pub api_url: String,
    pub user_agent: String,
    pub timeout: Duration,
}

impl Default for GitHubClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_owned(),
            user_agent: concat!("evalhub/", env!("CARGO_PKG_VERSION")).to_owned(),
            timeout: Duration::from_secs(10),
        }
    }
}

/// Inputs the scorer expects from its caller, fetched in one go.
#[derive(Debug, Clone, Default)]
pub struct RepositorySignals {
    pub readme: String,
    pub metadata: RepoMetadata,
    pub commits: Vec<CommitSummary>,
}

#[derive(Debug, Clone)]
pub struct GitHubClient {
    client: reqwest::Client,
    api_url: String,
}

impl GitHubClient {
    pub fn new(config: &GitHubClientConfig) -> Result<Self, GitHubError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static("2022-11-28"),
        );
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout)
            .default_headers(headers)
            .build()
            .map_err(GitHubError::Client)?;

        Ok(Self {
            client,
            api_url: config.api_url.trim_end_matches('/').to_owned(),
        })
    }

    fn request(&self, path: &str, token: Option<&str>) -> (String, RequestBuilder) {
        let url = format!("{}{}", self.api_url, path);
        let mut builder = self.client.get(&url);
        if let Some(token) = token.filter(|token| !token.is_empty()) {
            builder = builder.bearer_auth(token);
        }
        (url, builder)
    }

    async fn send(&self, url: &str, builder: RequestBuilder) -> Result<Response, GitHubError> {
        let response = builder.send().await.map_err(|source| GitHubError::Request {
            url: url.to_owned(),
            source,
        })?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<GitHubErrorResponse>()
                .await
                .map(|body| body.message)
                .unwrap_or_default();
            return Err(GitHubError::Status {
                url: url.to_owned(),
                status: status.as_u16(),
                message,
            });
        }
        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        token: Option<&str>,
    ) -> Result<T, GitHubError> {
        let (url, builder) = self.request(path, token);
        let response = self.send(&url, builder).await?;
        response
            .json::<T>()
            .await
            .map_err(|source| GitHubError::Decode { url, source })
    }

    /// Recursive file listing of the default branch, trying `main` then `master`.
    pub async fn fetch_tree(
        &self,
        owner: &str,
        repo: &str,
        token: Option<&str>,
    ) -> Result<Vec<TreeEntry>, GitHubError> {
        for branch in TREE_BRANCHES {
            let path = format!("/repos/{}/{}/git/trees/{}?recursive=1", owner, repo, branch);
            match self.get_json::<TreeResponse>(&path, token).await {
                Ok(response) => {
                    if response.truncated {
                        warn!("Tree listing of {}/{} was truncated by the api", owner, repo);
                    }
                    debug!(
                        "Fetched {} tree entries for {}/{}@{}",
                        response.tree.len(),
                        owner,
                        repo,
                        branch
                    );
                    return Ok(response.tree);
                }
                Err(err) => warn!("Tree fetch for {}/{}@{} failed: {}", owner, repo, branch, err),
            }
        }

        Err(GitHubError::TreeUnavailable {
            repo: format!("{}/{}", owner, repo),
            branches: TREE_BRANCHES.iter().map(|b| b.to_string()).collect(),
        })
    }

    /// [`fetch_tree`](Self::fetch_tree) retried with each credential in order.
    pub async fn fetch_tree_with_fallback(
        &self,
        owner: &str,
        repo: &str,
        credentials: &[String],
    ) -> Result<Vec<TreeEntry>, GitHubError> {
        with_credential_fallback(credentials, |token| self.fetch_tree(owner, repo, token)).await
    }

    /// Repository counters with the language byte map merged in.
    pub async fn fetch_metadata(
        &self,
        owner: &str,
        repo: &str,
        token: Option<&str>,
    ) -> Result<RepoMetadata, GitHubError> {
        let mut metadata: RepoMetadata = self
            .get_json(&format!("/repos/{}/{}", owner, repo), token)
            .await?;

        match self
            .get_json::<BTreeMap<String, u64>>(&format!("/repos/{}/{}/languages", owner, repo), token)
            .await
        {
            Ok(languages) => metadata.languages = languages,
            Err(err) => warn!("Languages of {}/{} unavailable: {}", owner, repo, err),
        }
        Ok(metadata)
    }

    /// Raw README text; a repository without README yields an empty string.
    pub async fn fetch_readme(
        &self,
        owner: &str,
        repo: &str,
        token: Option<&str>,
    ) -> Result<String, GitHubError> {
        let (url, builder) = self.request(&format!("/repos/{}/{}/readme", owner, repo), token);
        let builder = builder.header(ACCEPT, "application/vnd.github.raw+json");

        match self.send(&url, builder).await {
            Ok(response) => response
                .text()
                .await
                .map_err(|source| GitHubError::Decode { url, source }),
            Err(err) if err.status() == Some(StatusCode::NOT_FOUND.as_u16()) => {
                debug!("{}/{} has no README", owner, repo);
                Ok(String::new())
            }
            Err(err) => Err(err),
        }
    }

    /// Most recent commits on the default branch, newest first as returned by the api.
    pub async fn fetch_commits(
        &self,
        owner: &str,
        repo: &str,
        token: Option<&str>,
        per_page: u8,
    ) -> Result<Vec<CommitSummary>, GitHubError> {
        self.get_json(
            &format!("/repos/{}/{}/commits?per_page={}", owner, repo, per_page.min(100)),
            token,
        )
        .await
    }

    /// README, metadata and commits fetched concurrently, each through the
    /// ordered credential list.
    pub async fn fetch_signals(
        &self,
        owner: &str,
        repo: &str,
        credentials: &[String],
        commit_limit: u8,
    ) -> Result<RepositorySignals, GitHubError> {
        let (readme, metadata, commits) = futures::try_join!(
            with_credential_fallback(credentials, |token| self.fetch_readme(owner, repo, token)),
            with_credential_fallback(credentials, |token| self.fetch_metadata(owner, repo, token)),
            with_credential_fallback(credentials, |token| {
                self.fetch_commits(owner, repo, token, commit_limit)
            }),
        )?;

        Ok(RepositorySignals {
            readme,
            metadata,
            commits,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::Method::GET;
    use httpmock::MockServer;
    use serde_json::json;

    fn client_for(server: &MockServer) -> GitHubClient {
        GitHubClient::new(&GitHubClientConfig {
            api_url: server.base_url(),
            user_agent: "evalhub-test".to_owned(),
            timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_tree_prefers_main() {
        let server = MockServer::start_async().await;
        let main = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/repos/octo/demo/git/trees/main")
                    .query_param("recursive", "1")
                    .header("authorization", "Bearer secret");
                then.status(200).json_body(json!({
                    "sha": "1",
                    "tree": [{"path": "src", "type": "tree"}, {"path": "src/lib.rs", "type": "blob"}],
                    "truncated": false
                }));
            })
            .await;

        let tree = client_for(&server)
            .fetch_tree("octo", "demo", Some("secret"))
            .await
            .unwrap();
        assert_eq!(tree, vec![TreeEntry::tree("src"), TreeEntry::blob("src/lib.rs")]);
        main.assert_async().await;
    }

    #[tokio::test]
    async fn test_tree_falls_back_to_master() {
        let server = MockServer::start_async().await;
        let main = server
            .mock_async(|when, then| {
                when.method(GET).path("/repos/octo/legacy/git/trees/main");
                then.status(404).json_body(json!({"message": "Not Found"}));
            })
            .await;
        let master = server
            .mock_async(|when, then| {
                when.method(GET).path("/repos/octo/legacy/git/trees/master");
                then.status(200)
                    .json_body(json!({"tree": [{"path": "README.md", "type": "blob"}]}));
            })
            .await;

        let tree = client_for(&server)
            .fetch_tree("octo", "legacy", None)
            .await
            .unwrap();
        assert_eq!(tree, vec![TreeEntry::blob("README.md")]);
        main.assert_async().await;
        master.assert_async().await;
    }

    #[tokio::test]
    async fn test_tree_unavailable_on_both_branches() {
        let server = MockServer::start_async().await;
        let failing = server
            .mock_async(|when, then| {
                when.method(GET).path_contains("/git/trees/");
                then.status(500).body("boom");
            })
            .await;

        let err = client_for(&server)
            .fetch_tree("octo", "gone", None)
            .await
            .unwrap_err();
        assert!(matches!(err, GitHubError::TreeUnavailable { .. }));
        failing.assert_hits_async(2).await;
    }

    #[tokio::test]
    async fn test_metadata_merges_languages() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/repos/octo/demo");
                then.status(200).json_body(json!({
                    "full_name": "octo/demo",
                    "stargazers_count": 25,
                    "forks_count": 3,
                    "watchers_count": 5,
                    "open_issues_count": 10,
                    "updated_at": "2025-01-01T00:00:00Z",
                    "private": false
                }));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/repos/octo/demo/languages");
                then.status(200).json_body(json!({"Rust": 1200, "Shell": 30}));
            })
            .await;

        let metadata = client_for(&server)
            .fetch_metadata("octo", "demo", None)
            .await
            .unwrap();
        assert_eq!(metadata.full_name, "octo/demo");
        assert_eq!(metadata.stargazers_count, 25);
        assert_eq!(metadata.languages.get("Rust"), Some(&1200));
        assert!(metadata.updated_at().is_some());
    }

    #[tokio::test]
    async fn test_missing_readme_is_empty() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/repos/octo/bare/readme");
                then.status(404).json_body(json!({"message": "Not Found"}));
            })
            .await;

        let readme = client_for(&server)
            .fetch_readme("octo", "bare", None)
            .await
            .unwrap();
        assert!(readme.is_empty());
    }

    #[tokio::test]
    async fn test_signals_use_backup_credential() {
        let server = MockServer::start_async().await;
        let rejected = server
            .mock_async(|when, then| {
                when.method(GET).header("authorization", "Bearer expired");
                then.status(401).json_body(json!({"message": "Bad credentials"}));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/repos/octo/demo/readme")
                    .header("authorization", "Bearer backup");
                then.status(200).body("# Demo\n");
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/repos/octo/demo")
                    .header("authorization", "Bearer backup");
                then.status(200).json_body(json!({"stargazers_count": 1}));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/repos/octo/demo/languages")
                    .header("authorization", "Bearer backup");
                then.status(200).json_body(json!({}));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/repos/octo/demo/commits")
                    .query_param("per_page", "30")
                    .header("authorization", "Bearer backup");
                then.status(200).json_body(json!([
                    {"sha": "a1", "commit": {"author": {"date": "2025-01-01T00:00:00Z"}, "message": "init"}}
                ]));
            })
            .await;

        let credentials = vec!["expired".to_owned(), "backup".to_owned()];
        let signals = client_for(&server)
            .fetch_signals("octo", "demo", &credentials, 30)
            .await
            .unwrap();

        assert_eq!(signals.readme, "# Demo\n");
        assert_eq!(signals.metadata.stargazers_count, 1);
        assert_eq!(signals.commits.len(), 1);
        rejected.assert_hits_async(3).await;
    }

    #[tokio::test]
    async fn test_tree_skips_rejected_credential() {
        let server = MockServer::start_async().await;
        let rejected = server
            .mock_async(|when, then| {
                when.method(GET).header("authorization", "Bearer expired");
                then.status(401).json_body(json!({"message": "Bad credentials"}));
            })
            .await;
        let accepted = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/repos/octo/demo/git/trees/main")
                    .header("authorization", "Bearer backup");
                then.status(200)
                    .json_body(json!({"tree": [{"path": "src/lib.rs", "type": "blob"}]}));
            })
            .await;

        let credentials = vec!["expired".to_owned(), "backup".to_owned()];
        let tree = client_for(&server)
            .fetch_tree_with_fallback("octo", "demo", &credentials)
            .await
            .unwrap();
        assert_eq!(tree, vec![TreeEntry::blob("src/lib.rs")]);
        // main and master with the rejected token, then main with the backup
        rejected.assert_hits_async(2).await;
        accepted.assert_async().await;
    }
}
