use thiserror::Error;

#[derive(Error, Debug)]
pub enum GitHubError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("github api error {status} for {url}: {message}")]
    Status {
        url: String,
        status: u16,
        message: String,
    },

    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("no tree found for {repo} on branches {branches:?}")]
    TreeUnavailable {
        repo: String,
        branches: Vec<String>,
    },

    #[error("failed to build http client: {0}")]
    Client(#[source] reqwest::Error),
}

impl GitHubError {
    pub fn status(&self) -> Option<u16> {
        match self {
            GitHubError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
