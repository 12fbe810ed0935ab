use std::fmt::Display;
use std::future::Future;
use tracing::debug;

/// Runs `op` once per credential, in order, until one attempt succeeds.
///
/// Returns the first success or the error of the last attempt. An empty
/// credential list results in a single anonymous attempt (`None`).
pub async fn with_credential_fallback<'a, T, E, F, Fut>(
    credentials: &'a [String],
    mut op: F,
) -> Result<T, E>
where
    E: Display,
    F: FnMut(Option<&'a str>) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut attempts = credentials.iter().map(|credential| Some(credential.as_str()));
    let mut outcome = op(attempts.next().flatten()).await;

    for (index, credential) in attempts.enumerate() {
        match &outcome {
            Ok(_) => break,
            Err(err) => debug!("credential #{} rejected, trying next: {}", index, err),
        }
        outcome = op(credential).await;
    }

    outcome
}

#[cfg(test)]
mod tests {
    use super::*;

    fn credentials(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[tokio::test]
    async fn test_first_success_wins() {
        let creds = credentials(&["primary", "backup"]);
        let mut seen = Vec::new();
        let result: Result<&str, String> = with_credential_fallback(&creds, |credential| {
            seen.push(credential.map(str::to_owned));
            async move { Ok(credential.unwrap_or("anonymous")) }
        })
        .await;

        assert_eq!(result, Ok("primary"));
        assert_eq!(seen, vec![Some("primary".to_owned())]);
    }

    #[tokio::test]
    async fn test_falls_through_to_backup() {
        let creds = credentials(&["expired", "revoked", "valid"]);
        let mut seen = Vec::new();
        let result: Result<u32, String> = with_credential_fallback(&creds, |credential| {
            seen.push(credential.map(str::to_owned));
            async move {
                match credential {
                    Some("valid") => Ok(7),
                    other => Err(format!("rejected {:?}", other)),
                }
            }
        })
        .await;

        assert_eq!(result, Ok(7));
        assert_eq!(seen.len(), 3);
    }

    #[tokio::test]
    async fn test_returns_last_error() {
        let creds = credentials(&["a", "b"]);
        let result: Result<(), String> = with_credential_fallback(&creds, |credential| async move {
            Err(format!("bad {}", credential.unwrap_or_default()))
        })
        .await;

        assert_eq!(result, Err("bad b".to_owned()));
    }

    #[tokio::test]
    async fn test_empty_list_is_anonymous() {
        let creds: Vec<String> = Vec::new();
        let result: Result<Option<String>, String> =
            with_credential_fallback(&creds, |credential| async move {
                Ok(credential.map(str::to_owned))
            })
            .await;

        assert_eq!(result, Ok(None));
    }
}
