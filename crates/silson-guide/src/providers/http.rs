use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

use super::ProviderError;

const ERROR_BODY_LIMIT: usize = 256;

pub(crate) fn build_client(timeout: Duration) -> Result<reqwest::Client, ProviderError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|err| ProviderError::Client(err.to_string()))
}

/// Join a configured base URL and an API path without doubling slashes.
pub(crate) fn endpoint(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// POST a JSON body and decode the JSON answer, mapping every failure onto
/// [`ProviderError`].
pub(crate) async fn post_json<B, R>(
    request: reqwest::RequestBuilder,
    body: &B,
) -> Result<R, ProviderError>
where
    B: Serialize + ?Sized,
    R: DeserializeOwned,
{
    let response = request
        .json(body)
        .send()
        .await
        .map_err(|err| ProviderError::Transport(err.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ProviderError::Status {
            status: status.as_u16(),
            body: truncate(&body, ERROR_BODY_LIMIT),
        });
    }

    response
        .json::<R>()
        .await
        .map_err(|err| ProviderError::MalformedResponse(err.to_string()))
}

fn truncate(raw: &str, limit: usize) -> String {
    match raw.char_indices().nth(limit) {
        Some((index, _)) => format!("{}...", &raw[..index]),
        None => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_without_duplicate_slashes() {
        assert_eq!(
            endpoint("https://api.openai.com/v1/", "/chat/completions"),
            "https://api.openai.com/v1/chat/completions"
        );
        assert_eq!(
            endpoint("http://127.0.0.1:9000", "messages"),
            "http://127.0.0.1:9000/messages"
        );
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("보험료", 2), "보험...");
        assert_eq!(truncate("ok", 10), "ok");
    }
}
