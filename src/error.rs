//! Errors shared by the speech-to-text, language-model and text-to-speech
//! capability interfaces.

use thiserror::Error;

// ---------------------------------------------------------------------------
// ProviderError
// ---------------------------------------------------------------------------

/// A capability call failed.  Never retried inside the crate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// HTTP transport or connection error.
    #[error("request failed: {0}")]
    Request(String),

    /// The request did not complete within the configured timeout.
    #[error("request timed out")]
    Timeout,

    /// The provider rejected the credentials (HTTP 401 / 403).
    #[error("provider rejected the API key (HTTP {0})")]
    Unauthorized(u16),

    /// Any other non-success HTTP status (quota, server error, …).
    #[error("provider returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body did not have the expected shape.
    #[error("failed to parse provider response: {0}")]
    Parse(String),

    /// The provider answered with nothing usable.
    #[error("provider returned an empty response")]
    EmptyResponse,
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ProviderError::Timeout
        } else if e.is_decode() {
            ProviderError::Parse(e.to_string())
        } else {
            ProviderError::Request(e.to_string())
        }
    }
}

/// Turn a non-success response into a [`ProviderError`], passing successful
/// ones through.
pub(crate) async fn check_status(
    response: reqwest::Response,
) -> Result<reqwest::Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
        return Err(ProviderError::Unauthorized(status.as_u16()));
    }
    let body = response.text().await.unwrap_or_default();
    Err(ProviderError::Status {
        status: status.as_u16(),
        body: truncate(&body, 300),
    })
}

fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}…", &s[..idx]),
        None => s.to_string(),
    }
}

/// Attach `Authorization: Bearer …` only for a non-empty key.
pub(crate) fn with_api_key(
    req: reqwest::RequestBuilder,
    api_key: Option<&str>,
) -> reqwest::RequestBuilder {
    match api_key {
        Some(key) if !key.is_empty() => req.bearer_auth(key),
        _ => req,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_keeps_short_bodies() {
        assert_eq!(truncate("quota exceeded", 300), "quota exceeded");
    }

    #[test]
    fn truncate_cuts_on_char_boundary() {
        assert_eq!(truncate("ééééé", 2), "éé…");
    }

    #[test]
    fn status_error_display() {
        let e = ProviderError::Status {
            status: 429,
            body: "rate limited".into(),
        };
        assert_eq!(e.to_string(), "provider returned HTTP 429: rate limited");
    }
}
