//! Minimal XRPC client for an AT Protocol service

use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::Credentials;
use crate::feed::SourceError;

/// Body of `com.atproto.server.createSession`
#[derive(Debug, Serialize)]
struct CreateSessionRequest<'a> {
    identifier: &'a str,
    password: &'a str,
}

/// An authenticated session
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Bearer token for authenticated calls
    pub access_jwt: String,
    /// Account DID
    pub did: String,
    /// Account handle
    #[serde(default)]
    pub handle: String,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("did", &self.did)
            .field("handle", &self.handle)
            .finish_non_exhaustive()
    }
}

/// Response from `app.bsky.feed.getTimeline`
///
/// Entries stay untyped so one malformed post can't fail the whole page.
#[derive(Debug, Deserialize)]
struct TimelineResponse {
    feed: Vec<serde_json::Value>,
}

/// Error body returned by XRPC endpoints
#[derive(Debug, Default, Deserialize)]
struct XrpcErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl XrpcErrorBody {
    fn describe(&self, status: StatusCode) -> String {
        match (&self.error, &self.message) {
            (Some(error), Some(message)) => format!("{}: {}", error, message),
            (Some(text), None) | (None, Some(text)) => text.clone(),
            (None, None) => status
                .canonical_reason()
                .unwrap_or("unknown error")
                .to_string(),
        }
    }
}

/// Client for the XRPC endpoints of one AT Protocol service
#[derive(Debug, Clone)]
pub struct AtpClient {
    /// HTTP client for making requests
    http_client: Client,
    /// Service root, e.g. `https://bsky.social`
    base_url: String,
}

impl AtpClient {
    /// Creates a client for `base_url` whose requests give up after `timeout`
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, SourceError> {
        let http_client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("swipefeed/", env!("CARGO_PKG_VERSION")))
            .build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self {
            http_client,
            base_url,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn xrpc_url(&self, method: &str) -> String {
        format!("{}/xrpc/{}", self.base_url, method)
    }

    /// Logs in and returns a new session
    ///
    /// # Returns
    /// * `Ok(Session)` - Session carrying the access token
    /// * `Err(SourceError::Authentication)` - If the service refused the credentials
    /// * `Err(SourceError)` - On transport failure or any other rejection
    pub async fn create_session(&self, credentials: &Credentials) -> Result<Session, SourceError> {
        let response = self
            .http_client
            .post(self.xrpc_url("com.atproto.server.createSession"))
            .json(&CreateSessionRequest {
                identifier: &credentials.identifier,
                password: &credentials.password,
            })
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::BAD_REQUEST {
            let body = error_body(response).await;
            return Err(SourceError::Authentication(body.describe(status)));
        }

        let response = check_status(response).await?;
        response
            .json::<Session>()
            .await
            .map_err(|e| SourceError::InvalidResponse(format!("session: {}", e)))
    }

    /// Fetches up to `limit` entries of the home timeline
    pub async fn get_timeline(
        &self,
        session: &Session,
        limit: u8,
    ) -> Result<Vec<serde_json::Value>, SourceError> {
        let response = self
            .http_client
            .get(self.xrpc_url("app.bsky.feed.getTimeline"))
            .query(&[("limit", limit)])
            .bearer_auth(&session.access_jwt)
            .send()
            .await?;

        let response = check_status(response).await?;
        let timeline = response
            .json::<TimelineResponse>()
            .await
            .map_err(|e| SourceError::InvalidResponse(format!("timeline: {}", e)))?;

        debug!(entries = timeline.feed.len(), "Received timeline page");
        Ok(timeline.feed)
    }
}

/// Passes successful responses through and turns the rest into `Rejected`
async fn check_status(response: Response) -> Result<Response, SourceError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = error_body(response).await;
    Err(SourceError::Rejected {
        status: status.as_u16(),
        message: body.describe(status),
    })
}

async fn error_body(response: Response) -> XrpcErrorBody {
    response.json::<XrpcErrorBody>().await.unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base_url: &str) -> AtpClient {
        AtpClient::new(base_url, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_trailing_slash_is_trimmed() {
        assert_eq!(client("https://bsky.social/").base_url(), "https://bsky.social");
    }

    #[test]
    fn test_xrpc_url() {
        assert_eq!(
            client("https://bsky.social").xrpc_url("app.bsky.feed.getTimeline"),
            "https://bsky.social/xrpc/app.bsky.feed.getTimeline"
        );
    }

    #[test]
    fn test_error_body_description() {
        let body = XrpcErrorBody {
            error: Some("AuthenticationRequired".to_string()),
            message: Some("Invalid identifier or password".to_string()),
        };
        assert_eq!(
            body.describe(StatusCode::UNAUTHORIZED),
            "AuthenticationRequired: Invalid identifier or password"
        );

        let empty = XrpcErrorBody::default();
        assert_eq!(empty.describe(StatusCode::BAD_GATEWAY), "Bad Gateway");
    }

    #[test]
    fn test_session_parses_camel_case() {
        let session: Session = serde_json::from_str(
            r#"{"accessJwt":"jwt","refreshJwt":"r","did":"did:plc:abc","handle":"alice.bsky.social"}"#,
        )
        .unwrap();
        assert_eq!(session.access_jwt, "jwt");
        assert_eq!(session.did, "did:plc:abc");
        assert!(!format!("{:?}", session).contains("jwt"));
    }
}
