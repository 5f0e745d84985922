//! GitHub infrastructure: implements `TokenBroker` over the REST API.
//!
//! Requests are blocking `ureq` calls moved onto the blocking pool with
//! `tokio::task::spawn_blocking`.

use anyhow::Context;

use crate::application::ports::TokenBroker;
use crate::domain::TokenError;

const USER_AGENT: &str = concat!("runner-fleet/", env!("CARGO_PKG_VERSION"));
const API_VERSION: &str = "2022-11-28";

/// Which runner token endpoint to call.
#[derive(Debug, Clone, Copy)]
enum TokenKind {
    Registration,
    Removal,
}

impl TokenKind {
    fn path(self) -> &'static str {
        match self {
            Self::Registration => "registration-token",
            Self::Removal => "remove-token",
        }
    }
}

/// Production `TokenBroker` talking to `api_url`.
pub struct GithubTokenBroker {
    api_url: String,
}

impl GithubTokenBroker {
    #[must_use]
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
        }
    }

    fn endpoint(&self, org: &str, kind: TokenKind) -> String {
        format!(
            "{}/orgs/{org}/actions/runners/{}",
            self.api_url.trim_end_matches('/'),
            kind.path()
        )
    }

    async fn request(
        &self,
        org: &str,
        credential: &str,
        kind: TokenKind,
    ) -> Result<String, TokenError> {
        let url = self.endpoint(org, kind);
        let org = org.to_string();
        let auth = format!("Bearer {credential}");
        tokio::task::spawn_blocking(move || post_for_token(&url, &org, &auth))
            .await
            .context("spawn_blocking for token request")
            .map_err(|e| TokenError::Transient(format!("{e:#}")))?
    }
}

impl TokenBroker for GithubTokenBroker {
    async fn request_registration_token(
        &self,
        org: &str,
        credential: &str,
    ) -> Result<String, TokenError> {
        self.request(org, credential, TokenKind::Registration).await
    }

    async fn request_removal_token(&self, org: &str, credential: &str) -> Result<String, TokenError> {
        self.request(org, credential, TokenKind::Removal).await
    }
}

fn post_for_token(url: &str, org: &str, auth: &str) -> Result<String, TokenError> {
    let response = ureq::post(url)
        .set("Accept", "application/vnd.github+json")
        .set("Authorization", auth)
        .set("X-GitHub-Api-Version", API_VERSION)
        .set("User-Agent", USER_AGENT)
        .send_bytes(&[]);
    match response {
        Ok(resp) => {
            let body = resp
                .into_string()
                .map_err(|e| TokenError::Transient(format!("reading response: {e}")))?;
            parse_token(&body)
        }
        Err(ureq::Error::Status(code, _)) => Err(classify_status(code, org, url)),
        Err(ureq::Error::Transport(t)) => Err(TokenError::Transient(t.to_string())),
    }
}

/// Map a non-2xx status of the token endpoint to a `TokenError`.
pub(crate) fn classify_status(code: u16, org: &str, url: &str) -> TokenError {
    match code {
        401 => TokenError::Auth,
        403 => TokenError::Authorization {
            org: org.to_string(),
        },
        404 => TokenError::NotFound {
            org: org.to_string(),
            url: url.to_string(),
        },
        _ => TokenError::Transient(format!("HTTP {code} from {url}")),
    }
}

/// Extract the `token` string field from a token endpoint response body.
pub(crate) fn parse_token(body: &str) -> Result<String, TokenError> {
    let value: serde_json::Value = serde_json::from_str(body)
        .map_err(|e| TokenError::Protocol(format!("response is not JSON: {e}")))?;
    value
        .get("token")
        .and_then(serde_json::Value::as_str)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .ok_or_else(|| TokenError::Protocol("response has no string 'token' field".to_string()))
}
