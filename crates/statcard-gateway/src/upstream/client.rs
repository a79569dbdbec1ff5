//! Thin reqwest wrapper shared by every fetcher.

use reqwest::{RequestBuilder, Response};
use serde::Serialize;

use statcard_core::error::{Result, StatCardError};

use crate::config::UpstreamSection;

#[derive(Debug, Clone)]
pub struct UpstreamClient {
    client: reqwest::Client,
    token: Option<String>,
}

impl UpstreamClient {
    pub fn new(cfg: &UpstreamSection, token: Option<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(cfg.user_agent.clone())
            .timeout(cfg.request_timeout())
            .build()
            .map_err(|e| StatCardError::Internal(format!("http client build failed: {e}")))?;
        Ok(Self { client, token })
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// GET without credentials (third-party services never see the token).
    pub async fn get_public(&self, url: &str) -> Result<Response> {
        send(self.client.get(url)).await
    }

    /// GET against the provider, with the bearer credential when present.
    pub async fn get_provider(&self, url: &str) -> Result<Response> {
        send(self.authorize(self.client.get(url))).await
    }

    /// POST a JSON body to the provider with the bearer credential.
    pub async fn post_provider<B: Serialize + ?Sized>(&self, url: &str, body: &B) -> Result<Response> {
        send(self.authorize(self.client.post(url).json(body))).await
    }

    fn authorize(&self, req: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(t) => req.bearer_auth(t),
            None => req,
        }
    }
}

async fn send(req: RequestBuilder) -> Result<Response> {
    req.send()
        .await
        .map_err(|e| StatCardError::Upstream(format!("request failed: {e}")))
}

/// Map a non-success status to the matching error variant.
pub(crate) fn check_status(resp: Response, what: &str) -> Result<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    Err(match status.as_u16() {
        401 | 403 => StatCardError::Unauthorized(format!("{what}: {status}")),
        404 => StatCardError::NotFound(format!("{what}: {status}")),
        _ => StatCardError::Upstream(format!("{what}: {status}")),
    })
}
