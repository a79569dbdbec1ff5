use std::collections::HashMap;
use std::net::SocketAddr;
use std::time::Duration;

use serde::Deserialize;
use statcard_core::error::{Result, StatCardError};
use statcard_core::{is_valid_login, ContributionWindow};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewayConfig {
    pub version: u32,

    #[serde(default)]
    pub gateway: GatewaySection,

    #[serde(default)]
    pub card: CardSection,

    #[serde(default)]
    pub upstream: UpstreamSection,

    #[serde(default)]
    pub retry: RetrySection,

    #[serde(default)]
    pub cache: CacheSection,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            version: 1,
            gateway: GatewaySection::default(),
            card: CardSection::default(),
            upstream: UpstreamSection::default(),
            retry: RetrySection::default(),
            cache: CacheSection::default(),
        }
    }
}

impl GatewayConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(StatCardError::Config(format!(
                "unsupported config version: {}",
                self.version
            )));
        }

        self.gateway.validate()?;
        self.card.validate()?;
        self.upstream.validate()?;
        self.retry.validate()?;

        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewaySection {
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for GatewaySection {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

impl GatewaySection {
    pub fn validate(&self) -> Result<()> {
        self.listen_addr().map(|_| ())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.listen.parse().map_err(|e| {
            StatCardError::Config(format!("gateway.listen must be a valid SocketAddr: {e}"))
        })
    }
}

fn default_listen() -> String {
    "0.0.0.0:8080".into()
}

/// Which "stars" the card counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StarSource {
    /// Public star-count service.
    #[default]
    Service,
    /// Sum of `stargazers_count` over the account's own repositories.
    OwnedRepos,
    /// Number of repositories the account has starred.
    StarredRepos,
}

impl StarSource {
    pub fn as_str(self) -> &'static str {
        match self {
            StarSource::Service => "star_service",
            StarSource::OwnedRepos => "rest_owned_repos",
            StarSource::StarredRepos => "rest_starred_repos",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CardSection {
    #[serde(default = "default_user")]
    pub default_user: String,

    #[serde(default = "default_org")]
    pub default_org: String,

    #[serde(default = "default_title")]
    pub title: String,

    #[serde(default)]
    pub contribution_window: ContributionWindow,

    #[serde(default)]
    pub star_source: StarSource,
}

impl Default for CardSection {
    fn default() -> Self {
        Self {
            default_user: default_user(),
            default_org: default_org(),
            title: default_title(),
            contribution_window: ContributionWindow::default(),
            star_source: StarSource::default(),
        }
    }
}

impl CardSection {
    pub fn validate(&self) -> Result<()> {
        if !is_valid_login(&self.default_user) {
            return Err(StatCardError::Config(format!(
                "card.default_user is not a valid login: {:?}",
                self.default_user
            )));
        }
        if !is_valid_login(&self.default_org) {
            return Err(StatCardError::Config(format!(
                "card.default_org is not a valid login: {:?}",
                self.default_org
            )));
        }
        Ok(())
    }
}

fn default_user() -> String {
    "octocat".into()
}
fn default_org() -> String {
    "github".into()
}
fn default_title() -> String {
    "GitHub Stats".into()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpstreamSection {
    #[serde(default = "default_stars_url")]
    pub stars_url: String,

    #[serde(default = "default_api_url")]
    pub api_url: String,

    #[serde(default = "default_graphql_url")]
    pub graphql_url: String,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Name of the environment variable holding the provider credential.
    #[serde(default = "default_token_env")]
    pub token_env: String,

    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
}

impl Default for UpstreamSection {
    fn default() -> Self {
        Self {
            stars_url: default_stars_url(),
            api_url: default_api_url(),
            graphql_url: default_graphql_url(),
            user_agent: default_user_agent(),
            token_env: default_token_env(),
            request_timeout_ms: default_request_timeout_ms(),
        }
    }
}

impl UpstreamSection {
    pub fn validate(&self) -> Result<()> {
        for (name, url) in [
            ("upstream.stars_url", &self.stars_url),
            ("upstream.api_url", &self.api_url),
            ("upstream.graphql_url", &self.graphql_url),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(StatCardError::Config(format!(
                    "{name} must be an http(s) url"
                )));
            }
        }
        if !(1000..=60000).contains(&self.request_timeout_ms) {
            return Err(StatCardError::Config(
                "upstream.request_timeout_ms must be between 1000 and 60000".into(),
            ));
        }
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Credential from the process environment. Empty counts as absent.
    pub fn token_from_env(&self) -> Option<String> {
        std::env::var(&self.token_env)
            .ok()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
    }
}

fn default_stars_url() -> String {
    "https://api.github-star-counter.workers.dev/user".into()
}
fn default_api_url() -> String {
    "https://api.github.com".into()
}
fn default_graphql_url() -> String {
    "https://api.github.com/graphql".into()
}
fn default_user_agent() -> String {
    "statcard".into()
}
fn default_token_env() -> String {
    "GITHUB_TOKEN".into()
}
fn default_request_timeout_ms() -> u64 {
    10000
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RetrySection {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Backoff unit: the n-th retry waits `n * base_delay_ms`.
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,

    #[serde(default = "default_rest_max_pages")]
    pub rest_max_pages: u32,
}

impl Default for RetrySection {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
            rest_max_pages: default_rest_max_pages(),
        }
    }
}

impl RetrySection {
    pub fn validate(&self) -> Result<()> {
        if !(1..=10).contains(&self.max_attempts) {
            return Err(StatCardError::Config(
                "retry.max_attempts must be between 1 and 10".into(),
            ));
        }
        if self.base_delay_ms > 10000 {
            return Err(StatCardError::Config(
                "retry.base_delay_ms must be at most 10000".into(),
            ));
        }
        if !(1..=50).contains(&self.rest_max_pages) {
            return Err(StatCardError::Config(
                "retry.rest_max_pages must be between 1 and 50".into(),
            ));
        }
        Ok(())
    }
}

fn default_max_attempts() -> u32 {
    3
}
fn default_base_delay_ms() -> u64 {
    1000
}
fn default_rest_max_pages() -> u32 {
    10
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CacheSection {
    #[serde(default = "default_seed_env_prefix")]
    pub seed_env_prefix: String,

    /// Composite key -> highest known star total.
    #[serde(default)]
    pub seed: HashMap<String, u64>,
}

impl Default for CacheSection {
    fn default() -> Self {
        Self {
            seed_env_prefix: default_seed_env_prefix(),
            seed: HashMap::new(),
        }
    }
}

fn default_seed_env_prefix() -> String {
    "HIGHEST_STARS_".into()
}
