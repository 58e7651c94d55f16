//! GitHub API client
//!
//! Sync HTTP via ureq. One client is created per session and passed by
//! reference to whoever needs to fetch; there is no global instance.

use super::queries::{
    GraphQlError, GraphQlRequest, GraphQlResponse, RepositoryData, RepositoryNode, WorkflowsNode,
    REPOSITORY_QUERY, WORKFLOWS_QUERY,
};
use super::{GithubError, GithubResult};
use crate::config::GithubConfig;
use crate::models::{RepositorySnapshot, COMMIT_HISTORY_LIMIT};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, warn};

const USER_AGENT: &str = concat!("repohealth/", env!("CARGO_PKG_VERSION"));

/// Result of the token scope check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenScopes {
    /// Scopes from the `X-OAuth-Scopes` header. Empty for fine-grained tokens.
    pub granted: Vec<String>,
    pub has_only_allowed: bool,
}

impl TokenScopes {
    pub fn from_header(header: Option<&str>, allowed: &[String]) -> Self {
        let granted: Vec<String> = header
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();
        let has_only_allowed = granted.iter().all(|s| allowed.contains(s));
        Self {
            granted,
            has_only_allowed,
        }
    }

    /// Granted scopes that are not on the allow-list
    pub fn disallowed<'a>(&'a self, allowed: &'a [String]) -> impl Iterator<Item = &'a String> {
        self.granted.iter().filter(move |s| !allowed.contains(s))
    }
}

/// Authenticated GitHub session
pub struct GithubClient {
    config: GithubConfig,
    token: String,
    agent: ureq::Agent,
}

fn make_agent(timeout: Duration) -> ureq::Agent {
    ureq::config::Config::builder()
        .http_status_as_error(false) // Status codes are mapped to GithubError below
        .timeout_global(Some(timeout))
        .build()
        .new_agent()
}

fn header_str<'a>(response: &'a ureq::http::Response<ureq::Body>, name: &str) -> Option<&'a str> {
    response.headers().get(name).and_then(|v| v.to_str().ok())
}

fn rate_limit_reset(response: &ureq::http::Response<ureq::Body>) -> Option<DateTime<Utc>> {
    header_str(response, "x-ratelimit-reset")
        .and_then(|v| v.trim().parse::<i64>().ok())
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
}

fn is_rate_limited(response: &ureq::http::Response<ureq::Body>) -> bool {
    let status = response.status().as_u16();
    status == 429
        || (status == 403 && header_str(response, "x-ratelimit-remaining") == Some("0"))
}

/// Map a non-success HTTP response to an error
fn error_for_status(response: ureq::http::Response<ureq::Body>) -> GithubError {
    let status = response.status().as_u16();
    if is_rate_limited(&response) {
        return GithubError::RateLimited {
            reset_at: rate_limit_reset(&response),
        };
    }
    let message = response.into_body().read_to_string().unwrap_or_default();
    match status {
        401 => GithubError::Unauthorized(message),
        403 => GithubError::Forbidden(message),
        _ => GithubError::Api { status, message },
    }
}

fn join_messages(errors: &[GraphQlError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

impl GithubClient {
    pub fn new(config: GithubConfig, token: impl Into<String>) -> Self {
        let agent = make_agent(Duration::from_secs(config.timeout_secs));
        Self {
            config,
            token: token.into(),
            agent,
        }
    }

    /// Build a client from config, failing if no token is configured
    pub fn from_config(config: &GithubConfig) -> GithubResult<Self> {
        let token = config
            .token
            .clone()
            .filter(|t| !t.trim().is_empty())
            .ok_or(GithubError::MissingToken)?;
        Ok(Self::new(config.clone(), token))
    }

    pub fn config(&self) -> &GithubConfig {
        &self.config
    }

    /// POST a GraphQL query, returning data and any partial errors
    fn execute_query<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: serde_json::Value,
    ) -> GithubResult<GraphQlResponse<T>> {
        let body = GraphQlRequest { query, variables };

        let response = self
            .agent
            .post(&self.config.api_url)
            .header("Authorization", &format!("bearer {}", self.token))
            .header("User-Agent", USER_AGENT)
            .header("Content-Type", "application/json")
            .send_json(&body)
            .map_err(|e| GithubError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(error_for_status(response));
        }

        let parsed: GraphQlResponse<T> = response
            .into_body()
            .read_json()
            .map_err(|e| GithubError::Parse(e.to_string()))?;

        if parsed.errors.iter().any(|e| e.is_type("RATE_LIMITED")) {
            return Err(GithubError::RateLimited { reset_at: None });
        }

        Ok(parsed)
    }

    /// Fetch everything the scorers need about a repository
    pub fn fetch_repository_snapshot(
        &self,
        owner: &str,
        repo: &str,
    ) -> GithubResult<RepositorySnapshot> {
        debug!("Fetching repository {}/{}", owner, repo);
        let response: GraphQlResponse<RepositoryData<RepositoryNode>> = self.execute_query(
            REPOSITORY_QUERY,
            json!({ "owner": owner, "name": repo, "historyLimit": COMMIT_HISTORY_LIMIT }),
        )?;

        let repository = response.data.and_then(|d| d.repository);
        match repository {
            Some(node) => {
                if !response.errors.is_empty() {
                    // e.g. vulnerability alerts need admin rights; the rest is usable
                    warn!(
                        "Partial data for {}/{}: {}",
                        owner,
                        repo,
                        join_messages(&response.errors)
                    );
                }
                Ok(node.into_snapshot())
            }
            None if response.errors.is_empty()
                || response.errors.iter().any(|e| e.is_type("NOT_FOUND")) =>
            {
                Err(GithubError::NotFound {
                    owner: owner.to_string(),
                    repo: repo.to_string(),
                })
            }
            None => Err(GithubError::Api {
                status: 200,
                message: join_messages(&response.errors),
            }),
        }
    }

    /// List workflow files under `.github/workflows`.
    ///
    /// Never fails: any error yields `None` and the quality score degrades.
    pub fn fetch_workflow_listing(&self, owner: &str, repo: &str) -> Option<Vec<String>> {
        let response: GraphQlResponse<RepositoryData<WorkflowsNode>> = match self
            .execute_query(WORKFLOWS_QUERY, json!({ "owner": owner, "name": repo }))
        {
            Ok(r) => r,
            Err(e) => {
                warn!("Could not list workflows for {}/{}: {}", owner, repo, e);
                return None;
            }
        };

        let listing = response
            .data
            .and_then(|d| d.repository)
            .and_then(WorkflowsNode::into_listing);
        debug!(
            "Workflows for {}/{}: {}",
            owner,
            repo,
            listing.as_ref().map(Vec::len).unwrap_or(0)
        );
        listing
    }

    /// Check which OAuth scopes the token carries
    pub fn validate_token(&self) -> GithubResult<TokenScopes> {
        let url = format!("{}/user", self.config.rest_url.trim_end_matches('/'));
        let response = self
            .agent
            .get(&url)
            .header("Authorization", &format!("bearer {}", self.token))
            .header("User-Agent", USER_AGENT)
            .header("Accept", "application/vnd.github+json")
            .call()
            .map_err(|e| GithubError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(error_for_status(response));
        }

        let scopes = TokenScopes::from_header(
            header_str(&response, "x-oauth-scopes"),
            &self.config.allowed_scopes,
        );
        debug!("Token scopes: {:?}", scopes.granted);
        Ok(scopes)
    }

    /// Validate the token and reject it if it carries scopes beyond the
    /// allow-list
    pub fn require_allowed_scopes(&self) -> GithubResult<TokenScopes> {
        let scopes = self.validate_token()?;
        if !scopes.has_only_allowed {
            let disallowed = scopes
                .disallowed(&self.config.allowed_scopes)
                .cloned()
                .collect();
            return Err(GithubError::InsufficientScopes {
                granted: scopes.granted,
                disallowed,
            });
        }
        Ok(scopes)
    }
}
