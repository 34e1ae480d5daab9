//! # GitHub Pull Request Client
//!
//! The only hosting-service operation this tool needs is "create a pull
//! request". [`PullRequestApi`] is the seam the publisher talks to;
//! [`GitHubClient`] implements it over the REST API with `ureq`.
//!
//! Failures are classified here, at the client boundary, into the closed set
//! [`ApiFailure`]:
//!
//! - **Primary rate limit**: 403/429 with `x-ratelimit-remaining: 0`. The wait
//!   is the distance to `x-ratelimit-reset`.
//! - **Secondary rate limit**: 403/429 carrying `retry-after`, or whose message
//!   mentions a secondary rate limit.
//! - **Already exists**: 422 whose validation errors say a pull request for the
//!   branch already exists. The top-level message is only inspected when the
//!   response carries no validation errors.
//! - **Rejected**: any other HTTP error.
//! - **Transport**: the request never produced an HTTP response.

use crate::defaults::MAX_RETRY_AFTER_SECS;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use url::Url;

const ALREADY_EXISTS: &str = "A pull request already exists";
const SECONDARY_LIMIT: &str = "secondary rate limit";
const API_VERSION: &str = "2022-11-28";
const USER_AGENT: &str = concat!("workflow-sync/", env!("CARGO_PKG_VERSION"));

/// Payload for `POST /repos/{owner}/{repo}/pulls`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PullRequestRequest {
    #[serde(skip)]
    pub owner: String,
    #[serde(skip)]
    pub repo: String,
    pub title: String,
    pub head: String,
    pub base: String,
    pub body: String,
}

impl PullRequestRequest {
    /// Short description used in log lines.
    pub fn describe(&self) -> String {
        format!("POST /repos/{}/{}/pulls", self.owner, self.repo)
    }
}

/// Which throttling mechanism rejected a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitKind {
    /// Hourly request quota exhausted.
    Primary,
    /// Abuse-detection throttling.
    Secondary,
}

/// Classified failure of a pull request creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiFailure {
    RateLimited {
        kind: RateLimitKind,
        /// Seconds the service asked us to wait, if it said.
        retry_after: Option<u64>,
    },
    AlreadyExists {
        message: String,
    },
    Rejected {
        status: u16,
        message: String,
    },
    Transport {
        message: String,
    },
}

impl ApiFailure {
    /// Convert a final, non-retried failure into an [`Error`].
    pub fn into_error(self, url: &str) -> Error {
        match self {
            ApiFailure::RateLimited { retry_after, .. } => Error::RateLimitExceeded {
                attempts: 1,
                retry_after: retry_after.unwrap_or_default(),
            },
            ApiFailure::AlreadyExists { message } => Error::PullRequest {
                status: 422,
                message,
            },
            ApiFailure::Rejected { status, message } => Error::PullRequest { status, message },
            ApiFailure::Transport { message } => Error::Network {
                url: url.to_string(),
                message,
            },
        }
    }
}

/// The hosting-service operations consumed by the publisher.
pub trait PullRequestApi {
    fn create_pull_request(&self, request: &PullRequestRequest)
        -> std::result::Result<(), ApiFailure>;
}

/// Rate limit related response headers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RateLimitHeaders {
    /// `x-ratelimit-remaining`
    pub remaining: Option<u64>,
    /// `x-ratelimit-reset`, seconds since the epoch
    pub reset: Option<u64>,
    /// `retry-after`, seconds
    pub retry_after: Option<u64>,
}

impl RateLimitHeaders {
    fn from_response(response: &ureq::Response) -> Self {
        let number = |name: &str| response.header(name).and_then(|v| v.trim().parse().ok());
        Self {
            remaining: number("x-ratelimit-remaining"),
            reset: number("x-ratelimit-reset"),
            retry_after: number("retry-after"),
        }
    }
}

/// GitHub error document, e.g.
/// `{"message": "Validation Failed", "errors": [{"message": "..."}]}`.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    errors: Vec<serde_json::Value>,
}

impl ErrorBody {
    fn parse(body: &str) -> Self {
        serde_json::from_str(body).unwrap_or_default()
    }

    fn error_messages(&self) -> impl Iterator<Item = &str> {
        self.errors
            .iter()
            .filter_map(|e| e.get("message").and_then(|m| m.as_str()))
    }

    /// The most specific message available.
    fn summary(&self, status: u16) -> String {
        self.error_messages()
            .next()
            .or(self.message.as_deref())
            .map(str::to_string)
            .unwrap_or_else(|| format!("HTTP {}", status))
    }
}

/// Classify an unsuccessful pull request response.
///
/// `now` is the current time in seconds since the epoch, used to turn
/// `x-ratelimit-reset` into a wait.
pub fn classify_failure(
    status: u16,
    headers: &RateLimitHeaders,
    body: &str,
    now: u64,
) -> ApiFailure {
    let error = ErrorBody::parse(body);

    if status == 403 || status == 429 {
        if headers.remaining == Some(0) {
            return ApiFailure::RateLimited {
                kind: RateLimitKind::Primary,
                // Until one second past the reset.
                retry_after: headers
                    .reset
                    .map(|reset| reset.saturating_sub(now).saturating_add(1))
                    .map(|wait| wait.min(MAX_RETRY_AFTER_SECS)),
            };
        }
        let mentions_secondary = error
            .message
            .as_deref()
            .is_some_and(|m| m.to_lowercase().contains(SECONDARY_LIMIT));
        if headers.retry_after.is_some() || mentions_secondary {
            return ApiFailure::RateLimited {
                kind: RateLimitKind::Secondary,
                retry_after: headers.retry_after.map(|wait| wait.min(MAX_RETRY_AFTER_SECS)),
            };
        }
    }

    let existing = if error.errors.is_empty() {
        error.message.as_deref().filter(|m| m.contains(ALREADY_EXISTS))
    } else if status == 422 {
        error.error_messages().find(|m| m.contains(ALREADY_EXISTS))
    } else {
        None
    };
    if let Some(message) = existing {
        return ApiFailure::AlreadyExists {
            message: message.to_string(),
        };
    }

    ApiFailure::Rejected {
        status,
        message: error.summary(status),
    }
}

/// REST client for `api.github.com` (or a GitHub Enterprise API root).
pub struct GitHubClient {
    agent: ureq::Agent,
    api_url: Url,
    token: String,
}

impl GitHubClient {
    /// Create a client authenticating with `token`.
    ///
    /// `timeout` bounds every individual request.
    pub fn new(api_url: &str, token: &str, timeout: Duration) -> Result<Self> {
        if token.trim().is_empty() {
            return Err(Error::MissingToken);
        }

        // Url::join drops the last path segment unless it ends with '/'.
        let mut api_url = Url::parse(api_url)?;
        if !api_url.path().ends_with('/') {
            let path = format!("{}/", api_url.path());
            api_url.set_path(&path);
        }

        let agent = ureq::AgentBuilder::new()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build();

        Ok(Self {
            agent,
            api_url,
            token: token.trim().to_string(),
        })
    }

    /// Endpoint for pull requests of `owner/repo`.
    pub fn pulls_url(&self, owner: &str, repo: &str) -> Result<Url> {
        Ok(self
            .api_url
            .join(&format!("repos/{}/{}/pulls", owner, repo))?)
    }
}

impl PullRequestApi for GitHubClient {
    fn create_pull_request(
        &self,
        request: &PullRequestRequest,
    ) -> std::result::Result<(), ApiFailure> {
        let url = self
            .pulls_url(&request.owner, &request.repo)
            .map_err(|e| ApiFailure::Transport {
                message: e.to_string(),
            })?;

        log::debug!("{} (head: {}, base: {})", request.describe(), request.head, request.base);
        let result = self
            .agent
            .post(url.as_str())
            .set("Authorization", &format!("Bearer {}", self.token))
            .set("Accept", "application/vnd.github+json")
            .set("X-GitHub-Api-Version", API_VERSION)
            .send_json(request);

        match result {
            Ok(_) => Ok(()),
            Err(ureq::Error::Status(status, response)) => {
                let headers = RateLimitHeaders::from_response(&response);
                let body = response.into_string().unwrap_or_default();
                log::debug!("{} returned HTTP {}: {}", request.describe(), status, body);
                Err(classify_failure(status, &headers, &body, unix_now()))
            }
            Err(ureq::Error::Transport(transport)) => Err(ApiFailure::Transport {
                message: transport.to_string(),
            }),
        }
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}
