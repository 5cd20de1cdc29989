use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::config::GitHubConfig;
use crate::domain::release::ReleaseResponse;
use crate::domain::{ReleasePayload, ReleaseRecord, RepositoryId};
use crate::error::{Result, SemtagError};
use crate::github::ReleaseApi;

const USER_AGENT: &str = concat!("semtag/", env!("CARGO_PKG_VERSION"));

/// Blocking client for the GitHub releases API
pub struct GitHubClient {
    http: Client,
    base_url: String,
    token: Option<String>,
}

impl GitHubClient {
    /// Create a client for an API root such as `https://api.github.com`
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Result<Self> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(GitHubClient {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.trim().is_empty()),
        })
    }

    pub fn from_config(config: &GitHubConfig, token: Option<String>) -> Result<Self> {
        Self::new(config.api_url.clone(), token)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        debug!(%method, %url, "GitHub API request");

        let request = self
            .http
            .request(method, url)
            .header(ACCEPT, "application/vnd.github+json");

        match &self.token {
            Some(token) => request.header(AUTHORIZATION, format!("Bearer {}", token)),
            None => request,
        }
    }

    fn require_token(&self) -> Result<()> {
        if self.token.is_none() {
            return Err(SemtagError::MissingToken);
        }
        Ok(())
    }

    fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(SemtagError::Authentication);
        }
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(SemtagError::Http {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response)
    }

    fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
        let text = response.text()?;
        serde_json::from_str(&text).map_err(|e| {
            SemtagError::malformed(format!("Cannot parse GitHub API response: {}", e))
        })
    }
}

impl ReleaseApi for GitHubClient {
    #[instrument(skip(self))]
    fn find_release(&self, repository: &RepositoryId, tag: &str) -> Result<Option<ReleaseRecord>> {
        let path = format!("/repos/{}/releases/tags/{}", repository, tag);
        let response = self.request(Method::GET, &path).send()?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let release: ReleaseResponse = Self::decode(Self::check(response)?)?;
        Ok(Some(release.into()))
    }

    #[instrument(skip(self, payload), fields(tag = %payload.tag_name))]
    fn create_release(
        &self,
        repository: &RepositoryId,
        payload: &ReleasePayload,
    ) -> Result<ReleaseRecord> {
        self.require_token()?;

        let path = format!("/repos/{}/releases", repository);
        let response = self.request(Method::POST, &path).json(payload).send()?;

        let release: ReleaseResponse = Self::decode(Self::check(response)?)?;
        Ok(release.into())
    }

    #[instrument(skip(self, payload), fields(tag = %payload.tag_name))]
    fn update_release(
        &self,
        repository: &RepositoryId,
        id: u64,
        payload: &ReleasePayload,
    ) -> Result<ReleaseRecord> {
        self.require_token()?;

        let path = format!("/repos/{}/releases/{}", repository, id);
        let response = self.request(Method::PATCH, &path).json(payload).send()?;

        let release: ReleaseResponse = Self::decode(Self::check(response)?)?;
        Ok(release.into())
    }
}
