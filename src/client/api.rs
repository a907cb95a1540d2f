use crate::error::ApiError;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

const ACCEPT_HEADER: &str = "application/vnd.github+json";
const API_VERSION_HEADER: &str = "2022-11-28";
const USER_AGENT: &str = concat!("gh-app-token/", env!("CARGO_PKG_VERSION"));

/// An app installation as returned by the authority
#[derive(Debug, Clone, Deserialize)]
pub struct Installation {
    pub id: u64,
    pub account: Option<InstallationAccount>,
}

/// The account (user or organization) that installed the app
#[derive(Debug, Clone, Deserialize)]
pub struct InstallationAccount {
    pub login: String,
}

/// An installation-scoped access token as returned by the authority
#[derive(Debug, Clone, Deserialize)]
pub struct AccessToken {
    pub token: String,
    pub expires_at: Option<String>,
}

/// Client for the authority's app endpoints, authenticated with a signed
/// app assertion as the bearer credential.
pub struct AuthorityClient {
    base_url: String,
    client: Client,
}

impl AuthorityClient {
    /// Create a new client with explicit request timeouts
    pub fn new(base_url: &str, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(5))
            .user_agent(USER_AGENT)
            .build()
            .expect("failed to create HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Issue a GET against an authority endpoint and parse the JSON body
    async fn get<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        assertion: &str,
    ) -> Result<T, ApiError> {
        let response = self
            .client
            .get(format!("{}{}", self.base_url, path))
            .bearer_auth(assertion)
            .header("Accept", ACCEPT_HEADER)
            .header("X-GitHub-Api-Version", API_VERSION_HEADER)
            .send()
            .await?;

        Self::parse_body(response).await
    }

    /// Issue a POST against an authority endpoint and parse the JSON body
    async fn post<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        assertion: &str,
    ) -> Result<T, ApiError> {
        let response = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .bearer_auth(assertion)
            .header("Accept", ACCEPT_HEADER)
            .header("X-GitHub-Api-Version", API_VERSION_HEADER)
            .send()
            .await?;

        Self::parse_body(response).await
    }

    async fn parse_body<T: for<'de> Deserialize<'de>>(
        response: reqwest::Response,
    ) -> Result<T, ApiError> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Authority { status, body });
        }

        response.json().await.map_err(ApiError::from)
    }

    /// Resolve the installation the token should be scoped to.
    ///
    /// Lists the app's installations and picks the first one, or, when
    /// `account` is given, the installation whose account login matches it
    /// case-insensitively.
    pub async fn resolve_installation(
        &self,
        assertion: &str,
        account: Option<&str>,
    ) -> Result<Installation, ApiError> {
        let installations: Vec<Installation> =
            self.get("/app/installations", assertion).await?;

        debug!(count = installations.len(), "listed app installations");

        let selected = match account {
            Some(login) => installations.into_iter().find(|i| {
                i.account
                    .as_ref()
                    .is_some_and(|a| a.login.eq_ignore_ascii_case(login))
            }),
            None => installations.into_iter().next(),
        };

        let installation = selected.ok_or(ApiError::NoInstallationFound)?;
        info!(
            installation_id = installation.id,
            account = installation.account.as_ref().map(|a| a.login.as_str()),
            "resolved app installation"
        );
        Ok(installation)
    }

    /// Exchange the assertion for an installation-scoped access token
    pub async fn create_access_token(
        &self,
        assertion: &str,
        installation_id: u64,
    ) -> Result<AccessToken, ApiError> {
        let token: AccessToken = self
            .post(
                &format!("/app/installations/{installation_id}/access_tokens"),
                assertion,
            )
            .await?;

        info!(installation_id, "created installation access token");
        Ok(token)
    }
}
