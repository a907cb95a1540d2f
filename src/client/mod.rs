pub mod api;

pub use api::{AccessToken, AuthorityClient, Installation, InstallationAccount};

use crate::auth::{AppClaims, AssertionSigner, IssuanceWindow};
use crate::error::{AppError, InputError};
use crate::security::{SecureBytes, SecureString};
use serde_json::json;
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Default variable name the token is published under. The consuming
/// tooling reads this from its environment.
pub const DEFAULT_VAR_NAME: &str = "GITHUB_TOKEN";

/// Everything needed to run one issuance pass
pub struct IssueRequest {
    pub app_id: String,
    pub private_key: SecureBytes,
    pub api_url: String,
    pub account: Option<String>,
    pub timeout: Duration,
}

/// The outcome of a successful issuance pass
pub struct IssuedToken {
    pub token: SecureString,
    pub installation_id: u64,
    pub account: Option<String>,
    pub expires_at: Option<String>,
}

/// Run the issuance pipeline: compute the validity window, build and sign
/// the app assertion, resolve an installation, and exchange the assertion
/// for an installation access token.
///
/// The flow is strictly linear and fail-fast; any step aborts the whole
/// pipeline and no partial token is returned.
pub async fn issue_token(request: &IssueRequest) -> Result<IssuedToken, AppError> {
    if request.app_id.trim().is_empty() {
        return Err(InputError::EmptyAppId.into());
    }

    let window = IssuanceWindow::current();
    let claims = AppClaims::new(&request.app_id, window);

    let signer = AssertionSigner::from_rsa_pem(request.private_key.as_bytes())?;
    let assertion = signer.sign(&claims)?;

    let client = AuthorityClient::new(&request.api_url, request.timeout);
    let installation = client
        .resolve_installation(&assertion, request.account.as_deref())
        .await?;
    let access = client
        .create_access_token(&assertion, installation.id)
        .await?;

    Ok(IssuedToken {
        token: SecureString::new(access.token),
        installation_id: installation.id,
        account: installation.account.map(|a| a.login),
        expires_at: access.expires_at,
    })
}

/// Output format for the issued token
#[derive(Clone, clap::ValueEnum)]
pub enum TokenOutput {
    /// Shell-escaped `export NAME=value` line, suitable for eval
    Export,
    /// Plain `NAME=value` line
    Env,
    /// JSON object with token, installation id and expiry
    Json,
    /// The bare token, for scripting
    Token,
}

impl TokenOutput {
    /// Render the issued token under the given variable name
    pub fn format(&self, issued: &IssuedToken, var_name: &str) -> String {
        match self {
            TokenOutput::Export => format!(
                "export {}={}",
                var_name,
                shell_escape::escape(issued.token.as_str().into())
            ),
            TokenOutput::Env => format!("{}={}", var_name, issued.token.as_str()),
            TokenOutput::Json => {
                let value = json!({
                    "token": issued.token.as_str(),
                    "installation_id": issued.installation_id,
                    "account": issued.account,
                    "expires_at": issued.expires_at,
                });
                serde_json::to_string_pretty(&value).unwrap_or_else(|_| "{}".to_string())
            }
            TokenOutput::Token => issued.token.as_str().to_string(),
        }
    }
}

/// Append a `NAME=value` line to an environment file, as used by GitHub
/// Actions' `$GITHUB_ENV` mechanism
pub fn write_env_file(path: &Path, var_name: &str, issued: &IssuedToken) -> Result<(), AppError> {
    use std::io::Write;

    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;
    writeln!(file, "{}={}", var_name, issued.token.as_str())?;
    Ok(())
}

/// Options controlling how the issued token is published
pub struct PublishOptions {
    pub format: TokenOutput,
    pub var_name: String,
    pub github_env: bool,
}

/// Run the pipeline and publish the result.
///
/// The rendered token goes to stdout so `eval "$(gh-app-token ...)"` works;
/// the confirmation goes to stderr. Errors propagate to the caller so the
/// key material held in the request zeroizes on the way out.
pub async fn handle_issue_command(
    request: IssueRequest,
    options: PublishOptions,
) -> Result<(), AppError> {
    let issued = issue_token(&request).await?;

    if options.github_env {
        let path = std::env::var("GITHUB_ENV").map_err(|_| {
            AppError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "GITHUB_ENV environment variable not set",
            ))
        })?;
        write_env_file(Path::new(&path), &options.var_name, &issued)?;
    } else {
        println!("{}", options.format.format(&issued, &options.var_name));
    }

    info!(
        installation_id = issued.installation_id,
        account = issued.account.as_deref(),
        expires_at = issued.expires_at.as_deref(),
        "published installation access token"
    );
    eprintln!(
        "Token issued for installation {} and published as {}",
        issued.installation_id, options.var_name
    );

    Ok(())
}
