use clap::Parser;
use gh_app_token::client::{
    handle_issue_command, IssueRequest, PublishOptions, TokenOutput, DEFAULT_VAR_NAME,
};
use gh_app_token::error::{AppError, InputError};
use gh_app_token::security::SecureBytes;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "gh-app-token")]
#[command(about = "Mint a short-lived GitHub App installation access token")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    /// GitHub App identifier
    #[arg(env = "GITHUB_APP_ID")]
    app_id: String,

    /// Path to the PEM-encoded RSA private key
    key_path: String,

    /// Select the installation belonging to this account instead of the
    /// first one listed
    #[arg(long)]
    account: Option<String>,

    /// Base URL of the GitHub API (set this for GitHub Enterprise)
    #[arg(long, env = "GITHUB_API_URL", default_value = "https://api.github.com")]
    api_url: String,

    /// Output format for the issued token
    #[arg(short, long, default_value = "export")]
    format: TokenOutput,

    /// Variable name the token is published under
    #[arg(long, default_value = DEFAULT_VAR_NAME)]
    var_name: String,

    /// Append the token to the file named by $GITHUB_ENV instead of stdout
    #[arg(long)]
    github_env: bool,

    /// Request timeout in seconds for each authority call
    #[arg(long, default_value = "10")]
    timeout_secs: u64,
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Logs go to stderr so stdout stays eval-able; RUST_LOG takes
    // precedence over the built-in default
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("gh_app_token=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let private_key = std::fs::read(&cli.key_path).map_err(|source| {
        AppError::Input(InputError::KeyRead {
            path: cli.key_path.clone(),
            source,
        })
    })?;

    let request = IssueRequest {
        app_id: cli.app_id,
        private_key: SecureBytes::new(private_key),
        api_url: cli.api_url,
        account: cli.account,
        timeout: Duration::from_secs(cli.timeout_secs),
    };

    let options = PublishOptions {
        format: cli.format,
        var_name: cli.var_name,
        github_env: cli.github_env,
    };

    // The request and the key material it owns are dropped before an
    // error propagates here, so exit does not skip their destructors
    if let Err(err) = handle_issue_command(request, options).await {
        if let AppError::Api(api_error) = &err {
            eprintln!("Error: {}", api_error.user_friendly_message());
            std::process::exit(1);
        }
        return Err(err);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positional_arguments_and_defaults() {
        let args = vec!["gh-app-token", "123456", "key.pem"];
        let cli = Cli::try_parse_from(args).unwrap();

        assert_eq!(cli.app_id, "123456");
        assert_eq!(cli.key_path, "key.pem");
        assert!(cli.account.is_none());
        assert_eq!(cli.api_url, "https://api.github.com");
        assert!(matches!(cli.format, TokenOutput::Export));
        assert_eq!(cli.var_name, "GITHUB_TOKEN");
        assert!(!cli.github_env);
        assert_eq!(cli.timeout_secs, 10);
    }

    #[test]
    fn test_all_flags() {
        let args = vec![
            "gh-app-token",
            "123456",
            "key.pem",
            "--account",
            "octo-org",
            "--api-url",
            "https://ghe.example.com/api/v3",
            "--format",
            "json",
            "--var-name",
            "GH_TOKEN",
            "--github-env",
            "--timeout-secs",
            "3",
        ];
        let cli = Cli::try_parse_from(args).unwrap();

        assert_eq!(cli.account.as_deref(), Some("octo-org"));
        assert_eq!(cli.api_url, "https://ghe.example.com/api/v3");
        assert!(matches!(cli.format, TokenOutput::Json));
        assert_eq!(cli.var_name, "GH_TOKEN");
        assert!(cli.github_env);
        assert_eq!(cli.timeout_secs, 3);
    }

    #[test]
    fn test_format_values() {
        for (value, expected) in [
            ("export", TokenOutput::Export),
            ("env", TokenOutput::Env),
            ("json", TokenOutput::Json),
            ("token", TokenOutput::Token),
        ] {
            let args = vec!["gh-app-token", "1", "key.pem", "--format", value];
            let cli = Cli::try_parse_from(args).unwrap();
            match (cli.format, expected) {
                (TokenOutput::Export, TokenOutput::Export) => (),
                (TokenOutput::Env, TokenOutput::Env) => (),
                (TokenOutput::Json, TokenOutput::Json) => (),
                (TokenOutput::Token, TokenOutput::Token) => (),
                _ => panic!("format mismatch for {value}"),
            }
        }

        let args = vec!["gh-app-token", "1", "key.pem", "--format", "yaml"];
        assert!(Cli::try_parse_from(args).is_err());
    }

    #[test]
    fn test_key_path_is_required() {
        let args = vec!["gh-app-token", "123456"];
        assert!(Cli::try_parse_from(args).is_err());
    }
}
