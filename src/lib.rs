//! gh-app-token
//!
//! Mints short-lived GitHub App installation access tokens: builds and signs
//! an RS256 app assertion, resolves the app installation, exchanges the
//! assertion for an installation-scoped access token, and publishes it for
//! the invoking session.

pub mod auth;
pub mod client;
pub mod error;
pub mod security;

pub use client::{issue_token, IssueRequest, IssuedToken, TokenOutput};
pub use error::AppError;
