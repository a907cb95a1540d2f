use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Seconds the issued-at timestamp is backdated to absorb clock drift
/// between this machine and the authority.
pub const CLOCK_DRIFT_SECS: i64 = 60;

/// Assertion lifetime in seconds. The authority rejects anything past
/// ten minutes from now.
pub const ASSERTION_TTL_SECS: i64 = 600;

/// Validity window for one app assertion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IssuanceWindow {
    pub issued_at: i64,
    pub expires_at: i64,
}

impl IssuanceWindow {
    /// Compute the window from the current wall clock
    pub fn current() -> Self {
        Self::from_epoch(Utc::now().timestamp())
    }

    /// Compute the window from an explicit epoch-seconds instant
    pub fn from_epoch(now: i64) -> Self {
        Self {
            issued_at: now - CLOCK_DRIFT_SECS,
            expires_at: now + ASSERTION_TTL_SECS,
        }
    }
}

/// JWT claims identifying the GitHub App for a bounded time window
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppClaims {
    /// Issued at time (Unix timestamp, backdated)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issuer - the GitHub App identifier
    pub iss: String,
}

impl AppClaims {
    pub fn new(app_id: &str, window: IssuanceWindow) -> Self {
        Self {
            iat: window.issued_at,
            exp: window.expires_at,
            iss: app_id.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_invariants() {
        let window = IssuanceWindow::from_epoch(1_700_000_000);
        assert_eq!(window.issued_at, 1_700_000_000 - 60);
        assert_eq!(window.expires_at, 1_700_000_000 + 600);
        assert_eq!(window.expires_at - window.issued_at, 660);
    }

    #[test]
    fn test_current_window_is_backdated() {
        let before = Utc::now().timestamp();
        let window = IssuanceWindow::current();
        let after = Utc::now().timestamp();

        assert!(window.issued_at <= before);
        assert!(window.expires_at >= after + ASSERTION_TTL_SECS - 1);
        assert_eq!(window.expires_at - window.issued_at, 660);
    }

    #[test]
    fn test_claims_carry_app_id_as_issuer() {
        let window = IssuanceWindow::from_epoch(1_700_000_000);
        let claims = AppClaims::new("123456", window);

        assert_eq!(claims.iss, "123456");
        assert_eq!(claims.iat, window.issued_at);
        assert_eq!(claims.exp, window.expires_at);
    }

    #[test]
    fn test_claims_serialize_to_expected_fields() {
        let claims = AppClaims::new("42", IssuanceWindow::from_epoch(100));
        let json: serde_json::Value = serde_json::to_value(&claims).unwrap();

        assert_eq!(json["iat"], 40);
        assert_eq!(json["exp"], 700);
        assert_eq!(json["iss"], "42");
    }
}
