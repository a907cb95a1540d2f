use crate::auth::claims::AppClaims;
use crate::error::AuthError;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use serde::{Deserialize, Serialize};

/// Fixed JWT header for app assertions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssertionHeader {
    pub typ: String,
    pub alg: String,
}

impl Default for AssertionHeader {
    fn default() -> Self {
        Self {
            typ: "JWT".to_string(),
            alg: "RS256".to_string(),
        }
    }
}

/// The two encoded segments the signature is computed over
#[derive(Debug, Clone)]
pub struct SigningInput {
    encoded_header: String,
    encoded_payload: String,
}

impl SigningInput {
    /// Encode the header and claims as base64url JWT segments.
    ///
    /// Each segment is the exact JSON serialization of the structure,
    /// base64url-encoded without padding.
    pub fn new(claims: &AppClaims) -> Result<Self, AuthError> {
        let header = serde_json::to_vec(&AssertionHeader::default())?;
        let payload = serde_json::to_vec(claims)?;

        Ok(Self {
            encoded_header: URL_SAFE_NO_PAD.encode(header),
            encoded_payload: URL_SAFE_NO_PAD.encode(payload),
        })
    }

    pub fn encoded_header(&self) -> &str {
        &self.encoded_header
    }

    pub fn encoded_payload(&self) -> &str {
        &self.encoded_payload
    }

    /// The dot-joined message the signature covers
    pub fn message(&self) -> String {
        format!("{}.{}", self.encoded_header, self.encoded_payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::claims::IssuanceWindow;

    fn decode_segment(segment: &str) -> serde_json::Value {
        let bytes = URL_SAFE_NO_PAD.decode(segment).unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_segments_use_urlsafe_alphabet_without_padding() {
        let claims = AppClaims::new("123456", IssuanceWindow::from_epoch(1_700_000_000));
        let input = SigningInput::new(&claims).unwrap();

        for segment in [input.encoded_header(), input.encoded_payload()] {
            assert!(!segment.contains('='));
            assert!(!segment.contains('+'));
            assert!(!segment.contains('/'));
            assert!(!segment.contains('\n'));
        }
    }

    #[test]
    fn test_header_decodes_to_fixed_structure() {
        let claims = AppClaims::new("123456", IssuanceWindow::from_epoch(1_700_000_000));
        let input = SigningInput::new(&claims).unwrap();

        let header = decode_segment(input.encoded_header());
        assert_eq!(header["typ"], "JWT");
        assert_eq!(header["alg"], "RS256");
    }

    #[test]
    fn test_payload_round_trips_claims() {
        let claims = AppClaims::new("987", IssuanceWindow::from_epoch(1_700_000_000));
        let input = SigningInput::new(&claims).unwrap();

        let payload = decode_segment(input.encoded_payload());
        assert_eq!(payload["iss"], "987");
        assert_eq!(payload["iat"], 1_700_000_000 - 60);
        assert_eq!(payload["exp"], 1_700_000_000 + 600);
    }

    #[test]
    fn test_message_is_dot_joined() {
        let claims = AppClaims::new("1", IssuanceWindow::from_epoch(0));
        let input = SigningInput::new(&claims).unwrap();

        let message = input.message();
        let parts: Vec<&str> = message.split('.').collect();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0], input.encoded_header());
        assert_eq!(parts[1], input.encoded_payload());
    }
}
