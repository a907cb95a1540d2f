use crate::auth::assertion::SigningInput;
use crate::auth::claims::AppClaims;
use crate::error::AuthError;
use jsonwebtoken::{crypto, Algorithm, EncodingKey};
use tracing::debug;

/// Signs app assertions with an RSA private key.
///
/// The key material is held only inside the `EncodingKey` for the lifetime
/// of the signer and is never logged or written anywhere.
pub struct AssertionSigner {
    key: EncodingKey,
}

impl AssertionSigner {
    /// Parse a PEM-encoded RSA private key
    pub fn from_rsa_pem(pem: &[u8]) -> Result<Self, AuthError> {
        let key = EncodingKey::from_rsa_pem(pem).map_err(AuthError::KeyParse)?;
        Ok(Self { key })
    }

    /// Sign the claims into a compact three-segment assertion.
    ///
    /// The RSA-SHA256 signature covers the UTF-8 bytes of the dot-joined
    /// encoded header and payload.
    pub fn sign(&self, claims: &AppClaims) -> Result<String, AuthError> {
        let input = SigningInput::new(claims)?;
        let message = input.message();

        let signature = crypto::sign(message.as_bytes(), &self.key, Algorithm::RS256)
            .map_err(AuthError::Signing)?;

        debug!(issuer = %claims.iss, "signed app assertion");
        Ok(format!("{message}.{signature}"))
    }
}
