//! JWT token signing and validation.
//!
//! This module provides the JWT support for the Clinica authentication
//! system. All tokens are signed with HMAC-SHA256 (HS256) over a single
//! process-wide symmetric secret; issuer and audience come from
//! configuration and are enforced on every decode.
//!
//! Two token classes share the signing key but carry distinct claim
//! sets:
//!
//! - **Access tokens** ([`AccessTokenClaims`]): subject username, fresh
//!   `jti`, zero-or-one role name, 30-minute lifetime.
//! - **Activation tokens** ([`ActivationTokenClaims`]): email,
//!   3-minute lifetime, used to prove mailbox ownership.
//!
//! # Example
//!
//! ```ignore
//! use clinica_auth::token::jwt::JwtService;
//!
//! let jwt = JwtService::new(secret, issuer, audience);
//! let token = jwt.encode(&claims)?;
//! let decoded = jwt.decode::<AccessTokenClaims>(&token)?;
//! ```

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, TokenData, Validation, decode, decode_header,
    encode,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur during JWT operations.
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to encode a token.
    #[error("Failed to encode token: {message}")]
    EncodingError {
        /// Description of the encoding error.
        message: String,
    },

    /// Failed to decode a token.
    #[error("Failed to decode token: {message}")]
    DecodingError {
        /// Description of the decoding error.
        message: String,
    },

    /// The token has expired.
    #[error("Token expired")]
    Expired,

    /// The token signature is invalid.
    #[error("Invalid signature")]
    InvalidSignature,

    /// The token was signed with an algorithm other than HS256.
    #[error("Unexpected signing algorithm: {algorithm}")]
    UnexpectedAlgorithm {
        /// The algorithm found in the token header.
        algorithm: String,
    },

    /// The token claims are invalid (wrong issuer/audience, missing claim).
    #[error("Invalid claims: {message}")]
    InvalidClaims {
        /// Description of why claims are invalid.
        message: String,
    },
}

impl JwtError {
    /// Creates a new `EncodingError`.
    #[must_use]
    pub fn encoding_error(message: impl Into<String>) -> Self {
        Self::EncodingError {
            message: message.into(),
        }
    }

    /// Creates a new `DecodingError`.
    #[must_use]
    pub fn decoding_error(message: impl Into<String>) -> Self {
        Self::DecodingError {
            message: message.into(),
        }
    }

    /// Creates a new `InvalidClaims` error.
    #[must_use]
    pub fn invalid_claims(message: impl Into<String>) -> Self {
        Self::InvalidClaims {
            message: message.into(),
        }
    }

    /// Returns `true` if this is a validation error (expired, tampered,
    /// wrong issuer/audience/algorithm) as opposed to a malformed token.
    #[must_use]
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            Self::Expired
                | Self::InvalidSignature
                | Self::UnexpectedAlgorithm { .. }
                | Self::InvalidClaims { .. }
        )
    }
}

impl From<jsonwebtoken::errors::Error> for JwtError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match err.kind() {
            ErrorKind::ExpiredSignature => Self::Expired,
            ErrorKind::InvalidSignature => Self::InvalidSignature,
            ErrorKind::InvalidAlgorithm
            | ErrorKind::InvalidAlgorithmName
            | ErrorKind::MissingAlgorithm => Self::UnexpectedAlgorithm {
                algorithm: "unknown".to_string(),
            },
            ErrorKind::InvalidAudience
            | ErrorKind::InvalidIssuer
            | ErrorKind::InvalidSubject
            | ErrorKind::MissingRequiredClaim(_) => Self::invalid_claims(err.to_string()),
            _ => Self::decoding_error(err.to_string()),
        }
    }
}

// ============================================================================
// Token Claims
// ============================================================================

/// Access token claims.
///
/// Self-contained bearer credential for a single request window. The
/// username travels in the `name` claim; the `jti` is a fresh UUID per
/// issuance, so two tokens minted for the same user are never
/// byte-identical.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AccessTokenClaims {
    /// Issuer (Clinica server URL).
    pub iss: String,

    /// The authenticated username.
    pub name: String,

    /// Audience (API base URL).
    pub aud: String,

    /// Expiration time (Unix timestamp).
    pub exp: i64,

    /// Issued at (Unix timestamp).
    pub iat: i64,

    /// Unique token identifier.
    pub jti: String,

    /// Role name of the subject, if the user has a role assigned.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

/// Activation token claims.
///
/// Short-lived credential proving control of an email address, used for
/// account-activation links. Structurally distinct from access tokens:
/// it carries an email and no subject or role.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ActivationTokenClaims {
    /// Issuer (Clinica server URL).
    pub iss: String,

    /// Audience (API base URL).
    pub aud: String,

    /// Expiration time (Unix timestamp).
    pub exp: i64,

    /// Issued at (Unix timestamp).
    pub iat: i64,

    /// Unique token identifier.
    pub jti: String,

    /// Email address this token proves control of.
    pub email: String,
}

// ============================================================================
// JWT Service
// ============================================================================

/// Service for signing and validating JWT tokens.
///
/// This service is `Send + Sync` and is shared across all concurrent
/// token operations behind an `Arc`; signing is a pure function of the
/// key and payload, so no synchronization is needed.
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    audience: String,
}

impl JwtService {
    /// Creates a new JWT service from the shared HMAC secret.
    ///
    /// # Arguments
    ///
    /// * `secret` - The symmetric HMAC-SHA256 signing secret
    /// * `issuer` - The issuer claim value (server URL)
    /// * `audience` - The audience claim value (API base URL)
    #[must_use]
    pub fn new(secret: &str, issuer: impl Into<String>, audience: impl Into<String>) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            issuer: issuer.into(),
            audience: audience.into(),
        }
    }

    /// Encodes claims into a signed HS256 token.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or signing fails.
    pub fn encode<T: Serialize>(&self, claims: &T) -> Result<String, JwtError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| JwtError::encoding_error(e.to_string()))
    }

    /// Decodes and fully validates a token.
    ///
    /// Enforces signature, issuer, audience, expiry, and that the header
    /// algorithm is exactly HS256.
    ///
    /// # Errors
    ///
    /// Returns a [`JwtError`] if any check fails.
    pub fn decode<T: DeserializeOwned>(&self, token: &str) -> Result<TokenData<T>, JwtError> {
        self.decode_with_lifetime(token, true)
    }

    /// Decodes a token without validating expiration.
    ///
    /// Used exclusively by the refresh flow, where the presented access
    /// token is expected to have expired already. Signature, issuer,
    /// audience, and algorithm are still enforced.
    ///
    /// # Errors
    ///
    /// Returns a [`JwtError`] if any non-lifetime check fails.
    pub fn decode_allow_expired<T: DeserializeOwned>(
        &self,
        token: &str,
    ) -> Result<TokenData<T>, JwtError> {
        self.decode_with_lifetime(token, false)
    }

    fn decode_with_lifetime<T: DeserializeOwned>(
        &self,
        token: &str,
        validate_exp: bool,
    ) -> Result<TokenData<T>, JwtError> {
        self.check_algorithm(token)?;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&self.issuer]);
        validation.set_audience(&[&self.audience]);
        validation.validate_exp = validate_exp;

        decode(token, &self.decoding_key, &validation).map_err(JwtError::from)
    }

    /// Rejects tokens whose header names any algorithm other than HS256.
    ///
    /// The decode call below restricts algorithms too; this explicit
    /// header check guarantees the rejection survives any future change
    /// to the `Validation` setup (algorithm-confusion defense).
    fn check_algorithm(&self, token: &str) -> Result<(), JwtError> {
        let header =
            decode_header(token).map_err(|e| JwtError::decoding_error(e.to_string()))?;
        if header.alg != Algorithm::HS256 {
            return Err(JwtError::UnexpectedAlgorithm {
                algorithm: format!("{:?}", header.alg),
            });
        }
        Ok(())
    }

    /// Reads a single claim from a token's payload without validation.
    ///
    /// This is a read, not a trust decision: the signature is NOT
    /// checked. Callers must run [`decode`](Self::decode) (or the
    /// allow-expired variant) before acting on extracted identity in any
    /// security-sensitive path.
    ///
    /// Returns `None` if the token is malformed or the claim is absent.
    #[must_use]
    pub fn extract_claim(&self, token: &str, claim: &str) -> Option<serde_json::Value> {
        let payload = token.split('.').nth(1)?;
        let bytes = URL_SAFE_NO_PAD.decode(payload).ok()?;
        let mut claims: serde_json::Map<String, serde_json::Value> =
            serde_json::from_slice(&bytes).ok()?;
        claims.remove(claim)
    }

    /// Returns the issuer URL.
    #[must_use]
    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Returns the audience URL.
    #[must_use]
    pub fn audience(&self) -> &str {
        &self.audience
    }
}

/// Returns the current Unix timestamp.
#[must_use]
pub(crate) fn now_timestamp() -> i64 {
    OffsetDateTime::now_utc().unix_timestamp()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-test-secret-test-secret-0001";
    const ISSUER: &str = "https://clinica.example.com";
    const AUDIENCE: &str = "https://clinica.example.com/api";

    fn service() -> JwtService {
        JwtService::new(SECRET, ISSUER, AUDIENCE)
    }

    fn access_claims(expires_in: i64) -> AccessTokenClaims {
        let now = now_timestamp();
        AccessTokenClaims {
            iss: ISSUER.to_string(),
            name: "drperez".to_string(),
            aud: AUDIENCE.to_string(),
            exp: now + expires_in,
            iat: now,
            jti: uuid::Uuid::new_v4().to_string(),
            role: Some("Doctor".to_string()),
        }
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        let jwt = service();
        let token = jwt.encode(&access_claims(1800)).unwrap();
        assert_eq!(token.split('.').count(), 3);

        let decoded = jwt.decode::<AccessTokenClaims>(&token).unwrap();
        assert_eq!(decoded.claims.name, "drperez");
        assert_eq!(decoded.claims.role.as_deref(), Some("Doctor"));
        assert_eq!(decoded.claims.iss, ISSUER);
        assert_eq!(decoded.claims.aud, AUDIENCE);
    }

    #[test]
    fn test_role_claim_omitted_when_absent() {
        let jwt = service();
        let mut claims = access_claims(1800);
        claims.role = None;

        let token = jwt.encode(&claims).unwrap();
        // The role key should not appear in the payload at all.
        assert!(jwt.extract_claim(&token, "role").is_none());

        let decoded = jwt.decode::<AccessTokenClaims>(&token).unwrap();
        assert_eq!(decoded.claims.role, None);
    }

    #[test]
    fn test_fresh_jti_per_issuance() {
        let jwt = service();
        let first = jwt.encode(&access_claims(1800)).unwrap();
        let second = jwt.encode(&access_claims(1800)).unwrap();

        let a = jwt.extract_claim(&first, "jti").unwrap();
        let b = jwt.extract_claim(&second, "jti").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_expired_token_rejected() {
        let jwt = service();
        let token = jwt.encode(&access_claims(-60)).unwrap();

        let err = jwt.decode::<AccessTokenClaims>(&token).unwrap_err();
        assert!(matches!(err, JwtError::Expired));
    }

    #[test]
    fn test_decode_allow_expired_accepts_expired() {
        let jwt = service();
        let token = jwt.encode(&access_claims(-60)).unwrap();

        let decoded = jwt.decode_allow_expired::<AccessTokenClaims>(&token).unwrap();
        assert_eq!(decoded.claims.name, "drperez");
    }

    #[test]
    fn test_wrong_key_rejected_even_ignoring_expiry() {
        let jwt = service();
        let other = JwtService::new("another-secret-another-secret-000000", ISSUER, AUDIENCE);

        let token = other.encode(&access_claims(1800)).unwrap();

        assert!(matches!(
            jwt.decode::<AccessTokenClaims>(&token).unwrap_err(),
            JwtError::InvalidSignature
        ));
        assert!(matches!(
            jwt.decode_allow_expired::<AccessTokenClaims>(&token)
                .unwrap_err(),
            JwtError::InvalidSignature
        ));
    }

    #[test]
    fn test_wrong_issuer_rejected() {
        let other = JwtService::new(SECRET, "https://evil.example.com", AUDIENCE);
        let jwt = service();

        let mut claims = access_claims(1800);
        claims.iss = "https://evil.example.com".to_string();
        let token = other.encode(&claims).unwrap();

        let err = jwt.decode::<AccessTokenClaims>(&token).unwrap_err();
        assert!(matches!(err, JwtError::InvalidClaims { .. }));
    }

    #[test]
    fn test_wrong_audience_rejected() {
        let jwt = service();
        let mut claims = access_claims(1800);
        claims.aud = "https://other.example.com".to_string();
        let token = jwt.encode(&claims).unwrap();

        let err = jwt.decode::<AccessTokenClaims>(&token).unwrap_err();
        assert!(matches!(err, JwtError::InvalidClaims { .. }));
    }

    #[test]
    fn test_non_hs256_header_rejected() {
        let jwt = service();
        let token = jwt.encode(&access_claims(1800)).unwrap();

        // Re-assemble the token with an RS256 header but the original
        // payload and signature.
        let parts: Vec<&str> = token.split('.').collect();
        let forged_header =
            URL_SAFE_NO_PAD.encode(br#"{"alg":"RS256","typ":"JWT"}"#);
        let forged = format!("{}.{}.{}", forged_header, parts[1], parts[2]);

        let err = jwt.decode::<AccessTokenClaims>(&forged).unwrap_err();
        assert!(matches!(err, JwtError::UnexpectedAlgorithm { .. }));
    }

    #[test]
    fn test_extract_claim_without_validation() {
        let jwt = service();
        let token = jwt.encode(&access_claims(-60)).unwrap();

        // Works even on an expired token: it is a read, not a trust decision.
        let name = jwt.extract_claim(&token, "name").unwrap();
        assert_eq!(name, serde_json::json!("drperez"));

        assert!(jwt.extract_claim(&token, "nonexistent").is_none());
        assert!(jwt.extract_claim("garbage", "name").is_none());
    }

    #[test]
    fn test_activation_claims_roundtrip() {
        let jwt = service();
        let now = now_timestamp();
        let claims = ActivationTokenClaims {
            iss: ISSUER.to_string(),
            aud: AUDIENCE.to_string(),
            exp: now + 180,
            iat: now,
            jti: uuid::Uuid::new_v4().to_string(),
            email: "drperez@clinica.example.com".to_string(),
        };

        let token = jwt.encode(&claims).unwrap();
        let decoded = jwt.decode::<ActivationTokenClaims>(&token).unwrap();
        assert_eq!(decoded.claims.email, "drperez@clinica.example.com");
    }
}
