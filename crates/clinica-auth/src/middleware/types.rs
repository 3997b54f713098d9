//! Authentication context types.

use std::sync::Arc;

use crate::storage::User;
use crate::token::jwt::AccessTokenClaims;

/// Authentication context for a verified request.
///
/// Built by the `BearerAuth` extractor after the token verifies and the
/// subject resolves to an active account. Claims sit behind an `Arc` so
/// handler-side clones stay cheap.
#[derive(Debug, Clone)]
pub struct AuthContext {
    /// Validated access token claims.
    pub token_claims: Arc<AccessTokenClaims>,

    /// The authenticated user, loaded from storage.
    pub user: User,
}

impl AuthContext {
    /// Returns the authenticated username.
    #[must_use]
    pub fn username(&self) -> &str {
        &self.user.username
    }

    /// Returns the role name carried by the token, if any.
    #[must_use]
    pub fn role(&self) -> Option<&str> {
        self.token_claims.role.as_deref()
    }

    /// Returns the unique id of this token.
    #[must_use]
    pub fn token_id(&self) -> &str {
        &self.token_claims.jti
    }
}
