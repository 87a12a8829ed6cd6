//! Shared-secret check for triggering the digest

use crate::error::{DigestError, DigestResult};

/// Allow the run when no secret is configured, or when either the
/// `Authorization: Bearer <secret>` header or the `secret` query value matches.
pub fn authorize(
    configured_secret: Option<&str>,
    authorization_header: Option<&str>,
    query_secret: Option<&str>,
) -> DigestResult<()> {
    let Some(secret) = configured_secret.filter(|s| !s.is_empty()) else {
        return Ok(());
    };

    let header_token = authorization_header.and_then(|h| h.strip_prefix("Bearer "));
    if header_token == Some(secret) || query_secret == Some(secret) {
        Ok(())
    } else {
        Err(DigestError::Unauthorized)
    }
}
