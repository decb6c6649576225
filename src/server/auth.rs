//! Session-token authentication.
//!
//! Tokens are 32 random bytes, url-safe base64 encoded, handed out at
//! signup/login and presented as `Authorization: Bearer <token>`. Passwords
//! are stored as SHA-256 hex digests.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::server::AppState;
use crate::server::error::ApiError;

/// Hex SHA-256 digest of a password.
pub fn hash_password(password: &str) -> String {
    let digest = Sha256::digest(password.as_bytes());
    digest.iter().map(|b| format!("{b:02x}")).collect()
}

/// A fresh, url-safe session token.
pub fn generate_token() -> String {
    let mut bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Derives a profile-link slug from an email address: the local part,
/// lower-cased and stripped of separators, plus a random hex suffix.
pub fn generate_profile_link(email: &str) -> String {
    let base: String = email
        .split('@')
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect();

    let mut suffix = [0u8; 4];
    rand::rng().fill_bytes(&mut suffix);
    let suffix: String = suffix.iter().map(|b| format!("{b:02x}")).collect();

    format!("{base}-{suffix}")
}

/// The authenticated user id, extracted from the bearer token.
///
/// Handlers that take this argument reject unauthenticated requests with
/// 401 before their body runs.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub i32);

/// Pulls the token out of the `Authorization` header, if present.
pub fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(axum::http::header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts).ok_or(ApiError::Unauthorized)?;
        let user_id = state
            .store
            .validate_session(token)
            .await?
            .ok_or(ApiError::Unauthorized)?;
        Ok(AuthUser(user_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_is_stable_sha256_hex() {
        // sha256("password")
        assert_eq!(
            hash_password("password"),
            "5e884898da28047151d0e56f8dc6292773603d0d6aabbdd62a11ef721d1542d8"
        );
    }

    #[test]
    fn tokens_are_unique_and_url_safe() {
        let a = generate_token();
        let b = generate_token();
        assert_ne!(a, b);
        assert_eq!(URL_SAFE_NO_PAD.decode(&a).unwrap().len(), 32);
        assert!(!a.contains('+') && !a.contains('/'));
    }

    #[test]
    fn profile_links_strip_separators_and_keep_the_local_part() {
        let link = generate_profile_link("Jane.Doe_99@example.com");
        let (base, suffix) = link.split_once('-').unwrap();
        assert_eq!(base, "janedoe99");
        assert_eq!(suffix.len(), 8);
    }
}
