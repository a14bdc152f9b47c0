use axum::http::{header, HeaderMap};

use crate::config::AuthConfig;

/// Decides whether a caller may request an access review.
pub trait AccessPolicy: Send + Sync {
    fn authorize(&self, headers: &HeaderMap) -> bool;
}

/// Lets every request through.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl AccessPolicy for AllowAll {
    fn authorize(&self, _headers: &HeaderMap) -> bool {
        true
    }
}

/// Requires `Authorization: Bearer <token>` matching a shared secret.
#[derive(Clone)]
pub struct BearerToken {
    token: String,
}

impl BearerToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }
}

impl std::fmt::Debug for BearerToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BearerToken").finish_non_exhaustive()
    }
}

impl AccessPolicy for BearerToken {
    fn authorize(&self, headers: &HeaderMap) -> bool {
        headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .is_some_and(|presented| presented.trim() == self.token)
    }
}

/// Bearer-token policy when a token is configured, otherwise open access.
pub fn policy_from_config(config: &AuthConfig) -> Box<dyn AccessPolicy> {
    match &config.api_token {
        Some(token) => Box::new(BearerToken::new(token.clone())),
        None => Box::new(AllowAll),
    }
}
