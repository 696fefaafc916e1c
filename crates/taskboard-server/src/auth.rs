use crate::error::ApiError;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use taskboard_core::TaskboardError;
use taskboard_domain::api::{AUTH_EMAIL_HEADER, AUTH_NAME_HEADER, AUTH_USER_HEADER};
use taskboard_persistence::Identity;

/// The caller as forwarded by the identity provider. Rejects with 401 when
/// the subject header is missing or blank.
#[derive(Debug, Clone)]
pub struct AuthUser(pub Identity);

fn header(parts: &Parts, name: &str) -> Option<String> {
    parts
        .headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let subject = header(parts, AUTH_USER_HEADER).ok_or(TaskboardError::Unauthorized)?;
        let identity = Identity::new(subject).with_profile(
            header(parts, AUTH_NAME_HEADER),
            header(parts, AUTH_EMAIL_HEADER),
        );
        Ok(AuthUser(identity))
    }
}
