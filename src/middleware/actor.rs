use axum::{extract::FromRequestParts, http::request::Parts};
use nanapatha_core::AppError;

/// Header naming the staff member performing a mutation.
pub const ACTOR_HEADER: &str = "x-actor";

/// Reviewer recorded when no `X-Actor` header is sent.
pub const DEFAULT_ACTOR: &str = "Admin User";

/// Identity of the staff member behind a request.
///
/// There is no login; the admin frontend names the reviewer in the
/// `X-Actor` header and every workflow mutation records it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor(pub String);

impl Actor {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Actor {
    fn default() -> Self {
        Actor(DEFAULT_ACTOR.to_string())
    }
}

impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(value) = parts.headers.get(ACTOR_HEADER) else {
            return Ok(Actor::default());
        };

        let name = value
            .to_str()
            .map_err(|_| {
                AppError::bad_request(anyhow::anyhow!("X-Actor header must be plain text"))
            })?
            .trim();

        if name.is_empty() {
            return Ok(Actor::default());
        }
        if name.chars().count() > 120 {
            return Err(AppError::bad_request(anyhow::anyhow!(
                "X-Actor header must be at most 120 characters"
            )));
        }

        Ok(Actor(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(header: Option<&str>) -> Result<Actor, AppError> {
        let mut builder = Request::builder().uri("/");
        if let Some(value) = header {
            builder = builder.header(ACTOR_HEADER, value);
        }
        let (mut parts, _) = builder.body(()).unwrap().into_parts();
        Actor::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn test_missing_header_uses_default_actor() {
        assert_eq!(extract(None).await.unwrap().as_str(), DEFAULT_ACTOR);
        assert_eq!(extract(Some("   ")).await.unwrap().as_str(), DEFAULT_ACTOR);
    }

    #[tokio::test]
    async fn test_header_is_trimmed() {
        assert_eq!(extract(Some(" Reviewer B ")).await.unwrap().as_str(), "Reviewer B");
    }

    #[tokio::test]
    async fn test_overlong_header_is_rejected() {
        let long = "x".repeat(121);
        assert!(extract(Some(&long)).await.is_err());
    }
}
