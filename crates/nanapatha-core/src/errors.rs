use anyhow::Error;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use utoipa::ToSchema;

/// Machine-readable classification of an [`AppError`].
///
/// Serialized as the `code` field of every error body so clients can
/// branch on the failure without parsing the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// The referenced entity does not exist.
    NotFound,
    /// The entity is not in a state that allows the operation (e.g. an
    /// already processed registration request).
    InvalidState,
    /// Required input is missing or malformed.
    Validation,
    /// The target batch has no free seat.
    Capacity,
    /// Another reviewer holds the claim on the request.
    Conflict,
    Internal,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::NotFound => "not_found",
            ErrorKind::InvalidState => "invalid_state",
            ErrorKind::Validation => "validation",
            ErrorKind::Capacity => "capacity",
            ErrorKind::Conflict => "conflict",
            ErrorKind::Internal => "internal",
        }
    }

    fn from_status(status: StatusCode) -> Self {
        match status {
            StatusCode::NOT_FOUND => ErrorKind::NotFound,
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => ErrorKind::Validation,
            StatusCode::CONFLICT => ErrorKind::Conflict,
            _ => ErrorKind::Internal,
        }
    }
}

/// Error body returned by every endpoint.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub code: ErrorKind,
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub kind: ErrorKind,
    pub error: Error,
}

impl AppError {
    pub fn new<E>(status: StatusCode, err: E) -> Self
    where
        E: Into<Error>,
    {
        Self {
            status,
            kind: ErrorKind::from_status(status),
            error: err.into(),
        }
    }

    pub fn with_kind<E>(status: StatusCode, kind: ErrorKind, err: E) -> Self
    where
        E: Into<Error>,
    {
        Self {
            status,
            kind,
            error: err.into(),
        }
    }

    pub fn internal<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, err)
    }

    pub fn not_found<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::NOT_FOUND, err)
    }

    pub fn unprocessable<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, err)
    }

    pub fn bad_request<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::BAD_REQUEST, err)
    }

    pub fn invalid_state<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::with_kind(StatusCode::CONFLICT, ErrorKind::InvalidState, err)
    }

    pub fn capacity<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::with_kind(StatusCode::CONFLICT, ErrorKind::Capacity, err)
    }

    pub fn conflict<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::with_kind(StatusCode::CONFLICT, ErrorKind::Conflict, err)
    }

    pub fn database<E>(err: E) -> Self
    where
        E: Into<Error>,
    {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, err)
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind.as_str(), self.error)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.kind == ErrorKind::Internal {
            tracing::error!(error = ?self.error, "Internal error");
        }

        let body = Json(ErrorResponse {
            error: self.error.to_string(),
            code: self.kind,
        });

        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<Error>,
{
    fn from(err: E) -> Self {
        AppError::internal(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    #[test]
    fn test_constructors_set_status_and_kind() {
        let cases = [
            (AppError::not_found(anyhow!("x")), StatusCode::NOT_FOUND, ErrorKind::NotFound),
            (AppError::bad_request(anyhow!("x")), StatusCode::BAD_REQUEST, ErrorKind::Validation),
            (
                AppError::unprocessable(anyhow!("x")),
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorKind::Validation,
            ),
            (AppError::invalid_state(anyhow!("x")), StatusCode::CONFLICT, ErrorKind::InvalidState),
            (AppError::capacity(anyhow!("x")), StatusCode::CONFLICT, ErrorKind::Capacity),
            (AppError::conflict(anyhow!("x")), StatusCode::CONFLICT, ErrorKind::Conflict),
            (
                AppError::internal(anyhow!("x")),
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorKind::Internal,
            ),
        ];

        for (err, status, kind) in cases {
            assert_eq!(err.status, status);
            assert_eq!(err.kind, kind);
        }
    }

    #[test]
    fn test_foreign_errors_become_internal() {
        let io = std::io::Error::other("disk on fire");
        let err: AppError = io.into();
        assert_eq!(err.kind, ErrorKind::Internal);
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_response_body_carries_code() {
        let response = AppError::capacity(anyhow!("Batch is full")).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "Batch is full");
        assert_eq!(body["code"], "capacity");
    }
}
