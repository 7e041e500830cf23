use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

/// Error taxonomy for the data/authorization layer. Every store and service
/// method returns one of these; raw storage errors never cross the boundary.
#[derive(Debug, Error)]
pub enum AppError {
    /// Malformed or out-of-range input. The message is safe to surface.
    #[error("{0}")]
    Validation(String),

    /// Unique-constraint or state-guard violation.
    #[error("{0}")]
    Conflict(String),

    /// Referenced entity does not exist.
    #[error("{0}")]
    NotFound(String),

    /// Missing or invalid session/credentials.
    #[error("invalid credentials or session")]
    Unauthorized,

    /// Authenticated but lacking the required role.
    #[error("forbidden")]
    Forbidden,

    /// Underlying storage failure. Not locally recoverable; details are
    /// logged, never serialized to the client.
    #[error("storage failure")]
    Storage(#[from] sqlx::Error),
}

impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Translate a unique-constraint violation into a domain `Conflict`,
    /// leaving every other storage error opaque.
    pub fn conflict_on_unique(err: sqlx::Error, msg: &str) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => Self::conflict(msg),
            _ => Self::Storage(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if let Self::Storage(err) = &self {
            tracing::error!("storage error: {err}");
        }

        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_match_taxonomy() {
        assert_eq!(
            AppError::validation("bad").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AppError::conflict("dupe").status(), StatusCode::CONFLICT);
        assert_eq!(
            AppError::not_found("missing").status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(AppError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::Forbidden.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            AppError::Storage(sqlx::Error::PoolClosed).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn storage_message_is_opaque() {
        let err = AppError::Storage(sqlx::Error::PoolClosed);
        assert_eq!(err.to_string(), "storage failure");
    }

    #[test]
    fn validation_message_surfaces_verbatim() {
        let err = AppError::validation("Title is too long.");
        assert_eq!(err.to_string(), "Title is too long.");
    }
}
