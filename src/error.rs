use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sea_orm::DbErr),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Auth error: {0}")]
    AuthError(String),

    #[error("Permission denied")]
    PermissionDenied,

    #[error("External API error: {0}")]
    ExternalApiError(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error("JWT error: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    #[error("HTTP request error: {0}")]
    ReqwestError(#[from] reqwest::Error),
}

impl AppError {
    /// 错误码与对外展示的消息
    fn code_and_message(&self) -> (&'static str, String) {
        match self {
            AppError::ValidationError(msg) => ("VALIDATION_ERROR", msg.clone()),
            AppError::AuthError(msg) => ("AUTH_ERROR", msg.clone()),
            AppError::JwtError(_) => ("AUTH_ERROR", "Invalid access token".to_string()),
            AppError::PermissionDenied => (
                "NOT_ADMIN",
                crate::services::NOT_ADMIN_MESSAGE.to_string(),
            ),
            AppError::ExternalApiError(msg) => ("EXTERNAL_API_ERROR", msg.clone()),
            AppError::DatabaseError(_) => ("DATABASE_ERROR", "Database error".to_string()),
            AppError::ConfigError(_) | AppError::ReqwestError(_) => {
                ("INTERNAL_ERROR", "Internal server error".to_string())
            }
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::AuthError(_) | AppError::JwtError(_) => StatusCode::UNAUTHORIZED,
            AppError::PermissionDenied => StatusCode::FORBIDDEN,
            AppError::ExternalApiError(_) => StatusCode::BAD_GATEWAY,
            AppError::DatabaseError(_) | AppError::ConfigError(_) | AppError::ReqwestError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status_code = self.status_code();
        match self {
            AppError::ValidationError(_) | AppError::AuthError(_) | AppError::JwtError(_) => {
                log::warn!("{self}")
            }
            AppError::PermissionDenied => log::warn!("Permission denied"),
            _ => log::error!("{self}"),
        }

        let (error_code, message) = self.code_and_message();
        HttpResponse::build(status_code).json(json!({
            "success": false,
            "error": {
                "code": error_code,
                "message": message
            }
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::ValidationError("bad".into()).error_response().status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::AuthError("nope".into()).error_response().status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::PermissionDenied.error_response().status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::DatabaseError(sea_orm::DbErr::Custom("boom".into()))
                .error_response()
                .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_status_code_matches_rendered_response() {
        let errors = [
            AppError::ValidationError("bad".into()),
            AppError::AuthError("nope".into()),
            AppError::PermissionDenied,
            AppError::ExternalApiError("upstream".into()),
            AppError::ConfigError("missing".into()),
        ];
        for err in errors {
            assert_eq!(err.status_code(), err.error_response().status(), "{err}");
        }
        assert_eq!(
            AppError::AuthError("nope".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(AppError::PermissionDenied.status_code(), StatusCode::FORBIDDEN);
    }
}
