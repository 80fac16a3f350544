use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::application::accounts::AccountError;
use crate::application::error::ErrorReport;
use crate::application::posts::PostError;
use crate::application::repos::RepoError;
use crate::domain::validation::FieldError;

#[derive(Debug, Serialize)]
pub struct ApiErrorBody {
    pub error: ApiErrorMessage,
}

pub mod codes {
    pub const VALIDATION: &str = "validation_error";
    pub const UNAUTHORIZED: &str = "unauthorized";
    pub const FORBIDDEN: &str = "forbidden";
    pub const NOT_FOUND: &str = "not_found";
    pub const EMAIL_TAKEN: &str = "email_taken";
    pub const INVALID_CREDENTIALS: &str = "invalid_credentials";
    pub const STORAGE: &str = "storage_error";
}

#[derive(Debug, Serialize)]
pub struct ApiErrorMessage {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldError>,
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
    hint: Option<String>,
    fields: Vec<FieldError>,
    /// Server-side diagnostic, carried into the log report but never
    /// serialized to the client.
    detail: Option<String>,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            hint: None,
            fields: Vec::new(),
            detail: None,
        }
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    pub fn validation(fields: Vec<FieldError>) -> Self {
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            code: codes::VALIDATION,
            message: "Request payload failed validation".to_string(),
            hint: None,
            fields,
            detail: None,
        }
    }

    pub fn unauthorized() -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            codes::UNAUTHORIZED,
            "A signed-in session is required",
        )
    }

    pub fn forbidden() -> Self {
        Self::new(
            StatusCode::FORBIDDEN,
            codes::FORBIDDEN,
            "Only the author may modify this post",
        )
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, codes::NOT_FOUND, message)
    }

    /// Storage failures surface as recoverable error responses, never a
    /// process crash; the diagnostic detail stays in the server log.
    pub fn storage(err: &RepoError) -> Self {
        let status = match err {
            RepoError::Timeout => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, codes::STORAGE, "Storage temporarily unavailable")
            .with_detail(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let detail = self
            .detail
            .or_else(|| self.hint.clone())
            .unwrap_or_else(|| self.message.clone());
        let body = ApiErrorBody {
            error: ApiErrorMessage {
                code: self.code.to_string(),
                message: self.message,
                hint: self.hint,
                fields: self.fields,
            },
        };
        let mut response = (self.status, Json(body)).into_response();
        // Attach a structured report so shared logging middleware can emit rich diagnostics.
        ErrorReport::from_message(
            "infra::http",
            self.status,
            format!("{}: {}", self.code, detail),
        )
        .attach(&mut response);
        response
    }
}

impl From<PostError> for ApiError {
    fn from(err: PostError) -> Self {
        match err {
            PostError::Unauthorized => ApiError::unauthorized(),
            PostError::NotOwner => ApiError::forbidden(),
            PostError::NotFound => ApiError::not_found("post not found"),
            PostError::Validation(err) => ApiError::validation(err.fields),
            PostError::Session(err) => ApiError::new(
                StatusCode::SERVICE_UNAVAILABLE,
                codes::STORAGE,
                "Session store unavailable",
            )
            .with_detail(err.to_string()),
            PostError::Repo(err) => ApiError::storage(&err),
        }
    }
}

impl From<AccountError> for ApiError {
    fn from(err: AccountError) -> Self {
        match err {
            AccountError::InvalidField(field) => ApiError::validation(vec![FieldError {
                field,
                message: format!("invalid {field}"),
            }]),
            AccountError::EmailTaken => ApiError::new(
                StatusCode::CONFLICT,
                codes::EMAIL_TAKEN,
                "Email already registered",
            ),
            AccountError::InvalidCredentials => ApiError::new(
                StatusCode::UNAUTHORIZED,
                codes::INVALID_CREDENTIALS,
                "Invalid email or password",
            ),
            AccountError::Repo(err) => ApiError::storage(&err),
        }
    }
}
