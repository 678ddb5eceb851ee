use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::types::ApiErrorResponse;

/// Application error codes following the pattern E{area}{sequence}
///
/// Ranges:
/// - E0xxx: Shared/infrastructure errors
/// - E1xxx: Auth errors
/// - E2xxx: User errors
/// - E3xxx: Listing (ICan/INeed) errors
/// - E4xxx: Inspire errors
/// - E5xxx: Messaging errors
/// - E6xxx: Skills/ratings/newsletter errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    // Shared (E0xxx)
    InternalError,
    ValidationError,
    NotFound,
    Unauthorized,
    Forbidden,
    BadRequest,
    PayloadTooLarge,
    ServiceUnavailable,

    // Auth (E1xxx)
    InvalidCredentials,
    EmailAlreadyExists,
    PhoneAlreadyExists,
    UsernameTaken,
    TokenExpired,
    TokenInvalid,
    TokenRevoked,
    PasswordTooWeak,
    WrongCurrentPassword,
    OtpInvalid,
    OtpExpired,
    EmailNotFound,

    // User (E2xxx)
    UserNotFound,
    ImageNotFound,
    UploadFailed,

    // Listings (E3xxx)
    ListingNotFound,
    AlreadyApplied,
    RequestNotFound,
    NotListingOwner,

    // Inspire (E4xxx)
    PostNotFound,
    CommentNotFound,
    AlreadyReacted,
    ReactionNotFound,
    AlreadySaved,
    SaveNotFound,

    // Messaging (E5xxx)
    ConversationNotFound,
    NotConversationParticipant,

    // Skills/ratings/misc (E6xxx)
    SkillNotFound,
    CategoryNotFound,
    RatingNotFound,
    AlreadySubscribed,
    SubscriptionNotFound,
}

impl ErrorCode {
    pub fn code(&self) -> &'static str {
        match self {
            // Shared
            Self::InternalError => "E0001",
            Self::ValidationError => "E0002",
            Self::NotFound => "E0003",
            Self::Unauthorized => "E0004",
            Self::Forbidden => "E0005",
            Self::BadRequest => "E0006",
            Self::PayloadTooLarge => "E0007",
            Self::ServiceUnavailable => "E0008",

            // Auth
            Self::InvalidCredentials => "E1001",
            Self::EmailAlreadyExists => "E1002",
            Self::PhoneAlreadyExists => "E1003",
            Self::UsernameTaken => "E1004",
            Self::TokenExpired => "E1005",
            Self::TokenInvalid => "E1006",
            Self::TokenRevoked => "E1007",
            Self::PasswordTooWeak => "E1008",
            Self::WrongCurrentPassword => "E1009",
            Self::OtpInvalid => "E1010",
            Self::OtpExpired => "E1011",
            Self::EmailNotFound => "E1012",

            // User
            Self::UserNotFound => "E2001",
            Self::ImageNotFound => "E2002",
            Self::UploadFailed => "E2003",

            // Listings
            Self::ListingNotFound => "E3001",
            Self::AlreadyApplied => "E3002",
            Self::RequestNotFound => "E3003",
            Self::NotListingOwner => "E3004",

            // Inspire
            Self::PostNotFound => "E4001",
            Self::CommentNotFound => "E4002",
            Self::AlreadyReacted => "E4003",
            Self::ReactionNotFound => "E4004",
            Self::AlreadySaved => "E4005",
            Self::SaveNotFound => "E4006",

            // Messaging
            Self::ConversationNotFound => "E5001",
            Self::NotConversationParticipant => "E5002",

            // Skills/ratings/misc
            Self::SkillNotFound => "E6001",
            Self::CategoryNotFound => "E6002",
            Self::RatingNotFound => "E6003",
            Self::AlreadySubscribed => "E6004",
            Self::SubscriptionNotFound => "E6005",
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InternalError | Self::ServiceUnavailable => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ValidationError | Self::EmailAlreadyExists | Self::PhoneAlreadyExists
            | Self::UsernameTaken | Self::SubscriptionNotFound => StatusCode::UNPROCESSABLE_ENTITY,
            Self::BadRequest | Self::PasswordTooWeak | Self::WrongCurrentPassword
            | Self::OtpInvalid | Self::OtpExpired | Self::AlreadyApplied
            | Self::AlreadyReacted | Self::AlreadySaved | Self::UploadFailed => StatusCode::BAD_REQUEST,
            Self::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::NotFound | Self::EmailNotFound | Self::UserNotFound | Self::ImageNotFound
            | Self::ListingNotFound | Self::RequestNotFound | Self::PostNotFound
            | Self::CommentNotFound | Self::ReactionNotFound | Self::SaveNotFound
            | Self::ConversationNotFound | Self::SkillNotFound | Self::CategoryNotFound
            | Self::RatingNotFound => StatusCode::NOT_FOUND,
            Self::Unauthorized | Self::InvalidCredentials | Self::TokenExpired
            | Self::TokenInvalid | Self::TokenRevoked => StatusCode::UNAUTHORIZED,
            Self::Forbidden | Self::NotListingOwner | Self::NotConversationParticipant => StatusCode::FORBIDDEN,
            Self::AlreadySubscribed => StatusCode::CONFLICT,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{message}")]
    Known {
        code: ErrorCode,
        message: String,
        details: Option<serde_json::Value>,
    },

    #[error("internal server error")]
    Internal(#[from] anyhow::Error),

    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),

    #[error("validation error: {0}")]
    Validation(String),
}

impl AppError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::Known {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(code: ErrorCode, message: impl Into<String>, details: serde_json::Value) -> Self {
        Self::Known {
            code,
            message: message.into(),
            details: Some(details),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::BadRequest, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Forbidden, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_response) = match &self {
            AppError::Known { code, message, details } => {
                let status = code.status_code();
                let mut resp = ApiErrorResponse::new(code.code(), message);
                if let Some(d) = details {
                    resp = resp.with_details(d.clone());
                }
                (status, resp)
            }
            AppError::Internal(err) => {
                tracing::error!(error = %err, "internal server error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiErrorResponse::new("E0001", "internal server error"),
                )
            }
            AppError::Database(err) => {
                tracing::error!(error = %err, "database error");
                match err {
                    diesel::result::Error::NotFound => (
                        StatusCode::NOT_FOUND,
                        ApiErrorResponse::new("E0003", "resource not found"),
                    ),
                    _ => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        ApiErrorResponse::new("E0001", "database error"),
                    ),
                }
            }
            AppError::Validation(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ApiErrorResponse::new("E0002", msg),
            ),
        };

        (status, Json(error_response)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_signup_fields_map_to_422() {
        assert_eq!(ErrorCode::EmailAlreadyExists.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(ErrorCode::PhoneAlreadyExists.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(ErrorCode::UsernameTaken.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn business_rule_breaches_map_to_400() {
        for code in [
            ErrorCode::AlreadyReacted,
            ErrorCode::AlreadyApplied,
            ErrorCode::AlreadySaved,
            ErrorCode::OtpInvalid,
            ErrorCode::OtpExpired,
            ErrorCode::WrongCurrentPassword,
        ] {
            assert_eq!(code.status_code(), StatusCode::BAD_REQUEST, "{:?}", code);
        }
    }

    #[test]
    fn ownership_violations_map_to_403() {
        assert_eq!(ErrorCode::NotListingOwner.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(ErrorCode::NotConversationParticipant.status_code(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn newsletter_duplicate_maps_to_409() {
        assert_eq!(ErrorCode::AlreadySubscribed.status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn error_codes_are_unique() {
        let codes = [
            ErrorCode::InternalError, ErrorCode::ValidationError, ErrorCode::NotFound,
            ErrorCode::Unauthorized, ErrorCode::Forbidden, ErrorCode::BadRequest,
            ErrorCode::InvalidCredentials, ErrorCode::EmailAlreadyExists,
            ErrorCode::OtpInvalid, ErrorCode::OtpExpired, ErrorCode::UserNotFound,
            ErrorCode::ListingNotFound, ErrorCode::AlreadyApplied, ErrorCode::PostNotFound,
            ErrorCode::AlreadyReacted, ErrorCode::ConversationNotFound,
            ErrorCode::SkillNotFound, ErrorCode::AlreadySubscribed,
        ];
        let mut seen = std::collections::HashSet::new();
        for c in codes {
            assert!(seen.insert(c.code()), "duplicate code {}", c.code());
        }
    }
}
