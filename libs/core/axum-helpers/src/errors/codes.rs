//! Machine-readable error codes carried in every error body.
//!
//! ```rust
//! use axum_helpers::errors::ErrorCode;
//!
//! let code = ErrorCode::Gone;
//! assert_eq!(code.as_str(), "GONE");
//! assert_eq!(code.code(), 1013);
//! assert_eq!(code.default_message(), "Resource is no longer available");
//! ```

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    ValidationError,
    /// Path or body identifier is not a 24-hex ObjectId
    InvalidObjectId,
    /// Request body could not be extracted (content type, syntax, shape)
    JsonExtraction,
    NotFound,
    Unauthorized,
    Forbidden,
    /// Duplicate resource
    Conflict,
    UnprocessableEntity,
    /// Input refused for a domain reason
    BadRequest,
    /// The resource existed but can no longer be used, such as an expired code
    Gone,
    InternalError,
    ServiceUnavailable,
    IoError,
    SerdeJsonError,
}

impl ErrorCode {
    /// (wire name, log code, default message)
    ///
    /// Log codes: 1xxx request and domain, 4xxx I/O, 5xxx serialization.
    const fn parts(self) -> (&'static str, i32, &'static str) {
        match self {
            Self::ValidationError => ("VALIDATION_ERROR", 1001, "Request validation failed"),
            Self::InvalidObjectId => ("INVALID_OBJECT_ID", 1002, "Invalid ObjectId format"),
            Self::JsonExtraction => ("JSON_EXTRACTION", 1003, "Failed to parse request body"),
            Self::NotFound => ("NOT_FOUND", 1004, "Resource not found"),
            Self::InternalError => ("INTERNAL_ERROR", 1005, "An internal server error occurred"),
            Self::Unauthorized => ("UNAUTHORIZED", 1006, "Authentication required"),
            Self::Forbidden => ("FORBIDDEN", 1007, "Access forbidden"),
            Self::Conflict => ("CONFLICT", 1008, "Resource already exists"),
            Self::UnprocessableEntity => {
                ("UNPROCESSABLE_ENTITY", 1009, "Request cannot be processed")
            }
            Self::ServiceUnavailable => (
                "SERVICE_UNAVAILABLE",
                1011,
                "Service is temporarily unavailable",
            ),
            Self::BadRequest => ("BAD_REQUEST", 1012, "Bad request"),
            Self::Gone => ("GONE", 1013, "Resource is no longer available"),
            Self::IoError => ("IO_ERROR", 4001, "I/O error occurred"),
            Self::SerdeJsonError => ("SERDE_JSON_ERROR", 5001, "JSON serialization error"),
        }
    }

    pub const fn as_str(&self) -> &'static str {
        self.parts().0
    }

    pub const fn code(&self) -> i32 {
        self.parts().1
    }

    pub const fn default_message(&self) -> &'static str {
        self.parts().2
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
