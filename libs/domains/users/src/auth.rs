//! Sign-in outcome mapping

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{CredentialErrorKind, UserError};
use crate::models::UserResponse;

/// Message for any sign-in failure that is not a credential problem
pub const GENERIC_SIGN_IN_ERROR: &str = "Incorrect username or password";

/// Result of a sign-in attempt: `{ "user": ... }` or `{ "error": "..." }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum AuthOutcome {
    Authenticated { user: UserResponse },
    Rejected { error: String },
}

impl AuthOutcome {
    pub fn rejected(err: &UserError) -> Self {
        let error = match err {
            UserError::InvalidCredentials(kind) => kind.to_string(),
            _ => GENERIC_SIGN_IN_ERROR.to_string(),
        };
        AuthOutcome::Rejected { error }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthOutcome::Authenticated { .. })
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            AuthOutcome::Rejected { error } => Some(error),
            AuthOutcome::Authenticated { .. } => None,
        }
    }
}

impl From<CredentialErrorKind> for AuthOutcome {
    fn from(kind: CredentialErrorKind) -> Self {
        AuthOutcome::Rejected {
            error: kind.to_string(),
        }
    }
}
