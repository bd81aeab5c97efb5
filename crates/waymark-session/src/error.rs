//! Session error types and categories.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use waymark_api::ApiError;
use waymark_core::CoreError;
use waymark_storage::StoreError;
use waymark_token::TokenError;

/// Category tag attached to every surfaced error so the UI can pick an
/// appropriate icon and title. No other category exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    Token,
    Api,
    Login,
    Permission,
    Unknown,
}

impl ErrorCategory {
    /// Stable string form of the category.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Token => "token",
            ErrorCategory::Api => "api",
            ErrorCategory::Login => "login",
            ErrorCategory::Permission => "permission",
            ErrorCategory::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Session error type.
#[derive(Error, Debug)]
pub enum SessionError {
    /// The access token expired and no refresh token is stored
    #[error("No refresh token available")]
    NoRefreshToken,

    /// The refresh-token exchange failed
    #[error("Token refresh failed: {0}")]
    RefreshFailed(String),

    /// A profile fetch was requested with no token anywhere
    #[error("No access token available")]
    NoAccessToken,

    /// The profile endpoint returned an empty response
    #[error("Profile response was empty")]
    EmptyProfile,

    /// The persisted profile could not be parsed
    #[error("Stored profile is not valid JSON: {0}")]
    ProfileParse(String),

    /// Credential login failed
    #[error("Login failed: {0}")]
    Login(String),

    /// Invalid session state transition
    #[error("Invalid session state transition: {0}")]
    InvalidTransition(String),

    /// Token decoding error
    #[error(transparent)]
    Token(#[from] TokenError),

    /// Configuration error
    #[error(transparent)]
    Core(#[from] CoreError),

    /// HTTP layer error
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Persistent store error
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl SessionError {
    /// The category the UI layer files this error under.
    pub fn category(&self) -> ErrorCategory {
        match self {
            SessionError::NoRefreshToken
            | SessionError::RefreshFailed(_)
            | SessionError::Token(_) => ErrorCategory::Token,
            SessionError::NoAccessToken | SessionError::EmptyProfile => ErrorCategory::Api,
            SessionError::Api(api) => match api.status() {
                Some(403) => ErrorCategory::Permission,
                _ => ErrorCategory::Api,
            },
            SessionError::Login(_) => ErrorCategory::Login,
            SessionError::ProfileParse(_)
            | SessionError::InvalidTransition(_)
            | SessionError::Core(_)
            | SessionError::Store(_) => ErrorCategory::Unknown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_errors_carry_token_category() {
        assert_eq!(SessionError::NoRefreshToken.category(), ErrorCategory::Token);
        assert_eq!(
            SessionError::RefreshFailed("boom".into()).category(),
            ErrorCategory::Token
        );
        assert_eq!(
            SessionError::Token(TokenError::Malformed).category(),
            ErrorCategory::Token
        );
    }

    #[test]
    fn test_profile_errors_carry_api_category() {
        assert_eq!(SessionError::NoAccessToken.category(), ErrorCategory::Api);
        assert_eq!(SessionError::EmptyProfile.category(), ErrorCategory::Api);
    }

    #[test]
    fn test_forbidden_api_error_is_permission_category() {
        let denied = SessionError::Api(ApiError::Validation {
            message: "You do not have permission to perform this action.".into(),
            status: 403,
            body: None,
        });
        assert_eq!(denied.category(), ErrorCategory::Permission);

        let plain = SessionError::Api(ApiError::Validation {
            message: "Email: Invalid".into(),
            status: 400,
            body: None,
        });
        assert_eq!(plain.category(), ErrorCategory::Api);
    }

    #[test]
    fn test_login_category() {
        assert_eq!(
            SessionError::Login("bad credentials".into()).category(),
            ErrorCategory::Login
        );
    }

    #[test]
    fn test_category_strings() {
        assert_eq!(ErrorCategory::Token.as_str(), "token");
        assert_eq!(ErrorCategory::Api.as_str(), "api");
        assert_eq!(ErrorCategory::Login.as_str(), "login");
        assert_eq!(ErrorCategory::Permission.as_str(), "permission");
        assert_eq!(ErrorCategory::Unknown.as_str(), "unknown");
    }

    #[test]
    fn test_no_refresh_token_message() {
        assert_eq!(
            SessionError::NoRefreshToken.to_string(),
            "No refresh token available"
        );
    }
}
