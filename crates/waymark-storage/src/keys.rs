//! Storage key constants.

/// Storage keys used by the session layer.
///
/// The exact names are part of the contract: the credential-login flow and
/// the session service both address the same three slots.
pub struct StorageKeys;

impl StorageKeys {
    /// Access token (bearer credential)
    pub const ACCESS_TOKEN: &'static str = "access_token";

    /// Refresh token
    pub const REFRESH_TOKEN: &'static str = "refresh_token";

    /// Serialized user profile (JSON)
    pub const USER_PROFILE: &'static str = "user_profile";
}
