//! Contract for resolving the invoking user's identity.

use std::error::Error;

/// The login the session authenticates as.
///
/// Resolved once at startup from the calling process's real uid and immutable
/// for the session's lifetime; authentication is always performed for the
/// user who started the lock, never for a supplied name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionIdentity {
    uid: u32,
    login: String,
}

impl SessionIdentity {
    pub fn new(uid: u32, login: impl Into<String>) -> Self {
        Self {
            uid,
            login: login.into(),
        }
    }

    pub fn uid(&self) -> u32 {
        self.uid
    }

    pub fn login(&self) -> &str {
        &self.login
    }
}

/// Read-only view of the OS user database.
pub trait IdentitySource {
    type Error: Error + Send + Sync + 'static;

    /// Real uid of the calling process.
    fn current_uid(&self) -> Result<u32, Self::Error>;

    /// Login name for `uid`, or `None` when the user database has no entry.
    fn login_for_uid(&self, uid: u32) -> Result<Option<String>, Self::Error>;
}
