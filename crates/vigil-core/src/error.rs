//! Error taxonomy shared across the Vigil workspace.
//!
//! Everything here is unrecoverable from the session loop's point of view:
//! a denied authentication attempt or an overflowing input buffer is ordinary
//! data, handled in place, and never becomes a `VigilError`. Any error that
//! does escape `LockSession::run` means the lock cannot (or must not)
//! continue, and the binary's job is to log it and exit non-zero.

use thiserror::Error;

pub type VigilResult<T> = Result<T, VigilError>;

#[derive(Debug, Error)]
pub enum VigilError {
    #[error("I/O failure: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("input capture failure: {0}")]
    Capture(String),

    #[error("identity resolution failure: {0}")]
    Identity(String),

    /// Locking from a superuser shell is refused outright. A safety policy,
    /// not a security boundary: the lock would otherwise demand the root
    /// passphrase on a console someone walked away from.
    #[error("refusing to lock a superuser session")]
    SuperuserRefused,

    #[error("authentication backend failure: {0}")]
    Backend(String),
}
