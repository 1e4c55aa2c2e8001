//! Contract for exclusive input capture on a display server.
//!
//! Capture follows a strict `Unacquired -> Acquired -> Released` lifecycle,
//! encoded in ownership: `acquire` hands out the only handle on which key
//! events may be read, and `release` consumes it. There is no re-entry.

use std::error::Error;

/// A key-press that produced input relevant to the lock session.
///
/// Non-key events and key-presses that produce no text are consumed inside
/// the capture implementation; the controller only ever sees presses that
/// either carry characters or signal submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPress {
    /// Characters produced by the press (empty for the bare submission key).
    pub text: String,
    /// Whether this press is the designated submission key.
    pub submit: bool,
}

impl KeyPress {
    /// A press that contributed `text` to the in-progress passphrase.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            submit: false,
        }
    }

    /// The submission keypress that ends input collection.
    pub fn submit() -> Self {
        Self {
            text: String::new(),
            submit: true,
        }
    }
}

/// Exclusive capture of keyboard and pointer input.
///
/// Only valid between `DisplayServer::acquire` and `release`. Implementations
/// must not leave the display connection open, or input grabbed, once
/// `release` returns.
pub trait InputCapture {
    type Error: Error + Send + Sync + 'static;

    /// Block until the next relevant key-press is available.
    ///
    /// This is the session's only suspension point; it waits indefinitely and
    /// silently discards events that are not key-presses.
    fn next_key(&mut self) -> Result<KeyPress, Self::Error>;

    /// Ungrab pointer and keyboard and close the display connection.
    fn release(self) -> Result<(), Self::Error>;
}

/// Entry point for obtaining exclusive input capture.
pub trait DisplayServer {
    type Error: Error + Send + Sync + 'static;
    type Capture: InputCapture<Error = Self::Error>;

    /// Open the display connection, grab pointer and keyboard, and subscribe
    /// to key-press events on the root surface.
    ///
    /// Failure here is not retryable: a lock that cannot seize input is a
    /// security failure, and callers are expected to abort.
    fn acquire(&self) -> Result<Self::Capture, Self::Error>;
}
