//! Contract for conversational authentication backends.
//!
//! A backend runs one authenticate-and-authorize round trip per call. During
//! the secret-verification phase it may issue prompts, which the caller
//! answers through a [`Conversation`] it supplies for the duration of that
//! single call. The conversation never drives control flow: notices are
//! logged, secret requests are answered, and the backend's verdict is all
//! the caller acts on.

use std::error::Error;
use std::fmt;

use zeroize::Zeroizing;

/// Failure raised while answering a backend prompt.
///
/// Conversation failures indicate a broken backend contract (or resource
/// exhaustion while preparing a response), not a wrong passphrase; callers
/// treat them as unrecoverable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversationError(pub String);

impl fmt::Display for ConversationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conversation failure: {}", self.0)
    }
}

impl Error for ConversationError {}

/// Answers prompts issued by a backend during one authentication round trip.
pub trait Conversation {
    /// Answer a secret request with the current passphrase material.
    ///
    /// `echoed` distinguishes prompts the backend would display openly from
    /// masked ones; both receive the same answer. Implementations must
    /// always produce a string — empty when no input has been collected,
    /// never absent.
    fn secret_request(
        &mut self,
        prompt: &str,
        echoed: bool,
    ) -> Result<Zeroizing<String>, ConversationError>;

    /// Record an error notice from the backend without altering control flow.
    fn error_notice(&mut self, message: &str);

    /// Record an informational notice from the backend.
    fn info_notice(&mut self, message: &str);
}

/// Verdict of one authentication attempt.
///
/// The denial reason is diagnostic only; callers never branch on anything
/// beyond pass/fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    Granted,
    Denied { reason: String },
}

impl AuthOutcome {
    pub fn denied(reason: impl Into<String>) -> Self {
        Self::Denied {
            reason: reason.into(),
        }
    }

    pub fn granted(&self) -> bool {
        matches!(self, Self::Granted)
    }
}

/// One-shot authenticate-and-authorize check against a named login.
pub trait AuthBackend {
    type Error: Error + Send + Sync + 'static;

    /// Run both verification phases for `login`, answering prompts through
    /// `conversation`.
    ///
    /// Phase one verifies the secret; phase two verifies the account is
    /// currently permitted to authenticate (accounts without a credential
    /// set are refused). Phase two is skipped when phase one fails, and the
    /// backend context is torn down before returning in every case.
    ///
    /// `Err` is reserved for backend contract violations (context cannot be
    /// opened, prompt of unknown type, conversation failure); an ordinary
    /// wrong passphrase or disallowed account is `Ok(AuthOutcome::Denied)`.
    fn authenticate(
        &self,
        login: &str,
        conversation: &mut dyn Conversation,
    ) -> Result<AuthOutcome, Self::Error>;
}
