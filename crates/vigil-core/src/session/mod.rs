//! The lock session state machine.
//!
//! One thread runs the whole session: acquire input capture, consume key
//! events into the secure buffer, run a synchronous authentication round
//! trip on each submission, and release capture only once a round trip
//! passes. The only suspension point is waiting for the next key event.

#[cfg(test)]
mod tests;

use std::thread;
use std::time::Duration;

use log::{debug, info};

use vigil_provider::auth::{AuthBackend, AuthOutcome};
use vigil_provider::display::{DisplayServer, InputCapture};
use vigil_provider::identity::SessionIdentity;

use crate::buffer::SecureBuffer;
use crate::config::VigilConfig;
use crate::conv::BufferConversation;
use crate::error::{VigilError, VigilResult};

/// Summary of a completed (unlocked) session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionReport {
    /// Authentication round trips that were denied before the unlock.
    pub denied_attempts: u32,
}

/// Ties capture, buffer, and backend together for one lock session.
pub struct LockSession<D, A> {
    config: VigilConfig,
    display: D,
    backend: A,
}

impl<D, A> LockSession<D, A>
where
    D: DisplayServer,
    A: AuthBackend,
{
    pub fn new(config: VigilConfig, display: D, backend: A) -> Self {
        Self {
            config,
            display,
            backend,
        }
    }

    /// Run the session to completion: returns only once an authentication
    /// round trip passes, or with an unrecoverable error.
    ///
    /// Capture is released and the buffer disposed on every path out of the
    /// loop, the error paths included. Denied attempts and buffer overflow
    /// never leave the loop.
    pub fn run(&self, identity: &SessionIdentity) -> VigilResult<SessionReport> {
        info!("locking keyboard and pointer for user {}", identity.login());
        let mut capture = self
            .display
            .acquire()
            .map_err(|err| VigilError::Capture(err.to_string()))?;

        let mut buffer = SecureBuffer::with_capacity(self.config.input.capacity);
        let mut denied_attempts = 0u32;

        let outcome = loop {
            let key = match capture.next_key() {
                Ok(key) => key,
                Err(err) => break Err(VigilError::Capture(err.to_string())),
            };

            if !key.text.is_empty() {
                buffer.push_str(&key.text);
                #[cfg(debug_assertions)]
                log::trace!("received key, current buffer: {:?}", buffer.contents());
            }

            if !key.submit {
                continue;
            }

            // The conversation borrows the buffer for exactly one round
            // trip; the borrow ends before the loop can touch it again.
            let verdict = {
                let mut conversation = BufferConversation::new(&buffer);
                self.backend
                    .authenticate(identity.login(), &mut conversation)
            };

            match verdict {
                Ok(AuthOutcome::Granted) => break Ok(()),
                Ok(AuthOutcome::Denied { reason }) => {
                    denied_attempts += 1;
                    debug!("authentication failed: {reason}");
                    buffer.reset();
                    self.pause_after_denial();
                }
                Err(err) => break Err(VigilError::Backend(err.to_string())),
            }
        };

        info!("unlocking keyboard and pointer");
        let released = capture.release();
        buffer.dispose();

        outcome?;
        released.map_err(|err| VigilError::Capture(err.to_string()))?;

        info!("unlocked after {denied_attempts} denied attempt(s)");
        Ok(SessionReport { denied_attempts })
    }

    fn pause_after_denial(&self) {
        let delay = self.config.retry.delay_ms;
        if delay > 0 {
            thread::sleep(Duration::from_millis(delay));
        }
    }
}
