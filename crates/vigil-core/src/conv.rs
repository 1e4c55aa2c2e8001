//! Conversation responder backed by the secure input buffer.

use log::{info, warn};
use zeroize::Zeroizing;

use vigil_provider::auth::{Conversation, ConversationError};

use crate::buffer::SecureBuffer;

/// Answers backend prompts from the current buffer contents.
///
/// Holds a borrow of the buffer for exactly one authentication round trip,
/// so the buffer stays single-owner: the session controller hands out the
/// borrow, the backend reads through it, and the borrow ends before the
/// loop resumes.
pub struct BufferConversation<'a> {
    buffer: &'a SecureBuffer,
}

impl<'a> BufferConversation<'a> {
    pub fn new(buffer: &'a SecureBuffer) -> Self {
        Self { buffer }
    }
}

impl Conversation for BufferConversation<'_> {
    fn secret_request(
        &mut self,
        prompt: &str,
        echoed: bool,
    ) -> Result<Zeroizing<String>, ConversationError> {
        // The literal prompt and answer are debug-build-only diagnostics;
        // release binaries never format passphrase material.
        #[cfg(debug_assertions)]
        log::trace!(
            "backend prompted for text (prompt {:?}, echoed {echoed}), answering {:?}",
            prompt,
            self.buffer.contents()
        );
        #[cfg(not(debug_assertions))]
        let _ = (prompt, echoed);

        Ok(Zeroizing::new(self.buffer.contents().to_string()))
    }

    fn error_notice(&mut self, message: &str) {
        warn!("backend error notice: {message}");
    }

    fn info_notice(&mut self, message: &str) {
        info!("backend info notice: {message}");
    }
}
