//! Linux-PAM implementation of the authentication contract.
//!
//! Each attempt opens one PAM context for the configured service, runs
//! secret verification followed by account validation, and ends the context
//! unconditionally. PAM's conversation callback is bridged onto the
//! provider-level [`Conversation`] trait, so the same responder drives the
//! real stack and the scripted test backends.

use std::ffi::{CStr, CString};

use log::debug;
use pam_client::{Context, ConversationHandler, ErrorCode, Flag};

use vigil_core::error::{VigilError, VigilResult};
use vigil_provider::auth::{AuthBackend, AuthOutcome, Conversation};

/// Authenticates against the PAM policy of a fixed service name.
#[derive(Debug, Clone)]
pub struct PamAuthBackend {
    service: String,
}

impl PamAuthBackend {
    pub fn new(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
        }
    }

    pub fn service(&self) -> &str {
        &self.service
    }
}

impl AuthBackend for PamAuthBackend {
    type Error = VigilError;

    fn authenticate(
        &self,
        login: &str,
        conversation: &mut dyn Conversation,
    ) -> VigilResult<AuthOutcome> {
        debug!(
            "starting authentication context as {} for user {login}",
            self.service
        );
        let bridge = ConversationBridge::new(conversation);
        let mut context = Context::new(&self.service, Some(login), bridge).map_err(|err| {
            VigilError::Backend(format!(
                "unable to start an authentication context for service `{}`: {err}",
                self.service
            ))
        })?;

        // Phase one: verify the typed secret.
        if let Err(err) = context.authenticate(Flag::NONE) {
            return classify(&err, "secret verification");
        }

        // Phase two: the account must currently be permitted to
        // authenticate; accounts without a credential set are refused.
        if let Err(err) = context.acct_mgmt(Flag::DISALLOW_NULL_AUTHTOK) {
            return classify(&err, "account validation");
        }

        Ok(AuthOutcome::Granted)
        // The context ends its PAM transaction on drop, so teardown runs
        // whether or not either phase failed.
    }
}

/// Sort a phase failure into an ordinary denial or a fatal backend fault.
///
/// Conversation breakdowns, resource exhaustion, and critical aborts mean
/// the backend contract was violated and the caller cannot safely retry;
/// everything else is a plain denial whose code is diagnostic only.
fn classify(err: &pam_client::Error, phase: &str) -> VigilResult<AuthOutcome> {
    match err.code() {
        ErrorCode::CONV_ERR | ErrorCode::BUF_ERR | ErrorCode::ABORT => Err(VigilError::Backend(
            format!("{phase} aborted: {err}"),
        )),
        code => Ok(AuthOutcome::denied(format!(
            "{phase} failed: {err} (code {code:?})"
        ))),
    }
}

/// Adapts PAM message styles onto the provider conversation trait.
struct ConversationBridge<'a> {
    inner: &'a mut dyn Conversation,
}

impl<'a> ConversationBridge<'a> {
    fn new(inner: &'a mut dyn Conversation) -> Self {
        Self { inner }
    }

    fn respond(&mut self, msg: &CStr, echoed: bool) -> Result<CString, ErrorCode> {
        let prompt = msg.to_string_lossy();
        let answer = self
            .inner
            .secret_request(&prompt, echoed)
            .map_err(|_| ErrorCode::CONV_ERR)?;
        // An interior NUL cannot be carried across the C boundary; refuse
        // the conversation rather than truncate the secret.
        CString::new(answer.as_bytes()).map_err(|_| ErrorCode::CONV_ERR)
    }
}

impl ConversationHandler for ConversationBridge<'_> {
    fn prompt_echo_on(&mut self, msg: &CStr) -> Result<CString, ErrorCode> {
        self.respond(msg, true)
    }

    fn prompt_echo_off(&mut self, msg: &CStr) -> Result<CString, ErrorCode> {
        self.respond(msg, false)
    }

    fn text_info(&mut self, msg: &CStr) {
        self.inner.info_notice(&msg.to_string_lossy());
    }

    fn error_msg(&mut self, msg: &CStr) {
        self.inner.error_notice(&msg.to_string_lossy());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vigil_provider::auth::ConversationError;
    use zeroize::Zeroizing;

    #[derive(Default)]
    struct StubConversation {
        answer: String,
        fail: bool,
        prompts: Vec<(String, bool)>,
        notices: Vec<String>,
    }

    impl Conversation for StubConversation {
        fn secret_request(
            &mut self,
            prompt: &str,
            echoed: bool,
        ) -> Result<Zeroizing<String>, ConversationError> {
            self.prompts.push((prompt.to_string(), echoed));
            if self.fail {
                return Err(ConversationError("out of memory".into()));
            }
            Ok(Zeroizing::new(self.answer.clone()))
        }

        fn error_notice(&mut self, message: &str) {
            self.notices.push(format!("error: {message}"));
        }

        fn info_notice(&mut self, message: &str) {
            self.notices.push(format!("info: {message}"));
        }
    }

    fn prompt() -> &'static CStr {
        CStr::from_bytes_with_nul(b"Password: \0").unwrap()
    }

    #[test]
    fn masked_prompt_is_answered_from_the_conversation() {
        let mut stub = StubConversation {
            answer: "hunter2".into(),
            ..StubConversation::default()
        };
        let mut bridge = ConversationBridge::new(&mut stub);

        let response = bridge.prompt_echo_off(prompt()).unwrap();
        assert_eq!(response.as_bytes(), b"hunter2");
        assert_eq!(stub.prompts, vec![("Password: ".to_string(), false)]);
    }

    #[test]
    fn echoed_prompt_is_flagged_as_such() {
        let mut stub = StubConversation::default();
        let mut bridge = ConversationBridge::new(&mut stub);

        bridge.prompt_echo_on(prompt()).unwrap();
        assert_eq!(stub.prompts, vec![("Password: ".to_string(), true)]);
    }

    #[test]
    fn conversation_failure_becomes_conv_err() {
        let mut stub = StubConversation {
            fail: true,
            ..StubConversation::default()
        };
        let mut bridge = ConversationBridge::new(&mut stub);

        let err = bridge.prompt_echo_off(prompt()).unwrap_err();
        assert!(matches!(err, ErrorCode::CONV_ERR));
    }

    #[test]
    fn interior_nul_refuses_the_conversation() {
        let mut stub = StubConversation {
            answer: "bad\0secret".into(),
            ..StubConversation::default()
        };
        let mut bridge = ConversationBridge::new(&mut stub);

        let err = bridge.prompt_echo_off(prompt()).unwrap_err();
        assert!(matches!(err, ErrorCode::CONV_ERR));
    }

    #[test]
    fn notices_are_forwarded_without_answers() {
        let mut stub = StubConversation::default();
        let mut bridge = ConversationBridge::new(&mut stub);

        bridge.text_info(CStr::from_bytes_with_nul(b"welcome\0").unwrap());
        bridge.error_msg(CStr::from_bytes_with_nul(b"expired\0").unwrap());
        assert_eq!(stub.notices, vec!["info: welcome", "error: expired"]);
        assert!(stub.prompts.is_empty());
    }
}
