use super::*;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use vigil_provider::auth::Conversation;
use vigil_provider::display::KeyPress;

#[derive(Clone, Default)]
struct ScriptedDisplay {
    events: Arc<Mutex<VecDeque<KeyPress>>>,
    acquires: Arc<Mutex<u32>>,
    releases: Arc<Mutex<u32>>,
}

impl ScriptedDisplay {
    fn with_events(events: Vec<KeyPress>) -> Self {
        Self {
            events: Arc::new(Mutex::new(events.into())),
            ..Self::default()
        }
    }

    fn acquires(&self) -> u32 {
        *self.acquires.lock().unwrap()
    }

    fn releases(&self) -> u32 {
        *self.releases.lock().unwrap()
    }
}

struct ScriptedCapture {
    events: Arc<Mutex<VecDeque<KeyPress>>>,
    releases: Arc<Mutex<u32>>,
}

impl InputCapture for ScriptedCapture {
    type Error = VigilError;

    fn next_key(&mut self) -> VigilResult<KeyPress> {
        self.events
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| VigilError::Capture("event script exhausted".into()))
    }

    fn release(self) -> VigilResult<()> {
        *self.releases.lock().unwrap() += 1;
        Ok(())
    }
}

impl DisplayServer for ScriptedDisplay {
    type Error = VigilError;
    type Capture = ScriptedCapture;

    fn acquire(&self) -> VigilResult<ScriptedCapture> {
        *self.acquires.lock().unwrap() += 1;
        Ok(ScriptedCapture {
            events: self.events.clone(),
            releases: self.releases.clone(),
        })
    }
}

/// Grants when the submitted secret matches; records every submission.
#[derive(Clone)]
struct RecordingBackend {
    secret: String,
    observed: Arc<Mutex<Vec<String>>>,
}

impl RecordingBackend {
    fn accepting(secret: &str) -> Self {
        Self {
            secret: secret.to_string(),
            observed: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn observed(&self) -> Vec<String> {
        self.observed.lock().unwrap().clone()
    }
}

impl AuthBackend for RecordingBackend {
    type Error = VigilError;

    fn authenticate(
        &self,
        _login: &str,
        conversation: &mut dyn Conversation,
    ) -> VigilResult<AuthOutcome> {
        let answer = conversation
            .secret_request("Password: ", false)
            .map_err(|err| VigilError::Backend(err.to_string()))?;
        self.observed.lock().unwrap().push(answer.to_string());

        if answer.as_str() == self.secret {
            Ok(AuthOutcome::Granted)
        } else {
            Ok(AuthOutcome::denied("secret verification refused"))
        }
    }
}

/// Always fails with a backend contract violation.
struct BrokenBackend;

impl AuthBackend for BrokenBackend {
    type Error = VigilError;

    fn authenticate(
        &self,
        _login: &str,
        _conversation: &mut dyn Conversation,
    ) -> VigilResult<AuthOutcome> {
        Err(VigilError::Backend("prompt of unknown type".into()))
    }
}

fn typed(secret: &str) -> Vec<KeyPress> {
    let mut events: Vec<KeyPress> = secret
        .chars()
        .map(|ch| KeyPress::text(ch.to_string()))
        .collect();
    events.push(KeyPress::submit());
    events
}

fn alice() -> SessionIdentity {
    SessionIdentity::new(1000, "alice")
}

fn session_config(capacity: usize) -> VigilConfig {
    let mut config = VigilConfig::default();
    config.input.capacity = capacity;
    config
}

#[test]
fn unlocks_with_one_round_trip_on_correct_secret() {
    let display = ScriptedDisplay::with_events(typed("abc"));
    let backend = RecordingBackend::accepting("abc");
    let session = LockSession::new(VigilConfig::default(), display.clone(), backend.clone());

    let report = session.run(&alice()).unwrap();

    assert_eq!(report.denied_attempts, 0);
    assert_eq!(backend.observed(), vec!["abc"]);
    assert_eq!(display.acquires(), 1);
    assert_eq!(display.releases(), 1);
}

#[test]
fn denial_resets_buffer_before_next_attempt() {
    let mut events = typed("abc");
    events.extend(typed("abcd"));
    let display = ScriptedDisplay::with_events(events);
    let backend = RecordingBackend::accepting("abcd");
    let session = LockSession::new(VigilConfig::default(), display.clone(), backend.clone());

    let report = session.run(&alice()).unwrap();

    assert_eq!(report.denied_attempts, 1);
    // Without the reset the second submission would read "abcabcd".
    assert_eq!(backend.observed(), vec!["abc", "abcd"]);
    assert_eq!(display.releases(), 1);
}

#[test]
fn release_happens_exactly_once_despite_repeated_denials() {
    let mut events = Vec::new();
    for wrong in ["a", "b", "c", "d", "e"] {
        events.extend(typed(wrong));
    }
    events.extend(typed("sesame"));
    let display = ScriptedDisplay::with_events(events);
    let backend = RecordingBackend::accepting("sesame");
    let session = LockSession::new(VigilConfig::default(), display.clone(), backend.clone());

    let report = session.run(&alice()).unwrap();

    assert_eq!(report.denied_attempts, 5);
    assert_eq!(display.acquires(), 1);
    assert_eq!(display.releases(), 1);
}

#[test]
fn no_submission_means_no_authentication() {
    let events = vec![
        KeyPress::text("a"),
        KeyPress::text("b"),
        KeyPress::text("c"),
    ];
    let display = ScriptedDisplay::with_events(events);
    let backend = RecordingBackend::accepting("abc");
    let session = LockSession::new(VigilConfig::default(), display.clone(), backend.clone());

    // The script runs dry while still capturing, which surfaces as a fatal
    // capture error; no round trip ever happened.
    let err = session.run(&alice()).unwrap_err();
    assert!(matches!(err, VigilError::Capture(_)));
    assert!(backend.observed().is_empty());
    assert_eq!(display.releases(), 1);
}

#[test]
fn bare_submission_sends_empty_string_not_nothing() {
    let display = ScriptedDisplay::with_events(typed(""));
    let backend = RecordingBackend::accepting("letmein");
    let session = LockSession::new(VigilConfig::default(), display.clone(), backend.clone());

    let err = session.run(&alice()).unwrap_err();
    assert!(matches!(err, VigilError::Capture(_)));
    assert_eq!(backend.observed(), vec![""]);
}

#[test]
fn overflow_restarts_input_mid_session() {
    // Capacity 4 leaves three usable bytes: typing "abcde" restarts the
    // buffer at "d", so the backend sees "de".
    let display = ScriptedDisplay::with_events(typed("abcde"));
    let backend = RecordingBackend::accepting("de");
    let session = LockSession::new(session_config(4), display.clone(), backend.clone());

    let report = session.run(&alice()).unwrap();

    assert_eq!(report.denied_attempts, 0);
    assert_eq!(backend.observed(), vec!["de"]);
}

#[test]
fn backend_contract_violation_is_fatal_but_still_releases() {
    let display = ScriptedDisplay::with_events(typed("abc"));
    let session = LockSession::new(VigilConfig::default(), display.clone(), BrokenBackend);

    let err = session.run(&alice()).unwrap_err();
    assert!(matches!(err, VigilError::Backend(_)));
    assert_eq!(display.releases(), 1);
}
