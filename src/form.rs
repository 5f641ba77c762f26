//! Screen view state.
//!
//! The single screen's state is an immutable-per-update value: the UI renders
//! a `FormState` and feeds every change back through `FormState::apply` as a
//! `FormEvent`. The recommendation request runs on a worker thread and
//! delivers its result as one more event over the caller's channel, so only
//! the event loop ever writes state.

use std::sync::mpsc::Sender;
use std::thread::JoinHandle;

use serde::{Deserialize, Serialize};

use crate::models::Subject;
use crate::openai::ChatCompletion;
use crate::recommendation::request_recommendation;

/// Everything the screen renders.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormState {
    pub subject: Subject,
    /// Last recommendation (or sentinel error string); None until first request.
    pub recommendation: Option<String>,
    /// True while a request is in flight, gating the loading message.
    pub loading: bool,
}

/// State transitions, one per user action or completion.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum FormEvent {
    FirstNameChanged { value: String },
    LastNameChanged { value: String },
    BirthDateChanged { value: String },
    RecommendationRequested,
    RecommendationArrived { text: String },
}

impl FormState {
    pub fn new() -> Self {
        Self::default()
    }

    /// The request button enables on name and birth date only — an in-flight
    /// request does not disable it.
    pub fn can_request_recommendation(&self) -> bool {
        !self.subject.first_name.is_empty() && !self.subject.birth_date.is_empty()
    }

    /// Pure transition to the next state.
    pub fn apply(mut self, event: FormEvent) -> Self {
        match event {
            FormEvent::FirstNameChanged { value } => {
                tracing::debug!(value = %value, "first name updated");
                self.subject.first_name = value;
            }
            FormEvent::LastNameChanged { value } => {
                tracing::debug!(value = %value, "last name updated");
                self.subject.last_name = value;
            }
            FormEvent::BirthDateChanged { value } => {
                tracing::debug!(value = %value, "birth date updated");
                self.subject.birth_date = value;
            }
            FormEvent::RecommendationRequested => {
                self.loading = true;
            }
            FormEvent::RecommendationArrived { text } => {
                self.recommendation = Some(text);
                self.loading = false;
            }
        }
        self
    }
}

/// Run one recommendation request off the UI thread.
///
/// The result (generated text or sentinel error string — never a failure)
/// arrives as a single `RecommendationArrived` event on `events`. There is no
/// cancellation; a second spawn while one is outstanding is not prevented.
pub fn spawn_recommendation_request<C>(
    client: C,
    subject: Subject,
    events: Sender<FormEvent>,
) -> JoinHandle<()>
where
    C: ChatCompletion + Send + 'static,
{
    std::thread::spawn(move || {
        let text = request_recommendation(&client, &subject);
        // Receiver gone means the screen closed; nothing left to update.
        let _ = events.send(FormEvent::RecommendationArrived { text });
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::openai::MockChatClient;
    use crate::recommendation::ERROR_FALLBACK;
    use std::sync::mpsc;

    fn typed_state() -> FormState {
        FormState::new()
            .apply(FormEvent::FirstNameChanged {
                value: "Jane".into(),
            })
            .apply(FormEvent::LastNameChanged { value: "Doe".into() })
            .apply(FormEvent::BirthDateChanged {
                value: "01/02/1990".into(),
            })
    }

    #[test]
    fn keystrokes_update_subject() {
        let state = typed_state();
        assert_eq!(state.subject.full_name(), "Jane Doe");
        assert_eq!(state.subject.birth_date, "01/02/1990");
        assert!(!state.loading);
        assert!(state.recommendation.is_none());
    }

    #[test]
    fn apply_does_not_mutate_in_place() {
        let before = typed_state();
        let after = before.clone().apply(FormEvent::RecommendationRequested);
        assert!(!before.loading);
        assert!(after.loading);
    }

    #[test]
    fn request_gating_needs_first_name_and_birth_date_only() {
        let mut state = FormState::new();
        assert!(!state.can_request_recommendation());

        state = state.apply(FormEvent::FirstNameChanged {
            value: "Jane".into(),
        });
        assert!(!state.can_request_recommendation());

        state = state.apply(FormEvent::BirthDateChanged {
            value: "01/02/1990".into(),
        });
        // Last name empty is fine.
        assert!(state.can_request_recommendation());
    }

    #[test]
    fn in_flight_request_does_not_disable_the_button() {
        let state = typed_state().apply(FormEvent::RecommendationRequested);
        assert!(state.loading);
        assert!(state.can_request_recommendation());
    }

    #[test]
    fn arrival_sets_text_and_clears_loading() {
        let state = typed_state()
            .apply(FormEvent::RecommendationRequested)
            .apply(FormEvent::RecommendationArrived {
                text: "Stay current on boosters.".into(),
            });
        assert!(!state.loading);
        assert_eq!(
            state.recommendation.as_deref(),
            Some("Stay current on boosters.")
        );
    }

    #[test]
    fn worker_delivers_exactly_one_event() {
        let (tx, rx) = mpsc::channel();
        let subject = typed_state().subject;
        let handle = spawn_recommendation_request(
            MockChatClient::replying("Annual flu shot."),
            subject,
            tx,
        );
        handle.join().unwrap();

        match rx.recv().unwrap() {
            FormEvent::RecommendationArrived { text } => assert_eq!(text, "Annual flu shot."),
            other => panic!("unexpected event: {other:?}"),
        }
        assert!(rx.recv().is_err(), "sender should be dropped after one event");
    }

    #[test]
    fn failed_request_still_clears_loading() {
        let (tx, rx) = mpsc::channel();
        let state = typed_state().apply(FormEvent::RecommendationRequested);
        let handle =
            spawn_recommendation_request(MockChatClient::failing(), state.subject.clone(), tx);
        handle.join().unwrap();

        let state = state.apply(rx.recv().unwrap());
        assert!(!state.loading);
        assert_eq!(state.recommendation.as_deref(), Some(ERROR_FALLBACK));
    }

    #[test]
    fn dropped_receiver_does_not_panic_the_worker() {
        let (tx, rx) = mpsc::channel();
        drop(rx);
        let handle = spawn_recommendation_request(
            MockChatClient::replying("ignored"),
            Subject::default(),
            tx,
        );
        handle.join().unwrap();
    }

    #[test]
    fn events_serialize_tagged_for_the_shell() {
        let json =
            serde_json::to_string(&FormEvent::RecommendationRequested).unwrap();
        assert_eq!(json, r#"{"type":"RecommendationRequested"}"#);
    }
}
