//! Vaccine recommendation requester.
//!
//! Builds the fixed two-turn prompt around the entered subject details and
//! submits it with fixed sampling parameters. The screen never sees an error:
//! missing content and failed requests both collapse to fixed user-visible
//! strings, and the failure itself goes to the log.

use crate::models::Subject;
use crate::openai::{ChatCompletion, ChatMessage, RequestParams, Role};

/// Persona establishing the assistant's register.
pub const SYSTEM_PROMPT: &str =
    "You are a helpful medical assistant providing vaccine recommendations.";

/// Shown when the service answers but the first candidate has no content.
pub const NO_CONTENT_FALLBACK: &str = "Unable to generate recommendation";

/// Shown when the request fails for any reason.
pub const ERROR_FALLBACK: &str = "Error: Unable to get recommendation";

/// Errors from the completion endpoint or the transport under it.
#[derive(Debug, thiserror::Error)]
pub enum RecommendationError {
    #[error("Cannot reach completion endpoint at {0}")]
    Connection(String),

    #[error("Completion endpoint returned error (status {status}): {body}")]
    Api { status: u16, body: String },

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Response parsing error: {0}")]
    ResponseParsing(String),
}

/// The fixed sampling parameters every request is sent with: one candidate,
/// bounded output, temperature favoring varied phrasing.
pub fn fixed_params() -> RequestParams {
    RequestParams {
        model: "gpt-4".to_string(),
        temperature: 0.7,
        top_p: 1.0,
        n: 1,
        max_tokens: 1000,
        presence_penalty: 0.0,
        frequency_penalty: 0.0,
    }
}

/// Build the two-turn prompt. The subject fields are embedded verbatim —
/// no validation, empty strings included.
pub fn build_messages(subject: &Subject) -> Vec<ChatMessage> {
    vec![
        ChatMessage {
            role: Role::System,
            content: SYSTEM_PROMPT.to_string(),
        },
        ChatMessage {
            role: Role::User,
            content: format!(
                "Please provide a brief vaccination recommendation for a person \
                 with the following details: Name: {} {}, Birth Date: {}",
                subject.first_name, subject.last_name, subject.birth_date
            ),
        },
    ]
}

/// Submit one recommendation request and fold every outcome into displayable
/// text. One outbound call, no retry.
pub fn request_recommendation(client: &dyn ChatCompletion, subject: &Subject) -> String {
    let messages = build_messages(subject);
    match client.complete(&fixed_params(), &messages) {
        Ok(Some(text)) => text,
        Ok(None) => {
            tracing::warn!("recommendation response carried no content");
            NO_CONTENT_FALLBACK.to_string()
        }
        Err(e) => {
            tracing::error!(error = %e, "recommendation request failed");
            ERROR_FALLBACK.to_string()
        }
    }
}
