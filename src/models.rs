//! Core data types shared between the screen state and the two operations.

use serde::{Deserialize, Serialize};

/// The person whose details are entered into the form.
///
/// All three fields are free text exactly as typed — the birth date is
/// expected as mm/dd/yyyy but never parsed or checked, and empty strings are
/// legal everywhere (the recommendation request sends them verbatim).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    pub first_name: String,
    pub last_name: String,
    pub birth_date: String,
}

impl Subject {
    pub fn new(first_name: &str, last_name: &str, birth_date: &str) -> Self {
        Self {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            birth_date: birth_date.to_string(),
        }
    }

    /// "First Last", exactly as drawn onto the certificate.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}
