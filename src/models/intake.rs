use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One observed dose event from the intake journal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntakeRecord {
    pub id: String,
    pub user_id: String,
    /// Case-sensitive key used for grouping and frequency lookup.
    pub medication_name: String,
    pub date_taken: NaiveDateTime,
    /// Display-only strength, e.g. "40mg".
    pub dosage: Option<String>,
    pub notes: Option<String>,
}

impl IntakeRecord {
    /// New record with a generated id and no dosage/notes.
    pub fn new(user_id: &str, medication_name: &str, date_taken: NaiveDateTime) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            medication_name: medication_name.into(),
            date_taken,
            dosage: None,
            notes: None,
        }
    }

    pub fn with_dosage(mut self, dosage: &str) -> Self {
        self.dosage = Some(dosage.into());
        self
    }
}
