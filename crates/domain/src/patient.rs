//! Patient records

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::de::null_as_default;
use crate::http::{FilePart, MultipartForm};
use crate::records::{Assessment, FamilySession, Report, SatisfactionSurvey, TherapySession};

/// Server identifier of a patient.
pub type PatientId = u64;

/// Multipart field carrying the school history attachment.
pub const SCHOOL_HISTORY_FILE_FIELD: &str = "school_history_file";

/// Biological sex as recorded at intake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Sex {
    /// Male.
    #[default]
    #[serde(rename = "M")]
    Male,
    /// Female.
    #[serde(rename = "F")]
    Female,
    /// Other / not informed.
    #[serde(rename = "O")]
    Other,
}

impl Sex {
    /// Code used on the wire.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Male => "M",
            Self::Female => "F",
            Self::Other => "O",
        }
    }
}

/// Patient as listed by `GET /patients/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    /// Server identifier.
    pub id: PatientId,
    /// Full name.
    pub full_name: String,
    /// Date of birth.
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
    /// Sex.
    #[serde(default)]
    pub sex: Option<Sex>,
    /// Contact e-mail.
    #[serde(default, deserialize_with = "null_as_default")]
    pub contact_email: String,
    /// Contact phone.
    #[serde(default, deserialize_with = "null_as_default")]
    pub contact_phone: String,
    /// Emergency contact.
    #[serde(default, deserialize_with = "null_as_default")]
    pub emergency_contact: String,
    /// Address.
    #[serde(default, deserialize_with = "null_as_default")]
    pub address: String,
    /// School history notes.
    #[serde(default, deserialize_with = "null_as_default")]
    pub school_history: String,
    /// URL of the uploaded school history document.
    #[serde(default)]
    pub school_history_file: Option<String>,
    /// Behavior history.
    #[serde(default, deserialize_with = "null_as_default")]
    pub behavior_history: String,
    /// Family history.
    #[serde(default, deserialize_with = "null_as_default")]
    pub family_history: String,
    /// Initial diagnostic hypothesis.
    #[serde(default, deserialize_with = "null_as_default")]
    pub initial_diagnosis: String,
    /// Comorbidities.
    #[serde(default, deserialize_with = "null_as_default")]
    pub comorbidities: String,
    /// Free notes.
    #[serde(default, deserialize_with = "null_as_default")]
    pub notes: String,
    /// Whether the patient is in active follow-up.
    #[serde(default = "default_active")]
    pub active: bool,
    /// Age in whole years, computed by the server.
    #[serde(default)]
    pub age: Option<u32>,
    /// Creation timestamp.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Last update timestamp.
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

const fn default_active() -> bool {
    true
}

/// Patient with every nested record, from `GET /patients/{id}/`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientDetail {
    /// Core patient fields.
    #[serde(flatten)]
    pub patient: Patient,
    /// Standardized assessments.
    #[serde(default, deserialize_with = "null_as_default")]
    pub assessments: Vec<Assessment>,
    /// Therapy sessions.
    #[serde(default, deserialize_with = "null_as_default")]
    pub sessions: Vec<TherapySession>,
    /// Reports.
    #[serde(default, deserialize_with = "null_as_default")]
    pub reports: Vec<Report>,
    /// Satisfaction surveys.
    #[serde(default, deserialize_with = "null_as_default")]
    pub surveys: Vec<SatisfactionSurvey>,
    /// Family sessions.
    #[serde(default, deserialize_with = "null_as_default")]
    pub family_sessions: Vec<FamilySession>,
    /// Current therapeutic plan, kept opaque.
    #[serde(default)]
    pub therapeutic_plan: Option<serde_json::Value>,
}

/// Intake form for `POST /patients/`.
///
/// Sent as `multipart/form-data` because it may carry the school history
/// document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewPatient {
    /// Full name.
    pub full_name: String,
    /// Date of birth.
    pub birth_date: Option<NaiveDate>,
    /// Sex.
    pub sex: Sex,
    /// Contact e-mail.
    pub contact_email: String,
    /// Contact phone.
    pub contact_phone: String,
    /// Emergency contact.
    pub emergency_contact: String,
    /// Address.
    pub address: String,
    /// School history notes.
    pub school_history: String,
    /// Behavior history.
    pub behavior_history: String,
    /// Family history.
    pub family_history: String,
    /// Initial diagnostic hypothesis.
    pub initial_diagnosis: String,
    /// Comorbidities.
    pub comorbidities: String,
    /// Optional school history document.
    pub school_history_file: Option<FilePart>,
}

impl NewPatient {
    /// Creates an intake form with the required fields.
    #[must_use]
    pub fn new(full_name: impl Into<String>, birth_date: NaiveDate, sex: Sex) -> Self {
        Self {
            full_name: full_name.into(),
            birth_date: Some(birth_date),
            sex,
            ..Self::default()
        }
    }

    /// Builds the multipart body. Empty fields are sent as empty strings.
    #[must_use]
    pub fn to_multipart(&self) -> MultipartForm {
        let birth_date = self
            .birth_date
            .map(|date| date.format("%Y-%m-%d").to_string())
            .unwrap_or_default();
        let mut form = MultipartForm::new()
            .text("full_name", &self.full_name)
            .text("birth_date", birth_date)
            .text("sex", self.sex.code())
            .text("contact_email", &self.contact_email)
            .text("contact_phone", &self.contact_phone)
            .text("emergency_contact", &self.emergency_contact)
            .text("address", &self.address)
            .text("school_history", &self.school_history)
            .text("behavior_history", &self.behavior_history)
            .text("family_history", &self.family_history)
            .text("initial_diagnosis", &self.initial_diagnosis)
            .text("comorbidities", &self.comorbidities);
        if let Some(file) = &self.school_history_file {
            let mut part = file.clone();
            part.field = SCHOOL_HISTORY_FILE_FIELD.to_string();
            form = form.file(part);
        }
        form
    }
}

/// Filters patients by a case-insensitive name fragment and sorts by name.
#[must_use]
pub fn filter_patients<'a>(patients: &'a [Patient], search: &str) -> Vec<&'a Patient> {
    let needle = search.trim().to_lowercase();
    let mut matches: Vec<&Patient> = patients
        .iter()
        .filter(|patient| patient.full_name.to_lowercase().contains(&needle))
        .collect();
    matches.sort_by_key(|patient| patient.full_name.to_lowercase());
    matches
}
