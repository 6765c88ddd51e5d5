//! Clinical records nested under a patient.
//!
//! Every record kind lives at `/patients/{id}/<collection>/` and supports
//! listing and creation. [`PatientRecord`] ties a record type to its
//! collection path and its creation payload so the API client can serve all
//! of them with one pair of generic operations.

use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::de::{null_as_default, optional_decimal};
use crate::patient::PatientId;

/// A record kind nested under a patient.
pub trait PatientRecord: DeserializeOwned + Send + 'static {
    /// Last path segment of the collection, e.g. `sessions`.
    const COLLECTION: &'static str;

    /// Payload accepted by `POST` on the collection.
    type Draft: Serialize + DeserializeOwned + Send + Sync;

    /// Collection path for one patient.
    #[must_use]
    fn collection_path(patient: PatientId) -> String {
        format!("/patients/{patient}/{}/", Self::COLLECTION)
    }
}

/// Standardized instrument applied in an assessment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AssessmentScale {
    /// Modified Checklist for Autism in Toddlers.
    Mchat,
    /// Autism Behavior Checklist.
    Abc,
    /// Vineland adaptive behavior scales.
    Vineland,
    /// Autism Treatment Evaluation Checklist.
    Atec,
    /// Children's Global Assessment Scale.
    Cgas,
}

impl AssessmentScale {
    /// Human-readable name.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Mchat => "M-CHAT",
            Self::Abc => "Autism Behavior Checklist",
            Self::Vineland => "Vineland",
            Self::Atec => "ATEC",
            Self::Cgas => "C-GAS/AGF",
        }
    }
}

/// A standardized assessment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assessment {
    /// Server identifier.
    pub id: u64,
    /// Instrument applied.
    pub scale: AssessmentScale,
    /// Date of application.
    pub application_date: NaiveDate,
    /// Total score. Sent by the server as a decimal string.
    #[serde(default, deserialize_with = "optional_decimal")]
    pub score_total: Option<f64>,
    /// Raw item responses.
    #[serde(default)]
    pub responses: Value,
    /// Interpretation.
    #[serde(default, deserialize_with = "null_as_default")]
    pub interpretation: String,
    /// Notes comparing with previous applications.
    #[serde(default, deserialize_with = "null_as_default")]
    pub comparison_notes: String,
    /// Creation timestamp.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Creation payload for [`Assessment`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAssessment {
    /// Instrument applied.
    pub scale: AssessmentScale,
    /// Date of application.
    pub application_date: NaiveDate,
    /// Total score.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score_total: Option<f64>,
    /// Raw item responses.
    #[serde(default)]
    pub responses: Value,
    /// Interpretation.
    #[serde(default)]
    pub interpretation: String,
    /// Notes comparing with previous applications.
    #[serde(default)]
    pub comparison_notes: String,
}

impl PatientRecord for Assessment {
    const COLLECTION: &'static str = "assessments";
    type Draft = NewAssessment;
}

/// Kind of therapy session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionType {
    /// Psychological session.
    Psychological,
    /// Psychopedagogical session.
    Psychopedagogical,
    /// Assessment session.
    Assessment,
    /// Re-evaluation.
    Reevaluation,
}

/// A therapy session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TherapySession {
    /// Server identifier.
    pub id: u64,
    /// Kind of session.
    pub session_type: SessionType,
    /// Date of the session.
    pub session_date: NaiveDate,
    /// Length in minutes.
    #[serde(default = "default_duration")]
    pub duration_minutes: u32,
    /// Activities performed.
    #[serde(default, deserialize_with = "null_as_default")]
    pub activities: String,
    /// Behaviour observations.
    #[serde(default, deserialize_with = "null_as_default")]
    pub behaviour_observations: String,
    /// Progress notes.
    #[serde(default, deserialize_with = "null_as_default")]
    pub progress_notes: String,
    /// Progress scales, kept opaque.
    #[serde(default)]
    pub progress_scales: Value,
    /// Attachment references, kept opaque.
    #[serde(default)]
    pub attachments: Value,
}

const fn default_duration() -> u32 {
    50
}

/// Creation payload for [`TherapySession`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTherapySession {
    /// Kind of session.
    pub session_type: SessionType,
    /// Date of the session.
    pub session_date: NaiveDate,
    /// Length in minutes.
    #[serde(default = "default_duration")]
    pub duration_minutes: u32,
    /// Activities performed.
    #[serde(default)]
    pub activities: String,
    /// Behaviour observations.
    #[serde(default)]
    pub behaviour_observations: String,
    /// Progress notes.
    #[serde(default)]
    pub progress_notes: String,
}

impl PatientRecord for TherapySession {
    const COLLECTION: &'static str = "sessions";
    type Draft = NewTherapySession;
}

/// Kind of report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportType {
    /// General technical report.
    Technical,
    /// Semiannual re-evaluation.
    SemiannualReview,
    /// Weekly follow-up.
    Weekly,
    /// Monthly follow-up.
    Monthly,
}

/// A clinical report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Server identifier.
    pub id: u64,
    /// Kind of report.
    pub report_type: ReportType,
    /// Localized label of the report kind.
    #[serde(default, deserialize_with = "null_as_default")]
    pub report_type_display: String,
    /// Generation timestamp.
    #[serde(default)]
    pub generated_at: Option<DateTime<Utc>>,
    /// One-line summary.
    #[serde(default, deserialize_with = "null_as_default")]
    pub summary: String,
    /// Full content.
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: String,
    /// Server path of the exported PDF.
    #[serde(default, deserialize_with = "null_as_default")]
    pub exported_pdf_path: String,
}

/// Creation payload for [`Report`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewReport {
    /// Kind of report.
    pub report_type: ReportType,
    /// One-line summary.
    #[serde(default)]
    pub summary: String,
    /// Full content.
    #[serde(default)]
    pub content: String,
}

impl PatientRecord for Report {
    const COLLECTION: &'static str = "reports";
    type Draft = NewReport;
}

/// A session held with the patient's family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilySession {
    /// Server identifier.
    pub id: u64,
    /// Date of the session.
    pub session_date: NaiveDate,
    /// Topic.
    pub topic: String,
    /// Activities performed.
    #[serde(default, deserialize_with = "null_as_default")]
    pub activities: String,
    /// Agreed action items.
    #[serde(default, deserialize_with = "null_as_default")]
    pub action_items: String,
    /// Follow-up date.
    #[serde(default)]
    pub follow_up_date: Option<NaiveDate>,
    /// Family feedback.
    #[serde(default, deserialize_with = "null_as_default")]
    pub feedback: String,
}

/// Creation payload for [`FamilySession`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewFamilySession {
    /// Date of the session.
    pub session_date: NaiveDate,
    /// Topic.
    #[serde(default)]
    pub topic: String,
    /// Activities performed.
    #[serde(default)]
    pub activities: String,
    /// Agreed action items.
    #[serde(default)]
    pub action_items: String,
    /// Follow-up date.
    pub follow_up_date: Option<NaiveDate>,
    /// Family feedback.
    #[serde(default)]
    pub feedback: String,
}

impl PatientRecord for FamilySession {
    const COLLECTION: &'static str = "family-sessions";
    type Draft = NewFamilySession;
}

/// A satisfaction survey answered by the family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SatisfactionSurvey {
    /// Server identifier.
    pub id: u64,
    /// Raw answers.
    #[serde(default)]
    pub responses: Value,
    /// Engagement index, 0 to 100.
    #[serde(default)]
    pub engagement_index: u32,
    /// Date the survey was conducted.
    pub conducted_at: NaiveDate,
    /// Free notes.
    #[serde(default, deserialize_with = "null_as_default")]
    pub notes: String,
}

/// Creation payload for [`SatisfactionSurvey`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewSatisfactionSurvey {
    /// Raw answers.
    #[serde(default)]
    pub responses: Value,
    /// Engagement index, 0 to 100.
    pub engagement_index: u32,
    /// Date the survey was conducted.
    pub conducted_at: NaiveDate,
    /// Free notes.
    #[serde(default)]
    pub notes: String,
}

impl PatientRecord for SatisfactionSurvey {
    const COLLECTION: &'static str = "surveys";
    type Draft = NewSatisfactionSurvey;
}
