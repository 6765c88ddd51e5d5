//! TEAcare Domain - Core clinical record types
//!
//! This crate defines the data model exchanged with the TEAcare clinical
//! records API. All types here are pure Rust with no I/O dependencies.

pub mod auth;
pub mod dashboard;
pub mod diagnostic;
pub mod error;
pub mod http;
pub mod listing;
pub mod patient;
pub mod records;
pub mod validation;

mod de;

pub use auth::{
    Credentials, Profession, Profile, ProfileUpdate, RefreshGrant, Registration, TokenKind,
    TokenPair, token_preview,
};
pub use dashboard::{DashboardMetrics, ProgressPoint};
pub use diagnostic::{
    AnswerKind, DiagnosticResult, DiagnosticSubmission, FunctionalLevel, PartyRef, Question,
    QuestionAxis, ResponseDetail, ResponseEntry, Score, SubmittedResponse, WizardQuestion,
    flatten_axes,
};
pub use error::{DomainError, DomainResult};
pub use http::{ApiRequest, ApiResponse, FilePart, HttpMethod, MultipartForm, RequestBody};
pub use listing::{ListPayload, extract_array};
pub use patient::{NewPatient, Patient, PatientDetail, PatientId, Sex, filter_patients};
pub use records::{
    Assessment, AssessmentScale, FamilySession, NewAssessment, NewFamilySession, NewReport,
    NewSatisfactionSurvey, NewTherapySession, PatientRecord, Report, ReportType,
    SatisfactionSurvey, SessionType, TherapySession,
};
pub use validation::ValidationErrors;
