//! Diagnostic questionnaire model.
//!
//! Questions arrive grouped by axis; the wizard walks them as one flat,
//! ordered list. Answers are binary and travel as `0` (no) or `1` (yes).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::de::{null_as_default, optional_decimal};
use crate::error::DomainError;
use crate::patient::PatientId;

/// Label shown for a question without an answer.
pub const UNANSWERED_LABEL: &str = "Não respondido";

/// A binary answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub enum Score {
    /// "Não"
    No,
    /// "Sim"
    Yes,
}

impl Score {
    /// Answer label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::No => "Não",
            Self::Yes => "Sim",
        }
    }

    /// Label for a possibly missing answer.
    #[must_use]
    pub const fn label_for(score: Option<Self>) -> &'static str {
        match score {
            Some(score) => score.label(),
            None => UNANSWERED_LABEL,
        }
    }

    /// Matching answer kind.
    #[must_use]
    pub const fn kind(self) -> AnswerKind {
        match self {
            Self::No => AnswerKind::No,
            Self::Yes => AnswerKind::Yes,
        }
    }
}

impl TryFrom<i64> for Score {
    type Error = DomainError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::No),
            1 => Ok(Self::Yes),
            other => Err(DomainError::InvalidScore(other)),
        }
    }
}

impl From<Score> for u8 {
    fn from(score: Score) -> Self {
        match score {
            Score::No => 0,
            Score::Yes => 1,
        }
    }
}

/// Normalized answer as named by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnswerKind {
    /// Yes.
    Yes,
    /// No.
    #[default]
    No,
}

/// A question as served inside an axis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Stable identifier, e.g. `mchat_07`.
    pub id: String,
    /// Question text.
    pub text: String,
    /// Answer that counts as a failed item.
    #[serde(default)]
    pub risk_answer: AnswerKind,
    /// Whether a failure on this item is critical.
    #[serde(default)]
    pub critical: bool,
}

/// A thematic group of questions from `GET /assessment/diagnostic/questions/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionAxis {
    /// Axis identifier.
    #[serde(default)]
    pub id: String,
    /// Display label.
    #[serde(default)]
    pub label: Option<String>,
    /// Alternative display label used by older payloads.
    #[serde(default)]
    pub title: Option<String>,
    /// Questions, in order.
    #[serde(default, deserialize_with = "null_as_default")]
    pub questions: Vec<Question>,
}

impl QuestionAxis {
    /// Label, falling back to the title and then the identifier.
    #[must_use]
    pub fn display_label(&self) -> &str {
        self.label
            .as_deref()
            .or(self.title.as_deref())
            .unwrap_or(&self.id)
    }
}

/// A question in wizard order, tagged with its axis label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WizardQuestion {
    /// Question identifier.
    pub id: String,
    /// Question text.
    pub text: String,
    /// Label of the owning axis.
    pub axis: String,
    /// Whether a failure on this item is critical.
    pub critical: bool,
}

/// Flattens axes into wizard order: axis order, then question order.
#[must_use]
pub fn flatten_axes(axes: &[QuestionAxis]) -> Vec<WizardQuestion> {
    axes.iter()
        .flat_map(|axis| {
            let label = axis.display_label().to_string();
            axis.questions.iter().map(move |question| WizardQuestion {
                id: question.id.clone(),
                text: question.text.clone(),
                axis: label.clone(),
                critical: question.critical,
            })
        })
        .collect()
}

/// Local answer state for one question.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseEntry {
    /// `None` while unanswered.
    pub score: Option<Score>,
    /// Free observation.
    pub observation: String,
}

impl ResponseEntry {
    /// Returns true once a score was chosen.
    #[must_use]
    pub const fn is_answered(&self) -> bool {
        self.score.is_some()
    }
}

/// One answer in a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmittedResponse {
    /// Question identifier.
    pub question_id: String,
    /// Chosen answer.
    pub score: Score,
    /// Free observation.
    pub observation: String,
}

/// Body of `POST /assessment/diagnostic/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticSubmission {
    /// Patient under assessment.
    pub patient: PatientId,
    /// One entry per question, in wizard order.
    pub responses: Vec<SubmittedResponse>,
}

/// Functional level computed by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FunctionalLevel {
    /// Severe.
    Severe,
    /// Moderate.
    Moderate,
    /// Mild.
    Mild,
}

impl FunctionalLevel {
    /// Localized name used when the server omits one.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Severe => "Grave",
            Self::Moderate => "Moderado",
            Self::Mild => "Leve",
        }
    }
}

/// A patient or professional referenced by a result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartyRef {
    /// Server identifier.
    pub id: u64,
    /// Display name.
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    /// Professional registration number.
    #[serde(default)]
    pub crp: Option<String>,
    /// Institution.
    #[serde(default)]
    pub institution: Option<String>,
}

/// Per-question outcome inside a result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseDetail {
    /// Question identifier.
    pub question_id: String,
    /// Question text.
    #[serde(default, deserialize_with = "null_as_default")]
    pub question: String,
    /// Axis label.
    #[serde(default, deserialize_with = "null_as_default")]
    pub axis: String,
    /// Submitted answer.
    #[serde(default)]
    pub score: Option<Score>,
    /// Normalized answer.
    #[serde(default)]
    pub answer: Option<AnswerKind>,
    /// Localized answer label.
    #[serde(default)]
    pub answer_label: Option<String>,
    /// Whether the answer matched the risk answer.
    #[serde(default)]
    pub failed: bool,
    /// Whether the item is critical.
    #[serde(default)]
    pub critical: bool,
    /// Free observation.
    #[serde(default, deserialize_with = "null_as_default")]
    pub observation: String,
}

impl ResponseDetail {
    /// Server label, or one derived from the score.
    #[must_use]
    pub fn label(&self) -> &str {
        self.answer_label
            .as_deref()
            .unwrap_or_else(|| Score::label_for(self.score))
    }
}

/// Outcome of a diagnostic submission. Read-only once returned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosticResult {
    /// Server identifier, used to download the PDF report.
    pub id: u64,
    /// Assessed patient.
    #[serde(default)]
    pub patient: Option<PartyRef>,
    /// Responsible professional.
    #[serde(default)]
    pub professional: Option<PartyRef>,
    /// Per-question outcome.
    #[serde(default, deserialize_with = "null_as_default")]
    pub responses: Vec<ResponseDetail>,
    /// Legacy failure count.
    #[serde(default, deserialize_with = "optional_decimal")]
    pub score_total: Option<f64>,
    /// Number of failed items.
    #[serde(default)]
    pub total_failed: Option<u32>,
    /// Number of failed critical items.
    #[serde(default)]
    pub critical_failed: u32,
    /// Whether the screening threshold was met.
    #[serde(default)]
    pub positive_screen: bool,
    /// Whether the high risk threshold was met.
    #[serde(default)]
    pub high_risk: bool,
    /// Functional level.
    #[serde(default)]
    pub functional_level: Option<FunctionalLevel>,
    /// Localized functional level.
    #[serde(default)]
    pub functional_level_display: Option<String>,
    /// Initial recommendations.
    #[serde(default)]
    pub recommendations: Option<String>,
    /// Creation timestamp.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Absolute URL of the PDF report.
    #[serde(default)]
    pub pdf_url: Option<String>,
}

impl DiagnosticResult {
    /// Failed items, falling back to the legacy score total.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn failed_items(&self) -> u32 {
        self.total_failed
            .or_else(|| self.score_total.map(|total| total.max(0.0).round() as u32))
            .unwrap_or(0)
    }

    /// "Positivo" or "Negativo".
    #[must_use]
    pub const fn screen_label(&self) -> &'static str {
        if self.positive_screen {
            "Positivo"
        } else {
            "Negativo"
        }
    }

    /// Functional level label, preferring the server's.
    #[must_use]
    pub fn functional_level_label(&self) -> &str {
        match (&self.functional_level_display, self.functional_level) {
            (Some(display), _) => display,
            (None, Some(level)) => level.display_name(),
            (None, None) => "",
        }
    }

    /// Name of the assessed patient, if known.
    #[must_use]
    pub fn patient_name(&self) -> Option<&str> {
        self.patient.as_ref().map(|patient| patient.name.as_str())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_score_wire_format() {
        assert_eq!(serde_json::to_value(Score::Yes).unwrap(), json!(1));
        assert_eq!(serde_json::from_value::<Score>(json!(0)).unwrap(), Score::No);
        assert!(serde_json::from_value::<Score>(json!(2)).is_err());
        assert_eq!(Score::try_from(5), Err(DomainError::InvalidScore(5)));
    }

    #[test]
    fn test_score_labels() {
        assert_eq!(Score::label_for(Some(Score::Yes)), "Sim");
        assert_eq!(Score::label_for(Some(Score::No)), "Não");
        assert_eq!(Score::label_for(None), UNANSWERED_LABEL);
    }

    #[test]
    fn test_flatten_axes_keeps_order_and_labels() {
        let axes: Vec<QuestionAxis> = serde_json::from_value(json!([
            {"id": "mchat", "label": "M-CHAT", "questions": [
                {"id": "q1", "text": "First", "risk_answer": "no", "critical": false},
                {"id": "q2", "text": "Second", "risk_answer": "yes", "critical": true}
            ]},
            {"id": "social", "title": "Social", "questions": [{"id": "q3", "text": "Third"}]},
            {"id": "empty", "questions": null}
        ]))
        .unwrap();

        let flat = flatten_axes(&axes);
        let ids: Vec<&str> = flat.iter().map(|q| q.id.as_str()).collect();
        assert_eq!(ids, vec!["q1", "q2", "q3"]);
        assert_eq!(flat[1].axis, "M-CHAT");
        assert!(flat[1].critical);
        assert_eq!(flat[2].axis, "Social");
        assert_eq!(axes[2].display_label(), "empty");
    }

    #[test]
    fn test_submission_body() {
        let submission = DiagnosticSubmission {
            patient: 12,
            responses: vec![SubmittedResponse {
                question_id: "q1".to_string(),
                score: Score::Yes,
                observation: String::new(),
            }],
        };
        assert_eq!(
            serde_json::to_value(&submission).unwrap(),
            json!({"patient": 12, "responses": [{"question_id": "q1", "score": 1, "observation": ""}]})
        );
    }

    #[test]
    fn test_result_payload() {
        let result: DiagnosticResult = serde_json::from_value(json!({
            "id": 31,
            "patient": {"id": 12, "name": "Lia Costa"},
            "professional": {"id": 1, "name": "Ana", "crp": "06/1", "institution": ""},
            "responses": [
                {"question_id": "q1", "question": "First", "axis": "M-CHAT", "score": 1,
                 "answer": "yes", "answer_label": "Sim", "failed": true, "critical": true,
                 "observation": ""},
                {"question_id": "q2", "score": 0}
            ],
            "score_total": 3,
            "total_failed": 3,
            "critical_failed": 1,
            "positive_screen": true,
            "high_risk": false,
            "functional_level": "moderate",
            "functional_level_display": "Moderado",
            "recommendations": "Reaplique o M-CHAT.",
            "created_at": "2024-06-01T12:00:00Z",
            "pdf_url": "http://localhost:8000/api/assessment/diagnostic/31/pdf/"
        }))
        .unwrap();

        assert_eq!(result.failed_items(), 3);
        assert_eq!(result.screen_label(), "Positivo");
        assert_eq!(result.functional_level_label(), "Moderado");
        assert_eq!(result.patient_name(), Some("Lia Costa"));
        assert_eq!(result.responses[0].label(), "Sim");
        assert_eq!(result.responses[1].label(), "Não");
    }

    #[test]
    fn test_result_falls_back_to_score_total() {
        let result: DiagnosticResult =
            serde_json::from_value(json!({"id": 1, "score_total": "4.00", "functional_level": "mild"}))
                .unwrap();
        assert_eq!(result.failed_items(), 4);
        assert_eq!(result.screen_label(), "Negativo");
        assert_eq!(result.functional_level_label(), "Leve");
    }
}
