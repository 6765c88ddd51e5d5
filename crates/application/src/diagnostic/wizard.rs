//! Diagnostic questionnaire state machine.
//!
//! The wizard walks a flat, ordered question list one question at a time,
//! offers a review summary once everything is answered, and hands out the
//! submission payload. It performs no I/O: loading and submitting are driven
//! from outside through the `questions_*` and `submission_*` events.
//!
//! ```text
//! Loading --questions_loaded--> Active(0) --next--> ... Active(N-1) --next--> Summary
//!                                   ^                                          |
//!                                   +--------- jump_to / previous -------------+
//! Summary --submission_succeeded--> Submitted
//! ```

use std::collections::HashMap;

use teacare_domain::{
    DiagnosticResult, DiagnosticSubmission, PatientId, QuestionAxis, ResponseEntry, Score,
    SubmittedResponse, WizardQuestion, flatten_axes,
};
use thiserror::Error;

/// Position of the wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WizardCursor {
    /// Questions not loaded yet.
    #[default]
    Loading,
    /// Showing the question at this index.
    Active(usize),
    /// Reviewing every answer before submission.
    Summary {
        /// Question shown when the summary was opened.
        return_to: usize,
    },
    /// The server accepted the submission.
    Submitted,
}

/// Rejected wizard events. The state is unchanged when one is returned.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WizardError {
    /// The question set is not loaded.
    #[error("questions are still loading")]
    NotLoaded,

    /// The question set is empty.
    #[error("no questions available")]
    NoQuestions,

    /// The current question has no score.
    #[error("answer question {question_id} before moving on")]
    Unanswered {
        /// Question identifier.
        question_id: String,
    },

    /// `previous` on the first question.
    #[error("already at the first question")]
    AtFirstQuestion,

    /// Jump target outside the question list.
    #[error("question {index} out of range (0..{len})")]
    OutOfRange {
        /// Requested index.
        index: usize,
        /// Number of questions.
        len: usize,
    },

    /// Unknown question identifier.
    #[error("unknown question: {0}")]
    UnknownQuestion(String),

    /// Some questions have no score.
    #[error("answer all questions to generate the report ({missing} missing)")]
    Incomplete {
        /// Number of unanswered questions.
        missing: usize,
    },

    /// No patient selected.
    #[error("select a patient before starting the assessment")]
    NoPatient,

    /// A submission is already awaiting the server.
    #[error("a submission is already in progress")]
    SubmissionInProgress,

    /// The event does not apply in the current state.
    #[error("{event} is not available while {state}")]
    InvalidTransition {
        /// Event name.
        event: &'static str,
        /// Current state name.
        state: &'static str,
    },
}

/// One question as listed in the summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryItem {
    /// Index in wizard order, for `jump_to`.
    pub index: usize,
    /// Question identifier.
    pub question_id: String,
    /// Question text.
    pub text: String,
    /// "Sim", "Não" or "Não respondido".
    pub score_label: &'static str,
    /// Observation entered for the question.
    pub observation: String,
}

/// Summary entries for one axis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryAxis {
    /// Axis label.
    pub label: String,
    /// Questions of the axis, in wizard order.
    pub items: Vec<SummaryItem>,
}

/// The diagnostic wizard.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticWizard {
    questions: Vec<WizardQuestion>,
    responses: HashMap<String, ResponseEntry>,
    cursor: WizardCursor,
    patient: Option<PatientId>,
    result: Option<DiagnosticResult>,
    error: Option<String>,
    submitting: bool,
}

impl DiagnosticWizard {
    /// Create a wizard waiting for its questions.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- events ---

    /// A question set arrived. Restarts the wizard: every answer is
    /// discarded and the cursor moves to the first question.
    pub fn questions_loaded(&mut self, axes: &[QuestionAxis]) {
        self.questions = flatten_axes(axes);
        self.responses = Self::empty_responses(&self.questions);
        self.cursor = WizardCursor::Active(0);
        self.result = None;
        self.error = None;
        self.submitting = false;
        tracing::debug!(questions = self.questions.len(), "Diagnostic questions loaded");
    }

    /// The question set could not be fetched.
    pub fn questions_failed(&mut self, message: impl Into<String>) {
        self.questions.clear();
        self.responses.clear();
        self.cursor = WizardCursor::Loading;
        self.error = Some(message.into());
    }

    /// Moves to the next question, or to the summary after the last one.
    ///
    /// # Errors
    /// Fails if the current question is unanswered or no question is shown.
    pub fn next(&mut self) -> Result<(), WizardError> {
        let index = self.active_index("next")?;
        let question = self.questions.get(index).ok_or(WizardError::NoQuestions)?;
        if !self.is_answered(&question.id) {
            return Err(WizardError::Unanswered {
                question_id: question.id.clone(),
            });
        }
        self.cursor = if index + 1 < self.questions.len() {
            WizardCursor::Active(index + 1)
        } else {
            WizardCursor::Summary { return_to: index }
        };
        Ok(())
    }

    /// Moves to the previous question; from the summary, to the last one.
    ///
    /// # Errors
    /// Fails on the first question and outside `Active`/`Summary`.
    pub fn previous(&mut self) -> Result<(), WizardError> {
        match self.cursor {
            WizardCursor::Active(0) => Err(WizardError::AtFirstQuestion),
            WizardCursor::Active(index) => {
                self.cursor = WizardCursor::Active(index - 1);
                Ok(())
            }
            WizardCursor::Summary { .. } => {
                let last = self
                    .questions
                    .len()
                    .checked_sub(1)
                    .ok_or(WizardError::NoQuestions)?;
                self.cursor = WizardCursor::Active(last);
                Ok(())
            }
            other => Err(invalid("previous", other)),
        }
    }

    /// Shows any question, answered or not. Leaves the summary; after a
    /// submission the result is kept until the next one.
    ///
    /// # Errors
    /// Fails if `index` is out of range.
    pub fn jump_to(&mut self, index: usize) -> Result<(), WizardError> {
        let len = self.questions.len();
        if index >= len {
            return Err(WizardError::OutOfRange { index, len });
        }
        self.cursor = WizardCursor::Active(index);
        Ok(())
    }

    /// Opens the review summary.
    ///
    /// # Errors
    /// Fails unless every question is answered.
    pub fn show_summary(&mut self) -> Result<(), WizardError> {
        let index = self.active_index("show_summary")?;
        self.ensure_complete()?;
        self.cursor = WizardCursor::Summary { return_to: index };
        Ok(())
    }

    /// Leaves the summary for the question it was opened from.
    ///
    /// # Errors
    /// Fails outside the summary.
    pub fn back_to_questions(&mut self) -> Result<(), WizardError> {
        match self.cursor {
            WizardCursor::Summary { return_to } => {
                self.cursor = WizardCursor::Active(return_to);
                Ok(())
            }
            other => Err(invalid("back_to_questions", other)),
        }
    }

    /// Records an answer. Never moves the cursor.
    ///
    /// # Errors
    /// Fails for unknown questions and while loading or submitted.
    pub fn set_score(&mut self, question_id: &str, score: Score) -> Result<(), WizardError> {
        self.entry_mut("set_score", question_id)?.score = Some(score);
        Ok(())
    }

    /// Records an observation. Never moves the cursor.
    ///
    /// # Errors
    /// Fails for unknown questions and while loading or submitted.
    pub fn set_observation(
        &mut self,
        question_id: &str,
        observation: impl Into<String>,
    ) -> Result<(), WizardError> {
        self.entry_mut("set_observation", question_id)?.observation = observation.into();
        Ok(())
    }

    /// Selects the patient under assessment.
    pub fn select_patient(&mut self, patient: Option<PatientId>) {
        self.patient = patient;
    }

    /// Starts over: first question, no answers, no patient, no result.
    pub fn reset(&mut self) {
        self.responses = Self::empty_responses(&self.questions);
        self.cursor = WizardCursor::Active(0);
        self.patient = None;
        self.result = None;
        self.error = None;
        self.submitting = false;
    }

    /// Validates the wizard and builds the submission payload.
    ///
    /// # Errors
    /// Fails without a patient, with unanswered questions, or while another
    /// submission is pending. The message is also kept in [`Self::error`].
    pub fn begin_submission(&mut self) -> Result<DiagnosticSubmission, WizardError> {
        match self.build_submission() {
            Ok(submission) => {
                self.submitting = true;
                self.error = None;
                Ok(submission)
            }
            Err(err) => {
                self.error = Some(err.to_string());
                Err(err)
            }
        }
    }

    /// The server accepted the submission.
    pub fn submission_succeeded(&mut self, result: DiagnosticResult) {
        tracing::info!(result = result.id, "Diagnostic assessment recorded");
        self.result = Some(result);
        self.cursor = WizardCursor::Submitted;
        self.submitting = false;
        self.error = None;
    }

    /// The server rejected the submission. Nothing else changes.
    pub fn submission_failed(&mut self, message: impl Into<String>) {
        self.submitting = false;
        self.error = Some(message.into());
    }

    /// The submission was dropped before the server answered. Releases the
    /// submission lock and leaves everything else untouched.
    pub fn submission_abandoned(&mut self) {
        self.submitting = false;
    }

    /// Records an error that does not change the wizard, e.g. a failed
    /// report download.
    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    // --- queries ---

    /// Current position.
    #[must_use]
    pub const fn cursor(&self) -> WizardCursor {
        self.cursor
    }

    /// Questions in wizard order.
    #[must_use]
    pub fn questions(&self) -> &[WizardQuestion] {
        &self.questions
    }

    /// Number of questions.
    #[must_use]
    pub fn question_count(&self) -> usize {
        self.questions.len()
    }

    /// The question being shown.
    #[must_use]
    pub fn current_question(&self) -> Option<&WizardQuestion> {
        match self.cursor {
            WizardCursor::Active(index) => self.questions.get(index),
            _ => None,
        }
    }

    /// Answer state for one question.
    #[must_use]
    pub fn response(&self, question_id: &str) -> Option<&ResponseEntry> {
        self.responses.get(question_id)
    }

    /// Number of answered questions.
    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.questions
            .iter()
            .filter(|question| self.is_answered(&question.id))
            .count()
    }

    /// Percentage of answered questions, rounded; 0 without questions.
    #[must_use]
    pub fn progress(&self) -> u8 {
        let total = self.questions.len();
        if total == 0 {
            return 0;
        }
        let percent = (self.answered_count() * 200 + total) / (2 * total);
        u8::try_from(percent).unwrap_or(100)
    }

    /// Returns true when every question has a score.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        !self.questions.is_empty() && self.answered_count() == self.questions.len()
    }

    /// Whether `next` would succeed.
    #[must_use]
    pub fn can_next(&self) -> bool {
        self.current_question()
            .is_some_and(|question| self.is_answered(&question.id))
    }

    /// Whether `previous` would succeed.
    #[must_use]
    pub fn can_previous(&self) -> bool {
        match self.cursor {
            WizardCursor::Active(index) => index > 0,
            WizardCursor::Summary { .. } => !self.questions.is_empty(),
            WizardCursor::Loading | WizardCursor::Submitted => false,
        }
    }

    /// Whether `show_summary` would succeed.
    #[must_use]
    pub fn can_show_summary(&self) -> bool {
        matches!(self.cursor, WizardCursor::Active(_)) && self.is_complete()
    }

    /// Whether `begin_submission` would succeed.
    #[must_use]
    pub fn can_submit(&self) -> bool {
        self.check_submittable().is_ok()
    }

    /// Returns true while a submission awaits the server.
    #[must_use]
    pub const fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Selected patient.
    #[must_use]
    pub const fn patient(&self) -> Option<PatientId> {
        self.patient
    }

    /// Last accepted result.
    #[must_use]
    pub const fn result(&self) -> Option<&DiagnosticResult> {
        self.result.as_ref()
    }

    /// Last error message.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Every question with its answer label, grouped by axis.
    #[must_use]
    pub fn summary(&self) -> Vec<SummaryAxis> {
        let mut axes: Vec<SummaryAxis> = Vec::new();
        for (index, question) in self.questions.iter().enumerate() {
            let entry = self.responses.get(&question.id);
            let item = SummaryItem {
                index,
                question_id: question.id.clone(),
                text: question.text.clone(),
                score_label: Score::label_for(entry.and_then(|entry| entry.score)),
                observation: entry.map(|entry| entry.observation.clone()).unwrap_or_default(),
            };
            match axes.last_mut() {
                Some(axis) if axis.label == question.axis => axis.items.push(item),
                _ => axes.push(SummaryAxis {
                    label: question.axis.clone(),
                    items: vec![item],
                }),
            }
        }
        axes
    }

    // --- internals ---

    fn empty_responses(questions: &[WizardQuestion]) -> HashMap<String, ResponseEntry> {
        questions
            .iter()
            .map(|question| (question.id.clone(), ResponseEntry::default()))
            .collect()
    }

    fn is_answered(&self, question_id: &str) -> bool {
        self.responses
            .get(question_id)
            .is_some_and(ResponseEntry::is_answered)
    }

    fn active_index(&self, event: &'static str) -> Result<usize, WizardError> {
        match self.cursor {
            WizardCursor::Active(index) => Ok(index),
            WizardCursor::Loading => Err(WizardError::NotLoaded),
            other => Err(invalid(event, other)),
        }
    }

    fn entry_mut(
        &mut self,
        event: &'static str,
        question_id: &str,
    ) -> Result<&mut ResponseEntry, WizardError> {
        match self.cursor {
            WizardCursor::Loading => return Err(WizardError::NotLoaded),
            WizardCursor::Submitted => return Err(invalid(event, self.cursor)),
            WizardCursor::Active(_) | WizardCursor::Summary { .. } => {}
        }
        self.responses
            .get_mut(question_id)
            .ok_or_else(|| WizardError::UnknownQuestion(question_id.to_string()))
    }

    fn ensure_complete(&self) -> Result<(), WizardError> {
        if self.questions.is_empty() {
            return Err(WizardError::NoQuestions);
        }
        let missing = self.questions.len() - self.answered_count();
        if missing > 0 {
            return Err(WizardError::Incomplete { missing });
        }
        Ok(())
    }

    fn check_submittable(&self) -> Result<PatientId, WizardError> {
        match self.cursor {
            WizardCursor::Active(_) | WizardCursor::Summary { .. } => {}
            WizardCursor::Loading => return Err(WizardError::NotLoaded),
            WizardCursor::Submitted => return Err(invalid("submit", self.cursor)),
        }
        if self.submitting {
            return Err(WizardError::SubmissionInProgress);
        }
        let patient = self.patient.ok_or(WizardError::NoPatient)?;
        self.ensure_complete()?;
        Ok(patient)
    }

    fn build_submission(&self) -> Result<DiagnosticSubmission, WizardError> {
        let patient = self.check_submittable()?;
        let responses = self
            .questions
            .iter()
            .map(|question| {
                let entry = self
                    .responses
                    .get(&question.id)
                    .ok_or_else(|| WizardError::UnknownQuestion(question.id.clone()))?;
                let score = entry.score.ok_or(WizardError::Incomplete { missing: 1 })?;
                Ok(SubmittedResponse {
                    question_id: question.id.clone(),
                    score,
                    observation: entry.observation.clone(),
                })
            })
            .collect::<Result<Vec<_>, WizardError>>()?;
        Ok(DiagnosticSubmission { patient, responses })
    }
}

const fn state_name(cursor: WizardCursor) -> &'static str {
    match cursor {
        WizardCursor::Loading => "loading",
        WizardCursor::Active(_) => "answering",
        WizardCursor::Summary { .. } => "reviewing",
        WizardCursor::Submitted => "submitted",
    }
}

const fn invalid(event: &'static str, cursor: WizardCursor) -> WizardError {
    WizardError::InvalidTransition {
        event,
        state: state_name(cursor),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn axes(count: usize) -> Vec<QuestionAxis> {
        let first: Vec<_> = (0..count / 2)
            .map(|i| json!({"id": format!("q{i}"), "text": format!("Question {i}")}))
            .collect();
        let second: Vec<_> = (count / 2..count)
            .map(|i| json!({"id": format!("q{i}"), "text": format!("Question {i}")}))
            .collect();
        serde_json::from_value(json!([
            {"id": "social", "label": "Social", "questions": first},
            {"id": "motor", "label": "Motor", "questions": second}
        ]))
        .unwrap()
    }

    fn loaded(count: usize) -> DiagnosticWizard {
        let mut wizard = DiagnosticWizard::new();
        wizard.questions_loaded(&axes(count));
        wizard
    }

    fn answer_all(wizard: &mut DiagnosticWizard, score: Score) {
        let ids: Vec<String> = wizard.questions().iter().map(|q| q.id.clone()).collect();
        for id in ids {
            wizard.set_score(&id, score).unwrap();
        }
    }

    #[test]
    fn test_starts_loading() {
        let mut wizard = DiagnosticWizard::new();
        assert_eq!(wizard.cursor(), WizardCursor::Loading);
        assert_eq!(wizard.progress(), 0);
        assert_eq!(wizard.next(), Err(WizardError::NotLoaded));
        assert_eq!(wizard.set_score("q0", Score::Yes), Err(WizardError::NotLoaded));
    }

    #[test]
    fn test_next_requires_answer() {
        let mut wizard = loaded(3);
        assert_eq!(
            wizard.next(),
            Err(WizardError::Unanswered {
                question_id: "q0".to_string()
            })
        );
        assert!(!wizard.can_next());

        wizard.set_score("q0", Score::No).unwrap();
        assert_eq!(wizard.cursor(), WizardCursor::Active(0));
        assert!(wizard.can_next());
        wizard.next().unwrap();
        assert_eq!(wizard.cursor(), WizardCursor::Active(1));
    }

    #[test]
    fn test_next_from_last_question_opens_summary() {
        let mut wizard = loaded(2);
        wizard.set_score("q0", Score::Yes).unwrap();
        wizard.next().unwrap();
        wizard.set_score("q1", Score::Yes).unwrap();
        wizard.next().unwrap();
        assert_eq!(wizard.cursor(), WizardCursor::Summary { return_to: 1 });
    }

    #[test]
    fn test_previous() {
        let mut wizard = loaded(4);
        assert_eq!(wizard.previous(), Err(WizardError::AtFirstQuestion));
        assert!(!wizard.can_previous());

        wizard.jump_to(2).unwrap();
        wizard.previous().unwrap();
        assert_eq!(wizard.cursor(), WizardCursor::Active(1));

        answer_all(&mut wizard, Score::No);
        wizard.show_summary().unwrap();
        wizard.previous().unwrap();
        assert_eq!(wizard.cursor(), WizardCursor::Active(3));
    }

    #[test]
    fn test_jump_to_leaves_summary_and_keeps_answers() {
        let mut wizard = loaded(6);
        answer_all(&mut wizard, Score::Yes);
        wizard.set_observation("q4", "needs follow-up").unwrap();
        wizard.show_summary().unwrap();

        for target in 0..6 {
            wizard.show_summary().ok();
            wizard.jump_to(target).unwrap();
            assert_eq!(wizard.cursor(), WizardCursor::Active(target));
        }
        assert_eq!(wizard.answered_count(), 6);
        assert_eq!(wizard.response("q4").unwrap().observation, "needs follow-up");

        assert_eq!(
            wizard.jump_to(6),
            Err(WizardError::OutOfRange { index: 6, len: 6 })
        );
    }

    #[test]
    fn test_show_summary_requires_all_answers() {
        let mut wizard = loaded(3);
        wizard.set_score("q0", Score::Yes).unwrap();
        assert!(!wizard.can_show_summary());
        assert_eq!(
            wizard.show_summary(),
            Err(WizardError::Incomplete { missing: 2 })
        );
        assert_eq!(wizard.cursor(), WizardCursor::Active(0));
    }

    #[test]
    fn test_back_to_questions_returns_to_origin() {
        let mut wizard = loaded(4);
        answer_all(&mut wizard, Score::Yes);
        wizard.jump_to(2).unwrap();
        wizard.show_summary().unwrap();
        wizard.back_to_questions().unwrap();
        assert_eq!(wizard.cursor(), WizardCursor::Active(2));
        assert!(wizard.back_to_questions().is_err());
    }

    #[test]
    fn test_progress_is_rounded_and_monotonic() {
        let mut wizard = loaded(3);
        let mut last = wizard.progress();
        assert_eq!(last, 0);
        let expected = [33, 67, 100];
        for (i, want) in expected.into_iter().enumerate() {
            wizard.set_score(&format!("q{i}"), Score::No).unwrap();
            let now = wizard.progress();
            assert_eq!(now, want);
            assert!(now >= last);
            last = now;
        }
        // Re-answering never lowers progress.
        wizard.set_score("q0", Score::Yes).unwrap();
        assert_eq!(wizard.progress(), 100);

        wizard.reset();
        assert_eq!(wizard.progress(), 0);
    }

    #[test]
    fn test_empty_question_set() {
        let mut wizard = DiagnosticWizard::new();
        wizard.questions_loaded(&[]);
        assert_eq!(wizard.cursor(), WizardCursor::Active(0));
        assert!(wizard.current_question().is_none());
        assert_eq!(wizard.progress(), 0);
        assert!(!wizard.can_show_summary());
        assert!(!wizard.can_submit());
        assert_eq!(wizard.next(), Err(WizardError::NoQuestions));
    }

    #[test]
    fn test_reload_discards_answers() {
        let mut wizard = loaded(4);
        answer_all(&mut wizard, Score::Yes);
        wizard.jump_to(3).unwrap();

        wizard.questions_loaded(&axes(4));
        assert_eq!(wizard.cursor(), WizardCursor::Active(0));
        assert_eq!(wizard.answered_count(), 0);
        assert!(wizard.questions().iter().all(|q| wizard.response(&q.id) == Some(&ResponseEntry::default())));
    }

    #[test]
    fn test_unknown_question() {
        let mut wizard = loaded(2);
        assert_eq!(
            wizard.set_score("nope", Score::Yes),
            Err(WizardError::UnknownQuestion("nope".to_string()))
        );
    }

    #[test]
    fn test_submission_gating() {
        let mut wizard = loaded(2);
        wizard.set_score("q0", Score::Yes).unwrap();
        wizard.select_patient(Some(12));
        assert!(!wizard.can_submit());
        assert_eq!(
            wizard.begin_submission(),
            Err(WizardError::Incomplete { missing: 1 })
        );
        assert!(wizard.error().is_some());

        wizard.set_score("q1", Score::No).unwrap();
        wizard.select_patient(None);
        assert_eq!(wizard.begin_submission(), Err(WizardError::NoPatient));

        wizard.select_patient(Some(12));
        assert!(wizard.can_submit());
        let submission = wizard.begin_submission().unwrap();
        assert_eq!(submission.patient, 12);
        assert_eq!(submission.responses.len(), 2);
        assert_eq!(submission.responses[1].score, Score::No);
        assert!(wizard.error().is_none());

        assert_eq!(
            wizard.begin_submission(),
            Err(WizardError::SubmissionInProgress)
        );
    }

    #[test]
    fn test_submission_failure_keeps_state() {
        let mut wizard = loaded(2);
        answer_all(&mut wizard, Score::Yes);
        wizard.select_patient(Some(1));
        wizard.show_summary().unwrap();
        wizard.begin_submission().unwrap();

        wizard.submission_failed("Could not save the assessment.");
        assert_eq!(wizard.cursor(), WizardCursor::Summary { return_to: 0 });
        assert_eq!(wizard.answered_count(), 2);
        assert_eq!(wizard.error(), Some("Could not save the assessment."));
        assert!(wizard.can_submit());
    }

    #[test]
    fn test_abandoned_submission_can_be_retried() {
        let mut wizard = loaded(2);
        answer_all(&mut wizard, Score::Yes);
        wizard.select_patient(Some(1));
        wizard.begin_submission().unwrap();
        assert!(matches!(
            wizard.begin_submission(),
            Err(WizardError::SubmissionInProgress)
        ));

        wizard.submission_abandoned();
        assert!(!wizard.is_submitting());
        assert!(wizard.can_submit());
        assert!(wizard.begin_submission().is_ok());
    }

    #[test]
    fn test_submission_success_and_resubmission() {
        let mut wizard = loaded(2);
        answer_all(&mut wizard, Score::Yes);
        wizard.select_patient(Some(1));
        wizard.begin_submission().unwrap();

        let result: DiagnosticResult = serde_json::from_value(json!({"id": 5})).unwrap();
        wizard.submission_succeeded(result);
        assert_eq!(wizard.cursor(), WizardCursor::Submitted);
        assert_eq!(wizard.result().unwrap().id, 5);
        assert!(wizard.set_score("q0", Score::No).is_err());
        assert!(!wizard.can_submit());

        wizard.jump_to(0).unwrap();
        wizard.set_score("q0", Score::No).unwrap();
        assert_eq!(wizard.result().unwrap().id, 5);
        assert!(wizard.can_submit());
    }

    #[test]
    fn test_reset() {
        let mut wizard = loaded(3);
        answer_all(&mut wizard, Score::Yes);
        wizard.select_patient(Some(4));
        wizard.show_summary().unwrap();

        wizard.reset();
        assert_eq!(wizard.cursor(), WizardCursor::Active(0));
        assert_eq!(wizard.answered_count(), 0);
        assert_eq!(wizard.patient(), None);
        assert!(wizard.result().is_none());
    }

    #[test]
    fn test_twenty_questions_review_scenario() {
        let mut wizard = loaded(20);
        answer_all(&mut wizard, Score::Yes);

        assert!(wizard.can_show_summary());
        wizard.show_summary().unwrap();

        let summary = wizard.summary();
        let items: Vec<&SummaryItem> = summary.iter().flat_map(|axis| &axis.items).collect();
        assert_eq!(items.len(), 20);
        assert!(items.iter().all(|item| item.score_label == "Sim"));
        assert_eq!(summary[0].label, "Social");
        assert_eq!(summary[1].label, "Motor");

        // "Revisar" on item 13.
        wizard.jump_to(items[13].index).unwrap();
        assert_eq!(wizard.cursor(), WizardCursor::Active(13));
        let current = wizard.current_question().unwrap().id.clone();
        assert_eq!(wizard.response(&current).unwrap().score, Some(Score::Yes));
    }

    #[test]
    fn test_summary_labels_unanswered() {
        let wizard = loaded(2);
        let summary = wizard.summary();
        assert_eq!(summary[0].items[0].score_label, "Não respondido");
    }

    #[test]
    fn test_questions_failed() {
        let mut wizard = DiagnosticWizard::new();
        wizard.questions_failed("Could not load the questions.");
        assert_eq!(wizard.cursor(), WizardCursor::Loading);
        assert_eq!(wizard.error(), Some("Could not load the questions."));

        wizard.questions_loaded(&axes(2));
        assert!(wizard.error().is_none());
    }
}
