//! Drives a [`DiagnosticWizard`] against the clinical API.

use teacare_domain::{Patient, PatientId};

use crate::api::ClinicalApi;
use crate::error::{ApplicationError, ApplicationResult};

use super::wizard::DiagnosticWizard;

/// A downloaded diagnostic report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfReport {
    /// Suggested file name.
    pub file_name: String,
    /// PDF bytes.
    pub bytes: Vec<u8>,
}

impl PdfReport {
    /// Builds the suggested file name from the patient's name.
    ///
    /// Only letters, digits, `-` and `_` survive; any other run of
    /// characters becomes a single `-`, so the name never leaves the
    /// target directory.
    #[must_use]
    pub fn file_name_for(patient_name: Option<&str>) -> String {
        let slug = patient_name
            .map(|name| {
                name.split(|c: char| !(c.is_alphanumeric() || c == '-' || c == '_'))
                    .filter(|part| !part.is_empty())
                    .collect::<Vec<_>>()
                    .join("-")
            })
            .filter(|slug| !slug.is_empty())
            .unwrap_or_else(|| "paciente".to_string());
        format!("laudo-diagnostico-{slug}.pdf")
    }
}

/// Releases the wizard's submission lock if `submit` is dropped mid-flight.
struct PendingSubmission<'a> {
    wizard: &'a mut DiagnosticWizard,
}

impl Drop for PendingSubmission<'_> {
    fn drop(&mut self) {
        if self.wizard.is_submitting() {
            tracing::warn!("Diagnostic submission abandoned before the server answered");
            self.wizard.submission_abandoned();
        }
    }
}

/// One diagnostic session: patient list, wizard and result.
#[derive(Debug)]
pub struct DiagnosticFlow {
    api: ClinicalApi,
    wizard: DiagnosticWizard,
    patients: Vec<Patient>,
}

impl DiagnosticFlow {
    /// Create a flow with an unloaded wizard.
    #[must_use]
    pub fn new(api: ClinicalApi) -> Self {
        Self {
            api,
            wizard: DiagnosticWizard::new(),
            patients: Vec::new(),
        }
    }

    /// The wizard.
    #[must_use]
    pub const fn wizard(&self) -> &DiagnosticWizard {
        &self.wizard
    }

    /// The wizard, for answering questions.
    pub const fn wizard_mut(&mut self) -> &mut DiagnosticWizard {
        &mut self.wizard
    }

    /// Patients available for selection.
    #[must_use]
    pub fn patients(&self) -> &[Patient] {
        &self.patients
    }

    /// Loads patients and questions concurrently.
    ///
    /// The first patient is preselected when none is. A failed patient list
    /// leaves the selection empty; a failed question set leaves the wizard
    /// loading with its error set.
    pub async fn load(&mut self) {
        let (patients, questions) = tokio::join!(
            self.api.list_patients(),
            self.api.diagnostic_questions()
        );

        match patients {
            Ok(patients) => self.patients = patients,
            Err(err) => tracing::warn!(error = %err, "Failed to load patients"),
        }
        if self.wizard.patient().is_none() {
            self.wizard
                .select_patient(self.patients.first().map(|patient| patient.id));
        }

        match questions {
            Ok(axes) => self.wizard.questions_loaded(&axes),
            Err(err) => {
                tracing::warn!(error = %err, "Failed to load diagnostic questions");
                self.wizard.questions_failed(err.user_message());
            }
        }
    }

    /// Selects a patient by identifier.
    ///
    /// # Errors
    /// Returns [`ApplicationError::NotFound`] for a patient not in the list.
    pub fn select_patient(&mut self, id: PatientId) -> ApplicationResult<()> {
        if !self.patients.iter().any(|patient| patient.id == id) {
            return Err(ApplicationError::NotFound(format!("patient {id}")));
        }
        self.wizard.select_patient(Some(id));
        Ok(())
    }

    /// Submits the questionnaire.
    ///
    /// # Errors
    /// Returns the wizard's rejection without contacting the server, or the
    /// API error after recording its message on the wizard. Dropping the
    /// future before the server answers leaves the wizard ready to resubmit.
    pub async fn submit(&mut self) -> ApplicationResult<()> {
        let submission = self.wizard.begin_submission()?;
        tracing::info!(
            patient = submission.patient,
            responses = submission.responses.len(),
            "Submitting diagnostic assessment"
        );
        let pending = PendingSubmission {
            wizard: &mut self.wizard,
        };
        match self.api.submit_diagnostic(&submission).await {
            Ok(result) => {
                pending.wizard.submission_succeeded(result);
                Ok(())
            }
            Err(err) => {
                tracing::warn!(error = %err, "Diagnostic submission failed");
                pending.wizard.submission_failed(err.user_message());
                Err(err.into())
            }
        }
    }

    /// Downloads the PDF report of the last result.
    ///
    /// # Errors
    /// Returns [`ApplicationError::NoResult`] before a successful submission.
    pub async fn download_report(&mut self) -> ApplicationResult<PdfReport> {
        let result = self.wizard.result().ok_or(ApplicationError::NoResult)?;
        let id = result.id;
        let file_name = PdfReport::file_name_for(result.patient_name());

        match self.api.diagnostic_pdf(id).await {
            Ok(bytes) => {
                tracing::debug!(result = id, size = bytes.len(), "Report downloaded");
                Ok(PdfReport { file_name, bytes })
            }
            Err(err) => {
                self.wizard.set_error(err.user_message());
                Err(err.into())
            }
        }
    }
}
