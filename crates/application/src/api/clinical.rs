//! Typed clinical endpoints.

use serde_json::json;
use teacare_domain::{
    ApiRequest, Credentials, DashboardMetrics, DiagnosticResult, DiagnosticSubmission, ListPayload,
    NewPatient, Patient, PatientDetail, PatientId, PatientRecord, Profile, ProfileUpdate,
    QuestionAxis, Registration, TokenPair,
};

use super::client::ApiClient;
use super::error::ApiError;

/// Media type requested for report downloads.
pub const PDF_MEDIA_TYPE: &str = "application/pdf";

/// Endpoint paths.
pub mod paths {
    /// `POST` credentials, receive a token pair.
    pub const LOGIN: &str = "/auth/login/";
    /// `POST` a registration form.
    pub const REGISTER: &str = "/auth/register/";
    /// `GET`/`PUT` the authenticated profile.
    pub const ME: &str = "/auth/me/";
    /// Patient collection.
    pub const PATIENTS: &str = "/patients/";
    /// Diagnostic question set.
    pub const DIAGNOSTIC_QUESTIONS: &str = "/assessment/diagnostic/questions/";
    /// Diagnostic submissions.
    pub const DIAGNOSTIC: &str = "/assessment/diagnostic/";
    /// Practice indicators.
    pub const DASHBOARD: &str = "/dashboard/";

    /// A single patient.
    #[must_use]
    pub fn patient(id: super::PatientId) -> String {
        format!("{PATIENTS}{id}/")
    }

    /// PDF report of a diagnostic result.
    #[must_use]
    pub fn diagnostic_pdf(id: u64) -> String {
        format!("{DIAGNOSTIC}{id}/pdf/")
    }
}

/// Typed facade over [`ApiClient`].
#[derive(Debug, Clone)]
pub struct ClinicalApi {
    client: ApiClient,
}

impl ClinicalApi {
    /// Wraps a client.
    #[must_use]
    pub const fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// The underlying client.
    #[must_use]
    pub const fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Exchanges credentials for a token pair. Does not store the tokens.
    ///
    /// # Errors
    /// Bad credentials surface as [`ApiError::Unauthorized`] without touching
    /// stored tokens.
    pub async fn login(&self, credentials: &Credentials) -> Result<TokenPair, ApiError> {
        let request = ApiRequest::post(paths::LOGIN)
            .json(json!({ "email": credentials.email, "password": credentials.password }))
            .without_refresh();
        self.client.send_json(request).await
    }

    /// Creates an account.
    ///
    /// # Errors
    /// Field-level rejections surface as [`ApiError::Validation`].
    pub async fn register(&self, registration: &Registration) -> Result<Profile, ApiError> {
        let body = serde_json::to_value(registration).map_err(|err| ApiError::Encode(err.to_string()))?;
        let request = ApiRequest::post(paths::REGISTER)
            .json(body)
            .without_refresh();
        self.client.send_json(request).await
    }

    /// Fetches the authenticated profile.
    ///
    /// # Errors
    /// See [`ApiClient::execute`].
    pub async fn me(&self) -> Result<Profile, ApiError> {
        self.client.get_json(paths::ME).await
    }

    /// Updates the authenticated profile.
    ///
    /// # Errors
    /// See [`ApiClient::execute`].
    pub async fn update_me(&self, update: &ProfileUpdate) -> Result<Profile, ApiError> {
        self.client.put_json(paths::ME, update).await
    }

    /// Lists the professional's patients.
    ///
    /// # Errors
    /// See [`ApiClient::execute`].
    pub async fn list_patients(&self) -> Result<Vec<Patient>, ApiError> {
        self.list(paths::PATIENTS).await
    }

    /// Registers a patient, uploading the school history document if any.
    ///
    /// # Errors
    /// See [`ApiClient::execute`].
    pub async fn create_patient(&self, patient: &NewPatient) -> Result<Patient, ApiError> {
        self.client
            .post_multipart(paths::PATIENTS, patient.to_multipart())
            .await
    }

    /// Fetches a patient with all nested records.
    ///
    /// # Errors
    /// See [`ApiClient::execute`].
    pub async fn patient(&self, id: PatientId) -> Result<PatientDetail, ApiError> {
        self.client.get_json(&paths::patient(id)).await
    }

    /// Activates or deactivates a patient.
    ///
    /// # Errors
    /// See [`ApiClient::execute`].
    pub async fn set_patient_active(&self, id: PatientId, active: bool) -> Result<Patient, ApiError> {
        self.client
            .patch_json(&paths::patient(id), &json!({ "active": active }))
            .await
    }

    /// Lists the records of one kind for a patient.
    ///
    /// # Errors
    /// See [`ApiClient::execute`].
    pub async fn list_records<R: PatientRecord>(&self, patient: PatientId) -> Result<Vec<R>, ApiError> {
        self.list(&R::collection_path(patient)).await
    }

    /// Creates a record for a patient.
    ///
    /// # Errors
    /// See [`ApiClient::execute`].
    pub async fn create_record<R: PatientRecord>(
        &self,
        patient: PatientId,
        draft: &R::Draft,
    ) -> Result<R, ApiError> {
        self.client
            .post_json(&R::collection_path(patient), draft)
            .await
    }

    /// Fetches the diagnostic question set, grouped by axis.
    ///
    /// # Errors
    /// See [`ApiClient::execute`].
    pub async fn diagnostic_questions(&self) -> Result<Vec<QuestionAxis>, ApiError> {
        self.list(paths::DIAGNOSTIC_QUESTIONS).await
    }

    /// Submits a complete diagnostic questionnaire.
    ///
    /// # Errors
    /// See [`ApiClient::execute`].
    pub async fn submit_diagnostic(
        &self,
        submission: &DiagnosticSubmission,
    ) -> Result<DiagnosticResult, ApiError> {
        self.client.post_json(paths::DIAGNOSTIC, submission).await
    }

    /// Downloads the PDF report of a diagnostic result.
    ///
    /// # Errors
    /// See [`ApiClient::execute`].
    pub async fn diagnostic_pdf(&self, id: u64) -> Result<Vec<u8>, ApiError> {
        self.client
            .get_bytes(&paths::diagnostic_pdf(id), PDF_MEDIA_TYPE)
            .await
    }

    /// Fetches the practice indicators.
    ///
    /// # Errors
    /// See [`ApiClient::execute`].
    pub async fn dashboard(&self) -> Result<DashboardMetrics, ApiError> {
        self.client.get_json(paths::DASHBOARD).await
    }

    async fn list<T>(&self, path: &str) -> Result<Vec<T>, ApiError>
    where
        T: serde::de::DeserializeOwned,
    {
        let payload: ListPayload<T> = self.client.get_json(path).await?;
        Ok(payload.into_vec())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::auth::MemoryTokenStore;
    use crate::ports::TokenStore;
    use crate::testing::{FakeTransport, Reply};
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use teacare_domain::{
        HttpMethod, NewReport, Report, ReportType, RequestBody, Score, SubmittedResponse, TokenKind,
    };

    fn api(transport: &Arc<FakeTransport>) -> (ClinicalApi, MemoryTokenStore) {
        let tokens = MemoryTokenStore::with_tokens("access", "refresh");
        let client = ApiClient::new(transport.clone(), Arc::new(tokens.clone()));
        (ClinicalApi::new(client), tokens)
    }

    #[tokio::test]
    async fn test_list_patients_accepts_both_shapes() {
        let bare = Arc::new(FakeTransport::new(|_| {
            Reply::json(200, json!([{"id": 1, "full_name": "Ana"}]))
        }));
        let paged = Arc::new(FakeTransport::new(|_| {
            Reply::json(
                200,
                json!({"count": 1, "next": null, "results": [{"id": 1, "full_name": "Ana"}]}),
            )
        }));

        let from_bare = api(&bare).0.list_patients().await.unwrap();
        let from_paged = api(&paged).0.list_patients().await.unwrap();
        assert_eq!(from_bare, from_paged);
        assert_eq!(from_bare[0].full_name, "Ana");
    }

    #[tokio::test]
    async fn test_login_bypasses_refresh_and_keeps_tokens() {
        let transport = Arc::new(FakeTransport::new(|_| {
            Reply::json(401, json!({"detail": "No active account found with the given credentials"}))
        }));
        let (api, tokens) = api(&transport);

        let err = api
            .login(&Credentials::new("a@b.c", "wrong"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(_)));
        assert_eq!(transport.requests().len(), 1);
        assert_eq!(tokens.get(TokenKind::Refresh).as_deref(), Some("refresh"));
    }

    #[tokio::test]
    async fn test_create_patient_is_multipart() {
        let transport = Arc::new(FakeTransport::new(|_| {
            Reply::json(201, json!({"id": 5, "full_name": "Lia"}))
        }));
        let (api, _) = api(&transport);

        let intake = NewPatient {
            full_name: "Lia".to_string(),
            ..NewPatient::default()
        };
        let created = api.create_patient(&intake).await.unwrap();
        assert_eq!(created.id, 5);

        let sent = &transport.requests()[0];
        assert_eq!(sent.method, HttpMethod::Post);
        assert_eq!(sent.path, "/patients/");
        match &sent.body {
            RequestBody::Multipart(form) => assert_eq!(form.field("full_name"), Some("Lia")),
            other => panic!("expected multipart, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_toggle_patient_patches_active_flag() {
        let transport = Arc::new(FakeTransport::new(|_| {
            Reply::json(200, json!({"id": 5, "full_name": "Lia", "active": false}))
        }));
        let (api, _) = api(&transport);

        let patient = api.set_patient_active(5, false).await.unwrap();
        assert!(!patient.active);
        let sent = &transport.requests()[0];
        assert_eq!(sent.method, HttpMethod::Patch);
        assert_eq!(sent.path, "/patients/5/");
        assert_eq!(sent.body, RequestBody::Json(json!({"active": false})));
    }

    #[tokio::test]
    async fn test_nested_records() {
        let transport = Arc::new(FakeTransport::new(|request| match request.method {
            HttpMethod::Post => Reply::json(
                201,
                json!({"id": 9, "report_type": "weekly", "summary": "Week 1", "content": "..."}),
            ),
            _ => Reply::json(200, json!({"results": []})),
        }));
        let (api, _) = api(&transport);

        let reports: Vec<Report> = api.list_records(3).await.unwrap();
        assert!(reports.is_empty());

        let draft = NewReport {
            report_type: ReportType::Weekly,
            summary: "Week 1".to_string(),
            content: "...".to_string(),
        };
        let report = api.create_record::<Report>(3, &draft).await.unwrap();
        assert_eq!(report.id, 9);
        let paths: Vec<String> = transport.requests().into_iter().map(|r| r.path).collect();
        assert_eq!(paths, vec!["/patients/3/reports/", "/patients/3/reports/"]);
    }

    #[tokio::test]
    async fn test_diagnostic_round() {
        let transport = Arc::new(FakeTransport::new(|request| {
            match (request.method, request.path.as_str()) {
                (HttpMethod::Get, paths::DIAGNOSTIC_QUESTIONS) => Reply::json(
                    200,
                    json!([{"id": "mchat", "label": "M-CHAT", "questions": [{"id": "q1", "text": "?"}]}]),
                ),
                (HttpMethod::Post, paths::DIAGNOSTIC) => Reply::json(
                    201,
                    json!({"id": 31, "total_failed": 0, "positive_screen": false}),
                ),
                _ => Reply::bytes(200, b"%PDF-1.4"),
            }
        }));
        let (api, _) = api(&transport);

        let axes = api.diagnostic_questions().await.unwrap();
        assert_eq!(axes[0].questions.len(), 1);

        let result = api
            .submit_diagnostic(&DiagnosticSubmission {
                patient: 1,
                responses: vec![SubmittedResponse {
                    question_id: "q1".to_string(),
                    score: Score::No,
                    observation: String::new(),
                }],
            })
            .await
            .unwrap();
        assert_eq!(result.id, 31);

        let pdf = api.diagnostic_pdf(31).await.unwrap();
        assert!(pdf.starts_with(b"%PDF"));
        let last = transport.requests().pop().unwrap();
        assert_eq!(last.path, "/assessment/diagnostic/31/pdf/");
        assert_eq!(last.accept, PDF_MEDIA_TYPE);
    }
}
