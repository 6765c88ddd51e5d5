//! End-to-end tests of the clinical API over the reqwest transport.
//!
//! Every test runs against a local mock server, so the full path is
//! exercised: request decoration, HTTP encoding, the 401 refresh protocol and
//! response classification.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use serde_json::json;
use teacare_application::api::{ApiClient, ApiError, ClinicalApi, REFRESH_PATH, paths};
use teacare_application::auth::{AuthSession, MemoryTokenStore, SessionState};
use teacare_application::ports::TokenStore;
use teacare_domain::{Credentials, FilePart, NewPatient, Sex, TokenKind};
use teacare_infrastructure::{ClientConfig, FileTokenStore, ReqwestTransport};
use wiremock::matchers::{body_json, header, header_exists, method, path};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

fn config(server: &MockServer) -> ClientConfig {
    ClientConfig {
        base_url: format!("{}/api", server.uri()),
        timeout_secs: 5,
        ..ClientConfig::default()
    }
}

fn api(server: &MockServer, tokens: &MemoryTokenStore) -> ClinicalApi {
    let transport = ReqwestTransport::new(&config(server)).unwrap();
    ClinicalApi::new(ApiClient::new(Arc::new(transport), Arc::new(tokens.clone())))
}

fn profile() -> serde_json::Value {
    json!({
        "id": 1,
        "email": "ana@clinic.test",
        "full_name": "Ana Souza",
        "crp": "06/12345",
        "profession": "psychologist",
        "institution": "Clinic"
    })
}

fn api_path(endpoint: &str) -> String {
    format!("/api{endpoint}")
}

#[tokio::test]
async fn test_login_then_profile() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(api_path(paths::LOGIN)))
        .and(body_json(json!({"email": "ana@clinic.test", "password": "secret-pass"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access": "a1", "refresh": "r1"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(api_path(paths::ME)))
        .and(header("authorization", "Bearer a1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(profile()))
        .expect(1)
        .mount(&server)
        .await;

    let tokens = MemoryTokenStore::new();
    let session = AuthSession::new(api(&server, &tokens));
    assert_eq!(session.bootstrap().await, SessionState::Unauthenticated);

    let profile = session
        .login(&Credentials::new("ana@clinic.test", "secret-pass"))
        .await
        .unwrap();
    assert_eq!(profile.full_name, "Ana Souza");
    assert_eq!(tokens.get(TokenKind::Refresh).as_deref(), Some("r1"));
}

#[tokio::test]
async fn test_expired_access_token_is_refreshed_once() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(api_path(paths::ME)))
        .and(header("authorization", "Bearer stale"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "Token expired"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(api_path(paths::ME)))
        .and(header("authorization", "Bearer fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(profile()))
        .expect(5)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(api_path(REFRESH_PATH)))
        .and(body_json(json!({"refresh": "r1"})))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"access": "fresh"}))
                .set_delay(Duration::from_millis(300)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let tokens = MemoryTokenStore::with_tokens("stale", "r1");
    let api = api(&server, &tokens);

    let calls = (0..5).map(|_| {
        let api = api.clone();
        tokio::spawn(async move { api.me().await })
    });
    for handle in calls.collect::<Vec<_>>() {
        assert_eq!(handle.await.unwrap().unwrap().email, "ana@clinic.test");
    }

    assert_eq!(tokens.get(TokenKind::Access).as_deref(), Some("fresh"));
    assert_eq!(tokens.get(TokenKind::Refresh).as_deref(), Some("r1"));

    let refresh_requests: Vec<Request> = server
        .received_requests()
        .await
        .unwrap()
        .into_iter()
        .filter(|request| request.url.path() == api_path(REFRESH_PATH))
        .collect();
    assert!(!refresh_requests[0].headers.contains_key("authorization"));
}

#[tokio::test]
async fn test_rejected_refresh_signs_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(api_path(paths::PATIENTS)))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(api_path(REFRESH_PATH)))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "Token is blacklisted"})))
        .expect(1)
        .mount(&server)
        .await;

    let tokens = MemoryTokenStore::with_tokens("stale", "revoked");
    let err = api(&server, &tokens).list_patients().await.unwrap_err();

    assert!(matches!(err, ApiError::RefreshFailed(_)));
    assert!(err.is_auth_failure());
    assert_eq!(tokens.count(), 0);
}

#[tokio::test]
async fn test_bad_credentials_keep_existing_tokens() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(api_path(paths::LOGIN)))
        .respond_with(ResponseTemplate::new(401).set_body_json(
            json!({"detail": "No active account found with the given credentials"}),
        ))
        .mount(&server)
        .await;

    let tokens = MemoryTokenStore::with_tokens("a", "r");
    let err = api(&server, &tokens)
        .login(&Credentials::new("ana@clinic.test", "wrong"))
        .await
        .unwrap_err();

    assert_eq!(
        err.user_message(),
        "No active account found with the given credentials"
    );
    assert_eq!(tokens.count(), 2);
    let received = server.received_requests().await.unwrap();
    assert!(received.iter().all(|request| request.url.path() != api_path(REFRESH_PATH)));
}

#[tokio::test]
async fn test_validation_errors_are_parsed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(api_path(paths::PATIENTS)))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "full_name": ["This field may not be blank."],
            "birth_date": ["Date has wrong format."]
        })))
        .mount(&server)
        .await;

    let tokens = MemoryTokenStore::with_tokens("a", "r");
    let patient = NewPatient::default();
    let err = api(&server, &tokens).create_patient(&patient).await.unwrap_err();

    let errors = err.validation_errors().unwrap();
    assert_eq!(errors.field("birth_date"), Some("Date has wrong format."));
    assert!(errors.global().is_some());
}

#[tokio::test]
async fn test_create_patient_sends_multipart() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(api_path(paths::PATIENTS)))
        .and(header_exists("content-type"))
        .respond_with(|request: &Request| {
            let content_type = request
                .headers
                .get("content-type")
                .and_then(|value| value.to_str().ok())
                .unwrap_or_default()
                .to_string();
            let body = String::from_utf8_lossy(&request.body).to_string();
            if content_type.starts_with("multipart/form-data")
                && body.contains("name=\"full_name\"")
                && body.contains("Lucas Lima")
                && body.contains("filename=\"history.pdf\"")
                && body.contains("application/pdf")
            {
                ResponseTemplate::new(201).set_body_json(json!({
                    "id": 12,
                    "full_name": "Lucas Lima",
                    "birth_date": "2019-04-02",
                    "sex": "M",
                    "active": true
                }))
            } else {
                ResponseTemplate::new(400).set_body_json(json!({"detail": "bad form"}))
            }
        })
        .mount(&server)
        .await;

    let mut patient = NewPatient::new(
        "Lucas Lima",
        NaiveDate::from_ymd_opt(2019, 4, 2).unwrap(),
        Sex::Male,
    );
    patient.school_history_file = Some(FilePart::new("upload", "history.pdf", b"%PDF-1.7".to_vec()));

    let tokens = MemoryTokenStore::with_tokens("a", "r");
    let created = api(&server, &tokens).create_patient(&patient).await.unwrap();
    assert_eq!(created.id, 12);
    assert!(created.active);
}

#[tokio::test]
async fn test_list_payload_shapes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(api_path(paths::PATIENTS)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 2,
            "results": [
                {"id": 1, "full_name": "Bia Costa"},
                {"id": 2, "full_name": "Lucas Lima"}
            ]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(api_path(paths::DIAGNOSTIC_QUESTIONS)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": [
            {"id": "social", "label": "Social", "questions": [{"id": "q1", "text": "?"}]}
        ]})))
        .mount(&server)
        .await;

    let tokens = MemoryTokenStore::with_tokens("a", "r");
    let api = api(&server, &tokens);
    let patients = api.list_patients().await.unwrap();
    assert_eq!(patients.len(), 2);
    assert_eq!(patients[1].full_name, "Lucas Lima");
    assert_eq!(api.diagnostic_questions().await.unwrap()[0].questions.len(), 1);
}

#[tokio::test]
async fn test_pdf_download_and_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(api_path(&paths::diagnostic_pdf(41))))
        .and(header("accept", "application/pdf"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "application/pdf")
                .set_body_bytes(b"%PDF-1.7 report".to_vec()),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(api_path(paths::DASHBOARD)))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad gateway</html>"))
        .mount(&server)
        .await;

    let tokens = MemoryTokenStore::with_tokens("a", "r");
    let api = api(&server, &tokens);
    assert_eq!(api.diagnostic_pdf(41).await.unwrap(), b"%PDF-1.7 report");

    let err = api.dashboard().await.unwrap_err();
    assert!(matches!(err, ApiError::Server { status: 502, .. }));
    assert_eq!(tokens.count(), 2);
}

#[tokio::test]
async fn test_unreachable_server() {
    // Nothing listens on a port released by a closed listener.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let address = listener.local_addr().unwrap();
    drop(listener);
    let config = ClientConfig {
        base_url: format!("http://{address}/api"),
        timeout_secs: 5,
        ..ClientConfig::default()
    };

    let transport = ReqwestTransport::new(&config).unwrap();
    let tokens = MemoryTokenStore::with_tokens("a", "r");
    let api = ClinicalApi::new(ApiClient::new(Arc::new(transport), Arc::new(tokens.clone())));

    let err = api.me().await.unwrap_err();
    assert!(matches!(err, ApiError::Network(_)));
    assert_eq!(tokens.count(), 2);
}

#[tokio::test]
async fn test_session_survives_restart_with_file_store() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(api_path(paths::LOGIN)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access": "a1", "refresh": "r1"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(api_path(paths::ME)))
        .and(header("authorization", "Bearer a1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(profile()))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let mut config = config(&server);
    config.token_file = dir.path().join("tokens.json");

    let first = AuthSession::new(teacare_infrastructure::connect(&config).await.unwrap());
    first.bootstrap().await;
    first
        .login(&Credentials::new("ana@clinic.test", "secret-pass"))
        .await
        .unwrap();

    let second = AuthSession::new(teacare_infrastructure::connect(&config).await.unwrap());
    assert!(second.bootstrap().await.is_authenticated());

    second.logout().await;
    let store = FileTokenStore::open(&config.token_file).await;
    assert_eq!(store.get(TokenKind::Access), None);
}
