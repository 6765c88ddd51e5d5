//! HTTP transport implementation using reqwest.
//!
//! This adapter implements the `HttpTransport` port. It resolves request
//! paths against the configured base URL, encodes JSON and multipart bodies
//! and buffers every response, whatever its status.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, Url, header};
use teacare_application::ports::{HttpTransport, TransportError};
use teacare_domain::{ApiRequest, ApiResponse, HttpMethod, MultipartForm, RequestBody};

use crate::config::ClientConfig;

/// HTTP transport over `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl ReqwestTransport {
    /// Creates a transport for the configured API.
    ///
    /// Redirects are followed up to 10 hops; TLS verification stays on.
    ///
    /// # Errors
    /// Returns an error if the client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self, TransportError> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .redirect(reqwest::redirect::Policy::limited(10))
            .timeout(config.timeout())
            .build()
            .map_err(|e| TransportError::Other(e.to_string()))?;

        Ok(Self::with_client(client, &config.base_url, config.timeout()))
    }

    /// Creates a transport around an existing client.
    #[must_use]
    pub fn with_client(client: Client, base_url: &str, timeout: Duration) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        }
    }

    /// Base URL requests are resolved against.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Joins the base URL, the request path and its query.
    fn resolve(&self, request: &ApiRequest) -> Result<Url, TransportError> {
        let raw = if request.path.starts_with('/') {
            format!("{}{}", self.base_url, request.path)
        } else {
            format!("{}/{}", self.base_url, request.path)
        };
        let mut url =
            Url::parse(&raw).map_err(|e| TransportError::InvalidUrl(format!("{e}: {raw}")))?;
        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&request.query);
        }
        Ok(url)
    }

    const fn to_reqwest_method(method: HttpMethod) -> Method {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Patch => Method::PATCH,
            HttpMethod::Delete => Method::DELETE,
        }
    }

    fn build_form(form: &MultipartForm) -> Result<Form, TransportError> {
        let mut multipart = Form::new();
        for (name, value) in &form.fields {
            multipart = multipart.text(name.clone(), value.clone());
        }
        for file in &form.files {
            let content_type = file.content_type.clone().unwrap_or_else(|| {
                mime_guess::from_path(&file.file_name)
                    .first_or_octet_stream()
                    .to_string()
            });
            let part = Part::bytes(file.bytes.clone())
                .file_name(file.file_name.clone())
                .mime_str(&content_type)
                .map_err(|e| TransportError::Other(format!("invalid media type {content_type}: {e}")))?;
            multipart = multipart.part(file.field.clone(), part);
        }
        Ok(multipart)
    }

    fn map_error(&self, error: &reqwest::Error) -> TransportError {
        if error.is_timeout() {
            return TransportError::Timeout;
        }
        if error.is_connect() {
            return TransportError::ConnectionFailed(error.to_string());
        }
        if error.is_builder() {
            return TransportError::InvalidUrl(error.to_string());
        }
        tracing::debug!(base_url = %self.base_url, timeout = ?self.timeout, "Unclassified transport error");
        TransportError::Other(error.to_string())
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        let url = self.resolve(request)?;
        let mut builder = self
            .client
            .request(Self::to_reqwest_method(request.method), url)
            .header(header::ACCEPT, &request.accept);

        if let Some(authorization) = request.authorization_header() {
            builder = builder.header(header::AUTHORIZATION, authorization);
        }

        builder = match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(value),
            RequestBody::Multipart(form) => builder.multipart(Self::build_form(form)?),
        };

        let response = builder.send().await.map_err(|e| {
            let mapped = self.map_error(&e);
            tracing::warn!(method = %request.method, path = %request.path, error = %mapped, "Request failed");
            mapped
        })?;

        let status = response.status().as_u16();
        let headers: BTreeMap<String, String> = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_ascii_lowercase(),
                    value.to_str().unwrap_or("<binary>").to_string(),
                )
            })
            .collect();
        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::Other(format!("failed to read body: {e}")))?
            .to_vec();

        tracing::debug!(method = %request.method, path = %request.path, status, size = body.len(), "Response received");
        Ok(ApiResponse {
            status,
            headers,
            body,
        })
    }
}
