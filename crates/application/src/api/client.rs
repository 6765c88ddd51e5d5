//! Authenticated API gateway.
//!
//! Every outbound request goes through [`ApiClient::execute`], which attaches
//! the stored access token, runs the 401 refresh protocol and classifies the
//! final status.

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use teacare_domain::{
    ApiRequest, ApiResponse, MultipartForm, RefreshGrant, TokenKind, token_preview,
};

use super::error::{ApiError, RefreshFailure};
use super::refresh::RefreshCoordinator;
use crate::ports::{HttpTransport, TokenStore};

/// Path of the token refresh endpoint.
pub const REFRESH_PATH: &str = "/auth/refresh/";

struct Inner {
    transport: Arc<dyn HttpTransport>,
    tokens: Arc<dyn TokenStore>,
    refresh: RefreshCoordinator,
}

/// API client shared by all feature code.
///
/// Clones share the transport, the token store and the refresh coordinator,
/// so at most one refresh is in flight across all of them.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("refreshing", &self.is_refreshing())
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Create a client over a transport and a token store.
    #[must_use]
    pub fn new(transport: Arc<dyn HttpTransport>, tokens: Arc<dyn TokenStore>) -> Self {
        Self {
            inner: Arc::new(Inner {
                transport,
                tokens,
                refresh: RefreshCoordinator::new(),
            }),
        }
    }

    /// The token store backing this client.
    #[must_use]
    pub fn tokens(&self) -> &Arc<dyn TokenStore> {
        &self.inner.tokens
    }

    /// Returns true while a token refresh is running.
    #[must_use]
    pub fn is_refreshing(&self) -> bool {
        self.inner.refresh.is_refreshing()
    }

    /// Executes a request.
    ///
    /// A 401 on a request not flagged `skip_refresh` triggers one token
    /// refresh (shared with any concurrent 401) and one retry with the new
    /// token. If the stored token already changed since the request was sent,
    /// the retry uses it without refreshing again. A 401 on the retry is
    /// returned as [`ApiError::Unauthorized`].
    ///
    /// # Errors
    /// Returns an error for transport failures, non-2xx statuses and failed
    /// refreshes. A failed refresh clears all stored tokens.
    pub async fn execute(&self, mut request: ApiRequest) -> Result<ApiResponse, ApiError> {
        self.authorize(&mut request);
        let response = self.send(&request).await?;

        if response.is_unauthorized() && !request.skip_refresh {
            tracing::debug!(
                method = %request.method,
                path = %request.path,
                "Received 401, renewing session"
            );
            let token = match self.renewed_since(request.bearer.as_deref()) {
                Some(token) => {
                    tracing::debug!(path = %request.path, "Session already renewed, retrying");
                    token
                }
                None => self.renew().await?,
            };
            request.set_bearer(token);
            let retried = self.send(&request).await?;
            return Self::classify(&request, retried);
        }

        Self::classify(&request, response)
    }

    /// `GET` and decode a JSON body.
    ///
    /// # Errors
    /// See [`Self::execute`]; also fails if the body does not decode.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.send_json(ApiRequest::get(path)).await
    }

    /// `POST` a JSON body and decode the JSON reply.
    ///
    /// # Errors
    /// See [`Self::get_json`].
    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        self.send_json(ApiRequest::post(path).json(encode(body)?))
            .await
    }

    /// `PUT` a JSON body and decode the JSON reply.
    ///
    /// # Errors
    /// See [`Self::get_json`].
    pub async fn put_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        self.send_json(ApiRequest::put(path).json(encode(body)?))
            .await
    }

    /// `PATCH` a JSON body and decode the JSON reply.
    ///
    /// # Errors
    /// See [`Self::get_json`].
    pub async fn patch_json<B, T>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        self.send_json(ApiRequest::patch(path).json(encode(body)?))
            .await
    }

    /// `POST` a multipart form and decode the JSON reply.
    ///
    /// # Errors
    /// See [`Self::get_json`].
    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: MultipartForm,
    ) -> Result<T, ApiError> {
        self.send_json(ApiRequest::post(path).multipart(form)).await
    }

    /// `GET` a binary body, e.g. a PDF document.
    ///
    /// # Errors
    /// See [`Self::execute`].
    pub async fn get_bytes(&self, path: &str, accept: &str) -> Result<Vec<u8>, ApiError> {
        let response = self.execute(ApiRequest::get(path).accept(accept)).await?;
        Ok(response.body)
    }

    /// Executes a request and decodes the JSON reply.
    ///
    /// # Errors
    /// See [`Self::get_json`].
    pub async fn send_json<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, ApiError> {
        let path = request.path.clone();
        let response = self.execute(request).await?;
        response.json().map_err(|err| {
            tracing::warn!(path = %path, error = %err, "Response body did not decode");
            ApiError::Decode(err.to_string())
        })
    }

    fn authorize(&self, request: &mut ApiRequest) {
        if let Some(token) = self.inner.tokens.get(TokenKind::Access) {
            request.set_bearer(token);
        }
    }

    /// The stored access token, if it differs from the one a request used.
    fn renewed_since(&self, sent_with: Option<&str>) -> Option<String> {
        self.inner
            .tokens
            .get(TokenKind::Access)
            .filter(|stored| !stored.is_empty() && Some(stored.as_str()) != sent_with)
    }

    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        self.inner.transport.send(request).await.map_err(|err| {
            tracing::warn!(
                method = %request.method,
                path = %request.path,
                error = %err,
                "Request failed before a response"
            );
            ApiError::Network(err)
        })
    }

    async fn renew(&self) -> Result<String, ApiError> {
        self.inner
            .refresh
            .refresh_with(|| self.refresh_tokens())
            .await
            .map_err(ApiError::from)
    }

    /// Leader side of the refresh: exchange, persist, or wipe the session.
    async fn refresh_tokens(&self) -> Result<String, RefreshFailure> {
        let outcome = self.exchange_refresh_token().await;
        match &outcome {
            Ok(access) => {
                tracing::info!(access = %token_preview(access), "Session renewed");
            }
            Err(failure) => {
                tracing::warn!(reason = %failure, "Session renewal failed, clearing tokens");
                if let Err(err) = self.inner.tokens.clear_all().await {
                    tracing::error!(error = %err, "Failed to clear stored tokens");
                }
            }
        }
        outcome
    }

    async fn exchange_refresh_token(&self) -> Result<String, RefreshFailure> {
        let refresh = self
            .inner
            .tokens
            .get(TokenKind::Refresh)
            .filter(|token| !token.is_empty())
            .ok_or(RefreshFailure::MissingToken)?;

        let request = ApiRequest::post(REFRESH_PATH)
            .json(json!({ "refresh": refresh }))
            .without_refresh();
        let response = self
            .inner
            .transport
            .send(&request)
            .await
            .map_err(RefreshFailure::Transport)?;
        if !response.is_success() {
            return Err(RefreshFailure::Rejected {
                status: response.status,
            });
        }

        let grant: RefreshGrant = response
            .json()
            .map_err(|err| RefreshFailure::Malformed(err.to_string()))?;
        if grant.access.is_empty() {
            return Err(RefreshFailure::Malformed("empty access token".to_string()));
        }

        let tokens = &self.inner.tokens;
        tokens
            .set(TokenKind::Access, &grant.access)
            .await
            .map_err(RefreshFailure::Storage)?;
        tokens
            .set_if_present(TokenKind::Refresh, grant.refresh.as_deref())
            .await
            .map_err(RefreshFailure::Storage)?;
        Ok(grant.access)
    }

    fn classify(request: &ApiRequest, response: ApiResponse) -> Result<ApiResponse, ApiError> {
        if response.is_success() {
            return Ok(response);
        }
        let err = ApiError::from_response(&response);
        if response.is_server_error() {
            tracing::warn!(
                method = %request.method,
                path = %request.path,
                status = response.status,
                "Server error"
            );
        } else {
            tracing::debug!(
                method = %request.method,
                path = %request.path,
                status = response.status,
                "Request rejected"
            );
        }
        Err(err)
    }
}

fn encode<B: Serialize + ?Sized>(body: &B) -> Result<serde_json::Value, ApiError> {
    serde_json::to_value(body).map_err(|err| ApiError::Encode(err.to_string()))
}
