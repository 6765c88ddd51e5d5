//! Scripted transport for unit tests.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use teacare_domain::{ApiRequest, ApiResponse};
use tokio::sync::Barrier;

use crate::ports::{HttpTransport, TransportError};

type Handler = Box<dyn Fn(&ApiRequest) -> Reply + Send + Sync>;

/// What the fake transport answers.
pub enum Reply {
    Respond {
        response: ApiResponse,
        delay: Option<Duration>,
    },
    Fail,
}

impl Reply {
    pub fn json(status: u16, body: Value) -> Self {
        Self::Respond {
            response: ApiResponse::json_body(status, &body),
            delay: None,
        }
    }

    pub fn status(status: u16) -> Self {
        Self::Respond {
            response: ApiResponse::new(status, Vec::new()),
            delay: None,
        }
    }

    pub fn bytes(status: u16, body: &[u8]) -> Self {
        Self::Respond {
            response: ApiResponse::new(status, body.to_vec()),
            delay: None,
        }
    }

    /// Answers after `delay` of (virtual) time.
    pub fn delayed(self, delay: Duration) -> Self {
        match self {
            Self::Respond { response, .. } => Self::Respond {
                response,
                delay: Some(delay),
            },
            Self::Fail => Self::Fail,
        }
    }
}

/// Records every request and answers with a scripted handler.
pub struct FakeTransport {
    handler: Handler,
    log: Mutex<Vec<ApiRequest>>,
    barrier: Option<(Arc<Barrier>, String)>,
}

impl FakeTransport {
    pub fn new(handler: impl Fn(&ApiRequest) -> Reply + Send + Sync + 'static) -> Self {
        Self {
            handler: Box::new(handler),
            log: Mutex::new(Vec::new()),
            barrier: None,
        }
    }

    /// Holds requests carrying `bearer` until `parties` of them arrived.
    pub fn with_barrier(mut self, parties: usize, bearer: &str) -> Self {
        self.barrier = Some((Arc::new(Barrier::new(parties)), bearer.to_string()));
        self
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.log.lock().clone()
    }

    pub fn requests_to(&self, path: &str) -> Vec<ApiRequest> {
        self.log
            .lock()
            .iter()
            .filter(|request| request.path == path)
            .cloned()
            .collect()
    }

    pub fn bearers(&self) -> Vec<Option<String>> {
        self.log
            .lock()
            .iter()
            .map(|request| request.bearer.clone())
            .collect()
    }
}

#[async_trait]
impl HttpTransport for FakeTransport {
    async fn send(&self, request: &ApiRequest) -> Result<ApiResponse, TransportError> {
        self.log.lock().push(request.clone());

        if let Some((barrier, bearer)) = &self.barrier
            && request.bearer.as_deref() == Some(bearer.as_str())
        {
            barrier.wait().await;
        }

        match (self.handler)(request) {
            Reply::Respond { response, delay } => {
                if let Some(delay) = delay {
                    tokio::time::sleep(delay).await;
                }
                Ok(response)
            }
            Reply::Fail => Err(TransportError::ConnectionFailed(
                "connection refused".to_string(),
            )),
        }
    }
}
