//! The request-handling core every shim calls into.
//!
//! ```text
//! envelope ─▶ validate ─▶ build request ─▶ vendor.post ─▶ map response ─▶ Envelope
//!                 │                             │               │
//!                 └──────── any failure ────────┴───────────────┴─▶ errored Envelope (500)
//! ```

use crate::envelope::{Envelope, JobId};
use crate::error::{AdapterError, Result};
use crate::retry::RetryPolicy;
use crate::vendor::{AdapterKind, Mapped, OutboundRequest, VendorClient};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// One adapter bound to an injected vendor client.
#[derive(Clone)]
pub struct AdapterService {
    kind: AdapterKind,
    client: Arc<dyn VendorClient>,
    retry: RetryPolicy,
    /// Upper bound on a whole request, retries included.
    deadline: Option<Duration>,
}

impl AdapterService {
    pub fn new(kind: AdapterKind, client: Arc<dyn VendorClient>) -> Self {
        Self {
            kind,
            client,
            retry: RetryPolicy::default(),
            deadline: None,
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Fail a request with `HttpError` once `deadline` has passed, however
    /// many attempts are left.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.deadline
    }

    pub fn kind(&self) -> AdapterKind {
        self.kind
    }

    /// Run one job request. Never fails: every error becomes an errored
    /// envelope carrying the request's job id.
    pub async fn create_request(&self, input: &Value) -> Envelope {
        let job_id = JobId::from_input(input);
        let outcome = match self.deadline {
            Some(deadline) => tokio::time::timeout(deadline, self.run(input))
                .await
                .unwrap_or_else(|_| {
                    Err(AdapterError::Http(format!(
                        "{} call exceeded {}ms deadline",
                        self.kind,
                        deadline.as_millis()
                    )))
                }),
            None => self.run(input).await,
        };
        match outcome {
            Ok(Mapped { data, result }) => {
                info!(adapter = %self.kind, job = %job_id, "job succeeded");
                Envelope::success(job_id, data, result)
            }
            Err(e) => {
                warn!(adapter = %self.kind, job = %job_id, kind = e.name(), error = %e, "job errored");
                Envelope::errored(job_id, &e)
            }
        }
    }

    async fn run(&self, input: &Value) -> Result<Mapped> {
        let validated = self.kind.schema().validate(input)?;
        let request = self.kind.build_request(&validated);
        let response = self.call_vendor(&request).await?;
        self.kind.map_response(response)
    }

    async fn call_vendor(&self, request: &OutboundRequest) -> Result<Value> {
        let mut attempt = 1;
        loop {
            match self.client.post(request).await {
                Ok(body) => return Ok(body),
                Err(e) if e.is_retryable() && self.retry.allows_another(attempt) => {
                    let delay = self.retry.next_delay(attempt);
                    warn!(
                        vendor = self.client.name(),
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "vendor call failed, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(feature = "http")]
impl AdapterService {
    /// Live service for `kind` built from loaded settings, or `None` when
    /// that adapter has no credentials.
    pub fn from_settings(kind: AdapterKind, settings: &adapter_config::Settings) -> Result<Option<Self>> {
        use crate::vendor::{reddit::RedditClient, twitter::TwitterClient};

        let gate = &settings.gate;
        let client: Arc<dyn VendorClient> = match kind {
            AdapterKind::Reddit => match &settings.reddit {
                Some(cfg) => Arc::new(RedditClient::new(cfg.clone(), gate.vendor_timeout)?),
                None => return Ok(None),
            },
            AdapterKind::Twitter => match &settings.twitter {
                Some(cfg) => Arc::new(TwitterClient::new(cfg.clone(), gate.vendor_timeout)?),
                None => return Ok(None),
            },
        };
        let retry = RetryPolicy::new(gate.max_attempts, gate.retry_base);
        let deadline = retry.worst_case(gate.vendor_timeout);
        Ok(Some(
            Self::new(kind, client)
                .with_retry(retry)
                .with_deadline(deadline),
        ))
    }
}
