pub mod api;
pub mod error;

use adapter_config::Settings;
use anyhow::{anyhow, bail, Context};
use axum::{
    extract::Request,
    middleware::{self, Next},
    response::Response,
    routing::{get, post},
    Router,
};
use social_adapter::{AdapterKind, AdapterService};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tracing::info;

/// Max request body size: 1 MiB
const MAX_BODY_BYTES: usize = 1_048_576;
/// Request timeout floor
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
/// Headroom over the slowest adapter deadline, so the adapter's own error
/// envelope always wins the race against the transport timeout.
const DEADLINE_MARGIN: Duration = Duration::from_secs(5);

#[derive(Clone)]
pub struct AppState {
    adapters: Arc<BTreeMap<AdapterKind, AdapterService>>,
    default_adapter: Option<AdapterKind>,
    request_timeout: Duration,
}

impl AppState {
    /// Serve `services`; `default_adapter` answers `POST /`. When no default
    /// is given and exactly one adapter is present, that one is the default.
    pub fn new(services: Vec<AdapterService>, default_adapter: Option<AdapterKind>) -> Self {
        let adapters: BTreeMap<_, _> = services.into_iter().map(|s| (s.kind(), s)).collect();
        let default_adapter = default_adapter.or_else(|| {
            if adapters.len() == 1 {
                adapters.keys().next().copied()
            } else {
                None
            }
        });
        let request_timeout = adapters
            .values()
            .filter_map(AdapterService::deadline)
            .map(|d| d + DEADLINE_MARGIN)
            .fold(REQUEST_TIMEOUT, Duration::max);
        Self {
            adapters: Arc::new(adapters),
            default_adapter,
            request_timeout,
        }
    }

    /// Build the live vendor clients for every adapter with credentials.
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let mut services = Vec::new();
        for kind in AdapterKind::ALL {
            let service = AdapterService::from_settings(kind, settings)
                .with_context(|| format!("building {kind} client"))?;
            services.extend(service);
        }
        if services.is_empty() {
            bail!("no adapter configured: set the REDDIT_* or TWITTER_* credentials");
        }

        let default_adapter = match settings.gate.default_adapter.as_deref() {
            Some(name) => {
                let kind: AdapterKind = name.parse()?;
                if !services.iter().any(|s| s.kind() == kind) {
                    return Err(anyhow!("ADAPTER={kind} but {kind} credentials are not set"));
                }
                Some(kind)
            }
            None => None,
        };
        Ok(Self::new(services, default_adapter))
    }

    pub fn service(&self, kind: AdapterKind) -> Option<&AdapterService> {
        self.adapters.get(&kind)
    }

    pub fn default_adapter(&self) -> Option<AdapterKind> {
        self.default_adapter
    }

    pub fn enabled(&self) -> Vec<AdapterKind> {
        self.adapters.keys().copied().collect()
    }

    /// Transport timeout for one request: at least 30 s, and always longer
    /// than every adapter's deadline.
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }
}

pub fn app(state: AppState) -> Router {
    let request_timeout = state.request_timeout();
    Router::new()
        .route("/", post(api::submit_default))
        .route("/healthz", get(api::healthz))
        .route("/:adapter", post(api::submit))
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(middleware::from_fn(access_log))
        .with_state(state)
}

/// Middleware: one log line per request.
async fn access_log(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_owned();
    let started = Instant::now();
    let resp = next.run(req).await;
    info!(
        %method,
        %path,
        status = resp.status().as_u16(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "request"
    );
    resp
}

pub mod test {
    use super::AppState;
    use std::net::SocketAddr;
    use tokio::net::TcpListener;

    /// Spawn the server on a random port. Returns the address and a
    /// JoinHandle that keeps the server alive until dropped.
    pub async fn spawn_with(state: AppState) -> (SocketAddr, tokio::task::JoinHandle<()>) {
        let app = super::app(state);
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (addr, handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adapter_config::{GateConfig, TwitterConfig};

    fn twitter_settings(default_adapter: Option<&str>) -> Settings {
        Settings {
            reddit: None,
            twitter: Some(TwitterConfig {
                consumer_key: "ck".into(),
                consumer_secret: "cs".into(),
                access_token_key: "tk".into(),
                access_token_secret: "ts".into(),
                api_url: "http://127.0.0.1:9".into(),
            }),
            gate: GateConfig {
                default_adapter: default_adapter.map(str::to_string),
                ..GateConfig::default()
            },
        }
    }

    #[test]
    fn single_adapter_becomes_default() {
        let state = AppState::from_settings(&twitter_settings(None)).unwrap();
        assert_eq!(state.enabled(), vec![AdapterKind::Twitter]);
        assert_eq!(state.default_adapter(), Some(AdapterKind::Twitter));
    }

    #[test]
    fn request_timeout_outlasts_retrying_adapter() {
        let mut settings = twitter_settings(None);
        settings.gate.max_attempts = 3;
        settings.gate.vendor_timeout = Duration::from_secs(10);
        let state = AppState::from_settings(&settings).unwrap();
        // 10 + 2 + 10 + 4 + 10 s of vendor time, plus margin
        let deadline = state.service(AdapterKind::Twitter).unwrap().deadline().unwrap();
        assert_eq!(deadline, Duration::from_secs(36));
        assert_eq!(state.request_timeout(), Duration::from_secs(41));

        settings.gate.max_attempts = 1;
        settings.gate.vendor_timeout = Duration::from_secs(60);
        let state = AppState::from_settings(&settings).unwrap();
        assert_eq!(state.request_timeout(), Duration::from_secs(65));
    }

    #[test]
    fn request_timeout_has_a_floor() {
        let state = AppState::from_settings(&twitter_settings(None)).unwrap();
        assert_eq!(state.request_timeout(), REQUEST_TIMEOUT);
    }

    #[test]
    fn default_must_be_enabled() {
        assert!(AppState::from_settings(&twitter_settings(Some("reddit"))).is_err());
        assert!(AppState::from_settings(&twitter_settings(Some("myspace"))).is_err());
    }

    #[test]
    fn no_credentials_is_an_error() {
        let settings = Settings {
            reddit: None,
            twitter: None,
            gate: GateConfig::default(),
        };
        assert!(AppState::from_settings(&settings).is_err());
    }
}
