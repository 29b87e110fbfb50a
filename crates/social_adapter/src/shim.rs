//! Invocation shims: adapt hosting calling conventions to
//! [`AdapterService::create_request`]. No business logic lives here.

use crate::envelope::Envelope;
use crate::service::AdapterService;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// Direct-handler style: the request body is the envelope; returns the HTTP
/// status and JSON body to respond with. An empty or non-JSON body is
/// handled as `{}`.
pub async fn handle_body(service: &AdapterService, body: &[u8]) -> (u16, Envelope) {
    let input = serde_json::from_slice::<Value>(body).unwrap_or_else(|e| {
        debug!(error = %e, "request body is not JSON, treating as empty envelope");
        Value::Object(Default::default())
    });
    let envelope = service.create_request(&input).await;
    (envelope.status_code(), envelope)
}

/// Event style v1: the event is the envelope; the status code travels inside
/// the returned envelope.
pub async fn handle_event(service: &AdapterService, event: &Value) -> Envelope {
    service.create_request(event).await
}

/// Response shape of event style v2.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventResponseV2 {
    pub status_code: u16,
    pub body: String,
    pub is_base64_encoded: bool,
}

/// Event style v2: the envelope arrives JSON-encoded in the event's `body`
/// string and leaves JSON-encoded in the response's `body`. A missing or
/// unparsable `body` is handled as `{}`.
pub async fn handle_event_v2(service: &AdapterService, event: &Value) -> EventResponseV2 {
    let input = match event.get("body") {
        Some(Value::String(raw)) => serde_json::from_str::<Value>(raw).ok(),
        // some gateways hand over an already-decoded body
        Some(obj @ Value::Object(_)) => Some(obj.clone()),
        _ => None,
    }
    .unwrap_or_else(|| Value::Object(Default::default()));

    let envelope = service.create_request(&input).await;
    EventResponseV2 {
        status_code: envelope.status_code(),
        body: serde_json::to_string(&envelope).unwrap_or_default(),
        is_base64_encoded: false,
    }
}
