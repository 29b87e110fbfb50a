//! Social media external adapters.
//!
//! Each adapter turns a scheduler job envelope into one call against a
//! vendor API and turns the outcome back into a success or error envelope.
//!
//! # Architecture
//!
//! ```text
//! Shim (HTTP body / event v1 / event v2)
//!   │
//!   ▼
//! AdapterService::create_request(envelope)
//!   │  ParamSchema::validate ─▶ AdapterKind::build_request
//!   ▼
//! VendorClient::post(OutboundRequest)      (Reddit / Twitter / stub)
//!   │
//!   ▼
//! AdapterKind::map_response ─▶ Envelope { jobRunID, data | error, statusCode }
//! ```
//!
//! The vendor client is constructed by the caller and injected, so the same
//! service runs against the live APIs or a recording stub.

pub mod envelope;
pub mod error;
pub mod params;
pub mod retry;
pub mod service;
pub mod shim;
pub mod vendor;

pub use envelope::{Envelope, JobId};
pub use error::AdapterError;
pub use retry::RetryPolicy;
pub use service::AdapterService;
pub use vendor::{AdapterKind, Mapped, OutboundRequest, VendorClient};

#[cfg(feature = "http")]
pub use vendor::{reddit::RedditClient, twitter::TwitterClient};
