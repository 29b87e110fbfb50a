use serde_json::Value;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AdapterError {
    #[error("validation: {0}")]
    Validation(String),

    #[error("vendor {vendor}: {message}")]
    Vendor {
        vendor: String,
        message: String,
        /// HTTP status returned by the vendor, when the failure came from a response.
        status: Option<u16>,
        /// Parsed (or raw text) body the vendor returned.
        body: Option<Value>,
    },

    #[error("http: {0}")]
    Http(String),

    #[error("serde: {0}")]
    Serde(#[from] serde_json::Error),
}

impl AdapterError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn vendor(vendor: &str, msg: impl Into<String>) -> Self {
        Self::Vendor {
            vendor: vendor.into(),
            message: msg.into(),
            status: None,
            body: None,
        }
    }

    /// Kind name surfaced in the error envelope's `error.name`.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Validation(_) => "ValidationError",
            Self::Vendor { .. } => "VendorError",
            Self::Http(_) => "HttpError",
            Self::Serde(_) => "SerdeError",
        }
    }

    /// Whether another attempt could plausibly succeed.
    ///
    /// Transport failures, rate limiting and vendor 5xx are retryable, as is a
    /// vendor body flagged with `"Response": "Error"`. Everything else is final.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(_) => true,
            Self::Vendor { status, body, .. } => {
                if matches!(status, Some(429) | Some(500..=599)) {
                    return true;
                }
                body.as_ref()
                    .and_then(|b| b.get("Response"))
                    .and_then(|r| r.as_str())
                    .map(|r| r == "Error")
                    .unwrap_or(false)
            }
            Self::Validation(_) | Self::Serde(_) => false,
        }
    }
}

#[cfg(feature = "http")]
impl From<reqwest::Error> for AdapterError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AdapterError>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn vendor_with(status: Option<u16>, body: Option<Value>) -> AdapterError {
        AdapterError::Vendor {
            vendor: "reddit".into(),
            message: "rejected".into(),
            status,
            body,
        }
    }

    #[test]
    fn validation_is_final() {
        assert!(!AdapterError::validation("no data").is_retryable());
    }

    #[test]
    fn transport_failure_is_retryable() {
        assert!(AdapterError::Http("connection reset".into()).is_retryable());
    }

    #[test]
    fn vendor_status_classification() {
        assert!(vendor_with(Some(429), None).is_retryable());
        assert!(vendor_with(Some(503), None).is_retryable());
        assert!(!vendor_with(Some(401), None).is_retryable());
        assert!(!vendor_with(None, None).is_retryable());
    }

    #[test]
    fn response_error_body_is_retryable() {
        let err = vendor_with(Some(400), Some(json!({"Response": "Error"})));
        assert!(err.is_retryable());
        let err = vendor_with(Some(400), Some(json!({"Response": "Success"})));
        assert!(!err.is_retryable());
    }

    #[test]
    fn names_match_kinds() {
        assert_eq!(AdapterError::validation("x").name(), "ValidationError");
        assert_eq!(AdapterError::vendor("twitter", "x").name(), "VendorError");
        assert_eq!(AdapterError::Http("x".into()).name(), "HttpError");
    }
}
