//! Job envelopes: the request wrapper the scheduler sends and the
//! success/error wrappers it expects back.

use crate::error::AdapterError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Id substituted when a request carries none.
pub const DEFAULT_JOB_ID: &str = "1";

pub const STATUS_OK: u16 = 200;
pub const STATUS_ERRORED: u16 = 500;

/// Opaque job identifier, echoed back in its original JSON type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JobId {
    Number(serde_json::Number),
    Text(String),
}

impl Default for JobId {
    fn default() -> Self {
        JobId::Text(DEFAULT_JOB_ID.into())
    }
}

impl JobId {
    /// Read `id` from a raw request envelope. Absent, `null` and `""` fall
    /// back to the default id.
    pub fn from_input(input: &Value) -> Self {
        match input.get("id") {
            None | Some(Value::Null) => JobId::default(),
            Some(Value::String(s)) if s.is_empty() => JobId::default(),
            Some(Value::String(s)) => JobId::Text(s.clone()),
            Some(Value::Number(n)) => JobId::Number(n.clone()),
            Some(other) => JobId::Text(other.to_string()),
        }
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobId::Number(n) => write!(f, "{n}"),
            JobId::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub name: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<Value>,
}

impl From<&AdapterError> for ErrorDetail {
    fn from(err: &AdapterError) -> Self {
        let detail = match err {
            AdapterError::Vendor { body, .. } => body.clone(),
            _ => None,
        };
        Self {
            name: err.name().into(),
            message: err.to_string(),
            detail,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuccessEnvelope {
    #[serde(rename = "jobRunID")]
    pub job_run_id: JobId,
    pub data: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(rename = "statusCode")]
    pub status_code: u16,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    #[serde(rename = "jobRunID")]
    pub job_run_id: JobId,
    pub status: String,
    pub error: ErrorDetail,
    #[serde(rename = "statusCode")]
    pub status_code: u16,
}

/// What a shim hands back to the scheduler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Envelope {
    Errored(ErrorEnvelope),
    Success(SuccessEnvelope),
}

impl Envelope {
    /// Success envelope; a `null` result is left out.
    pub fn success(job_run_id: JobId, data: Value, result: Value) -> Self {
        let result = Some(result).filter(|r| !r.is_null());
        Envelope::Success(SuccessEnvelope {
            job_run_id,
            data,
            result,
            status_code: STATUS_OK,
        })
    }

    pub fn errored(job_run_id: JobId, err: &AdapterError) -> Self {
        Envelope::Errored(ErrorEnvelope {
            job_run_id,
            status: "errored".into(),
            error: ErrorDetail::from(err),
            status_code: STATUS_ERRORED,
        })
    }

    pub fn job_run_id(&self) -> &JobId {
        match self {
            Envelope::Success(s) => &s.job_run_id,
            Envelope::Errored(e) => &e.job_run_id,
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            Envelope::Success(s) => s.status_code,
            Envelope::Errored(e) => e.status_code,
        }
    }

    pub fn is_errored(&self) -> bool {
        matches!(self, Envelope::Errored(_))
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_id_defaults() {
        assert_eq!(JobId::from_input(&json!({"data": {}})), JobId::default());
        assert_eq!(JobId::from_input(&json!({"id": null})), JobId::default());
        assert_eq!(JobId::from_input(&json!({"id": ""})).to_string(), "1");
    }

    #[test]
    fn id_keeps_json_type() {
        let id = JobId::from_input(&json!({"id": 7}));
        assert_eq!(serde_json::to_value(&id).unwrap(), json!(7));
        let id = JobId::from_input(&json!({"id": "abc"}));
        assert_eq!(serde_json::to_value(&id).unwrap(), json!("abc"));
    }

    #[test]
    fn success_shape() {
        let env = Envelope::success(
            JobId::default(),
            json!({"result": "123", "status": 200}),
            json!("123"),
        );
        let v = env.to_value();
        assert_eq!(v["jobRunID"], "1");
        assert_eq!(v["data"]["result"], "123");
        assert_eq!(v["result"], "123");
        assert_eq!(v["statusCode"], 200);
        assert!(v.get("status").is_none());
        assert!(!env.is_errored());
    }

    #[test]
    fn null_result_is_omitted() {
        let v = Envelope::success(JobId::default(), json!({"a": 1}), Value::Null).to_value();
        assert!(v.get("result").is_none());
    }

    #[test]
    fn errored_shape() {
        let err = AdapterError::validation("input data is missing or empty");
        let env = Envelope::errored(JobId::Text("9".into()), &err);
        let v = env.to_value();
        assert_eq!(v["jobRunID"], "9");
        assert_eq!(v["status"], "errored");
        assert_eq!(v["statusCode"], 500);
        assert_eq!(v["error"]["name"], "ValidationError");
        assert!(v["error"].get("detail").is_none());
        assert_eq!(env.status_code(), 500);
    }

    #[test]
    fn vendor_body_lands_in_detail() {
        let err = AdapterError::Vendor {
            vendor: "twitter".into(),
            message: "HTTP 403".into(),
            status: Some(403),
            body: Some(json!({"errors": [{"code": 187}]})),
        };
        let v = Envelope::errored(JobId::default(), &err).to_value();
        assert_eq!(v["error"]["detail"]["errors"][0]["code"], 187);
    }

    #[test]
    fn envelopes_parse_back_into_the_right_variant() {
        let ok: Envelope =
            serde_json::from_value(json!({"jobRunID": "1", "data": {"a": 1}, "statusCode": 200}))
                .unwrap();
        assert!(!ok.is_errored());
        let bad: Envelope = serde_json::from_value(json!({
            "jobRunID": 3,
            "status": "errored",
            "error": {"name": "VendorError", "message": "boom"},
            "statusCode": 500
        }))
        .unwrap();
        assert!(bad.is_errored());
        assert_eq!(bad.job_run_id().to_string(), "3");
    }
}
