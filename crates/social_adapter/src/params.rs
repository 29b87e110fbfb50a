//! Parameter schemas and the input validator.
//!
//! Every adapter declares a fixed list of named parameters. Validation reads
//! them out of the envelope's `data` object and resolves each one to a
//! string, substituting the declared default according to the entry's
//! [`Fallback`] rule.

use crate::envelope::JobId;
use crate::error::{AdapterError, Result};
use serde_json::Value;
use std::collections::BTreeMap;

/// When a declared default replaces the supplied value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fallback {
    /// Absent, `null`, `false`, `""` and numeric zero all take the default.
    WhenFalsy,
    /// Only absent or `null` take the default; `""` is passed through.
    WhenAbsent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamSpec {
    pub name: &'static str,
    pub required: bool,
    pub default: &'static str,
    pub fallback: Fallback,
}

impl ParamSpec {
    pub const fn optional(name: &'static str, default: &'static str) -> Self {
        Self {
            name,
            required: false,
            default,
            fallback: Fallback::WhenFalsy,
        }
    }

    pub const fn required(name: &'static str) -> Self {
        Self {
            name,
            required: true,
            default: "",
            fallback: Fallback::WhenFalsy,
        }
    }

    pub const fn with_fallback(mut self, fallback: Fallback) -> Self {
        self.fallback = fallback;
        self
    }

    fn takes_default(&self, raw: Option<&Value>) -> bool {
        match self.fallback {
            Fallback::WhenFalsy => is_falsy(raw),
            Fallback::WhenAbsent => matches!(raw, None | Some(Value::Null)),
        }
    }
}

/// Ordered set of parameters an adapter recognizes.
#[derive(Debug, Clone, Copy)]
pub struct ParamSchema {
    specs: &'static [ParamSpec],
}

impl ParamSchema {
    pub const fn new(specs: &'static [ParamSpec]) -> Self {
        Self { specs }
    }

    pub fn specs(&self) -> &'static [ParamSpec] {
        self.specs
    }

    pub fn get(&self, name: &str) -> Option<&'static ParamSpec> {
        self.specs.iter().find(|s| s.name == name)
    }

    /// Validate a raw request envelope against this schema.
    ///
    /// Fails when the envelope is not an object, when `data` is absent, not an
    /// object or empty, or when a required parameter resolves to nothing.
    /// Unknown `data` fields are ignored.
    pub fn validate(&self, input: &Value) -> Result<ValidatedInput> {
        let envelope = input
            .as_object()
            .ok_or_else(|| AdapterError::validation("request envelope must be a JSON object"))?;
        let id = JobId::from_input(input);

        let data = match envelope.get("data") {
            Some(Value::Object(map)) if !map.is_empty() => map,
            Some(Value::Object(_)) | None | Some(Value::Null) => {
                return Err(AdapterError::validation("input data is missing or empty"))
            }
            Some(_) => return Err(AdapterError::validation("input data must be a JSON object")),
        };

        let mut params = BTreeMap::new();
        for spec in self.specs {
            let raw = data.get(spec.name);
            let value = if spec.takes_default(raw) {
                if spec.required {
                    return Err(AdapterError::validation(format!(
                        "required parameter not supplied: {}",
                        spec.name
                    )));
                }
                spec.default.to_string()
            } else {
                // takes_default covers None under both fallbacks
                render(raw.unwrap_or(&Value::Null))
            };
            params.insert(spec.name, value);
        }

        Ok(ValidatedInput { id, params })
    }
}

/// Envelope id plus every declared parameter resolved to text.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedInput {
    pub id: JobId,
    params: BTreeMap<&'static str, String>,
}

impl ValidatedInput {
    /// Resolved value of a declared parameter; undeclared names yield `""`.
    pub fn get(&self, name: &str) -> &str {
        self.params.get(name).map(String::as_str).unwrap_or("")
    }

    pub fn params(&self) -> &BTreeMap<&'static str, String> {
        &self.params
    }
}

fn is_falsy(raw: Option<&Value>) -> bool {
    match raw {
        None | Some(Value::Null) => true,
        Some(Value::Bool(b)) => !b,
        Some(Value::String(s)) => s.is_empty(),
        Some(Value::Number(n)) => n.as_f64().map(|f| f == 0.0).unwrap_or(false),
        Some(Value::Array(_)) | Some(Value::Object(_)) => false,
    }
}

fn render(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
