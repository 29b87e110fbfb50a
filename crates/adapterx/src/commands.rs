use crate::Style;
use adapter_config::Settings;
use colored::Colorize;
use serde_json::Value;
use social_adapter::{shim, AdapterKind, AdapterService};
use std::fs;
use std::io::{self, Read};

pub struct Client {
    base: String,
    http: reqwest::blocking::Client,
}

impl Client {
    pub fn new(base: &str) -> Self {
        Self {
            base: base.trim_end_matches('/').to_string(),
            http: reqwest::blocking::Client::new(),
        }
    }

    fn get(&self, path: &str) -> Result<reqwest::blocking::Response, String> {
        let url = format!("{}{}", self.base, path);
        self.http
            .get(&url)
            .send()
            .map_err(|e| format!("request failed: {e}"))
    }

    fn post_raw(&self, path: &str, body: String) -> Result<reqwest::blocking::Response, String> {
        let url = format!("{}{}", self.base, path);
        self.http
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .map_err(|e| format!("request failed: {e}"))
    }
}

fn read_input(file: &str) -> Result<String, String> {
    if file == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| format!("read stdin: {e}"))?;
        Ok(buf)
    } else {
        fs::read_to_string(file).map_err(|e| format!("read file: {e}"))
    }
}

fn parse_adapter(name: &str) -> Result<AdapterKind, String> {
    name.parse().map_err(|e| format!("parse adapter: {e}"))
}

/// `Err` describing an errored envelope, `Ok` for a success envelope.
fn job_outcome(envelope: &Value) -> Result<(), String> {
    if envelope.get("status").and_then(Value::as_str) != Some("errored") {
        return Ok(());
    }
    let id = envelope.get("jobRunID").map(render_id).unwrap_or_default();
    let name = envelope
        .pointer("/error/name")
        .and_then(Value::as_str)
        .unwrap_or("Error");
    let message = envelope
        .pointer("/error/message")
        .and_then(Value::as_str)
        .unwrap_or("unknown error");
    Err(format!("job {id} errored: {name}: {message}"))
}

fn render_id(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn print_envelope(status: u16, envelope: &Value) {
    let id = envelope.get("jobRunID").map(render_id).unwrap_or_default();
    let status_text = if status == 200 {
        status.to_string().green()
    } else {
        status.to_string().red()
    };
    println!("{} {}", "Job:   ".dimmed(), id.cyan());
    println!("{} {}", "Status:".dimmed(), status_text);
    if let Some(result) = envelope.get("result").or_else(|| envelope.pointer("/data/result")) {
        println!("{} {}", "Result:".dimmed(), render_id(result).green());
    }
    println!(
        "{}",
        serde_json::to_string_pretty(envelope).unwrap_or_default()
    );
}

// ── submit ──────────────────────────────────────────────────────

pub fn submit(client: &Client, file: &str, adapter: Option<&str>) -> Result<(), String> {
    let content = read_input(file)?;
    let path = match adapter {
        Some(name) => format!("/{}", parse_adapter(name)?),
        None => "/".to_string(),
    };

    let resp = client.post_raw(&path, content)?;
    let status = resp.status().as_u16();
    let json: Value = resp.json().map_err(|e| format!("parse response: {e}"))?;

    // envelopes carry jobRunID; anything else is a gate error
    if json.get("jobRunID").is_none() {
        let detail = json
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("unknown error");
        return Err(format!("HTTP {status}: {detail}"));
    }
    print_envelope(status, &json);
    job_outcome(&json)
}

// ── invoke ──────────────────────────────────────────────────────

pub fn invoke(adapter: &str, style: Style, file: &str) -> Result<(), String> {
    let kind = parse_adapter(adapter)?;
    let settings = Settings::from_env().map_err(|e| e.to_string())?;
    let service = AdapterService::from_settings(kind, &settings)
        .map_err(|e| format!("build {kind} client: {e}"))?
        .ok_or_else(|| format!("missing {kind} credentials in the environment"))?;
    let content = read_input(file)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("start runtime: {e}"))?;

    match style {
        Style::Direct => {
            let (status, envelope) =
                runtime.block_on(shim::handle_body(&service, content.as_bytes()));
            let envelope = envelope.to_value();
            print_envelope(status, &envelope);
            job_outcome(&envelope)
        }
        Style::Event => {
            let event = parse_event(&content)?;
            let envelope = runtime.block_on(shim::handle_event(&service, &event));
            let envelope = envelope.to_value();
            print_envelope(envelope_status(&envelope), &envelope);
            job_outcome(&envelope)
        }
        Style::EventV2 => {
            let event = parse_event(&content)?;
            let response = runtime.block_on(shim::handle_event_v2(&service, &event));
            println!(
                "{}",
                serde_json::to_string_pretty(&response).unwrap_or_default()
            );
            let envelope: Value = serde_json::from_str(&response.body)
                .map_err(|e| format!("parse response body: {e}"))?;
            job_outcome(&envelope)
        }
    }
}

fn parse_event(content: &str) -> Result<Value, String> {
    serde_json::from_str(content).map_err(|e| format!("parse JSON: {e}"))
}

fn envelope_status(envelope: &Value) -> u16 {
    envelope
        .get("statusCode")
        .and_then(Value::as_u64)
        .and_then(|s| u16::try_from(s).ok())
        .unwrap_or(500)
}

// ── params ──────────────────────────────────────────────────────

pub fn params(adapter: &str) -> Result<(), String> {
    let kind = parse_adapter(adapter)?;
    println!("{} {}", "Adapter:".dimmed(), kind.as_str().cyan());
    for spec in kind.schema().specs() {
        let marker = if spec.required {
            "required".yellow()
        } else {
            "optional".dimmed()
        };
        if spec.default.is_empty() {
            println!("  {:<10} {}", spec.name.bold(), marker);
        } else {
            println!(
                "  {:<10} {}  default {}",
                spec.name.bold(),
                marker,
                format!("{:?}", spec.default).green()
            );
        }
    }
    Ok(())
}

// ── health ──────────────────────────────────────────────────────

pub fn health(client: &Client) -> Result<(), String> {
    let resp = client.get("/healthz")?;
    let status = resp.status();
    if !status.is_success() {
        return Err(format!("HTTP {}: gate unhealthy", status.as_u16()));
    }
    let json: Value = resp.json().map_err(|e| format!("parse response: {e}"))?;
    let adapters: Vec<&str> = json
        .get("adapters")
        .and_then(Value::as_array)
        .map(|a| a.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();
    let default = json.get("default").and_then(Value::as_str).unwrap_or("-");
    println!("{} {}", "Gate:    ".dimmed(), "ok".green().bold());
    println!("{} {}", "Adapters:".dimmed(), adapters.join(", ").cyan());
    println!("{} {}", "Default: ".dimmed(), default);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn success_envelope_is_ok() {
        let env = json!({"jobRunID": "1", "data": {"result": "123"}, "result": "123", "statusCode": 200});
        assert!(job_outcome(&env).is_ok());
    }

    #[test]
    fn errored_envelope_names_job_and_error() {
        let env = json!({
            "jobRunID": 42,
            "status": "errored",
            "error": {"name": "VendorError", "message": "vendor twitter: HTTP 403"},
            "statusCode": 500
        });
        let err = job_outcome(&env).unwrap_err();
        assert_eq!(err, "job 42 errored: VendorError: vendor twitter: HTTP 403");
    }

    #[test]
    fn status_falls_back_to_500() {
        assert_eq!(envelope_status(&json!({"statusCode": 200})), 200);
        assert_eq!(envelope_status(&json!({})), 500);
    }

    #[test]
    fn read_input_from_file() {
        let path = std::env::temp_dir().join(format!("adapterx-{}.json", std::process::id()));
        fs::write(&path, r#"{"data":{"status":"hi"}}"#).unwrap();
        let content = read_input(path.to_str().unwrap()).unwrap();
        fs::remove_file(&path).unwrap();
        assert_eq!(parse_event(&content).unwrap()["data"]["status"], "hi");

        assert!(read_input("/nonexistent/adapterx.json").unwrap_err().starts_with("read file"));
    }

    #[test]
    fn unknown_adapter_is_input_error() {
        assert!(parse_adapter("myspace").unwrap_err().starts_with("parse adapter"));
    }
}
