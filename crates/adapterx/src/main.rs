use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

mod commands;

/// Exit codes.
/// 0 = OK, 2 = input error, 4 = auth (401/403), 5 = rate limit (429), 6 = job errored, 1 = other.
#[allow(dead_code)]
const EXIT_OK: i32 = 0;
const EXIT_OTHER: i32 = 1;
const EXIT_INPUT: i32 = 2;
const EXIT_AUTH: i32 = 4;
const EXIT_RATE: i32 = 5;
const EXIT_JOB: i32 = 6;

#[derive(Parser)]
#[command(name = "adapterx", version, about = "Social adapter CLI: submit jobs, invoke adapters, list parameters")]
struct Cli {
    /// Gate server URL (default: http://localhost:8080)
    #[arg(long, env = "ADAPTER_GATE_URL", default_value = "http://localhost:8080")]
    gate: String,

    #[command(subcommand)]
    command: Commands,
}

/// Calling convention used by `invoke`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Style {
    /// Request body in, (status, envelope) out
    Direct,
    /// Event is the envelope; status inside the envelope
    Event,
    /// Envelope JSON-encoded in the event's `body` string
    EventV2,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit a job envelope to the gate
    Submit {
        /// Path to envelope JSON file (or - for stdin)
        #[arg(default_value = "-")]
        file: String,
        /// Adapter route (reddit, twitter); the gate default when omitted
        #[arg(long)]
        adapter: Option<String>,
    },
    /// Run an adapter in-process against the live vendor API
    Invoke {
        /// Adapter name (reddit, twitter)
        #[arg(long)]
        adapter: String,
        /// Calling convention to exercise
        #[arg(long, value_enum, default_value_t = Style::Direct)]
        style: Style,
        /// Path to envelope or event JSON file (or - for stdin)
        #[arg(default_value = "-")]
        file: String,
    },
    /// List an adapter's parameters and their defaults
    Params {
        /// Adapter name (reddit, twitter)
        #[arg(long)]
        adapter: String,
    },
    /// Check gate server health
    Health,
}

/// Map error strings to exit codes.
fn exit_code_for(err: &str) -> i32 {
    if err.contains("HTTP 401") || err.contains("HTTP 403") {
        EXIT_AUTH
    } else if err.contains("HTTP 429") {
        EXIT_RATE
    } else if err.starts_with("job ") {
        EXIT_JOB
    } else if err.contains("read ") || err.contains("parse ") || err.contains("missing ") {
        EXIT_INPUT
    } else {
        EXIT_OTHER
    }
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Submit { file, adapter } => {
            let client = commands::Client::new(&cli.gate);
            commands::submit(&client, &file, adapter.as_deref())
        }
        Commands::Invoke { adapter, style, file } => {
            tracing_subscriber::fmt()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact()
                .init();
            commands::invoke(&adapter, style, &file)
        }
        Commands::Params { adapter } => commands::params(&adapter),
        Commands::Health => commands::health(&commands::Client::new(&cli.gate)),
    };

    if let Err(e) = result {
        eprintln!("{} {}", "error:".red().bold(), e);
        process::exit(exit_code_for(&e));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes() {
        assert_eq!(exit_code_for("HTTP 403: forbidden"), EXIT_AUTH);
        assert_eq!(exit_code_for("job 1 errored: VendorError: twitter: HTTP 429"), EXIT_RATE);
        assert_eq!(exit_code_for("job 1 errored: ValidationError: data is empty"), EXIT_JOB);
        assert_eq!(exit_code_for("parse JSON: expected value"), EXIT_INPUT);
        assert_eq!(exit_code_for("request failed: connection refused"), EXIT_OTHER);
    }

    #[test]
    fn style_names() {
        let cli = Cli::try_parse_from(["adapterx", "invoke", "--adapter", "twitter", "--style", "event-v2"]).unwrap();
        match cli.command {
            Commands::Invoke { style, file, .. } => {
                assert_eq!(style, Style::EventV2);
                assert_eq!(file, "-");
            }
            _ => panic!("expected invoke"),
        }
    }
}
