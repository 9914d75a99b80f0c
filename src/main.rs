use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;
use serde_json::json;
use tracing_subscriber::EnvFilter;

use rsampquery::{query, Mode, Opcode, QueryConfig, QueryOutcome, SampQueryError};

/// Query a SA-MP or open.mp server and print the result as JSON.
#[derive(Parser, Debug)]
#[command(name = "rsampquery", version)]
struct Args {
    /// Server IP or hostname [env: SAMPQUERY_HOST]
    #[arg(long)]
    host: Option<String>,

    /// Server port [env: SAMPQUERY_PORT]
    #[arg(short, long)]
    port: Option<u32>,

    /// Per-request timeout in milliseconds [env: SAMPQUERY_TIMEOUT_MS]
    #[arg(short, long)]
    timeout: Option<u64>,

    /// Opcode characters: i(nfo) r(ules) c (players) d(etailed players) p(ing)
    #[arg(short, long, default_value = "")]
    opcodes: String,

    /// Labeled status report, falling back to `c` on open.mp servers
    #[arg(long)]
    status: bool,

    /// Drop replies whose echoed header does not match the request
    #[arg(long)]
    strict: bool,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
}

/// Environment first, then flags on top. Range checks happen when the session is created.
fn build_config(args: &Args) -> Result<QueryConfig, SampQueryError> {
    let mut config = QueryConfig::from_env()?;
    if let Some(host) = &args.host {
        config.host = host.clone();
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(ms) = args.timeout {
        config.timeout = Duration::from_millis(ms);
    }
    if args.strict {
        config.strict_header = true;
    }
    Ok(config)
}

async fn run(args: &Args) -> Result<QueryOutcome, SampQueryError> {
    let config = build_config(args)?;
    let mode = if args.status { Mode::Status } else { Mode::Focused };
    let opcodes = Opcode::parse_list(&args.opcodes);
    query(&config, &opcodes, mode).await
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let (output, code) = match run(&args).await {
        Ok(outcome) => match serde_json::to_value(&outcome) {
            Ok(value) => (value, ExitCode::SUCCESS),
            Err(e) => (
                json!({ "error": true, "message": format!("JSON encoding error: {e}") }),
                ExitCode::FAILURE,
            ),
        },
        Err(e) => (json!({ "error": true, "message": e.to_string() }), ExitCode::FAILURE),
    };

    let printed = if args.pretty {
        serde_json::to_string_pretty(&output)
    } else {
        serde_json::to_string(&output)
    };
    match printed {
        Ok(text) => println!("{text}"),
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    }
    code
}
