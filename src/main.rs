//! users-search: run one query body against the users index
//!
//! Reads the body from the file given as first argument, or from stdin, and
//! prints the cluster's response.

use anyhow::{Context, Result};
use serde_json::Value;
use std::io::Read;
use tracing::info;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use users_search::{config, App};

#[tokio::main]
async fn main() -> Result<()> {
    let mut args = std::env::args().skip(1);
    let body_arg = args.next();

    match body_arg.as_deref() {
        Some("-h") | Some("--help") => {
            print_usage();
            return Ok(());
        }
        Some("-V") | Some("--version") => {
            println!("users-search {}", users_search::VERSION);
            return Ok(());
        }
        _ => {}
    }

    // Initialize logging on stderr so stdout stays pure JSON
    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    info!("Starting users-search v{}", users_search::VERSION);

    let settings = config::load().context("failed to load settings")?;
    let app = App::init(settings).context("failed to initialize cluster client")?;

    let body = read_body(body_arg.as_deref())?;

    let response = app.search(body).run().await?;

    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

/// Read the query body from a file, or stdin when no file (or `-`) is given
fn read_body(path: Option<&str>) -> Result<Value> {
    let text = match path {
        Some(path) if path != "-" => {
            std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path))?
        }
        _ => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("failed to read query body from stdin")?;
            text
        }
    };

    serde_json::from_str(&text).context("query body is not valid JSON")
}

/// Print usage information
fn print_usage() {
    println!(
        r#"
users-search v{}
Run a query body against the users index and print the raw response

USAGE:
    users-search [BODY_FILE]

ARGS:
    <BODY_FILE>    JSON query body; read from stdin when omitted or "-"

OPTIONS:
    -h, --help     Print help information
    -V, --version  Print version information

ENVIRONMENT VARIABLES:
    USERS_SEARCH_SETTINGS_PATH  Path to settings.yml
    USERS_SEARCH_ENDPOINTS      Comma separated cluster endpoints
    USERS_SEARCH_INDEX          Index to search
    USERS_SEARCH_TYPE           Document type to search
    USERS_SEARCH_CREDENTIALS    Path to the credentials JSON file
    AWS_ACCESS_KEY_ID, AWS_SECRET_ACCESS_KEY, AWS_SESSION_TOKEN, AWS_REGION
                                Signing credentials when no file is set
    RUST_LOG                    Log filter (default: info)
"#,
        users_search::VERSION
    );
}
