//! Print the SOQL queries an extraction run would submit.
//!
//! Works offline: describe results come from a JSON file (one
//! describe-sobject payload or an array of them) instead of the API.
//!
//! ```sh
//! cargo run --bin soql-plan -- config.json describe.json [state.json]
//! ```
//!
//! Queries go to stdout, one per line. Set `RUST_LOG=debug` for details.

use busbar_sf_extract::{load_catalog, plan_queries, ExtractionState, ExtractorConfig};
use tracing_subscriber::EnvFilter;

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (config_path, describe_path, state_path) = match args.as_slice() {
        [config, describe] => (config, describe, None),
        [config, describe, state] => (config, describe, Some(state)),
        _ => {
            eprintln!("Usage: soql-plan <config.json> <describe.json> [state.json]");
            std::process::exit(2);
        }
    };

    let config = ExtractorConfig::from_path(config_path).unwrap_or_else(|e| {
        eprintln!("Error: failed to load config {config_path}: {e}");
        std::process::exit(1);
    });

    let catalog = load_catalog(describe_path).unwrap_or_else(|e| {
        eprintln!("Error: failed to load describe results {describe_path}: {e}");
        std::process::exit(1);
    });

    let state = match state_path {
        Some(path) => ExtractionState::from_path(path).unwrap_or_else(|e| {
            eprintln!("Error: failed to load state {path}: {e}");
            std::process::exit(1);
        }),
        None => ExtractionState::default(),
    };

    let plan = plan_queries(&config, &catalog, &state).unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(1);
    });

    for statement in plan.statements() {
        println!("{statement}");
    }

    match ExtractionState::now().to_json() {
        Ok(next_state) => {
            tracing::info!(state = %next_state, "state to store after a successful run");
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to serialize the next state");
        }
    }
}
