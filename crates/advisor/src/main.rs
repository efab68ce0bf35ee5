use std::process::ExitCode;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use vbank_advisor::config::AdvisorConfig;
use vbank_advisor::request::Request;
use vbank_core::catalog::state::CatalogState;
use vbank_core::engine::BundleAdvisor;

fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vbank_advisor=info,vbank_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("Request failed: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> anyhow::Result<()> {
    let config = AdvisorConfig::from_env();
    let request = Request::parse(std::env::args().skip(1))?;

    let mut state = CatalogState::new(config.catalog.clone());
    let catalog = state
        .load()
        .with_context(|| format!("Failed to load catalog from {:?}", config.catalog))?;
    let advisor = BundleAdvisor::new(&catalog);

    tracing::debug!(?request, verbosity = ?config.verbosity, "Handling request");
    let response = request.respond(&advisor, config.verbosity)?;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
