//! Generates the orders fixture file.
//!
//! Settings come from CLI flags, `ORDER_FIXTURES_*` environment variables or
//! a configuration file; see `OrderFixturesSettings`. Set `RUST_LOG=info`
//! to see the stage summaries.

use std::env;
use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;

use mockable::DefaultClock;
use order_fixtures::{OrderFixturesSettings, PipelineOutcome, run_pipeline};
use ortho_config::OrthoConfig;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{error, warn};
use tracing_subscriber::{EnvFilter, fmt};

fn main() -> ExitCode {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    match run() {
        Ok(outcome) => {
            write_success(&outcome);
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(error = %err, "order fixture generation failed");
            if let Err(write_err) = writeln!(io::stderr().lock(), "{err}") {
                drop(write_err);
            }
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<PipelineOutcome, Box<dyn std::error::Error>> {
    let settings = OrderFixturesSettings::load_from_iter(env::args_os())
        .map_err(|err| io::Error::other(format!("load settings: {err}")))?;
    let mut rng = settings
        .seed
        .map_or_else(ChaCha8Rng::from_os_rng, ChaCha8Rng::seed_from_u64);
    let outcome = run_pipeline(&settings, Arc::new(DefaultClock), &mut rng)?;
    Ok(outcome)
}

fn write_success(outcome: &PipelineOutcome) {
    let message = format!(
        "Wrote {} orders for {} users to {}",
        outcome.order_count, outcome.user_count, outcome.output_path
    );
    if let Err(err) = writeln!(io::stdout().lock(), "{message}") {
        drop(err);
    }
}
