use std::time::Duration;

use clap::Parser;
use numflow::elements::{CancellationSignal, SeededRandomness};
use numflow::flow::{run_variant, TextOutput};
use numflow::metrics::register_numflow_metrics;
use numflow::settings::{get_settings, CliOptions};
use numflow::tracing::{get_subscriber, init_subscriber};
use tokio::task::JoinHandle;
use tracing::Instrument;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let options = CliOptions::parse();

    let subscriber = get_subscriber("numflow", "warn");
    init_subscriber(subscriber);

    let main_span = tracing::info_span!("main");
    run(options).instrument(main_span).await
}

async fn run(options: CliOptions) -> anyhow::Result<()> {
    let settings = get_settings(&options)?;
    let request = settings.generation_request()?;
    tracing::info!(?settings, ?request, "starting numflow runs");

    let registry = prometheus::Registry::new();
    register_numflow_metrics(&registry)?;

    let shutdown = CancellationSignal::new();
    let ctrl_c = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("shutdown requested - cancelling current run");
            ctrl_c.cancel();
        }
    });

    let output = TextOutput::stdout();
    for variant in settings.variants.iter().copied() {
        if shutdown.is_cancelled() {
            tracing::warn!(%variant, "skipping variant after shutdown request");
            continue;
        }

        let signal = CancellationSignal::new();
        let watchdog = spawn_watchdog(signal.clone(), shutdown.clone(), settings.timeout());
        let randomness = SeededRandomness::from_seed_option(settings.generation.seed);

        let outcome = run_variant(variant, request, randomness, signal, output.clone()).await;
        watchdog.abort();

        let outcome = outcome?;
        output.write_line_break()?;
        tracing::info!(%variant, ?outcome, "variant completed");
    }

    for family in registry.gather() {
        let total: f64 = family.get_metric().iter().map(|m| m.get_counter().get_value()).sum();
        tracing::info!(metric=%family.get_name(), %total, "numflow metric");
    }

    Ok(())
}

/// Cancels the run once its timeout elapses or a shutdown is requested, whichever comes first.
fn spawn_watchdog(signal: CancellationSignal, shutdown: CancellationSignal, timeout: Option<Duration>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let timed_out = async move {
            match timeout {
                Some(timeout) => tokio::time::sleep(timeout).await,
                None => futures::future::pending::<()>().await,
            }
        };

        tokio::select! {
            _ = timed_out => tracing::info!(?timeout, "run timed out - cancelling"),
            _ = shutdown.cancelled() => tracing::info!("shutdown requested - cancelling run"),
        }

        signal.cancel();
    })
}
