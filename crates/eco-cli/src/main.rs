//! Command-line driver for the fox/rabbit field simulation.

#[macro_use]
mod telemetry;

use anyhow::{Context, Result};
use eco_core::{SimulationConfig, Species};
use eco_world::Simulator;
use tokio::signal;
use tokio::time::{sleep, Duration};
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Names a JSON configuration file; defaults are used when unset
const CONFIG_ENV: &str = "ECOSIM_CONFIG";

#[tokio::main]
async fn main() -> Result<()> {
    let config = load_config()?;

    telemetry::init_telemetry(config.run.otel_endpoint.as_deref())?;

    info!(
        rows = config.field.rows,
        cols = config.field.cols,
        seed = config.random.seed,
        steps = config.run.steps,
        "Starting simulation"
    );

    let token = CancellationToken::new();
    let shutdown = token.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        shutdown.cancel();
    });

    let mut sim = Simulator::new(config.clone())?;
    let completed = drive(&mut sim, &config, &token).await;

    let summary = sim.population_summary();
    let viable = sim.is_viable();
    info!(
        steps = sim.step(),
        completed = completed,
        viable = viable,
        cancelled = token.is_cancelled(),
        "Simulation finished: {}",
        summary
    );
    record_counter!("steps_completed", completed);
    record_histogram!("run_length", sim.step());

    let report = serde_json::json!({
        "step": sim.step(),
        "viable": viable,
        "population": summary
            .counts
            .iter()
            .map(|(species, count)| (species.label(), *count))
            .collect::<std::collections::BTreeMap<_, _>>(),
    });
    println!("{}", serde_json::to_string_pretty(&report)?);

    telemetry::shutdown_telemetry();

    Ok(())
}

fn load_config() -> Result<SimulationConfig> {
    match std::env::var(CONFIG_ENV) {
        Ok(path) => SimulationConfig::from_json_file(&path)
            .with_context(|| format!("failed to load configuration from {path}")),
        Err(_) => Ok(SimulationConfig::default()),
    }
}

/// Run up to `run.steps` ticks, pausing between them and stopping early on
/// cancellation or once only one species is left. Returns ticks run.
async fn drive(sim: &mut Simulator, config: &SimulationConfig, token: &CancellationToken) -> u64 {
    let delay = Duration::from_millis(config.run.step_delay_ms);
    let report_interval = config.run.report_interval;
    let mut completed = 0;

    while completed < config.run.steps {
        if sim.simulate_while(1, |_| !token.is_cancelled()) == 0 {
            break;
        }
        completed += 1;

        if report_interval > 0 && sim.step() % report_interval == 0 {
            report(sim);
        }

        if !delay.is_zero() {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = sleep(delay) => {}
            }
        }
    }

    completed
}

fn report(sim: &mut Simulator) {
    let step = sim.step();
    let summary = sim.population_summary();
    info!(
        step = step,
        rabbits = summary.count(Species::Rabbit),
        foxes = summary.count(Species::Fox),
        "Step {}: {}",
        step,
        summary
    );
    for species in Species::all() {
        record_gauge!(
            "population",
            summary.count(species),
            species = species.label(),
            step = step
        );
    }
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        tracing::warn!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
