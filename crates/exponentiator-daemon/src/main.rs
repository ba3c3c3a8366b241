use std::sync::Arc;

use tokio::sync::{watch, Mutex};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use exponentiator::bootstrap::bootstrap_exponentiator;
use exponentiator::{Exponentiator, ExponentiatorConfig, ExponentiatorError, RunLoop};

/// One daemon cycle: check, then withdraw when a window is configured.
async fn run_cycle(
    config: &ExponentiatorConfig,
    app: &Mutex<Exponentiator>,
) -> Result<(), ExponentiatorError> {
    let mut app = app.lock().await;

    let status = app.execute_check(config.compound_pct).await?;
    tracing::info!(%status, "check finished");

    if let Some(hours) = config.withdraw_interval_hours {
        let status = app.execute_withdraw(config.compound_pct, hours).await?;
        tracing::info!(%status, "withdraw finished");
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match ExponentiatorConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("Invalid configuration: {e}");
            std::process::exit(1);
        }
    };

    // RPC outages are left to the run loop's backoff.
    let app = match bootstrap_exponentiator(&config) {
        Ok(app) => Arc::new(Mutex::new(app)),
        Err(e) => {
            tracing::error!("Invalid configuration: {e}");
            std::process::exit(1);
        }
    };

    tracing::info!(
        service = %config.service_name,
        interval_secs = config.sleep_duration.as_secs(),
        compound_pct = config.compound_pct,
        withdraw_interval_hours = ?config.withdraw_interval_hours,
        auto_compound = config.auto_compound,
        "Exponentiator daemon starting"
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Interrupt received, finishing current cycle");
            let _ = shutdown_tx.send(true);
        }
    });

    let config = Arc::new(config);
    let mut run_loop = RunLoop::new(config.sleep_duration);
    run_loop
        .run(
            move || {
                let config = config.clone();
                let app = app.clone();
                async move { run_cycle(&config, &app).await }
            },
            shutdown_rx,
        )
        .await;

    tracing::info!("Exponentiator daemon stopped");
}
