//! Alert Relay
//!
//! Wires the monitoring API, the Telegram notifier and the alert delivery
//! loop into one long-running process.

use alert_delivery::DeliveryLoop;
use anyhow::{anyhow, Context};
use metrics_exporter_prometheus::PrometheusBuilder;
use monitoring_api::MonitoringApi;
use telegram_notifier::TelegramNotifier;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod settings;

pub use settings::{
    AppConfig, LoadError, LoggingConfig, MetricsConfig, CONFIG_PATH_ENV, DEFAULT_CONFIG_PATH,
};

/// Initialize logging. `RUST_LOG` takes precedence over the configured level.
pub fn init_logging(config: &LoggingConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .with_context(|| format!("invalid log level {:?}", config.level))?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    let result = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    result.map_err(|e| anyhow!("failed to set tracing subscriber: {e}"))
}

/// Install the Prometheus exporter if a listen address is configured
pub fn install_metrics(config: &MetricsConfig) -> anyhow::Result<()> {
    if let Some(addr) = config.listen_addr {
        PrometheusBuilder::new()
            .with_http_listener(addr)
            .install()
            .context("failed to install Prometheus exporter")?;
        info!("Serving metrics on http://{}/metrics", addr);
    }
    Ok(())
}

/// Run the relay until SIGINT/SIGTERM
pub async fn run(config: AppConfig) -> anyhow::Result<()> {
    install_metrics(&config.metrics)?;

    let api = MonitoringApi::new(&config.api).context("failed to create monitoring API client")?;
    let notifier =
        TelegramNotifier::new(&config.telegram).context("failed to create Telegram client")?;

    info!("Testing Bot API token...");
    let username = notifier
        .get_me()
        .await
        .context("Telegram token check failed")?;
    info!("Bot: https://t.me/{}", username);

    let mut delivery_loop = DeliveryLoop::new(api.clone(), api, notifier, config.alerts)?;
    let mut task = tokio::spawn(async move { delivery_loop.run().await });
    let abort = task.abort_handle();

    tokio::select! {
        _ = shutdown_signal() => {
            info!("Shutting down alert delivery");
            abort.abort();
            Ok(())
        }
        result = &mut task => {
            // run() only comes back if the task panicked
            Err(anyhow!("alert delivery task exited: {:?}", result.err()))
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for ctrl-c: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
