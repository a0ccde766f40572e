use std::sync::Arc;

use tracing::{error, info, instrument};

use crate::control;
use crate::{Data, Error};

#[instrument(name = "serve", skip_all)]
pub async fn serve(data: Arc<Data>) -> Result<(), Error> {
    let market = data.market()?;
    let config = data.config_store.current().await;

    info!(
        stocks = config.stocks.len(),
        interval_minutes = config.scan_interval_minutes,
        threshold = config.alert_threshold,
        "starting monitor"
    );

    if !market.scheduler.start().await {
        info!("monitoring is already running");
    }

    let (addr, server) = warp::serve(control::routes(Arc::clone(&data)))
        .try_bind_with_graceful_shutdown(data.control_addr, async {
            if let Err(e) = shutdown_signal().await {
                error!(error = ?e, "signal handler failed, shutting down");
            }
        })?;
    info!(%addr, "control API listening");

    server.await;

    market.scheduler.stop().await;
    info!("Shutdown complete.");
    Ok(())
}

async fn shutdown_signal() -> Result<(), Error> {
    #[cfg(unix)]
    {
        use tokio::{
            select,
            signal::unix::{SignalKind, signal},
        };
        let mut sigterm = signal(SignalKind::terminate())?;
        let mut sigint = signal(SignalKind::interrupt())?;
        select! {
            _ = sigterm.recv() => {},
            _ = sigint.recv()  => {},
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await?;
    }

    Ok(())
}
