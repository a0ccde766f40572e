//! Local HTTP control surface served by `monitor serve`.
//!
//! Routes share the serving process's [`Data`], so start/stop, manual scans
//! and status all act on the one scheduler and snapshot that process owns.

mod client;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;
use stock::SchedulerState;
use tracing::{info, warn};
use warp::http::StatusCode;
use warp::reply::{Response, with_status};
use warp::{Filter, Rejection, Reply};

pub use client::ControlClient;

use crate::command::prices::price_map;
use crate::{Data, Error};

/// Answer to a start or stop request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toggle {
    /// False when the scheduler was already in the requested state.
    pub changed: bool,
    pub monitoring: bool,
}

pub fn routes(data: Arc<Data>) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let with_data = warp::any().map(move || Arc::clone(&data));

    let status_route = warp::path!("api" / "status")
        .and(warp::get())
        .and(with_data.clone())
        .then(report_status);
    let start_route = warp::path!("api" / "start_monitoring")
        .and(warp::post())
        .and(with_data.clone())
        .then(start_monitoring);
    let stop_route = warp::path!("api" / "stop_monitoring")
        .and(warp::post())
        .and(with_data.clone())
        .then(stop_monitoring);
    let scan_route = warp::path!("api" / "scan_now")
        .and(warp::post())
        .and(with_data.clone())
        .then(scan_now);
    let prices_route = warp::path!("api" / "stock_prices")
        .and(warp::get())
        .and(with_data)
        .then(stock_prices);

    status_route
        .or(start_route)
        .or(stop_route)
        .or(scan_route)
        .or(prices_route)
}

async fn report_status(data: Arc<Data>) -> Response {
    warp::reply::json(&data.status().await).into_response()
}

async fn start_monitoring(data: Arc<Data>) -> Response {
    let market = match data.market() {
        Ok(market) => market,
        Err(e) => return unavailable(e),
    };

    let changed = market.scheduler.start().await;
    info!(changed, "start requested");
    warp::reply::json(&Toggle {
        changed,
        monitoring: true,
    })
    .into_response()
}

async fn stop_monitoring(data: Arc<Data>) -> Response {
    let market = match data.market() {
        Ok(market) => market,
        Err(e) => return unavailable(e),
    };

    let changed = market.scheduler.state().await == SchedulerState::Running;
    market.scheduler.stop().await;
    info!(changed, "stop requested");
    warp::reply::json(&Toggle {
        changed,
        monitoring: false,
    })
    .into_response()
}

async fn scan_now(data: Arc<Data>) -> Response {
    let market = match data.market() {
        Ok(market) => market,
        Err(e) => return unavailable(e),
    };

    if let Err(e) = data.config_store.reload().await {
        warn!(error = ?e, "config reload failed, scanning last good copy");
    }
    let config = data.config_store.current().await;

    info!(stocks = config.stocks.len(), "manual scan requested");
    let outcome = market.scanner.scan(&config).await;
    warp::reply::json(&outcome).into_response()
}

async fn stock_prices(data: Arc<Data>) -> Response {
    if let Err(e) = data.config_store.reload().await {
        warn!(error = ?e, "config reload failed, using last good copy");
    }
    match price_map(&data).await {
        Ok(prices) => warp::reply::json(&prices).into_response(),
        Err(e) => unavailable(e),
    }
}

fn unavailable(e: Error) -> Response {
    with_status(
        warp::reply::json(&json!({ "error": e.to_string() })),
        StatusCode::SERVICE_UNAVAILABLE,
    )
    .into_response()
}
