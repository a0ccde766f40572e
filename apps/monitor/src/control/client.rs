use std::net::SocketAddr;
use std::time::Duration;

use anyhow::bail;
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use stock::{ScanOutcome, StatusReport};
use tracing::debug;

use super::Toggle;
use crate::Error;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(2);

/// Talks to the control routes of a running `monitor serve`.
///
/// Every call returns `Ok(None)` when nothing is listening at the address.
pub struct ControlClient {
    client: Client,
    base: String,
}

impl ControlClient {
    pub fn new(addr: SocketAddr) -> Result<Self, Error> {
        let client = Client::builder().connect_timeout(CONNECT_TIMEOUT).build()?;
        Ok(Self {
            client,
            base: format!("http://{addr}/api"),
        })
    }

    pub async fn status(&self) -> Result<Option<StatusReport>, Error> {
        self.call(Method::GET, "status").await
    }

    pub async fn start(&self) -> Result<Option<Toggle>, Error> {
        self.call(Method::POST, "start_monitoring").await
    }

    pub async fn stop(&self) -> Result<Option<Toggle>, Error> {
        self.call(Method::POST, "stop_monitoring").await
    }

    pub async fn scan(&self) -> Result<Option<ScanOutcome>, Error> {
        self.call(Method::POST, "scan_now").await
    }

    async fn call<T: DeserializeOwned>(&self, method: Method, route: &str) -> Result<Option<T>, Error> {
        let url = format!("{}/{route}", self.base);

        let res = match self.client.request(method, &url).send().await {
            Ok(res) => res,
            Err(e) if e.is_connect() => {
                debug!(%url, "no monitor listening");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            bail!("{url} answered {status}: {body}");
        }

        Ok(Some(res.json().await?))
    }
}
