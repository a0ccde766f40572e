use serde_json::{Map, Value, json};
use stock::quote::lookup_all;
use tracing::info;

use crate::{Data, Error};

pub async fn prices(data: &Data) -> Result<(), Error> {
    let out = price_map(data).await?;
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

/// Quotes keyed by symbol, or `{"error": ...}` when nothing is watched.
pub(crate) async fn price_map(data: &Data) -> Result<Value, Error> {
    let market = data.market()?;
    let stocks = data.config_store.list().await;

    if stocks.is_empty() {
        return Ok(json!({ "error": "No stocks configured" }));
    }

    info!(stocks = stocks.len(), "fetching prices");
    let quotes = lookup_all(market.provider.as_ref(), &stocks, data.fetch_timeout).await;

    let mut out = Map::new();
    for (symbol, quote) in quotes {
        out.insert(symbol, serde_json::to_value(quote)?);
    }
    Ok(Value::Object(out))
}
