use stock::config::parse_symbols;
use tracing::{debug, info, warn};

use crate::cli::StocksAction;
use crate::{Data, Error};

pub async fn stocks(data: &Data, action: StocksAction) -> Result<(), Error> {
    let store = &data.config_store;

    match action {
        StocksAction::Set { symbols } => {
            let parsed = parse_symbols(&symbols);
            let count = store.set_stocks(parsed).await?;
            info!(count, "watchlist replaced");
            println!("Updated portfolio with {count} stocks");
        }
        StocksAction::Add { symbols } => {
            let parsed = parse_symbols(&symbols);
            if parsed.is_empty() {
                warn!(raw_input = %symbols, "no valid symbols");
                println!("No valid symbols provided.");
                return Ok(());
            }

            let mut added: Vec<String> = Vec::new();
            let mut already: Vec<String> = Vec::new();

            for sym in parsed {
                if store.add(&sym).await? {
                    debug!(symbol = %sym, "added");
                    added.push(sym);
                } else {
                    debug!(symbol = %sym, "already watched");
                    already.push(sym);
                }
            }

            info!(added = added.len(), already = already.len(), "add completed");

            if !added.is_empty() {
                println!("Now watching: {}", added.join(", "));
            }
            if !already.is_empty() {
                println!("Already watching: {}", already.join(", "));
            }
        }
        StocksAction::Remove { symbols } => {
            let mut removed: Vec<String> = Vec::new();
            let mut missing: Vec<String> = Vec::new();

            for sym in parse_symbols(&symbols) {
                if store.remove(&sym).await? {
                    removed.push(sym);
                } else {
                    missing.push(sym);
                }
            }

            info!(removed = removed.len(), missing = missing.len(), "remove completed");

            if !removed.is_empty() {
                println!("Removed: {}", removed.join(", "));
            }
            if !missing.is_empty() {
                println!("Not in watchlist: {}", missing.join(", "));
            }
        }
        StocksAction::List => {
            let list = store.list().await;
            if list.is_empty() {
                println!("Watchlist is empty.");
            } else {
                for sym in list {
                    println!("{sym}");
                }
            }
        }
    }

    Ok(())
}
