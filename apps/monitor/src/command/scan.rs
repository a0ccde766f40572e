use stock::{AlertResult, ScanOutcome};
use tracing::info;

use crate::{Data, Error};

/// Scan through the serving monitor so its snapshot and status see the
/// result; scan in this process when nothing is serving.
pub async fn scan(data: &Data) -> Result<(), Error> {
    let outcome = match data.control.scan().await? {
        Some(outcome) => outcome,
        None => {
            let market = data.market()?;
            let config = data.config_store.current().await;
            info!(stocks = config.stocks.len(), "manual scan in this process");
            market.scanner.scan(&config).await
        }
    };

    for result in &outcome.results {
        println!("{}", result_line(result));
    }
    if let Some(line) = price_line(&outcome) {
        println!("{line}");
    }
    println!(
        "Scan complete: {} alerts from {} stocks",
        outcome.alerts.len(),
        outcome.results.len()
    );

    Ok(())
}

fn result_line(r: &AlertResult) -> String {
    let rsi = r
        .rsi
        .map(|v| format!("{v:.2}"))
        .unwrap_or_else(|| "n/a".to_string());
    format!(
        "[{:<5}] {}: ${:.2} ({:.2}% from ${:.2} high on {}) RSI {}",
        r.status_label(),
        r.symbol,
        r.current_price,
        r.pct_from_high,
        r.recent_high,
        r.date_of_high.format("%Y-%m-%d"),
        rsi
    )
}

fn price_line(outcome: &ScanOutcome) -> Option<String> {
    if outcome.results.is_empty() {
        return None;
    }
    let prices: Vec<String> = outcome
        .results
        .iter()
        .map(|r| format!("{}: ${:.2}", r.symbol, r.current_price))
        .collect();
    Some(format!("Current prices: {}", prices.join(", ")))
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn result(symbol: &str, price: f64, is_alert: bool, rsi: Option<f64>) -> AlertResult {
        AlertResult {
            symbol: symbol.to_string(),
            current_price: price,
            recent_high: 100.0,
            pct_from_high: price - 100.0,
            is_alert,
            date_of_high: NaiveDate::from_ymd_opt(2024, 5, 7).unwrap(),
            rsi,
        }
    }

    #[test]
    fn formats_result_line() {
        assert_eq!(
            result_line(&result("AAA", 90.0, true, Some(28.5))),
            "[ALERT] AAA: $90.00 (-10.00% from $100.00 high on 2024-05-07) RSI 28.50"
        );
        assert_eq!(
            result_line(&result("BBB", 99.0, false, None)),
            "[OK   ] BBB: $99.00 (-1.00% from $100.00 high on 2024-05-07) RSI n/a"
        );
    }

    #[test]
    fn price_line_lists_results_in_order() {
        let outcome = ScanOutcome {
            alerts: Vec::new(),
            results: vec![result("AAA", 90.0, true, None), result("BBB", 99.5, false, None)],
        };
        assert_eq!(
            price_line(&outcome).as_deref(),
            Some("Current prices: AAA: $90.00, BBB: $99.50")
        );
        assert_eq!(price_line(&ScanOutcome::default()), None);
    }
}
