use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::config::MonitorConfig;
use crate::scanner::ScanSnapshot;
use crate::scheduler::SchedulerState;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusReport {
    pub monitoring: bool,
    pub last_scan_time: Option<DateTime<Local>>,
    pub stock_count: usize,
    pub alert_count: usize,
}

pub fn status(
    state: SchedulerState,
    snapshot: Option<&ScanSnapshot>,
    config: &MonitorConfig,
) -> StatusReport {
    StatusReport {
        monitoring: state == SchedulerState::Running,
        last_scan_time: snapshot.map(|s| s.timestamp),
        stock_count: config.stocks.len(),
        alert_count: snapshot.map_or(0, |s| s.alerts.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alert::evaluate;
    use crate::indicators::RSI_PERIOD;
    use crate::scanner::tests::{dropping, steady};

    #[test]
    fn before_first_scan() {
        let config = MonitorConfig {
            stocks: vec!["AAA".into(), "BBB".into()],
            ..Default::default()
        };
        let report = status(SchedulerState::Stopped, None, &config);

        assert!(!report.monitoring);
        assert_eq!(report.last_scan_time, None);
        assert_eq!(report.stock_count, 2);
        assert_eq!(report.alert_count, 0);
    }

    #[test]
    fn counts_alerts_from_snapshot() {
        let alerting = evaluate("AAA", &dropping(), 0.05, RSI_PERIOD).unwrap();
        let quiet = evaluate("BBB", &steady(), 0.05, RSI_PERIOD).unwrap();
        let snapshot = ScanSnapshot {
            results: vec![alerting.clone(), quiet],
            alerts: vec![alerting],
            timestamp: Local::now(),
        };
        let config = MonitorConfig {
            stocks: vec!["AAA".into(), "BBB".into(), "CCC".into()],
            ..Default::default()
        };

        let report = status(SchedulerState::Running, Some(&snapshot), &config);

        assert!(report.monitoring);
        assert_eq!(report.last_scan_time, Some(snapshot.timestamp));
        assert_eq!(report.stock_count, 3);
        assert_eq!(report.alert_count, 1);
    }
}
