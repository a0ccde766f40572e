use anyhow::anyhow;
use tracing::info;

use crate::control::Toggle;
use crate::{Data, Error};

pub async fn start(data: &Data) -> Result<(), Error> {
    let toggle = data.control.start().await?.ok_or_else(|| not_serving(data))?;
    info!(changed = toggle.changed, "start sent");
    println!("{}", start_message(toggle));
    Ok(())
}

pub async fn stop(data: &Data) -> Result<(), Error> {
    let toggle = data.control.stop().await?.ok_or_else(|| not_serving(data))?;
    info!(changed = toggle.changed, "stop sent");
    println!("{}", stop_message(toggle));
    Ok(())
}

fn not_serving(data: &Data) -> Error {
    anyhow!(
        "no monitor is serving at {}; run `monitor serve` first",
        data.control_addr
    )
}

fn start_message(toggle: Toggle) -> &'static str {
    if toggle.changed {
        "Monitoring started"
    } else {
        "Monitoring is already running"
    }
}

fn stop_message(toggle: Toggle) -> &'static str {
    if toggle.changed {
        "Monitoring stopped"
    } else {
        "Monitoring was not running"
    }
}
