use tracing::debug;

use crate::{Data, Error};

/// Ask the serving monitor first; without one, report this process.
pub async fn status(data: &Data) -> Result<(), Error> {
    let report = match data.control.status().await? {
        Some(report) => report,
        None => {
            debug!(addr = %data.control_addr, "no monitor serving, reporting local state");
            data.status().await
        }
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
