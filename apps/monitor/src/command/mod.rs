pub(crate) mod prices;
mod scan;
mod serve;
mod settings;
mod status;
mod stocks;
mod thesis;
mod toggle;

use std::sync::Arc;

use crate::cli::Commands;
use crate::{Data, Error};

pub async fn run(command: Commands, data: Arc<Data>) -> Result<(), Error> {
    match command {
        Commands::Serve => serve::serve(data).await,
        Commands::Start => toggle::start(&data).await,
        Commands::Stop => toggle::stop(&data).await,
        Commands::Scan => scan::scan(&data).await,
        Commands::Prices => prices::prices(&data).await,
        Commands::Status => status::status(&data).await,
        Commands::Stocks { action } => stocks::stocks(&data, action).await,
        Commands::Settings { action } => settings::settings(&data, action).await,
        Commands::Thesis { action } => thesis::thesis(&data, action).await,
    }
}
