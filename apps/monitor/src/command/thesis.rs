use stock::ThesisDraft;
use tracing::info;

use crate::cli::{ThesisAction, ThesisArgs};
use crate::{Data, Error};

pub async fn thesis(data: &Data, action: ThesisAction) -> Result<(), Error> {
    let store = &data.config_store;

    match action {
        ThesisAction::List => {
            let entries = store.theses().await;
            if entries.is_empty() {
                println!("No thesis entries.");
            }
            for (i, e) in entries.iter().enumerate() {
                println!("[{i}] {} ({})", e.ticker, e.created_at);
                println!("    thesis:  {}", e.thesis);
                println!("    trigger: {}", e.trigger);
            }
        }
        ThesisAction::Add(args) => {
            let entry = store.add_thesis(draft(args)).await?;
            info!(ticker = %entry.ticker, "thesis added");
            println!("Thesis saved");
        }
        ThesisAction::Update { index, entry } => {
            let entry = store.update_thesis(index, draft(entry)).await?;
            info!(index, ticker = %entry.ticker, "thesis updated");
            println!("Thesis updated");
        }
        ThesisAction::Delete { index } => {
            let removed = store.delete_thesis(index).await?;
            info!(index, ticker = %removed.ticker, "thesis deleted");
            println!("Removed thesis for {}", removed.ticker);
        }
    }

    Ok(())
}

fn draft(args: ThesisArgs) -> ThesisDraft {
    ThesisDraft::new(args.ticker, args.thesis, args.trigger)
}
