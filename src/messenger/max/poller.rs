use std::{sync::Arc, time::Duration};

use crate::runtime::DeliveryOrchestrator;

use super::{model::Update, MaxClient};

const ERROR_BACKOFF: Duration = Duration::from_secs(5);

/// Long-polls for updates until Ctrl+C, handing every event to its own task so a
/// slow download never blocks other users.
pub async fn run_polling(client: MaxClient, orchestrator: Arc<DeliveryOrchestrator>) {
    info!("Starting MAX long polling");

    let mut marker: Option<i64> = None;

    loop {
        let batch = tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Received Ctrl+C, stopping MAX polling");
                break;
            }
            batch = client.get_updates(marker) => batch,
        };

        let list = match batch {
            Ok(list) => list,
            Err(e) => {
                error!("Failed to fetch MAX updates: {}", e);
                tokio::time::sleep(ERROR_BACKOFF).await;
                continue;
            }
        };

        if list.marker.is_some() {
            marker = list.marker;
        }

        for event in list.updates.into_iter().filter_map(Update::into_event) {
            debug!("MAX event from {}", event.user());
            let orchestrator = orchestrator.clone();
            tokio::spawn(async move {
                orchestrator.handle_event(event).await;
            });
        }
    }
}
