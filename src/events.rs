use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{error, info};
use uuid::Uuid;

/// Events emitted by the synchronization and scheduling services after a
/// successful write.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Event {
    EquipmentSynced {
        fetched: u64,
        inserted: u64,
        updated: u64,
        timestamp: DateTime<Utc>,
    },
    AssembliesRecorded {
        entry_request_id: Uuid,
        count: u64,
        timestamp: DateTime<Utc>,
    },
    ComponentsRecorded {
        entry_request_id: Uuid,
        count: u64,
        timestamp: DateTime<Utc>,
    },
    WindowBooked {
        window_id: Uuid,
        equipment_id: Uuid,
        date_start: DateTime<Utc>,
        date_end: DateTime<Utc>,
    },
}

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    /// Creates a new EventSender
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }
}

/// Drains the event channel, logging each event. Spawn as a background task
/// next to the services.
pub async fn process_events(mut receiver: mpsc::Receiver<Event>) {
    while let Some(event) = receiver.recv().await {
        match serde_json::to_string(&event) {
            Ok(payload) => info!(event = %payload, "event processed"),
            Err(e) => error!(error = %e, "failed to serialize event"),
        }
    }
}
