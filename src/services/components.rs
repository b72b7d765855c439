//! Component inventory lines: lenient fetch, explicit persistence.

use std::sync::Arc;

use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::bc::client::BcClient;
use crate::bc::endpoints::COMPONENTS;
use crate::bc::filter::Filter;
use crate::bc::normalize::{normalize_component, NormalizedComponent};
use crate::bc::schema::ComponentRow;
use crate::entities::entry_request_component;
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};

/// Service for component (non-lot, non-assembly) inventory lines.
#[derive(Clone)]
pub struct ComponentService {
    client: Arc<BcClient>,
    db: Arc<DatabaseConnection>,
    event_sender: Option<EventSender>,
}

impl ComponentService {
    pub fn new(
        client: Arc<BcClient>,
        db: Arc<DatabaseConnection>,
        event_sender: Option<EventSender>,
    ) -> Self {
        Self {
            client,
            db,
            event_sender,
        }
    }

    /// Fetches component lines, optionally scoped to one warehouse.
    ///
    /// Lenient by design: a fetch failure logs a warning and yields an empty
    /// collection so a missing page never blocks order processing.
    #[instrument(skip(self))]
    pub async fn fetch_components(&self, warehouse: Option<&str>) -> Vec<NormalizedComponent> {
        let mut filter = Filter::new();
        if let Some(warehouse) = warehouse {
            if !warehouse.trim().is_empty() {
                filter = filter.eq("locationCode", warehouse.trim());
            }
        }

        match self
            .client
            .fetch_collection::<ComponentRow>(COMPONENTS, &filter)
            .await
        {
            Ok(rows) => rows.iter().map(normalize_component).collect(),
            Err(err) => {
                warn!(error = %err, "component fetch failed");
                Vec::new()
            }
        }
    }

    /// Persists fetched component lines against an order. Explicit call;
    /// rows are never written as a side effect of a fetch.
    #[instrument(skip(self, rows), fields(count = rows.len()))]
    pub async fn sync_components(
        &self,
        entry_request_id: Uuid,
        rows: Vec<NormalizedComponent>,
    ) -> Result<u64, ServiceError> {
        let db = &*self.db;
        let mut written = 0u64;

        for row in rows {
            let model = entry_request_component::ActiveModel {
                item_code: Set(row.item_code),
                item_name: Set(row.item_name),
                warehouse: Set(row.warehouse),
                available_quantity: Set(row.available_quantity),
                unit_price: Set(row.unit_price),
                system_id: Set(row.system_id),
                entry_request_id: Set(entry_request_id),
                ..Default::default()
            };

            model.insert(db).await.map_err(ServiceError::db_error)?;
            written += 1;
        }

        if let Some(sender) = &self.event_sender {
            let _ = sender
                .send(Event::ComponentsRecorded {
                    entry_request_id,
                    count: written,
                    timestamp: Utc::now(),
                })
                .await;
        }

        info!(%entry_request_id, written, "recorded component lines");
        Ok(written)
    }
}
