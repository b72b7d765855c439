//! Equipment master-data synchronization from BC.
//!
//! A full pass fetches the whole remote collection and applies an upsert per
//! row, matching local rows by the remote system id. Matched rows get every
//! mutable field overwritten (last-write-wins per pass) with the local
//! primary key untouched. A persistence failure aborts the pass; rows
//! already written stay written.

use std::sync::Arc;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::bc::client::BcClient;
use crate::bc::endpoints::EQUIPMENT;
use crate::bc::filter::Filter;
use crate::bc::schema::EquipmentRow;
use crate::entities::equipment::{self, Entity as EquipmentEntity};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};

/// Result of one synchronization pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncSummary {
    pub fetched: u64,
    pub inserted: u64,
    pub updated: u64,
    pub skipped: u64,
}

/// Service for the equipment master-data pass.
#[derive(Clone)]
pub struct EquipmentSyncService {
    client: Arc<BcClient>,
    db: Arc<DatabaseConnection>,
    event_sender: Option<EventSender>,
}

impl EquipmentSyncService {
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

    /// Runs a full synchronization pass over the remote equipment collection.
    #[instrument(skip(self))]
    pub async fn sync_all(&self) -> Result<SyncSummary, ServiceError> {
        let rows: Vec<EquipmentRow> = self
            .client
            .fetch_collection(EQUIPMENT, &Filter::new())
            .await?;

        let mut summary = SyncSummary {
            fetched: rows.len() as u64,
            inserted: 0,
            updated: 0,
            skipped: 0,
        };

        for row in rows {
            if row.system_id.trim().is_empty() {
                warn!(code = %row.no, "equipment row without system id skipped");
                summary.skipped += 1;
                continue;
            }

            match self.upsert(&row).await? {
                UpsertOutcome::Inserted => summary.inserted += 1,
                UpsertOutcome::Updated => summary.updated += 1,
            }
        }

        if let Some(sender) = &self.event_sender {
            let _ = sender
                .send(Event::EquipmentSynced {
                    fetched: summary.fetched,
                    inserted: summary.inserted,
                    updated: summary.updated,
                    timestamp: Utc::now(),
                })
                .await;
        }

        info!(
            fetched = summary.fetched,
            inserted = summary.inserted,
            updated = summary.updated,
            skipped = summary.skipped,
            "equipment synchronization pass complete"
        );

        Ok(summary)
    }

    async fn upsert(&self, row: &EquipmentRow) -> Result<UpsertOutcome, ServiceError> {
        let db = &*self.db;

        let existing = EquipmentEntity::find()
            .filter(equipment::Column::SystemId.eq(row.system_id.as_str()))
            .one(db)
            .await
            .map_err(ServiceError::db_error)?;

        match existing {
            Some(model) => {
                let mut active: equipment::ActiveModel = model.into();
                active.code = Set(row.no.clone());
                active.branch = Set(row.branch_code.clone());
                active.status = Set(row.status.clone());
                active.loan_date = Set(row.loan_date);
                active.return_date = Set(row.return_date);
                active.init_date = Set(row.init_date);
                active.end_date = Set(row.end_date);

                active.update(db).await.map_err(ServiceError::db_error)?;
                Ok(UpsertOutcome::Updated)
            }
            None => {
                let model = equipment::ActiveModel {
                    code: Set(row.no.clone()),
                    branch: Set(row.branch_code.clone()),
                    status: Set(row.status.clone()),
                    loan_date: Set(row.loan_date),
                    return_date: Set(row.return_date),
                    init_date: Set(row.init_date),
                    end_date: Set(row.end_date),
                    system_id: Set(row.system_id.clone()),
                    ..Default::default()
                };

                model.insert(db).await.map_err(ServiceError::db_error)?;
                Ok(UpsertOutcome::Inserted)
            }
        }
    }
}

enum UpsertOutcome {
    Inserted,
    Updated,
}
