//! Equipment booking-window validation and transactional booking.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    QueryFilter, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::entities::equipment::{self, Entity as EquipmentEntity};
use crate::entities::scheduling_window::{self, Entity as SchedulingWindowEntity, WindowStatus};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};

/// Outcome of a booking-window validation. A conflict is a normal negative
/// result carrying a message, not an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleDecision {
    pub allowed: bool,
    pub reason: Option<String>,
}

impl ScheduleDecision {
    fn allowed() -> Self {
        Self {
            allowed: true,
            reason: None,
        }
    }

    fn blocked(reason: String) -> Self {
        Self {
            allowed: false,
            reason: Some(reason),
        }
    }
}

/// Service validating and creating equipment booking windows.
#[derive(Clone)]
pub struct SchedulingService {
    db: Arc<DatabaseConnection>,
    event_sender: Option<EventSender>,
}

impl SchedulingService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: Option<EventSender>) -> Self {
        Self { db, event_sender }
    }

    /// Checks whether the requested window conflicts with an active booking.
    ///
    /// Pure read-time check: it does not reserve the window, so a caller that
    /// intends to book should use [`validate_and_book`] instead of a separate
    /// validate-then-insert sequence.
    ///
    /// [`validate_and_book`]: SchedulingService::validate_and_book
    #[instrument(skip(self))]
    pub async fn validate(
        &self,
        equipment_id: Uuid,
        date_start: DateTime<Utc>,
        date_end: DateTime<Utc>,
    ) -> Result<ScheduleDecision, ServiceError> {
        let db = &*self.db;
        let equipment = Self::find_equipment(db, equipment_id).await?;
        Self::check_window(db, &equipment, date_start, date_end).await
    }

    /// Validates the window and inserts the booking inside one transaction,
    /// so two concurrent bookings over the same range cannot both succeed.
    ///
    /// Returns [`ServiceError::Conflict`] when the window is taken.
    #[instrument(skip(self))]
    pub async fn validate_and_book(
        &self,
        equipment_id: Uuid,
        date_start: DateTime<Utc>,
        date_end: DateTime<Utc>,
    ) -> Result<scheduling_window::Model, ServiceError> {
        let db = &*self.db;
        let txn = db.begin().await.map_err(ServiceError::db_error)?;

        let equipment = Self::find_equipment(&txn, equipment_id).await?;
        let decision = Self::check_window(&txn, &equipment, date_start, date_end).await?;

        if !decision.allowed {
            txn.rollback().await.map_err(ServiceError::db_error)?;
            return Err(ServiceError::Conflict(
                decision.reason.unwrap_or_else(|| "window unavailable".into()),
            ));
        }

        let window = scheduling_window::ActiveModel {
            equipment_id: Set(equipment_id),
            date_start: Set(date_start),
            date_end: Set(date_end),
            status: Set(WindowStatus::New.as_str().to_string()),
            ..Default::default()
        };

        let window = window.insert(&txn).await.map_err(ServiceError::db_error)?;
        txn.commit().await.map_err(ServiceError::db_error)?;

        if let Some(sender) = &self.event_sender {
            let _ = sender
                .send(Event::WindowBooked {
                    window_id: window.id,
                    equipment_id,
                    date_start,
                    date_end,
                })
                .await;
        }

        info!(window_id = %window.id, %equipment_id, "booking window created");
        Ok(window)
    }

    async fn find_equipment<C: ConnectionTrait>(
        conn: &C,
        equipment_id: Uuid,
    ) -> Result<equipment::Model, ServiceError> {
        EquipmentEntity::find_by_id(equipment_id)
            .one(conn)
            .await
            .map_err(ServiceError::db_error)?
            .ok_or_else(|| ServiceError::NotFound(format!("Equipment {equipment_id} not found")))
    }

    /// Closed-interval overlap test against active windows: touching
    /// endpoints count as a conflict, and only `NEW` windows block.
    async fn check_window<C: ConnectionTrait>(
        conn: &C,
        equipment: &equipment::Model,
        date_start: DateTime<Utc>,
        date_end: DateTime<Utc>,
    ) -> Result<ScheduleDecision, ServiceError> {
        if date_end < date_start {
            return Err(ServiceError::ValidationError(
                "Window end must not precede window start".to_string(),
            ));
        }

        let conflict = SchedulingWindowEntity::find()
            .filter(scheduling_window::Column::EquipmentId.eq(equipment.id))
            .filter(scheduling_window::Column::Status.eq(WindowStatus::New.as_str()))
            .filter(scheduling_window::Column::DateStart.lte(date_end))
            .filter(scheduling_window::Column::DateEnd.gte(date_start))
            .one(conn)
            .await
            .map_err(ServiceError::db_error)?;

        match conflict {
            Some(existing) => Ok(ScheduleDecision::blocked(format!(
                "Equipment '{}' is already booked from {} to {}",
                equipment.code,
                existing.date_start.format("%Y-%m-%d"),
                existing.date_end.format("%Y-%m-%d"),
            ))),
            None => Ok(ScheduleDecision::allowed()),
        }
    }
}
