//! Booking-window conflict detection and transactional booking.

mod common;

use std::sync::Arc;

use assert_matches::assert_matches;
use chrono::{DateTime, TimeZone, Utc};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, PaginatorTrait, Set};
use uuid::Uuid;

use bc_bridge::entities::equipment;
use bc_bridge::entities::scheduling_window::{self, WindowStatus};
use bc_bridge::services::scheduling::SchedulingService;
use bc_bridge::ServiceError;

fn day(d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, d, 0, 0, 0).unwrap()
}

async fn seed_equipment(db: &DatabaseConnection, code: &str) -> equipment::Model {
    equipment::ActiveModel {
        code: Set(code.to_string()),
        branch: Set("B1".to_string()),
        status: Set("ACTIVE".to_string()),
        system_id: Set(format!("sys-{code}")),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("seed equipment")
}

async fn seed_window(
    db: &DatabaseConnection,
    equipment_id: Uuid,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    status: WindowStatus,
) {
    scheduling_window::ActiveModel {
        equipment_id: Set(equipment_id),
        date_start: Set(start),
        date_end: Set(end),
        status: Set(status.as_str().to_string()),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("seed window");
}

#[tokio::test]
async fn touching_boundary_counts_as_a_conflict() {
    let db = Arc::new(common::setup_db().await);
    let service = SchedulingService::new(db.clone(), None);

    let e1 = seed_equipment(&db, "E1").await;
    seed_window(&db, e1.id, day(1), day(10), WindowStatus::New).await;

    let decision = service.validate(e1.id, day(10), day(15)).await.unwrap();
    assert!(!decision.allowed);
    assert!(decision.reason.unwrap().contains("E1"));
}

#[tokio::test]
async fn disjoint_window_is_allowed() {
    let db = Arc::new(common::setup_db().await);
    let service = SchedulingService::new(db.clone(), None);

    let e1 = seed_equipment(&db, "E1").await;
    seed_window(&db, e1.id, day(1), day(10), WindowStatus::New).await;

    let decision = service.validate(e1.id, day(11), day(15)).await.unwrap();
    assert!(decision.allowed);
    assert!(decision.reason.is_none());
}

#[tokio::test]
async fn non_new_windows_never_block() {
    let db = Arc::new(common::setup_db().await);
    let service = SchedulingService::new(db.clone(), None);

    let e1 = seed_equipment(&db, "E1").await;
    seed_window(&db, e1.id, day(1), day(10), WindowStatus::Cancelled).await;
    seed_window(&db, e1.id, day(1), day(10), WindowStatus::Consumed).await;

    let decision = service.validate(e1.id, day(5), day(8)).await.unwrap();
    assert!(decision.allowed);
}

#[tokio::test]
async fn other_equipment_windows_do_not_interfere() {
    let db = Arc::new(common::setup_db().await);
    let service = SchedulingService::new(db.clone(), None);

    let e1 = seed_equipment(&db, "E1").await;
    let e2 = seed_equipment(&db, "E2").await;
    seed_window(&db, e2.id, day(1), day(10), WindowStatus::New).await;

    let decision = service.validate(e1.id, day(5), day(8)).await.unwrap();
    assert!(decision.allowed);
}

#[tokio::test]
async fn unknown_equipment_is_not_found() {
    let db = Arc::new(common::setup_db().await);
    let service = SchedulingService::new(db, None);

    let result = service.validate(Uuid::new_v4(), day(1), day(2)).await;
    assert_matches!(result, Err(ServiceError::NotFound(_)));
}

#[tokio::test]
async fn inverted_range_fails_validation() {
    let db = Arc::new(common::setup_db().await);
    let service = SchedulingService::new(db.clone(), None);

    let e1 = seed_equipment(&db, "E1").await;
    let result = service.validate(e1.id, day(10), day(5)).await;
    assert_matches!(result, Err(ServiceError::ValidationError(_)));
}

#[tokio::test]
async fn booking_inserts_a_new_window_inside_the_check() {
    let db = Arc::new(common::setup_db().await);
    let service = SchedulingService::new(db.clone(), None);

    let e1 = seed_equipment(&db, "E1").await;

    let window = service
        .validate_and_book(e1.id, day(1), day(10))
        .await
        .expect("first booking");
    assert_eq!(window.status, WindowStatus::New.as_str());

    // The overlapping second booking is rejected and writes nothing.
    let result = service.validate_and_book(e1.id, day(10), day(12)).await;
    assert_matches!(result, Err(ServiceError::Conflict(_)));

    let count = scheduling_window::Entity::find().count(&*db).await.unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn booking_after_cancellation_succeeds() {
    let db = Arc::new(common::setup_db().await);
    let service = SchedulingService::new(db.clone(), None);

    let e1 = seed_equipment(&db, "E1").await;
    seed_window(&db, e1.id, day(1), day(10), WindowStatus::Cancelled).await;

    service
        .validate_and_book(e1.id, day(5), day(8))
        .await
        .expect("cancelled window does not block");
}
