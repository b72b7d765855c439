//! Equipment master-data pass: idempotent upsert by remote system id.

mod common;

use std::sync::Arc;

use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use bc_bridge::entities::equipment;
use bc_bridge::services::equipment_sync::EquipmentSyncService;

fn equipment_body(status: &str) -> serde_json::Value {
    json!({
        "value": [
            {
                "systemId": "sys-1",
                "no": "E1",
                "branchCode": "B1",
                "status": status,
                "loanDate": "2024-05-01",
            },
            {
                "systemId": "sys-2",
                "no": "E2",
                "branchCode": "B1",
                "status": "ACTIVE",
            },
        ],
    })
}

#[tokio::test]
async fn repeated_passes_keep_one_row_per_natural_key() {
    let server = MockServer::start().await;
    let db = Arc::new(common::setup_db().await);
    let service = EquipmentSyncService::new(common::bc_client(&server.uri()), db.clone(), None);

    Mock::given(method("GET"))
        .and(path("/equipmentCards"))
        .respond_with(ResponseTemplate::new(200).set_body_json(equipment_body("ACTIVE")))
        .mount(&server)
        .await;

    let first = service.sync_all().await.expect("first pass");
    assert_eq!(first.fetched, 2);
    assert_eq!(first.inserted, 2);
    assert_eq!(first.updated, 0);

    let second = service.sync_all().await.expect("second pass");
    assert_eq!(second.inserted, 0);
    assert_eq!(second.updated, 2);

    let count = equipment::Entity::find().count(&*db).await.unwrap();
    assert_eq!(count, 2);
}

#[tokio::test]
async fn changed_field_updates_in_place_without_new_primary_key() {
    let server = MockServer::start().await;
    let db = Arc::new(common::setup_db().await);
    let service = EquipmentSyncService::new(common::bc_client(&server.uri()), db.clone(), None);

    Mock::given(method("GET"))
        .and(path("/equipmentCards"))
        .respond_with(ResponseTemplate::new(200).set_body_json(equipment_body("ACTIVE")))
        .mount(&server)
        .await;
    service.sync_all().await.expect("seed pass");

    let original = equipment::Entity::find()
        .filter(equipment::Column::SystemId.eq("sys-1"))
        .one(&*db)
        .await
        .unwrap()
        .expect("seeded row");

    // Same natural key, one changed field on the remote side.
    server.reset().await;
    Mock::given(method("GET"))
        .and(path("/equipmentCards"))
        .respond_with(ResponseTemplate::new(200).set_body_json(equipment_body("RETIRED")))
        .mount(&server)
        .await;

    let summary = service.sync_all().await.expect("update pass");
    assert_eq!(summary.inserted, 0);
    assert_eq!(summary.updated, 2);

    let updated = equipment::Entity::find()
        .filter(equipment::Column::SystemId.eq("sys-1"))
        .one(&*db)
        .await
        .unwrap()
        .expect("updated row");

    assert_eq!(updated.id, original.id);
    assert_eq!(updated.status, "RETIRED");
    assert_eq!(updated.code, "E1");

    let count = equipment::Entity::find().count(&*db).await.unwrap();
    assert_eq!(count, 2);
}

#[tokio::test]
async fn rows_without_system_id_are_skipped_not_fatal() {
    let server = MockServer::start().await;
    let db = Arc::new(common::setup_db().await);
    let service = EquipmentSyncService::new(common::bc_client(&server.uri()), db.clone(), None);

    Mock::given(method("GET"))
        .and(path("/equipmentCards"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": [
                {"systemId": "", "no": "E9", "branchCode": "B1", "status": "ACTIVE"},
                {"systemId": "sys-3", "no": "E3", "branchCode": "B2", "status": "ACTIVE"},
            ],
        })))
        .mount(&server)
        .await;

    let summary = service.sync_all().await.expect("pass");
    assert_eq!(summary.fetched, 2);
    assert_eq!(summary.inserted, 1);
    assert_eq!(summary.skipped, 1);
}
