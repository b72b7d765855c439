//! Shared harness for integration tests: an in-memory SQLite database with
//! the bridge schema, and a BC client pointed at a wiremock server.
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use sea_orm::{ConnectionTrait, Database, DatabaseConnection, DbBackend, Schema};

use bc_bridge::bc::token::StaticTokenProvider;
use bc_bridge::entities::{
    entry_request_assembly, entry_request_component, equipment, scheduling_window,
};
use bc_bridge::BcClient;

/// Token the test client presents; mocks can assert on it.
pub const TEST_TOKEN: &str = "test-token";

/// Connects an in-memory SQLite database and creates the bridge tables from
/// the entity definitions.
pub async fn setup_db() -> DatabaseConnection {
    let db = Database::connect("sqlite::memory:")
        .await
        .expect("sqlite connect");

    let schema = Schema::new(DbBackend::Sqlite);
    let backend = db.get_database_backend();

    let statements = [
        schema.create_table_from_entity(equipment::Entity),
        schema.create_table_from_entity(scheduling_window::Entity),
        schema.create_table_from_entity(entry_request_assembly::Entity),
        schema.create_table_from_entity(entry_request_component::Entity),
    ];

    for statement in statements {
        db.execute(backend.build(&statement))
            .await
            .expect("create table");
    }

    db
}

/// Builds a client against the given mock server URI with no retry delay,
/// so retry-bound tests run instantly.
pub fn bc_client(base_url: &str) -> Arc<BcClient> {
    let client = BcClient::new(base_url, Arc::new(StaticTokenProvider::new(TEST_TOKEN)))
        .expect("client")
        .with_retry(3, Duration::from_millis(0));
    Arc::new(client)
}
