use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, Set};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use async_trait::async_trait;

/// A reserved/consumed slice of assembly inventory for one order line.
///
/// `reserved_quantity` is the not-yet-consumed reserved stock and never goes
/// negative. Rows carrying a lot are written with `consumed_quantity` zero;
/// consumption is recorded later by a separate update path.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "entry_request_assembly")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub code: String,
    pub description: String,
    pub short_description: String,
    pub invima: String,
    pub lot: Option<String>,
    pub quantity: Decimal,
    pub reserved_quantity: Decimal,
    pub consumed_quantity: Decimal,
    pub quantity_ile: Decimal,
    pub unit_price: Decimal,
    pub location_code: String,
    pub location_code_stock: String,
    pub tax_code: String,
    pub classification: String,
    pub status: String,
    pub low_turnover: bool,
    pub expiration_date: Option<NaiveDate>,
    pub invima_expiration_date: Option<NaiveDate>,
    pub invima_classification: String,
    pub line_no: i32,
    pub position: i32,
    pub entry_request_id: Uuid,
    pub entry_request_detail_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

#[async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C: ConnectionTrait>(self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let mut active_model = self;

        if insert {
            if let ActiveValue::NotSet = active_model.id {
                active_model.id = Set(Uuid::new_v4());
            }
            if let ActiveValue::NotSet = active_model.created_at {
                active_model.created_at = Set(Utc::now());
            }
        }

        Ok(active_model)
    }
}
