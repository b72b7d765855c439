//! Typed intermediate schemas for the raw rows each BC page returns.
//!
//! One record type per endpoint family; the untyped JSON never travels past
//! the parsing boundary. Fields the pages omit for empty values carry
//! `#[serde(default)]`.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;

/// Row shape of the primary and V2 assembly pages (lot-bearing).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct AssemblyRow {
    pub no: String,
    pub description: String,
    pub description2: String,
    pub invima_code: String,
    pub lot_no: String,
    pub quantity: Decimal,
    pub reserved_quantity: Decimal,
    pub quantity_to_consume: Decimal,
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
}

/// Row shape of the assembly order-lines page. These rows never carry lot,
/// classification, or status data.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct AssemblyLineRow {
    pub no: String,
    pub description: String,
    pub description2: String,
    pub quantity: Decimal,
    pub reserved_quantity: Decimal,
    pub quantity_ile: Decimal,
    pub unit_price: Decimal,
    pub location_code: String,
    pub location_code_stock: String,
    pub line_no: i32,
    pub position: i32,
}

/// Row shape of the equipment-scoped assembly page, which reports remaining
/// stock and the reservation held at the source location.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct AssemblyEqRow {
    pub no: String,
    pub description: String,
    pub description2: String,
    pub invima_code: String,
    pub lot_no: String,
    pub quantity: Decimal,
    pub remaining_quantity: Decimal,
    pub reserved_quantity_stock: Decimal,
    pub unit_price: Decimal,
    pub location_code: String,
    pub location_code_stock: String,
    pub expiration_date: Option<NaiveDate>,
    pub line_no: i32,
    pub position: i32,
}

/// Row shape of the component inventory page. `reserved_quantity` is absent
/// on companies that do not track component reservations.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ComponentRow {
    pub system_id: String,
    pub no: String,
    pub description: String,
    pub location_code: String,
    pub quantity: Decimal,
    pub reserved_quantity: Option<Decimal>,
    pub unit_price: Decimal,
}

/// Row shape of the additional-lot page (expiration and regulatory data).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct LotRow {
    pub item_no: String,
    pub lot_no: String,
    pub quantity: Decimal,
    pub expiration_date: Option<NaiveDate>,
    pub invima_code: String,
    pub invima_expiration_date: Option<NaiveDate>,
    pub invima_classification: String,
}

/// Row shape of the equipment master page.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct EquipmentRow {
    pub system_id: String,
    pub no: String,
    pub branch_code: String,
    pub status: String,
    pub loan_date: Option<NaiveDate>,
    pub return_date: Option<NaiveDate>,
    pub init_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn assembly_row_parses_with_omitted_fields() {
        let row: AssemblyRow = serde_json::from_str(
            r#"{"no":"A-100","quantity":5,"lotNo":"L1","expirationDate":"2026-03-01"}"#,
        )
        .unwrap();
        assert_eq!(row.no, "A-100");
        assert_eq!(row.quantity, dec!(5));
        assert_eq!(row.lot_no, "L1");
        assert_eq!(
            row.expiration_date,
            NaiveDate::from_ymd_opt(2026, 3, 1)
        );
        assert!(row.classification.is_empty());
        assert!(!row.low_turnover);
    }

    #[test]
    fn component_row_reservation_is_optional() {
        let row: ComponentRow =
            serde_json::from_str(r#"{"no":"C-1","quantity":10}"#).unwrap();
        assert!(row.reserved_quantity.is_none());

        let row: ComponentRow =
            serde_json::from_str(r#"{"no":"C-1","quantity":10,"reservedQuantity":4}"#)
                .unwrap();
        assert_eq!(row.reserved_quantity, Some(dec!(4)));
    }
}
