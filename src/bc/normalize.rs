//! Converts raw BC rows into the bridge's reservation model.
//!
//! Each endpoint family reports quantities differently; the branch rules
//! here are the single place where those shapes converge.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::bc::schema::{AssemblyEqRow, AssemblyLineRow, AssemblyRow, ComponentRow};

/// Expiration assigned to lot rows whose remote expiration is absent or a
/// zero date.
pub fn default_lot_expiration() -> NaiveDate {
    NaiveDate::from_ymd_opt(2028, 1, 1).unwrap()
}

/// Maps the remote zero date (`0001-01-01`) to "unknown".
pub fn clean_date(date: Option<NaiveDate>) -> Option<NaiveDate> {
    date.filter(|d| *d != NaiveDate::from_ymd_opt(1, 1, 1).unwrap())
}

/// Normalized reservation/consumption record, not yet tied to an order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NormalizedAssembly {
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
}

/// Normalized component inventory line.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NormalizedComponent {
    pub item_code: String,
    pub item_name: String,
    pub warehouse: String,
    pub available_quantity: Decimal,
    pub unit_price: Decimal,
    pub system_id: String,
}

fn copy_core(row: &AssemblyRow) -> NormalizedAssembly {
    NormalizedAssembly {
        code: row.no.clone(),
        description: row.description.clone(),
        short_description: row.description2.clone(),
        invima: row.invima_code.clone(),
        lot: None,
        quantity: row.quantity,
        reserved_quantity: row.reserved_quantity,
        consumed_quantity: Decimal::ZERO,
        quantity_ile: row.quantity_ile,
        unit_price: row.unit_price,
        location_code: row.location_code.clone(),
        location_code_stock: row.location_code_stock.clone(),
        tax_code: row.tax_code.clone(),
        classification: row.classification.clone(),
        status: row.status.clone(),
        low_turnover: row.low_turnover,
        expiration_date: None,
        invima_expiration_date: clean_date(row.invima_expiration_date),
        invima_classification: row.invima_classification.clone(),
        line_no: row.line_no,
        position: row.position,
    }
}

/// Normalizes a row from the primary (lot-bearing) assembly page.
///
/// A non-empty lot marks the row as a consumption candidate: both quantity
/// figures take the row's quantity-to-consume, and a missing expiration
/// falls back to the default lot expiration. Without a lot, the lot-specific
/// fields stay cleared and the plain quantities are copied.
pub fn normalize_assembly(row: &AssemblyRow) -> NormalizedAssembly {
    let mut record = copy_core(row);

    if !row.lot_no.trim().is_empty() {
        record.lot = Some(row.lot_no.clone());
        record.quantity = row.quantity_to_consume;
        record.reserved_quantity = row.quantity_to_consume;
        record.consumed_quantity = Decimal::ZERO;
        record.quantity_ile = row.quantity_ile;
        record.expiration_date =
            Some(clean_date(row.expiration_date).unwrap_or_else(default_lot_expiration));
    }

    record
}

/// Normalizes a row from the V2 assembly page.
///
/// An unreserved row is reported once with its full quantity available to
/// reserve; a partially reserved row is reported once as the unreserved
/// remainder; a fully reserved row yields nothing.
pub fn normalize_assembly_v2(row: &AssemblyRow) -> Option<NormalizedAssembly> {
    let mut record = copy_core(row);
    record.lot = (!row.lot_no.trim().is_empty()).then(|| row.lot_no.clone());
    record.expiration_date = clean_date(row.expiration_date);

    if row.reserved_quantity == Decimal::ZERO {
        record.quantity = row.quantity;
        record.reserved_quantity = row.quantity;
        return Some(record);
    }

    if row.quantity != row.reserved_quantity {
        record.quantity = row.quantity - row.reserved_quantity;
        record.reserved_quantity = Decimal::ZERO;
        return Some(record);
    }

    // Fully reserved: nothing left to report.
    None
}

/// Normalizes a row from the order-lines page. Lines rows carry no lot,
/// classification, or status data.
pub fn normalize_assembly_line(row: &AssemblyLineRow) -> NormalizedAssembly {
    NormalizedAssembly {
        code: row.no.clone(),
        description: row.description.clone(),
        short_description: row.description2.clone(),
        quantity: row.quantity,
        reserved_quantity: row.reserved_quantity,
        quantity_ile: row.quantity_ile,
        unit_price: row.unit_price,
        location_code: row.location_code.clone(),
        location_code_stock: row.location_code_stock.clone(),
        line_no: row.line_no,
        position: row.position,
        ..NormalizedAssembly::default()
    }
}

/// Normalizes a row from the equipment-scoped page.
///
/// The available figure is the remaining stock minus the reservation held at
/// the source location, with no floor: a negative value is a deficit signal
/// the downstream consumers act on.
pub fn normalize_assembly_eq(row: &AssemblyEqRow) -> NormalizedAssembly {
    NormalizedAssembly {
        code: row.no.clone(),
        description: row.description.clone(),
        short_description: row.description2.clone(),
        invima: row.invima_code.clone(),
        lot: (!row.lot_no.trim().is_empty()).then(|| row.lot_no.clone()),
        quantity: row.quantity,
        quantity_ile: row.remaining_quantity - row.reserved_quantity_stock,
        unit_price: row.unit_price,
        location_code: row.location_code.clone(),
        location_code_stock: row.location_code_stock.clone(),
        expiration_date: clean_date(row.expiration_date),
        line_no: row.line_no,
        position: row.position,
        ..NormalizedAssembly::default()
    }
}

/// Normalizes a component inventory row. The available figure subtracts the
/// reservation only when the source reports one.
pub fn normalize_component(row: &ComponentRow) -> NormalizedComponent {
    let available = match row.reserved_quantity {
        Some(reserved) => row.quantity - reserved,
        None => row.quantity,
    };

    NormalizedComponent {
        item_code: row.no.clone(),
        item_name: row.description.clone(),
        warehouse: row.location_code.clone(),
        available_quantity: available,
        unit_price: row.unit_price,
        system_id: row.system_id.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn lot_row() -> AssemblyRow {
        AssemblyRow {
            no: "A-100".into(),
            lot_no: "L-7".into(),
            quantity: dec!(12),
            reserved_quantity: dec!(3),
            quantity_to_consume: dec!(4),
            quantity_ile: dec!(20),
            ..AssemblyRow::default()
        }
    }

    #[test]
    fn lot_row_becomes_consumption_candidate() {
        let record = normalize_assembly(&lot_row());
        assert_eq!(record.lot.as_deref(), Some("L-7"));
        assert_eq!(record.quantity, dec!(4));
        assert_eq!(record.reserved_quantity, dec!(4));
        assert_eq!(record.consumed_quantity, dec!(0));
        assert_eq!(record.quantity_ile, dec!(20));
        assert_eq!(record.expiration_date, Some(default_lot_expiration()));
    }

    #[test]
    fn lot_row_keeps_real_expiration() {
        let mut row = lot_row();
        row.expiration_date = NaiveDate::from_ymd_opt(2026, 5, 20);
        let record = normalize_assembly(&row);
        assert_eq!(record.expiration_date, row.expiration_date);
    }

    #[test]
    fn zero_expiration_falls_back_to_default() {
        let mut row = lot_row();
        row.expiration_date = NaiveDate::from_ymd_opt(1, 1, 1);
        let record = normalize_assembly(&row);
        assert_eq!(record.expiration_date, Some(default_lot_expiration()));
    }

    #[test]
    fn lotless_row_clears_lot_fields() {
        let mut row = lot_row();
        row.lot_no = String::new();
        let record = normalize_assembly(&row);
        assert_eq!(record.lot, None);
        assert_eq!(record.expiration_date, None);
        assert_eq!(record.quantity, dec!(12));
        assert_eq!(record.reserved_quantity, dec!(3));
        assert_eq!(record.consumed_quantity, dec!(0));
    }

    #[test]
    fn v2_partially_reserved_yields_only_the_remainder() {
        let row = AssemblyRow {
            no: "A-100".into(),
            quantity: dec!(10),
            reserved_quantity: dec!(4),
            ..AssemblyRow::default()
        };
        let record = normalize_assembly_v2(&row).expect("remainder record");
        assert_eq!(record.quantity, dec!(6));
        assert_eq!(record.reserved_quantity, dec!(0));
    }

    #[test]
    fn v2_fully_reserved_yields_nothing() {
        let row = AssemblyRow {
            quantity: dec!(10),
            reserved_quantity: dec!(10),
            ..AssemblyRow::default()
        };
        assert_eq!(normalize_assembly_v2(&row), None);
    }

    #[test]
    fn v2_unreserved_mirrors_full_quantity_as_reserved() {
        let row = AssemblyRow {
            quantity: dec!(10),
            reserved_quantity: dec!(0),
            ..AssemblyRow::default()
        };
        let record = normalize_assembly_v2(&row).expect("full record");
        assert_eq!(record.quantity, dec!(10));
        assert_eq!(record.reserved_quantity, dec!(10));
    }

    #[test]
    fn eq_row_available_may_go_negative() {
        let row = AssemblyEqRow {
            no: "A-200".into(),
            quantity: dec!(5),
            remaining_quantity: dec!(2),
            reserved_quantity_stock: dec!(6),
            ..AssemblyEqRow::default()
        };
        let record = normalize_assembly_eq(&row);
        assert_eq!(record.quantity, dec!(5));
        assert_eq!(record.quantity_ile, dec!(-4));
    }

    #[test]
    fn lines_row_never_carries_lot_or_status() {
        let row = AssemblyLineRow {
            no: "A-300".into(),
            quantity: dec!(7),
            ..AssemblyLineRow::default()
        };
        let record = normalize_assembly_line(&row);
        assert_eq!(record.lot, None);
        assert!(record.classification.is_empty());
        assert!(record.status.is_empty());
        assert_eq!(record.quantity, dec!(7));
    }

    #[test]
    fn component_availability_subtracts_reported_reservations() {
        let mut row = ComponentRow {
            no: "C-1".into(),
            quantity: dec!(10),
            reserved_quantity: Some(dec!(4)),
            ..ComponentRow::default()
        };
        assert_eq!(normalize_component(&row).available_quantity, dec!(6));

        row.reserved_quantity = None;
        assert_eq!(normalize_component(&row).available_quantity, dec!(10));
    }
}
