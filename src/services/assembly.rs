//! Assembly inventory resolution and order-scoped recording.
//!
//! Resolution walks a fixed chain of BC sources: the primary page merged
//! with the order-lines page first, then the generic assembly page when the
//! equipment-specific pages are not published. Only a not-found moves the
//! chain forward; any other failure stops it.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::Utc;
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::bc::client::BcClient;
use crate::bc::endpoints::{
    AssemblySource, ASSEMBLY, ASSEMBLY_EQ, ASSEMBLY_GENERIC, ASSEMBLY_LINES,
    ASSEMBLY_RESOLUTION_ORDER, ASSEMBLY_V2, LOTS_ADDITIONAL,
};
use crate::bc::filter::Filter;
use crate::bc::normalize::{
    normalize_assembly, normalize_assembly_eq, normalize_assembly_line, normalize_assembly_v2,
    NormalizedAssembly,
};
use crate::bc::schema::{AssemblyEqRow, AssemblyLineRow, AssemblyRow, LotRow};
use crate::bc::BcResult;
use crate::entities::entry_request_assembly;
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};

/// Case-insensitive location comparison after trimming, matching how BC
/// location codes are entered by hand.
fn location_matches(candidate: &str, requested: &str) -> bool {
    candidate.trim().eq_ignore_ascii_case(requested.trim())
}

/// Keeps the primary set intact and appends secondary rows whose item code
/// has not been seen yet (first-seen wins).
fn merge_by_code(
    primary: Vec<NormalizedAssembly>,
    secondary: Vec<NormalizedAssembly>,
) -> Vec<NormalizedAssembly> {
    let mut seen: HashSet<String> = primary.iter().map(|r| r.code.clone()).collect();
    let mut merged = primary;

    for row in secondary {
        if seen.insert(row.code.clone()) {
            merged.push(row);
        }
    }

    merged
}

/// Service resolving assembly inventory for a piece of equipment and
/// recording the resolved rows against an order.
#[derive(Clone)]
pub struct AssemblyService {
    client: Arc<BcClient>,
    db: Arc<DatabaseConnection>,
    event_sender: Option<EventSender>,
}

impl AssemblyService {
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

    /// Resolves the assembly rows for an equipment code through the fallback
    /// chain.
    #[instrument(skip(self))]
    pub async fn resolve_assembly_rows(
        &self,
        equipment_code: &str,
    ) -> Result<Vec<NormalizedAssembly>, ServiceError> {
        if equipment_code.trim().is_empty() {
            return Err(ServiceError::ValidationError(
                "Equipment code must not be blank".to_string(),
            ));
        }

        let filter = Filter::new().eq("equipmentCode", equipment_code.trim());
        self.resolve_rows(equipment_code.trim(), &filter).await
    }

    /// Resolves assembly rows and keeps only those stored at the requested
    /// location. Both the location code and the source-location code must
    /// match for this lookup.
    #[instrument(skip(self))]
    pub async fn resolve_for_location(
        &self,
        equipment_code: &str,
        location_code: &str,
    ) -> Result<Vec<NormalizedAssembly>, ServiceError> {
        if location_code.trim().is_empty() {
            return Err(ServiceError::ValidationError(
                "Location code must not be blank".to_string(),
            ));
        }

        let mut rows = self.resolve_assembly_rows(equipment_code).await?;
        rows.retain(|row| {
            location_matches(&row.location_code, location_code)
                && location_matches(&row.location_code_stock, location_code)
        });
        Ok(rows)
    }

    /// Resolves assembly rows scoped to a branch and keeps those visible at
    /// the requested location. Unlike [`resolve_for_location`], either
    /// location field may match here.
    ///
    /// [`resolve_for_location`]: AssemblyService::resolve_for_location
    #[instrument(skip(self))]
    pub async fn resolve_for_branch_location(
        &self,
        equipment_code: &str,
        branch: &str,
        location_code: &str,
    ) -> Result<Vec<NormalizedAssembly>, ServiceError> {
        if branch.trim().is_empty() || location_code.trim().is_empty() {
            return Err(ServiceError::ValidationError(
                "Branch and location codes must not be blank".to_string(),
            ));
        }
        if equipment_code.trim().is_empty() {
            return Err(ServiceError::ValidationError(
                "Equipment code must not be blank".to_string(),
            ));
        }

        let filter = Filter::new()
            .eq("equipmentCode", equipment_code.trim())
            .eq("branchCode", branch.trim());
        let mut rows = self.resolve_rows(equipment_code.trim(), &filter).await?;
        rows.retain(|row| {
            location_matches(&row.location_code, location_code)
                || location_matches(&row.location_code_stock, location_code)
        });
        Ok(rows)
    }

    /// Fetches the reserved/unreserved split view of assembly inventory for
    /// an equipment code. A partially reserved row surfaces as a single
    /// unreserved remainder; a fully reserved row yields nothing.
    #[instrument(skip(self))]
    pub async fn fetch_reserved_split(
        &self,
        equipment_code: &str,
    ) -> Result<Vec<NormalizedAssembly>, ServiceError> {
        if equipment_code.trim().is_empty() {
            return Err(ServiceError::ValidationError(
                "Equipment code must not be blank".to_string(),
            ));
        }

        let filter = Filter::new().eq("equipmentCode", equipment_code.trim());
        let rows: Vec<AssemblyRow> = self.client.fetch_collection(ASSEMBLY_V2, &filter).await?;
        Ok(rows.iter().filter_map(normalize_assembly_v2).collect())
    }

    /// Fetches the stock page scoped to a single equipment record.
    /// `quantity_ile` carries remaining minus stock reservations and may go
    /// negative as a deficit signal.
    #[instrument(skip(self))]
    pub async fn fetch_equipment_stock(
        &self,
        equipment_code: &str,
    ) -> Result<Vec<NormalizedAssembly>, ServiceError> {
        if equipment_code.trim().is_empty() {
            return Err(ServiceError::ValidationError(
                "Equipment code must not be blank".to_string(),
            ));
        }

        let filter = Filter::new().eq("equipmentCode", equipment_code.trim());
        let rows: Vec<AssemblyEqRow> = self.client.fetch_collection(ASSEMBLY_EQ, &filter).await?;
        Ok(rows.iter().map(normalize_assembly_eq).collect())
    }

    async fn resolve_rows(
        &self,
        equipment_code: &str,
        filter: &Filter,
    ) -> Result<Vec<NormalizedAssembly>, ServiceError> {
        let mut last_missing = None;

        for source in ASSEMBLY_RESOLUTION_ORDER {
            match self.fetch_source(source, equipment_code, filter).await {
                Ok(rows) => return Ok(rows),
                Err(err) if err.is_not_found() => {
                    info!(?source, "assembly source unavailable, trying next");
                    last_missing = Some(err);
                }
                Err(err) => return Err(err.into()),
            }
        }

        Err(last_missing
            .map(ServiceError::from)
            .unwrap_or_else(|| ServiceError::NotFound("no assembly source available".into())))
    }

    async fn fetch_source(
        &self,
        source: AssemblySource,
        equipment_code: &str,
        filter: &Filter,
    ) -> BcResult<Vec<NormalizedAssembly>> {
        match source {
            AssemblySource::PrimaryWithLines => {
                let line_rows: Vec<AssemblyLineRow> =
                    self.client.fetch_collection(ASSEMBLY_LINES, filter).await?;
                let primary_rows: Vec<AssemblyRow> =
                    self.client.fetch_collection(ASSEMBLY, filter).await?;

                let primary = primary_rows.iter().map(normalize_assembly).collect();
                let lines = line_rows.iter().map(normalize_assembly_line).collect();
                Ok(merge_by_code(primary, lines))
            }
            AssemblySource::Generic => {
                // The generic page is queried with the equipment code alone;
                // extra clauses from the first attempt are dropped.
                let filter = Filter::new().eq("equipmentCode", equipment_code);
                let rows: Vec<AssemblyRow> = self
                    .client
                    .fetch_collection(ASSEMBLY_GENERIC, &filter)
                    .await?;
                Ok(rows.iter().map(normalize_assembly).collect())
            }
        }
    }

    /// Records resolved rows against an order as a fresh snapshot: pure
    /// inserts, no natural-key matching, once per order-processing pass.
    #[instrument(skip(self, rows), fields(count = rows.len()))]
    pub async fn record_order_assemblies(
        &self,
        entry_request_id: Uuid,
        entry_request_detail_id: Option<Uuid>,
        rows: Vec<NormalizedAssembly>,
    ) -> Result<u64, ServiceError> {
        let db = &*self.db;
        let mut written = 0u64;

        for row in rows {
            let model = entry_request_assembly::ActiveModel {
                code: Set(row.code),
                description: Set(row.description),
                short_description: Set(row.short_description),
                invima: Set(row.invima),
                lot: Set(row.lot),
                quantity: Set(row.quantity),
                reserved_quantity: Set(row.reserved_quantity),
                consumed_quantity: Set(row.consumed_quantity),
                quantity_ile: Set(row.quantity_ile),
                unit_price: Set(row.unit_price),
                location_code: Set(row.location_code),
                location_code_stock: Set(row.location_code_stock),
                tax_code: Set(row.tax_code),
                classification: Set(row.classification),
                status: Set(row.status),
                low_turnover: Set(row.low_turnover),
                expiration_date: Set(row.expiration_date),
                invima_expiration_date: Set(row.invima_expiration_date),
                invima_classification: Set(row.invima_classification),
                line_no: Set(row.line_no),
                position: Set(row.position),
                entry_request_id: Set(entry_request_id),
                entry_request_detail_id: Set(entry_request_detail_id),
                ..Default::default()
            };

            model.insert(db).await.map_err(ServiceError::db_error)?;
            written += 1;
        }

        if let Some(sender) = &self.event_sender {
            let _ = sender
                .send(Event::AssembliesRecorded {
                    entry_request_id,
                    count: written,
                    timestamp: Utc::now(),
                })
                .await;
        }

        info!(%entry_request_id, written, "recorded order assemblies");
        Ok(written)
    }

    /// Fetches additional lot data (expiration and regulatory fields) for an
    /// item. Lenient: a fetch failure logs a warning and yields an empty
    /// collection, matching the surrounding master-data passes.
    #[instrument(skip(self))]
    pub async fn fetch_additional_lots(&self, item_code: &str) -> Vec<LotRow> {
        if item_code.trim().is_empty() {
            return Vec::new();
        }

        let filter = Filter::new().eq("itemNo", item_code.trim());
        match self.client.fetch_collection(LOTS_ADDITIONAL, &filter).await {
            Ok(rows) => rows,
            Err(err) => {
                warn!(item_code, error = %err, "additional lot fetch failed");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_match_ignores_case_and_whitespace() {
        assert!(location_matches(" MAIN ", "main"));
        assert!(location_matches("main", "MAIN"));
        assert!(!location_matches("MAIN", "NORTH"));
    }

    fn row(code: &str) -> NormalizedAssembly {
        NormalizedAssembly {
            code: code.to_string(),
            ..NormalizedAssembly::default()
        }
    }

    #[test]
    fn merge_keeps_primary_and_appends_unseen_codes() {
        let merged = merge_by_code(
            vec![row("A"), row("B")],
            vec![row("B"), row("C"), row("C")],
        );
        let codes: Vec<&str> = merged.iter().map(|r| r.code.as_str()).collect();
        assert_eq!(codes, vec!["A", "B", "C"]);
    }

    #[test]
    fn merge_with_empty_primary_keeps_secondary_order() {
        let merged = merge_by_code(vec![], vec![row("X"), row("Y")]);
        let codes: Vec<&str> = merged.iter().map(|r| r.code.as_str()).collect();
        assert_eq!(codes, vec!["X", "Y"]);
    }
}
