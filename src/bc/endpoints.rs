//! Logical names for the BC API pages consumed by the bridge, plus the fixed
//! resolution order for assembly inventory lookups.

/// Assembly inventory, primary page (lot-bearing rows).
pub const ASSEMBLY: &str = "equipmentAssembly";

/// Assembly inventory, V2 page (reserved/unreserved split rows).
pub const ASSEMBLY_V2: &str = "equipmentAssemblyV2";

/// Assembly order lines page (no lot or classification data).
pub const ASSEMBLY_LINES: &str = "equipmentAssemblyLines";

/// Assembly inventory scoped to a single equipment record.
pub const ASSEMBLY_EQ: &str = "equipmentAssemblyEq";

/// Generic assembly lines page, used as the fallback when the
/// equipment-specific pages are not published for a company.
pub const ASSEMBLY_GENERIC: &str = "assemblyLines";

/// Component (non-lot, non-assembly) inventory lines.
pub const COMPONENTS: &str = "components";

/// Additional lot data (expiration and regulatory fields).
pub const LOTS_ADDITIONAL: &str = "lotsAdditional";

/// Equipment master records.
pub const EQUIPMENT: &str = "equipmentCards";

/// One step of the assembly resolution chain.
///
/// The chain is an explicit ordered list so the fallback order is fixed and
/// independently testable; a `NotFound` from one source moves to the next,
/// any other error stops the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssemblySource {
    /// Primary page merged with the order-lines page, de-duplicated by item
    /// code (primary wins).
    PrimaryWithLines,
    /// Generic assembly page queried with the equipment code alone.
    Generic,
}

/// Sources tried in order by the assembly resolver. Order is load-bearing.
pub const ASSEMBLY_RESOLUTION_ORDER: [AssemblySource; 2] =
    [AssemblySource::PrimaryWithLines, AssemblySource::Generic];
