//! Per-planet mutable state records.
//!
//! These are the plain records the persistence collaborator reads from
//! storage and hands to the core for one logical operation. The core
//! mutates them in memory only; writing the final state back is the
//! caller's responsibility.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Unique identifier for catalog items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId(pub u32);

impl ItemId {
    /// Create a new item ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }
}

/// Unique identifier for unit instances (distinct from the catalog id
/// that multiple units share).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitId(pub u64);

impl UnitId {
    /// Create a new unit instance ID.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }
}

/// Unique identifier for resource kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ResourceId(pub u32);

impl ResourceId {
    /// Create a new resource ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }
}

/// Unique identifier for planets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlanetId(pub u32);

/// Unique identifier for players. `UserId(0)` marks an unowned planet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub u32);

impl UserId {
    /// The sentinel owner of unclaimed planets.
    pub const NOBODY: Self = Self(0);
}

/// The reserved energy resource.
///
/// Energy accrues instantaneously rather than per elapsed minute, and its
/// production is only recomputed when the producing structure is the one
/// just upgraded. See [`crate::ledger::ResourceLedger::refresh`].
pub const ENERGY: ResourceId = ResourceId(3);

/// Unix timestamp in seconds.
///
/// Sampled exactly once per resolution or refresh call by the caller and
/// reused throughout, so elapsed-minute arithmetic stays consistent.
pub type Timestamp = i64;

/// Per-planet level/progress record for one catalog item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanetItem {
    /// Catalog item this record tracks.
    pub item_id: ItemId,
    /// Current level, 0 if never built.
    pub level: u32,
    /// Whether an upgrade is currently running.
    pub upgrade_in_progress: bool,
    /// When the running upgrade completes.
    pub upgrade_ends_at: Timestamp,
}

impl PlanetItem {
    /// Create a record at a given level with no upgrade running.
    #[must_use]
    pub const fn at_level(item_id: ItemId, level: u32) -> Self {
        Self {
            item_id,
            level,
            upgrade_in_progress: false,
            upgrade_ends_at: 0,
        }
    }
}

/// An individually-tracked unit instance on a planet.
///
/// Destroyed units are soft-deleted via [`Unit::active`] rather than
/// removed, so fight records can still reference them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    /// Instance identifier.
    pub id: UnitId,
    /// The catalog item this unit is an instance of.
    pub item_id: ItemId,
    /// Whether the unit is still under construction.
    pub create_in_progress: bool,
    /// When construction completes.
    pub create_ends_at: Timestamp,
    /// False once the unit has been destroyed.
    pub active: bool,
}

impl Unit {
    /// Create a finished, active unit.
    #[must_use]
    pub const fn active(id: UnitId, item_id: ItemId) -> Self {
        Self {
            id,
            item_id,
            create_in_progress: false,
            create_ends_at: 0,
            active: true,
        }
    }
}

/// Per-planet stock of one resource kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    /// Resource kind.
    pub id: ResourceId,
    /// Static multiplier from the planet's position, applied inside
    /// production formulas via the `bonus` variable.
    pub bonus: f64,
    /// Current stock.
    pub quantity: i64,
    /// Production per minute, derived on refresh; transient.
    pub production: i64,
    /// Last time accrual was applied. Only ever advances forward.
    pub last_time_calc: Timestamp,
}

/// A concrete amount of one resource, used for credits, debits, costs and
/// loot records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceAmount {
    /// Resource kind.
    pub resource: ResourceId,
    /// Amount.
    pub quantity: i64,
}

/// Collect the full level map of a planet from its item records.
///
/// Cross-item formulas may reference any catalog item, so this must cover
/// every item on the planet before any single item is evaluated.
#[must_use]
pub fn level_map(items: &[PlanetItem]) -> HashMap<ItemId, u32> {
    items.iter().map(|item| (item.item_id, item.level)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_map_covers_all_items() {
        let items = vec![
            PlanetItem::at_level(ItemId(1), 4),
            PlanetItem::at_level(ItemId(2), 0),
            PlanetItem::at_level(ItemId(9), 12),
        ];
        let levels = level_map(&items);
        assert_eq!(levels.len(), 3);
        assert_eq!(levels[&ItemId(2)], 0);
        assert_eq!(levels[&ItemId(9)], 12);
    }

    #[test]
    fn test_unowned_sentinel() {
        assert_eq!(UserId::NOBODY, UserId(0));
    }
}
