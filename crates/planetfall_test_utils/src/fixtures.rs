//! Test fixtures and helpers.
//!
//! Pre-built catalogs, resource sets and derived rosters for consistent
//! testing across the workspace.

use planetfall_core::combat::PlanetForce;
use planetfall_core::data::{Catalog, Category, ItemCatalogEntry};
use planetfall_core::evaluator::{DerivedItem, UnitState};
use planetfall_core::ledger::ResourceLedger;
use planetfall_core::planet::{
    ItemId, PlanetId, Resource, ResourceAmount, ResourceId, Timestamp, UnitId, UserId, ENERGY,
};

/// Metal, the first test resource.
pub const METAL: ResourceId = ResourceId(1);
/// Crystal, the second test resource.
pub const CRYSTAL: ResourceId = ResourceId(2);

/// A small but complete catalog: two mines, a power plant, one
/// research line, and a unit roster including a colony ship.
#[must_use]
pub fn catalog() -> Catalog {
    Catalog::from_entries(vec![
        ItemCatalogEntry::new(ItemId(1), "metal_mine", Category::Structure, "Metal Mine")
            .with_build_time("60 * 1.5 ^ level")
            .with_cost(METAL, "40 * 1.5 ^ level")
            .with_production(METAL, "30 * level * bonus"),
        ItemCatalogEntry::new(ItemId(2), "crystal_mine", Category::Structure, "Crystal Mine")
            .with_build_time("80 * 1.5 ^ level")
            .with_cost(METAL, "60 * 1.5 ^ level")
            .with_production(CRYSTAL, "20 * level * bonus"),
        ItemCatalogEntry::new(ItemId(3), "solar_plant", Category::Structure, "Solar Plant")
            .with_build_time("100 * 1.5 ^ level")
            .with_cost(METAL, "75 * 1.5 ^ level")
            .with_production(ENERGY, "25 * level * bonus"),
        ItemCatalogEntry::new(ItemId(4), "laser", Category::Research, "Laser Technology")
            .with_build_time("120 * level + 120")
            .with_cost(CRYSTAL, "200 * 2 ^ level"),
        ItemCatalogEntry::new(ItemId(5), "turret", Category::Structure, "Laser Turret")
            .with_build_time("300")
            .with_combat("20 * level", "50 * level")
            .with_cost(METAL, "500")
            .with_prerequisite(ItemId(4), 1),
        ItemCatalogEntry::new(ItemId(10), "fighter", Category::Unit, "Fighter")
            .with_build_time("600")
            .with_combat("50 + laser * 5", "40")
            .with_cost(METAL, "3000")
            .with_prerequisite(ItemId(4), 2),
        ItemCatalogEntry::new(ItemId(11), "freighter", Category::Unit, "Freighter")
            .with_build_time("900")
            .with_combat("5", "25")
            .with_freight("5000")
            .with_cost(METAL, "6000"),
        ItemCatalogEntry::new(ItemId(12), "colony_ship", Category::Unit, "Colony Ship")
            .with_build_time("3600")
            .with_combat("0", "100")
            .with_cost(METAL, "10000")
            .with_prerequisite(ItemId(4), 3),
    ])
    .expect("test catalog is valid")
}

/// The colony-capable unit in [`catalog`].
pub const COLONY_SHIP: ItemId = ItemId(12);

/// Build a resource record.
#[must_use]
pub fn resource(id: ResourceId, quantity: i64, production: i64, last: Timestamp) -> Resource {
    Resource {
        id,
        bonus: 1.0,
        quantity,
        production,
        last_time_calc: last,
    }
}

/// Build a derived unit instance with fixed combat stats and a metal
/// construction cost of 100, active and fully constructed.
#[must_use]
pub fn derived_unit(
    unit_id: UnitId,
    item_id: ItemId,
    attack: i64,
    defense: i64,
    freight: i64,
) -> DerivedItem {
    DerivedItem {
        item_id,
        key: format!("unit_{}", item_id.0),
        category: Category::Unit,
        name: format!("Unit {}", item_id.0),
        level: 0,
        build_time: 600,
        attack_point: attack,
        defense_point: defense,
        freight_capacity: freight,
        costs: vec![ResourceAmount {
            resource: METAL,
            quantity: 100,
        }],
        unmet_prerequisites: Vec::new(),
        production: Vec::new(),
        unit: Some(UnitState {
            id: unit_id,
            create_in_progress: false,
            active: true,
        }),
    }
}

/// Build a derived structure with fixed combat stats and no production.
#[must_use]
pub fn derived_structure(item_id: ItemId, level: u32, attack: i64, defense: i64) -> DerivedItem {
    DerivedItem {
        item_id,
        key: format!("structure_{}", item_id.0),
        category: Category::Structure,
        name: format!("Structure {}", item_id.0),
        level,
        build_time: 300,
        attack_point: attack,
        defense_point: defense,
        freight_capacity: 0,
        costs: Vec::new(),
        unmet_prerequisites: Vec::new(),
        production: Vec::new(),
        unit: None,
    }
}

/// Assemble one side of a fight.
#[must_use]
pub fn force(
    planet: PlanetId,
    owner: UserId,
    units: Vec<DerivedItem>,
    structures: Vec<DerivedItem>,
    resources: Vec<Resource>,
    now: Timestamp,
) -> PlanetForce {
    PlanetForce {
        planet,
        owner,
        units,
        structures,
        ledger: ResourceLedger::new(resources, now),
    }
}
