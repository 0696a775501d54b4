//! Write-back seam towards the persistence collaborator.
//!
//! The core performs no I/O. After a resolution it hands the outer
//! layer a [`CombatReport`]; this module defines the hooks the outer
//! layer implements and the fixed order they are driven in.

use crate::combat::{CombatReport, Fight};
use crate::planet::{ItemId, PlanetId, Resource, UnitId, UserId};

/// Persistence hooks the outer layer implements.
///
/// Each method mirrors one effect of a resolution. Implementations are
/// expected to be plain writes; the core never retries them.
pub trait PlanetStore {
    /// Soft-delete the given unit instances.
    fn deactivate_units(&mut self, planet: PlanetId, units: &[UnitId]);

    /// Reset the given structures to level 0 with no upgrade running.
    fn reset_structures(&mut self, planet: PlanetId, items: &[ItemId]);

    /// Write back a planet's final resource state.
    fn persist_resources(&mut self, planet: PlanetId, resources: &[Resource]);

    /// Hand the planet to a new owner.
    fn transfer_ownership(&mut self, planet: PlanetId, owner: UserId);

    /// Store the immutable fight record.
    fn persist_fight(&mut self, fight: &Fight);
}

/// Drive the hooks from a resolution report.
///
/// Order is fixed: attacker losses, structure resets, both resource
/// states, ownership, then the fight record last so everything it
/// references exists.
pub fn apply_report(store: &mut dyn PlanetStore, report: &CombatReport) {
    let attacker = report.fight.attacker_planet;
    let defender = report.fight.defender_planet;

    if !report.destroyed_units.is_empty() {
        store.deactivate_units(attacker, &report.destroyed_units);
    }
    if !report.reset_structures.is_empty() {
        store.reset_structures(defender, &report.reset_structures);
    }
    store.persist_resources(attacker, &report.attacker_resources);
    store.persist_resources(defender, &report.defender_resources);
    if let Some(owner) = report.new_owner {
        store.transfer_ownership(defender, owner);
    }
    store.persist_fight(&report.fight);
}
