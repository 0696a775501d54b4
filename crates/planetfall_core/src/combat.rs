//! Combat resolution: force aggregation, outcome decision, proportional
//! destruction, rewards and ownership transfer.
//!
//! A resolution is a single transition over frozen in-memory snapshots:
//! the resolver consumes derived rosters and ledgers for both planets,
//! decides the outcome, and returns an immutable [`Fight`] record plus
//! the write-back effects in a [`CombatReport`]. Nothing is persisted
//! here and nothing is retried; the caller guarantees no other mutation
//! races against either planet while a resolution runs.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::FormulaError;
use crate::evaluator::DerivedItem;
use crate::ledger::ResourceLedger;
use crate::planet::{ItemId, PlanetId, Resource, ResourceAmount, Timestamp, UnitId, UserId};
use crate::rng::Sampler;

/// Outcome of a fight, from the attacker's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FightResult {
    /// Attacker broke through the defense.
    Win,
    /// Defender's counterattack overwhelmed the attacker.
    Lose,
    /// Neither side prevailed.
    Draw,
}

/// Snapshot of one participant as it entered the fight.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FightParticipant {
    /// Catalog item id.
    pub item_id: ItemId,
    /// Display name at resolution time.
    pub name: String,
    /// Instance id for units; `None` for structures.
    pub unit_id: Option<UnitId>,
    /// Level the stats were derived at.
    pub level: u32,
    /// Attack points contributed.
    pub attack_point: i64,
    /// Defense points contributed.
    pub defense_point: i64,
}

/// Immutable record of one resolved fight.
///
/// Created exactly once per resolution and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fight {
    /// When the fight was resolved.
    pub timestamp: Timestamp,
    /// Attacking planet.
    pub attacker_planet: PlanetId,
    /// Defending planet.
    pub defender_planet: PlanetId,
    /// Outcome from the attacker's point of view.
    pub result: FightResult,
    /// Attacker roster that participated.
    pub attackers: Vec<FightParticipant>,
    /// Defender roster that participated (units and armed structures).
    pub defenders: Vec<FightParticipant>,
    /// Resources the attacker looted; empty on Lose, Draw and
    /// colonization.
    pub acquired: Vec<ResourceAmount>,
}

/// One side's frozen snapshot entering a resolution.
#[derive(Debug)]
pub struct PlanetForce {
    /// The planet.
    pub planet: PlanetId,
    /// Its owner. `UserId::NOBODY` marks an unowned planet.
    pub owner: UserId,
    /// Derived unit instances (with [`crate::evaluator::UnitState`]).
    pub units: Vec<DerivedItem>,
    /// Derived structures.
    pub structures: Vec<DerivedItem>,
    /// The planet's resource ledger.
    pub ledger: ResourceLedger,
}

/// Everything a resolution consumes.
#[derive(Debug)]
pub struct CombatInput {
    /// The attacking side.
    pub attacker: PlanetForce,
    /// The defending side.
    pub defender: PlanetForce,
    /// Unit instances the attacker committed to the fight.
    pub selected_units: Vec<UnitId>,
}

/// Validation failure before any aggregation happens.
///
/// These are caller bugs, not combat outcomes: no [`Fight`] record is
/// created.
#[derive(Debug, Error)]
pub enum CombatError {
    /// Both planets belong to the same player.
    #[error("attacker and defender share owner {0:?}")]
    SameOwner(UserId),

    /// The defending planet has no owner to fight.
    #[error("defending planet {0:?} is unowned")]
    UnownedDefender(PlanetId),

    /// A stored formula failed while refreshing the defender's ledger.
    #[error(transparent)]
    Formula(#[from] FormulaError),
}

/// The write-back effects of one resolution, for the persistence layer.
#[derive(Debug)]
pub struct CombatReport {
    /// The immutable fight record.
    pub fight: Fight,
    /// Attacker units destroyed (to soft-delete).
    pub destroyed_units: Vec<UnitId>,
    /// Defender structures reset to level 0.
    pub reset_structures: Vec<ItemId>,
    /// Final attacker resource state.
    pub attacker_resources: Vec<Resource>,
    /// Final defender resource state.
    pub defender_resources: Vec<Resource>,
    /// New owner of the defending planet, when colonization happened.
    pub new_owner: Option<UserId>,
}

/// Resolves one fight between two planets.
///
/// One-shot: [`CombatResolver::resolve`] consumes the resolver, so a
/// resolution cannot be replayed with advanced RNG state by accident.
#[derive(Debug)]
pub struct CombatResolver<S: Sampler> {
    sampler: S,
    colony_ship: ItemId,
    now: Timestamp,
}

impl<S: Sampler> CombatResolver<S> {
    /// Create a resolver.
    ///
    /// `colony_ship` designates the catalog item whose survival converts
    /// a win into an ownership transfer. `now` is the single timestamp
    /// for the whole resolution.
    pub const fn new(sampler: S, colony_ship: ItemId, now: Timestamp) -> Self {
        Self {
            sampler,
            colony_ship,
            now,
        }
    }

    /// Resolve a fight.
    pub fn resolve(mut self, input: CombatInput) -> Result<CombatReport, CombatError> {
        let CombatInput {
            attacker,
            mut defender,
            selected_units,
        } = input;

        if attacker.owner == defender.owner {
            return Err(CombatError::SameOwner(attacker.owner));
        }
        if defender.owner == UserId::NOBODY {
            return Err(CombatError::UnownedDefender(defender.planet));
        }

        let selected: HashSet<UnitId> = selected_units.into_iter().collect();

        // Aggregation. The attacker fights with the committed, finished
        // units; the defender with every finished active unit plus every
        // armed structure.
        let attacker_pool: Vec<&DerivedItem> = attacker
            .units
            .iter()
            .filter(|item| {
                item.unit.is_some_and(|unit| {
                    selected.contains(&unit.id) && unit.active && !unit.create_in_progress
                })
            })
            .collect();
        let defender_units: Vec<&DerivedItem> = defender
            .units
            .iter()
            .filter(|item| {
                item.unit
                    .is_some_and(|unit| unit.active && !unit.create_in_progress)
            })
            .collect();
        let defender_structures: Vec<&DerivedItem> = defender
            .structures
            .iter()
            .filter(|item| item.level > 0 && (item.attack_point != 0 || item.defense_point != 0))
            .collect();

        let attacker_attack: i64 = attacker_pool.iter().map(|i| i.attack_point).sum();
        let attacker_defense: i64 = attacker_pool.iter().map(|i| i.defense_point).sum();
        let defender_attack: i64 = defender_units
            .iter()
            .chain(defender_structures.iter())
            .map(|i| i.attack_point)
            .sum();
        let defender_defense: i64 = defender_units
            .iter()
            .chain(defender_structures.iter())
            .map(|i| i.defense_point)
            .sum();

        // Outcome precedence: the defender's counterattack is checked
        // before the attacker's breakthrough.
        let result = if defender_attack > attacker_defense {
            FightResult::Lose
        } else if attacker_attack > defender_defense {
            FightResult::Win
        } else {
            FightResult::Draw
        };

        // Structure damage, proportional to how far the attack exceeded
        // the defense.
        let mut reset_structures: Vec<ItemId> = Vec::new();
        if defender_defense != 0 {
            let pct = attacker_attack as f64 / defender_defense as f64;
            let eligible: Vec<ItemId> = defender
                .structures
                .iter()
                .filter(|item| item.level > 0 && item.defense_point != 0)
                .map(|item| item.item_id)
                .collect();
            reset_structures = self.proportional_draw(&eligible, pct);
        }

        // Attacker losses, same shape over the committed units.
        let mut destroyed_units: Vec<UnitId> = Vec::new();
        if attacker_defense != 0 {
            let pct = defender_attack as f64 / attacker_defense as f64;
            let pool_ids: Vec<UnitId> = attacker_pool
                .iter()
                .filter_map(|item| item.unit.map(|unit| unit.id))
                .collect();
            destroyed_units = self.proportional_draw(&pool_ids, pct);
        }

        let destroyed: HashSet<UnitId> = destroyed_units.iter().copied().collect();
        let mut acquired: Vec<ResourceAmount> = Vec::new();
        let mut new_owner: Option<UserId> = None;

        match result {
            FightResult::Lose => {
                // The wreckage refunds the defender with the destroyed
                // units' construction costs.
                if !destroyed.is_empty() {
                    let refund = sum_costs(
                        attacker_pool
                            .iter()
                            .filter(|item| {
                                item.unit.is_some_and(|unit| destroyed.contains(&unit.id))
                            })
                            .copied(),
                    );
                    defender.ledger.credit(&refund);
                }
            }
            FightResult::Win => {
                let survivors: Vec<&DerivedItem> = attacker_pool
                    .iter()
                    .filter(|item| {
                        item.unit.is_some_and(|unit| !destroyed.contains(&unit.id))
                    })
                    .copied()
                    .collect();
                let colonizing = survivors
                    .iter()
                    .any(|item| item.item_id == self.colony_ship);

                if colonizing {
                    // Colonization short-circuits looting entirely.
                    new_owner = Some(attacker.owner);
                } else {
                    let mut remaining_freight: i64 =
                        survivors.iter().map(|item| item.freight_capacity).sum();
                    defender.ledger.refresh(&defender.structures, None)?;

                    let mut stock: Vec<(crate::planet::ResourceId, i64)> = defender
                        .ledger
                        .resources()
                        .iter()
                        .map(|resource| (resource.id, resource.quantity))
                        .collect();
                    stock.sort_by_key(|(id, _)| *id);

                    for (resource, quantity) in stock {
                        if remaining_freight <= 0 {
                            break;
                        }
                        let loot = remaining_freight.min(quantity);
                        if loot <= 0 {
                            continue;
                        }
                        acquired.push(ResourceAmount { resource, quantity: loot });
                        remaining_freight -= loot;
                    }
                    defender.ledger.debit(&acquired);
                }
            }
            FightResult::Draw => {}
        }

        let mut attacker_ledger = attacker.ledger;
        if !acquired.is_empty() {
            attacker_ledger.credit(&acquired);
        }

        tracing::debug!(
            ?result,
            attacker_attack,
            attacker_defense,
            defender_attack,
            defender_defense,
            destroyed = destroyed_units.len(),
            reset = reset_structures.len(),
            "Fight resolved"
        );

        let fight = Fight {
            timestamp: self.now,
            attacker_planet: attacker.planet,
            defender_planet: defender.planet,
            result,
            attackers: attacker_pool.iter().map(|i| participant(i)).collect(),
            defenders: defender_units
                .iter()
                .chain(defender_structures.iter())
                .map(|i| participant(i))
                .collect(),
            acquired: acquired.clone(),
        };

        Ok(CombatReport {
            fight,
            destroyed_units,
            reset_structures,
            attacker_resources: attacker_ledger.into_resources(),
            defender_resources: defender.ledger.into_resources(),
            new_owner,
        })
    }

    /// Pick the proportion `pct` of `pool`, rounded to the nearest whole
    /// count: everything at `pct >= 1`, a uniform without-replacement
    /// draw below that, nothing when the rounded count is zero.
    fn proportional_draw<T: Copy>(&mut self, pool: &[T], pct: f64) -> Vec<T> {
        if pool.is_empty() {
            return Vec::new();
        }
        if pct >= 1.0 {
            return pool.to_vec();
        }
        let count = (pool.len() as f64 * pct).round() as usize;
        if count == 0 {
            return Vec::new();
        }
        self.sampler
            .sample(pool.len(), count)
            .into_iter()
            .map(|index| pool[index])
            .collect()
    }
}

/// Sum construction costs per resource over a set of derived items,
/// in ascending resource-id order.
fn sum_costs<'a>(items: impl Iterator<Item = &'a DerivedItem>) -> Vec<ResourceAmount> {
    let mut totals: HashMap<crate::planet::ResourceId, i64> = HashMap::new();
    for item in items {
        for cost in &item.costs {
            *totals.entry(cost.resource).or_insert(0) += cost.quantity;
        }
    }
    let mut refund: Vec<ResourceAmount> = totals
        .into_iter()
        .map(|(resource, quantity)| ResourceAmount { resource, quantity })
        .collect();
    refund.sort_by_key(|amount| amount.resource);
    refund
}

fn participant(item: &DerivedItem) -> FightParticipant {
    FightParticipant {
        item_id: item.item_id,
        name: item.name.clone(),
        unit_id: item.unit.map(|unit| unit.id),
        level: item.level,
        attack_point: item.attack_point,
        defense_point: item.defense_point,
    }
}
