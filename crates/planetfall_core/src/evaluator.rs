//! Derivation of item stats, costs and prerequisites from planet state.
//!
//! The evaluator binds a planet's complete level map once, then derives
//! build time, combat points, freight capacity and costs for each
//! requested item via the formula engine. It is read-only over its
//! inputs: catalog and planet records are never mutated, only new
//! [`DerivedItem`] values are returned.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::data::{Catalog, Category, ItemCatalogEntry, Prerequisite, ProductionRule};
use crate::error::FormulaError;
use crate::formula::{self, Bindings};
use crate::planet::{ItemId, PlanetItem, ResourceAmount, Unit, UnitId};
use crate::prerequisites;

/// Failure during an evaluation pass.
#[derive(Debug, Error)]
pub enum EvaluationError {
    /// A planet record references an item id absent from the catalog.
    #[error("no catalog entry for item {0:?}")]
    UnknownItem(ItemId),

    /// A stored formula failed to evaluate.
    #[error(transparent)]
    Formula(#[from] FormulaError),
}

/// Instance state carried onto a derived unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitState {
    /// Instance identifier.
    pub id: UnitId,
    /// Whether the unit is still under construction.
    pub create_in_progress: bool,
    /// False once the unit has been destroyed.
    pub active: bool,
}

/// One item with all formula-derived values attached.
///
/// Structures and research are derived from their [`PlanetItem`] record;
/// units are derived per instance and additionally carry [`UnitState`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedItem {
    /// Catalog item id.
    pub item_id: ItemId,
    /// Catalog formula key.
    pub key: String,
    /// Category tag.
    pub category: Category,
    /// Display name.
    pub name: String,
    /// Level the values were derived at.
    pub level: u32,
    /// Build/upgrade time in seconds.
    pub build_time: i64,
    /// Attack points.
    pub attack_point: i64,
    /// Defense points.
    pub defense_point: i64,
    /// Freight capacity when looting.
    pub freight_capacity: i64,
    /// Evaluated resource costs of building or upgrading.
    pub costs: Vec<ResourceAmount>,
    /// Unmet prerequisites; only populated for unbuilt items.
    pub unmet_prerequisites: Vec<Prerequisite>,
    /// Production rules, passed through for the resource ledger.
    pub production: Vec<ProductionRule>,
    /// Instance state when this derived item is a unit instance.
    pub unit: Option<UnitState>,
}

impl DerivedItem {
    /// Whether every prerequisite for a first build is satisfied.
    #[must_use]
    pub fn buildable(&self) -> bool {
        self.unmet_prerequisites.is_empty()
    }
}

/// Evaluates catalog items against one planet's current levels.
#[derive(Debug, Clone, Copy)]
pub struct ItemEvaluator<'a> {
    catalog: &'a Catalog,
}

impl<'a> ItemEvaluator<'a> {
    /// Create an evaluator over a loaded catalog.
    #[must_use]
    pub const fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    /// Derive stats for a set of planet item records.
    ///
    /// `levels` must contain every item on the planet, not just the ones
    /// being evaluated, because formulas may reference arbitrary other
    /// items. Use [`crate::planet::level_map`] over the full roster.
    pub fn evaluate_items(
        &self,
        items: &[PlanetItem],
        levels: &HashMap<ItemId, u32>,
    ) -> Result<Vec<DerivedItem>, EvaluationError> {
        let mut bindings = self.level_bindings(levels);
        items
            .iter()
            .map(|item| {
                let entry = self
                    .catalog
                    .get(item.item_id)
                    .ok_or(EvaluationError::UnknownItem(item.item_id))?;
                let derived =
                    self.evaluate_entry(entry, item.level, None, &mut bindings, levels)?;
                Ok(derived)
            })
            .collect()
    }

    /// Derive stats for a planet's unit instances.
    ///
    /// All instances of one catalog item share derived stats; the level
    /// bound for a unit's formulas is the planet's level for its catalog
    /// item (0 if the planet has no record for it).
    pub fn evaluate_units(
        &self,
        units: &[Unit],
        levels: &HashMap<ItemId, u32>,
    ) -> Result<Vec<DerivedItem>, EvaluationError> {
        let mut bindings = self.level_bindings(levels);
        units
            .iter()
            .map(|unit| {
                let entry = self
                    .catalog
                    .get(unit.item_id)
                    .ok_or(EvaluationError::UnknownItem(unit.item_id))?;
                let level = levels.get(&unit.item_id).copied().unwrap_or(0);
                let state = UnitState {
                    id: unit.id,
                    create_in_progress: unit.create_in_progress,
                    active: unit.active,
                };
                let derived =
                    self.evaluate_entry(entry, level, Some(state), &mut bindings, levels)?;
                Ok(derived)
            })
            .collect()
    }

    /// Bind every catalog key to the planet's level for that item.
    ///
    /// Items without a planet record bind to 0, matching the formula
    /// engine's default for unbound identifiers.
    fn level_bindings(&self, levels: &HashMap<ItemId, u32>) -> Bindings {
        let mut bindings = Bindings::new();
        for entry in self.catalog.entries() {
            let level = levels.get(&entry.id).copied().unwrap_or(0);
            bindings.set(entry.key.clone(), f64::from(level));
        }
        bindings
    }

    fn evaluate_entry(
        &self,
        entry: &ItemCatalogEntry,
        level: u32,
        unit: Option<UnitState>,
        bindings: &mut Bindings,
        levels: &HashMap<ItemId, u32>,
    ) -> Result<DerivedItem, FormulaError> {
        bindings.set("level", f64::from(level));

        let costs = entry
            .costs
            .iter()
            .map(|cost| {
                Ok(ResourceAmount {
                    resource: cost.resource,
                    quantity: formula::evaluate(&cost.formula, bindings)?,
                })
            })
            .collect::<Result<Vec<_>, FormulaError>>()?;

        // Prerequisites are frozen once the item is first built; unit
        // instances by definition passed the check when created.
        let unmet_prerequisites = if level == 0 && unit.is_none() {
            prerequisites::unmet_prerequisites(entry, levels)
        } else {
            Vec::new()
        };

        Ok(DerivedItem {
            item_id: entry.id,
            key: entry.key.clone(),
            category: entry.category,
            name: entry.name.clone(),
            level,
            build_time: formula::evaluate(&entry.build_time, bindings)?,
            attack_point: formula::evaluate(&entry.attack_point, bindings)?,
            defense_point: formula::evaluate(&entry.defense_point, bindings)?,
            freight_capacity: formula::evaluate(&entry.freight_capacity, bindings)?,
            costs,
            unmet_prerequisites,
            production: entry.production.clone(),
            unit,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planet::ResourceId;

    fn catalog() -> Catalog {
        Catalog::from_entries(vec![
            ItemCatalogEntry::new(ItemId(1), "metal_mine", Category::Structure, "Metal Mine")
                .with_build_time("60 * 1.5 ^ level")
                .with_cost(ResourceId(1), "40 * 1.5 ^ level")
                .with_production(ResourceId(1), "30 * level * bonus"),
            ItemCatalogEntry::new(ItemId(2), "laser", Category::Research, "Laser Technology")
                .with_build_time("120 * level + 120"),
            ItemCatalogEntry::new(ItemId(3), "fighter", Category::Unit, "Fighter")
                .with_build_time("600")
                .with_combat("50 + laser * 5", "40 + metal_mine")
                .with_cost(ResourceId(1), "3000")
                .with_prerequisite(ItemId(2), 2),
        ])
        .unwrap()
    }

    #[test]
    fn test_cross_item_formula_sees_other_levels() {
        let catalog = catalog();
        let evaluator = ItemEvaluator::new(&catalog);
        let levels = HashMap::from([(ItemId(2), 3), (ItemId(3), 0), (ItemId(1), 7)]);

        let derived = evaluator
            .evaluate_items(&[PlanetItem::at_level(ItemId(3), 0)], &levels)
            .unwrap();
        // 50 + laser(3) * 5 and 40 + metal_mine(7)
        assert_eq!(derived[0].attack_point, 65);
        assert_eq!(derived[0].defense_point, 47);
    }

    #[test]
    fn test_level_binding_per_item() {
        let catalog = catalog();
        let evaluator = ItemEvaluator::new(&catalog);
        let levels = HashMap::from([(ItemId(1), 2), (ItemId(2), 5)]);

        let derived = evaluator
            .evaluate_items(
                &[
                    PlanetItem::at_level(ItemId(1), 2),
                    PlanetItem::at_level(ItemId(2), 5),
                ],
                &levels,
            )
            .unwrap();
        assert_eq!(derived[0].build_time, 135); // 60 * 1.5^2
        assert_eq!(derived[1].build_time, 720); // 120 * 5 + 120
    }

    #[test]
    fn test_costs_evaluated_per_level() {
        let catalog = catalog();
        let evaluator = ItemEvaluator::new(&catalog);
        let levels = HashMap::from([(ItemId(1), 4)]);

        let derived = evaluator
            .evaluate_items(&[PlanetItem::at_level(ItemId(1), 4)], &levels)
            .unwrap();
        assert_eq!(
            derived[0].costs,
            vec![ResourceAmount {
                resource: ResourceId(1),
                quantity: 203, // 40 * 1.5^4 = 202.5, rounded half away from zero
            }]
        );
    }

    #[test]
    fn test_prerequisites_attached_only_at_level_zero() {
        let catalog = catalog();
        let evaluator = ItemEvaluator::new(&catalog);

        let unbuilt = evaluator
            .evaluate_items(&[PlanetItem::at_level(ItemId(3), 0)], &HashMap::new())
            .unwrap();
        assert_eq!(unbuilt[0].unmet_prerequisites.len(), 1);
        assert!(!unbuilt[0].buildable());

        // Once built, prerequisites are frozen even though laser is
        // still below the required level.
        let built = evaluator
            .evaluate_items(
                &[PlanetItem::at_level(ItemId(3), 1)],
                &HashMap::from([(ItemId(3), 1)]),
            )
            .unwrap();
        assert!(built[0].unmet_prerequisites.is_empty());
        assert!(built[0].buildable());
    }

    #[test]
    fn test_units_share_catalog_stats_and_carry_instance_state() {
        let catalog = catalog();
        let evaluator = ItemEvaluator::new(&catalog);
        let levels = HashMap::from([(ItemId(2), 2)]);

        let mut constructing = Unit::active(UnitId(11), ItemId(3));
        constructing.create_in_progress = true;
        let units = vec![Unit::active(UnitId(10), ItemId(3)), constructing];

        let derived = evaluator.evaluate_units(&units, &levels).unwrap();
        assert_eq!(derived.len(), 2);
        assert_eq!(derived[0].attack_point, 60); // 50 + laser(2) * 5
        assert_eq!(derived[0].attack_point, derived[1].attack_point);
        assert_eq!(derived[0].unit.unwrap().id, UnitId(10));
        assert!(derived[1].unit.unwrap().create_in_progress);
        // Instances never carry prerequisite lists.
        assert!(derived[0].unmet_prerequisites.is_empty());
    }

    #[test]
    fn test_unknown_item_is_an_error() {
        let catalog = catalog();
        let evaluator = ItemEvaluator::new(&catalog);
        let result = evaluator.evaluate_items(&[PlanetItem::at_level(ItemId(99), 1)], &HashMap::new());
        assert!(matches!(result, Err(EvaluationError::UnknownItem(ItemId(99)))));
    }

    #[test]
    fn test_inputs_not_mutated() {
        let catalog = catalog();
        let evaluator = ItemEvaluator::new(&catalog);
        let items = vec![PlanetItem::at_level(ItemId(1), 3)];
        let levels = HashMap::from([(ItemId(1), 3)]);
        let before = items.clone();

        let _ = evaluator.evaluate_items(&items, &levels).unwrap();
        assert_eq!(items, before);
    }
}
