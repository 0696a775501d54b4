//! Catalog entry data structures.

use serde::{Deserialize, Serialize};

use crate::planet::{ItemId, ResourceId};

/// Category tag distinguishing the three kinds of buildable things.
///
/// A single tagged field rather than a type hierarchy: structures carry
/// production rules, units are instantiated per planet, research is pure
/// levels. Everything else about an entry is uniform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    /// Planet-bound building with per-level production and combat stats.
    Structure,
    /// Technology tracked only as a level.
    Research,
    /// Military/transport item instantiated as individual [`crate::planet::Unit`]s.
    Unit,
}

/// One resource cost of building or upgrading an item.
///
/// The formula is evaluated against the same bindings as the item's other
/// formulas, so costs can scale with `level` and with other items' levels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostFormula {
    /// Resource the cost is paid in.
    pub resource: ResourceId,
    /// Raw formula for the quantity.
    pub formula: String,
}

/// Minimum level of another item required before this item can be built
/// for the first time.
///
/// Prerequisites freeze once the item reaches level 1; upgrading past
/// level 1 never re-checks them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prerequisite {
    /// The required item.
    pub required_item: ItemId,
    /// The minimum level it must have.
    pub required_level: u32,
}

/// Per-level resource production of a structure.
///
/// Evaluated with `level` bound to the structure's level and `bonus` to
/// the target resource's planetary bonus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductionRule {
    /// Resource being produced.
    pub resource: ResourceId,
    /// Raw formula for production per minute.
    pub formula: String,
}

/// Static definition of a buildable/researchable thing and its formulas.
///
/// Immutable once loaded into a [`super::Catalog`]. The `key` is the
/// lowercase identifier other items' formulas use to reference this
/// item's current planet level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemCatalogEntry {
    /// Unique identifier.
    pub id: ItemId,
    /// Formula-namespace identifier, e.g. `metal_mine`.
    pub key: String,
    /// Category tag.
    pub category: Category,
    /// Display name.
    pub name: String,
    /// Formula for build/upgrade time in seconds.
    #[serde(default = "zero_formula")]
    pub build_time: String,
    /// Formula for attack points.
    #[serde(default = "zero_formula")]
    pub attack_point: String,
    /// Formula for defense points.
    #[serde(default = "zero_formula")]
    pub defense_point: String,
    /// Formula for freight capacity when looting.
    #[serde(default = "zero_formula")]
    pub freight_capacity: String,
    /// Image reference for the outer layer; opaque to the core.
    #[serde(default)]
    pub image: String,
    /// Resource costs of building or upgrading.
    #[serde(default)]
    pub costs: Vec<CostFormula>,
    /// Items that must be built before this one.
    #[serde(default)]
    pub prerequisites: Vec<Prerequisite>,
    /// Production rules; structures only.
    #[serde(default)]
    pub production: Vec<ProductionRule>,
}

fn zero_formula() -> String {
    "0".to_string()
}

impl ItemCatalogEntry {
    /// Create a minimal entry with all formulas at the zero expression.
    #[must_use]
    pub fn new(
        id: ItemId,
        key: impl Into<String>,
        category: Category,
        name: impl Into<String>,
    ) -> Self {
        Self {
            id,
            key: key.into(),
            category,
            name: name.into(),
            build_time: zero_formula(),
            attack_point: zero_formula(),
            defense_point: zero_formula(),
            freight_capacity: zero_formula(),
            image: String::new(),
            costs: Vec::new(),
            prerequisites: Vec::new(),
            production: Vec::new(),
        }
    }

    /// Builder method to set the build time formula.
    #[must_use]
    pub fn with_build_time(mut self, formula: impl Into<String>) -> Self {
        self.build_time = formula.into();
        self
    }

    /// Builder method to set combat stat formulas.
    #[must_use]
    pub fn with_combat(
        mut self,
        attack: impl Into<String>,
        defense: impl Into<String>,
    ) -> Self {
        self.attack_point = attack.into();
        self.defense_point = defense.into();
        self
    }

    /// Builder method to set the freight capacity formula.
    #[must_use]
    pub fn with_freight(mut self, formula: impl Into<String>) -> Self {
        self.freight_capacity = formula.into();
        self
    }

    /// Builder method to add a resource cost.
    #[must_use]
    pub fn with_cost(mut self, resource: ResourceId, formula: impl Into<String>) -> Self {
        self.costs.push(CostFormula {
            resource,
            formula: formula.into(),
        });
        self
    }

    /// Builder method to add a prerequisite.
    #[must_use]
    pub fn with_prerequisite(mut self, required_item: ItemId, required_level: u32) -> Self {
        self.prerequisites.push(Prerequisite {
            required_item,
            required_level,
        });
        self
    }

    /// Builder method to add a production rule.
    #[must_use]
    pub fn with_production(mut self, resource: ResourceId, formula: impl Into<String>) -> Self {
        self.production.push(ProductionRule {
            resource,
            formula: formula.into(),
        });
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_chain() {
        let entry = ItemCatalogEntry::new(ItemId(7), "cruiser", Category::Unit, "Cruiser")
            .with_build_time("1800")
            .with_combat("400 + laser * 20", "150")
            .with_freight("800")
            .with_cost(ResourceId(1), "20000")
            .with_prerequisite(ItemId(3), 4);

        assert_eq!(entry.attack_point, "400 + laser * 20");
        assert_eq!(entry.costs.len(), 1);
        assert_eq!(entry.prerequisites[0].required_level, 4);
        assert!(entry.production.is_empty());
    }
}
