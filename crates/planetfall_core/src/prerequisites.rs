//! Prerequisite resolution for not-yet-built items.
//!
//! Prerequisites gate only the *first* build: once an item reaches
//! level 1 they are frozen and never considered again, no matter how the
//! required items' levels later change. The item evaluator therefore only
//! calls into this module for items at level 0.

use std::collections::HashMap;

use crate::data::{ItemCatalogEntry, Prerequisite};
use crate::planet::ItemId;

/// Compute the prerequisites of `entry` that the planet does not meet.
///
/// A prerequisite is unmet when the planet's level for the required item
/// is below the required level; items absent from `levels` count as
/// level 0. An empty result means the item may be built.
#[must_use]
pub fn unmet_prerequisites(
    entry: &ItemCatalogEntry,
    levels: &HashMap<ItemId, u32>,
) -> Vec<Prerequisite> {
    entry
        .prerequisites
        .iter()
        .filter(|prerequisite| {
            let current = levels
                .get(&prerequisite.required_item)
                .copied()
                .unwrap_or(0);
            current < prerequisite.required_level
        })
        .copied()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Category;

    fn entry_with_prerequisites() -> ItemCatalogEntry {
        ItemCatalogEntry::new(ItemId(10), "cruiser", Category::Unit, "Cruiser")
            .with_prerequisite(ItemId(1), 4)
            .with_prerequisite(ItemId(2), 2)
    }

    #[test]
    fn test_all_met() {
        let entry = entry_with_prerequisites();
        let levels = HashMap::from([(ItemId(1), 4), (ItemId(2), 5)]);
        assert!(unmet_prerequisites(&entry, &levels).is_empty());
    }

    #[test]
    fn test_partially_met() {
        let entry = entry_with_prerequisites();
        let levels = HashMap::from([(ItemId(1), 3), (ItemId(2), 2)]);
        let unmet = unmet_prerequisites(&entry, &levels);
        assert_eq!(unmet.len(), 1);
        assert_eq!(unmet[0].required_item, ItemId(1));
        assert_eq!(unmet[0].required_level, 4);
    }

    #[test]
    fn test_missing_entries_count_as_level_zero() {
        let entry = entry_with_prerequisites();
        let unmet = unmet_prerequisites(&entry, &HashMap::new());
        assert_eq!(unmet.len(), 2);
    }

    #[test]
    fn test_no_prerequisites() {
        let entry = ItemCatalogEntry::new(ItemId(1), "mine", Category::Structure, "Mine");
        assert!(unmet_prerequisites(&entry, &HashMap::new()).is_empty());
    }
}
