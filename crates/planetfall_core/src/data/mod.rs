//! Data-driven catalog definitions.
//!
//! Catalogs are authored as RON, loaded once per process and immutable
//! afterwards. Loading validates the whole catalog eagerly - duplicate
//! ids or keys, unparseable formulas and dangling prerequisite references
//! are load-time errors, never runtime surprises.

mod item_data;

pub use item_data::{Category, CostFormula, ItemCatalogEntry, Prerequisite, ProductionRule};

use std::collections::HashMap;

use thiserror::Error;

use crate::error::FormulaError;
use crate::formula;
use crate::planet::ItemId;

/// Failure while loading or validating a catalog.
///
/// Like [`FormulaError`], this indicates corrupt static data and is
/// surfaced to the operator.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The RON document could not be parsed.
    #[error("failed to parse catalog: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// Two entries share an item id.
    #[error("duplicate item id {0:?}")]
    DuplicateId(ItemId),

    /// Two entries share a formula key.
    #[error("duplicate item key '{0}'")]
    DuplicateKey(String),

    /// A key is not a valid formula identifier.
    #[error("item key '{0}' is not a lowercase identifier")]
    InvalidKey(String),

    /// A stored formula failed to parse.
    #[error("item '{key}' has a malformed {field} formula: {source}")]
    BadFormula {
        /// Key of the offending entry.
        key: String,
        /// Which formula field failed.
        field: &'static str,
        /// The parse failure.
        source: FormulaError,
    },

    /// A prerequisite references an item id not present in the catalog.
    #[error("item '{key}' requires unknown item {required:?}")]
    UnknownPrerequisite {
        /// Key of the offending entry.
        key: String,
        /// The dangling reference.
        required: ItemId,
    },

    /// Production rules are only meaningful on structures.
    #[error("item '{0}' is not a structure but declares production rules")]
    NonStructureProduction(String),
}

/// Immutable registry of catalog entries with id and key lookup.
#[derive(Debug, Clone)]
pub struct Catalog {
    entries: Vec<ItemCatalogEntry>,
    by_id: HashMap<ItemId, usize>,
    by_key: HashMap<String, usize>,
}

impl Catalog {
    /// Build a catalog from entries, validating the whole set.
    pub fn from_entries(entries: Vec<ItemCatalogEntry>) -> Result<Self, CatalogError> {
        let mut by_id = HashMap::new();
        let mut by_key = HashMap::new();

        for (index, entry) in entries.iter().enumerate() {
            if !is_valid_key(&entry.key) {
                return Err(CatalogError::InvalidKey(entry.key.clone()));
            }
            if by_id.insert(entry.id, index).is_some() {
                return Err(CatalogError::DuplicateId(entry.id));
            }
            if by_key.insert(entry.key.clone(), index).is_some() {
                return Err(CatalogError::DuplicateKey(entry.key.clone()));
            }
        }

        for entry in &entries {
            validate_formulas(entry)?;
            if entry.category != Category::Structure && !entry.production.is_empty() {
                return Err(CatalogError::NonStructureProduction(entry.key.clone()));
            }
            for prerequisite in &entry.prerequisites {
                if !by_id.contains_key(&prerequisite.required_item) {
                    return Err(CatalogError::UnknownPrerequisite {
                        key: entry.key.clone(),
                        required: prerequisite.required_item,
                    });
                }
            }
        }

        Ok(Self {
            entries,
            by_id,
            by_key,
        })
    }

    /// Load a catalog from a RON document.
    pub fn from_ron(source: &str) -> Result<Self, CatalogError> {
        let entries: Vec<ItemCatalogEntry> = ron::from_str(source)?;
        Self::from_entries(entries)
    }

    /// Look up an entry by item id.
    #[must_use]
    pub fn get(&self, id: ItemId) -> Option<&ItemCatalogEntry> {
        self.by_id.get(&id).map(|&index| &self.entries[index])
    }

    /// Look up an entry by its formula key.
    #[must_use]
    pub fn get_by_key(&self, key: &str) -> Option<&ItemCatalogEntry> {
        self.by_key.get(key).map(|&index| &self.entries[index])
    }

    /// Iterate over all entries in declaration order.
    pub fn entries(&self) -> impl Iterator<Item = &ItemCatalogEntry> {
        self.entries.iter()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn is_valid_key(key: &str) -> bool {
    let mut chars = key.chars();
    match chars.next() {
        Some(c) if c.is_ascii_lowercase() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

fn validate_formulas(entry: &ItemCatalogEntry) -> Result<(), CatalogError> {
    let check = |field: &'static str, text: &str| {
        formula::parse(text)
            .map(|_| ())
            .map_err(|source| CatalogError::BadFormula {
                key: entry.key.clone(),
                field,
                source,
            })
    };

    check("build_time", &entry.build_time)?;
    check("attack_point", &entry.attack_point)?;
    check("defense_point", &entry.defense_point)?;
    check("freight_capacity", &entry.freight_capacity)?;
    for cost in &entry.costs {
        check("cost", &cost.formula)?;
    }
    for rule in &entry.production {
        check("production", &rule.formula)?;
    }
    Ok(())
}
