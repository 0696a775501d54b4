//! # Planetfall Core
//!
//! Deterministic simulation core for a turn-less persistent-world
//! strategy game: players upgrade structures and research, build units,
//! and fight over planets.
//!
//! This crate contains **only** deterministic logic:
//! - No rendering
//! - No IO
//! - No system randomness
//!
//! HTTP routing, sessions, SQL persistence and the frontend are external
//! collaborators. The core consumes plain in-memory records from them
//! and returns plain records and decisions back; callers serialize
//! mutations per planet and sample `now` once per operation.
//!
//! ## Crate Structure
//!
//! - [`data`] - data-driven catalog definitions
//! - [`formula`] - sandboxed evaluation of stored formulas
//! - [`prerequisites`] - first-build gating
//! - [`evaluator`] - derivation of stats, costs and prerequisites
//! - [`ledger`] - per-planet resource production and accrual
//! - [`combat`] - fight resolution
//! - [`persistence`] - write-back hooks for the outer layer

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

// Unit tests are compiled as a separate copy of this crate from the one
// `planetfall_test_utils` links against, so the shared fixtures are
// compiled in-tree here; the alias lets their `planetfall_core::` paths
// resolve to this copy.
#[cfg(test)]
extern crate self as planetfall_core;

#[cfg(test)]
#[path = "../../planetfall_test_utils/src/fixtures.rs"]
mod test_fixtures;

pub mod combat;
pub mod data;
pub mod error;
pub mod evaluator;
pub mod formula;
pub mod ledger;
pub mod orders;
pub mod persistence;
pub mod planet;
pub mod prerequisites;
pub mod rng;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::combat::{
        CombatError, CombatInput, CombatReport, CombatResolver, Fight, FightParticipant,
        FightResult, PlanetForce,
    };
    pub use crate::data::{
        Catalog, CatalogError, Category, CostFormula, ItemCatalogEntry, Prerequisite,
        ProductionRule,
    };
    pub use crate::error::{FormulaError, InsufficientResources};
    pub use crate::evaluator::{DerivedItem, EvaluationError, ItemEvaluator, UnitState};
    pub use crate::formula::Bindings;
    pub use crate::ledger::ResourceLedger;
    pub use crate::orders::{validate_order, OrderRejected};
    pub use crate::persistence::{apply_report, PlanetStore};
    pub use crate::planet::{
        level_map, ItemId, PlanetId, PlanetItem, Resource, ResourceAmount, ResourceId, Timestamp,
        Unit, UnitId, UserId, ENERGY,
    };
    pub use crate::rng::{GameRng, Sampler};
}
