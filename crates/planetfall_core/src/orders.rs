//! Admission check for build and upgrade orders.
//!
//! The outer layer evaluates the item, asks this module whether the
//! order may proceed, and maps a rejection to a user-facing message.
//! Both rejection causes are ordinary typed results, not errors thrown
//! as control flow.

use thiserror::Error;

use crate::data::Prerequisite;
use crate::error::InsufficientResources;
use crate::evaluator::DerivedItem;
use crate::ledger::ResourceLedger;

/// Why a build/upgrade order was not admitted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderRejected {
    /// The item has never been built and its prerequisites are not met.
    #[error("{0:?} prerequisite(s) not met")]
    UnmetPrerequisite(Vec<Prerequisite>),

    /// The planet cannot cover the costs.
    #[error(transparent)]
    InsufficientResources(#[from] InsufficientResources),
}

/// Admit or reject an order for `item`, reserving its costs on success.
///
/// Prerequisites are checked first; they only apply to first builds
/// (the evaluator attaches them only at level 0). Cost reservation
/// follows the ledger's documented semantics, including its partial-
/// deduction behavior on failure.
pub fn validate_order(
    item: &DerivedItem,
    ledger: &mut ResourceLedger,
) -> Result<(), OrderRejected> {
    if !item.unmet_prerequisites.is_empty() {
        return Err(OrderRejected::UnmetPrerequisite(
            item.unmet_prerequisites.clone(),
        ));
    }
    ledger.check_and_reserve(&item.costs)?;
    Ok(())
}
