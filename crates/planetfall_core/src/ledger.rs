//! Per-planet resource ledger: production refresh, time-based accrual,
//! reservation and credit/debit operations.
//!
//! A ledger holds one planet's [`Resource`] set for the duration of one
//! logical operation - it is not a long-lived cache. `now` is sampled
//! once by the caller at construction and reused for every accrual and
//! timestamp bump inside the operation, so elapsed-minute arithmetic
//! stays internally consistent.

use std::collections::HashMap;

use crate::error::{FormulaError, InsufficientResources};
use crate::evaluator::DerivedItem;
use crate::formula::{self, Bindings};
use crate::planet::{ItemId, Resource, ResourceAmount, ResourceId, Timestamp, ENERGY};

/// In-memory resource state of one planet.
#[derive(Debug, Clone)]
pub struct ResourceLedger {
    resources: Vec<Resource>,
    now: Timestamp,
}

impl ResourceLedger {
    /// Wrap a planet's resource records for one operation.
    #[must_use]
    pub const fn new(resources: Vec<Resource>, now: Timestamp) -> Self {
        Self { resources, now }
    }

    /// The timestamp this ledger operates at.
    #[must_use]
    pub const fn now(&self) -> Timestamp {
        self.now
    }

    /// Read access to the current resource records.
    #[must_use]
    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    /// Consume the ledger, yielding the final records for persistence.
    #[must_use]
    pub fn into_resources(self) -> Vec<Resource> {
        self.resources
    }

    /// Current stock of one resource, 0 if the planet has no record.
    #[must_use]
    pub fn quantity(&self, id: ResourceId) -> i64 {
        self.resources
            .iter()
            .find(|resource| resource.id == id)
            .map_or(0, |resource| resource.quantity)
    }

    /// Recompute production from the planet's structures, then apply
    /// time-based accrual.
    ///
    /// For every structure with `level > 0`, each production rule is
    /// evaluated with `level` bound to the structure's level and `bonus`
    /// to the target resource's planetary bonus; contributions to the
    /// same resource sum. Structures at level 0 contribute nothing.
    ///
    /// Energy is special-cased: its production is recomputed from a
    /// structure's formula only when that structure is the one named by
    /// `just_upgraded`; on every other refresh the stored energy
    /// production is left untouched.
    ///
    /// Accrual after production is known: energy gains its production
    /// instantaneously (timestamp bumped only if production is nonzero);
    /// every other resource gains `production * elapsed_minutes`, with
    /// `elapsed_minutes = round((now - last_time_calc) / 60)` and the
    /// timestamp bumped only if any minute elapsed.
    pub fn refresh(
        &mut self,
        structures: &[DerivedItem],
        just_upgraded: Option<ItemId>,
    ) -> Result<(), FormulaError> {
        let bonuses: HashMap<ResourceId, f64> = self
            .resources
            .iter()
            .map(|resource| (resource.id, resource.bonus))
            .collect();

        let mut totals: HashMap<ResourceId, i64> = HashMap::new();
        let mut energy_production: Option<i64> = None;
        let mut bindings = Bindings::new();

        for structure in structures {
            if structure.level == 0 {
                continue;
            }
            for rule in &structure.production {
                bindings.set("level", f64::from(structure.level));
                bindings.set("bonus", bonuses.get(&rule.resource).copied().unwrap_or(0.0));
                if rule.resource == ENERGY {
                    if just_upgraded == Some(structure.item_id) {
                        energy_production = Some(formula::evaluate(&rule.formula, &bindings)?);
                    }
                } else {
                    let produced = formula::evaluate(&rule.formula, &bindings)?;
                    *totals.entry(rule.resource).or_insert(0) += produced;
                }
            }
        }

        for resource in &mut self.resources {
            if resource.id == ENERGY {
                if let Some(production) = energy_production {
                    resource.production = production;
                }
                resource.quantity += resource.production;
                if resource.production != 0 {
                    resource.last_time_calc = self.now;
                }
            } else {
                resource.production = totals.get(&resource.id).copied().unwrap_or(0);
                let elapsed_minutes =
                    (((self.now - resource.last_time_calc) as f64) / 60.0).round() as i64;
                resource.quantity += resource.production * elapsed_minutes;
                if elapsed_minutes != 0 {
                    resource.last_time_calc = self.now;
                }
            }
        }

        tracing::debug!(now = self.now, resources = self.resources.len(), "Ledger refreshed");
        Ok(())
    }

    /// Check each cost in order and deduct it if affordable.
    ///
    /// On the first unaffordable cost the typed shortfall is returned.
    /// Deductions already applied for earlier costs are NOT rolled back;
    /// this preserves the legacy reservation behavior (see DESIGN.md).
    pub fn check_and_reserve(
        &mut self,
        costs: &[ResourceAmount],
    ) -> Result<(), InsufficientResources> {
        for cost in costs {
            let available = self.quantity(cost.resource);
            if available < cost.quantity {
                return Err(InsufficientResources {
                    resource: cost.resource,
                    required: cost.quantity,
                    available,
                });
            }
            self.apply(cost.resource, -cost.quantity);
        }
        Ok(())
    }

    /// Add the named amounts to the planet's stock.
    pub fn credit(&mut self, amounts: &[ResourceAmount]) {
        for amount in amounts {
            self.apply(amount.resource, amount.quantity);
        }
    }

    /// Subtract the named amounts from the planet's stock.
    pub fn debit(&mut self, amounts: &[ResourceAmount]) {
        for amount in amounts {
            self.apply(amount.resource, -amount.quantity);
        }
    }

    /// Mutate one resource and bump its timestamp. Unknown ids are
    /// ignored; the caller works from this planet's own records.
    fn apply(&mut self, id: ResourceId, delta: i64) {
        if let Some(resource) = self.resources.iter_mut().find(|r| r.id == id) {
            resource.quantity += delta;
            resource.last_time_calc = self.now;
        }
    }
}
