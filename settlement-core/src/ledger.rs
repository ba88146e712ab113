// Resource ledger - the settlement's stock of every resource type

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tsify_next::Tsify;

use crate::types::{ResourceAmount, ResourceType};

/// A single ledger mutation, kept for the UI popup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
pub struct ResourceChange {
    pub resource: ResourceType,
    pub delta: i64,
    /// Quantity after the change
    pub total: i64,
}

/// Named-resource quantities for one game session.
///
/// Every `ResourceType` is always present. The ledger itself never refuses a
/// deduction: callers check `can_afford` first, so quantities only go negative
/// if a caller skipped that check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceLedger {
    quantities: HashMap<ResourceType, i64>,
    changes: Vec<ResourceChange>,
}

impl ResourceLedger {
    pub fn new() -> Self {
        Self {
            quantities: ResourceType::all().map(|r| (r, 0)).collect(),
            changes: Vec::new(),
        }
    }

    pub fn with_amounts(amounts: &[ResourceAmount]) -> Self {
        let mut ledger = Self::new();
        for amount in amounts {
            *ledger.quantities.entry(amount.resource).or_insert(0) += i64::from(amount.amount);
        }
        ledger
    }

    pub fn get(&self, resource: ResourceType) -> i64 {
        self.quantities.get(&resource).copied().unwrap_or(0)
    }

    /// Snapshot of every resource, including untouched zero entries
    pub fn get_all(&self) -> HashMap<ResourceType, i64> {
        self.quantities.clone()
    }

    pub fn add(&mut self, resource: ResourceType, amount: u32) {
        self.apply(resource, i64::from(amount));
    }

    /// Add a bulk amount, saturating at `i64::MAX`
    pub fn credit(&mut self, resource: ResourceType, amount: u64) {
        self.apply(resource, i64::try_from(amount).unwrap_or(i64::MAX));
    }

    pub fn deduct(&mut self, resource: ResourceType, amount: u32) {
        self.apply(resource, -i64::from(amount));
    }

    /// True when every listed cost is covered
    pub fn can_afford(&self, costs: &[ResourceAmount]) -> bool {
        costs
            .iter()
            .all(|cost| self.get(cost.resource) >= i64::from(cost.amount))
    }

    pub fn deduct_all(&mut self, costs: &[ResourceAmount]) {
        for cost in costs {
            self.deduct(cost.resource, cost.amount);
        }
    }

    /// Drain pending change notifications (oldest first)
    pub fn take_changes(&mut self) -> Vec<ResourceChange> {
        std::mem::take(&mut self.changes)
    }

    fn apply(&mut self, resource: ResourceType, delta: i64) {
        let total = {
            let qty = self.quantities.entry(resource).or_insert(0);
            *qty = qty.saturating_add(delta);
            *qty
        };
        self.changes.push(ResourceChange {
            resource,
            delta,
            total,
        });

        #[cfg(feature = "instrument")]
        tracing::info!(
            target: "ledger",
            resource = ?resource,
            delta = delta,
            total = total,
        );
    }
}

impl Default for ResourceLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_ledger_has_every_resource_at_zero() {
        let ledger = ResourceLedger::new();
        let all = ledger.get_all();
        assert_eq!(all.len(), ResourceType::all().count());
        assert!(all.values().all(|q| *q == 0));
    }

    #[test]
    fn test_add_and_deduct() {
        let mut ledger = ResourceLedger::new();
        ledger.add(ResourceType::Wood, 10);
        ledger.deduct(ResourceType::Wood, 4);
        assert_eq!(ledger.get(ResourceType::Wood), 6);
        assert_eq!(ledger.get(ResourceType::Stone), 0);
    }

    #[test]
    fn test_deduct_is_unguarded() {
        let mut ledger = ResourceLedger::new();
        ledger.deduct(ResourceType::Gold, 3);
        assert_eq!(ledger.get(ResourceType::Gold), -3);
    }

    #[test]
    fn test_bulk_credit_saturates() {
        let mut ledger = ResourceLedger::new();
        ledger.credit(ResourceType::Wood, 5_000_000_000);
        assert_eq!(ledger.get(ResourceType::Wood), 5_000_000_000);

        ledger.credit(ResourceType::Wood, u64::MAX);
        assert_eq!(ledger.get(ResourceType::Wood), i64::MAX);
    }

    #[test]
    fn test_can_afford() {
        let ledger = ResourceLedger::with_amounts(&[
            ResourceAmount::new(ResourceType::Wood, 5),
            ResourceAmount::new(ResourceType::Stone, 2),
        ]);

        // Exactly enough
        assert!(ledger.can_afford(&[ResourceAmount::new(ResourceType::Wood, 5)]));
        // One short
        assert!(!ledger.can_afford(&[
            ResourceAmount::new(ResourceType::Wood, 5),
            ResourceAmount::new(ResourceType::Stone, 3),
        ]));
        // Nothing to pay
        assert!(ledger.can_afford(&[]));
    }

    #[test]
    fn test_changes_are_recorded_and_drained() {
        let mut ledger = ResourceLedger::new();
        ledger.add(ResourceType::Stone, 7);
        ledger.deduct(ResourceType::Stone, 2);

        let changes = ledger.take_changes();
        assert_eq!(
            changes,
            vec![
                ResourceChange {
                    resource: ResourceType::Stone,
                    delta: 7,
                    total: 7
                },
                ResourceChange {
                    resource: ResourceType::Stone,
                    delta: -2,
                    total: 5
                },
            ]
        );
        assert!(ledger.take_changes().is_empty());
    }
}
