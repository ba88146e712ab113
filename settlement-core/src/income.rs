// Passive income - periodic payouts from completed buildings

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::ledger::ResourceLedger;
use crate::progress::BuildProgressTracker;
use crate::types::{BuildType, ResourceType};

/// Waits `start_delay` seconds, then pays out at the end of every `interval`.
/// The first payout lands at `start_delay + interval`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PassiveIncomeScheduler {
    interval: f64,
    elapsed: f64,
    next_due: f64,
    firings: u64,
}

impl PassiveIncomeScheduler {
    /// A non-positive interval disables the scheduler
    pub fn new(start_delay: f64, interval: f64) -> Self {
        let next_due = if interval > 0.0 {
            start_delay.max(0.0) + interval
        } else {
            f64::INFINITY
        };
        Self {
            interval,
            elapsed: 0.0,
            next_due,
            firings: 0,
        }
    }

    pub fn firings(&self) -> u64 {
        self.firings
    }

    /// Seconds until the next payout
    pub fn time_until_next(&self) -> f64 {
        (self.next_due - self.elapsed).max(0.0)
    }

    /// Advance the clock and pay out for every deadline crossed. Missed
    /// payouts are settled together with one ledger add per resource.
    /// Returns the number of intervals paid.
    pub fn tick(
        &mut self,
        dt: f64,
        catalog: &Catalog,
        tracker: &BuildProgressTracker,
        ledger: &mut ResourceLedger,
    ) -> u64 {
        if dt.is_finite() && dt > 0.0 {
            self.elapsed += dt;
        }
        if self.elapsed < self.next_due {
            return 0;
        }

        let due = ((self.elapsed - self.next_due) / self.interval).floor() + 1.0;
        let intervals = due as u64;
        self.next_due += due * self.interval;
        self.fire(intervals, catalog, tracker, ledger);
        intervals
    }

    /// Total per-resource income from every Built building
    pub fn income_per_interval(
        catalog: &Catalog,
        tracker: &BuildProgressTracker,
    ) -> BTreeMap<ResourceType, u32> {
        let mut totals = BTreeMap::new();
        for build_type in BuildType::concrete().filter(|b| tracker.is_built(*b)) {
            let Some(info) = catalog.build(build_type) else {
                continue;
            };
            for income in &info.passive_income {
                *totals.entry(income.resource).or_insert(0) += income.amount;
            }
        }
        totals
    }

    fn fire(
        &mut self,
        intervals: u64,
        catalog: &Catalog,
        tracker: &BuildProgressTracker,
        ledger: &mut ResourceLedger,
    ) {
        self.firings = self.firings.saturating_add(intervals);
        for (resource, per_interval) in Self::income_per_interval(catalog, tracker) {
            if per_interval == 0 {
                continue;
            }
            let amount = u64::from(per_interval).saturating_mul(intervals);
            ledger.credit(resource, amount);

            #[cfg(feature = "instrument")]
            tracing::info!(
                target: "passive_income",
                firing = self.firings,
                intervals = intervals,
                resource = ?resource,
                amount = amount,
            );
        }
    }
}
