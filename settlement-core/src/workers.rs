// Worker pool - slots, task assignment, gathering and capacity growth

use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::harvest::NodeKind;
use crate::ledger::ResourceLedger;
use crate::navigation::Navigator;
use crate::progress::{BuildEvent, BuildProgressTracker};
use crate::types::{BuildState, BuildType, WorkerId, WorkerTask};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkerSlot {
    pub task: WorkerTask,
    /// Gathered seconds not yet converted into whole units
    pub gather_accumulator: f64,
}

/// Numbered worker slots `1..=max_workers`, each holding one task.
///
/// Capacity only changes through `set_worker_count` and building completion.
/// Every slot always exists with an agent behind it; an unassigned slot is Idle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerPool {
    slots: BTreeMap<WorkerId, WorkerSlot>,
    /// Upper bound for `set_worker_count`; building unlocks may exceed it
    max_worker_count: u32,
    /// Flat extra capacity granted once per completed building
    completion_bonus: u32,
    applied_unlocks: HashSet<BuildType>,
}

impl WorkerPool {
    pub fn new(starting_workers: u32, max_worker_count: u32, completion_bonus: u32) -> Self {
        let max_worker_count = max_worker_count.max(1);
        let count = starting_workers.clamp(1, max_worker_count);
        Self {
            slots: (1..=count).map(|id| (id, WorkerSlot::default())).collect(),
            max_worker_count,
            completion_bonus,
            applied_unlocks: HashSet::new(),
        }
    }

    pub fn max_workers(&self) -> u32 {
        self.slots.len() as u32
    }

    pub fn max_worker_count(&self) -> u32 {
        self.max_worker_count
    }

    pub fn slots(&self) -> impl Iterator<Item = (WorkerId, &WorkerSlot)> {
        self.slots.iter().map(|(id, slot)| (*id, slot))
    }

    pub fn worker_task(&self, worker: WorkerId) -> Option<WorkerTask> {
        self.slots.get(&worker).map(|slot| slot.task)
    }

    pub fn worker_name(&self, worker: WorkerId) -> String {
        format!("Worker {worker}")
    }

    pub fn assigned_count(&self, build_type: BuildType) -> u32 {
        self.slots
            .values()
            .filter(|slot| slot.task == WorkerTask::Build(build_type))
            .count() as u32
    }

    pub fn workers_assigned_to(&self, build_type: BuildType) -> Vec<WorkerId> {
        self.slots
            .iter()
            .filter(|(_, slot)| slot.task == WorkerTask::Build(build_type))
            .map(|(id, _)| *id)
            .collect()
    }

    /// Give `worker` a new task. Build tasks are only accepted for buildings
    /// that are under construction. Rejections change nothing.
    pub fn assign(
        &mut self,
        worker: WorkerId,
        task: WorkerTask,
        tracker: &BuildProgressTracker,
        nav: &mut impl Navigator,
    ) -> bool {
        if let WorkerTask::Build(build_type) = task {
            if !tracker.is_in_progress(build_type) {
                return false;
            }
        }
        let Some(slot) = self.slots.get_mut(&worker) else {
            return false;
        };

        #[cfg(feature = "instrument")]
        let previous = slot.task;
        slot.task = task;
        slot.gather_accumulator = 0.0;

        match task {
            WorkerTask::Idle => nav.set_idle(worker),
            WorkerTask::Build(build_type) => nav.set_build_target(worker, build_type),
            WorkerTask::GatherWood | WorkerTask::GatherStone => {
                if let Some(node) = NodeKind::for_task(task) {
                    nav.set_gather_target(worker, node);
                }
            }
        }

        #[cfg(feature = "instrument")]
        tracing::info!(
            target: "worker_assign",
            worker = worker,
            from = ?previous,
            to = ?task,
            reason = "command",
        );

        true
    }

    /// Credit one unit per whole second each gathering worker has accumulated.
    /// Fractions carry over to the next tick.
    pub fn tick(&mut self, dt: f64, ledger: &mut ResourceLedger) {
        if dt <= 0.0 {
            return;
        }
        for (_id, slot) in self.slots.iter_mut() {
            let Some(resource) = slot.task.gathered_resource() else {
                continue;
            };
            slot.gather_accumulator += dt;
            let whole = slot.gather_accumulator.floor();
            if whole < 1.0 {
                continue;
            }
            slot.gather_accumulator -= whole;
            let units = whole as u64;
            ledger.credit(resource, units);

            #[cfg(feature = "instrument")]
            tracing::info!(
                target: "gather",
                worker = *_id,
                resource = ?resource,
                units = units,
            );
        }
    }

    /// React to a tracker event. Only completion matters here: capacity grows
    /// once per building and anyone still building it goes idle.
    pub fn handle_build_event(
        &mut self,
        event: BuildEvent,
        catalog: &Catalog,
        nav: &mut impl Navigator,
    ) {
        if event.state != BuildState::Built {
            return;
        }
        let build_type = event.build_type;

        if self.applied_unlocks.insert(build_type) {
            let unlocked = catalog
                .build(build_type)
                .map(|info| info.unlocks_builder_slots)
                .unwrap_or(0);
            self.grow(unlocked.saturating_add(self.completion_bonus), nav);
        }

        for worker in self.workers_assigned_to(build_type) {
            if let Some(slot) = self.slots.get_mut(&worker) {
                slot.task = WorkerTask::Idle;
                slot.gather_accumulator = 0.0;
            }
            nav.set_idle(worker);

            #[cfg(feature = "instrument")]
            tracing::info!(
                target: "worker_assign",
                worker = worker,
                from = ?WorkerTask::Build(build_type),
                to = ?WorkerTask::Idle,
                reason = "building_finished",
            );
        }
    }

    /// Grow or shrink to `count` slots, clamped to `[1, max_worker_count]`.
    /// Returns the resulting capacity.
    pub fn set_worker_count(&mut self, count: u32, nav: &mut impl Navigator) -> u32 {
        self.resize(count, nav)
    }

    /// Add `extra` slots past the current capacity. Building unlocks are
    /// not bound by `max_worker_count`.
    fn grow(&mut self, extra: u32, nav: &mut impl Navigator) {
        if extra == 0 {
            return;
        }
        let current = self.max_workers();
        let target = current.saturating_add(extra);
        self.add_slots(current, target, nav);

        #[cfg(feature = "instrument")]
        tracing::info!(
            target: "worker_slots",
            from = current,
            to = target,
        );
    }

    fn add_slots(&mut self, current: u32, target: u32, nav: &mut impl Navigator) {
        for id in (current + 1)..=target {
            self.slots.insert(id, WorkerSlot::default());
            nav.set_idle(id);
        }
    }

    fn resize(&mut self, count: u32, nav: &mut impl Navigator) -> u32 {
        let target = count.clamp(1, self.max_worker_count);
        let current = self.max_workers();
        if target == current {
            return current;
        }

        if target > current {
            self.add_slots(current, target, nav);
        } else {
            let removed: Vec<WorkerId> = self
                .slots
                .range((target + 1)..)
                .map(|(id, _)| *id)
                .collect();
            for id in removed {
                self.slots.remove(&id);
                nav.release(id);
            }
        }

        #[cfg(feature = "instrument")]
        tracing::info!(
            target: "worker_slots",
            from = current,
            to = target,
        );

        target
    }
}
