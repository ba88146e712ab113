use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use slotmap::SlotMap;
use tsify_next::Tsify;

use crate::catalog::Catalog;
use crate::config::SimConfig;
use crate::construction::ConstructionSite;
use crate::harvest::{HarvestOutcome, ResourceNode};
use crate::income::PassiveIncomeScheduler;
use crate::ledger::{ResourceChange, ResourceLedger};
use crate::navigation::{MovementOrder, Navigator, OrderQueue};
use crate::progress::{BuildEvent, BuildProgressTracker};
use crate::refine::RefineStation;
use crate::selection::Selection;
use crate::tools::ToolProgression;
use crate::types::{
    BuildState, BuildType, KeyToU64, RefineType, ResourceType, SiteId, ToolType, WorkerId,
    WorkerTask,
};
use crate::workers::WorkerPool;

// ============================================================================
// GameState - Every component of one session, wired together
// ============================================================================

/// Owns all engine components and drives them in a fixed order each tick.
///
/// Components never hold references to each other; the state passes the
/// collaborators each call needs. Tracker events are drained and applied to
/// the worker pool before any command or tick phase returns.
#[derive(Debug, Clone)]
pub struct GameState {
    pub tick: u64,
    pub elapsed: f64,
    pub config: SimConfig,
    pub catalog: Catalog,
    pub ledger: ResourceLedger,
    pub tracker: BuildProgressTracker,
    pub sites: SlotMap<SiteId, ConstructionSite>,
    site_index: HashMap<BuildType, SiteId>,
    pub workers: WorkerPool,
    pub income: PassiveIncomeScheduler,
    pub tools: ToolProgression,
    pub orders: OrderQueue,
    pub selection: Selection,
    build_events: Vec<BuildEvent>,
}

impl GameState {
    pub fn new(config: SimConfig) -> Self {
        Self::with_catalog(config, Catalog::standard())
    }

    pub fn with_catalog(config: SimConfig, catalog: Catalog) -> Self {
        #[cfg(feature = "instrument")]
        if let Err(errors) = catalog.validate() {
            for error in errors {
                tracing::warn!(target: "config", error = %error, "catalog validation failed");
            }
        }

        let workers = WorkerPool::new(
            config.starting_workers,
            config.max_worker_count,
            config.workers_per_completed_building,
        );
        let mut orders = OrderQueue::new();
        for (id, _) in workers.slots() {
            orders.set_idle(id);
        }

        Self {
            tick: 0,
            elapsed: 0.0,
            ledger: ResourceLedger::with_amounts(&config.starting_resources),
            tracker: BuildProgressTracker::new(),
            sites: SlotMap::with_key(),
            site_index: HashMap::new(),
            workers,
            income: PassiveIncomeScheduler::new(
                config.passive_income_start_delay_seconds,
                config.passive_income_interval_seconds,
            ),
            tools: ToolProgression::new(),
            orders,
            selection: Selection::Nothing,
            build_events: Vec::new(),
            catalog,
            config,
        }
    }

    // ------------------------------------------------------------------------
    // Tick
    // ------------------------------------------------------------------------

    /// Advance by `dt` seconds: construction, then gathering, then passive income.
    /// Negative or non-finite steps are ignored.
    pub fn advance(&mut self, dt: f64) {
        if !dt.is_finite() || dt < 0.0 {
            return;
        }
        self.tick += 1;
        self.elapsed += dt;

        // Marks made straight on the tracker since the last command
        self.dispatch_build_events();

        // 1. Construction
        let site_ids: Vec<SiteId> = self.sites.keys().collect();
        for site_id in site_ids {
            let Some(site) = self.sites.get_mut(site_id) else {
                continue;
            };
            if !site.is_building {
                continue;
            }
            let workers = self.workers.assigned_count(site.build_type);
            if !site.add_worker_time(workers, dt, &mut self.tracker) {
                site.check_deadline(self.elapsed, &mut self.tracker);
            }
            self.dispatch_build_events();
        }

        // 2. Gathering
        self.workers.tick(dt, &mut self.ledger);

        // 3. Passive income
        self.income
            .tick(dt, &self.catalog, &self.tracker, &mut self.ledger);
    }

    fn dispatch_build_events(&mut self) {
        for event in self.tracker.drain_events() {
            if event.state == BuildState::Built {
                self.close_site(event.build_type);
            }
            self.workers
                .handle_build_event(event, &self.catalog, &mut self.orders);
            self.build_events.push(event);
        }
    }

    /// A site whose building was marked Built elsewhere stops building
    fn close_site(&mut self, build_type: BuildType) {
        let Some(site_id) = self.site_index.get(&build_type).copied() else {
            return;
        };
        if let Some(site) = self.sites.get_mut(site_id) {
            site.finish(&mut self.tracker);
        }
    }

    // ------------------------------------------------------------------------
    // Selection
    // ------------------------------------------------------------------------

    pub fn select_build(&mut self, build_type: BuildType) {
        self.selection = Selection::build(build_type);
    }

    pub fn select_tool(&mut self, tool: ToolType) {
        self.selection = Selection::Tool(tool);
    }

    pub fn select_refine(&mut self, refine: RefineType) {
        self.selection = Selection::Refine(refine);
    }

    pub fn clear_selection(&mut self) {
        self.selection = Selection::Nothing;
    }

    // ------------------------------------------------------------------------
    // Construction
    // ------------------------------------------------------------------------

    /// Whether the ledger covers the selected building's costs
    pub fn can_afford_current_build(&self) -> bool {
        let build_type = self.selection.selected_build();
        if build_type.is_none() {
            return false;
        }
        self.catalog
            .build(build_type)
            .is_some_and(|info| self.ledger.can_afford(&info.costs))
    }

    pub fn try_start_construction(&mut self) -> bool {
        self.start_construction(self.selection.selected_build())
    }

    /// All preconditions for starting `build_type` right now
    pub fn can_start_construction(&self, build_type: BuildType) -> bool {
        if build_type.is_none() || self.tracker.get_state(build_type) != BuildState::NotBuilt {
            return false;
        }
        self.catalog.build(build_type).is_some_and(|info| {
            self.tracker.all_built(&info.required_buildings) && self.ledger.can_afford(&info.costs)
        })
    }

    /// Pay for `build_type`, mark it InProgress and open its site. Nothing
    /// changes when any precondition fails.
    pub fn start_construction(&mut self, build_type: BuildType) -> bool {
        if !self.can_start_construction(build_type) {
            return false;
        }
        let Some(info) = self.catalog.build(build_type) else {
            return false;
        };

        self.ledger.deduct_all(&info.costs);
        self.tracker.mark_in_progress(build_type);

        let mut site = ConstructionSite::begin(build_type, info);
        if let Some(seconds) = self.config.fallback_finish_seconds {
            site = site.with_fallback_deadline(self.elapsed + seconds);
        }
        let site_id = self.sites.insert(site);
        self.site_index.insert(build_type, site_id);

        self.dispatch_build_events();
        true
    }

    pub fn site(&self, build_type: BuildType) -> Option<&ConstructionSite> {
        self.site_index
            .get(&build_type)
            .and_then(|id| self.sites.get(*id))
    }

    pub fn remaining_seconds(&self, build_type: BuildType) -> Option<f64> {
        self.site(build_type)
            .and_then(ConstructionSite::remaining_seconds)
    }

    /// Finish a site immediately, as if its workers had completed it
    pub fn finish_construction(&mut self, build_type: BuildType) -> bool {
        let Some(site_id) = self.site_index.get(&build_type).copied() else {
            return false;
        };
        let Some(site) = self.sites.get_mut(site_id) else {
            return false;
        };
        if site.is_finished {
            return false;
        }
        site.finish(&mut self.tracker);
        self.dispatch_build_events();
        true
    }

    // ------------------------------------------------------------------------
    // Workers
    // ------------------------------------------------------------------------

    pub fn assign_worker(&mut self, worker: WorkerId, task: WorkerTask) -> bool {
        self.workers
            .assign(worker, task, &self.tracker, &mut self.orders)
    }

    pub fn set_worker_count(&mut self, count: u32) -> u32 {
        self.workers.set_worker_count(count, &mut self.orders)
    }

    // ------------------------------------------------------------------------
    // Tools & Refining
    // ------------------------------------------------------------------------

    pub fn can_afford_upgrade(&self, tool: ToolType) -> bool {
        self.tools
            .can_afford_upgrade(tool, &self.catalog, &self.ledger, &self.tracker)
    }

    pub fn try_upgrade(&mut self, tool: ToolType) -> bool {
        self.tools
            .try_upgrade(tool, &self.catalog, &mut self.ledger, &self.tracker)
    }

    /// Upgrade the selected tool, if a tool is selected
    pub fn try_apply_upgrade(&mut self) -> bool {
        match self.selection.selected_tool() {
            Some(tool) => self.try_upgrade(tool),
            None => false,
        }
    }

    pub fn can_afford_refine(&self, refine: RefineType) -> bool {
        RefineStation::can_afford(refine, &self.catalog, &self.ledger, &self.tracker)
    }

    pub fn try_refine(&mut self, refine: RefineType) -> bool {
        RefineStation::try_apply(refine, &self.catalog, &mut self.ledger, &self.tracker)
    }

    /// Apply the selected recipe, if a recipe is selected
    pub fn try_apply_refine(&mut self) -> bool {
        match self.selection.selected_refine() {
            Some(refine) => self.try_refine(refine),
            None => false,
        }
    }

    pub fn harvest(&mut self, node: &mut ResourceNode) -> HarvestOutcome {
        node.harvest(&self.tools, &self.catalog, &mut self.ledger)
    }

    // ------------------------------------------------------------------------
    // Unlock graph
    // ------------------------------------------------------------------------

    /// Buildings not yet started whose requirements are all Built
    pub fn available_builds(&self) -> Vec<BuildType> {
        BuildType::concrete()
            .filter(|b| self.tracker.get_state(*b) == BuildState::NotBuilt)
            .filter(|b| {
                self.catalog
                    .build(*b)
                    .is_some_and(|info| self.tracker.all_built(&info.required_buildings))
            })
            .collect()
    }

    /// Resource types whose processing has been unlocked by Built buildings
    pub fn unlocked_processing(&self) -> Vec<ResourceType> {
        let unlocked: BTreeSet<ResourceType> = BuildType::concrete()
            .filter(|b| self.tracker.is_built(*b))
            .filter_map(|b| self.catalog.build(b))
            .flat_map(|info| info.unlocks_processing.iter().copied())
            .collect();
        unlocked.into_iter().collect()
    }

    pub fn unlocked_refines(&self) -> Vec<RefineType> {
        RefineStation::unlocked_refines(&self.catalog, &self.tracker)
    }

    // ------------------------------------------------------------------------
    // Outbound events
    // ------------------------------------------------------------------------

    pub fn take_movement_orders(&mut self) -> Vec<MovementOrder> {
        self.orders.take_orders()
    }

    pub fn take_build_events(&mut self) -> Vec<BuildEvent> {
        std::mem::take(&mut self.build_events)
    }

    pub fn take_resource_changes(&mut self) -> Vec<ResourceChange> {
        self.ledger.take_changes()
    }

    pub fn take_frame_events(&mut self) -> FrameEvents {
        FrameEvents {
            movement_orders: self.take_movement_orders(),
            build_events: self.take_build_events(),
            resource_changes: self.take_resource_changes(),
        }
    }

    // ------------------------------------------------------------------------
    // Snapshot
    // ------------------------------------------------------------------------

    pub fn snapshot(&self) -> StateSnapshot {
        let mut resources: Vec<(ResourceType, i64)> = self.ledger.get_all().into_iter().collect();
        resources.sort_by_key(|(resource, _)| *resource);

        StateSnapshot {
            tick: self.tick,
            elapsed: self.elapsed,
            resources,
            builds: BuildType::concrete()
                .map(|build_type| self.build_snapshot(build_type))
                .collect(),
            workers: self
                .workers
                .slots()
                .map(|(id, slot)| WorkerSnapshot {
                    id,
                    name: self.workers.worker_name(id),
                    task: slot.task,
                })
                .collect(),
            max_workers: self.workers.max_workers(),
            tools: ToolType::all()
                .map(|tool| ToolSnapshot {
                    tool,
                    level: self.tools.level(tool),
                    max_level: self.tools.max_level(tool, &self.catalog),
                    tier_name: self
                        .tools
                        .current_tier(tool, &self.catalog)
                        .map(|tier| tier.name.clone())
                        .unwrap_or_default(),
                    next_tier_name: self
                        .tools
                        .next_tier(tool, &self.catalog)
                        .map(|tier| tier.name.clone()),
                    can_afford_upgrade: self.can_afford_upgrade(tool),
                })
                .collect(),
            selection: self.selection,
            available_builds: self.available_builds(),
            unlocked_processing: self.unlocked_processing(),
            unlocked_refines: self.unlocked_refines(),
            seconds_until_income: self.income.time_until_next(),
        }
    }

    fn build_snapshot(&self, build_type: BuildType) -> BuildSnapshot {
        let site_id = self.site_index.get(&build_type).copied();
        let site = self.site(build_type);
        BuildSnapshot {
            build_type,
            name: self
                .catalog
                .build(build_type)
                .map(|info| info.nickname.clone())
                .unwrap_or_default(),
            state: self.tracker.get_state(build_type),
            site_id: site_id.map(|id| id.to_u64()),
            assigned_workers: self.workers.assigned_count(build_type),
            progress_seconds: site.map(|s| s.progress_seconds).unwrap_or(0.0),
            required_seconds: site.map(|s| s.required_seconds).unwrap_or(0.0),
            remaining_seconds: site.and_then(ConstructionSite::remaining_seconds),
        }
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(SimConfig::default())
    }
}

// ============================================================================
// Snapshot types (for WASM boundary)
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi)]
pub struct StateSnapshot {
    pub tick: u64,
    pub elapsed: f64,
    pub resources: Vec<(ResourceType, i64)>,
    pub builds: Vec<BuildSnapshot>,
    pub workers: Vec<WorkerSnapshot>,
    pub max_workers: u32,
    pub tools: Vec<ToolSnapshot>,
    pub selection: Selection,
    pub available_builds: Vec<BuildType>,
    pub unlocked_processing: Vec<ResourceType>,
    pub unlocked_refines: Vec<RefineType>,
    pub seconds_until_income: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi)]
pub struct BuildSnapshot {
    pub build_type: BuildType,
    pub name: String,
    pub state: BuildState,
    pub site_id: Option<u64>,
    pub assigned_workers: u32,
    pub progress_seconds: f64,
    pub required_seconds: f64,
    pub remaining_seconds: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi)]
pub struct WorkerSnapshot {
    pub id: WorkerId,
    pub name: String,
    pub task: WorkerTask,
}

#[derive(Debug, Clone, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi)]
pub struct ToolSnapshot {
    pub tool: ToolType,
    pub level: u32,
    pub max_level: u32,
    pub tier_name: String,
    pub next_tier_name: Option<String>,
    pub can_afford_upgrade: bool,
}

/// Everything the presentation layer should react to since the last drain
#[derive(Debug, Clone, Default, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi)]
pub struct FrameEvents {
    pub movement_orders: Vec<MovementOrder>,
    pub build_events: Vec<BuildEvent>,
    pub resource_changes: Vec<ResourceChange>,
}
