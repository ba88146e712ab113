use wasm_bindgen::prelude::*;

mod catalog;
mod config;
mod construction;
mod harvest;
mod income;
mod ledger;
mod navigation;
mod progress;
mod refine;
mod selection;
mod state;
mod tools;
mod types;
mod workers;

pub use catalog::*;
pub use config::*;
pub use construction::*;
pub use harvest::*;
pub use income::*;
pub use ledger::*;
pub use navigation::*;
pub use progress::*;
pub use refine::*;
pub use selection::*;
pub use state::*;
pub use tools::*;
pub use types::*;
pub use workers::*;

// ============================================================================
// WASM API - Simulation
// ============================================================================

#[wasm_bindgen]
pub struct Simulation {
    state: GameState,
}

#[wasm_bindgen]
impl Simulation {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        // Better panic messages in browser console
        console_error_panic_hook::set_once();

        Self {
            state: GameState::default(),
        }
    }

    #[wasm_bindgen]
    pub fn with_config(config: SimConfig) -> Self {
        console_error_panic_hook::set_once();

        Self {
            state: GameState::new(config),
        }
    }

    /// Create a simulation from a JSON config; missing fields use defaults
    #[wasm_bindgen]
    pub fn from_config_json(json: &str) -> Result<Simulation, JsError> {
        let config = SimConfig::from_json(json).map_err(|e| JsError::new(&e.to_string()))?;
        Ok(Self::with_config(config))
    }

    /// Advance the simulation by `dt` seconds
    #[wasm_bindgen]
    pub fn advance(&mut self, dt: f64) {
        self.state.advance(dt);
    }

    #[wasm_bindgen]
    pub fn get_tick(&self) -> u64 {
        self.state.tick
    }

    #[wasm_bindgen]
    pub fn get_elapsed(&self) -> f64 {
        self.state.elapsed
    }

    /// Get a snapshot of the current state for rendering
    #[wasm_bindgen]
    pub fn get_state_snapshot(&self) -> StateSnapshot {
        self.state.snapshot()
    }

    /// Drain movement orders, build events and resource changes
    #[wasm_bindgen]
    pub fn take_frame_events(&mut self) -> FrameEvents {
        self.state.take_frame_events()
    }

    // ------------------------------------------------------------------------
    // Resources & buildings
    // ------------------------------------------------------------------------

    #[wasm_bindgen]
    pub fn get_resource(&self, resource: ResourceType) -> i64 {
        self.state.ledger.get(resource)
    }

    #[wasm_bindgen]
    pub fn get_state(&self, build_type: BuildType) -> BuildState {
        self.state.tracker.get_state(build_type)
    }

    #[wasm_bindgen]
    pub fn get_remaining_seconds(&self, build_type: BuildType) -> Option<f64> {
        self.state.remaining_seconds(build_type)
    }

    #[wasm_bindgen]
    pub fn select_build(&mut self, build_type: BuildType) {
        self.state.select_build(build_type);
    }

    #[wasm_bindgen]
    pub fn clear_selection(&mut self) {
        self.state.clear_selection();
    }

    #[wasm_bindgen]
    pub fn can_afford_current_build(&self) -> bool {
        self.state.can_afford_current_build()
    }

    #[wasm_bindgen]
    pub fn try_start_construction(&mut self) -> bool {
        self.state.try_start_construction()
    }

    // ------------------------------------------------------------------------
    // Workers
    // ------------------------------------------------------------------------

    #[wasm_bindgen]
    pub fn get_max_workers(&self) -> u32 {
        self.state.workers.max_workers()
    }

    /// Task of `worker`; Idle for ids outside the pool
    #[wasm_bindgen]
    pub fn get_worker_task(&self, worker: u32) -> WorkerTask {
        self.state.workers.worker_task(worker).unwrap_or_default()
    }

    #[wasm_bindgen]
    pub fn get_assigned_count(&self, build_type: BuildType) -> u32 {
        self.state.workers.assigned_count(build_type)
    }

    #[wasm_bindgen]
    pub fn assign_worker(&mut self, worker: u32, task: WorkerTask) -> bool {
        self.state.assign_worker(worker, task)
    }

    #[wasm_bindgen]
    pub fn set_worker_count(&mut self, count: u32) -> u32 {
        self.state.set_worker_count(count)
    }

    // ------------------------------------------------------------------------
    // Tools & refining
    // ------------------------------------------------------------------------

    #[wasm_bindgen]
    pub fn select_tool(&mut self, tool: ToolType) {
        self.state.select_tool(tool);
    }

    #[wasm_bindgen]
    pub fn select_refine(&mut self, refine: RefineType) {
        self.state.select_refine(refine);
    }

    #[wasm_bindgen]
    pub fn can_afford_upgrade(&self) -> bool {
        self.state
            .selection
            .selected_tool()
            .is_some_and(|tool| self.state.can_afford_upgrade(tool))
    }

    #[wasm_bindgen]
    pub fn try_apply_upgrade(&mut self) -> bool {
        self.state.try_apply_upgrade()
    }

    #[wasm_bindgen]
    pub fn can_afford_refine(&self) -> bool {
        self.state
            .selection
            .selected_refine()
            .is_some_and(|refine| self.state.can_afford_refine(refine))
    }

    #[wasm_bindgen]
    pub fn try_apply_refine(&mut self) -> bool {
        self.state.try_apply_refine()
    }

    /// One manual swing at a node. The caller owns the node and passes back
    /// `remaining` from the previous outcome (None for trees).
    #[wasm_bindgen]
    pub fn harvest(&mut self, kind: NodeKind, remaining: Option<u32>) -> HarvestOutcome {
        let mut node = ResourceNode::with_remaining(kind, remaining);
        self.state.harvest(&mut node)
    }
}

impl Simulation {
    /// Native access for tests and embedding hosts
    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================
