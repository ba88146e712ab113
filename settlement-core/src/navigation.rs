// Movement boundary - where workers should walk, decided here, executed elsewhere

use serde::{Deserialize, Serialize};
use tsify_next::Tsify;

use crate::harvest::NodeKind;
use crate::types::{BuildType, WorkerId};

/// Receives movement intents for worker agents.
///
/// Pathfinding and steering live outside the engine. Implementations only
/// record or forward the request.
pub trait Navigator {
    fn set_idle(&mut self, worker: WorkerId);
    fn set_build_target(&mut self, worker: WorkerId, build_type: BuildType);
    fn set_gather_target(&mut self, worker: WorkerId, node: NodeKind);
    /// The slot no longer exists; the agent should be removed
    fn release(&mut self, worker: WorkerId);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
pub enum MovementTarget {
    Idle,
    Build(BuildType),
    Gather(NodeKind),
    Release,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
pub struct MovementOrder {
    pub worker: WorkerId,
    pub target: MovementTarget,
}

/// Navigator that queues orders for the movement layer to drain each frame.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderQueue {
    orders: Vec<MovementOrder>,
}

impl OrderQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take_orders(&mut self) -> Vec<MovementOrder> {
        std::mem::take(&mut self.orders)
    }

    pub fn pending(&self) -> &[MovementOrder] {
        &self.orders
    }

    fn push(&mut self, worker: WorkerId, target: MovementTarget) {
        self.orders.push(MovementOrder { worker, target });
    }
}

impl Navigator for OrderQueue {
    fn set_idle(&mut self, worker: WorkerId) {
        self.push(worker, MovementTarget::Idle);
    }

    fn set_build_target(&mut self, worker: WorkerId, build_type: BuildType) {
        self.push(worker, MovementTarget::Build(build_type));
    }

    fn set_gather_target(&mut self, worker: WorkerId, node: NodeKind) {
        self.push(worker, MovementTarget::Gather(node));
    }

    fn release(&mut self, worker: WorkerId) {
        self.push(worker, MovementTarget::Release);
    }
}
