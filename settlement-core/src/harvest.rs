// Manual harvesting from trees and rocks

use serde::{Deserialize, Serialize};
use tsify_next::Tsify;

use crate::catalog::Catalog;
use crate::ledger::ResourceLedger;
use crate::tools::ToolProgression;
use crate::types::{ResourceType, WorkerTask};

pub const ROCK_CAPACITY: u32 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
pub enum NodeKind {
    Tree,
    Rock,
}

impl NodeKind {
    pub fn resource(self) -> ResourceType {
        match self {
            NodeKind::Tree => ResourceType::Wood,
            NodeKind::Rock => ResourceType::Stone,
        }
    }

    /// Node a gather task sends its worker to
    pub fn for_task(task: WorkerTask) -> Option<NodeKind> {
        match task {
            WorkerTask::GatherWood => Some(NodeKind::Tree),
            WorkerTask::GatherStone => Some(NodeKind::Rock),
            WorkerTask::Idle | WorkerTask::Build(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
pub struct HarvestOutcome {
    pub resource: ResourceType,
    pub amount: u32,
    /// Units left in the node afterwards; None for inexhaustible nodes
    pub remaining: Option<u32>,
    pub depleted: bool,
}

/// A harvestable world object. `remaining == None` means inexhaustible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceNode {
    pub kind: NodeKind,
    pub remaining: Option<u32>,
}

impl ResourceNode {
    pub fn tree() -> Self {
        Self {
            kind: NodeKind::Tree,
            remaining: None,
        }
    }

    /// Resume a node whose remaining units are tracked elsewhere
    pub fn with_remaining(kind: NodeKind, remaining: Option<u32>) -> Self {
        Self { kind, remaining }
    }

    pub fn rock() -> Self {
        Self {
            kind: NodeKind::Rock,
            remaining: Some(ROCK_CAPACITY),
        }
    }

    pub fn is_depleted(&self) -> bool {
        self.remaining == Some(0)
    }

    /// One swing with the current tool. The full tool amount is credited even
    /// when it exceeds what the node had left; the node just bottoms out.
    pub fn harvest(
        &mut self,
        tools: &ToolProgression,
        catalog: &Catalog,
        ledger: &mut ResourceLedger,
    ) -> HarvestOutcome {
        let resource = self.kind.resource();
        if self.is_depleted() {
            return HarvestOutcome {
                resource,
                amount: 0,
                remaining: self.remaining,
                depleted: true,
            };
        }

        let amount = match self.kind {
            NodeKind::Tree => tools.wood_harvest_amount(catalog),
            NodeKind::Rock => tools.stone_harvest_amount(catalog),
        };
        ledger.add(resource, amount);
        if let Some(remaining) = self.remaining.as_mut() {
            *remaining = remaining.saturating_sub(amount);
        }

        #[cfg(feature = "instrument")]
        tracing::info!(
            target: "harvest",
            node = ?self.kind,
            amount = amount,
            remaining = self.remaining.map(i64::from).unwrap_or(-1),
        );

        HarvestOutcome {
            resource,
            amount,
            remaining: self.remaining,
            depleted: self.is_depleted(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tree_is_inexhaustible() {
        let catalog = Catalog::standard();
        let tools = ToolProgression::new();
        let mut ledger = ResourceLedger::new();
        let mut tree = ResourceNode::tree();

        for _ in 0..100 {
            tree.harvest(&tools, &catalog, &mut ledger);
        }
        assert_eq!(ledger.get(ResourceType::Wood), 100);
        assert!(!tree.is_depleted());
    }

    #[test]
    fn test_rock_depletes() {
        let catalog = Catalog::standard();
        let tools = ToolProgression::new();
        let mut ledger = ResourceLedger::new();
        let mut rock = ResourceNode::rock();

        for _ in 0..29 {
            assert!(!rock.harvest(&tools, &catalog, &mut ledger).depleted);
        }
        assert!(rock.harvest(&tools, &catalog, &mut ledger).depleted);

        let after = rock.harvest(&tools, &catalog, &mut ledger);
        assert_eq!(after.amount, 0);
        assert_eq!(ledger.get(ResourceType::Stone), 30);
    }

    #[test]
    fn test_gather_tasks_map_to_nodes() {
        assert_eq!(NodeKind::for_task(WorkerTask::GatherWood), Some(NodeKind::Tree));
        assert_eq!(NodeKind::for_task(WorkerTask::GatherStone), Some(NodeKind::Rock));
        assert_eq!(NodeKind::for_task(WorkerTask::Idle), None);
    }
}
