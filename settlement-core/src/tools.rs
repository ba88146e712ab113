// Tool progression - per-tool upgrade levels and the stats they grant

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, ToolTier};
use crate::ledger::ResourceLedger;
use crate::progress::BuildProgressTracker;
use crate::types::ToolType;

/// Current level of every tool. Levels start at 0 and only increase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolProgression {
    levels: HashMap<ToolType, u32>,
}

impl ToolProgression {
    pub fn new() -> Self {
        Self {
            levels: ToolType::all().map(|t| (t, 0)).collect(),
        }
    }

    pub fn level(&self, tool: ToolType) -> u32 {
        self.levels.get(&tool).copied().unwrap_or(0)
    }

    pub fn max_level(&self, tool: ToolType, catalog: &Catalog) -> u32 {
        catalog.max_tool_level(tool)
    }

    pub fn current_tier<'a>(&self, tool: ToolType, catalog: &'a Catalog) -> Option<&'a ToolTier> {
        catalog.tool_tier(tool, self.level(tool))
    }

    /// None once the tool is at its last tier
    pub fn next_tier<'a>(&self, tool: ToolType, catalog: &'a Catalog) -> Option<&'a ToolTier> {
        catalog.tool_tier(tool, self.level(tool) + 1)
    }

    pub fn can_afford_upgrade(
        &self,
        tool: ToolType,
        catalog: &Catalog,
        ledger: &ResourceLedger,
        tracker: &BuildProgressTracker,
    ) -> bool {
        match self.next_tier(tool, catalog) {
            Some(tier) => {
                tracker.all_built(&tier.required_buildings) && ledger.can_afford(&tier.cost)
            }
            None => false,
        }
    }

    /// Pay for and apply the next tier. Either everything happens or nothing does.
    pub fn try_upgrade(
        &mut self,
        tool: ToolType,
        catalog: &Catalog,
        ledger: &mut ResourceLedger,
        tracker: &BuildProgressTracker,
    ) -> bool {
        if !self.can_afford_upgrade(tool, catalog, ledger, tracker) {
            return false;
        }
        let Some(tier) = self.next_tier(tool, catalog) else {
            return false;
        };

        ledger.deduct_all(&tier.cost);
        let level = self.level(tool) + 1;
        self.levels.insert(tool, level);

        #[cfg(feature = "instrument")]
        tracing::info!(
            target: "tool_upgrade",
            tool = ?tool,
            level = level,
            tier = tier.name.as_str(),
        );

        true
    }

    pub fn wood_harvest_amount(&self, catalog: &Catalog) -> u32 {
        self.harvest_amount(ToolType::Axe, catalog)
    }

    pub fn stone_harvest_amount(&self, catalog: &Catalog) -> u32 {
        self.harvest_amount(ToolType::Pickaxe, catalog)
    }

    pub fn move_speed_multiplier(&self, catalog: &Catalog) -> f32 {
        self.current_tier(ToolType::Boots, catalog)
            .map(|tier| tier.movement_speed_multiplier)
            .filter(|m| *m > 0.0)
            .unwrap_or(1.0)
    }

    fn harvest_amount(&self, tool: ToolType, catalog: &Catalog) -> u32 {
        self.current_tier(tool, catalog)
            .map(|tier| tier.harvest_amount)
            .filter(|a| *a > 0)
            .unwrap_or(1)
    }
}

impl Default for ToolProgression {
    fn default() -> Self {
        Self::new()
    }
}
