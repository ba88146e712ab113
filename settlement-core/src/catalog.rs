// Static game data: buildings, tool tiers and refine recipes

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{BuildType, RefineType, ResourceAmount, ResourceType, ToolType};

// === BUILD INFO ===

/// Everything the engine needs to know about one kind of building.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildInfo {
    pub nickname: String,
    pub info: String,
    pub costs: Vec<ResourceAmount>,
    /// Nominal duration with a single worker (1 worker-second = 1 progress-second)
    pub build_time_seconds: f64,
    /// Buildings that must be Built before this one can start
    pub required_buildings: Vec<BuildType>,
    /// Credited every passive income interval while Built
    pub passive_income: Vec<ResourceAmount>,
    /// Resource types whose refining becomes available once Built
    pub unlocks_processing: Vec<ResourceType>,
    /// Extra worker capacity granted on completion
    pub unlocks_builder_slots: u32,
}

impl BuildInfo {
    pub fn new(nickname: impl Into<String>, info: impl Into<String>) -> Self {
        Self {
            nickname: nickname.into(),
            info: info.into(),
            costs: Vec::new(),
            build_time_seconds: 30.0,
            required_buildings: Vec::new(),
            passive_income: Vec::new(),
            unlocks_processing: Vec::new(),
            unlocks_builder_slots: 0,
        }
    }

    pub fn with_cost(mut self, resource: ResourceType, amount: u32) -> Self {
        self.costs.push(ResourceAmount::new(resource, amount));
        self
    }

    pub fn with_build_time(mut self, seconds: f64) -> Self {
        self.build_time_seconds = seconds;
        self
    }

    pub fn requires(mut self, build_type: BuildType) -> Self {
        self.required_buildings.push(build_type);
        self
    }

    pub fn with_passive_income(mut self, resource: ResourceType, amount: u32) -> Self {
        self.passive_income.push(ResourceAmount::new(resource, amount));
        self
    }

    pub fn unlocks_processing(mut self, resource: ResourceType) -> Self {
        self.unlocks_processing.push(resource);
        self
    }

    pub fn unlocks_builder_slots(mut self, slots: u32) -> Self {
        self.unlocks_builder_slots = slots;
        self
    }
}

// === TOOL TIERS ===

/// One level of a tool's upgrade path. Level 0 is what the player starts with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolTier {
    pub name: String,
    pub description: String,
    pub cost: Vec<ResourceAmount>,
    /// Units per manual swing (Axe, Pickaxe); 0 for tools that don't harvest
    pub harvest_amount: u32,
    /// Movement multiplier (Boots); 0.0 for tools that don't affect movement
    pub movement_speed_multiplier: f32,
    pub required_buildings: Vec<BuildType>,
}

impl ToolTier {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            cost: Vec::new(),
            harvest_amount: 0,
            movement_speed_multiplier: 0.0,
            required_buildings: Vec::new(),
        }
    }

    pub fn with_cost(mut self, resource: ResourceType, amount: u32) -> Self {
        self.cost.push(ResourceAmount::new(resource, amount));
        self
    }

    pub fn with_harvest(mut self, amount: u32) -> Self {
        self.harvest_amount = amount;
        self
    }

    pub fn with_speed(mut self, multiplier: f32) -> Self {
        self.movement_speed_multiplier = multiplier;
        self
    }

    pub fn requires(mut self, build_type: BuildType) -> Self {
        self.required_buildings.push(build_type);
        self
    }
}

// === REFINE RECIPES ===

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefineRecipe {
    pub name: String,
    pub description: String,
    pub input_costs: Vec<ResourceAmount>,
    pub output: ResourceAmount,
    pub required_buildings: Vec<BuildType>,
}

impl RefineRecipe {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        output: ResourceAmount,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_costs: Vec::new(),
            output,
            required_buildings: Vec::new(),
        }
    }

    pub fn with_input(mut self, resource: ResourceType, amount: u32) -> Self {
        self.input_costs.push(ResourceAmount::new(resource, amount));
        self
    }

    pub fn requires(mut self, build_type: BuildType) -> Self {
        self.required_buildings.push(build_type);
        self
    }
}

// === VALIDATION ERRORS ===

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    MissingBuild(BuildType),
    BuildDataForNone,
    RequiresNone(BuildType),
    SelfDependency(BuildType),
    /// Buildings on a dependency cycle, in discovery order
    DependencyCycle(Vec<BuildType>),
    NoToolTiers(ToolType),
    ToolRequiresNone { tool: ToolType, level: u32 },
    MissingRecipe(RefineType),
    RecipeRequiresNone(RefineType),
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::MissingBuild(b) => write!(f, "no build info defined for {b:?}"),
            CatalogError::BuildDataForNone => write!(f, "build info defined for BuildType::None"),
            CatalogError::RequiresNone(b) => write!(f, "{b:?} lists BuildType::None as a requirement"),
            CatalogError::SelfDependency(b) => write!(f, "{b:?} requires itself"),
            CatalogError::DependencyCycle(cycle) => write!(f, "dependency cycle through {cycle:?}"),
            CatalogError::NoToolTiers(t) => write!(f, "no tiers defined for {t:?}"),
            CatalogError::ToolRequiresNone { tool, level } => {
                write!(f, "{tool:?} level {level} lists BuildType::None as a requirement")
            }
            CatalogError::MissingRecipe(r) => write!(f, "no recipe defined for {r:?}"),
            CatalogError::RecipeRequiresNone(r) => {
                write!(f, "{r:?} recipe lists BuildType::None as a requirement")
            }
        }
    }
}

impl std::error::Error for CatalogError {}

// === CATALOG ===

/// Immutable configuration tables. Built once at startup and shared by
/// reference with every component that needs static data.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Catalog {
    builds: HashMap<BuildType, BuildInfo>,
    tools: HashMap<ToolType, Vec<ToolTier>>,
    recipes: HashMap<RefineType, RefineRecipe>,
}

impl Catalog {
    /// A catalog with no entries; fill it with the `with_*` methods
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_build(mut self, build_type: BuildType, info: BuildInfo) -> Self {
        self.builds.insert(build_type, info);
        self
    }

    pub fn with_tool_tiers(mut self, tool: ToolType, tiers: Vec<ToolTier>) -> Self {
        self.tools.insert(tool, tiers);
        self
    }

    pub fn with_recipe(mut self, refine: RefineType, recipe: RefineRecipe) -> Self {
        self.recipes.insert(refine, recipe);
        self
    }

    /// The shipped game data
    pub fn standard() -> Self {
        use ResourceType::*;

        Self::empty()
            // ---------------- BUILDINGS ----------------
            .with_build(
                BuildType::Castle,
                BuildInfo::new(
                    "Durham Castle",
                    "A fortified Norman stronghold overlooking the River Wear.",
                )
                .with_cost(Wood, 30)
                .with_cost(Stone, 40)
                .with_build_time(30.0)
                .with_passive_income(Gold, 1)
                .unlocks_builder_slots(1),
            )
            .with_build(
                BuildType::Bridge,
                BuildInfo::new(
                    "Elvet Bridge",
                    "A stone bridge spanning the River Wear, enabling trade and travel.",
                )
                .with_cost(Wood, 50)
                .with_cost(Stone, 300)
                .with_build_time(15.0)
                .with_passive_income(Gold, 2),
            )
            .with_build(
                BuildType::Courtyard,
                BuildInfo::new(
                    "Castle Courtyard",
                    "An open gathering space within the castle grounds.",
                )
                .with_cost(Wood, 20)
                .with_cost(Stone, 25)
                .with_build_time(20.0)
                .requires(BuildType::Castle)
                .unlocks_processing(Planks)
                .unlocks_builder_slots(1),
            )
            .with_build(
                BuildType::Motte,
                BuildInfo::new(
                    "Castle Motte",
                    "The raised earthwork beneath the keep, home to the forge.",
                )
                .with_cost(Wood, 25)
                .with_cost(Stone, 35)
                .with_build_time(25.0)
                .requires(BuildType::Castle)
                .unlocks_processing(Iron),
            )
            .with_build(
                BuildType::Cathedral,
                BuildInfo::new(
                    "Durham Cathedral",
                    "A towering Romanesque cathedral drawing pilgrims from afar.",
                )
                .with_cost(Stone, 150)
                .with_cost(Planks, 10)
                .with_cost(Iron, 5)
                .with_build_time(60.0)
                .requires(BuildType::Courtyard)
                .requires(BuildType::Motte)
                .requires(BuildType::Bridge)
                .with_passive_income(Gold, 5)
                .unlocks_builder_slots(2),
            )
            .with_build(
                BuildType::Library,
                BuildInfo::new(
                    "Palace Green Library",
                    "A scholars' library on the green between castle and cathedral.",
                )
                .with_cost(Planks, 20)
                .with_cost(Gold, 30)
                .with_build_time(45.0)
                .requires(BuildType::Cathedral)
                .with_passive_income(Gold, 3)
                .unlocks_builder_slots(1),
            )
            // ---------------- TOOLS ----------------
            .with_tool_tiers(
                ToolType::Axe,
                vec![
                    ToolTier::new("Basic Axe", "A worn-out axe. Harvests +1 wood per swing.")
                        .with_harvest(1),
                    ToolTier::new("Copper Axe", "Harvests +3 wood per swing.")
                        .with_cost(Wood, 10)
                        .with_cost(Stone, 5)
                        .with_harvest(3),
                    ToolTier::new("Iron Axe", "Harvests +5 wood per swing.")
                        .with_cost(Planks, 5)
                        .with_cost(Iron, 3)
                        .with_harvest(5)
                        .requires(BuildType::Motte),
                ],
            )
            .with_tool_tiers(
                ToolType::Pickaxe,
                vec![
                    ToolTier::new("Basic Pickaxe", "A dull pickaxe. Harvests +1 stone per swing.")
                        .with_harvest(1),
                    ToolTier::new("Copper Pickaxe", "Harvests +4 stone per swing.")
                        .with_cost(Wood, 5)
                        .with_cost(Stone, 10)
                        .with_harvest(4),
                    ToolTier::new("Iron Pickaxe", "Harvests +6 stone per swing.")
                        .with_cost(Planks, 3)
                        .with_cost(Iron, 5)
                        .with_harvest(6)
                        .requires(BuildType::Motte),
                ],
            )
            .with_tool_tiers(
                ToolType::Boots,
                vec![
                    ToolTier::new("Bare Feet", "No boots. Normal movement speed.").with_speed(1.0),
                    ToolTier::new("Silk Boots", "x1.25 movement speed.")
                        .with_cost(Wood, 8)
                        .with_cost(Stone, 2)
                        .with_speed(1.25),
                    ToolTier::new("Riding Boots", "x1.5 movement speed.")
                        .with_cost(Planks, 6)
                        .with_cost(Gold, 10)
                        .with_speed(1.5)
                        .requires(BuildType::Courtyard),
                ],
            )
            // ---------------- REFINING ----------------
            .with_recipe(
                RefineType::Iron,
                RefineRecipe::new(
                    "Iron",
                    "A strong metal used for higher tier tools and construction.",
                    ResourceAmount::new(Iron, 1),
                )
                .with_input(Stone, 5)
                .requires(BuildType::Motte),
            )
            .with_recipe(
                RefineType::Planks,
                RefineRecipe::new(
                    "Planks",
                    "Processed timber used for advanced building and equipment.",
                    ResourceAmount::new(Planks, 1),
                )
                .with_input(Wood, 5)
                .requires(BuildType::Courtyard),
            )
    }

    /// Look up a building. A concrete building with no entry is a setup bug:
    /// it is logged and the caller treats the lookup as a no-op.
    pub fn build(&self, build_type: BuildType) -> Option<&BuildInfo> {
        let info = self.builds.get(&build_type);
        if info.is_none() && !build_type.is_none() {
            #[cfg(feature = "instrument")]
            tracing::warn!(target: "config", build_type = ?build_type, "no build info defined");
        }
        info
    }

    /// Tier `level` of `tool`, or None past the last tier
    pub fn tool_tier(&self, tool: ToolType, level: u32) -> Option<&ToolTier> {
        let Some(tiers) = self.tools.get(&tool) else {
            #[cfg(feature = "instrument")]
            tracing::warn!(target: "config", tool = ?tool, "no tool tiers defined");
            return None;
        };
        tiers.get(level as usize)
    }

    pub fn max_tool_level(&self, tool: ToolType) -> u32 {
        self.tools
            .get(&tool)
            .map(|tiers| tiers.len().saturating_sub(1) as u32)
            .unwrap_or(0)
    }

    pub fn recipe(&self, refine: RefineType) -> Option<&RefineRecipe> {
        let recipe = self.recipes.get(&refine);
        if recipe.is_none() {
            #[cfg(feature = "instrument")]
            tracing::warn!(target: "config", refine = ?refine, "no refine recipe defined");
        }
        recipe
    }

    /// Check the tables for setup bugs. Every issue found is returned.
    pub fn validate(&self) -> Result<(), Vec<CatalogError>> {
        let mut errors = Vec::new();

        if self.builds.contains_key(&BuildType::None) {
            errors.push(CatalogError::BuildDataForNone);
        }

        for build_type in BuildType::concrete() {
            let Some(info) = self.builds.get(&build_type) else {
                errors.push(CatalogError::MissingBuild(build_type));
                continue;
            };
            if info.required_buildings.contains(&BuildType::None) {
                errors.push(CatalogError::RequiresNone(build_type));
            }
            if info.required_buildings.contains(&build_type) {
                errors.push(CatalogError::SelfDependency(build_type));
            }
        }

        if let Some(cycle) = self.find_dependency_cycle() {
            errors.push(CatalogError::DependencyCycle(cycle));
        }

        for tool in ToolType::all() {
            match self.tools.get(&tool) {
                None => errors.push(CatalogError::NoToolTiers(tool)),
                Some(tiers) if tiers.is_empty() => errors.push(CatalogError::NoToolTiers(tool)),
                Some(tiers) => {
                    for (level, tier) in tiers.iter().enumerate() {
                        if tier.required_buildings.contains(&BuildType::None) {
                            errors.push(CatalogError::ToolRequiresNone {
                                tool,
                                level: level as u32,
                            });
                        }
                    }
                }
            }
        }

        for refine in RefineType::all() {
            match self.recipes.get(&refine) {
                None => errors.push(CatalogError::MissingRecipe(refine)),
                Some(recipe) if recipe.required_buildings.contains(&BuildType::None) => {
                    errors.push(CatalogError::RecipeRequiresNone(refine))
                }
                Some(_) => {}
            }
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    /// Depth-first search over `required_buildings`. Self-loops are reported
    /// separately and skipped here.
    fn find_dependency_cycle(&self) -> Option<Vec<BuildType>> {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            Visiting,
            Done,
        }

        fn visit(
            catalog: &Catalog,
            node: BuildType,
            marks: &mut HashMap<BuildType, Mark>,
            path: &mut Vec<BuildType>,
        ) -> Option<Vec<BuildType>> {
            match marks.get(&node) {
                Some(Mark::Done) => return None,
                Some(Mark::Visiting) => {
                    let start = path.iter().position(|b| *b == node).unwrap_or(0);
                    return Some(path[start..].to_vec());
                }
                None => {}
            }

            marks.insert(node, Mark::Visiting);
            path.push(node);
            if let Some(info) = catalog.builds.get(&node) {
                for dep in &info.required_buildings {
                    if *dep == node || dep.is_none() {
                        continue;
                    }
                    if let Some(cycle) = visit(catalog, *dep, marks, path) {
                        return Some(cycle);
                    }
                }
            }
            path.pop();
            marks.insert(node, Mark::Done);
            None
        }

        let mut marks = HashMap::new();
        let mut path = Vec::new();
        BuildType::concrete().find_map(|b| visit(self, b, &mut marks, &mut path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_catalog_is_valid() {
        let result = Catalog::standard().validate();
        assert!(result.is_ok(), "standard catalog has issues: {:?}", result);
    }

    #[test]
    fn test_build_info_builder() {
        let info = BuildInfo::new("Hut", "A small hut")
            .with_cost(ResourceType::Wood, 3)
            .with_build_time(0.5)
            .requires(BuildType::Castle)
            .with_passive_income(ResourceType::Gold, 1)
            .unlocks_builder_slots(2);

        assert_eq!(info.costs, vec![ResourceAmount::new(ResourceType::Wood, 3)]);
        assert_eq!(info.build_time_seconds, 0.5);
        assert_eq!(info.required_buildings, vec![BuildType::Castle]);
        assert_eq!(info.unlocks_builder_slots, 2);
    }

    #[test]
    fn test_none_has_no_build_info() {
        let catalog = Catalog::standard();
        assert!(catalog.build(BuildType::None).is_none());
        assert!(catalog.build(BuildType::Castle).is_some());
    }

    #[test]
    fn test_tool_tiers_and_max_level() {
        let catalog = Catalog::standard();
        assert_eq!(catalog.max_tool_level(ToolType::Axe), 2);
        assert_eq!(catalog.tool_tier(ToolType::Axe, 0).map(|t| t.harvest_amount), Some(1));
        assert_eq!(catalog.tool_tier(ToolType::Pickaxe, 1).map(|t| t.harvest_amount), Some(4));
        assert!(catalog.tool_tier(ToolType::Boots, 3).is_none());
    }

    #[test]
    fn test_missing_entries_reported() {
        let catalog = Catalog::empty().with_build(BuildType::Castle, BuildInfo::new("C", ""));
        let errors = catalog.validate().unwrap_err();

        assert!(errors.contains(&CatalogError::MissingBuild(BuildType::Bridge)));
        assert!(errors.contains(&CatalogError::NoToolTiers(ToolType::Axe)));
        assert!(errors.contains(&CatalogError::MissingRecipe(RefineType::Planks)));
        assert!(!errors.contains(&CatalogError::MissingBuild(BuildType::Castle)));
    }

    #[test]
    fn test_dependency_cycle_detected() {
        let catalog = Catalog::standard()
            .with_build(
                BuildType::Castle,
                BuildInfo::new("Castle", "").requires(BuildType::Library),
            );
        let errors = catalog.validate().unwrap_err();

        let cycle = errors.iter().find_map(|e| match e {
            CatalogError::DependencyCycle(c) => Some(c.clone()),
            _ => None,
        });
        let cycle = cycle.expect("cycle should be reported");
        assert!(cycle.contains(&BuildType::Castle));
        assert!(cycle.contains(&BuildType::Library));
    }

    #[test]
    fn test_self_dependency_detected() {
        let catalog = Catalog::standard().with_build(
            BuildType::Bridge,
            BuildInfo::new("Bridge", "").requires(BuildType::Bridge),
        );
        let errors = catalog.validate().unwrap_err();
        assert_eq!(errors, vec![CatalogError::SelfDependency(BuildType::Bridge)]);
    }

    #[test]
    fn test_error_display() {
        let err = CatalogError::MissingBuild(BuildType::Motte);
        assert_eq!(err.to_string(), "no build info defined for Motte");
    }
}
