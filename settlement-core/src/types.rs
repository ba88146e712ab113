use serde::{Deserialize, Serialize};
use slotmap::new_key_type;
use tsify_next::Tsify;

// ============================================================================
// IDs
// ============================================================================

new_key_type! {
    pub struct SiteId;
}

/// Trait for converting SlotMap keys to u64 for WASM boundary
pub trait KeyToU64 {
    fn to_u64(self) -> u64;
}

impl KeyToU64 for SiteId {
    fn to_u64(self) -> u64 {
        self.0.as_ffi()
    }
}

/// Worker slots are numbered 1..=max_workers.
pub type WorkerId = u32;

// ============================================================================
// Resources - What the settlement spends and earns
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
pub enum ResourceType {
    // Raw
    Wood,
    Stone,
    Gold,
    // Refined
    Iron,
    Planks,
}

impl ResourceType {
    /// Returns an iterator over all resource types
    pub fn all() -> impl Iterator<Item = ResourceType> {
        [
            ResourceType::Wood,
            ResourceType::Stone,
            ResourceType::Gold,
            ResourceType::Iron,
            ResourceType::Planks,
        ]
        .into_iter()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
pub struct ResourceAmount {
    pub resource: ResourceType,
    pub amount: u32,
}

impl ResourceAmount {
    pub const fn new(resource: ResourceType, amount: u32) -> Self {
        Self { resource, amount }
    }
}

// ============================================================================
// Buildings
// ============================================================================

/// Constructible structures. `None` is the "nothing selected" sentinel and never
/// has catalog data or build state of its own.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Tsify,
)]
#[tsify(into_wasm_abi, from_wasm_abi)]
pub enum BuildType {
    #[default]
    None,
    Castle,
    Bridge,
    Courtyard,
    Motte,
    Cathedral,
    Library,
}

impl BuildType {
    /// Every real building, in catalog order (excludes `None`)
    pub fn concrete() -> impl Iterator<Item = BuildType> {
        [
            BuildType::Castle,
            BuildType::Bridge,
            BuildType::Courtyard,
            BuildType::Motte,
            BuildType::Cathedral,
            BuildType::Library,
        ]
        .into_iter()
    }

    pub fn is_none(self) -> bool {
        self == BuildType::None
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
pub enum BuildState {
    #[default]
    NotBuilt,
    InProgress,
    Built,
}

// ============================================================================
// Worker Tasks
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
pub enum WorkerTask {
    #[default]
    Idle,
    Build(BuildType),
    GatherWood,
    GatherStone,
}

impl WorkerTask {
    /// Resource credited by a gather task
    pub fn gathered_resource(self) -> Option<ResourceType> {
        match self {
            WorkerTask::GatherWood => Some(ResourceType::Wood),
            WorkerTask::GatherStone => Some(ResourceType::Stone),
            WorkerTask::Idle | WorkerTask::Build(_) => None,
        }
    }

    pub fn build_target(self) -> Option<BuildType> {
        match self {
            WorkerTask::Build(build_type) => Some(build_type),
            _ => None,
        }
    }
}

// ============================================================================
// Tools & Refining
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
pub enum ToolType {
    Axe,
    Pickaxe,
    Boots,
}

impl ToolType {
    pub fn all() -> impl Iterator<Item = ToolType> {
        [ToolType::Axe, ToolType::Pickaxe, ToolType::Boots].into_iter()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
pub enum RefineType {
    Iron,
    Planks,
}

impl RefineType {
    pub fn all() -> impl Iterator<Item = RefineType> {
        [RefineType::Iron, RefineType::Planks].into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_concrete_builds_exclude_none() {
        assert!(BuildType::concrete().all(|b| !b.is_none()));
        assert_eq!(BuildType::concrete().count(), 6);
    }

    #[test]
    fn test_worker_task_structural_equality() {
        assert_eq!(
            WorkerTask::Build(BuildType::Castle),
            WorkerTask::Build(BuildType::Castle)
        );
        assert_ne!(
            WorkerTask::Build(BuildType::Castle),
            WorkerTask::Build(BuildType::Bridge)
        );
        assert_eq!(WorkerTask::default(), WorkerTask::Idle);
    }

    #[test]
    fn test_gathered_resource() {
        assert_eq!(WorkerTask::GatherWood.gathered_resource(), Some(ResourceType::Wood));
        assert_eq!(WorkerTask::GatherStone.gathered_resource(), Some(ResourceType::Stone));
        assert_eq!(WorkerTask::Build(BuildType::Motte).gathered_resource(), None);
        assert_eq!(WorkerTask::Idle.gathered_resource(), None);
    }
}
