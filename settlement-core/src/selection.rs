use serde::{Deserialize, Serialize};
use tsify_next::Tsify;

use crate::types::{BuildType, RefineType, ToolType};

/// The one workshop item the UI is currently acting on. Picking a new item
/// of any kind replaces whatever was selected before.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
pub enum Selection {
    #[default]
    Nothing,
    Build(BuildType),
    Tool(ToolType),
    Refine(RefineType),
}

impl Selection {
    /// Selecting `BuildType::None` is the same as clearing the selection
    pub fn build(build_type: BuildType) -> Self {
        if build_type.is_none() {
            Selection::Nothing
        } else {
            Selection::Build(build_type)
        }
    }

    pub fn selected_build(self) -> BuildType {
        match self {
            Selection::Build(build_type) => build_type,
            _ => BuildType::None,
        }
    }

    pub fn selected_tool(self) -> Option<ToolType> {
        match self {
            Selection::Tool(tool) => Some(tool),
            _ => None,
        }
    }

    pub fn selected_refine(self) -> Option<RefineType> {
        match self {
            Selection::Refine(refine) => Some(refine),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_is_exclusive() {
        let selection = Selection::Refine(RefineType::Iron);
        assert_eq!(selection.selected_build(), BuildType::None);
        assert_eq!(selection.selected_tool(), None);
        assert_eq!(selection.selected_refine(), Some(RefineType::Iron));
    }

    #[test]
    fn test_none_build_clears() {
        assert_eq!(Selection::build(BuildType::None), Selection::Nothing);
        assert_eq!(
            Selection::build(BuildType::Motte).selected_build(),
            BuildType::Motte
        );
    }
}
