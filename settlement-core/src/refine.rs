// Refine station - converting raw resources into processed ones

use crate::catalog::{Catalog, RefineRecipe};
use crate::ledger::ResourceLedger;
use crate::progress::BuildProgressTracker;
use crate::types::RefineType;

/// Stateless recipe application against the ledger.
pub struct RefineStation;

impl RefineStation {
    pub fn recipe_unlocked(recipe: &RefineRecipe, tracker: &BuildProgressTracker) -> bool {
        tracker.all_built(&recipe.required_buildings)
    }

    pub fn can_afford(
        refine: RefineType,
        catalog: &Catalog,
        ledger: &ResourceLedger,
        tracker: &BuildProgressTracker,
    ) -> bool {
        catalog.recipe(refine).is_some_and(|recipe| {
            Self::recipe_unlocked(recipe, tracker) && ledger.can_afford(&recipe.input_costs)
        })
    }

    /// Deduct inputs and credit the output, or do nothing
    pub fn try_apply(
        refine: RefineType,
        catalog: &Catalog,
        ledger: &mut ResourceLedger,
        tracker: &BuildProgressTracker,
    ) -> bool {
        let Some(recipe) = catalog.recipe(refine) else {
            return false;
        };
        if !Self::recipe_unlocked(recipe, tracker) || !ledger.can_afford(&recipe.input_costs) {
            return false;
        }

        ledger.deduct_all(&recipe.input_costs);
        ledger.add(recipe.output.resource, recipe.output.amount);

        #[cfg(feature = "instrument")]
        tracing::info!(
            target: "refine",
            recipe = ?refine,
            output = ?recipe.output.resource,
            amount = recipe.output.amount,
        );

        true
    }

    /// Recipes whose required buildings are all Built
    pub fn unlocked_refines(catalog: &Catalog, tracker: &BuildProgressTracker) -> Vec<RefineType> {
        RefineType::all()
            .filter(|r| {
                catalog
                    .recipe(*r)
                    .is_some_and(|recipe| Self::recipe_unlocked(recipe, tracker))
            })
            .collect()
    }
}
