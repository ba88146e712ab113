// Build progress tracking - the NotBuilt -> InProgress -> Built state machine

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tsify_next::Tsify;

use crate::types::{BuildState, BuildType};

/// Emitted whenever a building's state actually moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Tsify)]
#[tsify(into_wasm_abi, from_wasm_abi)]
pub struct BuildEvent {
    pub build_type: BuildType,
    pub state: BuildState,
}

/// Per-building state with a queue of pending change events.
///
/// Transitions only ever move forward. Re-marking a building into its current
/// state, or into an earlier one, does nothing and queues nothing. `None` is
/// never tracked.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildProgressTracker {
    states: HashMap<BuildType, BuildState>,
    pending: Vec<BuildEvent>,
}

impl BuildProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_state(&self, build_type: BuildType) -> BuildState {
        self.states.get(&build_type).copied().unwrap_or_default()
    }

    pub fn is_built(&self, build_type: BuildType) -> bool {
        self.get_state(build_type) == BuildState::Built
    }

    pub fn is_in_progress(&self, build_type: BuildType) -> bool {
        self.get_state(build_type) == BuildState::InProgress
    }

    /// True when every listed building is Built (vacuously true for an empty list)
    pub fn all_built(&self, build_types: &[BuildType]) -> bool {
        build_types.iter().all(|b| self.is_built(*b))
    }

    /// Buildings currently under construction, in catalog order
    pub fn in_progress(&self) -> Vec<BuildType> {
        BuildType::concrete()
            .filter(|b| self.is_in_progress(*b))
            .collect()
    }

    pub fn mark_in_progress(&mut self, build_type: BuildType) {
        self.advance_to(build_type, BuildState::InProgress);
    }

    pub fn mark_built(&mut self, build_type: BuildType) {
        self.advance_to(build_type, BuildState::Built);
    }

    /// Drain queued events, oldest first
    pub fn drain_events(&mut self) -> Vec<BuildEvent> {
        std::mem::take(&mut self.pending)
    }

    fn advance_to(&mut self, build_type: BuildType, state: BuildState) {
        if build_type.is_none() {
            return;
        }
        let current = self.get_state(build_type);
        if state <= current {
            return;
        }

        self.states.insert(build_type, state);
        self.pending.push(BuildEvent { build_type, state });

        #[cfg(feature = "instrument")]
        tracing::info!(
            target: "build_state",
            build_type = ?build_type,
            from = ?current,
            to = ?state,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_untouched_and_none_are_not_built() {
        let tracker = BuildProgressTracker::new();
        assert_eq!(tracker.get_state(BuildType::Castle), BuildState::NotBuilt);
        assert_eq!(tracker.get_state(BuildType::None), BuildState::NotBuilt);
    }

    #[test]
    fn test_forward_transitions_emit_events() {
        let mut tracker = BuildProgressTracker::new();
        tracker.mark_in_progress(BuildType::Castle);
        tracker.mark_built(BuildType::Castle);

        assert!(tracker.is_built(BuildType::Castle));
        assert_eq!(
            tracker.drain_events(),
            vec![
                BuildEvent {
                    build_type: BuildType::Castle,
                    state: BuildState::InProgress
                },
                BuildEvent {
                    build_type: BuildType::Castle,
                    state: BuildState::Built
                },
            ]
        );
    }

    #[test]
    fn test_marks_never_regress() {
        let mut tracker = BuildProgressTracker::new();
        tracker.mark_built(BuildType::Bridge);
        tracker.drain_events();

        tracker.mark_in_progress(BuildType::Bridge);
        tracker.mark_built(BuildType::Bridge);

        assert_eq!(tracker.get_state(BuildType::Bridge), BuildState::Built);
        assert!(tracker.drain_events().is_empty());
    }

    #[test]
    fn test_none_is_ignored() {
        let mut tracker = BuildProgressTracker::new();
        tracker.mark_in_progress(BuildType::None);
        tracker.mark_built(BuildType::None);

        assert_eq!(tracker.get_state(BuildType::None), BuildState::NotBuilt);
        assert!(tracker.drain_events().is_empty());
    }

    #[test]
    fn test_all_built() {
        let mut tracker = BuildProgressTracker::new();
        assert!(tracker.all_built(&[]));

        tracker.mark_built(BuildType::Castle);
        tracker.mark_in_progress(BuildType::Motte);
        assert!(tracker.all_built(&[BuildType::Castle]));
        assert!(!tracker.all_built(&[BuildType::Castle, BuildType::Motte]));
        assert_eq!(tracker.in_progress(), vec![BuildType::Motte]);
    }
}
