// Construction sites - worker-time accumulation toward a finished building

use serde::{Deserialize, Serialize};

use crate::catalog::BuildInfo;
use crate::progress::BuildProgressTracker;
use crate::types::BuildType;

/// Runtime entity for one building under construction.
///
/// Progress is measured in worker-seconds: each tick adds
/// `workers * dt`. Progress is not capped at `required_seconds`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConstructionSite {
    pub build_type: BuildType,
    pub required_seconds: f64,
    pub progress_seconds: f64,
    pub is_building: bool,
    pub is_finished: bool,
    /// Elapsed simulation time at which the site finishes on its own
    pub fallback_deadline: Option<f64>,
}

impl ConstructionSite {
    /// Open a site for `build_type`. Required time is at least one second.
    pub fn begin(build_type: BuildType, info: &BuildInfo) -> Self {
        let required_seconds = info.build_time_seconds.max(1.0);

        #[cfg(feature = "instrument")]
        tracing::info!(
            target: "construction",
            build_type = ?build_type,
            event = "begin",
            required_seconds = required_seconds,
        );

        Self {
            build_type,
            required_seconds,
            progress_seconds: 0.0,
            is_building: true,
            is_finished: false,
            fallback_deadline: None,
        }
    }

    /// Finish unconditionally once `deadline` elapsed seconds are reached
    pub fn with_fallback_deadline(mut self, deadline: f64) -> Self {
        self.fallback_deadline = Some(deadline);
        self
    }

    /// Add `workers * dt` progress. Returns true if this call finished the site.
    /// With no workers progress is frozen.
    pub fn add_worker_time(
        &mut self,
        workers: u32,
        dt: f64,
        tracker: &mut BuildProgressTracker,
    ) -> bool {
        if !self.is_building || self.is_finished || workers == 0 || dt <= 0.0 {
            return false;
        }

        self.progress_seconds += f64::from(workers) * dt;
        if self.progress_seconds >= self.required_seconds {
            self.finish(tracker);
            return true;
        }
        false
    }

    /// Finish if the fallback deadline has passed. Returns true if this call
    /// finished the site.
    pub fn check_deadline(&mut self, elapsed: f64, tracker: &mut BuildProgressTracker) -> bool {
        match self.fallback_deadline {
            Some(deadline) if self.is_building && elapsed >= deadline => {
                self.finish(tracker);
                true
            }
            _ => false,
        }
    }

    /// Idempotent
    pub fn finish(&mut self, tracker: &mut BuildProgressTracker) {
        if self.is_finished {
            return;
        }
        self.is_finished = true;
        self.is_building = false;
        tracker.mark_built(self.build_type);

        #[cfg(feature = "instrument")]
        tracing::info!(
            target: "construction",
            build_type = ?self.build_type,
            event = "finish",
            progress_seconds = self.progress_seconds,
        );
    }

    /// Seconds of single-worker time still needed, only while building
    pub fn remaining_seconds(&self) -> Option<f64> {
        if !self.is_building {
            return None;
        }
        Some((self.required_seconds - self.progress_seconds).max(0.0))
    }
}
