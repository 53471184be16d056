//! Search statistics (spec §4.4 step 7, §6.3 `collectStats`).

use crate::guard::GuardStats;

/// Coverage and bookkeeping counters accumulated over a search: a handful
/// of plain `u64` counters a caller reads back after `doSearch` rather than
/// a full telemetry pipeline, since statistics writers are out of scope
/// (spec §1).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SearchStats {
    /// Total `step` invocations.
    pub step_count: u64,
    /// Deepest `choiceDepth` reached.
    pub max_depth_reached: u64,
    /// Number of distinct concrete states discovered by state caching.
    pub distinct_state_count: u64,
    /// Number of events delivered to a target machine (spec S2: `#-events`).
    pub event_count: u64,
    /// Number of `createStep`s taken.
    pub create_step_count: u64,
    /// Number of `syncStep`s taken.
    pub sync_step_count: u64,
    /// Number of times `restoreState` was invoked.
    pub backtrack_count: u64,
    /// Number of candidates pruned by the receiver-queue filter.
    pub receiver_order_pruned: u64,
    /// Number of candidates pruned by the interleave filter.
    pub interleave_pruned: u64,
    /// Number of candidates pruned by the sleep-set filter.
    pub sleep_set_pruned: u64,
    /// Snapshot of the boolean-algebra call counters at the end of the run.
    pub guard_stats: GuardStats,
}

impl SearchStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_step(&mut self, depth: u64) {
        self.step_count += 1;
        self.max_depth_reached = self.max_depth_reached.max(depth);
    }
}
