//! Scheduler configuration (spec §6.3).
//!
//! `bitflags` covers exactly this shape — a handful of independently
//! togglable feature switches. The reduction toggles live in one
//! [`ReductionFlags`] bitset; the scalar options stay plain struct fields,
//! assembled incrementally through [`SchedulerConfigBuilder`].

use bitflags::bitflags;

bitflags! {
    /// The five boolean reduction toggles of spec §6.3, plus `DPOR` (vector
    /// clock tracking independent of receiver-queue semantics).
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ReductionFlags: u16 {
        /// `useReceiverQueueSemantics`.
        const RECEIVER_QUEUE   = 0b0000_0001;
        /// `useBagSemantics`.
        const BAG_SEMANTICS    = 0b0000_0010;
        /// `useSleepSets`.
        const SLEEP_SETS       = 0b0000_0100;
        /// `useFilters` (interleave-order filter).
        const INTERLEAVE_FILTERS = 0b0000_1000;
        /// `useStateCaching`.
        const STATE_CACHING    = 0b0001_0000;
        /// `useBacktrack`.
        const BACKTRACK        = 0b0010_0000;
        /// `isDpor` — vector-clock tracking even without receiver semantics.
        const DPOR             = 0b0100_0000;
    }
}

/// Full set of scheduler options (spec §6.3). Constructed directly or via
/// [`SchedulerConfig::builder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerConfig {
    pub flags: ReductionFlags,
    /// `maxStepBound`: terminate when `depth == bound`. `None` = unbounded.
    pub max_step_bound: Option<u64>,
    /// `maxInternalSteps`: bound per-machine event-to-completion internal
    /// steps. `None` = unbounded.
    pub max_internal_steps: Option<u32>,
    /// Verbosity of stats collection, 0–4.
    pub collect_stats: u8,
    /// Log verbosity, 0–5.
    pub verbosity: u8,
    /// Memory cap in MB; `0` = unlimited.
    pub mem_limit_mb: u64,
    /// Wall-clock cap in seconds; `0` = unlimited.
    pub time_limit_secs: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            flags: ReductionFlags::empty(),
            max_step_bound: None,
            max_internal_steps: None,
            collect_stats: 1,
            verbosity: 0,
            mem_limit_mb: 0,
            time_limit_secs: 0,
        }
    }
}

impl SchedulerConfig {
    pub fn builder() -> SchedulerConfigBuilder {
        SchedulerConfigBuilder::new()
    }

    pub fn use_receiver_queue_semantics(&self) -> bool {
        self.flags.contains(ReductionFlags::RECEIVER_QUEUE)
    }

    pub fn use_bag_semantics(&self) -> bool {
        self.flags.contains(ReductionFlags::BAG_SEMANTICS)
    }

    pub fn use_sleep_sets(&self) -> bool {
        self.flags.contains(ReductionFlags::SLEEP_SETS)
    }

    pub fn use_filters(&self) -> bool {
        self.flags.contains(ReductionFlags::INTERLEAVE_FILTERS)
    }

    pub fn use_state_caching(&self) -> bool {
        self.flags.contains(ReductionFlags::STATE_CACHING)
    }

    pub fn use_backtrack(&self) -> bool {
        self.flags.contains(ReductionFlags::BACKTRACK)
    }

    /// Vector clocks are needed whenever `isDpor` or receiver-queue
    /// semantics are requested (spec §6.3: "Enables vector-clock tracking
    /// even without receiver semantics" implies receiver semantics already
    /// imply it).
    pub fn tracks_vector_clocks(&self) -> bool {
        self.flags
            .intersects(ReductionFlags::DPOR | ReductionFlags::RECEIVER_QUEUE)
    }
}

/// Incrementally construct a [`SchedulerConfig`]: a handful of `with_*`
/// setters returning `&mut Self`, then `build()`.
#[derive(Debug, Default)]
pub struct SchedulerConfigBuilder {
    config: SchedulerConfig,
}

impl SchedulerConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_flags(&mut self, flags: ReductionFlags) -> &mut Self {
        self.config.flags.insert(flags);
        self
    }

    pub fn without_flags(&mut self, flags: ReductionFlags) -> &mut Self {
        self.config.flags.remove(flags);
        self
    }

    pub fn with_max_step_bound(&mut self, bound: u64) -> &mut Self {
        self.config.max_step_bound = Some(bound);
        self
    }

    pub fn with_max_internal_steps(&mut self, steps: u32) -> &mut Self {
        self.config.max_internal_steps = Some(steps);
        self
    }

    pub fn with_collect_stats(&mut self, level: u8) -> &mut Self {
        self.config.collect_stats = level;
        self
    }

    pub fn with_verbosity(&mut self, level: u8) -> &mut Self {
        self.config.verbosity = level;
        self
    }

    pub fn with_mem_limit_mb(&mut self, mb: u64) -> &mut Self {
        self.config.mem_limit_mb = mb;
        self
    }

    pub fn with_time_limit_secs(&mut self, secs: u64) -> &mut Self {
        self.config.time_limit_secs = secs;
        self
    }

    pub fn build(&mut self) -> SchedulerConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec_table() {
        let cfg = SchedulerConfig::default();
        assert_eq!(cfg.flags, ReductionFlags::empty());
        assert_eq!(cfg.max_step_bound, None);
        assert_eq!(cfg.collect_stats, 1);
    }

    #[test]
    fn builder_sets_flags() {
        let cfg = SchedulerConfig::builder()
            .with_flags(ReductionFlags::RECEIVER_QUEUE | ReductionFlags::SLEEP_SETS)
            .with_max_step_bound(100)
            .build();
        assert!(cfg.use_receiver_queue_semantics());
        assert!(cfg.use_sleep_sets());
        assert!(!cfg.use_bag_semantics());
        assert_eq!(cfg.max_step_bound, Some(100));
    }

    #[test]
    fn dpor_implied_by_receiver_queue() {
        let cfg = SchedulerConfig::builder()
            .with_flags(ReductionFlags::RECEIVER_QUEUE)
            .build();
        assert!(cfg.tracks_vector_clocks());
    }
}
