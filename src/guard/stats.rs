//! Per-call counters for the boolean algebra (spec §4.1).

/// Call counters for the four "expensive" boolean operations. Plain `u64`
/// fields rather than atomics: the engine is single-threaded within a run
/// (spec §5) and a parallel driver is expected to clone a whole
/// [`super::GuardContext`] per worker rather than share one.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct GuardStats {
    pub and: u64,
    pub or: u64,
    pub not: u64,
    pub is_sat: u64,
}
