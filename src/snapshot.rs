//! Concrete-state snapshots used by state caching (spec §4.4 point 2) and
//! answering Open Question (c): an explicit, portable shape rather than
//! opaque object serialization. This crate defines an explicit,
//! `serde`-derived binary shape for the *concretized* state a
//! state-caching enumeration step produces — `ConcreteWorldState` — and
//! leaves the actual encoding to whatever
//! `serde` backend the caller picks (the dev-dependency `bincode` is what
//! this crate's own tests round-trip through; see `tests/snapshot.rs`).
//!
//! This is deliberately distinct from [`crate::scheduler::BacktrackFrame`]:
//! a backtrack frame restores *symbolic* machine state (guards and all)
//! for mid-run backtracking and never leaves the process, so it just
//! clones [`crate::machine::Machine`] values directly. `ConcreteWorldState`
//! is the fully-concretized, guard-free projection used to hash and
//! deduplicate one satisfying assignment of the source state during
//! state-caching (spec §4.4 point 2, §6.3 `useStateCaching`).

use std::hash::{Hash, Hasher};

use crate::ids::{ClassId, MachineId, StateId};
use crate::value::{DynConcrete, MessageConcrete};

/// One machine's fully-concretized state: the projection state caching
/// hashes to decide whether a candidate source state has been seen before.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConcreteMachineState {
    pub id: MachineId,
    pub class: ClassId,
    pub local_state: Vec<DynConcrete>,
    pub pending: Vec<MessageConcrete>,
    pub current_state: StateId,
    pub halted: bool,
}

/// A full concretization of the scheduler's source state: one entry per
/// live machine, in the arena's stable insertion order (spec §5: ordering
/// is a required invariant, so two concretizations of the same symbolic
/// state in the same order hash identically).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConcreteWorldState {
    pub machines: Vec<ConcreteMachineState>,
}

impl ConcreteWorldState {
    pub fn new(machines: Vec<ConcreteMachineState>) -> Self {
        Self { machines }
    }

    /// A stable 64-bit digest, used as the state-cache key. `std`'s
    /// `DefaultHasher` (SipHash) is stable within a process but its seed
    /// is randomized per-process by design — fine here, since the digest
    /// never needs to compare across runs, only within one
    /// [`crate::scheduler::Scheduler`] run's `distinctStates` set (spec §3.5).
    pub fn digest(&self) -> u64 {
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        self.hash(&mut hasher);
        hasher.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_states_hash_identically() {
        let a = ConcreteWorldState::new(vec![ConcreteMachineState {
            id: MachineId {
                class: ClassId(0),
                instance: 0,
            },
            class: ClassId(0),
            local_state: vec![DynConcrete::Scalar(crate::value::Scalar::Int(1))],
            pending: vec![],
            current_state: StateId(0),
            halted: false,
        }]);
        let b = a.clone();
        assert_eq!(a.digest(), b.digest());
    }

    #[test]
    fn distinct_states_differ() {
        let mk = |n: i64| {
            ConcreteWorldState::new(vec![ConcreteMachineState {
                id: MachineId {
                    class: ClassId(0),
                    instance: 0,
                },
                class: ClassId(0),
                local_state: vec![DynConcrete::Scalar(crate::value::Scalar::Int(n))],
                pending: vec![],
                current_state: StateId(0),
                halted: false,
            }])
        };
        assert_ne!(mk(1).digest(), mk(2).digest());
    }
}
