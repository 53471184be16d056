//! The choice log and backtrack frames of spec §3.4 / §4.5: the recorded
//! plan a run replays deterministically.

use std::collections::{HashMap, HashSet};

use crate::guard::Guard;
use crate::ids::{ClassId, MachineId};
use crate::machine::{Machine, MachineHandle};
use crate::value::PrimitiveVS;

/// The kind of a recorded nondeterministic choice (spec §3.4).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChoiceKind {
    Bool,
    Integer,
    Element,
    Sender,
}

/// One concrete outcome of a recorded choice, paired with the guard under
/// which it holds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ChoiceValue {
    Bool(bool),
    Int(i64),
    Sender(MachineId),
}

/// One entry of the [`Schedule`]: the kind of choice, and the full VS of
/// candidate outcomes at the time it was made (spec §3.4). Replay (spec
/// §4.5) constrains a fresh choice to this recorded VS rather than
/// re-deriving it.
#[derive(Debug, Clone)]
pub struct ChoiceRecord {
    pub kind: ChoiceKind,
    pub candidates: Vec<(Guard, ChoiceValue)>,
}

/// A snapshot of (per-machine local state, per-class counters) taken at
/// the beginning of a step, used to restore source state on backtrack
/// (spec §3.4, §4.5). Symbolic — guards and all — unlike
/// [`crate::snapshot::ConcreteWorldState`], which is the *concretized*
/// projection state caching hashes.
#[derive(Debug, Clone)]
pub struct BacktrackFrame {
    pub machines: Vec<(MachineHandle, Machine)>,
    pub counters: HashMap<ClassId, PrimitiveVS<i64>>,
}

/// Linear record of choices made so far (spec §3.4): one [`ChoiceRecord`]
/// per `choiceDepth`, backtrack frames keyed by depth, and per-depth sleep
/// sets of machine identities already explored there.
#[derive(Debug, Default)]
pub struct Schedule {
    choices: Vec<ChoiceRecord>,
    frames: HashMap<u64, BacktrackFrame>,
    sleep_sets: HashMap<u64, HashSet<MachineId>>,
}

impl Schedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a choice, returning the `choiceDepth` it was recorded at.
    pub fn record(&mut self, kind: ChoiceKind, candidates: Vec<(Guard, ChoiceValue)>) -> u64 {
        self.choices.push(ChoiceRecord { kind, candidates });
        (self.choices.len() - 1) as u64
    }

    pub fn choice_depth(&self) -> u64 {
        self.choices.len() as u64
    }

    pub fn choice_at(&self, depth: u64) -> Option<&ChoiceRecord> {
        self.choices.get(depth as usize)
    }

    pub fn choices(&self) -> &[ChoiceRecord] {
        &self.choices
    }

    /// Truncates the log back to `depth` entries, discarding everything
    /// recorded afterward — used after a backtrack-then-continue so a
    /// fresh exploration overwrites the stale tail (spec §4.5, S6).
    pub fn truncate(&mut self, depth: u64) {
        self.choices.truncate(depth as usize);
        self.frames.retain(|&d, _| d < depth);
        self.sleep_sets.retain(|&d, _| d < depth);
    }

    pub fn frame(&self, depth: u64) -> Option<&BacktrackFrame> {
        self.frames.get(&depth)
    }

    pub fn has_frame(&self, depth: u64) -> bool {
        self.frames.contains_key(&depth)
    }

    pub fn set_frame(&mut self, depth: u64, frame: BacktrackFrame) {
        self.frames.insert(depth, frame);
    }

    pub fn sleep_set(&self, depth: u64) -> Option<&HashSet<MachineId>> {
        self.sleep_sets.get(&depth)
    }

    /// Records that `id` has been explored at `depth` and must not be
    /// revisited there (spec §3.4 "sleep sets", §4.4 step h).
    pub fn add_to_sleep_set(&mut self, depth: u64, id: MachineId) {
        self.sleep_sets.entry(depth).or_default().insert(id);
    }
}
