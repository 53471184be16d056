use smallvec::SmallVec;

use super::{canonicalize, ValueSummary};
use crate::guard::{Guard, GuardContext};

/// Guarded concrete scalars (spec §3.2: "Primitive VS ⟨T⟩"). The hot,
/// statically-dispatched leaf of the VS hierarchy.
///
/// Entries are kept pairwise-disjoint and sorted by nothing in particular
/// (insertion order) — iteration order is stable within a run but not
/// specified across runs, matching spec §4.2's `getGuardedValues` contract.
#[derive(Clone, Debug)]
pub struct PrimitiveVS<T> {
    entries: SmallVec<[(Guard, T); 4]>,
    universe: Guard,
}

impl<T: Clone + PartialEq> PrimitiveVS<T> {
    /// A VS defined nowhere (`universe = false`).
    pub fn empty(ctx: &GuardContext) -> Self {
        Self {
            entries: SmallVec::new(),
            universe: ctx.mk_false(),
        }
    }

    /// A VS with a single concrete value under `true`.
    pub fn constant(value: T, ctx: &GuardContext) -> Self {
        Self::single(ctx.mk_true(), value, ctx)
    }

    /// A VS with a single concrete value under `g`.
    pub fn single(g: Guard, value: T, ctx: &GuardContext) -> Self {
        if ctx.is_false(g) {
            return Self::empty(ctx);
        }
        Self {
            entries: SmallVec::from_buf([(g, value)]),
            universe: g,
        }
    }

    /// Builds directly from already-disjoint `(guard, value)` pairs,
    /// computing the universe. Used by container types that maintain
    /// their own disjointness invariants internally.
    pub fn from_entries(entries: Vec<(Guard, T)>, ctx: &GuardContext) -> Self {
        let entries = canonicalize(entries, ctx);
        let universe = entries
            .iter()
            .fold(ctx.mk_false(), |acc, (g, _)| ctx.or(acc, *g));
        Self {
            entries: entries.into(),
            universe,
        }
    }

    pub fn entries(&self) -> &[(Guard, T)] {
        &self.entries
    }

    /// Project this VS to a single concrete value, given a satisfying
    /// guard `g` known to be a subset of exactly one entry's guard.
    /// Returns `None` if no entry's guard overlaps `g`.
    pub fn value_under(&self, g: Guard, ctx: &GuardContext) -> Option<&T> {
        self.entries
            .iter()
            .find(|(eg, _)| ctx.is_sat(ctx.and(*eg, g)))
            .map(|(_, v)| v)
    }
}

impl<T: Clone + PartialEq> ValueSummary for PrimitiveVS<T> {
    type Concrete = T;

    fn restrict(&self, g: Guard, ctx: &GuardContext) -> Self {
        let entries = self
            .entries
            .iter()
            .map(|(eg, v)| (ctx.and(*eg, g), v.clone()))
            .filter(|(eg, _)| !ctx.is_false(*eg))
            .collect();
        Self::from_entries(entries, ctx)
    }

    fn merge(items: Vec<Self>, ctx: &GuardContext) -> Self {
        let entries = items
            .into_iter()
            .flat_map(|vs| vs.entries.into_iter())
            .collect();
        Self::from_entries(entries, ctx)
    }

    fn get_universe(&self) -> Guard {
        self.universe
    }

    fn symbolic_equals(&self, other: &Self, pc: Guard, ctx: &GuardContext) -> PrimitiveVS<bool> {
        let mut entries = Vec::new();
        for (ga, va) in &self.entries {
            for (gb, vb) in &other.entries {
                let g = ctx.and(ctx.and(*ga, *gb), pc);
                if ctx.is_sat(g) {
                    entries.push((g, *va == *vb));
                }
            }
        }
        PrimitiveVS::from_entries(entries, ctx)
    }

    fn get_guarded_values(&self, _ctx: &GuardContext) -> Vec<(Guard, T)> {
        self.entries.iter().cloned().collect()
    }
}

impl PrimitiveVS<bool> {
    /// The guard under which this boolean VS holds `which`. Canonicalization
    /// guarantees at most one entry per distinct bool value, so this is a
    /// direct lookup, not a fold.
    pub fn guard_for(&self, which: bool, ctx: &GuardContext) -> Guard {
        self.entries
            .iter()
            .find(|(_, v)| *v == which)
            .map(|(g, _)| *g)
            .unwrap_or_else(|| ctx.mk_false())
    }
}
