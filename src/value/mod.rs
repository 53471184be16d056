//! The value-summary (VS) layer — spec §3.2 / §4.2.
//!
//! Every piece of modeled program state is a [`ValueSummary`]: a guarded
//! disjunction of concrete values, canonicalized so that two structurally
//! equal values under the same guard collapse to one entry. The hot,
//! statically-dispatched leaf is [`PrimitiveVS`]; everything above it
//! (`List`, `Set`, `Map`, tuples, unions, messages) is built generically
//! on top of `ValueSummary` rather than through a separate trait-object
//! hierarchy (design note, spec §9: "avoid deep inheritance — a shared
//! trait/interface suffices").

mod dyn_value;
mod list;
mod map;
mod message;
mod primitive;
mod scalar;
mod set;
mod tuple;
mod union;
mod vector_clock;

pub use dyn_value::{DynConcrete, DynValue};
pub use list::ListVS;
pub use map::MapVS;
pub use message::{Message, MessageConcrete};
pub use primitive::PrimitiveVS;
pub use scalar::Scalar;
pub use set::SetVS;
pub use union::UnionVS;
pub use vector_clock::VectorClockVS;

use crate::guard::{Guard, GuardContext};

/// Shared capability set every VS variant implements (spec §3.2):
/// `restrict`, `merge`, `updateUnderGuard`, `symbolicEquals`, `getUniverse`,
/// `isEmptyVS`, plus `getGuardedValues` for enumeration.
pub trait ValueSummary: Clone {
    /// The fully-concretized representation of one entry, used by
    /// `get_guarded_values` and by state-caching concretization (spec §4.4
    /// point 2).
    type Concrete: Clone + PartialEq;

    /// Conjoin every entry's guard with `g`; entries that become `false`
    /// are dropped. `restrict(true)` must be the identity (law 1, spec §8).
    fn restrict(&self, g: Guard, ctx: &GuardContext) -> Self;

    /// Union the entries of `items`, canonicalizing: entries with
    /// structurally-equal values are merged under the disjunction of their
    /// guards. Callers must guarantee pairwise-disjoint guards *across*
    /// inputs (the idiom is `a.restrict(g)` and `b.restrict(ctx.not(g))`);
    /// violating this is an [`crate::error::InvariantError::OverlappingGuards`].
    fn merge(items: Vec<Self>, ctx: &GuardContext) -> Self;

    /// The disjunction of this VS's entry guards.
    fn get_universe(&self) -> Guard;

    /// `true` iff this VS's universe is identically false.
    fn is_empty_vs(&self, ctx: &GuardContext) -> bool {
        ctx.is_false(self.get_universe())
    }

    /// `self.restrict(¬g).merge(update.restrict(g))` (spec law 4).
    fn update_under_guard(&self, g: Guard, update: &Self, ctx: &GuardContext) -> Self {
        let not_g = ctx.not(g);
        let kept = self.restrict(not_g, ctx);
        let applied = update.restrict(g, ctx);
        Self::merge(vec![kept, applied], ctx)
    }

    /// `true` under exactly the guard (subset of `pc ∧ self.universe ∧
    /// other.universe`) where the two are structurally equal.
    fn symbolic_equals(&self, other: &Self, pc: Guard, ctx: &GuardContext) -> PrimitiveVS<bool>;

    /// Enumerate `[(g_i, v_i)]`. Iteration order is stable within a single
    /// process but not guaranteed across runs (spec §4.2) — tests that
    /// need a pinned order sort explicitly.
    fn get_guarded_values(&self, ctx: &GuardContext) -> Vec<(Guard, Self::Concrete)>;

    /// A `Debug`-friendly view of this VS's guarded entries, for test
    /// failure output and `tracing` events. Created using
    /// [`ValueSummary::debug`].
    fn debug<'a>(&'a self, ctx: &'a GuardContext) -> DebugGuarded<'a, Self>
    where
        Self: Sized,
    {
        DebugGuarded { vs: self, ctx }
    }
}

/// Pretty-prints a value summary's `(guard, value)` entries. Created using
/// [`ValueSummary::debug`].
pub struct DebugGuarded<'a, V: ValueSummary> {
    vs: &'a V,
    ctx: &'a GuardContext,
}

impl<'a, V> std::fmt::Debug for DebugGuarded<'a, V>
where
    V: ValueSummary,
    V::Concrete: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for (g, v) in self.vs.get_guarded_values(self.ctx) {
            map.entry(&g, &v);
        }
        map.finish()
    }
}

/// Combines `n` independent guarded dimensions into the guarded cartesian
/// product, conjoining guards and dropping unsatisfiable combinations.
/// Shared by `Tuple`, `Map`, and `Message`, whose concrete representation
/// is the product of several component VSs under one shared universe.
pub(crate) fn cartesian<T: Clone>(
    dims: &[Vec<(Guard, T)>],
    ctx: &GuardContext,
) -> Vec<(Guard, Vec<T>)> {
    let mut acc = vec![(ctx.mk_true(), Vec::new())];
    for dim in dims {
        let mut next = Vec::with_capacity(acc.len() * dim.len());
        for (g_acc, values) in &acc {
            for (g_dim, value) in dim {
                let g = ctx.and(*g_acc, *g_dim);
                if ctx.is_sat(g) {
                    let mut values = values.clone();
                    values.push(value.clone());
                    next.push((g, values));
                }
            }
        }
        acc = next;
    }
    acc
}

/// Canonicalizes a flat list of `(guard, value)` entries: entries whose
/// values are structurally equal are merged under the disjunction of
/// their guards; `false`-guarded entries are dropped. This is the
/// primitive every container's `merge` builds on.
pub(crate) fn canonicalize<T: Clone + PartialEq>(
    mut entries: Vec<(Guard, T)>,
    ctx: &GuardContext,
) -> Vec<(Guard, T)> {
    entries.retain(|(g, _)| !ctx.is_false(*g));

    let mut out: Vec<(Guard, T)> = Vec::with_capacity(entries.len());
    'entries: for (g, v) in entries {
        for (og, ov) in out.iter_mut() {
            if *ov == v {
                *og = ctx.or(*og, g);
                continue 'entries;
            }
        }
        out.push((g, v));
    }
    out
}
