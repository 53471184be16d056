use super::{MapVS, PrimitiveVS, ValueSummary};
use crate::guard::{Guard, GuardContext};
use crate::ids::MachineId;

/// `MapVS⟨MachineHandle, Integer⟩`, incremented on every send (spec §3.3).
///
/// Keyed on [`MachineId`] rather than the arena-internal machine handle:
/// a vector clock is modeled state that gets restricted, merged and
/// compared across the search, so its keys need to be stable, `Eq`
/// scalars — exactly what [`MapVS`]'s keys already require, and what the
/// generational handle is deliberately not (see `ids.rs`).
#[derive(Clone)]
pub struct VectorClockVS {
    entries: MapVS<PrimitiveVS<MachineId>, PrimitiveVS<i64>>,
}

impl VectorClockVS {
    pub fn empty(ctx: &GuardContext) -> Self {
        Self {
            entries: MapVS::empty(ctx),
        }
    }

    /// The current count for `machine`, or `0` wherever no entry exists yet.
    pub fn get(&self, machine: MachineId, ctx: &GuardContext) -> PrimitiveVS<i64> {
        let key = PrimitiveVS::constant(machine, ctx);
        let found = self.entries.get(&key, ctx);
        let unset = ctx.not(found.get_universe());
        if ctx.is_false(unset) {
            found
        } else {
            PrimitiveVS::merge(vec![found, PrimitiveVS::single(unset, 0, ctx)], ctx)
        }
    }

    /// Bumps `machine`'s count by one everywhere under `g`, leaving the
    /// rest of the clock untouched.
    pub fn tick(&self, machine: MachineId, g: Guard, ctx: &GuardContext) -> Self {
        let current = self.get(machine, ctx).restrict(g, ctx);
        let bumped: Vec<(Guard, i64)> = current
            .get_guarded_values(ctx)
            .into_iter()
            .map(|(eg, n)| (eg, n + 1))
            .collect();
        let next = PrimitiveVS::from_entries(bumped, ctx);
        let key = PrimitiveVS::constant(machine, ctx);
        Self {
            entries: self.entries.put(&key, &next, ctx),
        }
    }

    /// Pointwise maximum with `other`, used when delivery causally joins two
    /// clocks (receiver adopts the later of its own and the sender's count
    /// for every machine).
    pub fn join(&self, other: &Self, ctx: &GuardContext) -> Self {
        let mut merged = self.clone();
        for key_vs in other.entries.keys().elems() {
            for (_, m) in key_vs.get_guarded_values(ctx) {
                let ours = merged.get(m, ctx);
                let theirs = other.get(m, ctx);
                let mut picked = Vec::new();
                for (g, a) in ours.get_guarded_values(ctx) {
                    for (h, b) in theirs.get_guarded_values(ctx) {
                        let g2 = ctx.and(g, h);
                        if ctx.is_sat(g2) {
                            picked.push((g2, a.max(b)));
                        }
                    }
                }
                let key_const = PrimitiveVS::constant(m, ctx);
                merged.entries = merged
                    .entries
                    .put(&key_const, &PrimitiveVS::from_entries(picked, ctx), ctx);
            }
        }
        merged
    }
}

impl ValueSummary for VectorClockVS {
    type Concrete = Vec<(MachineId, i64)>;

    fn restrict(&self, g: Guard, ctx: &GuardContext) -> Self {
        Self {
            entries: self.entries.restrict(g, ctx),
        }
    }

    fn merge(items: Vec<Self>, ctx: &GuardContext) -> Self {
        Self {
            entries: MapVS::merge(items.into_iter().map(|v| v.entries).collect(), ctx),
        }
    }

    fn get_universe(&self) -> Guard {
        self.entries.get_universe()
    }

    fn symbolic_equals(&self, other: &Self, pc: Guard, ctx: &GuardContext) -> PrimitiveVS<bool> {
        self.entries.symbolic_equals(&other.entries, pc, ctx)
    }

    fn get_guarded_values(&self, ctx: &GuardContext) -> Vec<(Guard, Self::Concrete)> {
        self.entries.get_guarded_values(ctx)
    }
}
