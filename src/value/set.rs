use super::{ListVS, ValueSummary};
use crate::guard::{Guard, GuardContext};
use crate::value::primitive::PrimitiveVS;

/// A `List` VS with the invariant that `contains` is false for any
/// duplicate under every guard (spec §3.2).
#[derive(Clone)]
pub struct SetVS<T: ValueSummary> {
    list: ListVS<T>,
}

impl<T: ValueSummary> SetVS<T> {
    pub fn empty(ctx: &GuardContext) -> Self {
        Self {
            list: ListVS::empty(ctx),
        }
    }

    /// Disjunction of symbolic equality of `x` with each element, under
    /// that element's in-range guard (`size > i`).
    pub fn contains(&self, x: &T, ctx: &GuardContext) -> PrimitiveVS<bool> {
        let size = self.list.size();
        let mut acc = PrimitiveVS::constant(false, ctx);

        for (i, elem) in self.list.elems().iter().enumerate() {
            let in_range_guard = size
                .get_guarded_values(ctx)
                .into_iter()
                .filter(|(_, sz)| *sz > i as i64)
                .fold(ctx.mk_false(), |acc, (g, _)| ctx.or(acc, g));

            let eq = x.symbolic_equals(elem, in_range_guard, ctx);
            acc = or_bool(&acc, &eq, ctx);
        }
        acc
    }

    /// `add(x)`: add only under the guard `¬contains(x)`; the universe is
    /// unchanged elsewhere (spec §4.2).
    pub fn add(&self, x: &T, ctx: &GuardContext) -> Self {
        let already = self.contains(x, ctx);
        let not_contains = ctx.not(already.guard_for(true, ctx));
        Self {
            list: self.list.add_masked(not_contains, x, ctx),
        }
    }

    pub fn len(&self) -> &PrimitiveVS<i64> {
        self.list.size()
    }

    pub fn elems(&self) -> &[T] {
        self.list.elems()
    }
}

impl<T: ValueSummary> ValueSummary for SetVS<T> {
    type Concrete = Vec<T::Concrete>;

    fn restrict(&self, g: Guard, ctx: &GuardContext) -> Self {
        Self {
            list: self.list.restrict(g, ctx),
        }
    }

    fn merge(items: Vec<Self>, ctx: &GuardContext) -> Self {
        Self {
            list: ListVS::merge(items.into_iter().map(|s| s.list).collect(), ctx),
        }
    }

    fn get_universe(&self) -> Guard {
        self.list.get_universe()
    }

    fn symbolic_equals(&self, other: &Self, pc: Guard, ctx: &GuardContext) -> PrimitiveVS<bool> {
        self.list.symbolic_equals(&other.list, pc, ctx)
    }

    fn get_guarded_values(&self, ctx: &GuardContext) -> Vec<(Guard, Vec<T::Concrete>)> {
        self.list.get_guarded_values(ctx)
    }
}

fn or_bool(a: &PrimitiveVS<bool>, b: &PrimitiveVS<bool>, ctx: &GuardContext) -> PrimitiveVS<bool> {
    let mut entries = Vec::new();
    for (ga, va) in a.entries() {
        for (gb, vb) in b.entries() {
            let g = ctx.and(*ga, *gb);
            if ctx.is_sat(g) {
                entries.push((g, *va || *vb));
            }
        }
    }
    PrimitiveVS::from_entries(entries, ctx)
}
