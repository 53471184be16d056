//! Tuple VS: fixed-arity product of VSs sharing a universe (spec §3.2).
//!
//! Implemented directly on Rust tuples `(A, B)`, `(A, B, C)`, `(A, B, C, D)`
//! rather than through a wrapper struct, implementing traits straight on
//! tuple types instead of introducing a newtype per arity.

use super::ValueSummary;
use crate::guard::{Guard, GuardContext};
use crate::value::primitive::PrimitiveVS;

fn and_bool(a: &PrimitiveVS<bool>, b: &PrimitiveVS<bool>, ctx: &GuardContext) -> PrimitiveVS<bool> {
    let mut entries = Vec::new();
    for (ga, va) in a.entries() {
        for (gb, vb) in b.entries() {
            let g = ctx.and(*ga, *gb);
            if ctx.is_sat(g) {
                entries.push((g, *va && *vb));
            }
        }
    }
    PrimitiveVS::from_entries(entries, ctx)
}

// Tuple arities mix heterogeneous component types, so each arity gets its
// own direct impl below rather than going through the homogeneous
// `cartesian` helper used by the container VS types.

impl<A: ValueSummary, B: ValueSummary> ValueSummary for (A, B) {
    type Concrete = (A::Concrete, B::Concrete);

    fn restrict(&self, g: Guard, ctx: &GuardContext) -> Self {
        (self.0.restrict(g, ctx), self.1.restrict(g, ctx))
    }

    fn merge(items: Vec<Self>, ctx: &GuardContext) -> Self {
        let (a, b): (Vec<_>, Vec<_>) = items.into_iter().unzip();
        (A::merge(a, ctx), B::merge(b, ctx))
    }

    fn get_universe(&self) -> Guard {
        self.0.get_universe()
    }

    fn symbolic_equals(&self, other: &Self, pc: Guard, ctx: &GuardContext) -> PrimitiveVS<bool> {
        let eq_a = self.0.symbolic_equals(&other.0, pc, ctx);
        let eq_b = self.1.symbolic_equals(&other.1, pc, ctx);
        and_bool(&eq_a, &eq_b, ctx)
    }

    fn get_guarded_values(&self, ctx: &GuardContext) -> Vec<(Guard, Self::Concrete)> {
        let mut out = Vec::new();
        for (ga, va) in self.0.get_guarded_values(ctx) {
            for (gb, vb) in self.1.get_guarded_values(ctx) {
                let g = ctx.and(ga, gb);
                if ctx.is_sat(g) {
                    out.push((g, (va.clone(), vb)));
                }
            }
        }
        out
    }
}

impl<A: ValueSummary, B: ValueSummary, C: ValueSummary> ValueSummary for (A, B, C) {
    type Concrete = (A::Concrete, B::Concrete, C::Concrete);

    fn restrict(&self, g: Guard, ctx: &GuardContext) -> Self {
        (
            self.0.restrict(g, ctx),
            self.1.restrict(g, ctx),
            self.2.restrict(g, ctx),
        )
    }

    fn merge(items: Vec<Self>, ctx: &GuardContext) -> Self {
        let mut a = Vec::with_capacity(items.len());
        let mut b = Vec::with_capacity(items.len());
        let mut c = Vec::with_capacity(items.len());
        for (x, y, z) in items {
            a.push(x);
            b.push(y);
            c.push(z);
        }
        (A::merge(a, ctx), B::merge(b, ctx), C::merge(c, ctx))
    }

    fn get_universe(&self) -> Guard {
        self.0.get_universe()
    }

    fn symbolic_equals(&self, other: &Self, pc: Guard, ctx: &GuardContext) -> PrimitiveVS<bool> {
        let eq_a = self.0.symbolic_equals(&other.0, pc, ctx);
        let eq_b = self.1.symbolic_equals(&other.1, pc, ctx);
        let eq_c = self.2.symbolic_equals(&other.2, pc, ctx);
        and_bool(&and_bool(&eq_a, &eq_b, ctx), &eq_c, ctx)
    }

    fn get_guarded_values(&self, ctx: &GuardContext) -> Vec<(Guard, Self::Concrete)> {
        let mut out = Vec::new();
        for (ga, va) in self.0.get_guarded_values(ctx) {
            for (gb, vb) in self.1.get_guarded_values(ctx) {
                for (gc, vc) in self.2.get_guarded_values(ctx) {
                    let g = ctx.and(ctx.and(ga, gb), gc);
                    if ctx.is_sat(g) {
                        out.push((g, (va.clone(), vb.clone(), vc)));
                    }
                }
            }
        }
        out
    }
}
