use super::{ListVS, ValueSummary};
use crate::guard::{Guard, GuardContext};
use crate::value::primitive::PrimitiveVS;

/// Parallel list of keys (unique per guard) and list of values (spec §3.2).
#[derive(Clone)]
pub struct MapVS<K: ValueSummary, V: ValueSummary> {
    keys: ListVS<K>,
    values: ListVS<V>,
}

impl<K: ValueSummary, V: ValueSummary> MapVS<K, V> {
    pub fn empty(ctx: &GuardContext) -> Self {
        Self {
            keys: ListVS::empty(ctx),
            values: ListVS::empty(ctx),
        }
    }

    fn in_range_guard(&self, i: usize, ctx: &GuardContext) -> Guard {
        self.keys
            .size()
            .get_guarded_values(ctx)
            .into_iter()
            .filter(|(_, sz)| *sz > i as i64)
            .fold(ctx.mk_false(), |acc, (g, _)| ctx.or(acc, g))
    }

    pub fn contains_key(&self, k: &K, ctx: &GuardContext) -> PrimitiveVS<bool> {
        let mut acc = PrimitiveVS::constant(false, ctx);
        for (i, key) in self.keys.elems().iter().enumerate() {
            let in_range = self.in_range_guard(i, ctx);
            let eq = k.symbolic_equals(key, in_range, ctx);
            acc = or_bool(&acc, &eq, ctx);
        }
        acc
    }

    pub fn get(&self, k: &K, ctx: &GuardContext) -> V {
        let mut parts = Vec::new();
        for (i, key) in self.keys.elems().iter().enumerate() {
            let in_range = self.in_range_guard(i, ctx);
            let eq_guard = k.symbolic_equals(key, in_range, ctx).guard_for(true, ctx);
            if ctx.is_sat(eq_guard) {
                parts.push(self.values.elems()[i].restrict(eq_guard, ctx));
            }
        }
        V::merge(parts, ctx)
    }

    /// Conditional on `containsKey`: under the guard where `k` already
    /// matches an existing key, update its value in place; under the
    /// complement, append both `k` and `v` (spec §4.2).
    pub fn put(&self, k: &K, v: &V, ctx: &GuardContext) -> Self {
        let mut new_values = self.values.clone();
        let mut matched = ctx.mk_false();

        for i in 0..self.keys.elems().len() {
            let in_range = self.in_range_guard(i, ctx);
            let eq_guard = k.symbolic_equals(&self.keys.elems()[i], in_range, ctx).guard_for(true, ctx);
            if ctx.is_sat(eq_guard) {
                matched = ctx.or(matched, eq_guard);
                new_values = new_values.update_at(i, eq_guard, v, ctx);
            }
        }

        let append_guard = ctx.not(matched);
        let keys = self.keys.add_masked(append_guard, k, ctx);
        let values = new_values.add_masked(append_guard, v, ctx);

        Self { keys, values }
    }

    pub fn keys(&self) -> &ListVS<K> {
        &self.keys
    }

    pub fn values(&self) -> &ListVS<V> {
        &self.values
    }
}

impl<K: ValueSummary, V: ValueSummary> ValueSummary for MapVS<K, V> {
    type Concrete = Vec<(K::Concrete, V::Concrete)>;

    fn restrict(&self, g: Guard, ctx: &GuardContext) -> Self {
        Self {
            keys: self.keys.restrict(g, ctx),
            values: self.values.restrict(g, ctx),
        }
    }

    fn merge(items: Vec<Self>, ctx: &GuardContext) -> Self {
        let (keys, values): (Vec<_>, Vec<_>) = items.into_iter().map(|m| (m.keys, m.values)).unzip();
        Self {
            keys: ListVS::merge(keys, ctx),
            values: ListVS::merge(values, ctx),
        }
    }

    fn get_universe(&self) -> Guard {
        self.keys.get_universe()
    }

    fn symbolic_equals(&self, other: &Self, pc: Guard, ctx: &GuardContext) -> PrimitiveVS<bool> {
        let k_eq = self.keys.symbolic_equals(&other.keys, pc, ctx);
        let v_eq = self.values.symbolic_equals(&other.values, pc, ctx);
        let mut entries = Vec::new();
        for (gk, vk) in k_eq.entries() {
            for (gv, vv) in v_eq.entries() {
                let g = ctx.and(*gk, *gv);
                if ctx.is_sat(g) {
                    entries.push((g, *vk && *vv));
                }
            }
        }
        PrimitiveVS::from_entries(entries, ctx)
    }

    fn get_guarded_values(&self, ctx: &GuardContext) -> Vec<(Guard, Self::Concrete)> {
        let keys = self.keys.get_guarded_values(ctx);
        let values = self.values.get_guarded_values(ctx);
        let mut out = Vec::new();
        for (gk, ks) in &keys {
            for (gv, vs) in &values {
                let g = ctx.and(*gk, *gv);
                if ctx.is_sat(g) && ks.len() == vs.len() {
                    out.push((g, ks.iter().cloned().zip(vs.iter().cloned()).collect()));
                }
            }
        }
        out
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
