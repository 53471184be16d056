use super::{cartesian, ValueSummary};
use crate::guard::{Guard, GuardContext};
use crate::value::primitive::PrimitiveVS;

fn empty_vs<T: ValueSummary>(ctx: &GuardContext) -> T {
    T::merge(Vec::new(), ctx)
}

/// Guarded integer size plus an indexed sequence of VS elements; element
/// `i` is meaningful only under the guard that `size > i` (spec §3.2).
#[derive(Clone)]
pub struct ListVS<T: ValueSummary> {
    size: PrimitiveVS<i64>,
    elems: Vec<T>,
}

impl<T: ValueSummary> ListVS<T> {
    pub fn empty(ctx: &GuardContext) -> Self {
        Self {
            size: PrimitiveVS::constant(0, ctx),
            elems: Vec::new(),
        }
    }

    pub fn size(&self) -> &PrimitiveVS<i64> {
        &self.size
    }

    /// `get(indexVS)`: for each `(g, i)` in `indexVS`, take the element at
    /// position `i` restricted to `g`, then merge. An index with no
    /// corresponding element under `g` contributes nothing ("undefined
    /// guard yields an empty entry", spec §4.2).
    pub fn get(&self, index: &PrimitiveVS<i64>, ctx: &GuardContext) -> T {
        let mut parts = Vec::new();
        for (g, i) in index.get_guarded_values(ctx) {
            if i >= 0 && (i as usize) < self.elems.len() {
                parts.push(self.elems[i as usize].restrict(g, ctx));
            }
        }
        T::merge(parts, ctx)
    }

    /// Appends `x` at the current size under every guard, then increments
    /// size under that guard.
    pub fn add(&self, x: &T, ctx: &GuardContext) -> Self {
        let size_entries = self.size.get_guarded_values(ctx);
        let max_sz = size_entries.iter().map(|(_, sz)| *sz).max().unwrap_or(0);

        let mut elems = self.elems.clone();
        while (elems.len() as i64) <= max_sz {
            elems.push(empty_vs::<T>(ctx));
        }

        for (g, sz) in &size_entries {
            let idx = *sz as usize;
            let incoming = x.restrict(*g, ctx);
            elems[idx] = elems[idx].update_under_guard(*g, &incoming, ctx);
        }

        let new_size: Vec<(Guard, i64)> = size_entries.iter().map(|(g, sz)| (*g, sz + 1)).collect();

        Self {
            size: PrimitiveVS::from_entries(new_size, ctx),
            elems,
        }
    }

    /// Removes the element at `index`, shifting later elements down by one
    /// under each guard where `0 <= index < size`. Guards where the index
    /// is out of range are left untouched (caller's responsibility to
    /// restrict first, spec §4.2).
    pub fn remove_at(&self, index: &PrimitiveVS<i64>, ctx: &GuardContext) -> Self {
        self.shift(index, ctx, true)
    }

    /// Inserts `x` at `index`, shifting elements at or after `index` up by
    /// one under each guard where `0 <= index <= size`.
    pub fn insert_at(&self, index: &PrimitiveVS<i64>, x: &T, ctx: &GuardContext) -> Self {
        let mut shifted = self.shift(index, ctx, false);

        let idx_entries = index.get_guarded_values(ctx);
        for (g, idx) in idx_entries {
            if idx < 0 {
                continue;
            }
            let incoming = x.restrict(g, ctx);
            if (idx as usize) < shifted.elems.len() {
                shifted.elems[idx as usize] =
                    shifted.elems[idx as usize].update_under_guard(g, &incoming, ctx);
            }
        }
        shifted
    }

    /// Shared shifting core for `remove_at` (`removing = true`, shift down,
    /// size - 1) and `insert_at` (`removing = false`, shift up, size + 1;
    /// the caller writes the inserted element separately).
    fn shift(&self, index: &PrimitiveVS<i64>, ctx: &GuardContext, removing: bool) -> Self {
        let size_entries = self.size.get_guarded_values(ctx);
        let idx_entries = index.get_guarded_values(ctx);
        let combos = cartesian(&[size_entries, idx_entries], ctx);

        let cap = (self.elems.len() + 1).max(self.elems.len());
        let mut new_elems: Vec<T> = (0..cap).map(|_| empty_vs::<T>(ctx)).collect();
        let mut new_size_entries: Vec<(Guard, i64)> = Vec::new();

        for (g, vals) in combos {
            let sz = vals[0];
            let idx = vals[1];

            let valid = if removing {
                idx >= 0 && idx < sz
            } else {
                idx >= 0 && idx <= sz
            };
            if !valid {
                new_size_entries.push((g, sz));
                continue;
            }

            let new_sz = if removing { sz - 1 } else { sz + 1 };
            new_size_entries.push((g, new_sz));

            for pos in 0..new_sz.max(sz) {
                let src = if removing {
                    if pos < idx {
                        Some(pos)
                    } else {
                        Some(pos + 1)
                    }
                } else if pos < idx {
                    Some(pos)
                } else if pos > idx {
                    Some(pos - 1)
                } else {
                    None // the freshly-inserted slot; caller fills it in
                };

                if let Some(src) = src {
                    if src >= 0 && (src as usize) < self.elems.len() && (pos as usize) < new_elems.len()
                    {
                        let val = self.elems[src as usize].restrict(g, ctx);
                        new_elems[pos as usize] =
                            new_elems[pos as usize].update_under_guard(g, &val, ctx);
                    }
                }
            }
        }

        Self {
            size: PrimitiveVS::from_entries(new_size_entries, ctx),
            elems: new_elems,
        }
    }

    pub fn elems(&self) -> &[T] {
        &self.elems
    }

    /// Like [`Self::add`], but the size increment (and the appended
    /// value) only take effect under `mask`; elsewhere the list is
    /// unchanged. Built from `restrict`/`add`/`merge` rather than as its
    /// own case, so it inherits `add`'s invariants for free — the same
    /// "restrict one side, its complement the other, then merge" idiom
    /// spec §4.2 calls out for `updateUnderGuard`.
    /// Sets element `i` to `x` under `g`, leaving it (and everything else)
    /// unchanged outside `g`. Used by [`crate::value::MapVS::put`] to
    /// overwrite a matched value in place.
    pub fn update_at(&self, i: usize, g: Guard, x: &T, ctx: &GuardContext) -> Self {
        let mut elems = self.elems.clone();
        if let Some(slot) = elems.get_mut(i) {
            *slot = slot.update_under_guard(g, x, ctx);
        }
        Self {
            size: self.size.clone(),
            elems,
        }
    }

    pub fn add_masked(&self, mask: Guard, x: &T, ctx: &GuardContext) -> Self {
        let not_mask = ctx.not(mask);
        let unchanged = self.restrict(not_mask, ctx);
        let changed = self.restrict(mask, ctx).add(&x.restrict(mask, ctx), ctx);
        Self::merge(vec![unchanged, changed], ctx)
    }
}

impl<T: ValueSummary> ValueSummary for ListVS<T> {
    type Concrete = Vec<T::Concrete>;

    fn restrict(&self, g: Guard, ctx: &GuardContext) -> Self {
        Self {
            size: self.size.restrict(g, ctx),
            elems: self.elems.iter().map(|e| e.restrict(g, ctx)).collect(),
        }
    }

    fn merge(items: Vec<Self>, ctx: &GuardContext) -> Self {
        let max_len = items.iter().map(|v| v.elems.len()).max().unwrap_or(0);
        let mut elems: Vec<T> = (0..max_len).map(|_| empty_vs::<T>(ctx)).collect();

        for item in &items {
            for (i, e) in item.elems.iter().enumerate() {
                elems[i] = T::merge(vec![elems[i].clone(), e.clone()], ctx);
            }
        }

        let size = PrimitiveVS::merge(items.into_iter().map(|v| v.size).collect(), ctx);
        Self { size, elems }
    }

    fn get_universe(&self) -> Guard {
        self.size.get_universe()
    }

    fn symbolic_equals(&self, other: &Self, pc: Guard, ctx: &GuardContext) -> PrimitiveVS<bool> {
        let size_eq = self.size.symbolic_equals(&other.size, pc, ctx);
        let common = self.elems.len().min(other.elems.len());

        let mut elem_eq = size_eq;
        for i in 0..common {
            let eq_i = self.elems[i].symbolic_equals(&other.elems[i], pc, ctx);
            elem_eq = conjoin_bool(&elem_eq, &eq_i, ctx);
        }
        elem_eq
    }

    fn get_guarded_values(&self, ctx: &GuardContext) -> Vec<(Guard, Vec<T::Concrete>)> {
        let size_entries = self.size.get_guarded_values(ctx);
        let dims: Vec<Vec<(Guard, T::Concrete)>> = self
            .elems
            .iter()
            .map(|e| e.get_guarded_values(ctx))
            .collect();

        let mut out = Vec::new();
        for (g_sz, sz) in size_entries {
            if sz == 0 {
                out.push((g_sz, Vec::new()));
                continue;
            }
            if (sz as usize) > dims.len() {
                continue;
            }
            let prefix = &dims[..sz as usize];
            for (g_combo, values) in cartesian(prefix, ctx) {
                let g = ctx.and(g_sz, g_combo);
                if ctx.is_sat(g) {
                    out.push((g, values));
                }
            }
        }
        out
    }
}

fn conjoin_bool(a: &PrimitiveVS<bool>, b: &PrimitiveVS<bool>, ctx: &GuardContext) -> PrimitiveVS<bool> {
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
