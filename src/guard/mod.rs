//! The boolean algebra over path conditions ("guards").
//!
//! A [`Guard`] is an opaque handle into a [`GuardContext`]'s reduced,
//! ordered binary decision diagram (ROBDD). Two handles compare equal
//! (`==`) iff they denote the same boolean function — this is the
//! canonicity the rest of the crate relies on (§3.1: "no assumption of
//! canonical representation except that `isTrue`/`isFalse` are exact").
//!
//! Variables are allocated monotonically (one per [`GuardContext::fresh_var`]
//! call, which [`Scheduler`](crate::scheduler::Scheduler) uses for every
//! nondeterministic choice). Because variables only ever combine with
//! variables allocated *before* them, allocation order is a valid BDD
//! variable order for free — there is no separate reordering pass.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;

mod stats;
pub use stats::GuardStats;

/// An opaque handle into a [`GuardContext`]. Reference-shared, never owned;
/// cloning a `Guard` is a pointer-weight copy.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Guard(u32);

impl fmt::Debug for Guard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            0 => write!(f, "false"),
            1 => write!(f, "true"),
            n => write!(f, "g{n}"),
        }
    }
}

const FALSE_ID: u32 = 0;
const TRUE_ID: u32 = 1;

#[derive(Debug, Clone, Copy)]
struct Node {
    var: u32,
    low: Guard,
    high: Guard,
}

#[derive(Debug, Default)]
struct Inner {
    nodes: Vec<Node>,
    unique: HashMap<(u32, Guard, Guard), Guard>,
    and_cache: HashMap<(Guard, Guard), Guard>,
    or_cache: HashMap<(Guard, Guard), Guard>,
    not_cache: HashMap<Guard, Guard>,
    next_var: u32,
    stats: GuardStats,
}

/// Owns the ROBDD node table backing every [`Guard`] produced during a run.
///
/// Per the design notes (spec §9), this is threaded through the
/// [`Scheduler`](crate::scheduler::Scheduler) as an explicit context rather
/// than a process global, so alternate engines (or multiple independent
/// runs) never share state. Interior mutability (`RefCell`) keeps the
/// public API on `&self`, matching how the engine is passed around
/// read-mostly by value-summary operations.
#[derive(Debug, Default)]
pub struct GuardContext {
    inner: RefCell<Inner>,
}

impl GuardContext {
    /// Creates a fresh, empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// The guard that is always true.
    pub fn mk_true(&self) -> Guard {
        Guard(TRUE_ID)
    }

    /// The guard that is always false.
    pub fn mk_false(&self) -> Guard {
        Guard(FALSE_ID)
    }

    /// Allocates a fresh boolean variable, returning the guard under which
    /// it holds. Used once per nondeterministic choice (§4.3).
    pub fn fresh_var(&self) -> Guard {
        let mut inner = self.inner.borrow_mut();
        let var = inner.next_var;
        inner.next_var += 1;
        drop(inner);
        self.mk_node(var, self.mk_false(), self.mk_true())
    }

    /// Exact: `true` iff `g` is the `true` guard.
    pub fn is_true(&self, g: Guard) -> bool {
        g.0 == TRUE_ID
    }

    /// Exact: `true` iff `g` is the `false` guard.
    pub fn is_false(&self, g: Guard) -> bool {
        g.0 == FALSE_ID
    }

    /// Satisfiability: `false` iff `g` is identically false.
    pub fn is_sat(&self, g: Guard) -> bool {
        self.inner.borrow_mut().stats.is_sat += 1;
        !self.is_false(g)
    }

    pub fn not(&self, a: Guard) -> Guard {
        if let Some(&cached) = self.inner.borrow().not_cache.get(&a) {
            return cached;
        }
        self.inner.borrow_mut().stats.not += 1;

        let result = if self.is_true(a) {
            self.mk_false()
        } else if self.is_false(a) {
            self.mk_true()
        } else {
            let Node { var, low, high } = self.node_of(a);
            let low = self.not(low);
            let high = self.not(high);
            self.mk_node(var, low, high)
        };

        self.inner.borrow_mut().not_cache.insert(a, result);
        result
    }

    pub fn and(&self, a: Guard, b: Guard) -> Guard {
        let key = if a <= b { (a, b) } else { (b, a) };
        if let Some(&cached) = self.inner.borrow().and_cache.get(&key) {
            return cached;
        }
        self.inner.borrow_mut().stats.and += 1;

        let result = if self.is_false(a) || self.is_false(b) {
            self.mk_false()
        } else if self.is_true(a) {
            b
        } else if self.is_true(b) || a == b {
            a
        } else {
            self.apply(a, b, |ctx, x, y| ctx.and(x, y))
        };

        self.inner.borrow_mut().and_cache.insert(key, result);
        result
    }

    pub fn or(&self, a: Guard, b: Guard) -> Guard {
        let key = if a <= b { (a, b) } else { (b, a) };
        if let Some(&cached) = self.inner.borrow().or_cache.get(&key) {
            return cached;
        }
        self.inner.borrow_mut().stats.or += 1;

        let result = if self.is_true(a) || self.is_true(b) {
            self.mk_true()
        } else if self.is_false(a) {
            b
        } else if self.is_false(b) || a == b {
            a
        } else {
            self.apply(a, b, |ctx, x, y| ctx.or(x, y))
        };

        self.inner.borrow_mut().or_cache.insert(key, result);
        result
    }

    /// `a ∧ ¬b`
    pub fn and_not(&self, a: Guard, b: Guard) -> Guard {
        let nb = self.not(b);
        self.and(a, nb)
    }

    /// Statistics snapshot (§4.1): call counters for `and`/`or`/`not`/`isSat`.
    pub fn stats(&self) -> GuardStats {
        self.inner.borrow().stats
    }

    /// Rough resident size of this context's node table and operation
    /// caches, in bytes. The node table itself is never pruned (existing
    /// `Guard` handles index into it), but the `and`/`or`/`not` memoization
    /// caches are — this is what [`Self::shrink_caches`] frees. Used by
    /// [`crate::scheduler::Scheduler`] to approximate the "memory" spec §6.3's
    /// `memLimit` caps, since the solver context is this crate's one
    /// process-wide allocation of any size (spec §5 "shared-resource
    /// policy").
    pub fn approx_memory_bytes(&self) -> usize {
        let inner = self.inner.borrow();
        let node = inner.nodes.len() * std::mem::size_of::<Node>();
        let unique = inner.unique.len() * std::mem::size_of::<(u32, Guard, Guard, Guard)>();
        let and_cache = inner.and_cache.len() * std::mem::size_of::<(Guard, Guard, Guard)>();
        let or_cache = inner.or_cache.len() * std::mem::size_of::<(Guard, Guard, Guard)>();
        let not_cache = inner.not_cache.len() * std::mem::size_of::<(Guard, Guard)>();
        node + unique + and_cache + or_cache + not_cache
    }

    /// Drops the `and`/`or`/`not` memoization caches, re-derivable on demand
    /// at the cost of recomputation — the "solver memory cleanup" spec §4.4
    /// step 7 triggers once resident size crosses 80% of `memLimit`. The
    /// unique node table is untouched: existing `Guard` handles must keep
    /// resolving to the same node.
    pub fn shrink_caches(&self) {
        let mut inner = self.inner.borrow_mut();
        inner.and_cache.clear();
        inner.or_cache.clear();
        inner.not_cache.clear();
    }

    fn node_of(&self, g: Guard) -> Node {
        debug_assert!(g.0 >= 2, "leaf guards have no node");
        self.inner.borrow().nodes[(g.0 - 2) as usize]
    }

    fn mk_node(&self, var: u32, low: Guard, high: Guard) -> Guard {
        if low == high {
            return low;
        }
        let key = (var, low, high);
        if let Some(&existing) = self.inner.borrow().unique.get(&key) {
            return existing;
        }
        let mut inner = self.inner.borrow_mut();
        let id = inner.nodes.len() as u32 + 2;
        inner.nodes.push(Node { var, low, high });
        let guard = Guard(id);
        inner.unique.insert(key, guard);
        guard
    }

    fn top_var(&self, g: Guard) -> u32 {
        if g.0 < 2 {
            u32::MAX
        } else {
            self.node_of(g).var
        }
    }

    /// Shared Shannon-expansion recursion for `and`/`or`: expand on the
    /// lexicographically-smaller top variable of `a`/`b` and recombine.
    fn apply(&self, a: Guard, b: Guard, op: impl Fn(&Self, Guard, Guard) -> Guard + Copy) -> Guard {
        let va = self.top_var(a);
        let vb = self.top_var(b);
        let var = va.min(vb);

        let (a_low, a_high) = if va == var {
            let n = self.node_of(a);
            (n.low, n.high)
        } else {
            (a, a)
        };
        let (b_low, b_high) = if vb == var {
            let n = self.node_of(b);
            (n.low, n.high)
        } else {
            (b, b)
        };

        let low = op(self, a_low, b_low);
        let high = op(self, a_high, b_high);
        self.mk_node(var, low, high)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn true_false_are_exact() {
        let ctx = GuardContext::new();
        assert!(ctx.is_true(ctx.mk_true()));
        assert!(ctx.is_false(ctx.mk_false()));
        assert!(!ctx.is_sat(ctx.mk_false()));
        assert!(ctx.is_sat(ctx.mk_true()));
    }

    #[test]
    fn and_or_not_basic_laws() {
        let ctx = GuardContext::new();
        let a = ctx.fresh_var();
        let b = ctx.fresh_var();

        assert_eq!(ctx.and(a, ctx.not(a)), ctx.mk_false());
        assert_eq!(ctx.or(a, ctx.not(a)), ctx.mk_true());
        assert_eq!(ctx.and(a, a), a);
        assert_eq!(ctx.or(a, b), ctx.or(b, a));
        assert_eq!(ctx.and(a, b), ctx.and(b, a));
    }

    #[test]
    fn shrink_caches_clears_op_caches_but_keeps_nodes() {
        let ctx = GuardContext::new();
        let a = ctx.fresh_var();
        let b = ctx.fresh_var();
        let _ = ctx.and(a, b);
        let _ = ctx.or(a, b);
        let _ = ctx.not(a);

        let before_nodes = ctx.inner.borrow().nodes.len();
        assert!(ctx.inner.borrow().and_cache.len() > 0);

        ctx.shrink_caches();

        assert_eq!(ctx.inner.borrow().and_cache.len(), 0);
        assert_eq!(ctx.inner.borrow().or_cache.len(), 0);
        assert_eq!(ctx.inner.borrow().not_cache.len(), 0);
        assert_eq!(ctx.inner.borrow().nodes.len(), before_nodes, "node table must survive a cache shrink");

        // recomputing after a shrink must still be correct, just uncached.
        assert_eq!(ctx.and(a, b), ctx.and(b, a));
    }

    #[test]
    fn approx_memory_grows_with_fresh_guards() {
        let ctx = GuardContext::new();
        let empty = ctx.approx_memory_bytes();
        for _ in 0..8 {
            let _ = ctx.fresh_var();
        }
        assert!(ctx.approx_memory_bytes() > empty);
    }
}
