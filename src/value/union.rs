use super::{ValueSummary, PrimitiveVS};
use crate::guard::{Guard, GuardContext};

/// A tagged choice: which of several shapes a value currently has, plus the
/// payload under that tag (spec §3.2, §9: VS variant `Union`). Used where a
/// message payload's type depends on the event carrying it.
///
/// Implemented as a guarded pair `(tag, payload)` rather than a `Vec` of
/// per-variant payload VSs — the container types already give us
/// `restrict`/`merge`/`symbolicEquals` on pairs for free via the tuple impl,
/// and a `u32` tag is cheap enough to keep as a plain `PrimitiveVS`.
#[derive(Clone)]
pub struct UnionVS<P: ValueSummary> {
    tag: PrimitiveVS<u32>,
    payload: P,
}

impl<P: ValueSummary> UnionVS<P> {
    pub fn empty(ctx: &GuardContext) -> Self {
        Self {
            tag: PrimitiveVS::empty(ctx),
            payload: P::merge(Vec::new(), ctx),
        }
    }

    /// A union holding `payload` under tag `tag`, everywhere under `g`.
    pub fn tagged(tag: u32, g: Guard, payload: P, ctx: &GuardContext) -> Self {
        Self {
            tag: PrimitiveVS::single(g, tag, ctx),
            payload: payload.restrict(g, ctx),
        }
    }

    pub fn tag(&self) -> &PrimitiveVS<u32> {
        &self.tag
    }

    /// The payload restricted to the guard under which it carries `tag`.
    pub fn payload_for(&self, tag: u32, ctx: &GuardContext) -> P {
        let g = self
            .tag
            .entries()
            .iter()
            .filter(|(_, t)| *t == tag)
            .fold(ctx.mk_false(), |acc, (g, _)| ctx.or(acc, *g));
        self.payload.restrict(g, ctx)
    }
}

impl<P: ValueSummary> ValueSummary for UnionVS<P> {
    type Concrete = (u32, P::Concrete);

    fn restrict(&self, g: Guard, ctx: &GuardContext) -> Self {
        Self {
            tag: self.tag.restrict(g, ctx),
            payload: self.payload.restrict(g, ctx),
        }
    }

    fn merge(items: Vec<Self>, ctx: &GuardContext) -> Self {
        let (tags, payloads): (Vec<_>, Vec<_>) = items.into_iter().map(|u| (u.tag, u.payload)).unzip();
        Self {
            tag: PrimitiveVS::merge(tags, ctx),
            payload: P::merge(payloads, ctx),
        }
    }

    fn get_universe(&self) -> Guard {
        self.tag.get_universe()
    }

    fn symbolic_equals(&self, other: &Self, pc: Guard, ctx: &GuardContext) -> PrimitiveVS<bool> {
        let tag_eq = self.tag.symbolic_equals(&other.tag, pc, ctx);
        let payload_eq = self.payload.symbolic_equals(&other.payload, pc, ctx);
        let mut entries = Vec::new();
        for (gt, vt) in tag_eq.entries() {
            for (gp, vp) in payload_eq.entries() {
                let g = ctx.and(*gt, *gp);
                if ctx.is_sat(g) {
                    entries.push((g, *vt && *vp));
                }
            }
        }
        PrimitiveVS::from_entries(entries, ctx)
    }

    fn get_guarded_values(&self, ctx: &GuardContext) -> Vec<(Guard, Self::Concrete)> {
        let mut out = Vec::new();
        for (gt, tag) in self.tag.get_guarded_values(ctx) {
            for (gp, payload) in self.payload.get_guarded_values(ctx) {
                let g = ctx.and(gt, gp);
                if ctx.is_sat(g) {
                    out.push((g, (tag, payload)));
                }
            }
        }
        out
    }
}
