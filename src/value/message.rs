use super::{PrimitiveVS, Scalar, UnionVS, ValueSummary, VectorClockVS};
use crate::guard::{Guard, GuardContext};
use crate::ids::{EventTag, MachineId};

/// `(event, target, payload, clock)` — the unit the scheduler dequeues and
/// dispatches (spec §3.2). A product of four VSs sharing one universe, same
/// shape as [`super::tuple`] but named and field-accessed rather than
/// positional, since every call site cares about the fields by name.
#[derive(Clone)]
pub struct Message {
    event: PrimitiveVS<EventTag>,
    target: PrimitiveVS<MachineId>,
    payload: UnionVS<PrimitiveVS<Scalar>>,
    clock: VectorClockVS,
}

pub type MessageConcrete = (EventTag, MachineId, (u32, Scalar), Vec<(MachineId, i64)>);

impl Message {
    pub fn new(
        event: PrimitiveVS<EventTag>,
        target: PrimitiveVS<MachineId>,
        payload: UnionVS<PrimitiveVS<Scalar>>,
        clock: VectorClockVS,
    ) -> Self {
        Self {
            event,
            target,
            payload,
            clock,
        }
    }

    pub fn empty(ctx: &GuardContext) -> Self {
        Self {
            event: PrimitiveVS::empty(ctx),
            target: PrimitiveVS::empty(ctx),
            payload: UnionVS::empty(ctx),
            clock: VectorClockVS::empty(ctx),
        }
    }

    pub fn event(&self) -> &PrimitiveVS<EventTag> {
        &self.event
    }

    pub fn target(&self) -> &PrimitiveVS<MachineId> {
        &self.target
    }

    pub fn payload(&self) -> &UnionVS<PrimitiveVS<Scalar>> {
        &self.payload
    }

    pub fn clock(&self) -> &VectorClockVS {
        &self.clock
    }
}

impl ValueSummary for Message {
    type Concrete = MessageConcrete;

    fn restrict(&self, g: Guard, ctx: &GuardContext) -> Self {
        Self {
            event: self.event.restrict(g, ctx),
            target: self.target.restrict(g, ctx),
            payload: self.payload.restrict(g, ctx),
            clock: self.clock.restrict(g, ctx),
        }
    }

    fn merge(items: Vec<Self>, ctx: &GuardContext) -> Self {
        let mut events = Vec::with_capacity(items.len());
        let mut targets = Vec::with_capacity(items.len());
        let mut payloads = Vec::with_capacity(items.len());
        let mut clocks = Vec::with_capacity(items.len());
        for m in items {
            events.push(m.event);
            targets.push(m.target);
            payloads.push(m.payload);
            clocks.push(m.clock);
        }
        Self {
            event: PrimitiveVS::merge(events, ctx),
            target: PrimitiveVS::merge(targets, ctx),
            payload: UnionVS::merge(payloads, ctx),
            clock: VectorClockVS::merge(clocks, ctx),
        }
    }

    fn get_universe(&self) -> Guard {
        self.event.get_universe()
    }

    fn symbolic_equals(&self, other: &Self, pc: Guard, ctx: &GuardContext) -> PrimitiveVS<bool> {
        let eq_event = self.event.symbolic_equals(&other.event, pc, ctx);
        let eq_target = self.target.symbolic_equals(&other.target, pc, ctx);
        let eq_payload = self.payload.symbolic_equals(&other.payload, pc, ctx);
        and3(&eq_event, &eq_target, &eq_payload, ctx)
    }

    fn get_guarded_values(&self, ctx: &GuardContext) -> Vec<(Guard, Self::Concrete)> {
        let mut out = Vec::new();
        for (g1, event) in self.event.get_guarded_values(ctx) {
            for (g2, target) in self.target.get_guarded_values(ctx) {
                let g12 = ctx.and(g1, g2);
                if !ctx.is_sat(g12) {
                    continue;
                }
                for (g3, payload) in self.payload.get_guarded_values(ctx) {
                    let g123 = ctx.and(g12, g3);
                    if !ctx.is_sat(g123) {
                        continue;
                    }
                    for (g4, clock) in self.clock.get_guarded_values(ctx) {
                        let g = ctx.and(g123, g4);
                        if ctx.is_sat(g) {
                            out.push((g, (event, target, payload.clone(), clock)));
                        }
                    }
                }
            }
        }
        out
    }
}

fn and3(
    a: &PrimitiveVS<bool>,
    b: &PrimitiveVS<bool>,
    c: &PrimitiveVS<bool>,
    ctx: &GuardContext,
) -> PrimitiveVS<bool> {
    let mut entries = Vec::new();
    for (ga, va) in a.entries() {
        for (gb, vb) in b.entries() {
            for (gc, vc) in c.entries() {
                let g = ctx.and(ctx.and(*ga, *gb), *gc);
                if ctx.is_sat(g) {
                    entries.push((g, *va && *vb && *vc));
                }
            }
        }
    }
    PrimitiveVS::from_entries(entries, ctx)
}
