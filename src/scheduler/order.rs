//! Message orders used by the reduction filters of spec §4.4 steps e/f,
//! defined abstractly in spec §4.6.

use crate::guard::GuardContext;
use crate::ids::MachineId;
use crate::value::{Message, PrimitiveVS, ValueSummary};

/// `lessThan(m1, m2) → PrimVS⟨Bool⟩` (spec §4.6): the guard under which
/// `m1` must be scheduled before `m2`. `sender1`/`sender2` are the
/// machines `m1`/`m2` are each the pending head-of-buffer send of —
/// callers (the candidate-sender computation, spec §4.4 step e) already
/// know this, and the receiver-queue order needs it to read off the right
/// clock entry.
pub trait MessageOrder {
    fn less_than(
        &self,
        m1: &Message,
        sender1: MachineId,
        m2: &Message,
        sender2: MachineId,
        ctx: &GuardContext,
    ) -> PrimitiveVS<bool>;
}

/// `m1 < m2` iff both target the same machine and `m1` entered that
/// target's queue first — read off the send's vector-clock position for
/// the shared target (spec §4.6: "receiver-queue order").
///
/// A message's clock records, per sender, how many messages that sender
/// had sent as of when this one was produced (spec §3.3: "Vector clock ...
/// incremented on every send"); comparing each message's *own sender's*
/// entry in its clock — not a sum over every entry, which would also
/// count unrelated senders' ticks and could impose a precedence the send
/// order doesn't justify — recovers send order without needing a separate
/// sequence counter per mailbox.
pub struct ReceiverQueueOrder;

impl MessageOrder for ReceiverQueueOrder {
    fn less_than(
        &self,
        m1: &Message,
        sender1: MachineId,
        m2: &Message,
        sender2: MachineId,
        ctx: &GuardContext,
    ) -> PrimitiveVS<bool> {
        let same_target = m1.target().symbolic_equals(m2.target(), ctx.mk_true(), ctx);
        let same_target_guard = same_target.guard_for(true, ctx);
        if ctx.is_false(same_target_guard) {
            return PrimitiveVS::constant(false, ctx);
        }

        let pos1 = m1.clock().get(sender1, ctx);
        let pos2 = m2.clock().get(sender2, ctx);

        let mut entries = Vec::new();
        for (g1, n1) in pos1.get_guarded_values(ctx) {
            for (g2, n2) in pos2.get_guarded_values(ctx) {
                let g = ctx.and(ctx.and(g1, g2), same_target_guard);
                if !ctx.is_sat(g) {
                    continue;
                }
                entries.push((g, n1 < n2));
            }
        }
        let outside = ctx.not(same_target_guard);
        if ctx.is_sat(outside) {
            entries.push((outside, false));
        }
        PrimitiveVS::from_entries(entries, ctx)
    }
}

/// The "identity" partial order: nothing strictly precedes anything else,
/// so the interleave filter removes no candidates. Open Question (b):
/// absent a supplied interleave configuration, this is the documented safe
/// default.
pub struct IdentityOrder;

impl MessageOrder for IdentityOrder {
    fn less_than(
        &self,
        _m1: &Message,
        _sender1: MachineId,
        _m2: &Message,
        _sender2: MachineId,
        ctx: &GuardContext,
    ) -> PrimitiveVS<bool> {
        PrimitiveVS::constant(false, ctx)
    }
}

/// A configurable interleave order over event-tag pairs (spec §4.6:
/// "certain event classes must not be reordered past each other"). Built
/// on [`IdentityOrder`]'s always-false default, narrowed by explicit
/// `(before, after)` tag pairs a caller registers.
#[derive(Default)]
pub struct InterleaveOrder {
    precedes: Vec<(crate::ids::EventTag, crate::ids::EventTag)>,
}

impl InterleaveOrder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares that events tagged `before` must be scheduled ahead of
    /// events tagged `after` whenever both are pending.
    pub fn with_precedence(mut self, before: crate::ids::EventTag, after: crate::ids::EventTag) -> Self {
        self.precedes.push((before, after));
        self
    }
}

impl MessageOrder for InterleaveOrder {
    fn less_than(
        &self,
        m1: &Message,
        sender1: MachineId,
        m2: &Message,
        sender2: MachineId,
        ctx: &GuardContext,
    ) -> PrimitiveVS<bool> {
        if self.precedes.is_empty() {
            return IdentityOrder.less_than(m1, sender1, m2, sender2, ctx);
        }
        let mut entries = Vec::new();
        for (g1, e1) in m1.event().get_guarded_values(ctx) {
            for (g2, e2) in m2.event().get_guarded_values(ctx) {
                let g = ctx.and(g1, g2);
                if !ctx.is_sat(g) {
                    continue;
                }
                let lt = self.precedes.contains(&(e1, e2));
                entries.push((g, lt));
            }
        }
        PrimitiveVS::from_entries(entries, ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guard::GuardContext;
    use crate::ids::{ClassId, EventTag, MachineId};
    use crate::value::{Scalar, UnionVS, VectorClockVS};

    fn machine(class: u32, instance: u32) -> MachineId {
        MachineId {
            class: ClassId(class),
            instance,
        }
    }

    /// Builds a message from `sender` to `target` whose clock has ticked
    /// `sender`'s own entry to `send_pos` and nothing else.
    fn message_from(sender: MachineId, target: MachineId, send_pos: i64, ctx: &GuardContext) -> Message {
        let pc = ctx.mk_true();
        let mut clock = VectorClockVS::empty(ctx);
        for _ in 0..send_pos {
            clock = clock.tick(sender, pc, ctx);
        }
        Message::new(
            PrimitiveVS::constant(EventTag(1), ctx),
            PrimitiveVS::constant(target, ctx),
            UnionVS::tagged(0, pc, PrimitiveVS::constant(Scalar::Unit, ctx), ctx),
            clock,
        )
    }

    /// Two sends to the same target from *different* senders: `m1`'s sender
    /// has ticked many unrelated entries (high total clock mass) but *this*
    /// send is still its sender's very first, while `m2` is its sender's
    /// second. Summing whole clocks would let `m1`'s unrelated tick count
    /// outweigh `m2`'s and wrongly order `m2 < m1`; comparing each message's
    /// own sender entry gets `m1 < m2` right instead.
    #[test]
    fn compares_each_messages_own_sender_position_not_the_whole_clock() {
        let ctx = GuardContext::new();
        let sender1 = machine(1, 0);
        let sender2 = machine(2, 0);
        let target = machine(3, 0);
        let pc = ctx.mk_true();

        let mut sender1_clock = VectorClockVS::empty(&ctx);
        for other in 0..50 {
            sender1_clock = sender1_clock.tick(machine(9, other), pc, &ctx);
        }
        let m1 = Message::new(
            PrimitiveVS::constant(EventTag(1), &ctx),
            PrimitiveVS::constant(target, &ctx),
            UnionVS::tagged(0, pc, PrimitiveVS::constant(Scalar::Unit, &ctx), &ctx),
            sender1_clock.tick(sender1, pc, &ctx),
        );
        let m2 = message_from(sender2, target, 2, &ctx);

        let order = ReceiverQueueOrder;
        let lt = order.less_than(&m1, sender1, &m2, sender2, &ctx);
        assert!(ctx.is_true(lt.guard_for(true, &ctx)));
    }

    #[test]
    fn messages_to_different_targets_are_incomparable() {
        let ctx = GuardContext::new();
        let sender1 = machine(1, 0);
        let sender2 = machine(2, 0);

        let m1 = message_from(sender1, machine(3, 0), 1, &ctx);
        let m2 = message_from(sender2, machine(4, 0), 1, &ctx);

        let order = ReceiverQueueOrder;
        let lt = order.less_than(&m1, sender1, &m2, sender2, &ctx);
        assert!(ctx.is_true(lt.guard_for(false, &ctx)));
    }

    #[test]
    fn later_send_from_same_sender_is_not_less_than_earlier_one() {
        let ctx = GuardContext::new();
        let sender = machine(1, 0);
        let target = machine(2, 0);

        let earlier = message_from(sender, target, 1, &ctx);
        let later = message_from(sender, target, 3, &ctx);

        let order = ReceiverQueueOrder;
        assert!(ctx.is_true(
            order
                .less_than(&earlier, sender, &later, sender, &ctx)
                .guard_for(true, &ctx)
        ));
        assert!(ctx.is_true(
            order
                .less_than(&later, sender, &earlier, sender, &ctx)
                .guard_for(false, &ctx)
        ));
    }
}
