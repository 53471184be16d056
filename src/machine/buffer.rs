use crate::guard::{Guard, GuardContext};
use crate::value::{ListVS, Message, PrimitiveVS, ValueSummary};

/// Per-machine buffer discipline (spec §3.3, configured via
/// [`crate::config::SchedulerConfig::use_bag_semantics`]).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum BufferKind {
    /// FIFO: the scheduler always considers position 0 the head.
    Queue,
    /// Unordered: the scheduler's `nextElement` choice picks which pending
    /// message to dequeue.
    Bag,
}

/// A machine's pending-message buffer. Backed by one [`ListVS<Message>`]
/// regardless of [`BufferKind`] — a bag is a queue whose head position is
/// chosen nondeterministically by the caller rather than fixed at index 0,
/// so the two disciplines share every operation except which index counts
/// as "the head".
#[derive(Clone)]
pub struct MessageBuffer {
    kind: BufferKind,
    messages: ListVS<Message>,
}

impl MessageBuffer {
    pub fn new(kind: BufferKind, ctx: &GuardContext) -> Self {
        Self {
            kind,
            messages: ListVS::empty(ctx),
        }
    }

    pub fn kind(&self) -> BufferKind {
        self.kind
    }

    pub fn size(&self) -> &PrimitiveVS<i64> {
        self.messages.size()
    }

    pub fn messages(&self) -> &ListVS<Message> {
        &self.messages
    }

    /// `true` under exactly the guards where the buffer has nothing pending.
    pub fn is_empty(&self, ctx: &GuardContext) -> PrimitiveVS<bool> {
        self.messages.size().symbolic_equals(&PrimitiveVS::constant(0, ctx), ctx.mk_true(), ctx)
    }

    /// The fixed head position for [`BufferKind::Queue`]; meaningless for
    /// [`BufferKind::Bag`], whose caller should instead pick an index via
    /// the scheduler's `nextElement` choice over [`Self::messages`].
    pub fn queue_head_index(&self, ctx: &GuardContext) -> PrimitiveVS<i64> {
        let non_empty = ctx.not(self.is_empty(ctx).guard_for(true, ctx));
        PrimitiveVS::single(non_empty, 0, ctx)
    }

    /// Appends `msg` at the back under `g`, leaving the buffer unchanged
    /// outside `g`.
    pub fn enqueue(&self, msg: &Message, g: Guard, ctx: &GuardContext) -> Self {
        Self {
            kind: self.kind,
            messages: self.messages.add_masked(g, msg, ctx),
        }
    }

    /// Removes and returns the message at `index` under its own guard,
    /// merged into a single symbolic `Message` (spec §4.4 step 5).
    pub fn dequeue_at(&self, index: &PrimitiveVS<i64>, ctx: &GuardContext) -> (Self, Message) {
        let dequeued = self.messages.get(index, ctx);
        let remaining = self.messages.remove_at(index, ctx);
        (
            Self {
                kind: self.kind,
                messages: remaining,
            },
            dequeued,
        )
    }

    /// The message the scheduler's candidate-classification step (spec
    /// §4.4 step 3) should inspect to decide whether this buffer's head is
    /// a create-step or sync-step. For [`BufferKind::Queue`] this is
    /// unambiguous (position 0); for [`BufferKind::Bag`] there is no fixed
    /// head, so this merges every in-range element disjunctively — under
    /// a guard where *some* pending message is, say, create-tagged, the
    /// machine is treated as a create-candidate there, even though which
    /// concrete message a bag dequeue ultimately picks is still a separate
    /// `nextElement` choice made at dequeue time (spec §4.3).
    pub fn head_message(&self, ctx: &GuardContext) -> Message {
        match self.kind {
            BufferKind::Queue => self.messages.get(&self.queue_head_index(ctx), ctx),
            BufferKind::Bag => {
                let size = self.messages.size();
                let parts: Vec<Message> = self
                    .messages
                    .elems()
                    .iter()
                    .enumerate()
                    .map(|(i, elem)| {
                        let in_range = size
                            .get_guarded_values(ctx)
                            .into_iter()
                            .filter(|(_, sz)| *sz > i as i64)
                            .fold(ctx.mk_false(), |acc, (g, _)| ctx.or(acc, g));
                        elem.restrict(in_range, ctx)
                    })
                    .collect();
                Message::merge(parts, ctx)
            }
        }
    }
}
