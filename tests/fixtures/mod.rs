//! A toy `Program` shared by the scheduler integration tests: a single
//! "counter" machine class that ticks itself a fixed number of times before
//! halting, with an optional monitor that watches every delivery and an
//! optional symbolic fork on the very first tick.
//!
//! Not itself a test binary (`tests/*/mod.rs` files aren't compiled as
//! separate crates by cargo) — pulled in via `mod fixtures;` from each
//! scenario file.

#![allow(dead_code)]

use vsched::value::{DynValue, Message, PrimitiveVS, Scalar, UnionVS};
use vsched::{BufferKind, ClassId, EventTag, Guard, GuardContext, Machine, MachineId, Program, Result, StateId};
use vsched::{Choices, ValueSummary};

pub const COUNTER_CLASS: ClassId = ClassId(0);
pub const MONITOR_CLASS: ClassId = ClassId(1);

const TICK: EventTag = EventTag(1);
const EXTRA: EventTag = EventTag(2);

const COUNTING_STATE: StateId = StateId(0);
const DONE_STATE: StateId = StateId(1);
const MONITOR_IDLE: StateId = StateId(10);
const MONITOR_HOT: StateId = StateId(9);

pub fn counter_id(instance: u32) -> MachineId {
    MachineId {
        class: COUNTER_CLASS,
        instance,
    }
}

pub fn monitor_id(instance: u32) -> MachineId {
    MachineId {
        class: MONITOR_CLASS,
        instance,
    }
}

/// Ticks itself `limit` times then halts. Optionally forks once (on the
/// first tick) into a branch that sends one extra message, and optionally
/// broadcasts every delivery to a wired-in monitor.
pub struct CounterProgram {
    limit: i64,
    fork: bool,
    monitor_classes: Vec<ClassId>,
    tick_listeners: Vec<ClassId>,
    monitor_hot_threshold: i64,
}

impl CounterProgram {
    pub fn new(limit: i64) -> Self {
        Self {
            limit,
            fork: false,
            monitor_classes: Vec::new(),
            tick_listeners: Vec::new(),
            monitor_hot_threshold: i64::MAX,
        }
    }

    pub fn with_fork(mut self) -> Self {
        self.fork = true;
        self
    }

    /// Wires in a monitor that goes hot once it has observed `threshold`
    /// deliveries (never, if `threshold` is unreachable within the run).
    pub fn with_monitor(mut self, threshold: i64) -> Self {
        self.monitor_classes = vec![MONITOR_CLASS];
        self.tick_listeners = vec![MONITOR_CLASS];
        self.monitor_hot_threshold = threshold;
        self
    }
}

impl Program for CounterProgram {
    fn start_class(&self) -> ClassId {
        COUNTER_CLASS
    }

    fn monitor_classes(&self) -> &[ClassId] {
        &self.monitor_classes
    }

    fn listeners(&self, event: EventTag) -> &[ClassId] {
        if event == TICK || event == EXTRA {
            &self.tick_listeners
        } else {
            &[]
        }
    }

    fn start_state(&self, class: ClassId) -> StateId {
        if class == MONITOR_CLASS {
            MONITOR_IDLE
        } else {
            COUNTING_STATE
        }
    }

    fn buffer_kind(&self, _class: ClassId) -> BufferKind {
        BufferKind::Queue
    }

    fn hot_state(&self, class: ClassId) -> Option<StateId> {
        if class == MONITOR_CLASS {
            Some(MONITOR_HOT)
        } else {
            None
        }
    }

    fn construct(&self, machine: &mut Machine, ctx: &GuardContext, _choices: &mut dyn Choices) -> Result<()> {
        machine.set_local_state(0, DynValue::scalar(Scalar::Int(0), ctx), ctx);

        if machine.class() == COUNTER_CLASS {
            let pc = ctx.mk_true();
            let seed = Message::new(
                PrimitiveVS::single(pc, TICK, ctx),
                PrimitiveVS::single(pc, machine.id(), ctx),
                UnionVS::tagged(0, pc, PrimitiveVS::constant(Scalar::Unit, ctx), ctx),
                machine.clock().clone(),
            );
            let buffer = machine.buffer().enqueue(&seed, pc, ctx);
            *machine.buffer_mut() = buffer;
        }
        Ok(())
    }

    fn process_event_to_completion(
        &self,
        machine: &mut Machine,
        guard: Guard,
        _message: &Message,
        _max_internal_steps: Option<u32>,
        ctx: &GuardContext,
        choices: &mut dyn Choices,
    ) -> Result<()> {
        let is_counter = machine.class() == COUNTER_CLASS;

        let count_field = machine
            .get_local_state(0)
            .cloned()
            .unwrap_or_else(|| DynValue::empty_scalar(ctx));
        let count_vs = count_field
            .as_scalar()
            .cloned()
            .unwrap_or_else(|| PrimitiveVS::empty(ctx));
        let restricted = count_vs.restrict(guard, ctx);

        let mut next_count = Vec::new();
        let mut next_state = Vec::new();
        let mut next_halted = Vec::new();
        let mut buffer = machine.buffer().clone();

        for (g, scalar) in restricted.get_guarded_values(ctx) {
            let n = match scalar {
                Scalar::Int(n) => n,
                _ => 0,
            };

            if is_counter {
                if n >= self.limit {
                    next_count.push((g, Scalar::Int(n)));
                    next_state.push((g, DONE_STATE));
                    next_halted.push((g, true));
                    continue;
                }

                let bumped = n + 1;
                next_count.push((g, Scalar::Int(bumped)));
                next_state.push((g, COUNTING_STATE));
                next_halted.push((g, false));

                let tick = Message::new(
                    PrimitiveVS::single(g, TICK, ctx),
                    PrimitiveVS::single(g, machine.id(), ctx),
                    UnionVS::tagged(0, g, PrimitiveVS::constant(Scalar::Unit, ctx), ctx),
                    machine.clock().clone(),
                );
                buffer = buffer.enqueue(&tick, g, ctx);

                if self.fork && n == 0 {
                    let fork = choices.next_bool(g);
                    let take_extra = fork.guard_for(true, ctx);
                    if ctx.is_sat(take_extra) {
                        let extra = Message::new(
                            PrimitiveVS::single(take_extra, EXTRA, ctx),
                            PrimitiveVS::single(take_extra, machine.id(), ctx),
                            UnionVS::tagged(0, take_extra, PrimitiveVS::constant(Scalar::Unit, ctx), ctx),
                            machine.clock().clone(),
                        );
                        buffer = buffer.enqueue(&extra, take_extra, ctx);
                    }
                }
            } else {
                let bumped = n + 1;
                next_count.push((g, Scalar::Int(bumped)));
                let state = if bumped >= self.monitor_hot_threshold {
                    MONITOR_HOT
                } else {
                    MONITOR_IDLE
                };
                next_state.push((g, state));
                next_halted.push((g, false));
            }
        }

        let merged_count = count_field.update_under_guard(
            guard,
            &DynValue::Scalar(PrimitiveVS::from_entries(next_count, ctx)),
            ctx,
        );
        machine.set_local_state(0, merged_count, ctx);

        let merged_state = machine
            .current_state()
            .update_under_guard(guard, &PrimitiveVS::from_entries(next_state, ctx), ctx);
        machine.set_current_state(merged_state);

        let merged_halted = machine
            .has_halted()
            .update_under_guard(guard, &PrimitiveVS::from_entries(next_halted, ctx), ctx);
        machine.set_halted(merged_halted);

        if is_counter {
            *machine.buffer_mut() = buffer;
        }

        Ok(())
    }
}
