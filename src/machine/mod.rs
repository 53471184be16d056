//! Machine runtime (spec §3.3 / §9 "cyclic references"): the scheduler owns
//! an arena of [`Machine`] records and hands out [`MachineHandle`]s rather
//! than raw references, so value summaries can carry machine identity
//! without owning (or aliasing into) the scheduler's storage. A generational
//! arena keyed by handle, built on a safe enum-based slot rather than an
//! unsafe union trick — machine records aren't on a hot enough path to buy
//! anything with that optimization.

mod buffer;

pub use buffer::{BufferKind, MessageBuffer};

use core::fmt;

use crate::guard::{Guard, GuardContext};
use crate::ids::{ClassId, MachineId, StateId};
use crate::value::{DynValue, PrimitiveVS, ValueSummary, VectorClockVS};

/// A generational reference to a [`Machine`] inside a [`MachineArena`].
/// Opaque outside the arena; never dereferenced directly (spec §9: "VSs
/// store handles, never owned pointers").
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct MachineHandle {
    index: u32,
    generation: u32,
}

impl fmt::Debug for MachineHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MachineHandle({}#{})", self.index, self.generation)
    }
}

impl fmt::Display for MachineHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "m{}#{}", self.index, self.generation)
    }
}

enum Slot<T> {
    Occupied { value: T, generation: u32 },
    Vacant { next: Option<u32>, generation: u32 },
}

/// Generational arena of machine records, in stable insertion order for
/// iteration (spec §5: "stable machine ordering (insertion order)" is a
/// required invariant for reproducibility).
pub struct MachineArena<T> {
    slots: Vec<Slot<T>>,
    free_head: Option<u32>,
}

impl<T> MachineArena<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_head: None,
        }
    }

    pub fn insert(&mut self, value: T) -> MachineHandle {
        if let Some(index) = self.free_head {
            let generation = match &self.slots[index as usize] {
                Slot::Vacant { generation, .. } => *generation,
                Slot::Occupied { .. } => unreachable!("free list points at an occupied slot"),
            };
            let next = match &self.slots[index as usize] {
                Slot::Vacant { next, .. } => *next,
                Slot::Occupied { .. } => unreachable!(),
            };
            self.free_head = next;
            self.slots[index as usize] = Slot::Occupied { value, generation };
            MachineHandle { index, generation }
        } else {
            let index = self.slots.len() as u32;
            let generation = 0;
            self.slots.push(Slot::Occupied { value, generation });
            MachineHandle { index, generation }
        }
    }

    pub fn get(&self, handle: MachineHandle) -> Option<&T> {
        match self.slots.get(handle.index as usize)? {
            Slot::Occupied { value, generation } if *generation == handle.generation => Some(value),
            _ => None,
        }
    }

    pub fn get_mut(&mut self, handle: MachineHandle) -> Option<&mut T> {
        match self.slots.get_mut(handle.index as usize)? {
            Slot::Occupied { value, generation } if *generation == handle.generation => Some(value),
            _ => None,
        }
    }

    pub fn remove(&mut self, handle: MachineHandle) -> Option<T> {
        let slot = self.slots.get_mut(handle.index as usize)?;
        match slot {
            Slot::Occupied { generation, .. } if *generation == handle.generation => {
                let next_gen = generation.wrapping_add(1);
                let prev = core::mem::replace(
                    slot,
                    Slot::Vacant {
                        next: self.free_head,
                        generation: next_gen,
                    },
                );
                self.free_head = Some(handle.index);
                match prev {
                    Slot::Occupied { value, .. } => Some(value),
                    Slot::Vacant { .. } => None,
                }
            }
            _ => None,
        }
    }

    /// Iterates live machines in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (MachineHandle, &T)> {
        self.slots.iter().enumerate().filter_map(|(i, slot)| match slot {
            Slot::Occupied { value, generation } => Some((
                MachineHandle {
                    index: i as u32,
                    generation: *generation,
                },
                value,
            )),
            Slot::Vacant { .. } => None,
        })
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (MachineHandle, &mut T)> {
        self.slots.iter_mut().enumerate().filter_map(|(i, slot)| match slot {
            Slot::Occupied { value, generation } => Some((
                MachineHandle {
                    index: i as u32,
                    generation: *generation,
                },
                value,
            )),
            Slot::Vacant { .. } => None,
        })
    }
}

impl<T> Default for MachineArena<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// The scheduler's own bookkeeping record for a machine: identity, cached
/// local state, pending-message buffer, vector clock and liveness-relevant
/// state set (spec §3.3). This is what the scheduler snapshots, restores
/// and iterates; the program-specific transition logic is driven through
/// [`crate::program::Program::process_event_to_completion`] instead.
#[derive(Clone)]
pub struct Machine {
    id: MachineId,
    local_state: Vec<DynValue>,
    buffer: MessageBuffer,
    clock: VectorClockVS,
    current_state: PrimitiveVS<StateId>,
    hot_state: Option<StateId>,
    halted: PrimitiveVS<bool>,
}

impl Machine {
    pub fn new(id: MachineId, buffer_kind: BufferKind, start_state: StateId, ctx: &GuardContext) -> Self {
        Self {
            id,
            local_state: Vec::new(),
            buffer: MessageBuffer::new(buffer_kind, ctx),
            clock: VectorClockVS::empty(ctx),
            current_state: PrimitiveVS::constant(start_state, ctx),
            hot_state: None,
            halted: PrimitiveVS::constant(false, ctx),
        }
    }

    pub fn id(&self) -> MachineId {
        self.id
    }

    pub fn class(&self) -> ClassId {
        self.id.class
    }

    pub fn get_local_state(&self, field: usize) -> Option<&DynValue> {
        self.local_state.get(field)
    }

    pub fn set_local_state(&mut self, field: usize, value: DynValue, ctx: &GuardContext) {
        while self.local_state.len() <= field {
            self.local_state.push(DynValue::empty_scalar(ctx));
        }
        self.local_state[field] = value;
    }

    pub fn local_state(&self) -> &[DynValue] {
        &self.local_state
    }

    pub fn buffer(&self) -> &MessageBuffer {
        &self.buffer
    }

    pub fn buffer_mut(&mut self) -> &mut MessageBuffer {
        &mut self.buffer
    }

    pub fn clock(&self) -> &VectorClockVS {
        &self.clock
    }

    /// Bumps this machine's own vector-clock entry by one under `g` — call
    /// on every send (spec §3.3).
    pub fn tick_clock(&mut self, g: Guard, ctx: &GuardContext) {
        self.clock = self.clock.tick(self.id, g, ctx);
    }

    pub fn join_clock(&mut self, other: &VectorClockVS, ctx: &GuardContext) {
        self.clock = self.clock.join(other, ctx);
    }

    pub fn current_state(&self) -> &PrimitiveVS<StateId> {
        &self.current_state
    }

    pub fn set_current_state(&mut self, state: PrimitiveVS<StateId>) {
        self.current_state = state;
    }

    pub fn hot_state(&self) -> Option<StateId> {
        self.hot_state
    }

    pub fn set_hot_state(&mut self, hot: Option<StateId>) {
        self.hot_state = hot;
    }

    /// `true` under the guards where this machine's current state is its
    /// designated hot state (spec §4.7).
    pub fn is_hot(&self, ctx: &GuardContext) -> PrimitiveVS<bool> {
        match self.hot_state {
            Some(hot) => self
                .current_state
                .symbolic_equals(&PrimitiveVS::constant(hot, ctx), ctx.mk_true(), ctx),
            None => PrimitiveVS::constant(false, ctx),
        }
    }

    pub fn has_halted(&self) -> &PrimitiveVS<bool> {
        &self.halted
    }

    pub fn set_halted(&mut self, halted: PrimitiveVS<bool>) {
        self.halted = halted;
    }

    /// Reinitializes buffer and local state, preserving identity and
    /// buffer discipline — used by the program's `Machine.reset()`
    /// contract (spec §6.1) between `useStateCaching` concretizations.
    pub fn reset(&mut self, start_state: StateId, ctx: &GuardContext) {
        self.local_state.clear();
        self.buffer = MessageBuffer::new(self.buffer.kind(), ctx);
        self.clock = VectorClockVS::empty(ctx);
        self.current_state = PrimitiveVS::constant(start_state, ctx);
        self.halted = PrimitiveVS::constant(false, ctx);
    }
}
