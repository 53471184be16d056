//! The program-under-test contract (spec §6.1) — consumed, not implemented,
//! by this crate. Source-language parsing and code generation that produce
//! an object implementing [`Program`] are explicitly out of scope (spec
//! §1); this module only sketches the interface the scheduler calls
//! through, without owning the callback bodies themselves.

use crate::error::Result;
use crate::guard::{Guard, GuardContext};
use crate::ids::{ClassId, EventTag, StateId, CREATE_EVENT};
use crate::machine::{BufferKind, Machine};
use crate::scheduler::Choices;
use crate::value::Message;

/// A compiled state-machine program: machine classes, the designated entry
/// point, and the monitor/listener wiring (spec §6.1: `getStart`,
/// `getMonitors`, `getListeners`).
///
/// Implemented by the (out-of-scope) source-language compiler's output.
/// This crate only drives it.
pub trait Program {
    /// `getStart()`: the class instantiated as the run's single entry
    /// machine.
    fn start_class(&self) -> ClassId;

    /// The classes of declared monitors (`getMonitors()`). Monitor
    /// instances live in the same [`crate::machine::MachineArena`] as
    /// ordinary machines; this only tells the scheduler which handles are
    /// monitors when it runs the liveness check (spec §4.7).
    fn monitor_classes(&self) -> &[ClassId];

    /// `getListeners()`: classes listening for `event`, empty if none.
    fn listeners(&self, event: EventTag) -> &[ClassId];

    /// The state a freshly constructed machine of `class` starts in.
    fn start_state(&self, class: ClassId) -> StateId;

    /// The buffer discipline a class uses, absent a global
    /// `useBagSemantics` override (spec §3.3: "configured per-machine").
    fn buffer_kind(&self, class: ClassId) -> BufferKind;

    /// The hot state of `class`, if it (or its monitor counterpart)
    /// declares one (spec §3.3, §4.7).
    fn hot_state(&self, class: ClassId) -> Option<StateId>;

    /// `allocateMachine`'s `constructor` argument (spec §6.2), run once
    /// immediately after a fresh `machine` is minted: sets up initial local
    /// state and, for a machine meant to act first, enqueues its own first
    /// outgoing send into `machine`'s buffer. `choices` lets the
    /// constructor fork on a symbolic initial value the same way
    /// [`Self::process_event_to_completion`] can. Default no-op — most
    /// classes only ever react to an incoming event and need nothing here.
    fn construct(&self, _machine: &mut Machine, _ctx: &GuardContext, _choices: &mut dyn Choices) -> Result<()> {
        Ok(())
    }

    /// Drives `machine` through one "event to completion" dispatch for
    /// `message`, restricted to `guard` (spec §6.1:
    /// `processEventToCompletion`). `max_internal_steps` bounds the
    /// per-machine internal step count (spec §6.3 `maxInternalSteps`);
    /// `None` is unbounded. `choices` is the compiled program's handle
    /// onto `getNextBoolean`/`getNextInteger`/`getNextElement` (spec
    /// §6.2) for any symbolic branching (e.g. `nextBool`-guarded sends)
    /// the transition itself performs.
    ///
    /// Implementations update `machine`'s local state, current state,
    /// halted flag, and send buffer in place, returning a
    /// [`crate::error::EngineError::Model`] for program-level faults (bad
    /// index/key/payload) rather than panicking (spec §7).
    fn process_event_to_completion(
        &self,
        machine: &mut Machine,
        guard: Guard,
        message: &Message,
        max_internal_steps: Option<u32>,
        ctx: &GuardContext,
        choices: &mut dyn Choices,
    ) -> Result<()>;

    /// Whether `tag` marks a `create-machine` message (spec §4.4 step 3a).
    /// The reserved tag [`crate::ids::CREATE_EVENT`] covers the common case;
    /// override if a program interns creation under several tags.
    fn is_create_event(&self, tag: EventTag) -> bool {
        tag == CREATE_EVENT
    }

    /// Whether `tag` is sync-marked (spec §4.4 step 3b). No tag is
    /// sync-marked unless a program opts in.
    fn is_sync_event(&self, _tag: EventTag) -> bool {
        false
    }
}
