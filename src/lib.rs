//! A symbolic scheduler core for communicating state machines.
//!
//! Three layers, from the bottom up:
//!
//! - [`guard`]: a ROBDD-backed boolean algebra over path conditions.
//! - [`value`]: value summaries — guarded disjunctions of concrete values —
//!   built generically on top of [`value::ValueSummary`].
//! - [`machine`] and [`scheduler`]: the machine runtime (arena, buffers) and
//!   the symbolic step loop that drives it.
//!
//! [`program::Program`] is the seam between this crate and a compiled
//! state-machine program; this crate drives that trait, it does not produce
//! implementations of it.

pub mod config;
pub mod error;
pub mod guard;
pub mod ids;
pub mod machine;
pub mod program;
pub mod scheduler;
pub mod snapshot;
pub mod value;

pub use config::{ReductionFlags, SchedulerConfig, SchedulerConfigBuilder};
pub use error::{EngineError, InvariantError, ModelError, ResourceFault, Result};
pub use guard::{Guard, GuardContext};
pub use ids::{ClassId, EventTag, MachineId, StateId, CREATE_EVENT};
pub use machine::{BufferKind, Machine, MachineArena, MachineHandle, MessageBuffer};
pub use program::Program;
pub use scheduler::{Choices, Scheduler, SchedulerBuilder, SearchResult};
pub use snapshot::{ConcreteMachineState, ConcreteWorldState};
pub use value::{DebugGuarded, ValueSummary};
