//! Small newtype identifiers shared across the value-summary and machine
//! layers. These are non-generational, used as *scalar payload values*
//! inside value summaries, as opposed to [`crate::machine::MachineHandle`]
//! which is the generational arena key.

use core::fmt;

/// `(class, instance index)` identity of a machine (spec §3.3). Cheap,
/// `Copy`, usable as a scalar inside a [`crate::value::PrimitiveVS`].
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MachineId {
    pub class: ClassId,
    pub instance: u32,
}

impl fmt::Display for MachineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.class, self.instance)
    }
}

/// A machine class (the name of a state-machine definition in the source
/// program). Interned as a small integer by the external [`crate::program::Program`]
/// so comparisons stay cheap inside hot value-summary code.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClassId(pub u32);

impl fmt::Display for ClassId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "class#{}", self.0)
    }
}

/// An interned event tag (e.g. `PING`, `halt`, `eGoto`).
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EventTag(pub u32);

/// An interned state handle, scoped to a single machine class.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StateId(pub u32);

/// The reserved event tag for `create-machine` messages (spec §4.4 step 3a:
/// "every machine whose buffer head is a `create-machine` message"). Every
/// other tag is program-defined and interned starting from `1`.
pub const CREATE_EVENT: EventTag = EventTag(0);
