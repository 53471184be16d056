use core::fmt;

use crate::ids::{EventTag, MachineId, StateId};

/// A concrete leaf value. `PrimitiveVS<Scalar>` is the catch-all atomic
/// value summary used for dynamically-typed payload slots (e.g. a union's
/// payload, a map's key); statically-typed call sites use `PrimitiveVS<bool>`,
/// `PrimitiveVS<i64>`, etc. directly instead, which is the "static dispatch
/// for the hot primitive path" design note (spec §9).
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    Str(String),
    Machine(MachineId),
    Event(EventTag),
    State(StateId),
    /// The unit/no-payload value, for events that carry nothing.
    Unit,
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Bool(b) => write!(f, "{b}"),
            Scalar::Int(i) => write!(f, "{i}"),
            Scalar::Str(s) => write!(f, "{s:?}"),
            Scalar::Machine(m) => write!(f, "{m}"),
            Scalar::Event(e) => write!(f, "event#{}", e.0),
            Scalar::State(s) => write!(f, "state#{}", s.0),
            Scalar::Unit => write!(f, "()"),
        }
    }
}

impl From<bool> for Scalar {
    fn from(v: bool) -> Self {
        Scalar::Bool(v)
    }
}

impl From<i64> for Scalar {
    fn from(v: i64) -> Self {
        Scalar::Int(v)
    }
}

impl From<String> for Scalar {
    fn from(v: String) -> Self {
        Scalar::Str(v)
    }
}

impl From<MachineId> for Scalar {
    fn from(v: MachineId) -> Self {
        Scalar::Machine(v)
    }
}
