//! Error taxonomy (spec §7).
//!
//! A `#[non_exhaustive]` enum with a hand-written [`Display`], a
//! `std::error::Error` impl, and a conversion into the crate's chosen
//! report type — `anyhow::Error`, already the crate's primary dependency,
//! via [`EngineError::into_anyhow`].

use core::fmt;

use crate::guard::Guard;

/// A fault in the engine's own bookkeeping — never the modeled program's
/// fault. Indicates a bug in this crate.
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum InvariantError {
    /// `merge` was called on value summaries with overlapping guards.
    OverlappingGuards,
    /// `announce`/`send` carried a null or empty event tag.
    EmptyEvent,
    /// A `send` produced a value summary with more than one distinct event
    /// tag under a single guard.
    MultiEventMessage,
}

impl fmt::Display for InvariantError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvariantError::OverlappingGuards => {
                write!(f, "merge() called with overlapping guards")
            }
            InvariantError::EmptyEvent => write!(f, "announce() called with no event"),
            InvariantError::MultiEventMessage => {
                write!(f, "send() produced a message with more than one event tag under a guard")
            }
        }
    }
}

/// A fault in the modeled program rather than the engine: bad index, bad
/// key, payload/type mismatch on a union. Reported as a program assertion
/// failure (`bug`), not an engine crash.
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum ModelError {
    /// Index out of range for a list/tuple under some guard.
    IndexOutOfRange { index: i64, len: i64 },
    /// Key not present in a map under some guard.
    KeyNotFound,
    /// The union's payload did not match the requested tag.
    PayloadTypeMismatch { expected: String, found: String },
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::IndexOutOfRange { index, len } => {
                write!(f, "index {index} out of range for length {len}")
            }
            ModelError::KeyNotFound => write!(f, "key not found in map"),
            ModelError::PayloadTypeMismatch { expected, found } => {
                write!(f, "expected union payload of type {expected}, found {found}")
            }
        }
    }
}

/// Resource exhaustion during search (spec §5, §7).
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum ResourceFault {
    Timeout { elapsed_secs: u64, limit_secs: u64 },
    Memout { used_mb: u64, limit_mb: u64 },
}

impl fmt::Display for ResourceFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceFault::Timeout {
                elapsed_secs,
                limit_secs,
            } => write!(
                f,
                "time limit exceeded: time-seconds={elapsed_secs} (limit {limit_secs})"
            ),
            ResourceFault::Memout { used_mb, limit_mb } => write!(
                f,
                "memory limit exceeded: memory-max-MB={used_mb} (limit {limit_mb})"
            ),
        }
    }
}

/// The five-way error taxonomy of spec §7.
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum EngineError {
    /// `Assert.prop` failed under the given guard.
    Assertion { guard: Guard, message: String },
    /// Resource exhaustion (timeout/memout); always terminates the search.
    ResourceExhausted(ResourceFault),
    /// A bug in the engine itself (overlapping guards, malformed message, ...).
    Invariant(InvariantError),
    /// A bug in the modeled program (bad index/key/payload).
    Model(ModelError),
    /// A monitor ended the run in a hot state under the given guard.
    Liveness { monitor_state: String, guard: Guard },
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::Assertion { guard, message } => {
                write!(f, "assertion failed under {guard:?}: {message}")
            }
            EngineError::ResourceExhausted(fault) => write!(f, "{fault}"),
            EngineError::Invariant(inv) => write!(f, "internal invariant violated: {inv}"),
            EngineError::Model(model) => write!(f, "program error: {model}"),
            EngineError::Liveness {
                monitor_state,
                guard,
            } => write!(
                f,
                "hot state '{monitor_state}' occupied at end of execution under {guard:?}"
            ),
        }
    }
}

impl std::error::Error for EngineError {}

impl EngineError {
    /// Convert into an opaque report, for callers (CLI, test harness) that
    /// don't want to match on the taxonomy.
    pub fn into_anyhow(self) -> anyhow::Error {
        anyhow::Error::msg(self)
    }

    /// Whether this failure should terminate the search. Per spec §7
    /// ("Propagation policy"), all of these terminate the search outright;
    /// kept as a method rather than inlined at each call site since new
    /// variants default to terminating too (non-exhaustive enum).
    pub fn terminates_search(&self) -> bool {
        true
    }
}

impl From<InvariantError> for EngineError {
    fn from(e: InvariantError) -> Self {
        EngineError::Invariant(e)
    }
}

impl From<ModelError> for EngineError {
    fn from(e: ModelError) -> Self {
        EngineError::Model(e)
    }
}

impl From<ResourceFault> for EngineError {
    fn from(e: ResourceFault) -> Self {
        EngineError::ResourceExhausted(e)
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = core::result::Result<T, EngineError>;
