//! Nondeterministic-choice callback surface (spec §4.3, §6.2).
//!
//! `Program::process_event_to_completion` runs while `Scheduler::run_machine`
//! is simultaneously holding `&self.program` (the call receiver) and `&mut
//! self.machines` (the machine being driven), so it can't also take `&mut
//! Scheduler` — that would alias both. `Choices` is the narrow slice of
//! scheduler state a compiled program actually needs mid-dispatch to make a
//! choice (the guard context, the choice log, and the replay cursor), built
//! as disjoint field borrows of [`super::Scheduler`] rather than the whole
//! struct — the same pattern the guard-context borrows elsewhere in this
//! module already use.

use crate::guard::{Guard, GuardContext};
use crate::value::{PrimitiveVS, ValueSummary};

use super::schedule::{ChoiceKind, ChoiceValue, Schedule};

/// `getNextBoolean`/`getNextInteger`/`getNextElement` (spec §6.2), exposed
/// to a compiled state-machine program while it is processing one event to
/// completion or being constructed (spec §4.3: "Every choice is appended
/// to the `Schedule`").
pub trait Choices {
    /// `getNextBoolean(pc)`: a fresh boolean variable under `pc`, recorded
    /// at the current choice depth.
    fn next_bool(&mut self, pc: Guard) -> PrimitiveVS<bool>;

    /// `getNextInteger(bound, pc)`: uniformly covers `[0, maxValue(bound))`
    /// per branch of `bound`.
    fn next_int(&mut self, bound: &PrimitiveVS<i64>, pc: Guard) -> PrimitiveVS<i64>;

    /// `getNextElement(container, pc)`: recurses through [`Choices::next_int`]
    /// on the container's size.
    fn next_element(&mut self, size: &PrimitiveVS<i64>, pc: Guard) -> PrimitiveVS<i64> {
        self.next_int(size, pc)
    }
}

/// The fresh `(guard, value)` branches for one `next_bool` call, before
/// being logged — shared by [`ScopedChoices`] and `Scheduler::next_bool`
/// so the two call paths can't drift.
pub(crate) fn bool_entries(ctx: &GuardContext, pc: Guard) -> Vec<(Guard, ChoiceValue)> {
    let var = ctx.fresh_var();
    let g_true = ctx.and(pc, var);
    let g_false = ctx.and(pc, ctx.not(var));
    vec![(g_true, ChoiceValue::Bool(true)), (g_false, ChoiceValue::Bool(false))]
}

/// The fresh `(guard, value)` branches for one `next_int` call. Processes
/// each `bound` branch independently (Open Question (a): a zero bound
/// under some guard is treated as bound = 1 there, preserving that
/// branch rather than silently dropping its candidates).
pub(crate) fn int_entries(ctx: &GuardContext, bound: &PrimitiveVS<i64>, pc: Guard) -> Vec<(Guard, ChoiceValue)> {
    let mut entries = Vec::new();
    for (bg, b) in bound.get_guarded_values(ctx) {
        let b = if b <= 0 { 1 } else { b };
        let branch_pc = ctx.and(bg, pc);
        if ctx.is_false(branch_pc) {
            continue;
        }
        let mut remaining = branch_pc;
        for i in 0..b {
            if i == b - 1 {
                if ctx.is_sat(remaining) {
                    entries.push((remaining, ChoiceValue::Int(i)));
                }
            } else {
                let var = ctx.fresh_var();
                let g = ctx.and(remaining, var);
                if ctx.is_sat(g) {
                    entries.push((g, ChoiceValue::Int(i)));
                }
                remaining = ctx.and(remaining, ctx.not(var));
            }
        }
    }
    entries
}

/// Appends `fresh` to `schedule` at the current depth, unless replay mode
/// is still walking a previously recorded log — then it returns the
/// recorded candidates instead and advances the cursor (spec §4.5).
pub(crate) fn log_choice(
    schedule: &mut Schedule,
    replaying: &mut bool,
    replay_cursor: &mut u64,
    kind: ChoiceKind,
    fresh: Vec<(Guard, ChoiceValue)>,
) -> Vec<(Guard, ChoiceValue)> {
    if *replaying {
        if let Some(rec) = schedule.choice_at(*replay_cursor) {
            let out = rec.candidates.clone();
            *replay_cursor += 1;
            return out;
        }
        *replaying = false;
    }
    schedule.record(kind, fresh.clone());
    fresh
}

/// Borrows exactly the [`super::Scheduler`] fields a mid-dispatch choice
/// needs. Constructed fresh for each `construct`/`process_event_to_completion`
/// call rather than stored, so its borrows end with that call.
pub(crate) struct ScopedChoices<'a> {
    pub ctx: &'a GuardContext,
    pub schedule: &'a mut Schedule,
    pub replaying: &'a mut bool,
    pub replay_cursor: &'a mut u64,
}

impl<'a> Choices for ScopedChoices<'a> {
    fn next_bool(&mut self, pc: Guard) -> PrimitiveVS<bool> {
        let fresh = bool_entries(self.ctx, pc);
        let chosen = log_choice(self.schedule, self.replaying, self.replay_cursor, ChoiceKind::Bool, fresh);
        let entries = chosen
            .into_iter()
            .filter_map(|(g, v)| match v {
                ChoiceValue::Bool(b) => Some((g, b)),
                _ => None,
            })
            .collect();
        PrimitiveVS::from_entries(entries, self.ctx)
    }

    fn next_int(&mut self, bound: &PrimitiveVS<i64>, pc: Guard) -> PrimitiveVS<i64> {
        let fresh = int_entries(self.ctx, bound, pc);
        let chosen = log_choice(self.schedule, self.replaying, self.replay_cursor, ChoiceKind::Integer, fresh);
        let entries = chosen
            .into_iter()
            .filter_map(|(g, v)| match v {
                ChoiceValue::Int(i) => Some((g, i)),
                _ => None,
            })
            .collect();
        PrimitiveVS::from_entries(entries, self.ctx)
    }
}
