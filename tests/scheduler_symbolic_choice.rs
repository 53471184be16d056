//! A single machine forking on a symbolic boolean during its first tick
//! (spec §4.3, §8 — "symbolic boolean fork"), producing two guarded
//! branches of the run that both still reach completion.

mod fixtures;

use fixtures::{counter_id, CounterProgram};
use vsched::scheduler::ChoiceKind;
use vsched::{SchedulerBuilder, SearchResult, ValueSummary};

#[test]
fn forking_on_the_first_tick_still_reaches_completion_on_every_branch() {
    let mut scheduler = SchedulerBuilder::new()
        .with_program(CounterProgram::new(4).with_fork())
        .build();

    let result = scheduler.do_search();
    assert_eq!(result, SearchResult::Ok);

    let ctx = scheduler.context();
    let machine = scheduler.machine(counter_id(0)).unwrap();

    // Both the fork's `true` and `false` branches eventually halt; the
    // search wouldn't finish (`live_guard` would stay partly unsatisfied)
    // otherwise.
    assert!(ctx.is_true(machine.has_halted().guard_for(true, ctx)));
}

#[test]
fn the_fork_is_recorded_as_a_bool_choice_with_two_candidates() {
    let mut scheduler = SchedulerBuilder::new()
        .with_program(CounterProgram::new(4).with_fork())
        .build();

    scheduler.do_search();

    let bool_choice = scheduler
        .schedule()
        .choices()
        .iter()
        .find(|rec| rec.kind == ChoiceKind::Bool);

    let bool_choice = bool_choice.expect("a Choices::next_bool call happened during the run");
    assert_eq!(bool_choice.candidates.len(), 2);

    let ctx = scheduler.context();
    let disjunction = bool_choice
        .candidates
        .iter()
        .fold(ctx.mk_false(), |acc, (g, _)| ctx.or(acc, *g));
    assert!(ctx.is_sat(disjunction));
}

#[test]
fn no_fork_means_no_bool_choice_is_logged() {
    let mut scheduler = SchedulerBuilder::new().with_program(CounterProgram::new(4)).build();
    scheduler.do_search();

    assert!(scheduler
        .schedule()
        .choices()
        .iter()
        .all(|rec| rec.kind != ChoiceKind::Bool));
}
