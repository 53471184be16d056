//! A single machine ticking itself to completion with no forks and no
//! monitor — the simplest possible run through the step loop (spec §4.4).

mod fixtures;

use fixtures::{counter_id, CounterProgram};
use vsched::value::Scalar;
use vsched::{SchedulerBuilder, SearchResult, ValueSummary};

#[test]
fn counter_runs_to_completion_and_halts() {
    let mut scheduler = SchedulerBuilder::new().with_program(CounterProgram::new(3)).build();

    let result = scheduler.do_search();
    assert_eq!(result, SearchResult::Ok);

    let ctx = scheduler.context();
    let machine = scheduler.machine(counter_id(0)).expect("counter machine exists");

    assert!(ctx.is_true(machine.has_halted().guard_for(true, ctx)));
    assert_eq!(
        machine.current_state().get_guarded_values(ctx),
        vec![(ctx.mk_true(), vsched::StateId(1))]
    );

    let count = machine
        .get_local_state(0)
        .and_then(|v| v.as_scalar())
        .expect("count field present");
    assert_eq!(count.get_guarded_values(ctx), vec![(ctx.mk_true(), Scalar::Int(3))]);

    assert!(machine.buffer().is_empty());
}

#[test]
fn step_bound_halts_the_search_early() {
    let mut scheduler = SchedulerBuilder::new()
        .with_program(CounterProgram::new(1000))
        .with_config(vsched::SchedulerConfig::builder().with_max_step_bound(2).build())
        .build();

    let result = scheduler.do_search();
    assert_eq!(result, SearchResult::Ok);
    assert_eq!(scheduler.depth(), 2);

    let ctx = scheduler.context();
    let machine = scheduler.machine(counter_id(0)).unwrap();
    assert!(!ctx.is_true(machine.has_halted().guard_for(true, ctx)));
}
