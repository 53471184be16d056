//! Backtracking to an earlier source-state snapshot and continuing the
//! search deterministically from there (spec §4.5, property S6).

mod fixtures;

use fixtures::{counter_id, CounterProgram};
use vsched::{ReductionFlags, SchedulerConfig, SchedulerBuilder, SearchResult};

#[test]
fn restoring_depth_zero_resets_the_machine_and_continuing_reproduces_the_same_outcome() {
    let mut scheduler = SchedulerBuilder::new()
        .with_program(CounterProgram::new(3))
        .with_config(
            SchedulerConfig::builder()
                .with_flags(ReductionFlags::BACKTRACK)
                .build(),
        )
        .build();

    let first_result = scheduler.do_search();
    assert_eq!(first_result, SearchResult::Ok);

    {
        let ctx = scheduler.context();
        let machine = scheduler.machine(counter_id(0)).unwrap();
        assert!(ctx.is_true(machine.has_halted().guard_for(true, ctx)));
    }

    let restored = scheduler.restore_state(0);
    assert!(restored, "depth 0's backtrack frame is always captured under BACKTRACK");
    assert_eq!(scheduler.depth(), 0);

    {
        let ctx = scheduler.context();
        let machine = scheduler.machine(counter_id(0)).unwrap();
        assert!(ctx.is_false(machine.has_halted().guard_for(true, ctx)));
    }

    loop {
        match scheduler.step() {
            Ok(true) => break,
            Ok(false) => continue,
            Err(e) => panic!("unexpected error resuming from a restored state: {e}"),
        }
    }
    scheduler.check_liveness().expect("no monitor is wired up in this test");

    let ctx = scheduler.context();
    let machine = scheduler.machine(counter_id(0)).unwrap();
    assert!(ctx.is_true(machine.has_halted().guard_for(true, ctx)));
}

#[test]
fn restoring_an_uncaptured_depth_reports_failure() {
    let mut scheduler = SchedulerBuilder::new().with_program(CounterProgram::new(3)).build();
    scheduler.do_search();
    // BACKTRACK was never enabled, so no frame was ever captured.
    assert!(!scheduler.restore_state(0));
}
