//! Replay mode (spec §4.5): once walking a previously recorded choice log,
//! `Scheduler::next_bool` must reproduce the exact recorded candidates
//! rather than minting fresh guard variables, until the log runs out.

mod fixtures;

use fixtures::CounterProgram;
use vsched::SchedulerBuilder;

#[test]
fn replay_reproduces_recorded_bool_choices_verbatim() {
    let mut scheduler = SchedulerBuilder::new().with_program(CounterProgram::new(1)).build();
    let pc = scheduler.context().mk_true();

    let original: Vec<_> = (0..3)
        .map(|_| scheduler.next_bool(pc).entries().to_vec())
        .collect();
    assert_eq!(scheduler.schedule().choice_depth(), 3);

    scheduler.begin_replay();

    let replayed: Vec<_> = (0..3)
        .map(|_| scheduler.next_bool(pc).entries().to_vec())
        .collect();

    assert_eq!(original, replayed);
    // Replaying doesn't grow the log — it's walking the existing entries.
    assert_eq!(scheduler.schedule().choice_depth(), 3);

    // The log is now exhausted; a further call mints a genuinely fresh
    // variable instead of reproducing (there's nothing left at cursor 3).
    let fresh = scheduler.next_bool(pc).entries().to_vec();
    assert_ne!(fresh, original[0]);
    assert_eq!(scheduler.schedule().choice_depth(), 4);
}
