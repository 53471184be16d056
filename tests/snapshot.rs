//! `ConcreteWorldState` is the portable shape state caching hashes and, per
//! Open Question (c), the shape this crate expects callers to persist
//! across a `bincode` boundary if they snapshot a run at all.

use vsched::{ClassId, ConcreteMachineState, ConcreteWorldState, MachineId, StateId};
use vsched::value::{DynConcrete, MessageConcrete, Scalar};

fn sample() -> ConcreteWorldState {
    ConcreteWorldState::new(vec![
        ConcreteMachineState {
            id: MachineId { class: ClassId(0), instance: 0 },
            class: ClassId(0),
            local_state: vec![DynConcrete::Scalar(Scalar::Int(7))],
            pending: Vec::<MessageConcrete>::new(),
            current_state: StateId(0),
            halted: false,
        },
        ConcreteMachineState {
            id: MachineId { class: ClassId(1), instance: 0 },
            class: ClassId(1),
            local_state: vec![DynConcrete::Scalar(Scalar::Bool(true))],
            pending: Vec::<MessageConcrete>::new(),
            current_state: StateId(9),
            halted: false,
        },
    ])
}

#[test]
fn round_trips_through_bincode() {
    let state = sample();
    let bytes = bincode::serialize(&state).expect("concrete world state is always serializable");
    let restored: ConcreteWorldState =
        bincode::deserialize(&bytes).expect("bytes produced by serialize must deserialize back");
    assert_eq!(state, restored);
    assert_eq!(state.digest(), restored.digest());
}

#[test]
fn distinct_states_serialize_to_distinct_digests() {
    let a = sample();
    let mut b = sample();
    b.machines[0].current_state = StateId(1);
    assert_ne!(a.digest(), b.digest());

    let bytes_a = bincode::serialize(&a).unwrap();
    let bytes_b = bincode::serialize(&b).unwrap();
    assert_ne!(bytes_a, bytes_b);
}
