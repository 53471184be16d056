//! The algebraic laws value summaries are built on (spec §8, properties
//! 1–7), exercised directly against `PrimitiveVS`, `ListVS` and `SetVS`
//! rather than through a scheduler.

use pretty_assertions::assert_eq;
use vsched::value::{ListVS, PrimitiveVS, SetVS};
use vsched::{Guard, GuardContext, ValueSummary};

fn two_branch_vs(ctx: &GuardContext) -> (PrimitiveVS<i64>, Guard, Guard) {
    let v = ctx.fresh_var();
    let not_v = ctx.not(v);
    let vs = PrimitiveVS::from_entries(vec![(v, 1), (not_v, 2)], ctx);
    (vs, v, not_v)
}

fn sorted(mut entries: Vec<(Guard, i64)>) -> Vec<(Guard, i64)> {
    entries.sort_by_key(|(_, v)| *v);
    entries
}

#[test]
fn restrict_true_is_identity() {
    let ctx = GuardContext::new();
    let (vs, _, _) = two_branch_vs(&ctx);
    let restricted = vs.restrict(ctx.mk_true(), &ctx);
    assert_eq!(
        sorted(restricted.get_guarded_values(&ctx)),
        sorted(vs.get_guarded_values(&ctx))
    );
}

#[test]
fn restrict_false_is_empty() {
    let ctx = GuardContext::new();
    let (vs, _, _) = two_branch_vs(&ctx);
    let restricted = vs.restrict(ctx.mk_false(), &ctx);
    assert!(restricted.is_empty_vs(&ctx));
    assert!(restricted.get_guarded_values(&ctx).is_empty());
}

#[test]
fn restrict_composes_as_conjunction_of_guards() {
    let ctx = GuardContext::new();
    let (vs, v, _) = two_branch_vs(&ctx);
    let h = ctx.fresh_var();

    let composed = vs.restrict(v, &ctx).restrict(h, &ctx);
    let direct = vs.restrict(ctx.and(v, h), &ctx);

    assert_eq!(
        sorted(composed.get_guarded_values(&ctx)),
        sorted(direct.get_guarded_values(&ctx))
    );
}

#[test]
fn restrict_then_merge_complement_recovers_self() {
    let ctx = GuardContext::new();
    let (vs, v, not_v) = two_branch_vs(&ctx);

    let a = vs.restrict(v, &ctx);
    let b = vs.restrict(not_v, &ctx);
    let merged = PrimitiveVS::merge(vec![a, b], &ctx);

    assert_eq!(
        sorted(merged.get_guarded_values(&ctx)),
        sorted(vs.get_guarded_values(&ctx))
    );
}

#[test]
fn update_under_guard_matches_its_definition() {
    let ctx = GuardContext::new();
    let (vs, v, not_v) = two_branch_vs(&ctx);
    let update = PrimitiveVS::constant(99, &ctx);

    let updated = vs.update_under_guard(v, &update, &ctx);
    let expected = PrimitiveVS::merge(vec![vs.restrict(not_v, &ctx), update.restrict(v, &ctx)], &ctx);

    assert_eq!(
        sorted(updated.get_guarded_values(&ctx)),
        sorted(expected.get_guarded_values(&ctx))
    );
}

#[test]
fn symbolic_equals_self_holds_over_own_universe() {
    let ctx = GuardContext::new();
    let (vs, _, _) = two_branch_vs(&ctx);
    let eq = vs.symbolic_equals(&vs, ctx.mk_true(), &ctx);
    assert!(ctx.is_true(eq.guard_for(true, &ctx)));
}

#[test]
fn distinct_branches_are_not_equal_everywhere() {
    let ctx = GuardContext::new();
    let (vs, _, _) = two_branch_vs(&ctx);
    let other = PrimitiveVS::constant(1, &ctx);
    let eq = vs.symbolic_equals(&other, ctx.mk_true(), &ctx);
    // Equal exactly on the `v` branch, not on `not_v`.
    assert!(ctx.is_sat(eq.guard_for(true, &ctx)));
    assert!(!ctx.is_true(eq.guard_for(true, &ctx)));
}

#[test]
fn set_add_is_idempotent() {
    let ctx = GuardContext::new();
    let set: SetVS<PrimitiveVS<i64>> = SetVS::empty(&ctx);
    let seven = PrimitiveVS::constant(7, &ctx);

    let once = set.add(&seven, &ctx);
    let twice = once.add(&seven, &ctx);

    assert!(ctx.is_true(once.contains(&seven, &ctx).guard_for(true, &ctx)));
    assert_eq!(
        once.len().get_guarded_values(&ctx),
        twice.len().get_guarded_values(&ctx)
    );
}

#[test]
fn set_contains_is_false_before_adding() {
    let ctx = GuardContext::new();
    let set: SetVS<PrimitiveVS<i64>> = SetVS::empty(&ctx);
    let seven = PrimitiveVS::constant(7, &ctx);
    assert!(ctx.is_false(set.contains(&seven, &ctx).guard_for(true, &ctx)));
}

#[test]
fn list_get_after_add_returns_the_appended_value() {
    let ctx = GuardContext::new();
    let list: ListVS<PrimitiveVS<i64>> = ListVS::empty(&ctx);
    let list = list.add(&PrimitiveVS::constant(10, &ctx), &ctx);
    let list = list.add(&PrimitiveVS::constant(20, &ctx), &ctx);

    let last_index = PrimitiveVS::constant(1, &ctx);
    let got = list.get(&last_index, &ctx);
    assert_eq!(got.get_guarded_values(&ctx), vec![(ctx.mk_true(), 20)]);
    assert_eq!(list.size().get_guarded_values(&ctx), vec![(ctx.mk_true(), 2)]);
}
