use criterion::{criterion_group, criterion_main, Criterion};
use vsched::guard::GuardContext;
use vsched::value::{PrimitiveVS, ValueSummary};

/// Builds an `n`-way guarded `PrimitiveVS<i64>` by forking a fresh boolean
/// per entry, mirroring how the scheduler's own `next_int` grows a VS one
/// nondeterministic choice at a time.
fn forked_vs(n: u32, ctx: &GuardContext) -> PrimitiveVS<i64> {
    let mut entries = Vec::with_capacity(n as usize);
    let mut remaining = ctx.mk_true();
    for i in 0..n {
        if i == n - 1 {
            entries.push((remaining, i as i64));
            break;
        }
        let var = ctx.fresh_var();
        let g = ctx.and(remaining, var);
        entries.push((g, i as i64));
        remaining = ctx.and(remaining, ctx.not(var));
    }
    PrimitiveVS::from_entries(entries, ctx)
}

fn bench_restrict(c: &mut Criterion) {
    let mut group = c.benchmark_group("value_summary_restrict");
    for &width in &[8u32, 32, 128] {
        group.bench_function(format!("width_{width}"), |b| {
            let ctx = GuardContext::new();
            let vs = forked_vs(width, &ctx);
            let g = ctx.fresh_var();
            b.iter(|| vs.restrict(g, &ctx))
        });
    }
    group.finish();
}

fn bench_merge(c: &mut Criterion) {
    let mut group = c.benchmark_group("value_summary_merge");
    for &width in &[8u32, 32, 128] {
        group.bench_function(format!("width_{width}"), |b| {
            let ctx = GuardContext::new();
            let left = forked_vs(width, &ctx);
            let split = ctx.fresh_var();
            let a = left.restrict(split, &ctx);
            let b_vs = left.restrict(ctx.not(split), &ctx);
            b.iter(|| PrimitiveVS::merge(vec![a.clone(), b_vs.clone()], &ctx))
        });
    }
    group.finish();
}

fn bench_update_under_guard(c: &mut Criterion) {
    let mut group = c.benchmark_group("value_summary_update_under_guard");
    for &width in &[8u32, 32, 128] {
        group.bench_function(format!("width_{width}"), |b| {
            let ctx = GuardContext::new();
            let base = forked_vs(width, &ctx);
            let update = PrimitiveVS::constant(-1, &ctx);
            let g = ctx.fresh_var();
            b.iter(|| base.update_under_guard(g, &update, &ctx))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_restrict, bench_merge, bench_update_under_guard);
criterion_main!(benches);
