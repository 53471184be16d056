//! The scheduler: the symbolic step loop of spec §4.4, nondeterministic
//! choice primitives (§4.3), backtracking/replay (§4.5), reduction filters
//! (§4.6), and the liveness check (§4.7). This is where the three spec
//! layers (guards, value summaries, machine runtime) meet.

mod choices;
mod order;
mod schedule;
mod stats;

pub use choices::Choices;
use choices::ScopedChoices;
pub use order::{IdentityOrder, InterleaveOrder, MessageOrder, ReceiverQueueOrder};
pub use schedule::{BacktrackFrame, ChoiceKind, ChoiceRecord, ChoiceValue, Schedule};
pub use stats::SearchStats;

use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

use crate::config::SchedulerConfig;
use crate::error::{EngineError, InvariantError, ModelError, ResourceFault, Result};
use crate::guard::{Guard, GuardContext};
use crate::ids::{ClassId, MachineId};
use crate::machine::{BufferKind, Machine, MachineArena, MachineHandle};
use crate::program::Program;
use crate::snapshot::{ConcreteMachineState, ConcreteWorldState};
use crate::value::{Message, PrimitiveVS, ValueSummary};

/// Outcome of a completed (or aborted) search (spec §6.4 exit codes,
/// mapped 1:1 onto the taxonomy of §7).
#[derive(Debug, Clone, PartialEq)]
pub enum SearchResult {
    /// No bug found; the search terminated because no machine was enabled
    /// on every live branch, or `maxStepBound` was reached.
    Ok,
    /// An assertion, model, or liveness failure (exit code 2).
    Bug(EngineError),
    /// Resource exhaustion (exit code 2, logged as timeout/memout).
    ResourceExhausted(ResourceFault),
}

/// Which [`SearchStats`] counter [`Scheduler::filter_by_order`] should
/// credit a pruned candidate to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PruneStat {
    Receiver,
    Interleave,
}

/// One candidate `(machine, guard)` pair under consideration this step,
/// together with the head message used to classify and order it.
#[derive(Clone)]
struct Candidate {
    id: MachineId,
    handle: MachineHandle,
    guard: Guard,
    head: Message,
}

/// Owns every piece of process-wide state a run touches: the solver
/// context, the machine arena, the choice log, and statistics (spec
/// §3.5). Threaded through as a single value rather than via globals
/// (design note, spec §9) — cloning a whole `Scheduler` (ctx included) is
/// how a parallel driver would isolate independent runs (spec §5).
pub struct Scheduler<P: Program> {
    ctx: GuardContext,
    program: P,
    config: SchedulerConfig,
    machines: MachineArena<Machine>,
    id_to_handle: HashMap<MachineId, MachineHandle>,
    class_counters: HashMap<ClassId, PrimitiveVS<i64>>,
    monitor_classes: HashSet<ClassId>,
    schedule: Schedule,
    stats: SearchStats,
    distinct_states: HashSet<u64>,
    step_depth: u64,
    /// Path condition under which at least one branch of the run is still
    /// being explored; steps outside it have already terminated
    /// (`executionFinished`) and are excluded from future candidate
    /// computation.
    live_guard: Guard,
    started_at: Instant,
    replaying: bool,
    replay_cursor: u64,
    receiver_order: ReceiverQueueOrder,
    interleave_order: InterleaveOrder,
}

impl<P: Program> Scheduler<P> {
    pub fn new(program: P, config: SchedulerConfig) -> Self {
        let ctx = GuardContext::new();
        let monitor_classes = program.monitor_classes().iter().copied().collect();
        let live_guard = ctx.mk_true();
        Self {
            ctx,
            program,
            config,
            machines: MachineArena::new(),
            id_to_handle: HashMap::new(),
            class_counters: HashMap::new(),
            monitor_classes,
            schedule: Schedule::new(),
            stats: SearchStats::new(),
            distinct_states: HashSet::new(),
            step_depth: 0,
            live_guard,
            started_at: Instant::now(),
            replaying: false,
            replay_cursor: 0,
            receiver_order: ReceiverQueueOrder,
            interleave_order: InterleaveOrder::new(),
        }
    }

    pub fn with_interleave_order(mut self, order: InterleaveOrder) -> Self {
        self.interleave_order = order;
        self
    }

    pub fn context(&self) -> &GuardContext {
        &self.ctx
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn stats(&self) -> SearchStats {
        let mut s = self.stats;
        s.guard_stats = self.ctx.stats();
        s.distinct_state_count = self.distinct_states.len() as u64;
        s
    }

    pub fn depth(&self) -> u64 {
        self.step_depth
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    pub fn machine(&self, id: MachineId) -> Option<&Machine> {
        let handle = *self.id_to_handle.get(&id)?;
        self.machines.get(handle)
    }

    // ---- §6.2 scheduler API / §4.3 nondeterministic choice ----------

    /// `getNextBoolean(pc)` (spec §4.3, §6.2). A single fresh boolean
    /// variable under `pc` — disjoint `true`/`false` branches that
    /// together exactly cover `pc`. Delegates to [`ScopedChoices`] so this
    /// call path and a [`Program`]'s mid-dispatch [`Choices::next_bool`]
    /// share one implementation.
    pub fn next_bool(&mut self, pc: Guard) -> PrimitiveVS<bool> {
        self.scoped_choices().next_bool(pc)
    }

    /// `getNextInteger(bound, pc)` (spec §4.3, §6.2).
    pub fn next_int(&mut self, bound: &PrimitiveVS<i64>, pc: Guard) -> PrimitiveVS<i64> {
        self.scoped_choices().next_int(bound, pc)
    }

    /// `getNextElement(container, pc)`: recurses through [`Self::next_int`]
    /// on the container's size (spec §4.3).
    pub fn next_element(&mut self, size: &PrimitiveVS<i64>, pc: Guard) -> PrimitiveVS<i64> {
        self.next_int(size, pc)
    }

    /// Borrows exactly the fields a choice needs, as disjoint fields of
    /// `self` rather than `&mut self` as a whole — lets [`Self::run_machine`]
    /// hold one of these alongside `&self.program` and `&mut self.machines`
    /// at the same time (spec §9 "threaded through ... rather than true
    /// process globals").
    fn scoped_choices(&mut self) -> ScopedChoices<'_> {
        ScopedChoices {
            ctx: &self.ctx,
            schedule: &mut self.schedule,
            replaying: &mut self.replaying,
            replay_cursor: &mut self.replay_cursor,
        }
    }

    /// `allocateMachine(pc, class, constructor)` (spec §6.2): mints a
    /// fresh `(class, instance)` identity per distinct branch of `pc`,
    /// bumping that class's symbolic allocation counter (spec §3.3) and
    /// registering a brand-new arena slot for each resulting identity —
    /// different branches that end up with different instance numbers are
    /// genuinely different [`Machine`] records, which is what lets two
    /// branches diverge on whether/how a machine was constructed. Runs
    /// [`Program::construct`] (the `constructor` argument) on each new
    /// record before it becomes visible to the rest of the scheduler.
    pub fn allocate_machine(&mut self, pc: Guard, class: ClassId) -> Result<PrimitiveVS<MachineId>> {
        let ctx = &self.ctx;

        let counter = self
            .class_counters
            .entry(class)
            .or_insert_with(|| PrimitiveVS::constant(0, ctx))
            .clone();

        let assigned = counter.restrict(pc, ctx);
        let bumped: Vec<(Guard, i64)> = assigned
            .get_guarded_values(ctx)
            .into_iter()
            .map(|(g, n)| (g, n + 1))
            .collect();
        let bumped_vs = PrimitiveVS::from_entries(bumped, ctx);
        let new_counter = counter.update_under_guard(pc, &bumped_vs, ctx);
        self.class_counters.insert(class, new_counter);

        let start_state = self.program.start_state(class);
        let buffer_kind = if self.config.use_bag_semantics() {
            BufferKind::Bag
        } else {
            self.program.buffer_kind(class)
        };
        let hot = self.program.hot_state(class);

        let mut ids = Vec::new();
        for (g, instance) in assigned.get_guarded_values(ctx) {
            let mid = MachineId {
                class,
                instance: instance as u32,
            };
            let mut machine = Machine::new(mid, buffer_kind, start_state, ctx);
            machine.set_hot_state(hot);
            let mut scoped = ScopedChoices {
                ctx,
                schedule: &mut self.schedule,
                replaying: &mut self.replaying,
                replay_cursor: &mut self.replay_cursor,
            };
            self.program.construct(&mut machine, ctx, &mut scoped)?;
            let handle = self.machines.insert(machine);
            self.id_to_handle.insert(mid, handle);
            ids.push((g, mid));
        }
        Ok(PrimitiveVS::from_entries(ids, ctx))
    }

    /// `announce(event, payload)` (spec §6.2): broadcasts to monitors only,
    /// bypassing the machine send buffer entirely.
    pub fn announce(&mut self, message: &Message) -> Result<()> {
        self.dispatch_to_monitors(message)
    }

    fn log_choice(&mut self, kind: ChoiceKind, fresh: Vec<(Guard, ChoiceValue)>) -> Vec<(Guard, ChoiceValue)> {
        choices::log_choice(&mut self.schedule, &mut self.replaying, &mut self.replay_cursor, kind, fresh)
    }

    // ---- §4.4 the step loop -------------------------------------------

    /// Runs the full search (spec §4.4: `initializeSearch → while not
    /// done: step`). Allocates the entry machine, then steps until either
    /// no candidate sender remains on any live branch, `maxStepBound` is
    /// reached, or a step reports a terminating error.
    pub fn do_search(&mut self) -> SearchResult {
        let start_class = self.program.start_class();
        let pc = self.ctx.mk_true();
        if let Err(e) = self.allocate_machine(pc, start_class) {
            return Self::classify_error(e);
        }

        // Tracks whether the loop exited because the run genuinely finished
        // executing (no enabled sender on any live branch) rather than
        // because `maxStepBound` cut it short — spec §4.7 only checks
        // liveness in the former case ("after every run that finished
        // executing"); spec §4.4 lists the bound as a *different*
        // termination reason.
        let mut finished_executing = false;

        loop {
            if let Some(bound) = self.config.max_step_bound {
                if self.step_depth >= bound {
                    break;
                }
            }
            if self.ctx.is_false(self.live_guard) {
                finished_executing = true;
                break;
            }
            match self.step() {
                Ok(true) => {
                    finished_executing = true;
                    break;
                }
                Ok(false) => continue,
                Err(e) => return Self::classify_error(e),
            }
        }

        if finished_executing {
            if let Err(e) = self.check_liveness() {
                return Self::classify_error(e);
            }
        }
        SearchResult::Ok
    }

    fn classify_error(e: EngineError) -> SearchResult {
        match e {
            EngineError::ResourceExhausted(fault) => SearchResult::ResourceExhausted(fault),
            other => SearchResult::Bug(other),
        }
    }

    /// One iteration of the loop body (spec §4.4). Returns `Ok(true)` if
    /// the search is finished (no candidate remained), `Ok(false)` to
    /// continue, or `Err` on a terminating fault.
    pub fn step(&mut self) -> Result<bool> {
        #[cfg(feature = "tracing")]
        let _span = tracing::info_span!("step", depth = self.step_depth).entered();

        self.check_resources()?;

        // 1. source-state capture
        if self.config.use_backtrack() && !self.schedule.has_frame(self.step_depth) {
            self.capture_backtrack_frame();
        }

        // 2. state caching
        let distinct_state_guard = if self.config.use_state_caching() {
            self.compute_distinct_state_guard()
        } else {
            self.live_guard
        };

        // 3. candidate-sender computation
        let (candidates, pre_sleep_union) = self.get_next_sender_choices(distinct_state_guard);

        let candidate_union = candidates
            .iter()
            .fold(self.ctx.mk_false(), |acc, c| self.ctx.or(acc, c.guard));

        // branches of `live_guard` with no candidate at all have finished
        let finished_guard = self.ctx.and_not(self.live_guard, pre_sleep_union);
        #[cfg(feature = "tracing")]
        if self.ctx.is_sat(finished_guard) {
            tracing::debug!("branch finished under guard {finished_guard:?}");
        }

        if candidates.is_empty() {
            self.live_guard = self.ctx.mk_false();
            self.stats.record_step(self.step_depth);
            return Ok(true);
        }

        // 4. sender pick
        let sender_choice: Vec<(Guard, ChoiceValue)> = candidates
            .iter()
            .map(|c| (c.guard, ChoiceValue::Sender(c.id)))
            .collect();
        let chosen = self.log_choice(ChoiceKind::Sender, sender_choice);

        // 5. dequeue & deliver
        let mut dequeued = Vec::with_capacity(chosen.len());
        for (g, v) in &chosen {
            let ChoiceValue::Sender(id) = v else { continue };
            let candidate = candidates.iter().find(|c| c.id == *id);
            let Some(candidate) = candidate else { continue };
            let handle = candidate.handle;

            if self.config.use_sleep_sets() {
                self.schedule.add_to_sleep_set(self.step_depth, *id);
            }

            let message = self.dequeue_head(handle, *g)?;
            dequeued.push(message.restrict(*g, &self.ctx));
        }
        let message = Message::merge(dequeued, &self.ctx);

        // 6. effect: monitors, then targets
        self.dispatch_to_monitors(&message)?;
        self.dispatch_to_targets(&message)?;

        // 7. bookkeeping
        self.live_guard = candidate_union;
        self.stats.event_count += 1;
        self.stats.record_step(self.step_depth);
        self.step_depth += 1;

        Ok(false)
    }

    fn dequeue_head(&mut self, handle: MachineHandle, g: Guard) -> Result<Message> {
        let (kind, size) = {
            let machine = self
                .machines
                .get(handle)
                .ok_or_else(|| EngineError::from(InvariantError::OverlappingGuards))?;
            (machine.buffer().kind(), machine.buffer().messages().size().clone())
        };

        let idx = match kind {
            BufferKind::Queue => {
                let machine = self.machines.get(handle).unwrap();
                machine.buffer().queue_head_index(&self.ctx)
            }
            BufferKind::Bag => self.next_element(&size, g),
        };
        let idx = idx.restrict(g, &self.ctx);

        let machine = self.machines.get_mut(handle).unwrap();
        let (new_buffer, msg) = machine.buffer().dequeue_at(&idx, &self.ctx);
        *machine.buffer_mut() = new_buffer;
        machine.tick_clock(g, &self.ctx);
        Ok(msg)
    }

    fn dispatch_to_monitors(&mut self, message: &Message) -> Result<()> {
        let events = message.event().get_guarded_values(&self.ctx);
        for (g, event) in events {
            if !self.ctx.is_sat(g) {
                continue;
            }
            let classes: Vec<ClassId> = self.program.listeners(event).to_vec();
            for class in classes {
                let Some(&handle) = self.monitor_handle_for(class) else {
                    continue;
                };
                self.run_machine(handle, g, message)?;
            }
        }
        Ok(())
    }

    fn dispatch_to_targets(&mut self, message: &Message) -> Result<()> {
        let targets = message.target().get_guarded_values(&self.ctx);
        for (g, target_id) in targets {
            if !self.ctx.is_sat(g) {
                continue;
            }
            let Some(&handle) = self.id_to_handle.get(&target_id) else {
                continue;
            };
            let halted_guard = self
                .machines
                .get(handle)
                .map(|m| m.has_halted().guard_for(true, &self.ctx))
                .unwrap_or_else(|| self.ctx.mk_false());
            let not_halted = self.ctx.not(halted_guard);
            let g = self.ctx.and(g, not_halted);
            if self.ctx.is_sat(g) {
                self.run_machine(handle, g, message)?;
            }
        }
        Ok(())
    }

    fn run_machine(&mut self, handle: MachineHandle, g: Guard, message: &Message) -> Result<()> {
        let max_internal = self.config.max_internal_steps;
        let mut scoped = ScopedChoices {
            ctx: &self.ctx,
            schedule: &mut self.schedule,
            replaying: &mut self.replaying,
            replay_cursor: &mut self.replay_cursor,
        };
        let machine = self
            .machines
            .get_mut(handle)
            .expect("handle minted by this scheduler must resolve");
        self.program
            .process_event_to_completion(machine, g, message, max_internal, &self.ctx, &mut scoped)
    }

    fn monitor_handle_for(&self, class: ClassId) -> Option<&MachineHandle> {
        if !self.monitor_classes.contains(&class) {
            return None;
        }
        self.id_to_handle
            .iter()
            .find(|(id, _)| id.class == class)
            .map(|(_, h)| h)
    }

    // ---- §4.4 step 3: candidate-sender computation ---------------------

    fn get_next_sender_choices(&mut self, distinct_state_guard: Guard) -> (Vec<Candidate>, Guard) {
        self.purge_halted_targets();

        let ctx = &self.ctx;

        let live: Vec<(MachineId, MachineHandle)> = self
            .machines
            .iter()
            .map(|(h, m)| (m.id(), h))
            .filter(|(id, _)| !self.monitor_classes.contains(&id.class))
            .collect();

        let mut create = Vec::new();
        let mut sync = Vec::new();
        let mut general = Vec::new();

        for (id, handle) in live {
            let machine = self.machines.get(handle).unwrap();
            let not_empty = ctx.not(machine.buffer().is_empty(ctx).guard_for(true, ctx));
            let not_halted = ctx.not(machine.has_halted().guard_for(true, ctx));
            let enabled = ctx.and(ctx.and(not_empty, not_halted), self.live_guard);
            if ctx.is_false(enabled) {
                continue;
            }

            let head = machine.buffer().head_message(ctx);
            let create_guard = Self::classify(&head, ctx, |tag| self.program.is_create_event(tag));
            let create_guard = ctx.and(create_guard, enabled);
            let sync_guard = Self::classify(&head, ctx, |tag| self.program.is_sync_event(tag));
            let sync_guard = ctx.and(ctx.and_not(sync_guard, create_guard), enabled);
            let general_guard = ctx.and_not(ctx.and_not(enabled, create_guard), sync_guard);

            if ctx.is_sat(create_guard) {
                create.push(Candidate {
                    id,
                    handle,
                    guard: create_guard,
                    head: head.clone(),
                });
            }
            if ctx.is_sat(sync_guard) {
                sync.push(Candidate {
                    id,
                    handle,
                    guard: sync_guard,
                    head: head.clone(),
                });
            }
            if ctx.is_sat(general_guard) {
                general.push(Candidate {
                    id,
                    handle,
                    guard: general_guard,
                    head,
                });
            }
        }

        let create_mask = create.iter().fold(ctx.mk_false(), |acc, c| ctx.or(acc, c.guard));
        let sync_mask = sync.iter().fold(ctx.mk_false(), |acc, c| ctx.or(acc, c.guard));

        if !create.is_empty() {
            self.stats.create_step_count += 1;
        }
        if !sync.is_empty() {
            self.stats.sync_step_count += 1;
        }

        // general candidates only apply outside the create/sync masks
        for c in general.iter_mut() {
            c.guard = ctx.and_not(ctx.and_not(c.guard, create_mask), sync_mask);
        }
        general.retain(|c| ctx.is_sat(c.guard));

        let pre_sleep_union = create
            .iter()
            .chain(sync.iter())
            .chain(general.iter())
            .fold(ctx.mk_false(), |acc, c| ctx.or(acc, c.guard));

        let mut candidates = create;
        candidates.extend(sync);
        candidates.extend(self.apply_reductions(general, distinct_state_guard));

        (candidates, pre_sleep_union)
    }

    fn classify(head: &Message, ctx: &GuardContext, pred: impl Fn(crate::ids::EventTag) -> bool) -> Guard {
        head.event()
            .get_guarded_values(ctx)
            .into_iter()
            .filter(|(_, tag)| pred(*tag))
            .fold(ctx.mk_false(), |acc, (g, _)| ctx.or(acc, g))
    }

    /// Applies the optional receiver-queue, interleave, state-cache, and
    /// sleep-set filters to the general-case candidates (spec §4.4 steps
    /// e–h), in that order.
    fn apply_reductions(&mut self, mut candidates: Vec<Candidate>, distinct_state_guard: Guard) -> Vec<Candidate> {
        if self.config.use_receiver_queue_semantics() {
            candidates = self.filter_by_order(candidates, Self::order_kind_receiver, PruneStat::Receiver);
        }
        if self.config.use_filters() {
            candidates = self.filter_by_order(candidates, Self::order_kind_interleave, PruneStat::Interleave);
        }

        if self.config.use_state_caching() {
            let ctx = &self.ctx;
            for c in candidates.iter_mut() {
                c.guard = ctx.and(c.guard, distinct_state_guard);
            }
            candidates.retain(|c| ctx.is_sat(c.guard));
        }

        if self.config.use_sleep_sets() {
            if let Some(sleeping) = self.schedule.sleep_set(self.step_depth).cloned() {
                let before = candidates.len();
                candidates.retain(|c| !sleeping.contains(&c.id));
                self.stats.sleep_set_pruned += (before - candidates.len()) as u64;
            }
        }

        candidates
    }

    fn order_kind_receiver(&self) -> &dyn MessageOrder {
        &self.receiver_order
    }

    fn order_kind_interleave(&self) -> &dyn MessageOrder {
        &self.interleave_order
    }

    /// Shared core of the receiver-queue and interleave filters: for every
    /// ordered pair `(i, j)`, drop `j`'s guard wherever `order.lessThan(i,
    /// j)` holds (spec §4.4 step e/f).
    fn filter_by_order(
        &mut self,
        mut candidates: Vec<Candidate>,
        order_of: impl Fn(&Self) -> &dyn MessageOrder,
        stat: PruneStat,
    ) -> Vec<Candidate> {
        let n = candidates.len();
        for i in 0..n {
            for j in 0..n {
                if i == j {
                    continue;
                }
                let lt_guard = {
                    let order = order_of(self);
                    order
                        .less_than(
                            &candidates[i].head,
                            candidates[i].id,
                            &candidates[j].head,
                            candidates[j].id,
                            &self.ctx,
                        )
                        .guard_for(true, &self.ctx)
                };
                let before = candidates[j].guard;
                candidates[j].guard = self.ctx.and_not(candidates[j].guard, lt_guard);
                if self.ctx.is_sat(before) && !self.ctx.is_sat(candidates[j].guard) {
                    match stat {
                        PruneStat::Receiver => self.stats.receiver_order_pruned += 1,
                        PruneStat::Interleave => self.stats.interleave_pruned += 1,
                    }
                }
            }
        }
        let ctx = &self.ctx;
        candidates.retain(|c| ctx.is_sat(c.guard));
        candidates
    }

    /// Drops any head message already targeting a halted machine,
    /// repeatedly, for every machine with a [`BufferKind::Queue`] buffer
    /// (spec §4.4 step 3c). [`BufferKind::Bag`] buffers are left as-is —
    /// bag heads aren't a single fixed index to drop, and
    /// [`Self::dispatch_to_targets`] already refuses to deliver to a
    /// halted target regardless, so a stale bag entry is inert rather
    /// than wrong.
    fn purge_halted_targets(&mut self) {
        let ctx = &self.ctx;

        let handles: Vec<MachineHandle> = self.machines.iter().map(|(h, _)| h).collect();
        const MAX_PURGE_ITERS: usize = 16;

        for handle in handles {
            for _ in 0..MAX_PURGE_ITERS {
                let (kind, head) = {
                    let m = self.machines.get(handle).unwrap();
                    (m.buffer().kind(), m.buffer().head_message(ctx))
                };
                if kind != BufferKind::Queue {
                    break;
                }

                let mut drop_guard = ctx.mk_false();
                for (g, target_id) in head.target().get_guarded_values(ctx) {
                    if let Some(&target_handle) = self.id_to_handle.get(&target_id) {
                        if let Some(target_machine) = self.machines.get(target_handle) {
                            let halted_g = target_machine.has_halted().guard_for(true, ctx);
                            drop_guard = ctx.or(drop_guard, ctx.and(g, halted_g));
                        }
                    }
                }
                if !ctx.is_sat(drop_guard) {
                    break;
                }

                let m = self.machines.get(handle).unwrap();
                let idx = m.buffer().queue_head_index(ctx).restrict(drop_guard, ctx);
                let (new_buffer, _dropped) = m.buffer().dequeue_at(&idx, ctx);
                self.machines.get_mut(handle).unwrap().buffer_mut().clone_from(&new_buffer);
            }
        }
    }

    // ---- §4.4 step 2: state caching -------------------------------------

    /// Concretizes the symbolic source state one satisfying assignment at
    /// a time, hashing each and remembering the guard under which a *new*
    /// concrete state was found (spec §4.4 step 2). Machine order is the
    /// arena's stable insertion order (spec §5), so the same symbolic
    /// state concretizes to the same digest across runs.
    fn compute_distinct_state_guard(&mut self) -> Guard {
        let ctx = &self.ctx;

        let per_machine: Vec<Vec<(Guard, ConcreteMachineState)>> = self
            .machines
            .iter()
            .map(|(_, m)| Self::concretize_machine(m, ctx))
            .collect();

        let combos = crate::value::cartesian(&per_machine, ctx);

        let mut new_guard = ctx.mk_false();
        for (g, machines) in combos {
            let g = ctx.and(g, self.live_guard);
            if !ctx.is_sat(g) {
                continue;
            }
            let state = ConcreteWorldState::new(machines);
            let digest = state.digest();
            if self.distinct_states.insert(digest) {
                new_guard = ctx.or(new_guard, g);
            }
        }
        new_guard
    }

    fn concretize_machine(m: &Machine, ctx: &GuardContext) -> Vec<(Guard, ConcreteMachineState)> {
        let local_dims: Vec<Vec<(Guard, crate::value::DynConcrete)>> =
            m.local_state().iter().map(|v| v.get_guarded_values(ctx)).collect();
        let local_combos = crate::value::cartesian(&local_dims, ctx);

        let pending = m.buffer().messages().get_guarded_values(ctx);
        let current_states = m.current_state().get_guarded_values(ctx);
        let halted = m.has_halted().get_guarded_values(ctx);

        let mut out = Vec::new();
        for (g1, local_state) in &local_combos {
            for (g2, pending_v) in &pending {
                let g12 = ctx.and(*g1, *g2);
                if !ctx.is_sat(g12) {
                    continue;
                }
                for (g3, current_state) in &current_states {
                    let g123 = ctx.and(g12, *g3);
                    if !ctx.is_sat(g123) {
                        continue;
                    }
                    for (g4, halted_v) in &halted {
                        let g = ctx.and(g123, *g4);
                        if ctx.is_sat(g) {
                            out.push((
                                g,
                                ConcreteMachineState {
                                    id: m.id(),
                                    class: m.class(),
                                    local_state: local_state.clone(),
                                    pending: pending_v.clone(),
                                    current_state: *current_state,
                                    halted: *halted_v,
                                },
                            ));
                        }
                    }
                }
            }
        }
        out
    }

    // ---- §4.5 backtracking & replay -------------------------------------

    fn capture_backtrack_frame(&mut self) {
        let machines: Vec<(MachineHandle, Machine)> =
            self.machines.iter().map(|(h, m)| (h, m.clone())).collect();
        let counters = self.class_counters.clone();
        self.schedule
            .set_frame(self.step_depth, BacktrackFrame { machines, counters });
    }

    /// `restoreState(frame)` (spec §4.5): restores local state field-by-
    /// field from the snapshot at `depth`, resets any machine absent from
    /// it, restores `machineCounters` verbatim, and discards the choice
    /// log tail so exploration from `depth` starts fresh (S6).
    pub fn restore_state(&mut self, depth: u64) -> bool {
        let Some(frame) = self.schedule.frame(depth).cloned() else {
            return false;
        };

        let present: HashSet<MachineHandle> = frame.machines.iter().map(|(h, _)| *h).collect();
        let handles: Vec<MachineHandle> = self.machines.iter().map(|(h, _)| h).collect();
        for h in handles {
            if !present.contains(&h) {
                let start_state = self
                    .machines
                    .get(h)
                    .map(|m| self.program.start_state(m.class()));
                if let (Some(m), Some(start)) = (self.machines.get_mut(h), start_state) {
                    m.reset(start, &self.ctx);
                }
            }
        }
        for (h, snapshot) in frame.machines {
            if let Some(m) = self.machines.get_mut(h) {
                *m = snapshot;
            }
        }
        self.class_counters = frame.counters;
        self.step_depth = depth;
        self.schedule.truncate(depth);
        self.live_guard = self.ctx.mk_true();
        self.stats.backtrack_count += 1;
        true
    }

    /// Replay mode (spec §4.5): walks the schedule from index 0,
    /// constraining every nondeterministic choice to the VS already
    /// recorded there rather than allocating fresh variables, until the
    /// recorded log is exhausted (at which point stepping continues
    /// normally). Used by testable property 9 (determinism of replay).
    pub fn begin_replay(&mut self) {
        self.replaying = true;
        self.replay_cursor = 0;
    }

    // ---- §4.7 liveness check ---------------------------------------------

    /// After a run finishes executing (no more enabled senders), checks
    /// every monitor's current state VS: a hot state occupied under any
    /// satisfiable guard is a liveness violation (spec §4.7).
    pub fn check_liveness(&self) -> Result<()> {
        let ctx = &self.ctx;

        for &class in &self.monitor_classes {
            let Some(&handle) = self.monitor_handle_for(class) else {
                continue;
            };
            let Some(machine) = self.machines.get(handle) else {
                continue;
            };
            let hot_guard = machine.is_hot(ctx).guard_for(true, ctx);
            if ctx.is_sat(hot_guard) {
                let state_name = machine
                    .hot_state()
                    .map(|s| format!("state#{}", s.0))
                    .unwrap_or_else(|| "hot state".to_string());
                #[cfg(feature = "tracing")]
                tracing::error!(%state_name, "hot state occupied at end of execution");
                return Err(EngineError::Liveness {
                    monitor_state: state_name,
                    guard: hot_guard,
                });
            }
        }
        Ok(())
    }

    // ---- §5 resource caps --------------------------------------------------

    fn check_resources(&self) -> Result<()> {
        if self.config.time_limit_secs > 0 {
            let elapsed = self.started_at.elapsed();
            if elapsed >= Duration::from_secs(self.config.time_limit_secs) {
                #[cfg(feature = "tracing")]
                tracing::error!(elapsed_secs = elapsed.as_secs(), "time limit exceeded");
                return Err(EngineError::from(ResourceFault::Timeout {
                    elapsed_secs: elapsed.as_secs(),
                    limit_secs: self.config.time_limit_secs,
                }));
            }
        }

        if self.config.mem_limit_mb > 0 {
            let used_mb = (self.ctx.approx_memory_bytes() / (1024 * 1024)) as u64;
            if used_mb >= self.config.mem_limit_mb {
                #[cfg(feature = "tracing")]
                tracing::error!(used_mb, limit_mb = self.config.mem_limit_mb, "memory limit exceeded");
                return Err(EngineError::from(ResourceFault::Memout {
                    used_mb,
                    limit_mb: self.config.mem_limit_mb,
                }));
            }
            if used_mb * 100 >= self.config.mem_limit_mb * 80 {
                #[cfg(feature = "tracing")]
                tracing::debug!(used_mb, limit_mb = self.config.mem_limit_mb, "above 80% of memory limit, shrinking solver caches");
                self.ctx.shrink_caches();
            }
        }
        Ok(())
    }

    /// Reports a program-level model error (spec §7: bad index/key/
    /// payload — a program assertion failure, not an engine fault).
    pub fn model_error(&self, error: ModelError) -> Result<()> {
        Err(EngineError::from(error))
    }
}

/// Incrementally constructs a [`Scheduler`]: `.with_program(..)`, optional
/// `.with_config(..)`/`.with_interleave_order(..)`, then `.build()`.
pub struct SchedulerBuilder<P: Program> {
    program: Option<P>,
    config: SchedulerConfig,
    interleave_order: Option<InterleaveOrder>,
}

impl<P: Program> SchedulerBuilder<P> {
    pub fn new() -> Self {
        Self {
            program: None,
            config: SchedulerConfig::default(),
            interleave_order: None,
        }
    }

    pub fn with_program(mut self, program: P) -> Self {
        self.program = Some(program);
        self
    }

    pub fn with_config(mut self, config: SchedulerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_interleave_order(mut self, order: InterleaveOrder) -> Self {
        self.interleave_order = Some(order);
        self
    }

    /// Builds the scheduler. Panics if [`Self::with_program`] was never
    /// called — a scheduler without a program has nothing to drive.
    pub fn build(self) -> Scheduler<P> {
        let program = self.program.expect("SchedulerBuilder::build called without with_program");
        let scheduler = Scheduler::new(program, self.config);
        match self.interleave_order {
            Some(order) => scheduler.with_interleave_order(order),
            None => scheduler,
        }
    }
}

impl<P: Program> Default for SchedulerBuilder<P> {
    fn default() -> Self {
        Self::new()
    }
}
