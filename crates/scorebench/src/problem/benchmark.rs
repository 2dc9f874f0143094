//! Generic benchmark problem state machine.

use std::fmt;
use std::marker::PhantomData;
use std::mem;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use scorebench_config::{DEFAULT_MOVE_PROBE_LIMIT, DEFAULT_UNDO_PROBABILITY};
use scorebench_core::PlanningSolution;
use scorebench_scoring::{
    ConstraintMatchTotal, ScoreDirector, ScoreDirectorFactory, ScoreDirectorFlags,
};

use super::traits::{InvocationKind, IterationSummary, LifecyclePhase, Problem};
use crate::blackhole::Blackhole;
use crate::error::{BenchmarkError, Result};
use crate::heuristic::{ChangeMove, Move, MoveSampler, MoveSelection};
use crate::scope::{IterationScope, LifecycleListener, StepScope};

// Undo decisions use their own ChaCha stream of the problem seed.
const UNDO_STREAM: u64 = 1;

/// The value an invocation reports.
pub enum InvocationOutcome<S: PlanningSolution> {
    /// The move was undone; holds the move that would redo it.
    Undone(ChangeMove<S>),

    /// The move was kept; holds the recalculated score.
    Kept(S::Score),
}

impl<S: PlanningSolution> InvocationOutcome<S> {
    pub fn kind(&self) -> InvocationKind {
        match self {
            InvocationOutcome::Undone(_) => InvocationKind::Undone,
            InvocationOutcome::Kept(_) => InvocationKind::Kept,
        }
    }
}

impl<S: PlanningSolution> fmt::Debug for InvocationOutcome<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvocationOutcome::Undone(redo) => f.debug_tuple("Undone").field(redo).finish(),
            InvocationOutcome::Kept(score) => f.debug_tuple("Kept").field(score).finish(),
        }
    }
}

impl<S: PlanningSolution> PartialEq for InvocationOutcome<S> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (InvocationOutcome::Undone(a), InvocationOutcome::Undone(b)) => a == b,
            (InvocationOutcome::Kept(a), InvocationOutcome::Kept(b)) => a == b,
            _ => false,
        }
    }
}

// Owns the iteration's director and closes it when dropped, unwinding included.
struct DirectorGuard<S: PlanningSolution, D: ScoreDirector<S>> {
    director: D,
    _phantom: PhantomData<fn() -> S>,
}

impl<S: PlanningSolution, D: ScoreDirector<S>> DirectorGuard<S, D> {
    fn new(director: D) -> Self {
        Self {
            director,
            _phantom: PhantomData,
        }
    }
}

impl<S: PlanningSolution, D: ScoreDirector<S>> Drop for DirectorGuard<S, D> {
    fn drop(&mut self) {
        if !self.director.is_closed() {
            self.director.close();
        }
    }
}

enum InvocationStage<S> {
    Ready,
    Pending {
        candidate: ChangeMove<S>,
        will_undo: bool,
    },
    Ran {
        kept: bool,
    },
}

struct IterationState<S: PlanningSolution, D: ScoreDirector<S>> {
    guard: DirectorGuard<S, D>,
    scope: IterationScope,
    step: Option<StepScope>,
    stage: InvocationStage<S>,
    undo_rng: ChaCha8Rng,
    baseline_score: S::Score,
}

/// A simulated local search over one problem instance and one score director type.
///
/// Written once for every solution type: the factory `F` decides which score
/// director is benchmarked. Each iteration works on a fresh clone of the
/// original solution, which itself is never mutated.
///
/// # Type Parameters
///
/// * `S` - The planning solution type
/// * `F` - The score director factory
pub struct BenchmarkProblem<S, F>
where
    S: PlanningSolution,
    F: ScoreDirectorFactory<S>,
{
    name: String,
    factory: F,
    original_solution: S,
    flags: ScoreDirectorFlags,
    undo_probability: f64,
    seed: u64,
    move_probe_limit: usize,
    listeners: Vec<Box<dyn LifecycleListener>>,
    sampler: Option<MoveSampler<S>>,
    iteration: Option<IterationState<S, F::Director>>,
    iterations_started: u64,
}

impl<S, F> BenchmarkProblem<S, F>
where
    S: PlanningSolution,
    F: ScoreDirectorFactory<S>,
{
    /// Creates a problem with seed 0, the default undo probability and
    /// default director flags.
    pub fn new(name: impl Into<String>, factory: F, original_solution: S) -> Self {
        Self {
            name: name.into(),
            factory,
            original_solution,
            flags: ScoreDirectorFlags::default(),
            undo_probability: DEFAULT_UNDO_PROBABILITY,
            seed: 0,
            move_probe_limit: DEFAULT_MOVE_PROBE_LIMIT,
            listeners: Vec::new(),
            sampler: None,
            iteration: None,
            iterations_started: 0,
        }
    }

    pub fn with_flags(mut self, flags: ScoreDirectorFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Sets the seed both random streams are reset to at every iteration start.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_move_probe_limit(mut self, limit: usize) -> Self {
        self.move_probe_limit = limit;
        self
    }

    /// Sets the probability that an invocation undoes its move.
    ///
    /// # Errors
    ///
    /// `InvalidSetting` unless `probability` lies within `[0.0, 1.0]`.
    pub fn with_undo_probability(mut self, probability: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&probability) {
            return Err(BenchmarkError::InvalidSetting(format!(
                "undo probability must be within [0.0, 1.0], got {probability}"
            )));
        }
        self.undo_probability = probability;
        Ok(self)
    }

    /// Adds a listener notified after the move sampler.
    pub fn with_listener(mut self, listener: impl LifecycleListener + 'static) -> Self {
        self.listeners.push(Box::new(listener));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn undo_probability(&self) -> f64 {
        self.undo_probability
    }

    pub fn original_solution(&self) -> &S {
        &self.original_solution
    }

    pub fn phase(&self) -> LifecyclePhase {
        if self.iteration.is_some() {
            LifecyclePhase::IterationActive
        } else if self.sampler.is_some() {
            LifecyclePhase::TrialActive
        } else {
            LifecyclePhase::Idle
        }
    }

    /// Returns true if a step is open in the current iteration.
    pub fn is_step_open(&self) -> bool {
        self.iteration
            .as_ref()
            .is_some_and(|state| state.step.is_some())
    }

    /// Returns the score of the fresh clone the current iteration started from.
    pub fn baseline_score(&self) -> Option<S::Score> {
        self.iteration.as_ref().map(|state| state.baseline_score)
    }

    /// Calculates the score of the current working solution.
    pub fn working_score(&mut self) -> Option<S::Score> {
        self.iteration
            .as_mut()
            .map(|state| state.guard.director.calculate_score())
    }

    pub fn working_solution(&self) -> Option<&S> {
        self.iteration
            .as_ref()
            .map(|state| state.guard.director.working_solution())
    }

    /// Returns per-constraint totals if the director tracks constraint matches.
    pub fn constraint_match_totals(&self) -> Option<Vec<ConstraintMatchTotal<S::Score>>> {
        self.iteration
            .as_ref()
            .and_then(|state| state.guard.director.constraint_match_totals())
    }

    pub fn iteration_scope(&self) -> Option<&IterationScope> {
        self.iteration.as_ref().map(|state| &state.scope)
    }

    /// Builds the move sampler over the solution descriptor.
    ///
    /// # Errors
    ///
    /// `NoSelectableMoves` if the descriptor declares no genuine variable.
    ///
    /// # Panics
    ///
    /// If a trial is already active.
    pub fn setup_trial(&mut self) -> Result<()> {
        if self.sampler.is_some() {
            panic!(
                "setup_trial() called on {} while a trial is active; call tear_down_trial() first",
                self.name
            );
        }
        let sampler =
            MoveSampler::new(self.factory.solution_descriptor(), self.move_probe_limit)?;

        info!(
            event = "trial_start",
            problem = %self.name,
            seed = self.seed,
            move_families = sampler.family_count(),
            undo_probability = self.undo_probability,
        );

        self.sampler = Some(sampler);
        self.iterations_started = 0;
        notify(&mut self.sampler, &mut self.listeners, |l| l.trial_started());
        Ok(())
    }

    /// Builds a fresh director on a clone of the original solution and
    /// calculates its baseline score.
    ///
    /// # Panics
    ///
    /// Outside a trial, or if an iteration is already active.
    pub fn setup_iteration(&mut self) {
        if self.sampler.is_none() {
            panic!(
                "setup_iteration() called on {} before setup_trial()",
                self.name
            );
        }
        if let Some(state) = &self.iteration {
            panic!(
                "setup_iteration() called on {} while iteration {} is active",
                self.name,
                state.scope.iteration_index()
            );
        }

        let mut director = self.factory.build_score_director(self.flags);
        let working_solution = director.clone_solution(&self.original_solution);
        director.set_working_solution(working_solution);
        director.trigger_variable_listeners();
        let baseline_score = director.calculate_score();

        let scope = IterationScope::new(self.iterations_started, self.seed);
        self.iterations_started += 1;
        let mut undo_rng = ChaCha8Rng::seed_from_u64(self.seed);
        undo_rng.set_stream(UNDO_STREAM);

        debug!(
            event = "iteration_start",
            problem = %self.name,
            iteration_index = scope.iteration_index(),
            baseline_score = %baseline_score,
        );
        notify(&mut self.sampler, &mut self.listeners, |l| {
            l.iteration_started(&scope)
        });

        self.iteration = Some(IterationState {
            guard: DirectorGuard::new(director),
            scope,
            step: None,
            stage: InvocationStage::Ready,
            undo_rng,
            baseline_score,
        });
    }

    /// Opens a step if none is open, draws the undo decision and samples the
    /// next doable move.
    ///
    /// # Errors
    ///
    /// `MoveExhaustion` if the sampler spent its probe budget. The step stays
    /// open and is force-closed by `tear_down_iteration`.
    ///
    /// # Panics
    ///
    /// Outside an iteration, or before the previous invocation was torn down.
    pub fn setup_invocation(&mut self) -> Result<()> {
        let Self {
            name,
            sampler,
            listeners,
            iteration,
            undo_probability,
            ..
        } = self;
        let Some(state) = iteration.as_mut() else {
            panic!("setup_invocation() called on {name} outside an iteration; call setup_iteration() first");
        };
        if !matches!(state.stage, InvocationStage::Ready) {
            panic!("setup_invocation() called on {name} before the previous invocation was torn down");
        }

        if state.step.is_none() {
            let step = state.scope.open_step();
            notify(sampler, listeners, |l| l.step_started(&step));
            state.step = Some(step);
        }

        let will_undo = state.undo_rng.random_bool(*undo_probability);

        let Some(move_sampler) = sampler.as_mut() else {
            unreachable!("an active iteration implies an active trial");
        };
        match move_sampler.next_doable(&state.guard.director) {
            MoveSelection::Doable(candidate) => {
                state.stage = InvocationStage::Pending {
                    candidate,
                    will_undo,
                };
                Ok(())
            }
            MoveSelection::Exhausted { probes } => Err(BenchmarkError::MoveExhaustion { probes }),
        }
    }

    /// Applies the pending move and recalculates the score.
    ///
    /// If the move is undone, the recalculated score goes to `blackhole` and
    /// the undo's inverse is returned. Otherwise the undo move goes to
    /// `blackhole` and the score is returned.
    ///
    /// # Panics
    ///
    /// If no move is pending.
    pub fn run_invocation(&mut self, blackhole: &mut Blackhole) -> InvocationOutcome<S> {
        let Some(state) = self.iteration.as_mut() else {
            panic!(
                "run_invocation() called on {} outside an iteration",
                self.name
            );
        };
        let InvocationStage::Pending {
            candidate,
            will_undo,
        } = mem::replace(&mut state.stage, InvocationStage::Ready)
        else {
            panic!(
                "run_invocation() called on {} without a pending move; call setup_invocation() first",
                self.name
            );
        };

        let director = &mut state.guard.director;
        let undo = candidate.do_move(director);
        let outcome = if will_undo {
            blackhole.consume(director.calculate_score());
            InvocationOutcome::Undone(undo.do_move(director))
        } else {
            blackhole.consume(undo);
            InvocationOutcome::Kept(director.calculate_score())
        };

        let kept = !will_undo;
        state.scope.record_invocation(kept);
        if let Some(step) = state.step.as_mut() {
            step.record_invocation();
        }
        state.stage = InvocationStage::Ran { kept };
        outcome
    }

    /// Closes the step if the invocation kept its move.
    ///
    /// # Panics
    ///
    /// If `run_invocation` did not run since the last `setup_invocation`.
    pub fn tear_down_invocation(&mut self) {
        let Self {
            name,
            sampler,
            listeners,
            iteration,
            ..
        } = self;
        let Some(state) = iteration.as_mut() else {
            panic!("tear_down_invocation() called on {name} outside an iteration");
        };
        let InvocationStage::Ran { kept } = mem::replace(&mut state.stage, InvocationStage::Ready)
        else {
            panic!("tear_down_invocation() called on {name} before run_invocation()");
        };

        if kept {
            let Some(step) = state.step.take() else {
                panic!("step_ended on {name} without an open step");
            };
            state.scope.complete_step(&step);
            notify(sampler, listeners, |l| l.step_ended(&step));
        }
    }

    /// Force-closes a step left open by a final undone invocation, then
    /// closes the score director.
    ///
    /// # Panics
    ///
    /// Outside an iteration, or between `setup_invocation` and
    /// `tear_down_invocation`.
    pub fn tear_down_iteration(&mut self) -> IterationSummary {
        let Some(mut state) = self.iteration.take() else {
            panic!(
                "tear_down_iteration() called on {} outside an iteration",
                self.name
            );
        };
        if !matches!(state.stage, InvocationStage::Ready) {
            panic!(
                "tear_down_iteration() called on {} with an invocation in progress",
                self.name
            );
        }

        let final_step_force_closed = match state.step.take() {
            Some(step) => {
                state.scope.complete_step(&step);
                notify(&mut self.sampler, &mut self.listeners, |l| {
                    l.step_ended(&step)
                });
                true
            }
            None => false,
        };

        let score_calculations = state.guard.director.calculation_count();
        state.guard.director.close();
        let scope = &state.scope;
        notify(&mut self.sampler, &mut self.listeners, |l| {
            l.iteration_ended(scope)
        });

        let summary = IterationSummary {
            iteration_index: scope.iteration_index(),
            invocations: scope.invocation_count(),
            steps: scope.step_count(),
            kept: scope.kept_count(),
            undone: scope.undone_count(),
            final_step_force_closed,
            score_calculations,
            duration: scope.elapsed(),
        };
        debug!(
            event = "iteration_end",
            problem = %self.name,
            iteration_index = summary.iteration_index,
            invocations = summary.invocations,
            steps = summary.steps,
            kept = summary.kept,
            undone = summary.undone,
            force_closed_step = summary.final_step_force_closed,
            score_calculations = summary.score_calculations,
            duration_ms = summary.duration.as_millis() as u64,
        );
        summary
    }

    /// Ends the trial and drops the move sampler.
    ///
    /// # Panics
    ///
    /// Outside a trial, or while an iteration is active.
    pub fn tear_down_trial(&mut self) {
        if self.iteration.is_some() {
            panic!(
                "tear_down_trial() called on {} while an iteration is active",
                self.name
            );
        }
        if self.sampler.is_none() {
            panic!(
                "tear_down_trial() called on {} before setup_trial()",
                self.name
            );
        }

        notify(&mut self.sampler, &mut self.listeners, |l| l.trial_ended());
        self.sampler = None;
        info!(
            event = "trial_end",
            problem = %self.name,
            iterations = self.iterations_started,
        );
    }
}

impl<S, F> Problem for BenchmarkProblem<S, F>
where
    S: PlanningSolution,
    F: ScoreDirectorFactory<S>,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn phase(&self) -> LifecyclePhase {
        BenchmarkProblem::phase(self)
    }

    fn setup_trial(&mut self) -> Result<()> {
        BenchmarkProblem::setup_trial(self)
    }

    fn setup_iteration(&mut self) {
        BenchmarkProblem::setup_iteration(self)
    }

    fn setup_invocation(&mut self) -> Result<()> {
        BenchmarkProblem::setup_invocation(self)
    }

    fn run_invocation(&mut self, blackhole: &mut Blackhole) -> InvocationKind {
        let outcome = BenchmarkProblem::run_invocation(self, blackhole);
        let kind = outcome.kind();
        blackhole.consume(outcome);
        kind
    }

    fn tear_down_invocation(&mut self) {
        BenchmarkProblem::tear_down_invocation(self)
    }

    fn tear_down_iteration(&mut self) -> IterationSummary {
        BenchmarkProblem::tear_down_iteration(self)
    }

    fn tear_down_trial(&mut self) {
        BenchmarkProblem::tear_down_trial(self)
    }
}

// The sampler hears every transition first, then the registered listeners.
fn notify<S: PlanningSolution>(
    sampler: &mut Option<MoveSampler<S>>,
    listeners: &mut [Box<dyn LifecycleListener>],
    event: impl Fn(&mut dyn LifecycleListener),
) {
    if let Some(sampler) = sampler.as_mut() {
        event(sampler as &mut dyn LifecycleListener);
    }
    for listener in listeners.iter_mut() {
        event(listener.as_mut());
    }
}
