//! Tests for the benchmark problem lifecycle.

use std::cell::RefCell;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::rc::Rc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use super::*;
use crate::blackhole::Blackhole;
use crate::error::BenchmarkError;
use crate::scope::{IterationScope, LifecycleListener, StepScope};
use scorebench_core::{SimpleScore, SolutionDescriptor};
use scorebench_scoring::{
    EasyScoreDirector, EasyScoreDirectorFactory, ScoreDirector, ScoreDirectorFactory,
    ScoreDirectorFlags,
};
use scorebench_test::toggle::{calculate_toggle_score, create_toggle_descriptor, ToggleSolution};
use scorebench_test::workshop::{
    calculate_workshop_score, create_fact_only_descriptor, create_workshop,
    create_workshop_descriptor, WorkshopSolution,
};

type ToggleCalc = fn(&ToggleSolution) -> SimpleScore;
type ToggleFactory = EasyScoreDirectorFactory<ToggleSolution, ToggleCalc>;
type WorkshopCalc = fn(&WorkshopSolution) -> SimpleScore;
type WorkshopProblem =
    BenchmarkProblem<WorkshopSolution, EasyScoreDirectorFactory<WorkshopSolution, WorkshopCalc>>;

fn toggle_problem(states: Vec<Option<usize>>, undo_probability: f64) -> BenchmarkProblem<ToggleSolution, ToggleFactory> {
    let factory = EasyScoreDirectorFactory::new(
        create_toggle_descriptor(),
        calculate_toggle_score as ToggleCalc,
    );
    BenchmarkProblem::new("toggle/easy", factory, ToggleSolution::new(states))
        .with_undo_probability(undo_probability)
        .unwrap()
}

fn workshop_problem(undo_probability: f64, seed: u64) -> WorkshopProblem {
    let factory = EasyScoreDirectorFactory::new(
        create_workshop_descriptor(),
        calculate_workshop_score as WorkshopCalc,
    );
    BenchmarkProblem::new("workshop/easy", factory, create_workshop(12, 4, 5, 3))
        .with_seed(seed)
        .with_undo_probability(undo_probability)
        .unwrap()
}

fn invoke<S, F>(problem: &mut BenchmarkProblem<S, F>, blackhole: &mut Blackhole) -> InvocationOutcome<S>
where
    S: scorebench_core::PlanningSolution,
    F: ScoreDirectorFactory<S>,
{
    problem.setup_invocation().unwrap();
    let outcome = problem.run_invocation(blackhole);
    problem.tear_down_invocation();
    outcome
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Event {
    TrialStarted,
    IterationStarted(u64),
    StepStarted(u64),
    StepEnded(u64),
    IterationEnded(u64),
    TrialEnded,
}

#[derive(Clone, Default)]
struct Recorder {
    events: Rc<RefCell<Vec<Event>>>,
}

impl Recorder {
    fn events(&self) -> Vec<Event> {
        self.events.borrow().clone()
    }

    fn count(&self, wanted: fn(&Event) -> bool) -> usize {
        self.events.borrow().iter().filter(|e| wanted(e)).count()
    }
}

impl LifecycleListener for Recorder {
    fn trial_started(&mut self) {
        self.events.borrow_mut().push(Event::TrialStarted);
    }

    fn iteration_started(&mut self, scope: &IterationScope) {
        self.events
            .borrow_mut()
            .push(Event::IterationStarted(scope.iteration_index()));
    }

    fn step_started(&mut self, scope: &StepScope) {
        self.events.borrow_mut().push(Event::StepStarted(scope.step_index()));
    }

    fn step_ended(&mut self, scope: &StepScope) {
        self.events.borrow_mut().push(Event::StepEnded(scope.step_index()));
    }

    fn iteration_ended(&mut self, scope: &IterationScope) {
        self.events
            .borrow_mut()
            .push(Event::IterationEnded(scope.iteration_index()));
    }

    fn trial_ended(&mut self) {
        self.events.borrow_mut().push(Event::TrialEnded);
    }
}

// Easy toggle director that counts how often it is closed.
struct TrackingDirector {
    inner: EasyScoreDirector<ToggleSolution, ToggleCalc>,
    closed: Arc<AtomicUsize>,
}

impl ScoreDirector<ToggleSolution> for TrackingDirector {
    fn set_working_solution(&mut self, solution: ToggleSolution) {
        self.inner.set_working_solution(solution);
    }

    fn working_solution(&self) -> &ToggleSolution {
        self.inner.working_solution()
    }

    fn working_solution_mut(&mut self) -> &mut ToggleSolution {
        self.inner.working_solution_mut()
    }

    fn solution_descriptor(&self) -> &SolutionDescriptor<ToggleSolution> {
        self.inner.solution_descriptor()
    }

    fn before_variable_changed(&mut self, d: usize, e: usize, v: &str) {
        self.inner.before_variable_changed(d, e, v);
    }

    fn after_variable_changed(&mut self, d: usize, e: usize, v: &str) {
        self.inner.after_variable_changed(d, e, v);
    }

    fn trigger_variable_listeners(&mut self) {
        self.inner.trigger_variable_listeners();
    }

    fn calculate_score(&mut self) -> SimpleScore {
        self.inner.calculate_score()
    }

    fn calculation_count(&self) -> u64 {
        self.inner.calculation_count()
    }

    fn close(&mut self) {
        self.inner.close();
        self.closed.fetch_add(1, Ordering::SeqCst);
    }

    fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }
}

struct TrackingFactory {
    inner: ToggleFactory,
    closed: Arc<AtomicUsize>,
}

impl ScoreDirectorFactory<ToggleSolution> for TrackingFactory {
    type Director = TrackingDirector;

    fn solution_descriptor(&self) -> &SolutionDescriptor<ToggleSolution> {
        self.inner.solution_descriptor()
    }

    fn build_score_director(&self, flags: ScoreDirectorFlags) -> TrackingDirector {
        TrackingDirector {
            inner: self.inner.build_score_director(flags),
            closed: Arc::clone(&self.closed),
        }
    }
}

fn tracking_problem(
    closed: &Arc<AtomicUsize>,
) -> BenchmarkProblem<ToggleSolution, TrackingFactory> {
    let factory = TrackingFactory {
        inner: EasyScoreDirectorFactory::new(
            create_toggle_descriptor(),
            calculate_toggle_score as ToggleCalc,
        ),
        closed: Arc::clone(closed),
    };
    BenchmarkProblem::new("toggle/tracking", factory, ToggleSolution::single(0))
}

#[test]
fn test_phases_follow_the_lifecycle() {
    let mut problem = workshop_problem(0.5, 0);
    let mut blackhole = Blackhole::new();
    assert_eq!(problem.phase(), LifecyclePhase::Idle);

    problem.setup_trial().unwrap();
    assert_eq!(problem.phase(), LifecyclePhase::TrialActive);
    assert!(problem.baseline_score().is_none());

    problem.setup_iteration();
    assert_eq!(problem.phase(), LifecyclePhase::IterationActive);
    assert_eq!(
        problem.baseline_score(),
        Some(calculate_workshop_score(problem.original_solution()))
    );

    invoke(&mut problem, &mut blackhole);
    problem.tear_down_iteration();
    assert_eq!(problem.phase(), LifecyclePhase::TrialActive);

    problem.tear_down_trial();
    assert_eq!(problem.phase(), LifecyclePhase::Idle);
}

#[test]
fn test_single_kept_invocation_closes_its_step() {
    let recorder = Recorder::default();
    let mut problem = toggle_problem(vec![Some(0), Some(0)], 0.0).with_listener(recorder.clone());
    let mut blackhole = Blackhole::new();
    problem.setup_trial().unwrap();
    problem.setup_iteration();

    problem.setup_invocation().unwrap();
    assert!(problem.is_step_open());
    let outcome = problem.run_invocation(&mut blackhole);
    assert!(problem.is_step_open());
    problem.tear_down_invocation();

    assert_eq!(outcome, InvocationOutcome::Kept(SimpleScore::of(1)));
    assert!(!problem.is_step_open());
    assert_eq!(
        recorder.events(),
        vec![
            Event::TrialStarted,
            Event::IterationStarted(0),
            Event::StepStarted(0),
            Event::StepEnded(0),
        ]
    );

    let summary = problem.tear_down_iteration();
    assert_eq!(summary.steps, 1);
    assert_eq!(summary.kept, 1);
    assert!(!summary.final_step_force_closed);
}

#[test]
fn test_final_undone_invocation_is_force_closed() {
    let recorder = Recorder::default();
    let mut problem = toggle_problem(vec![Some(0), Some(0)], 1.0).with_listener(recorder.clone());
    let mut blackhole = Blackhole::new();
    problem.setup_trial().unwrap();
    problem.setup_iteration();

    let outcome = invoke(&mut problem, &mut blackhole);
    assert_eq!(outcome.kind(), InvocationKind::Undone);
    assert!(problem.is_step_open());

    let summary = problem.tear_down_iteration();
    problem.tear_down_trial();

    assert!(summary.final_step_force_closed);
    assert_eq!(summary.steps, 1);
    assert_eq!(summary.undone, 1);
    assert_eq!(
        recorder.events(),
        vec![
            Event::TrialStarted,
            Event::IterationStarted(0),
            Event::StepStarted(0),
            Event::StepEnded(0),
            Event::IterationEnded(0),
            Event::TrialEnded,
        ]
    );
}

#[test]
fn test_always_undo_restores_the_fresh_clone() {
    let mut problem = workshop_problem(1.0, 3);
    let mut blackhole = Blackhole::new();
    problem.setup_trial().unwrap();
    problem.setup_iteration();
    let baseline = problem.baseline_score().unwrap();

    for _ in 0..200 {
        let outcome = invoke(&mut problem, &mut blackhole);
        assert_eq!(outcome.kind(), InvocationKind::Undone);
    }

    assert_eq!(problem.working_score(), Some(baseline));
    assert_eq!(
        problem.working_solution().unwrap().sessions,
        problem.original_solution().sessions
    );
    let summary = problem.tear_down_iteration();
    assert_eq!(summary.invocations, 200);
    assert_eq!(summary.steps, 1);
    assert_eq!(blackhole.consumed(), 200);
}

#[test]
fn test_never_undo_keeps_every_move() {
    let recorder = Recorder::default();
    let mut problem = workshop_problem(0.0, 3).with_listener(recorder.clone());
    let mut blackhole = Blackhole::new();
    problem.setup_trial().unwrap();
    problem.setup_iteration();

    for _ in 0..50 {
        let outcome = invoke(&mut problem, &mut blackhole);
        assert_eq!(outcome.kind(), InvocationKind::Kept);
        assert!(!problem.is_step_open());
    }
    let summary = problem.tear_down_iteration();

    assert_eq!(summary.steps, 50);
    assert_eq!(summary.kept, 50);
    assert_eq!(summary.undone, 0);
    assert_eq!(recorder.count(|e| matches!(e, Event::StepStarted(_))), 50);
    assert_eq!(recorder.count(|e| matches!(e, Event::StepEnded(_))), 50);
}

#[test]
fn test_step_is_open_iff_last_move_was_undone() {
    let recorder = Recorder::default();
    let mut problem = workshop_problem(0.5, 9).with_listener(recorder.clone());
    let mut blackhole = Blackhole::new();
    problem.setup_trial().unwrap();
    problem.setup_iteration();

    let mut kinds = Vec::new();
    for _ in 0..100 {
        let outcome = invoke(&mut problem, &mut blackhole);
        assert_eq!(
            problem.is_step_open(),
            outcome.kind() == InvocationKind::Undone
        );
        kinds.push(outcome.kind());
    }
    assert!(kinds.contains(&InvocationKind::Kept));
    assert!(kinds.contains(&InvocationKind::Undone));

    let summary = problem.tear_down_iteration();
    let kept = kinds.iter().filter(|k| **k == InvocationKind::Kept).count() as u64;
    assert_eq!(summary.kept, kept);
    assert_eq!(summary.steps, kept + summary.final_step_force_closed as u64);

    // Steps never overlap.
    let mut open = false;
    for event in recorder.events() {
        match event {
            Event::StepStarted(_) => {
                assert!(!open);
                open = true;
            }
            Event::StepEnded(_) => {
                assert!(open);
                open = false;
            }
            _ => {}
        }
    }
    assert!(!open);
}

#[test]
fn test_undo_round_trips_the_score() {
    let mut problem = workshop_problem(0.5, 21);
    let mut blackhole = Blackhole::new();
    problem.setup_trial().unwrap();
    problem.setup_iteration();

    for _ in 0..100 {
        let before = problem.working_score().unwrap();
        match invoke(&mut problem, &mut blackhole) {
            InvocationOutcome::Undone(_) => {
                assert_eq!(problem.working_score(), Some(before));
            }
            InvocationOutcome::Kept(score) => {
                assert_eq!(problem.working_score(), Some(score));
            }
        }
    }
    problem.tear_down_iteration();
}

#[test]
fn test_iterations_are_reproducible() {
    let mut problem = workshop_problem(0.5, 42);
    let mut blackhole = Blackhole::new();
    problem.setup_trial().unwrap();

    let mut runs = Vec::new();
    for _ in 0..2 {
        problem.setup_iteration();
        let outcomes: Vec<_> = (0..60)
            .map(|_| invoke(&mut problem, &mut blackhole))
            .collect();
        runs.push(outcomes);
        problem.tear_down_iteration();
    }
    problem.tear_down_trial();

    let mut other = workshop_problem(0.5, 42);
    other.setup_trial().unwrap();
    other.setup_iteration();
    let replay: Vec<_> = (0..60).map(|_| invoke(&mut other, &mut blackhole)).collect();
    other.tear_down_iteration();

    assert_eq!(runs[0], runs[1]);
    assert_eq!(runs[0], replay);
}

#[test]
fn test_different_seeds_sample_differently() {
    let mut blackhole = Blackhole::new();
    let mut sequences = Vec::new();
    for seed in [1, 2] {
        let mut problem = workshop_problem(1.0, seed);
        problem.setup_trial().unwrap();
        problem.setup_iteration();
        let redo: Vec<_> = (0..30).map(|_| invoke(&mut problem, &mut blackhole)).collect();
        problem.tear_down_iteration();
        sequences.push(redo);
    }
    assert_ne!(sequences[0], sequences[1]);
}

#[test]
fn test_toggle_never_assigns_the_current_value() {
    let mut problem = toggle_problem(vec![Some(0)], 0.0);
    let mut blackhole = Blackhole::new();
    problem.setup_trial().unwrap();
    problem.setup_iteration();

    for i in 0..20 {
        invoke(&mut problem, &mut blackhole);
        // A single two-valued switch can only flip.
        let expected = if i % 2 == 0 { Some(1) } else { Some(0) };
        assert_eq!(problem.working_solution().unwrap().states, vec![expected]);
    }
    problem.tear_down_iteration();
}

#[test]
fn test_every_iteration_starts_from_the_original() {
    let mut problem = workshop_problem(0.0, 5);
    let mut blackhole = Blackhole::new();
    let original = problem.original_solution().clone();
    problem.setup_trial().unwrap();

    problem.setup_iteration();
    let baseline = problem.baseline_score();
    for _ in 0..30 {
        invoke(&mut problem, &mut blackhole);
    }
    assert_ne!(problem.working_solution().unwrap().sessions, original.sessions);
    problem.tear_down_iteration();

    problem.setup_iteration();
    assert_eq!(problem.baseline_score(), baseline);
    assert_eq!(problem.working_solution().unwrap().sessions, original.sessions);
    assert_eq!(problem.iteration_scope().unwrap().iteration_index(), 1);
    problem.tear_down_iteration();

    assert_eq!(problem.original_solution(), &original);
}

#[test]
fn test_undo_probability_is_validated() {
    let make = |p: f64| {
        let factory = EasyScoreDirectorFactory::new(
            create_toggle_descriptor(),
            calculate_toggle_score as ToggleCalc,
        );
        BenchmarkProblem::new("toggle", factory, ToggleSolution::single(0)).with_undo_probability(p)
    };

    assert!(matches!(make(-0.01), Err(BenchmarkError::InvalidSetting(_))));
    assert!(matches!(make(1.01), Err(BenchmarkError::InvalidSetting(_))));
    assert!(matches!(make(f64::NAN), Err(BenchmarkError::InvalidSetting(_))));
    assert_eq!(make(0.9).unwrap().undo_probability(), 0.9);
}

#[test]
fn test_no_selectable_moves_fails_the_trial() {
    let factory = EasyScoreDirectorFactory::new(
        create_fact_only_descriptor(),
        calculate_workshop_score as WorkshopCalc,
    );
    let mut problem = BenchmarkProblem::new("venues", factory, create_workshop(2, 1, 2, 1));

    let result = problem.setup_trial();

    assert!(matches!(
        result,
        Err(BenchmarkError::NoSelectableMoves { .. })
    ));
    assert_eq!(problem.phase(), LifecyclePhase::Idle);
}

#[test]
fn test_move_exhaustion_leaves_a_closable_iteration() {
    let mut problem = toggle_problem(vec![], 0.0).with_move_probe_limit(8);
    problem.setup_trial().unwrap();
    problem.setup_iteration();

    let result = problem.setup_invocation();

    assert!(matches!(
        result,
        Err(BenchmarkError::MoveExhaustion { probes: 8 })
    ));
    let summary = problem.tear_down_iteration();
    assert_eq!(summary.invocations, 0);
    assert!(summary.final_step_force_closed);
    problem.tear_down_trial();
}

#[test]
fn test_tear_down_iteration_closes_the_director() {
    let closed = Arc::new(AtomicUsize::new(0));
    let mut problem = tracking_problem(&closed);
    let mut blackhole = Blackhole::new();
    problem.setup_trial().unwrap();

    for _ in 0..3 {
        problem.setup_iteration();
        invoke(&mut problem, &mut blackhole);
        problem.tear_down_iteration();
    }

    assert_eq!(closed.load(Ordering::SeqCst), 3);
}

#[test]
fn test_director_is_closed_on_unwind() {
    let closed = Arc::new(AtomicUsize::new(0));
    let mut problem = tracking_problem(&closed);

    let result = catch_unwind(AssertUnwindSafe(move || {
        problem.setup_trial().unwrap();
        problem.setup_iteration();
        // No pending move: contract violation.
        problem.run_invocation(&mut Blackhole::new());
    }));

    assert!(result.is_err());
    assert_eq!(closed.load(Ordering::SeqCst), 1);
}

#[test]
fn test_problem_trait_object_drives_the_lifecycle() {
    let mut problem: Box<dyn Problem> = Box::new(workshop_problem(0.9, 1));
    let mut blackhole = Blackhole::new();

    problem.setup_trial().unwrap();
    problem.setup_iteration();
    for _ in 0..10 {
        problem.setup_invocation().unwrap();
        problem.run_invocation(&mut blackhole);
        problem.tear_down_invocation();
    }
    let summary = problem.tear_down_iteration();
    problem.tear_down_trial();

    assert_eq!(problem.name(), "workshop/easy");
    assert_eq!(summary.invocations, 10);
    assert_eq!(summary.kept + summary.undone, 10);
    // Undone invocations consume the score and the redo move; kept ones the undo move and the score.
    assert_eq!(blackhole.consumed(), 20);
}

#[test]
#[should_panic(expected = "while a trial is active")]
fn test_setup_trial_twice_panics() {
    let mut problem = toggle_problem(vec![Some(0)], 0.5);
    problem.setup_trial().unwrap();
    let _ = problem.setup_trial();
}

#[test]
#[should_panic(expected = "before setup_trial()")]
fn test_setup_iteration_before_trial_panics() {
    let mut problem = toggle_problem(vec![Some(0)], 0.5);
    problem.setup_iteration();
}

#[test]
#[should_panic(expected = "without a pending move")]
fn test_run_invocation_without_setup_panics() {
    let mut problem = toggle_problem(vec![Some(0)], 0.5);
    problem.setup_trial().unwrap();
    problem.setup_iteration();
    problem.run_invocation(&mut Blackhole::new());
}

#[test]
#[should_panic(expected = "before run_invocation()")]
fn test_tear_down_invocation_before_run_panics() {
    let mut problem = toggle_problem(vec![Some(0)], 0.5);
    problem.setup_trial().unwrap();
    problem.setup_iteration();
    problem.setup_invocation().unwrap();
    problem.tear_down_invocation();
}

#[test]
#[should_panic(expected = "while an iteration is active")]
fn test_tear_down_trial_during_iteration_panics() {
    let mut problem = toggle_problem(vec![Some(0)], 0.5);
    problem.setup_trial().unwrap();
    problem.setup_iteration();
    problem.tear_down_trial();
}
