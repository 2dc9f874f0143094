// Shadow-aware score director for solutions with shadow variables.
//
// Provides the [`ShadowVariableSupport`] trait and [`ShadowAwareScoreDirector`],
// which runs variable listeners on top of any inner score director.

use std::marker::PhantomData;

use scorebench_core::{PlanningSolution, SolutionDescriptor};

use super::factory::{ScoreDirectorFactory, ScoreDirectorFlags};
use super::traits::{ConstraintMatchTotal, ScoreDirector};

// Identifies one shadow variable on one entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShadowVariableRef {
    pub descriptor_index: usize,
    pub entity_index: usize,
    pub variable_name: &'static str,
}

impl ShadowVariableRef {
    pub fn new(descriptor_index: usize, entity_index: usize, variable_name: &'static str) -> Self {
        Self {
            descriptor_index,
            entity_index,
            variable_name,
        }
    }
}

// Trait for solutions that maintain shadow variables.
//
// Shadow variables are derived from genuine planning variables. They are
// never changed by moves; a variable listener recomputes them after their
// sources changed.
pub trait ShadowVariableSupport: PlanningSolution {
    // Appends every shadow variable of the solution to `out`.
    fn shadow_variables(&self, out: &mut Vec<ShadowVariableRef>);

    // Appends the shadow variables computed from the given genuine variable.
    fn shadow_dependents(
        &self,
        descriptor_index: usize,
        entity_index: usize,
        variable_name: &str,
        out: &mut Vec<ShadowVariableRef>,
    );

    // Recomputes one shadow variable from its current sources.
    fn update_shadow(&mut self, shadow: ShadowVariableRef);
}

// A score director that runs variable listeners.
//
// A genuine variable change queues the shadow variables that depend on it.
// `trigger_variable_listeners` drains the queue, bracketing every shadow
// update with before/after notifications so the inner director sees the
// shadow change like any other variable change. Installing a working
// solution queues every shadow variable.
//
// # Type Parameters
//
// - `S`: Solution type (must implement [`ShadowVariableSupport`])
// - `D`: Inner score director type (zero-erasure, no trait objects)
pub struct ShadowAwareScoreDirector<S, D>
where
    S: ShadowVariableSupport,
    D: ScoreDirector<S>,
{
    inner: D,
    pending: Vec<ShadowVariableRef>,
    shadow_update_count: u64,
    _phantom: PhantomData<fn() -> S>,
}

impl<S, D> ShadowAwareScoreDirector<S, D>
where
    S: ShadowVariableSupport,
    D: ScoreDirector<S>,
{
    pub fn new(inner: D) -> Self {
        Self {
            inner,
            pending: Vec::new(),
            shadow_update_count: 0,
            _phantom: PhantomData,
        }
    }

    pub fn inner(&self) -> &D {
        &self.inner
    }

    /// Returns how many shadow variable updates the listeners have applied.
    pub fn shadow_update_count(&self) -> u64 {
        self.shadow_update_count
    }

    /// Returns the number of shadow variables waiting for the next trigger.
    pub fn pending_shadow_count(&self) -> usize {
        self.pending.len()
    }
}

impl<S, D> ScoreDirector<S> for ShadowAwareScoreDirector<S, D>
where
    S: ShadowVariableSupport,
    D: ScoreDirector<S>,
{
    fn set_working_solution(&mut self, solution: S) {
        self.pending.clear();
        solution.shadow_variables(&mut self.pending);
        self.inner.set_working_solution(solution);
    }

    fn working_solution(&self) -> &S {
        self.inner.working_solution()
    }

    fn working_solution_mut(&mut self) -> &mut S {
        self.inner.working_solution_mut()
    }

    fn clone_solution(&self, solution: &S) -> S {
        self.inner.clone_solution(solution)
    }

    fn solution_descriptor(&self) -> &SolutionDescriptor<S> {
        self.inner.solution_descriptor()
    }

    fn before_variable_changed(
        &mut self,
        descriptor_index: usize,
        entity_index: usize,
        variable_name: &str,
    ) {
        self.inner
            .before_variable_changed(descriptor_index, entity_index, variable_name);
    }

    fn after_variable_changed(
        &mut self,
        descriptor_index: usize,
        entity_index: usize,
        variable_name: &str,
    ) {
        self.inner
            .after_variable_changed(descriptor_index, entity_index, variable_name);
        self.inner.working_solution().shadow_dependents(
            descriptor_index,
            entity_index,
            variable_name,
            &mut self.pending,
        );
    }

    fn trigger_variable_listeners(&mut self) {
        // Shadows are updated one entity at a time so incremental state never
        // sees two entities retracted together.
        while let Some(shadow) = self.pending.pop() {
            self.inner.before_variable_changed(
                shadow.descriptor_index,
                shadow.entity_index,
                shadow.variable_name,
            );
            self.inner.working_solution_mut().update_shadow(shadow);
            self.inner.after_variable_changed(
                shadow.descriptor_index,
                shadow.entity_index,
                shadow.variable_name,
            );
            self.shadow_update_count += 1;
        }
        self.inner.trigger_variable_listeners();
    }

    fn calculate_score(&mut self) -> S::Score {
        self.inner.calculate_score()
    }

    fn calculation_count(&self) -> u64 {
        self.inner.calculation_count()
    }

    fn is_incremental(&self) -> bool {
        self.inner.is_incremental()
    }

    fn constraint_match_totals(&self) -> Option<Vec<ConstraintMatchTotal<S::Score>>> {
        self.inner.constraint_match_totals()
    }

    fn close(&mut self) {
        self.pending.clear();
        self.inner.close();
    }

    fn is_closed(&self) -> bool {
        self.inner.is_closed()
    }
}

/// Wraps the directors of another factory in [`ShadowAwareScoreDirector`]s.
pub struct ShadowAwareScoreDirectorFactory<F> {
    inner: F,
}

impl<F> ShadowAwareScoreDirectorFactory<F> {
    pub fn new(inner: F) -> Self {
        Self { inner }
    }
}

impl<S, F> ScoreDirectorFactory<S> for ShadowAwareScoreDirectorFactory<F>
where
    S: ShadowVariableSupport,
    F: ScoreDirectorFactory<S>,
{
    type Director = ShadowAwareScoreDirector<S, F::Director>;

    fn solution_descriptor(&self) -> &SolutionDescriptor<S> {
        self.inner.solution_descriptor()
    }

    fn build_score_director(&self, flags: ScoreDirectorFlags) -> Self::Director {
        ShadowAwareScoreDirector::new(self.inner.build_score_director(flags))
    }
}
