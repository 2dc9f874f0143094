//! Random change move sampler.
//!
//! The sampler covers the union of the change move families of every
//! (entity type, genuine variable) pair of a solution descriptor. Each draw
//! picks a family uniformly, then an entity and a value uniformly. Candidates
//! are generated just in time from an owned `ChaCha8Rng` and never cached,
//! so the same seed always yields the same sequence.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::trace;

use scorebench_core::{EntityDescriptor, PlanningSolution, SolutionDescriptor, VariableDescriptor};
use scorebench_scoring::ScoreDirector;

use crate::error::{BenchmarkError, Result};
use crate::heuristic::r#move::{ChangeMove, Move};
use crate::scope::{IterationScope, LifecycleListener, StepScope};

/// Result of asking the sampler for a doable move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoveSelection<S> {
    /// A doable move.
    Doable(ChangeMove<S>),

    /// The probe budget was spent on non-doable candidates.
    Exhausted { probes: usize },
}

// One (entity type, variable) pair.
struct MoveFamily<S> {
    descriptor_index: usize,
    entity: EntityDescriptor<S>,
    variable: VariableDescriptor<S>,
}

/// Infinite, reproducible random sampler of change moves.
pub struct MoveSampler<S> {
    families: Vec<MoveFamily<S>>,
    rng: ChaCha8Rng,
    probe_limit: usize,
    step_probes: u64,
    iteration_probes: u64,
    iteration_selections: u64,
}

impl<S: PlanningSolution> MoveSampler<S> {
    /// Builds a sampler over every genuine variable of `descriptor`.
    ///
    /// # Errors
    ///
    /// - `InvalidSetting` for a zero probe limit
    /// - `NoSelectableMoves` if the descriptor declares no genuine variable
    pub fn new(descriptor: &SolutionDescriptor<S>, probe_limit: usize) -> Result<Self> {
        if probe_limit == 0 {
            return Err(BenchmarkError::InvalidSetting(
                "move probe limit must be > 0".to_string(),
            ));
        }

        let families: Vec<MoveFamily<S>> = descriptor
            .genuine_variable_pairs()
            .map(|(descriptor_index, entity, variable)| MoveFamily {
                descriptor_index,
                entity: entity.clone(),
                variable: *variable,
            })
            .collect();
        if families.is_empty() {
            return Err(BenchmarkError::NoSelectableMoves {
                solution_type: descriptor.type_name(),
            });
        }

        Ok(Self {
            families,
            rng: ChaCha8Rng::seed_from_u64(0),
            probe_limit,
            step_probes: 0,
            iteration_probes: 0,
            iteration_selections: 0,
        })
    }

    /// Returns the number of (entity type, variable) families.
    pub fn family_count(&self) -> usize {
        self.families.len()
    }

    /// Returns the candidates probed since the current step started.
    pub fn step_probes(&self) -> u64 {
        self.step_probes
    }

    /// Returns the candidates probed since the current iteration started.
    pub fn iteration_probes(&self) -> u64 {
        self.iteration_probes
    }

    /// Resets the random stream so sampling restarts from the same point.
    pub fn start(&mut self, iteration_seed: u64) {
        self.rng = ChaCha8Rng::seed_from_u64(iteration_seed);
        self.step_probes = 0;
        self.iteration_probes = 0;
        self.iteration_selections = 0;
    }

    /// Draws the next candidate, doable or not.
    ///
    /// Returns `None` when the drawn family currently has no entity or no
    /// value to choose from.
    pub fn next_candidate(&mut self, solution: &S) -> Option<ChangeMove<S>> {
        let family = &self.families[self.rng.random_range(0..self.families.len())];

        let entity_count = family.entity.entity_count(solution);
        if entity_count == 0 {
            return None;
        }
        let entity_index = self.rng.random_range(0..entity_count);

        let value_count = family.variable.value_count(solution);
        if value_count == 0 {
            return None;
        }
        let value = self.rng.random_range(0..value_count);

        Some(ChangeMove::new(
            family.descriptor_index,
            entity_index,
            family.variable,
            family.entity.pinning(),
            Some(value),
        ))
    }

    /// Draws candidates until one is doable in the director's working solution.
    ///
    /// Gives up after `probe_limit` candidates.
    pub fn next_doable<D: ScoreDirector<S>>(&mut self, score_director: &D) -> MoveSelection<S> {
        for _ in 0..self.probe_limit {
            self.step_probes += 1;
            self.iteration_probes += 1;
            let Some(candidate) = self.next_candidate(score_director.working_solution()) else {
                continue;
            };
            if candidate.is_doable(score_director) {
                self.iteration_selections += 1;
                return MoveSelection::Doable(candidate);
            }
        }
        MoveSelection::Exhausted {
            probes: self.probe_limit,
        }
    }
}

impl<S: PlanningSolution> LifecycleListener for MoveSampler<S> {
    fn iteration_started(&mut self, iteration_scope: &IterationScope) {
        self.start(iteration_scope.seed());
    }

    fn step_started(&mut self, _step_scope: &StepScope) {
        self.step_probes = 0;
    }

    fn step_ended(&mut self, step_scope: &StepScope) {
        trace!(
            event = "sampler_step_end",
            iteration_index = step_scope.iteration_index(),
            step_index = step_scope.step_index(),
            invocations = step_scope.invocation_count(),
            probes = self.step_probes,
        );
    }

    fn iteration_ended(&mut self, iteration_scope: &IterationScope) {
        trace!(
            event = "sampler_iteration_end",
            iteration_index = iteration_scope.iteration_index(),
            probes = self.iteration_probes,
            selections = self.iteration_selections,
        );
    }
}
