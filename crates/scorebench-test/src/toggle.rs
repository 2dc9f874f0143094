//! The smallest selectable problem: switches that are either off (0) or on (1).
//!
//! With a single switch, the only doable change move from any assignment is
//! the one flipping it, which makes move sequences fully predictable.

use scorebench_core::{
    EntityDescriptor, PlanningSolution, SimpleScore, SolutionDescriptor, VariableDescriptor,
};

/// Number of values of the `state` variable.
pub const STATE_COUNT: usize = 2;

#[derive(Clone, Debug, PartialEq)]
pub struct ToggleSolution {
    pub states: Vec<Option<usize>>,
    pub score: Option<SimpleScore>,
}

impl ToggleSolution {
    pub fn new(states: Vec<Option<usize>>) -> Self {
        Self {
            states,
            score: None,
        }
    }

    /// A single switch in the given state.
    pub fn single(state: usize) -> Self {
        Self::new(vec![Some(state)])
    }
}

impl PlanningSolution for ToggleSolution {
    type Score = SimpleScore;

    fn score(&self) -> Option<Self::Score> {
        self.score
    }

    fn set_score(&mut self, score: Option<Self::Score>) {
        self.score = score;
    }
}

pub fn get_state(s: &ToggleSolution, i: usize) -> Option<usize> {
    s.states.get(i).copied().flatten()
}

pub fn set_state(s: &mut ToggleSolution, i: usize, v: Option<usize>) {
    if let Some(state) = s.states.get_mut(i) {
        *state = v;
    }
}

fn switch_count(s: &ToggleSolution) -> usize {
    s.states.len()
}

fn state_count(_: &ToggleSolution) -> usize {
    STATE_COUNT
}

pub fn create_toggle_descriptor() -> SolutionDescriptor<ToggleSolution> {
    SolutionDescriptor::new("ToggleSolution").with_entity(
        EntityDescriptor::new("Switch", switch_count).with_variable(VariableDescriptor::new(
            "state",
            get_state,
            set_state,
            state_count,
        )),
    )
}

/// Rewards switches that are on; unassigned switches are penalized.
pub fn calculate_toggle_score(s: &ToggleSolution) -> SimpleScore {
    let score = s
        .states
        .iter()
        .map(|state| match state {
            Some(1) => 1,
            Some(_) => 0,
            None => -1,
        })
        .sum();
    SimpleScore::of(score)
}
