//! Step-level scope.

/// Scope for a single step within an iteration.
///
/// A step spans every invocation from the one that opened it up to and
/// including the invocation whose move was kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepScope {
    iteration_index: u64,
    step_index: u64,
    invocation_count: u64,
}

impl StepScope {
    /// Creates a new step scope.
    pub fn new(iteration_index: u64, step_index: u64) -> Self {
        Self {
            iteration_index,
            step_index,
            invocation_count: 0,
        }
    }

    /// Returns the index of the enclosing iteration.
    pub fn iteration_index(&self) -> u64 {
        self.iteration_index
    }

    /// Returns the step index within the iteration (0-based).
    pub fn step_index(&self) -> u64 {
        self.step_index
    }

    /// Returns how many invocations ran inside this step.
    pub fn invocation_count(&self) -> u64 {
        self.invocation_count
    }

    pub fn record_invocation(&mut self) {
        self.invocation_count += 1;
    }
}
