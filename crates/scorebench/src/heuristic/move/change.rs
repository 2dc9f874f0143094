//! ChangeMove - assigns a value to a planning variable.
//!
//! # Zero-Erasure Design
//!
//! The move carries the typed accessors of its variable descriptor. No
//! `Arc<dyn>`, no `Box<dyn Any>`, no `downcast_ref`.

use std::fmt;

use scorebench_core::domain::PinningFn;
use scorebench_core::{PlanningSolution, VariableDescriptor};
use scorebench_scoring::ScoreDirector;

use super::Move;

/// A move that assigns a value (or unassigns) one entity's variable.
pub struct ChangeMove<S> {
    descriptor_index: usize,
    entity_index: usize,
    variable: VariableDescriptor<S>,
    pinning: Option<PinningFn<S>>,
    to_value: Option<usize>,
}

impl<S> ChangeMove<S> {
    /// Creates a new change move.
    ///
    /// # Arguments
    /// * `descriptor_index` - Index of the entity descriptor
    /// * `entity_index` - Index of the entity in its collection
    /// * `variable` - Descriptor of the changed variable
    /// * `pinning` - Pinning predicate of the entity type, if any
    /// * `to_value` - The value to assign (None to unassign)
    pub fn new(
        descriptor_index: usize,
        entity_index: usize,
        variable: VariableDescriptor<S>,
        pinning: Option<PinningFn<S>>,
        to_value: Option<usize>,
    ) -> Self {
        Self {
            descriptor_index,
            entity_index,
            variable,
            pinning,
            to_value,
        }
    }

    /// Returns the target value.
    pub fn to_value(&self) -> Option<usize> {
        self.to_value
    }
}

impl<S> Clone for ChangeMove<S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S> Copy for ChangeMove<S> {}

impl<S> PartialEq for ChangeMove<S> {
    fn eq(&self, other: &Self) -> bool {
        self.descriptor_index == other.descriptor_index
            && self.entity_index == other.entity_index
            && self.variable.name() == other.variable.name()
            && self.to_value == other.to_value
    }
}

impl<S> Eq for ChangeMove<S> {}

impl<S> fmt::Debug for ChangeMove<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeMove")
            .field("descriptor_index", &self.descriptor_index)
            .field("entity_index", &self.entity_index)
            .field("variable_name", &self.variable.name())
            .field("to_value", &self.to_value)
            .finish()
    }
}

impl<S: PlanningSolution> Move<S> for ChangeMove<S> {
    type Undo = ChangeMove<S>;

    fn is_doable<D: ScoreDirector<S>>(&self, score_director: &D) -> bool {
        let solution = score_director.working_solution();
        if let Some(pinning) = self.pinning {
            if pinning(solution, self.entity_index) {
                return false;
            }
        }
        if let Some(value) = self.to_value {
            if value >= self.variable.value_count(solution) {
                return false;
            }
        }
        self.variable.value_of(solution, self.entity_index) != self.to_value
    }

    fn do_move<D: ScoreDirector<S>>(&self, score_director: &mut D) -> ChangeMove<S> {
        let old_value = self
            .variable
            .value_of(score_director.working_solution(), self.entity_index);

        score_director.before_variable_changed(
            self.descriptor_index,
            self.entity_index,
            self.variable.name(),
        );
        (self.variable.setter())(
            score_director.working_solution_mut(),
            self.entity_index,
            self.to_value,
        );
        score_director.after_variable_changed(
            self.descriptor_index,
            self.entity_index,
            self.variable.name(),
        );
        score_director.trigger_variable_listeners();

        ChangeMove {
            to_value: old_value,
            ..*self
        }
    }

    fn descriptor_index(&self) -> usize {
        self.descriptor_index
    }

    fn entity_index(&self) -> usize {
        self.entity_index
    }

    fn variable_name(&self) -> &'static str {
        self.variable.name()
    }
}
