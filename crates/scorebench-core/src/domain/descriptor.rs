//! Structural descriptors for planning solutions.
//!
//! Descriptors enumerate the entity types of a solution and the genuine
//! decision variables declared on each of them. Variable values are indices
//! into a value range `0..value_count(solution)`.
//!
//! # Zero-Erasure Design
//!
//! Accessors are stored as typed function pointers over the solution type.
//! No `Box<dyn Any>`, no downcasting.

use std::fmt;

/// Reads the value of a variable on the entity at the given index.
pub type VariableGetter<S> = fn(&S, usize) -> Option<usize>;

/// Writes the value of a variable on the entity at the given index.
pub type VariableSetter<S> = fn(&mut S, usize, Option<usize>);

/// Returns the size of a variable's value range.
pub type ValueCountFn<S> = fn(&S) -> usize;

/// Returns true if the entity at the given index must not be changed.
pub type PinningFn<S> = fn(&S, usize) -> bool;

/// Describes one genuine planning variable of an entity type.
pub struct VariableDescriptor<S> {
    name: &'static str,
    getter: VariableGetter<S>,
    setter: VariableSetter<S>,
    value_count: ValueCountFn<S>,
}

impl<S> VariableDescriptor<S> {
    /// Creates a variable descriptor from its typed accessors.
    pub fn new(
        name: &'static str,
        getter: VariableGetter<S>,
        setter: VariableSetter<S>,
        value_count: ValueCountFn<S>,
    ) -> Self {
        Self {
            name,
            getter,
            setter,
            value_count,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn setter(&self) -> VariableSetter<S> {
        self.setter
    }

    /// Returns the value currently assigned on the given entity.
    pub fn value_of(&self, solution: &S, entity_index: usize) -> Option<usize> {
        (self.getter)(solution, entity_index)
    }

    /// Returns the number of values this variable can take in `solution`.
    pub fn value_count(&self, solution: &S) -> usize {
        (self.value_count)(solution)
    }
}

impl<S> Clone for VariableDescriptor<S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S> Copy for VariableDescriptor<S> {}

impl<S> fmt::Debug for VariableDescriptor<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VariableDescriptor")
            .field("name", &self.name)
            .finish()
    }
}

/// Describes one planning entity type of a solution.
pub struct EntityDescriptor<S> {
    type_name: &'static str,
    entity_count: fn(&S) -> usize,
    pinning: Option<PinningFn<S>>,
    variables: Vec<VariableDescriptor<S>>,
}

impl<S> EntityDescriptor<S> {
    /// Creates an entity descriptor without variables.
    ///
    /// An entity type without genuine variables contributes no moves.
    pub fn new(type_name: &'static str, entity_count: fn(&S) -> usize) -> Self {
        Self {
            type_name,
            entity_count,
            pinning: None,
            variables: Vec::new(),
        }
    }

    /// Adds a genuine planning variable.
    pub fn with_variable(mut self, variable: VariableDescriptor<S>) -> Self {
        self.variables.push(variable);
        self
    }

    /// Sets the pinning predicate for entities of this type.
    pub fn with_pinning(mut self, pinning: PinningFn<S>) -> Self {
        self.pinning = Some(pinning);
        self
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn entity_count(&self, solution: &S) -> usize {
        (self.entity_count)(solution)
    }

    pub fn pinning(&self) -> Option<PinningFn<S>> {
        self.pinning
    }

    pub fn is_pinned(&self, solution: &S, entity_index: usize) -> bool {
        self.pinning
            .is_some_and(|pinned| pinned(solution, entity_index))
    }

    pub fn genuine_variables(&self) -> &[VariableDescriptor<S>] {
        &self.variables
    }

    pub fn find_variable(&self, name: &str) -> Option<&VariableDescriptor<S>> {
        self.variables.iter().find(|v| v.name == name)
    }
}

impl<S> Clone for EntityDescriptor<S> {
    fn clone(&self) -> Self {
        Self {
            type_name: self.type_name,
            entity_count: self.entity_count,
            pinning: self.pinning,
            variables: self.variables.clone(),
        }
    }
}

impl<S> fmt::Debug for EntityDescriptor<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityDescriptor")
            .field("type_name", &self.type_name)
            .field("pinnable", &self.pinning.is_some())
            .field("variables", &self.variables)
            .finish()
    }
}

/// Describes a planning solution at runtime.
///
/// # Example
///
/// ```
/// use scorebench_core::{EntityDescriptor, SolutionDescriptor, VariableDescriptor};
///
/// struct Schedule {
///     slots: Vec<Option<usize>>,
///     slot_count: usize,
/// }
///
/// fn get_slot(s: &Schedule, i: usize) -> Option<usize> { s.slots[i] }
/// fn set_slot(s: &mut Schedule, i: usize, v: Option<usize>) { s.slots[i] = v; }
///
/// let descriptor = SolutionDescriptor::new("Schedule").with_entity(
///     EntityDescriptor::new("Lesson", |s: &Schedule| s.slots.len()).with_variable(
///         VariableDescriptor::new("slot", get_slot, set_slot, |s: &Schedule| s.slot_count),
///     ),
/// );
///
/// assert_eq!(descriptor.genuine_variable_count(), 1);
/// let schedule = Schedule { slots: vec![Some(0), None], slot_count: 3 };
/// assert!(!descriptor.is_initialized(&schedule));
/// ```
pub struct SolutionDescriptor<S> {
    type_name: &'static str,
    entity_descriptors: Vec<EntityDescriptor<S>>,
}

impl<S> SolutionDescriptor<S> {
    pub fn new(type_name: &'static str) -> Self {
        Self {
            type_name,
            entity_descriptors: Vec::new(),
        }
    }

    /// Adds an entity descriptor; its position becomes its descriptor index.
    pub fn with_entity(mut self, descriptor: EntityDescriptor<S>) -> Self {
        self.entity_descriptors.push(descriptor);
        self
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn entity_descriptors(&self) -> &[EntityDescriptor<S>] {
        &self.entity_descriptors
    }

    pub fn entity_descriptor(&self, descriptor_index: usize) -> Option<&EntityDescriptor<S>> {
        self.entity_descriptors.get(descriptor_index)
    }

    pub fn find_entity_descriptor(&self, type_name: &str) -> Option<&EntityDescriptor<S>> {
        self.entity_descriptors
            .iter()
            .find(|d| d.type_name == type_name)
    }

    /// Iterates all (descriptor index, entity type, genuine variable) pairs.
    pub fn genuine_variable_pairs(
        &self,
    ) -> impl Iterator<Item = (usize, &EntityDescriptor<S>, &VariableDescriptor<S>)> {
        self.entity_descriptors
            .iter()
            .enumerate()
            .flat_map(|(index, entity)| {
                entity
                    .variables
                    .iter()
                    .map(move |variable| (index, entity, variable))
            })
    }

    pub fn genuine_variable_count(&self) -> usize {
        self.entity_descriptors
            .iter()
            .map(|e| e.variables.len())
            .sum()
    }

    pub fn total_entity_count(&self, solution: &S) -> usize {
        self.entity_descriptors
            .iter()
            .map(|e| e.entity_count(solution))
            .sum()
    }

    /// Returns true if every genuine variable of every entity is assigned.
    pub fn is_initialized(&self, solution: &S) -> bool {
        self.genuine_variable_pairs().all(|(_, entity, variable)| {
            (0..entity.entity_count(solution)).all(|i| variable.value_of(solution, i).is_some())
        })
    }
}

impl<S> Clone for SolutionDescriptor<S> {
    fn clone(&self) -> Self {
        Self {
            type_name: self.type_name,
            entity_descriptors: self.entity_descriptors.clone(),
        }
    }
}

impl<S> fmt::Debug for SolutionDescriptor<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SolutionDescriptor")
            .field("type_name", &self.type_name)
            .field("entity_descriptors", &self.entity_descriptors)
            .finish()
    }
}
