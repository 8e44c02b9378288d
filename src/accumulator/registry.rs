//! Operator name to factory table
//!
//! Fixed at compile time; there is no runtime registration.

use super::state::AccumulatorState;

pub(crate) type Factory = fn() -> AccumulatorState;

/// Sorted by name
static REGISTRY: &[(&str, Factory)] = &[
    ("$addToSet", AccumulatorState::add_to_set),
    ("$avg", AccumulatorState::avg),
    ("$count", AccumulatorState::count),
    ("$first", AccumulatorState::first),
    ("$last", AccumulatorState::last),
    ("$max", AccumulatorState::max),
    ("$min", AccumulatorState::min),
    ("$push", AccumulatorState::push),
    ("$sum", AccumulatorState::sum),
];

/// Factory and canonical name for an operator
pub(crate) fn lookup(name: &str) -> Option<(&'static str, Factory)> {
    REGISTRY
        .binary_search_by(|(registered, _)| (*registered).cmp(name))
        .ok()
        .map(|pos| REGISTRY[pos])
}

/// Every registered operator name, sorted
pub fn registered_names() -> impl Iterator<Item = &'static str> {
    REGISTRY.iter().map(|(name, _)| *name)
}
