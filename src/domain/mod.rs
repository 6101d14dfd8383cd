/// Pure domain layer: grid geometry, entities, and legality rules.
/// No simulation state, no timers, no I/O.

pub mod entity;
pub mod grid;
pub mod rules;
