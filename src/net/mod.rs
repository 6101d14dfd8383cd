/// Relay-facing protocol layer. Transport itself is external; the core
/// only produces and consumes tagged messages.

pub mod protocol;
