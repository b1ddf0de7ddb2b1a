// Aggregates the transport core, the per-puzzle solvers, and the round pipeline.

pub mod core;
pub mod pipeline;
pub mod solvers;
