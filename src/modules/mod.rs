//! Supporting subsystems layered around the pipeline.

pub mod events;

pub use events::{
    EventDispatcher, EventHandler, FailureEvent, FinishedEvent, LoggingHandler, PipelineEvent,
    RoundEvent, StageEvent,
};
