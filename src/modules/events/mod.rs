//! Event system for pipeline runs.
//!
//! Provides hooks for logging and custom reactions around stage transitions.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;

use crate::challenges::pipeline::PipelineStage;

/// A stage of a round has started.
#[derive(Debug, Clone)]
pub struct StageEvent {
    pub puzzle: &'static str,
    pub round: usize,
    pub stage: PipelineStage,
    pub timestamp: DateTime<Utc>,
}

/// A round finished its submit stage.
#[derive(Debug, Clone)]
pub struct RoundEvent {
    pub puzzle: &'static str,
    pub round: usize,
    pub total_rounds: usize,
    pub challenge: String,
    pub solution: String,
    pub elapsed: Duration,
    pub timestamp: DateTime<Utc>,
}

/// The run reached `Done`.
#[derive(Debug, Clone)]
pub struct FinishedEvent {
    pub puzzle: &'static str,
    pub rounds: usize,
    pub message: Option<String>,
    pub elapsed: Duration,
    pub timestamp: DateTime<Utc>,
}

/// The run reached `Failed`.
#[derive(Debug, Clone)]
pub struct FailureEvent {
    pub puzzle: &'static str,
    pub round: usize,
    pub stage: PipelineStage,
    pub error: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub enum PipelineEvent {
    Stage(StageEvent),
    Round(RoundEvent),
    Finished(FinishedEvent),
    Failure(FailureEvent),
}

/// Trait implemented by event handlers.
pub trait EventHandler: Send + Sync {
    fn handle(&self, event: &PipelineEvent);
}

/// Dispatcher that broadcasts events to registered handlers.
#[derive(Default)]
pub struct EventDispatcher {
    handlers: Vec<Arc<dyn EventHandler>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    /// Dispatcher with a [`LoggingHandler`] already registered.
    pub fn with_logging() -> Self {
        let mut dispatcher = Self::new();
        dispatcher.register_handler(Arc::new(LoggingHandler));
        dispatcher
    }

    pub fn register_handler(&mut self, handler: Arc<dyn EventHandler>) {
        self.handlers.push(handler);
    }

    pub fn dispatch(&self, event: PipelineEvent) {
        for handler in &self.handlers {
            handler.handle(&event);
        }
    }
}

/// Logs events using the `log` crate.
#[derive(Debug)]
pub struct LoggingHandler;

impl EventHandler for LoggingHandler {
    fn handle(&self, event: &PipelineEvent) {
        match event {
            PipelineEvent::Stage(stage) => {
                log::debug!("{} round {}: {}", stage.puzzle, stage.round, stage.stage);
            }
            PipelineEvent::Round(round) => {
                log::info!(
                    "{} {}/{} challenge: {}, solution: {} ({:.2}s)",
                    round.puzzle,
                    round.round,
                    round.total_rounds,
                    round.challenge,
                    round.solution,
                    round.elapsed.as_secs_f64()
                );
            }
            PipelineEvent::Finished(done) => {
                log::info!(
                    "{} finished {} round(s) in {:.2}s",
                    done.puzzle,
                    done.rounds,
                    done.elapsed.as_secs_f64()
                );
                if let Some(message) = &done.message {
                    log::info!("server response: {message}");
                }
            }
            PipelineEvent::Failure(failure) => {
                log::warn!(
                    "{} round {} failed while {}: {}",
                    failure.puzzle,
                    failure.round,
                    failure.stage,
                    failure.error
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CountingHandler(std::sync::Mutex<usize>);

    impl EventHandler for CountingHandler {
        fn handle(&self, _event: &PipelineEvent) {
            *self.0.lock().unwrap() += 1;
        }
    }

    #[test]
    fn dispatches_to_handlers() {
        let mut dispatcher = EventDispatcher::with_logging();
        let counter = Arc::new(CountingHandler(std::sync::Mutex::new(0)));
        dispatcher.register_handler(counter.clone());
        dispatcher.dispatch(PipelineEvent::Failure(FailureEvent {
            puzzle: "quadratic",
            round: 3,
            stage: PipelineStage::Fetching,
            error: "connection closed by peer".into(),
            timestamp: Utc::now(),
        }));
        assert_eq!(*counter.0.lock().unwrap(), 1);
    }
}
