//! The task driver steps a swap task to completion, running its cleanup if
//! any step fails
//!
//! Steps are never retried: a failed step aborts the task, the task's
//! compensations run, and the failure is surfaced to the caller

use std::fmt::{Debug, Display};

use async_trait::async_trait;
use common::types::outcome::SwapOutcome;
use tracing::{error, info};

use crate::error::{LedgerError, SwapError};

// --------------
// | Task Trait |
// --------------

/// A swap protocol expressed as a sequence of steps, each of which commits at
/// most one external effect
#[async_trait]
pub trait Task: Send {
    /// The state type of the task, used for task introspection
    type State: Debug + Display + Clone + Send;

    /// Get the current state of the task
    fn state(&self) -> Self::State;
    /// Whether or not the task is completed
    fn completed(&self) -> bool;
    /// Get a displayable name for the task
    fn name(&self) -> String;
    /// The settled result, available once the task completes
    fn outcome(&self) -> Option<SwapOutcome>;
    /// Take a step in the task
    async fn step(&mut self) -> Result<(), SwapError>;
    /// A cleanup step that is run in the event of a task failure
    async fn cleanup(&mut self) -> Result<(), LedgerError> {
        Ok(())
    }
}

// ---------------
// | Task Driver |
// ---------------

/// Run a task to completion
///
/// On a step failure the task's cleanup runs before the failure is returned;
/// if cleanup fails as well both errors are returned together
pub async fn run_task_to_completion<T: Task>(mut task: T) -> Result<SwapOutcome, SwapError> {
    let task_name = task.name();

    while !task.completed() {
        if let Err(e) = task.step().await {
            error!("error executing {task_name} step in state {}: {e}", task.state());
            return match task.cleanup().await {
                Ok(()) => Err(e),
                Err(cleanup) => {
                    error!("error cleaning up task {task_name}: {cleanup}");
                    Err(SwapError::Compensation { failure: Box::new(e), cleanup })
                },
            };
        }

        info!("task {task_name} transitioning to state {}", task.state());
    }

    task.outcome()
        .ok_or_else(|| SwapError::invariant_violation(format!("{task_name} completed without outcome")))
}
