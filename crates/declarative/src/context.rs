//! Progress callbacks
//!
//! These let the reconciler report what it does without depending on a
//! particular UI.

use crate::planner::{Action, Plan};
use crate::types::ApplyResult;

/// Progress callback for reconciliation
///
/// Implement this trait to receive updates as a plan is built and applied.
pub trait ProgressCallback: Send {
    /// Called once the plan is known, before anything is applied
    fn on_plan(&mut self, plan: &Plan);

    /// Called when starting to apply a single action
    fn on_action_start(&mut self, action: &Action);

    /// Called when an action completes
    fn on_action_complete(&mut self, action: &Action, result: &ApplyResult);
}

/// No-op progress callback
pub struct NoProgress;

impl ProgressCallback for NoProgress {
    fn on_plan(&mut self, _plan: &Plan) {}
    fn on_action_start(&mut self, _action: &Action) {}
    fn on_action_complete(&mut self, _action: &Action, _result: &ApplyResult) {}
}

/// Progress callback that writes to the `log` facade
///
/// Changes are logged at `info`, everything else at `debug`.
pub struct LogProgress;

impl ProgressCallback for LogProgress {
    fn on_plan(&mut self, plan: &Plan) {
        log::debug!("Plan has {} actions", plan.len());
    }

    fn on_action_start(&mut self, action: &Action) {
        log::debug!("Applying {} ({})", action, action.id());
    }

    fn on_action_complete(&mut self, action: &Action, result: &ApplyResult) {
        match result {
            r if r.is_change() => log::info!("{action}: {r:?}"),
            ApplyResult::Skipped { reason } => log::debug!("{action}: skipped ({reason})"),
            _ => log::debug!("{action}: no change"),
        }
    }
}
