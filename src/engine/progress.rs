//! Progress reporting for the `user` command

use declarative::{Action, ApplyResult, LogProgress, Plan, ProgressCallback};

use super::differ::display_plan;

/// Logs every action and optionally shows the plan
pub struct CliProgress {
    show_diff: bool,
    check: bool,
    log: LogProgress,
}

impl CliProgress {
    pub fn new(show_diff: bool, check: bool) -> Self {
        Self {
            show_diff,
            check,
            log: LogProgress,
        }
    }
}

impl ProgressCallback for CliProgress {
    fn on_plan(&mut self, plan: &Plan) {
        self.log.on_plan(plan);
        if self.show_diff {
            display_plan(plan, self.check);
        }
    }

    fn on_action_start(&mut self, action: &Action) {
        self.log.on_action_start(action);
    }

    fn on_action_complete(&mut self, action: &Action, result: &ApplyResult) {
        self.log.on_action_complete(action, result);
    }
}
