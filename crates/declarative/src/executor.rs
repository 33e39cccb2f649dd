//! Execution engine - applies a plan one action at a time
//!
//! The first fatal error stops execution. Actions already applied stay
//! applied.

use crate::context::ProgressCallback;
use crate::error::{Error, Result};
use crate::planner::{Action, Plan};
use crate::types::{ApplyResult, ExecuteSummary, ReconcileOptions};
use awskit::{IamClient, Outcome};

/// What an execution did
#[derive(Debug, Clone, Default)]
pub struct Execution {
    pub summary: ExecuteSummary,
    /// Actions that changed something, in order
    pub applied: Vec<Action>,
}

/// Execute a plan against IAM
///
/// With `opts.dry_run` every action is reported as skipped and no call is
/// made.
pub fn execute<P: ProgressCallback>(
    client: &IamClient,
    plan: &Plan,
    opts: &ReconcileOptions,
    progress: &mut P,
) -> Result<Execution> {
    let mut execution = Execution::default();

    for action in &plan.actions {
        progress.on_action_start(action);
        let result = if opts.dry_run {
            ApplyResult::Skipped {
                reason: "check mode".into(),
            }
        } else {
            apply_action(client, action)?
        };
        progress.on_action_complete(action, &result);

        execution.summary.add_result(&result);
        if result.is_change() {
            execution.applied.push(action.clone());
        }
    }

    Ok(execution)
}

/// Apply a single action, turning expected conditions into results
fn apply_action(client: &IamClient, action: &Action) -> Result<ApplyResult> {
    use ApplyResult::{Created, Modified, NoChange, Removed};

    let result = match action {
        Action::CreateUser { name, path } => match client.create_user(name, path)? {
            Outcome::Done(_) => Created,
            Outcome::AlreadyExists => NoChange,
            Outcome::NotFound => return Err(unexpected(action, "not found")),
        },
        Action::DeleteUser { name } => match client.delete_user(name)? {
            Outcome::Done(()) => Removed,
            Outcome::NotFound => NoChange,
            Outcome::AlreadyExists => return Err(unexpected(action, "already exists")),
        },
        Action::AttachPolicy { user, policy_arn } => {
            match client.attach_policy(user, policy_arn)? {
                Outcome::Done(()) => Modified,
                Outcome::NotFound => return Err(unexpected(action, "not found")),
                Outcome::AlreadyExists => return Err(unexpected(action, "already exists")),
            }
        }
        Action::DetachPolicy { user, policy_arn } => {
            match client.detach_policy(user, policy_arn)? {
                Outcome::Done(()) => Modified,
                Outcome::NotFound => NoChange,
                Outcome::AlreadyExists => return Err(unexpected(action, "already exists")),
            }
        }
        Action::CreateInstanceProfile { name, path } => {
            match client.create_instance_profile(name, path)? {
                Outcome::Done(()) => Created,
                Outcome::AlreadyExists => NoChange,
                Outcome::NotFound => return Err(unexpected(action, "not found")),
            }
        }
        Action::AddToInstanceProfile { profile, user } => {
            match client.add_to_instance_profile(profile, user)? {
                Outcome::Done(()) => Modified,
                Outcome::AlreadyExists => NoChange,
                Outcome::NotFound => return Err(unexpected(action, "not found")),
            }
        }
        Action::RemoveFromInstanceProfile { profile, user } => {
            match client.remove_from_instance_profile(profile, user)? {
                Outcome::Done(()) => Modified,
                Outcome::NotFound => NoChange,
                Outcome::AlreadyExists => return Err(unexpected(action, "already exists")),
            }
        }
        Action::DeleteInstanceProfile { name } => match client.delete_instance_profile(name)? {
            Outcome::Done(()) => Removed,
            Outcome::NotFound => NoChange,
            Outcome::AlreadyExists => return Err(unexpected(action, "already exists")),
        },
    };

    Ok(result)
}

/// An expected condition that is fatal for this particular action
fn unexpected(action: &Action, condition: &str) -> Error {
    Error::Unexpected {
        action: action.to_string(),
        condition: condition.to_string(),
    }
}
