//! Planner - turns desired and observed state into ordered actions
//!
//! Planning is pure: it reads nothing from IAM. The executor applies the
//! actions in the order they appear here.

use crate::diff::PolicyDelta;
use crate::types::{DesiredUser, ObservedUser, Presence};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// One corrective IAM call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    CreateUser { name: String, path: String },
    DeleteUser { name: String },
    DetachPolicy { user: String, policy_arn: String },
    AttachPolicy { user: String, policy_arn: String },
    CreateInstanceProfile { name: String, path: String },
    AddToInstanceProfile { profile: String, user: String },
    RemoveFromInstanceProfile { profile: String, user: String },
    DeleteInstanceProfile { name: String },
}

impl Action {
    /// Short identifier for progress output
    pub fn id(&self) -> String {
        match self {
            Self::CreateUser { name, .. } | Self::DeleteUser { name } => format!("user:{name}"),
            Self::DetachPolicy { policy_arn, .. } | Self::AttachPolicy { policy_arn, .. } => {
                format!("policy:{policy_arn}")
            }
            Self::CreateInstanceProfile { name, .. } | Self::DeleteInstanceProfile { name } => {
                format!("instance-profile:{name}")
            }
            Self::AddToInstanceProfile { profile, .. }
            | Self::RemoveFromInstanceProfile { profile, .. } => {
                format!("instance-profile:{profile}")
            }
        }
    }

    /// Check if this action takes something away
    pub fn is_removal(&self) -> bool {
        matches!(
            self,
            Self::DeleteUser { .. }
                | Self::DetachPolicy { .. }
                | Self::RemoveFromInstanceProfile { .. }
                | Self::DeleteInstanceProfile { .. }
        )
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CreateUser { name, path } => write!(f, "create user {name} at {path}"),
            Self::DeleteUser { name } => write!(f, "delete user {name}"),
            Self::DetachPolicy { user, policy_arn } => {
                write!(f, "detach {policy_arn} from {user}")
            }
            Self::AttachPolicy { user, policy_arn } => write!(f, "attach {policy_arn} to {user}"),
            Self::CreateInstanceProfile { name, path } => {
                write!(f, "create instance profile {name} at {path}")
            }
            Self::AddToInstanceProfile { profile, user } => {
                write!(f, "add {user} to instance profile {profile}")
            }
            Self::RemoveFromInstanceProfile { profile, user } => {
                write!(f, "remove {user} from instance profile {profile}")
            }
            Self::DeleteInstanceProfile { name } => write!(f, "delete instance profile {name}"),
        }
    }
}

/// An ordered list of actions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    pub actions: Vec<Action>,
}

impl Plan {
    /// Create a new empty plan
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if the plan has no actions
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Number of actions
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    fn push(&mut self, action: Action) {
        self.actions.push(action);
    }
}

/// Build the plan that converges `observed` to `desired`
///
/// Removal runs profile detachment and policy detachment before the
/// delete, since IAM refuses to delete a user that still has either.
/// Otherwise policy detachments come before attachments, and the
/// same-named instance profile is ensured last.
pub fn plan(desired: &DesiredUser, observed: Option<&ObservedUser>) -> Plan {
    let mut plan = Plan::new();

    match (desired.presence, observed) {
        (Presence::Absent, None) => {}

        (Presence::Absent, Some(user)) => {
            for profile in &user.instance_profiles {
                plan.push(Action::RemoveFromInstanceProfile {
                    profile: profile.clone(),
                    user: user.name.clone(),
                });
            }
            for policy_arn in &user.attached_policy_arns {
                plan.push(Action::DetachPolicy {
                    user: user.name.clone(),
                    policy_arn: policy_arn.clone(),
                });
            }
            plan.push(Action::DeleteUser {
                name: user.name.clone(),
            });
            if desired.purge_instance_profile {
                plan.push(Action::DeleteInstanceProfile {
                    name: user.name.clone(),
                });
            }
        }

        (Presence::Present, observed) => {
            let empty = BTreeSet::new();
            let (attached, in_profile) = match observed {
                Some(user) => (&user.attached_policy_arns, user.in_profile(&desired.name)),
                None => {
                    plan.push(Action::CreateUser {
                        name: desired.name.clone(),
                        path: desired.path.clone(),
                    });
                    (&empty, false)
                }
            };

            let delta = PolicyDelta::compute(attached, &desired.policies);
            for policy_arn in delta.to_detach {
                plan.push(Action::DetachPolicy {
                    user: desired.name.clone(),
                    policy_arn,
                });
            }
            for policy_arn in delta.to_attach {
                plan.push(Action::AttachPolicy {
                    user: desired.name.clone(),
                    policy_arn,
                });
            }

            if !in_profile {
                plan.push(Action::CreateInstanceProfile {
                    name: desired.name.clone(),
                    path: desired.path.clone(),
                });
                plan.push(Action::AddToInstanceProfile {
                    profile: desired.name.clone(),
                    user: desired.name.clone(),
                });
            }
        }
    }

    log::debug!("Planned {} actions for user {}", plan.len(), desired.name);
    plan
}
