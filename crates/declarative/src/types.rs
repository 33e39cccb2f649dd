//! Core types for declarative user management

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Whether the user should exist
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Presence {
    /// The user should exist
    #[default]
    Present,
    /// The user should not exist
    Absent,
}

/// Which managed policies the user should carry
///
/// Policy lists arrive as plain string lists where `[]` and `[""]` mean
/// different things. This type names the three cases.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolicySelection {
    /// Leave attached policies alone
    #[default]
    NoChange,
    /// Detach every attached policy
    DetachAll,
    /// Converge to exactly this set
    Set(BTreeSet<String>),
}

impl PolicySelection {
    /// Interpret a policy list
    ///
    /// - `[]` is [`NoChange`](Self::NoChange)
    /// - `[""]` is [`DetachAll`](Self::DetachAll)
    /// - ARNs are a [`Set`](Self::Set); duplicates collapse
    ///
    /// An empty entry next to real ARNs is rejected.
    pub fn from_list(arns: &[String]) -> Result<Self> {
        if arns.is_empty() {
            return Ok(Self::NoChange);
        }
        let blanks = arns.iter().filter(|a| a.trim().is_empty()).count();
        match blanks {
            0 => Ok(Self::Set(arns.iter().cloned().collect())),
            n if n == arns.len() && n == 1 => Ok(Self::DetachAll),
            _ => Err(Error::InvalidPolicySelection(arns.to_vec())),
        }
    }

    /// The desired set, or `None` when policies should be left alone
    pub fn desired(&self) -> Option<BTreeSet<String>> {
        match self {
            Self::NoChange => None,
            Self::DetachAll => Some(BTreeSet::new()),
            Self::Set(arns) => Some(arns.clone()),
        }
    }
}

/// Desired state of one IAM user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesiredUser {
    /// User name (unique key)
    pub name: String,
    /// IAM path for the user and its instance profile
    pub path: String,
    /// Managed policies the user should carry
    pub policies: PolicySelection,
    /// Whether the user should exist
    pub presence: Presence,
    /// On removal, also delete the instance profile named after the user
    pub purge_instance_profile: bool,
}

impl DesiredUser {
    /// A present user at `/` with policies left alone
    pub fn present(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: "/".to_string(),
            policies: PolicySelection::NoChange,
            presence: Presence::Present,
            purge_instance_profile: false,
        }
    }

    /// An absent user
    pub fn absent(name: impl Into<String>) -> Self {
        Self {
            presence: Presence::Absent,
            ..Self::present(name)
        }
    }

    /// Set the path
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    /// Set the policy selection
    pub fn with_policies(mut self, policies: PolicySelection) -> Self {
        self.policies = policies;
        self
    }

    /// Also delete the user's instance profile on removal
    pub fn with_purge_instance_profile(mut self, purge: bool) -> Self {
        self.purge_instance_profile = purge;
        self
    }

    /// Check the fields before anything is sent to IAM
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::InvalidName);
        }
        if !self.path.starts_with('/') || !self.path.ends_with('/') {
            return Err(Error::InvalidPath(self.path.clone()));
        }
        Ok(())
    }
}

/// Live state of an IAM user, read fresh on every run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservedUser {
    /// User name
    pub name: String,
    /// IAM path the user was created under
    pub path: String,
    /// User ARN
    pub arn: String,
    /// Stable unique ID assigned by IAM
    pub user_id: String,
    /// Creation time (ISO 8601), when reported
    pub create_date: Option<String>,
    /// ARNs of attached managed policies
    pub attached_policy_arns: BTreeSet<String>,
    /// Names of instance profiles holding this user
    pub instance_profiles: BTreeSet<String>,
}

impl ObservedUser {
    /// Check if the user belongs to the named instance profile
    pub fn in_profile(&self, profile: &str) -> bool {
        self.instance_profiles.contains(profile)
    }
}

/// Result of applying one action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApplyResult {
    /// Already in the desired state
    NoChange,
    /// Something was created
    Created,
    /// Something was attached or detached
    Modified,
    /// Something was removed
    Removed,
    /// Not applied (dry run)
    Skipped { reason: String },
}

impl ApplyResult {
    /// Check if the result represents a change
    pub fn is_change(&self) -> bool {
        matches!(self, Self::Created | Self::Modified | Self::Removed)
    }
}

/// Summary of execution results
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecuteSummary {
    /// Actions that created something
    pub created: usize,
    /// Actions that changed an existing resource
    pub modified: usize,
    /// Actions that deleted something
    pub removed: usize,
    /// Actions not applied (check mode)
    pub skipped: usize,
    /// Actions that found nothing to do
    pub no_change: usize,
}

impl ExecuteSummary {
    /// Total number of actual changes made
    pub fn total_changes(&self) -> usize {
        self.created + self.modified + self.removed
    }

    /// Total number of actions processed
    pub fn total(&self) -> usize {
        self.created + self.modified + self.removed + self.skipped + self.no_change
    }

    /// Add a result to the summary
    pub fn add_result(&mut self, result: &ApplyResult) {
        match result {
            ApplyResult::NoChange => self.no_change += 1,
            ApplyResult::Created => self.created += 1,
            ApplyResult::Modified => self.modified += 1,
            ApplyResult::Removed => self.removed += 1,
            ApplyResult::Skipped { .. } => self.skipped += 1,
        }
    }
}

/// Options for a reconciliation run
#[derive(Debug, Clone, Default)]
pub struct ReconcileOptions {
    /// Plan only; make no changes
    pub dry_run: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_empty_list_is_no_change() {
        assert_eq!(
            PolicySelection::from_list(&[]).unwrap(),
            PolicySelection::NoChange
        );
    }

    #[test]
    fn test_single_blank_is_detach_all() {
        assert_eq!(
            PolicySelection::from_list(&list(&[""])).unwrap(),
            PolicySelection::DetachAll
        );
        assert_eq!(PolicySelection::DetachAll.desired(), Some(BTreeSet::new()));
    }

    #[test]
    fn test_arns_collapse_duplicates() {
        let selection = PolicySelection::from_list(&list(&[
            "arn:aws:iam::aws:policy/ReadOnlyAccess",
            "arn:aws:iam::aws:policy/ReadOnlyAccess",
        ]))
        .unwrap();
        assert_eq!(selection.desired().map(|s| s.len()), Some(1));
    }

    #[test]
    fn test_blank_mixed_with_arns_rejected() {
        let err =
            PolicySelection::from_list(&list(&["", "arn:aws:iam::aws:policy/ReadOnlyAccess"]))
                .unwrap_err();
        assert!(matches!(err, Error::InvalidPolicySelection(_)));

        assert!(PolicySelection::from_list(&list(&["", ""])).is_err());
    }

    #[test]
    fn test_validate_path() {
        assert!(DesiredUser::present("joe").validate().is_ok());
        assert!(
            DesiredUser::present("joe")
                .with_path("/ops/")
                .validate()
                .is_ok()
        );
        assert!(matches!(
            DesiredUser::present("joe").with_path("ops").validate(),
            Err(Error::InvalidPath(_))
        ));
        assert!(matches!(
            DesiredUser::present(" ").validate(),
            Err(Error::InvalidName)
        ));
    }

    #[test]
    fn test_summary_counts_changes() {
        let mut summary = ExecuteSummary::default();
        summary.add_result(&ApplyResult::Created);
        summary.add_result(&ApplyResult::NoChange);
        summary.add_result(&ApplyResult::Skipped {
            reason: "dry run".into(),
        });
        assert_eq!(summary.total_changes(), 1);
        assert_eq!(summary.total(), 3);
    }
}
