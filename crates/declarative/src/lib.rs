//! # Declarative
//!
//! Declarative management of IAM users.
//!
//! This crate compares the desired state of a user with what IAM reports,
//! plans the corrective calls, and applies them one at a time.
//!
//! ## Core Concepts
//!
//! - **DesiredUser**: Name, path, managed policy selection and presence
//! - **ObservedUser**: What IAM reports, read fresh on every run
//! - **Plan**: Ordered actions built by a pure planner
//! - **Executor**: Applies actions sequentially; the first fatal error stops it
//!
//! ## Example
//!
//! ```ignore
//! use awskit::{ConnectionSettings, IamClient};
//! use declarative::{
//!     reconcile, DesiredUser, LogProgress, PolicySelection, ReconcileOptions,
//! };
//!
//! let client = IamClient::connect(&ConnectionSettings::default())?;
//! let policies = PolicySelection::from_list(&[
//!     "arn:aws:iam::aws:policy/ReadOnlyAccess".to_string(),
//! ])?;
//! let desired = DesiredUser::present("joe.blogs").with_policies(policies);
//!
//! let result = reconcile(&client, &desired, &ReconcileOptions::default(), &mut LogProgress)?;
//! println!("changed: {}", result.changed);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Progress
//!
//! [`ProgressCallback`] receives the plan and each action's result, so the
//! crate carries no UI of its own.

pub mod context;
pub mod diff;
pub mod error;
pub mod executor;
pub mod observe;
pub mod planner;
pub mod types;

// Re-export main types at crate root
pub use context::{LogProgress, NoProgress, ProgressCallback};
pub use diff::PolicyDelta;
pub use error::{Error, Result};
pub use executor::{Execution, execute};
pub use observe::observe_user;
pub use planner::{Action, Plan, plan};
pub use types::{
    ApplyResult, DesiredUser, ExecuteSummary, ObservedUser, PolicySelection, Presence,
    ReconcileOptions,
};

use awskit::IamClient;
use serde::Serialize;

/// Outcome of one reconciliation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReconcileResult {
    /// Whether anything changed (in check mode: whether anything would)
    pub changed: bool,
    /// Final state; `None` once the user is gone
    pub user: Option<ObservedUser>,
    /// Actions that changed something; in check mode, the planned actions
    pub applied: Vec<Action>,
}

/// Converge one IAM user to its desired state
///
/// Observes, plans, executes, then observes again. In check mode the plan
/// is reported but nothing is applied, and `user` is the state before any
/// change.
pub fn reconcile<P: ProgressCallback>(
    client: &IamClient,
    desired: &DesiredUser,
    opts: &ReconcileOptions,
    progress: &mut P,
) -> Result<ReconcileResult> {
    desired.validate()?;

    let observed = observe_user(client, &desired.name)?;
    let plan = plan(desired, observed.as_ref());
    progress.on_plan(&plan);

    if plan.is_empty() {
        return Ok(ReconcileResult {
            changed: false,
            user: observed,
            applied: Vec::new(),
        });
    }

    let execution = execute(client, &plan, opts, progress)?;

    if opts.dry_run {
        return Ok(ReconcileResult {
            changed: true,
            user: observed,
            applied: plan.actions,
        });
    }

    log::info!(
        "Reconciled user {}: {} of {} actions changed something",
        desired.name,
        execution.summary.total_changes(),
        execution.summary.total()
    );

    Ok(ReconcileResult {
        changed: !execution.applied.is_empty(),
        user: observe_user(client, &desired.name)?,
        applied: execution.applied,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use awskit::backend::memory::MemoryIam;
    use std::collections::BTreeSet;
    use std::sync::Arc;

    const READ_ONLY: &str = "arn:aws:iam::aws:policy/ReadOnlyAccess";
    const S3: &str = "arn:aws:iam::aws:policy/AmazonS3FullAccess";
    const EC2: &str = "arn:aws:iam::aws:policy/AmazonEC2FullAccess";

    fn client(iam: MemoryIam) -> (IamClient, Arc<MemoryIam>) {
        let iam = Arc::new(iam);
        (IamClient::with_backend(Box::new(Arc::clone(&iam))), iam)
    }

    fn policies(arns: &[&str]) -> PolicySelection {
        PolicySelection::from_list(&arns.iter().map(|s| s.to_string()).collect::<Vec<_>>())
            .unwrap()
    }

    fn run(client: &IamClient, desired: &DesiredUser) -> ReconcileResult {
        reconcile(client, desired, &ReconcileOptions::default(), &mut NoProgress).unwrap()
    }

    #[test]
    fn test_second_run_changes_nothing() {
        let (client, iam) = client(MemoryIam::new());
        let desired = DesiredUser::present("joe").with_policies(policies(&[READ_ONLY]));

        let first = run(&client, &desired);
        iam.clear_calls();
        let second = run(&client, &desired);

        assert!(first.changed);
        assert!(!second.changed);
        assert_eq!(first.user, second.user);
        assert!(iam.mutations().is_empty());
    }

    #[test]
    fn test_converges_to_exact_set() {
        let (client, iam) =
            client(MemoryIam::new().with_user("joe", "/", [READ_ONLY, S3]));
        let desired = DesiredUser::present("joe").with_policies(policies(&[S3, EC2]));

        let result = run(&client, &desired);

        let expected: BTreeSet<String> = [S3, EC2].iter().map(|s| s.to_string()).collect();
        assert!(result.changed);
        assert_eq!(iam.policies_of("joe"), expected);
        assert_eq!(
            result.user.map(|u| u.attached_policy_arns),
            Some(expected)
        );
    }

    #[test]
    fn test_detach_all_sentinel_empties_policies() {
        let (client, iam) =
            client(MemoryIam::new().with_user("joe", "/", [READ_ONLY, S3]));
        let desired = DesiredUser::present("joe").with_policies(policies(&[""]));

        run(&client, &desired);

        assert!(iam.policies_of("joe").is_empty());
    }

    #[test]
    fn test_no_change_selection_keeps_policies() {
        let (client, iam) = client(
            MemoryIam::new()
                .with_user("joe", "/", [READ_ONLY])
                .with_instance_profile("joe", Some("joe")),
        );
        let desired = DesiredUser::present("joe").with_policies(policies(&[]));

        let result = run(&client, &desired);

        assert!(!result.changed);
        assert!(iam.policies_of("joe").contains(READ_ONLY));
    }

    #[test]
    fn test_absent_to_absent_makes_no_mutations() {
        let (client, iam) = client(MemoryIam::new());

        let result = run(&client, &DesiredUser::absent("joe"));

        assert!(!result.changed);
        assert!(result.user.is_none());
        assert!(iam.mutations().is_empty());
    }

    #[test]
    fn test_removal_leaves_profiles_before_delete() {
        let (client, iam) = client(
            MemoryIam::new()
                .with_user("joe", "/", [READ_ONLY])
                .with_instance_profile("joe", Some("joe")),
        );

        let result = run(&client, &DesiredUser::absent("joe"));

        assert!(result.changed);
        assert!(result.user.is_none());
        assert!(!iam.has_user("joe"));
        assert!(iam.has_instance_profile("joe"));

        let mutations = iam.mutations();
        let remove = mutations
            .iter()
            .position(|c| c.starts_with("RemoveUserFromInstanceProfile"));
        let delete = mutations.iter().position(|c| c.starts_with("DeleteUser"));
        assert!(remove.is_some());
        assert!(remove < delete);
    }

    #[test]
    fn test_removes_user_without_same_named_role() {
        let (client, iam) = client(
            MemoryIam::new()
                .with_role_keyed_profiles()
                .with_user("joe", "/", [READ_ONLY]),
        );

        let result = run(&client, &DesiredUser::absent("joe"));

        assert!(result.changed);
        assert!(result.user.is_none());
        assert!(!iam.has_user("joe"));
        assert_eq!(
            iam.mutations(),
            vec![format!("DetachUserPolicy joe {READ_ONLY}"), "DeleteUser joe".to_string()]
        );
    }

    #[test]
    fn test_detach_all_without_same_named_role() {
        let (client, iam) = client(
            MemoryIam::new()
                .with_role_keyed_profiles()
                .with_user("joe", "/", [READ_ONLY, S3]),
        );
        let desired = DesiredUser::present("joe").with_policies(policies(&[""]));

        let err = reconcile(&client, &desired, &ReconcileOptions::default(), &mut NoProgress)
            .unwrap_err();

        assert!(iam.policies_of("joe").is_empty());
        assert!(iam.has_user("joe"));
        assert!(
            matches!(err, Error::Unexpected { ref action, .. } if action.starts_with("add joe to"))
        );
        assert!(!iam.mutations().iter().any(|c| c.starts_with("CreateUser")));
    }

    #[test]
    fn test_role_keyed_profile_converges() {
        let (client, iam) = client(
            MemoryIam::new()
                .with_role("joe")
                .with_user("joe", "/", [READ_ONLY]),
        );
        let desired = DesiredUser::present("joe").with_policies(policies(&[S3]));

        let first = run(&client, &desired);
        iam.clear_calls();
        let second = run(&client, &desired);

        assert!(first.changed);
        assert!(!second.changed);
        let user = second.user.unwrap();
        assert!(user.in_profile("joe"));
        assert_eq!(user.attached_policy_arns, BTreeSet::from([S3.to_string()]));
    }

    #[test]
    fn test_purge_removes_instance_profile() {
        let (client, iam) = client(
            MemoryIam::new()
                .with_user("joe", "/", Vec::<String>::new())
                .with_instance_profile("joe", Some("joe")),
        );
        let desired = DesiredUser::absent("joe").with_purge_instance_profile(true);

        run(&client, &desired);

        assert!(!iam.has_instance_profile("joe"));
    }

    #[test]
    fn test_creates_user_and_instance_profile() {
        let (client, iam) = client(MemoryIam::new());
        let desired = DesiredUser::present("joe").with_path("/ops/");

        let result = run(&client, &desired);

        let user = result.user.unwrap();
        assert_eq!(user.path, "/ops/");
        assert!(user.in_profile("joe"));
        assert!(iam.has_instance_profile("joe"));
        assert_eq!(
            iam.mutations(),
            vec![
                "CreateUser joe /ops/",
                "CreateInstanceProfile joe /ops/",
                "AddUserToInstanceProfile joe joe",
            ]
        );
    }

    #[test]
    fn test_existing_profile_is_tolerated() {
        let (client, iam) = client(
            MemoryIam::new()
                .with_user("joe", "/", Vec::<String>::new())
                .with_instance_profile("joe", None),
        );

        let result = run(&client, &DesiredUser::present("joe"));

        assert!(result.changed);
        assert_eq!(
            result.applied,
            vec![Action::AddToInstanceProfile {
                profile: "joe".into(),
                user: "joe".into()
            }]
        );
        assert!(iam.has_instance_profile("joe"));
    }

    #[test]
    fn test_check_mode_makes_no_mutations() {
        let (client, iam) = client(MemoryIam::new().with_user("joe", "/", [READ_ONLY]));
        let desired = DesiredUser::present("joe").with_policies(policies(&[S3]));
        let opts = ReconcileOptions { dry_run: true };

        let result = reconcile(&client, &desired, &opts, &mut NoProgress).unwrap();

        assert!(result.changed);
        assert_eq!(result.applied.len(), 4);
        assert!(iam.mutations().is_empty());
        assert_eq!(
            result.user.map(|u| u.attached_policy_arns.len()),
            Some(1)
        );
    }

    #[test]
    fn test_invalid_path_makes_no_calls() {
        let (client, iam) = client(MemoryIam::new());
        let desired = DesiredUser::present("joe").with_path("ops");

        let err = reconcile(&client, &desired, &ReconcileOptions::default(), &mut NoProgress)
            .unwrap_err();

        assert!(matches!(err, Error::InvalidPath(_)));
        assert!(iam.calls().is_empty());
    }

    #[test]
    fn test_abort_keeps_earlier_changes() {
        let (client, iam) = client(MemoryIam::new().with_known_policies([READ_ONLY]));
        let desired = DesiredUser::present("joe")
            .with_policies(policies(&["arn:aws:iam::aws:policy/Missing"]));

        let err = reconcile(&client, &desired, &ReconcileOptions::default(), &mut NoProgress)
            .unwrap_err();

        assert!(matches!(err, Error::Unexpected { .. }));
        assert!(iam.has_user("joe"));
        assert!(!iam.has_instance_profile("joe"));
    }

    /// Records every callback so ordering can be checked.
    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
    }

    impl ProgressCallback for Recorder {
        fn on_plan(&mut self, plan: &Plan) {
            self.events.push(format!("plan {}", plan.len()));
        }

        fn on_action_start(&mut self, action: &Action) {
            self.events.push(format!("start {}", action.id()));
        }

        fn on_action_complete(&mut self, action: &Action, result: &ApplyResult) {
            self.events.push(format!("done {} {:?}", action.id(), result));
        }
    }

    #[test]
    fn test_progress_sees_plan_then_actions() {
        let (client, _) = client(MemoryIam::new().with_instance_profile("joe", None));
        let mut recorder = Recorder::default();

        reconcile(
            &client,
            &DesiredUser::present("joe"),
            &ReconcileOptions::default(),
            &mut recorder,
        )
        .unwrap();

        assert_eq!(
            recorder.events,
            vec![
                "plan 3",
                "start user:joe",
                "done user:joe Created",
                "start instance-profile:joe",
                "done instance-profile:joe NoChange",
                "start instance-profile:joe",
                "done instance-profile:joe Modified",
            ]
        );
    }
}
