//! `awsmod user` - converge one IAM user
//!
//! Flags override values from `--params`. The record on stdout is
//! `{"changed": .., "iam_user": {..}}`; `iam_user` is left out once the
//! user is gone.

use anyhow::{Context as AnyhowContext, Result};
use awskit::IamClient;
use declarative::{DesiredUser, ObservedUser, PolicySelection, ReconcileOptions, reconcile};
use serde::Serialize;

use crate::Context;
use crate::cli::UserArgs;
use crate::config::{UserParams, load_params};
use crate::engine::CliProgress;

/// Record written on success
#[derive(Debug, Serialize)]
pub struct UserReport {
    pub changed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iam_user: Option<ObservedUser>,
}

pub fn run(ctx: &Context, args: &UserArgs) -> Result<UserReport> {
    let params = match &args.params {
        Some(path) => load_params(path)?,
        None => UserParams::default(),
    };
    let desired = desired_user(args, &params)?;

    let client = IamClient::connect(&ctx.connection)?;
    reconcile_user(&client, &desired, args)
}

/// Merge flags over file parameters
pub fn desired_user(args: &UserArgs, params: &UserParams) -> Result<DesiredUser> {
    let name = args
        .name
        .clone()
        .or_else(|| params.name.clone())
        .context("missing required arguments: name")?;
    let presence = args
        .state
        .map(Into::into)
        .or(params.state)
        .context("missing required arguments: state")?;

    let policies = if args.managed_policy.is_empty() {
        params.managed_policy_list().unwrap_or_default()
    } else {
        args.managed_policy.clone()
    };

    Ok(DesiredUser {
        name,
        path: args
            .path
            .clone()
            .or_else(|| params.path.clone())
            .unwrap_or_else(|| "/".to_string()),
        policies: PolicySelection::from_list(&policies)?,
        presence,
        purge_instance_profile: args.purge_instance_profile
            || params.purge_instance_profile.unwrap_or(false),
    })
}

/// Reconcile against a connected client
pub fn reconcile_user(
    client: &IamClient,
    desired: &DesiredUser,
    args: &UserArgs,
) -> Result<UserReport> {
    let opts = ReconcileOptions {
        dry_run: args.check,
    };
    let mut progress = CliProgress::new(args.diff, args.check);

    let result = reconcile(client, desired, &opts, &mut progress)?;
    Ok(UserReport {
        changed: result.changed,
        iam_user: result.user,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::StateArg;
    use awskit::backend::memory::MemoryIam;
    use declarative::Presence;
    use serde_json::json;
    use std::sync::Arc;

    const READ_ONLY: &str = "arn:aws:iam::aws:policy/ReadOnlyAccess";

    fn args(name: &str, state: StateArg) -> UserArgs {
        UserArgs {
            name: Some(name.into()),
            path: None,
            managed_policy: Vec::new(),
            state: Some(state),
            purge_instance_profile: false,
            check: false,
            diff: false,
            params: None,
        }
    }

    #[test]
    fn test_flags_override_params() {
        let mut args = args("joe", StateArg::Absent);
        args.managed_policy = vec![READ_ONLY.into()];
        let params = UserParams {
            name: Some("ignored".into()),
            path: Some("/ops/".into()),
            managed_policy: Some(vec![None]),
            state: Some(Presence::Present),
            purge_instance_profile: Some(true),
        };

        let desired = desired_user(&args, &params).unwrap();

        assert_eq!(desired.name, "joe");
        assert_eq!(desired.path, "/ops/");
        assert_eq!(desired.presence, Presence::Absent);
        assert!(desired.purge_instance_profile);
        assert!(matches!(desired.policies, PolicySelection::Set(_)));
    }

    #[test]
    fn test_params_sentinel_detaches_all() {
        let mut args = args("joe", StateArg::Present);
        args.name = None;
        let params = UserParams {
            name: Some("joe".into()),
            managed_policy: Some(vec![None]),
            ..Default::default()
        };

        let desired = desired_user(&args, &params).unwrap();
        assert_eq!(desired.policies, PolicySelection::DetachAll);
        assert_eq!(desired.path, "/");
    }

    #[test]
    fn test_missing_state_is_an_error() {
        let mut args = args("joe", StateArg::Present);
        args.state = None;

        let err = desired_user(&args, &UserParams::default()).unwrap_err();
        assert_eq!(err.to_string(), "missing required arguments: state");
    }

    #[test]
    fn test_report_shape() {
        let iam = Arc::new(MemoryIam::new());
        let client = IamClient::with_backend(Box::new(Arc::clone(&iam)));
        let mut args = args("joe", StateArg::Present);
        args.managed_policy = vec![READ_ONLY.into()];
        let desired = desired_user(&args, &UserParams::default()).unwrap();

        let report = reconcile_user(&client, &desired, &args).unwrap();
        let record = serde_json::to_value(&report).unwrap();

        assert_eq!(record["changed"], json!(true));
        assert_eq!(record["iam_user"]["name"], json!("joe"));
        assert_eq!(
            record["iam_user"]["attached_policy_arns"],
            json!([READ_ONLY])
        );
    }

    #[test]
    fn test_removed_user_has_no_record() {
        let iam = MemoryIam::new().with_user("joe", "/", Vec::<String>::new());
        let client = IamClient::with_backend(Box::new(iam));
        let args = args("joe", StateArg::Absent);
        let desired = desired_user(&args, &UserParams::default()).unwrap();

        let report = reconcile_user(&client, &desired, &args).unwrap();

        assert_eq!(
            serde_json::to_value(&report).unwrap(),
            json!({ "changed": true })
        );
    }

    #[test]
    fn test_check_flag_is_dry_run() {
        let iam = Arc::new(MemoryIam::new());
        let client = IamClient::with_backend(Box::new(Arc::clone(&iam)));
        let mut args = args("joe", StateArg::Present);
        args.check = true;
        let desired = desired_user(&args, &UserParams::default()).unwrap();

        let report = reconcile_user(&client, &desired, &args).unwrap();

        assert!(report.changed);
        assert!(report.iam_user.is_none());
        assert!(iam.mutations().is_empty());
    }
}
