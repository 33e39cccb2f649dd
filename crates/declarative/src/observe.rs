//! Observe the live state of an IAM user

use crate::error::Result;
use crate::types::ObservedUser;
use awskit::{IamClient, Outcome};

/// Read a user, its attached policies and its instance profiles
///
/// Returns `None` when the user does not exist, including when it
/// disappears between the calls. The profile listing goes through the role
/// endpoints, so "not found" there only means the name holds no profile.
pub fn observe_user(client: &IamClient, name: &str) -> Result<Option<ObservedUser>> {
    let Outcome::Done(record) = client.get_user(name)? else {
        log::debug!("User {name} does not exist");
        return Ok(None);
    };

    let policies = match client.attached_policies(name)? {
        Outcome::Done(policies) => policies,
        Outcome::NotFound | Outcome::AlreadyExists => {
            if client.get_user(name)?.is_done() {
                Vec::new()
            } else {
                log::debug!("User {name} disappeared while being read");
                return Ok(None);
            }
        }
    };
    let profiles = match client.instance_profiles(name)? {
        Outcome::Done(profiles) => profiles,
        Outcome::NotFound | Outcome::AlreadyExists => {
            log::debug!("No instance profiles for {name}");
            Vec::new()
        }
    };

    Ok(Some(ObservedUser {
        name: record.name,
        path: record.path,
        arn: record.arn,
        user_id: record.user_id,
        create_date: record.create_date,
        attached_policy_arns: policies.into_iter().map(|p| p.arn).collect(),
        instance_profiles: profiles.into_iter().map(|p| p.name).collect(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use awskit::backend::memory::MemoryIam;

    #[test]
    fn test_missing_user_is_none() {
        let client = IamClient::with_backend(Box::new(MemoryIam::new()));
        assert!(observe_user(&client, "joe").unwrap().is_none());
    }

    #[test]
    fn test_reads_policies_and_profiles() {
        let iam = MemoryIam::new()
            .with_user("joe", "/ops/", ["arn:aws:iam::aws:policy/ReadOnlyAccess"])
            .with_instance_profile("joe", Some("joe"));
        let client = IamClient::with_backend(Box::new(iam));

        let user = observe_user(&client, "joe").unwrap().unwrap();

        assert_eq!(user.path, "/ops/");
        assert_eq!(user.arn, "arn:aws:iam::123456789012:user/ops/joe");
        assert_eq!(user.attached_policy_arns.len(), 1);
        assert!(user.in_profile("joe"));
    }

    #[test]
    fn test_user_without_role_has_no_profiles() {
        let iam = MemoryIam::new()
            .with_role_keyed_profiles()
            .with_user("joe", "/", ["arn:aws:iam::aws:policy/ReadOnlyAccess"]);
        let client = IamClient::with_backend(Box::new(iam));

        let user = observe_user(&client, "joe").unwrap().unwrap();

        assert!(user.instance_profiles.is_empty());
        assert_eq!(user.attached_policy_arns.len(), 1);
    }

    #[test]
    fn test_policy_listing_not_found_rechecks_user() {
        let iam = MemoryIam::new().with_user("joe", "/", Vec::<String>::new());
        iam.fail_next(
            "ListAttachedUserPolicies",
            awskit::Error::NotFound {
                operation: "ListAttachedUserPolicies",
                message: "The user with name joe cannot be found.".into(),
            },
        );
        let client = IamClient::with_backend(Box::new(iam));

        let user = observe_user(&client, "joe").unwrap();

        assert!(user.is_some_and(|u| u.attached_policy_arns.is_empty()));
    }

    #[test]
    fn test_transport_error_propagates() {
        let iam = MemoryIam::new();
        iam.fail_next(
            "GetUser",
            awskit::Error::Transport {
                operation: "GetUser",
                code: Some("Throttling".into()),
                message: "Rate exceeded".into(),
            },
        );
        let client = IamClient::with_backend(Box::new(iam));

        assert_eq!(
            observe_user(&client, "joe").unwrap_err().to_string(),
            "Rate exceeded"
        );
    }
}
