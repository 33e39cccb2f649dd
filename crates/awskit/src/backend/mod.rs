//! Backend abstraction for IAM and ECS.
//!
//! The [`IamBackend`] and [`EcsBackend`] traits are the raw API surface,
//! one method per service call, allowing for different implementations
//! (the AWS SDK, an in-memory fake for testing).
//!
//! Backends report every failure as an [`Error`](crate::Error); turning
//! "not found" and "already exists" into states is the job of
//! [`IamClient`](crate::IamClient).

pub mod memory;
#[cfg(feature = "sdk")]
mod ecs_json;
#[cfg(feature = "sdk")]
pub mod sdk;

use crate::error::Result;
use crate::types::{
    AttachedPolicy, InstanceProfile, TaskDefinitionPage, TaskDefinitionQuery, UserRecord,
};
use std::sync::Arc;

/// Backend trait for IAM user operations.
pub trait IamBackend: Send + Sync {
    /// Fetch a user by name.
    fn get_user(&self, name: &str) -> Result<UserRecord>;

    /// Create a user under a path.
    fn create_user(&self, name: &str, path: &str) -> Result<UserRecord>;

    /// Delete a user.
    fn delete_user(&self, name: &str) -> Result<()>;

    /// List all managed policies attached to a user.
    fn list_attached_user_policies(&self, user: &str) -> Result<Vec<AttachedPolicy>>;

    /// Attach a managed policy to a user.
    fn attach_user_policy(&self, user: &str, policy_arn: &str) -> Result<()>;

    /// Detach a managed policy from a user.
    fn detach_user_policy(&self, user: &str, policy_arn: &str) -> Result<()>;

    /// List the instance profiles a user belongs to.
    ///
    /// "Not found" can mean the name has no profile membership at all,
    /// not only that the user is missing.
    fn list_instance_profiles_for_user(&self, user: &str) -> Result<Vec<InstanceProfile>>;

    /// Create an instance profile.
    fn create_instance_profile(&self, name: &str, path: &str) -> Result<()>;

    /// Delete an instance profile.
    fn delete_instance_profile(&self, name: &str) -> Result<()>;

    /// Add a user to an instance profile.
    fn add_user_to_instance_profile(&self, profile: &str, user: &str) -> Result<()>;

    /// Remove a user from an instance profile.
    fn remove_user_from_instance_profile(&self, profile: &str, user: &str) -> Result<()>;
}

/// Backend trait for ECS task definition operations.
pub trait EcsBackend: Send + Sync {
    /// Fetch one page of task definition ARNs.
    fn list_task_definitions(
        &self,
        query: &TaskDefinitionQuery,
        next_token: Option<&str>,
    ) -> Result<TaskDefinitionPage>;

    /// Fetch the detail record of one task definition.
    ///
    /// The record uses the service's own camelCase keys.
    fn describe_task_definition(&self, task_definition: &str) -> Result<serde_json::Value>;
}

// A shared backend can be handed to a client while the caller keeps a
// handle on it.

impl<T: IamBackend + ?Sized> IamBackend for Arc<T> {
    fn get_user(&self, name: &str) -> Result<UserRecord> {
        (**self).get_user(name)
    }

    fn create_user(&self, name: &str, path: &str) -> Result<UserRecord> {
        (**self).create_user(name, path)
    }

    fn delete_user(&self, name: &str) -> Result<()> {
        (**self).delete_user(name)
    }

    fn list_attached_user_policies(&self, user: &str) -> Result<Vec<AttachedPolicy>> {
        (**self).list_attached_user_policies(user)
    }

    fn attach_user_policy(&self, user: &str, policy_arn: &str) -> Result<()> {
        (**self).attach_user_policy(user, policy_arn)
    }

    fn detach_user_policy(&self, user: &str, policy_arn: &str) -> Result<()> {
        (**self).detach_user_policy(user, policy_arn)
    }

    fn list_instance_profiles_for_user(&self, user: &str) -> Result<Vec<InstanceProfile>> {
        (**self).list_instance_profiles_for_user(user)
    }

    fn create_instance_profile(&self, name: &str, path: &str) -> Result<()> {
        (**self).create_instance_profile(name, path)
    }

    fn delete_instance_profile(&self, name: &str) -> Result<()> {
        (**self).delete_instance_profile(name)
    }

    fn add_user_to_instance_profile(&self, profile: &str, user: &str) -> Result<()> {
        (**self).add_user_to_instance_profile(profile, user)
    }

    fn remove_user_from_instance_profile(&self, profile: &str, user: &str) -> Result<()> {
        (**self).remove_user_from_instance_profile(profile, user)
    }
}

impl<T: EcsBackend + ?Sized> EcsBackend for Arc<T> {
    fn list_task_definitions(
        &self,
        query: &TaskDefinitionQuery,
        next_token: Option<&str>,
    ) -> Result<TaskDefinitionPage> {
        (**self).list_task_definitions(query, next_token)
    }

    fn describe_task_definition(&self, task_definition: &str) -> Result<serde_json::Value> {
        (**self).describe_task_definition(task_definition)
    }
}
