//! # awskit
//!
//! Synchronous IAM and ECS operations for declarative tooling.
//!
//! This crate provides:
//! - A backend abstraction over the raw service calls, with a real AWS SDK
//!   backend (feature `sdk`) and an in-memory one for tests
//! - [`IamClient`], whose calls return [`Outcome`] so "not found" and
//!   "already exists" are states the caller matches on, not errors
//! - Task definition facts with pagination and snake_case normalization
//!
//! ## Example
//!
//! ```no_run
//! use awskit::{ConnectionSettings, IamClient, Outcome};
//!
//! let settings = ConnectionSettings {
//!     region: Some("us-east-1".into()),
//!     ..Default::default()
//! };
//! let iam = IamClient::connect(&settings).expect("AWS not reachable");
//!
//! match iam.get_user("joe.blogs").expect("GetUser failed") {
//!     Outcome::Done(user) => println!("{} lives at {}", user.name, user.path),
//!     Outcome::NotFound => println!("no such user"),
//!     Outcome::AlreadyExists => unreachable!(),
//! }
//! ```
//!
//! ## Task Definitions
//!
//! ```no_run
//! use awskit::{ConnectionSettings, EcsClient, TaskDefinitionQuery};
//!
//! let ecs = EcsClient::connect(&ConnectionSettings::default()).unwrap();
//! for detail in ecs.list_task_definitions(&TaskDefinitionQuery::new("my-taskdef")).unwrap() {
//!     println!("{}", detail["task_definition_arn"]);
//! }
//! ```
#![recursion_limit = "256"]

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod backend;
pub mod casing;
pub mod error;
pub mod task_definitions;
pub mod types;

pub use error::{Error, ErrorCategory, Result};
pub use task_definitions::list_task_definitions;
pub use types::{
    AttachedPolicy, ConnectionSettings, InstanceProfile, Outcome, TaskDefinitionPage,
    TaskDefinitionQuery, TaskDefinitionStatus, UserRecord,
};

use backend::{EcsBackend, IamBackend};

/// High-level IAM client.
///
/// Wraps a backend and turns each call's expected conditions into
/// [`Outcome`] variants. Everything else stays an [`Error`].
pub struct IamClient {
    backend: Box<dyn IamBackend>,
}

impl IamClient {
    /// Connect to AWS with the SDK backend.
    #[cfg(feature = "sdk")]
    pub fn connect(settings: &ConnectionSettings) -> Result<Self> {
        let backend = backend::sdk::SdkIam::connect(settings)?;
        Ok(Self {
            backend: Box::new(backend),
        })
    }

    /// Create a client with a custom backend (useful for testing).
    pub fn with_backend(backend: Box<dyn IamBackend>) -> Self {
        Self { backend }
    }

    // =========================================================================
    // Users
    // =========================================================================

    /// Fetch a user.
    pub fn get_user(&self, name: &str) -> Result<Outcome<UserRecord>> {
        Outcome::from_result(self.backend.get_user(name))
    }

    /// Create a user.
    pub fn create_user(&self, name: &str, path: &str) -> Result<Outcome<UserRecord>> {
        Outcome::from_result(self.backend.create_user(name, path))
    }

    /// Delete a user.
    pub fn delete_user(&self, name: &str) -> Result<Outcome<()>> {
        Outcome::from_result(self.backend.delete_user(name))
    }

    // =========================================================================
    // Managed Policies
    // =========================================================================

    /// List the managed policies attached to a user.
    pub fn attached_policies(&self, user: &str) -> Result<Outcome<Vec<AttachedPolicy>>> {
        Outcome::from_result(self.backend.list_attached_user_policies(user))
    }

    /// Attach a managed policy to a user.
    pub fn attach_policy(&self, user: &str, policy_arn: &str) -> Result<Outcome<()>> {
        Outcome::from_result(self.backend.attach_user_policy(user, policy_arn))
    }

    /// Detach a managed policy from a user.
    pub fn detach_policy(&self, user: &str, policy_arn: &str) -> Result<Outcome<()>> {
        Outcome::from_result(self.backend.detach_user_policy(user, policy_arn))
    }

    // =========================================================================
    // Instance Profiles
    // =========================================================================

    /// List the instance profiles a user belongs to.
    pub fn instance_profiles(&self, user: &str) -> Result<Outcome<Vec<InstanceProfile>>> {
        Outcome::from_result(self.backend.list_instance_profiles_for_user(user))
    }

    /// Create an instance profile.
    pub fn create_instance_profile(&self, name: &str, path: &str) -> Result<Outcome<()>> {
        Outcome::from_result(self.backend.create_instance_profile(name, path))
    }

    /// Delete an instance profile.
    pub fn delete_instance_profile(&self, name: &str) -> Result<Outcome<()>> {
        Outcome::from_result(self.backend.delete_instance_profile(name))
    }

    /// Add a user to an instance profile.
    pub fn add_to_instance_profile(&self, profile: &str, user: &str) -> Result<Outcome<()>> {
        Outcome::from_result(self.backend.add_user_to_instance_profile(profile, user))
    }

    /// Remove a user from an instance profile.
    pub fn remove_from_instance_profile(&self, profile: &str, user: &str) -> Result<Outcome<()>> {
        Outcome::from_result(self.backend.remove_user_from_instance_profile(profile, user))
    }
}

/// High-level ECS client.
pub struct EcsClient {
    backend: Box<dyn EcsBackend>,
}

impl EcsClient {
    /// Connect to AWS with the SDK backend.
    #[cfg(feature = "sdk")]
    pub fn connect(settings: &ConnectionSettings) -> Result<Self> {
        let backend = backend::sdk::SdkEcs::connect(settings)?;
        Ok(Self {
            backend: Box::new(backend),
        })
    }

    /// Create a client with a custom backend (useful for testing).
    pub fn with_backend(backend: Box<dyn EcsBackend>) -> Self {
        Self { backend }
    }

    /// List and describe every task definition matching `query`.
    pub fn list_task_definitions(
        &self,
        query: &TaskDefinitionQuery,
    ) -> Result<Vec<serde_json::Value>> {
        task_definitions::list_task_definitions(self.backend.as_ref(), query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use backend::memory::MemoryIam;

    #[test]
    fn test_missing_user_is_not_found_outcome() {
        let iam = IamClient::with_backend(Box::new(MemoryIam::new()));
        assert_eq!(iam.get_user("ghost").unwrap(), Outcome::NotFound);
    }

    #[test]
    fn test_duplicate_profile_is_already_exists_outcome() {
        let iam = IamClient::with_backend(Box::new(
            MemoryIam::new().with_instance_profile("web", None),
        ));
        assert_eq!(
            iam.create_instance_profile("web", "/").unwrap(),
            Outcome::AlreadyExists
        );
    }

    #[test]
    fn test_validation_error_stays_fatal() {
        let iam = IamClient::with_backend(Box::new(MemoryIam::new()));
        let err = iam.create_user("bob", "no-slashes").unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Validation);
    }
}
