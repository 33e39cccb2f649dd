//! Real AWS backend using the official SDK.
//!
//! The SDK is async; each backend owns a current-thread tokio runtime and blocks
//! on one call at a time.
//!
//! IAM only lets roles into instance profiles, and its profile endpoints
//! are keyed by role name. The user operations here pass the user's name
//! through those endpoints.

use crate::backend::{EcsBackend, IamBackend};
use crate::error::{Error, Result};
use crate::types::{
    AttachedPolicy, ConnectionSettings, InstanceProfile, TaskDefinitionPage, TaskDefinitionQuery,
    UserRecord,
};
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_sdk_iam::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_iam::primitives::DateTimeFormat;
use serde_json::Value;
use tokio::runtime::Runtime;

use super::ecs_json::task_definition_json;

/// Build a runtime and resolve SDK configuration.
fn connect(settings: &ConnectionSettings) -> Result<(Runtime, SdkConfig)> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    let mut loader = aws_config::defaults(BehaviorVersion::latest());
    if let Some(region) = &settings.region {
        loader = loader.region(Region::new(region.clone()));
    }
    if let Some(profile) = &settings.profile {
        loader = loader.profile_name(profile);
    }
    if let Some(url) = &settings.endpoint_url {
        loader = loader.endpoint_url(url);
    }

    let config = runtime.block_on(loader.load());
    if config.region().is_none() {
        return Err(Error::MissingRegion);
    }
    log::debug!(
        "Resolved AWS region {}",
        config.region().map(ToString::to_string).unwrap_or_default()
    );
    Ok((runtime, config))
}

/// Classify an SDK failure.
///
/// Request-construction failures never reached the service and count as
/// validation errors; everything else is classified by error code.
fn classify<E>(operation: &'static str, err: SdkError<E>) -> Error
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
{
    let message = err
        .message()
        .map(str::to_string)
        .unwrap_or_else(|| DisplayErrorContext(&err).to_string());

    if matches!(err, SdkError::ConstructionFailure(_)) {
        return Error::Validation { operation, message };
    }
    Error::from_code(operation, err.code(), message)
}

// ============================================================================
// IAM
// ============================================================================

/// IAM backend backed by `aws-sdk-iam`.
pub struct SdkIam {
    runtime: Runtime,
    client: aws_sdk_iam::Client,
}

impl SdkIam {
    /// Connect using the SDK's default provider chain plus `settings`.
    pub fn connect(settings: &ConnectionSettings) -> Result<Self> {
        let (runtime, config) = connect(settings)?;
        Ok(Self {
            runtime,
            client: aws_sdk_iam::Client::new(&config),
        })
    }
}

fn user_record(user: &aws_sdk_iam::types::User) -> UserRecord {
    UserRecord {
        name: user.user_name().to_string(),
        path: user.path().to_string(),
        user_id: user.user_id().to_string(),
        arn: user.arn().to_string(),
        create_date: user.create_date().fmt(DateTimeFormat::DateTime).ok(),
    }
}

impl IamBackend for SdkIam {
    fn get_user(&self, name: &str) -> Result<UserRecord> {
        log::debug!("iam:GetUser {name}");
        let output = self
            .runtime
            .block_on(self.client.get_user().user_name(name).send())
            .map_err(|e| classify("GetUser", e))?;
        output
            .user()
            .map(user_record)
            .ok_or(Error::MalformedResponse {
                operation: "GetUser",
                field: "User",
            })
    }

    fn create_user(&self, name: &str, path: &str) -> Result<UserRecord> {
        log::debug!("iam:CreateUser {name} {path}");
        let output = self
            .runtime
            .block_on(self.client.create_user().user_name(name).path(path).send())
            .map_err(|e| classify("CreateUser", e))?;
        output
            .user()
            .map(user_record)
            .ok_or(Error::MalformedResponse {
                operation: "CreateUser",
                field: "User",
            })
    }

    fn delete_user(&self, name: &str) -> Result<()> {
        log::debug!("iam:DeleteUser {name}");
        self.runtime
            .block_on(self.client.delete_user().user_name(name).send())
            .map_err(|e| classify("DeleteUser", e))?;
        Ok(())
    }

    fn list_attached_user_policies(&self, user: &str) -> Result<Vec<AttachedPolicy>> {
        let mut policies = Vec::new();
        let mut marker: Option<String> = None;
        loop {
            log::debug!("iam:ListAttachedUserPolicies {user}");
            let output = self
                .runtime
                .block_on(
                    self.client
                        .list_attached_user_policies()
                        .user_name(user)
                        .set_marker(marker.take())
                        .send(),
                )
                .map_err(|e| classify("ListAttachedUserPolicies", e))?;

            policies.extend(output.attached_policies().iter().filter_map(|p| {
                p.policy_arn().map(|arn| AttachedPolicy {
                    arn: arn.to_string(),
                    name: p.policy_name().map(str::to_string),
                })
            }));

            match output.marker() {
                Some(next) => marker = Some(next.to_string()),
                None => break,
            }
        }
        Ok(policies)
    }

    fn attach_user_policy(&self, user: &str, policy_arn: &str) -> Result<()> {
        log::debug!("iam:AttachUserPolicy {user} {policy_arn}");
        self.runtime
            .block_on(
                self.client
                    .attach_user_policy()
                    .user_name(user)
                    .policy_arn(policy_arn)
                    .send(),
            )
            .map_err(|e| classify("AttachUserPolicy", e))?;
        Ok(())
    }

    fn detach_user_policy(&self, user: &str, policy_arn: &str) -> Result<()> {
        log::debug!("iam:DetachUserPolicy {user} {policy_arn}");
        self.runtime
            .block_on(
                self.client
                    .detach_user_policy()
                    .user_name(user)
                    .policy_arn(policy_arn)
                    .send(),
            )
            .map_err(|e| classify("DetachUserPolicy", e))?;
        Ok(())
    }

    fn list_instance_profiles_for_user(&self, user: &str) -> Result<Vec<InstanceProfile>> {
        let mut profiles = Vec::new();
        let mut marker: Option<String> = None;
        loop {
            log::debug!("iam:ListInstanceProfilesForRole {user}");
            let output = self
                .runtime
                .block_on(
                    self.client
                        .list_instance_profiles_for_role()
                        .role_name(user)
                        .set_marker(marker.take())
                        .send(),
                )
                .map_err(|e| classify("ListInstanceProfilesForUser", e))?;

            profiles.extend(output.instance_profiles().iter().map(|p| InstanceProfile {
                name: p.instance_profile_name().to_string(),
                path: p.path().to_string(),
            }));

            match output.marker() {
                Some(next) => marker = Some(next.to_string()),
                None => break,
            }
        }
        Ok(profiles)
    }

    fn create_instance_profile(&self, name: &str, path: &str) -> Result<()> {
        log::debug!("iam:CreateInstanceProfile {name} {path}");
        self.runtime
            .block_on(
                self.client
                    .create_instance_profile()
                    .instance_profile_name(name)
                    .path(path)
                    .send(),
            )
            .map_err(|e| classify("CreateInstanceProfile", e))?;
        Ok(())
    }

    fn delete_instance_profile(&self, name: &str) -> Result<()> {
        log::debug!("iam:DeleteInstanceProfile {name}");
        self.runtime
            .block_on(
                self.client
                    .delete_instance_profile()
                    .instance_profile_name(name)
                    .send(),
            )
            .map_err(|e| classify("DeleteInstanceProfile", e))?;
        Ok(())
    }

    fn add_user_to_instance_profile(&self, profile: &str, user: &str) -> Result<()> {
        log::debug!("iam:AddRoleToInstanceProfile {profile} {user}");
        self.runtime
            .block_on(
                self.client
                    .add_role_to_instance_profile()
                    .instance_profile_name(profile)
                    .role_name(user)
                    .send(),
            )
            .map_err(|e| classify("AddUserToInstanceProfile", e))?;
        Ok(())
    }

    fn remove_user_from_instance_profile(&self, profile: &str, user: &str) -> Result<()> {
        log::debug!("iam:RemoveRoleFromInstanceProfile {profile} {user}");
        self.runtime
            .block_on(
                self.client
                    .remove_role_from_instance_profile()
                    .instance_profile_name(profile)
                    .role_name(user)
                    .send(),
            )
            .map_err(|e| classify("RemoveUserFromInstanceProfile", e))?;
        Ok(())
    }
}

// ============================================================================
// ECS
// ============================================================================

/// ECS backend backed by `aws-sdk-ecs`.
pub struct SdkEcs {
    runtime: Runtime,
    client: aws_sdk_ecs::Client,
}

impl SdkEcs {
    /// Connect using the SDK's default provider chain plus `settings`.
    pub fn connect(settings: &ConnectionSettings) -> Result<Self> {
        let (runtime, config) = connect(settings)?;
        Ok(Self {
            runtime,
            client: aws_sdk_ecs::Client::new(&config),
        })
    }
}

impl EcsBackend for SdkEcs {
    fn list_task_definitions(
        &self,
        query: &TaskDefinitionQuery,
        next_token: Option<&str>,
    ) -> Result<TaskDefinitionPage> {
        log::debug!(
            "ecs:ListTaskDefinitions {} {} {:?}",
            query.family_prefix,
            query.status,
            next_token
        );
        let output = self
            .runtime
            .block_on(
                self.client
                    .list_task_definitions()
                    .family_prefix(&query.family_prefix)
                    .status(aws_sdk_ecs::types::TaskDefinitionStatus::from(
                        query.status.as_str(),
                    ))
                    .max_results(query.page_size)
                    .set_next_token(next_token.map(str::to_string))
                    .send(),
            )
            .map_err(|e| classify("ListTaskDefinitions", e))?;

        Ok(TaskDefinitionPage {
            arns: output.task_definition_arns().to_vec(),
            next_token: output.next_token().map(str::to_string),
        })
    }

    fn describe_task_definition(&self, task_definition: &str) -> Result<Value> {
        log::debug!("ecs:DescribeTaskDefinition {task_definition}");
        let output = self
            .runtime
            .block_on(
                self.client
                    .describe_task_definition()
                    .task_definition(task_definition)
                    .send(),
            )
            .map_err(|e| classify("DescribeTaskDefinition", e))?;
        output
            .task_definition()
            .map(task_definition_json)
            .ok_or(Error::MalformedResponse {
                operation: "DescribeTaskDefinition",
                field: "taskDefinition",
            })
    }
}
