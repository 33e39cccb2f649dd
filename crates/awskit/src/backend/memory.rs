//! In-memory backends that behave like IAM and ECS.
//!
//! Every call is recorded as `"<Operation> <args>"` so tests can assert
//! ordering and count mutations. A failure can be armed for the next
//! call of a given operation.

use crate::backend::{EcsBackend, IamBackend};
use crate::error::{Error, Result};
use crate::types::{
    AttachedPolicy, InstanceProfile, TaskDefinitionPage, TaskDefinitionQuery, UserRecord,
};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};

const ACCOUNT_ID: &str = "123456789012";

/// Operations that only read state.
const READ_OPERATIONS: &[&str] = &[
    "GetUser",
    "ListAttachedUserPolicies",
    "ListInstanceProfilesForUser",
    "ListTaskDefinitions",
    "DescribeTaskDefinition",
];

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Recorded calls plus an optional armed failure per operation.
#[derive(Debug, Default)]
struct CallLog {
    calls: Mutex<Vec<String>>,
    failures: Mutex<HashMap<&'static str, Error>>,
}

impl CallLog {
    fn record(&self, operation: &'static str, args: &[&str]) -> Result<()> {
        lock(&self.calls).push(format!("{operation} {}", args.join(" ")).trim_end().to_string());
        match lock(&self.failures).remove(operation) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn calls(&self) -> Vec<String> {
        lock(&self.calls).clone()
    }

    fn mutations(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter(|c| {
                let op = c.split_whitespace().next().unwrap_or_default();
                !READ_OPERATIONS.contains(&op)
            })
            .collect()
    }

    fn clear(&self) {
        lock(&self.calls).clear();
    }

    fn fail_next(&self, operation: &'static str, error: Error) {
        lock(&self.failures).insert(operation, error);
    }
}

fn not_found(operation: &'static str, message: String) -> Error {
    Error::NotFound { operation, message }
}

fn conflict(operation: &'static str, code: &str, message: String) -> Error {
    Error::Transport {
        operation,
        code: Some(code.to_string()),
        message,
    }
}

// ============================================================================
// IAM
// ============================================================================

#[derive(Debug, Clone)]
struct StoredUser {
    record: UserRecord,
    policies: BTreeSet<String>,
}

#[derive(Debug, Clone)]
struct StoredProfile {
    path: String,
    members: BTreeSet<String>,
}

#[derive(Debug, Default)]
struct IamState {
    users: BTreeMap<String, StoredUser>,
    profiles: BTreeMap<String, StoredProfile>,
    known_policies: Option<BTreeSet<String>>,
    /// Set when profile membership is keyed on roles, as the SDK backend is.
    roles: Option<BTreeSet<String>>,
    next_id: u64,
}

/// In-memory IAM.
///
/// Mirrors the service rules the reconciler depends on: deleting a user
/// that still has policies or profiles fails with `DeleteConflict`, an
/// instance profile holds at most one principal, and detaching a policy
/// that is not attached is "not found".
///
/// By default profile membership is keyed on users. After
/// [`MemoryIam::with_role_keyed_profiles`] it is keyed on roles instead:
/// the profile calls answer "not found" for any name without a same-named
/// role, whether or not a user of that name exists.
#[derive(Debug, Default)]
pub struct MemoryIam {
    state: Mutex<IamState>,
    log: CallLog,
}

impl MemoryIam {
    /// Create an empty account.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict attachable policies to this set; others are "not found".
    pub fn with_known_policies<I, S>(self, arns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        lock(&self.state).known_policies = Some(arns.into_iter().map(Into::into).collect());
        self
    }

    /// Seed a user with attached policies.
    pub fn with_user<I, S>(self, name: &str, path: &str, policies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        {
            let mut state = lock(&self.state);
            let record = new_record(&mut state, name, path);
            state.users.insert(
                name.to_string(),
                StoredUser {
                    record,
                    policies: policies.into_iter().map(Into::into).collect(),
                },
            );
        }
        self
    }

    /// Seed an instance profile, optionally holding a member.
    pub fn with_instance_profile(self, name: &str, member: Option<&str>) -> Self {
        lock(&self.state).profiles.insert(
            name.to_string(),
            StoredProfile {
                path: "/".to_string(),
                members: member.map(str::to_string).into_iter().collect(),
            },
        );
        self
    }

    /// Fail the next call of `operation` with `error`.
    pub fn fail_next(&self, operation: &'static str, error: Error) {
        self.log.fail_next(operation, error);
    }

    /// Every call made so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.log.calls()
    }

    /// Only the calls that change state.
    pub fn mutations(&self) -> Vec<String> {
        self.log.mutations()
    }

    /// Forget recorded calls.
    pub fn clear_calls(&self) {
        self.log.clear();
    }

    /// Key profile membership on roles, like IAM's role endpoints.
    pub fn with_role_keyed_profiles(self) -> Self {
        lock(&self.state).roles.get_or_insert_with(BTreeSet::new);
        self
    }

    /// Seed a role that can join instance profiles. Implies role keying.
    pub fn with_role(self, name: &str) -> Self {
        lock(&self.state)
            .roles
            .get_or_insert_with(BTreeSet::new)
            .insert(name.to_string());
        self
    }

    /// Whether a user exists.
    pub fn has_user(&self, name: &str) -> bool {
        lock(&self.state).users.contains_key(name)
    }

    /// Whether an instance profile exists.
    pub fn has_instance_profile(&self, name: &str) -> bool {
        lock(&self.state).profiles.contains_key(name)
    }

    /// Policies currently attached to a user (empty if the user is absent).
    pub fn policies_of(&self, name: &str) -> BTreeSet<String> {
        lock(&self.state)
            .users
            .get(name)
            .map(|u| u.policies.clone())
            .unwrap_or_default()
    }
}

impl IamState {
    /// Whether `name` can appear on the profile endpoints.
    fn is_principal(&self, name: &str) -> bool {
        match &self.roles {
            Some(roles) => roles.contains(name),
            None => self.users.contains_key(name),
        }
    }

    fn missing_principal(&self, operation: &'static str, name: &str) -> Error {
        let kind = if self.roles.is_some() { "role" } else { "user" };
        not_found(
            operation,
            format!("The {kind} with name {name} cannot be found."),
        )
    }
}

fn new_record(state: &mut IamState, name: &str, path: &str) -> UserRecord {
    state.next_id += 1;
    UserRecord {
        name: name.to_string(),
        path: path.to_string(),
        user_id: format!("AIDA{:016}", state.next_id),
        arn: format!("arn:aws:iam::{ACCOUNT_ID}:user{path}{name}"),
        create_date: Some("2016-08-01T00:00:00Z".to_string()),
    }
}

impl IamBackend for MemoryIam {
    fn get_user(&self, name: &str) -> Result<UserRecord> {
        self.log.record("GetUser", &[name])?;
        lock(&self.state)
            .users
            .get(name)
            .map(|u| u.record.clone())
            .ok_or_else(|| {
                not_found(
                    "GetUser",
                    format!("The user with name {name} cannot be found."),
                )
            })
    }

    fn create_user(&self, name: &str, path: &str) -> Result<UserRecord> {
        self.log.record("CreateUser", &[name, path])?;
        if !path.starts_with('/') || !path.ends_with('/') {
            return Err(Error::Validation {
                operation: "CreateUser",
                message: format!("The specified value for path is invalid: {path}"),
            });
        }
        let mut state = lock(&self.state);
        if state.users.contains_key(name) {
            return Err(Error::AlreadyExists {
                operation: "CreateUser",
                message: format!("User with name {name} already exists."),
            });
        }
        let record = new_record(&mut state, name, path);
        state.users.insert(
            name.to_string(),
            StoredUser {
                record: record.clone(),
                policies: BTreeSet::new(),
            },
        );
        Ok(record)
    }

    fn delete_user(&self, name: &str) -> Result<()> {
        self.log.record("DeleteUser", &[name])?;
        let mut state = lock(&self.state);
        let user = state.users.get(name).ok_or_else(|| {
            not_found(
                "DeleteUser",
                format!("The user with name {name} cannot be found."),
            )
        })?;
        if !user.policies.is_empty() {
            return Err(conflict(
                "DeleteUser",
                "DeleteConflict",
                "Cannot delete entity, must detach all policies first.".to_string(),
            ));
        }
        if state.roles.is_none() && state.profiles.values().any(|p| p.members.contains(name)) {
            return Err(conflict(
                "DeleteUser",
                "DeleteConflict",
                "Cannot delete entity, must remove it from all instance profiles first."
                    .to_string(),
            ));
        }
        state.users.remove(name);
        Ok(())
    }

    fn list_attached_user_policies(&self, user: &str) -> Result<Vec<AttachedPolicy>> {
        self.log.record("ListAttachedUserPolicies", &[user])?;
        let state = lock(&self.state);
        let stored = state.users.get(user).ok_or_else(|| {
            not_found(
                "ListAttachedUserPolicies",
                format!("The user with name {user} cannot be found."),
            )
        })?;
        Ok(stored
            .policies
            .iter()
            .map(|arn| AttachedPolicy {
                arn: arn.clone(),
                name: arn.rsplit('/').next().map(str::to_string),
            })
            .collect())
    }

    fn attach_user_policy(&self, user: &str, policy_arn: &str) -> Result<()> {
        self.log.record("AttachUserPolicy", &[user, policy_arn])?;
        let mut state = lock(&self.state);
        if let Some(known) = &state.known_policies
            && !known.contains(policy_arn)
        {
            return Err(not_found(
                "AttachUserPolicy",
                format!("Policy {policy_arn} does not exist or is not attachable."),
            ));
        }
        let stored = state.users.get_mut(user).ok_or_else(|| {
            not_found(
                "AttachUserPolicy",
                format!("The user with name {user} cannot be found."),
            )
        })?;
        stored.policies.insert(policy_arn.to_string());
        Ok(())
    }

    fn detach_user_policy(&self, user: &str, policy_arn: &str) -> Result<()> {
        self.log.record("DetachUserPolicy", &[user, policy_arn])?;
        let mut state = lock(&self.state);
        let stored = state.users.get_mut(user).ok_or_else(|| {
            not_found(
                "DetachUserPolicy",
                format!("The user with name {user} cannot be found."),
            )
        })?;
        if !stored.policies.remove(policy_arn) {
            return Err(not_found(
                "DetachUserPolicy",
                format!("Policy {policy_arn} was not found."),
            ));
        }
        Ok(())
    }

    fn list_instance_profiles_for_user(&self, user: &str) -> Result<Vec<InstanceProfile>> {
        self.log.record("ListInstanceProfilesForUser", &[user])?;
        let state = lock(&self.state);
        if !state.is_principal(user) {
            return Err(state.missing_principal("ListInstanceProfilesForUser", user));
        }
        Ok(state
            .profiles
            .iter()
            .filter(|(_, p)| p.members.contains(user))
            .map(|(name, p)| InstanceProfile {
                name: name.clone(),
                path: p.path.clone(),
            })
            .collect())
    }

    fn create_instance_profile(&self, name: &str, path: &str) -> Result<()> {
        self.log.record("CreateInstanceProfile", &[name, path])?;
        let mut state = lock(&self.state);
        if state.profiles.contains_key(name) {
            return Err(Error::AlreadyExists {
                operation: "CreateInstanceProfile",
                message: format!("Instance Profile {name} already exists."),
            });
        }
        state.profiles.insert(
            name.to_string(),
            StoredProfile {
                path: path.to_string(),
                members: BTreeSet::new(),
            },
        );
        Ok(())
    }

    fn delete_instance_profile(&self, name: &str) -> Result<()> {
        self.log.record("DeleteInstanceProfile", &[name])?;
        let mut state = lock(&self.state);
        let profile = state.profiles.get(name).ok_or_else(|| {
            not_found(
                "DeleteInstanceProfile",
                format!("Instance Profile {name} cannot be found."),
            )
        })?;
        if !profile.members.is_empty() {
            return Err(conflict(
                "DeleteInstanceProfile",
                "DeleteConflict",
                "Cannot delete entity, must remove roles from instance profile first."
                    .to_string(),
            ));
        }
        state.profiles.remove(name);
        Ok(())
    }

    fn add_user_to_instance_profile(&self, profile: &str, user: &str) -> Result<()> {
        self.log.record("AddUserToInstanceProfile", &[profile, user])?;
        let mut state = lock(&self.state);
        if !state.is_principal(user) {
            return Err(state.missing_principal("AddUserToInstanceProfile", user));
        }
        let stored = state.profiles.get_mut(profile).ok_or_else(|| {
            not_found(
                "AddUserToInstanceProfile",
                format!("Instance Profile {profile} cannot be found."),
            )
        })?;
        if !stored.members.is_empty() {
            return Err(conflict(
                "AddUserToInstanceProfile",
                "LimitExceeded",
                "Cannot exceed quota for InstanceSessionsPerInstanceProfile: 1".to_string(),
            ));
        }
        stored.members.insert(user.to_string());
        Ok(())
    }

    fn remove_user_from_instance_profile(&self, profile: &str, user: &str) -> Result<()> {
        self.log
            .record("RemoveUserFromInstanceProfile", &[profile, user])?;
        let mut state = lock(&self.state);
        if !state.is_principal(user) {
            return Err(state.missing_principal("RemoveUserFromInstanceProfile", user));
        }
        let stored = state.profiles.get_mut(profile).ok_or_else(|| {
            not_found(
                "RemoveUserFromInstanceProfile",
                format!("Instance Profile {profile} cannot be found."),
            )
        })?;
        if !stored.members.remove(user) {
            return Err(not_found(
                "RemoveUserFromInstanceProfile",
                format!("{user} is not in instance profile {profile}."),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// ECS
// ============================================================================

/// In-memory ECS holding registered task definitions.
///
/// Pages honour the query's page size, so a handful of definitions is
/// enough to exercise pagination.
#[derive(Debug, Default)]
pub struct MemoryEcs {
    definitions: Vec<(String, String, String, serde_json::Value)>,
    log: CallLog,
}

impl MemoryEcs {
    /// Create an account with no task definitions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a revision of a family.
    ///
    /// The detail record is the camelCase document `DescribeTaskDefinition`
    /// would return; `taskDefinitionArn`, `family`, `revision` and `status`
    /// are filled in.
    pub fn with_definition(
        mut self,
        family: &str,
        revision: u32,
        status: &str,
        mut detail: serde_json::Value,
    ) -> Self {
        let arn =
            format!("arn:aws:ecs:us-east-1:{ACCOUNT_ID}:task-definition/{family}:{revision}");
        if let Some(map) = detail.as_object_mut() {
            map.insert("taskDefinitionArn".into(), arn.clone().into());
            map.insert("family".into(), family.into());
            map.insert("revision".into(), revision.into());
            map.insert("status".into(), status.into());
        }
        self.definitions
            .push((arn, family.to_string(), status.to_string(), detail));
        self
    }

    /// Fail the next call of `operation` with `error`.
    pub fn fail_next(&self, operation: &'static str, error: Error) {
        self.log.fail_next(operation, error);
    }

    /// Every call made so far, in order.
    pub fn calls(&self) -> Vec<String> {
        self.log.calls()
    }
}

impl EcsBackend for MemoryEcs {
    fn list_task_definitions(
        &self,
        query: &TaskDefinitionQuery,
        next_token: Option<&str>,
    ) -> Result<TaskDefinitionPage> {
        self.log.record(
            "ListTaskDefinitions",
            &[&query.family_prefix, query.status.as_str(), next_token.unwrap_or("")],
        )?;

        let offset = match next_token {
            None => 0,
            Some(token) => token.parse::<usize>().map_err(|_| Error::Validation {
                operation: "ListTaskDefinitions",
                message: format!("Invalid nextToken: {token}"),
            })?,
        };

        // ECS treats the prefix as the full family name.
        let matching: Vec<&String> = self
            .definitions
            .iter()
            .filter(|(_, family, status, _)| {
                *family == query.family_prefix && status == query.status.as_str()
            })
            .map(|(arn, ..)| arn)
            .collect();

        let page_size = usize::try_from(query.page_size.max(1)).unwrap_or(1);
        let end = (offset + page_size).min(matching.len());
        let arns = matching
            .get(offset..end)
            .unwrap_or_default()
            .iter()
            .map(|arn| (*arn).clone())
            .collect();
        let next_token = (end < matching.len()).then(|| end.to_string());

        Ok(TaskDefinitionPage { arns, next_token })
    }

    fn describe_task_definition(&self, task_definition: &str) -> Result<serde_json::Value> {
        self.log
            .record("DescribeTaskDefinition", &[task_definition])?;
        self.definitions
            .iter()
            .find(|(arn, ..)| arn == task_definition)
            .map(|(.., detail)| detail.clone())
            .ok_or_else(|| Error::Transport {
                operation: "DescribeTaskDefinition",
                code: Some("ClientException".to_string()),
                message: "Unable to describe task definition.".to_string(),
            })
    }
}
