//! Core types for IAM and ECS operations.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Result of a call whose "not found" and "already exists" failures are
/// states rather than errors.
///
/// Fatal failures stay in the surrounding [`Result`], so a call wrapper
/// returns `Result<Outcome<T>>` and callers match every variant.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum Outcome<T> {
    /// The call succeeded
    Done(T),
    /// The addressed entity does not exist
    NotFound,
    /// The entity being created already exists
    AlreadyExists,
}

impl<T> Outcome<T> {
    /// Split a raw call result into an outcome or a fatal error.
    pub fn from_result(result: Result<T>) -> Result<Self> {
        match result {
            Ok(value) => Ok(Outcome::Done(value)),
            Err(Error::NotFound { .. }) => Ok(Outcome::NotFound),
            Err(Error::AlreadyExists { .. }) => Ok(Outcome::AlreadyExists),
            Err(e) => Err(e),
        }
    }

    /// The value, if the call succeeded.
    pub fn done(self) -> Option<T> {
        match self {
            Outcome::Done(value) => Some(value),
            Outcome::NotFound | Outcome::AlreadyExists => None,
        }
    }

    /// Check if the call succeeded.
    pub fn is_done(&self) -> bool {
        matches!(self, Outcome::Done(_))
    }
}

// ============================================================================
// IAM
// ============================================================================

/// An IAM user as returned by `GetUser` / `CreateUser`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    /// User name (unique key)
    pub name: String,
    /// IAM path, e.g. `/` or `/division_abc/`
    pub path: String,
    /// Stable unique ID assigned by IAM
    pub user_id: String,
    /// Full ARN of the user
    pub arn: String,
    /// Creation time in RFC 3339, when known
    pub create_date: Option<String>,
}

/// A managed policy attached to a principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachedPolicy {
    /// Policy ARN
    pub arn: String,
    /// Friendly name, when the service returned one
    pub name: Option<String>,
}

/// An instance profile a principal belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceProfile {
    /// Instance profile name
    pub name: String,
    /// IAM path of the profile
    pub path: String,
}

// ============================================================================
// ECS
// ============================================================================

/// Task definition status filter. Sent verbatim; ECS is case sensitive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TaskDefinitionStatus {
    /// Registered and usable revisions
    #[default]
    Active,
    /// Deregistered revisions still referenced by a task or service
    Inactive,
}

impl TaskDefinitionStatus {
    /// Wire value of this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskDefinitionStatus::Active => "ACTIVE",
            TaskDefinitionStatus::Inactive => "INACTIVE",
        }
    }

    /// Parse a wire value. Only the exact upper-case spellings are accepted.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ACTIVE" => Some(TaskDefinitionStatus::Active),
            "INACTIVE" => Some(TaskDefinitionStatus::Inactive),
            _ => None,
        }
    }
}

impl std::fmt::Display for TaskDefinitionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Default number of identifiers requested per listing page.
pub const DEFAULT_PAGE_SIZE: i32 = 10;

/// Largest page size ECS accepts.
pub const MAX_PAGE_SIZE: i32 = 100;

/// Parameters for listing task definitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDefinitionQuery {
    /// Family whose revisions are listed
    pub family_prefix: String,
    /// Status filter
    pub status: TaskDefinitionStatus,
    /// Identifiers requested per page (1..=100)
    pub page_size: i32,
}

impl TaskDefinitionQuery {
    /// Create a query for active revisions of a family.
    pub fn new(family_prefix: impl Into<String>) -> Self {
        Self {
            family_prefix: family_prefix.into(),
            status: TaskDefinitionStatus::default(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Set the status filter.
    pub fn with_status(mut self, status: TaskDefinitionStatus) -> Self {
        self.status = status;
        self
    }

    /// Set the page size, clamped to what ECS accepts.
    pub fn with_page_size(mut self, page_size: i32) -> Self {
        self.page_size = page_size.clamp(1, MAX_PAGE_SIZE);
        self
    }
}

/// One page of a task definition listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskDefinitionPage {
    /// Task definition ARNs, in service order
    pub arns: Vec<String>,
    /// Continuation token; `None` on the last page
    pub next_token: Option<String>,
}

// ============================================================================
// Connection
// ============================================================================

/// Connection knobs passed through to the SDK's default provider chain.
///
/// Anything left `None` is resolved by the SDK (environment, shared
/// config files, instance metadata).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConnectionSettings {
    /// AWS region, e.g. `us-east-1`
    pub region: Option<String>,
    /// Named profile from the shared config files
    pub profile: Option<String>,
    /// Endpoint override (e.g. a local emulator)
    pub endpoint_url: Option<String>,
}
