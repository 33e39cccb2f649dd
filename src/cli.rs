use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "awsmod")]
#[command(author = "Alberto Cavalcante")]
#[command(version)]
#[command(about = "Declarative AWS modules: IAM users and ECS task definition facts", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(flatten)]
    pub aws: AwsArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Connection knobs passed through to the AWS SDK
#[derive(Args, Debug, Default, Clone)]
pub struct AwsArgs {
    /// AWS region
    #[arg(long, env = "AWS_REGION", global = true)]
    pub region: Option<String>,

    /// Named profile from the shared AWS config
    #[arg(long, env = "AWS_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Override the service endpoint URL
    #[arg(long, env = "AWS_ENDPOINT_URL", global = true)]
    pub endpoint_url: Option<String>,
}

#[derive(Subcommand)]
pub enum Command {
    /// List and describe ECS task definitions for a family
    TaskDefinitions(TaskDefinitionsArgs),

    /// Create, update or remove an IAM user
    User(UserArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Inspect configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

// ============================================================================
// Config Commands
// ============================================================================

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show the config file location and effective settings
    Show,
}

// ============================================================================
// Task Definitions
// ============================================================================

#[derive(Parser)]
pub struct TaskDefinitionsArgs {
    /// Family name of the task definitions to list
    #[arg(long)]
    pub family_prefix: Option<String>,

    /// Status filter
    #[arg(long, value_enum)]
    pub status: Option<StatusArg>,

    /// Results per listing page (1-100)
    #[arg(long)]
    pub page_size: Option<i32>,

    /// Load parameters from a JSON or TOML file
    #[arg(long, value_name = "FILE")]
    pub params: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum StatusArg {
    #[value(name = "ACTIVE")]
    Active,
    #[value(name = "INACTIVE")]
    Inactive,
}

impl From<StatusArg> for awskit::TaskDefinitionStatus {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::Active => Self::Active,
            StatusArg::Inactive => Self::Inactive,
        }
    }
}

// ============================================================================
// User
// ============================================================================

#[derive(Parser)]
pub struct UserArgs {
    /// Name of the user
    #[arg(long)]
    pub name: Option<String>,

    /// IAM path for the user (default "/")
    #[arg(long)]
    pub path: Option<String>,

    /// Managed policy ARN to attach (repeatable); pass "" to detach all
    #[arg(long = "managed-policy", value_name = "ARN")]
    pub managed_policy: Vec<String>,

    /// Whether the user should exist
    #[arg(long, value_enum)]
    pub state: Option<StateArg>,

    /// When removing, also delete the instance profile named after the user
    #[arg(long)]
    pub purge_instance_profile: bool,

    /// Report what would change without changing anything
    #[arg(long)]
    pub check: bool,

    /// Show the planned changes
    #[arg(long)]
    pub diff: bool,

    /// Load parameters from a JSON or TOML file
    #[arg(long, value_name = "FILE")]
    pub params: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum StateArg {
    Present,
    Absent,
}

impl From<StateArg> for declarative::Presence {
    fn from(arg: StateArg) -> Self {
        match arg {
            StateArg::Present => Self::Present,
            StateArg::Absent => Self::Absent,
        }
    }
}
