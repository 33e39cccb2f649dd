use anyhow::{Context, Result, bail};
use awskit::{ConnectionSettings, TaskDefinitionStatus};
use declarative::Presence;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::cli::AwsArgs;
use crate::paths;

// ============================================================================
// Config File
// ============================================================================

/// Contents of `config.toml`
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    #[serde(default)]
    pub aws: ConnectionSettings,
    #[serde(default)]
    pub ecs: EcsConfig,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EcsConfig {
    /// Results per ListTaskDefinitions page
    pub page_size: Option<i32>,
}

impl AppConfig {
    /// Load the config file, or defaults if there is none
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_file()?)
    }

    /// Load a config file, or defaults if it does not exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("No config file at {}", path.display());
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Could not read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("Invalid config file {}", path.display()))
    }

    /// Connection settings with flags and env vars taking precedence
    ///
    /// Anything left unset falls through to the SDK's default chain.
    pub fn connection(&self, args: &AwsArgs) -> ConnectionSettings {
        ConnectionSettings {
            region: args.region.clone().or_else(|| self.aws.region.clone()),
            profile: args.profile.clone().or_else(|| self.aws.profile.clone()),
            endpoint_url: args
                .endpoint_url
                .clone()
                .or_else(|| self.aws.endpoint_url.clone()),
        }
    }
}

// ============================================================================
// Parameter Files
// ============================================================================

/// Format of a parameter file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    Json,
    Toml,
}

impl ConfigFormat {
    /// Pick the format from the file extension
    pub fn from_path(path: &Path) -> Result<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Ok(Self::Json),
            Some("toml") => Ok(Self::Toml),
            _ => bail!(
                "Unsupported parameter file {}: expected .json or .toml",
                path.display()
            ),
        }
    }
}

/// Read a parameter file in the format its extension names
pub fn load_params<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let path = paths::expand(&path.to_string_lossy());
    let format = ConfigFormat::from_path(&path)?;
    let content = fs::read_to_string(&path)
        .with_context(|| format!("Could not read {}", path.display()))?;
    match format {
        ConfigFormat::Json => serde_json::from_str(&content)
            .with_context(|| format!("Invalid parameters in {}", path.display())),
        ConfigFormat::Toml => toml::from_str(&content)
            .with_context(|| format!("Invalid parameters in {}", path.display())),
    }
}

/// Parameters of the `task-definitions` command
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TaskDefinitionParams {
    pub family_prefix: Option<String>,
    pub status: Option<TaskDefinitionStatus>,
    pub page_size: Option<i32>,
}

/// Parameters of the `user` command
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UserParams {
    pub name: Option<String>,
    pub path: Option<String>,
    /// A `null` entry is the same as an empty string
    #[serde(default, alias = "managed_policies")]
    pub managed_policy: Option<Vec<Option<String>>>,
    pub state: Option<Presence>,
    pub purge_instance_profile: Option<bool>,
}

impl UserParams {
    /// Managed policy list with `null` entries turned into empty strings
    pub fn managed_policy_list(&self) -> Option<Vec<String>> {
        self.managed_policy.as_ref().map(|list| {
            list.iter()
                .map(|arn| arn.clone().unwrap_or_default())
                .collect()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(dir: &tempfile::TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_missing_config_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_load_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "config.toml",
            r#"
[aws]
region = "eu-west-1"
endpoint_url = "http://localhost:4566"

[ecs]
page_size = 50
"#,
        );

        let config = AppConfig::load_from(&path).unwrap();
        assert_eq!(config.aws.region.as_deref(), Some("eu-west-1"));
        assert_eq!(config.aws.profile, None);
        assert_eq!(config.ecs.page_size, Some(50));
    }

    #[test]
    fn test_unknown_config_key_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "config.toml", "[aws]\nregoin = \"us-east-1\"\n");
        assert!(AppConfig::load_from(&path).is_err());
    }

    #[test]
    fn test_flags_override_config() {
        let config = AppConfig {
            aws: ConnectionSettings {
                region: Some("eu-west-1".into()),
                profile: Some("ops".into()),
                endpoint_url: None,
            },
            ecs: EcsConfig::default(),
        };
        let args = AwsArgs {
            region: Some("us-east-1".into()),
            ..Default::default()
        };

        let settings = config.connection(&args);
        assert_eq!(settings.region.as_deref(), Some("us-east-1"));
        assert_eq!(settings.profile.as_deref(), Some("ops"));
        assert_eq!(settings.endpoint_url, None);
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            ConfigFormat::from_path(Path::new("a.json")).unwrap(),
            ConfigFormat::Json
        );
        assert_eq!(
            ConfigFormat::from_path(Path::new("a.toml")).unwrap(),
            ConfigFormat::Toml
        );
        assert!(ConfigFormat::from_path(Path::new("a.yaml")).is_err());
    }

    #[test]
    fn test_user_params_json_null_sentinel() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "user.json",
            r#"{"name": "joe.blogs", "state": "present", "managed_policy": [null]}"#,
        );

        let params: UserParams = load_params(&path).unwrap();
        assert_eq!(params.name.as_deref(), Some("joe.blogs"));
        assert_eq!(params.state, Some(Presence::Present));
        assert_eq!(params.managed_policy_list(), Some(vec![String::new()]));
    }

    #[test]
    fn test_user_params_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "user.toml",
            r#"
name = "joe.blogs"
path = "/ops/"
state = "absent"
purge_instance_profile = true
managed_policies = ["arn:aws:iam::aws:policy/ReadOnlyAccess"]
"#,
        );

        let params: UserParams = load_params(&path).unwrap();
        assert_eq!(params.path.as_deref(), Some("/ops/"));
        assert_eq!(params.state, Some(Presence::Absent));
        assert_eq!(params.purge_instance_profile, Some(true));
        assert_eq!(
            params.managed_policy_list(),
            Some(vec!["arn:aws:iam::aws:policy/ReadOnlyAccess".to_string()])
        );
    }

    #[test]
    fn test_task_definition_params() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "facts.json",
            r#"{"family_prefix": "web", "status": "INACTIVE"}"#,
        );

        let params: TaskDefinitionParams = load_params(&path).unwrap();
        assert_eq!(params.family_prefix.as_deref(), Some("web"));
        assert_eq!(params.status, Some(TaskDefinitionStatus::Inactive));
    }

    #[test]
    fn test_unknown_param_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "user.json", r#"{"name": "joe", "password": "x"}"#);
        assert!(load_params::<UserParams>(&path).is_err());
    }
}
