//! `awsmod task-definitions` - ECS task definition facts

use anyhow::{Context as AnyhowContext, Result};
use awskit::{EcsClient, TaskDefinitionQuery};
use serde::Serialize;
use serde_json::Value;

use crate::Context;
use crate::cli::TaskDefinitionsArgs;
use crate::config::{TaskDefinitionParams, load_params};

/// Record written on success
#[derive(Debug, Serialize)]
pub struct FactsReport {
    pub changed: bool,
    pub task_definitions: Vec<Value>,
}

pub fn run(ctx: &Context, args: &TaskDefinitionsArgs) -> Result<FactsReport> {
    let params = match &args.params {
        Some(path) => load_params(path)?,
        None => TaskDefinitionParams::default(),
    };
    let query = build_query(args, &params, ctx.config.ecs.page_size)?;

    let client = EcsClient::connect(&ctx.connection)?;
    list(&client, &query)
}

/// Merge flags over file parameters and the configured page size
pub fn build_query(
    args: &TaskDefinitionsArgs,
    params: &TaskDefinitionParams,
    configured_page_size: Option<i32>,
) -> Result<TaskDefinitionQuery> {
    let family_prefix = args
        .family_prefix
        .clone()
        .or_else(|| params.family_prefix.clone())
        .context("missing required arguments: family_prefix")?;

    let mut query = TaskDefinitionQuery::new(family_prefix);
    if let Some(status) = args.status.map(Into::into).or(params.status) {
        query = query.with_status(status);
    }
    if let Some(size) = args.page_size.or(params.page_size).or(configured_page_size) {
        query = query.with_page_size(size);
    }
    Ok(query)
}

/// List against a connected client
pub fn list(client: &EcsClient, query: &TaskDefinitionQuery) -> Result<FactsReport> {
    Ok(FactsReport {
        changed: false,
        task_definitions: client.list_task_definitions(query)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::StatusArg;
    use awskit::TaskDefinitionStatus;
    use awskit::backend::memory::MemoryEcs;
    use serde_json::json;

    fn args(family: Option<&str>) -> TaskDefinitionsArgs {
        TaskDefinitionsArgs {
            family_prefix: family.map(str::to_string),
            status: None,
            page_size: None,
            params: None,
        }
    }

    #[test]
    fn test_defaults() {
        let query = build_query(&args(Some("web")), &TaskDefinitionParams::default(), None)
            .unwrap();
        assert_eq!(query.family_prefix, "web");
        assert_eq!(query.status, TaskDefinitionStatus::Active);
        assert_eq!(query.page_size, awskit::types::DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn test_flags_then_params_then_config() {
        let mut args = args(None);
        args.status = Some(StatusArg::Inactive);
        let params = TaskDefinitionParams {
            family_prefix: Some("api".into()),
            status: Some(TaskDefinitionStatus::Active),
            page_size: None,
        };

        let query = build_query(&args, &params, Some(500)).unwrap();

        assert_eq!(query.family_prefix, "api");
        assert_eq!(query.status, TaskDefinitionStatus::Inactive);
        assert_eq!(query.page_size, awskit::types::MAX_PAGE_SIZE);
    }

    #[test]
    fn test_missing_family_is_an_error() {
        let err = build_query(&args(None), &TaskDefinitionParams::default(), None).unwrap_err();
        assert_eq!(err.to_string(), "missing required arguments: family_prefix");
    }

    #[test]
    fn test_report_shape() {
        let ecs = MemoryEcs::new().with_definition(
            "web",
            1,
            "ACTIVE",
            json!({ "networkMode": "awsvpc" }),
        );
        let client = EcsClient::with_backend(Box::new(ecs));

        let report = list(&client, &TaskDefinitionQuery::new("web")).unwrap();
        let record = serde_json::to_value(&report).unwrap();

        assert_eq!(record["changed"], json!(false));
        assert_eq!(
            record["task_definitions"][0]["network_mode"],
            json!("awsvpc")
        );
    }

    #[test]
    fn test_empty_family_lists_nothing() {
        let client = EcsClient::with_backend(Box::new(MemoryEcs::new()));
        let report = list(&client, &TaskDefinitionQuery::new("web")).unwrap();
        assert!(report.task_definitions.is_empty());
    }
}
