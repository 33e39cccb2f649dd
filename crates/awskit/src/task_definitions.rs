//! Task definition facts: list a family's revisions and describe each one.

use crate::backend::EcsBackend;
use crate::casing::snake_case_keys;
use crate::error::Result;
use crate::types::TaskDefinitionQuery;
use serde_json::Value;

/// Collect every task definition ARN matching `query`, across all pages.
///
/// Order is whatever the service returns. A token that comes back
/// unchanged ends the listing.
pub fn list_task_definition_arns(
    backend: &dyn EcsBackend,
    query: &TaskDefinitionQuery,
) -> Result<Vec<String>> {
    let mut arns = Vec::new();
    let mut token: Option<String> = None;

    loop {
        let page = backend.list_task_definitions(query, token.as_deref())?;
        arns.extend(page.arns);

        match page.next_token {
            Some(next) if token.as_deref() != Some(next.as_str()) => token = Some(next),
            Some(_) => {
                log::warn!("ListTaskDefinitions repeated its continuation token; stopping");
                break;
            }
            None => break,
        }
    }

    log::debug!(
        "Found {} task definitions for family {} ({})",
        arns.len(),
        query.family_prefix,
        query.status
    );
    Ok(arns)
}

/// List and describe every task definition matching `query`.
///
/// Any failure aborts the whole listing; no partial results are returned.
/// Detail records come back with snake_case keys.
pub fn list_task_definitions(
    backend: &dyn EcsBackend,
    query: &TaskDefinitionQuery,
) -> Result<Vec<Value>> {
    list_task_definition_arns(backend, query)?
        .iter()
        .map(|arn| backend.describe_task_definition(arn).map(snake_case_keys))
        .collect()
}
