//! Policy diff between observed and desired state

use crate::types::PolicySelection;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Managed policies to detach and attach
///
/// Both sides are sets, so order in the input never matters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyDelta {
    /// Attached now, not desired
    pub to_detach: BTreeSet<String>,
    /// Desired, not attached now
    pub to_attach: BTreeSet<String>,
}

impl PolicyDelta {
    /// Compute the delta for a selection against what is attached
    ///
    /// [`PolicySelection::NoChange`] always yields an empty delta.
    pub fn compute(observed: &BTreeSet<String>, selection: &PolicySelection) -> Self {
        let Some(desired) = selection.desired() else {
            return Self::default();
        };
        Self {
            to_detach: observed.difference(&desired).cloned().collect(),
            to_attach: desired.difference(observed).cloned().collect(),
        }
    }

    /// Check if there is nothing to do
    pub fn is_empty(&self) -> bool {
        self.to_detach.is_empty() && self.to_attach.is_empty()
    }

    /// Total number of policy calls the delta needs
    pub fn len(&self) -> usize {
        self.to_detach.len() + self.to_attach.len()
    }
}
