//! Custom role definition output.
//!
//! The emitted document matches the shape expected by the Azure
//! custom-role-definition API, so it can be submitted without
//! transformation.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Error while building a role definition.
#[derive(Debug)]
pub enum RoleError {
    /// No actions survived aggregation and denylisting. A role with an
    /// empty action list indicates an upstream capture failure and is
    /// never emitted.
    EmptyActions,
    /// No assignable scope was supplied or derivable.
    NoScope,
}

impl std::fmt::Display for RoleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RoleError::EmptyActions => {
                write!(f, "no actions to grant; the capture produced no usable operations")
            }
            RoleError::NoScope => write!(f, "no assignable scope for role definition"),
        }
    }
}

impl std::error::Error for RoleError {}

/// Azure custom role definition document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RoleDefinition {
    pub name: String,
    pub description: String,
    /// Control-plane actions, exactly the observed operation set.
    pub actions: Vec<String>,
    /// Always empty: the role grants only what was observed.
    pub not_actions: Vec<String>,
    /// Always empty: data-plane operations are not captured.
    pub data_actions: Vec<String>,
    pub not_data_actions: Vec<String>,
    pub assignable_scopes: Vec<String>,
}

/// Builds the assignable scope string for a subscription.
pub fn subscription_scope(subscription_id: &str) -> String {
    format!("/subscriptions/{subscription_id}")
}

/// Builds a role definition from a derived action set.
///
/// Fails fast on an empty action set or an empty scope list rather than
/// emitting a vacuous role. Actions land in the output in set order.
pub fn render_role_definition(
    actions: &BTreeSet<String>,
    scopes: &[String],
    name: &str,
    description: &str,
) -> Result<RoleDefinition, RoleError> {
    if actions.is_empty() {
        return Err(RoleError::EmptyActions);
    }
    if scopes.is_empty() || scopes.iter().any(|scope| scope.is_empty()) {
        return Err(RoleError::NoScope);
    }

    Ok(RoleDefinition {
        name: name.to_string(),
        description: description.to_string(),
        actions: actions.iter().cloned().collect(),
        not_actions: Vec::new(),
        data_actions: Vec::new(),
        not_data_actions: Vec::new(),
        assignable_scopes: scopes.to_vec(),
    })
}
