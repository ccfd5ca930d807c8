//! Authorization decisions and the IAM-style policy documents they render to.

use serde::{Deserialize, Serialize};

pub const POLICY_VERSION: &str = "2012-10-17";
pub const INVOKE_ACTION: &str = "execute-api:Invoke";
pub const PRINCIPAL_ID: &str = "user";

/// Scope of the Deny issued when there is no method ARN to narrow it.
pub const WILDCARD_SCOPE: &str = "arn:aws:execute-api:*/*/*";

/// Collapse a method ARN to its API + stage and widen it to every method
/// and path: `<api>/<stage>/*/*`.
///
/// Inputs with fewer than two `/`-separated segments are padded with `*`, so
/// normalizing a normalized scope returns it unchanged.
pub fn normalize_scope(resource: &str) -> String {
    let mut parts = resource.split('/');
    let api = parts.next().unwrap_or_default();
    let stage = parts.next().unwrap_or("*");
    format!("{}/{}/*/*", api, stage)
}

/// Policy effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    Allow,
    Deny,
}

/// Outcome of an authorization check. Both variants carry the normalized
/// scope the effect applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow { scope: String },
    Deny { scope: String },
}

impl Decision {
    pub fn allow(resource: &str) -> Self {
        let scope = normalize_scope(resource);
        tracing::info!(resource = %scope, "Allowing access");
        Decision::Allow { scope }
    }

    pub fn deny(resource: &str) -> Self {
        let scope = normalize_scope(resource);
        tracing::warn!(resource = %scope, "Denying access");
        Decision::Deny { scope }
    }

    /// Deny without a method ARN: [`WILDCARD_SCOPE`], not normalized.
    pub fn deny_all() -> Self {
        tracing::warn!(resource = WILDCARD_SCOPE, "Denying access");
        Decision::Deny {
            scope: WILDCARD_SCOPE.to_string(),
        }
    }

    pub fn effect(&self) -> Effect {
        match self {
            Decision::Allow { .. } => Effect::Allow,
            Decision::Deny { .. } => Effect::Deny,
        }
    }

    pub fn scope(&self) -> &str {
        match self {
            Decision::Allow { scope } | Decision::Deny { scope } => scope,
        }
    }

    pub fn into_policy(self) -> PolicyResponse {
        PolicyResponse {
            principal_id: PRINCIPAL_ID.to_string(),
            policy_document: PolicyDocument {
                version: POLICY_VERSION.to_string(),
                statement: vec![Statement {
                    action: INVOKE_ACTION.to_string(),
                    effect: self.effect(),
                    resource: self.scope().to_string(),
                }],
            },
        }
    }
}

/// Authorizer output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyResponse {
    #[serde(rename = "principalId")]
    pub principal_id: String,
    #[serde(rename = "policyDocument")]
    pub policy_document: PolicyDocument,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyDocument {
    #[serde(rename = "Version")]
    pub version: String,
    #[serde(rename = "Statement")]
    pub statement: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statement {
    #[serde(rename = "Action")]
    pub action: String,
    #[serde(rename = "Effect")]
    pub effect: Effect,
    #[serde(rename = "Resource")]
    pub resource: String,
}

impl PolicyResponse {
    /// Effect of the single statement.
    pub fn effect(&self) -> Option<Effect> {
        self.policy_document.statement.first().map(|s| s.effect)
    }
}
