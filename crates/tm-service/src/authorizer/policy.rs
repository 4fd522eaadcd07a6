//! API gateway IAM policy builder.
//!
//! A policy is built for one principal and one `methodArn`
//! (`arn:aws:execute-api:<region>:<account>:<apiId>/<stage>/<verb>/<path>`).
//! Methods are added as allow or deny entries, optionally with IAM
//! conditions, and rendered into the document the gateway expects.

use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;

pub const POLICY_VERSION: &str = "2012-10-17";
const INVOKE_ACTION: &str = "execute-api:Invoke";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PolicyError {
    #[error("Invalid method ARN: {0}")]
    InvalidArn(String),

    #[error("Invalid resource path: {0}. Path should match ^[/.a-zA-Z0-9-*]+$")]
    InvalidResource(String),

    #[error("No statements defined for the policy")]
    NoStatements,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Effect {
    Allow,
    Deny,
}

impl fmt::Display for Effect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Effect::Allow => f.write_str("Allow"),
            Effect::Deny => f.write_str("Deny"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpVerb {
    Get,
    Post,
    Put,
    Patch,
    Head,
    Delete,
    Options,
    All,
}

impl HttpVerb {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpVerb::Get => "GET",
            HttpVerb::Post => "POST",
            HttpVerb::Put => "PUT",
            HttpVerb::Patch => "PATCH",
            HttpVerb::Head => "HEAD",
            HttpVerb::Delete => "DELETE",
            HttpVerb::Options => "OPTIONS",
            HttpVerb::All => "*",
        }
    }
}

#[derive(Debug, Clone)]
struct PolicyMethod {
    resource_arn: String,
    conditions: Map<String, Value>,
}

/// One statement of the policy document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statement {
    #[serde(rename = "Action")]
    pub action: &'static str,

    #[serde(rename = "Effect")]
    pub effect: Effect,

    #[serde(rename = "Resource")]
    pub resource: Vec<String>,

    #[serde(rename = "Condition", skip_serializing_if = "Option::is_none")]
    pub condition: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PolicyDocument {
    #[serde(rename = "Version")]
    pub version: &'static str,

    #[serde(rename = "Statement")]
    pub statement: Vec<Statement>,
}

/// Authorizer response body.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyResponse {
    pub principal_id: String,
    pub policy_document: PolicyDocument,
    pub context: Map<String, Value>,
}

/// Builder for an API gateway access policy.
#[derive(Debug, Clone)]
pub struct AuthPolicy {
    principal_id: String,
    aws_account_id: String,
    rest_api_id: String,
    region: String,
    stage: String,
    allow_methods: Vec<PolicyMethod>,
    deny_methods: Vec<PolicyMethod>,
    context: Map<String, Value>,
}

impl AuthPolicy {
    /// Start a policy for `principal` from the ARN of the invoked method.
    ///
    /// # Errors
    ///
    /// `PolicyError::InvalidArn` when the ARN does not carry region, account,
    /// API id and stage.
    pub fn new(principal: &str, method_arn: &str) -> Result<Self, PolicyError> {
        let invalid = || PolicyError::InvalidArn(method_arn.to_string());

        let parts: Vec<&str> = method_arn.splitn(6, ':').collect();
        let (Some(region), Some(account), Some(api_path)) =
            (parts.get(3), parts.get(4), parts.get(5))
        else {
            return Err(invalid());
        };

        let mut api_parts = api_path.split('/');
        let rest_api_id = api_parts.next().filter(|s| !s.is_empty()).ok_or_else(invalid)?;
        let stage = api_parts.next().filter(|s| !s.is_empty()).ok_or_else(invalid)?;

        Ok(Self {
            principal_id: principal.to_string(),
            aws_account_id: (*account).to_string(),
            rest_api_id: rest_api_id.to_string(),
            region: (*region).to_string(),
            stage: stage.to_string(),
            allow_methods: Vec::new(),
            deny_methods: Vec::new(),
            context: Map::new(),
        })
    }

    /// Attach a key to the context map passed to the backend.
    pub fn with_context(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.context.insert(key.to_string(), value.into());
        self
    }

    pub fn allow_all_methods(&mut self) -> Result<(), PolicyError> {
        self.add_method(Effect::Allow, HttpVerb::All, "*", Map::new())
    }

    pub fn deny_all_methods(&mut self) -> Result<(), PolicyError> {
        self.add_method(Effect::Deny, HttpVerb::All, "*", Map::new())
    }

    pub fn allow_method(&mut self, verb: HttpVerb, resource: &str) -> Result<(), PolicyError> {
        self.add_method(Effect::Allow, verb, resource, Map::new())
    }

    pub fn deny_method(&mut self, verb: HttpVerb, resource: &str) -> Result<(), PolicyError> {
        self.add_method(Effect::Deny, verb, resource, Map::new())
    }

    pub fn allow_method_with_conditions(
        &mut self,
        verb: HttpVerb,
        resource: &str,
        conditions: Map<String, Value>,
    ) -> Result<(), PolicyError> {
        self.add_method(Effect::Allow, verb, resource, conditions)
    }

    pub fn deny_method_with_conditions(
        &mut self,
        verb: HttpVerb,
        resource: &str,
        conditions: Map<String, Value>,
    ) -> Result<(), PolicyError> {
        self.add_method(Effect::Deny, verb, resource, conditions)
    }

    fn add_method(
        &mut self,
        effect: Effect,
        verb: HttpVerb,
        resource: &str,
        conditions: Map<String, Value>,
    ) -> Result<(), PolicyError> {
        if !is_valid_resource_path(resource) {
            return Err(PolicyError::InvalidResource(resource.to_string()));
        }

        let resource = resource.strip_prefix('/').unwrap_or(resource);
        let resource_arn = format!(
            "arn:aws:execute-api:{}:{}:{}/{}/{}/{}",
            self.region,
            self.aws_account_id,
            self.rest_api_id,
            self.stage,
            verb.as_str(),
            resource
        );

        let method = PolicyMethod {
            resource_arn,
            conditions,
        };
        match effect {
            Effect::Allow => self.allow_methods.push(method),
            Effect::Deny => self.deny_methods.push(method),
        }
        Ok(())
    }

    /// Render the policy. Allow statements come before deny statements.
    ///
    /// # Errors
    ///
    /// `PolicyError::NoStatements` when no method was added.
    pub fn build(self) -> Result<PolicyResponse, PolicyError> {
        if self.allow_methods.is_empty() && self.deny_methods.is_empty() {
            return Err(PolicyError::NoStatements);
        }

        let mut statement = statements_for_effect(Effect::Allow, self.allow_methods);
        statement.extend(statements_for_effect(Effect::Deny, self.deny_methods));

        Ok(PolicyResponse {
            principal_id: self.principal_id,
            policy_document: PolicyDocument {
                version: POLICY_VERSION,
                statement,
            },
            context: self.context,
        })
    }
}

/// Conditional methods get one statement each; the unconditional ones share
/// a trailing statement.
fn statements_for_effect(effect: Effect, methods: Vec<PolicyMethod>) -> Vec<Statement> {
    let mut statements = Vec::new();
    let mut shared = Vec::new();

    for method in methods {
        if method.conditions.is_empty() {
            shared.push(method.resource_arn);
        } else {
            statements.push(Statement {
                action: INVOKE_ACTION,
                effect,
                resource: vec![method.resource_arn],
                condition: Some(method.conditions),
            });
        }
    }

    if !shared.is_empty() {
        statements.push(Statement {
            action: INVOKE_ACTION,
            effect,
            resource: shared,
            condition: None,
        });
    }

    statements
}

fn is_valid_resource_path(resource: &str) -> bool {
    !resource.is_empty()
        && resource
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '/' | '.' | '-' | '*'))
}
