//! Environment Variables
//!
//! Creation (single and batch) and listing of project environment variables.

use super::client::VercelClient;
use super::context::Context;
use super::error::Result;
use super::http::{path_segment, PreparedRequest};
use serde::{Deserialize, Serialize};

/// How the platform stores and exposes a variable's value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvironmentVariableType {
    #[default]
    Plain,
    Secret,
    Encrypted,
    /// Value is never returned in plaintext
    Sensitive,
    System,
    /// A type this client does not know yet; never sent
    #[serde(other)]
    Unknown,
}

/// Write-only shape of an environment variable
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentVariableRequest {
    pub key: String,
    pub value: String,
    /// Deployment targets, e.g. `production`, `preview`, `development`
    pub target: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git_branch: Option<String>,
    #[serde(rename = "type", default)]
    pub env_type: EnvironmentVariableType,
}

/// An environment variable as returned by the API
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentVariable {
    pub key: String,
    /// Opaque (encrypted) as returned by the server unless restored with
    /// [`EnvironmentVariable::with_plaintext`]
    #[serde(default)]
    pub value: String,
    #[serde(default)]
    pub target: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git_branch: Option<String>,
    #[serde(rename = "type", default)]
    pub env_type: EnvironmentVariableType,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    /// Team scope of the call that returned this variable. Not part of the API payload.
    #[serde(skip)]
    pub team_id: String,
}

impl EnvironmentVariable {
    /// Replace the server's opaque value with the plaintext the caller supplied
    pub fn with_plaintext(mut self, value: &str) -> Self {
        self.value = value.to_string();
        self
    }

    /// Stamp the resolved team scope
    pub fn with_team_id(mut self, team_id: &str) -> Self {
        self.team_id = team_id.to_string();
        self
    }
}

impl From<EnvironmentVariableRequest> for EnvironmentVariable {
    fn from(request: EnvironmentVariableRequest) -> Self {
        Self {
            key: request.key,
            value: request.value,
            target: request.target,
            git_branch: request.git_branch,
            env_type: request.env_type,
            ..Default::default()
        }
    }
}

/// Parameters to create one environment variable
#[derive(Debug, Clone, Default)]
pub struct CreateEnvironmentVariableRequest {
    pub environment_variable: EnvironmentVariableRequest,
    pub project_id: String,
    /// Explicit team scope; empty falls back to the client default
    pub team_id: String,
}

/// Parameters to create several environment variables in one call
#[derive(Debug, Clone, Default)]
pub struct CreateEnvironmentVariablesRequest {
    pub environment_variables: Vec<EnvironmentVariableRequest>,
    pub project_id: String,
    pub team_id: String,
}

#[derive(Deserialize)]
struct EnvironmentVariablesResponse {
    #[serde(default)]
    envs: Vec<EnvironmentVariable>,
}

impl VercelClient {
    fn env_url(&self, project_id: &str, query: &[(&str, &str)], team_id: &str) -> Result<String> {
        Ok(self.url(
            &format!("/v9/projects/{}/env", path_segment("project id", project_id)?),
            query,
            team_id,
        ))
    }

    /// Create a single environment variable.
    ///
    /// The returned value holds the plaintext from `request`, never the
    /// server's encrypted echo.
    pub async fn create_environment_variable(
        &self,
        ctx: &Context,
        request: CreateEnvironmentVariableRequest,
    ) -> Result<EnvironmentVariable> {
        let team_id = self.team_id(&request.team_id);
        let url = self.env_url(&request.project_id, &[], team_id)?;
        let prepared = PreparedRequest::post_json(url, &request.environment_variable)?;

        tracing::trace!(
            "creating environment variable {} on project {}",
            request.environment_variable.key,
            request.project_id
        );

        let created: EnvironmentVariable = self.http.do_request(ctx, prepared).await?;
        Ok(created
            .with_plaintext(&request.environment_variable.value)
            .with_team_id(team_id))
    }

    /// Create several environment variables. Only success or failure is reported.
    pub async fn create_environment_variables(
        &self,
        ctx: &Context,
        request: CreateEnvironmentVariablesRequest,
    ) -> Result<()> {
        let team_id = self.team_id(&request.team_id);
        let url = self.env_url(&request.project_id, &[], team_id)?;
        let prepared = PreparedRequest::post_json(url, &request.environment_variables)?;

        tracing::trace!(
            "creating {} environment variables on project {}",
            request.environment_variables.len(),
            request.project_id
        );

        self.http.do_request_discard(ctx, prepared).await
    }

    /// List the environment variables of a project, values left encrypted
    pub async fn get_environment_variables(
        &self,
        ctx: &Context,
        project_id: &str,
        team_id: &str,
    ) -> Result<Vec<EnvironmentVariable>> {
        let team_id = self.team_id(team_id);
        let url = self.url(
            &format!("/v8/projects/{}/env", path_segment("project id", project_id)?),
            &[("decrypt", "false")],
            team_id,
        );

        let response: EnvironmentVariablesResponse =
            self.http.do_request(ctx, PreparedRequest::get(url)).await?;

        Ok(response
            .envs
            .into_iter()
            .map(|env| env.with_team_id(team_id))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_serialization() {
        let request = EnvironmentVariableRequest {
            key: "FOO".into(),
            value: "bar".into(),
            target: vec!["production".into()],
            git_branch: None,
            env_type: EnvironmentVariableType::Sensitive,
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"key": "FOO", "value": "bar", "target": ["production"], "type": "sensitive"})
        );
    }

    #[test]
    fn test_git_branch_serialized_when_set() {
        let request = EnvironmentVariableRequest {
            key: "FOO".into(),
            git_branch: Some("staging".into()),
            ..Default::default()
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["gitBranch"], "staging");
        assert_eq!(value["type"], "plain");
    }

    #[test]
    fn test_with_plaintext_overwrites_encrypted_value() {
        let server_echo: EnvironmentVariable = serde_json::from_value(json!({
            "id": "env_1",
            "key": "TOKEN",
            "value": "eyJ2IjoiZW5jcnlwdGVkIn0=",
            "target": ["production"],
            "type": "encrypted"
        }))
        .unwrap();

        let restored = server_echo.with_plaintext("secret123").with_team_id("team_1");
        assert_eq!(restored.value, "secret123");
        assert_eq!(restored.id, "env_1");
        assert_eq!(restored.env_type, EnvironmentVariableType::Encrypted);
        assert_eq!(restored.team_id, "team_1");
    }

    #[test]
    fn test_unknown_type_still_decodes() {
        let env: EnvironmentVariable = serde_json::from_value(json!({
            "id": "env_9",
            "key": "FOO",
            "value": "x",
            "target": ["production"],
            "type": "fancy-new-type"
        }))
        .unwrap();
        assert_eq!(env.env_type, EnvironmentVariableType::Unknown);
        assert_eq!(env.id, "env_9");
    }

    #[test]
    fn test_from_request() {
        let env: EnvironmentVariable = EnvironmentVariableRequest {
            key: "FOO".into(),
            value: "bar".into(),
            target: vec!["preview".into()],
            ..Default::default()
        }
        .into();
        assert!(env.id.is_empty());
        assert_eq!(
            serde_json::to_value(&env).unwrap(),
            json!({"key": "FOO", "value": "bar", "target": ["preview"], "type": "plain"})
        );
    }
}
