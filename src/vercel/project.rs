//! Projects
//!
//! Project creation. Creating a project is a two phase sequence: the project
//! is submitted, then its environment variables are fetched back and
//! attached, since the creation response is not authoritative for them.

use super::client::VercelClient;
use super::context::Context;
use super::env::EnvironmentVariable;
use super::error::{Error, Result};
use super::http::PreparedRequest;
use serde::{Deserialize, Serialize};

/// Git provider and repository a project is linked with
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GitRepository {
    /// Provider, e.g. `github`, `gitlab`, `bitbucket`
    #[serde(rename = "type")]
    pub repo_type: String,
    /// Repository slug, e.g. `owner/repo`
    pub repo: String,
}

/// Information necessary to create a project
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectRequest {
    pub name: String,
    #[serde(default)]
    pub build_command: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command_for_ignoring_build_step: Option<String>,
    #[serde(default)]
    pub dev_command: Option<String>,
    #[serde(default)]
    pub environment_variables: Vec<EnvironmentVariable>,
    #[serde(default)]
    pub framework: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git_repository: Option<GitRepository>,
    #[serde(default)]
    pub install_command: Option<String>,
    #[serde(default)]
    pub output_directory: Option<String>,
    #[serde(default)]
    pub public_source: Option<bool>,
    #[serde(default)]
    pub root_directory: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serverless_function_region: Option<String>,
}

/// Repository link as reported on a project
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectLink {
    #[serde(rename = "type", default)]
    pub link_type: String,
    #[serde(default)]
    pub repo: Option<String>,
    #[serde(default)]
    pub org: Option<String>,
    #[serde(default)]
    pub repo_owner: Option<String>,
    #[serde(default)]
    pub repo_slug: Option<String>,
    #[serde(default)]
    pub production_branch: Option<String>,
}

impl ProjectLink {
    /// The `owner/repo` slug, whichever way the provider reports it
    pub fn repository(&self) -> Option<GitRepository> {
        let repo = match (&self.repo, &self.org, &self.repo_owner, &self.repo_slug) {
            (Some(repo), Some(org), _, _) => format!("{}/{}", org, repo),
            (Some(repo), None, _, _) => repo.clone(),
            (None, _, Some(owner), Some(slug)) => format!("{}/{}", owner, slug),
            _ => return None,
        };
        Some(GitRepository {
            repo_type: self.link_type.clone(),
            repo,
        })
    }
}

/// A project as returned by the API
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectResponse {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub account_id: Option<String>,
    #[serde(default)]
    pub build_command: Option<String>,
    #[serde(default)]
    pub command_for_ignoring_build_step: Option<String>,
    #[serde(default)]
    pub dev_command: Option<String>,
    #[serde(rename = "env", default)]
    pub environment_variables: Vec<EnvironmentVariable>,
    #[serde(default)]
    pub framework: Option<String>,
    #[serde(default)]
    pub install_command: Option<String>,
    #[serde(default)]
    pub link: Option<ProjectLink>,
    #[serde(default)]
    pub output_directory: Option<String>,
    #[serde(default)]
    pub public_source: Option<bool>,
    #[serde(default)]
    pub root_directory: Option<String>,
    #[serde(default)]
    pub serverless_function_region: Option<String>,
    /// Team scope of the call that returned this project. Not part of the API payload.
    #[serde(skip)]
    pub team_id: String,
}

/// A project accepted by the server whose environment variables are not yet confirmed
#[derive(Debug, Clone)]
pub struct SubmittedProject {
    pub project: ProjectResponse,
    /// Team scope resolved for the submission, reused by the confirmation
    pub team_id: String,
}

impl VercelClient {
    /// Create a project, then fetch and attach its environment variables.
    ///
    /// A failure of the follow-up fetch is reported as
    /// [`Error::EnvironmentVariablesFetch`]: the project exists at that point.
    pub async fn create_project(
        &self,
        ctx: &Context,
        team_id: &str,
        request: &CreateProjectRequest,
    ) -> Result<ProjectResponse> {
        let submitted = self.submit_project(ctx, team_id, request).await?;
        self.confirm_project(ctx, submitted).await
    }

    /// Phase one: POST the project configuration
    pub async fn submit_project(
        &self,
        ctx: &Context,
        team_id: &str,
        request: &CreateProjectRequest,
    ) -> Result<SubmittedProject> {
        if request.name.trim().is_empty() {
            return Err(Error::InvalidRequest("project name must not be empty".into()));
        }

        let team_id = self.team_id(team_id);
        let url = self.url("/v8/projects", &[], team_id);
        let prepared = PreparedRequest::post_json(url, request)?;

        tracing::trace!(
            "creating project {} with {} environment variables",
            request.name,
            request.environment_variables.len()
        );

        let project: ProjectResponse = self.http.do_request(ctx, prepared).await?;
        tracing::debug!("Created project {} ({})", project.name, project.id);

        Ok(SubmittedProject {
            project,
            team_id: team_id.to_string(),
        })
    }

    /// Phase two: replace the echoed environment variables with the
    /// authoritative list and stamp the team scope
    pub async fn confirm_project(
        &self,
        ctx: &Context,
        submitted: SubmittedProject,
    ) -> Result<ProjectResponse> {
        let SubmittedProject {
            mut project,
            team_id,
        } = submitted;

        match self
            .get_environment_variables(ctx, &project.id, &team_id)
            .await
        {
            Ok(env) => {
                project.environment_variables = env;
                project.team_id = team_id;
                Ok(project)
            }
            Err(source) => {
                tracing::error!(
                    "Project {} created but its environment variables could not be fetched: {}",
                    project.id,
                    source
                );
                project.team_id = team_id;
                Err(Error::EnvironmentVariablesFetch {
                    project: Box::new(project),
                    source: Box::new(source),
                })
            }
        }
    }
}
