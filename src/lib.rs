//! Typed client for the Vercel management API
//!
//! Every operation is a single-shot call (or, for project creation, a fixed
//! chain of two calls) under a caller supplied [`Context`]. There are no
//! retries and no background work.

pub mod config;
pub mod vercel;

pub use config::Config;
pub use vercel::client::{VercelClient, DEFAULT_BASE_URL};
pub use vercel::context::{CancelHandle, Context};
pub use vercel::dns::{DnsRecord, DNS_RECORDS_PAGE_LIMIT};
pub use vercel::env::{
    CreateEnvironmentVariableRequest, CreateEnvironmentVariablesRequest, EnvironmentVariable,
    EnvironmentVariableRequest, EnvironmentVariableType,
};
pub use vercel::error::{ApiError, Error, ErrorKind, Result};
pub use vercel::http::{PreparedRequest, VercelHttpClient};
pub use vercel::project::{
    CreateProjectRequest, GitRepository, ProjectLink, ProjectResponse, SubmittedProject,
};
pub use vercel::team::resolve_team_id;
