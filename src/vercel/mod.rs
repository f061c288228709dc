//! Vercel API interaction module
//!
//! This module provides typed access to the Vercel management API: projects,
//! environment variables and DNS records.
//!
//! # Module Structure
//!
//! - [`client`] - Main client holding the base URL and default team scope
//! - [`context`] - Cancellation and deadlines for a call
//! - [`error`] - Error taxonomy
//! - [`http`] - Request building and the HTTP executor
//! - [`team`] - Team scope resolution
//! - [`dns`], [`env`], [`project`] - Operations and their data types
//!
//! # Example
//!
//! ```ignore
//! use vercel_client::{Config, Context, VercelClient};
//!
//! async fn example() -> vercel_client::Result<()> {
//!     let client = VercelClient::from_config(&Config::load())?;
//!     let records = client.list_dns_records(&Context::background(), "example.com", "").await?;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod context;
pub mod dns;
pub mod env;
pub mod error;
pub mod http;
pub mod project;
pub mod team;
