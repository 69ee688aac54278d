// drupal.org API module.
// Provides the cached client and types for the api-d7 REST endpoints.

pub mod client;
pub mod endpoints;
pub mod types;

pub use client::DrupalClient;
pub use endpoints::parse_issue_number;
pub use types::{Issue, Patch, Project};
