//! # Integration Directory
//!
//! Read access to the integration records owned by the remote service.
//!
//! - [`IntegrationDirectory`] - query trait consumed by the resolver and lookups
//! - [`IntegrationRecord`] - one registered integration
//! - [`MemoryDirectory`] - in-process directory with outage simulation
//!
//! The engine never writes through this trait. Each call is a single
//! synchronous read; retries belong to whatever transport backs an
//! implementation.

mod memory;

pub use memory::MemoryDirectory;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::provider::ProviderKind;

/// An integration registered with the remote service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrationRecord {
    pub id: String,

    pub kind: ProviderKind,

    /// Space the integration was registered in
    pub space: String,

    /// Marked as the default for its kind in `space`
    #[serde(default, rename = "default")]
    pub is_default: bool,

    #[serde(default)]
    pub name: Option<String>,
}

impl IntegrationRecord {
    /// Non-default integration of `kind` registered in `space`
    pub fn new(id: impl Into<String>, kind: ProviderKind, space: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            space: space.into(),
            is_default: false,
            name: None,
        }
    }

    /// Default integration of `kind` registered in `space`
    pub fn default_for(
        id: impl Into<String>,
        kind: ProviderKind,
        space: impl Into<String>,
    ) -> Self {
        Self {
            is_default: true,
            ..Self::new(id, kind, space)
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Query interface over the remote integration directory
///
/// Implementations must be safe to share between concurrent
/// reconciliation passes.
pub trait IntegrationDirectory: Send + Sync {
    /// Default integrations of `kind` registered exactly at `space`
    ///
    /// Ancestors are not consulted here; walking the chain is the
    /// resolver's job. More than one result means the remote system's
    /// one-default-per-level invariant was broken.
    fn find_default_integrations(
        &self,
        kind: ProviderKind,
        space: &str,
    ) -> Result<Vec<IntegrationRecord>>;

    /// Integration of `kind` with the given id, if any
    fn find_integration(&self, kind: ProviderKind, id: &str) -> Result<Option<IntegrationRecord>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_record_from_yaml() {
        let yaml = r#"
            id: ghe-root
            kind: github_enterprise
            space: root
            default: true
        "#;
        let record: IntegrationRecord = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(
            record,
            IntegrationRecord::default_for("ghe-root", ProviderKind::GitHubEnterprise, "root")
        );
    }

    #[test]
    fn default_flag_is_optional() {
        let yaml = "{ id: gl-1, kind: gitlab, space: team-a, name: GitLab EU }";
        let record: IntegrationRecord = serde_yaml::from_str(yaml).unwrap();

        assert!(!record.is_default);
        assert_eq!(record.name.as_deref(), Some("GitLab EU"));
    }
}
