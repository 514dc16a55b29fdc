//! # Provider Kinds
//!
//! The fixed set of VCS providers a stack or module can be attached to.
//!
//! - [`ProviderKind`] - which provider a block targets
//! - [`ProviderBlock`] - one declared block, one variant per kind
//!
//! ## Kinds
//!
//! | Kind | Block name | Discriminator |
//! |------|------------|---------------|
//! | Azure DevOps | `azure_devops` | `project` |
//! | Bitbucket Cloud | `bitbucket_cloud` | `namespace` |
//! | Bitbucket Datacenter | `bitbucket_datacenter` | `namespace` |
//! | GitHub Enterprise | `github_enterprise` | `namespace` |
//! | GitLab | `gitlab` | `namespace` |
//!
//! ```rust
//! use vcsbind::provider::ProviderKind;
//!
//! let kind: ProviderKind = "gitlab".parse().unwrap();
//! assert_eq!(kind.discriminator_field(), "namespace");
//! assert!("svn".parse::<ProviderKind>().is_err());
//! ```

mod block;

pub use block::{BlockFields, ProviderBlock};

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// VCS provider kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    #[serde(rename = "azure_devops")]
    AzureDevOps,
    BitbucketCloud,
    BitbucketDatacenter,
    #[serde(rename = "github_enterprise")]
    GitHubEnterprise,
    #[serde(rename = "gitlab")]
    GitLab,
}

impl ProviderKind {
    /// All kinds, in block declaration order
    pub const ALL: [ProviderKind; 5] = [
        ProviderKind::AzureDevOps,
        ProviderKind::BitbucketCloud,
        ProviderKind::BitbucketDatacenter,
        ProviderKind::GitHubEnterprise,
        ProviderKind::GitLab,
    ];

    /// Configuration block name (e.g. `github_enterprise`)
    pub fn block_name(&self) -> &'static str {
        match self {
            ProviderKind::AzureDevOps => "azure_devops",
            ProviderKind::BitbucketCloud => "bitbucket_cloud",
            ProviderKind::BitbucketDatacenter => "bitbucket_datacenter",
            ProviderKind::GitHubEnterprise => "github_enterprise",
            ProviderKind::GitLab => "gitlab",
        }
    }

    /// Name of the namespace/project field inside the block
    pub fn discriminator_field(&self) -> &'static str {
        match self {
            ProviderKind::AzureDevOps => "project",
            ProviderKind::BitbucketCloud
            | ProviderKind::BitbucketDatacenter
            | ProviderKind::GitHubEnterprise
            | ProviderKind::GitLab => "namespace",
        }
    }

    /// Human-readable name
    pub fn display_name(&self) -> &'static str {
        match self {
            ProviderKind::AzureDevOps => "Azure DevOps",
            ProviderKind::BitbucketCloud => "Bitbucket Cloud",
            ProviderKind::BitbucketDatacenter => "Bitbucket Datacenter",
            ProviderKind::GitHubEnterprise => "GitHub Enterprise",
            ProviderKind::GitLab => "GitLab",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.to_lowercase();
        ProviderKind::ALL
            .into_iter()
            .find(|kind| kind.block_name() == name)
            .ok_or_else(|| {
                format!(
                    "Unknown provider kind: '{}'. Available: {}",
                    s,
                    ProviderKind::ALL.map(|k| k.block_name()).join(", ")
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_names_round_trip_through_from_str() {
        for kind in ProviderKind::ALL {
            assert_eq!(kind.block_name().parse::<ProviderKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_serde_uses_block_names() {
        let kind: ProviderKind = serde_yaml::from_str("github_enterprise").unwrap();
        assert_eq!(kind, ProviderKind::GitHubEnterprise);

        let json = serde_json::to_string(&ProviderKind::AzureDevOps).unwrap();
        assert_eq!(json, "\"azure_devops\"");
    }

    #[test]
    fn test_serde_names_match_block_names() {
        for kind in ProviderKind::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.block_name()));

            let back: ProviderKind = serde_yaml::from_str(kind.block_name()).unwrap();
            assert_eq!(back, kind);
        }
    }

    #[test]
    fn test_azure_devops_uses_project() {
        assert_eq!(ProviderKind::AzureDevOps.discriminator_field(), "project");
        assert_eq!(ProviderKind::GitLab.discriminator_field(), "namespace");
    }

    #[test]
    fn test_unknown_kind_lists_available() {
        let err = "svn".parse::<ProviderKind>().unwrap_err();
        assert!(err.contains("bitbucket_datacenter"));
    }
}
