//! Declared provider block (one variant per kind)

use super::ProviderKind;

/// Fields shared by every provider block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockFields {
    /// `project` for Azure DevOps, `namespace` for the others
    pub discriminator: String,
    /// Integration id pinned by the user
    pub id: Option<String>,
    /// Name of a lookup whose result supplies the id
    pub id_from: Option<String>,
}

impl BlockFields {
    pub fn new(discriminator: impl Into<String>) -> Self {
        Self {
            discriminator: discriminator.into(),
            id: None,
            id_from: None,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_id_from(mut self, lookup: impl Into<String>) -> Self {
        self.id_from = Some(lookup.into());
        self
    }
}

/// The single provider block declared on a stack or module
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderBlock {
    AzureDevOps(BlockFields),
    BitbucketCloud(BlockFields),
    BitbucketDatacenter(BlockFields),
    GitHubEnterprise(BlockFields),
    GitLab(BlockFields),
}

impl ProviderBlock {
    pub fn new(kind: ProviderKind, fields: BlockFields) -> Self {
        match kind {
            ProviderKind::AzureDevOps => ProviderBlock::AzureDevOps(fields),
            ProviderKind::BitbucketCloud => ProviderBlock::BitbucketCloud(fields),
            ProviderKind::BitbucketDatacenter => ProviderBlock::BitbucketDatacenter(fields),
            ProviderKind::GitHubEnterprise => ProviderBlock::GitHubEnterprise(fields),
            ProviderKind::GitLab => ProviderBlock::GitLab(fields),
        }
    }

    pub fn kind(&self) -> ProviderKind {
        match self {
            ProviderBlock::AzureDevOps(_) => ProviderKind::AzureDevOps,
            ProviderBlock::BitbucketCloud(_) => ProviderKind::BitbucketCloud,
            ProviderBlock::BitbucketDatacenter(_) => ProviderKind::BitbucketDatacenter,
            ProviderBlock::GitHubEnterprise(_) => ProviderKind::GitHubEnterprise,
            ProviderBlock::GitLab(_) => ProviderKind::GitLab,
        }
    }

    pub fn fields(&self) -> &BlockFields {
        match self {
            ProviderBlock::AzureDevOps(f)
            | ProviderBlock::BitbucketCloud(f)
            | ProviderBlock::BitbucketDatacenter(f)
            | ProviderBlock::GitHubEnterprise(f)
            | ProviderBlock::GitLab(f) => f,
        }
    }
}
