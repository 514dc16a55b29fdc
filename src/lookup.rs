//! Integration lookups
//!
//! A lookup finds one integration record, either by id or, when no id is
//! given, the default visible from `root`. Its result can feed a provider
//! block's id through `id_from`, where it becomes the declaration's
//! external id.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::directory::{IntegrationDirectory, IntegrationRecord};
use crate::error::{Result, VcsError};
use crate::provider::ProviderKind;
use crate::resolver::DefaultResolver;
use crate::space::ROOT_SPACE;

/// Lookup of a single integration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntegrationLookup {
    pub kind: ProviderKind,
    /// Specific integration id; unset or empty means "the root default"
    #[serde(default)]
    pub id: Option<String>,
}

impl IntegrationLookup {
    pub fn new(kind: ProviderKind) -> Self {
        Self { kind, id: None }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Find the record this lookup points at
    pub fn lookup<D>(&self, resolver: &DefaultResolver<'_, D>) -> Result<IntegrationRecord>
    where
        D: IntegrationDirectory + ?Sized,
    {
        let id = match self.id.as_deref().filter(|id| !id.is_empty()) {
            Some(id) => id.to_string(),
            None => resolver.resolve_default(self.kind, ROOT_SPACE)?,
        };

        let record = resolver
            .directory()
            .find_integration(self.kind, &id)?
            .ok_or_else(|| VcsError::IntegrationNotFound { kind: self.kind, id })?;

        debug!(
            kind = %self.kind,
            id = record.id.as_str(),
            space = record.space.as_str(),
            "lookup resolved"
        );
        Ok(record)
    }
}
