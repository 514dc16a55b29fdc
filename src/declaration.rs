//! Declared intent for one VCS binding
//!
//! A [`ProviderDeclaration`] is rebuilt from configuration on every pass and
//! never persisted. Empty ids are normalised to "absent" at read time.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, VcsError};
use crate::provider::{ProviderBlock, ProviderKind};

/// Kind of managed entity carrying a VCS attachment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Stack,
    Module,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Stack => "stack",
            EntityKind::Module => "module",
        }
    }
}

/// Address of a stack or module, rendered as `stack.<id>` / `module.<id>`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EntityRef {
    pub kind: EntityKind,
    pub id: String,
}

impl EntityRef {
    pub fn stack(id: impl Into<String>) -> Self {
        Self {
            kind: EntityKind::Stack,
            id: id.into(),
        }
    }

    pub fn module(id: impl Into<String>) -> Self {
        Self {
            kind: EntityKind::Module,
            id: id.into(),
        }
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.kind.as_str(), self.id)
    }
}

impl FromStr for EntityRef {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (kind, id) = s
            .split_once('.')
            .ok_or_else(|| {
                format!("Invalid entity address '{}': expected stack.<id> or module.<id>", s)
            })?;
        if id.is_empty() {
            return Err(format!("Invalid entity address '{}': empty id", s));
        }
        match kind {
            "stack" => Ok(EntityRef::stack(id)),
            "module" => Ok(EntityRef::module(id)),
            other => Err(format!("Invalid entity kind '{}' in '{}'", other, s)),
        }
    }
}

impl TryFrom<String> for EntityRef {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<EntityRef> for String {
    fn from(entity: EntityRef) -> Self {
        entity.to_string()
    }
}

/// The user's intent for one binding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderDeclaration {
    pub kind: ProviderKind,
    /// Provider namespace/project; opaque to resolution
    pub discriminator: String,
    explicit_id: Option<String>,
    external_id: Option<String>,
}

impl ProviderDeclaration {
    pub fn new(kind: ProviderKind, discriminator: impl Into<String>) -> Self {
        Self {
            kind,
            discriminator: discriminator.into(),
            explicit_id: None,
            external_id: None,
        }
    }

    /// Declaration for a parsed block, with the id supplied by its lookup (if any)
    pub fn from_block(block: &ProviderBlock, external_id: Option<String>) -> Self {
        let fields = block.fields();
        Self {
            kind: block.kind(),
            discriminator: fields.discriminator.clone(),
            explicit_id: fields.id.clone(),
            external_id,
        }
    }

    /// Id the user pinned in the block
    pub fn with_explicit_id(mut self, id: impl Into<String>) -> Self {
        self.explicit_id = Some(id.into());
        self
    }

    /// Id supplied by a sibling lookup
    pub fn with_external_id(mut self, id: impl Into<String>) -> Self {
        self.external_id = Some(id.into());
        self
    }

    /// Pinned id, `None` when unset or empty
    pub fn explicit_id(&self) -> Option<&str> {
        non_empty(self.explicit_id.as_deref())
    }

    /// Lookup-supplied id, `None` when unset or empty
    pub fn external_id(&self) -> Option<&str> {
        non_empty(self.external_id.as_deref())
    }

    /// Reject declarations the resolver must never see
    pub fn validate(&self, entity: &EntityRef) -> Result<()> {
        if self.discriminator.trim().is_empty() {
            return Err(VcsError::MissingDiscriminator {
                entity: entity.to_string(),
                kind: self.kind,
                field: self.kind.discriminator_field(),
            });
        }
        Ok(())
    }
}

fn non_empty(id: Option<&str>) -> Option<&str> {
    id.filter(|id| !id.is_empty())
}
