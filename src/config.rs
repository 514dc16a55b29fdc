//! Workspace file parsing
//!
//! A workspace file describes the space tree, the integrations known to the
//! directory, named lookups, and the stacks/modules with their provider
//! blocks. Everything the engine needs for a pass comes from here.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

use crate::declaration::{EntityRef, ProviderDeclaration};
use crate::directory::{IntegrationDirectory, IntegrationRecord, MemoryDirectory};
use crate::error::{Result, VcsError};
use crate::lookup::IntegrationLookup;
use crate::provider::{BlockFields, ProviderBlock, ProviderKind};
use crate::resolver::DefaultResolver;
use crate::space::{SpaceTree, ROOT_SPACE};

static ENTITY_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_-]*$").expect("entity id pattern"));

/// Parsed workspace file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Workspace {
    #[serde(default)]
    pub spaces: Vec<SpaceDecl>,
    #[serde(default)]
    pub integrations: Vec<IntegrationRecord>,
    #[serde(default)]
    pub lookups: BTreeMap<String, IntegrationLookup>,
    #[serde(default)]
    pub stacks: Vec<EntityDecl>,
    #[serde(default)]
    pub modules: Vec<EntityDecl>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpaceDecl {
    pub id: String,
    #[serde(default)]
    pub parent: Option<String>,
}

/// `azure_devops { project, id, id_from }`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectBlock {
    #[serde(default)]
    pub project: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub id_from: Option<String>,
}

/// `<provider> { namespace, id, id_from }`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NamespaceBlock {
    #[serde(default)]
    pub namespace: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub id_from: Option<String>,
}

impl From<&ProjectBlock> for BlockFields {
    fn from(raw: &ProjectBlock) -> Self {
        BlockFields {
            discriminator: raw.project.clone(),
            id: raw.id.clone(),
            id_from: raw.id_from.clone(),
        }
    }
}

impl From<&NamespaceBlock> for BlockFields {
    fn from(raw: &NamespaceBlock) -> Self {
        BlockFields {
            discriminator: raw.namespace.clone(),
            id: raw.id.clone(),
            id_from: raw.id_from.clone(),
        }
    }
}

/// A stack or module as written in the workspace file
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EntityDecl {
    pub id: String,
    #[serde(default = "default_space")]
    pub space: String,
    #[serde(default)]
    pub azure_devops: Option<ProjectBlock>,
    #[serde(default)]
    pub bitbucket_cloud: Option<NamespaceBlock>,
    #[serde(default)]
    pub bitbucket_datacenter: Option<NamespaceBlock>,
    #[serde(default)]
    pub github_enterprise: Option<NamespaceBlock>,
    #[serde(default)]
    pub gitlab: Option<NamespaceBlock>,
}

fn default_space() -> String {
    ROOT_SPACE.to_string()
}

impl EntityDecl {
    /// The one provider block this entity declares
    pub fn provider_block(&self, entity: &EntityRef) -> Result<ProviderBlock> {
        let mut blocks: Vec<ProviderBlock> = Vec::with_capacity(1);
        if let Some(raw) = &self.azure_devops {
            blocks.push(ProviderBlock::AzureDevOps(raw.into()));
        }
        let namespaced = [
            (ProviderKind::BitbucketCloud, &self.bitbucket_cloud),
            (ProviderKind::BitbucketDatacenter, &self.bitbucket_datacenter),
            (ProviderKind::GitHubEnterprise, &self.github_enterprise),
            (ProviderKind::GitLab, &self.gitlab),
        ];
        for (kind, raw) in namespaced {
            if let Some(raw) = raw {
                blocks.push(ProviderBlock::new(kind, raw.into()));
            }
        }

        if blocks.len() > 1 {
            return Err(VcsError::MultipleProviders {
                entity: entity.to_string(),
                kinds: blocks.iter().map(|b| b.kind().block_name().to_string()).collect(),
            });
        }
        blocks.pop().ok_or_else(|| VcsError::MissingProvider {
            entity: entity.to_string(),
        })
    }
}

/// Declaration ready for the reconciler
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedEntity {
    pub entity: EntityRef,
    pub space: String,
    pub declaration: ProviderDeclaration,
}

impl Workspace {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml(&yaml)
    }

    pub fn space_tree(&self) -> SpaceTree {
        let mut tree = SpaceTree::new();
        for space in &self.spaces {
            tree.insert(space.id.clone(), space.parent.clone());
        }
        tree
    }

    pub fn directory(&self) -> MemoryDirectory {
        MemoryDirectory::with_records(self.integrations.clone())
    }

    /// Stacks then modules, in file order
    pub fn entities(&self) -> impl Iterator<Item = (EntityRef, &EntityDecl)> {
        let stacks = self.stacks.iter().map(|d| (EntityRef::stack(d.id.clone()), d));
        let modules = self.modules.iter().map(|d| (EntityRef::module(d.id.clone()), d));
        stacks.chain(modules)
    }

    pub fn entity_count(&self) -> usize {
        self.stacks.len() + self.modules.len()
    }

    /// Static checks that need no directory access
    pub fn validate(&self) -> Result<()> {
        let mut space_ids: HashSet<&str> = HashSet::new();
        for space in &self.spaces {
            if !space_ids.insert(space.id.as_str()) {
                return Err(VcsError::InvalidDeclaration {
                    entity: format!("space {}", space.id),
                    reason: "declared twice".to_string(),
                });
            }
        }

        let spaces = self.space_tree();
        spaces.validate()?;

        let mut record_ids: HashSet<(ProviderKind, &str)> = HashSet::new();
        for record in &self.integrations {
            if !record_ids.insert((record.kind, record.id.as_str())) {
                return Err(VcsError::InvalidDeclaration {
                    entity: format!("integration {}", record.id),
                    reason: format!("{} integration declared twice", record.kind.block_name()),
                });
            }
            if !spaces.contains(&record.space) {
                return Err(VcsError::UnknownSpace { space: record.space.clone() });
            }
        }

        let mut seen: HashSet<EntityRef> = HashSet::new();
        for (entity, decl) in self.entities() {
            if !ENTITY_ID.is_match(&entity.id) {
                return Err(VcsError::InvalidDeclaration {
                    entity: entity.to_string(),
                    reason: format!(
                        "invalid id '{}' (letters, digits, '-' and '_' only)",
                        entity.id
                    ),
                });
            }
            if !seen.insert(entity.clone()) {
                return Err(VcsError::InvalidDeclaration {
                    entity: entity.to_string(),
                    reason: "declared twice".to_string(),
                });
            }
            if !spaces.contains(&decl.space) {
                return Err(VcsError::UnknownSpace { space: decl.space.clone() });
            }

            let block = decl.provider_block(&entity)?;
            ProviderDeclaration::from_block(&block, None).validate(&entity)?;
            if let Some(name) = &block.fields().id_from {
                let lookup = self.lookups.get(name).ok_or_else(|| VcsError::UnknownLookup {
                    entity: entity.to_string(),
                    lookup: name.clone(),
                })?;
                if lookup.kind != block.kind() {
                    return Err(VcsError::InvalidDeclaration {
                        entity: entity.to_string(),
                        reason: format!(
                            "{} block takes its id from lookup '{}' of kind {}",
                            block.kind().block_name(),
                            name,
                            lookup.kind.block_name()
                        ),
                    });
                }
            }
        }
        Ok(())
    }

    /// Validate, run lookups, and build one declaration per entity
    pub fn declarations<D>(&self, resolver: &DefaultResolver<'_, D>) -> Result<Vec<PlannedEntity>>
    where
        D: IntegrationDirectory + ?Sized,
    {
        self.validate()?;

        let mut looked_up: BTreeMap<String, String> = BTreeMap::new();
        let mut planned = Vec::with_capacity(self.entity_count());

        for (entity, decl) in self.entities() {
            let block = decl.provider_block(&entity)?;

            let external_id = match &block.fields().id_from {
                Some(name) => Some(match looked_up.get(name.as_str()) {
                    Some(id) => id.clone(),
                    None => {
                        let lookup = self.lookups.get(name).ok_or_else(|| VcsError::UnknownLookup {
                            entity: entity.to_string(),
                            lookup: name.clone(),
                        })?;
                        let id = lookup.lookup(resolver)?.id;
                        looked_up.insert(name.clone(), id.clone());
                        id
                    }
                }),
                None => None,
            };

            planned.push(PlannedEntity {
                entity,
                space: decl.space.clone(),
                declaration: ProviderDeclaration::from_block(&block, external_id),
            });
        }
        Ok(planned)
    }
}
