//! Default integration resolution
//!
//! Walks a space's ancestor chain (self → root) and returns the most
//! specific default integration of a kind. Pure read: nothing is cached
//! between calls.

use tracing::{debug, warn};

use crate::directory::IntegrationDirectory;
use crate::error::{Result, VcsError};
use crate::provider::ProviderKind;
use crate::space::SpaceTree;

/// Resolves space-scoped default integrations
pub struct DefaultResolver<'a, D: ?Sized> {
    directory: &'a D,
    spaces: &'a SpaceTree,
}

impl<D: ?Sized> Clone for DefaultResolver<'_, D> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<D: ?Sized> Copy for DefaultResolver<'_, D> {}

impl<'a, D: IntegrationDirectory + ?Sized> DefaultResolver<'a, D> {
    pub fn new(directory: &'a D, spaces: &'a SpaceTree) -> Self {
        Self { directory, spaces }
    }

    pub fn spaces(&self) -> &'a SpaceTree {
        self.spaces
    }

    pub fn directory(&self) -> &'a D {
        self.directory
    }

    /// Id of the default `kind` integration visible from `space`
    pub fn resolve_default(&self, kind: ProviderKind, space: &str) -> Result<String> {
        let chain = self.spaces.ancestry(space)?;

        for level in chain {
            let mut candidates = self.directory.find_default_integrations(kind, level)?;
            if candidates.is_empty() {
                continue;
            }

            candidates.sort_by(|a, b| a.id.cmp(&b.id));
            if candidates.len() > 1 {
                warn!(
                    kind = %kind,
                    space = level,
                    candidates = ?candidates.iter().map(|r| r.id.as_str()).collect::<Vec<_>>(),
                    chosen = candidates[0].id.as_str(),
                    "several default integrations registered at one level; using the smallest id"
                );
            }

            let chosen = candidates.swap_remove(0);
            if chosen.id.is_empty() {
                return Err(VcsError::EmptyIntegrationId {
                    kind,
                    space: level.to_string(),
                });
            }

            debug!(
                kind = %kind,
                space,
                found_at = level,
                id = chosen.id.as_str(),
                "resolved default integration"
            );
            return Ok(chosen.id);
        }

        Err(VcsError::NoDefaultIntegration {
            kind,
            space: space.to_string(),
        })
    }
}
