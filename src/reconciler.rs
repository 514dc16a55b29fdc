//! Binding reconciliation
//!
//! Turns a [`ProviderDeclaration`] into a [`Binding`] and decides whether it
//! differs from what was stored last time.
//!
//! Id precedence, first non-empty wins:
//!
//! 1. the id pinned in the block
//! 2. the id supplied by a lookup (`id_from`)
//! 3. the default integration visible from the entity's space
//!
//! Drift is judged on `(kind, resolved_id)` only. Which tier produced the id
//! is not part of the comparison.

use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::declaration::{EntityRef, ProviderDeclaration};
use crate::directory::IntegrationDirectory;
use crate::error::{Result, VcsError};
use crate::provider::ProviderKind;
use crate::resolver::DefaultResolver;
use crate::space::SpaceTree;
use crate::state::{BindingStore, StoredBinding};

/// Resolved attachment of one entity to one integration
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Binding {
    pub entity: EntityRef,
    pub kind: ProviderKind,
    /// Never empty
    pub resolved_id: String,
    pub discriminator: String,
}

/// Where a resolved id came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdSource {
    Explicit,
    External,
    SpaceDefault,
}

impl IdSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            IdSource::Explicit => "explicit",
            IdSource::External => "external",
            IdSource::SpaceDefault => "space default",
        }
    }
}

/// Difference between the stored and the freshly computed binding
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Drift {
    /// Nothing stored yet
    Created,
    Unchanged,
    IdChanged { from: String, to: String },
    /// Provider kind replaced; the old kind is unbound
    KindChanged { from: ProviderKind, to: ProviderKind },
}

impl Drift {
    pub fn between(previous: Option<&StoredBinding>, next: &Binding) -> Self {
        match previous {
            None => Drift::Created,
            Some(prev) if prev.kind != next.kind => Drift::KindChanged {
                from: prev.kind,
                to: next.kind,
            },
            Some(prev) if prev.resolved_id != next.resolved_id => Drift::IdChanged {
                from: prev.resolved_id.clone(),
                to: next.resolved_id.clone(),
            },
            Some(_) => Drift::Unchanged,
        }
    }

    pub fn is_change(&self) -> bool {
        !matches!(self, Drift::Unchanged)
    }
}

/// Result of one reconciliation pass for one entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileOutcome {
    pub binding: Binding,
    pub drift: Drift,
}

/// Computes bindings and reconciles them against a store
///
/// Holds only shared references, so one reconciler can serve concurrent
/// passes for different entities.
pub struct Reconciler<'a, D: ?Sized> {
    resolver: DefaultResolver<'a, D>,
}

impl<'a, D: IntegrationDirectory + ?Sized> Reconciler<'a, D> {
    pub fn new(directory: &'a D, spaces: &'a SpaceTree) -> Self {
        Self {
            resolver: DefaultResolver::new(directory, spaces),
        }
    }

    pub fn resolver(&self) -> &DefaultResolver<'a, D> {
        &self.resolver
    }

    /// Compute the binding for `decl` declared in `space`
    pub fn resolve(
        &self,
        entity: &EntityRef,
        decl: &ProviderDeclaration,
        space: &str,
    ) -> Result<Binding> {
        let (resolved_id, source) = self.select_id(decl, space)?;

        debug!(
            entity = %entity,
            kind = %decl.kind,
            source = source.as_str(),
            id = resolved_id.as_str(),
            "selected integration id"
        );

        Ok(Binding {
            entity: entity.clone(),
            kind: decl.kind,
            resolved_id,
            discriminator: decl.discriminator.clone(),
        })
    }

    fn select_id(&self, decl: &ProviderDeclaration, space: &str) -> Result<(String, IdSource)> {
        if let Some(id) = decl.explicit_id() {
            return Ok((id.to_string(), IdSource::Explicit));
        }
        if let Some(id) = decl.external_id() {
            return Ok((id.to_string(), IdSource::External));
        }

        let id = self
            .resolver
            .resolve_default(decl.kind, space)
            .map_err(|source| VcsError::Resolution {
                kind: decl.kind,
                discriminator: decl.discriminator.clone(),
                source: Box::new(source),
            })?;
        Ok((id, IdSource::SpaceDefault))
    }

    /// Resolve and compare against the store without writing
    pub fn plan<S>(
        &self,
        entity: &EntityRef,
        decl: &ProviderDeclaration,
        space: &str,
        store: &S,
    ) -> Result<ReconcileOutcome>
    where
        S: BindingStore + ?Sized,
    {
        let binding = self.resolve(entity, decl, space)?;
        let previous = store.load(entity)?;
        let drift = Drift::between(previous.as_ref(), &binding);
        Ok(ReconcileOutcome { binding, drift })
    }

    /// Resolve, compare, and save only when something changed
    #[instrument(skip(self, entity, decl, store), fields(entity = %entity, kind = %decl.kind))]
    pub fn reconcile<S>(
        &self,
        entity: &EntityRef,
        decl: &ProviderDeclaration,
        space: &str,
        store: &S,
    ) -> Result<ReconcileOutcome>
    where
        S: BindingStore + ?Sized,
    {
        let outcome = self.plan(entity, decl, space, store)?;

        if outcome.drift.is_change() {
            store.save(&outcome.binding)?;
            info!(
                id = outcome.binding.resolved_id.as_str(),
                drift = ?outcome.drift,
                "binding saved"
            );
        } else {
            debug!("binding unchanged");
        }

        Ok(outcome)
    }
}
