//! Reconciliation pass over a whole workspace
//!
//! Builds the space tree and directory from the workspace, turns every
//! stack/module into a declaration, then plans or applies each one. The
//! first error aborts the pass; bindings saved before it stay saved.

use tracing::info;

use crate::config::Workspace;
use crate::declaration::EntityRef;
use crate::directory::IntegrationDirectory;
use crate::error::Result;
use crate::reconciler::{Drift, ReconcileOutcome, Reconciler};
use crate::space::SpaceTree;
use crate::state::BindingStore;

/// Plan only, or plan and persist
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassMode {
    Plan,
    Apply,
}

/// Per-entity results of one pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassReport {
    pub outcomes: Vec<ReconcileOutcome>,
}

impl PassReport {
    /// Entities whose binding differs from the stored one
    pub fn changed(&self) -> impl Iterator<Item = &ReconcileOutcome> {
        self.outcomes.iter().filter(|o| o.drift.is_change())
    }

    pub fn change_count(&self) -> usize {
        self.changed().count()
    }

    pub fn outcome(&self, entity: &EntityRef) -> Option<&ReconcileOutcome> {
        self.outcomes.iter().find(|o| &o.binding.entity == entity)
    }

    pub fn is_noop(&self) -> bool {
        self.outcomes.iter().all(|o| o.drift == Drift::Unchanged)
    }
}

/// Run a pass using the workspace's own space tree and directory
pub fn run<S>(workspace: &Workspace, store: &S, mode: PassMode) -> Result<PassReport>
where
    S: BindingStore + ?Sized,
{
    let spaces = workspace.space_tree();
    let directory = workspace.directory();
    run_with(workspace, &directory, &spaces, store, mode)
}

/// Run a pass against an explicit directory and space tree
pub fn run_with<D, S>(
    workspace: &Workspace,
    directory: &D,
    spaces: &SpaceTree,
    store: &S,
    mode: PassMode,
) -> Result<PassReport>
where
    D: IntegrationDirectory + ?Sized,
    S: BindingStore + ?Sized,
{
    let reconciler = Reconciler::new(directory, spaces);
    let planned = workspace.declarations(reconciler.resolver())?;

    let mut report = PassReport::default();
    for entity in &planned {
        let outcome = match mode {
            PassMode::Plan => {
                reconciler.plan(&entity.entity, &entity.declaration, &entity.space, store)?
            }
            PassMode::Apply => {
                reconciler.reconcile(&entity.entity, &entity.declaration, &entity.space, store)?
            }
        };
        report.outcomes.push(outcome);
    }

    info!(
        mode = ?mode,
        entities = report.outcomes.len(),
        changed = report.change_count(),
        "pass complete"
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::MemoryStore;

    const YAML: &str = r#"
spaces:
  - id: team-a
integrations:
  - { id: gl-root, kind: gitlab, space: root, default: true }
  - { id: gl-team, kind: gitlab, space: team-a, default: true }
stacks:
  - id: api
    space: team-a
    gitlab: { namespace: infra }
modules:
  - id: vpc
    gitlab: { namespace: infra, id: "" }
"#;

    #[test]
    fn apply_then_reapply_is_noop() {
        let ws = Workspace::from_yaml(YAML).unwrap();
        let store = MemoryStore::new();

        let first = run(&ws, &store, PassMode::Apply).unwrap();
        assert_eq!(first.change_count(), 2);
        assert_eq!(store.serial(), 2);
        assert_eq!(first.outcome(&EntityRef::stack("api")).unwrap().binding.resolved_id, "gl-team");
        assert_eq!(
            first.outcome(&EntityRef::module("vpc")).unwrap().binding.resolved_id,
            "gl-root"
        );

        let second = run(&ws, &store, PassMode::Apply).unwrap();
        assert!(second.is_noop());
        assert_eq!(store.serial(), 2);
    }

    #[test]
    fn plan_reports_without_writing() {
        let ws = Workspace::from_yaml(YAML).unwrap();
        let store = MemoryStore::new();

        let report = run(&ws, &store, PassMode::Plan).unwrap();
        assert_eq!(report.change_count(), 2);
        assert!(store.is_empty());
    }

    #[test]
    fn invalid_workspace_aborts_before_any_write() {
        let extra = "  - id: broken\n    gitlab: { namespace: infra }\n    gitlab_extra: 1\n";
        let yaml = format!("{YAML}{extra}");
        assert!(Workspace::from_yaml(&yaml).is_err());

        let yaml = "stacks:\n  - id: api\n    space: nowhere\n    gitlab: { namespace: infra }\n";
        let ws = Workspace::from_yaml(yaml).unwrap();
        let store = MemoryStore::new();
        assert!(run(&ws, &store, PassMode::Apply).is_err());
        assert_eq!(store.serial(), 0);
    }
}
