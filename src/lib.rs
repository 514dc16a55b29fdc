//! vcsbind - VCS integration binding resolution for stacks and modules

pub mod config;
pub mod declaration;
pub mod directory;
pub mod error;
pub mod lookup;
pub mod pass;
pub mod provider;
pub mod reconciler;
pub mod resolver;
pub mod space;
pub mod state;

pub use config::Workspace;
pub use declaration::{EntityKind, EntityRef, ProviderDeclaration};
pub use directory::{IntegrationDirectory, IntegrationRecord, MemoryDirectory};
pub use error::{FixSuggestion, Result, VcsError};
pub use lookup::IntegrationLookup;
pub use pass::{PassMode, PassReport};
pub use provider::{BlockFields, ProviderBlock, ProviderKind};
pub use reconciler::{Binding, Drift, IdSource, ReconcileOutcome, Reconciler};
pub use resolver::DefaultResolver;
pub use space::{SpaceTree, ROOT_SPACE};
pub use state::{BindingStore, MemoryStore, StateFile, StoredBinding};
