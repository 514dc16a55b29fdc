//! Error types with fix suggestions
//!
//! Error code ranges:
//! - VCS-010-019: Declaration errors
//! - VCS-020-029: Space errors
//! - VCS-030-039: Directory errors
//! - VCS-040-049: Resolution errors
//! - VCS-090-099: IO / parse errors

use thiserror::Error;

use crate::provider::ProviderKind;

pub type Result<T> = std::result::Result<T, VcsError>;

/// Trait for errors that provide fix suggestions
pub trait FixSuggestion {
    fn fix_suggestion(&self) -> Option<&str>;
}

#[derive(Error, Debug)]
pub enum VcsError {
    // ─────────────────────────────────────────────────────────────
    // Declaration errors (VCS-010 to VCS-019)
    // ─────────────────────────────────────────────────────────────
    #[error("[VCS-010] Invalid declaration for '{entity}': {reason}")]
    InvalidDeclaration { entity: String, reason: String },

    #[error("[VCS-011] '{entity}' declares more than one provider block: {}", .kinds.join(", "))]
    MultipleProviders { entity: String, kinds: Vec<String> },

    #[error("[VCS-012] '{entity}' declares no provider block")]
    MissingProvider { entity: String },

    #[error("[VCS-013] '{entity}': {kind} block is missing its '{field}'")]
    MissingDiscriminator {
        entity: String,
        kind: ProviderKind,
        field: &'static str,
    },

    #[error("[VCS-014] '{entity}' references unknown lookup '{lookup}'")]
    UnknownLookup { entity: String, lookup: String },

    // ─────────────────────────────────────────────────────────────
    // Space errors (VCS-020 to VCS-029)
    // ─────────────────────────────────────────────────────────────
    #[error("[VCS-020] Space '{space}' does not exist")]
    UnknownSpace { space: String },

    #[error("[VCS-021] Space '{space}' is part of a parent cycle")]
    SpaceCycle { space: String },

    // ─────────────────────────────────────────────────────────────
    // Directory errors (VCS-030 to VCS-039)
    // ─────────────────────────────────────────────────────────────
    #[error("[VCS-030] Integration directory unavailable: {reason}")]
    DirectoryUnavailable { reason: String },

    #[error("[VCS-031] No {kind} integration with id '{id}'")]
    IntegrationNotFound { kind: ProviderKind, id: String },

    #[error("[VCS-032] Default {kind} integration in space '{space}' has an empty id")]
    EmptyIntegrationId { kind: ProviderKind, space: String },

    // ─────────────────────────────────────────────────────────────
    // Resolution errors (VCS-040 to VCS-049)
    // ─────────────────────────────────────────────────────────────
    #[error("[VCS-040] No default {kind} integration is visible from space '{space}'")]
    NoDefaultIntegration { kind: ProviderKind, space: String },

    #[error("Resolving {kind} block (discriminator '{discriminator}'): {source}")]
    Resolution {
        kind: ProviderKind,
        discriminator: String,
        #[source]
        source: Box<VcsError>,
    },

    // ─────────────────────────────────────────────────────────────
    // IO / parse errors (VCS-090 to VCS-099)
    // ─────────────────────────────────────────────────────────────
    #[error("[VCS-090] YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("[VCS-091] State file error: {0}")]
    StateParse(#[from] serde_json::Error),

    #[error("[VCS-092] IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl VcsError {
    /// Innermost error, with declaration context stripped
    pub fn root_cause(&self) -> &VcsError {
        match self {
            VcsError::Resolution { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// Transient failures the caller may retry; everything else is a configuration gap
    pub fn is_retryable(&self) -> bool {
        matches!(self.root_cause(), VcsError::DirectoryUnavailable { .. })
    }
}

impl FixSuggestion for VcsError {
    fn fix_suggestion(&self) -> Option<&str> {
        match self {
            VcsError::InvalidDeclaration { .. } => {
                Some("Check the provider block against its lookup and kind")
            }
            VcsError::MultipleProviders { .. } => {
                Some("Keep exactly one provider block per stack or module")
            }
            VcsError::MissingProvider { .. } => {
                Some("Add exactly one provider block, e.g. gitlab: { namespace: ... }")
            }
            VcsError::MissingDiscriminator { .. } => {
                Some("Set 'project' (azure_devops) or 'namespace' (other providers)")
            }
            VcsError::UnknownLookup { .. } => {
                Some("Declare the lookup under 'lookups:' before using it in id_from")
            }
            VcsError::UnknownSpace { .. } => {
                Some("Declare the space under 'spaces:' or fix the space reference")
            }
            VcsError::SpaceCycle { .. } => Some("Space parents must form a tree rooted at 'root'"),
            VcsError::DirectoryUnavailable { .. } => {
                Some("Retry once the integration directory is reachable")
            }
            VcsError::IntegrationNotFound { .. } => Some("Check the integration id and kind"),
            VcsError::EmptyIntegrationId { .. } => {
                Some("Fix the integration record: defaults need an id")
            }
            VcsError::NoDefaultIntegration { .. } => {
                Some("Pin an id, or mark an integration as default in this space or an ancestor")
            }
            VcsError::Resolution { source, .. } => source.fix_suggestion(),
            VcsError::YamlParse(_) => Some("Check YAML syntax: indentation and quoting"),
            VcsError::StateParse(_) => {
                Some("The state file is corrupt; restore it or remove it to start fresh")
            }
            VcsError::Io(_) => Some("Check file path and permissions"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_cause_unwraps_resolution_context() {
        let err = VcsError::Resolution {
            kind: ProviderKind::GitLab,
            discriminator: "infra".to_string(),
            source: Box::new(VcsError::NoDefaultIntegration {
                kind: ProviderKind::GitLab,
                space: "root".to_string(),
            }),
        };

        assert!(matches!(err.root_cause(), VcsError::NoDefaultIntegration { .. }));
        assert!(err.to_string().contains("infra"));
        assert!(err.to_string().contains("VCS-040"));
    }

    #[test]
    fn only_directory_outages_are_retryable() {
        let outage = VcsError::DirectoryUnavailable { reason: "timeout".to_string() };
        let missing = VcsError::NoDefaultIntegration {
            kind: ProviderKind::AzureDevOps,
            space: "root".to_string(),
        };

        assert!(outage.is_retryable());
        assert!(!missing.is_retryable());
    }

    #[test]
    fn wrapped_error_keeps_inner_suggestion() {
        let err = VcsError::Resolution {
            kind: ProviderKind::GitLab,
            discriminator: "infra".to_string(),
            source: Box::new(VcsError::DirectoryUnavailable { reason: "503".to_string() }),
        };

        assert_eq!(
            err.fix_suggestion(),
            Some("Retry once the integration directory is reachable")
        );
        assert!(err.is_retryable());
    }
}
