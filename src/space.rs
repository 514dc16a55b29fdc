//! Space tree and ancestor chains
//!
//! Every space except `root` has exactly one parent. Defaults registered
//! at an ancestor are visible from all of its descendants.

use std::collections::{HashMap, HashSet};

use crate::error::{Result, VcsError};

/// Id of the top of every space tree
pub const ROOT_SPACE: &str = "root";

/// Space id → parent id
#[derive(Debug, Clone)]
pub struct SpaceTree {
    parents: HashMap<String, Option<String>>,
}

impl Default for SpaceTree {
    fn default() -> Self {
        Self::new()
    }
}

impl SpaceTree {
    /// Tree containing only `root`
    pub fn new() -> Self {
        let mut parents = HashMap::new();
        parents.insert(ROOT_SPACE.to_string(), None);
        Self { parents }
    }

    /// Add a space. A missing parent means `root`; `root` itself never has one.
    pub fn insert(&mut self, id: impl Into<String>, parent: Option<String>) {
        let id = id.into();
        let parent = if id == ROOT_SPACE {
            None
        } else {
            Some(parent.unwrap_or_else(|| ROOT_SPACE.to_string()))
        };
        self.parents.insert(id, parent);
    }

    /// Builder form of [`SpaceTree::insert`]
    pub fn with_space(mut self, id: impl Into<String>, parent: impl Into<String>) -> Self {
        self.insert(id, Some(parent.into()));
        self
    }

    pub fn contains(&self, id: &str) -> bool {
        self.parents.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.parents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }

    /// Ordered chain from `space` itself up to `root`
    pub fn ancestry(&self, space: &str) -> Result<Vec<&str>> {
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        let mut current = space;

        loop {
            let (id, parent) = self
                .parents
                .get_key_value(current)
                .ok_or_else(|| VcsError::UnknownSpace { space: current.to_string() })?;

            if !seen.insert(id.as_str()) {
                return Err(VcsError::SpaceCycle { space: space.to_string() });
            }
            chain.push(id.as_str());

            match parent {
                Some(parent) => current = parent.as_str(),
                None => return Ok(chain),
            }
        }
    }

    /// Check that every space reaches `root` without cycles
    pub fn validate(&self) -> Result<()> {
        let mut ids: Vec<&String> = self.parents.keys().collect();
        ids.sort();
        for id in ids {
            self.ancestry(id)?;
        }
        Ok(())
    }
}
