//! An ordered, id-keyed collection of requirements
//!
//! The [`RequirementSet`] knows nothing about where requirements come from. It
//! keeps them in declaration order and offers lookup by identifier.

use std::collections::HashMap;

use crate::domain::{Identifier, Requirement};

/// The set of known requirements, keyed by identifier.
///
/// Iteration follows the order in which each identifier was first inserted.
/// Inserting a requirement whose identifier is already present replaces the
/// earlier declaration in place (last write wins).
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RequirementSet {
    /// The requirements, stored contiguously.
    requirements: Vec<Requirement>,

    /// An index from identifier to position in `requirements`.
    index: HashMap<Identifier, usize>,
}

impl RequirementSet {
    /// Creates an empty set with room for `capacity` requirements.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            requirements: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
        }
    }

    /// Inserts a requirement.
    ///
    /// Returns the requirement it replaced, if one with the same identifier
    /// was already present.
    pub fn insert(&mut self, requirement: Requirement) -> Option<Requirement> {
        if let Some(&position) = self.index.get(requirement.id()) {
            return Some(std::mem::replace(
                &mut self.requirements[position],
                requirement,
            ));
        }

        self.index
            .insert(requirement.id().clone(), self.requirements.len());
        self.requirements.push(requirement);
        None
    }

    /// Retrieves a requirement by identifier.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Requirement> {
        self.index
            .get(id)
            .and_then(|&position| self.requirements.get(position))
    }

    /// Whether a requirement with this identifier exists.
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// The number of distinct requirements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.requirements.len()
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.requirements.is_empty()
    }

    /// Iterates over the requirements in first-declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Requirement> {
        self.requirements.iter()
    }
}

impl<'a> IntoIterator for &'a RequirementSet {
    type Item = &'a Requirement;
    type IntoIter = std::slice::Iter<'a, Requirement>;

    fn into_iter(self) -> Self::IntoIter {
        self.requirements.iter()
    }
}

impl FromIterator<Requirement> for RequirementSet {
    fn from_iter<I: IntoIterator<Item = Requirement>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let mut set = Self::with_capacity(iter.size_hint().0);
        for requirement in iter {
            set.insert(requirement);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RequirementCategory;

    fn requirement(id: &str, title: &str) -> Requirement {
        Requirement::new(
            Identifier::try_from(id).unwrap(),
            title,
            "",
            RequirementCategory::Software,
        )
    }

    #[test]
    fn preserves_insertion_order() {
        let set: RequirementSet = ["REQ-3", "REQ-1", "REQ-2"]
            .into_iter()
            .map(|id| requirement(id, "t"))
            .collect();

        let ids: Vec<_> = set.iter().map(|r| r.id().as_str()).collect();
        assert_eq!(ids, ["REQ-3", "REQ-1", "REQ-2"]);
    }

    #[test]
    fn duplicate_overwrites_in_place() {
        let mut set = RequirementSet::default();
        assert!(set.insert(requirement("REQ-1", "first")).is_none());
        set.insert(requirement("REQ-2", "other"));

        let replaced = set.insert(requirement("REQ-1", "second")).unwrap();
        assert_eq!(replaced.title(), "first");

        assert_eq!(set.len(), 2);
        assert_eq!(set.get("REQ-1").unwrap().title(), "second");
        let ids: Vec<_> = set.iter().map(|r| r.id().as_str()).collect();
        assert_eq!(ids, ["REQ-1", "REQ-2"]);
    }

    #[test]
    fn lookup_is_case_sensitive() {
        let set: RequirementSet = std::iter::once(requirement("REQ-1", "t")).collect();
        assert!(set.contains("REQ-1"));
        assert!(!set.contains("req-1"));
        assert!(set.get("REQ-9").is_none());
    }
}
