//! Type selection: decide which extracted types get a String method.

use indexmap::IndexMap;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::common::is_exported;
use crate::extract::{ResolvedConstant, TypeRegistry};
use crate::logging::log_unsatisfied;

/// Which types to generate for.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum InclusionFilter {
    /// Every exported type with constants.
    #[default]
    Exported,
    /// Exactly the requested types; the flag records whether constants were
    /// found for the name.
    Requested(IndexMap<String, bool>),
}

impl InclusionFilter {
    /// Builds a filter from requested names. No names means `Exported`.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let requested: IndexMap<String, bool> = names
            .into_iter()
            .map(|n| n.as_ref().trim().to_string())
            .filter(|n| !n.is_empty())
            .map(|n| (n, false))
            .collect();
        if requested.is_empty() {
            Self::Exported
        } else {
            Self::Requested(requested)
        }
    }

    /// Decides whether `type_name` is included, marking a request satisfied
    /// when the type has constants.
    fn admit(&mut self, type_name: &str, has_constants: bool) -> bool {
        match self {
            Self::Exported => is_exported(type_name),
            Self::Requested(requested) => match requested.get_mut(type_name) {
                Some(satisfied) => {
                    *satisfied |= has_constants;
                    true
                }
                None => false,
            },
        }
    }

    /// Requested names that matched no constants, in request order.
    pub fn unsatisfied(&self) -> Vec<&str> {
        match self {
            Self::Exported => Vec::new(),
            Self::Requested(requested) => requested
                .iter()
                .filter(|(_, satisfied)| !**satisfied)
                .map(|(name, _)| name.as_str())
                .collect(),
        }
    }
}

/// The filtered mapping handed to the generator.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Selection {
    /// Selected types, ordered by name.
    pub types: BTreeMap<String, Vec<ResolvedConstant>>,
    /// Requested names that matched nothing.
    pub unsatisfied: Vec<String>,
}

impl Selection {
    /// Constant names of a selected type, in declaration order.
    pub fn names(&self, type_name: &str) -> Vec<&str> {
        self.types
            .get(type_name)
            .map(|cs| cs.iter().map(|c| c.name.as_str()).collect())
            .unwrap_or_default()
    }

    /// Non-fatal diagnostics, one per unsatisfied request.
    pub fn diagnostics(&self) -> Vec<String> {
        self.unsatisfied
            .iter()
            .map(|name| format!("The type `{}` was specified but no constants were found", name))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// Filters the registry. Unsatisfied requests are logged and returned in the
/// selection; they never fail the run.
pub fn select_types(registry: &TypeRegistry, mut filter: InclusionFilter) -> Selection {
    let mut types = BTreeMap::new();
    for (type_name, constants) in registry.iter() {
        if filter.admit(type_name, !constants.is_empty()) {
            types.insert(type_name.to_string(), constants.to_vec());
        }
    }

    let unsatisfied: Vec<String> = filter.unsatisfied().into_iter().map(String::from).collect();
    for name in &unsatisfied {
        log_unsatisfied(name);
    }

    Selection { types, unsatisfied }
}
