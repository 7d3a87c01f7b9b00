// src/core/types.rs
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Position of a medicine within the loaded collection.
pub type MedicineId = usize;

/// Placeholder shown for a missing category.
pub const MISSING_CATEGORY: &str = "N/A";

/// A single medicine as stored in `medicines.json`.
///
/// `uses` and `components` are sets semantically; they are kept as vectors so
/// the order in the store is preserved for display and feature building.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MedicineRecord {
    pub name: String,
    pub uses: Vec<String>,
    pub components: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl MedicineRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            uses: Vec::new(),
            components: Vec::new(),
            category: None,
            description: None,
        }
    }

    pub fn with_uses<I, S>(mut self, uses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.uses = uses.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_components<I, S>(mut self, components: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.components = components.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Lower-cased, trimmed name used as the lookup key.
    pub fn key(&self) -> String {
        self.name.trim().to_lowercase()
    }

    pub fn category_or_placeholder(&self) -> &str {
        match self.category.as_deref() {
            Some(c) if !c.trim().is_empty() => c,
            _ => MISSING_CATEGORY,
        }
    }

    /// Non-empty description, if any.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref().filter(|d| !d.trim().is_empty())
    }

    /// Collapses exact duplicate terms, keeping the first occurrence.
    pub(crate) fn dedupe_terms(&mut self) {
        dedupe_in_order(&mut self.uses);
        dedupe_in_order(&mut self.components);
    }
}

fn dedupe_in_order(terms: &mut Vec<String>) {
    let mut seen = HashSet::new();
    terms.retain(|t| seen.insert(t.clone()));
}

/// Top-level layout of the JSON store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MedicineStore {
    pub medicines: Vec<MedicineRecord>,
}

/// One ranked candidate returned by the recommender.
#[derive(Debug, Clone)]
pub struct RankedMedicine<'a> {
    pub id: MedicineId,
    pub medicine: &'a MedicineRecord,
    pub score: f64,
    pub comparison: Comparison,
}

/// A query medicine together with its ranked neighbours.
#[derive(Debug, Clone)]
pub struct Recommendation<'a> {
    pub query: &'a MedicineRecord,
    pub results: Vec<RankedMedicine<'a>>,
}

/// Attribute overlap between two medicines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Comparison {
    pub shared_uses: Vec<String>,
    pub shared_components: Vec<String>,
}
