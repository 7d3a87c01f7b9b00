// File: src/curation.rs
use crate::config::CurationConfig;
use crate::core::types::MedicineRecord;
use serde::Serialize;
use std::collections::HashSet;
use tracing::debug;

const UNKNOWN_CATEGORY: &str = "Unknown";

/// What a curation pass changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CurationSummary {
    /// Terms whose spelling was replaced by a different canonical spelling.
    pub standardized_terms: usize,
    /// Terms trimmed, or dropped as blank or as a case-insensitive repeat.
    pub cleaned_terms: usize,
    pub trimmed_names: usize,
    pub merged_duplicates: usize,
    pub categories_added: usize,
    pub medicines_before: usize,
    pub medicines_after: usize,
}

impl CurationSummary {
    pub fn changed(&self) -> bool {
        self.standardized_terms > 0
            || self.cleaned_terms > 0
            || self.trimmed_names > 0
            || self.merged_duplicates > 0
            || self.categories_added > 0
    }
}

pub struct Curator<'a> {
    config: &'a CurationConfig,
}

impl<'a> Curator<'a> {
    pub fn new(config: &'a CurationConfig) -> Self {
        Self { config }
    }

    /// Normalises terms, merges duplicate medicines and fills in categories.
    pub fn curate(&self, medicines: Vec<MedicineRecord>) -> (Vec<MedicineRecord>, CurationSummary) {
        let mut summary = CurationSummary {
            medicines_before: medicines.len(),
            ..CurationSummary::default()
        };

        let mut medicines = medicines;
        for med in medicines.iter_mut() {
            let trimmed = med.name.trim();
            if trimmed.len() != med.name.len() {
                med.name = trimmed.to_string();
                summary.trimmed_names += 1;
            }
            summary.standardized_terms += self.standardize(&mut med.uses);
            summary.cleaned_terms += clean_terms(&mut med.uses);
            summary.cleaned_terms += clean_terms(&mut med.components);
        }

        let mut merged = merge_duplicates(medicines);
        summary.merged_duplicates = summary.medicines_before - merged.len();

        for med in merged.iter_mut() {
            if has_category(med) || med.uses.is_empty() {
                continue;
            }
            if let Some(category) = self.infer_category(&med.uses) {
                debug!(name = %med.name, %category, "inferred category");
                med.category = Some(category);
                summary.categories_added += 1;
            }
        }

        summary.medicines_after = merged.len();
        (merged, summary)
    }

    /// Maps terms through the standardisation table.
    fn standardize(&self, terms: &mut Vec<String>) -> usize {
        let mut count = 0;
        for term in terms.iter_mut() {
            if let Some(canonical) = self.config.term_standardization.get(&term.trim().to_lowercase()) {
                if *term != *canonical {
                    *term = canonical.clone();
                    count += 1;
                }
            }
        }
        count
    }

    fn infer_category(&self, uses: &[String]) -> Option<String> {
        let text = uses.join(" ").to_lowercase();
        self.config
            .category_mappings
            .iter()
            .find(|(needle, _)| text.contains(&needle.to_lowercase()))
            .map(|(_, category)| category.clone())
    }
}

/// Trims, drops blanks and removes case-insensitive repeats.
///
/// Returns how many input terms were altered or dropped.
fn clean_terms(terms: &mut Vec<String>) -> usize {
    let mut seen = HashSet::new();
    let mut touched = 0;
    let cleaned: Vec<String> = terms
        .iter()
        .filter_map(|t| {
            let trimmed = t.trim();
            if trimmed.is_empty() || !seen.insert(trimmed.to_lowercase()) {
                touched += 1;
                return None;
            }
            if trimmed.len() != t.len() {
                touched += 1;
            }
            Some(trimmed.to_string())
        })
        .collect();
    *terms = cleaned;
    touched
}

fn has_category(med: &MedicineRecord) -> bool {
    med.category
        .as_deref()
        .is_some_and(|c| !c.trim().is_empty() && c != UNKNOWN_CATEGORY)
}

fn merge_duplicates(medicines: Vec<MedicineRecord>) -> Vec<MedicineRecord> {
    let mut unique: Vec<MedicineRecord> = Vec::with_capacity(medicines.len());
    for med in medicines {
        let key = med.key();
        let Some(pos) = unique.iter().position(|m| m.key() == key) else {
            unique.push(med);
            continue;
        };
        let existing = &mut unique[pos];

        let take_category = !has_category(existing) && has_category(&med);
        let take_description = existing.description().is_none() && med.description().is_some();

        existing.uses.extend(med.uses);
        clean_terms(&mut existing.uses);
        existing.components.extend(med.components);
        clean_terms(&mut existing.components);

        if take_category {
            existing.category = med.category;
        }
        if take_description {
            existing.description = med.description;
        }
    }
    unique
}
