// File: src/stats.rs
use crate::core::types::MedicineRecord;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

/// Size and shape of a loaded store.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StoreStatistics {
    pub total_medicines: usize,
    pub total_uses: usize,
    pub total_components: usize,
    /// Distinct uses, compared case-insensitively.
    pub unique_uses: usize,
    pub unique_components: usize,
    pub avg_uses_per_medicine: f64,
    pub avg_components_per_medicine: f64,
    /// Category -> number of medicines; uncategorised records count under `N/A`.
    pub categories: BTreeMap<String, usize>,
}

impl StoreStatistics {
    pub fn from_records(medicines: &[MedicineRecord]) -> Self {
        let mut stats = Self {
            total_medicines: medicines.len(),
            ..Self::default()
        };
        let mut uses = HashSet::new();
        let mut components = HashSet::new();

        for med in medicines {
            stats.total_uses += med.uses.len();
            stats.total_components += med.components.len();
            uses.extend(med.uses.iter().map(|u| u.trim().to_lowercase()));
            components.extend(med.components.iter().map(|c| c.trim().to_lowercase()));
            *stats.categories.entry(med.category_or_placeholder().to_string()).or_insert(0) += 1;
        }

        stats.unique_uses = uses.len();
        stats.unique_components = components.len();
        if stats.total_medicines > 0 {
            let n = stats.total_medicines as f64;
            stats.avg_uses_per_medicine = stats.total_uses as f64 / n;
            stats.avg_components_per_medicine = stats.total_components as f64 / n;
        }
        stats
    }

    /// Categories, most populated first; equal counts stay alphabetical.
    pub fn categories_by_count(&self) -> Vec<(&str, usize)> {
        let mut ranked: Vec<(&str, usize)> = self.categories.iter().map(|(c, n)| (c.as_str(), *n)).collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1));
        ranked
    }
}
