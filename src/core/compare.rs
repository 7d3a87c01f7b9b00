// File: src/core/compare.rs
use crate::core::types::{Comparison, MedicineRecord};
use std::collections::HashSet;

/// Exact intersection of uses and components, in the order of `left`.
pub fn compare(left: &MedicineRecord, right: &MedicineRecord) -> Comparison {
    Comparison {
        shared_uses: intersect(&left.uses, &right.uses),
        shared_components: intersect(&left.components, &right.components),
    }
}

fn intersect(left: &[String], right: &[String]) -> Vec<String> {
    let right: HashSet<&str> = right.iter().map(String::as_str).collect();
    let mut seen = HashSet::new();
    left.iter()
        .filter(|t| right.contains(t.as_str()) && seen.insert(t.as_str()))
        .cloned()
        .collect()
}
