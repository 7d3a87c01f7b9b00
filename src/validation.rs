// File: src/validation.rs
//! Data quality report over the raw store.
//!
//! Works on untyped JSON so records the recommender would refuse to load are
//! still counted and described.

use crate::persistence::load_raw;
use crate::error::Result;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

pub const REQUIRED_FIELDS: [&str; 3] = ["name", "uses", "components"];

/// Issues counted against each record when scoring.
const ISSUES_PER_RECORD: f64 = 5.0;

#[derive(Debug, Clone, Default, Serialize)]
pub struct RequiredFieldStats {
    pub total: usize,
    pub complete: usize,
    /// Field -> indices of records without it.
    pub missing_fields: BTreeMap<String, Vec<usize>>,
    /// Field -> indices of records where it is present but empty.
    pub empty_fields: BTreeMap<String, Vec<usize>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DuplicateGroup {
    pub name: String,
    pub count: usize,
    pub indices: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmptyEntry {
    pub index: usize,
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Completeness {
    pub total: usize,
    pub has_uses: usize,
    pub has_components: usize,
    pub has_both: usize,
    pub has_neither: usize,
    pub empty_entries: Vec<EmptyEntry>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct QualityReport {
    pub total_medicines: usize,
    pub structure_valid: bool,
    pub structure_errors: Vec<String>,
    pub required_fields: RequiredFieldStats,
    pub duplicates: Vec<DuplicateGroup>,
    pub type_errors: Vec<String>,
    pub completeness: Completeness,
    /// 0 to 100.
    pub quality_score: f64,
}

pub fn validate_path(path: &Path) -> Result<QualityReport> {
    let raw = load_raw(path)?;
    Ok(validate_value(&raw))
}

pub fn validate_value(root: &Value) -> QualityReport {
    let Some(records) = root.get("medicines").and_then(Value::as_array) else {
        return QualityReport {
            structure_errors: vec!["Root 'medicines' field must be a list".to_string()],
            ..QualityReport::default()
        };
    };

    let structure_errors = structure_errors(records);
    let required_fields = required_field_stats(records);
    let duplicates = find_duplicates(records);
    let type_errors = type_errors(records);
    let completeness = completeness(records);

    let total = records.len();
    let missing: usize = required_fields.missing_fields.values().map(Vec::len).sum();
    let issues = structure_errors.len() + missing + duplicates.len() + type_errors.len() + completeness.has_neither;
    let quality_score = if total > 0 {
        (100.0 - issues as f64 / (total as f64 * ISSUES_PER_RECORD) * 100.0).max(0.0)
    } else {
        0.0
    };

    QualityReport {
        total_medicines: total,
        structure_valid: structure_errors.is_empty(),
        structure_errors,
        required_fields,
        duplicates,
        type_errors,
        completeness,
        quality_score,
    }
}

fn structure_errors(records: &[Value]) -> Vec<String> {
    let mut errors = Vec::new();
    for (idx, record) in records.iter().enumerate() {
        let Some(obj) = record.as_object() else {
            errors.push(format!("Medicine at index {idx} is not an object"));
            continue;
        };
        for field in REQUIRED_FIELDS {
            if !obj.contains_key(field) {
                errors.push(format!("Medicine at index {idx} missing required field: {field}"));
            }
        }
        if obj.get("name").is_some_and(|v| !v.is_string()) {
            errors.push(format!("Medicine at index {idx}: 'name' must be a string"));
        }
        for field in ["uses", "components"] {
            if obj.get(field).is_some_and(|v| !v.is_array()) {
                errors.push(format!("Medicine at index {idx}: '{field}' must be a list"));
            }
        }
        if obj.get("category").is_some_and(|v| !v.is_string()) {
            errors.push(format!("Medicine at index {idx}: 'category' must be a string"));
        }
    }
    errors
}

fn required_field_stats(records: &[Value]) -> RequiredFieldStats {
    let mut stats = RequiredFieldStats {
        total: records.len(),
        ..RequiredFieldStats::default()
    };
    for (idx, record) in records.iter().enumerate() {
        let mut complete = true;
        for field in REQUIRED_FIELDS {
            match record.get(field) {
                None => {
                    stats.missing_fields.entry(field.to_string()).or_default().push(idx);
                    complete = false;
                }
                Some(v) if is_empty_value(v) => {
                    stats.empty_fields.entry(field.to_string()).or_default().push(idx);
                    complete = false;
                }
                Some(_) => {}
            }
        }
        if complete {
            stats.complete += 1;
        }
    }
    stats
}

fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
    }
}

fn find_duplicates(records: &[Value]) -> Vec<DuplicateGroup> {
    // Keeps first-seen order of names.
    let mut groups: Vec<(String, Vec<usize>)> = Vec::new();
    for (idx, record) in records.iter().enumerate() {
        let name = record.get("name").and_then(Value::as_str).unwrap_or("").trim().to_lowercase();
        if name.is_empty() {
            continue;
        }
        match groups.iter_mut().find(|(n, _)| *n == name) {
            Some((_, indices)) => indices.push(idx),
            None => groups.push((name, vec![idx])),
        }
    }
    groups
        .into_iter()
        .filter(|(_, indices)| indices.len() > 1)
        .map(|(name, indices)| DuplicateGroup {
            name,
            count: indices.len(),
            indices,
        })
        .collect()
}

fn type_errors(records: &[Value]) -> Vec<String> {
    let mut errors = Vec::new();
    for (idx, record) in records.iter().enumerate() {
        if let Some(name) = record.get("name") {
            if !name.is_string() {
                errors.push(format!("Index {idx}: 'name' must be string, got {}", type_name(name)));
            }
        }
        for (field, item) in [("uses", "use"), ("components", "component")] {
            match record.get(field) {
                Some(Value::Array(items)) => {
                    for (item_idx, v) in items.iter().enumerate() {
                        if !v.is_string() {
                            errors.push(format!(
                                "Index {idx}, {item} {item_idx}: {item} must be string, got {}",
                                type_name(v)
                            ));
                        }
                    }
                }
                Some(other) => {
                    errors.push(format!("Index {idx}: '{field}' must be list, got {}", type_name(other)));
                }
                None => {}
            }
        }
        for field in ["category", "description"] {
            match record.get(field) {
                None | Some(Value::Null) | Some(Value::String(_)) => {}
                Some(other) => {
                    errors.push(format!("Index {idx}: '{field}' must be string, got {}", type_name(other)));
                }
            }
        }
    }
    errors
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}

fn completeness(records: &[Value]) -> Completeness {
    let mut stats = Completeness {
        total: records.len(),
        ..Completeness::default()
    };
    for (idx, record) in records.iter().enumerate() {
        let has_uses = record.get("uses").is_some_and(|v| !is_empty_value(v));
        let has_components = record.get("components").is_some_and(|v| !is_empty_value(v));
        if has_uses {
            stats.has_uses += 1;
        }
        if has_components {
            stats.has_components += 1;
        }
        if has_uses && has_components {
            stats.has_both += 1;
        }
        if !has_uses && !has_components {
            stats.has_neither += 1;
            stats.empty_entries.push(EmptyEntry {
                index: idx,
                name: record.get("name").and_then(Value::as_str).unwrap_or("Unknown").to_string(),
            });
        }
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_clean_store_scores_full_marks() {
        let root = json!({"medicines": [
            {"name": "Paracetamol", "uses": ["fever"], "components": ["acetaminophen"]},
            {"name": "Ibuprofen", "uses": ["pain"], "components": ["ibuprofen"], "category": "NSAID"}
        ]});
        let report = validate_value(&root);
        assert!(report.structure_valid);
        assert_eq!(report.required_fields.complete, 2);
        assert!(report.duplicates.is_empty());
        assert!(report.type_errors.is_empty());
        assert_eq!(report.completeness.has_both, 2);
        assert!((report.quality_score - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_missing_root_key() {
        let report = validate_value(&json!({"drugs": []}));
        assert!(!report.structure_valid);
        assert_eq!(report.total_medicines, 0);
        assert_eq!(report.quality_score, 0.0);
    }

    #[test]
    fn test_duplicates_are_case_insensitive() {
        let root = json!({"medicines": [
            {"name": "Aspirin", "uses": ["pain"], "components": ["asa"]},
            {"name": "Cetirizine", "uses": ["allergy"], "components": ["cetirizine"]},
            {"name": " aspirin ", "uses": ["fever"], "components": ["asa"]}
        ]});
        let report = validate_value(&root);
        assert_eq!(
            report.duplicates,
            vec![DuplicateGroup { name: "aspirin".into(), count: 2, indices: vec![0, 2] }]
        );
    }

    #[test]
    fn test_missing_and_empty_fields() {
        let root = json!({"medicines": [
            {"name": "NoComponents", "uses": ["pain"]},
            {"name": "Empty", "uses": [], "components": []}
        ]});
        let report = validate_value(&root);
        assert_eq!(report.required_fields.missing_fields["components"], vec![0]);
        assert_eq!(report.required_fields.empty_fields["uses"], vec![1]);
        assert_eq!(report.required_fields.complete, 0);
        assert_eq!(report.completeness.has_neither, 1);
        assert_eq!(report.completeness.empty_entries[0].name, "Empty");
        // 1 structure error, 1 missing field, 1 with neither: 3 issues over 10.
        assert!((report.quality_score - 70.0).abs() < 1e-9);
    }

    #[test]
    fn test_type_errors() {
        let root = json!({"medicines": [
            {"name": 42, "uses": ["pain", 3], "components": "zinc", "category": 1, "description": null}
        ]});
        let report = validate_value(&root);
        assert_eq!(report.type_errors.len(), 4);
        assert!(report.type_errors[0].contains("'name' must be string, got number"));
        assert!(!report.structure_valid);
    }

    #[test]
    fn test_score_never_negative() {
        let root = json!({"medicines": [1]});
        let report = validate_value(&root);
        assert!(report.quality_score >= 0.0);
    }
}
