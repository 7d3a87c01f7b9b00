// File: src/core/features.rs
use crate::core::types::MedicineRecord;

/// Builds the text document a medicine contributes to the vectorizer.
///
/// Uses come first, then components, joined by single spaces, lower-cased with
/// all whitespace runs collapsed. Both lists feed one bag of terms, so phrase
/// windows may span the boundary between them.
pub fn build_feature_text(medicine: &MedicineRecord) -> String {
    medicine
        .uses
        .iter()
        .chain(&medicine.components)
        .flat_map(|term| term.split_whitespace())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}
