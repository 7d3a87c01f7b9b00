// File: src/core/similarity.rs
use crate::core::types::MedicineId;
use crate::core::vectorizer::SparseVector;

/// Cosine similarity of two rows, clamped to `[0, 1]`.
///
/// A zero vector is orthogonal to everything, including another zero vector.
pub fn cosine_similarity(a: &SparseVector, b: &SparseVector) -> f64 {
    let norm_a = a.norm();
    let norm_b = b.norm();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    (a.dot(b) / (norm_a * norm_b)).clamp(0.0, 1.0)
}

/// Scores every row against `matrix[query]` and returns the best `top_n`,
/// highest first. The query row itself is never part of the result.
///
/// Equal scores keep collection order.
pub fn rank_similar(matrix: &[SparseVector], query: MedicineId, top_n: usize) -> Vec<(MedicineId, f64)> {
    rank_similar_by(matrix, query, top_n, |_| false)
}

/// Like [`rank_similar`], additionally dropping every row for which `skip`
/// returns true before the result is cut to `top_n`.
pub fn rank_similar_by<F>(matrix: &[SparseVector], query: MedicineId, top_n: usize, skip: F) -> Vec<(MedicineId, f64)>
where
    F: Fn(MedicineId) -> bool,
{
    let Some(query_row) = matrix.get(query) else {
        return Vec::new();
    };

    let mut scored: Vec<(MedicineId, f64)> = matrix
        .iter()
        .enumerate()
        .filter(|&(id, _)| id != query && !skip(id))
        .map(|(id, row)| (id, cosine_similarity(query_row, row)))
        .collect();

    // Stable sort, so ties stay in collection order.
    scored.sort_by(|a, b| b.1.total_cmp(&a.1));
    scored.truncate(top_n);
    scored
}
