use crate::index::TermWeights;

/// Cosine similarity of two sparse weight maps.
///
/// Terms missing from either map count as 0. Returns exactly 0.0 when either
/// side has zero norm. Signed weights can push the result outside [-1, 1];
/// it is not clamped.
pub fn cosine_similarity(a: &TermWeights, b: &TermWeights) -> f64 {
    let mut dot = 0.0;
    let mut norm_a = 0.0;
    for (term, w) in a {
        if let Some(other) = b.get(term) {
            dot += w * other;
        }
        norm_a += w * w;
    }
    let norm_b: f64 = b.values().map(|w| w * w).sum();

    let norm_a = norm_a.sqrt();
    let norm_b = norm_b.sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}
