//! Distance to similarity conversion and the retention threshold.

/// `1 / (1 + max(d, 0))`: in `(0, 1]`, strictly decreasing in distance.
///
/// Non-finite distances map to `0.0` so they never pass a threshold.
pub fn similarity_from_distance(distance: f32) -> f32 {
    if !distance.is_finite() {
        return 0.0;
    }
    1.0 / (1.0 + distance.max(0.0))
}

/// Inclusive retention test: a candidate at exactly `threshold` is kept.
pub fn passes_threshold(similarity: f32, threshold: f32) -> bool {
    similarity >= threshold
}
