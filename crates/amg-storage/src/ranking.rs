use amg_core::Memory;

/// Cosine similarity between two equal-length vectors.
#[must_use]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return -1.0;
    }
    dot / (norm_a * norm_b)
}

/// Deterministic default order: oldest first, `memory_id` as a tie-breaker.
/// Applied before any optional vector ranking so that identical state plus
/// an identical request always yields identical output order.
pub fn sort_deterministic(memories: &mut [Memory]) {
    memories.sort_by(|a, b| {
        a.created_at
            .cmp(&b.created_at)
            .then_with(|| a.memory_id.as_str().cmp(b.memory_id.as_str()))
    });
}

/// Sort by cosine similarity to `query_vector` descending.
/// Items with a missing or wrong-dimension embedding sink to the bottom via
/// a sentinel score of `-1.0`. Ties break by `created_at` descending, then
/// `memory_id` lexicographically.
pub fn rank_by_embedding(memories: &mut [Memory], query_vector: &[f32]) {
    memories.sort_by(|a, b| {
        let score_a = a
            .embedding
            .as_ref()
            .filter(|e| e.len() == query_vector.len())
            .map_or(-1.0, |e| cosine_similarity(e, query_vector));
        let score_b = b
            .embedding
            .as_ref()
            .filter(|e| e.len() == query_vector.len())
            .map_or(-1.0, |e| cosine_similarity(e, query_vector));
        score_b
            .partial_cmp(&score_a)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| b.created_at.cmp(&a.created_at))
            .then_with(|| a.memory_id.as_str().cmp(b.memory_id.as_str()))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_vectors_have_similarity_one() {
        let sim = cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]);
        assert!((sim - 1.0).abs() < 1e-6);
    }

    #[test]
    fn orthogonal_vectors_have_similarity_zero() {
        let sim = cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]);
        assert!(sim.abs() < 1e-6);
    }

    #[test]
    fn zero_vector_yields_sentinel() {
        let sim = cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]);
        assert!((sim - -1.0).abs() < 1e-6);
    }
}
