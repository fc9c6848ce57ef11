//! Similarity computation for the in-memory store.

use ordered_float::OrderedFloat;

use crate::error::{Result, VectorStoreError};
use crate::types::Metric;

fn check_dimensions(a: &[f32], b: &[f32]) -> Result<()> {
    if a.len() != b.len() {
        return Err(VectorStoreError::DimensionMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }
    Ok(())
}

/// Compute the cosine similarity between two vectors.
///
/// Returns a value between -1.0 and 1.0, where:
/// - 1.0 means identical direction
/// - 0.0 means orthogonal vectors
/// - -1.0 means opposite vectors
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32> {
    check_dimensions(a, b)?;

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let magnitude_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let magnitude_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if magnitude_a == 0.0 || magnitude_b == 0.0 {
        return Ok(0.0);
    }

    Ok(dot_product / (magnitude_a * magnitude_b))
}

/// Compute the euclidean distance between two vectors.
pub fn euclidean_distance(a: &[f32], b: &[f32]) -> Result<f32> {
    check_dimensions(a, b)?;

    let sum: f32 = a.iter().zip(b.iter()).map(|(x, y)| (x - y).powi(2)).sum();

    Ok(sum.sqrt())
}

/// Compute the dot product between two vectors.
pub fn dot_product(a: &[f32], b: &[f32]) -> Result<f32> {
    check_dimensions(a, b)?;

    Ok(a.iter().zip(b.iter()).map(|(x, y)| x * y).sum())
}

/// Score `candidate` against `query` under `metric`.
pub fn score(metric: Metric, query: &[f32], candidate: &[f32]) -> Result<f32> {
    match metric {
        Metric::Cosine => cosine_similarity(query, candidate),
        Metric::Euclidean => euclidean_distance(query, candidate),
        Metric::Dotproduct => dot_product(query, candidate),
    }
}

/// Rank candidates and keep the best `k` as `(id, score)`.
///
/// Best means highest score, except for euclidean where the smallest
/// distance wins. The sort is stable, so ties keep candidate order.
pub fn find_top_k<'a>(
    metric: Metric,
    query: &[f32],
    candidates: impl IntoIterator<Item = (&'a str, &'a [f32])>,
    k: usize,
) -> Result<Vec<(String, f32)>> {
    let mut scored: Vec<(OrderedFloat<f32>, &str, f32)> = Vec::new();

    for (id, values) in candidates {
        let raw = score(metric, query, values)?;
        let rank = match metric {
            Metric::Euclidean => -raw,
            Metric::Cosine | Metric::Dotproduct => raw,
        };
        scored.push((OrderedFloat(rank), id, raw));
    }

    // Sort by rank descending
    scored.sort_by(|a, b| b.0.cmp(&a.0));

    Ok(scored
        .into_iter()
        .take(k)
        .map(|(_, id, raw)| (id.to_string(), raw))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_cosine_similarity_identical() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![1.0, 0.0, 0.0];
        let sim = cosine_similarity(&a, &b).unwrap();
        assert!((sim - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_similarity_orthogonal() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![0.0, 1.0, 0.0];
        let sim = cosine_similarity(&a, &b).unwrap();
        assert!(sim.abs() < 1e-6);
    }

    #[test]
    fn test_cosine_similarity_zero_vector() {
        let sim = cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]).unwrap();
        assert_eq!(sim, 0.0);
    }

    #[test]
    fn test_dimension_mismatch() {
        let a = vec![1.0, 0.0];
        let b = vec![1.0, 0.0, 0.0];
        assert!(cosine_similarity(&a, &b).is_err());
        assert!(dot_product(&a, &b).is_err());
    }

    #[test]
    fn test_find_top_k_cosine() {
        let query = [1.0, 0.0, 0.0];
        let a = [1.0, 0.0, 0.0]; // similarity 1.0
        let b = [0.0, 1.0, 0.0]; // similarity 0.0
        let c = [0.7, 0.7, 0.0]; // similarity ~0.7
        let candidates = vec![("a", &a[..]), ("b", &b[..]), ("c", &c[..])];

        let results = find_top_k(Metric::Cosine, &query, candidates, 2).unwrap();
        let ids: Vec<&str> = results.iter().map(|(id, _)| id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
    }

    #[test]
    fn test_find_top_k_euclidean_prefers_smallest_distance() {
        let query = [0.0, 0.0];
        let near = [1.0, 0.0];
        let far = [3.0, 4.0];
        let candidates = vec![("far", &far[..]), ("near", &near[..])];

        let results = find_top_k(Metric::Euclidean, &query, candidates, 2).unwrap();
        assert_eq!(results[0], ("near".to_string(), 1.0));
        assert_eq!(results[1], ("far".to_string(), 5.0));
    }
}
