use crate::rag::RagError;

pub fn cosine_similarity(query: &[f32], candidate: &[f32]) -> Result<f32, RagError> {
    if query.is_empty() || candidate.is_empty() {
        return Err(RagError::EmptyVector);
    }
    if query.len() != candidate.len() {
        return Err(RagError::DimensionMismatch {
            expected: candidate.len(),
            actual: query.len(),
        });
    }

    let dot: f32 = query.iter().zip(candidate).map(|(q, c)| q * c).sum();
    let denom = l2_norm(query) * l2_norm(candidate);
    if denom <= f32::EPSILON {
        return Ok(0.0);
    }

    Ok(dot / denom)
}

/// Scores every candidate against `query`, best first. Equal scores keep
/// their candidate order.
pub fn rank_descending_by_cosine(
    query: &[f32],
    candidates: &[&[f32]],
) -> Result<Vec<(usize, f32)>, RagError> {
    let mut scores = Vec::with_capacity(candidates.len());
    for (idx, candidate) in candidates.iter().enumerate() {
        let score = cosine_similarity(query, candidate)?;
        scores.push((idx, score));
    }

    scores.sort_by(|left, right| rank_key(right.1).total_cmp(&rank_key(left.1)));
    Ok(scores)
}

// NaN scores from corrupt embeddings rank last.
fn rank_key(score: f32) -> f32 {
    if score.is_nan() {
        f32::NEG_INFINITY
    } else {
        score
    }
}

fn l2_norm(values: &[f32]) -> f32 {
    values.iter().map(|v| v * v).sum::<f32>().sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(left: f32, right: f32) -> bool {
        (left - right).abs() < 1e-5
    }

    #[test]
    fn cosine_is_one_for_identical_vectors() {
        let vec = vec![1.0, 2.0, 3.0, 4.0];
        let score = cosine_similarity(&vec, &vec).expect("cosine should work");
        assert!(approx_eq(score, 1.0));
    }

    #[test]
    fn cosine_is_zero_for_orthogonal_vectors() {
        let score = cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).expect("cosine should work");
        assert!(approx_eq(score, 0.0));
    }

    #[test]
    fn cosine_of_zero_vector_is_zero() {
        let score = cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]).expect("cosine should work");
        assert_eq!(score, 0.0);
    }

    #[test]
    fn cosine_rejects_mismatched_lengths() {
        let err = cosine_similarity(&[1.0, 0.0, 0.0], &[1.0, 0.0]).unwrap_err();
        assert!(matches!(
            err,
            RagError::DimensionMismatch {
                expected: 2,
                actual: 3
            }
        ));
    }

    #[test]
    fn ranking_returns_highest_similarity_first() {
        let query: Vec<f32> = vec![1.0, 0.0];
        let a: &[f32] = &[0.8, 0.2];
        let b: &[f32] = &[0.1, 0.9];
        let c: &[f32] = &[0.9, 0.0];
        let ranked = rank_descending_by_cosine(&query, &[a, b, c]).expect("ranking should work");

        assert_eq!(ranked.len(), 3);
        assert_eq!(ranked[0].0, 2);
        assert_eq!(ranked[2].0, 1);
    }

    #[test]
    fn ranking_keeps_candidate_order_for_ties() {
        let same: &[f32] = &[1.0, 1.0];
        let ranked = rank_descending_by_cosine(same, &[same, same, same]).expect("ranking");
        let order: Vec<usize> = ranked.into_iter().map(|(idx, _)| idx).collect();
        assert_eq!(order, vec![0, 1, 2]);
    }

    #[test]
    fn ranking_puts_non_finite_scores_last_without_panicking() {
        let query: Vec<f32> = vec![1.0, 0.0];
        let nan: &[f32] = &[f32::NAN, 1.0];
        let inf: &[f32] = &[f32::INFINITY, 1.0];
        let good: &[f32] = &[1.0, 0.1];
        let weak: &[f32] = &[0.1, 1.0];
        let ranked = rank_descending_by_cosine(&query, &[nan, weak, inf, good]).expect("ranking");
        let order: Vec<usize> = ranked.into_iter().map(|(idx, _)| idx).collect();

        assert_eq!(order[0], 3);
        assert_eq!(order[1], 1);
        assert!(order[2..].contains(&0) && order[2..].contains(&2));
    }
}
