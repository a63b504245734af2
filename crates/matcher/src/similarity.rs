/// Cosine similarity of two equal-length vectors.
///
/// Returns 0.0 when either vector has zero norm. Callers check lengths first.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let mut dot = 0f32;
    let mut norm_a = 0f32;
    let mut norm_b = 0f32;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b).sqrt()
}

/// Index and value of the maximum score. The earliest index wins ties and
/// NaN never beats anything.
pub fn argmax(scores: &[f32]) -> Option<(usize, f32)> {
    let (first, rest) = scores.split_first()?;
    let mut best = (0, *first);
    for (offset, &score) in rest.iter().enumerate() {
        if score > best.1 || (best.1.is_nan() && !score.is_nan()) {
            best = (offset + 1, score);
        }
    }
    Some(best)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_vectors_score_one() {
        let v = [0.3, -0.2, 0.9];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn orthogonal_and_opposite() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[-2.0, 0.0]), -1.0);
    }

    #[test]
    fn exact_half_is_representable() {
        assert_eq!(cosine_similarity(&[1.0, 1.0, 0.0, 0.0], &[1.0, 0.0, 1.0, 0.0]), 0.5);
    }

    #[test]
    fn scale_does_not_matter() {
        let a = cosine_similarity(&[1.0, 2.0], &[2.0, 1.0]);
        let b = cosine_similarity(&[10.0, 20.0], &[0.2, 0.1]);
        assert!((a - b).abs() < 1e-6);
    }

    #[test]
    fn zero_vector_scores_zero() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), 0.0);
    }

    #[test]
    fn argmax_prefers_first_of_ties() {
        assert_eq!(argmax(&[0.2, 0.9, 0.9, 0.1]), Some((1, 0.9)));
        assert_eq!(argmax(&[0.7]), Some((0, 0.7)));
        assert_eq!(argmax(&[]), None);
    }

    #[test]
    fn argmax_skips_nan() {
        assert_eq!(argmax(&[f32::NAN, 0.1, f32::NAN]), Some((1, 0.1)));
        let (index, score) = argmax(&[f32::NAN]).unwrap();
        assert_eq!(index, 0);
        assert!(score.is_nan());
    }
}
