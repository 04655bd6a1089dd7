//! Turning raw model outputs into something a person can read:
//! softmax over logits, argmax, and top-k class decoding.

use crate::domain::answer::Probabilities;
use crate::domain::error::ScoreError;

/// `exp(x) / sum(exp(x))`, shifted by the max for numerical stability.
pub fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|&x| (x - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

/// Softmax into a validated probability vector.
/// Fails only when the logits contain NaN or infinities.
pub fn probabilities(logits: &[f32]) -> Result<Probabilities, ScoreError> {
    Probabilities::new(softmax(logits))
}

/// Index of the first maximum, `None` for an empty slice.
pub fn argmax(values: &[f32]) -> Option<usize> {
    values
        .iter()
        .enumerate()
        .fold(None, |best: Option<(usize, f32)>, (i, &v)| match best {
            Some((_, b)) if v <= b => best,
            _ => Some((i, v)),
        })
        .map(|(i, _)| i)
}

/// The `k` largest entries as `(index, value)`, highest first.
/// Equal values keep their original order.
pub fn top_k(values: &[f32], k: usize) -> Vec<(usize, f32)> {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| values[b].total_cmp(&values[a]));
    order.into_iter().take(k).map(|i| (i, values[i])).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_softmax_sums_to_one() {
        let p = softmax(&[1.0, 2.0, 3.0]);
        assert!((p.iter().sum::<f32>() - 1.0).abs() < 1e-6);
        assert!(p[2] > p[1] && p[1] > p[0]);
        assert!((p[0] - 0.090_030_57).abs() < 1e-6);
    }

    #[test]
    fn test_softmax_survives_large_logits() {
        let p = softmax(&[1000.0, 1000.0]);
        assert!((p[0] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_probabilities_reject_nan_logits() {
        assert!(probabilities(&[0.0, f32::NAN]).is_err());
        assert_eq!(probabilities(&[0.0, 0.0]).unwrap().as_slice(), &[0.5, 0.5]);
    }

    #[test]
    fn test_argmax_takes_first_maximum() {
        assert_eq!(argmax(&[0.1, 0.7, 0.7, 0.2]), Some(1));
        assert_eq!(argmax(&[]), None);
    }

    #[test]
    fn test_top_k_orders_and_truncates() {
        let top = top_k(&[0.1, 0.4, 0.3, 0.4], 3);
        assert_eq!(top.iter().map(|(i, _)| *i).collect::<Vec<_>>(), vec![1, 3, 2]);
        assert_eq!(top_k(&[0.5], 10).len(), 1);
    }
}
