//! Turning raw engine scores into predictions.
//!
//! The engine returns unnormalized logits. They are flattened, checked
//! against the label count, reordered into [`LabelSet`] order, passed
//! through a max-shifted softmax and reduced to a single label by argmax.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::inference::RawScores;
use crate::labels::{LabelSet, OutputMapping};

/// Outcome of interpreting one score vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Index of the predicted label in the [`LabelSet`].
    pub label_index: usize,
    /// Predicted label.
    pub label: String,
    /// Probability of the predicted label, in `[0, 1]`.
    pub confidence: f64,
    /// Probability of every label, in [`LabelSet`] order.
    pub probabilities: Vec<f64>,
}

impl PredictionResult {
    /// Confidence as a percentage.
    #[must_use]
    pub fn confidence_percent(&self) -> f64 {
        self.confidence * 100.0
    }
}

/// Numerically stable softmax.
///
/// The maximum is subtracted before exponentiation so large logits cannot
/// overflow. Returns an empty vector for empty input.
#[must_use]
pub fn softmax(logits: &[f64]) -> Vec<f64> {
    let Some(max) = logits.iter().copied().reduce(f64::max) else {
        return Vec::new();
    };

    let exps: Vec<f64> = logits.iter().map(|&x| (x - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

/// Index of the largest value; the first one wins on ties.
#[must_use]
pub fn argmax(values: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &v) in values.iter().enumerate() {
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}

/// Interprets raw engine scores against a label set.
#[derive(Debug, Clone)]
pub struct ScoreInterpreter {
    labels: LabelSet,
    mapping: OutputMapping,
}

impl ScoreInterpreter {
    /// Interpreter for an engine whose outputs follow [`LabelSet`] order.
    #[must_use]
    pub fn new(labels: LabelSet) -> Self {
        let mapping = OutputMapping::identity(&labels);
        Self { labels, mapping }
    }

    /// Interpreter with an explicit engine-to-label mapping.
    pub fn with_mapping(labels: LabelSet, mapping: OutputMapping) -> Result<Self> {
        if mapping.len() != labels.len() {
            return Err(Error::LabelMismatch(format!(
                "output mapping covers {} outputs, label set has {}",
                mapping.len(),
                labels.len()
            )));
        }
        Ok(Self { labels, mapping })
    }

    /// The label set predictions refer to.
    #[must_use]
    pub fn labels(&self) -> &LabelSet {
        &self.labels
    }

    /// Flatten, validate and interpret one score vector.
    pub fn interpret(&self, raw: &RawScores) -> Result<PredictionResult> {
        let declared: usize = raw.shape.iter().product();
        if declared != raw.values.len() || raw.values.len() != self.labels.len() {
            return Err(Error::Shape {
                expected: self.labels.len(),
                actual: raw.values.len(),
                shape: raw.shape.clone(),
            });
        }

        if let Some(index) = raw.values.iter().position(|v| !v.is_finite()) {
            return Err(Error::InvalidScores { index });
        }

        let ordered = if self.mapping.is_identity() {
            raw.values.clone()
        } else {
            self.mapping.reorder(&raw.values)
        };
        let logits: Vec<f64> = ordered.into_iter().map(f64::from).collect();

        let probabilities = softmax(&logits);
        let label_index = argmax(&probabilities).ok_or_else(|| Error::Shape {
            expected: self.labels.len(),
            actual: 0,
            shape: raw.shape.clone(),
        })?;

        Ok(PredictionResult {
            label_index,
            label: self.labels[label_index].to_string(),
            confidence: probabilities[label_index],
            probabilities,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn interpreter(labels: &[&str]) -> ScoreInterpreter {
        ScoreInterpreter::new(LabelSet::new(labels.iter().copied()).unwrap())
    }

    #[test]
    fn test_softmax_sums_to_one() {
        for logits in [
            vec![1.0, 2.0, 3.0],
            vec![-5.0, 0.0, 5.0, 10.0],
            vec![1000.0, 1001.0, 999.0],
            vec![-1000.0, -1000.0],
            vec![0.0],
        ] {
            let probs = softmax(&logits);
            let sum: f64 = probs.iter().sum();
            assert!((sum - 1.0).abs() < 1e-6, "sum {sum} for {logits:?}");
            assert!(probs.iter().all(|&p| p >= 0.0 && p.is_finite()));
        }
    }

    #[test]
    fn test_softmax_large_logits_do_not_overflow() {
        let probs = softmax(&[1.0e4, 0.0]);
        assert!((probs[0] - 1.0).abs() < 1e-12);
        assert!(probs[1] >= 0.0);
    }

    #[test]
    fn test_argmax_first_index_wins_ties() {
        assert_eq!(argmax(&[0.2, 0.4, 0.4]), Some(1));
        assert_eq!(argmax(&[0.5, 0.5]), Some(0));
        assert_eq!(argmax(&[]), None);
    }

    #[test]
    fn test_interpret_tie_picks_lower_label() {
        let interp = interpreter(&["A", "B", "C"]);
        let pred = interp.interpret(&RawScores::flat(vec![0.0, 3.0, 3.0])).unwrap();
        assert_eq!(pred.label, "B");
        assert_eq!(pred.label_index, 1);
    }

    #[test]
    fn test_interpret_flattens_batch_axis() {
        let interp = interpreter(&["A", "B"]);
        let raw = RawScores::with_shape(vec![1, 2], vec![2.0, 0.0]);
        let pred = interp.interpret(&raw).unwrap();

        assert_eq!(pred.label, "A");
        let expected = 1.0 / (1.0 + (-2.0f64).exp());
        assert!((pred.confidence - expected).abs() < 1e-9);
        assert!((pred.confidence_percent() - expected * 100.0).abs() < 1e-7);
    }

    #[test]
    fn test_interpret_wrong_length_is_shape_error() {
        let interp = interpreter(&["A", "B", "C"]);
        let err = interp.interpret(&RawScores::with_shape(vec![1, 2], vec![1.0, 2.0])).unwrap_err();
        assert!(matches!(err, Error::Shape { expected: 3, actual: 2, .. }));
    }

    #[test]
    fn test_interpret_inconsistent_shape_is_shape_error() {
        let interp = interpreter(&["A", "B"]);
        let err = interp.interpret(&RawScores::with_shape(vec![2, 2], vec![1.0, 2.0])).unwrap_err();
        assert!(matches!(err, Error::Shape { .. }));
    }

    #[test]
    fn test_interpret_rejects_nan() {
        let interp = interpreter(&["A", "B"]);
        let err = interp.interpret(&RawScores::flat(vec![1.0, f32::NAN])).unwrap_err();
        assert!(matches!(err, Error::InvalidScores { index: 1 }));
    }

    #[test]
    fn test_interpret_reorders_engine_outputs() {
        let labels = LabelSet::new(["A", "B"]).unwrap();
        let engine = vec!["B".to_string(), "A".to_string()];
        let mapping = OutputMapping::from_engine_labels(&engine, &labels).unwrap();
        let interp = ScoreInterpreter::with_mapping(labels, mapping).unwrap();

        // Engine says "B" is 5.0, "A" is 1.0.
        let pred = interp.interpret(&RawScores::flat(vec![5.0, 1.0])).unwrap();
        assert_eq!(pred.label, "B");
        assert!(pred.probabilities[1] > pred.probabilities[0]);
    }
}
