//! Typed classifier output

use crate::validator::{ValidationError, Validator};
use serde::{Deserialize, Serialize};

/// One class label with the probability the classifier assigned it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassProbability {
    pub label: String,
    pub probability: f32,
}

/// Validated classifier output for a single sampling tick
///
/// Entries keep the classifier's order. The sequence is never empty and every
/// probability is finite and within [0, 1].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Classification {
    classes: Vec<ClassProbability>,
}

impl Classification {
    /// Validate raw classifier output and wrap it
    pub fn new<L: Into<String>>(pairs: Vec<(L, f32)>) -> Result<Self, ValidationError> {
        let pairs: Vec<(String, f32)> = pairs.into_iter().map(|(l, p)| (l.into(), p)).collect();
        Validator.validate(&pairs)?;

        Ok(Self {
            classes: pairs
                .into_iter()
                .map(|(label, probability)| ClassProbability { label, probability })
                .collect(),
        })
    }

    /// Probability of the first class whose label contains `name`, ignoring case.
    /// Returns 0.0 when no class matches.
    pub fn probability_for(&self, name: &str) -> f32 {
        let needle = name.to_lowercase();
        self.classes
            .iter()
            .find(|c| c.label.to_lowercase().contains(&needle))
            .map(|c| c.probability)
            .unwrap_or(0.0)
    }

    /// Index of the most probable class (first one wins on ties)
    pub fn top_index(&self) -> usize {
        let mut best = 0;
        for (i, class) in self.classes.iter().enumerate().skip(1) {
            if class.probability > self.classes[best].probability {
                best = i;
            }
        }
        best
    }

    /// Most probable class, as highlighted
    pub fn top(&self) -> &ClassProbability {
        &self.classes[self.top_index()]
    }

    /// Most probable class for scoring (last one wins on ties)
    pub fn top_scoring(&self) -> &ClassProbability {
        self.classes
            .iter()
            .reduce(|best, class| {
                if best.probability > class.probability {
                    best
                } else {
                    class
                }
            })
            .unwrap_or(&self.classes[0])
    }

    /// All classes in classifier order
    pub fn classes(&self) -> &[ClassProbability] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn sample() -> Classification {
        Classification::new(vec![
            ("Focused", 0.10),
            ("Leaning", 0.05),
            ("Leaning on Hand", 0.75),
            ("Looking Down", 0.05),
            ("Raise Hand", 0.05),
        ])
        .unwrap()
    }

    #[test]
    fn test_probability_lookup_is_case_insensitive() {
        let c = sample();
        assert_eq!(c.probability_for("leaning on hand"), 0.75);
        assert_eq!(c.probability_for("LOOKING DOWN"), 0.05);
    }

    #[test]
    fn test_absent_label_is_zero() {
        assert_eq!(sample().probability_for("looking away"), 0.0);
    }

    #[test]
    fn test_lookup_takes_first_substring_match() {
        // "leaning" also matches "Leaning on Hand", but "Leaning" comes first
        assert_eq!(sample().probability_for("leaning"), 0.05);
    }

    #[test]
    fn test_top_class() {
        let c = sample();
        assert_eq!(c.top_index(), 2);
        assert_eq!(c.top().label, "Leaning on Hand");
    }

    #[test]
    fn test_top_class_tie_keeps_first() {
        let c = Classification::new(vec![("Default", 0.5), ("Focused", 0.5)]).unwrap();
        assert_eq!(c.top().label, "Default");
    }

    #[test]
    fn test_scoring_top_tie_keeps_last() {
        let c = Classification::new(vec![
            ("Looking Away", 0.5),
            ("Focused", 0.5),
            ("Leaning", 0.0),
        ])
        .unwrap();
        assert_eq!(c.top_scoring().label, "Focused");
        assert_eq!(c.top().label, "Looking Away");
        assert_eq!(sample().top_scoring().label, "Leaning on Hand");
    }

    #[test]
    fn test_rejects_invalid_output() {
        assert!(Classification::new(Vec::<(String, f32)>::new()).is_err());
        assert!(Classification::new(vec![("Focused", 1.5)]).is_err());
    }

    proptest! {
        #[test]
        fn lookup_returns_exact_probability(p in 0.0f32..=1.0, upper in any::<bool>()) {
            let label = if upper { "LOOKING AWAY" } else { "looking away" };
            let c = Classification::new(vec![("Focused", 0.0), (label, p)]).unwrap();
            prop_assert_eq!(c.probability_for("Looking Away"), p);
        }
    }
}
