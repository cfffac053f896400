//! Boundary validation for classifier output

use thiserror::Error;

/// Errors found while validating raw classifier output
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Probability outside [0, 1] or not finite
    #[error("{label} probability {value} is out of range [0, 1]")]
    OutOfRange { label: String, value: f32 },

    /// Class label is blank
    #[error("Class label at index {0} is empty")]
    EmptyLabel(usize),

    /// Classifier returned nothing
    #[error("Classifier returned no classes")]
    NoClasses,
}

/// Validator for raw (label, probability) pairs
#[derive(Debug, Clone, Default)]
pub struct Validator;

impl Validator {
    /// Validate a single probability
    pub fn validate_probability(&self, label: &str, value: f32) -> Result<(), ValidationError> {
        if !value.is_finite() || !(0.0..=1.0).contains(&value) {
            Err(ValidationError::OutOfRange {
                label: label.to_string(),
                value,
            })
        } else {
            Ok(())
        }
    }

    /// Validate a label at a position in the classifier output
    pub fn validate_label(&self, index: usize, label: &str) -> Result<(), ValidationError> {
        if label.trim().is_empty() {
            Err(ValidationError::EmptyLabel(index))
        } else {
            Ok(())
        }
    }

    /// Validate a full classifier output, stopping at the first error
    pub fn validate(&self, pairs: &[(String, f32)]) -> Result<(), ValidationError> {
        if pairs.is_empty() {
            return Err(ValidationError::NoClasses);
        }
        for (index, (label, probability)) in pairs.iter().enumerate() {
            self.validate_label(index, label)?;
            self.validate_probability(label, *probability)?;
        }
        Ok(())
    }
}
