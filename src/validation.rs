//! Input validation for request payloads.
//!
//! Collects every problem in one pass so staff see all of them at once.

use std::fmt;

use rust_decimal::Decimal;

/// A single field-level validation failure.
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
    pub suggestion: Option<String>,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            suggestion: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn empty_field(field: &str, label: &str) -> Self {
        Self::new(field, format!("{} must not be empty", label))
            .with_suggestion(format!("Please provide a value for {}", label.to_lowercase()))
    }

    pub fn missing_amount(field: &str) -> Self {
        Self::new(field, "Amount is required before forwarding to accounting")
            .with_suggestion("Quote the document fee, e.g. 150.00")
    }

    pub fn non_positive_amount(field: &str, value: &Decimal) -> Self {
        Self::new(field, format!("Amount must be greater than zero (got {})", value))
            .with_suggestion("Quote the document fee, e.g. 150.00")
    }

    pub fn too_long(field: &str, label: &str, max: usize) -> Self {
        Self::new(field, format!("{} must be at most {} characters", label, max))
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.field, self.message)?;
        if let Some(ref suggestion) = self.suggestion {
            write!(f, ". {}", suggestion)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// Collection of validation errors with formatted output.
#[derive(Debug, Default, Clone)]
pub struct ValidationErrors {
    errors: Vec<ValidationError>,
}

impl ValidationErrors {
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    pub fn add(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Human readable summary listing every failure.
    pub fn to_message(&self) -> String {
        if self.errors.is_empty() {
            return String::new();
        }

        let mut parts = vec![format!(
            "Validation failed: {} problem(s) found",
            self.errors.len()
        )];
        for (i, error) in self.errors.iter().enumerate() {
            parts.push(format!("{}. {}", i + 1, error));
        }
        parts.join("\n")
    }

    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_message())
    }
}

// ============================================================================
// Validation functions
// ============================================================================

pub fn validate_required(value: &str, field: &str, label: &str, errors: &mut ValidationErrors) {
    if value.trim().is_empty() {
        errors.add(ValidationError::empty_field(field, label));
    }
}

pub fn validate_max_len(
    value: &str,
    field: &str,
    label: &str,
    max: usize,
    errors: &mut ValidationErrors,
) {
    if value.chars().count() > max {
        errors.add(ValidationError::too_long(field, label, max));
    }
}

/// Amount must be present and strictly positive.
pub fn validate_amount(value: Option<&Decimal>, field: &str, errors: &mut ValidationErrors) {
    match value {
        None => errors.add(ValidationError::missing_amount(field)),
        Some(amount) if *amount <= Decimal::ZERO => {
            errors.add(ValidationError::non_positive_amount(field, amount))
        }
        Some(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_validate_required_empty() {
        let mut errors = ValidationErrors::new();
        validate_required("   ", "purpose", "Purpose", &mut errors);
        assert_eq!(errors.len(), 1);
        assert!(errors.to_message().contains("Purpose must not be empty"));
    }

    #[test]
    fn test_validate_amount_rules() {
        let mut errors = ValidationErrors::new();
        validate_amount(None, "amount", &mut errors);
        validate_amount(Some(&Decimal::ZERO), "amount", &mut errors);
        validate_amount(Some(&Decimal::from_str("-5").unwrap()), "amount", &mut errors);
        validate_amount(Some(&Decimal::from_str("150.00").unwrap()), "amount", &mut errors);
        assert_eq!(errors.len(), 3);
        assert!(errors.to_message().contains("3 problem(s)"));
    }

    #[test]
    fn test_into_result() {
        assert!(ValidationErrors::new().into_result().is_ok());

        let mut errors = ValidationErrors::new();
        errors.add(ValidationError::empty_field("document_type", "Document type"));
        let err = errors.into_result().unwrap_err();
        assert!(err.to_string().contains("[document_type]"));
    }
}
