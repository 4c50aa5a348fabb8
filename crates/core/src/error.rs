//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Raised while building invoice data: absent required fields, values of the
/// wrong shape, or arithmetic that cannot be represented. Infrastructure
/// concerns (templates, the compiler, the filesystem) belong elsewhere.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// One or more required fields were absent.
    #[error("missing required field(s): {}", .0.join(", "))]
    MissingFields(Vec<String>),

    /// A field was present but its value was rejected.
    #[error("invalid field `{field}`: {reason}")]
    InvalidField { field: String, reason: String },

    /// A domain invariant was violated.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),
}

impl DomainError {
    pub fn missing<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::MissingFields(fields.into_iter().map(Into::into).collect())
    }

    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }

    /// Names of the offending fields, when the error is tied to fields.
    pub fn fields(&self) -> Vec<&str> {
        match self {
            Self::MissingFields(fields) => fields.iter().map(String::as_str).collect(),
            Self::InvalidField { field, .. } => vec![field.as_str()],
            Self::InvariantViolation(_) => Vec::new(),
        }
    }

    /// Prefix every field name with `parent.` (used when validating nested values).
    pub fn nested(self, parent: &str) -> Self {
        match self {
            Self::MissingFields(fields) => Self::MissingFields(
                fields
                    .into_iter()
                    .map(|f| format!("{parent}.{f}"))
                    .collect(),
            ),
            Self::InvalidField { field, reason } => Self::InvalidField {
                field: format!("{parent}.{field}"),
                reason,
            },
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_are_listed_in_message() {
        let err = DomainError::missing(["reference", "issuer"]);
        assert_eq!(err.to_string(), "missing required field(s): reference, issuer");
        assert_eq!(err.fields(), vec!["reference", "issuer"]);
    }

    #[test]
    fn nested_prefixes_field_paths() {
        let err = DomainError::invalid("email", "missing `@`").nested("customer");
        assert_eq!(err.fields(), vec!["customer.email"]);

        let err = DomainError::invariant("overflow").nested("customer");
        assert!(err.fields().is_empty());
    }
}
