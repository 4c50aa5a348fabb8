//! Value object trait: equality by value, not identity.
//!
//! Value objects are domain objects that have **no identity** - they are defined entirely
//! by their attribute values. Two value objects with the same values are considered equal.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Marker trait for value objects.
///
/// Value objects are **immutable** and **compared by value**. An address, a
/// bank account or an email carry no identity of their own; an invoice that
/// holds them is what gets referenced.
///
/// The trait requires:
/// - **Clone**: value objects are copied freely (the renderer works on an
///   escaped copy, never on the caller's data)
/// - **PartialEq**: compared by attribute values
/// - **Debug**: helpful for logging and tests
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}

/// Email address.
///
/// The check is structural only: one `@`, a non-empty local part, a dotted
/// domain, no whitespace. Markup escaping keeps an accepted address accepted,
/// since escaping only inserts backslashes and letters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    pub fn parse(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into();
        let value = value.trim().to_string();

        if value.chars().any(char::is_whitespace) {
            return Err(DomainError::invalid("email", "must not contain whitespace"));
        }
        let Some((local, domain)) = value.split_once('@') else {
            return Err(DomainError::invalid("email", "missing `@`"));
        };
        if local.is_empty() {
            return Err(DomainError::invalid("email", "empty local part"));
        }
        if domain.contains('@') {
            return Err(DomainError::invalid("email", "more than one `@`"));
        }
        let labels: Vec<&str> = domain.split('.').collect();
        if labels.len() < 2 || labels.iter().any(|l| l.is_empty()) {
            return Err(DomainError::invalid("email", "domain must be dotted"));
        }

        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ValueObject for Email {}

impl core::fmt::Display for Email {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Email {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Email {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<Email> for String {
    fn from(value: Email) -> Self {
        value.0
    }
}
