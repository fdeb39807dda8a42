//! Password strength policy.
//!
//! The policy is a predicate object so the reset flow and signup share one
//! definition. [`StrengthPolicy`] is the default; anything implementing
//! [`PasswordPolicy`] can replace it.

use std::fmt;

use crate::errors::AuthError;

/// A rule a candidate password broke.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyViolation {
    Empty,
    TooShort(usize),
    TooLong(usize),
    MissingUppercase,
    MissingLowercase,
    MissingDigit,
    MissingSymbol,
}

impl fmt::Display for PolicyViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "password must not be empty"),
            Self::TooShort(min) => write!(f, "password must be at least {} characters", min),
            Self::TooLong(max) => write!(f, "password must be at most {} bytes", max),
            Self::MissingUppercase => write!(f, "password must contain an uppercase letter"),
            Self::MissingLowercase => write!(f, "password must contain a lowercase letter"),
            Self::MissingDigit => write!(f, "password must contain a digit"),
            Self::MissingSymbol => write!(f, "password must contain a symbol"),
        }
    }
}

impl From<PolicyViolation> for AuthError {
    fn from(violation: PolicyViolation) -> Self {
        AuthError::WeakPassword(violation.to_string())
    }
}

pub trait PasswordPolicy: Send + Sync {
    fn check(&self, candidate: &str) -> Result<(), PolicyViolation>;
}

/// Length bounds plus character-class diversity.
///
/// `max_length` is measured in bytes because bcrypt ignores input past 72
/// bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrengthPolicy {
    pub min_length: usize,
    pub max_length: usize,
    pub require_uppercase: bool,
    pub require_lowercase: bool,
    pub require_digit: bool,
    pub require_symbol: bool,
}

impl Default for StrengthPolicy {
    fn default() -> Self {
        Self {
            min_length: 8,
            max_length: 72,
            require_uppercase: true,
            require_lowercase: true,
            require_digit: true,
            require_symbol: true,
        }
    }
}

impl StrengthPolicy {
    pub fn with_lengths(min_length: usize, max_length: usize) -> Self {
        Self {
            min_length,
            max_length,
            ..Self::default()
        }
    }
}

impl PasswordPolicy for StrengthPolicy {
    fn check(&self, candidate: &str) -> Result<(), PolicyViolation> {
        if candidate.is_empty() {
            return Err(PolicyViolation::Empty);
        }
        if candidate.chars().count() < self.min_length {
            return Err(PolicyViolation::TooShort(self.min_length));
        }
        if candidate.len() > self.max_length {
            return Err(PolicyViolation::TooLong(self.max_length));
        }
        if self.require_uppercase && !candidate.chars().any(char::is_uppercase) {
            return Err(PolicyViolation::MissingUppercase);
        }
        if self.require_lowercase && !candidate.chars().any(char::is_lowercase) {
            return Err(PolicyViolation::MissingLowercase);
        }
        if self.require_digit && !candidate.chars().any(|c| c.is_ascii_digit()) {
            return Err(PolicyViolation::MissingDigit);
        }
        if self.require_symbol
            && !candidate
                .chars()
                .any(|c| !c.is_alphanumeric() && !c.is_whitespace())
        {
            return Err(PolicyViolation::MissingSymbol);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_strong_passwords() {
        let policy = StrengthPolicy::default();
        assert!(policy.check("Strong@Pass2").is_ok());
        assert!(policy.check("NewP@ssw0rd1").is_ok());
        assert!(policy.check("Old@Pass1").is_ok());
    }

    #[test]
    fn test_rejects_empty() {
        assert_eq!(
            StrengthPolicy::default().check(""),
            Err(PolicyViolation::Empty)
        );
    }

    #[test]
    fn test_rejects_short() {
        assert_eq!(
            StrengthPolicy::default().check("Weak"),
            Err(PolicyViolation::TooShort(8))
        );
    }

    #[test]
    fn test_rejects_overlong() {
        let candidate = format!("Aa1!{}", "x".repeat(80));
        assert_eq!(
            StrengthPolicy::default().check(&candidate),
            Err(PolicyViolation::TooLong(72))
        );
    }

    #[test]
    fn test_rejects_missing_classes() {
        let policy = StrengthPolicy::default();
        assert_eq!(
            policy.check("lowercase1!"),
            Err(PolicyViolation::MissingUppercase)
        );
        assert_eq!(
            policy.check("UPPERCASE1!"),
            Err(PolicyViolation::MissingLowercase)
        );
        assert_eq!(policy.check("NoDigits!!"), Err(PolicyViolation::MissingDigit));
        assert_eq!(
            policy.check("NoSymbols123"),
            Err(PolicyViolation::MissingSymbol)
        );
    }

    #[test]
    fn test_relaxed_policy() {
        let policy = StrengthPolicy {
            require_symbol: false,
            ..StrengthPolicy::with_lengths(12, 64)
        };
        assert!(policy.check("NoSymbols1234").is_ok());
        assert_eq!(policy.check("Short1abc"), Err(PolicyViolation::TooShort(12)));
    }

    #[test]
    fn test_violation_becomes_weak_password() {
        let error: AuthError = PolicyViolation::MissingDigit.into();
        assert_eq!(
            error,
            AuthError::WeakPassword("password must contain a digit".to_string())
        );
    }
}
