use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

pub const MIN_PASSWORD_LENGTH: usize = 8;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

/// Result of checking a password against the sign-up rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordCheck {
    pub valid_length: bool,
    pub has_uppercase: bool,
    pub has_number: bool,
    pub has_special: bool,
}

impl PasswordCheck {
    /// Number of satisfied rules, 0 to 4
    pub fn strength(&self) -> u8 {
        [self.valid_length, self.has_uppercase, self.has_number, self.has_special]
            .iter()
            .filter(|ok| **ok)
            .count() as u8
    }

    pub fn is_acceptable(&self) -> bool {
        self.strength() == 4
    }

    /// Human-readable list of the rules still missing
    pub fn missing(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if !self.valid_length {
            missing.push("at least 8 characters");
        }
        if !self.has_uppercase {
            missing.push("an uppercase letter");
        }
        if !self.has_number {
            missing.push("a number");
        }
        if !self.has_special {
            missing.push("a special character");
        }
        missing
    }
}

pub fn validate_password(password: &str) -> PasswordCheck {
    PasswordCheck {
        valid_length: password.chars().count() >= MIN_PASSWORD_LENGTH,
        has_uppercase: password.chars().any(char::is_uppercase),
        has_number: password.chars().any(|c| c.is_ascii_digit()),
        has_special: password.chars().any(|c| !c.is_alphanumeric() && !c.is_whitespace()),
    }
}

/// Shape check only: `local@domain.tld` with no whitespace
pub fn validate_email(email: &str) -> bool {
    EMAIL_RE.is_match(email.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weak_password() {
        let check = validate_password("abc");
        assert!(!check.valid_length);
        assert!(!check.has_uppercase);
        assert!(!check.has_number);
        assert!(!check.has_special);
        assert_eq!(check.strength(), 0);
        assert_eq!(check.missing().len(), 4);
    }

    #[test]
    fn test_strong_password() {
        let check = validate_password("Pipoca#2024");
        assert_eq!(check.strength(), 4);
        assert!(check.is_acceptable());
        assert!(check.missing().is_empty());
    }

    #[test]
    fn test_partial_password() {
        let check = validate_password("pipocadoce1");
        assert!(check.valid_length);
        assert!(check.has_number);
        assert_eq!(check.strength(), 2);
        assert!(!check.is_acceptable());
    }

    #[test]
    fn test_length_counts_characters() {
        assert!(validate_password("ção€ção€").valid_length);
        assert!(!validate_password("       ").has_special);
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("ana@example.com"));
        assert!(validate_email(" ana.souza+filmes@mail.com.br "));
        assert!(!validate_email("ana@example"));
        assert!(!validate_email("ana example@x.com"));
        assert!(!validate_email("@x.com"));
    }
}
