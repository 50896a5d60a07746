//! Customer domain types and the per-candidate validation rules shared by
//! single and bulk customer creation.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::ValidateEmail;

/// International form (`+` and 7-15 digits) or dashed domestic form (`DDD-DDD-DDDD`).
static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:\+\d{7,15}|\d{3}-\d{3}-\d{4})$").expect("valid phone regex")
});

/// An unvalidated customer payload, exactly as submitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerCandidate {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

impl CustomerCandidate {
    #[must_use]
    pub fn new(name: &str, email: &str, phone: Option<&str>) -> Self {
        Self {
            name: Some(name.to_owned()),
            email: Some(email.to_owned()),
            phone: phone.map(ToOwned::to_owned),
        }
    }
}

/// A candidate that passed the stateless checks: trimmed name, normalized
/// email, trimmed phone (`None` when absent or blank).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCustomer {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

/// A persisted customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerRecord {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Why a single candidate was rejected.
///
/// Variants are listed in check order; a candidate reports only the first
/// check it fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CandidateError {
    #[error("Name is required.")]
    NameRequired,
    #[error("Invalid email format")]
    InvalidEmail,
    #[error("Invalid phone format. Use +1234567890 or 123-456-7890.")]
    InvalidPhone,
    #[error("Duplicate email in request: {0}")]
    DuplicateInRequest(String),
    #[error("Email already exists: {0}")]
    EmailExists(String),
}

/// Trim and lower-case an email address for storage and comparison.
#[must_use]
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Syntactic email check (RFC 5322 / HTML5 grammar as implemented by `validator`).
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    email.validate_email()
}

#[must_use]
pub fn is_valid_phone(phone: &str) -> bool {
    PHONE_RE.is_match(phone)
}

/// Run the stateless checks (name, email syntax, phone shape) in order.
///
/// Duplicate and existing-email checks need batch/storage context and live in
/// [`crate::intake`].
///
/// # Errors
///
/// Returns the first [`CandidateError`] the candidate fails.
pub fn check_candidate(candidate: &CustomerCandidate) -> Result<NewCustomer, CandidateError> {
    let name = candidate.name.as_deref().unwrap_or_default().trim();
    if name.is_empty() {
        return Err(CandidateError::NameRequired);
    }

    let email = normalize_email(candidate.email.as_deref().unwrap_or_default());
    if !is_valid_email(&email) {
        return Err(CandidateError::InvalidEmail);
    }

    let phone = candidate
        .phone
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty());
    if let Some(p) = phone {
        if !is_valid_phone(p) {
            return Err(CandidateError::InvalidPhone);
        }
    }

    Ok(NewCustomer {
        name: name.to_owned(),
        email,
        phone: phone.map(ToOwned::to_owned),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_email_trims_and_lowercases() {
        assert_eq!(normalize_email("  Ada@Example.COM "), "ada@example.com");
    }

    #[test]
    fn phone_accepts_both_shapes() {
        assert!(is_valid_phone("+1234567"));
        assert!(is_valid_phone("+123456789012345"));
        assert!(is_valid_phone("123-456-7890"));
    }

    #[test]
    fn phone_rejects_other_shapes() {
        for bad in [
            "123",
            "+123456",
            "+1234567890123456",
            "1234567890",
            "(123) 456-7890",
            "123-4567-890",
            "+12 345 678",
            "",
        ] {
            assert!(!is_valid_phone(bad), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn check_candidate_normalizes_fields() {
        let candidate = CustomerCandidate::new("  Alice ", " ALICE@x.com ", Some(" +1234567890 "));
        let valid = check_candidate(&candidate).expect("valid candidate");
        assert_eq!(valid.name, "Alice");
        assert_eq!(valid.email, "alice@x.com");
        assert_eq!(valid.phone.as_deref(), Some("+1234567890"));
    }

    #[test]
    fn blank_phone_is_treated_as_absent() {
        let candidate = CustomerCandidate::new("Bob", "bob@x.com", Some("   "));
        let valid = check_candidate(&candidate).expect("valid candidate");
        assert!(valid.phone.is_none());
    }

    #[test]
    fn missing_or_blank_name_is_rejected() {
        let blank = CustomerCandidate::new("   ", "c@x.com", None);
        assert_eq!(check_candidate(&blank), Err(CandidateError::NameRequired));

        let missing = CustomerCandidate {
            name: None,
            email: Some("c@x.com".to_string()),
            phone: None,
        };
        assert_eq!(check_candidate(&missing), Err(CandidateError::NameRequired));
    }

    #[test]
    fn malformed_email_is_rejected() {
        for bad in ["bad-email", "", "a@", "@x.com", "two@@x.com"] {
            let candidate = CustomerCandidate::new("D", bad, None);
            assert_eq!(
                check_candidate(&candidate),
                Err(CandidateError::InvalidEmail),
                "{bad:?}"
            );
        }
    }

    #[test]
    fn email_failure_wins_over_phone_failure() {
        let candidate = CustomerCandidate::new("D", "bad-email", Some("123"));
        assert_eq!(check_candidate(&candidate), Err(CandidateError::InvalidEmail));
    }

    #[test]
    fn name_failure_wins_over_everything() {
        let candidate = CustomerCandidate::new("", "bad-email", Some("123"));
        assert_eq!(check_candidate(&candidate), Err(CandidateError::NameRequired));
    }

    #[test]
    fn malformed_phone_is_rejected() {
        let candidate = CustomerCandidate::new("E", "e@x.com", Some("555-1234"));
        assert_eq!(check_candidate(&candidate), Err(CandidateError::InvalidPhone));
    }

    #[test]
    fn error_messages_match_contract() {
        assert_eq!(CandidateError::NameRequired.to_string(), "Name is required.");
        assert_eq!(
            CandidateError::InvalidPhone.to_string(),
            "Invalid phone format. Use +1234567890 or 123-456-7890."
        );
        assert_eq!(
            CandidateError::DuplicateInRequest("a@x.com".into()).to_string(),
            "Duplicate email in request: a@x.com"
        );
        assert_eq!(
            CandidateError::EmailExists("a@x.com".into()).to_string(),
            "Email already exists: a@x.com"
        );
    }

    #[test]
    fn candidate_deserializes_with_missing_fields() {
        let candidate: CustomerCandidate =
            serde_json::from_str(r#"{"email": "f@x.com"}"#).expect("json");
        assert!(candidate.name.is_none());
        assert!(candidate.phone.is_none());
    }
}
