//! Field validation for parsed resumes.
//!
//! Validation never fails a parse; it reports issues so the caller can
//! decide what to persist. Empty output and malformed contact fields are
//! the two failure modes providers actually produce.

use serde::{Deserialize, Serialize};

use crate::contact::{EMAIL_PATTERN, PHONE_PATTERN};
use crate::resume::ParsedResume;

/// A single problem found in a parsed resume.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationIssue {
    /// The parse produced no fields at all
    EmptyResume,

    /// The email field does not look like an email address
    MalformedEmail { value: String },

    /// The phone field does not look like a phone number
    MalformedPhone { value: String },

    /// A work experience entry has neither company nor title
    BlankExperience { index: usize },
}

/// Check a parsed resume for structural problems.
///
/// Returns an empty vec for a clean resume. Deterministic.
pub fn validate(resume: &ParsedResume) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    if resume.is_empty() {
        issues.push(ValidationIssue::EmptyResume);
        return issues;
    }

    if let Some(email) = &resume.email {
        if !EMAIL_PATTERN.is_match(email) {
            issues.push(ValidationIssue::MalformedEmail {
                value: email.clone(),
            });
        }
    }

    if let Some(phone) = &resume.phone {
        if !PHONE_PATTERN.is_match(phone) {
            issues.push(ValidationIssue::MalformedPhone {
                value: phone.clone(),
            });
        }
    }

    for (index, exp) in resume.experience.iter().enumerate() {
        if exp.company.is_none() && exp.title.is_none() {
            issues.push(ValidationIssue::BlankExperience { index });
        }
    }

    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resume::WorkExperience;

    #[test]
    fn test_empty_resume_is_flagged() {
        let issues = validate(&ParsedResume::default());
        assert_eq!(issues, vec![ValidationIssue::EmptyResume]);
    }

    #[test]
    fn test_clean_resume_has_no_issues() {
        let resume = ParsedResume {
            name: Some("Ada Lovelace".to_string()),
            email: Some("ada@example.com".to_string()),
            phone: Some("(555) 867-5309".to_string()),
            ..Default::default()
        };
        assert!(validate(&resume).is_empty());
    }

    #[test]
    fn test_malformed_contact_fields() {
        let resume = ParsedResume {
            email: Some("not-an-email".to_string()),
            phone: Some("call me".to_string()),
            ..Default::default()
        };
        let issues = validate(&resume);
        assert!(issues.contains(&ValidationIssue::MalformedEmail {
            value: "not-an-email".to_string()
        }));
        assert!(issues.contains(&ValidationIssue::MalformedPhone {
            value: "call me".to_string()
        }));
    }

    #[test]
    fn test_blank_experience_entry() {
        let resume = ParsedResume {
            name: Some("Ada".to_string()),
            experience: vec![
                WorkExperience {
                    company: Some("Initech".to_string()),
                    ..Default::default()
                },
                WorkExperience::default(),
            ],
            ..Default::default()
        };
        assert_eq!(
            validate(&resume),
            vec![ValidationIssue::BlankExperience { index: 1 }]
        );
    }
}
