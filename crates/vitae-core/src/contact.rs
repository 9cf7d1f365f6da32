//! Contact extraction patterns.
//!
//! Resumes almost always carry an email address and usually a phone number
//! in the raw text even when a provider drops them from its structured
//! output. These patterns let callers backfill those fields
//! deterministically instead of re-asking the provider.

use lazy_static::lazy_static;
use regex::Regex;

use crate::resume::ParsedResume;

lazy_static! {
    /// Email address pattern (RFC 5322 simplified)
    pub static ref EMAIL_PATTERN: Regex = Regex::new(
        r"[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}"
    ).unwrap();

    /// Phone number pattern (optional country code, common separators)
    pub static ref PHONE_PATTERN: Regex = Regex::new(
        r"(?:\+?1[-.\s]?)?(?:\([0-9]{3}\)|[0-9]{3})[-.\s]?[0-9]{3}[-.\s]?[0-9]{4}"
    ).unwrap();
}

/// Extract all email addresses found in raw resume text, in order.
pub fn extract_emails(text: &str) -> Vec<&str> {
    EMAIL_PATTERN.find_iter(text).map(|m| m.as_str()).collect()
}

/// Extract all phone numbers found in raw resume text, in order.
pub fn extract_phones(text: &str) -> Vec<&str> {
    PHONE_PATTERN.find_iter(text).map(|m| m.as_str()).collect()
}

/// Fill a parsed resume's missing contact fields from the raw text.
///
/// Only fields the provider left empty are touched; the first match in
/// document order wins. Returns true if anything was backfilled.
pub fn backfill_contact(resume: &mut ParsedResume, raw_text: &str) -> bool {
    let mut changed = false;

    if resume.email.is_none() {
        if let Some(email) = extract_emails(raw_text).first() {
            tracing::debug!(email = %email, "backfilled email from raw text");
            resume.email = Some((*email).to_string());
            changed = true;
        }
    }

    if resume.phone.is_none() {
        if let Some(phone) = extract_phones(raw_text).first() {
            tracing::debug!("backfilled phone from raw text");
            resume.phone = Some((*phone).to_string());
            changed = true;
        }
    }

    changed
}
