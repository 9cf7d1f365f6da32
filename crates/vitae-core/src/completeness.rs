//! Completeness scoring for parsed resumes.
//!
//! Callers use the score to decide whether a parse is worth persisting or
//! whether it should be retried against a different provider. The weights
//! favor what downstream matching actually consumes, so skills and work
//! history dominate.

use crate::resume::ParsedResume;

const WEIGHT_NAME: f64 = 0.15;
const WEIGHT_EMAIL: f64 = 0.15;
const WEIGHT_PHONE: f64 = 0.05;
const WEIGHT_LOCATION: f64 = 0.05;
const WEIGHT_SUMMARY: f64 = 0.10;
const WEIGHT_SKILLS: f64 = 0.25;
const WEIGHT_EXPERIENCE: f64 = 0.20;
const WEIGHT_EDUCATION: f64 = 0.05;

/// Score how much of a resume the parse actually captured, 0.0..=1.0.
///
/// Deterministic: depends only on which fields are populated, never on
/// their contents.
pub fn completeness_score(resume: &ParsedResume) -> f64 {
    let mut score = 0.0;

    if resume.name.is_some() {
        score += WEIGHT_NAME;
    }
    if resume.email.is_some() {
        score += WEIGHT_EMAIL;
    }
    if resume.phone.is_some() {
        score += WEIGHT_PHONE;
    }
    if resume.location.is_some() {
        score += WEIGHT_LOCATION;
    }
    if resume.summary.is_some() {
        score += WEIGHT_SUMMARY;
    }
    if !resume.skills.is_empty() {
        score += WEIGHT_SKILLS;
    }
    if !resume.experience.is_empty() {
        score += WEIGHT_EXPERIENCE;
    }
    if !resume.education.is_empty() {
        score += WEIGHT_EDUCATION;
    }

    score
}
