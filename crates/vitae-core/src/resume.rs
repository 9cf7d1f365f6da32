//! The parsed resume data model.
//!
//! Upstream extraction (an LLM asked to return strict JSON) is lossy:
//! fields go missing, strings arrive padded, skills repeat with different
//! casing. The model therefore makes every scalar optional and provides
//! [`ParsedResume::normalize`] to clean a freshly deserialized value.

use serde::{Deserialize, Serialize};

/// A structured resume as returned by a parse provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedResume {
    /// Candidate's full name
    #[serde(default)]
    pub name: Option<String>,

    /// Contact email address
    #[serde(default)]
    pub email: Option<String>,

    /// Contact phone number
    #[serde(default)]
    pub phone: Option<String>,

    /// Candidate location (free-form, e.g. "Berlin, Germany")
    #[serde(default)]
    pub location: Option<String>,

    /// Professional summary / objective paragraph
    #[serde(default)]
    pub summary: Option<String>,

    /// Skills, normalized to unique entries
    #[serde(default)]
    pub skills: Vec<String>,

    /// Work history, most recent first as emitted by the provider
    #[serde(default)]
    pub experience: Vec<WorkExperience>,

    /// Education history
    #[serde(default)]
    pub education: Vec<Education>,
}

/// One position in the candidate's work history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorkExperience {
    #[serde(default)]
    pub company: Option<String>,

    #[serde(default)]
    pub title: Option<String>,

    /// Start date as written in the resume ("2019", "Mar 2021", ...)
    #[serde(default)]
    pub start_date: Option<String>,

    /// End date as written, or None for a current position
    #[serde(default)]
    pub end_date: Option<String>,

    /// Bullet points describing the role
    #[serde(default)]
    pub highlights: Vec<String>,
}

/// One entry in the candidate's education history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Education {
    #[serde(default)]
    pub institution: Option<String>,

    #[serde(default)]
    pub degree: Option<String>,

    #[serde(default)]
    pub field: Option<String>,

    #[serde(default)]
    pub year: Option<String>,
}

impl ParsedResume {
    /// Clean up a freshly deserialized resume in place.
    ///
    /// - Trims surrounding whitespace on every string field
    /// - Collapses whitespace-only strings to `None`
    /// - Deduplicates skills case-insensitively, keeping first spelling
    pub fn normalize(&mut self) {
        normalize_opt(&mut self.name);
        normalize_opt(&mut self.email);
        normalize_opt(&mut self.phone);
        normalize_opt(&mut self.location);
        normalize_opt(&mut self.summary);

        let mut seen = std::collections::HashSet::new();
        self.skills = self
            .skills
            .drain(..)
            .filter_map(|s| {
                let trimmed = s.trim().to_string();
                if trimmed.is_empty() {
                    return None;
                }
                seen.insert(trimmed.to_lowercase()).then_some(trimmed)
            })
            .collect();

        for exp in &mut self.experience {
            normalize_opt(&mut exp.company);
            normalize_opt(&mut exp.title);
            normalize_opt(&mut exp.start_date);
            normalize_opt(&mut exp.end_date);
            exp.highlights.retain(|h| !h.trim().is_empty());
            for h in &mut exp.highlights {
                *h = h.trim().to_string();
            }
        }

        for edu in &mut self.education {
            normalize_opt(&mut edu.institution);
            normalize_opt(&mut edu.degree);
            normalize_opt(&mut edu.field);
            normalize_opt(&mut edu.year);
        }
    }

    /// Whether the resume carries nothing at all.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.location.is_none()
            && self.summary.is_none()
            && self.skills.is_empty()
            && self.experience.is_empty()
            && self.education.is_empty()
    }
}

fn normalize_opt(field: &mut Option<String>) {
    if let Some(value) = field {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            *field = None;
        } else if trimmed.len() != value.len() {
            *field = Some(trimmed.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_trims_and_drops_empty() {
        let mut resume = ParsedResume {
            name: Some("  Ada Lovelace  ".to_string()),
            email: Some("   ".to_string()),
            ..Default::default()
        };
        resume.normalize();

        assert_eq!(resume.name.as_deref(), Some("Ada Lovelace"));
        assert_eq!(resume.email, None);
    }

    #[test]
    fn test_normalize_dedups_skills_case_insensitively() {
        let mut resume = ParsedResume {
            skills: vec![
                "Rust".to_string(),
                "rust".to_string(),
                " RUST ".to_string(),
                "Tokio".to_string(),
                "".to_string(),
            ],
            ..Default::default()
        };
        resume.normalize();

        assert_eq!(resume.skills, vec!["Rust", "Tokio"]);
    }

    #[test]
    fn test_normalize_cleans_experience_highlights() {
        let mut resume = ParsedResume {
            experience: vec![WorkExperience {
                company: Some(" Initech ".to_string()),
                highlights: vec!["  shipped the thing  ".to_string(), "   ".to_string()],
                ..Default::default()
            }],
            ..Default::default()
        };
        resume.normalize();

        assert_eq!(resume.experience[0].company.as_deref(), Some("Initech"));
        assert_eq!(resume.experience[0].highlights, vec!["shipped the thing"]);
    }

    #[test]
    fn test_default_is_empty() {
        assert!(ParsedResume::default().is_empty());

        let resume = ParsedResume {
            skills: vec!["Rust".to_string()],
            ..Default::default()
        };
        assert!(!resume.is_empty());
    }

    #[test]
    fn test_deserialize_tolerates_missing_fields() {
        let resume: ParsedResume = serde_json::from_str(r#"{"name": "Ada"}"#).unwrap();
        assert_eq!(resume.name.as_deref(), Some("Ada"));
        assert!(resume.skills.is_empty());
    }
}
