//! # vitae-core
//!
//! Deterministic resume domain for Vitae.
//!
//! This crate holds everything about a parsed resume that does NOT require
//! an LLM: the data model, regex-based contact extraction over raw resume
//! text, field validation, and a completeness score.
//!
//! ## Key Guarantees
//!
//! 1. **Deterministic**: Same input always produces same output
//! 2. **No network calls**: Everything here is pure computation
//! 3. **Lossy-input tolerant**: Every model field is optional or a
//!    collection, because upstream extraction routinely drops fields
//!
//! ## Example
//!
//! ```rust
//! use vitae_core::{ParsedResume, completeness_score, validate};
//!
//! let mut resume = ParsedResume::default();
//! resume.email = Some("ada@example.com".to_string());
//! resume.skills = vec!["Rust".to_string(), "  rust ".to_string()];
//! resume.normalize();
//!
//! assert_eq!(resume.skills, vec!["Rust"]);
//! assert!(completeness_score(&resume) < 1.0);
//! assert!(validate(&resume).is_empty());
//! ```

pub mod completeness;
pub mod contact;
pub mod resume;
pub mod validation;

// Re-export main types at crate root
pub use completeness::completeness_score;
pub use contact::{extract_emails, extract_phones};
pub use resume::{Education, ParsedResume, WorkExperience};
pub use validation::{validate, ValidationIssue};
