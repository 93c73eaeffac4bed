//! Message acceptance criteria.
//!
//! A message qualifies for intake when all of these hold:
//! - the subject contains one of [`SUBJECT_KEYWORDS`] (case-sensitive)
//! - the sender's domain ends with one of the approved domains (case-sensitive)
//! - the message has attachments
//!
//! Pure predicate, no I/O.

use crate::config::ApprovedDomains;
use crate::intake::store::Message;

/// Subject substrings that mark a submission.
pub const SUBJECT_KEYWORDS: &[&str] = &["Menu", "Design Brief"];

/// Whether `message` should be picked up for intake.
///
/// An empty `approved` list rejects everything; startup configuration refuses
/// that case, see [`IntakeConfig::from_env`](crate::config::IntakeConfig::from_env).
pub fn meets_criteria(message: &Message, approved: &ApprovedDomains) -> bool {
    subject_matches(&message.subject)
        && domain_approved(message.sender_domain(), approved)
        && message.has_attachments
}

pub fn subject_matches(subject: &str) -> bool {
    SUBJECT_KEYWORDS.iter().any(|k| subject.contains(k))
}

pub fn domain_approved(domain: &str, approved: &ApprovedDomains) -> bool {
    !domain.is_empty() && approved.iter().any(|d| domain.ends_with(d))
}
