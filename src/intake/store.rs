//! Message store abstraction: the mailbox the notifications point into.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::RetrievalError;

/// Read-only snapshot of a mailbox message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub subject: String,
    /// Full sender address, e.g. `chef@restaurant.com`.
    pub sender_address: String,
    pub has_attachments: bool,
    pub received_at: Option<DateTime<Utc>>,
}

impl Message {
    /// Domain part of the sender address (text after the last `@`).
    ///
    /// Returns an empty string when the address has no `@`.
    pub fn sender_domain(&self) -> &str {
        self.sender_address
            .rsplit_once('@')
            .map_or("", |(_, domain)| domain)
    }
}

/// Attachment metadata as listed by the store, without content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentSummary {
    pub id: String,
    pub name: String,
    pub content_type: String,
}

/// Query interface of the mailbox provider.
///
/// Timeouts and authentication are the implementation's concern.
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Resolve a notification resource path to a message.
    async fn get_message(&self, resource_path: &str) -> Result<Message, RetrievalError>;

    /// List the attachments of a message.
    async fn list_attachments(
        &self,
        message_id: &str,
    ) -> Result<Vec<AttachmentSummary>, RetrievalError>;

    /// Fetch one attachment's content, base64-encoded as transported.
    async fn attachment_content(
        &self,
        message_id: &str,
        attachment_id: &str,
    ) -> Result<String, RetrievalError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(sender: &str) -> Message {
        Message {
            id: "m1".into(),
            subject: "Menu".into(),
            sender_address: sender.into(),
            has_attachments: true,
            received_at: None,
        }
    }

    #[test]
    fn sender_domain_after_at() {
        assert_eq!(message("chef@approved.com").sender_domain(), "approved.com");
    }

    #[test]
    fn sender_domain_uses_last_at() {
        assert_eq!(message("\"odd@name\"@kitchen.org").sender_domain(), "kitchen.org");
    }

    #[test]
    fn sender_domain_without_at() {
        assert_eq!(message("not-an-address").sender_domain(), "");
    }
}
