//! Microsoft Graph implementation of [`MessageStore`].
//!
//! Token acquisition is outside this module: the store is handed a bearer
//! token and sends it as-is.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::ExposeSecret;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::config::GraphConfig;
use crate::error::RetrievalError;
use crate::intake::store::{AttachmentSummary, Message, MessageStore};

// ── Wire types ──────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GraphMessage {
    id: String,
    #[serde(default)]
    subject: Option<String>,
    #[serde(default)]
    from: Option<GraphRecipient>,
    #[serde(default)]
    has_attachments: bool,
    #[serde(default)]
    received_date_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GraphRecipient {
    email_address: GraphEmailAddress,
}

#[derive(Debug, Deserialize)]
struct GraphEmailAddress {
    #[serde(default)]
    address: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GraphList<T> {
    value: Vec<T>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GraphAttachment {
    id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    content_type: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GraphAttachmentContent {
    #[serde(default)]
    content_bytes: Option<String>,
}

impl From<GraphMessage> for Message {
    fn from(m: GraphMessage) -> Self {
        Self {
            id: m.id,
            subject: m.subject.unwrap_or_default(),
            sender_address: m
                .from
                .and_then(|f| f.email_address.address)
                .unwrap_or_default(),
            has_attachments: m.has_attachments,
            received_at: m.received_date_time,
        }
    }
}

// ── Store ───────────────────────────────────────────────────────────

/// Graph v1.0 mailbox client.
pub struct GraphMessageStore {
    config: GraphConfig,
    client: reqwest::Client,
}

impl GraphMessageStore {
    pub fn new(config: GraphConfig) -> Result<Self, RetrievalError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| RetrievalError::RequestFailed {
                resource: config.base_url.clone(),
                reason: format!("failed to build HTTP client: {e}"),
            })?;
        Ok(Self { config, client })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url, path.trim_start_matches('/'))
    }

    fn messages_path(&self, message_id: &str) -> String {
        match &self.config.mailbox {
            Some(mailbox) => format!("users/{mailbox}/messages/{message_id}"),
            None => format!("me/messages/{message_id}"),
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, RetrievalError> {
        let resp = self
            .client
            .get(self.url(path))
            .query(query)
            .bearer_auth(self.config.access_token.expose_secret())
            .send()
            .await
            .map_err(|e| RetrievalError::RequestFailed {
                resource: path.to_string(),
                reason: e.to_string(),
            })?;

        let status = resp.status();
        if !status.is_success() {
            tracing::debug!(resource = %path, status = %status, "Graph request rejected");
            return Err(RetrievalError::Status {
                resource: path.to_string(),
                status: status.as_u16(),
            });
        }

        resp.json::<T>()
            .await
            .map_err(|e| RetrievalError::InvalidResponse {
                resource: path.to_string(),
                reason: e.to_string(),
            })
    }
}

#[async_trait]
impl MessageStore for GraphMessageStore {
    async fn get_message(&self, resource_path: &str) -> Result<Message, RetrievalError> {
        let message: GraphMessage = self
            .get_json(
                resource_path,
                &[("$select", "id,subject,from,hasAttachments,receivedDateTime")],
            )
            .await?;
        Ok(message.into())
    }

    async fn list_attachments(
        &self,
        message_id: &str,
    ) -> Result<Vec<AttachmentSummary>, RetrievalError> {
        let path = format!("{}/attachments", self.messages_path(message_id));
        let list: GraphList<GraphAttachment> = self
            .get_json(&path, &[("$select", "id,name,contentType")])
            .await?;
        Ok(list
            .value
            .into_iter()
            .map(|a| AttachmentSummary {
                id: a.id,
                name: a.name.unwrap_or_default(),
                content_type: a.content_type.unwrap_or_default(),
            })
            .collect())
    }

    async fn attachment_content(
        &self,
        message_id: &str,
        attachment_id: &str,
    ) -> Result<String, RetrievalError> {
        let path = format!(
            "{}/attachments/{attachment_id}",
            self.messages_path(message_id)
        );
        let content: GraphAttachmentContent = self.get_json(&path, &[]).await?;
        content
            .content_bytes
            .ok_or_else(|| RetrievalError::InvalidResponse {
                resource: path,
                reason: "attachment has no contentBytes (not a file attachment?)".into(),
            })
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use secrecy::SecretString;

    use super::*;

    fn store(mailbox: Option<&str>) -> GraphMessageStore {
        GraphMessageStore::new(GraphConfig {
            base_url: "https://graph.example.test/v1.0".into(),
            access_token: SecretString::from("token".to_string()),
            mailbox: mailbox.map(str::to_string),
            timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    #[test]
    fn message_from_graph_json() {
        let json = r#"{
            "id": "AAMk1",
            "subject": "New Menu",
            "hasAttachments": true,
            "receivedDateTime": "2026-03-01T09:30:00Z",
            "from": { "emailAddress": { "name": "Chef", "address": "chef@approved.com" } }
        }"#;
        let message: Message = serde_json::from_str::<GraphMessage>(json).unwrap().into();
        assert_eq!(message.id, "AAMk1");
        assert_eq!(message.subject, "New Menu");
        assert_eq!(message.sender_domain(), "approved.com");
        assert!(message.has_attachments);
        assert!(message.received_at.is_some());
    }

    #[test]
    fn message_without_sender_or_subject() {
        let message: Message = serde_json::from_str::<GraphMessage>(r#"{"id": "x"}"#)
            .unwrap()
            .into();
        assert_eq!(message.subject, "");
        assert_eq!(message.sender_address, "");
        assert!(!message.has_attachments);
    }

    #[test]
    fn attachment_list_shape() {
        let json = r#"{"value": [{"id": "a1", "name": "brief.docx", "contentType": "application/pdf"}]}"#;
        let list: GraphList<GraphAttachment> = serde_json::from_str(json).unwrap();
        assert_eq!(list.value[0].name.as_deref(), Some("brief.docx"));
    }

    #[test]
    fn urls_join_without_double_slash() {
        let s = store(None);
        assert_eq!(
            s.url("/Users/u1/Messages/m1"),
            "https://graph.example.test/v1.0/Users/u1/Messages/m1"
        );
    }

    #[test]
    fn message_paths_use_mailbox_when_configured() {
        assert_eq!(store(None).messages_path("m1"), "me/messages/m1");
        assert_eq!(
            store(Some("intake@corp.com")).messages_path("m1"),
            "users/intake@corp.com/messages/m1"
        );
    }
}
