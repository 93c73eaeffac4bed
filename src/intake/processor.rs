//! Notification processor: the intake pipeline entry point.
//!
//! For every resource change in a notification:
//! 1. Resolve the message through the `MessageStore`
//! 2. `meets_criteria()`: rejected messages are skipped silently
//! 3. `AttachmentRetriever` downloads and stages accepted attachments
//! 4. Staged files go to the `ReviewHandoff`
//!
//! Entries are isolated: an error or panic in one is logged and recorded in
//! the report, and its siblings carry on. Nothing is retried.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::{FutureExt, StreamExt, stream};
use serde::Serialize;
use tracing::{debug, error, info};
use uuid::Uuid;

use crate::config::{ApprovedDomains, IntakeConfig};
use crate::error::RetrievalError;
use crate::intake::criteria::meets_criteria;
use crate::intake::handoff::{ReviewHandoff, ValidatingHandoff};
use crate::intake::notification::{ChangeNotification, ResourceChange};
use crate::intake::retriever::{AttachmentRetriever, SavedAttachment};
use crate::intake::store::MessageStore;

/// What happened to one resource change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum EntryOutcome {
    /// Message qualified; its accepted attachments were staged.
    Staged {
        resource: String,
        message_id: String,
        attachments: Vec<SavedAttachment>,
    },
    /// Message did not meet the intake criteria.
    Skipped { resource: String, message_id: String },
    /// Resolving or retrieving failed; logged, not retried.
    Failed { resource: String, error: String },
}

impl EntryOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Staged { .. } => "staged",
            Self::Skipped { .. } => "skipped",
            Self::Failed { .. } => "failed",
        }
    }
}

/// Per-entry outcomes of one notification, in entry order.
#[derive(Debug, Clone, Serialize)]
pub struct ProcessReport {
    pub batch_id: Uuid,
    pub outcomes: Vec<EntryOutcome>,
}

impl ProcessReport {
    fn count(&self, label: &str) -> usize {
        self.outcomes.iter().filter(|o| o.label() == label).count()
    }

    pub fn staged(&self) -> usize {
        self.count("staged")
    }

    pub fn skipped(&self) -> usize {
        self.count("skipped")
    }

    pub fn failed(&self) -> usize {
        self.count("failed")
    }

    /// Every attachment staged across the batch.
    pub fn saved_attachments(&self) -> impl Iterator<Item = &SavedAttachment> {
        self.outcomes.iter().flat_map(|o| match o {
            EntryOutcome::Staged { attachments, .. } => attachments.as_slice(),
            _ => [].as_slice(),
        })
    }
}

/// Runs change notifications through filter → retrieve → hand-off.
pub struct NotificationProcessor {
    store: Arc<dyn MessageStore>,
    retriever: AttachmentRetriever,
    approved_domains: ApprovedDomains,
    handoff: Arc<dyn ReviewHandoff>,
    max_concurrent_entries: usize,
}

impl NotificationProcessor {
    pub fn new(
        store: Arc<dyn MessageStore>,
        retriever: AttachmentRetriever,
        approved_domains: ApprovedDomains,
    ) -> Self {
        Self {
            store,
            retriever,
            approved_domains,
            handoff: Arc::new(ValidatingHandoff::default()),
            max_concurrent_entries: usize::MAX,
        }
    }

    /// Build a processor from intake configuration, preparing staging.
    pub async fn from_config(
        store: Arc<dyn MessageStore>,
        config: &IntakeConfig,
    ) -> Result<Self, RetrievalError> {
        let retriever = AttachmentRetriever::new(Arc::clone(&store), &config.staging_dir).await?;
        Ok(Self::new(store, retriever, config.approved_domains.clone())
            .with_max_concurrent_entries(config.max_concurrent_entries))
    }

    pub fn with_handoff(mut self, handoff: Arc<dyn ReviewHandoff>) -> Self {
        self.handoff = handoff;
        self
    }

    /// Bound how many entries are in flight at once (minimum 1).
    pub fn with_max_concurrent_entries(mut self, max: usize) -> Self {
        self.max_concurrent_entries = max.max(1);
        self
    }

    /// Process every entry of `notification`. Never fails as a whole.
    pub async fn process(&self, notification: &ChangeNotification) -> ProcessReport {
        let batch_id = Uuid::new_v4();
        info!(batch_id = %batch_id, entries = notification.len(), "Processing change notification");

        let outcomes: Vec<EntryOutcome> = stream::iter(&notification.changes)
            .map(|change| self.process_isolated(batch_id, change))
            .buffered(self.max_concurrent_entries)
            .collect()
            .await;

        let report = ProcessReport { batch_id, outcomes };
        info!(
            batch_id = %batch_id,
            staged = report.staged(),
            skipped = report.skipped(),
            failed = report.failed(),
            "Change notification processed"
        );
        report
    }

    async fn process_isolated(&self, batch_id: Uuid, change: &ResourceChange) -> EntryOutcome {
        let resource = change.resource_path().to_string();
        match AssertUnwindSafe(self.process_entry(change))
            .catch_unwind()
            .await
        {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(e)) => {
                error!(batch_id = %batch_id, resource = %resource, error = %e, "Failed to process notification entry");
                EntryOutcome::Failed {
                    resource,
                    error: e.to_string(),
                }
            }
            Err(_) => {
                error!(batch_id = %batch_id, resource = %resource, "Notification entry panicked");
                EntryOutcome::Failed {
                    resource,
                    error: "entry processing panicked".into(),
                }
            }
        }
    }

    async fn process_entry(&self, change: &ResourceChange) -> Result<EntryOutcome, RetrievalError> {
        let resource = change.resource_path().to_string();
        let message = self.store.get_message(&resource).await?;

        if !meets_criteria(&message, &self.approved_domains) {
            debug!(
                message_id = %message.id,
                subject = %message.subject,
                sender_domain = %message.sender_domain(),
                has_attachments = message.has_attachments,
                "Message does not meet intake criteria"
            );
            return Ok(EntryOutcome::Skipped {
                resource,
                message_id: message.id,
            });
        }

        let attachments = self.retriever.fetch_qualifying_attachments(&message).await?;
        for saved in &attachments {
            self.handoff.hand_off(saved).await;
        }

        Ok(EntryOutcome::Staged {
            resource,
            message_id: message.id,
            attachments,
        })
    }
}
