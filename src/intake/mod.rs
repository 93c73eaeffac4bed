//! Email intake pipeline.
//!
//! A change notification flows through:
//! 1. `ChangeNotification::from_json()`: payload validation
//! 2. `MessageStore::get_message()`: resolve each resource change
//! 3. `meets_criteria()`: subject / sender domain / attachment filter
//! 4. `AttachmentRetriever`: download accepted attachments into staging
//! 5. `ReviewHandoff`: downstream template validation and review

pub mod criteria;
pub mod graph;
pub mod handoff;
pub mod notification;
pub mod processor;
pub mod retriever;
pub mod staging;
pub mod store;

pub use criteria::meets_criteria;
pub use graph::GraphMessageStore;
pub use handoff::{ReviewHandoff, ValidatingHandoff};
pub use notification::{ChangeNotification, ResourceChange};
pub use processor::{EntryOutcome, NotificationProcessor, ProcessReport};
pub use retriever::{ACCEPTED_CONTENT_TYPE, Attachment, AttachmentRetriever, SavedAttachment};
pub use staging::StagingArea;
pub use store::{AttachmentSummary, Message, MessageStore};
