/// Wire payloads and the finished, normalized message
use crate::flags::{MessageBooleans, MessageFlag};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;

pub type MessageId = u64;
pub type UserId = u64;
pub type StreamId = u64;

/// Shared handle to a stored message.
///
/// Every holder sees in-place mutations made through the store, so UI code
/// never needs to re-fetch after a rename or a snippet merge.
pub type MessageRef = Rc<RefCell<Message>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageType {
    Stream,
    Private,
}

/// One entry of a private message's `display_recipient` list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipient {
    pub id: UserId,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub full_name: String,
}

/// `display_recipient` as sent by the server: a channel name for stream
/// messages, the participant list for private ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DisplayRecipient {
    Stream(String),
    Private(Vec<Recipient>),
}

/// Message as received from the transport.
///
/// Only `id` is guaranteed. Search results re-deliver known messages with
/// nothing but `id` and the match snippets filled in.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawMessage {
    pub id: MessageId,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<MessageType>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_id: Option<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub small_avatar_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream_id: Option<StreamId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_recipient: Option<DisplayRecipient>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(
        default,
        with = "chrono::serde::ts_seconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_me_message: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flags: Option<Vec<MessageFlag>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_subject: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_content: Option<String>,
}

impl RawMessage {
    pub fn is_private(&self) -> bool {
        self.kind == Some(MessageType::Private)
    }
}

/// Channel or private-conversation half of a message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Conversation {
    Stream {
        /// Absent on some legacy and search payloads; such messages stay out
        /// of the channel index
        stream_id: Option<StreamId>,
        /// Channel name; kept in sync with `display_recipient` on rename
        stream: String,
        topic: String,
        display_recipient: String,
    },
    Private {
        display_recipient: Vec<Recipient>,
        /// Other participants' ids, ascending, comma-joined
        to_user_ids: String,
        /// Other participants' full names in `to_user_ids` order
        display_reply_to: String,
    },
}

/// The store's unit of truth: a raw message plus everything derived from it
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    pub id: MessageId,
    pub sender_id: UserId,
    pub sender_email: String,
    pub sender_full_name: String,
    pub small_avatar_url: Option<String>,
    pub content: String,
    #[serde(with = "chrono::serde::ts_seconds_option")]
    pub timestamp: Option<DateTime<Utc>>,
    pub is_me_message: bool,

    /// Set once at intake to match `conversation`
    pub is_private: bool,
    #[serde(flatten)]
    pub conversation: Conversation,
    /// Comma-joined emails to answer to (the sender's for stream messages)
    pub reply_to: String,
    pub sent_by_me: bool,

    #[serde(flatten)]
    pub booleans: MessageBooleans,
    pub unread: bool,
    pub starred: bool,
    pub collapsed: bool,
    pub historical: bool,

    pub match_subject: Option<String>,
    pub match_content: Option<String>,
}

impl Message {
    pub fn is_private(&self) -> bool {
        matches!(self.conversation, Conversation::Private { .. })
    }

    pub fn is_stream(&self) -> bool {
        !self.is_private()
    }

    pub fn stream_id(&self) -> Option<StreamId> {
        match &self.conversation {
            Conversation::Stream { stream_id, .. } => *stream_id,
            Conversation::Private { .. } => None,
        }
    }

    pub fn topic(&self) -> Option<&str> {
        match &self.conversation {
            Conversation::Stream { topic, .. } => Some(topic),
            Conversation::Private { .. } => None,
        }
    }

    pub fn to_user_ids(&self) -> Option<&str> {
        match &self.conversation {
            Conversation::Private { to_user_ids, .. } => Some(to_user_ids),
            Conversation::Stream { .. } => None,
        }
    }

    pub fn display_reply_to(&self) -> Option<&str> {
        match &self.conversation {
            Conversation::Private {
                display_reply_to, ..
            } => Some(display_reply_to),
            Conversation::Stream { .. } => None,
        }
    }

    /// Search-highlighted topic, if this message came back from a search
    pub fn match_topic(&self) -> Option<&str> {
        self.match_subject.as_deref()
    }

    pub fn into_ref(self) -> MessageRef {
        Rc::new(RefCell::new(self))
    }
}
