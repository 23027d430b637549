/// Wire flag tokens and the notification booleans derived from them
use crate::types::{Message, RawMessage};
use serde::{Deserialize, Serialize};

/// A single per-user flag token.
///
/// The server sends flags as plain strings; anything we don't act on is kept
/// verbatim in `Other` so it survives a round trip.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MessageFlag {
    Read,
    Starred,
    Collapsed,
    Mentioned,
    StreamWildcardMentioned,
    TopicWildcardMentioned,
    HasAlertWord,
    Historical,
    Other(String),
}

impl MessageFlag {
    pub fn as_str(&self) -> &str {
        match self {
            MessageFlag::Read => "read",
            MessageFlag::Starred => "starred",
            MessageFlag::Collapsed => "collapsed",
            MessageFlag::Mentioned => "mentioned",
            MessageFlag::StreamWildcardMentioned => "stream_wildcard_mentioned",
            MessageFlag::TopicWildcardMentioned => "topic_wildcard_mentioned",
            MessageFlag::HasAlertWord => "has_alert_word",
            MessageFlag::Historical => "historical",
            MessageFlag::Other(token) => token,
        }
    }
}

impl From<&str> for MessageFlag {
    fn from(token: &str) -> Self {
        match token {
            "read" => MessageFlag::Read,
            "starred" => MessageFlag::Starred,
            "collapsed" => MessageFlag::Collapsed,
            "mentioned" => MessageFlag::Mentioned,
            "stream_wildcard_mentioned" => MessageFlag::StreamWildcardMentioned,
            "topic_wildcard_mentioned" => MessageFlag::TopicWildcardMentioned,
            "has_alert_word" => MessageFlag::HasAlertWord,
            "historical" => MessageFlag::Historical,
            other => MessageFlag::Other(other.to_string()),
        }
    }
}

impl From<String> for MessageFlag {
    fn from(token: String) -> Self {
        match MessageFlag::from(token.as_str()) {
            MessageFlag::Other(_) => MessageFlag::Other(token),
            known => known,
        }
    }
}

impl From<MessageFlag> for String {
    fn from(flag: MessageFlag) -> Self {
        match flag {
            MessageFlag::Other(token) => token,
            known => known.as_str().to_string(),
        }
    }
}

/// Notification booleans shared by both derivation entry points
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MessageBooleans {
    pub mentioned: bool,
    pub mentioned_me_directly: bool,
    pub stream_wildcard_mentioned: bool,
    pub topic_wildcard_mentioned: bool,
    pub alerted: bool,
}

impl MessageBooleans {
    /// Recompute every boolean from `flags` alone.
    pub fn from_flags(flags: &[MessageFlag]) -> Self {
        let has = |flag: MessageFlag| flags.contains(&flag);

        let mentioned_me_directly = has(MessageFlag::Mentioned);
        let stream_wildcard_mentioned = has(MessageFlag::StreamWildcardMentioned);
        let topic_wildcard_mentioned = has(MessageFlag::TopicWildcardMentioned);

        Self {
            mentioned: mentioned_me_directly
                || stream_wildcard_mentioned
                || topic_wildcard_mentioned,
            mentioned_me_directly,
            stream_wildcard_mentioned,
            topic_wildcard_mentioned,
            alerted: has(MessageFlag::HasAlertWord),
        }
    }
}

/// Overwrite the notification booleans of `message` from a fresh flag set.
///
/// Read state is owned by the unread tracker, so `unread` is left alone even
/// when `flags` carries `read`.
pub fn update_booleans<'a>(message: &'a mut Message, flags: &[MessageFlag]) -> &'a mut Message {
    message.booleans = MessageBooleans::from_flags(flags);
    message
}

/// Raw message with its flag list replaced by typed booleans
#[derive(Debug, Clone, PartialEq)]
pub struct ConvertedMessage {
    /// The original payload, `flags` taken out
    pub raw: RawMessage,
    pub booleans: MessageBooleans,
    pub unread: bool,
    pub starred: bool,
    pub collapsed: bool,
    pub historical: bool,
}

pub fn convert_raw_message_to_message_with_booleans(mut raw: RawMessage) -> ConvertedMessage {
    let flags = raw.flags.take().unwrap_or_default();

    ConvertedMessage {
        booleans: MessageBooleans::from_flags(&flags),
        unread: !flags.contains(&MessageFlag::Read),
        starred: flags.contains(&MessageFlag::Starred),
        collapsed: flags.contains(&MessageFlag::Collapsed),
        historical: flags.contains(&MessageFlag::Historical),
        raw,
    }
}
