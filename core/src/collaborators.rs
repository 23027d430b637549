/// Trackers notified once per newly stored message
///
/// The store only depends on the traits. The in-memory implementations are
/// what the replay binary and the tests wire in.
use crate::types::{Conversation, Message, MessageId, StreamId, UserId};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use tracing::debug;

pub trait ChannelTopicHistory {
    fn add_message(&mut self, message: &Message);
}

pub trait RecentSenders {
    fn process_stream_message(&mut self, message: &Message);
    fn process_private_message(&mut self, message: &Message);
}

pub trait PmPartnerTracker {
    fn process_message(&mut self, message: &Message);
}

impl<T: ChannelTopicHistory> ChannelTopicHistory for Rc<RefCell<T>> {
    fn add_message(&mut self, message: &Message) {
        self.borrow_mut().add_message(message);
    }
}

impl<T: RecentSenders> RecentSenders for Rc<RefCell<T>> {
    fn process_stream_message(&mut self, message: &Message) {
        self.borrow_mut().process_stream_message(message);
    }

    fn process_private_message(&mut self, message: &Message) {
        self.borrow_mut().process_private_message(message);
    }
}

impl<T: PmPartnerTracker> PmPartnerTracker for Rc<RefCell<T>> {
    fn process_message(&mut self, message: &Message) {
        self.borrow_mut().process_message(message);
    }
}

/// The three trackers, in notification order
pub struct Collaborators {
    pub topic_history: Box<dyn ChannelTopicHistory>,
    pub recent_senders: Box<dyn RecentSenders>,
    pub pm_partners: Box<dyn PmPartnerTracker>,
}

impl Collaborators {
    pub fn new(
        topic_history: impl ChannelTopicHistory + 'static,
        recent_senders: impl RecentSenders + 'static,
        pm_partners: impl PmPartnerTracker + 'static,
    ) -> Self {
        Self {
            topic_history: Box::new(topic_history),
            recent_senders: Box::new(recent_senders),
            pm_partners: Box::new(pm_partners),
        }
    }

    pub(crate) fn notify(&mut self, message: &Message) {
        if message.is_stream() {
            self.topic_history.add_message(message);
            self.recent_senders.process_stream_message(message);
        } else {
            self.recent_senders.process_private_message(message);
            self.pm_partners.process_message(message);
        }
    }
}

impl Default for Collaborators {
    fn default() -> Self {
        Self::new(
            StreamTopicHistory::default(),
            RecentSendersIndex::default(),
            PmConversations::default(),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicHistoryEntry {
    /// Name as last seen, original casing
    pub topic_name: String,
    pub message_id: MessageId,
}

/// Channel id → topics seen in it
#[derive(Debug, Default)]
pub struct StreamTopicHistory {
    streams: HashMap<StreamId, HashMap<String, TopicHistoryEntry>>,
}

impl StreamTopicHistory {
    /// Topic names for a channel, most recently active first
    pub fn get_recent_topic_names(&self, stream_id: StreamId) -> Vec<String> {
        let Some(topics) = self.streams.get(&stream_id) else {
            return Vec::new();
        };
        let mut entries: Vec<&TopicHistoryEntry> = topics.values().collect();
        entries.sort_by(|a, b| b.message_id.cmp(&a.message_id));
        entries.into_iter().map(|e| e.topic_name.clone()).collect()
    }
}

impl ChannelTopicHistory for StreamTopicHistory {
    fn add_message(&mut self, message: &Message) {
        let Conversation::Stream {
            stream_id: Some(stream_id),
            topic,
            ..
        } = &message.conversation
        else {
            return;
        };

        // Topics are case-insensitive; keep the newest spelling.
        let entry = self
            .streams
            .entry(*stream_id)
            .or_default()
            .entry(topic.to_lowercase())
            .or_insert_with(|| TopicHistoryEntry {
                topic_name: topic.clone(),
                message_id: message.id,
            });
        if message.id >= entry.message_id {
            entry.message_id = message.id;
            entry.topic_name = topic.clone();
        }
    }
}

/// Most recent message id per sender, per topic and per conversation
#[derive(Debug, Default)]
pub struct RecentSendersIndex {
    topics: HashMap<(StreamId, String), HashMap<UserId, MessageId>>,
    conversations: HashMap<String, HashMap<UserId, MessageId>>,
}

impl RecentSendersIndex {
    pub fn get_topic_recent_senders(&self, stream_id: StreamId, topic: &str) -> Vec<UserId> {
        Self::by_recency(self.topics.get(&(stream_id, topic.to_lowercase())))
    }

    pub fn get_pm_recent_senders(&self, to_user_ids: &str) -> Vec<UserId> {
        Self::by_recency(self.conversations.get(to_user_ids))
    }

    fn by_recency(senders: Option<&HashMap<UserId, MessageId>>) -> Vec<UserId> {
        let Some(senders) = senders else {
            return Vec::new();
        };
        let mut entries: Vec<(UserId, MessageId)> =
            senders.iter().map(|(u, m)| (*u, *m)).collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1));
        entries.into_iter().map(|(user_id, _)| user_id).collect()
    }

    fn bump(senders: &mut HashMap<UserId, MessageId>, sender_id: UserId, message_id: MessageId) {
        let latest = senders.entry(sender_id).or_insert(message_id);
        *latest = (*latest).max(message_id);
    }
}

impl RecentSenders for RecentSendersIndex {
    fn process_stream_message(&mut self, message: &Message) {
        let Conversation::Stream {
            stream_id: Some(stream_id),
            topic,
            ..
        } = &message.conversation
        else {
            return;
        };
        let senders = self
            .topics
            .entry((*stream_id, topic.to_lowercase()))
            .or_default();
        Self::bump(senders, message.sender_id, message.id);
    }

    fn process_private_message(&mut self, message: &Message) {
        let Some(to_user_ids) = message.to_user_ids() else {
            return;
        };
        let senders = self
            .conversations
            .entry(to_user_ids.to_string())
            .or_default();
        Self::bump(senders, message.sender_id, message.id);
    }
}

/// Private-conversation partners keyed by their `to_user_ids` string
#[derive(Debug, Default)]
pub struct PmConversations {
    partners: HashMap<String, MessageId>,
}

impl PmConversations {
    pub fn set_partner(&mut self, user_ids_string: &str, message_id: MessageId) {
        let latest = self
            .partners
            .entry(user_ids_string.to_string())
            .or_insert(message_id);
        *latest = (*latest).max(message_id);
    }

    pub fn is_partner(&self, user_id: UserId) -> bool {
        let needle = user_id.to_string();
        self.partners
            .keys()
            .any(|key| key.split(',').any(|id| id == needle))
    }

    /// Conversations, most recent first
    pub fn recent(&self) -> Vec<(String, MessageId)> {
        let mut out: Vec<(String, MessageId)> = self
            .partners
            .iter()
            .map(|(k, v)| (k.clone(), *v))
            .collect();
        out.sort_by(|a, b| b.1.cmp(&a.1));
        out
    }

    pub fn len(&self) -> usize {
        self.partners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.partners.is_empty()
    }
}

impl PmPartnerTracker for PmConversations {
    fn process_message(&mut self, message: &Message) {
        if !message.is_private() {
            return;
        }
        let Some(to_user_ids) = message.to_user_ids() else {
            return;
        };
        debug!("Tracking private conversation {}", to_user_ids);
        self.set_partner(to_user_ids, message.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message_index::tests::message;

    /// Appends a tag per hook call to a shared log
    #[derive(Clone, Default)]
    struct Recorder {
        log: Rc<RefCell<Vec<&'static str>>>,
    }

    impl ChannelTopicHistory for Recorder {
        fn add_message(&mut self, _message: &Message) {
            self.log.borrow_mut().push("topic_history");
        }
    }

    impl RecentSenders for Recorder {
        fn process_stream_message(&mut self, _message: &Message) {
            self.log.borrow_mut().push("recent_senders.stream");
        }

        fn process_private_message(&mut self, _message: &Message) {
            self.log.borrow_mut().push("recent_senders.private");
        }
    }

    impl PmPartnerTracker for Recorder {
        fn process_message(&mut self, _message: &Message) {
            self.log.borrow_mut().push("pm_partners");
        }
    }

    #[test]
    fn test_notification_order() {
        let recorder = Recorder::default();
        let mut collaborators =
            Collaborators::new(recorder.clone(), recorder.clone(), recorder.clone());

        collaborators.notify(&message(100, Some(21)).borrow());
        assert_eq!(
            recorder.log.take(),
            vec!["topic_history", "recent_senders.stream"]
        );

        collaborators.notify(&message(101, None).borrow());
        assert_eq!(
            recorder.log.take(),
            vec!["recent_senders.private", "pm_partners"]
        );
    }

    #[test]
    fn test_pm_partners_skip_stream_messages() {
        let mut tracker = PmConversations::default();

        tracker.process_message(&message(100, Some(21)).borrow());
        assert!(tracker.is_empty());

        tracker.process_message(&message(101, None).borrow());
        assert_eq!(tracker.recent(), vec![("103".to_string(), 101)]);
        assert!(tracker.is_partner(103));
        assert!(!tracker.is_partner(10));
    }

    #[test]
    fn test_topic_history_case_insensitive() {
        let mut history = StreamTopicHistory::default();

        let first = message(100, Some(21));
        let second = message(105, Some(21));
        if let Conversation::Stream { topic, .. } = &mut second.borrow_mut().conversation {
            *topic = "Test".to_string();
        }
        let other = message(103, Some(21));
        if let Conversation::Stream { topic, .. } = &mut other.borrow_mut().conversation {
            *topic = "lunch".to_string();
        }

        history.add_message(&first.borrow());
        history.add_message(&second.borrow());
        history.add_message(&other.borrow());

        assert_eq!(
            history.get_recent_topic_names(21),
            vec!["Test".to_string(), "lunch".to_string()]
        );
        assert!(history.get_recent_topic_names(20).is_empty());
    }

    #[test]
    fn test_recent_senders_order() {
        let mut senders = RecentSendersIndex::default();

        let older = message(100, Some(21));
        let newer = message(102, Some(21));
        newer.borrow_mut().sender_id = 104;

        senders.process_stream_message(&older.borrow());
        senders.process_stream_message(&newer.borrow());
        senders.process_private_message(&message(101, None).borrow());

        assert_eq!(senders.get_topic_recent_senders(21, "TEST"), vec![104, 102]);
        assert_eq!(senders.get_pm_recent_senders("103"), vec![102]);
    }
}
