/// Primary id → message map plus the per-channel id index
use crate::types::{MessageId, MessageRef, StreamId};
use std::collections::{BTreeSet, HashMap};
use tracing::debug;

#[derive(Default)]
pub struct MessageIndex {
    messages: HashMap<MessageId, MessageRef>,
    stream_ids: HashMap<StreamId, BTreeSet<MessageId>>,
}

impl MessageIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or overwrite the entry keyed by the message's own id
    pub fn insert(&mut self, message: MessageRef) {
        let (id, stream_id) = {
            let m = message.borrow();
            (m.id, m.stream_id())
        };

        if let Some(previous) = self.messages.insert(id, message) {
            let previous_stream = previous.borrow().stream_id();
            if let Some(old) = previous_stream {
                self.unindex_stream(old, id);
            }
        }
        if let Some(stream_id) = stream_id {
            self.stream_ids.entry(stream_id).or_default().insert(id);
        }
    }

    pub fn get(&self, id: MessageId) -> Option<MessageRef> {
        self.messages.get(&id).cloned()
    }

    pub fn contains(&self, id: MessageId) -> bool {
        self.messages.contains_key(&id)
    }

    /// Drop every listed id; ids we never saw are ignored
    pub fn remove(&mut self, ids: &[MessageId]) {
        for id in ids {
            let Some(message) = self.messages.remove(id) else {
                continue;
            };
            let stream_id = message.borrow().stream_id();
            if let Some(stream_id) = stream_id {
                self.unindex_stream(stream_id, *id);
            }
        }
    }

    /// Ids stored for a channel, ascending
    pub fn get_message_ids_in_stream(&self, stream_id: StreamId) -> Vec<MessageId> {
        self.stream_ids
            .get(&stream_id)
            .map(|ids| ids.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Move the entry at `old_id` to `new_id`, keeping the same object.
    ///
    /// Returns the moved message, or `None` if `old_id` was not stored.
    pub fn reify(&mut self, old_id: MessageId, new_id: MessageId) -> Option<MessageRef> {
        let message = self.messages.remove(&old_id)?;
        let stream_id = message.borrow().stream_id();
        if let Some(stream_id) = stream_id {
            self.unindex_stream(stream_id, old_id);
        }

        message.borrow_mut().id = new_id;
        self.insert(message.clone());
        debug!("Reified message {} as {}", old_id, new_id);
        Some(message)
    }

    /// Every stored message, ascending by id
    pub fn all(&self) -> Vec<MessageRef> {
        let mut ids: Vec<MessageId> = self.messages.keys().copied().collect();
        ids.sort_unstable();
        ids.iter()
            .filter_map(|id| self.messages.get(id).cloned())
            .collect()
    }

    pub fn values(&self) -> impl Iterator<Item = &MessageRef> {
        self.messages.values()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
        self.stream_ids.clear();
    }

    fn unindex_stream(&mut self, stream_id: StreamId, id: MessageId) {
        if let Some(ids) = self.stream_ids.get_mut(&stream_id) {
            ids.remove(&id);
            if ids.is_empty() {
                self.stream_ids.remove(&stream_id);
            }
        }
    }
}
