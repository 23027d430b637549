/// Messages sent locally whose server id is not confirmed yet
use crate::types::{MessageId, MessageRef};
use std::collections::HashMap;

#[derive(Default)]
pub struct EchoCache {
    messages: HashMap<MessageId, MessageRef>,
}

impl EchoCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn update_message_cache(&mut self, message: MessageRef) {
        let id = message.borrow().id;
        self.messages.insert(id, message);
    }

    pub fn get_cached_message(&self, id: MessageId) -> Option<MessageRef> {
        self.messages.get(&id).cloned()
    }

    /// Re-key a local echo under its confirmed id
    pub fn reify(&mut self, old_id: MessageId, new_id: MessageId) -> Option<MessageRef> {
        let message = self.messages.remove(&old_id)?;
        message.borrow_mut().id = new_id;
        self.messages.insert(new_id, message.clone());
        Some(message)
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }
}
