/// Session-wide message store
///
/// Owns the id index, the local-echo cache, the participant set and the
/// collaborator hooks. Created once per session and handed by reference to
/// whatever needs it; `clear` resets it between sessions and tests.
use crate::collaborators::Collaborators;
use crate::echo_cache::EchoCache;
use crate::error::Result;
use crate::message_index::MessageIndex;
use crate::message_user_ids::MessageUserIds;
use crate::people::{PmParticipants, UserDirectory};
use crate::recipients;
use crate::types::{Conversation, MessageId, MessageRef, StreamId, UserId};
use tracing::{debug, info};

/// A local echo's temporary id and the id the server confirmed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageIdChange {
    pub old_id: MessageId,
    pub new_id: MessageId,
}

/// Field changes that fan out to every stored message they apply to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageProperty {
    SenderFullName { user_id: UserId, full_name: String },
    SmallAvatarUrl { user_id: UserId, url: String },
    StreamName { stream_id: StreamId, name: String },
}

pub struct MessageStore {
    pub(crate) directory: Box<dyn UserDirectory>,
    pub(crate) index: MessageIndex,
    pub(crate) echo_cache: EchoCache,
    pub(crate) user_ids: MessageUserIds,
    pub(crate) collaborators: Collaborators,
}

impl MessageStore {
    pub fn new(directory: impl UserDirectory + 'static, collaborators: Collaborators) -> Self {
        Self {
            directory: Box::new(directory),
            index: MessageIndex::new(),
            echo_cache: EchoCache::new(),
            user_ids: MessageUserIds::new(),
            collaborators,
        }
    }

    pub fn directory(&self) -> &dyn UserDirectory {
        self.directory.as_ref()
    }

    pub fn current_user_id(&self) -> UserId {
        self.directory.current_user_id()
    }

    pub fn get(&self, id: MessageId) -> Option<MessageRef> {
        self.index.get(id)
    }

    pub fn remove(&mut self, ids: &[MessageId]) {
        self.index.remove(ids);
        debug!("Removed up to {} messages", ids.len());
    }

    pub fn get_message_ids_in_stream(&self, stream_id: StreamId) -> Vec<MessageId> {
        self.index.get_message_ids_in_stream(stream_id)
    }

    /// Every stored message, ascending by id
    pub fn all_messages(&self) -> Vec<MessageRef> {
        self.index.all()
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn message_user_ids(&self) -> &MessageUserIds {
        &self.user_ids
    }

    pub fn update_message_cache(&mut self, message: MessageRef) {
        self.echo_cache.update_message_cache(message);
    }

    pub fn get_cached_message(&self, id: MessageId) -> Option<MessageRef> {
        self.echo_cache.get_cached_message(id)
    }

    /// Re-key a locally echoed message under its server id.
    ///
    /// The caller must only reify ids it knows are present.
    pub fn reify_message_id(&mut self, change: MessageIdChange) {
        let MessageIdChange { old_id, new_id } = change;
        let in_cache = self.echo_cache.reify(old_id, new_id).is_some();
        let in_index = self.index.reify(old_id, new_id).is_some();
        debug!(
            in_cache,
            in_index, "Reified local message {} as {}", old_id, new_id
        );
    }

    pub fn update_sender_full_name(&mut self, user_id: UserId, full_name: &str) {
        let mut touched = 0;
        for message in self.index.values() {
            let mut message = message.borrow_mut();
            if message.sender_id == user_id {
                message.sender_full_name = full_name.to_string();
                touched += 1;
            }
        }
        debug!("Renamed sender {} on {} messages", user_id, touched);
    }

    pub fn update_small_avatar_url(&mut self, user_id: UserId, url: &str) {
        let mut touched = 0;
        for message in self.index.values() {
            let mut message = message.borrow_mut();
            if message.sender_id == user_id {
                message.small_avatar_url = Some(url.to_string());
                touched += 1;
            }
        }
        debug!("Updated avatar of {} on {} messages", user_id, touched);
    }

    /// Rename a channel on its stored messages; the channel index is keyed by
    /// id and stays as is.
    pub fn update_stream_name(&mut self, stream_id: StreamId, name: &str) {
        let mut touched = 0;
        for message in self.index.values() {
            let mut message = message.borrow_mut();
            if let Conversation::Stream {
                stream_id: id,
                stream,
                display_recipient,
                ..
            } = &mut message.conversation
            {
                if *id == Some(stream_id) {
                    *stream = name.to_string();
                    *display_recipient = name.to_string();
                    touched += 1;
                }
            }
        }
        debug!("Renamed stream {} on {} messages", stream_id, touched);
    }

    pub fn update_property(&mut self, property: MessageProperty) {
        match property {
            MessageProperty::SenderFullName { user_id, full_name } => {
                self.update_sender_full_name(user_id, &full_name)
            }
            MessageProperty::SmallAvatarUrl { user_id, url } => {
                self.update_small_avatar_url(user_id, &url)
            }
            MessageProperty::StreamName { stream_id, name } => {
                self.update_stream_name(stream_id, &name)
            }
        }
    }

    /// See [`recipients::get_pm_emails`]
    pub fn get_pm_emails(&self, message: &impl PmParticipants) -> String {
        recipients::get_pm_emails(self.directory(), message)
    }

    /// See [`recipients::get_pm_full_names`]
    pub fn get_pm_full_names(&self, user_ids: &[UserId]) -> Result<String> {
        recipients::get_pm_full_names(self.directory(), user_ids)
    }

    /// Drop every message and participant id
    pub fn clear(&mut self) {
        self.index.clear();
        self.echo_cache.clear();
        self.user_ids.clear();
        info!("Message store cleared");
    }
}
