/// User directory: resolves user ids to profiles
use crate::error::{Result, StoreError};
use crate::types::{Conversation, DisplayRecipient, Message, MessageId, RawMessage, UserId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::{debug, error};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub user_id: UserId,
    pub email: String,
    pub full_name: String,
}

/// Lookup surface the store needs from the user directory
pub trait UserDirectory {
    /// Resolve `user_id`, failing hard when it was never registered.
    fn get_by_user_id(&self, user_id: UserId) -> Result<&Person>;

    /// Resolve `user_id`, logging instead of failing on a miss.
    fn maybe_get_user_by_id(&self, user_id: UserId) -> Option<&Person>;

    fn current_user_id(&self) -> UserId;
}

/// In-memory directory of active users
#[derive(Debug, Clone)]
pub struct People {
    by_id: HashMap<UserId, Person>,
    current_user_id: UserId,
}

impl People {
    pub fn new(current_user_id: UserId) -> Self {
        Self {
            by_id: HashMap::new(),
            current_user_id,
        }
    }

    /// Load a JSON array of people from disk
    pub fn from_file(path: &Path, current_user_id: UserId) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let persons: Vec<Person> = serde_json::from_str(&raw)?;

        let mut people = Self::new(current_user_id);
        for person in persons {
            people.add_active_user(person);
        }
        debug!("Loaded {} people from {:?}", people.len(), path);
        Ok(people)
    }

    pub fn add_active_user(&mut self, person: Person) {
        self.by_id.insert(person.user_id, person);
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

impl UserDirectory for People {
    fn get_by_user_id(&self, user_id: UserId) -> Result<&Person> {
        self.by_id.get(&user_id).ok_or(StoreError::UnknownUser {
            user_id,
            context: "get_by_user_id",
        })
    }

    fn maybe_get_user_by_id(&self, user_id: UserId) -> Option<&Person> {
        let person = self.by_id.get(&user_id);
        if person.is_none() {
            error!(user_id, "Unknown user_id in maybe_get_user_by_id");
        }
        person
    }

    fn current_user_id(&self) -> UserId {
        self.current_user_id
    }
}

/// Either form of a message whose private participants can be listed
pub trait PmParticipants {
    fn message_id(&self) -> MessageId;

    /// Every participant id as delivered, `None` unless private
    fn participant_ids(&self) -> Option<Vec<UserId>>;
}

impl PmParticipants for RawMessage {
    fn message_id(&self) -> MessageId {
        self.id
    }

    fn participant_ids(&self) -> Option<Vec<UserId>> {
        if !self.is_private() {
            return None;
        }
        match &self.display_recipient {
            Some(DisplayRecipient::Private(recipients)) => {
                Some(recipients.iter().map(|r| r.id).collect())
            }
            _ => None,
        }
    }
}

impl PmParticipants for Message {
    fn message_id(&self) -> MessageId {
        self.id
    }

    fn participant_ids(&self) -> Option<Vec<UserId>> {
        match &self.conversation {
            Conversation::Private {
                display_recipient, ..
            } => Some(display_recipient.iter().map(|r| r.id).collect()),
            Conversation::Stream { .. } => None,
        }
    }
}

/// Participant ids of a private message other than `me`, ascending.
///
/// A conversation with only yourself yields `[me]`. Returns `None` for
/// anything that is not a private message.
pub fn pm_with_user_ids(message: &impl PmParticipants, me: UserId) -> Option<Vec<UserId>> {
    message
        .participant_ids()
        .map(|ids| sorted_other_user_ids(ids, me))
}

pub fn sorted_other_user_ids(user_ids: impl IntoIterator<Item = UserId>, me: UserId) -> Vec<UserId> {
    let mut ids: Vec<UserId> = user_ids.into_iter().collect();
    ids.sort_unstable();
    ids.dedup();

    let others: Vec<UserId> = ids.iter().copied().filter(|id| *id != me).collect();
    if others.is_empty() && !ids.is_empty() {
        vec![me]
    } else {
        others
    }
}

/// Comma-joined form of `pm_with_user_ids`, e.g. `"103,104"`
pub fn pm_reply_user_string(message: &impl PmParticipants, me: UserId) -> Option<String> {
    pm_with_user_ids(message, me).map(|ids| join_ids(&ids))
}

pub fn join_ids(ids: &[UserId]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(",")
}
