/// Message normalization and indexing store
///
/// Ingests raw chat messages, derives their presentation and notification
/// fields once, and keeps shared message handles indexed by id and channel.

pub mod error;
pub mod config;
pub mod types;
pub mod flags;
pub mod people;
pub mod recipients;
pub mod message_index;
pub mod echo_cache;
pub mod message_user_ids;
pub mod collaborators;
pub mod message_store;
pub mod message_helper;

pub use error::{Result, StoreError};
pub use config::StoreConfig;
pub use flags::{
    convert_raw_message_to_message_with_booleans, update_booleans, MessageBooleans, MessageFlag,
};
pub use message_store::{MessageIdChange, MessageProperty, MessageStore};
pub use people::{People, Person, PmParticipants, UserDirectory};
pub use types::{Message, MessageId, MessageRef, RawMessage, StreamId, UserId};
