/// Error types for the message store
use crate::types::{MessageId, UserId};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Unknown user_id in {context}: {user_id}")]
    UnknownUser {
        user_id: UserId,
        context: &'static str,
    },

    #[error("Message {id} is missing required field `{field}`")]
    MissingField { id: MessageId, field: &'static str },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;
