/// Intake: turn raw wire messages into stored, fully derived messages
use crate::error::{Result, StoreError};
use crate::flags::convert_raw_message_to_message_with_booleans;
use crate::message_store::MessageStore;
use crate::people::{join_ids, pm_with_user_ids};
use crate::recipients::{get_pm_emails, get_pm_full_names};
use crate::types::{Conversation, DisplayRecipient, Message, MessageRef, MessageType, RawMessage};
use tracing::debug;

impl MessageStore {
    /// Store `raw` and return the shared message for its id.
    ///
    /// A message we already hold is never rebuilt: only the search snippets
    /// are copied onto it and the existing object is returned. Fails only if
    /// a participant's full name cannot be resolved, or a new message lacks
    /// a field needed to classify it.
    pub fn process_new_message(&mut self, raw: RawMessage) -> Result<MessageRef> {
        if let Some(existing) = self.index.get(raw.id) {
            if raw.match_subject.is_some() {
                let mut message = existing.borrow_mut();
                message.match_subject = raw.match_subject;
                message.match_content = raw.match_content;
                debug!("Merged search snippets into message {}", raw.id);
            }
            return Ok(existing);
        }

        let message = self.build_message(raw)?.into_ref();
        self.index.insert(message.clone());
        self.collaborators.notify(&message.borrow());
        Ok(message)
    }

    fn build_message(&mut self, raw: RawMessage) -> Result<Message> {
        let id = raw.id;
        let me = self.current_user_id();
        let kind = raw.kind.ok_or(StoreError::MissingField { id, field: "type" })?;
        let sender_id = raw.sender_id.ok_or(StoreError::MissingField {
            id,
            field: "sender_id",
        })?;

        let sender = self.directory.get_by_user_id(sender_id).ok();
        let sender_email = raw
            .sender_email
            .clone()
            .or_else(|| sender.map(|p| p.email.clone()))
            .unwrap_or_default();
        let sender_full_name = raw
            .sender_full_name
            .clone()
            .or_else(|| sender.map(|p| p.full_name.clone()))
            .unwrap_or_default();

        let (conversation, reply_to) = match kind {
            MessageType::Private => {
                let Some(DisplayRecipient::Private(recipients)) = &raw.display_recipient else {
                    return Err(StoreError::MissingField {
                        id,
                        field: "display_recipient",
                    });
                };
                let recipients = recipients.clone();
                let user_ids = pm_with_user_ids(&raw, me).unwrap_or_default();

                let display_reply_to = get_pm_full_names(self.directory.as_ref(), &user_ids)?;
                let reply_to = get_pm_emails(self.directory.as_ref(), &raw);

                for recipient in &recipients {
                    self.user_ids.add_user_id(recipient.id);
                }

                (
                    Conversation::Private {
                        display_recipient: recipients,
                        to_user_ids: join_ids(&user_ids),
                        display_reply_to,
                    },
                    reply_to,
                )
            }
            MessageType::Stream => {
                let Some(DisplayRecipient::Stream(name)) = &raw.display_recipient else {
                    return Err(StoreError::MissingField {
                        id,
                        field: "display_recipient",
                    });
                };

                (
                    Conversation::Stream {
                        stream_id: raw.stream_id,
                        stream: name.clone(),
                        topic: raw.topic.clone().unwrap_or_default(),
                        display_recipient: name.clone(),
                    },
                    sender_email.clone(),
                )
            }
        };
        self.user_ids.add_user_id(sender_id);

        let converted = convert_raw_message_to_message_with_booleans(raw);
        let raw = converted.raw;

        debug!("New {:?} message {} from {}", kind, id, sender_id);

        Ok(Message {
            id,
            sender_id,
            sender_email,
            sender_full_name,
            small_avatar_url: raw.small_avatar_url,
            content: raw.content.unwrap_or_default(),
            timestamp: raw.timestamp,
            is_me_message: raw.is_me_message,
            is_private: kind == MessageType::Private,
            conversation,
            reply_to,
            sent_by_me: sender_id == me,
            booleans: converted.booleans,
            unread: converted.unread,
            starred: converted.starred,
            collapsed: converted.collapsed,
            historical: converted.historical,
            match_subject: raw.match_subject,
            match_content: raw.match_content,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::{Collaborators, PmConversations, RecentSendersIndex, StreamTopicHistory};
    use crate::people::{People, Person, UserDirectory};
    use crate::types::Recipient;
    use std::cell::RefCell;
    use std::rc::Rc;

    const ME: u64 = 101;

    fn people() -> People {
        let mut people = People::new(ME);
        for (user_id, email, full_name) in [
            (101, "me@example.com", "Me Myself"),
            (102, "alice@example.com", "Alice"),
            (103, "bob@example.com", "Bob"),
            (104, "cindy@example.com", "Cindy"),
            (105, "denise@example.com", "Denise "),
        ] {
            people.add_active_user(Person {
                user_id,
                email: email.to_string(),
                full_name: full_name.to_string(),
            });
        }
        people
    }

    fn recipients(ids: &[u64]) -> DisplayRecipient {
        let people = people();
        DisplayRecipient::Private(
            ids.iter()
                .map(|id| {
                    let p = people.get_by_user_id(*id).unwrap();
                    Recipient {
                        id: p.user_id,
                        email: p.email.clone(),
                        full_name: p.full_name.clone(),
                    }
                })
                .collect(),
        )
    }

    #[test]
    fn test_missing_type_is_rejected() {
        let mut store = MessageStore::new(people(), Collaborators::default());
        let err = store
            .process_new_message(RawMessage {
                id: 9,
                sender_id: Some(ME),
                ..Default::default()
            })
            .unwrap_err();
        assert!(matches!(err, StoreError::MissingField { id: 9, field: "type" }));
        assert!(store.is_empty());
    }

    #[test]
    fn test_unknown_participant_is_not_stored() {
        let mut store = MessageStore::new(people(), Collaborators::default());
        let raw = RawMessage {
            id: 10,
            kind: Some(MessageType::Private),
            sender_id: Some(ME),
            display_recipient: Some(DisplayRecipient::Private(vec![Recipient {
                id: 92714,
                email: String::new(),
                full_name: String::new(),
            }])),
            ..Default::default()
        };

        let err = store.process_new_message(raw).unwrap_err();
        assert_eq!(err.to_string(), "Unknown user_id in get_by_user_id: 92714");
        assert!(store.get(10).is_none());
        assert!(store.message_user_ids().user_ids().is_empty());
    }

    #[test]
    fn test_collaborators_notified_by_kind() {
        let history = Rc::new(RefCell::new(StreamTopicHistory::default()));
        let senders = Rc::new(RefCell::new(RecentSendersIndex::default()));
        let partners = Rc::new(RefCell::new(PmConversations::default()));
        let mut store = MessageStore::new(
            people(),
            Collaborators::new(history.clone(), senders.clone(), partners.clone()),
        );

        store
            .process_new_message(RawMessage {
                id: 100,
                kind: Some(MessageType::Stream),
                sender_id: Some(102),
                stream_id: Some(21),
                topic: Some("test".to_string()),
                display_recipient: Some(DisplayRecipient::Stream("Devel".to_string())),
                ..Default::default()
            })
            .unwrap();
        store
            .process_new_message(RawMessage {
                id: 101,
                kind: Some(MessageType::Private),
                sender_id: Some(ME),
                display_recipient: Some(recipients(&[ME, 103, 104])),
                ..Default::default()
            })
            .unwrap();
        // Second sighting must not notify again.
        store
            .process_new_message(RawMessage {
                id: 100,
                ..Default::default()
            })
            .unwrap();

        assert_eq!(history.borrow().get_recent_topic_names(21), vec!["test"]);
        assert_eq!(senders.borrow().get_topic_recent_senders(21, "test"), vec![102]);
        assert_eq!(senders.borrow().get_pm_recent_senders("103,104"), vec![ME]);
        assert_eq!(partners.borrow().recent(), vec![("103,104".to_string(), 101)]);
    }

    #[test]
    fn test_note_to_self() {
        let mut store = MessageStore::new(people(), Collaborators::default());
        let message = store
            .process_new_message(RawMessage {
                id: 3,
                kind: Some(MessageType::Private),
                sender_id: Some(ME),
                display_recipient: Some(recipients(&[ME])),
                flags: Some(vec!["read".into()]),
                ..Default::default()
            })
            .unwrap();

        let message = message.borrow();
        assert_eq!(message.to_user_ids(), Some("101"));
        assert_eq!(message.reply_to, "me@example.com");
        assert_eq!(message.display_reply_to(), Some("Me Myself"));
        assert!(message.sent_by_me);
        assert!(!message.unread);
    }

    #[test]
    fn test_sender_fields_fall_back_to_directory() {
        let mut store = MessageStore::new(people(), Collaborators::default());
        let message = store
            .process_new_message(RawMessage {
                id: 4,
                kind: Some(MessageType::Stream),
                sender_id: Some(105),
                stream_id: Some(20),
                display_recipient: Some(DisplayRecipient::Stream("Denmark".to_string())),
                ..Default::default()
            })
            .unwrap();

        let message = message.borrow();
        assert_eq!(message.sender_email, "denise@example.com");
        assert_eq!(message.sender_full_name, "Denise ");
        assert_eq!(message.reply_to, "denise@example.com");
        assert_eq!(message.topic(), Some(""));
        assert!(!message.sent_by_me);
        assert!(message.unread);
    }
}
