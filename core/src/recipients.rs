/// Reply-target strings for private messages
use crate::error::Result;
use crate::people::{pm_with_user_ids, PmParticipants, UserDirectory};
use crate::types::UserId;
use tracing::error;

/// Placeholder shown when a participant can no longer be resolved
pub const UNKNOWN_RECIPIENT: &str = "?";

/// Comma-joined emails of the other participants, ascending by user id.
///
/// Never fails: a stale or deleted user id is logged and the whole list
/// degrades to `"?"` so rendering keeps working. Accepts a raw payload
/// during intake as well as an already stored message.
pub fn get_pm_emails(directory: &dyn UserDirectory, message: &impl PmParticipants) -> String {
    let user_ids = pm_with_user_ids(message, directory.current_user_id()).unwrap_or_default();

    let mut emails = Vec::with_capacity(user_ids.len());
    for user_id in user_ids {
        match directory.maybe_get_user_by_id(user_id) {
            Some(person) => emails.push(person.email.clone()),
            None => {
                error!(user_id, message_id = message.message_id(), "Unknown user id");
                return UNKNOWN_RECIPIENT.to_string();
            }
        }
    }
    emails.join(",")
}

/// Comma-space-joined full names for `user_ids`, in the order given.
pub fn get_pm_full_names(directory: &dyn UserDirectory, user_ids: &[UserId]) -> Result<String> {
    let names = user_ids
        .iter()
        .map(|id| directory.get_by_user_id(*id).map(|p| p.full_name.clone()))
        .collect::<Result<Vec<_>>>()?;
    Ok(names.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::people::{People, Person};
    use crate::types::{DisplayRecipient, MessageType, RawMessage, Recipient};
    use tracing_test::traced_test;

    fn people() -> People {
        let mut people = People::new(101);
        for (user_id, email, full_name) in [
            (101, "me@example.com", "Me Myself"),
            (103, "bob@example.com", "Bob"),
            (104, "cindy@example.com", "Cindy"),
        ] {
            people.add_active_user(Person {
                user_id,
                email: email.to_string(),
                full_name: full_name.to_string(),
            });
        }
        people
    }

    fn private_to(ids: &[UserId]) -> RawMessage {
        RawMessage {
            id: 7,
            kind: Some(MessageType::Private),
            display_recipient: Some(DisplayRecipient::Private(
                ids.iter()
                    .map(|id| Recipient {
                        id: *id,
                        email: String::new(),
                        full_name: String::new(),
                    })
                    .collect(),
            )),
            ..Default::default()
        }
    }

    #[test]
    fn test_emails_and_names_share_order() {
        let people = people();
        let message = private_to(&[104, 101, 103]);

        assert_eq!(
            get_pm_emails(&people, &message),
            "bob@example.com,cindy@example.com"
        );
        assert_eq!(get_pm_full_names(&people, &[103, 104]).unwrap(), "Bob, Cindy");
    }

    #[traced_test]
    #[test]
    fn test_unknown_user_soft_and_hard() {
        let people = people();
        let message = private_to(&[92714]);

        assert_eq!(get_pm_emails(&people, &message), "?");
        assert!(logs_contain("Unknown user id"));
        assert!(logs_contain("92714"));

        let ids = pm_with_user_ids(&message, 101).unwrap();
        let err = get_pm_full_names(&people, &ids).unwrap_err();
        assert!(matches!(
            err,
            StoreError::UnknownUser {
                user_id: 92714,
                ..
            }
        ));
        assert_eq!(err.to_string(), "Unknown user_id in get_by_user_id: 92714");
    }

    #[test]
    fn test_emails_for_stream_message_empty() {
        let people = people();
        let message = RawMessage {
            kind: Some(MessageType::Stream),
            ..Default::default()
        };
        assert_eq!(get_pm_emails(&people, &message), "");
    }
}
