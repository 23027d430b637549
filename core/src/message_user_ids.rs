/// Every user id seen as a participant in a processed message
use crate::types::UserId;
use std::collections::BTreeSet;

#[derive(Debug, Default)]
pub struct MessageUserIds {
    user_ids: BTreeSet<UserId>,
}

impl MessageUserIds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_user_id(&mut self, user_id: UserId) {
        self.user_ids.insert(user_id);
    }

    pub fn contains(&self, user_id: UserId) -> bool {
        self.user_ids.contains(&user_id)
    }

    /// Ascending
    pub fn user_ids(&self) -> Vec<UserId> {
        self.user_ids.iter().copied().collect()
    }

    pub fn clear(&mut self) {
        self.user_ids.clear();
    }
}
