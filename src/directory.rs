use std::collections::{HashMap, HashSet};

/// Member-side lookups owned by other parts of the forum.
///
/// Implementations are expected to be cheap and infallible; they only
/// report data that already exists elsewhere.
pub trait MemberDirectory: Send + Sync {
    fn member_avatar(&self, member_id: &str) -> String;

    /// Global moderator (admin) identity.
    fn is_moderator(&self, member_id: &str) -> bool;

    fn is_node_moderator(&self, member_id: &str, node_id: &str) -> bool;

    /// Whether `member_id` already thanked the topic.
    fn topic_thanked(&self, member_id: &str, topic_id: i64) -> bool;
}

/// In-memory directory, filled up front.
#[derive(Debug, Clone, Default)]
pub struct StaticDirectory {
    avatars: HashMap<String, String>,
    moderators: HashSet<String>,
    node_moderators: HashSet<(String, String)>,
    thanks: HashSet<(String, i64)>,
}

impl StaticDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_avatar(mut self, member_id: &str, avatar: &str) -> Self {
        self.avatars.insert(member_id.to_string(), avatar.to_string());
        self
    }

    pub fn with_moderator(mut self, member_id: &str) -> Self {
        self.moderators.insert(member_id.to_string());
        self
    }

    pub fn with_node_moderator(mut self, member_id: &str, node_id: &str) -> Self {
        self.node_moderators
            .insert((member_id.to_string(), node_id.to_string()));
        self
    }

    pub fn with_thanks(mut self, member_id: &str, topic_id: i64) -> Self {
        self.thanks.insert((member_id.to_string(), topic_id));
        self
    }
}

impl MemberDirectory for StaticDirectory {
    fn member_avatar(&self, member_id: &str) -> String {
        self.avatars.get(member_id).cloned().unwrap_or_default()
    }

    fn is_moderator(&self, member_id: &str) -> bool {
        self.moderators.contains(member_id)
    }

    fn is_node_moderator(&self, member_id: &str, node_id: &str) -> bool {
        self.node_moderators
            .contains(&(member_id.to_string(), node_id.to_string()))
    }

    fn topic_thanked(&self, member_id: &str, topic_id: i64) -> bool {
        self.thanks.contains(&(member_id.to_string(), topic_id))
    }
}
