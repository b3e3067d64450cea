use chrono::{DateTime, Duration, Utc};

use crate::clock::parse_time;
use crate::directory::MemberDirectory;

pub const DEFAULT_EDITABLE_MINUTES: i64 = 5;

/// How long after creation an author may still edit a topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EditWindow {
    minutes: i64,
}

impl EditWindow {
    pub fn new(minutes: i64) -> Self {
        Self { minutes }
    }

    pub fn minutes(&self) -> i64 {
        self.minutes
    }

    /// Moderators (global or of `node_id`) may always edit. Authors may edit
    /// up to and including `minutes` after `created_time`. An unparsable
    /// creation time closes the window.
    pub fn is_editable(
        &self,
        directory: &dyn MemberDirectory,
        member: &str,
        author: &str,
        node_id: &str,
        created_time: &str,
        now: DateTime<Utc>,
    ) -> bool {
        if directory.is_moderator(member) || directory.is_node_moderator(member, node_id) {
            return true;
        }
        if member != author {
            return false;
        }

        let Some(created) = parse_time(created_time) else {
            tracing::warn!("Unparsable topic creation time: {:?}", created_time);
            return false;
        };

        match Duration::try_minutes(self.minutes) {
            Some(window) => now.signed_duration_since(created) <= window,
            // Too large to represent: the window never closes.
            None => self.minutes > 0,
        }
    }
}

impl Default for EditWindow {
    fn default() -> Self {
        Self::new(DEFAULT_EDITABLE_MINUTES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::format_time;
    use crate::directory::StaticDirectory;
    use chrono::TimeZone;

    fn created_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2020, 8, 1, 4, 0, 0).unwrap()
    }

    #[test]
    fn author_edits_until_window_closes() {
        let window = EditWindow::new(5);
        let dir = StaticDirectory::new();
        let created = format_time(created_at());

        let at_limit = created_at() + Duration::minutes(5);
        let past_limit = at_limit + Duration::seconds(1);

        assert!(window.is_editable(&dir, "alice", "alice", "rust", &created, created_at()));
        assert!(window.is_editable(&dir, "alice", "alice", "rust", &created, at_limit));
        assert!(!window.is_editable(&dir, "alice", "alice", "rust", &created, past_limit));
    }

    #[test]
    fn other_members_cannot_edit() {
        let window = EditWindow::default();
        let dir = StaticDirectory::new();
        let created = format_time(created_at());

        assert!(!window.is_editable(&dir, "bob", "alice", "rust", &created, created_at()));
    }

    #[test]
    fn moderators_ignore_the_window() {
        let window = EditWindow::new(5);
        let dir = StaticDirectory::new()
            .with_moderator("admin")
            .with_node_moderator("carol", "rust");
        let created = format_time(created_at());
        let much_later = created_at() + Duration::days(400);

        assert!(window.is_editable(&dir, "admin", "alice", "rust", &created, much_later));
        assert!(window.is_editable(&dir, "carol", "alice", "rust", &created, much_later));
        assert!(!window.is_editable(&dir, "carol", "alice", "go", &created, much_later));
        assert!(window.is_editable(&dir, "admin", "alice", "rust", "garbage", much_later));
    }

    #[test]
    fn oversized_windows_do_not_overflow() {
        let dir = StaticDirectory::new();
        let created = format_time(created_at());
        let much_later = created_at() + Duration::days(10_000);

        assert!(EditWindow::new(i64::MAX).is_editable(
            &dir, "alice", "alice", "rust", &created, much_later
        ));
        assert!(!EditWindow::new(i64::MIN).is_editable(
            &dir, "alice", "alice", "rust", &created, created_at()
        ));
    }

    #[test]
    fn out_of_range_creation_time_is_not_editable() {
        let window = EditWindow::new(5);
        let dir = StaticDirectory::new();

        assert!(!window.is_editable(
            &dir,
            "alice",
            "alice",
            "rust",
            "-262143-01-01T00:00:00+08:00",
            created_at()
        ));
    }

    #[test]
    fn malformed_creation_time_is_not_editable() {
        let window = EditWindow::new(5);
        let dir = StaticDirectory::new();

        assert!(!window.is_editable(&dir, "alice", "alice", "rust", "", created_at()));
        assert!(!window.is_editable(
            &dir,
            "alice",
            "alice",
            "rust",
            "2020-08-01 12:00:00",
            created_at()
        ));
    }
}
