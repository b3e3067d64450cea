use rusqlite::params;

use crate::clock::current_time;
use crate::error::Result;
use crate::models::{PinScope, Topic};

use super::Repository;

impl Repository {
    /// Set one pin timer; `date` is a forum time string or empty to unpin.
    pub async fn change_topic_top_expired_time(
        &self,
        id: i64,
        date: &str,
        scope: PinScope,
    ) -> Result<bool> {
        let date = date.to_string();
        let column = scope.column();
        let affected = self
            .conn
            .call(move |conn| {
                let affected = conn.execute(
                    &format!("UPDATE topic SET {} = ?1 WHERE id = ?2", column),
                    params![date, id],
                )?;
                Ok(affected)
            })
            .await?;
        Ok(affected != 0)
    }

    /// Clear every lapsed pin timer. Returns the number of timers cleared.
    pub async fn expire_top_topics(&self) -> Result<usize> {
        self.expire_top_topics_at(&current_time()).await
    }

    /// Sweep against an explicit `now` (a forum time string).
    pub async fn expire_top_topics_at(&self, now: &str) -> Result<usize> {
        let pinned = self
            .conn
            .call(|conn| {
                let mut stmt = conn.prepare(
                    "SELECT id, tab_top_time, node_top_time, home_page_top_time FROM topic \
                     WHERE tab_top_time != '' OR node_top_time != '' OR home_page_top_time != ''",
                )?;
                let pinned = stmt
                    .query_map([], |row| {
                        Ok(Topic {
                            id: row.get(0)?,
                            tab_top_time: row.get(1)?,
                            node_top_time: row.get(2)?,
                            home_page_top_time: row.get(3)?,
                            ..Default::default()
                        })
                    })?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(pinned)
            })
            .await?;

        let mut cleared = 0;
        for topic in &pinned {
            for scope in PinScope::ALL {
                let timer = topic.top_time(scope);
                if timer.is_empty() || timer > now {
                    continue;
                }
                if self.change_topic_top_expired_time(topic.id, "", scope).await? {
                    tracing::debug!("Expired {} pin of topic {}", scope, topic.id);
                    cleared += 1;
                }
            }
        }

        tracing::info!(
            "Top expiry sweep cleared {} timers across {} pinned topics",
            cleared,
            pinned.len()
        );
        Ok(cleared)
    }
}

#[cfg(test)]
mod tests {
    use crate::db::topics::tests::{repo, time_at, topic};
    use crate::models::PinScope;

    #[tokio::test]
    async fn pin_update_touches_only_its_column() {
        let repo = repo().await;
        let mut t = topic("alice", "rust", "Pinned", "x");
        t.node_top_time = time_at(30);
        let (_, id) = repo.add_topic(&t).await.unwrap();

        assert!(repo
            .change_topic_top_expired_time(id, &time_at(60), PinScope::HomePage)
            .await
            .unwrap());

        let stored = repo.get_topic(id).await.unwrap().unwrap();
        assert_eq!(stored.home_page_top_time, time_at(60));
        assert_eq!(stored.node_top_time, time_at(30));
        assert_eq!(stored.tab_top_time, "");

        assert!(!repo
            .change_topic_top_expired_time(999, &time_at(60), PinScope::Tab)
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn sweep_clears_only_lapsed_timers() {
        let repo = repo().await;
        let mut t = topic("alice", "rust", "Mixed", "x");
        t.tab_top_time = time_at(10);
        t.node_top_time = time_at(100);
        let (_, id) = repo.add_topic(&t).await.unwrap();
        repo.add_topic(&topic("bob", "go", "Never pinned", "y"))
            .await
            .unwrap();

        let cleared = repo.expire_top_topics_at(&time_at(50)).await.unwrap();
        assert_eq!(cleared, 1);

        let stored = repo.get_topic(id).await.unwrap().unwrap();
        assert_eq!(stored.tab_top_time, "");
        assert_eq!(stored.node_top_time, time_at(100));
        assert_eq!(stored.home_page_top_time, "");
    }

    #[tokio::test]
    async fn sweep_counts_each_cleared_timer() {
        let repo = repo().await;
        let mut both = topic("alice", "rust", "Both lapsed", "x");
        both.tab_top_time = time_at(10);
        both.home_page_top_time = time_at(20);
        let (_, both) = repo.add_topic(&both).await.unwrap();

        let mut exact = topic("bob", "go", "Lapses now", "y");
        exact.node_top_time = time_at(50);
        let (_, exact) = repo.add_topic(&exact).await.unwrap();

        assert_eq!(repo.expire_top_topics_at(&time_at(50)).await.unwrap(), 3);

        for id in [both, exact] {
            let stored = repo.get_topic(id).await.unwrap().unwrap();
            for scope in PinScope::ALL {
                assert_eq!(stored.top_time(scope), "");
            }
        }

        assert_eq!(repo.expire_top_topics_at(&time_at(500)).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn sweep_includes_deleted_topics() {
        let repo = repo().await;
        let mut t = topic("alice", "rust", "Deleted but pinned", "x");
        t.home_page_top_time = time_at(1);
        let (_, id) = repo.add_topic(&t).await.unwrap();
        repo.delete_topic(id).await.unwrap();

        assert_eq!(repo.expire_top_topics().await.unwrap(), 1);
    }
}
