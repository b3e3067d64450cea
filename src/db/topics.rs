use chrono::Utc;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection as SqliteConnection, OptionalExtension};

use crate::clock::current_time;
use crate::error::Result;
use crate::models::{AdminTopicInfo, NodeTopic, Topic, TopicWithAvatar};

use super::query::{
    full_assignments, limited_assignments, topic_from_row, AdminTopicQuery, Direction,
    Projection, SortColumn, TopicSelect,
};
use super::Repository;

/// Sentinel tab that lists every topic.
pub const ALL_TAB: &str = "all";

pub(super) fn topic_exists(conn: &SqliteConnection, id: i64) -> rusqlite::Result<bool> {
    let found = conn
        .query_row("SELECT 1 FROM topic WHERE id = ?1", params![id], |_| Ok(()))
        .optional()?;
    Ok(found.is_some())
}

fn update_sql(id: i64, assignments: Vec<(&'static str, Value)>) -> (String, Vec<Value>) {
    let (columns, mut values): (Vec<_>, Vec<_>) = assignments.into_iter().unzip();
    let set: Vec<String> = columns.iter().map(|c| format!("{} = ?", c)).collect();
    values.push(Value::Integer(id));
    (
        format!("UPDATE topic SET {} WHERE id = ?", set.join(", ")),
        values,
    )
}

impl Repository {
    async fn find_topics(&self, select: TopicSelect) -> Result<Vec<Topic>> {
        let (sql, params) = select.to_sql();
        let topics = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(&sql)?;
                let topics = stmt
                    .query_map(params_from_iter(params), topic_from_row)?
                    .collect::<std::result::Result<Vec<_>, _>>()?;
                Ok(topics)
            })
            .await?;
        Ok(topics)
    }

    async fn count_topics(&self, select: TopicSelect) -> Result<i64> {
        let (sql, params) = select.to_count_sql();
        let count = self
            .conn
            .call(move |conn| {
                let count: i64 =
                    conn.query_row(&sql, params_from_iter(params), |row| row.get(0))?;
                Ok(count)
            })
            .await?;
        Ok(count)
    }

    fn with_avatar(&self, topic: Topic) -> TopicWithAvatar {
        TopicWithAvatar {
            avatar: self.directory.member_avatar(&topic.author),
            topic,
            thanks_status: false,
            editable: false,
        }
    }

    // Counts

    /// All topics, deleted ones included.
    pub async fn get_topic_count(&self) -> Result<i64> {
        self.count_topics(TopicSelect::new(Projection::Full)).await
    }

    pub async fn get_topic_num(&self) -> Result<i64> {
        self.count_topics(TopicSelect::new(Projection::Full).not_deleted())
            .await
    }

    pub async fn get_created_topics_num(&self, member_id: &str) -> Result<i64> {
        self.count_topics(
            TopicSelect::new(Projection::Full)
                .filter("topic.author = ?", [Value::from(member_id.to_string())])
                .not_deleted(),
        )
        .await
    }

    // Listings

    pub async fn get_topics(&self, limit: u32, offset: u32) -> Result<Vec<TopicWithAvatar>> {
        let topics = self
            .find_topics(
                TopicSelect::new(Projection::WithoutContent)
                    .not_deleted()
                    .order_by(SortColumn::HomePageTopTime, Direction::Desc)
                    .order_by(SortColumn::LastReplyTime, Direction::Desc)
                    .order_by(SortColumn::CreatedTime, Direction::Desc)
                    .page(limit, offset),
            )
            .await?;
        Ok(topics.into_iter().map(|t| self.with_avatar(t)).collect())
    }

    pub async fn get_topics_with_node(
        &self,
        node_id: &str,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<NodeTopic>> {
        let topics = self
            .find_topics(
                TopicSelect::new(Projection::Full)
                    .filter("topic.node_id = ?", [Value::from(node_id.to_string())])
                    .not_deleted()
                    .order_by(SortColumn::NodeTopTime, Direction::Desc)
                    .order_by(SortColumn::LastReplyTime, Direction::Desc)
                    .order_by(SortColumn::CreatedTime, Direction::Desc)
                    .page(limit, offset),
            )
            .await?;

        Ok(topics
            .into_iter()
            .map(|mut topic| {
                let content_length = topic.content.len();
                topic.content.clear();
                NodeTopic {
                    avatar: self.directory.member_avatar(&topic.author),
                    topic,
                    content_length,
                }
            })
            .collect())
    }

    pub async fn get_topics_with_tab(
        &self,
        tab: &str,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<TopicWithAvatar>> {
        if tab == ALL_TAB {
            return self.get_topics(limit, offset).await;
        }

        let topics = self
            .find_topics(
                TopicSelect::new(Projection::WithoutContent)
                    .join_node()
                    .filter("node.tab_id = ?", [Value::from(tab.to_string())])
                    .not_deleted()
                    .order_by(SortColumn::TabTopTime, Direction::Desc)
                    .order_by(SortColumn::LastReplyTime, Direction::Desc)
                    .page(limit, offset),
            )
            .await?;
        Ok(topics.into_iter().map(|t| self.with_avatar(t)).collect())
    }

    pub async fn get_hot_topics(&self, limit: u32) -> Result<Vec<TopicWithAvatar>> {
        let topics = self
            .find_topics(
                TopicSelect::new(Projection::Full)
                    .not_deleted()
                    .order_by(SortColumn::Hot, Direction::Desc)
                    .limit(limit),
            )
            .await?;
        Ok(topics.into_iter().map(|t| self.with_avatar(t)).collect())
    }

    /// Admin listing: one page of matches plus the total match count.
    pub async fn get_topics_admin(
        &self,
        query: &AdminTopicQuery,
    ) -> Result<(Vec<AdminTopicInfo>, i64)> {
        let select = query.select();
        let total = self.count_topics(select.clone()).await?;
        let topics = self.find_topics(select).await?;

        let infos = topics
            .into_iter()
            .map(|topic| AdminTopicInfo {
                deleted: topic.deleted,
                topic,
            })
            .collect();
        Ok((infos, total))
    }

    pub async fn get_all_created_topics(
        &self,
        author: &str,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<Topic>> {
        self.find_topics(
            TopicSelect::new(Projection::WithoutContent)
                .filter("topic.author = ?", [Value::from(author.to_string())])
                .not_deleted()
                .order_by(SortColumn::CreatedTime, Direction::Desc)
                .page(limit, offset),
        )
        .await
    }

    // Single reads

    pub async fn get_topic(&self, id: i64) -> Result<Option<Topic>> {
        let topic = self
            .find_topics(
                TopicSelect::new(Projection::Full).filter("topic.id = ?", [Value::Integer(id)]),
            )
            .await?
            .into_iter()
            .next();
        Ok(topic)
    }

    pub async fn get_topic_admin(&self, id: i64) -> Result<Option<AdminTopicInfo>> {
        Ok(self.get_topic(id).await?.map(|topic| AdminTopicInfo {
            deleted: topic.deleted,
            topic,
        }))
    }

    /// Full topic as seen by `member_id`, including whether they may edit it.
    pub async fn get_topic_with_avatar(
        &self,
        id: i64,
        member_id: &str,
    ) -> Result<Option<TopicWithAvatar>> {
        let Some(topic) = self.get_topic(id).await? else {
            return Ok(None);
        };

        let editable = self.edit_window.is_editable(
            self.directory.as_ref(),
            member_id,
            &topic.author,
            &topic.node_id,
            &topic.created_time,
            Utc::now(),
        );

        Ok(Some(TopicWithAvatar {
            avatar: self.directory.member_avatar(&topic.author),
            thanks_status: self.directory.topic_thanked(member_id, id),
            editable,
            topic,
        }))
    }

    async fn get_topic_column(&self, id: i64, column: &'static str) -> Result<String> {
        let value = self
            .conn
            .call(move |conn| {
                let value: Option<String> = conn
                    .query_row(
                        &format!("SELECT {} FROM topic WHERE id = ?1", column),
                        params![id],
                        |row| row.get(0),
                    )
                    .optional()?;
                Ok(value)
            })
            .await?;
        Ok(value.unwrap_or_default())
    }

    pub async fn get_topic_title(&self, id: i64) -> Result<String> {
        self.get_topic_column(id, "title").await
    }

    pub async fn get_topic_author(&self, id: i64) -> Result<String> {
        self.get_topic_column(id, "author").await
    }

    pub async fn get_topic_node_id(&self, id: i64) -> Result<String> {
        self.get_topic_column(id, "node_id").await
    }

    // Mutations

    /// Overwrite every column of an existing topic. Returns false, without
    /// writing, when the topic does not exist.
    pub async fn update_topic(&self, id: i64, topic: &Topic) -> Result<bool> {
        let assignments = full_assignments(topic)?;
        self.update_existing(id, assignments).await
    }

    /// Write only the populated fields of `topic`.
    pub async fn update_topic_with_limit_cols(&self, id: i64, topic: &Topic) -> Result<bool> {
        let assignments = limited_assignments(topic)?;
        self.update_existing(id, assignments).await
    }

    async fn update_existing(
        &self,
        id: i64,
        assignments: Vec<(&'static str, Value)>,
    ) -> Result<bool> {
        let updated = self
            .conn
            .call(move |conn| {
                if !topic_exists(conn, id)? {
                    return Ok(false);
                }
                if !assignments.is_empty() {
                    let (sql, params) = update_sql(id, assignments);
                    conn.execute(&sql, params_from_iter(params))?;
                }
                Ok(true)
            })
            .await?;
        Ok(updated)
    }

    /// Insert a topic; its `id` is ignored and the assigned one returned.
    pub async fn add_topic(&self, topic: &Topic) -> Result<(bool, i64)> {
        let (columns, values): (Vec<_>, Vec<_>) = full_assignments(topic)?.into_iter().unzip();
        let placeholders = vec!["?"; columns.len()].join(", ");
        let sql = format!(
            "INSERT INTO topic ({}) VALUES ({})",
            columns.join(", "),
            placeholders
        );

        let (affected, id) = self
            .conn
            .call(move |conn| {
                let affected = conn.execute(&sql, params_from_iter(values))?;
                Ok((affected, conn.last_insert_rowid()))
            })
            .await?;
        tracing::debug!("Inserted topic {}", id);
        Ok((affected != 0, id))
    }

    /// Soft delete. The row stays in storage.
    pub async fn delete_topic(&self, id: i64) -> Result<bool> {
        let affected = self
            .conn
            .call(move |conn| {
                let affected =
                    conn.execute("UPDATE topic SET deleted = 1 WHERE id = ?1", params![id])?;
                Ok(affected)
            })
            .await?;
        tracing::debug!("Soft deleted topic {}", id);
        Ok(affected != 0)
    }

    async fn change_counter(&self, id: i64, column: &'static str, delta: i64) -> Result<bool> {
        let affected = self
            .conn
            .call(move |conn| {
                let affected = conn.execute(
                    &format!("UPDATE topic SET {0} = {0} + ?1 WHERE id = ?2", column),
                    params![delta, id],
                )?;
                Ok(affected)
            })
            .await?;
        Ok(affected != 0)
    }

    pub async fn add_topic_hit_count(&self, id: i64) -> Result<bool> {
        self.change_counter(id, "hit_count", 1).await
    }

    pub async fn change_topic_favorite_count(&self, id: i64, delta: i64) -> Result<bool> {
        self.change_counter(id, "favorite_count", delta).await
    }

    pub async fn change_topic_reply_count(&self, id: i64, delta: i64) -> Result<bool> {
        self.change_counter(id, "reply_count", delta).await
    }

    /// Set the last replier. An empty `member_id` also clears the reply time;
    /// otherwise the time is stamped only when `update_time` is set.
    pub async fn change_topic_last_reply_user(
        &self,
        id: i64,
        member_id: &str,
        update_time: bool,
    ) -> Result<bool> {
        let time = if member_id.is_empty() {
            Some(String::new())
        } else if update_time {
            Some(current_time())
        } else {
            None
        };
        let member_id = member_id.to_string();

        let affected = self
            .conn
            .call(move |conn| {
                let affected = conn.execute(
                    "UPDATE topic SET last_reply_user = ?1, \
                     last_reply_time = COALESCE(?2, last_reply_time) WHERE id = ?3",
                    params![member_id, time, id],
                )?;
                Ok(affected)
            })
            .await?;
        Ok(affected != 0)
    }

    pub async fn update_topic_hot(&self, id: i64, hot: i64) -> Result<bool> {
        let affected = self
            .conn
            .call(move |conn| {
                let affected =
                    conn.execute("UPDATE topic SET hot = ?1 WHERE id = ?2", params![hot, id])?;
                Ok(affected)
            })
            .await?;
        Ok(affected != 0)
    }
}
