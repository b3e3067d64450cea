//! SELECT construction for topic listings.
//!
//! Predicates are ANDed in the order they are added; values are bound
//! positionally, so the parameter list always follows the SQL text.

use rusqlite::types::{Type, Value};
use rusqlite::Row;

use crate::error::Result;
use crate::models::Topic;

/// Every topic column except `content`, in `topic_from_row` order.
const TOPIC_COLUMNS: &str = "topic.id, topic.author, topic.node_id, topic.node_name, \
    topic.title, topic.created_time, topic.tags, topic.last_reply_user, \
    topic.last_reply_time, topic.reply_count, topic.up_count, topic.hit_count, \
    topic.hot, topic.favorite_count, topic.home_page_top_time, topic.tab_top_time, \
    topic.node_top_time, topic.deleted";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Projection {
    Full,
    /// Content is replaced by an empty string.
    WithoutContent,
}

impl Projection {
    fn columns(self) -> String {
        match self {
            Projection::Full => format!("{}, topic.content", TOPIC_COLUMNS),
            Projection::WithoutContent => format!("{}, '' AS content", TOPIC_COLUMNS),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortColumn {
    CreatedTime,
    LastReplyTime,
    Author,
    ReplyCount,
    Hot,
    FavoriteCount,
    HomePageTopTime,
    TabTopTime,
    NodeTopTime,
}

impl SortColumn {
    pub fn column(self) -> &'static str {
        match self {
            SortColumn::CreatedTime => "topic.created_time",
            SortColumn::LastReplyTime => "topic.last_reply_time",
            SortColumn::Author => "topic.author",
            SortColumn::ReplyCount => "topic.reply_count",
            SortColumn::Hot => "topic.hot",
            SortColumn::FavoriteCount => "topic.favorite_count",
            SortColumn::HomePageTopTime => "topic.home_page_top_time",
            SortColumn::TabTopTime => "topic.tab_top_time",
            SortColumn::NodeTopTime => "topic.node_top_time",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

impl Direction {
    fn keyword(self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

/// Per-column sort directive used by the admin listing.
/// Wire codes: `0` unsorted, `1` ascending, `2` descending.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Unsorted,
    Ascending,
    Descending,
}

impl SortOrder {
    /// Unknown codes leave the column unsorted.
    pub fn from_code(code: &str) -> Self {
        match code.trim() {
            "1" => SortOrder::Ascending,
            "2" => SortOrder::Descending,
            _ => SortOrder::Unsorted,
        }
    }

    pub fn direction(self) -> Option<Direction> {
        match self {
            SortOrder::Unsorted => None,
            SortOrder::Ascending => Some(Direction::Asc),
            SortOrder::Descending => Some(Direction::Desc),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchField {
    Author,
    Title,
    Content,
}

impl SearchField {
    fn column(self) -> &'static str {
        match self {
            SearchField::Author => "topic.author",
            SearchField::Title => "topic.title",
            SearchField::Content => "topic.content",
        }
    }
}

/// Admin listing request.
#[derive(Debug, Clone, Default)]
pub struct AdminTopicQuery {
    pub author_keyword: String,
    pub title_keyword: String,
    pub content_keyword: String,
    pub show_deleted: bool,
    pub created_time_sort: SortOrder,
    pub last_reply_sort: SortOrder,
    pub author_sort: SortOrder,
    pub reply_count_sort: SortOrder,
    pub hot_sort: SortOrder,
    pub favorite_count_sort: SortOrder,
    pub limit: u32,
    pub offset: u32,
}

impl AdminTopicQuery {
    /// Active sort directives; earlier entries take precedence.
    pub fn sort_directives(&self) -> Vec<(SortColumn, Direction)> {
        [
            (SortColumn::CreatedTime, self.created_time_sort),
            (SortColumn::LastReplyTime, self.last_reply_sort),
            (SortColumn::Author, self.author_sort),
            (SortColumn::ReplyCount, self.reply_count_sort),
            (SortColumn::Hot, self.hot_sort),
            (SortColumn::FavoriteCount, self.favorite_count_sort),
        ]
        .into_iter()
        .filter_map(|(column, order)| order.direction().map(|dir| (column, dir)))
        .collect()
    }

    pub fn keywords(&self) -> Vec<(SearchField, &str)> {
        vec![
            (SearchField::Author, self.author_keyword.as_str()),
            (SearchField::Title, self.title_keyword.as_str()),
            (SearchField::Content, self.content_keyword.as_str()),
        ]
    }

    pub(crate) fn select(&self) -> TopicSelect {
        let mut select = TopicSelect::new(Projection::Full).any_keyword(&self.keywords());
        if !self.show_deleted {
            select = select.not_deleted();
        }
        for (column, dir) in self.sort_directives() {
            select = select.order_by(column, dir);
        }
        select.page(self.limit, self.offset)
    }
}

pub fn split_words(s: &str) -> Vec<&str> {
    s.split_whitespace().collect()
}

fn like_pattern(token: &str) -> String {
    let mut escaped = String::with_capacity(token.len() + 2);
    escaped.push('%');
    for c in token.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

#[derive(Debug, Clone)]
pub(crate) struct TopicSelect {
    projection: Projection,
    join_node: bool,
    conditions: Vec<String>,
    params: Vec<Value>,
    order: Vec<(SortColumn, Direction)>,
    limit: Option<u32>,
    offset: Option<u32>,
}

impl TopicSelect {
    pub fn new(projection: Projection) -> Self {
        Self {
            projection,
            join_node: false,
            conditions: Vec::new(),
            params: Vec::new(),
            order: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    pub fn join_node(mut self) -> Self {
        self.join_node = true;
        self
    }

    pub fn filter<I>(mut self, condition: &str, params: I) -> Self
    where
        I: IntoIterator<Item = Value>,
    {
        self.conditions.push(condition.to_string());
        self.params.extend(params);
        self
    }

    pub fn not_deleted(self) -> Self {
        self.filter("topic.deleted = 0", [])
    }

    /// One OR'd substring clause per whitespace-separated token of every
    /// keyword. Blank keywords add nothing.
    pub fn any_keyword(mut self, keywords: &[(SearchField, &str)]) -> Self {
        let mut clauses = Vec::new();
        for (field, keyword) in keywords {
            for token in split_words(keyword) {
                clauses.push(format!("{} LIKE ? ESCAPE '\\'", field.column()));
                self.params.push(Value::Text(like_pattern(token)));
            }
        }
        if !clauses.is_empty() {
            self.conditions.push(format!("({})", clauses.join(" OR ")));
        }
        self
    }

    pub fn order_by(mut self, column: SortColumn, direction: Direction) -> Self {
        self.order.push((column, direction));
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn page(mut self, limit: u32, offset: u32) -> Self {
        self.limit = Some(limit);
        self.offset = Some(offset);
        self
    }

    fn from_where(&self) -> String {
        let mut sql = String::from(" FROM topic");
        if self.join_node {
            sql.push_str(" INNER JOIN node ON topic.node_id = node.id");
        }
        if !self.conditions.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&self.conditions.join(" AND "));
        }
        sql
    }

    pub fn to_sql(&self) -> (String, Vec<Value>) {
        let mut sql = format!("SELECT {}{}", self.projection.columns(), self.from_where());
        let mut params = self.params.clone();

        if !self.order.is_empty() {
            let terms: Vec<String> = self
                .order
                .iter()
                .map(|(column, dir)| format!("{} {}", column.column(), dir.keyword()))
                .collect();
            sql.push_str(" ORDER BY ");
            sql.push_str(&terms.join(", "));
        }

        if let Some(limit) = self.limit {
            sql.push_str(" LIMIT ?");
            params.push(Value::Integer(i64::from(limit)));
            if let Some(offset) = self.offset {
                sql.push_str(" OFFSET ?");
                params.push(Value::Integer(i64::from(offset)));
            }
        }

        (sql, params)
    }

    /// Same predicate, no ordering or pagination.
    pub fn to_count_sql(&self) -> (String, Vec<Value>) {
        (
            format!("SELECT COUNT(*){}", self.from_where()),
            self.params.clone(),
        )
    }
}

pub(crate) fn topic_from_row(row: &Row) -> rusqlite::Result<Topic> {
    let tags_json: String = row.get(6)?;
    let tags = if tags_json.is_empty() {
        Vec::new()
    } else {
        serde_json::from_str(&tags_json)
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(6, Type::Text, Box::new(e)))?
    };

    Ok(Topic {
        id: row.get(0)?,
        author: row.get(1)?,
        node_id: row.get(2)?,
        node_name: row.get(3)?,
        title: row.get(4)?,
        created_time: row.get(5)?,
        tags,
        last_reply_user: row.get(7)?,
        last_reply_time: row.get(8)?,
        reply_count: row.get(9)?,
        up_count: row.get(10)?,
        hit_count: row.get(11)?,
        hot: row.get(12)?,
        favorite_count: row.get(13)?,
        home_page_top_time: row.get(14)?,
        tab_top_time: row.get(15)?,
        node_top_time: row.get(16)?,
        deleted: row.get(17)?,
        content: row.get(18)?,
    })
}

/// Column assignments for every writable topic column.
pub(crate) fn full_assignments(topic: &Topic) -> Result<Vec<(&'static str, Value)>> {
    Ok(vec![
        ("author", Value::from(topic.author.clone())),
        ("node_id", Value::from(topic.node_id.clone())),
        ("node_name", Value::from(topic.node_name.clone())),
        ("title", Value::from(topic.title.clone())),
        ("created_time", Value::from(topic.created_time.clone())),
        ("tags", Value::from(serde_json::to_string(&topic.tags)?)),
        ("last_reply_user", Value::from(topic.last_reply_user.clone())),
        ("last_reply_time", Value::from(topic.last_reply_time.clone())),
        ("reply_count", Value::from(topic.reply_count)),
        ("up_count", Value::from(topic.up_count)),
        ("hit_count", Value::from(topic.hit_count)),
        ("hot", Value::from(topic.hot)),
        ("favorite_count", Value::from(topic.favorite_count)),
        ("home_page_top_time", Value::from(topic.home_page_top_time.clone())),
        ("tab_top_time", Value::from(topic.tab_top_time.clone())),
        ("node_top_time", Value::from(topic.node_top_time.clone())),
        ("deleted", Value::from(topic.deleted)),
        ("content", Value::from(topic.content.clone())),
    ])
}

/// Assignments for the populated fields only: non-empty strings and tag
/// lists, non-zero counters, and a set deleted flag.
pub(crate) fn limited_assignments(topic: &Topic) -> Result<Vec<(&'static str, Value)>> {
    Ok(full_assignments(topic)?
        .into_iter()
        .filter(|(column, value)| match value {
            Value::Text(s) if *column == "tags" => !topic.tags.is_empty() && !s.is_empty(),
            Value::Text(s) => !s.is_empty(),
            Value::Integer(n) => *n != 0,
            _ => true,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_listing_sql() {
        let (sql, params) = TopicSelect::new(Projection::WithoutContent)
            .not_deleted()
            .order_by(SortColumn::HomePageTopTime, Direction::Desc)
            .order_by(SortColumn::LastReplyTime, Direction::Desc)
            .page(10, 20)
            .to_sql();

        assert!(sql.contains("'' AS content"));
        assert!(sql.ends_with(
            "FROM topic WHERE topic.deleted = 0 \
             ORDER BY topic.home_page_top_time DESC, topic.last_reply_time DESC LIMIT ? OFFSET ?"
        ));
        assert_eq!(params, vec![Value::Integer(10), Value::Integer(20)]);
    }

    #[test]
    fn keyword_tokens_are_ored_across_fields() {
        let (sql, params) = TopicSelect::new(Projection::Full)
            .any_keyword(&[
                (SearchField::Author, "ann"),
                (SearchField::Title, "abc  def"),
                (SearchField::Content, ""),
            ])
            .not_deleted()
            .to_sql();

        assert!(sql.contains(
            "WHERE (topic.author LIKE ? ESCAPE '\\' OR topic.title LIKE ? ESCAPE '\\' \
             OR topic.title LIKE ? ESCAPE '\\') AND topic.deleted = 0"
        ));
        assert_eq!(
            params,
            vec![
                Value::Text("%ann%".into()),
                Value::Text("%abc%".into()),
                Value::Text("%def%".into()),
            ]
        );
    }

    #[test]
    fn blank_keywords_add_no_clause() {
        let (sql, params) = TopicSelect::new(Projection::Full)
            .any_keyword(&[(SearchField::Title, "   "), (SearchField::Content, "")])
            .to_sql();

        assert!(!sql.contains("WHERE"));
        assert!(params.is_empty());
    }

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(like_pattern("a\\b"), "%a\\\\b%");
    }

    #[test]
    fn count_sql_ignores_order_and_page() {
        let select = TopicSelect::new(Projection::Full)
            .any_keyword(&[(SearchField::Author, "ann")])
            .order_by(SortColumn::Hot, Direction::Desc)
            .page(5, 5);
        let (sql, params) = select.to_count_sql();

        assert_eq!(
            sql,
            "SELECT COUNT(*) FROM topic WHERE (topic.author LIKE ? ESCAPE '\\')"
        );
        assert_eq!(params, vec![Value::Text("%ann%".into())]);
    }

    #[test]
    fn admin_sort_directives_follow_check_order() {
        let query = AdminTopicQuery {
            favorite_count_sort: SortOrder::Descending,
            created_time_sort: SortOrder::Ascending,
            hot_sort: SortOrder::Unsorted,
            author_sort: SortOrder::Descending,
            ..Default::default()
        };

        assert_eq!(
            query.sort_directives(),
            vec![
                (SortColumn::CreatedTime, Direction::Asc),
                (SortColumn::Author, Direction::Desc),
                (SortColumn::FavoriteCount, Direction::Desc),
            ]
        );
    }

    #[test]
    fn sort_order_codes() {
        assert_eq!(SortOrder::from_code("0"), SortOrder::Unsorted);
        assert_eq!(SortOrder::from_code("1"), SortOrder::Ascending);
        assert_eq!(SortOrder::from_code("2"), SortOrder::Descending);
        assert_eq!(SortOrder::from_code("x"), SortOrder::Unsorted);
    }

    #[test]
    fn limited_assignments_skip_zero_values() {
        let topic = Topic {
            title: "new title".to_string(),
            hot: 7,
            ..Default::default()
        };
        let columns: Vec<&str> = limited_assignments(&topic)
            .unwrap()
            .into_iter()
            .map(|(column, _)| column)
            .collect();

        assert_eq!(columns, vec!["title", "hot"]);
    }
}
