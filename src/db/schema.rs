pub const SCHEMA: &str = r#"
-- topic table
CREATE TABLE IF NOT EXISTS topic (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    author TEXT NOT NULL DEFAULT '',
    node_id TEXT NOT NULL DEFAULT '',
    node_name TEXT NOT NULL DEFAULT '',
    title TEXT NOT NULL DEFAULT '',
    created_time TEXT NOT NULL DEFAULT '',
    tags TEXT NOT NULL DEFAULT '[]',
    last_reply_user TEXT NOT NULL DEFAULT '',
    last_reply_time TEXT NOT NULL DEFAULT '',
    reply_count INTEGER NOT NULL DEFAULT 0,
    up_count INTEGER NOT NULL DEFAULT 0,
    hit_count INTEGER NOT NULL DEFAULT 0,
    hot INTEGER NOT NULL DEFAULT 0,
    favorite_count INTEGER NOT NULL DEFAULT 0,
    home_page_top_time TEXT NOT NULL DEFAULT '',
    tab_top_time TEXT NOT NULL DEFAULT '',
    node_top_time TEXT NOT NULL DEFAULT '',
    deleted INTEGER NOT NULL DEFAULT 0,
    content TEXT NOT NULL DEFAULT ''
);

CREATE INDEX IF NOT EXISTS idx_topic_node_id ON topic(node_id);
CREATE INDEX IF NOT EXISTS idx_topic_author ON topic(author);
CREATE INDEX IF NOT EXISTS idx_topic_hot ON topic(hot DESC);
CREATE INDEX IF NOT EXISTS idx_topic_deleted ON topic(deleted);

-- node table (only the columns the tab listing joins on)
CREATE TABLE IF NOT EXISTS node (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL DEFAULT '',
    tab_id TEXT NOT NULL DEFAULT ''
);

CREATE INDEX IF NOT EXISTS idx_node_tab_id ON node(tab_id);

-- basic_info table (site-wide key/value settings)
CREATE TABLE IF NOT EXISTS basic_info (
    id TEXT PRIMARY KEY,
    value TEXT NOT NULL DEFAULT ''
);
"#;
