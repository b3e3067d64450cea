use std::sync::Arc;

use rusqlite::{params, OptionalExtension};
use tokio_rusqlite::Connection;

use crate::config::Config;
use crate::directory::MemberDirectory;
use crate::editable::EditWindow;
use crate::error::Result;
use crate::models::{CronJob, Node, PostJob};

use super::schema::SCHEMA;

/// Defaults materialized into the settings table on first read.
#[derive(Debug, Clone, Default)]
pub struct SettingsDefaults {
    pub cron_jobs: Vec<CronJob>,
    pub cron_posts: Vec<PostJob>,
}

pub struct Repository {
    pub(super) conn: Connection,
    pub(super) directory: Arc<dyn MemberDirectory>,
    pub(super) edit_window: EditWindow,
    pub(super) defaults: SettingsDefaults,
}

impl Repository {
    pub async fn new(db_path: &str, directory: Arc<dyn MemberDirectory>) -> Result<Self> {
        let conn = Connection::open(db_path).await?;
        Self::init(conn, directory).await
    }

    pub async fn open_in_memory(directory: Arc<dyn MemberDirectory>) -> Result<Self> {
        let conn = Connection::open_in_memory().await?;
        Self::init(conn, directory).await
    }

    pub async fn from_config(config: &Config, directory: Arc<dyn MemberDirectory>) -> Result<Self> {
        Ok(Self::new(&config.db_path, directory)
            .await?
            .with_edit_window(EditWindow::new(config.topic_editable_minutes))
            .with_settings_defaults(SettingsDefaults {
                cron_jobs: config.default_cron_jobs.clone(),
                cron_posts: config.default_cron_posts.clone(),
            }))
    }

    async fn init(conn: Connection, directory: Arc<dyn MemberDirectory>) -> Result<Self> {
        conn.call(|conn| {
            conn.execute_batch(SCHEMA)?;
            Ok(())
        })
        .await?;

        Ok(Self {
            conn,
            directory,
            edit_window: EditWindow::default(),
            defaults: SettingsDefaults::default(),
        })
    }

    pub fn with_edit_window(mut self, edit_window: EditWindow) -> Self {
        self.edit_window = edit_window;
        self
    }

    pub fn with_settings_defaults(mut self, defaults: SettingsDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    pub fn edit_window(&self) -> EditWindow {
        self.edit_window
    }

    // Node operations

    pub async fn add_node(&self, node: Node) -> Result<bool> {
        let affected = self
            .conn
            .call(move |conn| {
                let affected = conn.execute(
                    "INSERT INTO node (id, name, tab_id) VALUES (?1, ?2, ?3)",
                    params![node.id, node.name, node.tab_id],
                )?;
                Ok(affected)
            })
            .await?;
        Ok(affected != 0)
    }

    pub async fn get_node(&self, id: &str) -> Result<Option<Node>> {
        let id = id.to_string();
        let node = self
            .conn
            .call(move |conn| {
                let node = conn
                    .query_row(
                        "SELECT id, name, tab_id FROM node WHERE id = ?1",
                        params![id],
                        |row| {
                            Ok(Node {
                                id: row.get(0)?,
                                name: row.get(1)?,
                                tab_id: row.get(2)?,
                            })
                        },
                    )
                    .optional()?;
                Ok(node)
            })
            .await?;
        Ok(node)
    }
}
