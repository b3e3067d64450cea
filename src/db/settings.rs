use rusqlite::{params, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::Result;
use crate::models::{BasicInfo, CronJob, PostJob};

use super::Repository;

pub const HIGHEST_ONLINE_NUM: &str = "HighestOnlineNum";
pub const CRON_JOBS: &str = "CronJobs";
pub const CRON_POSTS: &str = "CronPosts";

impl Repository {
    pub async fn get_basic_info(&self, key: &str) -> Result<Option<BasicInfo>> {
        let key = key.to_string();
        let info = self
            .conn
            .call(move |conn| {
                let info = conn
                    .query_row(
                        "SELECT id, value FROM basic_info WHERE id = ?1",
                        params![key],
                        |row| {
                            Ok(BasicInfo {
                                id: row.get(0)?,
                                value: row.get(1)?,
                            })
                        },
                    )
                    .optional()?;
                Ok(info)
            })
            .await?;
        Ok(info)
    }

    /// Read a JSON-encoded setting. A missing key is stored with `default`
    /// first, so later reads see the same value.
    pub async fn get_setting_or_init<T>(&self, key: &str, default: T) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
    {
        let value = serde_json::to_string(&default)?;
        let id = key.to_string();
        let stored = self
            .conn
            .call(move |conn| {
                let stored: Option<String> = conn
                    .query_row(
                        "SELECT value FROM basic_info WHERE id = ?1",
                        params![id],
                        |row| row.get(0),
                    )
                    .optional()?;
                if stored.is_none() {
                    conn.execute(
                        "INSERT INTO basic_info (id, value) VALUES (?1, ?2)",
                        params![id, value],
                    )?;
                }
                Ok(stored)
            })
            .await?;

        match stored {
            Some(stored) => Ok(serde_json::from_str(&stored)?),
            None => {
                tracing::debug!("Materialized default for setting {}", key);
                Ok(default)
            }
        }
    }

    pub async fn set_setting<T: Serialize>(&self, key: &str, value: &T) -> Result<bool> {
        let value = serde_json::to_string(value)?;
        let id = key.to_string();
        let affected = self
            .conn
            .call(move |conn| {
                let affected = conn.execute(
                    r#"INSERT INTO basic_info (id, value) VALUES (?1, ?2)
                       ON CONFLICT(id) DO UPDATE SET value = excluded.value"#,
                    params![id, value],
                )?;
                Ok(affected)
            })
            .await?;
        Ok(affected != 0)
    }

    // Typed settings

    pub async fn get_highest_online_num(&self) -> Result<i64> {
        self.get_setting_or_init(HIGHEST_ONLINE_NUM, 0i64).await
    }

    pub async fn update_highest_online_num(&self, num: i64) -> Result<bool> {
        self.set_setting(HIGHEST_ONLINE_NUM, &num).await
    }

    pub async fn get_cron_jobs(&self) -> Result<Vec<CronJob>> {
        self.get_setting_or_init(CRON_JOBS, self.defaults.cron_jobs.clone())
            .await
    }

    pub async fn update_cron_jobs(&self, jobs: &[CronJob]) -> Result<bool> {
        self.set_setting(CRON_JOBS, &jobs).await
    }

    pub async fn get_cron_posts(&self) -> Result<Vec<PostJob>> {
        self.get_setting_or_init(CRON_POSTS, self.defaults.cron_posts.clone())
            .await
    }

    pub async fn update_cron_posts(&self, posts: &[PostJob]) -> Result<bool> {
        self.set_setting(CRON_POSTS, &posts).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::db::SettingsDefaults;
    use crate::directory::StaticDirectory;
    use crate::error::AppError;

    fn expire_job() -> CronJob {
        CronJob {
            id: "expireTopTopic".to_string(),
            schedule: "*/5 * * * *".to_string(),
            state: "active".to_string(),
        }
    }

    async fn repo() -> Repository {
        Repository::open_in_memory(Arc::new(StaticDirectory::new()))
            .await
            .unwrap()
            .with_settings_defaults(SettingsDefaults {
                cron_jobs: vec![expire_job()],
                cron_posts: Vec::new(),
            })
    }

    #[tokio::test]
    async fn missing_setting_materializes_default_once() {
        let repo = repo().await;
        assert!(repo.get_basic_info("Motd").await.unwrap().is_none());

        let first: String = repo
            .get_setting_or_init("Motd", "welcome".to_string())
            .await
            .unwrap();
        assert_eq!(first, "welcome");
        assert_eq!(
            repo.get_basic_info("Motd").await.unwrap(),
            Some(BasicInfo {
                id: "Motd".to_string(),
                value: "\"welcome\"".to_string(),
            })
        );

        let second: String = repo
            .get_setting_or_init("Motd", "something else".to_string())
            .await
            .unwrap();
        assert_eq!(second, "welcome");
    }

    #[tokio::test]
    async fn concurrent_first_reads_agree_on_one_default() {
        let repo = repo().await;

        let (a, b) = tokio::join!(
            repo.get_setting_or_init("Banner", "first".to_string()),
            repo.get_setting_or_init("Banner", "second".to_string()),
        );
        let (a, b) = (a.unwrap(), b.unwrap());
        assert_eq!(a, b);

        let stored = repo.get_basic_info("Banner").await.unwrap().unwrap();
        assert_eq!(stored.value, serde_json::to_string(&a).unwrap());
    }

    #[tokio::test]
    async fn highest_online_num_starts_at_zero() {
        let repo = repo().await;

        assert_eq!(repo.get_highest_online_num().await.unwrap(), 0);
        assert_eq!(
            repo.get_basic_info(HIGHEST_ONLINE_NUM).await.unwrap().unwrap().value,
            "0"
        );

        assert!(repo.update_highest_online_num(37).await.unwrap());
        assert_eq!(repo.get_highest_online_num().await.unwrap(), 37);
    }

    #[tokio::test]
    async fn cron_definitions_use_configured_defaults() {
        let repo = repo().await;

        assert_eq!(repo.get_cron_jobs().await.unwrap(), vec![expire_job()]);
        assert!(repo.get_cron_posts().await.unwrap().is_empty());

        let post = PostJob {
            job_id: "weekly".to_string(),
            state: "sent".to_string(),
            url: "https://forum.example/t/1".to_string(),
            send_time: "2020-08-01T09:00:00+08:00".to_string(),
            content: String::new(),
        };
        assert!(repo.update_cron_posts(std::slice::from_ref(&post)).await.unwrap());
        assert_eq!(repo.get_cron_posts().await.unwrap(), vec![post]);

        assert!(repo.update_cron_jobs(&[]).await.unwrap());
        assert!(repo.get_cron_jobs().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn corrupt_setting_is_an_error() {
        let repo = repo().await;
        repo.conn
            .call(|conn| {
                conn.execute(
                    "INSERT INTO basic_info (id, value) VALUES (?1, ?2)",
                    params![CRON_JOBS, "not json"],
                )?;
                Ok(())
            })
            .await
            .unwrap();

        let err = repo.get_cron_jobs().await.unwrap_err();
        assert!(matches!(err, AppError::Json(_)));
    }
}
