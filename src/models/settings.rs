use serde::{Deserialize, Serialize};

/// One row of the site-wide key/value table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicInfo {
    pub id: String,
    pub value: String,
}

/// A scheduled maintenance job definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CronJob {
    pub id: String,
    pub schedule: String,
    pub state: String,
}

/// A scheduled outgoing post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostJob {
    pub job_id: String,
    pub state: String,
    pub url: String,
    pub send_time: String,
    #[serde(default)]
    pub content: String,
}
