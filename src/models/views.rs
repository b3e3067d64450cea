use serde::Serialize;

use super::Topic;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicWithAvatar {
    #[serde(flatten)]
    pub topic: Topic,
    pub avatar: String,
    pub thanks_status: bool,
    pub editable: bool,
}

/// Node listing entry. `topic.content` is always blank; only its byte
/// length is carried.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeTopic {
    #[serde(flatten)]
    pub topic: Topic,
    pub avatar: String,
    pub content_length: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminTopicInfo {
    #[serde(flatten)]
    pub topic: Topic,
    pub deleted: bool,
}
