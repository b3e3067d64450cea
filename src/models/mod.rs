mod node;
mod settings;
mod topic;
mod views;

pub use node::Node;
pub use settings::{BasicInfo, CronJob, PostJob};
pub use topic::{PinScope, Topic};
pub use views::{AdminTopicInfo, NodeTopic, TopicWithAvatar};
