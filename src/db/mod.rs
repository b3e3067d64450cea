mod pin;
mod query;
mod repository;
mod schema;
mod settings;
mod topics;

pub use query::{AdminTopicQuery, Direction, SearchField, SortColumn, SortOrder};
pub use repository::{Repository, SettingsDefaults};
pub use settings::{CRON_JOBS, CRON_POSTS, HIGHEST_ONLINE_NUM};
pub use topics::ALL_TAB;
