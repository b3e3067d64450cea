use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// A forum topic row.
///
/// Time fields are forum time strings (see [`crate::clock`]); an empty pin
/// timer means the topic is not pinned in that scope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Topic {
    pub id: i64,
    pub author: String,
    pub node_id: String,
    pub node_name: String,
    pub title: String,
    pub created_time: String,
    pub tags: Vec<String>,
    pub last_reply_user: String,
    pub last_reply_time: String,
    pub reply_count: i64,
    pub up_count: i64,
    pub hit_count: i64,
    pub hot: i64,
    pub favorite_count: i64,
    pub home_page_top_time: String,
    pub tab_top_time: String,
    pub node_top_time: String,
    #[serde(skip)]
    pub deleted: bool,
    pub content: String,
}

impl Topic {
    pub fn top_time(&self, scope: PinScope) -> &str {
        match scope {
            PinScope::Tab => &self.tab_top_time,
            PinScope::Node => &self.node_top_time,
            PinScope::HomePage => &self.home_page_top_time,
        }
    }
}

/// Listing scope a pin timer applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PinScope {
    Tab,
    Node,
    HomePage,
}

impl PinScope {
    pub const ALL: [PinScope; 3] = [PinScope::Tab, PinScope::Node, PinScope::HomePage];

    pub fn column(self) -> &'static str {
        match self {
            PinScope::Tab => "tab_top_time",
            PinScope::Node => "node_top_time",
            PinScope::HomePage => "home_page_top_time",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PinScope::Tab => "tab",
            PinScope::Node => "node",
            PinScope::HomePage => "homePage",
        }
    }
}

impl fmt::Display for PinScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PinScope {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tab" => Ok(PinScope::Tab),
            "node" => Ok(PinScope::Node),
            "homePage" => Ok(PinScope::HomePage),
            other => Err(anyhow::anyhow!("Unknown pin scope: {}", other).into()),
        }
    }
}
