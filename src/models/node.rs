use serde::{Deserialize, Serialize};

/// A sub-forum. Nodes are grouped into tabs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    pub id: String,
    pub name: String,
    pub tab_id: String,
}
