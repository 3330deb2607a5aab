use serde::{Deserialize, Serialize};

/// User entity - a member of a single school.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub name: String,
    pub school_id: i64,
    /// Milliseconds since the Unix epoch.
    pub created_at: i64,
}
