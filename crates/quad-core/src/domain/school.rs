use serde::{Deserialize, Serialize};

/// School entity - the scope every feed is served within.
///
/// Created once, never mutated; referenced by users and posts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct School {
    pub id: i64,
    pub name: String,
}
