use serde::{Deserialize, Serialize};

/// Maps an identity to elevated privileges for status transitions and other
/// back-office operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminRole {
    pub id: i64,
    pub user_id: String,
    pub email: String,
    pub role: String,
    pub added_by: String,
    pub created_at: String,
}
