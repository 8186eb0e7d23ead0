use serde::{Deserialize, Serialize};

use super::enums::Role;

/// A service provider who owns a schedule of appointments.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Master {
    pub id: String,
    pub name: String,
    pub role: Role,
    pub avatar: Option<String>,
}

/// Owner-only profile mutation (name and avatar; role is not self-serve).
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub avatar: Option<String>,
}
