use serde::{Deserialize, Serialize};

use super::ids::{GuildId, UserId};
use super::user::GuildMember;

/// A guild together with the member list known to the platform client's cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guild {
    /// Guild ID.
    pub id: GuildId,
    /// Guild name.
    pub name: String,
    /// Cached members. A user missing from this list cannot be resolved
    /// (e.g. they left the guild).
    #[serde(default)]
    pub members: Vec<GuildMember>,
}

impl Guild {
    /// Resolves a user against the member list.
    pub fn member(&self, user_id: UserId) -> Option<&GuildMember> {
        self.members.iter().find(|m| m.user.id == user_id)
    }
}
