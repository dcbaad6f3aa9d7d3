//! Users, roles and guild members.

use serde::{Deserialize, Serialize};

use super::ids::{RoleId, UserId};

/// A platform user, independent of any guild.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// User ID.
    pub id: UserId,
    /// Account name.
    pub name: String,
    /// Whether this account is a bot.
    #[serde(default)]
    pub bot: bool,
}

/// A guild role. Permission checks compare role **names**.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    /// Role ID.
    pub id: RoleId,
    /// Role name, e.g. `"Support"`.
    pub name: String,
}

/// A user's membership in one guild.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuildMember {
    /// The underlying user.
    pub user: User,
    /// Guild-specific nickname.
    #[serde(default)]
    pub nickname: Option<String>,
    /// Roles held in the guild.
    #[serde(default)]
    pub roles: Vec<Role>,
}

impl GuildMember {
    /// The nickname if set, otherwise the account name.
    pub fn display_name(&self) -> &str {
        self.nickname.as_deref().unwrap_or(&self.user.name)
    }

    /// Returns `true` if the member holds a role with exactly this name.
    pub fn has_role(&self, name: &str) -> bool {
        self.roles.iter().any(|role| role.name == name)
    }

    /// Returns `true` if the member holds at least one of the given role names.
    pub fn has_any_role<S: AsRef<str>>(&self, names: &[S]) -> bool {
        names.iter().any(|name| self.has_role(name.as_ref()))
    }
}
