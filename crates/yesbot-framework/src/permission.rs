//! Role-based permission gate.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use yesbot_core::{GuildMember, RoutingContext};

use crate::options::HandlerOptions;

/// What to do when a matched handler is denied.
///
/// A denial is never an error and never reaches the user; the policy only
/// decides how loudly it is logged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialPolicy {
    /// Log at `debug`.
    #[default]
    Silent,
    /// Log at `info` with the member and the required roles.
    Log,
}

/// Checks a handler's `allowed_roles` against the acting member.
#[derive(Debug, Clone, Copy, Default)]
pub struct PermissionGate {
    policy: DenialPolicy,
}

impl PermissionGate {
    pub fn new(policy: DenialPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> DenialPolicy {
        self.policy
    }

    /// Returns `true` if the member may invoke a handler with these roles.
    ///
    /// An empty role list admits everyone, including events without a
    /// resolved member. Otherwise the member must hold at least one listed
    /// role name.
    pub fn permits(allowed_roles: &[String], member: Option<&GuildMember>) -> bool {
        allowed_roles.is_empty() || member.is_some_and(|m| m.has_any_role(allowed_roles))
    }

    /// Applies [`permits`](Self::permits) and logs a denial per the policy.
    pub fn check(&self, options: &HandlerOptions, routing: &RoutingContext) -> bool {
        if Self::permits(&options.allowed_roles, routing.member.as_ref()) {
            return true;
        }

        let member = routing
            .member
            .as_ref()
            .map(|m| m.display_name().to_string());
        match self.policy {
            DenialPolicy::Silent => debug!(
                handler = %options.name,
                member = ?member,
                "Handler denied by permission gate"
            ),
            DenialPolicy::Log => info!(
                handler = %options.name,
                member = ?member,
                required = ?options.allowed_roles,
                "Handler denied by permission gate"
            ),
        }
        false
    }
}
