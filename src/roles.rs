//! Permission tiers and the role check supplied by the host platform.
//!
//! The gateway forwards the role ids the invoking member holds. Which role id grants which
//! tier is decided here, behind a trait, so the command handlers never look at
//! platform-specific role data.

use crate::middleware::auth::AuthContext;

/// Permission tier required by a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// May redeem keys and manage their own HWID.
    Purchaser,
    /// May generate, dump and reset keys and clear cooldowns.
    Administrator,
}

/// `hasRole(principal, role)` as provided by the host.
pub trait RolePredicate: Send + Sync {
    fn has_role(&self, auth: &AuthContext, role: Role) -> bool;
}

/// Maps each tier to one configured role id.
#[derive(Debug, Clone)]
pub struct ConfiguredRoles {
    pub purchaser_role_id: String,
    pub admin_role_id: String,
}

impl RolePredicate for ConfiguredRoles {
    fn has_role(&self, auth: &AuthContext, role: Role) -> bool {
        let wanted = match role {
            Role::Purchaser => &self.purchaser_role_id,
            Role::Administrator => &self.admin_role_id,
        };
        auth.role_ids.iter().any(|id| id == wanted)
    }
}
