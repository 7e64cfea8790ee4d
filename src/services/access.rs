//! Role checks and capability resolution.
//!
//! Authorization is fail-closed: if role membership cannot be established,
//! the caller has no roles and no capabilities.

use crate::db::RoleStore;
use crate::error::{CustodyError, Result};
use std::sync::Arc;
use uuid::Uuid;

pub const ADMIN_ROLE: &str = "admin";

/// Privileged operations gated by role membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    /// Activate or deactivate other accounts
    ManageUsers,
    /// Bind roles to accounts
    AssignRoles,
    /// Read the audit trail of every actor, not just one's own
    ViewAllAudit,
}

const ALL_CAPABILITIES: [Capability; 3] = [
    Capability::ManageUsers,
    Capability::AssignRoles,
    Capability::ViewAllAudit,
];

/// Resolved capabilities for one actor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapabilitySet {
    granted: Vec<Capability>,
}

impl CapabilitySet {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn contains(&self, capability: Capability) -> bool {
        self.granted.contains(&capability)
    }
}

/// Capabilities granted by one role name. `admin` is the only role this
/// core interprets; other roles exist as data but confer nothing here.
fn capabilities_for_role(role: &str) -> &'static [Capability] {
    match role {
        ADMIN_ROLE => &ALL_CAPABILITIES,
        _ => &[],
    }
}

/// Authorization decisions over the role store.
#[derive(Clone)]
pub struct AccessGate {
    roles: Arc<dyn RoleStore>,
}

impl AccessGate {
    pub fn new(roles: Arc<dyn RoleStore>) -> Self {
        Self { roles }
    }

    /// Whether the actor holds the named role. A store failure denies.
    pub async fn has_role(&self, actor: Uuid, role: &str) -> bool {
        self.roles.has_role(actor, role).await.unwrap_or(false)
    }

    /// Resolve the actor's capability set from their role bindings.
    /// A store failure resolves to the empty set.
    pub async fn resolve(&self, actor: Uuid) -> CapabilitySet {
        let roles = match self.roles.roles_for_user(actor).await {
            Ok(roles) => roles,
            Err(_) => return CapabilitySet::empty(),
        };

        let mut granted = Vec::new();
        for role in &roles {
            for capability in capabilities_for_role(&role.name) {
                if !granted.contains(capability) {
                    granted.push(*capability);
                }
            }
        }

        CapabilitySet { granted }
    }

    /// Require a capability, erroring with `AuthorizationDenied` otherwise.
    pub async fn require(&self, actor: Uuid, capability: Capability) -> Result<()> {
        if self.resolve(actor).await.contains(capability) {
            Ok(())
        } else {
            Err(CustodyError::AuthorizationDenied)
        }
    }
}
