//! Role and capability service.
//!
//! Authorization is kept outside the matching algorithm: the settlement
//! engine queries this service by `(subject, capability)` pair and the
//! algorithm itself stays testable independent of access policy. Three
//! kinds of grants exist:
//!
//! - account roles (`Admin`, `Pauser`, `Relayer`, `FeeExempt`)
//! - allow-listed fungible-token registries
//! - primary-market sellers, scoped per registry

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use swapmesh_types::{Address, ExchangeError, RegistryId, Result};

/// Account-level capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// May mutate configuration and grants.
    Admin,
    /// May pause and unpause matching.
    Pauser,
    /// May submit batches on behalf of another sender.
    Relayer,
    /// Sales by this account skip fee and royalty phases entirely.
    FeeExempt,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Admin => write!(f, "ADMIN"),
            Self::Pauser => write!(f, "PAUSER"),
            Self::Relayer => write!(f, "RELAYER"),
            Self::FeeExempt => write!(f, "FEE_EXEMPT"),
        }
    }
}

/// In-memory grant store queried by the settlement engine.
#[derive(Debug, Clone, Default)]
pub struct RoleService {
    account_roles: HashSet<(Address, Role)>,
    approved_fungibles: HashSet<RegistryId>,
    primary_sellers: HashSet<(Address, RegistryId)>,
}

impl RoleService {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ──────────────────── account roles ────────────────────

    pub fn grant(&mut self, subject: Address, role: Role) {
        self.account_roles.insert((subject, role));
    }

    pub fn revoke(&mut self, subject: Address, role: Role) {
        self.account_roles.remove(&(subject, role));
    }

    #[must_use]
    pub fn has_role(&self, subject: Address, role: Role) -> bool {
        self.account_roles.contains(&(subject, role))
    }

    /// Fail with `MissingRole` unless `subject` holds `role`.
    pub fn require(&self, subject: Address, role: Role) -> Result<()> {
        if self.has_role(subject, role) {
            return Ok(());
        }
        Err(ExchangeError::MissingRole {
            subject,
            role: role.to_string(),
        })
    }

    // ──────────────────── fungible allow-list ────────────────────

    pub fn approve_fungible(&mut self, registry: RegistryId) {
        self.approved_fungibles.insert(registry);
    }

    pub fn revoke_fungible(&mut self, registry: RegistryId) {
        self.approved_fungibles.remove(&registry);
    }

    #[must_use]
    pub fn is_fungible_approved(&self, registry: RegistryId) -> bool {
        self.approved_fungibles.contains(&registry)
    }

    // ──────────────────── primary-market sellers ────────────────────

    pub fn grant_primary_seller(&mut self, seller: Address, registry: RegistryId) {
        self.primary_sellers.insert((seller, registry));
    }

    pub fn revoke_primary_seller(&mut self, seller: Address, registry: RegistryId) {
        self.primary_sellers.remove(&(seller, registry));
    }

    #[must_use]
    pub fn is_primary_seller(&self, seller: Address, registry: RegistryId) -> bool {
        self.primary_sellers.contains(&(seller, registry))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(n: u8) -> Address {
        Address([n; 32])
    }

    #[test]
    fn grant_and_revoke() {
        let mut roles = RoleService::new();
        let alice = addr(1);
        assert!(!roles.has_role(alice, Role::Admin));

        roles.grant(alice, Role::Admin);
        assert!(roles.has_role(alice, Role::Admin));
        assert!(roles.require(alice, Role::Admin).is_ok());

        roles.revoke(alice, Role::Admin);
        assert!(!roles.has_role(alice, Role::Admin));
    }

    #[test]
    fn roles_are_independent() {
        let mut roles = RoleService::new();
        let alice = addr(1);
        roles.grant(alice, Role::Pauser);
        assert!(!roles.has_role(alice, Role::Admin));
        assert!(!roles.has_role(addr(2), Role::Pauser));
    }

    #[test]
    fn require_reports_subject_and_role() {
        let roles = RoleService::new();
        let err = roles.require(addr(3), Role::Relayer).unwrap_err();
        let msg = format!("{err}");
        assert!(msg.contains("SM_ERR_200"));
        assert!(msg.contains("RELAYER"));
    }

    #[test]
    fn fungible_allow_list() {
        let mut roles = RoleService::new();
        let reg = RegistryId([7u8; 32]);
        assert!(!roles.is_fungible_approved(reg));
        roles.approve_fungible(reg);
        assert!(roles.is_fungible_approved(reg));
        roles.revoke_fungible(reg);
        assert!(!roles.is_fungible_approved(reg));
    }

    #[test]
    fn primary_seller_is_scoped_per_registry() {
        let mut roles = RoleService::new();
        let seller = addr(1);
        let reg_a = RegistryId([1u8; 32]);
        let reg_b = RegistryId([2u8; 32]);
        roles.grant_primary_seller(seller, reg_a);
        assert!(roles.is_primary_seller(seller, reg_a));
        assert!(!roles.is_primary_seller(seller, reg_b));
    }
}
