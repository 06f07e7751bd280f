use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    Admin,
    Manager,
    Viewer,
}

impl Display for UserRole {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            UserRole::Admin => write!(f, "admin"),
            UserRole::Manager => write!(f, "manager"),
            UserRole::Viewer => write!(f, "viewer"),
        }
    }
}

impl FromStr for UserRole {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(UserRole::Admin),
            "manager" => Ok(UserRole::Manager),
            "viewer" => Ok(UserRole::Viewer),
            _ => Err(anyhow::anyhow!("Invalid user role: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    ViewContent,
    ManageContent,
    ManageCustomers,
}

/// Permissions granted by a role. Roles are strictly nested: every role
/// includes the permissions of the roles below it.
pub fn role_permissions(role: UserRole) -> HashSet<Permission> {
    let mut perms = HashSet::new();
    perms.insert(Permission::ViewContent);
    if matches!(role, UserRole::Admin | UserRole::Manager) {
        perms.insert(Permission::ManageContent);
    }
    if matches!(role, UserRole::Admin) {
        perms.insert(Permission::ManageCustomers);
    }
    perms
}

/// The resolved identity of the caller, as provided by the identity
/// collaborator. `company` is the raw affiliation string used for customer
/// resolution; absence of affiliation is a normal state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: Uuid,
    pub email: String,
    pub company: Option<String>,
    pub role: UserRole,
}

impl CurrentUser {
    pub fn new(id: Uuid, email: impl Into<String>, company: Option<String>, role: UserRole) -> Self {
        Self {
            id,
            email: email.into(),
            company,
            role,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip() {
        for role in [UserRole::Admin, UserRole::Manager, UserRole::Viewer] {
            assert_eq!(role.to_string().parse::<UserRole>().unwrap(), role);
        }
        assert!("operator".parse::<UserRole>().is_err());
    }

    #[test]
    fn test_viewer_permissions() {
        let perms = role_permissions(UserRole::Viewer);
        assert!(perms.contains(&Permission::ViewContent));
        assert!(!perms.contains(&Permission::ManageContent));
        assert!(!perms.contains(&Permission::ManageCustomers));
    }

    #[test]
    fn test_manager_permissions() {
        let perms = role_permissions(UserRole::Manager);
        assert!(perms.contains(&Permission::ManageContent));
        assert!(!perms.contains(&Permission::ManageCustomers));
    }

    #[test]
    fn test_admin_has_all_permissions() {
        let perms = role_permissions(UserRole::Admin);
        assert_eq!(perms.len(), 3);
    }
}
