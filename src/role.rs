//! Roles handed out by the authentication provider and what each one may do.

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Manager,
    User,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    ViewDashboard,
    ViewCatalog,
    ManageProducts,
    ManageClients,
    CreateDocuments,
    FinalizeDocuments,
    CancelDocuments,
    ManageUsers,
}

impl Role {
    /// Whether this role may perform `permission`.
    ///
    /// Admins may do everything, managers everything except managing users, and users may only
    /// consult the dashboard and catalog and draft documents.
    ///
    /// # Example
    /// ```rust
    /// use facture::role::{Permission, Role};
    ///
    /// let role: Role = "Manager".parse().unwrap();
    /// assert!(role.permits(Permission::FinalizeDocuments));
    /// assert!(!role.permits(Permission::ManageUsers));
    /// ```
    pub fn permits(&self, permission: Permission) -> bool {
        match self {
            Role::Admin => true,
            Role::Manager => permission != Permission::ManageUsers,
            Role::User => matches!(
                permission,
                Permission::ViewDashboard | Permission::ViewCatalog | Permission::CreateDocuments
            ),
        }
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "manager" => Ok(Role::Manager),
            "user" => Ok(Role::User),
            other => Err(Error::invalid_input(format!("unknown role '{other}'"))),
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tag = match self {
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::User => "user",
        };
        write!(f, "{tag}")
    }
}
