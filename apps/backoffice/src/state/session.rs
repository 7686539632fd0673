//! # Session
//!
//! Who is issuing commands, and what they may do.
//!
//! ## Role Matrix
//! ```text
//! ┌─────────────────┬───────┬─────────┬────────┬────────┐
//! │ Permission      │ Owner │ Manager │ Seller │ Viewer │
//! ├─────────────────┼───────┼─────────┼────────┼────────┤
//! │ ViewSales       │   ✓   │    ✓    │   ✓    │   ✓    │
//! │ CreateSale      │   ✓   │    ✓    │   ✓    │        │
//! │ RecordPayment   │   ✓   │    ✓    │   ✓    │        │
//! │ EditSale        │   ✓   │    ✓    │        │        │
//! │ DeleteSale      │   ✓   │    ✓    │        │        │
//! │ ManageSettings  │   ✓   │         │        │        │
//! └─────────────────┴───────┴─────────┴────────┴────────┘
//! ```
//!
//! The core trusts its caller; every command checks the session first.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ApiError;

/// Operator role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    Owner,
    Manager,
    Seller,
    Viewer,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Owner => "owner",
            Role::Manager => "manager",
            Role::Seller => "seller",
            Role::Viewer => "viewer",
        }
    }

    /// Whether this role grants `permission`.
    pub fn allows(&self, permission: Permission) -> bool {
        use Permission::*;
        match self {
            Role::Owner => true,
            Role::Manager => permission != ManageSettings,
            Role::Seller => matches!(permission, ViewSales | CreateSale | RecordPayment),
            Role::Viewer => permission == ViewSales,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "owner" => Ok(Role::Owner),
            "manager" => Ok(Role::Manager),
            "seller" => Ok(Role::Seller),
            "viewer" => Ok(Role::Viewer),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

/// Something a command needs to be allowed to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    ViewSales,
    CreateSale,
    RecordPayment,
    EditSale,
    DeleteSale,
    ManageSettings,
}

impl Permission {
    pub fn as_str(&self) -> &'static str {
        match self {
            Permission::ViewSales => "view_sales",
            Permission::CreateSale => "create_sale",
            Permission::RecordPayment => "record_payment",
            Permission::EditSale => "edit_sale",
            Permission::DeleteSale => "delete_sale",
            Permission::ManageSettings => "manage_settings",
        }
    }
}

/// The operator behind this process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub user_id: String,
    pub role: Role,
    /// Stores this operator may touch. Empty means every store.
    pub store_ids: Vec<String>,
}

impl Session {
    pub fn new(user_id: impl Into<String>, role: Role) -> Self {
        Session {
            user_id: user_id.into(),
            role,
            store_ids: Vec::new(),
        }
    }

    /// Restricts the session to the given stores.
    pub fn with_stores<I, S>(mut self, store_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.store_ids = store_ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn can_access(&self, store_id: &str) -> bool {
        self.store_ids.is_empty() || self.store_ids.iter().any(|s| s == store_id)
    }

    /// Fails with `FORBIDDEN` unless the role grants `permission` on `store_id`.
    pub fn require(&self, permission: Permission, store_id: &str) -> Result<(), ApiError> {
        if !self.role.allows(permission) {
            return Err(ApiError::forbidden(format!(
                "Role {} lacks permission {}",
                self.role,
                permission.as_str()
            )));
        }
        if !self.can_access(store_id) {
            return Err(ApiError::forbidden(format!(
                "User {} has no access to store {}",
                self.user_id, store_id
            )));
        }
        Ok(())
    }
}
