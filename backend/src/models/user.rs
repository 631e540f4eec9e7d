//! Users and tenants
//!
//! A tenant hierarchy of accounts → agencies → users. Users carry a role
//! (admin, manager, user) that is totally ordered by rank, and a portal type
//! that scopes which tenant they operate in. The two are independent: an
//! agency-portal admin and an account-portal admin share a rank but not a
//! scope.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Role of a user within their tenant
///
/// Ordering follows rank, so `Role::Admin > Role::Manager > Role::User`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Manager,
    Admin,
}

impl Role {
    /// All roles, lowest rank first
    pub const ALL: [Role; 3] = [Role::User, Role::Manager, Role::Admin];

    /// Numeric rank: admin=3, manager=2, user=1
    ///
    /// # Example
    /// ```
    /// use offer_billing_core::Role;
    ///
    /// assert_eq!(Role::Admin.rank(), 3);
    /// assert!(Role::Manager.rank() > Role::User.rank());
    /// ```
    pub fn rank(self) -> u8 {
        match self {
            Role::Admin => 3,
            Role::Manager => 2,
            Role::User => 1,
        }
    }

    /// Whether this is the lowest tier
    pub fn is_lowest(self) -> bool {
        self == Role::User
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::User => "user",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tenancy scope of the portal a user signs in to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortalType {
    Superadmin,
    Account,
    Agency,
}

impl fmt::Display for PortalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PortalType::Superadmin => "superadmin",
            PortalType::Account => "account",
            PortalType::Agency => "agency",
        })
    }
}

/// An authenticated user, as returned by the backend
///
/// # Example
/// ```
/// use offer_billing_core::{PortalType, Role, User};
///
/// let user = User::new("u-1", Role::Manager, PortalType::Account)
///     .with_account("acc-1")
///     .with_name("Dana");
///
/// assert_eq!(user.role, Role::Manager);
/// assert_eq!(user.account_id.as_deref(), Some("acc-1"));
/// assert!(!user.is_superadmin());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub email: String,

    pub role: Role,

    pub portal_type: PortalType,

    #[serde(default)]
    pub account_id: Option<String>,

    #[serde(default)]
    pub agency_id: Option<String>,
}

impl User {
    pub fn new(id: impl Into<String>, role: Role, portal_type: PortalType) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            email: String::new(),
            role,
            portal_type,
            account_id: None,
            agency_id: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = email.into();
        self
    }

    pub fn with_account(mut self, account_id: impl Into<String>) -> Self {
        self.account_id = Some(account_id.into());
        self
    }

    pub fn with_agency(mut self, agency_id: impl Into<String>) -> Self {
        self.agency_id = Some(agency_id.into());
        self
    }

    pub fn is_superadmin(&self) -> bool {
        self.portal_type == PortalType::Superadmin
    }

    pub fn rank(&self) -> u8 {
        self.role.rank()
    }
}

/// Status of a tenant account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    Active,
    Suspended,
    Inactive,
}

/// Top-level tenant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    pub name: String,
    pub status: AccountStatus,
}

/// Agency operating under an account
///
/// `commission_split` is a percentage in `0..=100`; see
/// [`crate::validation::validate_commission_split`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agency {
    pub id: String,
    pub name: String,
    pub account_id: String,

    #[serde(default)]
    pub commission_split: Option<f64>,
}
