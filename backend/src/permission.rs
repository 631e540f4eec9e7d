//! Permission gate
//!
//! Decides whether an acting user may manage another user or a tenant
//! entity, and which fields of it they may touch.
//!
//! # Algorithm
//!
//! ```text
//! 1. actor is superadmin portal          -> Full
//! 2. subject is the actor's own user     -> SelfService (name, contact profile)
//! 3. rank(actor) > rank(subject)         -> Full      (strict; equal rank never manages)
//! 4. otherwise                           -> Denied
//! ```
//!
//! Users, agencies and accounts all go through the same [`access`] check.
//! They differ only in their [`FieldPolicy`] and in the rank an entity
//! carries as a subject.
//!
//! Client-side answers are advisory; the backend enforces the same rules.

use crate::models::user::{Account, Agency, PortalType, Role, User};
use serde::{Deserialize, Serialize};

/// Rank of a role: admin=3, manager=2, user=1
pub fn role_rank(role: Role) -> u8 {
    role.rank()
}

/// Kind of entity being managed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    User,
    Agency,
    Account,
}

/// Editable field of a managed entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    Name,
    /// Email, phone, address and similar contact details
    ContactProfile,
    Role,
    PortalType,
    AccountId,
    AgencyId,
    Status,
    CommissionSplit,
}

/// Field restrictions for one entity kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldPolicy {
    /// Every field the entity has
    pub fields: &'static [Field],

    /// Fields a user may change on their own record
    pub self_service: &'static [Field],

    /// Fields only a superadmin may change
    pub superadmin_only: &'static [Field],
}

impl FieldPolicy {
    pub fn has(&self, field: Field) -> bool {
        self.fields.contains(&field)
    }
}

const USER_POLICY: FieldPolicy = FieldPolicy {
    fields: &[
        Field::Name,
        Field::ContactProfile,
        Field::Role,
        Field::PortalType,
        Field::AccountId,
        Field::AgencyId,
        Field::Status,
    ],
    self_service: &[Field::Name, Field::ContactProfile],
    superadmin_only: &[Field::PortalType, Field::AccountId],
};

const AGENCY_POLICY: FieldPolicy = FieldPolicy {
    fields: &[
        Field::Name,
        Field::ContactProfile,
        Field::AccountId,
        Field::Status,
        Field::CommissionSplit,
    ],
    self_service: &[],
    superadmin_only: &[Field::AccountId],
};

const ACCOUNT_POLICY: FieldPolicy = FieldPolicy {
    fields: &[Field::Name, Field::ContactProfile, Field::Status],
    self_service: &[],
    superadmin_only: &[Field::Status],
};

impl EntityKind {
    pub fn field_policy(self) -> FieldPolicy {
        match self {
            EntityKind::User => USER_POLICY,
            EntityKind::Agency => AGENCY_POLICY,
            EntityKind::Account => ACCOUNT_POLICY,
        }
    }
}

/// Something an actor wants to manage, reduced to what the gate compares
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subject<'a> {
    pub kind: EntityKind,
    pub id: &'a str,
    pub rank: u8,
}

impl<'a> Subject<'a> {
    pub fn user(user: &'a User) -> Self {
        Self {
            kind: EntityKind::User,
            id: &user.id,
            rank: user.rank(),
        }
    }

    /// Agencies rank as `user`, so managers and admins may edit them
    pub fn agency(agency: &'a Agency) -> Self {
        Self {
            kind: EntityKind::Agency,
            id: &agency.id,
            rank: Role::User.rank(),
        }
    }

    /// Accounts rank as `manager`, so only admins may edit them
    pub fn account(account: &'a Account) -> Self {
        Self {
            kind: EntityKind::Account,
            id: &account.id,
            rank: Role::Manager.rank(),
        }
    }
}

/// Level of access an actor has to a subject
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Full,
    SelfService,
    Denied,
}

/// Resolve the actor's access to a subject
pub fn access(actor: &User, subject: &Subject<'_>) -> Access {
    if actor.portal_type == PortalType::Superadmin {
        return Access::Full;
    }
    if subject.kind == EntityKind::User && actor.id == subject.id {
        return Access::SelfService;
    }
    if actor.rank() > subject.rank {
        return Access::Full;
    }
    Access::Denied
}

/// Whether the actor may manage the subject at all
pub fn can_manage(actor: &User, subject: &Subject<'_>) -> bool {
    access(actor, subject) != Access::Denied
}

/// Whether the actor may manage (open and edit) another user
///
/// # Example
/// ```
/// use offer_billing_core::permission::can_manage_user;
/// use offer_billing_core::{PortalType, Role, User};
///
/// let admin = User::new("a1", Role::Admin, PortalType::Account);
/// let other_admin = User::new("a2", Role::Admin, PortalType::Account);
/// let manager = User::new("m1", Role::Manager, PortalType::Account);
///
/// assert!(can_manage_user(&admin, &manager));
/// assert!(!can_manage_user(&admin, &other_admin)); // Equal rank
/// assert!(!can_manage_user(&manager, &admin));
/// ```
pub fn can_manage_user(actor: &User, target: &User) -> bool {
    can_manage(actor, &Subject::user(target))
}

/// Whether the actor may delete another user
///
/// Requires the admin role and a strictly higher rank than the target,
/// whatever the portal. Never applies to the actor's own account.
pub fn can_delete_user(actor: &User, target: &User) -> bool {
    actor.role == Role::Admin && actor.id != target.id && actor.rank() > target.rank()
}

/// Whether the actor may change one field of the subject
pub fn can_edit_field(actor: &User, subject: &Subject<'_>, field: Field) -> bool {
    let policy = subject.kind.field_policy();
    if !policy.has(field) {
        return false;
    }
    match access(actor, subject) {
        Access::Denied => false,
        Access::SelfService => policy.self_service.contains(&field),
        Access::Full => actor.is_superadmin() || !policy.superadmin_only.contains(&field),
    }
}

/// Fields of the subject the actor may change
pub fn editable_fields(actor: &User, subject: &Subject<'_>) -> Vec<Field> {
    subject
        .kind
        .field_policy()
        .fields
        .iter()
        .copied()
        .filter(|field| can_edit_field(actor, subject, *field))
        .collect()
}

/// Whether the actor may give `target` the role `new_role`
///
/// Non-superadmins can only hand out roles strictly below their own.
pub fn can_assign_role(actor: &User, target: &User, new_role: Role) -> bool {
    if !can_edit_field(actor, &Subject::user(target), Field::Role) {
        return false;
    }
    actor.is_superadmin() || new_role.rank() < actor.rank()
}

/// Whether the actor's portal scope covers a record owned by a tenant
///
/// Superadmins see everything; account-portal users their own account;
/// agency-portal users their own agency.
pub fn can_edit_tenant_record(actor: &User, account_id: &str, agency_id: Option<&str>) -> bool {
    match actor.portal_type {
        PortalType::Superadmin => true,
        PortalType::Account => actor.account_id.as_deref() == Some(account_id),
        PortalType::Agency => {
            let same_agency = actor.agency_id.is_some() && actor.agency_id.as_deref() == agency_id;
            let same_account = actor
                .account_id
                .as_deref()
                .map_or(true, |own| own == account_id);
            same_agency && same_account
        }
    }
}
