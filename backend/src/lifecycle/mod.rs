//! Payment schedule item lifecycle
//!
//! One place that decides, for an item and an acting user, which actions
//! are valid and what each one does. Views ask [`allowed_actions`] to
//! enable buttons and run [`apply_action`] to compute the new local state;
//! the backend performs the same transition authoritatively.
//!
//! # Transition table
//!
//! | Action   | From                               | To          | Min role |
//! |----------|------------------------------------|-------------|----------|
//! | edit     | draft, pending                     | (unchanged) | user     |
//! | approve  | pending                            | approved    | manager  |
//! | start    | approved                           | in-progress | user     |
//! | complete | approved, in-progress              | completed   | user     |
//! | cancel   | pending, approved, in-progress     | cancelled   | user     |
//! | retire   | draft, pending, approved, in-progress | retired  | user     |
//! | delete   | draft                              | (removed)   | admin    |
//!
//! Every action additionally requires the item to fall inside the actor's
//! portal scope ([`crate::permission::can_edit_tenant_record`]).
//!
//! # Check order
//!
//! 1. Payload validation ([`ValidationError`]): a blank retire/cancel
//!    reason fails here whatever the status.
//! 2. State ([`LifecycleError::InvalidState`]).
//! 3. Permission ([`LifecycleError::Permission`]).

pub mod confirm;
mod error;

pub use error::{Denial, LifecycleError};

use crate::models::payload::ItemUpdate;
use crate::models::schedule_item::{ItemStatus, PaymentScheduleItem};
use crate::models::user::{Role, User};
use crate::permission::can_edit_tenant_record;
use crate::validation::{require_reason, validate_update, ValidationError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Something a user can ask to do to a schedule item
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Edit,
    Approve,
    Start,
    Complete,
    Cancel,
    Retire,
    Delete,
}

impl Action {
    pub const ALL: [Action; 7] = [
        Action::Edit,
        Action::Approve,
        Action::Start,
        Action::Complete,
        Action::Cancel,
        Action::Retire,
        Action::Delete,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Action::Edit => "edit",
            Action::Approve => "approve",
            Action::Start => "start",
            Action::Complete => "complete",
            Action::Cancel => "cancel",
            Action::Retire => "retire",
            Action::Delete => "delete",
        }
    }

    /// Statuses the action may be taken from
    pub fn source_statuses(self) -> &'static [ItemStatus] {
        use ItemStatus::*;
        match self {
            Action::Edit => &[Draft, Pending],
            Action::Approve => &[Pending],
            Action::Start => &[Approved],
            Action::Complete => &[Approved, InProgress],
            Action::Cancel => &[Pending, Approved, InProgress],
            Action::Retire => &[Draft, Pending, Approved, InProgress],
            Action::Delete => &[Draft],
        }
    }

    /// Status the item ends in; `None` for edit (unchanged) and delete (removed)
    pub fn target_status(self) -> Option<ItemStatus> {
        match self {
            Action::Edit | Action::Delete => None,
            Action::Approve => Some(ItemStatus::Approved),
            Action::Start => Some(ItemStatus::InProgress),
            Action::Complete => Some(ItemStatus::Completed),
            Action::Cancel => Some(ItemStatus::Cancelled),
            Action::Retire => Some(ItemStatus::Retired),
        }
    }

    /// Lowest role allowed to take the action
    ///
    /// Approval needs any role above the lowest tier. Deletion needs admin,
    /// which is also the highest rank, so "at least admin" is "exactly admin".
    pub fn min_role(self) -> Role {
        match self {
            Action::Approve => Role::Manager,
            Action::Delete => Role::Admin,
            _ => Role::User,
        }
    }

    pub fn requires_reason(self) -> bool {
        matches!(self, Action::Cancel | Action::Retire)
    }

    /// Irreversible actions that should be confirmed first
    pub fn is_destructive(self) -> bool {
        matches!(self, Action::Cancel | Action::Retire | Action::Delete)
    }

    pub fn can_start_from(self, status: ItemStatus) -> bool {
        self.source_statuses().contains(&status)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status reached by taking `action` from `status`, if the edge exists
///
/// Edit maps a status onto itself.
pub fn next_status(status: ItemStatus, action: Action) -> Option<ItemStatus> {
    if !action.can_start_from(status) {
        return None;
    }
    match action {
        Action::Edit => Some(status),
        other => other.target_status(),
    }
}

/// Extra input some actions carry
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActionPayload {
    /// Required for cancel and retire
    pub reason: Option<String>,

    /// Changes for edit; `None` is an empty edit
    pub update: Option<ItemUpdate>,
}

impl ActionPayload {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn reason(reason: impl Into<String>) -> Self {
        Self {
            reason: Some(reason.into()),
            update: None,
        }
    }

    pub fn update(update: ItemUpdate) -> Self {
        Self {
            reason: None,
            update: Some(update),
        }
    }
}

/// Result of applying an action locally
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Item after the action
    Updated(PaymentScheduleItem),

    /// Item was deleted
    Removed { id: String },
}

fn validate_payload(
    item: &PaymentScheduleItem,
    action: Action,
    payload: &ActionPayload,
) -> Result<(), ValidationError> {
    if action.requires_reason() {
        require_reason(payload.reason.as_deref(), action.as_str())?;
    }
    if action == Action::Edit {
        if let Some(update) = &payload.update {
            validate_update(item, update)?;
        }
    }
    Ok(())
}

fn check_state(item: &PaymentScheduleItem, action: Action) -> Result<(), LifecycleError> {
    if !action.can_start_from(item.status) {
        return Err(LifecycleError::InvalidState {
            action,
            status: item.status,
        });
    }
    Ok(())
}

fn check_permission(
    item: &PaymentScheduleItem,
    action: Action,
    actor: &User,
) -> Result<(), LifecycleError> {
    let denial = if !can_edit_tenant_record(actor, &item.account_id, item.agency_id.as_deref()) {
        Some(Denial::OutsideTenant)
    } else if action == Action::Delete && actor.role != Role::Admin {
        Some(Denial::AdminOnly)
    } else if actor.role < action.min_role() {
        Some(Denial::RoleTooLow {
            required: action.min_role(),
        })
    } else {
        None
    };

    match denial {
        Some(denial) => Err(LifecycleError::Permission { action, denial }),
        None => Ok(()),
    }
}

/// Full check of an action: payload, then state, then permission
pub fn check_action(
    item: &PaymentScheduleItem,
    action: Action,
    actor: &User,
    payload: &ActionPayload,
) -> Result<(), LifecycleError> {
    validate_payload(item, action, payload)?;
    check_state(item, action)?;
    check_permission(item, action, actor)
}

/// Whether the action is available, assuming a well-formed payload
pub fn is_allowed(item: &PaymentScheduleItem, action: Action, actor: &User) -> bool {
    check_state(item, action).is_ok() && check_permission(item, action, actor).is_ok()
}

/// Actions the actor can take on the item right now
///
/// # Example
/// ```
/// use chrono::Utc;
/// use offer_billing_core::lifecycle::{allowed_actions, Action};
/// use offer_billing_core::{ItemStatus, ItemType, PaymentScheduleItem, PortalType, Role, User};
///
/// let manager = User::new("m1", Role::Manager, PortalType::Account).with_account("acc-1");
/// let item = PaymentScheduleItem::new("psi-1", "acc-1", "ol-1", ItemType::OneTime, 10_000, Utc::now())
///     .with_status(ItemStatus::Pending);
///
/// let actions = allowed_actions(&item, &manager);
/// assert!(actions.contains(&Action::Approve));
/// assert!(actions.contains(&Action::Cancel));
/// assert!(!actions.contains(&Action::Complete));
/// assert!(!actions.contains(&Action::Delete));
/// ```
pub fn allowed_actions(item: &PaymentScheduleItem, actor: &User) -> BTreeSet<Action> {
    Action::ALL
        .into_iter()
        .filter(|action| is_allowed(item, *action, actor))
        .collect()
}

/// Change an already-checked action makes to an item that survives it
#[derive(Debug, Clone, Copy)]
enum Change<'a> {
    Edit(Option<&'a ItemUpdate>),
    Advance(ItemStatus),
    Cancel(&'a str),
    Retire(&'a str),
}

impl<'a> Change<'a> {
    /// `None` for delete, which removes the item instead
    fn of(action: Action, payload: &'a ActionPayload) -> Option<Self> {
        let reason = payload.reason.as_deref().unwrap_or_default().trim();
        match action {
            Action::Edit => Some(Change::Edit(payload.update.as_ref())),
            Action::Cancel => Some(Change::Cancel(reason)),
            Action::Retire => Some(Change::Retire(reason)),
            Action::Approve | Action::Start | Action::Complete => {
                action.target_status().map(Change::Advance)
            }
            Action::Delete => None,
        }
    }
}

fn check_logged(
    item: &PaymentScheduleItem,
    action: Action,
    actor: &User,
    payload: &ActionPayload,
) -> Result<(), LifecycleError> {
    check_action(item, action, actor, payload).map_err(|err| {
        tracing::debug!(
            item_id = %item.id,
            %action,
            status = %item.status,
            actor_id = %actor.id,
            error = %err,
            "lifecycle action rejected"
        );
        err
    })
}

/// Apply an action to a copy of the item
///
/// The input is never mutated; on error nothing changes.
pub fn apply_action(
    item: &PaymentScheduleItem,
    action: Action,
    actor: &User,
    payload: &ActionPayload,
) -> Result<Outcome, LifecycleError> {
    match Change::of(action, payload) {
        Some(change) => apply_change(item, action, actor, payload, change).map(Outcome::Updated),
        None => {
            check_logged(item, action, actor, payload)?;
            tracing::info!(item_id = %item.id, actor_id = %actor.id, "draft item removed");
            Ok(Outcome::Removed {
                id: item.id.clone(),
            })
        }
    }
}

fn apply_change(
    item: &PaymentScheduleItem,
    action: Action,
    actor: &User,
    payload: &ActionPayload,
    change: Change<'_>,
) -> Result<PaymentScheduleItem, LifecycleError> {
    check_logged(item, action, actor, payload)?;

    let updated = transition(item.clone(), change, actor);
    tracing::info!(
        item_id = %item.id,
        %action,
        from = %item.status,
        to = %updated.status,
        "lifecycle action applied"
    );
    Ok(updated)
}

fn transition(mut item: PaymentScheduleItem, change: Change<'_>, actor: &User) -> PaymentScheduleItem {
    match change {
        Change::Edit(update) => {
            if let Some(update) = update {
                update.merge_into(&mut item);
            }
        }
        Change::Advance(status) => item.status = status,
        Change::Cancel(reason) => {
            item.status = ItemStatus::Cancelled;
            item.cancellation_reason = Some(reason.to_string());
        }
        Change::Retire(reason) => {
            item.status = ItemStatus::Retired;
            item.retirement_reason = Some(reason.to_string());
            item.retired_by = Some(actor.id.clone());
        }
    }
    item
}

/// `pending → approved`; re-approving is rejected, not a no-op
pub fn approve(item: &PaymentScheduleItem, actor: &User) -> Result<PaymentScheduleItem, LifecycleError> {
    let payload = ActionPayload::none();
    apply_change(item, Action::Approve, actor, &payload, Change::Advance(ItemStatus::Approved))
}

/// `approved → in-progress`
pub fn start(item: &PaymentScheduleItem, actor: &User) -> Result<PaymentScheduleItem, LifecycleError> {
    let payload = ActionPayload::none();
    apply_change(item, Action::Start, actor, &payload, Change::Advance(ItemStatus::InProgress))
}

/// `approved | in-progress → completed`
pub fn complete(item: &PaymentScheduleItem, actor: &User) -> Result<PaymentScheduleItem, LifecycleError> {
    let payload = ActionPayload::none();
    apply_change(item, Action::Complete, actor, &payload, Change::Advance(ItemStatus::Completed))
}

/// `pending | approved | in-progress → cancelled`, recording the reason
pub fn cancel(
    item: &PaymentScheduleItem,
    actor: &User,
    reason: &str,
) -> Result<PaymentScheduleItem, LifecycleError> {
    let payload = ActionPayload::reason(reason);
    apply_change(item, Action::Cancel, actor, &payload, Change::Cancel(reason.trim()))
}

/// Any non-terminal status `→ retired`, recording reason and actor
pub fn retire(
    item: &PaymentScheduleItem,
    actor: &User,
    reason: &str,
) -> Result<PaymentScheduleItem, LifecycleError> {
    let payload = ActionPayload::reason(reason);
    apply_change(item, Action::Retire, actor, &payload, Change::Retire(reason.trim()))
}

/// Merge an update into a draft or pending item
pub fn edit(
    item: &PaymentScheduleItem,
    actor: &User,
    update: &ItemUpdate,
) -> Result<PaymentScheduleItem, LifecycleError> {
    let payload = ActionPayload::update(update.clone());
    apply_change(item, Action::Edit, actor, &payload, Change::Edit(Some(update)))
}

/// Check that a draft may be deleted by the actor (admin only)
pub fn delete_draft(item: &PaymentScheduleItem, actor: &User) -> Result<(), LifecycleError> {
    apply_action(item, Action::Delete, actor, &ActionPayload::none()).map(|_| ())
}
