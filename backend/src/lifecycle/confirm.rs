//! Confirmation before irreversible actions
//!
//! Cancel, retire and delete cannot be undone. Before issuing one, the
//! view shows a dialog built from [`confirmation_for`] and hands the user's
//! answer back as a [`ConfirmationOutcome`], which resolves into a payload
//! for [`super::apply_action`].

use super::{Action, ActionPayload};
use crate::validation::{require_reason, ValidationError};
use serde::{Deserialize, Serialize};

/// What a confirmation dialog must show and collect
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmationPrompt {
    pub action: Action,
    pub title: &'static str,
    pub message: &'static str,
    pub requires_reason: bool,
}

/// Prompt for an action, or `None` when it needs no confirmation
pub fn confirmation_for(action: Action) -> Option<ConfirmationPrompt> {
    let (title, message) = match action {
        Action::Cancel => (
            "Cancel payment schedule item",
            "The item will be cancelled and can no longer be billed.",
        ),
        Action::Retire => (
            "Retire payment schedule item",
            "The item will be retired and removed from active billing.",
        ),
        Action::Delete => (
            "Delete draft item",
            "The draft will be permanently deleted.",
        ),
        _ => return None,
    };
    Some(ConfirmationPrompt {
        action,
        title,
        message,
        requires_reason: action.requires_reason(),
    })
}

/// The user's answer to a confirmation dialog
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmationOutcome {
    pub confirmed: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl ConfirmationOutcome {
    pub fn confirmed() -> Self {
        Self {
            confirmed: true,
            reason: None,
        }
    }

    pub fn confirmed_with_reason(reason: impl Into<String>) -> Self {
        Self {
            confirmed: true,
            reason: Some(reason.into()),
        }
    }

    pub fn dismissed() -> Self {
        Self::default()
    }

    /// Turn the answer into an action payload
    ///
    /// `Ok(None)` means the user backed out and nothing should happen.
    ///
    /// # Example
    /// ```
    /// use offer_billing_core::lifecycle::confirm::ConfirmationOutcome;
    /// use offer_billing_core::lifecycle::Action;
    ///
    /// assert_eq!(ConfirmationOutcome::dismissed().into_payload(Action::Retire), Ok(None));
    /// assert!(ConfirmationOutcome::confirmed().into_payload(Action::Retire).is_err());
    ///
    /// let payload = ConfirmationOutcome::confirmed_with_reason("duplicate")
    ///     .into_payload(Action::Retire)
    ///     .unwrap()
    ///     .unwrap();
    /// assert_eq!(payload.reason.as_deref(), Some("duplicate"));
    /// ```
    pub fn into_payload(self, action: Action) -> Result<Option<ActionPayload>, ValidationError> {
        if !self.confirmed {
            return Ok(None);
        }
        if action.requires_reason() {
            let reason = require_reason(self.reason.as_deref(), action.as_str())?;
            return Ok(Some(ActionPayload::reason(reason)));
        }
        Ok(Some(ActionPayload::none()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_destructive_actions_prompt() {
        for action in Action::ALL {
            assert_eq!(
                confirmation_for(action).is_some(),
                action.is_destructive(),
                "{action}"
            );
        }
    }

    #[test]
    fn test_delete_prompt_needs_no_reason() {
        let prompt = confirmation_for(Action::Delete).unwrap();
        assert!(!prompt.requires_reason);

        let payload = ConfirmationOutcome::confirmed()
            .into_payload(Action::Delete)
            .unwrap();
        assert_eq!(payload, Some(ActionPayload::none()));
    }

    #[test]
    fn test_blank_reason_rejected() {
        let err = ConfirmationOutcome::confirmed_with_reason("   ")
            .into_payload(Action::Cancel)
            .unwrap_err();
        assert_eq!(err, ValidationError::ReasonRequired { action: "cancel" });
    }
}
