//! Behavioural contracts of the KD commands, expressed as data.
//!
//! The command documentation describes, for every command, which event KD
//! posts on success, which dashboard state it requires, and which conditions
//! make it fail.  This module captures that table so a host (or a test
//! double of KD) can reason about it without parsing prose.
//!
//! Only the *mode* preconditions are checkable here ([`CommandContract::check`]).
//! Content-based failures (an unknown filter, an empty title, …) depend on
//! dashboard data this crate never sees; they are listed in
//! [`CommandContract::failure_triggers`] for reference.
//!
//! Every failure is reported the same way: one
//! [`GdcEvent::CommandFailed`] event, no partial success, no retry.

use thiserror::Error;

use crate::protocol::commands::KdCommandType;
use crate::protocol::common::{CommandFailedBody, GdcEvent, MessageEnvelope};
use crate::protocol::events::KdEventType;

/// Mode of a displayed dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DashboardMode {
    View,
    Edit,
}

/// What KD is currently showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewState {
    /// No dashboard is displayed.
    NoDashboard,
    /// A dashboard is displayed in the given mode.
    Showing(DashboardMode),
}

/// Dashboard state a command requires before KD acts on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequiredView {
    /// No requirement.
    Any,
    /// Some dashboard must be shown, in either mode.
    DashboardShown,
    /// A dashboard must be shown in edit mode.
    EditMode,
    /// A dashboard must be shown in view mode.
    ViewMode,
}

/// A condition under which KD posts the failure event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error)]
pub enum FailureTrigger {
    #[error("no dashboard is shown")]
    NoDashboard,
    #[error("dashboard is not in edit mode")]
    RequiresEditMode,
    #[error("dashboard is not in view mode")]
    RequiresViewMode,
    #[error("dashboard is not eligible for save (empty or in error)")]
    NotEligibleForSave,
    #[error("title is invalid")]
    InvalidTitle,
    #[error("title is empty")]
    EmptyTitle,
    #[error("user may not create dashboards")]
    NoCreatePermission,
    #[error("insight reference does not refer to a valid insight")]
    InvalidInsightReference,
    #[error("new filters cannot be added in view mode")]
    NewFilterInViewMode,
    #[error("filter does not exist")]
    FilterNotFound,
    #[error("filter elements are invalid")]
    InvalidFilterElements,
    #[error("filter item limit exceeded")]
    FilterLimitExceeded,
    #[error("filter is not on the filter bar")]
    FilterNotOnFilterBar,
}

impl FailureTrigger {
    /// Builds the failure event KD posts for this trigger.
    pub fn into_failure(self) -> MessageEnvelope<GdcEvent> {
        MessageEnvelope::kd(GdcEvent::CommandFailed(CommandFailedBody {
            reason: self.to_string(),
        }))
    }
}

/// Contract of one command kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandContract {
    pub command: KdCommandType,
    /// Event posted on success; `None` when KD posts nothing.
    pub success_event: Option<KdEventType>,
    pub required_view: RequiredView,
    /// Content-based failure conditions beyond the view requirement.
    pub failure_triggers: &'static [FailureTrigger],
}

impl CommandContract {
    /// Checks the view requirement against the current state.
    ///
    /// # Errors
    ///
    /// Returns the trigger KD would report when the requirement is not met:
    /// [`FailureTrigger::NoDashboard`] takes precedence over the mode
    /// triggers.
    pub fn check(&self, state: ViewState) -> Result<(), FailureTrigger> {
        match (self.required_view, state) {
            (RequiredView::Any, _) => Ok(()),
            (_, ViewState::NoDashboard) => Err(FailureTrigger::NoDashboard),
            (RequiredView::DashboardShown, ViewState::Showing(_)) => Ok(()),
            (RequiredView::EditMode, ViewState::Showing(DashboardMode::Edit)) => Ok(()),
            (RequiredView::EditMode, ViewState::Showing(DashboardMode::View)) => {
                Err(FailureTrigger::RequiresEditMode)
            }
            (RequiredView::ViewMode, ViewState::Showing(DashboardMode::View)) => Ok(()),
            (RequiredView::ViewMode, ViewState::Showing(DashboardMode::Edit)) => {
                Err(FailureTrigger::RequiresViewMode)
            }
        }
    }
}

impl KdCommandType {
    /// Returns the contract of this command kind.
    pub fn contract(self) -> CommandContract {
        use FailureTrigger::*;

        let (success_event, required_view, failure_triggers): (
            Option<KdEventType>,
            RequiredView,
            &'static [FailureTrigger],
        ) = match self {
            KdCommandType::Save => (
                Some(KdEventType::DashboardSaved),
                RequiredView::DashboardShown,
                &[NotEligibleForSave, InvalidTitle],
            ),
            KdCommandType::SaveAs => (
                Some(KdEventType::DashboardSaved),
                RequiredView::DashboardShown,
                &[NoCreatePermission, EmptyTitle],
            ),
            KdCommandType::CancelEdit => (
                Some(KdEventType::SwitchedToView),
                RequiredView::DashboardShown,
                &[],
            ),
            KdCommandType::Delete => (
                Some(KdEventType::DashboardDeleted),
                RequiredView::EditMode,
                &[],
            ),
            KdCommandType::SwitchToEdit => (
                Some(KdEventType::SwitchedToEdit),
                RequiredView::DashboardShown,
                &[],
            ),
            KdCommandType::DrillableItems => (None, RequiredView::Any, &[]),
            KdCommandType::SetSize => (None, RequiredView::Any, &[]),
            KdCommandType::AddWidget => (
                Some(KdEventType::WidgetAdded),
                RequiredView::EditMode,
                &[InvalidInsightReference],
            ),
            KdCommandType::AddFilter => (
                Some(KdEventType::FilterAdded),
                RequiredView::EditMode,
                &[],
            ),
            KdCommandType::ExportToPdf => (
                Some(KdEventType::ExportedToPdf),
                RequiredView::ViewMode,
                &[],
            ),
            KdCommandType::SetFilterContext => (
                Some(KdEventType::SetFilterContextFinished),
                RequiredView::DashboardShown,
                &[
                    NewFilterInViewMode,
                    FilterNotFound,
                    InvalidFilterElements,
                    FilterLimitExceeded,
                ],
            ),
            KdCommandType::RemoveFilterContext => (
                Some(KdEventType::RemoveFilterContextFinished),
                RequiredView::DashboardShown,
                &[FilterNotOnFilterBar],
            ),
        };

        CommandContract {
            command: self,
            success_event,
            required_view,
            failure_triggers,
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::common::{is_command_failed_event_data, COMMAND_FAILED_EVENT_TYPE};

    const VIEW: ViewState = ViewState::Showing(DashboardMode::View);
    const EDIT: ViewState = ViewState::Showing(DashboardMode::Edit);

    #[test]
    fn test_switch_to_edit_succeeds_in_either_mode() {
        let contract = KdCommandType::SwitchToEdit.contract();
        assert_eq!(contract.check(VIEW), Ok(()));
        assert_eq!(contract.check(EDIT), Ok(()));
        assert_eq!(contract.check(ViewState::NoDashboard), Err(FailureTrigger::NoDashboard));
        assert_eq!(contract.success_event, Some(KdEventType::SwitchedToEdit));
    }

    #[test]
    fn test_delete_requires_edit_mode() {
        let contract = KdCommandType::Delete.contract();
        assert_eq!(contract.check(EDIT), Ok(()));
        assert_eq!(contract.check(VIEW), Err(FailureTrigger::RequiresEditMode));
        assert_eq!(contract.check(ViewState::NoDashboard), Err(FailureTrigger::NoDashboard));
    }

    #[test]
    fn test_export_requires_view_mode() {
        let contract = KdCommandType::ExportToPdf.contract();
        assert_eq!(contract.check(VIEW), Ok(()));
        assert_eq!(contract.check(EDIT), Err(FailureTrigger::RequiresViewMode));
        assert_eq!(contract.success_event, Some(KdEventType::ExportedToPdf));
    }

    #[test]
    fn test_set_size_has_no_precondition_and_no_event() {
        let contract = KdCommandType::SetSize.contract();
        assert_eq!(contract.check(ViewState::NoDashboard), Ok(()));
        assert_eq!(contract.success_event, None);
        assert!(contract.failure_triggers.is_empty());
    }

    #[test]
    fn test_save_and_save_as_both_report_dashboard_saved() {
        assert_eq!(KdCommandType::Save.contract().success_event, Some(KdEventType::DashboardSaved));
        assert_eq!(
            KdCommandType::SaveAs.contract().success_event,
            Some(KdEventType::DashboardSaved)
        );
        assert!(KdCommandType::SaveAs
            .contract()
            .failure_triggers
            .contains(&FailureTrigger::EmptyTitle));
    }

    #[test]
    fn test_set_filter_context_lists_validation_failures() {
        let triggers = KdCommandType::SetFilterContext.contract().failure_triggers;
        assert!(triggers.contains(&FailureTrigger::FilterLimitExceeded));
        assert!(triggers.contains(&FailureTrigger::NewFilterInViewMode));
    }

    #[test]
    fn test_every_contract_names_its_own_command() {
        for kind in KdCommandType::ALL {
            assert_eq!(kind.contract().command, kind);
        }
    }

    #[test]
    fn test_failure_event_carries_reason() {
        // Arrange
        let envelope = FailureTrigger::RequiresEditMode.into_failure();

        // Act
        let value = serde_json::to_value(&envelope).unwrap();

        // Assert
        assert!(is_command_failed_event_data(&value));
        assert_eq!(value["data"]["type"], COMMAND_FAILED_EVENT_TYPE);
        assert_eq!(value["data"]["reason"], "dashboard is not in edit mode");
    }
}
