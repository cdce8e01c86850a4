//! Events posted by the embedded KPI dashboard to the host application.
//!
//! Events are purely declarative: KD sends them, the host reacts.  Most
//! events carry `availableCommands`, the list of command kinds the host may
//! send next.
//!
//! # Drill to URL
//!
//! Drilling to a URL is asynchronous inside KD.  It is reported as two
//! independent notifications that share an `id`:
//!
//! ```text
//! drillToUrlStarted  {id}         → show a loading indicator
//! ... any number of other events ...
//! drillToUrlResolved {id, url}    → open the URL
//! ```
//!
//! See [`crate::protocol::correlation`] for pairing them up.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::protocol::commands::KdCommandType;
use crate::protocol::common::{type_guards, FilterContextContent, MessageEnvelope};

// ── Event kinds ───────────────────────────────────────────────────────────────

/// Every event kind KD posts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KdEventType {
    /// KD is listening for drillable items.
    #[serde(rename = "listeningForDrillableItems")]
    ListeningForDrillableItems,
    /// The embedded content started loading.
    #[serde(rename = "loadingStarted")]
    LoadingStarted,
    /// The user may not view or edit the content.
    #[serde(rename = "noPermissions")]
    NoPermissions,
    /// An operation changed the height the content needs.
    #[serde(rename = "resized")]
    Resized,
    /// A dashboard was created and saved.
    #[serde(rename = "dashboardCreated")]
    DashboardCreated,
    /// The content is fully loaded and the user may access it.
    #[serde(rename = "loaded")]
    DashboardLoaded,
    /// An existing dashboard was updated.
    #[serde(rename = "dashboardUpdated")]
    DashboardUpdated,
    /// The dashboard was saved.
    #[serde(rename = "dashboardSaved")]
    DashboardSaved,
    /// The dashboard was deleted.
    #[serde(rename = "dashboardDeleted")]
    DashboardDeleted,
    /// The user cancelled creating a dashboard.
    #[serde(rename = "dashboardCreationCanceled")]
    DashboardCreationCanceled,
    /// The dashboard switched to edit mode.
    #[serde(rename = "switchedToEdit")]
    SwitchedToEdit,
    /// The dashboard switched to view mode.
    #[serde(rename = "switchedToView")]
    SwitchedToView,
    /// Platform status report, e.g. the platform is down.
    #[serde(rename = "platform")]
    Platform,
    /// A widget was added.
    #[serde(rename = "widgetAdded")]
    WidgetAdded,
    /// A filter was added.
    #[serde(rename = "filterAdded")]
    FilterAdded,
    /// The PDF export finished.
    #[serde(rename = "exportedToPdf")]
    ExportedToPdf,
    /// A drill was performed.
    #[serde(rename = "drill")]
    Drill,
    /// The filter context changed.
    #[serde(rename = "filterContextChanged")]
    FilterContextChanged,
    /// A `setFilterContext` command finished.
    #[serde(rename = "setFilterContextFinished")]
    SetFilterContextFinished,
    /// A `removeFilterContext` command finished.
    #[serde(rename = "removeFilterContextFinished")]
    RemoveFilterContextFinished,
    /// A drill to URL started; the URL follows in `drillToUrlResolved`.
    #[serde(rename = "drillToUrlStarted")]
    DrillToUrlStarted,
    /// A drill to URL resolved.
    #[serde(rename = "drillToUrlResolved")]
    DrillToUrlResolved,
}

impl KdEventType {
    /// All event kinds, in declaration order.
    pub const ALL: [KdEventType; 22] = [
        KdEventType::ListeningForDrillableItems,
        KdEventType::LoadingStarted,
        KdEventType::NoPermissions,
        KdEventType::Resized,
        KdEventType::DashboardCreated,
        KdEventType::DashboardLoaded,
        KdEventType::DashboardUpdated,
        KdEventType::DashboardSaved,
        KdEventType::DashboardDeleted,
        KdEventType::DashboardCreationCanceled,
        KdEventType::SwitchedToEdit,
        KdEventType::SwitchedToView,
        KdEventType::Platform,
        KdEventType::WidgetAdded,
        KdEventType::FilterAdded,
        KdEventType::ExportedToPdf,
        KdEventType::Drill,
        KdEventType::FilterContextChanged,
        KdEventType::SetFilterContextFinished,
        KdEventType::RemoveFilterContextFinished,
        KdEventType::DrillToUrlStarted,
        KdEventType::DrillToUrlResolved,
    ];

    /// Returns the wire value of the `type` tag.
    pub fn as_str(self) -> &'static str {
        match self {
            KdEventType::ListeningForDrillableItems => "listeningForDrillableItems",
            KdEventType::LoadingStarted => "loadingStarted",
            KdEventType::NoPermissions => "noPermissions",
            KdEventType::Resized => "resized",
            KdEventType::DashboardCreated => "dashboardCreated",
            KdEventType::DashboardLoaded => "loaded",
            KdEventType::DashboardUpdated => "dashboardUpdated",
            KdEventType::DashboardSaved => "dashboardSaved",
            KdEventType::DashboardDeleted => "dashboardDeleted",
            KdEventType::DashboardCreationCanceled => "dashboardCreationCanceled",
            KdEventType::SwitchedToEdit => "switchedToEdit",
            KdEventType::SwitchedToView => "switchedToView",
            KdEventType::Platform => "platform",
            KdEventType::WidgetAdded => "widgetAdded",
            KdEventType::FilterAdded => "filterAdded",
            KdEventType::ExportedToPdf => "exportedToPdf",
            KdEventType::Drill => "drill",
            KdEventType::FilterContextChanged => "filterContextChanged",
            KdEventType::SetFilterContextFinished => "setFilterContextFinished",
            KdEventType::RemoveFilterContextFinished => "removeFilterContextFinished",
            KdEventType::DrillToUrlStarted => "drillToUrlStarted",
            KdEventType::DrillToUrlResolved => "drillToUrlResolved",
        }
    }
}

impl TryFrom<&str> for KdEventType {
    type Error = ();

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        KdEventType::ALL
            .into_iter()
            .find(|kind| kind.as_str() == value)
            .ok_or(())
    }
}

impl fmt::Display for KdEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Event bodies ──────────────────────────────────────────────────────────────

/// Body of `noPermissions`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoPermissionsBody {
    /// Whether view or edit permission is missing.
    pub reason: String,
}

/// Body of `resized`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResizedBody {
    pub height: f64,
}

/// Metadata of the dashboard an event refers to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardObjectMeta {
    /// Client id, unique within the domain.  Hosts should prefer the data
    /// product id plus client id over the project id when it is present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client: Option<String>,
    /// Object id of the dashboard.
    pub dashboard_id: String,
    /// Project id.
    pub project: String,
    /// Dashboard identifier.
    pub dashboard: String,
    /// Title shown in the KD top bar.
    pub title: String,
}

/// Body shared by the dashboard lifecycle events (`loaded`, `dashboardSaved`,
/// `switchedToEdit`, …).
///
/// `available_commands` is strict in the same way as on
/// [`AvailableCommandsBody`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardBody {
    pub available_commands: Vec<KdCommandType>,
    #[serde(flatten)]
    pub meta: DashboardObjectMeta,
}

/// Body carrying only the commands the host may send next.
///
/// Every entry of `availableCommands` must be a known [`KdCommandType`].  A
/// single unknown command name makes the whole event fail to decode with
/// [`ProtocolError::MalformedBody`](crate::protocol::codec::ProtocolError::MalformedBody),
/// while the shallow guards still accept it.  The same holds for every body
/// with an `availableCommands` list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailableCommandsBody {
    pub available_commands: Vec<KdCommandType>,
}

/// Body of `platform`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Category of an added widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WidgetCategory {
    Kpi,
    Visualization,
}

/// Metadata of an insight that was added as a widget.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightWidgetBody {
    pub widget_category: WidgetCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// Body of `widgetAdded`.
///
/// For a KPI the event only means the customisation flow started; the user
/// can still discard the KPI.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddedWidgetBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insight: Option<InsightWidgetBody>,
}

/// Body of `exportedToPdf`.  `available_commands` is strict, see
/// [`AvailableCommandsBody`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportToPdfFinishedBody {
    pub available_commands: Vec<KdCommandType>,
    /// Link to the exported file.
    pub link: String,
}

/// Body of `filterContextChanged`.  `available_commands` is strict, see
/// [`AvailableCommandsBody`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterContextChangedBody {
    pub available_commands: Vec<KdCommandType>,
    #[serde(flatten)]
    pub content: FilterContextContent,
}

/// Body of `drillToUrlStarted`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrillToUrlStartedBody {
    /// Correlation id, repeated in the matching `drillToUrlResolved`.
    pub id: String,
}

impl DrillToUrlStartedBody {
    /// Starts a new drill with a freshly generated id.
    ///
    /// UUID v4 ids are never reused, which is what the host relies on when
    /// it correlates the resolved event.
    pub fn generate() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
        }
    }

    /// Builds the resolved event body for this drill.
    pub fn resolve(&self, url: impl Into<String>) -> DrillToUrlResolvedBody {
        DrillToUrlResolvedBody {
            id: self.id.clone(),
            url: url.into(),
        }
    }
}

/// Body of `drillToUrlResolved`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrillToUrlResolvedBody {
    pub id: String,
    pub url: String,
}

// ── Events ────────────────────────────────────────────────────────────────────

/// An event posted by KD, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum KdEvent {
    #[serde(rename = "listeningForDrillableItems")]
    ListeningForDrillableItems,
    #[serde(rename = "loadingStarted")]
    LoadingStarted,
    #[serde(rename = "noPermissions")]
    NoPermissions(NoPermissionsBody),
    #[serde(rename = "resized")]
    Resized(ResizedBody),
    #[serde(rename = "dashboardCreated")]
    DashboardCreated(DashboardBody),
    #[serde(rename = "loaded")]
    DashboardLoaded(DashboardBody),
    #[serde(rename = "dashboardUpdated")]
    DashboardUpdated(DashboardBody),
    #[serde(rename = "dashboardSaved")]
    DashboardSaved(DashboardBody),
    #[serde(rename = "dashboardDeleted")]
    DashboardDeleted(DashboardBody),
    #[serde(rename = "dashboardCreationCanceled")]
    DashboardCreationCanceled,
    #[serde(rename = "switchedToEdit")]
    SwitchedToEdit(DashboardBody),
    #[serde(rename = "switchedToView")]
    SwitchedToView(DashboardBody),
    #[serde(rename = "platform")]
    Platform(PlatformBody),
    #[serde(rename = "widgetAdded")]
    WidgetAdded(AddedWidgetBody),
    /// Posted right after the filter customisation flow starts; the user can
    /// still cancel it.
    #[serde(rename = "filterAdded")]
    FilterAdded(AvailableCommandsBody),
    #[serde(rename = "exportedToPdf")]
    ExportedToPdf(ExportToPdfFinishedBody),
    /// Free-form drill description.
    #[serde(rename = "drill")]
    Drill(Map<String, Value>),
    #[serde(rename = "filterContextChanged")]
    FilterContextChanged(FilterContextChangedBody),
    #[serde(rename = "setFilterContextFinished")]
    SetFilterContextFinished(AvailableCommandsBody),
    #[serde(rename = "removeFilterContextFinished")]
    RemoveFilterContextFinished(AvailableCommandsBody),
    #[serde(rename = "drillToUrlStarted")]
    DrillToUrlStarted(DrillToUrlStartedBody),
    #[serde(rename = "drillToUrlResolved")]
    DrillToUrlResolved(DrillToUrlResolvedBody),
}

impl KdEvent {
    /// Returns the kind tag of this event.
    pub fn event_type(&self) -> KdEventType {
        match self {
            KdEvent::ListeningForDrillableItems => KdEventType::ListeningForDrillableItems,
            KdEvent::LoadingStarted => KdEventType::LoadingStarted,
            KdEvent::NoPermissions(_) => KdEventType::NoPermissions,
            KdEvent::Resized(_) => KdEventType::Resized,
            KdEvent::DashboardCreated(_) => KdEventType::DashboardCreated,
            KdEvent::DashboardLoaded(_) => KdEventType::DashboardLoaded,
            KdEvent::DashboardUpdated(_) => KdEventType::DashboardUpdated,
            KdEvent::DashboardSaved(_) => KdEventType::DashboardSaved,
            KdEvent::DashboardDeleted(_) => KdEventType::DashboardDeleted,
            KdEvent::DashboardCreationCanceled => KdEventType::DashboardCreationCanceled,
            KdEvent::SwitchedToEdit(_) => KdEventType::SwitchedToEdit,
            KdEvent::SwitchedToView(_) => KdEventType::SwitchedToView,
            KdEvent::Platform(_) => KdEventType::Platform,
            KdEvent::WidgetAdded(_) => KdEventType::WidgetAdded,
            KdEvent::FilterAdded(_) => KdEventType::FilterAdded,
            KdEvent::ExportedToPdf(_) => KdEventType::ExportedToPdf,
            KdEvent::Drill(_) => KdEventType::Drill,
            KdEvent::FilterContextChanged(_) => KdEventType::FilterContextChanged,
            KdEvent::SetFilterContextFinished(_) => KdEventType::SetFilterContextFinished,
            KdEvent::RemoveFilterContextFinished(_) => KdEventType::RemoveFilterContextFinished,
            KdEvent::DrillToUrlStarted(_) => KdEventType::DrillToUrlStarted,
            KdEvent::DrillToUrlResolved(_) => KdEventType::DrillToUrlResolved,
        }
    }

    /// Returns the commands the host may send next, for events that carry
    /// them.
    pub fn available_commands(&self) -> Option<&[KdCommandType]> {
        match self {
            KdEvent::DashboardCreated(b)
            | KdEvent::DashboardLoaded(b)
            | KdEvent::DashboardUpdated(b)
            | KdEvent::DashboardSaved(b)
            | KdEvent::DashboardDeleted(b)
            | KdEvent::SwitchedToEdit(b)
            | KdEvent::SwitchedToView(b) => Some(&b.available_commands),
            KdEvent::FilterAdded(b)
            | KdEvent::SetFilterContextFinished(b)
            | KdEvent::RemoveFilterContextFinished(b) => Some(&b.available_commands),
            KdEvent::ExportedToPdf(b) => Some(&b.available_commands),
            KdEvent::FilterContextChanged(b) => Some(&b.available_commands),
            _ => None,
        }
    }
}

/// An event wrapped in its product envelope.
pub type KdEventData = MessageEnvelope<KdEvent>;

// ── Type guards ───────────────────────────────────────────────────────────────

type_guards!(KdEventType {
    /// Type-guard for `listeningForDrillableItems` event data.
    is_listening_for_drillable_items_event_data => ListeningForDrillableItems,
    /// Type-guard for `loadingStarted` event data.
    is_loading_started_event_data => LoadingStarted,
    /// Type-guard for `noPermissions` event data.
    is_no_permissions_event_data => NoPermissions,
    /// Type-guard for `resized` event data.
    is_resized_event_data => Resized,
    /// Type-guard for `dashboardCreated` event data.
    is_dashboard_created_event_data => DashboardCreated,
    /// Type-guard for `loaded` event data.
    is_dashboard_loaded_event_data => DashboardLoaded,
    /// Type-guard for `dashboardUpdated` event data.
    is_dashboard_updated_event_data => DashboardUpdated,
    /// Type-guard for `dashboardSaved` event data.
    is_dashboard_saved_event_data => DashboardSaved,
    /// Type-guard for `dashboardDeleted` event data.
    is_dashboard_deleted_event_data => DashboardDeleted,
    /// Type-guard for `dashboardCreationCanceled` event data.
    is_dashboard_creation_canceled_event_data => DashboardCreationCanceled,
    /// Type-guard for `switchedToEdit` event data.
    is_switched_to_edit_event_data => SwitchedToEdit,
    /// Type-guard for `switchedToView` event data.
    is_switched_to_view_event_data => SwitchedToView,
    /// Type-guard for `platform` event data.
    is_platform_event_data => Platform,
    /// Type-guard for `widgetAdded` event data.
    is_widget_added_event_data => WidgetAdded,
    /// Type-guard for `filterAdded` event data.
    is_filter_added_event_data => FilterAdded,
    /// Type-guard for `exportedToPdf` event data.
    is_exported_to_pdf_event_data => ExportedToPdf,
    /// Type-guard for `drill` event data.
    is_drill_event_data => Drill,
    /// Type-guard for `filterContextChanged` event data.
    is_filter_context_changed_event_data => FilterContextChanged,
    /// Type-guard for `setFilterContextFinished` event data.
    is_set_filter_context_finished_event_data => SetFilterContextFinished,
    /// Type-guard for `removeFilterContextFinished` event data.
    is_remove_filter_context_finished_event_data => RemoveFilterContextFinished,
    /// Type-guard for `drillToUrlStarted` event data.
    is_drill_to_url_started_event_data => DrillToUrlStarted,
    /// Type-guard for `drillToUrlResolved` event data.
    is_drill_to_url_resolved_event_data => DrillToUrlResolved,
});

// ── Tests ─────────────────────────────────────────────────────────────────────
