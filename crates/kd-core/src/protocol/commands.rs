//! Commands sent by the host application to the embedded KPI dashboard.
//!
//! Each command kind has exactly one body shape.  The prose contract for
//! each command (what KD does on receipt, which event it posts back) is
//! documented on the [`KdCommand`] variants and encoded as data in
//! [`crate::protocol::contract`].
//!
//! # Guards versus decoding
//!
//! The `is_*_command_data` functions are *shallow*: they compare the `type`
//! tag and nothing else.  A value that passes a guard may still have a body
//! that does not match the declared shape.  Use
//! [`crate::protocol::codec::decode_command`] when the body must be
//! validated.

use std::fmt;

use serde::de;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::protocol::common::{
    take_field, type_guards, DrillableItemsBody, FilterContextContent, MessageEnvelope,
    RemoveFilterContextContent,
};

// ── Command kinds ─────────────────────────────────────────────────────────────

/// Every command kind KD understands.
///
/// The serde names are the wire values of the `type` tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KdCommandType {
    /// Save the dashboard.
    #[serde(rename = "saveDashboard")]
    Save,
    /// Cancel editing and return to view mode.
    #[serde(rename = "cancelEdit")]
    CancelEdit,
    /// Delete the dashboard being edited.
    #[serde(rename = "deleteDashboard")]
    Delete,
    /// Switch the dashboard to edit mode.
    #[serde(rename = "switchToEdit")]
    SwitchToEdit,
    /// Set drillable items.
    #[serde(rename = "drillableItems")]
    DrillableItems,
    /// Set the height of the hosting iframe.
    #[serde(rename = "setSize")]
    SetSize,
    /// Add a widget to the dashboard.
    #[serde(rename = "addWidget")]
    AddWidget,
    /// Add an attribute filter to the filter bar.
    #[serde(rename = "addFilter")]
    AddFilter,
    /// Export the dashboard to PDF.
    #[serde(rename = "exportToPdf")]
    ExportToPdf,
    /// Add or update filters in the filter context.
    #[serde(rename = "setFilterContext")]
    SetFilterContext,
    /// Remove filters from the filter context.
    #[serde(rename = "removeFilterContext")]
    RemoveFilterContext,
    /// Save a copy of the dashboard under a new title.
    #[serde(rename = "saveAsDashboard")]
    SaveAs,
}

impl KdCommandType {
    /// All command kinds, in declaration order.
    pub const ALL: [KdCommandType; 12] = [
        KdCommandType::Save,
        KdCommandType::CancelEdit,
        KdCommandType::Delete,
        KdCommandType::SwitchToEdit,
        KdCommandType::DrillableItems,
        KdCommandType::SetSize,
        KdCommandType::AddWidget,
        KdCommandType::AddFilter,
        KdCommandType::ExportToPdf,
        KdCommandType::SetFilterContext,
        KdCommandType::RemoveFilterContext,
        KdCommandType::SaveAs,
    ];

    /// Returns the wire value of the `type` tag.
    pub fn as_str(self) -> &'static str {
        match self {
            KdCommandType::Save => "saveDashboard",
            KdCommandType::CancelEdit => "cancelEdit",
            KdCommandType::Delete => "deleteDashboard",
            KdCommandType::SwitchToEdit => "switchToEdit",
            KdCommandType::DrillableItems => "drillableItems",
            KdCommandType::SetSize => "setSize",
            KdCommandType::AddWidget => "addWidget",
            KdCommandType::AddFilter => "addFilter",
            KdCommandType::ExportToPdf => "exportToPdf",
            KdCommandType::SetFilterContext => "setFilterContext",
            KdCommandType::RemoveFilterContext => "removeFilterContext",
            KdCommandType::SaveAs => "saveAsDashboard",
        }
    }
}

impl TryFrom<&str> for KdCommandType {
    type Error = ();

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        KdCommandType::ALL
            .into_iter()
            .find(|kind| kind.as_str() == value)
            .ok_or(())
    }
}

impl fmt::Display for KdCommandType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Command bodies ────────────────────────────────────────────────────────────

/// Body of `saveDashboard` and `saveAsDashboard`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveCommandBody {
    /// Title of the new dashboard, or the new title of a saved one.
    pub title: String,
}

/// Body of `setSize`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetSizeCommandBody {
    /// Height of the hosting iframe in CSS pixels.
    pub height: f64,
}

/// Body of `addWidget`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddWidgetBody {
    pub widget: WidgetSpec,
}

/// Widget to add: a new KPI, or an existing insight.
///
/// Serialised with its own `type` tag: `{"type": "kpi"}` or
/// `{"type": "insight", "ref": {...}}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum WidgetSpec {
    Kpi,
    Insight {
        #[serde(rename = "ref")]
        reference: InsightRef,
    },
}

/// Reference to an insight, by identifier or by URI.
///
/// An object with an `identifier` key is always the identifier form, and a
/// malformed `identifier` is an error even if `uri` is valid.  Empty strings
/// are rejected for both keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum InsightRef {
    Identifier { identifier: String },
    Uri { uri: String },
}

impl InsightRef {
    pub fn is_identifier(&self) -> bool {
        matches!(self, InsightRef::Identifier { .. })
    }

    pub fn is_uri(&self) -> bool {
        matches!(self, InsightRef::Uri { .. })
    }
}

fn non_empty<E: de::Error>(key: &str, value: String) -> Result<String, E> {
    if value.is_empty() {
        Err(E::custom(format_args!("`{key}` must not be empty")))
    } else {
        Ok(value)
    }
}

impl<'de> Deserialize<'de> for InsightRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut map = Map::<String, Value>::deserialize(deserializer)?;
        if let Some(identifier) = take_field::<String, D::Error>(&mut map, "identifier")? {
            let identifier = non_empty("identifier", identifier)?;
            return Ok(InsightRef::Identifier { identifier });
        }
        match take_field::<String, D::Error>(&mut map, "uri")? {
            Some(uri) => Ok(InsightRef::Uri { uri: non_empty("uri", uri)? }),
            None => Err(de::Error::custom("expected an `identifier` or `uri` key")),
        }
    }
}

/// Returns `true` if `value` decodes as [`InsightRef::Identifier`].
pub fn is_identifier_insight(value: &Value) -> bool {
    InsightRef::deserialize(value).is_ok_and(|reference| reference.is_identifier())
}

/// Returns `true` if `value` decodes as [`InsightRef::Uri`].  An object that
/// also carries an `identifier` key is never a URI reference.
pub fn is_uri_insight(value: &Value) -> bool {
    InsightRef::deserialize(value).is_ok_and(|reference| reference.is_uri())
}

// ── Commands ──────────────────────────────────────────────────────────────────

/// A command sent by the host, tagged by `type`.
///
/// When KD cannot carry out a command it posts the generic
/// [`GdcEvent::CommandFailed`](crate::protocol::common::GdcEvent::CommandFailed)
/// event instead of the success event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum KdCommand {
    /// Saves the current dashboard with the given title.
    ///
    /// - Fails if the dashboard is not eligible for save (empty, in error) or
    ///   the title does not pass title validation.
    /// - Otherwise saves and posts `dashboardSaved`, even when nothing changed.
    #[serde(rename = "saveDashboard")]
    Save(SaveCommandBody),

    /// Creates a new dashboard from the one currently shown.
    ///
    /// - In view mode the copy does not take changes from the filter bar.
    /// - In edit mode the copy takes every pending change (title, filter
    ///   context, widgets, layout).
    /// - A copy of a locked dashboard is not locked.
    /// - Fails when no dashboard is shown, the user may not create
    ///   dashboards, or the title is empty.  Posts `dashboardSaved` otherwise.
    #[serde(rename = "saveAsDashboard")]
    SaveAs(SaveCommandBody),

    /// Leaves edit mode without the discard-changes dialog.
    ///
    /// Posts `switchedToView`, immediately when already in view mode.  Fails
    /// when no dashboard is shown.
    #[serde(rename = "cancelEdit")]
    CancelEdit,

    /// Deletes the edited dashboard without a confirmation dialog and posts
    /// `dashboardDeleted`.  Fails in view mode or when no dashboard is shown.
    #[serde(rename = "deleteDashboard")]
    Delete,

    /// Switches to edit mode and posts `switchedToEdit` once ready; also posts
    /// it when already editing.  Fails when no dashboard is shown.
    #[serde(rename = "switchToEdit")]
    SwitchToEdit,

    /// Sets drillable items by URIs or identifiers of the dashboard's
    /// measures and attributes.
    #[serde(rename = "drillableItems")]
    DrillableItems(DrillableItemsBody),

    /// Sets the height of the hosting iframe.
    #[serde(rename = "setSize")]
    SetSize(SetSizeCommandBody),

    /// Adds a widget into the first column of a new top row and scrolls to it.
    ///
    /// A KPI starts the KPI customisation flow; an insight is placed as is.
    /// Posts `widgetAdded`.  Fails if the insight reference is not valid, in
    /// view mode, or when no dashboard is shown.
    #[serde(rename = "addWidget")]
    AddWidget(AddWidgetBody),

    /// Adds an attribute filter to the filter bar, starts its customisation
    /// and posts `filterAdded`.  Fails in view mode or when no dashboard is
    /// shown.
    #[serde(rename = "addFilter")]
    AddFilter,

    /// Exports the dashboard to PDF and posts `exportedToPdf`.  Fails in edit
    /// mode or when no dashboard is shown.
    #[serde(rename = "exportToPdf")]
    ExportToPdf,

    /// Adds or updates filters on the filter bar and applies them.
    ///
    /// Fails when adding a new filter in view mode, when a filter does not
    /// exist in the dataset, when its elements are invalid, or when the item
    /// limit is exceeded.  Posts `setFilterContextFinished` otherwise.
    #[serde(rename = "setFilterContext")]
    SetFilterContext(FilterContextContent),

    /// Removes filters from the filter bar.  Fails if a filter is not on the
    /// filter bar.  Posts `removeFilterContextFinished` otherwise.
    #[serde(rename = "removeFilterContext")]
    RemoveFilterContext(RemoveFilterContextContent),
}

impl KdCommand {
    /// Returns the kind tag of this command.
    pub fn command_type(&self) -> KdCommandType {
        match self {
            KdCommand::Save(_) => KdCommandType::Save,
            KdCommand::SaveAs(_) => KdCommandType::SaveAs,
            KdCommand::CancelEdit => KdCommandType::CancelEdit,
            KdCommand::Delete => KdCommandType::Delete,
            KdCommand::SwitchToEdit => KdCommandType::SwitchToEdit,
            KdCommand::DrillableItems(_) => KdCommandType::DrillableItems,
            KdCommand::SetSize(_) => KdCommandType::SetSize,
            KdCommand::AddWidget(_) => KdCommandType::AddWidget,
            KdCommand::AddFilter => KdCommandType::AddFilter,
            KdCommand::ExportToPdf => KdCommandType::ExportToPdf,
            KdCommand::SetFilterContext(_) => KdCommandType::SetFilterContext,
            KdCommand::RemoveFilterContext(_) => KdCommandType::RemoveFilterContext,
        }
    }
}

/// A command wrapped in its product envelope.
pub type KdCommandData = MessageEnvelope<KdCommand>;

// ── Type guards ───────────────────────────────────────────────────────────────

type_guards!(KdCommandType {
    /// Type-guard for `saveDashboard` command data.
    is_save_dashboard_command_data => Save,
    /// Type-guard for `saveAsDashboard` command data.
    is_save_as_dashboard_command_data => SaveAs,
    /// Type-guard for `cancelEdit` command data.
    is_cancel_edit_command_data => CancelEdit,
    /// Type-guard for `deleteDashboard` command data.
    is_delete_dashboard_command_data => Delete,
    /// Type-guard for `switchToEdit` command data.
    is_switch_to_edit_command_data => SwitchToEdit,
    /// Type-guard for `drillableItems` command data.
    is_drillable_items_command_data => DrillableItems,
    /// Type-guard for `setSize` command data.
    is_set_size_command_data => SetSize,
    /// Type-guard for `addWidget` command data.
    is_add_widget_command_data => AddWidget,
    /// Type-guard for `addFilter` command data.
    is_add_filter_command_data => AddFilter,
    /// Type-guard for `exportToPdf` command data.
    is_export_to_pdf_command_data => ExportToPdf,
    /// Type-guard for `setFilterContext` command data.
    is_set_filter_context_command_data => SetFilterContext,
    /// Type-guard for `removeFilterContext` command data.
    is_remove_filter_context_command_data => RemoveFilterContext,
});

// ── Tests ─────────────────────────────────────────────────────────────────────
