//! Envelope and tagging primitives shared by every embedded product.
//!
//! Every message that crosses the iframe boundary has the same outer shape:
//!
//! ```text
//! {"product": <product name>, "data": {"type": <kind>, ...body fields}}
//! ```
//!
//! The `product` tag names the embedded application (KPI dashboard or
//! analytical designer).  The `type` field inside `data` is the *kind*
//! discriminant, and every other field in `data` is the kind-specific body.
//!
//! This module also hosts the body types that several products share:
//! object qualifiers, filter-context content, drillable items, and the
//! generic "command failed" event.

use std::fmt;

use serde::de::{self, DeserializeOwned};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Kind tag of the generic failure event posted when a command cannot be
/// carried out.
pub const COMMAND_FAILED_EVENT_TYPE: &str = "appCommandFailed";

// ── Product names ─────────────────────────────────────────────────────────────

/// Embedded application that sent (or should receive) a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProductName {
    /// The KPI dashboard application.
    #[serde(rename = "kpiDashboard")]
    KpiDashboard,
    /// The analytical designer application.
    #[serde(rename = "analyticalDesigner")]
    AnalyticalDesigner,
}

impl ProductName {
    /// Returns the wire name of this product.
    pub fn as_str(self) -> &'static str {
        match self {
            ProductName::KpiDashboard => "kpiDashboard",
            ProductName::AnalyticalDesigner => "analyticalDesigner",
        }
    }
}

impl TryFrom<&str> for ProductName {
    type Error = ();

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "kpiDashboard" => Ok(ProductName::KpiDashboard),
            "analyticalDesigner" => Ok(ProductName::AnalyticalDesigner),
            _ => Err(()),
        }
    }
}

impl fmt::Display for ProductName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Envelope ──────────────────────────────────────────────────────────────────

/// The wire shape of every message: a product tag plus the tagged data.
///
/// `T` is normally one of the internally-tagged enums ([`KdCommand`],
/// [`KdEvent`], [`GdcEvent`]), which serialise as `{"type": ..., ...body}`.
///
/// [`KdCommand`]: crate::protocol::commands::KdCommand
/// [`KdEvent`]: crate::protocol::events::KdEvent
///
/// # Example
///
/// ```rust
/// use kd_core::protocol::commands::{KdCommand, SetSizeCommandBody};
/// use kd_core::MessageEnvelope;
///
/// let envelope = MessageEnvelope::kd(KdCommand::SetSize(SetSizeCommandBody { height: 480.0 }));
/// let json = serde_json::to_value(&envelope).unwrap();
/// assert_eq!(json["product"], "kpiDashboard");
/// assert_eq!(json["data"]["type"], "setSize");
/// assert_eq!(json["data"]["height"], 480.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageEnvelope<T> {
    /// Application the message belongs to.
    pub product: ProductName,
    /// Kind tag and body, flattened into one object.
    pub data: T,
}

impl<T> MessageEnvelope<T> {
    /// Wraps `data` for the given product.
    pub fn new(product: ProductName, data: T) -> Self {
        Self { product, data }
    }

    /// Wraps `data` for the KPI dashboard product.
    pub fn kd(data: T) -> Self {
        Self::new(ProductName::KpiDashboard, data)
    }
}

// ── Discriminant extraction ───────────────────────────────────────────────────

/// Extracts the kind discriminant (`data.type`) from an arbitrary JSON value.
///
/// This function is total: it never panics and never errors.  Any shape that
/// does not carry a string at `data.type` (a non-object, a missing `data`,
/// a numeric `type`, …) yields `None`, the "unrecognised" sentinel.
///
/// # Examples
///
/// ```rust
/// use kd_core::get_event_type;
/// use serde_json::json;
///
/// assert_eq!(get_event_type(&json!({"data": {"type": "setSize"}})), Some("setSize"));
/// assert_eq!(get_event_type(&json!({"data": {"type": 7}})), None);
/// assert_eq!(get_event_type(&json!("setSize")), None);
/// ```
pub fn get_event_type(value: &Value) -> Option<&str> {
    // `Value::get` returns `None` for non-objects, so every step is total.
    value.get("data")?.get("type")?.as_str()
}

/// Extracts the product tag from an arbitrary JSON value.
///
/// Returns `None` when the `product` field is missing, not a string, or not a
/// known product name.
pub fn get_product(value: &Value) -> Option<ProductName> {
    let name = value.get("product")?.as_str()?;
    ProductName::try_from(name).ok()
}

/// Defines one shallow type-guard function per kind.
///
/// Each generated guard returns `true` iff [`get_event_type`] of its argument
/// equals the wire name of the listed kind.  Bodies are never inspected.
macro_rules! type_guards {
    ($kind:ident { $($(#[$meta:meta])* $guard:ident => $variant:ident,)* }) => {
        $(
            $(#[$meta])*
            pub fn $guard(value: &serde_json::Value) -> bool {
                $crate::protocol::common::get_event_type(value) == Some($kind::$variant.as_str())
            }
        )*
    };
}

pub(crate) use type_guards;

// ── Key-presence unions ───────────────────────────────────────────────────────

/// Removes `key` from `map` and deserialises it.
///
/// Returns `Ok(None)` when the key is absent.  A key that is present but
/// holds the wrong shape (including `null`) is an error, so unions that pick
/// their variant by key presence never fall through to another variant.
pub(crate) fn take_field<T, E>(map: &mut Map<String, Value>, key: &str) -> Result<Option<T>, E>
where
    T: DeserializeOwned,
    E: de::Error,
{
    map.remove(key)
        .map(|value| T::deserialize(value).map_err(|e| E::custom(format_args!("invalid `{key}`: {e}"))))
        .transpose()
}

// ── Object qualifiers ─────────────────────────────────────────────────────────

/// Reference to a metadata object, either by URI or by identifier.
///
/// On the wire this is `{"uri": "..."}` or `{"identifier": "..."}`.  The
/// variant is chosen by key presence: an object with a `uri` key is always
/// the URI form, and a malformed `uri` is an error even if `identifier` is
/// valid.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(untagged)]
pub enum ObjQualifier {
    /// Qualifier by object URI (e.g. `/gdc/md/project/obj/42`).
    Uri { uri: String },
    /// Qualifier by object identifier (e.g. `label.product.name`).
    Identifier { identifier: String },
}

impl<'de> Deserialize<'de> for ObjQualifier {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut map = Map::<String, Value>::deserialize(deserializer)?;
        if let Some(uri) = take_field::<String, D::Error>(&mut map, "uri")? {
            return Ok(ObjQualifier::Uri { uri });
        }
        match take_field::<String, D::Error>(&mut map, "identifier")? {
            Some(identifier) => Ok(ObjQualifier::Identifier { identifier }),
            None => Err(de::Error::custom("expected a `uri` or `identifier` key")),
        }
    }
}

impl ObjQualifier {
    /// Returns the URI or identifier string, whichever this qualifier holds.
    pub fn as_str(&self) -> &str {
        match self {
            ObjQualifier::Uri { uri } => uri,
            ObjQualifier::Identifier { identifier } => identifier,
        }
    }
}

// ── Filter context ────────────────────────────────────────────────────────────

/// Filter context body, used by `setFilterContext` and `filterContextChanged`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterContextContent {
    /// Filters to add, update, or report.
    pub filters: Vec<FilterItem>,
}

/// One filter in a filter context.
///
/// Serialised externally tagged, e.g. `{"positiveAttributeFilter": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FilterItem {
    PositiveAttributeFilter(PositiveAttributeFilter),
    NegativeAttributeFilter(NegativeAttributeFilter),
    AbsoluteDateFilter(AbsoluteDateFilter),
    RelativeDateFilter(RelativeDateFilter),
}

/// Attribute filter listing the elements to keep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositiveAttributeFilter {
    /// Display form (label) the filter applies to.
    pub display_form: ObjQualifier,
    /// Selected element URIs, or element values when `text_filter` is set.
    #[serde(rename = "in")]
    pub in_elements: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_filter: Option<bool>,
}

/// Attribute filter listing the elements to exclude.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NegativeAttributeFilter {
    pub display_form: ObjQualifier,
    pub not_in: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_filter: Option<bool>,
}

/// Date filter with fixed bounds (`YYYY-MM-DD`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AbsoluteDateFilter {
    /// Date dataset; `None` targets the dashboard's default date dimension.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_set: Option<ObjQualifier>,
    pub from: String,
    pub to: String,
}

/// Date filter relative to today, counted in `granularity` units.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelativeDateFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_set: Option<ObjQualifier>,
    /// Granularity name, e.g. `GDC.time.month`.
    pub granularity: String,
    pub from: i64,
    pub to: i64,
}

/// Body of `removeFilterContext`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoveFilterContextContent {
    pub filters: Vec<RemoveFilterItem>,
}

/// Filter to remove, named by the object it filters on.
///
/// `{"dataSet": ...}` is a date filter and `{"displayForm": ...}` an attribute
/// filter.  An object with a `dataSet` key is always a date filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum RemoveFilterItem {
    DateFilter {
        #[serde(rename = "dataSet")]
        data_set: ObjQualifier,
    },
    AttributeFilter {
        #[serde(rename = "displayForm")]
        display_form: ObjQualifier,
    },
}

impl<'de> Deserialize<'de> for RemoveFilterItem {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut map = Map::<String, Value>::deserialize(deserializer)?;
        if let Some(data_set) = take_field::<ObjQualifier, D::Error>(&mut map, "dataSet")? {
            return Ok(RemoveFilterItem::DateFilter { data_set });
        }
        match take_field::<ObjQualifier, D::Error>(&mut map, "displayForm")? {
            Some(display_form) => Ok(RemoveFilterItem::AttributeFilter { display_form }),
            None => Err(de::Error::custom("expected a `dataSet` or `displayForm` key")),
        }
    }
}

// ── Drillable items ───────────────────────────────────────────────────────────

/// Body of the `drillableItems` command.
///
/// Items are dashboard measures or attributes named by URI or identifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrillableItemsBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uris: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifiers: Option<Vec<String>>,
}

// ── Command failure ───────────────────────────────────────────────────────────

/// Body of the generic failure event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandFailedBody {
    /// Human-readable cause, e.g. `"dashboard is not in edit mode"`.
    pub reason: String,
}

/// Events that are common to every embedded product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GdcEvent {
    /// A command could not be carried out.  Posted instead of the command's
    /// success event; there is no partial success.
    #[serde(rename = "appCommandFailed")]
    CommandFailed(CommandFailedBody),
}

/// Type-guard for the generic failure event.
pub fn is_command_failed_event_data(value: &Value) -> bool {
    get_event_type(value) == Some(COMMAND_FAILED_EVENT_TYPE)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
