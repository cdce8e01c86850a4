//! Persisted fluid-layout domain entity.
//!
//! A dashboard layout is a tree: a layout holds rows, a row holds columns,
//! and a column may hold either a widget reference or another layout.  Each
//! column carries a responsive size with a mandatory `xl` size and optional
//! overrides for smaller breakpoints.
//!
//! ```json
//! {"fluidLayout": {"rows": [{"columns": [
//!     {"size": {"xl": {"width": 6}}, "content": {"widget": {"qualifier": {"uri": "/obj/1"}}}},
//!     {"size": {"xl": {"width": 6}}, "content": {"fluidLayout": {"rows": []}}}
//! ]}]}}
//! ```
//!
//! These types describe the persisted JSON only.  Nothing here renders.

use serde::de;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::protocol::common::{take_field, ObjQualifier};

/// Errors that can occur when reading or writing a layout.
#[derive(Debug, Error)]
pub enum LayoutError {
    /// The JSON text is not a valid layout.
    #[error("failed to parse layout: {0}")]
    Parse(#[source] serde_json::Error),

    /// The layout could not be serialised.
    #[error("failed to serialize layout: {0}")]
    Serialize(#[source] serde_json::Error),
}

// ── Sizes ─────────────────────────────────────────────────────────────────────

/// Responsive breakpoints, smallest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Breakpoint {
    Xs,
    Sm,
    Md,
    Lg,
    Xl,
}

/// Size of a column or layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Size {
    /// Width in grid units.
    pub width: f64,
    /// Absolute height.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    /// Height proportional to the width.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height_as_ratio: Option<f64>,
}

/// Height a renderer should use for a [`Size`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Height {
    Absolute(f64),
    Ratio(f64),
}

impl Size {
    /// Size with only a width.
    pub fn width(width: f64) -> Self {
        Self {
            width,
            height: None,
            height_as_ratio: None,
        }
    }

    /// Returns the height to use, preferring the absolute height over the
    /// ratio when both are set.
    pub fn preferred_height(&self) -> Option<Height> {
        match (self.height, self.height_as_ratio) {
            (Some(h), _) => Some(Height::Absolute(h)),
            (None, Some(r)) => Some(Height::Ratio(r)),
            (None, None) => None,
        }
    }
}

/// Per-breakpoint column size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColSize {
    pub xl: Size,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xs: Option<Size>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sm: Option<Size>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub md: Option<Size>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lg: Option<Size>,
}

impl ColSize {
    /// Size with only the mandatory `xl` entry.
    pub fn xl(size: Size) -> Self {
        Self {
            xl: size,
            xs: None,
            sm: None,
            md: None,
            lg: None,
        }
    }

    /// Returns the size for `breakpoint`, falling back to `xl` when the
    /// breakpoint has no override.
    pub fn for_breakpoint(&self, breakpoint: Breakpoint) -> &Size {
        let specific = match breakpoint {
            Breakpoint::Xs => self.xs.as_ref(),
            Breakpoint::Sm => self.sm.as_ref(),
            Breakpoint::Md => self.md.as_ref(),
            Breakpoint::Lg => self.lg.as_ref(),
            Breakpoint::Xl => None,
        };
        specific.unwrap_or(&self.xl)
    }
}

// ── Headers ───────────────────────────────────────────────────────────────────

/// Optional header of a row.
///
/// An object with a `title` key is always [`SectionHeader::Titled`], even if
/// it also has a `description`.  A `title` that is not a string (including
/// `null`) is an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SectionHeader {
    Titled {
        title: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
    Description {
        description: String,
    },
}

impl<'de> Deserialize<'de> for SectionHeader {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut map = Map::<String, Value>::deserialize(deserializer)?;
        if let Some(title) = take_field::<String, D::Error>(&mut map, "title")? {
            let description = take_field::<Option<String>, D::Error>(&mut map, "description")?.flatten();
            return Ok(SectionHeader::Titled { title, description });
        }
        match take_field::<String, D::Error>(&mut map, "description")? {
            Some(description) => Ok(SectionHeader::Description { description }),
            None => Err(de::Error::missing_field("description")),
        }
    }
}

impl SectionHeader {
    pub fn title(&self) -> Option<&str> {
        match self {
            SectionHeader::Titled { title, .. } => Some(title),
            SectionHeader::Description { .. } => None,
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            SectionHeader::Titled { description, .. } => description.as_deref(),
            SectionHeader::Description { description } => Some(description),
        }
    }
}

// ── Tree ──────────────────────────────────────────────────────────────────────

/// Reference to a visualization object placed in a column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PersistedWidget {
    pub widget: WidgetQualifier,
}

/// Inner object of [`PersistedWidget`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetQualifier {
    pub qualifier: ObjQualifier,
}

impl PersistedWidget {
    pub fn new(qualifier: ObjQualifier) -> Self {
        Self {
            widget: WidgetQualifier { qualifier },
        }
    }

    pub fn qualifier(&self) -> &ObjQualifier {
        &self.widget.qualifier
    }
}

/// What a column holds.
///
/// Neither branch accepts unknown keys, so an object with both `widget` and
/// `fluidLayout` is rejected instead of silently matching one of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Content {
    Widget(PersistedWidget),
    Layout(FluidLayout),
}

/// One cell of a row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Content>,
    pub size: ColSize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
}

/// A horizontal band of columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub columns: Vec<Column>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header: Option<SectionHeader>,
}

/// Fields of a fluid layout, nested under the `fluidLayout` key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutDefinition {
    pub rows: Vec<Row>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<Size>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
}

/// Root of a persisted layout (and of every nested layout).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FluidLayout {
    #[serde(rename = "fluidLayout")]
    pub fluid_layout: LayoutDefinition,
}

impl FluidLayout {
    /// Layout with the given rows and no size or style.
    pub fn new(rows: Vec<Row>) -> Self {
        Self {
            fluid_layout: LayoutDefinition {
                rows,
                size: None,
                style: None,
            },
        }
    }

    /// Parses persisted layout JSON.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::Parse`] if the text is not a valid layout.
    pub fn from_json(text: &str) -> Result<Self, LayoutError> {
        serde_json::from_str(text).map_err(LayoutError::Parse)
    }

    /// Serialises the layout to compact JSON.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::Serialize`] if serde fails.
    pub fn to_json(&self) -> Result<String, LayoutError> {
        serde_json::to_string(self).map_err(LayoutError::Serialize)
    }

    pub fn rows(&self) -> &[Row] {
        &self.fluid_layout.rows
    }

    /// Collects every widget qualifier in the tree, depth-first, in row and
    /// column order.
    pub fn widgets(&self) -> Vec<&ObjQualifier> {
        let mut out = Vec::new();
        self.collect_widgets(&mut out);
        out
    }

    fn collect_widgets<'a>(&'a self, out: &mut Vec<&'a ObjQualifier>) {
        for column in self.rows().iter().flat_map(|row| &row.columns) {
            match &column.content {
                Some(Content::Widget(widget)) => out.push(widget.qualifier()),
                Some(Content::Layout(nested)) => nested.collect_widgets(out),
                None => {}
            }
        }
    }

    /// Nesting depth: 1 for a layout without nested layouts.
    pub fn depth(&self) -> usize {
        let nested = self
            .rows()
            .iter()
            .flat_map(|row| &row.columns)
            .filter_map(|column| match &column.content {
                Some(Content::Layout(nested)) => Some(nested.depth()),
                _ => None,
            })
            .max()
            .unwrap_or(0);
        nested + 1
    }

    /// Total number of columns in the tree, nested layouts included.
    pub fn column_count(&self) -> usize {
        self.rows()
            .iter()
            .flat_map(|row| &row.columns)
            .map(|column| match &column.content {
                Some(Content::Layout(nested)) => 1 + nested.column_count(),
                _ => 1,
            })
            .sum()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
