//! Data models for a single pack request.
//!
//! This module defines the request and response structures of the packing layer:
//! - `ContainerSpec` / `ItemSpec`: validated caller input in external units
//! - `NormalizedContainer` / `NormalizedItem`: the same input in integer centimeters
//! - `PackingOptions`: solver switches with their defaults
//! - `Placement`, `UnfittedGroup`, `Stats`, `PackResult`: the caller-facing outcome
//!
//! Every value is created per request and dropped after the response is built.

use serde::{Deserialize, Serialize};
#[allow(unused_imports)]
use serde_json::json;
use utoipa::ToSchema;

use crate::units::{LengthUnit, to_canonical, to_integer_cm};

/// Container as sent by the caller.
///
/// # Fields
/// * `length`, `width`, `height` - Inner dimensions in the request unit
/// * `max_weight` - Maximum payload in kg
#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
pub struct ContainerSpec {
    pub length: f64,
    pub width: f64,
    pub height: f64,
    pub max_weight: f64,
}

impl ContainerSpec {
    /// Converts the container into integer centimeters.
    pub fn normalize(&self, unit: LengthUnit) -> NormalizedContainer {
        NormalizedContainer {
            l_cm: to_integer_cm(to_canonical(self.length, unit)),
            w_cm: to_integer_cm(to_canonical(self.width, unit)),
            h_cm: to_integer_cm(to_canonical(self.height, unit)),
            max_weight_kg: self.max_weight,
        }
    }
}

/// One item line of the request.
///
/// `quantity` identical physical units share the same `item_id`.
#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
#[schema(
    example = json!({
        "item_id": "SKU-001",
        "label": "Carton A",
        "length": 600.0,
        "width": 400.0,
        "height": 300.0,
        "weight": 12.5,
        "quantity": 4
    })
)]
pub struct ItemSpec {
    pub item_id: String,
    pub label: String,
    pub length: f64,
    pub width: f64,
    pub height: f64,
    pub weight: f64,
    pub quantity: u32,
}

impl ItemSpec {
    /// Converts the item dimensions into integer centimeters.
    ///
    /// Sub-centimeter dimensions are clamped to 1 cm.
    pub fn normalize(&self, unit: LengthUnit) -> NormalizedItem {
        NormalizedItem {
            item_id: self.item_id.clone(),
            label: self.label.clone(),
            quantity: self.quantity,
            l_cm: to_integer_cm(to_canonical(self.length, unit)),
            w_cm: to_integer_cm(to_canonical(self.width, unit)),
            h_cm: to_integer_cm(to_canonical(self.height, unit)),
            weight_kg: self.weight,
        }
    }
}

/// Loading strategy that decides the order in which the solver reports placements.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum PutType {
    /// Loaded through the door, back wall first.
    #[default]
    General,
    /// Loaded from above, bottom layer first.
    OpenTop,
}

impl From<PutType> for u8 {
    fn from(value: PutType) -> Self {
        match value {
            PutType::General => 1,
            PutType::OpenTop => 2,
        }
    }
}

impl TryFrom<u8> for PutType {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(PutType::General),
            2 => Ok(PutType::OpenTop),
            other => Err(format!("unknown put_type {}", other)),
        }
    }
}

/// Solver switches. Unspecified fields take the documented defaults.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, ToSchema)]
pub struct PackingOptions {
    /// Snap items flush against neighbouring faces.
    pub fix_point: bool,
    /// Reject placements that are not sufficiently supported from below.
    pub check_stable: bool,
    /// Minimum supported fraction of an item's base, in (0, 1].
    pub support_surface_ratio: f64,
    /// Place large items before small ones.
    pub bigger_first: bool,
    /// 1 = general loading, 2 = open top.
    #[schema(value_type = u8, example = 1)]
    pub put_type: PutType,
}

impl PackingOptions {
    pub const DEFAULT_FIX_POINT: bool = true;
    pub const DEFAULT_CHECK_STABLE: bool = true;
    pub const DEFAULT_SUPPORT_SURFACE_RATIO: f64 = 0.75;
    pub const DEFAULT_BIGGER_FIRST: bool = true;
}

impl Default for PackingOptions {
    fn default() -> Self {
        Self {
            fix_point: Self::DEFAULT_FIX_POINT,
            check_stable: Self::DEFAULT_CHECK_STABLE,
            support_surface_ratio: Self::DEFAULT_SUPPORT_SURFACE_RATIO,
            bigger_first: Self::DEFAULT_BIGGER_FIRST,
            put_type: PutType::default(),
        }
    }
}

/// Fully validated request.
#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
#[schema(
    example = json!({
        "units": "mm",
        "container": { "length": 5900.0, "width": 2350.0, "height": 2390.0, "max_weight": 28000.0 },
        "items": [
            {
                "item_id": "SKU-001",
                "label": "Carton A",
                "length": 600.0,
                "width": 400.0,
                "height": 300.0,
                "weight": 12.5,
                "quantity": 4
            }
        ],
        "options": { "check_stable": true, "support_surface_ratio": 0.75 }
    })
)]
pub struct PackRequest {
    pub units: LengthUnit,
    pub container: ContainerSpec,
    pub items: Vec<ItemSpec>,
    pub options: PackingOptions,
}

impl PackRequest {
    /// Total number of physical units across all item lines.
    pub fn expanded_items(&self) -> usize {
        self.items.iter().map(|item| item.quantity as usize).sum()
    }
}

/// Container in integer centimeters, caller axes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NormalizedContainer {
    pub l_cm: u32,
    pub w_cm: u32,
    pub h_cm: u32,
    pub max_weight_kg: f64,
}

impl NormalizedContainer {
    /// Dimensions as a (length, width, height) triple.
    pub fn lwh(&self) -> (u32, u32, u32) {
        (self.l_cm, self.w_cm, self.h_cm)
    }
}

/// Item line in integer centimeters, caller axes.
#[derive(Clone, Debug, PartialEq)]
pub struct NormalizedItem {
    pub item_id: String,
    pub label: String,
    pub quantity: u32,
    pub l_cm: u32,
    pub w_cm: u32,
    pub h_cm: u32,
    pub weight_kg: f64,
}

impl NormalizedItem {
    /// Dimensions as a (length, width, height) triple.
    pub fn lwh(&self) -> (u32, u32, u32) {
        (self.l_cm, self.w_cm, self.h_cm)
    }
}

/// One placed unit, reported in the caller's units and axes.
///
/// # Fields
/// * `pos_x`, `pos_y`, `pos_z` - Lower corner along length, width and height
/// * `rotation` - Orientation code 0..=5
/// * `step_number` - 1-based position in the solver's commit order
#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
pub struct Placement {
    pub item_id: String,
    pub label: String,
    pub pos_x: f64,
    pub pos_y: f64,
    pub pos_z: f64,
    pub rotation: u8,
    pub step_number: usize,
}

/// Units of one item that the solver could not place.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ToSchema)]
pub struct UnfittedGroup {
    pub item_id: String,
    pub label: String,
    pub count: usize,
}

/// Counters and timings of one pack run.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct Stats {
    pub expanded_items: usize,
    pub fitted_count: usize,
    pub unfitted_count: usize,
    pub pack_time_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[schema(nullable = false)]
    pub total_time_ms: Option<u64>,
}

/// Caller-facing result of a pack request.
#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
pub struct PackResult {
    pub units: LengthUnit,
    pub placements: Vec<Placement>,
    pub unfitted: Vec<UnfittedGroup>,
    pub stats: Stats,
}

impl PackResult {
    /// Whether every expanded unit was placed.
    pub fn is_complete(&self) -> bool {
        self.unfitted.is_empty()
    }
}
