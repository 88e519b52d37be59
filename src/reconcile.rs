//! Quantity expansion before solving and re-aggregation afterwards.

use std::collections::{BTreeMap, HashMap};

use crate::error::PackError;
use crate::mapping::{from_solver_dims, from_solver_position, to_solver_item};
use crate::model::{NormalizedItem, PackResult, Placement, Stats, UnfittedGroup};
use crate::rotation::decode;
use crate::solver::{PlacedUnit, SolverItemUnit};
use crate::units::{LengthUnit, from_canonical};

/// Per-request lookup of original item data by `item_id`.
#[derive(Debug, Default)]
pub struct ItemLookup<'a> {
    entries: HashMap<&'a str, (&'a str, (u32, u32, u32))>,
}

impl<'a> ItemLookup<'a> {
    /// Indexes labels and caller-axis dimensions of `items`.
    pub fn new(items: &'a [NormalizedItem]) -> Self {
        let entries = items
            .iter()
            .map(|item| (item.item_id.as_str(), (item.label.as_str(), item.lwh())))
            .collect();
        Self { entries }
    }

    /// Original (L, W, H) in centimeters.
    pub fn dims(&self, item_id: &str) -> Option<(u32, u32, u32)> {
        self.entries.get(item_id).map(|(_, dims)| *dims)
    }

    pub fn label(&self, item_id: &str) -> Option<&'a str> {
        self.entries.get(item_id).map(|(label, _)| *label)
    }
}

/// Expands item lines into one solver unit per physical piece.
///
/// Units keep the declared item order; `sequence` counts from 1 per item.
pub fn expand(items: &[NormalizedItem]) -> Vec<SolverItemUnit> {
    let total: usize = items.iter().map(|item| item.quantity as usize).sum();
    let mut units = Vec::with_capacity(total);

    for item in items {
        let dims = to_solver_item(item.lwh());
        for sequence in 1..=item.quantity {
            units.push(SolverItemUnit {
                item_id: item.item_id.clone(),
                sequence,
                dims,
                weight: item.weight_kg,
            });
        }
    }

    units
}

/// Builds the caller-facing result from the solver's flat output.
///
/// `fitted` must be in solver commit order; it becomes `step_number`
/// unchanged. Unfitted units collapse into one group per `item_id`, sorted by
/// `item_id`. `pack_time_ms` is left at 0 for the caller to fill in.
///
/// # Errors
/// [`PackError::Invariant`] if the solver reports an `item_id` that was never
/// registered, or if placed and unfitted units do not add up to
/// `expanded_items`.
pub fn reconcile(
    fitted: &[PlacedUnit],
    unfitted: &[SolverItemUnit],
    lookup: &ItemLookup<'_>,
    units: LengthUnit,
    expanded_items: usize,
) -> Result<PackResult, PackError> {
    let mut placements = Vec::with_capacity(fitted.len());

    for (idx, placed) in fitted.iter().enumerate() {
        let item_id = placed.unit.item_id.as_str();
        let original = lookup.dims(item_id).ok_or_else(|| unknown_item(item_id))?;
        let label = lookup.label(item_id).unwrap_or(item_id);

        let rotation = decode(original, from_solver_dims(placed.dims));
        let (x, y, z) = from_solver_position(placed.position);

        placements.push(Placement {
            item_id: item_id.to_string(),
            label: label.to_string(),
            pos_x: from_canonical(f64::from(x), units),
            pos_y: from_canonical(f64::from(y), units),
            pos_z: from_canonical(f64::from(z), units),
            rotation,
            step_number: idx + 1,
        });
    }

    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for unit in unfitted {
        *counts.entry(unit.item_id.as_str()).or_insert(0) += 1;
    }

    let mut groups = Vec::with_capacity(counts.len());
    for (item_id, count) in counts {
        let label = lookup.label(item_id).ok_or_else(|| unknown_item(item_id))?;
        groups.push(UnfittedGroup {
            item_id: item_id.to_string(),
            label: label.to_string(),
            count,
        });
    }

    let fitted_count = placements.len();
    let unfitted_count: usize = groups.iter().map(|group| group.count).sum();
    if fitted_count + unfitted_count != expanded_items {
        return Err(PackError::Invariant(format!(
            "solver accounted for {} of {} units ({} placed, {} unfitted)",
            fitted_count + unfitted_count,
            expanded_items,
            fitted_count,
            unfitted_count
        )));
    }

    Ok(PackResult {
        units,
        placements,
        unfitted: groups,
        stats: Stats {
            expanded_items,
            fitted_count,
            unfitted_count,
            pack_time_ms: 0,
            total_time_ms: None,
        },
    })
}

fn unknown_item(item_id: &str) -> PackError {
    PackError::Invariant(format!("solver reported unknown item_id '{}'", item_id))
}
