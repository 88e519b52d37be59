//! Single-pass request pipeline.
//!
//! Validate → normalize units → map to solver axes → expand → solve → reconcile.
//! Every stage is synchronous and works on request-local data only; the first
//! failing stage aborts the request.

use std::time::Instant;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::PackError;
use crate::mapping::to_solver_bin;
use crate::model::{NormalizedItem, PackRequest, PackResult};
use crate::reconcile::{ItemLookup, expand, reconcile};
use crate::request;
use crate::solver::{Solver, SolverBin};

/// Validates a raw JSON body and packs it with `solver`.
pub fn pack_request<S: Solver>(raw: &Value, solver: &mut S) -> Result<PackResult, PackError> {
    let request = request::parse(raw).inspect_err(|err| {
        warn!(code = err.code(), error = %err, "Rejected pack request");
    })?;
    pack(&request, solver)
}

/// Packs an already validated request.
///
/// `solver` must be fresh: it receives exactly one container and one
/// registration per physical unit. `stats.pack_time_ms` covers the solver run
/// only; `stats.total_time_ms` is left for the transport.
pub fn pack<S: Solver>(request: &PackRequest, solver: &mut S) -> Result<PackResult, PackError> {
    let container = request.container.normalize(request.units);
    let items: Vec<NormalizedItem> = request
        .items
        .iter()
        .map(|item| item.normalize(request.units))
        .collect();

    let bin = SolverBin {
        dims: to_solver_bin(container.lwh()),
        max_weight: container.max_weight_kg,
    };
    debug!(
        units = %request.units,
        bin = ?bin.dims,
        max_weight = bin.max_weight,
        lines = items.len(),
        "Normalized pack request"
    );

    solver.register_container(bin, &request.options)?;

    let expanded_items = request.expanded_items();
    for unit in expand(&items) {
        solver.register_item(unit)?;
    }

    let started = Instant::now();
    solver.run(&request.options).inspect_err(|err| {
        warn!(error = %err, "Solver run failed");
    })?;
    let pack_time_ms = started.elapsed().as_millis() as u64;

    let lookup = ItemLookup::new(&items);
    let mut result = reconcile(
        solver.placed(),
        solver.unfitted(),
        &lookup,
        request.units,
        expanded_items,
    )?;
    result.stats.pack_time_ms = pack_time_ms;

    info!(
        expanded = result.stats.expanded_items,
        fitted = result.stats.fitted_count,
        unfitted = result.stats.unfitted_count,
        complete = result.is_complete(),
        pack_time_ms,
        "Pack finished"
    );

    Ok(result)
}
