//! Capability boundary to the bin-packing solver.
//!
//! The pipeline only talks to a solver through [`Solver`]: register one
//! container, register every expanded unit, run a placement pass and read the
//! placed and unplaced units back. All geometry on this boundary is in integer
//! centimeters and solver axes (width, height, depth), with height vertical.

use thiserror::Error;

use crate::model::PackingOptions;

/// Dimension or position triple in solver axes (width, height, depth).
pub type SolverDims = (u32, u32, u32);

/// The single container of a solver run.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SolverBin {
    pub dims: SolverDims,
    pub max_weight: f64,
}

/// One physical unit handed to the solver.
///
/// `item_id` and `sequence` are opaque to the solver and come back unchanged.
#[derive(Clone, Debug, PartialEq)]
pub struct SolverItemUnit {
    pub item_id: String,
    /// 1-based index among the units of the same item.
    pub sequence: u32,
    pub dims: SolverDims,
    pub weight: f64,
}

impl SolverItemUnit {
    /// Volume in cubic centimeters.
    pub fn volume(&self) -> u64 {
        let (w, h, d) = self.dims;
        u64::from(w) * u64::from(h) * u64::from(d)
    }
}

/// A unit the solver committed to the container.
#[derive(Clone, Debug, PartialEq)]
pub struct PlacedUnit {
    pub unit: SolverItemUnit,
    /// Lower corner in solver axes.
    pub position: SolverDims,
    /// Dimensions after the solver's rotation, in solver axes.
    pub dims: SolverDims,
}

/// Failures raised by a solver implementation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolverError {
    #[error("no container registered")]
    MissingContainer,
    #[error("a container is already registered")]
    ContainerAlreadyRegistered,
    #[error("invalid dimensions {0:?}: every side must be at least 1 cm")]
    InvalidDimensions(SolverDims),
    #[error("invalid weight {0}: must be positive and finite")]
    InvalidWeight(f64),
}

/// Narrow interface of a single-container bin-packing solver.
///
/// One instance serves exactly one request; implementations must not share
/// mutable state between instances.
pub trait Solver {
    /// Registers the container. Called once per run.
    fn register_container(
        &mut self,
        bin: SolverBin,
        options: &PackingOptions,
    ) -> Result<(), SolverError>;

    /// Registers one expanded unit.
    fn register_item(&mut self, unit: SolverItemUnit) -> Result<(), SolverError>;

    /// Performs the placement pass.
    fn run(&mut self, options: &PackingOptions) -> Result<(), SolverError>;

    /// Placed units in the solver's commit order.
    fn placed(&self) -> &[PlacedUnit];

    /// Units that did not fit.
    fn unfitted(&self) -> &[SolverItemUnit];
}
