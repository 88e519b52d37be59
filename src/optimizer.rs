//! Heuristic single-container solver.
//!
//! Places expanded units one after another into a single container, working
//! in solver axes (x = width, y = height, z = depth; y is vertical). For each
//! unit and each allowed orientation it evaluates candidate positions and keeps
//! the best one, taking into account:
//! - the container bounds and the weight limit
//! - collisions with already placed units
//! - support from below (area ratio, supported centre, no heavy-on-light)
//! - the horizontal balance of the load

use std::cmp::Ordering;

use crate::geometry::{Cuboid, footprint_center_inside, footprint_overlap, intersects};
use crate::model::{PackingOptions, PutType};
use crate::rotation::orientations;
use crate::solver::{PlacedUnit, Solver, SolverBin, SolverDims, SolverError, SolverItemUnit};

/// Tolerance for weight comparisons in kg.
const WEIGHT_EPSILON: f64 = 1e-6;

/// Tuning of the heuristic that is not part of a request.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SolverConfig {
    /// Raster step in cm for candidate positions when contact snapping is off.
    /// Widened automatically on very long axes.
    pub grid_step: u32,
    /// Maximum allowed distance of the centre of mass from the floor centre,
    /// as a fraction of the half diagonal.
    pub balance_limit_ratio: f64,
    /// Allows all six orientations; otherwise only turns about the vertical axis.
    pub allow_item_rotation: bool,
}

impl SolverConfig {
    pub const DEFAULT_GRID_STEP: u32 = 5;
    pub const DEFAULT_BALANCE_LIMIT_RATIO: f64 = 0.45;
    pub const DEFAULT_ALLOW_ITEM_ROTATION: bool = true;

    /// Creates a builder for a custom configuration.
    pub fn builder() -> SolverConfigBuilder {
        SolverConfigBuilder::default()
    }
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            grid_step: Self::DEFAULT_GRID_STEP,
            balance_limit_ratio: Self::DEFAULT_BALANCE_LIMIT_RATIO,
            allow_item_rotation: Self::DEFAULT_ALLOW_ITEM_ROTATION,
        }
    }
}

/// Builder for [`SolverConfig`].
#[derive(Clone, Debug, Default)]
pub struct SolverConfigBuilder {
    config: SolverConfig,
}

impl SolverConfigBuilder {
    /// Sets the raster step (values below 1 are raised to 1).
    pub fn grid_step(mut self, step: u32) -> Self {
        self.config.grid_step = step.max(1);
        self
    }

    /// Sets the balance limit as a ratio of the half diagonal.
    pub fn balance_limit_ratio(mut self, ratio: f64) -> Self {
        self.config.balance_limit_ratio = ratio;
        self
    }

    /// Enables or disables rotations out of the upright pose.
    pub fn allow_item_rotation(mut self, allow: bool) -> Self {
        self.config.allow_item_rotation = allow;
        self
    }

    /// Builds the final configuration.
    pub fn build(self) -> SolverConfig {
        self.config
    }
}

/// A unit committed to the container during a run.
#[derive(Clone, Debug)]
struct Committed {
    cuboid: Cuboid,
    weight: f64,
}

/// Single-bin solver behind the [`Solver`] interface.
///
/// # Examples
/// ```
/// use pack_normalizer::model::PackingOptions;
/// use pack_normalizer::optimizer::{HeuristicSolver, SolverConfig};
/// use pack_normalizer::solver::{Solver, SolverBin, SolverItemUnit};
///
/// let options = PackingOptions::default();
/// let mut solver = HeuristicSolver::new(SolverConfig::default());
/// solver
///     .register_container(SolverBin { dims: (20, 20, 20), max_weight: 100.0 }, &options)
///     .unwrap();
/// solver
///     .register_item(SolverItemUnit {
///         item_id: "A".into(),
///         sequence: 1,
///         dims: (10, 10, 10),
///         weight: 1.0,
///     })
///     .unwrap();
/// solver.run(&options).unwrap();
/// assert_eq!(solver.placed().len(), 1);
/// ```
#[derive(Debug)]
pub struct HeuristicSolver {
    config: SolverConfig,
    bin: Option<SolverBin>,
    put_type: PutType,
    pending: Vec<SolverItemUnit>,
    placed: Vec<PlacedUnit>,
    unfitted: Vec<SolverItemUnit>,
}

impl HeuristicSolver {
    pub fn new(config: SolverConfig) -> Self {
        Self {
            config,
            bin: None,
            put_type: PutType::default(),
            pending: Vec::new(),
            placed: Vec::new(),
            unfitted: Vec::new(),
        }
    }
}

impl Solver for HeuristicSolver {
    fn register_container(
        &mut self,
        bin: SolverBin,
        options: &PackingOptions,
    ) -> Result<(), SolverError> {
        if self.bin.is_some() {
            return Err(SolverError::ContainerAlreadyRegistered);
        }
        validate_dims(bin.dims)?;
        validate_weight(bin.max_weight)?;
        self.bin = Some(bin);
        self.put_type = options.put_type;
        Ok(())
    }

    fn register_item(&mut self, unit: SolverItemUnit) -> Result<(), SolverError> {
        validate_dims(unit.dims)?;
        validate_weight(unit.weight)?;
        self.pending.push(unit);
        Ok(())
    }

    fn run(&mut self, options: &PackingOptions) -> Result<(), SolverError> {
        let bin = self.bin.ok_or(SolverError::MissingContainer)?;
        let mut units: Vec<(usize, SolverItemUnit)> =
            std::mem::take(&mut self.pending).into_iter().enumerate().collect();

        // Large and heavy units first (stability principle)
        if options.bigger_first {
            units.sort_by(|(_, a), (_, b)| {
                b.volume().cmp(&a.volume()).then_with(|| {
                    b.weight
                        .partial_cmp(&a.weight)
                        .unwrap_or(Ordering::Equal)
                })
            });
        }

        let mut committed: Vec<Committed> = Vec::new();
        let mut placed: Vec<PlacedUnit> = Vec::new();
        let mut unfitted: Vec<(usize, SolverItemUnit)> = Vec::new();
        let mut total_weight = 0.0;

        for (index, unit) in units {
            if total_weight + unit.weight > bin.max_weight + WEIGHT_EPSILON {
                unfitted.push((index, unit));
                continue;
            }

            match find_position(&unit, &committed, &bin, options, &self.config) {
                Some(cuboid) => {
                    total_weight += unit.weight;
                    committed.push(Committed {
                        cuboid,
                        weight: unit.weight,
                    });
                    placed.push(PlacedUnit {
                        unit,
                        position: cuboid.position,
                        dims: cuboid.dims,
                    });
                }
                None => unfitted.push((index, unit)),
            }
        }

        // unfitted units are reported in registration order
        unfitted.sort_by_key(|(index, _)| *index);

        order_for_loading(&mut placed, self.put_type);
        self.placed = placed;
        self.unfitted = unfitted.into_iter().map(|(_, unit)| unit).collect();
        Ok(())
    }

    fn placed(&self) -> &[PlacedUnit] {
        &self.placed
    }

    fn unfitted(&self) -> &[SolverItemUnit] {
        &self.unfitted
    }
}

fn validate_dims(dims: SolverDims) -> Result<(), SolverError> {
    if dims.0 == 0 || dims.1 == 0 || dims.2 == 0 {
        return Err(SolverError::InvalidDimensions(dims));
    }
    Ok(())
}

fn validate_weight(weight: f64) -> Result<(), SolverError> {
    if !weight.is_finite() || weight <= 0.0 {
        return Err(SolverError::InvalidWeight(weight));
    }
    Ok(())
}

/// Sorts the placements into the order in which they are loaded.
///
/// General loading goes through the door from the back wall (x, then z, then y);
/// open-top loading fills bottom layers first (y, then z, then x).
fn order_for_loading(placed: &mut [PlacedUnit], put_type: PutType) {
    match put_type {
        PutType::General => placed.sort_by_key(|p| (p.position.0, p.position.2, p.position.1)),
        PutType::OpenTop => placed.sort_by_key(|p| (p.position.1, p.position.2, p.position.0)),
    }
}

/// Orientations (solver axes) the unit may take, without duplicates.
fn candidate_orientations(dims: SolverDims, allow_rotation: bool) -> Vec<SolverDims> {
    let mut result: Vec<SolverDims> = Vec::with_capacity(6);
    if allow_rotation {
        for candidate in orientations(dims) {
            if !result.contains(&candidate) {
                result.push(candidate);
            }
        }
    } else {
        // turns about the vertical axis only: swap width and depth
        let (w, h, d) = dims;
        result.push((w, h, d));
        if w != d {
            result.push((d, h, w));
        }
    }
    result
}

/// Upper bound for raster positions along one horizontal axis.
const MAX_GRID_POSITIONS: u64 = 100;

/// Candidate lower corner in solver axes, widened to avoid overflow.
type Point = (u64, u64, u64);

/// Evaluation of a candidate position.
///
/// Lower is better: y first, then x, then z, then the resulting top, then balance.
#[derive(Clone, Copy, Debug)]
struct PlacementScore {
    y: u32,
    x: u32,
    z: u32,
    top: u64,
    balance: f64,
}

impl PlacementScore {
    fn is_better_than(&self, other: &Self) -> bool {
        match (self.y, self.x, self.z, self.top).cmp(&(other.y, other.x, other.z, other.top)) {
            Ordering::Less => true,
            Ordering::Greater => false,
            Ordering::Equal => self.balance + WEIGHT_EPSILON < other.balance,
        }
    }
}

fn update_best(best: &mut Option<(Cuboid, PlacementScore)>, cuboid: Cuboid, score: PlacementScore) {
    match best {
        Some((_, current)) if !score.is_better_than(current) => {}
        _ => *best = Some((cuboid, score)),
    }
}

/// Finds the best feasible position and orientation for `unit`.
///
/// With `fix_point` the candidates are the extreme points of the current load,
/// otherwise a raster over the floor and every placed top. Candidates inside
/// the balance limit win over candidates outside of it.
fn find_position(
    unit: &SolverItemUnit,
    committed: &[Committed],
    bin: &SolverBin,
    options: &PackingOptions,
    config: &SolverConfig,
) -> Option<Cuboid> {
    let balance_limit = balance_limit(bin, config);
    let mut best_in_limit: Option<(Cuboid, PlacementScore)> = None;
    let mut best_any: Option<(Cuboid, PlacementScore)> = None;

    let contact_points = options.fix_point.then(|| extreme_points(committed));

    for dims in candidate_orientations(unit.dims, config.allow_item_rotation) {
        if !Cuboid::new((0, 0, 0), dims).fits_inside(bin.dims) {
            continue;
        }

        let mut points = match &contact_points {
            Some(points) => points.clone(),
            None => grid_points(bin, dims, committed, config),
        };
        points.sort_unstable_by_key(|&(x, y, z)| (y, x, z));

        for point in points {
            // nothing higher can beat an in-limit candidate on a lower layer
            if best_in_limit.is_some_and(|(_, best)| u64::from(best.y) < point.1) {
                break;
            }

            let Some(candidate) = place_at(point, dims, bin) else {
                continue;
            };

            if committed.iter().any(|c| intersects(&c.cuboid, &candidate)) {
                continue;
            }

            let (x, y, z) = candidate.position;
            if y > 0 && !is_supported(&candidate, unit.weight, committed, options) {
                continue;
            }

            let balance = balance_after(bin, committed, &candidate, unit.weight);
            let score = PlacementScore {
                y,
                x,
                z,
                top: candidate.top(),
                balance,
            };

            update_best(&mut best_any, candidate, score);
            if balance <= balance_limit + WEIGHT_EPSILON {
                update_best(&mut best_in_limit, candidate, score);
            }
        }
    }

    best_in_limit.or(best_any).map(|(cuboid, _)| cuboid)
}

/// Builds the cuboid at `point` if it stays inside the container.
fn place_at(point: Point, dims: SolverDims, bin: &SolverBin) -> Option<Cuboid> {
    let (x, y, z) = point;
    if x + u64::from(dims.0) > u64::from(bin.dims.0)
        || y + u64::from(dims.1) > u64::from(bin.dims.1)
        || z + u64::from(dims.2) > u64::from(bin.dims.2)
    {
        return None;
    }
    let position = (
        u32::try_from(x).ok()?,
        u32::try_from(y).ok()?,
        u32::try_from(z).ok()?,
    );
    Some(Cuboid::new(position, dims))
}

/// Extreme points of the current load.
///
/// The origin plus, for every placed unit, the corners right of it, in front
/// of it and on top of it, and the projections of the first two onto the back
/// walls. Units placed there sit flush against at least two faces.
fn extreme_points(committed: &[Committed]) -> Vec<Point> {
    let mut points = vec![(0, 0, 0)];
    for c in committed {
        let (x, y, z) = c.cuboid.min_corner();
        let (x2, top, z2) = c.cuboid.max_corner();
        points.extend([(x2, y, z), (x, y, z2), (x, top, z), (x2, y, 0), (0, y, z2)]);
    }
    points.sort_unstable();
    points.dedup();
    points
}

/// Raster candidates on the floor and on every placed top.
fn grid_points(
    bin: &SolverBin,
    dims: SolverDims,
    committed: &[Committed],
    config: &SolverConfig,
) -> Vec<Point> {
    let mut layers: Vec<u64> = committed.iter().map(|c| c.cuboid.top()).collect();
    layers.push(0);
    layers.sort_unstable();
    layers.dedup();

    let xs = axis_positions(bin.dims.0, dims.0, config.grid_step);
    let zs = axis_positions(bin.dims.2, dims.2, config.grid_step);

    let mut points = Vec::with_capacity(layers.len() * xs.len() * zs.len());
    for &y in &layers {
        for &x in &xs {
            for &z in &zs {
                points.push((x, y, z));
            }
        }
    }
    points
}

/// Raster coordinates along one horizontal axis, both walls included.
///
/// The step widens on long axes so no more than `MAX_GRID_POSITIONS` raster
/// positions are generated.
fn axis_positions(container_len: u32, object_len: u32, grid_step: u32) -> Vec<u64> {
    let max_pos = u64::from(container_len.saturating_sub(object_len));
    let step = u64::from(grid_step.max(1)).max(max_pos.div_ceil(MAX_GRID_POSITIONS));

    let mut positions: Vec<u64> = (0..=max_pos).step_by(step as usize).collect();
    positions.push(max_pos);
    positions.dedup();
    positions
}

/// Checks support from below for a unit resting above the floor.
///
/// Some contact area is always required. With `check_stable` the supported
/// fraction of the base must reach `support_surface_ratio`, the base centre
/// must rest on a supporting unit, and no supporting unit may be lighter.
fn is_supported(
    candidate: &Cuboid,
    weight: f64,
    committed: &[Committed],
    options: &PackingOptions,
) -> bool {
    let y = u64::from(candidate.position.1);
    let mut support_area: u64 = 0;
    let mut center_supported = false;

    for below in committed.iter().filter(|c| c.cuboid.top() == y) {
        let area = footprint_overlap(candidate, &below.cuboid);
        if area == 0 {
            continue;
        }
        support_area += area;

        if options.check_stable && below.weight + WEIGHT_EPSILON < weight {
            // heavier unit must not rest on a lighter one
            return false;
        }
        if footprint_center_inside(candidate, &below.cuboid) {
            center_supported = true;
        }
    }

    if support_area == 0 {
        return false;
    }
    if !options.check_stable {
        return true;
    }

    let ratio = support_area as f64 / candidate.base_area() as f64;
    ratio + WEIGHT_EPSILON >= options.support_surface_ratio && center_supported
}

/// Distance of the horizontal centre of mass from the floor centre after adding `candidate`.
fn balance_after(bin: &SolverBin, committed: &[Committed], candidate: &Cuboid, weight: f64) -> f64 {
    let center = |c: &Cuboid| {
        (
            f64::from(c.position.0) + f64::from(c.dims.0) / 2.0,
            f64::from(c.position.2) + f64::from(c.dims.2) / 2.0,
        )
    };

    let (cx, cz) = center(candidate);
    let mut total_w = weight;
    let mut x_c = cx * weight;
    let mut z_c = cz * weight;

    for c in committed {
        let (px, pz) = center(&c.cuboid);
        total_w += c.weight;
        x_c += px * c.weight;
        z_c += pz * c.weight;
    }

    let cm_x = x_c / total_w;
    let cm_z = z_c / total_w;
    let center_x = f64::from(bin.dims.0) / 2.0;
    let center_z = f64::from(bin.dims.2) / 2.0;

    ((cm_x - center_x).powi(2) + (cm_z - center_z).powi(2)).sqrt()
}

/// Maximum allowed balance deviation.
fn balance_limit(bin: &SolverBin, config: &SolverConfig) -> f64 {
    let half_x = f64::from(bin.dims.0) / 2.0;
    let half_z = f64::from(bin.dims.2) / 2.0;
    (half_x.powi(2) + half_z.powi(2)).sqrt() * config.balance_limit_ratio
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit(item_id: &str, sequence: u32, dims: SolverDims, weight: f64) -> SolverItemUnit {
        SolverItemUnit {
            item_id: item_id.to_string(),
            sequence,
            dims,
            weight,
        }
    }

    fn solve(
        bin: SolverBin,
        units: Vec<SolverItemUnit>,
        options: &PackingOptions,
        config: SolverConfig,
    ) -> HeuristicSolver {
        let mut solver = HeuristicSolver::new(config);
        solver.register_container(bin, options).unwrap();
        for u in units {
            solver.register_item(u).unwrap();
        }
        solver.run(options).unwrap();
        solver
    }

    fn bin(dims: SolverDims, max_weight: f64) -> SolverBin {
        SolverBin { dims, max_weight }
    }

    fn assert_no_overlap_and_inside(solver: &HeuristicSolver, bin_dims: SolverDims) {
        let cuboids: Vec<Cuboid> = solver
            .placed()
            .iter()
            .map(|p| Cuboid::new(p.position, p.dims))
            .collect();
        for (i, a) in cuboids.iter().enumerate() {
            assert!(a.fits_inside(bin_dims), "unit {i} leaves the container");
            for b in &cuboids[i + 1..] {
                assert!(!intersects(a, b), "units overlap: {a:?} / {b:?}");
            }
        }
    }

    #[test]
    fn single_unit_snaps_to_origin_without_balance_pressure() {
        let solver = solve(
            bin((20, 20, 20), 100.0),
            vec![unit("A", 1, (10, 10, 10), 1.0)],
            &PackingOptions::default(),
            SolverConfig::builder().balance_limit_ratio(1.0).build(),
        );
        assert_eq!(solver.placed().len(), 1);
        assert_eq!(solver.placed()[0].position, (0, 0, 0));
        assert!(solver.unfitted().is_empty());
    }

    #[test]
    fn balance_limit_pulls_single_unit_towards_centre() {
        // corner positions sit 7.07 from the centre, the limit is 6.36
        let options = PackingOptions {
            fix_point: false,
            ..PackingOptions::default()
        };
        let solver = solve(
            bin((20, 20, 20), 100.0),
            vec![unit("A", 1, (10, 10, 10), 1.0)],
            &options,
            SolverConfig::default(),
        );
        assert_eq!(solver.placed()[0].position, (0, 0, 5));
    }

    #[test]
    fn unfitted_units_keep_registration_order() {
        let solver = solve(
            bin((10, 10, 10), 100.0),
            vec![
                unit("small", 1, (20, 1, 1), 1.0),
                unit("large", 1, (30, 30, 30), 1.0),
                unit("fits", 1, (10, 10, 10), 1.0),
            ],
            &PackingOptions::default(),
            SolverConfig::default(),
        );
        let ids: Vec<&str> = solver.unfitted().iter().map(|u| u.item_id.as_str()).collect();
        assert_eq!(ids, vec!["small", "large"]);
    }

    #[test]
    fn two_half_cubes_share_the_floor() {
        let options = PackingOptions::default();
        let solver = solve(
            bin((100, 100, 100), 1000.0),
            vec![unit("A", 1, (50, 50, 50), 10.0), unit("A", 2, (50, 50, 50), 10.0)],
            &options,
            SolverConfig::default(),
        );
        assert_eq!(solver.placed().len(), 2);
        assert!(solver.placed().iter().all(|p| p.position.1 == 0));
        assert_no_overlap_and_inside(&solver, (100, 100, 100));
    }

    #[test]
    fn rotates_unit_that_only_fits_lying_down() {
        // 30 tall unit in a 10 tall bin must be laid on its side
        let solver = solve(
            bin((40, 10, 40), 100.0),
            vec![unit("A", 1, (10, 30, 10), 1.0)],
            &PackingOptions::default(),
            SolverConfig::default(),
        );
        assert_eq!(solver.placed().len(), 1);
        assert_eq!(solver.placed()[0].dims.1, 10);
    }

    #[test]
    fn upright_only_config_keeps_vertical_extent() {
        let solver = solve(
            bin((40, 10, 40), 100.0),
            vec![unit("A", 1, (10, 30, 10), 1.0)],
            &PackingOptions::default(),
            SolverConfig::builder().allow_item_rotation(false).build(),
        );
        assert!(solver.placed().is_empty());
        assert_eq!(solver.unfitted().len(), 1);
    }

    #[test]
    fn stacks_lighter_unit_on_heavier_one() {
        let solver = solve(
            bin((10, 30, 10), 100.0),
            vec![unit("light", 1, (10, 10, 10), 4.0), unit("heavy", 1, (10, 10, 10), 10.0)],
            &PackingOptions::default(),
            SolverConfig::builder().allow_item_rotation(false).build(),
        );
        assert_eq!(solver.placed().len(), 2);
        let heavy = solver
            .placed()
            .iter()
            .find(|p| p.unit.item_id == "heavy")
            .expect("heavy unit missing");
        let light = solver
            .placed()
            .iter()
            .find(|p| p.unit.item_id == "light")
            .expect("light unit missing");
        assert_eq!(heavy.position.1, 0);
        assert_eq!(light.position.1, 10);
    }

    #[test]
    fn rejects_heavier_unit_on_lighter_support() {
        let options = PackingOptions {
            bigger_first: false,
            ..PackingOptions::default()
        };
        let solver = solve(
            bin((10, 30, 10), 100.0),
            vec![unit("light", 1, (10, 10, 10), 4.0), unit("heavy", 1, (10, 10, 10), 9.0)],
            &options,
            SolverConfig::builder().allow_item_rotation(false).build(),
        );
        assert_eq!(solver.placed().len(), 1);
        assert_eq!(solver.unfitted()[0].item_id, "heavy");
    }

    #[test]
    fn unstable_overhang_is_accepted_without_stability_check() {
        let committed = vec![Committed {
            cuboid: Cuboid::new((0, 0, 0), (10, 10, 10)),
            weight: 5.0,
        }];
        let overhang = Cuboid::new((5, 10, 0), (20, 10, 10));

        let strict = PackingOptions::default();
        assert!(!is_supported(&overhang, 1.0, &committed, &strict));

        let relaxed = PackingOptions {
            check_stable: false,
            ..PackingOptions::default()
        };
        assert!(is_supported(&overhang, 1.0, &committed, &relaxed));

        let floating = Cuboid::new((15, 10, 0), (5, 5, 5));
        assert!(!is_supported(&floating, 1.0, &committed, &relaxed));
    }

    #[test]
    fn weight_limit_leaves_units_unfitted() {
        let solver = solve(
            bin((100, 100, 100), 25.0),
            vec![
                unit("A", 1, (10, 10, 10), 10.0),
                unit("A", 2, (10, 10, 10), 10.0),
                unit("A", 3, (10, 10, 10), 10.0),
            ],
            &PackingOptions::default(),
            SolverConfig::default(),
        );
        assert_eq!(solver.placed().len(), 2);
        assert_eq!(solver.unfitted().len(), 1);
    }

    #[test]
    fn oversized_unit_is_unfitted() {
        let solver = solve(
            bin((10, 10, 10), 100.0),
            vec![unit("big", 1, (12, 9, 8), 1.0)],
            &PackingOptions::default(),
            SolverConfig::default(),
        );
        assert!(solver.placed().is_empty());
        assert_eq!(solver.unfitted()[0].item_id, "big");
    }

    #[test]
    fn grid_mode_packs_without_overlap() {
        let options = PackingOptions {
            fix_point: false,
            ..PackingOptions::default()
        };
        let units = (1..=8).map(|i| unit("A", i, (25, 20, 25), 2.0)).collect();
        let solver = solve(
            bin((50, 40, 50), 100.0),
            units,
            &options,
            SolverConfig::builder().grid_step(5).build(),
        );
        assert_eq!(solver.placed().len() + solver.unfitted().len(), 8);
        assert_no_overlap_and_inside(&solver, (50, 40, 50));
    }

    #[test]
    fn mixed_load_never_overlaps() {
        let units = vec![
            unit("A", 1, (60, 40, 50), 90.0),
            unit("B", 1, (50, 30, 40), 70.0),
            unit("C", 1, (30, 20, 30), 50.0),
            unit("C", 2, (30, 20, 30), 50.0),
            unit("D", 1, (20, 25, 40), 30.0),
            unit("E", 1, (10, 10, 20), 10.0),
        ];
        let solver = solve(
            bin((100, 100, 100), 500.0),
            units,
            &PackingOptions::default(),
            SolverConfig::default(),
        );
        assert_eq!(solver.placed().len() + solver.unfitted().len(), 6);
        assert_no_overlap_and_inside(&solver, (100, 100, 100));
    }

    #[test]
    fn open_top_orders_bottom_layer_first() {
        let options = PackingOptions {
            put_type: PutType::OpenTop,
            ..PackingOptions::default()
        };
        let units = (1..=3).map(|i| unit("A", i, (10, 10, 10), 1.0)).collect();
        let solver = solve(
            bin((20, 20, 10), 100.0),
            units,
            &options,
            SolverConfig::builder().allow_item_rotation(false).build(),
        );
        let ys: Vec<u32> = solver.placed().iter().map(|p| p.position.1).collect();
        let mut sorted = ys.clone();
        sorted.sort_unstable();
        assert_eq!(ys, sorted);
    }

    #[test]
    fn general_orders_from_back_wall() {
        let units = (1..=4).map(|i| unit("A", i, (10, 10, 10), 1.0)).collect();
        let solver = solve(
            bin((20, 10, 20), 100.0),
            units,
            &PackingOptions::default(),
            SolverConfig::default(),
        );
        let xs: Vec<u32> = solver.placed().iter().map(|p| p.position.0).collect();
        let mut sorted = xs.clone();
        sorted.sort_unstable();
        assert_eq!(xs, sorted);
    }

    #[test]
    fn run_without_container_fails() {
        let mut solver = HeuristicSolver::new(SolverConfig::default());
        assert_eq!(
            solver.run(&PackingOptions::default()),
            Err(SolverError::MissingContainer)
        );
    }

    #[test]
    fn second_container_is_rejected() {
        let options = PackingOptions::default();
        let mut solver = HeuristicSolver::new(SolverConfig::default());
        solver.register_container(bin((10, 10, 10), 1.0), &options).unwrap();
        assert_eq!(
            solver.register_container(bin((10, 10, 10), 1.0), &options),
            Err(SolverError::ContainerAlreadyRegistered)
        );
    }

    #[test]
    fn invalid_units_are_refused_at_registration() {
        let mut solver = HeuristicSolver::new(SolverConfig::default());
        assert_eq!(
            solver.register_item(unit("A", 1, (0, 5, 5), 1.0)),
            Err(SolverError::InvalidDimensions((0, 5, 5)))
        );
        assert!(matches!(
            solver.register_item(unit("A", 1, (5, 5, 5), f64::NAN)),
            Err(SolverError::InvalidWeight(_))
        ));
    }

    #[test]
    fn orientations_are_deduplicated() {
        assert_eq!(candidate_orientations((10, 10, 10), true).len(), 1);
        assert_eq!(candidate_orientations((10, 10, 20), true).len(), 3);
        assert_eq!(candidate_orientations((10, 20, 30), true).len(), 6);
        assert_eq!(candidate_orientations((10, 20, 30), false), vec![(10, 20, 30), (30, 20, 10)]);
    }

    #[test]
    fn extreme_points_follow_placed_faces() {
        let committed = vec![Committed {
            cuboid: Cuboid::new((0, 0, 0), (30, 10, 20)),
            weight: 1.0,
        }];
        assert_eq!(
            extreme_points(&committed),
            vec![(0, 0, 0), (0, 0, 20), (0, 10, 0), (30, 0, 0)]
        );
    }

    #[test]
    fn axis_positions_include_far_wall() {
        assert_eq!(axis_positions(23, 10, 5), vec![0, 5, 10, 13]);
        assert_eq!(axis_positions(10, 10, 5), vec![0]);
    }

    #[test]
    fn axis_positions_are_capped_on_long_axes() {
        let positions = axis_positions(1_000_000, 100, 5);
        assert!(positions.len() as u64 <= MAX_GRID_POSITIONS + 1);
        assert_eq!(positions.first(), Some(&0));
        assert_eq!(positions.last(), Some(&999_900));
    }

    #[test]
    fn tall_stack_beyond_bin_height_is_not_placed() {
        // 2.5e9 + 2.5e9 exceeds both the 4e9 bin and u32::MAX
        for fix_point in [true, false] {
            let options = PackingOptions {
                fix_point,
                ..PackingOptions::default()
            };
            let rods = (1..=2)
                .map(|i| unit("rod", i, (1, 2_500_000_000, 1), 1.0))
                .collect();
            let solver = solve(
                bin((1, 4_000_000_000, 1), 100.0),
                rods,
                &options,
                SolverConfig::default(),
            );
            assert_eq!(solver.placed().len(), 1, "fix_point = {fix_point}");
            assert_eq!(solver.unfitted().len(), 1, "fix_point = {fix_point}");
            assert_no_overlap_and_inside(&solver, (1, 4_000_000_000, 1));
        }
    }

    #[test]
    fn large_floor_with_few_units_packs_every_unit() {
        let units = (1..=5).map(|i| unit("pallet", i, (120, 150, 80), 200.0)).collect();
        let solver = solve(
            bin((20_000, 300, 10_000), 5_000.0),
            units,
            &PackingOptions::default(),
            SolverConfig::default(),
        );
        assert_eq!(solver.placed().len(), 5);
        assert_no_overlap_and_inside(&solver, (20_000, 300, 10_000));
    }
}
