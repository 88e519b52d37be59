//! Unit-normalizing packing layer.
//!
//! Validates caller requests in mm, cm or m, converts them into the integer
//! centimeter grid of a single-container solver, runs the solver and maps the
//! placements back into the caller's units and axes.

pub mod api;
pub mod config;
pub mod error;
pub mod geometry;
pub mod mapping;
pub mod model;
pub mod optimizer;
pub mod pipeline;
pub mod reconcile;
pub mod request;
pub mod rotation;
pub mod solver;
pub mod units;
