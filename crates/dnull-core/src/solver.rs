// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Edge-Plasma Solver Interface
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Capabilities the conversion needs from the edge-plasma solver.
//!
//! The solver owns the mesh and the field storage. The conversion is handed
//! an exclusive `&mut` handle for its whole duration and never keeps one.

use dnull_types::error::FusionResult;
use dnull_types::state::{CorePower, GridMetadata, PhysicsModels, PlasmaField, SolverControls};
use ndarray::ArrayD;

pub trait PlasmaSolver {
    /// Current geometry tag, e.g. `"dnbot"` or `"dnull"`.
    fn geometry(&self) -> &str;

    fn set_geometry(&mut self, tag: &str);

    fn grid(&self) -> GridMetadata;

    fn models(&self) -> PhysicsModels;

    fn controls(&self) -> SolverControls;

    fn set_controls(&mut self, controls: SolverControls);

    fn core_power(&self) -> CorePower;

    fn set_core_power(&mut self, power: CorePower);

    /// Owned copy of a stored field. Later solver mutation must not show
    /// through the returned array.
    fn read_field(&self, field: PlasmaField) -> FusionResult<ArrayD<f64>>;

    /// Replace a stored field. Shape must match the current mesh.
    fn write_field(&mut self, field: PlasmaField, values: ArrayD<f64>) -> FusionResult<()>;

    /// Rebuild the mesh for the current geometry tag, reallocate every
    /// field, and take one quasi-static step of `time_step`. Blocks until
    /// the step finishes.
    fn regenerate(&mut self, time_step: f64) -> FusionResult<()>;
}
