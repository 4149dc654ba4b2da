// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — In-Memory Solver State
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! In-memory [`PlasmaSolver`] holding fields as dense arrays.
//!
//! Regeneration only rebuilds storage: a bottom-half mesh tagged `dnull`
//! becomes a double-null mesh with `nx = 2 * nx - 2` and zeroed fields.
//! No transport step is taken. Every regeneration and field write is
//! recorded so callers can inspect what a conversion did.

use std::collections::BTreeMap;

use dnull_types::error::{FusionError, FusionResult};
use dnull_types::state::{CorePower, GridMetadata, PhysicsModels, PlasmaField, SolverControls};
use ndarray::{ArrayD, Dimension, IxDyn};

use crate::solver::PlasmaSolver;

/// What the solver held when [`PlasmaSolver::regenerate`] was called.
#[derive(Debug, Clone, PartialEq)]
pub struct RegenerationRecord {
    pub geometry: String,
    pub controls: SolverControls,
    pub time_step: f64,
    /// Grid after the call.
    pub grid: GridMetadata,
}

/// Storage shape of `field` on `grid`.
///
/// For a double-null grid the leg/core counts describe one half; only
/// `nx`, `ny` and the species counts set the shape.
pub fn field_shape(field: PlasmaField, grid: &GridMetadata) -> Vec<usize> {
    let (nxp, nyp) = (grid.poloidal_extent(), grid.radial_extent());
    match field {
        PlasmaField::IonDensity | PlasmaField::ParticleDiffusivity => {
            vec![nxp, nyp, grid.n_ion_species]
        }
        PlasmaField::NeutralDensity => vec![nxp, nyp, grid.n_gas_species],
        PlasmaField::ParallelFlow => vec![nxp, nyp, grid.n_flow_species],
        PlasmaField::ElectronTemperature
        | PlasmaField::IonTemperature
        | PlasmaField::Potential
        | PlasmaField::ElectronHeatDiffusivity
        | PlasmaField::IonHeatDiffusivity
        | PlasmaField::ImpurityFraction => vec![nxp, nyp],
    }
}

#[derive(Debug, Clone)]
pub struct InMemorySolver {
    geometry: String,
    /// Geometry the current storage was allocated for.
    mesh_geometry: String,
    grid: GridMetadata,
    models: PhysicsModels,
    controls: SolverControls,
    core_power: CorePower,
    fields: BTreeMap<PlasmaField, ArrayD<f64>>,
    fail_regeneration: bool,
    regenerations: Vec<RegenerationRecord>,
    writes: Vec<PlasmaField>,
}

impl InMemorySolver {
    /// Zero-filled state for `grid`, tagged `geometry`.
    pub fn new(geometry: &str, grid: GridMetadata) -> Self {
        InMemorySolver {
            geometry: geometry.to_string(),
            mesh_geometry: geometry.to_string(),
            grid,
            models: PhysicsModels::default(),
            controls: SolverControls::default(),
            core_power: CorePower::default(),
            fields: allocate(&grid),
            fail_regeneration: false,
            regenerations: Vec::new(),
            writes: Vec::new(),
        }
    }

    pub fn with_models(mut self, models: PhysicsModels) -> Self {
        self.models = models;
        self
    }

    pub fn with_controls(mut self, controls: SolverControls) -> Self {
        self.controls = controls;
        self
    }

    pub fn with_core_power(mut self, power: CorePower) -> Self {
        self.core_power = power;
        self
    }

    /// Make every following regeneration fail after reallocating storage.
    pub fn fail_regeneration(&mut self, fail: bool) {
        self.fail_regeneration = fail;
    }

    /// Fill a field through `f(index)`, keeping its current shape.
    pub fn fill_field<F>(&mut self, field: PlasmaField, f: F) -> FusionResult<()>
    where
        F: Fn(&[usize]) -> f64,
    {
        let shape = field_shape(field, &self.grid);
        let values = ArrayD::from_shape_fn(IxDyn(&shape), |idx| f(idx.slice()));
        self.write_field(field, values)
    }

    pub fn field(&self, field: PlasmaField) -> Option<&ArrayD<f64>> {
        self.fields.get(&field)
    }

    pub fn regenerations(&self) -> &[RegenerationRecord] {
        &self.regenerations
    }

    /// Fields written through [`PlasmaSolver::write_field`], in call order.
    pub fn writes(&self) -> &[PlasmaField] {
        &self.writes
    }

    pub fn clear_history(&mut self) {
        self.regenerations.clear();
        self.writes.clear();
    }

    fn regenerated_grid(&self) -> FusionResult<GridMetadata> {
        if self.geometry == self.mesh_geometry {
            return Ok(self.grid);
        }
        if self.mesh_geometry.contains("dnbot") && self.geometry == "dnull" {
            return Ok(GridMetadata {
                nx: 2 * self.grid.nx - 2,
                ..self.grid
            });
        }
        Err(FusionError::Regeneration(format!(
            "cannot rebuild a '{}' mesh as '{}'",
            self.mesh_geometry, self.geometry
        )))
    }
}

fn allocate(grid: &GridMetadata) -> BTreeMap<PlasmaField, ArrayD<f64>> {
    PlasmaField::ALL
        .into_iter()
        .map(|field| (field, ArrayD::zeros(IxDyn(&field_shape(field, grid)))))
        .collect()
}

impl PlasmaSolver for InMemorySolver {
    fn geometry(&self) -> &str {
        &self.geometry
    }

    fn set_geometry(&mut self, tag: &str) {
        self.geometry = tag.to_string();
    }

    fn grid(&self) -> GridMetadata {
        self.grid
    }

    fn models(&self) -> PhysicsModels {
        self.models
    }

    fn controls(&self) -> SolverControls {
        self.controls
    }

    fn set_controls(&mut self, controls: SolverControls) {
        self.controls = controls;
    }

    fn core_power(&self) -> CorePower {
        self.core_power
    }

    fn set_core_power(&mut self, power: CorePower) {
        self.core_power = power;
    }

    fn read_field(&self, field: PlasmaField) -> FusionResult<ArrayD<f64>> {
        self.fields
            .get(&field)
            .cloned()
            .ok_or_else(|| FusionError::UnknownField(field.name().to_string()))
    }

    fn write_field(&mut self, field: PlasmaField, values: ArrayD<f64>) -> FusionResult<()> {
        let expected = field_shape(field, &self.grid);
        if values.shape() != expected.as_slice() {
            return Err(FusionError::Shape {
                field: field.name().to_string(),
                expected,
                found: values.shape().to_vec(),
            });
        }
        self.fields.insert(field, values);
        self.writes.push(field);
        Ok(())
    }

    fn regenerate(&mut self, time_step: f64) -> FusionResult<()> {
        if !time_step.is_finite() || time_step <= 0.0 {
            return Err(FusionError::Regeneration(format!(
                "time step must be finite and > 0, got {time_step}"
            )));
        }
        let grid = self.regenerated_grid()?;
        if grid != self.grid {
            self.grid = grid;
            self.fields = allocate(&grid);
            self.mesh_geometry = self.geometry.clone();
        }
        self.regenerations.push(RegenerationRecord {
            geometry: self.geometry.clone(),
            controls: self.controls,
            time_step,
            grid,
        });
        if self.fail_regeneration {
            return Err(FusionError::Regeneration(format!(
                "quasi-static step of dt={time_step} did not converge at tolerance {}",
                self.controls.tolerance
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn half_grid() -> GridMetadata {
        GridMetadata {
            nx: 7,
            ny: 4,
            inner_leg: 2,
            inner_core: 1,
            outer_leg: 2,
            outer_core: 2,
            n_ion_species: 2,
            n_flow_species: 1,
            n_gas_species: 1,
        }
    }

    #[test]
    fn test_new_allocates_every_field() {
        let solver = InMemorySolver::new("dnbot", half_grid());
        for field in PlasmaField::ALL {
            let values = solver.field(field).unwrap();
            assert_eq!(values.shape(), field_shape(field, &half_grid()).as_slice());
            assert!(values.iter().all(|&v| v == 0.0));
        }
        assert_eq!(field_shape(PlasmaField::IonDensity, &half_grid()), vec![9, 6, 2]);
        assert_eq!(field_shape(PlasmaField::ParallelFlow, &half_grid()), vec![9, 6, 1]);
        assert_eq!(field_shape(PlasmaField::Potential, &half_grid()), vec![9, 6]);
    }

    #[test]
    fn test_read_field_is_a_copy() {
        let mut solver = InMemorySolver::new("dnbot", half_grid());
        let before = solver.read_field(PlasmaField::Potential).unwrap();
        solver
            .fill_field(PlasmaField::Potential, |idx| idx[0] as f64 + 1.0)
            .unwrap();
        assert!(before.iter().all(|&v| v == 0.0));
        assert_eq!(solver.field(PlasmaField::Potential).unwrap()[[8, 0]], 9.0);
    }

    #[test]
    fn test_write_field_shape_guard() {
        let mut solver = InMemorySolver::new("dnbot", half_grid());
        let err = solver
            .write_field(PlasmaField::Potential, ArrayD::zeros(IxDyn(&[9, 5])))
            .unwrap_err();
        assert!(matches!(err, FusionError::Shape { .. }));
        assert!(solver.writes().is_empty());
    }

    #[test]
    fn test_regenerate_doubles_half_mesh() {
        let mut solver = InMemorySolver::new("dnbot", half_grid());
        solver.set_geometry("dnull");
        solver.regenerate(1e-6).unwrap();
        assert_eq!(solver.grid().nx, 12);
        assert_eq!(
            solver.field(PlasmaField::IonDensity).unwrap().shape(),
            &[14, 6, 2]
        );
        assert_eq!(solver.regenerations().len(), 1);
        assert_eq!(solver.regenerations()[0].geometry, "dnull");

        // Same geometry again keeps the mesh
        solver.regenerate(1e-6).unwrap();
        assert_eq!(solver.grid().nx, 12);
    }

    #[test]
    fn test_regenerate_rejects_unknown_transition() {
        let mut solver = InMemorySolver::new("snull", half_grid());
        solver.set_geometry("dnull");
        assert!(matches!(
            solver.regenerate(1e-6),
            Err(FusionError::Regeneration(_))
        ));
        assert!(solver.regenerate(-1.0).is_err());
    }

    #[test]
    fn test_failing_regeneration_leaves_mesh_rebuilt() {
        let mut solver = InMemorySolver::new("dnbot", half_grid());
        solver.fail_regeneration(true);
        solver.set_geometry("dnull");
        assert!(solver.regenerate(1e-6).is_err());
        assert_eq!(solver.grid().nx, 12);
    }
}
