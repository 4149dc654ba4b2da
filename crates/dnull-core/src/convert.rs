// ─────────────────────────────────────────────────────────────────────
// SCPN Fusion Core — Bottom-Half to Double-Null Conversion
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
//! Convert a converged bottom-half (`dnbot`) solution into a full
//! up-down symmetric double null (`dnull`).
//!
//! Algorithm:
//! 1. Check the geometry tag
//! 2. Snapshot every converted field by value
//! 3. Reflect the snapshots (no solver access)
//! 4. Reset switches, retag, regenerate the mesh at relaxed tolerance
//! 5. Write the reflected fields into the new storage
//! 6. Double the core power if it is held fixed
//!
//! Nothing is rolled back if regeneration fails.

use std::collections::BTreeMap;

use dnull_types::config::ConversionConfig;
use dnull_types::error::{FusionError, FusionResult};
use dnull_types::state::{CorePower, PhysicsModels, PlasmaField, SolverControls};
use log::{debug, info, warn};
use ndarray::{ArrayD, Axis, Slice};

use crate::layout::IndexLayout;
use crate::reflect::{check_half_shape, reflect_field};
use crate::solver::PlasmaSolver;

/// Fields converted under the given physics models.
/// The impurity fraction is only carried when it is prescribed.
pub fn converted_fields(models: PhysicsModels) -> Vec<PlasmaField> {
    PlasmaField::ALL
        .into_iter()
        .filter(|&f| f != PlasmaField::ImpurityFraction || models.fixed_impurity_fraction)
        .collect()
}

/// Half-domain fields copied out of the solver.
#[derive(Debug, Clone)]
pub struct HalfDomainSnapshot {
    pub layout: IndexLayout,
    pub models: PhysicsModels,
    pub fields: BTreeMap<PlasmaField, ArrayD<f64>>,
}

impl HalfDomainSnapshot {
    pub fn capture<P: PlasmaSolver + ?Sized>(solver: &P) -> FusionResult<Self> {
        let grid = solver.grid();
        let layout = IndexLayout::from_grid(&grid)?;
        let models = solver.models();

        let mut fields = BTreeMap::new();
        for field in converted_fields(models) {
            let mut values = solver.read_field(field)?;
            if field == PlasmaField::ParallelFlow {
                values = leading_species(field, values, grid.n_flow_species)?;
            }
            check_half_shape(field.name(), &values, &layout)?;
            fields.insert(field, values);
        }
        Ok(HalfDomainSnapshot {
            layout,
            models,
            fields,
        })
    }
}

/// Keep the first `n` entries of the species axis.
fn leading_species(field: PlasmaField, values: ArrayD<f64>, n: usize) -> FusionResult<ArrayD<f64>> {
    if values.ndim() != 3 || values.shape()[2] < n {
        let mut expected = values.shape().to_vec();
        expected.resize(3, 0);
        expected[2] = n;
        return Err(FusionError::Shape {
            field: field.name().to_string(),
            expected,
            found: values.shape().to_vec(),
        });
    }
    if values.shape()[2] == n {
        return Ok(values);
    }
    Ok(values.slice_axis(Axis(2), Slice::from(0..n)).to_owned())
}

/// Full-domain copies of a snapshot.
#[derive(Debug, Clone)]
pub struct ReflectedState {
    pub layout: IndexLayout,
    pub fields: BTreeMap<PlasmaField, ArrayD<f64>>,
}

impl ReflectedState {
    pub fn build(snapshot: &HalfDomainSnapshot) -> FusionResult<Self> {
        let layout = snapshot.layout;
        let mut fields = BTreeMap::new();
        for (&field, lower) in &snapshot.fields {
            let full = reflect_field(field, lower, &layout)?;
            debug!(
                "reflected {field}: {:?} -> {:?}",
                lower.shape(),
                full.shape()
            );
            fields.insert(field, full);
        }
        Ok(ReflectedState { layout, fields })
    }

    pub fn get(&self, field: PlasmaField) -> Option<&ArrayD<f64>> {
        self.fields.get(&field)
    }
}

/// What a conversion changed.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionReport {
    pub layout: IndexLayout,
    pub fields_written: Vec<PlasmaField>,
    pub impurity_fraction_written: bool,
    /// `(before, after)` when the core power was rescaled.
    pub core_power: Option<(CorePower, CorePower)>,
    /// Tolerance left on the solver after regeneration.
    pub restored_tolerance: f64,
}

/// Convert with default settings.
pub fn convert<P: PlasmaSolver + ?Sized>(solver: &mut P) -> FusionResult<()> {
    convert_with(solver, &ConversionConfig::default()).map(|_| ())
}

pub fn convert_with<P: PlasmaSolver + ?Sized>(
    solver: &mut P,
    config: &ConversionConfig,
) -> FusionResult<ConversionReport> {
    config.validate()?;

    let geometry = solver.geometry().to_string();
    if !geometry.contains(config.source_geometry.as_str()) {
        return Err(FusionError::Precondition(format!(
            "geometry '{geometry}' is not a '{}' half domain",
            config.source_geometry
        )));
    }

    let snapshot = HalfDomainSnapshot::capture(&*solver)?;
    let reflected = ReflectedState::build(&snapshot)?;
    let layout = reflected.layout;
    info!(
        "converting '{geometry}' -> '{}': nx {} -> {}, {} fields",
        config.target_geometry,
        layout.half_nx,
        layout.full_nx(),
        reflected.fields.len()
    );

    let prior = solver.controls();
    solver.set_controls(SolverControls {
        grid_split_override: 0,
        fixed_left_boundary: false,
        updown_symmetric: false,
        tolerance: config.regeneration.relaxed_tolerance,
    });
    solver.set_geometry(&config.target_geometry);

    info!(
        "regenerating mesh: dt={}, tolerance={}",
        config.regeneration.time_step, config.regeneration.relaxed_tolerance
    );
    if let Err(err) = solver.regenerate(config.regeneration.time_step) {
        warn!("mesh regeneration failed, solver left partially regenerated: {err}");
        return Err(err);
    }

    let restored_tolerance = config
        .regeneration
        .strict_tolerance
        .unwrap_or(prior.tolerance);
    solver.set_controls(SolverControls {
        tolerance: restored_tolerance,
        ..solver.controls()
    });

    let mut fields_written = Vec::with_capacity(reflected.fields.len());
    for (field, values) in reflected.fields {
        solver.write_field(field, values)?;
        fields_written.push(field);
    }
    let impurity_fraction_written = fields_written.contains(&PlasmaField::ImpurityFraction);

    let core_power = if snapshot.models.fixed_core_power {
        let before = solver.core_power();
        let after = before.scaled(config.core_power_factor);
        solver.set_core_power(after);
        info!(
            "core power rescaled x{}: electron {} -> {} W, ion {} -> {} W",
            config.core_power_factor, before.electron, after.electron, before.ion, after.ion
        );
        Some((before, after))
    } else {
        None
    };

    info!("conversion to '{}' complete", config.target_geometry);
    Ok(ConversionReport {
        layout,
        fields_written,
        impurity_fraction_written,
        core_power,
        restored_tolerance,
    })
}
